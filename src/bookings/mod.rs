pub mod amounts;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod rules;
pub mod service;

pub use amounts::*;
pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use rules::*;
pub use service::*;
