mod availability;
mod bookings;
mod config;
mod db;
mod error;
mod models;
mod pricing;
mod validation;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Local;
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use availability::AvailabilityIndex;
use bookings::{
    ArchiveRepository, BookingRules, BookingService, BookingsRepository, SlotCatalogRepository,
};
use config::BookingPolicy;
use error::ApiError;
use models::{CreateSlot, SlotDefinition, SlotWithPrice, UpdateSlot};
use pricing::{PricingResolver, ScheduleStore};
use validator::Validate;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        create_slot,
        get_all_slots,
        get_slot_by_id,
        update_slot,
        delete_slot,
    ),
    components(
        schemas(SlotDefinition, SlotWithPrice, CreateSlot, UpdateSlot)
    ),
    tags(
        (name = "slots", description = "Venue slot catalog management endpoints")
    ),
    info(
        title = "Venue Booking API",
        version = "1.0.0",
        description = "RESTful API for venue slot bookings, availability and pricing",
        contact(
            name = "API Support",
            email = "support@venueapi.com"
        )
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub policy: BookingPolicy,
    pub pricing: Arc<PricingResolver>,
    pub booking_service: BookingService,
}

/// Handler for POST /api/slots
/// Creates a new slot definition in the catalog
#[utoipa::path(
    post,
    path = "/api/slots",
    request_body = CreateSlot,
    responses(
        (status = 201, description = "Slot created successfully", body = SlotDefinition),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Base price must be a positive number"})),
        (status = 409, description = "Duplicate slot label", body = String, example = json!({"error": "Slot with label 'Lunch' already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "slots"
)]
async fn create_slot(
    State(state): State<AppState>,
    Json(payload): Json<CreateSlot>,
) -> Result<(StatusCode, Json<SlotDefinition>), ApiError> {
    tracing::debug!("Creating new slot: {}", payload.label);

    // Validate the request using validator crate
    payload.validate()?;

    // Check for duplicate slot label
    if db::check_duplicate_slot_label(&state.db, &payload.label).await? {
        tracing::warn!("Attempt to create duplicate slot: {}", payload.label);
        return Err(ApiError::Conflict {
            message: format!("Slot with label '{}' already exists", payload.label),
        });
    }

    // Insert slot into database
    let slot = sqlx::query_as::<_, SlotDefinition>(
        r#"
        INSERT INTO slots (label, time_range, base_price)
        VALUES ($1, $2, $3)
        RETURNING id, label, time_range, base_price, created_at, updated_at
        "#,
    )
    .bind(&payload.label)
    .bind(&payload.time_range)
    .bind(payload.base_price)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Successfully created slot with id: {}", slot.id);
    Ok((StatusCode::CREATED, Json(slot)))
}

/// Handler for GET /api/slots
/// Retrieves all slot definitions with their currently applicable prices
///
/// Display pricing comes from the pricing resolver; the catalog base price
/// only shows through for slots without a schedule.
#[utoipa::path(
    get,
    path = "/api/slots",
    responses(
        (status = 200, description = "List of all slots with display prices", body = Vec<SlotWithPrice>),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "slots"
)]
async fn get_all_slots(
    State(state): State<AppState>,
) -> Result<Json<Vec<SlotWithPrice>>, ApiError> {
    tracing::debug!("Fetching all slots");

    let slots = sqlx::query_as::<_, SlotDefinition>(
        r#"
        SELECT id, label, time_range, base_price, created_at, updated_at
        FROM slots
        ORDER BY id
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let today = Local::now().date_naive();
    let mut priced = Vec::with_capacity(slots.len());
    for slot in &slots {
        let price = state.pricing.price_for_slot(slot, today, today).await?;
        priced.push(SlotWithPrice {
            id: slot.id,
            label: slot.label.clone(),
            time_range: slot.time_range.clone(),
            price,
        });
    }

    tracing::debug!("Retrieved {} slots", priced.len());
    Ok(Json(priced))
}

/// Handler for GET /api/slots/:id
/// Retrieves a specific slot definition by ID
#[utoipa::path(
    get,
    path = "/api/slots/{id}",
    params(
        ("id" = i32, Path, description = "Slot ID")
    ),
    responses(
        (status = 200, description = "Slot found", body = SlotDefinition),
        (status = 404, description = "Slot not found", body = String, example = json!({"error": "Slot with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "slots"
)]
async fn get_slot_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SlotDefinition>, ApiError> {
    tracing::debug!("Fetching slot with id: {}", id);

    let slot = sqlx::query_as::<_, SlotDefinition>(
        r#"
        SELECT id, label, time_range, base_price, created_at, updated_at
        FROM slots
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        tracing::debug!("Slot with id {} not found", id);
        ApiError::NotFound {
            resource: "Slot".to_string(),
            id: id.to_string(),
        }
    })?;

    tracing::debug!("Successfully retrieved slot: {}", slot.label);
    Ok(Json(slot))
}

/// Handler for PUT /api/slots/:id
/// Updates an existing slot definition
#[utoipa::path(
    put,
    path = "/api/slots/{id}",
    params(
        ("id" = i32, Path, description = "Slot ID")
    ),
    request_body = UpdateSlot,
    responses(
        (status = 200, description = "Slot updated successfully", body = SlotDefinition),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Base price must be a positive number"})),
        (status = 404, description = "Slot not found", body = String, example = json!({"error": "Slot with id 1 not found"})),
        (status = 409, description = "Duplicate slot label", body = String, example = json!({"error": "Slot with label 'Lunch' already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "slots"
)]
async fn update_slot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSlot>,
) -> Result<Json<SlotDefinition>, ApiError> {
    tracing::debug!("Updating slot with id: {}", id);

    // Validate the request using validator crate
    payload.validate()?;

    // Use a transaction so the existence check, duplicate check, and update
    // commit or roll back together
    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, SlotDefinition>(
        "SELECT id, label, time_range, base_price, created_at, updated_at FROM slots WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        tracing::debug!("Slot with id {} not found for update", id);
        ApiError::NotFound {
            resource: "Slot".to_string(),
            id: id.to_string(),
        }
    })?;

    // If the label is changing, check for duplicates within the transaction
    if let Some(ref new_label) = payload.label {
        if new_label != &existing.label {
            let duplicate_exists: Option<bool> = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM slots WHERE label = $1 AND id != $2)"
            )
            .bind(new_label)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if duplicate_exists.unwrap_or(false) {
                tracing::warn!("Attempt to update slot {} to duplicate label: {}", id, new_label);
                return Err(ApiError::Conflict {
                    message: format!("Slot with label '{}' already exists", new_label),
                });
            }
        }
    }

    // Update slot with provided fields, keeping existing values for omitted fields
    let updated_slot = sqlx::query_as::<_, SlotDefinition>(
        r#"
        UPDATE slots
        SET label = $1,
            time_range = $2,
            base_price = $3,
            updated_at = NOW()
        WHERE id = $4
        RETURNING id, label, time_range, base_price, created_at, updated_at
        "#,
    )
    .bind(payload.label.unwrap_or(existing.label))
    .bind(payload.time_range.unwrap_or(existing.time_range))
    .bind(payload.base_price.unwrap_or(existing.base_price))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Successfully updated slot with id: {}", id);
    Ok(Json(updated_slot))
}

/// Handler for DELETE /api/slots/:id
/// Deletes a slot definition that no booking references
#[utoipa::path(
    delete,
    path = "/api/slots/{id}",
    params(
        ("id" = i32, Path, description = "Slot ID")
    ),
    responses(
        (status = 204, description = "Slot deleted successfully"),
        (status = 404, description = "Slot not found", body = String, example = json!({"error": "Slot with id 1 not found"})),
        (status = 409, description = "Slot still referenced by bookings", body = String, example = json!({"error": "Slot 1 is referenced by existing bookings"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "slots"
)]
async fn delete_slot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!("Deleting slot with id: {}", id);

    // A slot definition is never deleted while referenced by bookings
    if db::slot_is_referenced(&state.db, id).await? {
        tracing::warn!("Attempt to delete referenced slot: {}", id);
        return Err(ApiError::Conflict {
            message: format!("Slot {} is referenced by existing bookings", id),
        });
    }

    let result = sqlx::query("DELETE FROM slots WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        tracing::debug!("Slot with id {} not found for deletion", id);
        return Err(ApiError::NotFound {
            resource: "Slot".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Successfully deleted slot with id: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Build the application state from a pool and policy
fn build_state(db: PgPool, policy: BookingPolicy) -> AppState {
    let pricing = Arc::new(PricingResolver::new(ScheduleStore::new(db.clone())));

    let booking_service = BookingService::new(
        BookingsRepository::new(db.clone()),
        ArchiveRepository::new(db.clone()),
        SlotCatalogRepository::new(db.clone()),
        AvailabilityIndex::new(db.clone()),
        pricing.clone(),
        BookingRules::new(policy.clone()),
    );

    AppState {
        db,
        policy,
        pricing,
        booking_service,
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{CorsLayer, Any};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Slot catalog routes
        .route("/api/slots", post(create_slot))
        .route("/api/slots", get(get_all_slots))
        .route("/api/slots/:id", get(get_slot_by_id))
        .route("/api/slots/:id", put(update_slot))
        .route("/api/slots/:id", delete(delete_slot))
        // Booking routes
        .route("/api/bookings", post(bookings::create_booking_handler))
        .route("/api/bookings", get(bookings::get_bookings_handler))
        .route("/api/bookings/list", get(bookings::list_bookings_handler))
        .route("/api/bookings/archive", get(bookings::get_archive_handler))
        .route("/api/bookings/report", get(bookings::get_report_handler))
        .route("/api/bookings/:id", get(bookings::get_booking_by_id_handler))
        .route("/api/bookings/:id", put(bookings::update_booking_handler))
        .route("/api/bookings/:id", delete(bookings::delete_booking_handler))
        // Availability route
        .route("/api/availability/:date", get(bookings::get_availability_handler))
        // Pricing administration routes
        .route("/api/pricing", get(pricing::get_pricing_handler))
        .route("/api/pricing/:slot_name", put(pricing::set_pricing_handler))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Venue Booking API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST")
        .unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string());
    let policy = BookingPolicy::from_env();

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(build_state(db_pool, policy));

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Venue Booking API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
