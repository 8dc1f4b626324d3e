// Pricing schedule store
//
// Loads and caches pricing schedule rows from the database, with a short TTL
// so staff edits become visible quickly. Performs the lazy rollover: a
// schedule whose effective date has arrived gets its future price promoted
// into the current price on first read.

use crate::pricing::{
    error::{PricingError, PricingResult},
    PricingSchedule, SlotName,
};
use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Time-to-live for cached schedule rows
const CACHE_TTL: Duration = Duration::from_secs(60);

/// In-memory cache for schedule rows
#[derive(Debug)]
struct ScheduleCache {
    schedules: HashMap<SlotName, PricingSchedule>,
    last_loaded: Option<Instant>,
}

impl ScheduleCache {
    fn new() -> Self {
        Self {
            schedules: HashMap::new(),
            last_loaded: None,
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        match self.last_loaded {
            Some(loaded) => loaded.elapsed() > ttl,
            None => true,
        }
    }
}

/// Schedule store backed by the `pricing_schedules` table
///
/// Reads go through a TTL cache; writes (staff updates and rollover
/// promotion) invalidate it.
#[derive(Clone)]
pub struct ScheduleStore {
    pool: PgPool,
    cache: Arc<RwLock<ScheduleCache>>,
    cache_ttl: Duration,
}

impl ScheduleStore {
    /// Create a new ScheduleStore
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: Arc::new(RwLock::new(ScheduleCache::new())),
            cache_ttl: CACHE_TTL,
        }
    }

    /// Get the schedule for a slot name, applying rollover relative to `today`
    ///
    /// Returns None when no schedule row exists for the name (callers fall
    /// back to the catalog base price or surface a configuration error).
    pub async fn get(&self, slot_name: SlotName, today: NaiveDate) -> PricingResult<Option<PricingSchedule>> {
        self.ensure_fresh().await?;

        let cached = {
            let cache = self.cache.read().await;
            cache.schedules.get(&slot_name).cloned()
        };

        match cached {
            Some(schedule) if schedule.rollover_due(today) => {
                let promoted = self.promote(slot_name, today).await?;
                Ok(Some(promoted))
            }
            other => Ok(other),
        }
    }

    /// All schedules, rollover applied
    pub async fn all(&self, today: NaiveDate) -> PricingResult<Vec<PricingSchedule>> {
        self.ensure_fresh().await?;

        let names: Vec<SlotName> = {
            let cache = self.cache.read().await;
            cache.schedules.keys().copied().collect()
        };

        let mut schedules = Vec::with_capacity(names.len());
        for name in names {
            if let Some(schedule) = self.get(name, today).await? {
                schedules.push(schedule);
            }
        }

        schedules.sort_by_key(|s| s.slot_name);
        Ok(schedules)
    }

    /// Insert or replace the schedule row for a slot name
    pub async fn upsert(
        &self,
        schedule: &PricingSchedule,
    ) -> PricingResult<PricingSchedule> {
        let stored = sqlx::query_as::<_, PricingSchedule>(
            r#"
            INSERT INTO pricing_schedules (slot_name, current_price, future_price, effective_from, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (slot_name)
            DO UPDATE SET
                current_price = $2,
                future_price = $3,
                effective_from = $4,
                updated_at = NOW()
            RETURNING slot_name, current_price, future_price, effective_from, updated_at
            "#,
        )
        .bind(schedule.slot_name)
        .bind(schedule.current_price)
        .bind(schedule.future_price)
        .bind(schedule.effective_from)
        .fetch_one(&self.pool)
        .await?;

        self.invalidate().await;

        tracing::info!("Pricing schedule updated for {}", stored.slot_name);
        Ok(stored)
    }

    /// Drop the cache so the next read reloads from the database
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        cache.last_loaded = None;
    }

    /// Promote a due future price into the current price
    ///
    /// The WHERE guard re-checks the effective date so two concurrent readers
    /// cannot promote twice; the second UPDATE matches no row and we fall back
    /// to re-reading the already-promoted state.
    async fn promote(&self, slot_name: SlotName, today: NaiveDate) -> PricingResult<PricingSchedule> {
        let promoted = sqlx::query_as::<_, PricingSchedule>(
            r#"
            UPDATE pricing_schedules
            SET current_price = future_price,
                future_price = NULL,
                effective_from = NULL,
                updated_at = NOW()
            WHERE slot_name = $1
              AND future_price IS NOT NULL
              AND effective_from <= $2
            RETURNING slot_name, current_price, future_price, effective_from, updated_at
            "#,
        )
        .bind(slot_name)
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;

        self.invalidate().await;

        match promoted {
            Some(schedule) => {
                tracing::info!(
                    "Rolled over pricing schedule for {} to {}",
                    schedule.slot_name,
                    schedule.current_price
                );
                Ok(schedule)
            }
            None => {
                // Lost the race to another promoter; read the settled row
                self.load_one(slot_name)
                    .await?
                    .ok_or_else(|| PricingError::ScheduleNotFound(slot_name.to_string()))
            }
        }
    }

    /// Reload the cache from the database when stale
    async fn ensure_fresh(&self) -> PricingResult<()> {
        {
            let cache = self.cache.read().await;
            if !cache.is_stale(self.cache_ttl) {
                return Ok(());
            }
        }

        tracing::debug!("Reloading pricing schedules from database");

        let rows = sqlx::query_as::<_, PricingSchedule>(
            "SELECT slot_name, current_price, future_price, effective_from, updated_at FROM pricing_schedules",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut cache = self.cache.write().await;
        cache.schedules = rows
            .into_iter()
            .map(|row| (row.slot_name, row))
            .collect();
        cache.last_loaded = Some(Instant::now());

        Ok(())
    }

    async fn load_one(&self, slot_name: SlotName) -> PricingResult<Option<PricingSchedule>> {
        let row = sqlx::query_as::<_, PricingSchedule>(
            "SELECT slot_name, current_price, future_price, effective_from, updated_at FROM pricing_schedules WHERE slot_name = $1",
        )
        .bind(slot_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
