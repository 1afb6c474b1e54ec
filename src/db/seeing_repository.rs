use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

use crate::db::{
    DaySummary, DbError, ForecastStore, LocationDataset, SeeingMeasurement, StoredForecast,
};

const SELECT_MEASUREMENTS: &str = r#"
    SELECT id, location_id, timestamp, day_index, hour,
           cloud_low, cloud_mid, cloud_high, arc_seconds,
           seeing_index_one, seeing_index_two, jet_stream,
           bad_layer_bottom, bad_layer_top, bad_layer_gradient,
           temperature, humidity, celestial, created_at
    FROM seeing_measurements
    WHERE location_id = $1
    ORDER BY timestamp
"#;

const SELECT_DAY_SUMMARIES: &str = r#"
    SELECT id, location_id, day_index, day_date, weekday, meta
    FROM day_summaries
    WHERE location_id = $1
    ORDER BY day_index
"#;

#[derive(Clone)]
pub struct SeeingRepository {
    pool: PgPool,
}

impl SeeingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ForecastStore for SeeingRepository {
    /// Delete and re-insert a location's rows inside one transaction
    #[instrument(
        skip(self, dataset),
        fields(
            location = %dataset.location_id,
            measurements = dataset.measurements.len(),
            days = dataset.days.len()
        )
    )]
    async fn replace_location(&self, dataset: &LocationDataset) -> Result<usize, DbError> {
        debug!("Beginning transaction to replace location dataset");
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM seeing_measurements WHERE location_id = $1")
            .bind(&dataset.location_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM day_summaries WHERE location_id = $1")
            .bind(&dataset.location_id)
            .execute(&mut *tx)
            .await?;
        debug!("Deleted {} previous measurements", deleted);

        let mut inserted = 0;
        for m in &dataset.measurements {
            let r = &m.reading;
            let result = sqlx::query(
                r#"
                INSERT INTO seeing_measurements (
                    location_id, timestamp, day_index, hour,
                    cloud_low, cloud_mid, cloud_high, arc_seconds,
                    seeing_index_one, seeing_index_two, jet_stream,
                    bad_layer_bottom, bad_layer_top, bad_layer_gradient,
                    temperature, humidity, celestial
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                "#,
            )
            .bind(&m.location_id)
            .bind(r.timestamp)
            .bind(r.day_index)
            .bind(r.hour)
            .bind(r.cloud_low)
            .bind(r.cloud_mid)
            .bind(r.cloud_high)
            .bind(r.arc_seconds)
            .bind(r.seeing_index_one)
            .bind(r.seeing_index_two)
            .bind(r.jet_stream)
            .bind(r.bad_layer_bottom)
            .bind(r.bad_layer_top)
            .bind(r.bad_layer_gradient)
            .bind(r.temperature)
            .bind(r.humidity)
            .bind(&r.celestial)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(
                    timestamp = %r.timestamp,
                    day_index = r.day_index,
                    error = %e,
                    "Failed to insert seeing measurement"
                );
                e
            })?;

            inserted += result.rows_affected() as usize;
        }

        for day in &dataset.days {
            sqlx::query(
                r#"
                INSERT INTO day_summaries (location_id, day_index, day_date, weekday, meta)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&day.location_id)
            .bind(day.day_index)
            .bind(day.day_date)
            .bind(&day.weekday)
            .bind(&day.meta)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            "Replaced dataset: {} measurements, {} days",
            inserted,
            dataset.days.len()
        );
        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn find_measurements(&self, location_id: &str) -> Result<Vec<SeeingMeasurement>, DbError> {
        debug!("Querying measurements for location");

        let measurements = sqlx::query_as::<_, SeeingMeasurement>(SELECT_MEASUREMENTS)
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} measurements", measurements.len());
        Ok(measurements)
    }

    #[instrument(skip(self))]
    async fn find_day_summaries(&self, location_id: &str) -> Result<Vec<DaySummary>, DbError> {
        let days = sqlx::query_as::<_, DaySummary>(SELECT_DAY_SUMMARIES)
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} day summaries", days.len());
        Ok(days)
    }

    /// Both reads run in one REPEATABLE READ transaction
    #[instrument(skip(self))]
    async fn find_dataset(&self, location_id: &str) -> Result<StoredForecast, DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let measurements = sqlx::query_as::<_, SeeingMeasurement>(SELECT_MEASUREMENTS)
            .bind(location_id)
            .fetch_all(&mut *tx)
            .await?;
        let days = sqlx::query_as::<_, DaySummary>(SELECT_DAY_SUMMARIES)
            .bind(location_id)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(
            "Read snapshot with {} measurements and {} day summaries",
            measurements.len(),
            days.len()
        );
        Ok(StoredForecast { measurements, days })
    }
}
