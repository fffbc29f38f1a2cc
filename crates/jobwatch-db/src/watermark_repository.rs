use chrono::{DateTime, Utc};
use jobwatch_core::error::AppError;
use jobwatch_core::models::Watermark;
use jobwatch_core::platform::Platform;
use sqlx::{PgPool, Pool, Postgres};

/// Repository for the per-platform watermark in PostgreSQL.
#[derive(Clone)]
pub struct WatermarkRepository {
    pool: Pool<Postgres>,
}

impl WatermarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, platform: Platform) -> Result<Option<Watermark>, AppError> {
        let row = sqlx::query_as::<_, WatermarkRow>(
            r#"
            SELECT platform, job_id, updated_at
            FROM last_processed_jobs
            WHERE platform = $1
            "#,
        )
        .bind(platform.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::PersistenceError(e.to_string()))?;

        row.map(Watermark::try_from).transpose()
    }

    /// Insert or replace the watermark. One row per platform.
    pub async fn advance(&self, platform: Platform, job_id: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO last_processed_jobs (platform, job_id, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (platform)
            DO UPDATE SET job_id = EXCLUDED.job_id, updated_at = NOW()
            "#,
        )
        .bind(platform.as_str())
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::PersistenceError(e.to_string()))?;

        tracing::debug!(%platform, job_id, "Watermark stored");
        Ok(())
    }

    pub async fn clear(&self, platform: Platform) -> Result<(), AppError> {
        sqlx::query("DELETE FROM last_processed_jobs WHERE platform = $1")
            .bind(platform.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::PersistenceError(e.to_string()))?;
        Ok(())
    }
}

// -- Row types --

#[derive(sqlx::FromRow)]
struct WatermarkRow {
    platform: String,
    job_id: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WatermarkRow> for Watermark {
    type Error = AppError;

    fn try_from(row: WatermarkRow) -> Result<Self, Self::Error> {
        Ok(Watermark {
            platform: row.platform.parse()?,
            last_job_id: row.job_id,
            updated_at: row.updated_at,
        })
    }
}

// -- Trait implementation --

impl jobwatch_core::traits::WatermarkStore for WatermarkRepository {
    async fn get(&self, platform: Platform) -> Result<Option<Watermark>, AppError> {
        WatermarkRepository::get(self, platform).await
    }

    async fn advance(&self, platform: Platform, job_id: &str) -> Result<(), AppError> {
        WatermarkRepository::advance(self, platform, job_id).await
    }

    async fn clear(&self, platform: Platform) -> Result<(), AppError> {
        WatermarkRepository::clear(self, platform).await
    }
}
