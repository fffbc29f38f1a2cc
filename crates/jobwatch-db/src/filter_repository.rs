use jobwatch_core::error::AppError;
use jobwatch_core::filters::{normalize_keywords, reconcile_categories};
use jobwatch_core::models::{Category, Keyword, NewCategory};
use jobwatch_core::platform::Platform;
use sqlx::{PgPool, Pool, Postgres};

/// Repository for category selections and keywords in PostgreSQL.
///
/// Both tables carry a `position` column so reads come back in the order
/// the source (or the user) supplied them.
#[derive(Clone)]
pub struct FilterRepository {
    pool: Pool<Postgres>,
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::PersistenceError(e.to_string())
}

impl FilterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_categories(&self, platform: Platform) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT platform, name, external_key, selected
            FROM categories
            WHERE platform = $1
            ORDER BY position ASC, name ASC
            "#,
        )
        .bind(platform.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(Category::try_from).collect()
    }

    /// Toggle `selected` atomically and return the updated category.
    pub async fn flip_selection(
        &self,
        platform: Platform,
        external_key: &str,
    ) -> Result<Category, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET selected = NOT selected, updated_at = NOW()
            WHERE platform = $1 AND external_key = $2
            RETURNING platform, name, external_key, selected
            "#,
        )
        .bind(platform.as_str())
        .bind(external_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => Category::try_from(row),
            None => Err(AppError::NotFound(format!(
                "{platform} category '{external_key}'"
            ))),
        }
    }

    /// Swap in a freshly fetched category list, keeping selections by name.
    pub async fn replace_all(
        &self,
        platform: Platform,
        incoming: Vec<NewCategory>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let existing = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT platform, name, external_key, selected
            FROM categories
            WHERE platform = $1
            FOR UPDATE
            "#,
        )
        .bind(platform.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(Category::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let merged = reconcile_categories(platform, &existing, incoming);

        sqlx::query("DELETE FROM categories WHERE platform = $1")
            .bind(platform.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for (position, category) in merged.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO categories (platform, name, external_key, selected, position)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(platform.as_str())
            .bind(&category.name)
            .bind(&category.external_key)
            .bind(category.selected)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        tracing::info!(
            %platform,
            count = merged.len(),
            selected = merged.iter().filter(|c| c.selected).count(),
            "Categories replaced"
        );
        Ok(())
    }

    pub async fn list_keywords(&self, platform: Platform) -> Result<Vec<Keyword>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT value
            FROM keywords
            WHERE platform = $1
            ORDER BY position ASC, value ASC
            "#,
        )
        .bind(platform.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(value,)| Keyword { platform, value })
            .collect())
    }

    /// Make the stored keywords equal to `values` (normalised).
    pub async fn set_keywords(&self, platform: Platform, values: &[String]) -> Result<(), AppError> {
        let keywords = normalize_keywords(values);
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM keywords WHERE platform = $1 AND NOT (value = ANY($2))")
            .bind(platform.as_str())
            .bind(&keywords)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for (position, value) in keywords.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO keywords (platform, value, position)
                VALUES ($1, $2, $3)
                ON CONFLICT (platform, value) DO UPDATE SET position = EXCLUDED.position
                "#,
            )
            .bind(platform.as_str())
            .bind(value)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        tracing::info!(%platform, count = keywords.len(), "Keywords replaced");
        Ok(())
    }
}

// -- Row types --

#[derive(sqlx::FromRow)]
struct CategoryRow {
    platform: String,
    name: String,
    external_key: String,
    selected: bool,
}

impl TryFrom<CategoryRow> for Category {
    type Error = AppError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            platform: row.platform.parse()?,
            name: row.name,
            external_key: row.external_key,
            selected: row.selected,
        })
    }
}

// -- Trait implementation --

impl jobwatch_core::traits::FilterStore for FilterRepository {
    async fn list_categories(&self, platform: Platform) -> Result<Vec<Category>, AppError> {
        FilterRepository::list_categories(self, platform).await
    }

    async fn flip_selection(
        &self,
        platform: Platform,
        external_key: &str,
    ) -> Result<Category, AppError> {
        FilterRepository::flip_selection(self, platform, external_key).await
    }

    async fn replace_all(
        &self,
        platform: Platform,
        categories: Vec<NewCategory>,
    ) -> Result<(), AppError> {
        FilterRepository::replace_all(self, platform, categories).await
    }

    async fn list_keywords(&self, platform: Platform) -> Result<Vec<Keyword>, AppError> {
        FilterRepository::list_keywords(self, platform).await
    }

    async fn set_keywords(&self, platform: Platform, values: &[String]) -> Result<(), AppError> {
        FilterRepository::set_keywords(self, platform, values).await
    }
}
