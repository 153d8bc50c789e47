use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::portfolio::PortfolioRow;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Portfolio {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Key-value persistence for portfolio documents.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<PortfolioRow>, StoreError>;

    /// Updates `id` when it belongs to `user_id`, inserts a new row when `id`
    /// is `None`. An `id` owned by someone else (or missing) is `NotFound`.
    async fn upsert(&self, user_id: &str, id: Option<Uuid>, data: &Value)
        -> Result<Uuid, StoreError>;

    /// Most recently created portfolio for the user.
    async fn latest_for_user(&self, user_id: &str) -> Result<Option<Uuid>, StoreError>;
}

pub struct PgPortfolioStore {
    pool: PgPool,
}

impl PgPortfolioStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `portfolios` table and its user index if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS portfolios (
                id         UUID PRIMARY KEY,
                user_id    TEXT NOT NULL,
                data       JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS portfolios_user_created_idx \
             ON portfolios (user_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        info!("Portfolio schema ready");
        Ok(())
    }
}

#[async_trait]
impl PortfolioStore for PgPortfolioStore {
    async fn get(&self, id: Uuid) -> Result<Option<PortfolioRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, PortfolioRow>("SELECT * FROM portfolios WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert(
        &self,
        user_id: &str,
        id: Option<Uuid>,
        data: &Value,
    ) -> Result<Uuid, StoreError> {
        if let Some(id) = id {
            let updated: Option<Uuid> = sqlx::query_scalar(
                r#"
                UPDATE portfolios
                SET data = $1, updated_at = NOW()
                WHERE id = $2 AND user_id = $3
                RETURNING id
                "#,
            )
            .bind(data)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
            return updated.ok_or(StoreError::NotFound(id));
        }

        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO portfolios (id, user_id, data) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(user_id)
            .bind(data)
            .execute(&self.pool)
            .await?;

        info!("Created portfolio {id} for user {user_id}");
        Ok(id)
    }

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<Uuid>, StoreError> {
        Ok(sqlx::query_scalar(
            "SELECT id FROM portfolios WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryPortfolioStore;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_inserts_then_updates_owned_row() {
        let store = MemoryPortfolioStore::default();
        let id = store.upsert("user-1", None, &json!({"name": "A"})).await.unwrap();

        let same = store
            .upsert("user-1", Some(id), &json!({"name": "B"}))
            .await
            .unwrap();
        assert_eq!(same, id);
        assert_eq!(store.get(id).await.unwrap().unwrap().data["name"], "B");
    }

    #[tokio::test]
    async fn test_upsert_rejects_foreign_row() {
        let store = MemoryPortfolioStore::default();
        let id = store.upsert("owner", None, &json!({})).await.unwrap();

        let err = store
            .upsert("intruder", Some(id), &json!({"name": "X"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(found) if found == id));
        assert!(store.latest_for_user("intruder").await.unwrap().is_none());
        assert_eq!(store.latest_for_user("owner").await.unwrap(), Some(id));
    }
}
