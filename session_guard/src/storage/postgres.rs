use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres, Row, postgres::PgRow};

use crate::long_term::LongTermLoginRecord;

use super::errors::StorageError;
use super::traits::LongTermStore;

impl<'r> FromRow<'r, PgRow> for LongTermLoginRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let series: String = row.try_get("series")?;
        let token_hash: String = row.try_get("token_hash")?;
        let user_id: String = row.try_get("user_id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(LongTermLoginRecord {
            series,
            token_hash,
            user_id,
            created_at,
        })
    }
}

/// Long-term login store on PostgreSQL
pub struct PostgresLongTermStore {
    pool: Pool<Postgres>,
    table: String,
}

impl PostgresLongTermStore {
    pub fn new(pool: Pool<Postgres>, table_prefix: &str) -> Self {
        Self {
            pool,
            table: format!("{table_prefix}long_term_logins"),
        }
    }

    pub async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                series TEXT PRIMARY KEY NOT NULL,
                token_hash TEXT NOT NULL,
                user_id TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_user_id ON {}(user_id)",
            self.table.replace('.', "_"),
            self.table
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl LongTermStore for PostgresLongTermStore {
    async fn get_long_term_login(
        &self,
        series: &str,
    ) -> Result<Option<LongTermLoginRecord>, StorageError> {
        let record = sqlx::query_as::<_, LongTermLoginRecord>(&format!(
            "SELECT series, token_hash, user_id, created_at FROM {} WHERE series = $1",
            self.table
        ))
        .bind(series)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn add_long_term_login(&self, record: &LongTermLoginRecord) -> Result<(), StorageError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {}
            (series, token_hash, user_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (series) DO UPDATE
            SET token_hash = EXCLUDED.token_hash,
                user_id = EXCLUDED.user_id,
                created_at = EXCLUDED.created_at
            "#,
            self.table
        ))
        .bind(&record.series)
        .bind(&record.token_hash)
        .bind(&record.user_id)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn drop_long_term_login(
        &self,
        record: &LongTermLoginRecord,
    ) -> Result<(), StorageError> {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE series = $1 AND token_hash = $2",
            self.table
        ))
        .bind(&record.series)
        .bind(&record.token_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
