//! Store selection from environment variables

use std::{env, str::FromStr, sync::Arc};

use super::errors::StorageError;
use super::memory::{InMemoryLongTermStore, InMemoryShortTermStore};
use super::postgres::PostgresLongTermStore;
use super::redis::RedisShortTermStore;
use super::sqlite::SqliteLongTermStore;
use super::traits::{LongTermStore, ShortTermStore};

const DEFAULT_TABLE_PREFIX: &str = "sg_";

/// Which backend to build, and where it lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSelection {
    pub store_type: String,
    pub url: String,
}

impl StoreSelection {
    fn from_lookup<F>(type_var: &str, url_var: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            store_type: lookup(type_var)
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "memory".to_string()),
            url: lookup(url_var).unwrap_or_default(),
        }
    }
}

fn table_prefix() -> String {
    env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| DEFAULT_TABLE_PREFIX.to_string())
}

/// Short-term store chosen by `GENERIC_CACHE_STORE_TYPE` / `GENERIC_CACHE_STORE_URL`.
pub async fn short_term_store_from_env() -> Result<Arc<dyn ShortTermStore>, StorageError> {
    let selection = StoreSelection::from_lookup(
        "GENERIC_CACHE_STORE_TYPE",
        "GENERIC_CACHE_STORE_URL",
        |key| env::var(key).ok(),
    );
    build_short_term_store(&selection).await
}

pub async fn build_short_term_store(
    selection: &StoreSelection,
) -> Result<Arc<dyn ShortTermStore>, StorageError> {
    tracing::info!(
        "Initializing short-term store with type: {}",
        selection.store_type
    );

    match selection.store_type.as_str() {
        "memory" => Ok(Arc::new(InMemoryShortTermStore::new())),
        "redis" => {
            let client = redis::Client::open(selection.url.as_str())?;
            let store = RedisShortTermStore::new(client);
            store.init().await?;
            tracing::info!("Connected to redis short-term store");
            Ok(Arc::new(store))
        }
        t => Err(StorageError::Storage(format!(
            "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
        ))),
    }
}

/// Long-term store chosen by `GENERIC_DATA_STORE_TYPE` / `GENERIC_DATA_STORE_URL`.
///
/// `none` disables long-term logins altogether.
pub async fn long_term_store_from_env() -> Result<Option<Arc<dyn LongTermStore>>, StorageError> {
    let selection = StoreSelection::from_lookup(
        "GENERIC_DATA_STORE_TYPE",
        "GENERIC_DATA_STORE_URL",
        |key| env::var(key).ok(),
    );
    build_long_term_store(&selection, &table_prefix()).await
}

pub async fn build_long_term_store(
    selection: &StoreSelection,
    table_prefix: &str,
) -> Result<Option<Arc<dyn LongTermStore>>, StorageError> {
    tracing::info!(
        "Initializing long-term store with type: {}",
        selection.store_type
    );

    let store: Arc<dyn LongTermStore> = match selection.store_type.as_str() {
        "none" => return Ok(None),
        "memory" => Arc::new(InMemoryLongTermStore::new()),
        "sqlite" => {
            let opts = sqlx::sqlite::SqliteConnectOptions::from_str(&selection.url)?
                .create_if_missing(true);
            let store = SqliteLongTermStore::new(
                sqlx::sqlite::SqlitePool::connect_lazy_with(opts),
                table_prefix,
            );
            store.init().await?;
            Arc::new(store)
        }
        "postgres" => {
            let store =
                PostgresLongTermStore::new(sqlx::PgPool::connect_lazy(&selection.url)?, table_prefix);
            store.init().await?;
            Arc::new(store)
        }
        t => {
            return Err(StorageError::Storage(format!(
                "Unsupported data store type: {t}. Supported types are 'none', 'memory', 'sqlite' and 'postgres'"
            )));
        }
    };

    Ok(Some(store))
}
