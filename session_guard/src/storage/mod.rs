mod cleanup;
mod config;
mod errors;
mod memory;
mod postgres;
mod redis;
mod sqlite;
mod traits;

pub use cleanup::{DEFAULT_CLEANUP_INTERVAL_SECS, spawn_cleanup_task};
pub use config::{
    StoreSelection, build_long_term_store, build_short_term_store, long_term_store_from_env,
    short_term_store_from_env,
};
pub use errors::StorageError;
pub use memory::{InMemoryLongTermStore, InMemoryShortTermStore};
pub use postgres::PostgresLongTermStore;
pub use redis::RedisShortTermStore;
pub use sqlite::SqliteLongTermStore;
pub use traits::{LongTermStore, ShortTermStore};
