use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::long_term::LongTermLoginRecord;
use crate::session::SessionRecord;

use super::errors::StorageError;

/// Short-term session storage, keyed by XSRF token and by session cookie
///
/// Lookups never return a record whose expiry has passed. Each operation is
/// atomic with respect to the others on the same key.
#[async_trait]
pub trait ShortTermStore: Send + Sync + 'static {
    async fn get_session_from_xsrf(&self, token: &str)
    -> Result<Option<SessionRecord>, StorageError>;

    async fn get_session_from_cookie(
        &self,
        cookie: &str,
    ) -> Result<Option<SessionRecord>, StorageError>;

    /// Insert a record, replacing any record stored under the same XSRF token.
    async fn add_session(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Remove `record` if the stored record under its XSRF token still has
    /// the same identity. Removing an absent record is not an error.
    async fn drop_session(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Move the expiry of `record` to `expires_at`.
    ///
    /// Returns `false` without writing when the stored record is gone, expired
    /// or has been replaced by one with a different identity.
    async fn update_session_expiry(
        &self,
        record: &SessionRecord,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Remove expired records, returning how many were removed.
    async fn purge_expired(&self) -> Result<usize, StorageError>;
}

/// Long-term login storage, keyed by series
#[async_trait]
pub trait LongTermStore: Send + Sync + 'static {
    async fn get_long_term_login(
        &self,
        series: &str,
    ) -> Result<Option<LongTermLoginRecord>, StorageError>;

    async fn add_long_term_login(&self, record: &LongTermLoginRecord) -> Result<(), StorageError>;

    /// Remove `record` if the stored record for its series still carries the
    /// same token hash.
    async fn drop_long_term_login(&self, record: &LongTermLoginRecord)
    -> Result<(), StorageError>;
}
