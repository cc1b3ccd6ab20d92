use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::long_term::LongTermLoginRecord;
use crate::session::SessionRecord;

use super::errors::StorageError;
use super::traits::{LongTermStore, ShortTermStore};

#[derive(Default)]
struct SessionTables {
    by_xsrf: HashMap<String, SessionRecord>,
    /// session cookie -> XSRF token
    cookie_index: HashMap<String, String>,
}

impl SessionTables {
    fn remove(&mut self, xsrf_token: &str) -> Option<SessionRecord> {
        let removed = self.by_xsrf.remove(xsrf_token)?;
        if let Some(cookie) = &removed.cookie {
            if self.cookie_index.get(cookie).map(String::as_str) == Some(xsrf_token) {
                self.cookie_index.remove(cookie);
            }
        }
        Some(removed)
    }

    /// Live record for `xsrf_token`, evicting it if it has expired
    fn live(&mut self, xsrf_token: &str, now: DateTime<Utc>) -> Option<&mut SessionRecord> {
        let expired = self.by_xsrf.get(xsrf_token)?.is_expired_at(now);
        if expired {
            tracing::debug!("Evicting expired session record");
            self.remove(xsrf_token);
            return None;
        }
        self.by_xsrf.get_mut(xsrf_token)
    }
}

/// Process-local short-term store
pub struct InMemoryShortTermStore {
    tables: Mutex<SessionTables>,
}

impl InMemoryShortTermStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory short-term session store");
        Self {
            tables: Mutex::new(SessionTables::default()),
        }
    }

    /// Number of stored records, expired ones included
    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.by_xsrf.len()
    }
}

impl Default for InMemoryShortTermStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShortTermStore for InMemoryShortTermStore {
    async fn get_session_from_xsrf(
        &self,
        token: &str,
    ) -> Result<Option<SessionRecord>, StorageError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.live(token, Utc::now()).map(|record| record.clone()))
    }

    async fn get_session_from_cookie(
        &self,
        cookie: &str,
    ) -> Result<Option<SessionRecord>, StorageError> {
        let mut tables = self.tables.lock().await;
        let Some(xsrf_token) = tables.cookie_index.get(cookie).cloned() else {
            return Ok(None);
        };

        Ok(tables
            .live(&xsrf_token, Utc::now())
            .filter(|record| record.cookie.as_deref() == Some(cookie))
            .map(|record| record.clone()))
    }

    async fn add_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().await;
        tables.remove(&record.xsrf_token);
        if let Some(cookie) = &record.cookie {
            tables
                .cookie_index
                .insert(cookie.clone(), record.xsrf_token.clone());
        }
        tables
            .by_xsrf
            .insert(record.xsrf_token.clone(), record.clone());
        Ok(())
    }

    async fn drop_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().await;
        let matches = tables
            .by_xsrf
            .get(&record.xsrf_token)
            .is_some_and(|stored| stored.same_identity(record));

        if matches {
            tables.remove(&record.xsrf_token);
        } else {
            tracing::debug!("Session to drop is already gone or replaced");
        }
        Ok(())
    }

    async fn update_session_expiry(
        &self,
        record: &SessionRecord,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut tables = self.tables.lock().await;
        match tables.live(&record.xsrf_token, Utc::now()) {
            Some(stored) if stored.same_identity(record) => {
                stored.expires_at = expires_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired(&self) -> Result<usize, StorageError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let expired: Vec<String> = tables
            .by_xsrf
            .values()
            .filter(|record| record.is_expired_at(now))
            .map(|record| record.xsrf_token.clone())
            .collect();

        for token in &expired {
            tables.remove(token);
        }
        Ok(expired.len())
    }
}

/// Process-local long-term login store
pub struct InMemoryLongTermStore {
    entries: Mutex<HashMap<String, LongTermLoginRecord>>,
}

impl InMemoryLongTermStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory long-term login store");
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryLongTermStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LongTermStore for InMemoryLongTermStore {
    async fn get_long_term_login(
        &self,
        series: &str,
    ) -> Result<Option<LongTermLoginRecord>, StorageError> {
        Ok(self.entries.lock().await.get(series).cloned())
    }

    async fn add_long_term_login(&self, record: &LongTermLoginRecord) -> Result<(), StorageError> {
        self.entries
            .lock()
            .await
            .insert(record.series.clone(), record.clone());
        Ok(())
    }

    async fn drop_long_term_login(
        &self,
        record: &LongTermLoginRecord,
    ) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        if entries
            .get(&record.series)
            .is_some_and(|stored| stored.token_hash == record.token_hash)
        {
            entries.remove(&record.series);
        }
        Ok(())
    }
}
