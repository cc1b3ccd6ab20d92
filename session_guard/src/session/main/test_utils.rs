//! Shared fixtures for session and long-term login tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use http::header::{COOKIE, HeaderName, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use std::sync::Arc;

use crate::config::LoginSettings;
use crate::context::GuardContext;
use crate::long_term::{LongTermCookieKey, LongTermLoginRecord};
use crate::session::types::SessionRecord;
use crate::storage::{
    InMemoryLongTermStore, InMemoryShortTermStore, LongTermStore, ShortTermStore, StorageError,
};

pub(crate) struct Harness {
    pub ctx: GuardContext,
    pub short_term: Arc<InMemoryShortTermStore>,
    pub long_term: Arc<InMemoryLongTermStore>,
}

pub(crate) fn test_cookie_key() -> LongTermCookieKey {
    LongTermCookieKey::new("test-secret")
}

pub(crate) fn harness() -> Harness {
    harness_with(LoginSettings::default())
}

/// In-memory stores wired into a context built from `settings`
pub(crate) fn harness_with(settings: LoginSettings) -> Harness {
    let short_term = Arc::new(InMemoryShortTermStore::new());
    let long_term = Arc::new(InMemoryLongTermStore::new());
    let ctx = GuardContext::new(settings, short_term.clone())
        .with_long_term_store(long_term.clone())
        .with_cookie_key(test_cookie_key());

    Harness {
        ctx,
        short_term,
        long_term,
    }
}

pub(crate) fn in_future(seconds: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(seconds)
}

/// Request headers plus a single `Cookie` header built from `cookies`
pub(crate) fn request_headers(headers: &[(&str, &str)], cookies: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    if !cookies.is_empty() {
        let cookie = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        map.insert(COOKIE, HeaderValue::from_str(&cookie).unwrap());
    }
    map
}

pub(crate) fn set_cookie_values(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub(crate) fn find_set_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookie_values(headers)
        .into_iter()
        .find(|cookie| cookie.starts_with(&prefix))
}

/// Value part of a `Set-Cookie` string
pub(crate) fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

/// Store whose every operation fails
pub(crate) struct FailingStore;

fn unavailable() -> StorageError {
    StorageError::Storage("store unavailable".to_string())
}

#[async_trait]
impl ShortTermStore for FailingStore {
    async fn get_session_from_xsrf(
        &self,
        _token: &str,
    ) -> Result<Option<SessionRecord>, StorageError> {
        Err(unavailable())
    }

    async fn get_session_from_cookie(
        &self,
        _cookie: &str,
    ) -> Result<Option<SessionRecord>, StorageError> {
        Err(unavailable())
    }

    async fn add_session(&self, _record: &SessionRecord) -> Result<(), StorageError> {
        Err(unavailable())
    }

    async fn drop_session(&self, _record: &SessionRecord) -> Result<(), StorageError> {
        Err(unavailable())
    }

    async fn update_session_expiry(
        &self,
        _record: &SessionRecord,
        _expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        Err(unavailable())
    }

    async fn purge_expired(&self) -> Result<usize, StorageError> {
        Err(unavailable())
    }
}

#[async_trait]
impl LongTermStore for FailingStore {
    async fn get_long_term_login(
        &self,
        _series: &str,
    ) -> Result<Option<LongTermLoginRecord>, StorageError> {
        Err(unavailable())
    }

    async fn add_long_term_login(&self, _record: &LongTermLoginRecord) -> Result<(), StorageError> {
        Err(unavailable())
    }

    async fn drop_long_term_login(
        &self,
        _record: &LongTermLoginRecord,
    ) -> Result<(), StorageError> {
        Err(unavailable())
    }
}
