use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One browser session, authenticated or anonymous
///
/// A record is always addressable by its XSRF token; authenticated records
/// are additionally addressable by their session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// `None` for anonymous or logged-out sessions
    pub user_id: Option<String>,
    /// Session cookie value, unique per record
    pub cookie: Option<String>,
    /// Anti-forgery token, unique per record
    pub xsrf_token: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// An anonymous record bound only to an XSRF token
    pub fn anonymous(xsrf_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            cookie: None,
            xsrf_token: xsrf_token.into(),
            expires_at,
        }
    }

    pub fn authenticated(
        user_id: impl Into<String>,
        cookie: impl Into<String>,
        xsrf_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            cookie: Some(cookie.into()),
            xsrf_token: xsrf_token.into(),
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Same credentials and identity, ignoring the expiry
    pub(crate) fn same_identity(&self, other: &SessionRecord) -> bool {
        self.xsrf_token == other.xsrf_token
            && self.cookie == other.cookie
            && self.user_id == other.user_id
    }
}
