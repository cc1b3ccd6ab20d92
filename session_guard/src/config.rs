//! Cookie, header and lifetime settings shared by the XSRF check and the logout protocol

use chrono::{DateTime, Duration, Utc};
use http::StatusCode;
use std::str::FromStr;

const DEFAULT_SHORT_TERM_LIFETIME: u64 = 900;

/// Upper bound for the sliding session lifetime (one year)
const MAX_SHORT_TERM_LIFETIME: u64 = 365 * 24 * 60 * 60;

/// Names and lifetimes used when reading credentials and writing cookies
///
/// Construct with [`LoginSettings::default`] and override fields, or load
/// everything from the environment with [`LoginSettings::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSettings {
    /// Request header carrying the XSRF token
    pub xsrf_header_name: String,
    /// Cookie carrying the XSRF token (readable by scripts)
    pub xsrf_cookie_name: String,
    /// Cookie carrying the short-term session identifier
    pub auth_session_cookie_name: String,
    /// Cookie carrying the long-term ("remember me") credential
    pub long_term_cookie_name: String,
    pub cookie_path: String,
    pub cookie_secure: bool,
    /// Sliding expiration window in seconds
    pub short_term_lifetime: u64,
    /// Empty string disables the `Location` header
    pub logout_redirect_url: String,
    pub logout_status_code: StatusCode,
    pub logout_status_message: String,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            xsrf_header_name: "X-XSRF-Token".to_string(),
            xsrf_cookie_name: "xsrf-token".to_string(),
            auth_session_cookie_name: "auth-session-token".to_string(),
            long_term_cookie_name: "auth-long-term-token".to_string(),
            cookie_path: "/".to_string(),
            cookie_secure: true,
            short_term_lifetime: DEFAULT_SHORT_TERM_LIFETIME,
            logout_redirect_url: "/".to_string(),
            logout_status_code: StatusCode::FOUND,
            logout_status_message: "Found".to_string(),
        }
    }
}

impl LoginSettings {
    /// Load settings from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let short_term_lifetime = parse_or_default(
            "SESSION_SHORT_TERM_LIFETIME",
            lookup("SESSION_SHORT_TERM_LIFETIME"),
            defaults.short_term_lifetime,
        );
        let short_term_lifetime = if (1..=MAX_SHORT_TERM_LIFETIME).contains(&short_term_lifetime) {
            short_term_lifetime
        } else {
            tracing::warn!(
                "SESSION_SHORT_TERM_LIFETIME={} is out of range, using {}",
                short_term_lifetime,
                DEFAULT_SHORT_TERM_LIFETIME
            );
            DEFAULT_SHORT_TERM_LIFETIME
        };

        let logout_status_code = parse_or_default::<u16>(
            "LOGOUT_STATUS_CODE",
            lookup("LOGOUT_STATUS_CODE"),
            defaults.logout_status_code.as_u16(),
        );
        let logout_status_code = StatusCode::from_u16(logout_status_code).unwrap_or_else(|_| {
            tracing::warn!("LOGOUT_STATUS_CODE={} is not a status code", logout_status_code);
            defaults.logout_status_code
        });

        let cookie_secure = lookup("COOKIE_SECURE")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(defaults.cookie_secure);

        Self {
            xsrf_header_name: lookup("XSRF_HEADER_NAME").unwrap_or(defaults.xsrf_header_name),
            xsrf_cookie_name: lookup("XSRF_COOKIE_NAME").unwrap_or(defaults.xsrf_cookie_name),
            auth_session_cookie_name: lookup("AUTH_SESSION_COOKIE_NAME")
                .unwrap_or(defaults.auth_session_cookie_name),
            long_term_cookie_name: lookup("LONG_TERM_COOKIE_NAME")
                .unwrap_or(defaults.long_term_cookie_name),
            cookie_path: lookup("COOKIE_PATH").unwrap_or(defaults.cookie_path),
            cookie_secure,
            short_term_lifetime,
            // An explicitly empty value is meaningful here
            logout_redirect_url: lookup("LOGOUT_REDIRECT_URL")
                .unwrap_or(defaults.logout_redirect_url),
            logout_status_code,
            logout_status_message: lookup("LOGOUT_STATUS_MESSAGE")
                .unwrap_or(defaults.logout_status_message),
        }
    }

    /// Absolute expiry for a session created or refreshed now
    pub fn short_term_expiry(&self) -> DateTime<Utc> {
        let now = Utc::now();
        i64::try_from(self.effective_lifetime())
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub(crate) fn short_term_max_age(&self) -> i64 {
        i64::try_from(self.effective_lifetime()).unwrap_or(i64::MAX)
    }

    /// At least one second, even when the field is set to 0 directly
    fn effective_lifetime(&self) -> u64 {
        self.short_term_lifetime.max(1)
    }
}

fn parse_or_default<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: FromStr,
{
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", key, raw);
            default
        }),
    }
}
