use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite};
use http::HeaderMap;
use time::{Duration, OffsetDateTime};

use crate::config::LoginSettings;
use crate::session::errors::SessionError;
use crate::session::types::SessionRecord;
use crate::utils::header_set_cookie;

/// Lifetime of the long-term cookie on the client (30 days)
pub(super) const LONG_TERM_COOKIE_MAX_AGE: i64 = 30 * 24 * 60 * 60;

/// `None` past the range `time` can represent, which leaves `Expires` out
fn expires(at: DateTime<Utc>) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(at.timestamp()).ok()
}

pub(super) fn session_cookie(
    settings: &LoginSettings,
    value: &str,
    expires_at: DateTime<Utc>,
) -> Cookie<'static> {
    Cookie::build((settings.auth_session_cookie_name.clone(), value.to_string()))
        .path(settings.cookie_path.clone())
        .expires(expires(expires_at))
        .max_age(Duration::seconds(settings.short_term_max_age()))
        .secure(settings.cookie_secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Scripts read this one to echo the token back in the XSRF header
pub(super) fn xsrf_cookie(
    settings: &LoginSettings,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Cookie<'static> {
    Cookie::build((settings.xsrf_cookie_name.clone(), token.to_string()))
        .path(settings.cookie_path.clone())
        .expires(expires(expires_at))
        .max_age(Duration::seconds(settings.short_term_max_age()))
        .secure(settings.cookie_secure)
        .http_only(false)
        .same_site(SameSite::Lax)
        .build()
}

pub(super) fn long_term_cookie(settings: &LoginSettings, wire: &str) -> Cookie<'static> {
    let max_age = Duration::seconds(LONG_TERM_COOKIE_MAX_AGE);
    Cookie::build((settings.long_term_cookie_name.clone(), wire.to_string()))
        .path(settings.cookie_path.clone())
        .expires(OffsetDateTime::now_utc() + max_age)
        .max_age(max_age)
        .secure(settings.cookie_secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Empty value, epoch expiry, same path
pub(super) fn clearing_cookie(settings: &LoginSettings, name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path(settings.cookie_path.clone())
        .expires(OffsetDateTime::UNIX_EPOCH)
        .max_age(Duration::ZERO)
        .secure(settings.cookie_secure)
        .http_only(true)
        .build()
}

/// Append the session cookie (when the record has one) and the XSRF cookie
pub(super) fn set_session_cookies(
    headers: &mut HeaderMap,
    settings: &LoginSettings,
    record: &SessionRecord,
) -> Result<(), SessionError> {
    if let Some(cookie) = &record.cookie {
        header_set_cookie(
            headers,
            &session_cookie(settings, cookie, record.expires_at),
        )?;
    }
    header_set_cookie(
        headers,
        &xsrf_cookie(settings, &record.xsrf_token, record.expires_at),
    )?;
    Ok(())
}
