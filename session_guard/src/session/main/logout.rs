use http::header::LOCATION;
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::config::LoginSettings;
use crate::context::GuardContext;
use crate::long_term::LongTermCookie;
use crate::session::errors::SessionError;
use crate::session::types::SessionRecord;
use crate::utils::{header_set_cookie, request_cookie, request_header};

use super::cookie::clearing_cookie;

/// Status, message and headers the caller turns into the logout response
#[derive(Debug, Clone)]
pub struct LogoutResponse {
    pub status: StatusCode,
    pub status_message: String,
    pub headers: HeaderMap,
}

/// Revoke every credential the request presents.
///
/// The XSRF token, the session cookie and the long-term cookie are each
/// handled on their own, so any subset (including none) is a valid request
/// and repeating the call is harmless.
#[tracing::instrument(skip_all)]
pub async fn logout(
    ctx: &GuardContext,
    request_headers: &HeaderMap,
) -> Result<LogoutResponse, SessionError> {
    let settings = ctx.settings();
    let mut headers = HeaderMap::new();

    let mut session_found = false;

    if let Some(token) = presented_xsrf_token(request_headers, settings) {
        session_found |= reset_xsrf_binding(ctx, &token).await?;
    }

    if let Some(cookie) = request_cookie(request_headers, &settings.auth_session_cookie_name) {
        if let Some(record) = ctx.short_term().get_session_from_cookie(&cookie).await? {
            ctx.short_term().drop_session(&record).await?;
            tracing::debug!("Dropped session found by cookie");
            session_found = true;
        }

        if session_found {
            header_set_cookie(
                &mut headers,
                &clearing_cookie(settings, &settings.auth_session_cookie_name),
            )?;
        }
    }

    if let Some(raw) = request_cookie(request_headers, &settings.long_term_cookie_name) {
        revoke_long_term_login(ctx, &raw).await?;
        header_set_cookie(
            &mut headers,
            &clearing_cookie(settings, &settings.long_term_cookie_name),
        )?;
    }

    if !settings.logout_redirect_url.is_empty() {
        let location = HeaderValue::from_str(&settings.logout_redirect_url).map_err(|_| {
            SessionError::HeaderError(format!(
                "Invalid logout redirect URL: {}",
                settings.logout_redirect_url
            ))
        })?;
        headers.insert(LOCATION, location);
    }

    Ok(LogoutResponse {
        status: settings.logout_status_code,
        status_message: settings.logout_status_message.clone(),
        headers,
    })
}

/// The XSRF header when it is sent at all, otherwise the XSRF cookie.
/// A blank header does not fall back to the cookie.
fn presented_xsrf_token(request_headers: &HeaderMap, settings: &LoginSettings) -> Option<String> {
    if request_headers.contains_key(settings.xsrf_header_name.as_str()) {
        request_header(request_headers, &settings.xsrf_header_name)
    } else {
        request_cookie(request_headers, &settings.xsrf_cookie_name)
    }
}

/// Replace the record bound to `token` with an anonymous one under the same
/// token, so the token can never again stand for the old identity.
async fn reset_xsrf_binding(ctx: &GuardContext, token: &str) -> Result<bool, SessionError> {
    let store = ctx.short_term();
    let Some(record) = store.get_session_from_xsrf(token).await? else {
        return Ok(false);
    };

    store.drop_session(&record).await?;
    store
        .add_session(&SessionRecord::anonymous(
            token,
            ctx.settings().short_term_expiry(),
        ))
        .await?;
    tracing::debug!(
        was_anonymous = record.is_anonymous(),
        "Rebound XSRF token to an anonymous session"
    );
    Ok(true)
}

async fn revoke_long_term_login(ctx: &GuardContext, raw: &str) -> Result<(), SessionError> {
    let Some(store) = ctx.long_term() else {
        tracing::debug!("No long-term store configured, only clearing the cookie");
        return Ok(());
    };

    let cookie = LongTermCookie::parse(raw, ctx.cookie_key());
    if !cookie.is_valid() {
        return Ok(());
    }

    if let Some(record) = store.get_long_term_login(cookie.series()).await? {
        store.drop_long_term_login(&record).await?;
        tracing::debug!("Dropped long-term login series");
    }
    Ok(())
}
