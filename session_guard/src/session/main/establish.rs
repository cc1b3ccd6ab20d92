use http::HeaderMap;

use crate::context::GuardContext;
use crate::long_term::{LongTermCookie, LongTermLoginRecord};
use crate::session::errors::SessionError;
use crate::session::types::SessionRecord;
use crate::storage::StorageError;
use crate::utils::{gen_random_string, header_set_cookie, request_cookie, request_header};

use super::cookie::{long_term_cookie, set_session_cookies};

/// Random bytes behind every session cookie and XSRF token
const CREDENTIAL_BYTES: usize = 32;

/// Mint an anonymous session so a client can make XSRF-protected requests
/// before logging in.
#[tracing::instrument(skip_all)]
pub async fn issue_anonymous_xsrf_token(
    ctx: &GuardContext,
) -> Result<(SessionRecord, HeaderMap), SessionError> {
    let settings = ctx.settings();
    let record = SessionRecord::anonymous(
        gen_random_string(CREDENTIAL_BYTES)?,
        settings.short_term_expiry(),
    );
    ctx.short_term().add_session(&record).await?;

    let mut headers = HeaderMap::new();
    set_session_cookies(&mut headers, settings, &record)?;
    Ok((record, headers))
}

/// Bind `user_id` to a brand-new session once its credentials have been
/// checked elsewhere.
///
/// Any record bound to the XSRF token the request carried is dropped, and the
/// new session gets a fresh XSRF token, so a token planted before login is
/// worthless afterwards.
#[tracing::instrument(skip(ctx, request_headers))]
pub async fn establish_session(
    ctx: &GuardContext,
    user_id: &str,
    request_headers: &HeaderMap,
) -> Result<(SessionRecord, HeaderMap), SessionError> {
    let settings = ctx.settings();
    let store = ctx.short_term();

    let presented = request_header(request_headers, &settings.xsrf_header_name)
        .or_else(|| request_cookie(request_headers, &settings.xsrf_cookie_name));
    if let Some(token) = presented {
        if let Some(previous) = store.get_session_from_xsrf(&token).await? {
            store.drop_session(&previous).await?;
            tracing::debug!("Dropped the pre-login session");
        }
    }

    let record = SessionRecord::authenticated(
        user_id,
        gen_random_string(CREDENTIAL_BYTES)?,
        gen_random_string(CREDENTIAL_BYTES)?,
        settings.short_term_expiry(),
    );
    store.add_session(&record).await?;

    let mut headers = HeaderMap::new();
    set_session_cookies(&mut headers, settings, &record)?;
    Ok((record, headers))
}

/// Start a new long-term login series for `user_id` and return the cookie
/// that carries it.
#[tracing::instrument(skip(ctx))]
pub async fn remember_login(ctx: &GuardContext, user_id: &str) -> Result<HeaderMap, SessionError> {
    let Some(store) = ctx.long_term() else {
        return Err(StorageError::Storage("No long-term store configured".to_string()).into());
    };

    let (cookie, wire) = LongTermCookie::issue(ctx.cookie_key())?;
    store
        .add_long_term_login(&LongTermLoginRecord::new(
            cookie.series(),
            cookie.token(),
            user_id,
        ))
        .await?;

    let mut headers = HeaderMap::new();
    header_set_cookie(&mut headers, &long_term_cookie(ctx.settings(), &wire))?;
    Ok(headers)
}
