use http::HeaderMap;

use crate::config::LoginSettings;
use crate::session::errors::SessionError;
use crate::session::types::SessionRecord;
use crate::storage::ShortTermStore;

use super::cookie::set_session_cookies;

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// New expiry committed; `headers` re-issue the cookies with it
    Refreshed {
        session: SessionRecord,
        headers: HeaderMap,
    },
    /// The record expired, was dropped or was replaced before the write
    Gone,
}

/// Slide the expiry of `record` to now + the short-term lifetime.
///
/// The write only lands if the stored record still has the same identity,
/// so a refresh racing a logout cannot bring the authenticated record back.
pub async fn refresh_session(
    store: &dyn ShortTermStore,
    settings: &LoginSettings,
    record: &SessionRecord,
) -> Result<RefreshOutcome, SessionError> {
    let expires_at = settings.short_term_expiry();

    if !store.update_session_expiry(record, expires_at).await? {
        tracing::debug!("Session disappeared before it could be refreshed");
        return Ok(RefreshOutcome::Gone);
    }

    let session = SessionRecord {
        expires_at,
        ..record.clone()
    };
    let mut headers = HeaderMap::new();
    set_session_cookies(&mut headers, settings, &session)?;

    Ok(RefreshOutcome::Refreshed { session, headers })
}
