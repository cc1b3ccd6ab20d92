use axum::{extract::FromRequestParts, http::StatusCode};
use http::request::Parts;

use session_guard::SessionRecord;

/// Session admitted by [`require_xsrf_token`](crate::require_xsrf_token)
///
/// Extracting it from a route without that middleware is a wiring mistake
/// and answers 500.
///
/// ```no_run
/// use session_guard_axum::XsrfSession;
///
/// async fn whoami(XsrfSession(session): XsrfSession) -> String {
///     session.user_id.unwrap_or_else(|| "anonymous".to_string())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct XsrfSession(pub SessionRecord);

impl<S> FromRequestParts<S> for XsrfSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionRecord>()
            .cloned()
            .map(XsrfSession)
            .ok_or_else(|| {
                tracing::error!("XsrfSession extracted without the XSRF middleware");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "XSRF middleware not installed",
                )
            })
    }
}

impl XsrfSession {
    pub fn user_id(&self) -> Option<&str> {
        self.0.user_id.as_deref()
    }
}
