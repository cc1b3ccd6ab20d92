use http::HeaderMap;

use crate::context::GuardContext;
use crate::session::errors::SessionError;
use crate::session::types::SessionRecord;
use crate::utils::request_header;

use super::refresh::{RefreshOutcome, refresh_session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XsrfRejection {
    /// No XSRF header, or only whitespace
    MissingToken,
    /// No live session is bound to the presented token
    UnknownOrExpiredToken,
}

#[derive(Debug, Clone)]
pub enum XsrfOutcome {
    /// Session found and refreshed; `headers` carry the re-issued cookies
    Allowed {
        session: SessionRecord,
        headers: HeaderMap,
    },
    Rejected(XsrfRejection),
}

/// Gate a request on the XSRF token in the configured header.
///
/// Only the header is consulted; a token that arrives in a cookie alone
/// proves nothing about the request's origin.
#[tracing::instrument(skip_all)]
pub async fn check_xsrf(
    ctx: &GuardContext,
    request_headers: &HeaderMap,
) -> Result<XsrfOutcome, SessionError> {
    let settings = ctx.settings();

    let Some(token) = request_header(request_headers, &settings.xsrf_header_name) else {
        tracing::warn!("Rejected request without XSRF token");
        return Ok(XsrfOutcome::Rejected(XsrfRejection::MissingToken));
    };

    let Some(session) = ctx.short_term().get_session_from_xsrf(&token).await? else {
        tracing::warn!("Rejected request with unknown or expired XSRF token");
        return Ok(XsrfOutcome::Rejected(XsrfRejection::UnknownOrExpiredToken));
    };

    match refresh_session(ctx.short_term(), settings, &session).await? {
        RefreshOutcome::Refreshed { session, headers } => {
            tracing::debug!(anonymous = session.is_anonymous(), "XSRF token accepted");
            Ok(XsrfOutcome::Allowed { session, headers })
        }
        RefreshOutcome::Gone => {
            tracing::warn!("XSRF session vanished during refresh");
            Ok(XsrfOutcome::Rejected(XsrfRejection::UnknownOrExpiredToken))
        }
    }
}
