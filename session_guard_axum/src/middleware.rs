use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::HeaderMap;

use session_guard::{GuardContext, XsrfOutcome, check_xsrf};

use super::error::IntoResponseError;

/// Body of every XSRF rejection
pub const XSRF_REJECTION_MESSAGE: &str = "XSRF token missing or invalid";

/// Let the request through only when it carries the XSRF token of a live
/// session.
///
/// Use with `axum::middleware::from_fn_with_state(ctx, require_xsrf_token)`.
/// On success the refreshed [`session_guard::SessionRecord`] is placed in the
/// request extensions (see [`XsrfSession`](crate::XsrfSession)) and the
/// re-issued cookies are appended to the response.
pub async fn require_xsrf_token(
    State(ctx): State<GuardContext>,
    mut req: Request,
    next: Next,
) -> Response {
    let outcome = match check_xsrf(&ctx, req.headers()).await.into_response_error() {
        Ok(outcome) => outcome,
        Err(err) => return err.into_response(),
    };

    match outcome {
        XsrfOutcome::Allowed { session, headers } => {
            req.extensions_mut().insert(session);
            let response = next.run(req).await;
            append_headers(response, headers)
        }
        // Same answer for every reason
        XsrfOutcome::Rejected(reason) => {
            tracing::debug!("XSRF rejection: {:?}", reason);
            (StatusCode::FORBIDDEN, XSRF_REJECTION_MESSAGE).into_response()
        }
    }
}

/// Append rather than replace, so cookies set by the handler survive
fn append_headers(mut response: Response, headers: HeaderMap) -> Response {
    let target = response.headers_mut();
    for (name, value) in headers.iter() {
        target.append(name.clone(), value.clone());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::header::SET_COOKIE;

    #[test]
    fn test_append_headers_keeps_existing_cookies() {
        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .append(SET_COOKIE, "app=1".parse().unwrap());

        let mut extra = HeaderMap::new();
        extra.append(SET_COOKIE, "xsrf-token=tok-A".parse().unwrap());
        extra.append(SET_COOKIE, "auth-session-token=sess-1".parse().unwrap());

        let response = append_headers(response, extra);
        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[0], "app=1");
    }
}
