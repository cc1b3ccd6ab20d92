use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http::HeaderMap;

use session_guard::{GuardContext, issue_anonymous_xsrf_token, logout};

use super::error::IntoResponseError;

/// Revoke whatever credentials the request carries and answer with the
/// configured status, `Location` and cleared cookies.
pub async fn logout_handler(State(ctx): State<GuardContext>, headers: HeaderMap) -> Response {
    match logout(&ctx, &headers).await.into_response_error() {
        Ok(response) => {
            tracing::debug!("Logout answered with {}", response.status);
            (response.status, response.headers, response.status_message).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Hand out an anonymous XSRF token, in the body and as a cookie
pub async fn xsrf_token_handler(State(ctx): State<GuardContext>) -> Response {
    match issue_anonymous_xsrf_token(&ctx).await.into_response_error() {
        Ok((record, headers)) => (StatusCode::OK, headers, record.xsrf_token).into_response(),
        Err(err) => err.into_response(),
    }
}
