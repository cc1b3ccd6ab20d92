use http::StatusCode;
use session_guard::SessionError;

/// Helper trait for converting errors to a standard response error format
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            tracing::error!("Session guard failure: {}", e);
            // XSRF and logout outcomes are not errors; whatever is left is ours
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
    }
}
