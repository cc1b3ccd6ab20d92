//! Routes for obtaining an XSRF token and logging out

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use session_guard::GuardContext;

use super::handlers::{logout_handler, xsrf_token_handler};

/// Router with `GET /xsrf-token` and `GET|POST /logout`, wrapped in HTTP tracing
///
/// Logout reads the XSRF token from the cookie when the header is missing,
/// and SameSite=Lax cookies ride along on cross-site top-level navigations.
/// Any other site can therefore log a user out by linking to `GET /logout`.
/// Apps that need to prevent that should mount their own router with
/// `logout_handler` on `POST` only.
pub fn session_guard_router(ctx: GuardContext) -> Router {
    session_guard_router_no_trace(ctx).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same routes without the tracing layer, for apps that bring their own
pub fn session_guard_router_no_trace(ctx: GuardContext) -> Router {
    Router::new()
        .route("/xsrf-token", get(xsrf_token_handler))
        .route("/logout", get(logout_handler).post(logout_handler))
        .with_state(ctx)
}
