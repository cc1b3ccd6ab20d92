mod handlers;
mod server;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use dotenvy::dotenv;
use std::time::Duration;

use session_guard_axum::{
    DEFAULT_CLEANUP_INTERVAL_SECS, GuardContext, LoginSettings, long_term_store_from_env,
    require_xsrf_token, session_guard_router, short_term_store_from_env, spawn_cleanup_task,
};

use handlers::{index, login, whoami};
use server::{init_tracing, spawn_http_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("demo_guard");

    let short_term = short_term_store_from_env().await?;
    let mut ctx = GuardContext::new(LoginSettings::from_env(), short_term.clone());
    if let Some(long_term) = long_term_store_from_env().await? {
        ctx = ctx.with_long_term_store(long_term);
    }
    tracing::info!("Session guard ready: {:?}", ctx);

    let cleanup = spawn_cleanup_task(
        short_term,
        Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
    );

    let protected = Router::new()
        .route("/api/whoami", post(whoami))
        .route_layer(from_fn_with_state(ctx.clone(), require_xsrf_token));

    let app = Router::new()
        .route("/", get(index))
        .route("/login/{user}", post(login))
        .with_state(ctx.clone())
        .merge(protected)
        .nest("/auth", session_guard_router(ctx));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    spawn_http_server(port, app).await?;
    cleanup.abort();
    Ok(())
}
