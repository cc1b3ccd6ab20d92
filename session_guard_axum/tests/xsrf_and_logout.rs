//! End-to-end checks of the XSRF middleware and the logout endpoint

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    middleware::from_fn_with_state,
    routing::post,
};
use chrono::{DateTime, Duration, Utc};
use http::{
    Request, StatusCode,
    header::{COOKIE, LOCATION, SET_COOKIE},
};
use std::sync::Arc;
use tower::ServiceExt;

use session_guard::{LongTermCookie, LongTermLoginRecord};
use session_guard_axum::{
    GuardContext, InMemoryLongTermStore, InMemoryShortTermStore, LoginSettings, LongTermCookieKey,
    LongTermStore, SessionRecord, ShortTermStore, StorageError, XSRF_REJECTION_MESSAGE,
    XsrfSession, logout_handler, require_xsrf_token, session_guard_router,
    session_guard_router_no_trace,
};

struct TestApp {
    router: Router,
    short_term: Arc<InMemoryShortTermStore>,
    long_term: Arc<InMemoryLongTermStore>,
}

fn cookie_key() -> LongTermCookieKey {
    LongTermCookieKey::new("integration-secret")
}

async fn whoami(session: XsrfSession) -> String {
    session.user_id().unwrap_or("anonymous").to_string()
}

fn app_for(ctx: GuardContext) -> Router {
    let protected = Router::new()
        .route("/api/whoami", post(whoami))
        .route_layer(from_fn_with_state(ctx.clone(), require_xsrf_token));

    Router::new()
        .merge(protected)
        .nest("/auth", session_guard_router_no_trace(ctx))
}

fn test_app() -> TestApp {
    let short_term = Arc::new(InMemoryShortTermStore::new());
    let long_term = Arc::new(InMemoryLongTermStore::new());
    let ctx = GuardContext::new(LoginSettings::default(), short_term.clone())
        .with_long_term_store(long_term.clone())
        .with_cookie_key(cookie_key());

    TestApp {
        router: app_for(ctx),
        short_term,
        long_term,
    }
}

fn in_future(seconds: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(seconds)
}

async fn seed_alice(app: &TestApp) {
    app.short_term
        .add_session(&SessionRecord::authenticated(
            "alice",
            "sess-1",
            "tok-A",
            in_future(300),
        ))
        .await
        .unwrap();
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn whoami_request(xsrf: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/api/whoami");
    if let Some(token) = xsrf {
        builder = builder.header("X-XSRF-Token", token);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_request_without_xsrf_header_is_forbidden() {
    let app = test_app();
    seed_alice(&app).await;

    // The token only in a cookie is not enough
    let request = Request::builder()
        .method("POST")
        .uri("/api/whoami")
        .header(COOKIE, "xsrf-token=tok-A; auth-session-token=sess-1")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, XSRF_REJECTION_MESSAGE);
}

#[tokio::test]
async fn test_unknown_xsrf_token_is_forbidden() {
    let app = test_app();

    let response = app
        .router
        .oneshot(whoami_request(Some("tok-unknown")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_valid_xsrf_token_reaches_handler_and_refreshes_cookies() {
    let app = test_app();
    seed_alice(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(whoami_request(Some("tok-A")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("auth-session-token=sess-1;")));
    assert!(cookies.iter().any(|c| c.starts_with("xsrf-token=tok-A;")));
    assert_eq!(body_text(response).await, "alice");

    let stored = app.short_term.get_session_from_xsrf("tok-A").await.unwrap().unwrap();
    assert!(stored.expires_at > in_future(800));
}

#[tokio::test]
async fn test_logout_then_token_is_anonymous() {
    // Given alice is logged in under tok-A / sess-1
    let app = test_app();
    seed_alice(&app).await;

    // When she logs out presenting both credentials
    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header("X-XSRF-Token", "tok-A")
        .header(COOKIE, "auth-session-token=sess-1")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    // Then she is redirected to / with the session cookie cleared
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| {
        c.starts_with("auth-session-token=;")
            && c.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT")
    }));
    assert_eq!(body_text(response).await, "Found");

    // And tok-A still passes the XSRF check, but only as an anonymous session
    let response = app
        .router
        .oneshot(whoami_request(Some("tok-A")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "anonymous");
    assert_eq!(
        app.short_term.get_session_from_cookie("sess-1").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_get_logout_with_cookies_only() {
    // A plain navigation carries cookies but no XSRF header
    let app = test_app();
    seed_alice(&app).await;

    let request = Request::builder()
        .uri("/auth/logout")
        .header(COOKIE, "xsrf-token=tok-A; auth-session-token=sess-1")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("auth-session-token=;"))
    );
    let stored = app
        .short_term
        .get_session_from_xsrf("tok-A")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_anonymous());
}

#[tokio::test]
async fn test_post_only_logout_rejects_navigation() {
    let short_term = Arc::new(InMemoryShortTermStore::new());
    short_term
        .add_session(&SessionRecord::authenticated(
            "alice",
            "sess-1",
            "tok-A",
            in_future(300),
        ))
        .await
        .unwrap();
    let ctx = GuardContext::new(LoginSettings::default(), short_term.clone())
        .with_cookie_key(cookie_key());
    let router = Router::new()
        .route("/logout", post(logout_handler))
        .with_state(ctx);

    let request = Request::builder()
        .uri("/logout")
        .header(COOKIE, "xsrf-token=tok-A; auth-session-token=sess-1")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let stored = short_term.get_session_from_xsrf("tok-A").await.unwrap().unwrap();
    assert_eq!(stored.user_id.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_logout_without_credentials() {
    let app = test_app();

    let request = Request::builder()
        .uri("/auth/logout")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_logout_revokes_long_term_login() {
    let app = test_app();
    let (cookie, wire) = LongTermCookie::issue(&cookie_key()).unwrap();
    app.long_term
        .add_long_term_login(&LongTermLoginRecord::new(
            cookie.series(),
            cookie.token(),
            "alice",
        ))
        .await
        .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(COOKIE, format!("auth-long-term-token={wire}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("auth-long-term-token=;") && c.contains("Max-Age=0"))
    );
    assert!(
        app.long_term
            .get_long_term_login(cookie.series())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_issued_xsrf_token_is_accepted() {
    let app = test_app();

    let request = Request::builder()
        .uri("/auth/xsrf-token")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response)[0].starts_with("xsrf-token="));
    let token = body_text(response).await;

    let response = app
        .router
        .oneshot(whoami_request(Some(token.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "anonymous");
}

#[tokio::test]
async fn test_traced_router_serves_logout() {
    let ctx = GuardContext::new(
        LoginSettings {
            logout_redirect_url: String::new(),
            logout_status_code: StatusCode::OK,
            logout_status_message: "Logged out".to_string(),
            ..LoginSettings::default()
        },
        Arc::new(InMemoryShortTermStore::new()),
    )
    .with_cookie_key(cookie_key());

    let request = Request::builder()
        .uri("/logout")
        .body(Body::empty())
        .unwrap();
    let response = session_guard_router(ctx).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(LOCATION).is_none());
    assert_eq!(body_text(response).await, "Logged out");
}

/// Short-term store that is always down
struct FailingStore;

fn unavailable() -> StorageError {
    StorageError::Storage("store unavailable".to_string())
}

#[async_trait]
impl ShortTermStore for FailingStore {
    async fn get_session_from_xsrf(
        &self,
        _token: &str,
    ) -> Result<Option<SessionRecord>, StorageError> {
        Err(unavailable())
    }

    async fn get_session_from_cookie(
        &self,
        _cookie: &str,
    ) -> Result<Option<SessionRecord>, StorageError> {
        Err(unavailable())
    }

    async fn add_session(&self, _record: &SessionRecord) -> Result<(), StorageError> {
        Err(unavailable())
    }

    async fn drop_session(&self, _record: &SessionRecord) -> Result<(), StorageError> {
        Err(unavailable())
    }

    async fn update_session_expiry(
        &self,
        _record: &SessionRecord,
        _expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        Err(unavailable())
    }

    async fn purge_expired(&self) -> Result<usize, StorageError> {
        Err(unavailable())
    }
}

#[tokio::test]
async fn test_storage_failure_is_500_not_403() {
    let ctx = GuardContext::new(LoginSettings::default(), Arc::new(FailingStore))
        .with_cookie_key(cookie_key());
    let router = app_for(ctx);

    let response = router
        .clone()
        .oneshot(whoami_request(Some("tok-A")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let request = Request::builder()
        .uri("/auth/logout")
        .header("X-XSRF-Token", "tok-A")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
