//! session-guard-axum - axum integration for session-guard
//!
//! Provides the XSRF middleware, the [`XsrfSession`] extractor and a router
//! with the token and logout endpoints.

mod error;
mod handlers;
mod middleware;
mod router;
mod session;

pub use handlers::{logout_handler, xsrf_token_handler};
pub use middleware::{XSRF_REJECTION_MESSAGE, require_xsrf_token};
pub use router::{session_guard_router, session_guard_router_no_trace};
pub use session::XsrfSession;

// Re-export the core types an application needs to build a context
pub use session_guard::{
    DEFAULT_CLEANUP_INTERVAL_SECS, GuardContext, InMemoryLongTermStore, InMemoryShortTermStore,
    LongTermCookieKey, LongTermStore, LoginSettings, SessionError, SessionRecord, ShortTermStore,
    StorageError, establish_session, long_term_store_from_env, remember_login,
    short_term_store_from_env, spawn_cleanup_task,
};
