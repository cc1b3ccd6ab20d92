//! session-guard - session, XSRF and long-term login lifecycle
//!
//! Server-tracked XSRF tokens bound to short-term sessions, sliding session
//! expiry, "remember me" series/token cookies and a logout that revokes
//! every credential a request presents.
//!
//! All state lives behind the [`ShortTermStore`] and [`LongTermStore`]
//! traits and is handed to the protocol functions through a [`GuardContext`].

mod config;
mod context;
mod long_term;
mod session;
mod storage;
mod utils;

pub use config::LoginSettings;
pub use context::GuardContext;

pub use long_term::{
    LongTermCookie, LongTermCookieKey, LongTermLoginRecord, LongTermVerification,
    TokenMismatchPolicy, verify_long_term_login,
};

pub use session::{
    LogoutResponse, RefreshOutcome, SessionError, SessionRecord, XsrfOutcome, XsrfRejection,
    check_xsrf, establish_session, issue_anonymous_xsrf_token, logout, refresh_session,
    remember_login,
};

pub use storage::{
    DEFAULT_CLEANUP_INTERVAL_SECS, InMemoryLongTermStore, InMemoryShortTermStore, LongTermStore,
    PostgresLongTermStore, RedisShortTermStore, ShortTermStore, SqliteLongTermStore,
    StorageError, StoreSelection, build_long_term_store, build_short_term_store,
    long_term_store_from_env, short_term_store_from_env, spawn_cleanup_task,
};

pub use utils::{UtilError, gen_random_string};
