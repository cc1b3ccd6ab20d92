use std::sync::Arc;

use crate::config::LoginSettings;
use crate::long_term::LongTermCookieKey;
use crate::storage::{LongTermStore, ShortTermStore};

/// Everything the XSRF check and the logout protocol need, passed explicitly
///
/// Cloning is cheap; every part is reference counted.
#[derive(Clone)]
pub struct GuardContext {
    settings: Arc<LoginSettings>,
    short_term: Arc<dyn ShortTermStore>,
    long_term: Option<Arc<dyn LongTermStore>>,
    cookie_key: LongTermCookieKey,
}

impl GuardContext {
    /// Context without a long-term store, keyed from `AUTH_SERVER_SECRET`
    pub fn new(settings: LoginSettings, short_term: Arc<dyn ShortTermStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            short_term,
            long_term: None,
            cookie_key: LongTermCookieKey::from_env(),
        }
    }

    pub fn with_long_term_store(mut self, store: Arc<dyn LongTermStore>) -> Self {
        self.long_term = Some(store);
        self
    }

    pub fn with_cookie_key(mut self, key: LongTermCookieKey) -> Self {
        self.cookie_key = key;
        self
    }

    pub fn settings(&self) -> &LoginSettings {
        &self.settings
    }

    pub fn short_term(&self) -> &dyn ShortTermStore {
        self.short_term.as_ref()
    }

    /// `None` when long-term logins are disabled
    pub fn long_term(&self) -> Option<&dyn LongTermStore> {
        self.long_term.as_deref()
    }

    pub fn cookie_key(&self) -> &LongTermCookieKey {
        &self.cookie_key
    }
}

impl std::fmt::Debug for GuardContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardContext")
            .field("settings", &self.settings)
            .field("long_term", &self.long_term.is_some())
            .finish_non_exhaustive()
    }
}
