mod errors;
mod main;
mod types;

pub use errors::SessionError;
pub use main::{
    LogoutResponse, RefreshOutcome, XsrfOutcome, XsrfRejection, check_xsrf, establish_session,
    issue_anonymous_xsrf_token, logout, refresh_session, remember_login,
};
pub use types::SessionRecord;

#[cfg(test)]
pub(crate) use main::test_utils;
