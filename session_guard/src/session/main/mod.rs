mod cookie;
mod establish;
mod logout;
mod refresh;
mod xsrf;

#[cfg(test)]
pub(crate) mod test_utils;

pub use establish::{establish_session, issue_anonymous_xsrf_token, remember_login};
pub use logout::{LogoutResponse, logout};
pub use refresh::{RefreshOutcome, refresh_session};
pub use xsrf::{XsrfOutcome, XsrfRejection, check_xsrf};
