mod cookie;
mod types;
mod verify;

pub use cookie::{LongTermCookie, LongTermCookieKey};
pub use types::LongTermLoginRecord;
pub use verify::{LongTermVerification, TokenMismatchPolicy, verify_long_term_login};
