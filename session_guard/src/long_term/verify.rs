use crate::context::GuardContext;
use crate::session::SessionError;

use super::cookie::LongTermCookie;
use super::types::LongTermLoginRecord;

/// What to do when a cookie names a live series but carries the wrong token
///
/// A mismatch usually means the cookie was copied and one copy has already
/// rotated the token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenMismatchPolicy {
    /// Reject the cookie, keep the series
    Ignore,
    /// Reject the cookie and delete the series, logging out every copy
    #[default]
    DropSeries,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LongTermVerification {
    Verified(LongTermLoginRecord),
    /// Unparseable or forged cookie
    Malformed,
    UnknownSeries,
    TokenMismatch,
    /// Long-term logins are disabled for this context
    StoreNotConfigured,
}

impl LongTermVerification {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Verified(record) => Some(&record.user_id),
            _ => None,
        }
    }
}

/// Check a raw long-term cookie against the store.
#[tracing::instrument(skip_all)]
pub async fn verify_long_term_login(
    ctx: &GuardContext,
    raw_cookie: &str,
    policy: TokenMismatchPolicy,
) -> Result<LongTermVerification, SessionError> {
    let Some(store) = ctx.long_term() else {
        return Ok(LongTermVerification::StoreNotConfigured);
    };

    let cookie = LongTermCookie::parse(raw_cookie, ctx.cookie_key());
    if !cookie.is_valid() {
        return Ok(LongTermVerification::Malformed);
    }

    let Some(record) = store.get_long_term_login(cookie.series()).await? else {
        tracing::debug!("Long-term cookie names an unknown series");
        return Ok(LongTermVerification::UnknownSeries);
    };

    if record.verify_token(cookie.token()) {
        return Ok(LongTermVerification::Verified(record));
    }

    tracing::warn!(
        user_id = %record.user_id,
        ?policy,
        "Long-term token mismatch for a live series"
    );
    if policy == TokenMismatchPolicy::DropSeries {
        store.drop_long_term_login(&record).await?;
    }
    Ok(LongTermVerification::TokenMismatch)
}
