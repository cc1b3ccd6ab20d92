//! Wire codec for the long-term ("remember me") cookie
//!
//! The cookie value is `<series>.<token>.<tag>`, every part base64url without
//! padding. `series` and `token` are 32 random bytes each; `tag` is an
//! HMAC-SHA256 over `<series>.<token>` keyed with the server secret, so a
//! forged or truncated cookie is rejected before any store lookup.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::utils::{UtilError, base64url_decode, base64url_encode, gen_random_string};

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: char = '.';
const RANDOM_PART_BYTES: usize = 32;
/// base64url length of [`RANDOM_PART_BYTES`]
const RANDOM_PART_LEN: usize = 43;

const DEFAULT_SECRET: &str = "default_secret_key_change_in_production";

/// HMAC key used to tag long-term cookies
#[derive(Clone)]
pub struct LongTermCookieKey(Arc<[u8]>);

impl LongTermCookieKey {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(Arc::from(secret.as_ref()))
    }

    /// Read the key from `AUTH_SERVER_SECRET`
    pub fn from_env() -> Self {
        match std::env::var("AUTH_SERVER_SECRET") {
            Ok(secret) if !secret.is_empty() => Self::new(secret),
            _ => {
                tracing::warn!("AUTH_SERVER_SECRET is not set, using the built-in development key");
                Self::new(DEFAULT_SECRET)
            }
        }
    }

    fn tag(&self, series: &str, token: &str) -> Vec<u8> {
        // HMAC accepts keys of any length
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.0) else {
            return Vec::new();
        };
        mac.update(series.as_bytes());
        mac.update(&[SEPARATOR as u8]);
        mac.update(token.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

impl fmt::Debug for LongTermCookieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LongTermCookieKey(..)")
    }
}

/// Parsed long-term cookie
///
/// Parsing never fails: a malformed or forged value yields a cookie whose
/// [`is_valid`](Self::is_valid) is `false` and whose series and token are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongTermCookie {
    series: String,
    token: String,
    valid: bool,
}

impl LongTermCookie {
    pub fn parse(raw: &str, key: &LongTermCookieKey) -> Self {
        match Self::decode(raw.trim(), key) {
            Some(cookie) => cookie,
            None => {
                tracing::debug!("Rejected malformed long-term cookie");
                Self::invalid()
            }
        }
    }

    /// Mint a fresh series and token, returning the cookie and its wire value
    pub fn issue(key: &LongTermCookieKey) -> Result<(Self, String), UtilError> {
        let series = gen_random_string(RANDOM_PART_BYTES)?;
        Self::with_series(series, key)
    }

    /// Keep the series, replace the token
    pub fn rotate(&self, key: &LongTermCookieKey) -> Result<(Self, String), UtilError> {
        if !self.valid {
            return Err(UtilError::Format(
                "Cannot rotate an invalid long-term cookie".to_string(),
            ));
        }
        Self::with_series(self.series.clone(), key)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    fn with_series(series: String, key: &LongTermCookieKey) -> Result<(Self, String), UtilError> {
        let token = gen_random_string(RANDOM_PART_BYTES)?;
        let tag = base64url_encode(&key.tag(&series, &token));
        let wire = format!("{series}{SEPARATOR}{token}{SEPARATOR}{tag}");
        let cookie = Self {
            series,
            token,
            valid: true,
        };
        Ok((cookie, wire))
    }

    fn invalid() -> Self {
        Self {
            series: String::new(),
            token: String::new(),
            valid: false,
        }
    }

    fn decode(raw: &str, key: &LongTermCookieKey) -> Option<Self> {
        let mut parts = raw.split(SEPARATOR);
        let (series, token, tag) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        if !is_random_part(series) || !is_random_part(token) {
            return None;
        }

        let tag = base64url_decode(tag).ok()?;
        let expected = key.tag(series, token);
        if !bool::from(tag.ct_eq(&expected)) {
            return None;
        }

        Some(Self {
            series: series.to_string(),
            token: token.to_string(),
            valid: true,
        })
    }
}

fn is_random_part(part: &str) -> bool {
    part.len() == RANDOM_PART_LEN
        && base64url_decode(part).is_ok_and(|bytes| bytes.len() == RANDOM_PART_BYTES)
}
