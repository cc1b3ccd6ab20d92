use chrono::{DateTime, Utc};
use ring::pbkdf2;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::utils::{base64url_decode, base64url_encode};

static PBKDF2_ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;
const PBKDF2_ITERATIONS: NonZeroU32 = NonZeroU32::new(10_000).unwrap();
const TOKEN_HASH_LEN: usize = 32;

/// Persistent "remember me" credential for one device
///
/// The series stays stable across token rotations; only `token_hash`
/// changes when the issuer rotates the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermLoginRecord {
    pub series: String,
    /// base64url PBKDF2-HMAC-SHA256 of the token, salted with the series
    pub token_hash: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl LongTermLoginRecord {
    pub fn new(series: impl Into<String>, token: &str, user_id: impl Into<String>) -> Self {
        let series = series.into();
        let token_hash = hash_token(&series, token);
        Self {
            series,
            token_hash,
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Constant-time check of `token` against the stored hash
    pub fn verify_token(&self, token: &str) -> bool {
        let Ok(expected) = base64url_decode(&self.token_hash) else {
            tracing::warn!("Stored token hash for series is not valid base64url");
            return false;
        };

        pbkdf2::verify(
            PBKDF2_ALGORITHM,
            PBKDF2_ITERATIONS,
            self.series.as_bytes(),
            token.as_bytes(),
            &expected,
        )
        .is_ok()
    }
}

fn hash_token(series: &str, token: &str) -> String {
    let mut out = [0u8; TOKEN_HASH_LEN];
    pbkdf2::derive(
        PBKDF2_ALGORITHM,
        PBKDF2_ITERATIONS,
        series.as_bytes(),
        token.as_bytes(),
        &mut out,
    );
    base64url_encode(&out)
}
