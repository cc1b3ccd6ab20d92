use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Script};
use std::sync::LazyLock;

use crate::session::SessionRecord;

use super::errors::StorageError;
use super::traits::ShortTermStore;

const KEY_PREFIX: &str = "session";

/// Identity marker shared by the scripts: `n` for null, `s:<value>` otherwise.
const IDENTITY_HELPER: &str = r#"
local function ident(v)
    if v == nil or v == cjson.null then return 'n' end
    return 's:' .. v
end
"#;

/// KEYS[1] = xsrf key, KEYS[2] = cookie key (optional)
/// ARGV[1] = user identity, ARGV[2] = cookie identity, ARGV[3] = xsrf token
static DROP_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(&format!(
        r#"{IDENTITY_HELPER}
local current = redis.call('GET', KEYS[1])
if not current then return 0 end
local rec = cjson.decode(current)
if ident(rec['user_id']) ~= ARGV[1] or ident(rec['cookie']) ~= ARGV[2] then return 0 end
redis.call('DEL', KEYS[1])
if KEYS[2] and redis.call('GET', KEYS[2]) == ARGV[3] then
    redis.call('DEL', KEYS[2])
end
return 1
"#
    ))
});

/// KEYS as for [`DROP_SCRIPT`]
/// ARGV[1..3] as for [`DROP_SCRIPT`], ARGV[4] = new record json, ARGV[5] = ttl seconds
static UPDATE_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(&format!(
        r#"{IDENTITY_HELPER}
local current = redis.call('GET', KEYS[1])
if not current then return 0 end
local rec = cjson.decode(current)
if ident(rec['user_id']) ~= ARGV[1] or ident(rec['cookie']) ~= ARGV[2] then return 0 end
redis.call('SET', KEYS[1], ARGV[4], 'EX', ARGV[5])
if KEYS[2] then
    redis.call('SET', KEYS[2], ARGV[3], 'EX', ARGV[5])
end
return 1
"#
    ))
});

/// Short-term store backed by Redis
///
/// Records are stored as JSON under `session:xsrf:<token>` with a cookie index
/// `session:cookie:<cookie> -> <token>`; both keys expire with the record.
pub struct RedisShortTermStore {
    client: redis::Client,
}

impl RedisShortTermStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    /// Verify the server is reachable
    pub async fn init(&self) -> Result<(), StorageError> {
        let _conn = self.client.get_multiplexed_async_connection().await?;
        Ok(())
    }

    fn xsrf_key(token: &str) -> String {
        format!("{KEY_PREFIX}:xsrf:{token}")
    }

    fn cookie_key(cookie: &str) -> String {
        format!("{KEY_PREFIX}:cookie:{cookie}")
    }

    fn identity(value: Option<&str>) -> String {
        match value {
            Some(v) => format!("s:{v}"),
            None => "n".to_string(),
        }
    }

    /// Whole seconds until `expires_at`, or `None` when already past
    fn ttl_seconds(expires_at: DateTime<Utc>) -> Option<u64> {
        let remaining = (expires_at - Utc::now()).num_seconds();
        u64::try_from(remaining).ok().filter(|ttl| *ttl > 0)
    }

    fn identity_invocation<'a>(
        script: &'a Script,
        record: &SessionRecord,
    ) -> redis::ScriptInvocation<'a> {
        let mut invocation = script.prepare_invoke();
        invocation.key(Self::xsrf_key(&record.xsrf_token));
        if let Some(cookie) = &record.cookie {
            invocation.key(Self::cookie_key(cookie));
        }
        invocation
            .arg(Self::identity(record.user_id.as_deref()))
            .arg(Self::identity(record.cookie.as_deref()))
            .arg(&record.xsrf_token);
        invocation
    }
}

#[async_trait]
impl ShortTermStore for RedisShortTermStore {
    async fn get_session_from_xsrf(
        &self,
        token: &str,
    ) -> Result<Option<SessionRecord>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(Self::xsrf_key(token)).await?;

        let Some(value) = value else {
            return Ok(None);
        };
        let record: SessionRecord = serde_json::from_str(&value)?;
        // Key TTLs have one-second granularity
        Ok(Some(record).filter(|record| !record.is_expired()))
    }

    async fn get_session_from_cookie(
        &self,
        cookie: &str,
    ) -> Result<Option<SessionRecord>, StorageError> {
        let token: Option<String> = {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.get(Self::cookie_key(cookie)).await?
        };

        let Some(token) = token else {
            return Ok(None);
        };
        Ok(self
            .get_session_from_xsrf(&token)
            .await?
            .filter(|record| record.cookie.as_deref() == Some(cookie)))
    }

    async fn add_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let Some(ttl) = Self::ttl_seconds(record.expires_at) else {
            tracing::debug!("Not storing a session record that is already expired");
            return Ok(());
        };

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value = serde_json::to_string(record)?;

        let mut pipe = redis::pipe();
        pipe.atomic().set_ex(Self::xsrf_key(&record.xsrf_token), value, ttl);
        if let Some(cookie) = &record.cookie {
            pipe.set_ex(Self::cookie_key(cookie), &record.xsrf_token, ttl);
        }
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn drop_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let dropped: i64 = Self::identity_invocation(&DROP_SCRIPT, record)
            .invoke_async(&mut conn)
            .await?;

        if dropped == 0 {
            tracing::debug!("Session to drop is already gone or replaced");
        }
        Ok(())
    }

    async fn update_session_expiry(
        &self,
        record: &SessionRecord,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let Some(ttl) = Self::ttl_seconds(expires_at) else {
            return Ok(false);
        };

        let updated = SessionRecord {
            expires_at,
            ..record.clone()
        };
        let value = serde_json::to_string(&updated)?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut invocation = Self::identity_invocation(&UPDATE_SCRIPT, record);
        invocation.arg(value).arg(ttl);
        let result: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(result == 1)
    }

    async fn purge_expired(&self) -> Result<usize, StorageError> {
        // Redis expires keys on its own
        Ok(0)
    }
}
