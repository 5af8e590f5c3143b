use async_trait::async_trait;
use redis::Client as RedisClient;
use tracing::debug;
use uuid::Uuid;

use super::AuthError;

/// Server-side session storage. Tokens are opaque to clients.
///
/// Carried in `AppState` as `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a session for `username` and returns its token.
    async fn create(&self, username: &str) -> Result<String, AuthError>;

    async fn lookup(&self, token: &str) -> Result<Option<String>, AuthError>;

    async fn destroy(&self, token: &str) -> Result<(), AuthError>;

    fn ttl_secs(&self) -> u64;
}

/// Sessions stored as `session:<token>` → username, expiring after the TTL.
pub struct RedisSessionStore {
    client: RedisClient,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(client: RedisClient, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, username: &str) -> Result<String, AuthError> {
        let token = Uuid::new_v4().to_string();
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(session_key(&token))
            .arg(username)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!("Created session for {username}");
        Ok(token)
    }

    async fn lookup(&self, token: &str) -> Result<Option<String>, AuthError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        Ok(redis::cmd("GET")
            .arg(session_key(token))
            .query_async::<_, Option<String>>(&mut conn)
            .await?)
    }

    async fn destroy(&self, token: &str) -> Result<(), AuthError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("DEL")
            .arg(session_key(token))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}
