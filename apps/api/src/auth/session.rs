//! Bearer-token sessions.
//!
//! Tokens are opaque: 32 random bytes, URL-safe base64. The store maps a
//! token to its user id until the TTL runs out or the user logs out.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use redis::aio::MultiplexedConnection;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, user_id: Uuid, ttl_secs: u64) -> Result<Session, AppError>;
    /// The user id behind a live token, or `None` if unknown or expired.
    async fn resolve(&self, token: &str) -> Result<Option<Uuid>, AppError>;
    async fn revoke(&self, token: &str) -> Result<(), AppError>;
}

pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn expiry(ttl_secs: u64) -> DateTime<Utc> {
    let now = Utc::now();
    i64::try_from(ttl_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

/// Sessions in Redis, expired by Redis itself (`SET .. EX`).
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
}

impl RedisSessionStore {
    pub async fn connect(client: &redis::Client) -> Result<Self, AppError> {
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis session store connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: Uuid, ttl_secs: u64) -> Result<Session, AppError> {
        let token = generate_session_token();
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(session_key(&token))
            .arg(user_id.to_string())
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await?;

        Ok(Session {
            token,
            user_id,
            expires_at: expiry(ttl_secs),
        })
    }

    async fn resolve(&self, token: &str) -> Result<Option<Uuid>, AppError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(session_key(token))
            .query_async(&mut conn)
            .await?;
        // A value that is not a UUID was not written by us; treat as no session.
        Ok(value.and_then(|v| Uuid::parse_str(&v).ok()))
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("DEL")
            .arg(session_key(token))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

/// In-process sessions for the memory backend and tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (Uuid, DateTime<Utc>)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: Uuid, ttl_secs: u64) -> Result<Session, AppError> {
        let token = generate_session_token();
        let expires_at = expiry(ttl_secs);
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        // Tokens that are never presented again would otherwise linger.
        sessions.retain(|_, (_, expires)| *expires > now);
        sessions.insert(token.clone(), (user_id, expires_at));
        Ok(Session {
            token,
            user_id,
            expires_at,
        })
    }

    async fn resolve(&self, token: &str) -> Result<Option<Uuid>, AppError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token).copied() {
            Some((user_id, expires_at)) if expires_at > Utc::now() => Ok(Some(user_id)),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe_and_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn memory_sessions_resolve_until_revoked() {
        let store = MemorySessionStore::new();
        let user_id = Uuid::new_v4();
        let session = store.create(user_id, 60).await.unwrap();

        assert_eq!(store.resolve(&session.token).await.unwrap(), Some(user_id));
        store.revoke(&session.token).await.unwrap();
        assert_eq!(store.resolve(&session.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn creating_a_session_prunes_expired_ones() {
        let store = MemorySessionStore::new();
        store.create(Uuid::new_v4(), 0).await.unwrap();
        store.create(Uuid::new_v4(), 0).await.unwrap();
        let live = store.create(Uuid::new_v4(), 60).await.unwrap();

        let sessions = store.sessions.read().await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&live.token));
    }

    #[tokio::test]
    async fn zero_ttl_sessions_are_already_expired() {
        let store = MemorySessionStore::new();
        let session = store.create(Uuid::new_v4(), 0).await.unwrap();
        assert_eq!(store.resolve(&session.token).await.unwrap(), None);
    }
}
