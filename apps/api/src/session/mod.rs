//! Session lifecycle with injected time and storage.
//!
//! A session expires when idle for longer than `idle_timeout` or once it is
//! older than `max_lifetime`, whichever comes first. Every successful
//! validation slides `last_seen` forward.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Absolute expiry; idle expiry comes on top of this.
    pub expires_at: DateTime<Utc>,
}

/// Storage backend for sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> Result<(), AppError>;

    async fn get(&self, token: &str) -> Result<Option<Session>, AppError>;

    async fn update(&self, session: &Session) -> Result<(), AppError>;

    /// Returns whether a session was removed.
    async fn remove(&self, token: &str) -> Result<bool, AppError>;

    async fn list(&self) -> Result<Vec<Session>, AppError>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn update(&self, session: &Session) -> Result<(), AppError> {
        if let Some(stored) = self.sessions.write().await.get_mut(&session.token) {
            *stored = session.clone();
        }
        Ok(())
    }

    async fn remove(&self, token: &str) -> Result<bool, AppError> {
        Ok(self.sessions.write().await.remove(token).is_some())
    }

    async fn list(&self) -> Result<Vec<Session>, AppError> {
        Ok(self.sessions.read().await.values().cloned().collect())
    }
}

pub struct SessionManager {
    clock: Arc<dyn Clock>,
    store: Arc<dyn SessionStore>,
    idle_timeout: Duration,
    max_lifetime: Duration,
}

impl SessionManager {
    pub fn new(
        clock: Arc<dyn Clock>,
        store: Arc<dyn SessionStore>,
        idle_timeout: Duration,
        max_lifetime: Duration,
    ) -> Self {
        Self {
            clock,
            store,
            idle_timeout,
            max_lifetime,
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now >= session.expires_at || now - session.last_seen >= self.idle_timeout
    }

    /// Issues a fresh random token for `user_id`. Expired sessions are
    /// purged first so abandoned tokens do not accumulate.
    pub async fn start(&self, user_id: Uuid) -> Result<Session, AppError> {
        self.purge_expired().await?;
        let now = self.clock.now();
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let session = Session {
            token,
            user_id,
            created_at: now,
            last_seen: now,
            expires_at: now + self.max_lifetime,
        };
        self.store.insert(session.clone()).await?;
        info!(%user_id, "Session started");
        Ok(session)
    }

    /// Resolves a token to a live session and slides its idle window.
    pub async fn validate(&self, token: &str) -> Result<Session, AppError> {
        let mut session = self
            .store
            .get(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let now = self.clock.now();
        if self.is_expired(&session, now) {
            self.store.remove(token).await?;
            debug!(user_id = %session.user_id, "Expired session rejected");
            return Err(AppError::Unauthorized);
        }

        session.last_seen = now;
        self.store.update(&session).await?;
        Ok(session)
    }

    /// Revokes the session. Unknown tokens are `Unauthorized`.
    pub async fn end(&self, token: &str) -> Result<(), AppError> {
        if self.store.remove(token).await? {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }

    /// Drops every expired session and returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize, AppError> {
        let now = self.clock.now();
        let mut removed = 0;
        for session in self.store.list().await? {
            if self.is_expired(&session, now) && self.store.remove(&session.token).await? {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}
