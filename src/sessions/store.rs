//! In-memory session store.
//!
//! # Responsibilities
//! - Create sessions with random ids
//! - Resolve the session named by a request's cookie
//! - Refresh expiry on save and hand back the matching `Set-Cookie`
//! - Collect expired sessions in the background
//!
//! # Design Decisions
//! - Sessions live in a `DashMap` shared by every clone of the store
//! - An expired session is treated as absent even before GC removes it
//! - Handlers own a copy of the session; changes are visible only after `save`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::observability::metrics;
use crate::sessions::cookie::{self, SetCookie};
use crate::sessions::SessionError;

const SESSION_ID_LEN: usize = 32;

fn new_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .filter(u8::is_ascii_alphabetic)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Per-visitor state keyed by a random id.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    data: HashMap<String, Value>,
    expires: SystemTime,
}

impl Session {
    fn new(timeout: Duration) -> Self {
        Self {
            id: new_session_id(),
            data: HashMap::new(),
            expires: SystemTime::now() + timeout,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// String value stored under `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn del(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Whole seconds until expiry; negative once expired.
    pub fn expires_in(&self) -> i64 {
        match self.expires.duration_since(SystemTime::now()) {
            Ok(left) => left.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        }
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires
    }
}

/// Cookie-addressed session store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    cookie_name: Arc<str>,
    timeout: Duration,
    sessions: Arc<DashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(cookie_name: &str, timeout: Duration) -> Self {
        Self {
            cookie_name: Arc::from(cookie_name),
            timeout,
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.cookie_name, Duration::from_secs(config.timeout_secs))
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// A fresh session. It is not stored until `save`.
    pub fn new_session(&self) -> Session {
        Session::new(self.timeout)
    }

    /// Session named by the request's cookie, if it exists and is live.
    pub fn get(&self, headers: &HeaderMap) -> Option<Session> {
        let id = cookie::get_cookie(headers, &self.cookie_name)?;
        let session = self.sessions.get(&id).map(|entry| entry.value().clone())?;
        if session.is_expired() {
            self.evict_expired(&id);
            return None;
        }
        Some(session)
    }

    /// Remove `id` only while the stored session is expired.
    fn evict_expired(&self, id: &str) -> bool {
        self.sessions
            .remove_if(id, |_, session| session.is_expired())
            .is_some()
    }

    /// Store `session` with a refreshed expiry and return its cookie.
    pub fn save(&self, mut session: Session) -> Result<SetCookie, SessionError> {
        session.expires = SystemTime::now() + self.timeout;
        let value = cookie::build(&self.cookie_name, &session.id, self.timeout)?;
        self.sessions.insert(session.id.clone(), session);
        metrics::record_active_sessions(self.sessions.len());
        Ok(SetCookie(value))
    }

    /// Drop the request's session and return a cookie that clears it.
    pub fn remove(&self, headers: &HeaderMap) -> Result<SetCookie, SessionError> {
        if let Some(id) = cookie::get_cookie(headers, &self.cookie_name) {
            self.sessions.remove(&id);
            metrics::record_active_sessions(self.sessions.len());
        }
        Ok(SetCookie(cookie::expired(&self.cookie_name)?))
    }

    /// Remove every expired session, returning how many were dropped.
    pub fn gc(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        let removed = before.saturating_sub(self.sessions.len());
        metrics::record_active_sessions(self.sessions.len());
        removed
    }

    /// Run `gc` every `timeout / 2` until shutdown.
    pub fn spawn_gc(&self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let store = self.clone();
        let period = (self.timeout / 2).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.gc();
                        if removed > 0 {
                            tracing::debug!(removed, "Expired sessions collected");
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Session GC received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        })
    }

    /// Ids of all stored sessions, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Extractor for the request's live session, if any.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionStore::from_ref(state);
        Ok(CurrentSession(store.get(&parts.headers)))
    }
}
