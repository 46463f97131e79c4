use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::SessionToken;

/// Name of the session cookie carried by authenticated clients.
pub const SESSION_COOKIE: &str = "SESSION";

/// SessionStore
///
/// The abstract contract for the session key-value collaborator: the only
/// shared mutable state in the application. Implementations must tolerate
/// concurrent reads and writes from simultaneous requests. Expiry policy
/// belongs to the store, not to the callers: `get` on an expired token
/// behaves exactly like a miss.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Binds a token value to a member id.
    async fn insert(&self, token: &str, member_id: Uuid);
    /// Resolves a token value to the member it was issued for, if the
    /// session is still live.
    async fn get(&self, token: &str) -> Option<Uuid>;
    /// Drops a session. Returns true if a live entry was removed.
    async fn remove(&self, token: &str) -> bool;
}

/// SessionState
///
/// The concrete type used to share the session store across the application.
pub type SessionState = Arc<dyn SessionStore>;

struct SessionEntry {
    member_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// InMemorySessionStore
///
/// Default store backed by a concurrent map. Entries carry an absolute
/// expiry stamped at insertion; expired entries are evicted lazily when
/// they are next read. Suitable for a single-process deployment; a
/// multi-node deployment would swap in a store backed by shared
/// infrastructure behind the same trait.
pub struct InMemorySessionStore {
    entries: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, token: &str, member_id: Uuid) {
        self.entries.insert(
            token.to_string(),
            SessionEntry {
                member_id,
                expires_at: Utc::now() + self.ttl,
            },
        );
    }

    async fn get(&self, token: &str) -> Option<Uuid> {
        let expired = match self.entries.get(token) {
            Some(entry) if entry.expires_at > Utc::now() => return Some(entry.member_id),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(token);
        }
        None
    }

    async fn remove(&self, token: &str) -> bool {
        self.entries.remove(token).is_some()
    }
}

/// SessionLifecycle
///
/// Issues and destroys sessions on top of the store. Handlers own the
/// surrounding navigation (cookies and redirects); this type owns the
/// token-to-identity binding.
#[derive(Clone)]
pub struct SessionLifecycle {
    store: SessionState,
}

impl SessionLifecycle {
    pub fn new(store: SessionState) -> Self {
        Self { store }
    }

    /// login
    ///
    /// Binds a freshly minted token to the active session store. Only
    /// tokens produced by a successful authentication ever reach this.
    pub async fn login(&self, token: &SessionToken) {
        self.store.insert(token.value(), token.member_id).await;
    }

    /// logout
    ///
    /// Invalidates the session for a token value. Returns true if a live
    /// session was destroyed.
    pub async fn logout(&self, token: &str) -> bool {
        self.store.remove(token).await
    }

    /// resolve
    ///
    /// Maps a presented token value back to a member id. Used by both the
    /// access gate middleware and the `AuthSession` extractor.
    pub async fn resolve(&self, token: &str) -> Option<Uuid> {
        self.store.get(token).await
    }
}
