//! Client session registry
//!
//! Keeps one directory view per browser client, keyed by the session cookie.
//! Each view sits behind its own mutex so a client's actions run one at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::app::{DirectoryView, ListingRepository, ListingSync, ModerationService};
use crate::domain::ports::{DocumentStore, IdentityProvider};

/// Identifier carried in the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A resolved client: its id, its view, and whether it was just created
pub struct ClientHandle<IP, S>
where
    IP: IdentityProvider + ?Sized,
    S: DocumentStore + ?Sized,
{
    pub id: SessionId,
    pub view: Arc<Mutex<DirectoryView<IP, S>>>,
    pub is_new: bool,
}

impl<IP, S> Clone for ClientHandle<IP, S>
where
    IP: IdentityProvider + ?Sized,
    S: DocumentStore + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            view: self.view.clone(),
            is_new: self.is_new,
        }
    }
}

struct Entry<IP, S>
where
    IP: IdentityProvider + ?Sized,
    S: DocumentStore + ?Sized,
{
    view: Arc<Mutex<DirectoryView<IP, S>>>,
    last_seen: DateTime<Utc>,
}

/// Shortest pause between eviction sweeps
const MIN_EVICTION_PERIOD: Duration = Duration::from_secs(15);

pub struct SessionRegistry<IP, S>
where
    IP: IdentityProvider + ?Sized,
    S: DocumentStore + ?Sized,
{
    sessions: RwLock<HashMap<SessionId, Entry<IP, S>>>,
    identity: Arc<IP>,
    listings: Arc<ListingRepository<S>>,
    moderation: Arc<ModerationService<S>>,
    sync: ListingSync,
    idle_timeout: Duration,
}

impl<IP, S> SessionRegistry<IP, S>
where
    IP: IdentityProvider + ?Sized,
    S: DocumentStore + ?Sized,
{
    pub fn new(
        identity: Arc<IP>,
        listings: Arc<ListingRepository<S>>,
        moderation: Arc<ModerationService<S>>,
        sync: ListingSync,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            identity,
            listings,
            moderation,
            sync,
            idle_timeout,
        }
    }

    /// Look up the client for a cookie value, creating a fresh one if unknown.
    ///
    /// Unknown ids are never adopted; a new id is issued instead.
    pub async fn resolve(&self, requested: Option<SessionId>) -> ClientHandle<IP, S> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if let Some(id) = requested {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return ClientHandle {
                    id,
                    view: entry.view.clone(),
                    is_new: false,
                };
            }
        }

        let id = SessionId::new();
        let view = Arc::new(Mutex::new(DirectoryView::new(
            self.identity.clone(),
            self.listings.clone(),
            self.moderation.clone(),
            self.sync,
        )));
        sessions.insert(
            id,
            Entry {
                view: view.clone(),
                last_seen: now,
            },
        );
        tracing::debug!(session = %id, total = sessions.len(), "Client session created");

        ClientHandle {
            id,
            view,
            is_new: true,
        }
    }

    /// Drop clients idle for longer than the configured timeout.
    ///
    /// Dropping a view drops its session manager, which closes its subscription.
    pub async fn evict_idle(&self) -> usize {
        self.evict_idle_at(Utc::now()).await
    }

    async fn evict_idle_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            (now - entry.last_seen).to_std().unwrap_or_default() <= self.idle_timeout
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle client sessions");
        }
        evicted
    }

    /// Time between sweeps: a quarter of the idle timeout, so a client
    /// outlives its timeout by at most that much.
    pub fn eviction_period(&self) -> Duration {
        (self.idle_timeout / 4).max(MIN_EVICTION_PERIOD)
    }

    /// Sweep idle clients until the task is dropped
    pub async fn run_eviction(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.eviction_period());
        loop {
            interval.tick().await;
            if self.evict_idle().await > 0 {
                let active = self.len().await;
                tracing::debug!(active, "Client sessions after eviction");
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::OwnerPolicy;
    use crate::test_utils::{InMemoryDocumentStore, MockIdentityProvider, OWNER_EMAIL};

    fn create_registry(
        idle: Duration,
    ) -> SessionRegistry<MockIdentityProvider, InMemoryDocumentStore> {
        let listings = Arc::new(ListingRepository::new(
            Arc::new(InMemoryDocumentStore::new()),
            "bots",
        ));
        let moderation = Arc::new(ModerationService::new(
            listings.clone(),
            OwnerPolicy::new(OWNER_EMAIL),
        ));
        SessionRegistry::new(
            Arc::new(MockIdentityProvider::new()),
            listings,
            moderation,
            ListingSync::Merge,
            idle,
        )
    }

    #[test]
    fn session_id_round_trips_through_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-session".parse::<SessionId>().is_err());
    }

    #[tokio::test]
    async fn resolve_creates_then_reuses() {
        let registry = create_registry(Duration::from_secs(60));

        let first = registry.resolve(None).await;
        let again = registry.resolve(Some(first.id)).await;

        assert!(first.is_new);
        assert!(!again.is_new);
        assert_eq!(again.id, first.id);
        assert!(Arc::ptr_eq(&first.view, &again.view));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn resolve_does_not_adopt_unknown_ids() {
        let registry = create_registry(Duration::from_secs(60));
        let forged = SessionId::new();

        let client = registry.resolve(Some(forged)).await;

        assert!(client.is_new);
        assert_ne!(client.id, forged);
    }

    #[tokio::test]
    async fn evict_idle_drops_stale_sessions() {
        let registry = create_registry(Duration::from_secs(60));
        let stale = registry.resolve(None).await;
        let fresh = registry.resolve(None).await;
        {
            let mut sessions = registry.sessions.write().await;
            sessions.get_mut(&stale.id).unwrap().last_seen =
                Utc::now() - chrono::Duration::seconds(120);
        }

        let evicted = registry.evict_idle().await;

        assert_eq!(evicted, 1);
        assert_eq!(registry.len().await, 1);
        assert!(!registry.resolve(Some(fresh.id)).await.is_new);
        assert!(registry.resolve(Some(stale.id)).await.is_new);
    }

    #[test]
    fn eviction_period_is_a_quarter_of_idle_timeout() {
        assert_eq!(
            create_registry(Duration::from_secs(3600)).eviction_period(),
            Duration::from_secs(900)
        );
        assert_eq!(
            create_registry(Duration::from_secs(20)).eviction_period(),
            MIN_EVICTION_PERIOD
        );
    }

    #[tokio::test]
    async fn eviction_task_runs_on_the_runtime() {
        let registry = Arc::new(create_registry(Duration::from_secs(60)));
        let stale = registry.resolve(None).await;
        {
            let mut sessions = registry.sessions.write().await;
            sessions.get_mut(&stale.id).unwrap().last_seen =
                Utc::now() - chrono::Duration::seconds(120);
        }

        // The first tick fires immediately
        let task = tokio::spawn(registry.clone().run_eviction());
        let emptied = tokio::time::timeout(Duration::from_secs(5), async {
            while registry.len().await > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        task.abort();

        assert!(emptied.is_ok());
    }

    #[tokio::test]
    async fn evict_idle_keeps_recent_sessions() {
        let registry = create_registry(Duration::from_secs(60));
        registry.resolve(None).await;

        let evicted = registry.evict_idle_at(Utc::now() + chrono::Duration::seconds(30)).await;

        assert_eq!(evicted, 0);
    }
}
