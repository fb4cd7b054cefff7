//! Channel membership: may the bot post into a channel?
//!
//! The gate only reads the store. Whatever keeps the store current runs
//! on its own schedule and talks to the gate through the store alone, so
//! answers may be as old as one refresh interval.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::ChatOpsResult;
use crate::types::MembershipRecord;

#[async_trait]
pub trait MembershipLookup: Send + Sync {
    async fn lookup(&self, channel_id: &str) -> ChatOpsResult<Option<MembershipRecord>>;
}

#[derive(Default)]
struct Snapshot {
    records: HashMap<String, MembershipRecord>,
    refreshed_at: Option<Instant>,
}

/// Process-local membership store, rebuilt wholesale by a refresher.
#[derive(Default)]
pub struct InMemoryMembershipStore {
    snapshot: RwLock<Snapshot>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace_all(&self, records: Vec<MembershipRecord>) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.records = records
            .into_iter()
            .map(|r| (r.channel_id.clone(), r))
            .collect();
        snapshot.refreshed_at = Some(Instant::now());
    }

    /// True when the store was never filled or is older than `max_age`.
    pub async fn is_stale(&self, max_age: Duration) -> bool {
        self.snapshot
            .read()
            .await
            .refreshed_at
            .is_none_or(|at| at.elapsed() >= max_age)
    }

    pub async fn len(&self) -> usize {
        self.snapshot.read().await.records.len()
    }
}

#[async_trait]
impl MembershipLookup for InMemoryMembershipStore {
    async fn lookup(&self, channel_id: &str) -> ChatOpsResult<Option<MembershipRecord>> {
        Ok(self.snapshot.read().await.records.get(channel_id).cloned())
    }
}

pub struct MembershipGate<L: ?Sized> {
    store: Arc<L>,
}

impl<L: MembershipLookup + ?Sized> MembershipGate<L> {
    pub fn new(store: Arc<L>) -> Self {
        Self { store }
    }

    /// Unknown channels and lookup failures both count as "not a member".
    pub async fn check(&self, channel_id: &str) -> bool {
        match self.store.lookup(channel_id).await {
            Ok(Some(record)) => {
                debug!(channel_id, is_member = record.is_member, "Membership lookup");
                record.is_member
            }
            Ok(None) => {
                debug!(channel_id, "No membership record for channel");
                false
            }
            Err(e) => {
                warn!(channel_id, "Membership lookup failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatOpsError;
    use chrono::Utc;

    fn record(channel_id: &str, is_member: bool) -> MembershipRecord {
        MembershipRecord {
            channel_id: channel_id.to_string(),
            is_member,
            updated_at: Utc::now(),
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl MembershipLookup for BrokenStore {
        async fn lookup(&self, _channel_id: &str) -> ChatOpsResult<Option<MembershipRecord>> {
            Err(ChatOpsError::Network("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_gate_follows_record() {
        let store = Arc::new(InMemoryMembershipStore::new());
        store
            .replace_all(vec![record("C1", true), record("C2", false)])
            .await;
        let gate = MembershipGate::new(store);

        assert!(gate.check("C1").await);
        assert!(!gate.check("C2").await);
    }

    #[tokio::test]
    async fn test_gate_fails_closed() {
        let gate = MembershipGate::new(Arc::new(InMemoryMembershipStore::new()));
        assert!(!gate.check("C404").await);

        let gate = MembershipGate::new(Arc::new(BrokenStore));
        assert!(!gate.check("C1").await);
    }

    #[tokio::test]
    async fn test_staleness() {
        let store = InMemoryMembershipStore::new();
        assert!(store.is_stale(Duration::from_secs(60)).await);

        store.replace_all(vec![record("C1", true)]).await;
        assert!(!store.is_stale(Duration::from_secs(60)).await);
        assert!(store.is_stale(Duration::ZERO).await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_replace_all_drops_old_channels() {
        let store = InMemoryMembershipStore::new();
        store.replace_all(vec![record("C1", true)]).await;
        store.replace_all(vec![record("C2", true)]).await;

        assert!(store.lookup("C1").await.unwrap().is_none());
        assert!(store.lookup("C2").await.unwrap().is_some());
    }
}
