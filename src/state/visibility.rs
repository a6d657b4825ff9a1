// Visibility filter and notifier.
// Derives the on-screen subscriptions and tells the backend only when that set changes.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::backend::{Scope, Subscription, SubscriptionId};
use crate::services::VisibilityConsumer;

use super::views::Membership;

/// Subscriptions shown by a view, keeping the order of `all`.
pub fn visible_subscriptions<'a>(
    all: &'a [Subscription],
    membership: Membership<'_>,
) -> Vec<&'a Subscription> {
    match membership {
        Membership::All => all.iter().collect(),
        Membership::Only(members) => all.iter().filter(|s| members.contains(&s.id)).collect(),
    }
}

/// Order-sensitive identity of a visible set.
pub fn visibility_key(ids: &[SubscriptionId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Remembers the last visible set reported per scope.
#[derive(Debug, Default)]
pub struct VisibilityNotifier {
    last_keys: HashMap<Scope, String>,
    /// Number of calls issued to the consumer.
    sent: u64,
}

impl VisibilityNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last key reported for a scope.
    pub fn last_key(&self, scope: Scope) -> Option<&str> {
        self.last_keys.get(&scope).map(String::as_str)
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Record a visible set. Returns true if it differs from the last one
    /// reported for the scope and therefore needs to be sent.
    pub fn track(&mut self, scope: Scope, ids: &[SubscriptionId]) -> bool {
        let key = visibility_key(ids);
        if self.last_keys.get(&scope) == Some(&key) {
            debug!(%scope, key = %key, "visible set unchanged");
            return false;
        }
        self.last_keys.insert(scope, key);
        true
    }

    /// Report a visible set to the consumer if it changed.
    ///
    /// Failures are logged and not retried; the key is kept so the same set
    /// is not resent until it changes.
    pub async fn sync(
        &mut self,
        scope: Scope,
        ids: &[SubscriptionId],
        consumer: &dyn VisibilityConsumer,
    ) -> bool {
        if !self.track(scope, ids) {
            return false;
        }

        self.sent += 1;
        debug!(%scope, count = ids.len(), "sending visible subscriptions");
        if let Err(e) = consumer.set_visible_subscriptions(ids, scope).await {
            warn!(%scope, error = %e, "failed to sync visible subscriptions");
        }
        true
    }

    /// Forget what was reported, forcing the next sync to send.
    pub fn reset(&mut self, scope: Scope) {
        self.last_keys.remove(&scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::error::{DeckError, Result};

    #[derive(Default)]
    struct RecordingConsumer {
        calls: Arc<Mutex<Vec<(Vec<SubscriptionId>, Scope)>>>,
        fail: bool,
    }

    #[async_trait]
    impl VisibilityConsumer for RecordingConsumer {
        async fn set_visible_subscriptions(
            &self,
            ids: &[SubscriptionId],
            scope: Scope,
        ) -> Result<()> {
            self.calls.lock().unwrap().push((ids.to_vec(), scope));
            if self.fail {
                return Err(DeckError::Other("backend offline".to_string()));
            }
            Ok(())
        }
    }

    fn subs() -> Vec<Subscription> {
        [4, 1, 3, 2]
            .iter()
            .map(|id| Subscription::new(*id, Scope::Asset, format!("S{}", id)))
            .collect()
    }

    #[test]
    fn test_filter_preserves_order() {
        let all = subs();
        let members: HashSet<SubscriptionId> = [2, 4].into_iter().collect();

        let visible = visible_subscriptions(&all, Membership::Only(&members));
        let ids: Vec<_> = visible.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 2]);

        let visible = visible_subscriptions(&all, Membership::All);
        assert_eq!(visible.len(), 4);
    }

    #[test]
    fn test_visibility_key() {
        assert_eq!(visibility_key(&[1, 2, 3]), "1,2,3");
        assert_eq!(visibility_key(&[]), "");
        assert_ne!(visibility_key(&[1, 3, 2]), visibility_key(&[1, 2, 3]));
    }

    #[tokio::test]
    async fn test_identical_sets_notify_once() {
        let consumer = RecordingConsumer::default();
        let mut notifier = VisibilityNotifier::new();

        assert!(notifier.sync(Scope::Asset, &[1, 2, 3], &consumer).await);
        assert!(!notifier.sync(Scope::Asset, &[1, 2, 3], &consumer).await);
        assert_eq!(consumer.calls.lock().unwrap().len(), 1);

        // Reordering changes the key
        assert!(notifier.sync(Scope::Asset, &[1, 3, 2], &consumer).await);
        assert_eq!(consumer.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_scopes_notify_independently() {
        let consumer = RecordingConsumer::default();
        let mut notifier = VisibilityNotifier::new();

        notifier.sync(Scope::Asset, &[1, 2], &consumer).await;
        notifier.sync(Scope::Dex, &[1, 2], &consumer).await;

        let calls = consumer.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], (vec![1, 2], Scope::Dex));
        assert_eq!(notifier.last_key(Scope::Asset), Some("1,2"));
    }

    #[tokio::test]
    async fn test_failure_is_not_retried() {
        let consumer = RecordingConsumer {
            fail: true,
            ..Default::default()
        };
        let mut notifier = VisibilityNotifier::new();

        assert!(notifier.sync(Scope::Dex, &[9], &consumer).await);
        assert!(!notifier.sync(Scope::Dex, &[9], &consumer).await);
        assert_eq!(notifier.sent(), 1);

        notifier.reset(Scope::Dex);
        assert!(notifier.sync(Scope::Dex, &[9], &consumer).await);
    }
}
