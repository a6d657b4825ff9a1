// Backend endpoint functions.
// Typed calls for subscriptions and visibility, plus the collaborator trait impls.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::services::{SubscriptionProvider, VisibilityConsumer};

use super::client::BackendClient;
use super::types::{Scope, Subscription, SubscriptionId, VisibleRequest};

/// Response wrapper for the subscriptions list.
#[derive(Debug, Deserialize)]
struct SubscriptionsResponse {
    subscriptions: Vec<Subscription>,
}

impl BackendClient {
    /// All subscriptions, in the backend's display order.
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let response = self.get("/api/subscriptions").await?;
        let body: SubscriptionsResponse = response.json().await?;
        Ok(body.subscriptions)
    }

    /// Delete one subscription.
    pub async fn delete_subscription(&self, id: SubscriptionId) -> Result<()> {
        self.delete(&format!("/api/subscriptions/{}", id)).await?;
        Ok(())
    }

    /// Tell the backend which subscriptions of a page are on screen.
    pub async fn post_visible(&self, ids: &[SubscriptionId], scope: Scope) -> Result<()> {
        self.post("/api/visible", &VisibleRequest { ids, scope })
            .await?;
        Ok(())
    }
}

/// Keep the subscriptions of one page, preserving order.
pub fn in_scope(subscriptions: Vec<Subscription>, scope: Scope) -> Vec<Subscription> {
    subscriptions
        .into_iter()
        .filter(|s| s.scope == scope)
        .collect()
}

#[async_trait]
impl SubscriptionProvider for BackendClient {
    async fn subscriptions(&self, scope: Scope) -> Result<Vec<Subscription>> {
        Ok(in_scope(self.list_subscriptions().await?, scope))
    }

    async fn remove_subscription(&self, id: SubscriptionId) -> Result<()> {
        self.delete_subscription(id).await
    }
}

#[async_trait]
impl VisibilityConsumer for BackendClient {
    async fn set_visible_subscriptions(
        &self,
        ids: &[SubscriptionId],
        scope: Scope,
    ) -> Result<()> {
        self.post_visible(ids, scope).await
    }
}
