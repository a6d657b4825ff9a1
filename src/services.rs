// Collaborator interfaces.
// The backend, persistence and UI surfaces the view controller talks to.

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{Scope, Subscription, SubscriptionId};
use crate::error::{DeckError, Result};
use crate::state::{Notification, View, ViewId, ViewSnapshot};

/// Source of the subscription collection.
#[async_trait]
pub trait SubscriptionProvider: Send + Sync {
    /// Subscriptions of a scope in display order.
    async fn subscriptions(&self, scope: Scope) -> Result<Vec<Subscription>>;

    async fn remove_subscription(&self, id: SubscriptionId) -> Result<()>;
}

/// Durable storage for views and membership.
#[async_trait]
pub trait ViewPersistence: Send + Sync {
    async fn create_view(&self, view: &View) -> Result<()>;
    async fn rename_view(&self, id: ViewId, name: &str) -> Result<()>;
    async fn delete_view(&self, id: ViewId) -> Result<()>;
    async fn add_subscription_to_view(&self, view_id: ViewId, sub_id: SubscriptionId)
    -> Result<()>;
    async fn remove_subscription_from_view(
        &self,
        view_id: ViewId,
        sub_id: SubscriptionId,
    ) -> Result<()>;
    /// Reload views and membership of a scope.
    async fn refresh(&self, scope: Scope) -> Result<ViewSnapshot>;
}

/// Receives the ids currently on screen so it can scope its polling.
#[async_trait]
pub trait VisibilityConsumer: Send + Sync {
    async fn set_visible_subscriptions(&self, ids: &[SubscriptionId], scope: Scope)
    -> Result<()>;
}

/// Asks the user before destructive actions.
#[async_trait]
pub trait ConfirmationSurface: Send + Sync {
    async fn request_confirmation(&self, message: &str) -> bool;
}

/// Shows outcome messages. Fire-and-forget.
pub trait NotificationSurface: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Process-wide key/value preference storage.
pub trait PreferenceStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>>;
    fn write(&self, key: &str, value: serde_json::Value) -> Result<()>;
}

/// Everything the controller needs from the outside world.
#[derive(Clone)]
pub struct Services {
    pub subscriptions: Arc<dyn SubscriptionProvider>,
    pub views: Arc<dyn ViewPersistence>,
    pub visibility: Arc<dyn VisibilityConsumer>,
    pub confirmation: Arc<dyn ConfirmationSurface>,
    pub notifications: Arc<dyn NotificationSurface>,
}

/// Stand-in for a front end without a visibility consumer.
pub struct MissingVisibilityConsumer;

#[async_trait]
impl VisibilityConsumer for MissingVisibilityConsumer {
    async fn set_visible_subscriptions(
        &self,
        _ids: &[SubscriptionId],
        scope: Scope,
    ) -> Result<()> {
        Err(DeckError::Other(format!(
            "no visibility consumer for {} page",
            scope
        )))
    }
}

/// Declines every destructive action.
pub struct MissingConfirmation;

#[async_trait]
impl ConfirmationSurface for MissingConfirmation {
    async fn request_confirmation(&self, _message: &str) -> bool {
        false
    }
}
