// App state and view actions.
// Owns one page per scope and turns user actions into store, persistence and visibility updates.

use tracing::{debug, error};

use crate::backend::{Scope, Subscription, SubscriptionId};
use crate::error::DeckError;
use crate::services::Services;
use crate::state::{
    EditorCommand, Membership, Notification, Preferences, View, ViewEditor, ViewId, ViewMode,
    ViewStore, VisibilityNotifier, overflow_views, select_toolbar, visible_subscriptions,
};
use crate::storage::{ASSET_DEFAULT_VIEW_ID, DEX_DEFAULT_VIEW_ID};

/// State of one page (asset or dex).
#[derive(Debug)]
pub struct Page {
    pub store: ViewStore,
    /// Subscriptions of this scope in display order.
    pub subscriptions: Vec<Subscription>,
    pub editor: ViewEditor,
}

impl Page {
    pub fn new(store: ViewStore) -> Self {
        Self {
            store,
            subscriptions: Vec::new(),
            editor: ViewEditor::new(),
        }
    }
}

/// Main application state.
///
/// Local state is updated first and persisted afterwards. A failed write is
/// reported as an error notification and left in place until the next
/// [`App::refresh`].
pub struct App {
    services: Services,
    preferences: Preferences,
    notifier: VisibilityNotifier,
    /// Highest view id ever seen or allocated. Ids are never reused.
    last_view_id: ViewId,
    asset: Page,
    dex: Page,
}

impl App {
    pub fn new(services: Services, preferences: Preferences) -> Self {
        Self {
            services,
            preferences,
            notifier: VisibilityNotifier::new(),
            last_view_id: ASSET_DEFAULT_VIEW_ID.max(DEX_DEFAULT_VIEW_ID),
            asset: Page::new(ViewStore::new(Scope::Asset, ASSET_DEFAULT_VIEW_ID)),
            dex: Page::new(ViewStore::new(Scope::Dex, DEX_DEFAULT_VIEW_ID)),
        }
    }

    pub fn page(&self, scope: Scope) -> &Page {
        match scope {
            Scope::Asset => &self.asset,
            Scope::Dex => &self.dex,
        }
    }

    fn page_mut(&mut self, scope: Scope) -> &mut Page {
        match scope {
            Scope::Asset => &mut self.asset,
            Scope::Dex => &mut self.dex,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn notifier(&self) -> &VisibilityNotifier {
        &self.notifier
    }

    /// Load both pages. Returns false if either failed.
    pub async fn load(&mut self) -> bool {
        let mut ok = true;
        for scope in Scope::ALL {
            ok &= self.refresh(scope).await;
        }
        ok
    }

    /// Reload views, membership and subscriptions of a page from their sources.
    pub async fn refresh(&mut self, scope: Scope) -> bool {
        let loaded = async {
            let subscriptions = self.services.subscriptions.subscriptions(scope).await?;
            let snapshot = self.services.views.refresh(scope).await?;
            Ok::<_, DeckError>((subscriptions, snapshot))
        }
        .await;

        let (mut subscriptions, snapshot) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                self.report("Refresh failed", &e);
                return false;
            }
        };

        subscriptions.retain(|s| s.scope == scope);
        let page = self.page_mut(scope);
        if let Err(e) = page.store.replace(snapshot) {
            self.report("Refresh failed", &e);
            return false;
        }
        let pruned = page.store.set_subscriptions(&subscriptions);
        page.subscriptions = subscriptions;
        self.last_view_id = self.last_view_id.max(self.page(scope).store.max_view_id());
        debug!(%scope, pruned = pruned.len(), "page refreshed");

        // Membership of subscriptions deleted elsewhere
        self.persist_removals(&pruned).await;
        self.sync_visibility(scope).await;
        true
    }

    /// Views shown as toolbar tabs.
    pub fn toolbar(&self, scope: Scope) -> Vec<&View> {
        let store = &self.page(scope).store;
        select_toolbar(
            store.views(),
            self.preferences.pinned(scope),
            store.active_view_id(),
        )
    }

    /// Views reachable only through the "manage views" list.
    pub fn overflow(&self, scope: Scope) -> Vec<&View> {
        overflow_views(self.page(scope).store.views(), &self.toolbar(scope))
    }

    pub fn active_view(&self, scope: Scope) -> &View {
        self.page(scope).store.active_view()
    }

    /// Subscriptions passing the active view's filter, in display order.
    pub fn visible(&self, scope: Scope) -> Vec<&Subscription> {
        let page = self.page(scope);
        let membership = page
            .store
            .membership_of(page.store.active_view_id())
            .unwrap_or(Membership::All);
        visible_subscriptions(&page.subscriptions, membership)
    }

    pub fn visible_ids(&self, scope: Scope) -> Vec<SubscriptionId> {
        self.visible(scope).iter().map(|s| s.id).collect()
    }

    pub fn count_of(&self, scope: Scope, view_id: ViewId) -> Option<usize> {
        self.page(scope).store.count_of(view_id)
    }

    pub fn editor(&self, scope: Scope) -> &ViewEditor {
        &self.page(scope).editor
    }

    pub fn view_mode(&self, scope: Scope) -> ViewMode {
        self.preferences.view_mode(scope)
    }

    /// Report the visible set to the backend if it changed.
    pub async fn sync_visibility(&mut self, scope: Scope) -> bool {
        let ids = self.visible_ids(scope);
        let consumer = self.services.visibility.clone();
        self.notifier.sync(scope, &ids, consumer.as_ref()).await
    }

    /// Switch the active view. Unknown ids are ignored.
    pub async fn set_active_view(&mut self, scope: Scope, view_id: ViewId) -> bool {
        if !self.page_mut(scope).store.set_active_view(view_id) {
            return false;
        }
        self.sync_visibility(scope).await;
        true
    }

    /// Pin or unpin a custom view. Returns whether it is pinned afterwards.
    pub fn toggle_pin(&mut self, scope: Scope, view_id: ViewId) -> bool {
        let pinnable = self
            .page(scope)
            .store
            .view(view_id)
            .is_some_and(|v| !v.is_default);
        if !pinnable {
            return false;
        }
        self.preferences.toggle_pin(scope, view_id)
    }

    pub fn set_view_mode(&mut self, scope: Scope, mode: ViewMode) {
        self.preferences.set_view_mode(scope, mode);
    }

    pub fn request_create(&mut self, scope: Scope) -> bool {
        self.page_mut(scope).editor.request_create()
    }

    pub fn request_rename(&mut self, scope: Scope, view_id: ViewId) -> bool {
        let page = self.page_mut(scope);
        page.editor.request_rename(view_id, &page.store)
    }

    pub fn cancel_editor(&mut self, scope: Scope) -> bool {
        self.page_mut(scope).editor.cancel()
    }

    /// Submit the editor. Returns false if the name was rejected and the
    /// modal stays open with an inline error.
    pub async fn confirm_editor(&mut self, scope: Scope, name: &str) -> bool {
        let page = self.page_mut(scope);
        let Some(command) = page.editor.confirm(name, &page.store) else {
            return false;
        };

        match command {
            EditorCommand::Create { name } => {
                self.create_view(scope, &name).await;
            }
            EditorCommand::Rename { view_id, name } => {
                self.rename_view(scope, view_id, &name).await;
            }
        }

        self.page_mut(scope).editor.finish();
        true
    }

    /// Create a custom view. The active view does not change.
    pub async fn create_view(&mut self, scope: Scope, name: &str) -> Option<View> {
        let id = self.next_view_id();
        let view = match self.page_mut(scope).store.create_view(id, name) {
            Ok(view) => view,
            Err(e) => {
                self.report("Create view failed", &e);
                return None;
            }
        };

        match self.services.views.create_view(&view).await {
            Ok(()) => self.notify(Notification::success(
                "View created",
                format!("Created view \"{}\"", view.name),
            )),
            Err(e) => self.report("Create view failed", &e),
        }
        Some(view)
    }

    pub async fn rename_view(&mut self, scope: Scope, view_id: ViewId, name: &str) -> bool {
        if let Err(e) = self.page_mut(scope).store.rename_view(view_id, name) {
            self.report("Rename view failed", &e);
            return false;
        }

        let name = self
            .page(scope)
            .store
            .view(view_id)
            .map(|v| v.name.clone())
            .unwrap_or_default();
        match self.services.views.rename_view(view_id, &name).await {
            Ok(()) => self.notify(Notification::success(
                "View renamed",
                format!("Renamed view to \"{}\"", name),
            )),
            Err(e) => self.report("Rename view failed", &e),
        }
        true
    }

    /// Delete a custom view after the user confirms.
    pub async fn delete_view(&mut self, scope: Scope, view_id: ViewId) -> bool {
        let Some(view) = self.page(scope).store.view(view_id).cloned() else {
            self.report("Delete view failed", &DeckError::ViewNotFound(view_id));
            return false;
        };
        if view.is_default {
            self.report("Delete view failed", &DeckError::Protected(view_id));
            return false;
        }

        let message = format!("Delete view \"{}\"?", view.name);
        if !self.services.confirmation.request_confirmation(&message).await {
            return false;
        }

        // The view may have gone away while the dialog was open
        if let Err(e) = self.page_mut(scope).store.delete_view(view_id) {
            self.report("Delete view failed", &e);
            return false;
        }
        self.preferences.unpin(scope, view_id);

        match self.services.views.delete_view(view_id).await {
            Ok(()) => self.notify(Notification::success(
                "View deleted",
                format!("Deleted view \"{}\"", view.name),
            )),
            Err(e) => self.report("Delete view failed", &e),
        }

        self.sync_visibility(scope).await;
        true
    }

    /// Add a subscription to a view. Returns false if nothing changed.
    pub async fn add_to_view(
        &mut self,
        scope: Scope,
        view_id: ViewId,
        sub_id: SubscriptionId,
    ) -> bool {
        let changed = self
            .page_mut(scope)
            .store
            .add_subscription_to_view(view_id, sub_id);
        if !self.membership_changed(changed) {
            return false;
        }

        if let Err(e) = self
            .services
            .views
            .add_subscription_to_view(view_id, sub_id)
            .await
        {
            self.report("Update view failed", &e);
        }
        self.sync_if_active(scope, view_id).await;
        true
    }

    /// Remove a subscription from a view. Returns false if nothing changed.
    pub async fn remove_from_view(
        &mut self,
        scope: Scope,
        view_id: ViewId,
        sub_id: SubscriptionId,
    ) -> bool {
        let changed = self
            .page_mut(scope)
            .store
            .remove_subscription_from_view(view_id, sub_id);
        if !self.membership_changed(changed) {
            return false;
        }

        self.persist_removals(&[(view_id, sub_id)]).await;
        self.sync_if_active(scope, view_id).await;
        true
    }

    /// Remove several subscriptions from a view after the user confirms.
    /// Visibility is synced once at the end. Returns how many were removed.
    pub async fn remove_many_from_view(
        &mut self,
        scope: Scope,
        view_id: ViewId,
        sub_ids: &[SubscriptionId],
    ) -> usize {
        let Some(view) = self.page(scope).store.view(view_id).cloned() else {
            debug!(view_id, "bulk removal from a missing view ignored");
            return 0;
        };
        if sub_ids.is_empty() {
            return 0;
        }

        let message = format!(
            "Remove {} subscription(s) from \"{}\"?",
            sub_ids.len(),
            view.name
        );
        if !self.services.confirmation.request_confirmation(&message).await {
            return 0;
        }

        let mut removed = Vec::new();
        for sub_id in sub_ids {
            let changed = self
                .page_mut(scope)
                .store
                .remove_subscription_from_view(view_id, *sub_id);
            if self.membership_changed(changed) {
                removed.push((view_id, *sub_id));
            }
        }

        self.persist_removals(&removed).await;
        self.sync_if_active(scope, view_id).await;
        removed.len()
    }

    /// Delete subscriptions everywhere after the user confirms, then prune
    /// them from every view of the page.
    pub async fn remove_subscriptions(&mut self, scope: Scope, sub_ids: &[SubscriptionId]) -> bool {
        if sub_ids.is_empty() {
            return false;
        }

        let message = format!("Remove {} subscription(s)?", sub_ids.len());
        if !self.services.confirmation.request_confirmation(&message).await {
            return false;
        }

        // Stop at the first failure but keep what the backend already deleted
        let mut deleted = Vec::new();
        let mut failure = None;
        for sub_id in sub_ids {
            match self.services.subscriptions.remove_subscription(*sub_id).await {
                Ok(()) => deleted.push(*sub_id),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if !deleted.is_empty() {
            self.prune_deleted(scope, &deleted).await;
        }

        match failure {
            Some(e) => {
                self.report("Remove subscriptions failed", &e);
                false
            }
            None => {
                self.notify(Notification::success(
                    "Subscriptions removed",
                    format!("Removed {} subscription(s)", deleted.len()),
                ));
                true
            }
        }
    }

    /// Drop deleted subscriptions from the page and every view, then resync.
    async fn prune_deleted(&mut self, scope: Scope, deleted: &[SubscriptionId]) {
        let page = self.page_mut(scope);
        let mut pruned = Vec::new();
        for sub_id in deleted {
            for view_id in page.store.views_containing(*sub_id) {
                if let Ok(true) = page.store.remove_subscription_from_view(view_id, *sub_id) {
                    pruned.push((view_id, *sub_id));
                }
            }
            page.store.prune_subscription(*sub_id);
        }
        page.subscriptions.retain(|s| !deleted.contains(&s.id));

        self.persist_removals(&pruned).await;
        self.sync_visibility(scope).await;
    }

    /// Allocate a view id above every id seen in either page.
    fn next_view_id(&mut self) -> ViewId {
        let highest = self
            .asset
            .store
            .max_view_id()
            .max(self.dex.store.max_view_id());
        self.last_view_id = self.last_view_id.max(highest) + 1;
        self.last_view_id
    }

    /// Interpret a store membership result. Missing views and subscriptions are a silent no-op.
    fn membership_changed(&self, result: crate::error::Result<bool>) -> bool {
        match result {
            Ok(changed) => changed,
            Err(DeckError::ViewNotFound(id)) => {
                debug!(view_id = id, "membership change on a missing view ignored");
                false
            }
            Err(DeckError::SubscriptionNotFound(id)) => {
                debug!(sub_id = id, "membership change for a missing subscription ignored");
                false
            }
            Err(e) => {
                self.report("Update view failed", &e);
                false
            }
        }
    }

    /// Persist membership removals one by one, reporting the first failure once.
    async fn persist_removals(&self, removals: &[(ViewId, SubscriptionId)]) {
        let mut failure = None;
        for (view_id, sub_id) in removals {
            if let Err(e) = self
                .services
                .views
                .remove_subscription_from_view(*view_id, *sub_id)
                .await
            {
                failure.get_or_insert(e);
            }
        }
        if let Some(e) = failure {
            self.report("Update view failed", &e);
        }
    }

    async fn sync_if_active(&mut self, scope: Scope, view_id: ViewId) {
        if self.page(scope).store.active_view_id() == view_id {
            self.sync_visibility(scope).await;
        }
    }

    fn notify(&self, notification: Notification) {
        self.services.notifications.notify(notification);
    }

    /// Surface a failure. Reaching a protected view is a bug, so it is logged only.
    fn report(&self, title: &str, err: &DeckError) {
        match err {
            DeckError::Protected(view_id) => {
                error!(view_id, "{}: default view cannot be modified", title);
            }
            _ => self.notify(Notification::error(title, err.to_string())),
        }
    }
}
