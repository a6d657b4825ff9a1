// View store.
// Owns the views of one page, their subscription membership and the active view pointer.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::backend::{Scope, Subscription, SubscriptionId};
use crate::error::{DeckError, NameError, Result};

/// Unique view identifier, shared across scopes.
pub type ViewId = i64;

/// A saved filter over the subscriptions of one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub id: ViewId,
    pub name: String,
    pub is_default: bool,
    #[serde(rename = "view_type")]
    pub scope: Scope,
}

impl View {
    pub fn new(id: ViewId, scope: Scope, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_default: false,
            scope,
        }
    }

    /// The unfiltered "All" view of a scope.
    pub fn default_for(id: ViewId, scope: Scope) -> Self {
        Self {
            id,
            name: "All".to_string(),
            is_default: true,
            scope,
        }
    }
}

/// Views and membership as loaded from persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub views: Vec<View>,
    pub membership: HashMap<ViewId, HashSet<SubscriptionId>>,
}

/// What a view lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership<'a> {
    /// Default view: no filter.
    All,
    /// Custom view: only these subscriptions.
    Only(&'a HashSet<SubscriptionId>),
}

/// Key used for case- and whitespace-insensitive name comparison.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Views of a single scope plus their membership.
#[derive(Debug, Clone)]
pub struct ViewStore {
    scope: Scope,
    views: Vec<View>,
    default_id: ViewId,
    active_id: ViewId,
    membership: HashMap<ViewId, HashSet<SubscriptionId>>,
    /// Subscriptions currently existing in this scope.
    subscriptions: HashSet<SubscriptionId>,
}

impl ViewStore {
    /// Create a store holding only the default view.
    pub fn new(scope: Scope, default_id: ViewId) -> Self {
        Self {
            scope,
            views: vec![View::default_for(default_id, scope)],
            default_id,
            active_id: default_id,
            membership: HashMap::new(),
            subscriptions: HashSet::new(),
        }
    }

    /// Build a store from a persisted snapshot. Views of other scopes are ignored.
    pub fn from_snapshot(scope: Scope, snapshot: ViewSnapshot) -> Result<Self> {
        let default_id = Self::find_default(scope, &snapshot.views)?;
        let mut store = Self::new(scope, default_id);
        store.replace(snapshot)?;
        Ok(store)
    }

    fn find_default(scope: Scope, views: &[View]) -> Result<ViewId> {
        let defaults: Vec<ViewId> = views
            .iter()
            .filter(|v| v.scope == scope && v.is_default)
            .map(|v| v.id)
            .collect();
        match defaults.as_slice() {
            [id] => Ok(*id),
            _ => Err(DeckError::Other(format!(
                "expected exactly one default {} view, found {}",
                scope,
                defaults.len()
            ))),
        }
    }

    /// Replace views and membership with a fresh snapshot.
    /// The active pointer survives if its view still exists.
    pub fn replace(&mut self, snapshot: ViewSnapshot) -> Result<()> {
        let default_id = Self::find_default(self.scope, &snapshot.views)?;
        let ViewSnapshot {
            views,
            mut membership,
        } = snapshot;

        self.views = views.into_iter().filter(|v| v.scope == self.scope).collect();
        self.default_id = default_id;
        self.membership = self
            .views
            .iter()
            .filter(|v| !v.is_default)
            .map(|v| (v.id, membership.remove(&v.id).unwrap_or_default()))
            .collect();

        if self.view(self.active_id).is_none() {
            self.active_id = self.default_id;
        }
        Ok(())
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// All views in insertion order.
    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }

    pub fn default_view(&self) -> &View {
        self.view(self.default_id)
            .expect("Default view should always exist")
    }

    pub fn active_view_id(&self) -> ViewId {
        self.active_id
    }

    pub fn active_view(&self) -> &View {
        self.view(self.active_id)
            .expect("Active view should always exist")
    }

    /// Largest view id held by this store.
    pub fn max_view_id(&self) -> ViewId {
        self.views.iter().map(|v| v.id).max().unwrap_or(self.default_id)
    }

    /// Check a proposed name, ignoring the view being renamed.
    /// Returns the trimmed name on success.
    pub fn validate_name(
        &self,
        name: &str,
        exclude: Option<ViewId>,
    ) -> std::result::Result<String, NameError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }

        let key = name_key(trimmed);
        let taken = self
            .views
            .iter()
            .filter(|v| Some(v.id) != exclude)
            .any(|v| name_key(&v.name) == key);
        if taken {
            return Err(NameError::Duplicate(trimmed.to_string()));
        }

        Ok(trimmed.to_string())
    }

    /// Append a new custom view with empty membership.
    /// Does not move the active pointer.
    pub fn create_view(&mut self, id: ViewId, name: &str) -> Result<View> {
        let name = self.validate_name(name, None)?;
        if self.view(id).is_some() {
            return Err(DeckError::Other(format!("view id {} is already in use", id)));
        }

        let view = View::new(id, self.scope, name);
        self.views.push(view.clone());
        self.membership.insert(id, HashSet::new());
        Ok(view)
    }

    pub fn rename_view(&mut self, id: ViewId, name: &str) -> Result<()> {
        self.custom_view(id)?;
        let name = self.validate_name(name, Some(id))?;
        if let Some(view) = self.views.iter_mut().find(|v| v.id == id) {
            view.name = name;
        }
        Ok(())
    }

    /// Remove a custom view and its membership.
    /// Deleting the active view moves the pointer back to the default view.
    pub fn delete_view(&mut self, id: ViewId) -> Result<View> {
        self.custom_view(id)?;
        let index = self
            .views
            .iter()
            .position(|v| v.id == id)
            .ok_or(DeckError::ViewNotFound(id))?;

        let view = self.views.remove(index);
        self.membership.remove(&id);
        if self.active_id == id {
            self.active_id = self.default_id;
        }
        Ok(view)
    }

    /// Add a subscription to a view. Returns false if it was already a member.
    pub fn add_subscription_to_view(
        &mut self,
        view_id: ViewId,
        sub_id: SubscriptionId,
    ) -> Result<bool> {
        self.custom_view(view_id)?;
        if !self.subscriptions.contains(&sub_id) {
            return Err(DeckError::SubscriptionNotFound(sub_id));
        }
        Ok(self.membership.entry(view_id).or_default().insert(sub_id))
    }

    /// Remove a subscription from a view. Returns false if it was not a member.
    pub fn remove_subscription_from_view(
        &mut self,
        view_id: ViewId,
        sub_id: SubscriptionId,
    ) -> Result<bool> {
        self.custom_view(view_id)?;
        Ok(self
            .membership
            .get_mut(&view_id)
            .is_some_and(|members| members.remove(&sub_id)))
    }

    /// Point the page at another view. Unknown ids are ignored.
    pub fn set_active_view(&mut self, id: ViewId) -> bool {
        if self.view(id).is_none() || self.active_id == id {
            return false;
        }
        self.active_id = id;
        true
    }

    /// Filter of a view, or None if the view does not exist.
    pub fn membership_of(&self, id: ViewId) -> Option<Membership<'_>> {
        let view = self.view(id)?;
        if view.is_default {
            return Some(Membership::All);
        }
        let members = self.membership.get(&id)?;
        Some(Membership::Only(members))
    }

    /// Number of subscriptions a view shows.
    pub fn count_of(&self, id: ViewId) -> Option<usize> {
        match self.membership_of(id)? {
            Membership::All => Some(self.subscriptions.len()),
            Membership::Only(members) => Some(members.len()),
        }
    }

    /// Record the subscriptions that exist in this scope and drop stale membership.
    /// Returns the pruned `(view, subscription)` pairs, sorted.
    pub fn set_subscriptions(
        &mut self,
        subscriptions: &[Subscription],
    ) -> Vec<(ViewId, SubscriptionId)> {
        self.subscriptions = subscriptions
            .iter()
            .filter(|s| s.scope == self.scope)
            .map(|s| s.id)
            .collect();

        let known = &self.subscriptions;
        let mut pruned = Vec::new();
        for (view_id, members) in self.membership.iter_mut() {
            pruned.extend(
                members
                    .iter()
                    .filter(|id| !known.contains(id))
                    .map(|id| (*view_id, *id)),
            );
            members.retain(|id| known.contains(id));
        }
        pruned.sort_unstable();
        pruned
    }

    /// Forget a subscription removed system-wide.
    pub fn prune_subscription(&mut self, sub_id: SubscriptionId) {
        self.subscriptions.remove(&sub_id);
        for members in self.membership.values_mut() {
            members.remove(&sub_id);
        }
    }

    /// Views whose membership includes a subscription.
    pub fn views_containing(&self, sub_id: SubscriptionId) -> Vec<ViewId> {
        let mut ids: Vec<ViewId> = self
            .membership
            .iter()
            .filter(|(_, members)| members.contains(&sub_id))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve an id to a view that may be edited.
    fn custom_view(&self, id: ViewId) -> Result<&View> {
        match self.view(id) {
            None => Err(DeckError::ViewNotFound(id)),
            Some(view) if view.is_default => Err(DeckError::Protected(id)),
            Some(view) => Ok(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(ids: &[SubscriptionId]) -> Vec<Subscription> {
        ids.iter()
            .map(|id| Subscription::new(*id, Scope::Asset, format!("SYM{}", id)))
            .collect()
    }

    fn store_with(views: &[&str], sub_ids: &[SubscriptionId]) -> ViewStore {
        let mut store = ViewStore::new(Scope::Asset, 1);
        store.set_subscriptions(&subs(sub_ids));
        for (i, name) in views.iter().enumerate() {
            store.create_view(10 + i as ViewId, name).unwrap();
        }
        store
    }

    #[test]
    fn test_membership_is_none_only_for_default() {
        let store = store_with(&["Crypto", "Stocks"], &[1, 2]);

        for view in store.views() {
            let unfiltered = matches!(store.membership_of(view.id), Some(Membership::All));
            assert_eq!(unfiltered, view.is_default);
        }
        assert_eq!(store.membership_of(999), None);
    }

    #[test]
    fn test_create_rejects_empty_and_duplicate_names() {
        let mut store = store_with(&[" watchlist "], &[]);

        let err = store.create_view(20, "Watchlist").unwrap_err();
        assert!(matches!(
            err,
            DeckError::Validation(NameError::Duplicate(ref name)) if name == "Watchlist"
        ));

        let err = store.create_view(21, "   ").unwrap_err();
        assert!(matches!(err, DeckError::Validation(NameError::Empty)));

        // "All" belongs to the default view
        assert!(store.create_view(22, "all").is_err());
    }

    #[test]
    fn test_create_trims_and_keeps_active() {
        let mut store = ViewStore::new(Scope::Asset, 1);
        let view = store.create_view(5, "  Majors ").unwrap();

        assert_eq!(view.name, "Majors");
        assert!(!view.is_default);
        assert_eq!(store.active_view_id(), 1);
        assert_eq!(store.count_of(5), Some(0));
    }

    #[test]
    fn test_rename_excludes_own_name() {
        let mut store = store_with(&["Crypto", "Stocks"], &[]);

        store.rename_view(10, " CRYPTO ").unwrap();
        assert_eq!(store.view(10).unwrap().name, "CRYPTO");

        assert!(matches!(
            store.rename_view(10, "stocks"),
            Err(DeckError::Validation(NameError::Duplicate(_)))
        ));
        assert!(matches!(
            store.rename_view(99, "Other"),
            Err(DeckError::ViewNotFound(99))
        ));
        assert!(matches!(
            store.rename_view(1, "Everything"),
            Err(DeckError::Protected(1))
        ));
    }

    #[test]
    fn test_delete_active_view_falls_back_to_default() {
        let mut store = store_with(&["Crypto"], &[1]);
        assert!(store.set_active_view(10));

        store.delete_view(10).unwrap();

        assert_eq!(store.active_view_id(), store.default_view().id);
        assert!(store.view(10).is_none());
        assert_eq!(store.membership_of(10), None);
    }

    #[test]
    fn test_delete_default_is_protected() {
        let mut store = ViewStore::new(Scope::Dex, 2);
        assert!(matches!(store.delete_view(2), Err(DeckError::Protected(2))));
        assert!(matches!(store.delete_view(3), Err(DeckError::ViewNotFound(3))));
    }

    #[test]
    fn test_add_then_remove_is_noop() {
        let mut store = store_with(&["Crypto"], &[1, 2, 3]);
        store.add_subscription_to_view(10, 1).unwrap();
        let members = |store: &ViewStore| match store.membership_of(10) {
            Some(Membership::Only(set)) => set.clone(),
            other => panic!("unexpected membership {:?}", other),
        };
        let before = members(&store);

        assert!(store.add_subscription_to_view(10, 2).unwrap());
        assert!(!store.add_subscription_to_view(10, 2).unwrap());
        assert!(store.remove_subscription_from_view(10, 2).unwrap());
        assert!(!store.remove_subscription_from_view(10, 2).unwrap());

        assert_eq!(before, members(&store));
    }

    #[test]
    fn test_add_unknown_subscription_fails() {
        let mut store = store_with(&["Crypto"], &[1]);
        assert!(matches!(
            store.add_subscription_to_view(10, 42),
            Err(DeckError::SubscriptionNotFound(42))
        ));
        assert!(matches!(
            store.add_subscription_to_view(1, 1),
            Err(DeckError::Protected(1))
        ));
    }

    #[test]
    fn test_set_active_ignores_unknown_view() {
        let mut store = store_with(&["Crypto"], &[]);
        assert!(!store.set_active_view(77));
        assert_eq!(store.active_view_id(), 1);
    }

    #[test]
    fn test_count_of_default_is_total() {
        let mut store = store_with(&["Crypto"], &[1, 2, 3]);
        store.add_subscription_to_view(10, 3).unwrap();

        assert_eq!(store.count_of(1), Some(3));
        assert_eq!(store.count_of(10), Some(1));
        assert_eq!(store.count_of(404), None);
    }

    #[test]
    fn test_set_subscriptions_prunes_stale_membership() {
        let mut store = store_with(&["Crypto", "Stocks"], &[1, 2, 3]);
        store.add_subscription_to_view(10, 1).unwrap();
        store.add_subscription_to_view(10, 2).unwrap();
        store.add_subscription_to_view(11, 2).unwrap();

        let pruned = store.set_subscriptions(&subs(&[1, 3]));

        assert_eq!(pruned, vec![(10, 2), (11, 2)]);
        assert_eq!(store.views_containing(2), Vec::<ViewId>::new());
        assert_eq!(store.views_containing(1), vec![10]);
    }

    #[test]
    fn test_prune_subscription_keeps_views() {
        let mut store = store_with(&["Crypto"], &[1, 2]);
        store.add_subscription_to_view(10, 1).unwrap();

        store.prune_subscription(1);

        assert!(store.view(10).is_some());
        assert_eq!(store.count_of(10), Some(0));
        assert_eq!(store.count_of(1), Some(1));
    }

    #[test]
    fn test_from_snapshot_requires_single_default() {
        let snapshot = ViewSnapshot {
            views: vec![View::new(3, Scope::Asset, "Crypto")],
            membership: HashMap::new(),
        };
        assert!(ViewStore::from_snapshot(Scope::Asset, snapshot).is_err());
    }

    #[test]
    fn test_replace_keeps_existing_active_view() {
        let mut store = store_with(&["Crypto", "Stocks"], &[]);
        store.set_active_view(11);

        let mut snapshot = ViewSnapshot {
            views: store.views().to_vec(),
            membership: HashMap::new(),
        };
        snapshot.views.push(View::default_for(2, Scope::Dex));
        store.replace(snapshot.clone()).unwrap();
        assert_eq!(store.active_view_id(), 11);
        assert_eq!(store.views().len(), 3);

        snapshot.views.retain(|v| v.id != 11);
        store.replace(snapshot).unwrap();
        assert_eq!(store.active_view_id(), 1);
    }
}
