// File-backed view persistence.
// Keeps every scope's views and their membership in one JSON document.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::backend::{Scope, SubscriptionId};
use crate::error::{DeckError, NameError, Result};
use crate::services::ViewPersistence;
use crate::state::{View, ViewId, ViewSnapshot, name_key};

use super::store::{read_stored, write_stored};

/// Id of the default "All" view seeded for the asset page.
pub const ASSET_DEFAULT_VIEW_ID: ViewId = 1;
/// Id of the default "All" view seeded for the dex page.
pub const DEX_DEFAULT_VIEW_ID: ViewId = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ViewsDocument {
    views: Vec<View>,
    #[serde(default)]
    membership: BTreeMap<ViewId, BTreeSet<SubscriptionId>>,
}

impl Default for ViewsDocument {
    fn default() -> Self {
        Self {
            views: vec![
                View::default_for(ASSET_DEFAULT_VIEW_ID, Scope::Asset),
                View::default_for(DEX_DEFAULT_VIEW_ID, Scope::Dex),
            ],
            membership: BTreeMap::new(),
        }
    }
}

impl ViewsDocument {
    fn view(&self, id: ViewId) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }

    fn custom_view(&self, id: ViewId) -> Result<&View> {
        match self.view(id) {
            None => Err(DeckError::ViewNotFound(id)),
            Some(view) if view.is_default => Err(DeckError::Protected(id)),
            Some(view) => Ok(view),
        }
    }

    fn check_unique(&self, scope: Scope, name: &str, exclude: Option<ViewId>) -> Result<()> {
        let key = name_key(name);
        let taken = self
            .views
            .iter()
            .filter(|v| v.scope == scope && Some(v.id) != exclude)
            .any(|v| name_key(&v.name) == key);
        if taken {
            return Err(NameError::Duplicate(name.trim().to_string()).into());
        }
        Ok(())
    }
}

/// `ViewPersistence` over a local JSON file.
pub struct FileViewPersistence {
    path: PathBuf,
    document: Mutex<ViewsDocument>,
}

impl FileViewPersistence {
    /// Open the document, seeding the default views if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = read_stored::<ViewsDocument>(&path)?
            .map(|stored| stored.data)
            .unwrap_or_default();
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Apply a change to a copy of the document and write it out.
    /// The in-memory document only changes once the write succeeded.
    async fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut ViewsDocument) -> Result<bool> + Send,
    {
        let mut document = self.document.lock().await;
        let mut next = document.clone();
        if !change(&mut next)? {
            return Ok(());
        }
        write_stored(&self.path, &next)?;
        *document = next;
        Ok(())
    }
}

#[async_trait]
impl ViewPersistence for FileViewPersistence {
    async fn create_view(&self, view: &View) -> Result<()> {
        self.update(|doc| {
            if view.is_default {
                return Err(DeckError::Persistence(format!(
                    "refusing to create a second default {} view",
                    view.scope
                )));
            }
            if doc.view(view.id).is_some() {
                return Err(DeckError::Persistence(format!(
                    "view id {} already exists",
                    view.id
                )));
            }
            if view.name.trim().is_empty() {
                return Err(NameError::Empty.into());
            }
            doc.check_unique(view.scope, &view.name, None)?;
            doc.views.push(view.clone());
            Ok(true)
        })
        .await?;
        info!(view_id = view.id, scope = %view.scope, "view created");
        Ok(())
    }

    async fn rename_view(&self, id: ViewId, name: &str) -> Result<()> {
        self.update(|doc| {
            let scope = doc.custom_view(id)?.scope;
            if name.trim().is_empty() {
                return Err(NameError::Empty.into());
            }
            doc.check_unique(scope, name, Some(id))?;
            if let Some(view) = doc.views.iter_mut().find(|v| v.id == id) {
                view.name = name.trim().to_string();
            }
            Ok(true)
        })
        .await?;
        info!(view_id = id, "view renamed");
        Ok(())
    }

    async fn delete_view(&self, id: ViewId) -> Result<()> {
        self.update(|doc| {
            doc.custom_view(id)?;
            doc.views.retain(|v| v.id != id);
            doc.membership.remove(&id);
            Ok(true)
        })
        .await?;
        info!(view_id = id, "view deleted");
        Ok(())
    }

    async fn add_subscription_to_view(
        &self,
        view_id: ViewId,
        sub_id: SubscriptionId,
    ) -> Result<()> {
        self.update(|doc| {
            doc.custom_view(view_id)?;
            Ok(doc.membership.entry(view_id).or_default().insert(sub_id))
        })
        .await
    }

    async fn remove_subscription_from_view(
        &self,
        view_id: ViewId,
        sub_id: SubscriptionId,
    ) -> Result<()> {
        self.update(|doc| {
            doc.custom_view(view_id)?;
            Ok(doc
                .membership
                .get_mut(&view_id)
                .is_some_and(|members| members.remove(&sub_id)))
        })
        .await
    }

    async fn refresh(&self, scope: Scope) -> Result<ViewSnapshot> {
        let document = self.document.lock().await;
        let views: Vec<View> = document
            .views
            .iter()
            .filter(|v| v.scope == scope)
            .cloned()
            .collect();
        let membership = views
            .iter()
            .filter_map(|v| {
                document
                    .membership
                    .get(&v.id)
                    .map(|members| (v.id, members.iter().copied().collect()))
            })
            .collect();
        Ok(ViewSnapshot { views, membership })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> FileViewPersistence {
        FileViewPersistence::open(dir.path().join("views.json")).unwrap()
    }

    #[tokio::test]
    async fn test_seeds_default_views() {
        let dir = TempDir::new().unwrap();
        let persistence = open(&dir);

        let asset = persistence.refresh(Scope::Asset).await.unwrap();
        assert_eq!(asset.views, vec![View::default_for(1, Scope::Asset)]);

        let dex = persistence.refresh(Scope::Dex).await.unwrap();
        assert_eq!(dex.views, vec![View::default_for(2, Scope::Dex)]);
    }

    #[tokio::test]
    async fn test_views_and_membership_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let persistence = open(&dir);
        persistence
            .create_view(&View::new(3, Scope::Asset, "Crypto"))
            .await
            .unwrap();
        persistence.add_subscription_to_view(3, 10).await.unwrap();
        persistence.add_subscription_to_view(3, 11).await.unwrap();
        persistence.add_subscription_to_view(3, 11).await.unwrap();
        persistence.remove_subscription_from_view(3, 10).await.unwrap();
        drop(persistence);

        let snapshot = open(&dir).refresh(Scope::Asset).await.unwrap();
        assert_eq!(snapshot.views.len(), 2);
        assert_eq!(snapshot.membership[&3], HashSet::from([11]));
    }

    #[tokio::test]
    async fn test_names_are_unique_per_scope() {
        let dir = TempDir::new().unwrap();
        let persistence = open(&dir);
        persistence
            .create_view(&View::new(3, Scope::Asset, "Majors"))
            .await
            .unwrap();

        let err = persistence
            .create_view(&View::new(4, Scope::Asset, " majors "))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        // Same name on the other page is fine
        persistence
            .create_view(&View::new(4, Scope::Dex, "Majors"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_default_views_are_protected() {
        let dir = TempDir::new().unwrap();
        let persistence = open(&dir);

        assert!(matches!(
            persistence.delete_view(1).await,
            Err(DeckError::Protected(1))
        ));
        assert!(matches!(
            persistence.rename_view(2, "Everything").await,
            Err(DeckError::Protected(2))
        ));
        assert!(matches!(
            persistence.add_subscription_to_view(1, 5).await,
            Err(DeckError::Protected(1))
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_membership() {
        let dir = TempDir::new().unwrap();
        let persistence = open(&dir);
        persistence
            .create_view(&View::new(3, Scope::Dex, "Solana"))
            .await
            .unwrap();
        persistence.add_subscription_to_view(3, 1).await.unwrap();

        persistence.delete_view(3).await.unwrap();

        let snapshot = persistence.refresh(Scope::Dex).await.unwrap();
        assert!(snapshot.membership.is_empty());
        assert!(matches!(
            persistence.delete_view(3).await,
            Err(DeckError::ViewNotFound(3))
        ));
    }

    #[tokio::test]
    async fn test_rename_view() {
        let dir = TempDir::new().unwrap();
        let persistence = open(&dir);
        persistence
            .create_view(&View::new(3, Scope::Asset, "Tech"))
            .await
            .unwrap();

        persistence.rename_view(3, "  Big Tech ").await.unwrap();

        let snapshot = persistence.refresh(Scope::Asset).await.unwrap();
        assert_eq!(snapshot.views[1].name, "Big Tech");
    }
}
