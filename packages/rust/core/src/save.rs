//! Save flow: persist an indexable, then notify the ancestor watcher.
//!
//! This is the wiring between content mutations and the watcher. Whether the
//! watcher takes part is decided once, when the flow is built, from its
//! [`Conditional`]s; the watcher itself never checks them.

use tracing::{debug, instrument};

use seograph_shared::{Indexable, IndexableRepository, Result};
use seograph_storage::Storage;

use crate::watcher::IndexableAncestorWatcher;

/// A precondition an integration needs before it is attached.
pub trait Conditional {
    fn is_met(&self) -> bool;
}

/// Met when the indexable tables are fully migrated.
#[derive(Debug, Clone, Copy)]
pub struct MigrationsConditional {
    applied: bool,
}

impl MigrationsConditional {
    pub fn new(applied: bool) -> Self {
        Self { applied }
    }

    /// Read the migration status of an open database.
    pub async fn from_storage(storage: &Storage) -> Self {
        Self::new(storage.migrations_applied().await)
    }
}

impl Conditional for MigrationsConditional {
    fn is_met(&self) -> bool {
        self.applied
    }
}

/// Result of [`IndexableSaveFlow::save`].
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// The record as persisted.
    pub indexable: Indexable,
    /// Whether the watcher cascaded into the record's children.
    pub descendants_invalidated: bool,
}

/// Persists indexables through a repository and runs the watcher on each save.
pub struct IndexableSaveFlow<'a, R> {
    repository: &'a R,
    watcher: Option<IndexableAncestorWatcher<&'a R>>,
}

impl<'a, R: IndexableRepository> IndexableSaveFlow<'a, R> {
    /// Build the flow; the watcher is attached only if every conditional is met.
    pub fn new(repository: &'a R, conditionals: &[&dyn Conditional]) -> Self {
        let watcher = conditionals
            .iter()
            .all(|c| c.is_met())
            .then(|| IndexableAncestorWatcher::new(repository));
        if watcher.is_none() {
            debug!("ancestor watcher not attached, conditionals unmet");
        }
        Self {
            repository,
            watcher,
        }
    }

    pub fn watcher_attached(&self) -> bool {
        self.watcher.is_some()
    }

    /// Persist `indexable` and cascade to its children when its permalink moved.
    ///
    /// The previous version is looked up by storage id, falling back to the
    /// content object. A record saved for the first time has no children to
    /// invalidate.
    #[instrument(skip_all, fields(id = ?indexable.id, object_type = %indexable.object_type))]
    pub async fn save(&self, indexable: Indexable) -> Result<SaveOutcome> {
        let previous = self.find_previous(&indexable).await?;

        let mut to_save = indexable;
        if let Some(previous) = &previous {
            if to_save.id.is_none() {
                to_save.id = previous.id;
            }
            // The ancestor flag follows the stored hierarchy, not the caller.
            to_save.has_ancestors = previous.has_ancestors;
        }

        let saved = self.repository.save(&to_save).await?;

        let descendants_invalidated = match (&self.watcher, &previous) {
            (Some(watcher), Some(previous)) => watcher.clear_ancestors(&saved, previous).await?,
            _ => false,
        };

        Ok(SaveOutcome {
            indexable: saved,
            descendants_invalidated,
        })
    }

    async fn find_previous(&self, indexable: &Indexable) -> Result<Option<Indexable>> {
        if let Some(id) = indexable.id {
            return self.repository.find_by_id(id).await;
        }
        match indexable.object_id {
            Some(object_id) => {
                self.repository
                    .find_by_id_and_type(object_id, indexable.object_type)
                    .await
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seograph_shared::ObjectType;
    use uuid::Uuid;

    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("seograph_flow_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn page(object_id: i64, permalink: &str) -> Indexable {
        let mut indexable = Indexable::for_object(ObjectType::Post, object_id, "page");
        indexable.set_permalink(Some(permalink.into()));
        indexable
    }

    /// Parent `/a/` (object 1) with one child `/a/b/` (object 2).
    async fn seeded(storage: &Storage) -> (Indexable, Indexable) {
        let parent = storage
            .save_indexable(&page(1, "https://example.org/a/"))
            .await
            .unwrap();
        let child = storage
            .save_indexable(&page(2, "https://example.org/a/b/"))
            .await
            .unwrap();
        storage
            .set_ancestors(child.id.unwrap(), &[parent.id.unwrap()])
            .await
            .unwrap();
        (parent, child)
    }

    #[tokio::test]
    async fn permalink_change_cascades_to_stored_child() {
        let storage = test_storage().await;
        let (parent, child) = seeded(&storage).await;
        let migrated = MigrationsConditional::from_storage(&storage).await;
        let flow = IndexableSaveFlow::new(&storage, &[&migrated]);
        assert!(flow.watcher_attached());

        let mut moved = parent.clone();
        moved.set_permalink(Some("https://example.org/renamed/".into()));
        let outcome = flow.save(moved).await.expect("save");

        assert!(outcome.descendants_invalidated);
        assert_eq!(outcome.indexable.id, parent.id);
        let child = storage.find_indexable(child.id.unwrap()).await.unwrap().unwrap();
        assert!(child.permalink.is_none());
        assert!(child.permalink_hash.is_none());
    }

    #[tokio::test]
    async fn save_by_object_reuses_existing_row() {
        let storage = test_storage().await;
        let (parent, _) = seeded(&storage).await;
        let flow = IndexableSaveFlow::new(&storage, &[&MigrationsConditional::new(true)]);

        // Same object, no storage id: resolved through object id + type.
        let outcome = flow
            .save(page(1, "https://example.org/elsewhere/"))
            .await
            .expect("save");
        assert_eq!(outcome.indexable.id, parent.id);
        assert!(outcome.descendants_invalidated);
    }

    #[tokio::test]
    async fn title_change_keeps_child_cache() {
        let storage = test_storage().await;
        let (parent, child) = seeded(&storage).await;
        let flow = IndexableSaveFlow::new(&storage, &[&MigrationsConditional::new(true)]);

        let mut retitled = parent.clone();
        retitled.title = Some("New title".into());
        let outcome = flow.save(retitled).await.expect("save");

        assert!(!outcome.descendants_invalidated);
        let child = storage.find_indexable(child.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(child.permalink.as_deref(), Some("https://example.org/a/b/"));
    }

    #[tokio::test]
    async fn resave_keeps_hierarchy_flag() {
        let storage = test_storage().await;
        let (parent, child) = seeded(&storage).await;
        let flow = IndexableSaveFlow::new(&storage, &[&MigrationsConditional::new(true)]);

        let mut edited = Indexable::for_object(ObjectType::Post, 2, "page");
        edited.title = Some("Edited child".into());
        assert!(!edited.has_ancestors);
        let outcome = flow.save(edited).await.expect("save");

        assert_eq!(outcome.indexable.id, child.id);
        assert!(outcome.indexable.has_ancestors);
        let stored = storage.find_indexable(child.id.unwrap()).await.unwrap().unwrap();
        assert!(stored.has_ancestors);
        assert_eq!(stored.title.as_deref(), Some("Edited child"));
        let children = storage.children_of(parent.id.unwrap()).await.unwrap();
        assert_eq!(children.len(), 1);
        assert!(children[0].has_ancestors);
    }

    #[tokio::test]
    async fn first_save_does_not_cascade() {
        let storage = test_storage().await;
        let flow = IndexableSaveFlow::new(&storage, &[&MigrationsConditional::new(true)]);

        let outcome = flow
            .save(page(9, "https://example.org/new/"))
            .await
            .expect("save");
        assert!(outcome.indexable.id.is_some());
        assert!(!outcome.descendants_invalidated);
    }

    #[tokio::test]
    async fn unmet_conditional_detaches_watcher() {
        let storage = test_storage().await;
        let (parent, child) = seeded(&storage).await;
        let flow = IndexableSaveFlow::new(&storage, &[&MigrationsConditional::new(false)]);
        assert!(!flow.watcher_attached());

        let mut moved = parent.clone();
        moved.set_permalink(Some("https://example.org/renamed/".into()));
        let outcome = flow.save(moved).await.expect("save");

        assert!(!outcome.descendants_invalidated);
        let child = storage.find_indexable(child.id.unwrap()).await.unwrap().unwrap();
        assert!(child.permalink.is_some());
    }
}
