//! Ancestor cascade: invalidates descendants' cached ancestry data.
//!
//! A child's permalink is derived from its ancestors, so when a post or term
//! changes its permalink every direct child's cached permalink is stale. The
//! watcher clears those fields and persists each child; the next access
//! rebuilds them.

use tracing::{debug, info, instrument};

use seograph_shared::{Indexable, IndexableRepository, Result};

/// Invoked with `(new, previous)` every time an indexable is saved.
pub struct IndexableAncestorWatcher<R> {
    repository: R,
}

impl<R: IndexableRepository> IndexableAncestorWatcher<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Clear the ancestor-derived fields of the direct children of `indexable`
    /// when its permalink changed.
    ///
    /// Returns `true` once the guards pass and the children were processed,
    /// including when there are none. Repository errors propagate; children
    /// saved before a failure stay saved.
    #[instrument(skip_all, fields(id = ?indexable.id, object_type = %indexable.object_type))]
    pub async fn clear_ancestors(
        &self,
        indexable: &Indexable,
        indexable_before: &Indexable,
    ) -> Result<bool> {
        if !indexable.object_type.has_descendants() {
            debug!("object type has no descendants");
            return Ok(false);
        }

        if indexable.permalink == indexable_before.permalink {
            debug!("permalink unchanged");
            return Ok(false);
        }

        let children = self.repository.get_children(indexable).await?;
        let count = children.len();

        for mut child in children {
            child.clear_permalink();
            self.repository.save(&child).await?;
        }

        info!(children = count, "cleared ancestor-derived permalinks");
        Ok(true)
    }
}
