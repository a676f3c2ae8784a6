//! The repository seam over cached indexable records.

use std::future::Future;

use crate::error::Result;
use crate::types::{Indexable, ObjectType};

/// CRUD/query interface over persisted indexables.
///
/// Implemented by the libSQL storage layer; tests substitute in-memory doubles.
pub trait IndexableRepository {
    /// Direct children (hierarchy depth 1) of `indexable`.
    fn get_children(&self, indexable: &Indexable) -> impl Future<Output = Result<Vec<Indexable>>>;

    /// Persist `indexable`, returning the stored record with its id assigned.
    fn save(&self, indexable: &Indexable) -> impl Future<Output = Result<Indexable>>;

    /// Look up a record by storage id.
    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Indexable>>>;

    /// Look up a record by the content object it describes.
    fn find_by_id_and_type(
        &self,
        object_id: i64,
        object_type: ObjectType,
    ) -> impl Future<Output = Result<Option<Indexable>>>;
}

/// Shared references delegate, so one repository can back several consumers.
impl<R: IndexableRepository> IndexableRepository for &R {
    async fn get_children(&self, indexable: &Indexable) -> Result<Vec<Indexable>> {
        (**self).get_children(indexable).await
    }

    async fn save(&self, indexable: &Indexable) -> Result<Indexable> {
        (**self).save(indexable).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Indexable>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_id_and_type(
        &self,
        object_id: i64,
        object_type: ObjectType,
    ) -> Result<Option<Indexable>> {
        (**self).find_by_id_and_type(object_id, object_type).await
    }
}
