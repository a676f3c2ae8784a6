//! libSQL storage layer for cached indexables.
//!
//! The [`Storage`] struct wraps a libSQL database holding indexable records and
//! their ancestor hierarchy, and implements [`IndexableRepository`].
//!
//! **Access rules:**
//! - Save flows: read-write via [`Storage::open`]
//! - Inspection tools: read-only via [`Storage::open_readonly`]

mod migrations;

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};
use seograph_shared::{Indexable, IndexableRepository, ObjectType, Result, SeoGraphError};

/// Column list shared by every indexable query; the table is aliased `i`.
const SELECT_INDEXABLE: &str = "SELECT i.id, i.object_id, i.object_type, i.object_sub_type, \
     i.permalink, i.permalink_hash, i.title, i.description, i.breadcrumb_title, \
     i.og_description, i.has_ancestors, i.updated_at FROM indexables i";

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SeoGraphError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        SeoGraphError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    pub async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Whether every migration shipped with this build has been applied.
    pub async fn migrations_applied(&self) -> bool {
        self.schema_version().await >= migrations::LATEST_VERSION
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(SeoGraphError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Indexable operations
    // -----------------------------------------------------------------------

    /// Insert a new indexable or update the existing row with the same id.
    /// Returns the stored record with `id` and `updated_at` filled in.
    pub async fn save_indexable(&self, indexable: &Indexable) -> Result<Indexable> {
        self.check_writable()?;
        let now = Utc::now();
        let updated_at = now.to_rfc3339();

        let id = match indexable.id {
            Some(id) => {
                let changed = self
                    .conn
                    .execute(
                        "UPDATE indexables SET
                           object_id = ?1, object_type = ?2, object_sub_type = ?3,
                           permalink = ?4, permalink_hash = ?5, title = ?6,
                           description = ?7, breadcrumb_title = ?8, og_description = ?9,
                           has_ancestors = ?10, updated_at = ?11
                         WHERE id = ?12",
                        params![
                            indexable.object_id,
                            indexable.object_type.as_str(),
                            indexable.object_sub_type.as_deref(),
                            indexable.permalink.as_deref(),
                            indexable.permalink_hash.as_deref(),
                            indexable.title.as_deref(),
                            indexable.description.as_deref(),
                            indexable.breadcrumb_title.as_deref(),
                            indexable.og_description.as_deref(),
                            i64::from(indexable.has_ancestors),
                            updated_at.as_str(),
                            id,
                        ],
                    )
                    .await
                    .map_err(|e| SeoGraphError::Storage(e.to_string()))?;
                if changed == 0 {
                    return Err(SeoGraphError::Storage(format!(
                        "indexable {id} does not exist"
                    )));
                }
                id
            }
            None => {
                self.conn
                    .execute(
                        "INSERT INTO indexables (object_id, object_type, object_sub_type, permalink,
                           permalink_hash, title, description, breadcrumb_title, og_description,
                           has_ancestors, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                        params![
                            indexable.object_id,
                            indexable.object_type.as_str(),
                            indexable.object_sub_type.as_deref(),
                            indexable.permalink.as_deref(),
                            indexable.permalink_hash.as_deref(),
                            indexable.title.as_deref(),
                            indexable.description.as_deref(),
                            indexable.breadcrumb_title.as_deref(),
                            indexable.og_description.as_deref(),
                            i64::from(indexable.has_ancestors),
                            updated_at.as_str(),
                        ],
                    )
                    .await
                    .map_err(|e| SeoGraphError::Storage(e.to_string()))?;
                self.conn.last_insert_rowid()
            }
        };

        tracing::debug!(id, object_type = %indexable.object_type, "indexable saved");

        Ok(Indexable {
            id: Some(id),
            updated_at: Some(now),
            ..indexable.clone()
        })
    }

    /// Get an indexable by storage id.
    pub async fn find_indexable(&self, id: i64) -> Result<Option<Indexable>> {
        let mut rows = self
            .conn
            .query(&format!("{SELECT_INDEXABLE} WHERE i.id = ?1"), params![id])
            .await
            .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_indexable(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(SeoGraphError::Storage(e.to_string())),
        }
    }

    /// Get the indexable describing a content object.
    pub async fn find_by_object(
        &self,
        object_id: i64,
        object_type: ObjectType,
    ) -> Result<Option<Indexable>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "{SELECT_INDEXABLE} WHERE i.object_id = ?1 AND i.object_type = ?2 \
                     ORDER BY i.id LIMIT 1"
                ),
                params![object_id, object_type.as_str()],
            )
            .await
            .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_indexable(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(SeoGraphError::Storage(e.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Hierarchy operations
    // -----------------------------------------------------------------------

    /// Replace the ancestor chain of an indexable. `ancestor_ids` is ordered
    /// nearest first: index 0 becomes depth 1 (the direct parent).
    ///
    /// The chain is written in one transaction; on error the previous chain
    /// and `has_ancestors` flag are left as they were.
    pub async fn set_ancestors(&self, indexable_id: i64, ancestor_ids: &[i64]) -> Result<()> {
        self.check_writable()?;

        let mut seen = HashSet::with_capacity(ancestor_ids.len());
        for &ancestor_id in ancestor_ids {
            if ancestor_id == indexable_id {
                return Err(SeoGraphError::validation(format!(
                    "indexable {indexable_id} cannot be its own ancestor"
                )));
            }
            if !seen.insert(ancestor_id) {
                return Err(SeoGraphError::validation(format!(
                    "ancestor {ancestor_id} listed twice for indexable {indexable_id}"
                )));
            }
        }

        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

        match write_ancestors(&tx, indexable_id, ancestor_ids).await {
            Ok(()) => tx
                .commit()
                .await
                .map_err(|e| SeoGraphError::Storage(e.to_string())),
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(indexable_id, error = %rollback, "hierarchy rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Direct children of the indexable with storage id `parent_id`.
    pub async fn children_of(&self, parent_id: i64) -> Result<Vec<Indexable>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "{SELECT_INDEXABLE}
                     JOIN indexable_hierarchy h ON h.indexable_id = i.id
                     WHERE h.ancestor_id = ?1 AND h.depth = 1
                     ORDER BY i.id"
                ),
                params![parent_id],
            )
            .await
            .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_indexable(&row)?);
        }
        Ok(results)
    }
}

impl IndexableRepository for Storage {
    async fn get_children(&self, indexable: &Indexable) -> Result<Vec<Indexable>> {
        // An unsaved record cannot be anyone's ancestor yet.
        match indexable.id {
            Some(id) => self.children_of(id).await,
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, indexable: &Indexable) -> Result<Indexable> {
        self.save_indexable(indexable).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Indexable>> {
        self.find_indexable(id).await
    }

    async fn find_by_id_and_type(
        &self,
        object_id: i64,
        object_type: ObjectType,
    ) -> Result<Option<Indexable>> {
        self.find_by_object(object_id, object_type).await
    }
}

/// Flag the indexable and rewrite its hierarchy rows on `conn`.
async fn write_ancestors(conn: &Connection, indexable_id: i64, ancestor_ids: &[i64]) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE indexables SET has_ancestors = ?1 WHERE id = ?2",
            params![i64::from(!ancestor_ids.is_empty()), indexable_id],
        )
        .await
        .map_err(|e| SeoGraphError::Storage(e.to_string()))?;
    if changed == 0 {
        return Err(SeoGraphError::Storage(format!(
            "indexable {indexable_id} does not exist"
        )));
    }

    conn.execute(
        "DELETE FROM indexable_hierarchy WHERE indexable_id = ?1",
        params![indexable_id],
    )
    .await
    .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

    for (index, ancestor_id) in ancestor_ids.iter().enumerate() {
        let depth = index as i64 + 1;
        conn.execute(
            "INSERT INTO indexable_hierarchy (indexable_id, ancestor_id, depth)
             VALUES (?1, ?2, ?3)",
            params![indexable_id, *ancestor_id, depth],
        )
        .await
        .map_err(|e| SeoGraphError::Storage(e.to_string()))?;
    }
    Ok(())
}

/// Convert a database row to an [`Indexable`].
fn row_to_indexable(row: &libsql::Row) -> Result<Indexable> {
    let object_type: String = row
        .get(2)
        .map_err(|e| SeoGraphError::Storage(e.to_string()))?;

    Ok(Indexable {
        id: Some(
            row.get::<i64>(0)
                .map_err(|e| SeoGraphError::Storage(e.to_string()))?,
        ),
        object_id: row.get::<i64>(1).ok(),
        object_type: object_type
            .parse()
            .map_err(|e: SeoGraphError| SeoGraphError::Storage(e.to_string()))?,
        object_sub_type: row.get::<String>(3).ok(),
        permalink: row.get::<String>(4).ok(),
        permalink_hash: row.get::<String>(5).ok(),
        title: row.get::<String>(6).ok(),
        description: row.get::<String>(7).ok(),
        breadcrumb_title: row.get::<String>(8).ok(),
        og_description: row.get::<String>(9).ok(),
        has_ancestors: row.get::<i64>(10).unwrap_or(0) != 0,
        updated_at: {
            let s: String = row
                .get(11)
                .map_err(|e| SeoGraphError::Storage(e.to_string()))?;
            Some(
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| SeoGraphError::Storage(format!("invalid date: {e}")))?,
            )
        },
    })
}
