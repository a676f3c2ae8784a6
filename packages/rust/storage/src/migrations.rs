//! SQL migration definitions for the indexables database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// Highest migration version shipped with this build.
pub(crate) const LATEST_VERSION: u32 = 1;

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: indexables, indexable_hierarchy",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Cached per-object metadata
CREATE TABLE IF NOT EXISTS indexables (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    object_id        INTEGER,
    object_type      TEXT NOT NULL,
    object_sub_type  TEXT,
    permalink        TEXT,
    permalink_hash   TEXT,
    title            TEXT,
    description      TEXT,
    breadcrumb_title TEXT,
    og_description   TEXT,
    has_ancestors    INTEGER NOT NULL DEFAULT 0,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_indexables_object ON indexables(object_id, object_type);
CREATE INDEX IF NOT EXISTS idx_indexables_permalink_hash ON indexables(permalink_hash);

-- Ancestor chain per indexable; depth 1 is the direct parent
CREATE TABLE IF NOT EXISTS indexable_hierarchy (
    indexable_id INTEGER NOT NULL REFERENCES indexables(id) ON DELETE CASCADE,
    ancestor_id  INTEGER NOT NULL REFERENCES indexables(id) ON DELETE CASCADE,
    depth        INTEGER NOT NULL,
    PRIMARY KEY (indexable_id, ancestor_id)
);

CREATE INDEX IF NOT EXISTS idx_hierarchy_ancestor ON indexable_hierarchy(ancestor_id, depth);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
