//! Indexable lifecycle logic for seograph.
//!
//! This crate ties the repository, the schema crate, and configuration
//! together: the ancestor watcher that keeps cached permalinks consistent,
//! the save flow that wires it to content mutations, and presentation values
//! derived from indexables.

pub mod presentation;
pub mod save;
pub mod watcher;

pub use presentation::{PostTypeHelper, PostTypePresentation};
pub use save::{Conditional, IndexableSaveFlow, MigrationsConditional, SaveOutcome};
pub use watcher::IndexableAncestorWatcher;
