//! Structured-data graph generation.
//!
//! Builds schema.org nodes for a page from a validated [`RenderContext`].
//! Pieces implement [`SchemaPiece`]; [`SchemaGraph`] runs them in order and
//! merges their output into one `@graph` document. Nodes reference each other
//! only through `@id` strings built by [`SchemaIds`].

pub mod context;
pub mod graph;
pub mod helpers;
pub mod ids;
pub mod pieces;
pub mod sanitize;

pub use context::{Post, RenderContext, RenderContextBuilder, SiteRepresents};
pub use graph::{SCHEMA_CONTEXT, SchemaGraph};
pub use helpers::{CurrentPageHelper, RequestFlags, format_w3c, parse_gmt};
pub use ids::SchemaIds;
pub use pieces::{SchemaNode, SchemaPiece, WebPage, id_ref};
pub use sanitize::{DESCRIPTION_ALLOWED_TAGS, strip_shortcodes, strip_tags};
