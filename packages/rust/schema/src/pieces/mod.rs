//! Schema piece trait and built-in pieces.
//!
//! A piece decides whether it applies to the current page and, if so, emits
//! exactly one node of the graph.

mod webpage;

use serde_json::{Map, Value, json};

use crate::context::RenderContext;

pub use webpage::WebPage;

/// One node of the output graph; always carries `@type` and `@id`.
pub type SchemaNode = Map<String, Value>;

/// A unit producing one node of the structured-data graph.
pub trait SchemaPiece: Send + Sync {
    /// Human-readable piece name for tracing.
    fn name(&self) -> &str;

    /// Whether this piece belongs in the graph for `ctx`.
    /// Checked before [`SchemaPiece::generate`] is ever called.
    fn is_needed(&self, ctx: &RenderContext) -> bool;

    /// Build the node for `ctx`.
    fn generate(&self, ctx: &RenderContext) -> SchemaNode;
}

/// An `{"@id": id}` cross-reference to another node.
pub fn id_ref(id: impl Into<String>) -> Value {
    json!({ "@id": id.into() })
}
