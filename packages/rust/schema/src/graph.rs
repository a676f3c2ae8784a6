//! Graph assembly: runs registered pieces and merges their nodes.

use serde_json::{Value, json};
use tracing::{debug, instrument};

use seograph_shared::AppConfig;

use crate::context::RenderContext;
use crate::pieces::{SchemaPiece, WebPage};

/// `@context` of every emitted document.
pub const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Holds schema pieces in registration order.
pub struct SchemaGraph {
    pieces: Vec<Box<dyn SchemaPiece>>,
}

impl SchemaGraph {
    /// An empty graph; add pieces with [`SchemaGraph::with_piece`].
    pub fn new() -> Self {
        Self { pieces: Vec::new() }
    }

    /// The built-in pieces configured for the site.
    pub fn with_defaults(config: &AppConfig) -> Self {
        Self::new().with_piece(Box::new(WebPage::with_language(config.site.language.clone())))
    }

    pub fn with_piece(mut self, piece: Box<dyn SchemaPiece>) -> Self {
        self.pieces.push(piece);
        self
    }

    /// Generate the graph document for `ctx`.
    #[instrument(skip_all, fields(object_type = %ctx.indexable.object_type, pieces = self.pieces.len()))]
    pub fn generate(&self, ctx: &RenderContext) -> Value {
        let mut nodes = Vec::with_capacity(self.pieces.len());

        for piece in &self.pieces {
            if !piece.is_needed(ctx) {
                debug!(piece = piece.name(), "piece not needed, skipping");
                continue;
            }
            nodes.push(Value::Object(piece.generate(ctx)));
        }

        json!({
            "@context": SCHEMA_CONTEXT,
            "@graph": nodes,
        })
    }
}

impl Default for SchemaGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderContextBuilder;
    use crate::pieces::SchemaNode;
    use seograph_shared::{Indexable, ObjectType};

    struct Marker;

    impl SchemaPiece for Marker {
        fn name(&self) -> &str {
            "marker"
        }
        fn is_needed(&self, _ctx: &RenderContext) -> bool {
            true
        }
        fn generate(&self, _ctx: &RenderContext) -> SchemaNode {
            let mut node = SchemaNode::new();
            node.insert("@type".into(), "Thing".into());
            node.insert("@id".into(), "https://example.org/#marker".into());
            node
        }
    }

    fn context(object_type: ObjectType) -> RenderContext {
        RenderContextBuilder::new(Indexable::new(object_type))
            .canonical("https://example.org/")
            .site_url("https://example.org/")
            .title("Example")
            .schema_page_type("WebPage")
            .build()
            .unwrap()
    }

    #[test]
    fn default_graph_emits_webpage() {
        let graph = SchemaGraph::with_defaults(&AppConfig::default());
        let doc = graph.generate(&context(ObjectType::HomePage));

        assert_eq!(doc["@context"], SCHEMA_CONTEXT);
        let nodes = doc["@graph"].as_array().expect("graph array");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0]["@id"], "https://example.org/#webpage");
        assert_eq!(nodes[0]["inLanguage"], "en-US");
    }

    #[test]
    fn error_page_skips_webpage_keeps_others() {
        let graph = SchemaGraph::with_defaults(&AppConfig::default()).with_piece(Box::new(Marker));
        let doc = graph.generate(&context(ObjectType::ErrorPage));

        let nodes = doc["@graph"].as_array().expect("graph array");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0]["@type"], "Thing");
    }

    #[test]
    fn empty_graph_is_valid_document() {
        let doc = SchemaGraph::new().generate(&context(ObjectType::Term));
        assert_eq!(doc["@graph"], json!([]));
    }
}
