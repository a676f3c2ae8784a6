//! The `WebPage` piece: the root node describing the current page.

use serde_json::Value;
use tracing::debug;

use seograph_shared::ObjectType;

use super::{SchemaNode, SchemaPiece, id_ref};
use crate::context::RenderContext;
use crate::helpers::{CurrentPageHelper, RequestFlags, format_w3c};
use crate::ids::SchemaIds;
use crate::sanitize::{DESCRIPTION_ALLOWED_TAGS, strip_tags};

/// Emits the `WebPage` node and links it to the website, breadcrumb,
/// primary image and author nodes by `@id`.
pub struct WebPage {
    ids: SchemaIds,
    current_page: Box<dyn CurrentPageHelper>,
    language: String,
}

impl WebPage {
    pub fn new(
        ids: SchemaIds,
        current_page: Box<dyn CurrentPageHelper>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            ids,
            current_page,
            language: language.into(),
        }
    }

    /// A piece reading page flags from the context itself.
    pub fn with_language(language: impl Into<String>) -> Self {
        Self::new(SchemaIds::default(), Box::new(RequestFlags), language)
    }

    fn add_image(&self, data: &mut SchemaNode, ctx: &RenderContext) {
        if ctx.has_image {
            data.insert(
                "primaryImageOfPage".into(),
                id_ref(format!("{}{}", ctx.canonical, self.ids.primary_image_hash)),
            );
        }
    }

    /// Link the post author unless the site itself stands in as the author.
    fn add_author(&self, data: &mut SchemaNode, author: u64, ctx: &RenderContext) {
        if ctx.site_represents.is_none() {
            data.insert(
                "author".into(),
                id_ref(self.ids.user_schema_id(author, ctx)),
            );
        }
    }

    fn add_breadcrumbs(&self, ctx: &RenderContext) -> bool {
        if ctx.indexable.object_type == ObjectType::HomePage
            || self.current_page.is_home_static_page(ctx)
        {
            return false;
        }

        ctx.breadcrumbs_enabled
    }
}

impl SchemaPiece for WebPage {
    fn name(&self) -> &str {
        "webpage"
    }

    fn is_needed(&self, ctx: &RenderContext) -> bool {
        ctx.indexable.object_type != ObjectType::ErrorPage
    }

    fn generate(&self, ctx: &RenderContext) -> SchemaNode {
        let mut data = SchemaNode::new();
        data.insert("@type".into(), Value::String(ctx.schema_page_type.clone()));
        data.insert(
            "@id".into(),
            Value::String(format!("{}{}", ctx.canonical, self.ids.webpage_hash)),
        );
        data.insert("url".into(), Value::String(ctx.canonical.clone()));
        data.insert("inLanguage".into(), Value::String(self.language.clone()));
        data.insert("name".into(), Value::String(ctx.title.clone()));
        data.insert(
            "isPartOf".into(),
            id_ref(format!("{}{}", ctx.site_url, self.ids.website_hash)),
        );

        if self.current_page.is_front_page(ctx) {
            if let Some(reference) = &ctx.site_represents_reference {
                data.insert("about".into(), reference.clone());
            }
        }

        if ctx.indexable.object_type == ObjectType::Post {
            self.add_image(&mut data, ctx);

            // Always present: build() rejects post indexables without a post.
            if let Some(post) = &ctx.post {
                data.insert(
                    "datePublished".into(),
                    Value::String(format_w3c(post.post_date_gmt)),
                );
                data.insert(
                    "dateModified".into(),
                    Value::String(format_w3c(post.post_modified_gmt)),
                );

                if ctx.indexable.is_sub_type("post") {
                    self.add_author(&mut data, post.post_author, ctx);
                }
            }
        }

        if let Some(description) = ctx.description.as_deref().filter(|d| !d.is_empty()) {
            data.insert(
                "description".into(),
                Value::String(strip_tags(description, DESCRIPTION_ALLOWED_TAGS)),
            );
        }

        if self.add_breadcrumbs(ctx) {
            data.insert(
                "breadcrumb".into(),
                id_ref(format!("{}{}", ctx.canonical, self.ids.breadcrumb_hash)),
            );
        }

        debug!(
            page_type = %ctx.schema_page_type,
            object_type = %ctx.indexable.object_type,
            keys = data.len(),
            "webpage node generated"
        );

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Post, RenderContextBuilder, SiteRepresents};
    use crate::helpers::parse_gmt;
    use seograph_shared::Indexable;
    use serde_json::json;

    const CANONICAL: &str = "https://example.org/hello-world/";
    const SITE: &str = "https://example.org/";

    fn piece() -> WebPage {
        WebPage::with_language("en-US")
    }

    fn post_builder(sub_type: &str) -> RenderContextBuilder {
        RenderContextBuilder::new(Indexable::for_object(ObjectType::Post, 1, sub_type))
            .canonical(CANONICAL)
            .site_url(SITE)
            .title("Hello world")
            .schema_page_type("WebPage")
            .post(Post {
                post_author: 3,
                post_date_gmt: parse_gmt("2019-10-08 12:26:31").unwrap(),
                post_modified_gmt: parse_gmt("2019-10-09 08:00:00").unwrap(),
            })
    }

    fn page_builder(object_type: ObjectType) -> RenderContextBuilder {
        RenderContextBuilder::new(Indexable::new(object_type))
            .canonical(CANONICAL)
            .site_url(SITE)
            .title("Archive")
            .schema_page_type("CollectionPage")
    }

    struct StaticHome;

    impl CurrentPageHelper for StaticHome {
        fn is_front_page(&self, _ctx: &RenderContext) -> bool {
            true
        }
        fn is_home_static_page(&self, _ctx: &RenderContext) -> bool {
            true
        }
    }

    #[test]
    fn not_needed_for_error_page() {
        let ctx = RenderContextBuilder::new(Indexable::new(ObjectType::ErrorPage))
            .site_url(SITE)
            .title("Page not found")
            .schema_page_type("WebPage")
            .build()
            .unwrap();
        assert!(!piece().is_needed(&ctx));
    }

    #[test]
    fn needed_for_everything_else() {
        for ty in [
            ObjectType::HomePage,
            ObjectType::Term,
            ObjectType::User,
            ObjectType::SearchResult,
        ] {
            let ctx = page_builder(ty).build().unwrap();
            assert!(piece().is_needed(&ctx), "{ty} should need a WebPage");
        }
    }

    #[test]
    fn base_fields_always_present() {
        let ctx = page_builder(ObjectType::Term).build().unwrap();
        let node = piece().generate(&ctx);

        assert_eq!(node["@type"], "CollectionPage");
        assert_eq!(node["@id"], "https://example.org/hello-world/#webpage");
        assert_eq!(node["url"], CANONICAL);
        assert_eq!(node["inLanguage"], "en-US");
        assert_eq!(node["name"], "Archive");
        assert_eq!(node["isPartOf"], json!({ "@id": "https://example.org/#website" }));
        assert!(!node.contains_key("datePublished"));
        assert!(!node.contains_key("author"));
    }

    #[test]
    fn post_gets_dates_image_and_author() {
        let ctx = post_builder("post").has_image(true).build().unwrap();
        let node = piece().generate(&ctx);

        assert_eq!(node["datePublished"], "2019-10-08T12:26:31+00:00");
        assert_eq!(node["dateModified"], "2019-10-09T08:00:00+00:00");
        assert_eq!(
            node["primaryImageOfPage"],
            json!({ "@id": "https://example.org/hello-world/#primaryimage" })
        );
        let ids = SchemaIds::default();
        assert_eq!(node["author"], json!({ "@id": ids.user_schema_id(3, &ctx) }));
    }

    #[test]
    fn no_primary_image_without_image() {
        let ctx = post_builder("post").build().unwrap();
        assert!(!piece().generate(&ctx).contains_key("primaryImageOfPage"));
    }

    #[test]
    fn pages_get_no_author() {
        let ctx = post_builder("page").build().unwrap();
        let node = piece().generate(&ctx);
        assert!(node.contains_key("datePublished"));
        assert!(!node.contains_key("author"));
    }

    #[test]
    fn represented_site_suppresses_author() {
        let ctx = post_builder("post")
            .site_represents(
                SiteRepresents::Organization,
                json!({ "@id": "https://example.org/#organization" }),
            )
            .build()
            .unwrap();
        assert!(!piece().generate(&ctx).contains_key("author"));
    }

    #[test]
    fn front_page_is_about_represented_entity() {
        let reference = json!({ "@id": "https://example.org/#organization" });
        let ctx = page_builder(ObjectType::HomePage)
            .site_represents(SiteRepresents::Organization, reference.clone())
            .front_page(true)
            .build()
            .unwrap();
        assert_eq!(piece().generate(&ctx)["about"], reference);

        let not_front = page_builder(ObjectType::HomePage)
            .site_represents(SiteRepresents::Organization, reference)
            .build()
            .unwrap();
        assert!(!piece().generate(&not_front).contains_key("about"));
    }

    #[test]
    fn front_page_without_reference_has_no_about() {
        let ctx = page_builder(ObjectType::HomePage).front_page(true).build().unwrap();
        assert!(!piece().generate(&ctx).contains_key("about"));
    }

    #[test]
    fn description_is_sanitized() {
        let ctx = page_builder(ObjectType::Term)
            .description("<script>x</script><b>Bold</b><p>Para</p>")
            .build()
            .unwrap();
        assert_eq!(piece().generate(&ctx)["description"], "<b>Bold</b><p>Para</p>");
    }

    #[test]
    fn empty_description_omitted() {
        let ctx = page_builder(ObjectType::Term).description("").build().unwrap();
        assert!(!piece().generate(&ctx).contains_key("description"));
    }

    #[test]
    fn breadcrumb_linked_when_enabled() {
        let ctx = page_builder(ObjectType::Term).build().unwrap();
        assert_eq!(
            piece().generate(&ctx)["breadcrumb"],
            json!({ "@id": "https://example.org/hello-world/#breadcrumb" })
        );
    }

    #[test]
    fn breadcrumb_suppressed_for_home_disabled_or_static_home() {
        let home = page_builder(ObjectType::HomePage).build().unwrap();
        assert!(!piece().generate(&home).contains_key("breadcrumb"));

        let disabled = page_builder(ObjectType::Term)
            .breadcrumbs_enabled(false)
            .build()
            .unwrap();
        assert!(!piece().generate(&disabled).contains_key("breadcrumb"));

        let static_home = post_builder("page").build().unwrap();
        let piece = WebPage::new(SchemaIds::default(), Box::new(StaticHome), "en-US");
        assert!(!piece.generate(&static_home).contains_key("breadcrumb"));
    }

    #[test]
    fn static_home_flag_on_context_suppresses_breadcrumb() {
        let static_home = post_builder("page")
            .front_page(true)
            .static_home_page(true)
            .build()
            .unwrap();
        let node = piece().generate(&static_home);
        assert!(!node.contains_key("breadcrumb"));

        let regular = post_builder("page").build().unwrap();
        assert!(piece().generate(&regular).contains_key("breadcrumb"));
    }

    #[test]
    fn generation_is_deterministic() {
        let ctx = post_builder("post")
            .has_image(true)
            .description("<p>Hi</p>")
            .build()
            .unwrap();
        let piece = piece();
        assert_eq!(piece.generate(&ctx), piece.generate(&ctx));
    }
}
