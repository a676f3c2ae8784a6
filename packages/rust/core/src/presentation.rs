//! Presentation values derived from a post-type indexable.

use seograph_schema::strip_shortcodes;
use seograph_shared::{Indexable, SearchAppearanceConfig};

/// Content lookups the host provides for post-like objects.
pub trait PostTypeHelper {
    /// The excerpt of the post with `object_id`, or `""` if it has none.
    fn get_the_excerpt(&self, object_id: i64) -> String;

    /// Remove shortcode markers from `text`.
    fn strip_shortcodes(&self, text: &str) -> String {
        strip_shortcodes(text)
    }
}

/// Presentation of one post-type indexable.
pub struct PostTypePresentation<'a, H> {
    indexable: &'a Indexable,
    search_appearance: &'a SearchAppearanceConfig,
    helper: &'a H,
}

impl<'a, H: PostTypeHelper> PostTypePresentation<'a, H> {
    pub fn new(
        indexable: &'a Indexable,
        search_appearance: &'a SearchAppearanceConfig,
        helper: &'a H,
    ) -> Self {
        Self {
            indexable,
            search_appearance,
            helper,
        }
    }

    /// The Open Graph description: the stored value, else the sub type's
    /// description template, else the post excerpt.
    pub fn generate_og_description(&self) -> String {
        let mut description = self.indexable.og_description.clone().unwrap_or_default();

        if description.is_empty() {
            if let Some(sub_type) = self.indexable.object_sub_type.as_deref() {
                description = self.search_appearance.metadesc_for(sub_type).to_string();
            }
        }

        if description.is_empty() {
            if let Some(object_id) = self.indexable.object_id {
                description = self.helper.get_the_excerpt(object_id);
            }
        }

        self.helper.strip_shortcodes(&description)
    }
}
