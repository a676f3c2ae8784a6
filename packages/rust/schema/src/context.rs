//! The per-page rendering context consumed by schema pieces.
//!
//! A [`RenderContext`] is an immutable snapshot assembled by the host for one
//! request. It can only be obtained through [`RenderContextBuilder::build`],
//! which checks the fields every piece relies on.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use seograph_shared::{AppConfig, CompanyOrPerson, Indexable, ObjectType, Result, SeoGraphError};

/// The entity a site presents itself as, when configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteRepresents {
    Person,
    Organization,
}

impl SiteRepresents {
    /// Map the `[schema] company_or_person` setting.
    pub fn from_config(value: CompanyOrPerson) -> Option<Self> {
        match value {
            CompanyOrPerson::None => None,
            CompanyOrPerson::Person => Some(Self::Person),
            CompanyOrPerson::Organization => Some(Self::Organization),
        }
    }
}

/// Post facts needed for dates and authorship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// User id of the post author.
    pub post_author: u64,
    /// Publish time in GMT, `YYYY-MM-DD HH:MM:SS` on the wire.
    #[serde(with = "mysql_datetime")]
    pub post_date_gmt: NaiveDateTime,
    /// Last modification time in GMT.
    #[serde(with = "mysql_datetime")]
    pub post_modified_gmt: NaiveDateTime,
}

/// Read-only snapshot of the facts about the current page.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct RenderContext {
    pub indexable: Indexable,
    /// Canonical URL of the page. Empty only for error pages.
    pub canonical: String,
    /// Site home URL.
    pub site_url: String,
    pub title: String,
    pub description: Option<String>,
    /// Schema.org type of the page node, e.g. `WebPage`, `CollectionPage`.
    pub schema_page_type: String,
    pub post: Option<Post>,
    pub has_image: bool,
    pub site_represents: Option<SiteRepresents>,
    /// `{"@id": ...}` reference to the person/organization node.
    pub site_represents_reference: Option<Value>,
    pub breadcrumbs_enabled: bool,
    /// The request is for the designated front page.
    pub front_page: bool,
    /// The request is for a static page set as the home page.
    pub static_home_page: bool,
}

/// Builder (and JSON input shape) for [`RenderContext`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderContextBuilder {
    #[serde(default)]
    pub indexable: Option<Indexable>,
    #[serde(default)]
    pub canonical: Option<String>,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema_page_type: Option<String>,
    #[serde(default)]
    pub post: Option<Post>,
    #[serde(default)]
    pub has_image: bool,
    #[serde(default)]
    pub site_represents: Option<SiteRepresents>,
    #[serde(default)]
    pub site_represents_reference: Option<Value>,
    #[serde(default = "default_true")]
    pub breadcrumbs_enabled: bool,
    #[serde(default)]
    pub front_page: bool,
    #[serde(default)]
    pub static_home_page: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RenderContextBuilder {
    fn default() -> Self {
        Self {
            indexable: None,
            canonical: None,
            site_url: None,
            title: None,
            description: None,
            schema_page_type: None,
            post: None,
            has_image: false,
            site_represents: None,
            site_represents_reference: None,
            breadcrumbs_enabled: true,
            front_page: false,
            static_home_page: false,
        }
    }
}

impl RenderContextBuilder {
    pub fn new(indexable: Indexable) -> Self {
        Self {
            indexable: Some(indexable),
            ..Self::default()
        }
    }

    /// Fill site-wide facts from configuration; fields already set win.
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.site_url.get_or_insert_with(|| config.site.url.clone());
        if self.site_represents.is_none() {
            self.site_represents = SiteRepresents::from_config(config.schema.company_or_person);
        }
        self.breadcrumbs_enabled &= config.schema.breadcrumbs_enabled;
        self
    }

    pub fn canonical(mut self, canonical: impl Into<String>) -> Self {
        self.canonical = Some(canonical.into());
        self
    }

    pub fn site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = Some(site_url.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn schema_page_type(mut self, page_type: impl Into<String>) -> Self {
        self.schema_page_type = Some(page_type.into());
        self
    }

    pub fn post(mut self, post: Post) -> Self {
        self.post = Some(post);
        self
    }

    pub fn has_image(mut self, has_image: bool) -> Self {
        self.has_image = has_image;
        self
    }

    pub fn site_represents(mut self, represents: SiteRepresents, reference: Value) -> Self {
        self.site_represents = Some(represents);
        self.site_represents_reference = Some(reference);
        self
    }

    pub fn breadcrumbs_enabled(mut self, enabled: bool) -> Self {
        self.breadcrumbs_enabled = enabled;
        self
    }

    pub fn front_page(mut self, front_page: bool) -> Self {
        self.front_page = front_page;
        self
    }

    pub fn static_home_page(mut self, static_home_page: bool) -> Self {
        self.static_home_page = static_home_page;
        self
    }

    /// Validate required fields and freeze the context.
    pub fn build(self) -> Result<RenderContext> {
        let indexable = self
            .indexable
            .ok_or_else(|| SeoGraphError::validation("indexable is required"))?;
        let is_error_page = indexable.object_type == ObjectType::ErrorPage;

        let site_url = require_url("site_url", self.site_url)?;
        let canonical = match self.canonical {
            None if is_error_page => String::new(),
            other => require_url("canonical", other)?,
        };

        let title = self
            .title
            .ok_or_else(|| SeoGraphError::validation("title is required"))?;

        let schema_page_type = self
            .schema_page_type
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SeoGraphError::validation("schema_page_type is required"))?;

        if indexable.object_type == ObjectType::Post && self.post.is_none() {
            return Err(SeoGraphError::validation(
                "post is required when the indexable is a post",
            ));
        }

        Ok(RenderContext {
            indexable,
            canonical,
            site_url,
            title,
            description: self.description,
            schema_page_type,
            post: self.post,
            has_image: self.has_image,
            site_represents: self.site_represents,
            site_represents_reference: self.site_represents_reference,
            breadcrumbs_enabled: self.breadcrumbs_enabled,
            front_page: self.front_page,
            static_home_page: self.static_home_page,
        })
    }
}

fn require_url(field: &str, value: Option<String>) -> Result<String> {
    let value = value.ok_or_else(|| SeoGraphError::validation(format!("{field} is required")))?;
    Url::parse(&value)
        .map_err(|e| SeoGraphError::validation(format!("{field} is not an absolute URL: {e}")))?;
    Ok(value)
}

mod mysql_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::helpers::GMT_FORMAT;

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(GMT_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, GMT_FORMAT).map_err(serde::de::Error::custom)
    }
}
