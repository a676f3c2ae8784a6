//! Identifier suffixes shared by every schema piece.
//!
//! Nodes reference each other only through `@id` strings built from a base URL
//! plus one of these suffixes, so pieces never hold references to each other.

use sha2::{Digest, Sha256};

use crate::context::RenderContext;

/// Id-suffix provider injected into schema pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIds {
    pub webpage_hash: &'static str,
    pub website_hash: &'static str,
    pub primary_image_hash: &'static str,
    pub breadcrumb_hash: &'static str,
    pub person_hash: &'static str,
    pub organization_hash: &'static str,
}

impl Default for SchemaIds {
    fn default() -> Self {
        Self {
            webpage_hash: "#webpage",
            website_hash: "#website",
            primary_image_hash: "#primaryimage",
            breadcrumb_hash: "#breadcrumb",
            person_hash: "#/schema/person/",
            organization_hash: "#organization",
        }
    }
}

impl SchemaIds {
    /// `@id` of the person node for a user, stable per site and user.
    pub fn user_schema_id(&self, user_id: u64, ctx: &RenderContext) -> String {
        let mut hasher = Sha256::new();
        hasher.update(user_id.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        format!("{}{}{}", ctx.site_url, self.person_hash, &digest[..32])
    }
}
