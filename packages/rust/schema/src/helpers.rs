//! Page predicates and date formatting used by schema pieces.

use chrono::{NaiveDateTime, SecondsFormat};

use seograph_shared::{Result, SeoGraphError};

use crate::context::RenderContext;

/// Layout of GMT timestamps as the host stores them.
pub(crate) const GMT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Answers questions about which page the current request is for.
pub trait CurrentPageHelper: Send + Sync {
    /// The request is for the designated front page.
    fn is_front_page(&self, ctx: &RenderContext) -> bool;

    /// The request is for a static page configured as the home page.
    fn is_home_static_page(&self, ctx: &RenderContext) -> bool;
}

/// Reads the request flags the host recorded on the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFlags;

impl CurrentPageHelper for RequestFlags {
    fn is_front_page(&self, ctx: &RenderContext) -> bool {
        ctx.front_page
    }

    fn is_home_static_page(&self, ctx: &RenderContext) -> bool {
        ctx.static_home_page
    }
}

/// Parse a `YYYY-MM-DD HH:MM:SS` GMT timestamp.
pub fn parse_gmt(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, GMT_FORMAT)
        .map_err(|e| SeoGraphError::parse(format!("invalid GMT timestamp '{raw}': {e}")))
}

/// Format a GMT timestamp as a W3C date-time, e.g. `2019-10-08T12:26:31+00:00`.
pub fn format_w3c(gmt: NaiveDateTime) -> String {
    gmt.and_utc().to_rfc3339_opts(SecondsFormat::Secs, false)
}
