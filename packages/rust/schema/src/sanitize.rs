//! Markup sanitizing passes for text emitted into the graph.
//!
//! Each pass is a function `&str -> String` applied in sequence, so the
//! output of one pass never re-enters an earlier one.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Tags a WebPage `description` may keep.
pub const DESCRIPTION_ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "br", "ol", "ul", "li", "a", "p", "b", "strong", "i", "em",
];

/// Remove every tag not named in `allowed`, keeping the text between tags.
///
/// `script` and `style` elements are dropped together with their content and
/// comments are removed. Allowed tags keep their attributes as written.
pub fn strip_tags(html: &str, allowed: &[&str]) -> String {
    let mut result = strip_comments(html);
    result = strip_raw_text_elements(&result);
    result = strip_disallowed_tags(&result, allowed);
    result
}

/// Remove `[shortcode attr="x"]` and `[/shortcode]` markers, keeping enclosed text.
pub fn strip_shortcodes(text: &str) -> String {
    static SHORTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\[/?[A-Za-z][\w-]*(?:\s[^\]]*)?/?\]").expect("valid regex")
    });

    SHORTCODE_RE.replace_all(text, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Comments
// ---------------------------------------------------------------------------

fn strip_comments(html: &str) -> String {
    static COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

    COMMENT_RE.replace_all(html, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Raw-text elements
// ---------------------------------------------------------------------------

/// Drop `<script>` and `<style>` elements including their content.
fn strip_raw_text_elements(html: &str) -> String {
    static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex")
    });
    static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex")
    });

    let without_scripts = SCRIPT_RE.replace_all(html, "");
    STYLE_RE.replace_all(&without_scripts, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Tags outside the allow-list
// ---------------------------------------------------------------------------

fn strip_disallowed_tags(html: &str, allowed: &[&str]) -> String {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"</?([A-Za-z][A-Za-z0-9]*)\b(?:"[^"]*"|'[^']*'|[^'">])*>"#)
            .expect("valid regex")
    });

    TAG_RE
        .replace_all(html, |caps: &Captures| {
            let name = caps[1].to_ascii_lowercase();
            if allowed.contains(&name.as_str()) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .to_string()
}
