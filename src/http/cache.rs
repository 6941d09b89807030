//! Validators and `Cache-Control` policies
//!
//! Static assets carry a content-derived `ETag`; polled API data is never
//! cached, and the dashboard page is revalidated so a changed refresh interval
//! shows up on the next load.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strong `ETag` for `content`: `"<length>-<hash>"`, both in hex
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// Whether `If-None-Match` names `etag`
///
/// Uses the weak comparison that RFC 9110 prescribes for `If-None-Match`:
/// a `W/` prefix on either side is ignored.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let Some(header) = if_none_match else {
        return false;
    };
    if header.trim() == "*" {
        return true;
    }
    let ours = opaque_tag(etag);
    header.split(',').any(|candidate| opaque_tag(candidate) == ours)
}

fn opaque_tag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Caching rule for each kind of response this server produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Files under the static prefix
    StaticAsset,
    /// The rendered dashboard page
    Revalidate,
    /// JSON from the API
    NoStore,
}

impl CachePolicy {
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::StaticAsset => "public, max-age=3600",
            Self::Revalidate => "no-cache",
            Self::NoStore => "no-store",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_depends_on_content() {
        let etag = generate_etag(b"body { margin: 0 }");
        assert_eq!(etag, generate_etag(b"body { margin: 0 }"));
        assert_ne!(etag, generate_etag(b"body { margin: 1px }"));
        assert!(etag.starts_with("\"12-"));
        assert!(etag.ends_with('"'));
    }

    #[test]
    fn test_if_none_match() {
        let etag = "\"5-abc\"";
        assert!(check_etag_match(Some("\"5-abc\""), etag));
        assert!(check_etag_match(Some("\"0-old\", W/\"5-abc\""), etag));
        assert!(check_etag_match(Some(" * "), etag));
        assert!(!check_etag_match(Some("\"5-abd\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_api_data_is_never_stored() {
        assert_eq!(CachePolicy::NoStore.header_value(), "no-store");
        assert_eq!(CachePolicy::Revalidate.header_value(), "no-cache");
    }
}
