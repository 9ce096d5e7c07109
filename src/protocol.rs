//! Symbolic link classification.
//!
//! Cockpit payloads embed `pages://<id>` and `assets://<id>` references in
//! free-form content. [`parse_cockpit_url`] classifies a single string
//! without touching the network or the cache; the predicates below are
//! thin views over its result.

const PAGES_SCHEME: &str = "pages://";
const ASSETS_SCHEME: &str = "assets://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkProtocol {
    Pages,
    Assets,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    pub protocol: LinkProtocol,
    /// For `pages://` and `assets://`: everything after the scheme up to
    /// (not including) a `?`. For external links: the full trimmed input.
    pub id: String,
    /// The trimmed input as given.
    pub original: String,
}

/// Classify a link string. Empty or whitespace-only input yields `None`;
/// that is absence, not an error.
pub fn parse_cockpit_url(input: &str) -> Option<ParsedLink> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (protocol, id) = if let Some(rest) = trimmed.strip_prefix(PAGES_SCHEME) {
        (LinkProtocol::Pages, strip_query(rest))
    } else if let Some(rest) = trimmed.strip_prefix(ASSETS_SCHEME) {
        (LinkProtocol::Assets, strip_query(rest))
    } else {
        (LinkProtocol::External, trimmed)
    };

    Some(ParsedLink {
        protocol,
        id: id.to_string(),
        original: trimmed.to_string(),
    })
}

fn strip_query(rest: &str) -> &str {
    rest.split('?').next().unwrap_or(rest)
}

pub fn is_cockpit_page_url(input: &str) -> bool {
    matches!(
        parse_cockpit_url(input),
        Some(ParsedLink {
            protocol: LinkProtocol::Pages,
            ..
        })
    )
}

pub fn is_cockpit_asset_url(input: &str) -> bool {
    matches!(
        parse_cockpit_url(input),
        Some(ParsedLink {
            protocol: LinkProtocol::Assets,
            ..
        })
    )
}

pub fn extract_page_id(input: &str) -> Option<String> {
    match parse_cockpit_url(input)? {
        ParsedLink {
            protocol: LinkProtocol::Pages,
            id,
            ..
        } => Some(id),
        _ => None,
    }
}

pub fn extract_asset_id(input: &str) -> Option<String> {
    match parse_cockpit_url(input)? {
        ParsedLink {
            protocol: LinkProtocol::Assets,
            id,
            ..
        } => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_link_with_query() {
        let parsed = parse_cockpit_url("pages://abc123?x=1").expect("parsed");
        assert_eq!(parsed.protocol, LinkProtocol::Pages);
        assert_eq!(parsed.id, "abc123");
        assert_eq!(parsed.original, "pages://abc123?x=1");
    }

    #[test]
    fn asset_link() {
        let parsed = parse_cockpit_url("assets://img-9").expect("parsed");
        assert_eq!(parsed.protocol, LinkProtocol::Assets);
        assert_eq!(parsed.id, "img-9");
    }

    #[test]
    fn external_link_keeps_full_input_as_id() {
        let parsed = parse_cockpit_url("https://x.com").expect("parsed");
        assert_eq!(parsed.protocol, LinkProtocol::External);
        assert_eq!(parsed.id, "https://x.com");
        assert_eq!(parsed.original, "https://x.com");
    }

    #[test]
    fn blank_input_is_absent() {
        assert!(parse_cockpit_url("").is_none());
        assert!(parse_cockpit_url("  ").is_none());
        assert!(parse_cockpit_url("\t\n").is_none());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let parsed = parse_cockpit_url("  pages://p1  ").expect("parsed");
        assert_eq!(parsed.id, "p1");
        assert_eq!(parsed.original, "pages://p1");
    }

    #[test]
    fn predicates_follow_the_parser() {
        assert!(is_cockpit_page_url("pages://p1"));
        assert!(!is_cockpit_page_url("assets://a1"));
        assert!(is_cockpit_asset_url("assets://a1?w=200"));
        assert!(!is_cockpit_asset_url("https://x.com"));

        assert_eq!(extract_page_id("pages://p1?ref=nav"), Some("p1".into()));
        assert_eq!(extract_page_id("assets://a1"), None);
        assert_eq!(extract_asset_id("assets://a1?w=200"), Some("a1".into()));
        assert_eq!(extract_asset_id(" "), None);
    }
}
