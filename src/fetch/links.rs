// src/fetch/links.rs
// =============================================================================
// This module extracts outbound links from fetched page bodies.
//
// We deliberately do NOT build a DOM here. A single case-insensitive regex
// scans for anchor tags with a quoted href attribute:
//
//     <a[^>]+href=["']([^"'<>]+)["']
//
// Malformed markup, links in non-anchor elements and hrefs containing angle
// brackets are simply not seen. A quote always ends the captured value, so
// `href="/a"b"` yields `/a`. That keeps extraction pure and cheap.
//
// We use the `url` crate to:
// - Parse values that are already absolute
// - Resolve relative values against the page they were found on
//
// Rust concepts:
// - LazyLock: compile the regex once, on first use
// - Iterators: captures_iter + filter_map
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a[^>]+href=["']([^"'<>]+)["']"#).expect("hardcoded regex pattern is valid")
});

// Extracts all links referenced by anchor tags in a page body
//
// Parameters:
//   body: the response body (HTML, but never parsed as such)
//   base: the location the body was fetched from
//
// Returns: absolute URLs in document order. Duplicates are kept; the
// visited set downstream is what deduplicates.
//
// Example:
//   body = "<a href='/docs'>Docs</a>"
//   base = "https://example.com/page"
//   result = ["https://example.com/docs"]
pub fn extract_links(body: &str, base: &Url) -> Vec<Url> {
    ANCHOR_HREF
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .filter_map(|raw| resolve_href(base, raw.as_str()))
        .collect()
}

// Turns one raw href value into an absolute URL
//
// Returns None for mailto: links and for values that cannot be resolved
fn resolve_href(base: &Url, raw: &str) -> Option<Url> {
    let href = raw.trim();

    if is_mailto(href) {
        return None;
    }

    // Absolute values win; anything else is a relative reference
    match Url::parse(href) {
        Ok(url) => Some(url),
        Err(_) => match base.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Dropping unresolvable link '{}' on {}: {}", href, base, e);
                None
            }
        },
    }
}

fn is_mailto(href: &str) -> bool {
    href.get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a regex instead of an HTML parser?
//    - We only care about <a href="..."> values
//    - A regex never fails on broken markup, it just matches less
//    - Extraction stays a pure function of (body, base)
//
// 2. What does (?i) do?
//    - Turns on case-insensitive matching for the whole pattern
//    - <A HREF="..."> and <a href="..."> are treated the same
//
// 3. Why is href.get(..7) used instead of &href[..7]?
//    - Slicing a &str panics if the index is not on a char boundary
//    - .get() returns None instead, which is exactly "not a mailto link"
//
// 4. Url::parse vs base.join:
//    - Url::parse("https://x.org/a") works on its own
//    - Url::parse("/a") fails (no scheme), so we resolve it with base.join()
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    fn as_strings(links: Vec<Url>) -> HashSet<String> {
        links.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_mixed_anchor_set() {
        let body = r#"<a href="/foo">x</a><a href='https://other.example/bar'>y</a><a href="mailto:a@b.com">z</a>"#;
        let links = extract_links(body, &base("https://example.com/page"));

        let expected: HashSet<String> = ["https://example.com/foo", "https://other.example/bar"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(as_strings(links), expected);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let body = r#"
            <a href="one">1</a>
            <A HREF="/two">2</A>
            <a class="x" href='https://elsewhere.example/three'>3</a>
        "#;
        let page = base("https://example.com/dir/page");

        let first = extract_links(body, &page);
        let second = extract_links(body, &page);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let body = r#"<a href="/a">1</a><a href="/a">2</a>"#;
        let links = extract_links(body, &base("https://example.com/"));
        assert_eq!(links.len(), 2);
    }

    #[rstest]
    #[case(r#"<a href="/docs">Docs</a>"#, "https://example.com/page", vec!["https://example.com/docs"])]
    #[case(r#"<a href="../about">About</a>"#, "https://example.com/a/b/c", vec!["https://example.com/a/about"])]
    #[case(r#"<a href="page?q=1">Q</a>"#, "https://example.com/dir/", vec!["https://example.com/dir/page?q=1"])]
    #[case(r#"<a href="  /padded  ">P</a>"#, "https://example.com/", vec!["https://example.com/padded"])]
    #[case(r#"<a href="MAILTO:someone@example.com">M</a>"#, "https://example.com/", vec![])]
    #[case(r#"<a href="https://example.com/a"b">Q</a>"#, "https://example.com/", vec!["https://example.com/a"])]
    #[case(r#"<a href="a<b">Q</a>"#, "https://example.com/", vec![])]
    #[case(r#"<link href="/style.css">"#, "https://example.com/", vec![])]
    #[case(r#"<a name="top">no href</a>"#, "https://example.com/", vec![])]
    #[case(r#"<a href="http://[::1]:namedport">Malformed</a>"#, "https://example.com/", vec![])]
    #[case("", "https://example.com/", vec![])]
    fn test_extract_links(#[case] body: &str, #[case] page: &str, #[case] expected: Vec<&str>) {
        let links = extract_links(body, &base(page));
        let links: Vec<String> = links.into_iter().map(String::from).collect();
        assert_eq!(links, expected, "body: {}", body);
    }

    #[test]
    fn test_base_is_the_current_page() {
        let body = r#"<a href="next">n</a>"#;
        let a = extract_links(body, &base("https://example.com/one/"));
        let b = extract_links(body, &base("https://example.com/two/"));
        assert_eq!(a[0].as_str(), "https://example.com/one/next");
        assert_eq!(b[0].as_str(), "https://example.com/two/next");
    }
}
