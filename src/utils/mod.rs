//! Utility functions and helpers.

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract the host from a URL string.
pub fn get_host(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/board/").unwrap();
        assert_eq!(
            resolve_url(&base, "jobs/101"),
            "https://example.com/board/jobs/101"
        );
        assert_eq!(
            resolve_url(&base, "/jobs/101"),
            "https://example.com/jobs/101"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_get_host() {
        assert_eq!(
            get_host("https://Example.com/path"),
            Some("example.com".to_string())
        );
        assert_eq!(
            get_host("https://boards.example.com:8443/x"),
            Some("boards.example.com".to_string())
        );
        assert_eq!(get_host("not a url"), None);
    }
}
