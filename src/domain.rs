/// URL normalization and host matching for bookmarked sites
use url::Url;

/// Schemes that belong to the browser itself and are never counted as visits
const INTERNAL_PREFIXES: [&str; 5] = [
    "chrome://",
    "chrome-extension://",
    "edge://",
    "about:",
    "moz-extension://",
];

/// Prepend `https://` when the user typed a bare address
///
/// Examples:
/// - github.com → https://github.com
/// - http://localhost:3000 → unchanged
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Parse an already-normalized address, rejecting anything without a host
pub fn parse_site_url(url: &str) -> Option<Url> {
    let parsed = Url::parse(url).ok()?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Some(parsed),
        _ => None,
    }
}

/// Lowercased hostname of a URL, without port
pub fn extract_hostname(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Whether a visited address is an ordinary web page
pub fn is_web_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && !INTERNAL_PREFIXES.iter().any(|p| url.starts_with(p))
}
