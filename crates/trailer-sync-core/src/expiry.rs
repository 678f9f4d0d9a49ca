use url::Url;

/// Read the `Expires` query parameter (unix seconds) from a trailer URL.
///
/// The `#t=` fragment is ignored. Returns `None` when the URL has no
/// parseable expiry.
pub fn parse_expiry(url: &str) -> Option<i64> {
    let parsed = Url::parse(url).ok()?;
    let expires = parsed
        .query_pairs()
        .find(|(key, _)| key == "Expires")
        .map(|(_, value)| value.into_owned())?;
    expires.trim().parse().ok()
}

/// A link is valid while `now + window` is still before its expiry.
///
/// Saturates at the i64 bounds; store values and config windows are not
/// range-checked.
pub fn is_link_valid(expiry: Option<i64>, now: i64, window_seconds: i64) -> bool {
    matches!(expiry, Some(expires_at) if now.saturating_add(window_seconds) < expires_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expiry_reads_query_param() {
        assert_eq!(
            parse_expiry("https://cdn/v.mp4?Expires=1700000000&Signature=abc#t=10"),
            Some(1_700_000_000)
        );
        assert_eq!(parse_expiry("https://cdn/v.mp4?Signature=abc&Expires=42"), Some(42));
    }

    #[test]
    fn test_parse_expiry_missing_or_malformed() {
        assert_eq!(parse_expiry("https://cdn/v.mp4#t=10"), None);
        assert_eq!(parse_expiry("https://cdn/v.mp4?Expires=soon"), None);
        assert_eq!(parse_expiry("not a url"), None);
    }

    #[test]
    fn test_validity_window() {
        assert!(is_link_valid(Some(200), 100, 0));
        assert!(!is_link_valid(Some(100), 100, 0));
        assert!(!is_link_valid(Some(200), 100, 3600));
        assert!(!is_link_valid(None, 100, 0));
    }

    #[test]
    fn test_validity_at_integer_extremes() {
        let now = 1_700_000_000;
        assert!(!is_link_valid(Some(now + 10), now, i64::MAX));
        assert!(!is_link_valid(Some(i64::MIN), now, 0));
        assert!(!is_link_valid(Some(i64::MAX), i64::MAX, 1));
        assert!(is_link_valid(Some(i64::MAX), now, 3600));
    }
}
