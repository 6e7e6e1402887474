use once_cell::sync::Lazy;
use regex::Regex;

/// Candidate URLs: `http://` or `https://` followed by at least 3 characters
/// that cannot terminate a URL in prose. `)` is excluded from the match so
/// that parenthesized links stop at the closing paren.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"')]{3,}"#).expect("url pattern must compile")
});

/// Punctuation that commonly trails a URL embedded in a sentence.
const TRAILING_PUNCT: &[char] = &['.', ',', ')', ';', ':', '!', '?', '"', '\''];

/// Find all URLs in free text, stripped of trailing prose punctuation and
/// deduplicated with first-seen order preserved. Empty input yields an empty
/// list.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for m in URL_RE.find_iter(text) {
        let cleaned = m.as_str().trim_end_matches(TRAILING_PUNCT);
        if cleaned.is_empty() {
            continue;
        }
        if !urls.iter().any(|u| u == cleaned) {
            urls.push(cleaned.to_string());
        }
    }
    urls
}

/// The authority portion of a URL: everything between the scheme and the
/// first `/` of the path. Inputs without a scheme are treated as starting at
/// the authority.
pub fn authority(url: &str) -> &str {
    let no_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    no_scheme.split('/').next().unwrap_or(no_scheme)
}

/// Derive the lowercased host from a URL: authority minus any `user@` prefix
/// and any `:port` suffix. Total on arbitrary input; degenerate URLs come
/// back as the empty string rather than an error.
pub fn host_from_url(url: &str) -> String {
    let host_port = authority(url);
    let host = host_port.rsplit('@').next().unwrap_or(host_port);
    let host = host.split(':').next().unwrap_or(host);
    host.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_dedupes_preserving_first_seen_order() {
        let text = "go to https://a.example/x then http://b.example/y and again https://a.example/x";
        assert_eq!(
            extract_urls(text),
            vec!["https://a.example/x", "http://b.example/y"]
        );
    }

    #[test]
    fn strips_trailing_prose_punctuation() {
        assert_eq!(extract_urls("see https://example.com)."), vec!["https://example.com"]);
        assert_eq!(extract_urls("read https://example.com/a."), vec!["https://example.com/a"]);
        assert_eq!(extract_urls("really? https://example.com/a!?"), vec!["https://example.com/a"]);
    }

    #[test]
    fn stops_at_quotes_and_angle_brackets() {
        assert_eq!(extract_urls("<https://example.com/x>"), vec!["https://example.com/x"]);
        assert_eq!(extract_urls("href=\"https://example.com/x\""), vec!["https://example.com/x"]);
    }

    #[test]
    fn scheme_is_case_insensitive_and_original_case_is_kept() {
        assert_eq!(extract_urls("HtTpS://Example.com/Path"), vec!["HtTpS://Example.com/Path"]);
    }

    #[test]
    fn requires_three_characters_after_the_scheme() {
        assert!(extract_urls("broken http://ab end").is_empty());
        assert_eq!(extract_urls("ok http://abc end"), vec!["http://abc"]);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(extract_urls("").is_empty());
        assert!(extract_urls("no links here").is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "verify https://a.example/login, then (http://b.example/reset).";
        let first = extract_urls(text);
        let rejoined = first.join(" ");
        assert_eq!(extract_urls(&rejoined), first);
    }

    #[test]
    fn host_strips_scheme_userinfo_and_port() {
        assert_eq!(host_from_url("https://user@Example.COM:8443/x"), "example.com");
        assert_eq!(host_from_url("http://192.168.1.1/login"), "192.168.1.1");
        assert_eq!(host_from_url("example.com/path"), "example.com");
    }

    #[test]
    fn host_degrades_to_empty_on_degenerate_input() {
        assert_eq!(host_from_url("http://"), "");
        assert_eq!(host_from_url("http:///path"), "");
        assert_eq!(host_from_url(""), "");
    }

    #[test]
    fn authority_spans_scheme_to_first_slash() {
        assert_eq!(authority("http://a@b.com/x"), "a@b.com");
        assert_eq!(authority("https://h.example:9000"), "h.example:9000");
    }
}
