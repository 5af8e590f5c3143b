//! URL construction for upstream calls.

use reqwest::Url;

use super::UpstreamError;

/// Joins a base URL and an endpoint with exactly one `/` between them,
/// whether or not either side already carries a slash.
pub fn join(base: &str, endpoint: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = endpoint.trim_start_matches('/');
    format!("{base}/{path}")
}

/// `join` plus a form-encoded query string when parameters are present.
pub fn build_url(
    base: &str,
    endpoint: &str,
    params: &[(&str, &str)],
) -> Result<String, UpstreamError> {
    let url = join(base, endpoint);
    if params.is_empty() {
        return Ok(url);
    }
    Url::parse_with_params(&url, params)
        .map(String::from)
        .map_err(|e| UpstreamError::InvalidUrl(format!("{url}: {e}")))
}

/// Sentiment endpoint for a review text; the text becomes one path segment.
pub fn analyze_path(text: &str) -> String {
    format!("analyze/{}", urlencoding::encode(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_is_slash_idempotent() {
        assert_eq!(
            join("http://h:3030", "fetchDealers"),
            "http://h:3030/fetchDealers"
        );
        assert_eq!(
            join("http://h:3030", "/fetchDealers"),
            "http://h:3030/fetchDealers"
        );
        assert_eq!(
            join("http://h:3030/", "/fetchDealers"),
            "http://h:3030/fetchDealers"
        );
    }

    #[test]
    fn test_build_url_without_params_is_plain_join() {
        assert_eq!(
            build_url("http://h:3030", "/fetchDealer/7", &[]).unwrap(),
            "http://h:3030/fetchDealer/7"
        );
    }

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url("http://h:3030", "fetchDealers", &[("state", "New York")]).unwrap();
        assert_eq!(url, "http://h:3030/fetchDealers?state=New+York");
    }

    #[test]
    fn test_build_url_rejects_garbage_base() {
        assert!(build_url("not a url", "x", &[("a", "b")]).is_err());
    }

    #[test]
    fn test_analyze_path_encodes_text_as_single_segment() {
        assert_eq!(
            analyze_path("great car/fast service"),
            "analyze/great%20car%2Ffast%20service"
        );
    }
}
