//! Splitting URLs into base + query parameters and putting them back together

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::models::QueryParam;

/// Characters left alone by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URI component
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Split a URL into its query-less form (fragment kept) and decoded query
/// parameters. Malformed URLs are never rejected.
pub fn split_url(raw: &str) -> (String, Vec<QueryParam>) {
    let (before_fragment, fragment) = match raw.find('#') {
        Some(idx) => (&raw[..idx], Some(&raw[idx..])),
        None => (raw, None),
    };

    let (base, query) = match before_fragment.find('?') {
        Some(idx) => (&before_fragment[..idx], &before_fragment[idx + 1..]),
        None => (before_fragment, ""),
    };

    let params = parse_query(query);
    let mut url = base.to_string();
    if let Some(fragment) = fragment {
        url.push_str(fragment);
    }
    (url, params)
}

/// Parse a query string into ordered, percent-decoded parameters
pub fn parse_query(query: &str) -> Vec<QueryParam> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| QueryParam::new(key, value))
        .collect()
}

/// Re-attach enabled query parameters to a query-less URL, before its fragment
pub fn join_url(url: &str, params: &[QueryParam]) -> String {
    let enabled: Vec<&QueryParam> = params.iter().filter(|p| p.checked).collect();
    if enabled.is_empty() {
        return url.to_string();
    }

    let (base, fragment) = match url.find('#') {
        Some(idx) => (&url[..idx], &url[idx..]),
        None => (url, ""),
    };

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for param in enabled {
        serializer.append_pair(&param.key, &param.value);
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}{}", base, separator, serializer.finish(), fragment)
}
