//! Turns tokenized curl options into a `RequestRecord`

use std::sync::OnceLock;

use base64::Engine;
use regex::Regex;

use crate::constants::{COMPRESSED_ACCEPT_ENCODING, MULTIPART_FORM_DATA};
use crate::curl::flags::CurlFlag;
use crate::curl::tokenizer::{tokenize, Tokenized};
use crate::error::{IngestError, Result};
use crate::models::{derive_name, BodyData, FormItem, HttpMethod, RequestRecord};
use crate::query;

/// Parse a curl command into a Request.
///
/// The only failure is [`IngestError::NoUrlFound`]; unknown options are
/// ignored.
pub fn parse_curl(input: &str) -> Result<RequestRecord> {
    let tokenized = tokenize(input);
    let mut state = CurlState::default();
    for (flag, value) in tokenized.flags() {
        state.apply(flag, value);
    }

    let raw_url = resolve_url(&state, &tokenized).ok_or(IngestError::NoUrlFound)?;
    let record = state.into_record(&raw_url);
    tracing::debug!(
        method = %record.method,
        url = %record.url,
        headers = record.headers.len(),
        query_params = record.query_params.len(),
        "Parsed curl command"
    );
    Ok(record)
}

struct DataPart {
    value: String,
    /// `@path` refers to a file for this option
    file_capable: bool,
}

#[derive(Default)]
struct CurlState {
    method: Option<HttpMethod>,
    headers: Vec<(String, String)>,
    content_type: Option<String>,
    data: Vec<DataPart>,
    form: Vec<FormItem>,
    url: Option<String>,
    user: Option<String>,
    cookie: Option<String>,
    user_agent: Option<String>,
    compressed: bool,
}

impl CurlState {
    fn apply(&mut self, flag: CurlFlag, value: &str) {
        match flag {
            CurlFlag::Request => self.method = Some(HttpMethod::from(value)),
            CurlFlag::Header => self.add_header(value),
            CurlFlag::Data => self.data.push(DataPart {
                value: value.to_string(),
                file_capable: true,
            }),
            CurlFlag::DataRaw => self.data.push(DataPart {
                value: value.to_string(),
                file_capable: false,
            }),
            CurlFlag::DataUrlEncode => self.data.push(DataPart {
                value: url_encode_data(value),
                file_capable: false,
            }),
            CurlFlag::Form => self.form.push(parse_form_field(value)),
            CurlFlag::Url => self.url = Some(value.trim().to_string()),
            CurlFlag::User => self.user = Some(value.to_string()),
            CurlFlag::Cookie => self.cookie = Some(value.to_string()),
            CurlFlag::UserAgent => self.user_agent = Some(value.to_string()),
            CurlFlag::Compressed => self.compressed = true,
            CurlFlag::IgnoredWithValue => {}
        }
    }

    fn add_header(&mut self, raw: &str) {
        let Some((key, value)) = raw.split_once(':') else {
            tracing::debug!(header = raw, "Ignoring header without colon");
            return;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            return;
        }

        if key.eq_ignore_ascii_case("content-type") {
            let mime = value.split(';').next().unwrap_or_default().trim();
            self.content_type = Some(mime.to_string());
        }

        // Override, don't append
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.headers.push((key.to_string(), value.to_string())),
        }
    }

    /// `-d @file` as the only data value
    fn body_file(&self) -> Option<&str> {
        match self.data.as_slice() {
            [part] if part.file_capable => part.value.strip_prefix('@'),
            _ => None,
        }
    }

    fn body(&self) -> String {
        if let Some(path) = self.body_file() {
            return format!("@[File: {}]", path);
        }
        let is_json = self
            .data
            .iter()
            .any(|part| part.value.trim_start().starts_with(['{', '[']));
        if is_json {
            self.data.last().map(|part| part.value.clone()).unwrap_or_default()
        } else {
            self.data
                .iter()
                .map(|part| part.value.as_str())
                .collect::<Vec<_>>()
                .join("&")
        }
    }

    fn into_record(self, raw_url: &str) -> RequestRecord {
        let has_payload = !self.data.is_empty() || !self.form.is_empty();
        let method = match &self.method {
            Some(method) => method.clone(),
            None if has_payload => HttpMethod::POST,
            None => HttpMethod::GET,
        };

        let (url, query_params) = query::split_url(raw_url);
        let mut record = RequestRecord::imported(method, url);
        record.name = derive_name(&record.url);
        record.query_params = query_params;
        for (key, value) in &self.headers {
            record.set_header(key, value.as_str());
        }
        record.content_type = self.content_type.clone().unwrap_or_default();
        record.body_file = self.body_file().map(String::from);

        if !self.form.is_empty() {
            record.content_type = MULTIPART_FORM_DATA.to_string();
            record.body_data = BodyData::FormData {
                items: self.form.clone(),
            };
        } else if !self.data.is_empty() {
            record.body_data = BodyData::raw(self.body(), record.content_type.clone());
        }
        record.sync_body();

        if let Some(agent) = &self.user_agent {
            record.ensure_header("User-Agent", agent.as_str());
        }
        if let Some(user) = &self.user {
            record.ensure_header("Authorization", basic_auth_header(user));
        }
        if let Some(cookie) = &self.cookie {
            record.ensure_header("Cookie", cookie.as_str());
        }
        if self.compressed {
            record.ensure_header("Accept-Encoding", COMPRESSED_ACCEPT_ENCODING);
        }

        record
    }
}

/// `--url` first, then a quoted http(s) word, then any bare http(s) run left
/// once flags and their values are removed.
///
/// Only quoted positional words are candidates for the second step. Quoted
/// flag values (`-d`, `-e`, `-H` ...) are never taken as the request URL.
fn resolve_url(state: &CurlState, tokenized: &Tokenized) -> Option<String> {
    static BARE_URL: OnceLock<Regex> = OnceLock::new();
    let bare_url_re = BARE_URL.get_or_init(|| Regex::new(r"(?i)https?://\S+").unwrap());

    if let Some(url) = state.url.as_ref().filter(|u| !u.is_empty()) {
        return Some(url.clone());
    }

    let quoted = tokenized
        .positionals()
        .filter(|(_, quoted)| *quoted)
        .map(|(text, _)| text.trim())
        .find(|text| is_http_url(text));
    if let Some(url) = quoted {
        return Some(url.to_string());
    }

    bare_url_re
        .find(&tokenized.residual())
        .map(|m| m.as_str().to_string())
}

fn is_http_url(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn url_encode_data(value: &str) -> String {
    match value.split_once('=') {
        Some(("", content)) => query::encode_uri_component(content),
        Some((key, content)) => format!("{}={}", key, query::encode_uri_component(content)),
        None => query::encode_uri_component(value),
    }
}

fn parse_form_field(raw: &str) -> FormItem {
    let (key, value) = raw.split_once('=').unwrap_or((raw, ""));
    match value.strip_prefix(['@', '<']) {
        Some(path) => {
            // `;type=image/png` and friends follow the path
            let path = path.split(';').next().unwrap_or_default();
            FormItem::file(key.trim(), basename(path))
        }
        None => FormItem::text(key.trim(), value),
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn basic_auth_header(user: &str) -> String {
    let credentials = if user.contains(':') {
        user.to_string()
    } else {
        format!("{}:", user)
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
    format!("Basic {}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthType, FormItemType, QueryParam};

    #[test]
    fn test_parse_simple_get() {
        let req = parse_curl("curl https://api.example.com/users").unwrap();
        assert_eq!(req.url, "https://api.example.com/users");
        assert_eq!(req.method, HttpMethod::GET);
        assert_eq!(req.name, "/users");
        assert_eq!(req.body_data, BodyData::None);
    }

    #[test]
    fn test_parse_post_with_data() {
        let curl = r#"curl -X POST -H "Content-Type: application/json; charset=utf-8" -d '{"name":"test"}' https://api.example.com/users"#;
        let req = parse_curl(curl).unwrap();
        assert_eq!(req.method, HttpMethod::POST);
        assert_eq!(req.body, r#"{"name":"test"}"#);
        assert_eq!(req.content_type, "application/json");
        assert_eq!(req.body_data, BodyData::raw(r#"{"name":"test"}"#, "application/json"));
    }

    #[test]
    fn data_implies_post_without_touching_content_type() {
        let req = parse_curl(r#"curl https://x/y -d '{"a":1}'"#).unwrap();
        assert_eq!(req.method, HttpMethod::POST);
        assert_eq!(req.body, r#"{"a":1}"#);
        assert_eq!(req.content_type, "");
    }

    #[test]
    fn explicit_method_wins_over_data() {
        let req = parse_curl("curl -X put https://x -d a=1").unwrap();
        assert_eq!(req.method, HttpMethod::PUT);
    }

    #[test]
    fn duplicate_header_overrides_in_place() {
        let req = parse_curl(r#"curl https://x -H "X: 1" -H "Accept: */*" -H "x: 2""#).unwrap();
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.headers[0].key, "X");
        assert_eq!(req.headers[0].value, "2");
        assert_eq!(req.headers[1].key, "Accept");
    }

    #[test]
    fn repeated_form_data_is_joined() {
        let req = parse_curl("curl https://x -d a=1 --data b=2 --data-urlencode 'q=hello world'").unwrap();
        assert_eq!(req.body, "a=1&b=2&q=hello%20world");
        assert_eq!(req.method, HttpMethod::POST);
    }

    #[test]
    fn json_data_uses_last_value() {
        let req = parse_curl(r#"curl https://x -d 'a=1' -d '{"b":2}' -d '{"c":3}'"#).unwrap();
        assert_eq!(req.body, r#"{"c":3}"#);
    }

    #[test]
    fn data_urlencode_forms() {
        assert_eq!(url_encode_data("k=a b"), "k=a%20b");
        assert_eq!(url_encode_data("a&b"), "a%26b");
        assert_eq!(url_encode_data("=x/y"), "x%2Fy");
    }

    #[test]
    fn query_is_extracted_from_url() {
        let req = parse_curl(r#"curl "https://x/y?a=1&b=2""#).unwrap();
        assert_eq!(req.url, "https://x/y");
        assert_eq!(
            req.query_params,
            vec![QueryParam::new("a", "1"), QueryParam::new("b", "2")]
        );
        assert_eq!(req.full_url(), "https://x/y?a=1&b=2");
    }

    #[test]
    fn fragment_is_reattached() {
        let req = parse_curl("curl 'https://x/docs?page=2#intro'").unwrap();
        assert_eq!(req.url, "https://x/docs#intro");
        assert_eq!(req.full_url(), "https://x/docs?page=2#intro");
    }

    #[test]
    fn form_fields_become_multipart() {
        let req = parse_curl(r#"curl https://x -F "file=@photos/photo.png;type=image/png" -F "name=bob""#).unwrap();
        assert_eq!(req.content_type, MULTIPART_FORM_DATA);
        assert_eq!(req.method, HttpMethod::POST);
        let BodyData::FormData { items } = &req.body_data else {
            panic!("expected form data, got {:?}", req.body_data);
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_type, FormItemType::File);
        assert_eq!(items[0].filename.as_deref(), Some("photo.png"));
        assert_eq!(items[1], FormItem::text("name", "bob"));
    }

    #[test]
    fn missing_url_fails() {
        let err = parse_curl(r#"curl -X GET -H "A: 1""#).unwrap_err();
        assert!(matches!(err, IngestError::NoUrlFound));
        assert!(matches!(parse_curl("curl ftp://files.example.com"), Err(IngestError::NoUrlFound)));
    }

    #[test]
    fn url_flag_beats_positional() {
        let req = parse_curl("curl https://ignored.example --url https://used.example/path").unwrap();
        assert_eq!(req.url, "https://used.example/path");
    }

    #[test]
    fn quoted_url_beats_bare_one() {
        let req = parse_curl("curl http://bare.example 'https://quoted.example/a'").unwrap();
        assert_eq!(req.url, "https://quoted.example/a");
    }

    #[test]
    fn urls_inside_values_are_not_picked() {
        let curl = r#"curl -e https://referrer.example -d '{"hook":"https://hook.example"}' https://api.example/v1"#;
        let req = parse_curl(curl).unwrap();
        assert_eq!(req.url, "https://api.example/v1");
    }

    #[test]
    fn ensure_headers_do_not_override_explicit_ones() {
        let curl = "curl https://x --compressed -A agent/1.0 -b 'a=1' -u user:pass -H 'Accept-Encoding: identity'";
        let req = parse_curl(curl).unwrap();
        assert_eq!(req.header("Accept-Encoding").unwrap().value, "identity");
        assert_eq!(req.header("User-Agent").unwrap().value, "agent/1.0");
        assert_eq!(req.header("Cookie").unwrap().value, "a=1");
        assert_eq!(req.header("Authorization").unwrap().value, "Basic dXNlcjpwYXNz");
        assert_eq!(req.auth, AuthType::None);
    }

    #[test]
    fn compressed_adds_accept_encoding() {
        let req = parse_curl("curl --compressed https://x").unwrap();
        assert_eq!(req.header("accept-encoding").unwrap().value, COMPRESSED_ACCEPT_ENCODING);
    }

    #[test]
    fn data_file_reference_is_flagged() {
        let req = parse_curl("curl https://x/upload -d @payload.json").unwrap();
        assert_eq!(req.body, "@[File: payload.json]");
        assert_eq!(req.body_file.as_deref(), Some("payload.json"));
        assert_eq!(req.method, HttpMethod::POST);

        let raw = parse_curl("curl https://x --data-raw @handle").unwrap();
        assert_eq!(raw.body, "@handle");
        assert!(raw.body_file.is_none());
    }

    #[test]
    fn unknown_flags_are_ignored() {
        let req = parse_curl("curl -sSL --insecure --http2 -k https://x/ok").unwrap();
        assert_eq!(req.url, "https://x/ok");
        assert!(req.headers.is_empty());
    }

    #[test]
    fn multiline_command() {
        let curl = "curl -X PATCH 'https://api.com/items/1' \\\n  -H 'Authorization: Bearer 123' \\\n  --data-raw $'{\"note\":\"it\\'s\"}'";
        let req = parse_curl(curl).unwrap();
        assert_eq!(req.method, HttpMethod::PATCH);
        assert_eq!(req.header("authorization").unwrap().value, "Bearer 123");
        assert_eq!(req.body, r#"{"note":"it's"}"#);
    }

    #[test]
    fn bare_url_scheme_is_case_insensitive() {
        let req = parse_curl("curl HTTPS://X.example/a?q=1").unwrap();
        assert_eq!(req.url, "HTTPS://X.example/a");
        assert_eq!(req.query_params[0].value, "1");
    }

    #[test]
    fn method_inside_short_option_cluster() {
        let req = parse_curl("curl -sX PUT https://x/items -d a=1").unwrap();
        assert_eq!(req.method, HttpMethod::PUT);
        assert_eq!(req.body, "a=1");
    }
}
