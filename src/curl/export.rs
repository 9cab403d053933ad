use crate::models::{AuthLocation, AuthType, BodyData, FormItemType, HttpMethod, QueryParam, RequestRecord};
use crate::query;

/// Format request as cURL command
pub fn to_curl(request: &RequestRecord) -> String {
    let mut parts = vec!["curl".to_string()];
    let has_payload = !matches!(request.body_data, BodyData::None);

    // Method; GET is implied without a payload, POST with one
    let implied = if has_payload { HttpMethod::POST } else { HttpMethod::GET };
    if request.method != implied {
        parts.push(format!("-X {}", request.method.as_str()));
    }

    // URL, with auth that travels in the query string
    let mut params = request.query_params.clone();
    match &request.auth {
        AuthType::ApiKey {
            key,
            value,
            add_to: AuthLocation::Query,
        } => params.push(QueryParam::new(key.as_str(), value.as_str())),
        AuthType::OAuth2 {
            token,
            add_to: AuthLocation::Query,
            ..
        } => params.push(QueryParam::new("access_token", token.as_str())),
        _ => {}
    }
    parts.push(shell_quote(&query::join_url(&request.url, &params)));

    // Headers
    for header in request.headers.iter().filter(|h| h.checked) {
        parts.push(format!("-H {}", shell_quote(&format!("{}: {}", header.key, header.value))));
    }

    // Auth
    if let Some(auth_part) = auth_arguments(request) {
        parts.push(auth_part);
    }

    // Body
    match (&request.body_file, &request.body_data) {
        (Some(path), _) => parts.push(format!("-d {}", shell_quote(&format!("@{}", path)))),
        (None, BodyData::None) => {}
        (None, BodyData::Raw { value, .. }) => {
            parts.push(format!("--data-raw {}", shell_quote(value)));
        }
        (None, BodyData::Urlencoded { items }) => {
            for item in items.iter().filter(|i| i.checked) {
                parts.push(format!(
                    "--data-urlencode {}",
                    shell_quote(&format!("{}={}", item.key, item.value))
                ));
            }
        }
        (None, BodyData::FormData { items }) => {
            for item in items.iter().filter(|i| i.checked) {
                let field = match item.item_type {
                    FormItemType::Text => format!("{}={}", item.key, item.value),
                    FormItemType::File => {
                        format!("{}=@{}", item.key, item.filename.as_deref().unwrap_or_default())
                    }
                };
                parts.push(format!("-F {}", shell_quote(&field)));
            }
        }
    }

    parts.join(" \\\n  ")
}

fn auth_arguments(request: &RequestRecord) -> Option<String> {
    let header = |key: &str, value: String| {
        if request.has_header(key) {
            None
        } else {
            Some(format!("-H {}", shell_quote(&format!("{}: {}", key, value))))
        }
    };

    match &request.auth {
        AuthType::None => None,
        AuthType::Bearer { token, prefix } | AuthType::OAuth2 { token, prefix, add_to: AuthLocation::Header } => {
            let prefix = if prefix.is_empty() { "Bearer" } else { prefix.as_str() };
            header("Authorization", format!("{} {}", prefix, token))
        }
        AuthType::OAuth2 { add_to: AuthLocation::Query, .. } => None,
        AuthType::Basic { username, password } => {
            Some(format!("-u {}", shell_quote(&format!("{}:{}", username, password))))
        }
        AuthType::Digest { username, password } => Some(format!(
            "--digest -u {}",
            shell_quote(&format!("{}:{}", username, password))
        )),
        AuthType::ApiKey { key, value, add_to: AuthLocation::Header } | AuthType::Custom { key, value } => {
            header(key.as_str(), value.clone())
        }
        AuthType::ApiKey { add_to: AuthLocation::Query, .. } => None,
    }
}

/// Single-quote a word for a POSIX shell
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curl::parse_curl;
    use crate::models::{FormItem, Header};

    #[test]
    fn exports_method_headers_and_body() {
        let mut request = RequestRecord::imported(HttpMethod::PUT, "https://api.example.com/users/1");
        request.headers.push(Header::new("Content-Type", "application/json"));
        request.headers.push(Header::disabled("X-Debug", "1"));
        request.body_data = BodyData::raw(r#"{"name":"o'neil"}"#, "application/json");
        request.sync_body();

        let curl = to_curl(&request);
        assert!(curl.starts_with("curl \\\n  -X PUT"));
        assert!(curl.contains("-H 'Content-Type: application/json'"));
        assert!(!curl.contains("X-Debug"));
        assert!(curl.contains(r#"--data-raw '{"name":"o'\''neil"}'"#));
    }

    #[test]
    fn exported_command_parses_back() {
        let mut request = RequestRecord::imported(HttpMethod::POST, "https://x/upload");
        request.query_params.push(QueryParam::new("v", "2"));
        request.auth = AuthType::bearer("abc", "Bearer");
        request.body_data = BodyData::FormData {
            items: vec![FormItem::file("file", "photo.png"), FormItem::text("name", "bob")],
        };

        let parsed = parse_curl(&to_curl(&request)).unwrap();
        assert_eq!(parsed.method, HttpMethod::POST);
        assert_eq!(parsed.url, "https://x/upload");
        assert_eq!(parsed.query_params, request.query_params);
        assert_eq!(parsed.header("Authorization").unwrap().value, "Bearer abc");
        assert_eq!(parsed.body_data, request.body_data);
    }

    #[test]
    fn get_with_body_keeps_explicit_method() {
        let request = parse_curl("curl -X GET https://x/search -d a=1").unwrap();
        let curl = to_curl(&request);
        assert!(curl.contains("-X GET"));

        let parsed = parse_curl(&curl).unwrap();
        assert_eq!(parsed.method, HttpMethod::GET);
        assert_eq!(parsed.body, "a=1");
    }

    #[test]
    fn implied_methods_are_omitted() {
        let get = RequestRecord::imported(HttpMethod::GET, "https://x");
        assert!(!to_curl(&get).contains("-X"));

        let mut post = RequestRecord::imported(HttpMethod::POST, "https://x");
        assert!(to_curl(&post).contains("-X POST"));
        post.body_data = BodyData::raw("a=1", "");
        post.sync_body();
        assert!(!to_curl(&post).contains("-X"));
    }

    #[test]
    fn api_key_in_query_goes_to_url() {
        let mut request = RequestRecord::imported(HttpMethod::GET, "https://x/data");
        request.auth = AuthType::ApiKey {
            key: "api_key".into(),
            value: "k1".into(),
            add_to: AuthLocation::Query,
        };
        assert_eq!(to_curl(&request), "curl \\\n  'https://x/data?api_key=k1'");
    }
}
