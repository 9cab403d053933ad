//! Postman Collection v2 / v2.1 importer

use serde_json::Value;

use crate::constants::APPLICATION_JSON;
use crate::error::{IngestError, Result};
use crate::import::{array_field, basename, bool_field, guess_content_type, str_field, text_field};
use crate::models::{
    derive_name, AuthType, BodyData, FormItem, FormItemType, Header, HttpMethod, QueryParam,
    RequestRecord,
};
use crate::query;

/// Flatten every request of a Postman collection, folders included
pub fn parse_postman(document: &Value) -> Result<Vec<RequestRecord>> {
    // Collections exported through the Postman API are wrapped
    let collection = document
        .get("collection")
        .filter(|c| c.is_object())
        .unwrap_or(document);

    if !collection.is_object() {
        return Err(IngestError::malformed("Postman collection must be a JSON object"));
    }
    let items = collection
        .get("item")
        .and_then(|v| v.as_array())
        .ok_or_else(|| IngestError::malformed("Postman collection `item` must be a list"))?;

    let mut records = Vec::new();
    walk_items(items, &mut records);
    tracing::debug!(count = records.len(), "Parsed Postman collection");
    Ok(records)
}

fn walk_items(items: &[Value], out: &mut Vec<RequestRecord>) {
    for item in items {
        if !item.is_object() {
            tracing::warn!(item = %item, "Skipping non-object Postman item");
            continue;
        }

        if let Some(children) = item.get("item") {
            match children.as_array() {
                Some(children) => walk_items(children, out),
                None => tracing::warn!(name = %str_field(item, "name"), "Skipping folder whose `item` is not a list"),
            }
        } else if let Some(request) = item.get("request") {
            out.push(parse_request(item, request));
        } else {
            tracing::warn!(name = %str_field(item, "name"), "Skipping Postman item without request");
        }
    }
}

fn parse_request(item: &Value, request: &Value) -> RequestRecord {
    // `request` may be a bare URL string
    if let Some(raw_url) = request.as_str() {
        let (url, query_params) = query::split_url(raw_url.trim());
        let mut record = RequestRecord::imported(HttpMethod::GET, url);
        record.query_params = query_params;
        record.name = display_name(item, &record.url);
        return record;
    }

    let method = HttpMethod::from(str_field(request, "method"));
    let (url, query_params) = parse_url(request.get("url"));
    let mut record = RequestRecord::imported(method, url);
    record.name = display_name(item, &record.url);
    record.query_params = query_params;

    for header in array_field(request, "header") {
        let key = str_field(header, "key");
        if key.trim().is_empty() {
            continue;
        }
        record.headers.push(Header {
            key,
            value: text_field(header, "value"),
            checked: !bool_field(header, "disabled"),
        });
    }

    let header_content_type = record
        .header("Content-Type")
        .filter(|h| h.checked)
        .map(|h| h.value.split(';').next().unwrap_or_default().trim().to_string());
    record.body_data = request
        .get("body")
        .map(|body| parse_body(body, header_content_type.as_deref()))
        .unwrap_or_default();
    record.content_type = record
        .body_data
        .content_type()
        .map(String::from)
        .or(header_content_type)
        .unwrap_or_default();

    record.auth = request.get("auth").map(parse_auth).unwrap_or_default();
    record.sync_body();
    record
}

fn display_name(item: &Value, url: &str) -> String {
    let name = str_field(item, "name");
    if name.trim().is_empty() {
        derive_name(url)
    } else {
        name
    }
}

/// URL as a string or as `{raw, protocol, host, port, path, query}`
fn parse_url(url: Option<&Value>) -> (String, Vec<QueryParam>) {
    let Some(url) = url else {
        return (String::new(), Vec::new());
    };
    if let Some(raw) = url.as_str() {
        return query::split_url(raw.trim());
    }

    let raw = str_field(url, "raw");
    let raw = if raw.trim().is_empty() {
        build_raw_url(url)
    } else {
        raw.trim().to_string()
    };
    let (base, parsed_params) = query::split_url(&raw);

    let Some(query) = url.get("query").and_then(|q| q.as_array()) else {
        return (base, parsed_params);
    };
    let params = query
        .iter()
        .filter_map(|param| {
            let key = str_field(param, "key");
            if key.is_empty() {
                return None;
            }
            Some(QueryParam {
                key,
                value: text_field(param, "value"),
                checked: !bool_field(param, "disabled"),
            })
        })
        .collect();
    (base, params)
}

fn build_raw_url(url: &Value) -> String {
    let join = |key: &str, separator: &str| match url.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(separator),
        _ => String::new(),
    };

    let mut raw = String::new();
    let protocol = str_field(url, "protocol");
    if !protocol.is_empty() {
        raw.push_str(&protocol);
        raw.push_str("://");
    }
    raw.push_str(&join("host", "."));
    let port = text_field(url, "port");
    if !port.is_empty() {
        raw.push(':');
        raw.push_str(&port);
    }
    let path = join("path", "/");
    if !path.is_empty() {
        raw.push('/');
        raw.push_str(path.trim_start_matches('/'));
    }
    raw
}

fn parse_body(body: &Value, header_content_type: Option<&str>) -> BodyData {
    match str_field(body, "mode").as_str() {
        "raw" => {
            let value = text_field(body, "raw");
            if value.is_empty() {
                return BodyData::None;
            }
            let content_type = header_content_type
                .map(String::from)
                .or_else(|| language_content_type(body).map(String::from))
                .unwrap_or_else(|| guess_content_type(&value).to_string());
            BodyData::raw(value, content_type)
        }
        "formdata" => BodyData::FormData {
            items: form_items(array_field(body, "formdata")),
        },
        "urlencoded" => BodyData::Urlencoded {
            items: form_items(array_field(body, "urlencoded")),
        },
        "graphql" => graphql_body(body.get("graphql")),
        _ => BodyData::None,
    }
}

/// `options.raw.language` as a MIME type
fn language_content_type(body: &Value) -> Option<&'static str> {
    let language = body
        .get("options")
        .and_then(|o| o.get("raw"))
        .map(|raw| str_field(raw, "language"))?;
    match language.as_str() {
        "json" => Some(APPLICATION_JSON),
        "xml" => Some("application/xml"),
        "html" => Some("text/html"),
        "javascript" => Some("application/javascript"),
        "text" => Some("text/plain"),
        _ => None,
    }
}

fn form_items(entries: &[Value]) -> Vec<FormItem> {
    entries
        .iter()
        .filter_map(|entry| {
            let key = str_field(entry, "key");
            if key.is_empty() {
                return None;
            }
            let checked = !bool_field(entry, "disabled");
            let item = if str_field(entry, "type") == "file" {
                // `src` is a path, or a list of paths for multi-file fields
                let src = match entry.get("src") {
                    Some(Value::Array(paths)) => paths.first().and_then(|p| p.as_str()).unwrap_or_default().to_string(),
                    Some(Value::String(path)) => path.clone(),
                    _ => String::new(),
                };
                FormItem {
                    key,
                    value: String::new(),
                    checked,
                    item_type: FormItemType::File,
                    filename: Some(basename(&src)),
                }
            } else {
                FormItem {
                    checked,
                    ..FormItem::text(key, text_field(entry, "value"))
                }
            };
            Some(item)
        })
        .collect()
}

fn graphql_body(graphql: Option<&Value>) -> BodyData {
    let Some(graphql) = graphql else {
        return BodyData::None;
    };
    let variables = match graphql.get("variables") {
        Some(Value::String(s)) if !s.trim().is_empty() => {
            serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone()))
        }
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(Default::default()),
    };
    let payload = serde_json::json!({
        "query": str_field(graphql, "query"),
        "variables": variables,
    });
    BodyData::raw(payload.to_string(), APPLICATION_JSON)
}

/// Auth values come as `[{key, value}]` (v2.1) or as a plain object (v2.0)
fn auth_param(auth: &Value, auth_type: &str, name: &str) -> String {
    match auth.get(auth_type) {
        Some(Value::Array(entries)) => entries
            .iter()
            .find(|e| str_field(e, "key") == name)
            .map(|e| text_field(e, "value"))
            .unwrap_or_default(),
        Some(obj @ Value::Object(_)) => text_field(obj, name),
        _ => String::new(),
    }
}

fn parse_auth(auth: &Value) -> AuthType {
    match str_field(auth, "type").as_str() {
        "bearer" => AuthType::bearer(auth_param(auth, "bearer", "token"), "Bearer"),
        "basic" => AuthType::basic(
            auth_param(auth, "basic", "username"),
            auth_param(auth, "basic", "password"),
        ),
        other => {
            if !other.is_empty() && other != "noauth" {
                tracing::debug!(auth_type = other, "Unsupported Postman auth type, importing without auth");
            }
            AuthType::None
        }
    }
}
