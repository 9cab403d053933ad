//! Insomnia export (v4) importer

use serde_json::Value;

use crate::constants::{FORM_URLENCODED, MULTIPART_FORM_DATA};
use crate::error::{IngestError, Result};
use crate::import::{array_field, basename, bool_field, guess_content_type, str_field, text_field};
use crate::models::{derive_name, AuthType, BodyData, FormItem, FormItemType, Header, HttpMethod, QueryParam, RequestRecord};
use crate::query;

const REQUEST_TYPE: &str = "request";

/// Import every `request` resource of an Insomnia export
pub fn parse_insomnia(document: &Value) -> Result<Vec<RequestRecord>> {
    let resources = document
        .get("resources")
        .and_then(|v| v.as_array())
        .ok_or_else(|| IngestError::malformed("Insomnia export `resources` must be a list"))?;

    let records: Vec<RequestRecord> = resources
        .iter()
        .filter(|resource| {
            if !resource.is_object() {
                tracing::warn!(resource = %resource, "Skipping non-object Insomnia resource");
                return false;
            }
            str_field(resource, "_type") == REQUEST_TYPE
        })
        .map(parse_request)
        .collect();

    tracing::debug!(resources = resources.len(), requests = records.len(), "Parsed Insomnia export");
    Ok(records)
}

fn parse_request(resource: &Value) -> RequestRecord {
    let (url, mut query_params) = query::split_url(str_field(resource, "url").trim());
    query_params.extend(named_rows(array_field(resource, "parameters")));

    let mut record = RequestRecord::imported(HttpMethod::from(str_field(resource, "method")), url);
    let name = str_field(resource, "name");
    record.name = if name.trim().is_empty() {
        derive_name(&record.url)
    } else {
        name
    };
    record.query_params = query_params;
    record.headers = named_rows(array_field(resource, "headers"));

    record.body_data = resource.get("body").map(parse_body).unwrap_or_default();
    record.content_type = record
        .body_data
        .content_type()
        .map(String::from)
        .or_else(|| {
            record
                .header("Content-Type")
                .map(|h| h.value.split(';').next().unwrap_or_default().trim().to_string())
        })
        .unwrap_or_default();

    record.auth = resource
        .get("authentication")
        .map(parse_auth)
        .unwrap_or_default();
    record.sync_body();
    record
}

/// `{name, value, disabled}` rows used for headers and parameters
fn named_rows(rows: &[Value]) -> Vec<Header> {
    rows.iter()
        .filter_map(|row| {
            let key = str_field(row, "name");
            if key.trim().is_empty() {
                return None;
            }
            Some(QueryParam {
                key,
                value: text_field(row, "value"),
                checked: !bool_field(row, "disabled"),
            })
        })
        .collect()
}

fn parse_body(body: &Value) -> BodyData {
    let mime_type = str_field(body, "mimeType");
    let base_mime = mime_type.split(';').next().unwrap_or_default().trim();

    match base_mime {
        MULTIPART_FORM_DATA => BodyData::FormData {
            items: form_items(array_field(body, "params")),
        },
        FORM_URLENCODED => BodyData::Urlencoded {
            items: form_items(array_field(body, "params")),
        },
        _ => {
            let text = text_field(body, "text");
            if text.is_empty() {
                BodyData::None
            } else {
                let content_type = if base_mime.is_empty() {
                    guess_content_type(&text).to_string()
                } else {
                    base_mime.to_string()
                };
                BodyData::raw(text, content_type)
            }
        }
    }
}

fn form_items(params: &[Value]) -> Vec<FormItem> {
    params
        .iter()
        .filter_map(|param| {
            let key = str_field(param, "name");
            if key.is_empty() {
                return None;
            }
            let checked = !bool_field(param, "disabled");
            let item = if str_field(param, "type") == "file" {
                FormItem {
                    key,
                    value: String::new(),
                    checked,
                    item_type: FormItemType::File,
                    filename: Some(basename(&str_field(param, "fileName"))),
                }
            } else {
                FormItem {
                    checked,
                    ..FormItem::text(key, text_field(param, "value"))
                }
            };
            Some(item)
        })
        .collect()
}

fn parse_auth(auth: &Value) -> AuthType {
    if bool_field(auth, "disabled") {
        return AuthType::None;
    }
    match str_field(auth, "type").as_str() {
        "bearer" => {
            let prefix = str_field(auth, "prefix");
            let prefix = if prefix.trim().is_empty() {
                "Bearer".to_string()
            } else {
                prefix
            };
            AuthType::bearer(str_field(auth, "token"), prefix)
        }
        "basic" => AuthType::basic(str_field(auth, "username"), str_field(auth, "password")),
        other => {
            if !other.is_empty() && other != "none" {
                tracing::debug!(auth_type = other, "Unsupported Insomnia auth type, importing without auth");
            }
            AuthType::None
        }
    }
}
