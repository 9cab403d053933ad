use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_REQUEST_NAME, MULTIPART_FORM_DATA};
use crate::query;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
    /// Any other verb, stored uppercase
    Custom(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::Custom(verb) => verb,
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(s: &str) -> Self {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "" | "GET" => HttpMethod::GET,
            "POST" => HttpMethod::POST,
            "PUT" => HttpMethod::PUT,
            "PATCH" => HttpMethod::PATCH,
            "DELETE" => HttpMethod::DELETE,
            "HEAD" => HttpMethod::HEAD,
            "OPTIONS" => HttpMethod::OPTIONS,
            _ => HttpMethod::Custom(upper),
        }
    }
}

impl From<String> for HttpMethod {
    fn from(s: String) -> Self {
        HttpMethod::from(s.as_str())
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enabled() -> bool {
    true
}

/// A header or query parameter row.
///
/// `checked = false` keeps the row for display and editing but excludes it
/// from execution and fingerprinting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "enabled")]
    pub checked: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            value: value.into(),
            checked: true,
        }
    }

    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            checked: false,
            ..KeyValue::new(key, value)
        }
    }

    pub fn key_matches(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

pub type Header = KeyValue;
pub type QueryParam = KeyValue;

/// Kind of a form field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormItemType {
    #[default]
    Text,
    File,
}

/// A field of a form-data or urlencoded body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormItem {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "enabled")]
    pub checked: bool,
    #[serde(rename = "type", default)]
    pub item_type: FormItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl FormItem {
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        FormItem {
            key: key.into(),
            value: value.into(),
            checked: true,
            item_type: FormItemType::Text,
            filename: None,
        }
    }

    pub fn file(key: impl Into<String>, filename: impl Into<String>) -> Self {
        FormItem {
            key: key.into(),
            value: String::new(),
            checked: true,
            item_type: FormItemType::File,
            filename: Some(filename.into()),
        }
    }
}

/// Structured request body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BodyData {
    #[default]
    None,
    Raw {
        #[serde(default)]
        value: String,
        #[serde(rename = "contentType", default)]
        content_type: String,
    },
    FormData {
        #[serde(default)]
        items: Vec<FormItem>,
    },
    Urlencoded {
        #[serde(default)]
        items: Vec<FormItem>,
    },
}

impl BodyData {
    pub fn raw(value: impl Into<String>, content_type: impl Into<String>) -> Self {
        BodyData::Raw {
            value: value.into(),
            content_type: content_type.into(),
        }
    }

    /// Content type implied by the variant, if any
    pub fn content_type(&self) -> Option<&str> {
        match self {
            BodyData::None => None,
            BodyData::Raw { content_type, .. } if content_type.is_empty() => None,
            BodyData::Raw { content_type, .. } => Some(content_type),
            BodyData::FormData { .. } => Some(MULTIPART_FORM_DATA),
            BodyData::Urlencoded { .. } => Some(crate::constants::FORM_URLENCODED),
        }
    }

    /// Legacy flat rendering kept in `RequestRecord::body`
    pub fn to_flat_body(&self) -> String {
        match self {
            BodyData::None => String::new(),
            BodyData::Raw { value, .. } => value.clone(),
            BodyData::Urlencoded { items } => {
                let mut serializer = url::form_urlencoded::Serializer::new(String::new());
                for item in items.iter().filter(|i| i.checked) {
                    serializer.append_pair(&item.key, &item.value);
                }
                serializer.finish()
            }
            BodyData::FormData { items } => items
                .iter()
                .filter(|i| i.checked)
                .map(|item| match item.item_type {
                    FormItemType::Text => format!("{}={}", item.key, item.value),
                    FormItemType::File => {
                        format!("{}=@{}", item.key, item.filename.as_deref().unwrap_or_default())
                    }
                })
                .collect::<Vec<_>>()
                .join("&"),
        }
    }

    fn items_mut(&mut self) -> Option<&mut Vec<FormItem>> {
        match self {
            BodyData::FormData { items } | BodyData::Urlencoded { items } => Some(items),
            BodyData::None | BodyData::Raw { .. } => None,
        }
    }
}

/// Where an API key or OAuth2 token is sent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthLocation {
    #[default]
    Header,
    Query,
}

/// Authentication type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    None,
    Bearer {
        #[serde(default)]
        token: String,
        #[serde(default)]
        prefix: String,
    },
    Basic {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
    ApiKey {
        #[serde(default)]
        key: String,
        #[serde(default)]
        value: String,
        #[serde(rename = "addTo", default)]
        add_to: AuthLocation,
    },
    Digest {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
    OAuth2 {
        #[serde(default)]
        token: String,
        #[serde(default)]
        prefix: String,
        #[serde(rename = "addTo", default)]
        add_to: AuthLocation,
    },
    Custom {
        #[serde(default)]
        key: String,
        #[serde(default)]
        value: String,
    },
}

impl AuthType {
    pub fn bearer(token: impl Into<String>, prefix: impl Into<String>) -> Self {
        AuthType::Bearer {
            token: token.into(),
            prefix: prefix.into(),
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthType::Basic {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Canonical description of one HTTP request, shared by every importer,
/// the history and the saved-requests store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestRecord {
    pub id: String,
    pub name: String,
    pub method: HttpMethod,
    /// Absolute URL without its query string; a fragment is kept
    pub url: String,
    pub headers: Vec<Header>,
    pub query_params: Vec<QueryParam>,
    /// Best-effort MIME type, empty when unknown
    pub content_type: String,
    /// Flat body, always in sync with `body_data`
    pub body: String,
    pub body_data: BodyData,
    pub auth: AuthType,
    /// Epoch milliseconds
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// File named by `-d @file`, which has to be attached by hand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_file: Option<String>,
}

impl Default for RequestRecord {
    fn default() -> Self {
        RequestRecord {
            id: new_id(),
            name: String::from(DEFAULT_REQUEST_NAME),
            method: HttpMethod::GET,
            url: String::new(),
            headers: Vec::new(),
            query_params: Vec::new(),
            content_type: String::new(),
            body: String::new(),
            body_data: BodyData::None,
            auth: AuthType::None,
            created_at: now_millis(),
            folder_id: None,
            body_file: None,
        }
    }
}

impl RequestRecord {
    /// Record for a freshly imported request: random id, `created_at = now`
    pub fn imported(method: HttpMethod, url: impl Into<String>) -> Self {
        RequestRecord {
            method,
            url: url.into(),
            ..RequestRecord::default()
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, key: &str) -> Option<&Header> {
        self.headers.iter().find(|h| h.key_matches(key))
    }

    pub fn has_header(&self, key: &str) -> bool {
        self.header(key).is_some()
    }

    /// Set a header, replacing the value of an existing one in place
    pub fn set_header(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.headers.iter_mut().find(|h| h.key_matches(key)) {
            Some(existing) => existing.value = value,
            None => self.headers.push(Header::new(key, value)),
        }
    }

    /// Add a header only when no header with that key exists
    pub fn ensure_header(&mut self, key: &str, value: impl Into<String>) {
        if !self.has_header(key) {
            self.headers.push(Header::new(key, value));
        }
    }

    /// URL with the enabled query parameters put back
    pub fn full_url(&self) -> String {
        query::join_url(&self.url, &self.query_params)
    }

    /// Re-derive `body` from `body_data`
    pub fn sync_body(&mut self) {
        self.body = self.body_data.to_flat_body();
    }

    /// Normalize before persistence: drop empty-key rows, align the content
    /// type with a raw body and refresh the flat body.
    pub fn sanitize(&mut self) {
        self.headers.retain(|h| !h.key.trim().is_empty());
        self.query_params.retain(|q| !q.key.trim().is_empty());
        if let Some(items) = self.body_data.items_mut() {
            items.retain(|i| !i.key.trim().is_empty());
        }
        if let Some(content_type) = self.body_data.content_type() {
            self.content_type = content_type.to_string();
        }
        if self.name.trim().is_empty() {
            self.name = derive_name(&self.url);
        }
        self.sync_body();
    }

    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.created_at)
    }
}

/// Random identifier used for imported records
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Time-based identifier used when the user saves a request
pub fn time_based_id(now: i64) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("req_{}_{}", now, &suffix[..8])
}

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Display name for a URL: its path, or its host when the path is empty
pub fn derive_name(raw_url: &str) -> String {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return String::from(DEFAULT_REQUEST_NAME);
    }
    match url::Url::parse(trimmed) {
        Ok(parsed) => {
            let path = parsed.path();
            if !path.is_empty() && path != "/" {
                path.to_string()
            } else {
                parsed
                    .host_str()
                    .map(String::from)
                    .unwrap_or_else(|| trimmed.to_string())
            }
        }
        Err(_) => trimmed.to_string(),
    }
}
