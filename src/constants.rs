//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Application name
pub const APP_NAME: &str = "curlbox";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory under the user's home holding config, data and logs
pub const CONFIG_DIR_NAME: &str = ".curlbox";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CURLBOX_DIR";

/// Log file written by the binary
pub const LOG_FILE_NAME: &str = "curlbox.log";

/// Default number of history entries kept
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default number of saved requests kept
pub const DEFAULT_SAVED_LIMIT: usize = 200;

/// Blob key of the history collection
pub const HISTORY_KEY: &str = "history";

/// Blob key of the saved-requests collection
pub const SAVED_KEY: &str = "saved_requests";

/// Display name used when nothing better can be derived
pub const DEFAULT_REQUEST_NAME: &str = "New Request";

/// Value added by `--compressed`
pub const COMPRESSED_ACCEPT_ENCODING: &str = "gzip, deflate, br";

pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";
