use crate::errors::ConfigError;
use std::{env, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_ROOT: &str = "http://localhost:8080/api/3";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub api_root: String,
    pub context_path: String,
    pub refetch_on_change: bool,
    pub request_timeout: Duration,
    /// How long an untouched dashboard page keeps its selection.
    pub page_idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_root: DEFAULT_API_ROOT.to_string(),
            context_path: String::new(),
            refetch_on_change: true,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_idle_timeout: Duration::from_secs(DEFAULT_PAGE_IDLE_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = parse_var(&lookup, "PORT", "port number")?.unwrap_or(defaults.port);
        let api_root = match lookup("DAYBREAK_API_ROOT") {
            Some(value) => normalize_api_root(&value)?,
            None => defaults.api_root,
        };
        let context_path = lookup("DAYBREAK_CONTEXT_PATH")
            .map(|value| normalize_context_path(&value))
            .unwrap_or(defaults.context_path);
        let refetch_on_change = match lookup("DAYBREAK_REFETCH_ON_CHANGE") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                name: "DAYBREAK_REFETCH_ON_CHANGE",
                expected: "boolean",
                value,
            })?,
            None => defaults.refetch_on_change,
        };
        let request_timeout = parse_var::<u64>(&lookup, "DAYBREAK_API_TIMEOUT_SECS", "number of seconds")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let page_idle_timeout = parse_var::<u64>(&lookup, "DAYBREAK_PAGE_IDLE_SECS", "number of seconds")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.page_idle_timeout);

        Ok(Self {
            port,
            api_root,
            context_path,
            refetch_on_change,
            request_timeout,
            page_idle_timeout,
        })
    }

    /// Prefixes `path` with the context path.
    pub fn route(&self, path: &str) -> String {
        format!("{}{}", self.context_path, path)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, expected, value }),
        None => Ok(None),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn normalize_api_root(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ConfigError::Invalid {
            name: "DAYBREAK_API_ROOT",
            expected: "http(s) URL",
            value: value.to_string(),
        }),
    }
}

/// `"open/"` and `"/open"` both become `"/open"`; blank means the root.
fn normalize_context_path(value: &str) -> String {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
