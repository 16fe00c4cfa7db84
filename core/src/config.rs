//! Client-wide defaults and per-call request options.
//!
//! # Design
//! `ClientConfig` is fixed when a `Fetcher` is built and never changes
//! afterwards. `RequestConfig` is created fresh for every call and merged
//! shallowly over those defaults when the request is built. The verb helpers
//! derive a new `RequestConfig` with their fixed method (and body) rather than
//! touching the caller's value.

use std::time::Duration;

use serde_json::Value;

use crate::http::HttpMethod;

/// Timeout applied to every request unless overridden per call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

pub const CONTENT_TYPE: &str = "content-type";
pub const APPLICATION_JSON: &str = "application/json";

/// Defaults shared by every request issued through one `Fetcher`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
    /// Prefix for relative URLs. Only `http`/`https` URLs count as absolute
    /// and ignore it.
    pub base_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            base_url: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a default header, replacing any default with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Options for a single request. Every field is optional; unset fields fall
/// back to the `ClientConfig` defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    /// No method means GET.
    pub method: Option<HttpMethod>,
    pub base_url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub data: Option<Value>,
    /// Reserved for callers. The client only carries it onto the built
    /// request, where interceptors can read it.
    pub meta: Option<Value>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set a header for this call, replacing an earlier one with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Append a query parameter. Repeated names are kept in order.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Shallow merge used by the verb helpers: the method and body given here
    /// replace whatever the caller supplied.
    pub(crate) fn with_fixed(self, method: HttpMethod, data: Option<Value>) -> Self {
        Self {
            method: Some(method),
            data,
            ..self
        }
    }
}

/// Merge `overrides` over `defaults`, matching names case-insensitively.
/// A default keeps its position when replaced; new names are appended.
pub(crate) fn merge_headers(
    defaults: &[(String, String)],
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = defaults.to_vec();
    for (name, value) in overrides {
        set_header(&mut merged, name.clone(), value.clone());
    }
    merged
}

fn set_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
        Some(slot) => *slot = (name, value),
        None => headers.push((name, value)),
    }
}
