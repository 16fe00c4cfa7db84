//! The pre-configured client and its verb helpers.
//!
//! # Design
//! `Fetcher` holds one `reqwest::Client`, the client-wide defaults and the
//! interceptor chain, none of which change after construction, so a single
//! instance can serve any number of concurrent calls. Each call is split
//! into three steps:
//! - `build_request` merges the per-call options over the defaults into an
//!   `HttpRequest` without touching the network.
//! - `execute` performs the round-trip and captures the envelope.
//! - `parse_body` checks the status and decodes the body.
//!
//! Failures from any step are handed to every interceptor's `on_error` once
//! and then returned to the caller as-is.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{merge_headers, ClientConfig, RequestConfig};
use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::interceptor::{Interceptor, LoggingInterceptor};

/// A pre-configured async JSON HTTP client.
#[derive(Clone)]
pub struct Fetcher {
    http: reqwest::Client,
    config: ClientConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

/// Builds a `Fetcher` with a custom interceptor chain.
pub struct FetcherBuilder {
    config: ClientConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
    logging: bool,
}

impl FetcherBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Append an interceptor. Interceptors run in the order they are added,
    /// after the logging interceptor.
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Leave out the `LoggingInterceptor`.
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }

    pub fn build(self) -> Result<Fetcher, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .default_headers(header_map(&self.config.headers)?)
            .build()
            .map_err(|source| FetchError::Build { source })?;

        let mut interceptors: Vec<Arc<dyn Interceptor>> = Vec::new();
        if self.logging {
            interceptors.push(Arc::new(LoggingInterceptor));
        }
        interceptors.extend(self.interceptors);

        Ok(Fetcher {
            http,
            config: self.config,
            interceptors,
        })
    }
}

impl Fetcher {
    /// Create a client with the given defaults and the logging interceptor.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> FetcherBuilder {
        FetcherBuilder {
            config: ClientConfig::default(),
            interceptors: Vec::new(),
            logging: true,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying reqwest client, for requests outside this wrapper. It
    /// carries the default timeout and headers but none of the interceptors.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Issue a request and decode the JSON body into `T`.
    ///
    /// Without a method in `config` the request is a GET. Only the decoded
    /// body is returned; status and headers are dropped on success.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        config: Option<RequestConfig>,
    ) -> Result<T, FetchError> {
        let config = config.unwrap_or_default();
        self.dispatch(url, &config)
            .await
            .inspect_err(|e| self.report(e))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        config: Option<RequestConfig>,
    ) -> Result<T, FetchError> {
        self.fetch(url, Some(fixed(config, HttpMethod::Get, None)))
            .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<T, FetchError> {
        self.fetch(url, Some(fixed(config, HttpMethod::Post, body)))
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        url: &str,
        body: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<T, FetchError> {
        self.fetch(url, Some(fixed(config, HttpMethod::Put, body)))
            .await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        url: &str,
        body: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<T, FetchError> {
        self.fetch(url, Some(fixed(config, HttpMethod::Patch, body)))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        config: Option<RequestConfig>,
    ) -> Result<T, FetchError> {
        self.fetch(url, Some(fixed(config, HttpMethod::Delete, None)))
            .await
    }

    /// Resolve `url` and merge `config` over the client defaults.
    pub fn build_request(
        &self,
        url: &str,
        config: &RequestConfig,
    ) -> Result<HttpRequest, FetchError> {
        let base_url = config.base_url.as_deref().or(self.config.base_url.as_deref());
        let mut resolved = resolve_url(url, base_url)?;
        if !config.params.is_empty() {
            resolved.query_pairs_mut().extend_pairs(&config.params);
        }

        let headers = merge_headers(&self.config.headers, &config.headers);
        header_map(&headers)?;

        let body = config
            .data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| FetchError::Config(format!("failed to serialize request body: {e}")))?;

        Ok(HttpRequest {
            method: config.method.unwrap_or_default(),
            url: resolved.into(),
            headers,
            body,
            timeout: config.timeout.unwrap_or(self.config.timeout),
            meta: config.meta.clone(),
        })
    }

    /// Check the status and decode the body. An empty body decodes as `null`.
    pub fn parse_body<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        response: HttpResponse,
    ) -> Result<T, FetchError> {
        if !response.is_success() {
            return Err(FetchError::Status {
                request: Box::new(request),
                response: Box::new(response),
            });
        }
        let text = match response.body.trim() {
            "" => "null",
            _ => response.body.as_str(),
        };
        serde_json::from_str(text).map_err(|source| FetchError::Decode {
            request: Box::new(request),
            response: Box::new(response),
            source,
        })
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        url: &str,
        config: &RequestConfig,
    ) -> Result<T, FetchError> {
        let mut request = self.build_request(url, config)?;
        for interceptor in &self.interceptors {
            request = interceptor.on_request(request)?;
        }

        let mut response = self.execute(&request).await?;
        for interceptor in &self.interceptors {
            response = interceptor.on_response(response)?;
        }

        self.parse_body(request, response)
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        tracing::debug!(
            target: "fetcher::http",
            method = %request.method,
            url = %request.url,
            "sending request"
        );

        let mut builder = self
            .http
            .request(request.method.into(), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| send_error(request, e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await.map_err(|e| send_error(request, e))?;

        tracing::debug!(
            target: "fetcher::http",
            method = %request.method,
            url = %request.url,
            status,
            "response received"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn report(&self, error: &FetchError) {
        for interceptor in &self.interceptors {
            interceptor.on_error(error);
        }
    }
}

fn fixed(config: Option<RequestConfig>, method: HttpMethod, data: Option<Value>) -> RequestConfig {
    config.unwrap_or_default().with_fixed(method, data)
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, FetchError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| FetchError::Config(format!("invalid header name `{name}`")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| FetchError::Config(format!("invalid value for header `{name}`")))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Only http(s) URLs count as absolute. Anything else, including paths like
/// `users:search` that parse with a made-up scheme, is appended to the base
/// with exactly one slash between them.
fn resolve_url(url: &str, base_url: Option<&str>) -> Result<Url, FetchError> {
    if let Ok(absolute) = Url::parse(url) {
        if is_http(&absolute) {
            return Ok(absolute);
        }
    }
    let Some(base) = base_url else {
        return Err(FetchError::Config(format!(
            "`{url}` is not an absolute http(s) URL and no base URL is set"
        )));
    };
    let joined = match url {
        "" => base.to_string(),
        _ => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        ),
    };
    let resolved = Url::parse(&joined)
        .map_err(|e| FetchError::Config(format!("invalid URL `{joined}`: {e}")))?;
    if !is_http(&resolved) {
        return Err(FetchError::Config(format!(
            "unsupported URL scheme `{}`",
            resolved.scheme()
        )));
    }
    Ok(resolved)
}

/// Builder failures mean the request never left; everything else happened
/// on the wire.
fn send_error(request: &HttpRequest, error: reqwest::Error) -> FetchError {
    if error.is_builder() {
        FetchError::Build { source: error }
    } else {
        FetchError::Transport {
            request: Box::new(request.clone()),
            source: error,
        }
    }
}
