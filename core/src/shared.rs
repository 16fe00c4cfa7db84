//! The process-wide client and free functions that delegate to it.
//!
//! The shared `Fetcher` is built on first use with `ClientConfig::default()`
//! and never reconfigured. It has no base URL, so URLs passed to these
//! functions must be absolute.

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::Fetcher;
use crate::config::{ClientConfig, RequestConfig};
use crate::error::FetchError;
use crate::interceptor::{Interceptor, LoggingInterceptor};

static SHARED: OnceCell<Fetcher> = OnceCell::new();

/// The shared client, built on first call.
pub fn shared() -> Result<&'static Fetcher, FetchError> {
    SHARED
        .get_or_try_init(|| Fetcher::new(ClientConfig::default()))
        .inspect_err(|e| LoggingInterceptor.on_error(e))
}

/// Issue a request through the shared client. See [`Fetcher::fetch`].
pub async fn fetcher<T: DeserializeOwned>(
    url: &str,
    config: Option<RequestConfig>,
) -> Result<T, FetchError> {
    shared()?.fetch(url, config).await
}

pub async fn get<T: DeserializeOwned>(
    url: &str,
    config: Option<RequestConfig>,
) -> Result<T, FetchError> {
    shared()?.get(url, config).await
}

pub async fn post<T: DeserializeOwned>(
    url: &str,
    body: Option<Value>,
    config: Option<RequestConfig>,
) -> Result<T, FetchError> {
    shared()?.post(url, body, config).await
}

pub async fn put<T: DeserializeOwned>(
    url: &str,
    body: Option<Value>,
    config: Option<RequestConfig>,
) -> Result<T, FetchError> {
    shared()?.put(url, body, config).await
}

pub async fn patch<T: DeserializeOwned>(
    url: &str,
    body: Option<Value>,
    config: Option<RequestConfig>,
) -> Result<T, FetchError> {
    shared()?.patch(url, body, config).await
}

pub async fn delete<T: DeserializeOwned>(
    url: &str,
    config: Option<RequestConfig>,
) -> Result<T, FetchError> {
    shared()?.delete(url, config).await
}
