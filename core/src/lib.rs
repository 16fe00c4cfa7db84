//! Pre-configured async JSON HTTP client.
//!
//! # Overview
//! One `Fetcher` carries the defaults every request shares (a 10 s timeout
//! and a JSON content type) plus an interceptor chain that logs each failure
//! once. `fetch` issues a request and returns only the decoded body; `get`,
//! `post`, `put`, `patch` and `delete` fix the method (and body) and delegate
//! to it. A process-wide instance backs the free functions of the same names.
//!
//! # Design
//! - `Fetcher` is immutable after construction and safe to share.
//! - Requests are built and responses parsed by pure methods
//!   (`build_request`, `parse_body`) around a single network step.
//! - Errors are never retried or rewrapped; `FetchError` keeps the request
//!   and response envelopes so the caller sees status, body and cause.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod shared;

pub use client::{Fetcher, FetcherBuilder};
pub use config::{ClientConfig, RequestConfig, DEFAULT_TIMEOUT};
pub use error::{ErrorKind, FetchError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::{Interceptor, LoggingInterceptor};
pub use shared::{delete, fetcher, get, patch, post, put, shared};
