//! Error types for the fetcher client.
//!
//! # Design
//! Every failure falls into one of three buckets, told apart by which parts
//! of the exchange exist: a response came back, a request went out with no
//! response, or nothing was sent at all. `FetchError` keeps the request and
//! response envelopes it saw so callers get the full status, body and cause
//! without any wrapping by the client.

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// The three observable failure shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A response was received.
    Response,
    /// The request was sent but nothing came back.
    NoResponse,
    /// The request was never sent.
    Setup,
}

/// Errors returned by `Fetcher` and the free verb functions.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("request failed with status {}: {}", .response.status, .response.body)]
    Status {
        request: Box<HttpRequest>,
        response: Box<HttpResponse>,
    },

    /// A 2xx body could not be decoded into the expected type.
    #[error("failed to decode response body (status {}): {source}", .response.status)]
    Decode {
        request: Box<HttpRequest>,
        response: Box<HttpResponse>,
        #[source]
        source: serde_json::Error,
    },

    /// The request was sent but no response arrived (connect, DNS, timeout).
    #[error("no response received for {} {}: {source}", .request.method, .request.url)]
    Transport {
        request: Box<HttpRequest>,
        #[source]
        source: reqwest::Error,
    },

    /// reqwest refused to build the client or the request.
    #[error("failed to build request: {source}")]
    Build {
        #[source]
        source: reqwest::Error,
    },

    /// The request could not be built.
    #[error("invalid request configuration: {0}")]
    Config(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Status { .. } | FetchError::Decode { .. } => ErrorKind::Response,
            FetchError::Transport { .. } => ErrorKind::NoResponse,
            FetchError::Build { .. } | FetchError::Config(_) => ErrorKind::Setup,
        }
    }

    /// The request that was sent, if the failure happened after dispatch.
    pub fn request(&self) -> Option<&HttpRequest> {
        match self {
            FetchError::Status { request, .. }
            | FetchError::Decode { request, .. }
            | FetchError::Transport { request, .. } => Some(request.as_ref()),
            FetchError::Build { .. } | FetchError::Config(_) => None,
        }
    }

    /// The received envelope, if the server answered.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            FetchError::Status { response, .. } | FetchError::Decode { response, .. } => {
                Some(response.as_ref())
            }
            FetchError::Transport { .. }
            | FetchError::Build { .. }
            | FetchError::Config(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    pub fn body(&self) -> Option<&str> {
        self.response().map(|r| r.body.as_str())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport { source, .. } if source.is_timeout())
    }
}
