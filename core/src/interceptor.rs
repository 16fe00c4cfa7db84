//! Request/response interceptors.
//!
//! Interceptors see every request after it is built and every response
//! envelope before it is decoded. Both hooks default to passthrough.
//! `on_error` is a pure observer: it is called once per failed call and the
//! error is returned to the caller unchanged afterwards.

use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Interceptor: Send + Sync {
    /// Called before the request is sent. Returning an error aborts the call.
    fn on_request(&self, request: HttpRequest) -> Result<HttpRequest, FetchError> {
        Ok(request)
    }

    /// Called with every received envelope, whatever its status.
    fn on_response(&self, response: HttpResponse) -> Result<HttpResponse, FetchError> {
        Ok(response)
    }

    /// Called when a call fails, including failures before dispatch.
    fn on_error(&self, _error: &FetchError) {}
}

/// Logs each failure once through `tracing`, picking the fields by what the
/// error carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl Interceptor for LoggingInterceptor {
    fn on_error(&self, error: &FetchError) {
        if let Some(response) = error.response() {
            tracing::error!(
                target: "fetcher::http",
                status = response.status,
                body = %response.body,
                "response error"
            );
        } else if let Some(request) = error.request() {
            tracing::error!(
                target: "fetcher::http",
                request = ?request,
                cause = %error,
                "no response received"
            );
        } else {
            tracing::error!(target: "fetcher::http", error = %error, "request setup error");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tracing_test::traced_test;

    use super::*;
    use crate::http::HttpMethod;

    fn not_found() -> FetchError {
        FetchError::Status {
            request: Box::new(HttpRequest {
                method: HttpMethod::Get,
                url: "http://localhost:3000/api/missing".to_string(),
                headers: Vec::new(),
                body: None,
                timeout: Duration::from_secs(10),
                meta: None,
            }),
            response: Box::new(HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: r#"{"error":"not found"}"#.to_string(),
            }),
        }
    }

    #[test]
    fn default_hooks_pass_values_through() {
        struct Noop;
        impl Interceptor for Noop {}

        let FetchError::Status { request, response } = not_found() else {
            unreachable!()
        };
        assert_eq!(Noop.on_request((*request).clone()).unwrap(), *request);
        assert_eq!(Noop.on_response((*response).clone()).unwrap(), *response);
    }

    #[test]
    #[traced_test]
    fn logs_status_and_body_when_a_response_exists() {
        LoggingInterceptor.on_error(&not_found());
        assert!(logs_contain("response error"));
        assert!(logs_contain("status=404"));
        assert!(logs_contain("not found"));
        assert!(!logs_contain("no response received"));
        assert!(!logs_contain("request setup error"));
    }

    #[test]
    #[traced_test]
    fn logs_message_when_nothing_was_sent() {
        LoggingInterceptor.on_error(&FetchError::Config("bad header name".to_string()));
        assert!(logs_contain("request setup error"));
        assert!(logs_contain("bad header name"));
        assert!(!logs_contain("response error"));
    }

    #[test]
    #[traced_test]
    fn logs_exactly_one_line_per_error() {
        LoggingInterceptor.on_error(&not_found());
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|line| line.contains("response error")).count() {
                1 => Ok(()),
                n => Err(format!("expected one log line, got {n}")),
            }
        });
    }
}
