//! Verify `build_request` and `parse_body` against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each build case describes a URL and per-call options plus the expected
//! resolved request; each parse case a simulated envelope plus the expected
//! decoded value or error. Bodies are compared as parsed JSON, not raw
//! strings, to avoid false negatives from field ordering.

use std::time::Duration;

use fetcher_core::{
    ClientConfig, FetchError, Fetcher, HttpMethod, HttpRequest, HttpResponse, RequestConfig,
};
use serde_json::Value;

fn client(base_url: &str) -> Fetcher {
    Fetcher::new(ClientConfig::default().base_url(base_url)).unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .map(|pairs| {
            pairs
                .iter()
                .map(|pair| {
                    let arr = pair.as_array().unwrap();
                    (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_config(value: &Value) -> RequestConfig {
    RequestConfig {
        method: value["method"].as_str().map(parse_method),
        base_url: value["base_url"].as_str().map(str::to_string),
        headers: parse_pairs(&value["headers"]),
        params: parse_pairs(&value["params"]),
        timeout: value["timeout_ms"].as_u64().map(Duration::from_millis),
        data: value.get("data").cloned(),
        meta: value.get("meta").cloned(),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");
    assert_eq!(req.headers, parse_pairs(&expected["headers"]), "{name}: headers");
    assert_eq!(
        req.timeout,
        Duration::from_millis(expected["timeout_ms"].as_u64().unwrap()),
        "{name}: timeout"
    );
    let body = req
        .body
        .as_deref()
        .map(|b| serde_json::from_str::<Value>(b).unwrap())
        .unwrap_or(Value::Null);
    assert_eq!(body, expected["body"], "{name}: body");
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn build_test_vectors() {
    let raw = include_str!("../../test-vectors/build.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client(vectors["base_url"].as_str().unwrap());
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let url = case["url"].as_str().unwrap();
        let config = parse_config(&case["config"]);

        let result = c.build_request(url, &config);
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Config" => assert!(matches!(err, FetchError::Config(_)), "{name}: expected Config"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            assert_request(name, &result.unwrap(), &case["expected_request"]);
        }
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

#[test]
fn parse_test_vectors() {
    let raw = include_str!("../../test-vectors/parse.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client("http://localhost:3000");
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let request = c.build_request("/api/resource", &RequestConfig::new()).unwrap();

        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = c.parse_body::<Value>(request, response.clone());

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Status" => assert!(matches!(err, FetchError::Status { .. }), "{name}: expected Status"),
                "Decode" => assert!(matches!(err, FetchError::Decode { .. }), "{name}: expected Decode"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
            assert_eq!(err.response(), Some(&response), "{name}: envelope kept");
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
