use std::collections::HashMap;

use waypoint::http::request::{Method, Request, RequestBuilder};

fn request_with_headers(headers: &[(&str, &[&str])]) -> Request {
    let headers = headers
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect();

    Request {
        method: Method::GET,
        path: "/".to_string(),
        version: "HTTP/1.1".to_string(),
        headers,
        route_params: HashMap::new(),
        body: vec![],
    }
}

#[test]
fn test_request_header_retrieval() {
    let req = request_with_headers(&[
        ("Host", &["example.com"]),
        ("Content-Type", &["application/json"]),
    ]);

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_is_case_sensitive() {
    let req = request_with_headers(&[("User-Agent", &["curl/8.0"])]);

    assert_eq!(req.header("User-Agent"), Some("curl/8.0"));
    assert_eq!(req.header("user-agent"), None);
}

#[test]
fn test_request_header_values() {
    let req = request_with_headers(&[("Accept-Encoding", &["deflate", "gzip"])]);

    assert_eq!(req.header("Accept-Encoding"), Some("deflate"));
    assert_eq!(req.header_values("Accept-Encoding").len(), 2);
    assert!(req.header_values("Missing").is_empty());
}

#[test]
fn test_request_content_length_parsing() {
    let req = request_with_headers(&[("Content-Length", &["42"])]);

    assert_eq!(req.content_length(), 42);
}

#[test]
fn test_request_content_length_missing() {
    let req = request_with_headers(&[]);

    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_content_length_invalid() {
    let req = request_with_headers(&[("Content-Length", &["not-a-number"])]);

    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_accepts_gzip() {
    assert!(request_with_headers(&[("Accept-Encoding", &["gzip"])]).accepts_gzip());
    assert!(request_with_headers(&[("Accept-Encoding", &["br", "gzip;q=0.5"])]).accepts_gzip());
    assert!(!request_with_headers(&[("Accept-Encoding", &["deflate"])]).accepts_gzip());
    assert!(!request_with_headers(&[("Accept-Encoding", &["gzipped"])]).accepts_gzip());
    assert!(!request_with_headers(&[("Accept-Encoding", &["gzip;q=0"])]).accepts_gzip());
    assert!(!request_with_headers(&[("Accept-Encoding", &["gzip; q=0.0"])]).accepts_gzip());
    assert!(request_with_headers(&[("Accept-Encoding", &["deflate;q=0", "gzip"])]).accepts_gzip());
    assert!(!request_with_headers(&[]).accepts_gzip());
}

#[test]
fn test_request_route_param() {
    let mut req = request_with_headers(&[]);
    req.route_params.insert("id".to_string(), "7".to_string());

    assert_eq!(req.route_param("id"), Some("7"));
    assert_eq!(req.route_param("missing"), None);
}

#[test]
fn test_request_method_equality() {
    assert_eq!(Method::GET, Method::GET);
    assert_ne!(Method::GET, Method::POST);
}

#[test]
fn test_request_method_from_string() {
    assert_eq!("GET".parse::<Method>().ok(), Some(Method::GET));
    assert_eq!("POST".parse::<Method>().ok(), Some(Method::POST));
    assert_eq!(
        "INVALID".parse::<Method>().ok(),
        Some(Method::Other("INVALID".to_string()))
    );
    // Case-sensitive
    assert_eq!(Method::from("get"), Method::Other("get".to_string()));
    assert_eq!(Method::from("BREW").to_string(), "BREW");
}

#[test]
fn test_request_method_display() {
    assert_eq!(Method::DELETE.to_string(), "DELETE");
    assert_eq!(Method::PATCH.as_str(), "PATCH");
}

#[test]
fn test_request_builder() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/files/a.txt")
        .header("X-Tag", "a")
        .header("X-Tag", "b")
        .body("payload")
        .build()
        .unwrap();

    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.header_values("X-Tag"), &["a".to_string(), "b".to_string()]);
    assert_eq!(req.body_text(), "payload");
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
}
