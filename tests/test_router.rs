//! End-to-end routing over in-memory pipes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use waypoint::http::request::{Method, Request};
use waypoint::http::response::{Response, StatusCode};
use waypoint::routing::Router;

async fn roundtrip(router: Router, request: &[u8]) -> String {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let task = tokio::spawn(Arc::new(router).serve(server));

    client.write_all(request).await.unwrap();

    let mut buf = Vec::new();
    client.read_to_end(&mut buf).await.unwrap();
    task.await.unwrap().unwrap();

    String::from_utf8(buf).unwrap()
}

fn header_map(raw: &str) -> (String, HashMap<String, String>, String) {
    let (head, body) = raw.split_once("\r\n\r\n").expect("header terminator");
    let mut lines = head.split("\r\n");
    let status = lines.next().unwrap().to_string();
    let headers = lines
        .filter_map(|line| line.split_once(": "))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (status, headers, body.to_string())
}

async fn send_empty(_req: &Request, res: &mut Response) -> anyhow::Result<()> {
    res.send().await?;
    Ok(())
}

async fn echo_message(req: &Request, res: &mut Response) -> anyhow::Result<()> {
    res.body(req.route_param("message").unwrap_or_default())?;
    res.send().await?;
    Ok(())
}

async fn body_message(_req: &Request, res: &mut Response) -> anyhow::Result<()> {
    res.body("body message")?;
    res.send().await?;
    Ok(())
}

async fn path_not_found(req: &Request, res: &mut Response) -> anyhow::Result<()> {
    res.status_code(StatusCode::NotFound)?
        .body(format!("{} not found.", req.path))?;
    res.send().await?;
    Ok(())
}

async fn echo_body(req: &Request, res: &mut Response) -> anyhow::Result<()> {
    res.body(req.body.clone())?;
    res.send().await?;
    Ok(())
}

async fn close_only(_req: &Request, res: &mut Response) -> anyhow::Result<()> {
    res.close().await?;
    Ok(())
}

async fn do_nothing(_req: &Request, _res: &mut Response) -> anyhow::Result<()> {
    Ok(())
}

async fn fail_after_status(_req: &Request, res: &mut Response) -> anyhow::Result<()> {
    res.status_code(StatusCode::InternalServerError)?;
    anyhow::bail!("handler gave up")
}

#[tokio::test]
async fn test_root_with_empty_send() {
    let mut router = Router::new();
    router.get("/", |req, res| Box::pin(send_empty(req, res)));

    let raw = roundtrip(router, b"GET / HTTP/1.1\r\n\r\n").await;

    assert_eq!(raw, "HTTP/1.1 200 OK\r\n\r\n");
}

#[tokio::test]
async fn test_echo_placeholder() {
    let mut router = Router::new();
    router.get("/echo/[message]", |req, res| Box::pin(echo_message(req, res)));

    let raw = roundtrip(router, b"GET /echo/abc HTTP/1.1\r\n\r\n").await;
    let (status, headers, body) = header_map(&raw);

    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(headers["Content-Length"], "3");
    assert_eq!(headers["Content-Type"], "plain/text");
    assert_eq!(body, "abc");
}

#[tokio::test]
async fn test_route_params_reach_handler() {
    let seen: Arc<Mutex<HashMap<String, String>>> = Arc::default();
    let captured = Arc::clone(&seen);

    let mut router = Router::new();
    router.get(
        "/users/[userId]/department/[userDepartment]",
        move |req, res| {
            *captured.lock().unwrap() = req.route_params.clone();
            Box::pin(close_only(req, res))
        },
    );

    roundtrip(router, b"GET /users/77/department/accounting HTTP/1.1\r\n\r\n").await;

    let params = seen.lock().unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params["userId"], "77");
    assert_eq!(params["userDepartment"], "accounting");
}

#[tokio::test]
async fn test_catch_all_wildcard_wins_after_root() {
    let mut router = Router::new();
    router
        .get("/", |req, res| Box::pin(body_message(req, res)))
        .get("/*", |req, res| Box::pin(path_not_found(req, res)));

    let raw = roundtrip(router, b"GET /resource/6/details HTTP/1.1\r\n\r\n").await;
    let (status, _, body) = header_map(&raw);

    assert_eq!(status, "HTTP/1.1 404 Not Found");
    assert_eq!(body, "/resource/6/details not found.");
}

#[tokio::test]
async fn test_first_match_wins() {
    let mut router = Router::new();
    router
        .get("/a/*", |req, res| Box::pin(body_message(req, res)))
        .get("/a/[id]", |req, res| Box::pin(echo_message(req, res)));

    let raw = roundtrip(router, b"GET /a/b HTTP/1.1\r\n\r\n").await;
    let (_, _, body) = header_map(&raw);

    assert_eq!(body, "body message");
}

#[tokio::test]
async fn test_longer_path_without_wildcard_is_404() {
    let mut router = Router::new();
    router.get("/a/b/c", |req, res| Box::pin(body_message(req, res)));

    let raw = roundtrip(router, b"GET /a/b/c/d HTTP/1.1\r\n\r\n").await;

    assert_eq!(raw, "HTTP/1.1 404 Not Found\r\n\r\n");
}

#[tokio::test]
async fn test_routes_are_per_method() {
    let mut router = Router::new();
    router.post("/submit", |req, res| Box::pin(body_message(req, res)));

    let raw = roundtrip(router, b"GET /submit HTTP/1.1\r\n\r\n").await;

    assert!(raw.starts_with("HTTP/1.1 404 Not Found"));
    assert_eq!(Router::new().routes(Method::PUT).len(), 0);
}

#[tokio::test]
async fn test_unregistered_method_tokens_get_404() {
    for request in [
        b"PUT / HTTP/1.1\r\n\r\n",
        b"FOO / HTTP/1.1\r\n\r\n",
        b"get / HTTP/1.1\r\n\r\n",
    ] {
        let mut router = Router::new();
        router.get("*", |req, res| Box::pin(body_message(req, res)));

        let raw = roundtrip(router, request).await;

        assert_eq!(raw, "HTTP/1.1 404 Not Found\r\n\r\n");
    }
}

#[tokio::test]
async fn test_custom_method_can_be_routed() {
    let mut router = Router::new();
    router.route(Method::from("PURGE"), "/cache", |req, res| {
        Box::pin(body_message(req, res))
    });

    let raw = roundtrip(router, b"PURGE /cache HTTP/1.1\r\n\r\n").await;
    let (status, _, body) = header_map(&raw);

    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, "body message");
}

#[tokio::test]
async fn test_post_body_reaches_handler() {
    let mut router = Router::new();
    router.post("/echo", |req, res| Box::pin(echo_body(req, res)));

    let raw = roundtrip(
        router,
        b"POST /echo HTTP/1.1\r\nContent-Length: 7\r\n\r\npayload",
    )
    .await;
    let (_, _, body) = header_map(&raw);

    assert_eq!(body, "payload");
}

#[tokio::test]
async fn test_gzip_is_negotiated_before_dispatch() {
    let mut router = Router::new();
    router.get("/", |req, res| Box::pin(send_empty(req, res)));

    let raw = roundtrip(router, b"GET / HTTP/1.1\r\nAccept-Encoding: deflate, gzip\r\n\r\n").await;

    assert_eq!(raw, "HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\n\r\n");
}

#[tokio::test]
async fn test_unclosed_response_is_closed_by_router() {
    let mut router = Router::new();
    router.get("/", |req, res| Box::pin(do_nothing(req, res)));

    let raw = roundtrip(router, b"GET / HTTP/1.1\r\n\r\n").await;

    assert_eq!(raw, "HTTP/1.1 200 OK\r\n\r\n");
}

#[tokio::test]
async fn test_failing_handler_still_gets_a_response() {
    let mut router = Router::new();
    router.get("/", |req, res| Box::pin(fail_after_status(req, res)));

    let raw = roundtrip(router, b"GET / HTTP/1.1\r\n\r\n").await;

    assert_eq!(raw, "HTTP/1.1 500 Internal Server Error\r\n\r\n");
}

#[tokio::test]
async fn test_malformed_request_is_dropped() {
    let mut router = Router::new();
    router.get("/", |req, res| Box::pin(send_empty(req, res)));

    let raw = roundtrip(router, b"GET /\r\n\r\n").await;

    assert_eq!(raw, "");
}

#[test]
fn test_find_uses_registration_order() {
    let mut router = Router::new();
    router
        .get("/[a]", |req, res| Box::pin(send_empty(req, res)))
        .get("/x", |req, res| Box::pin(send_empty(req, res)));

    let route = router.find(Method::GET, "/x").unwrap();
    assert_eq!(route.pattern().as_str(), "/[a]");
    assert!(router.find(Method::POST, "/x").is_none());
}
