use bddtrace_mock::build_router;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn spawn_mock() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, build_router()).await.expect("serve app") });
    addr
}

async fn post_raw(addr: std::net::SocketAddr, path: &str, body: &str) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let req = format!(
        "POST {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, body.to_string())
}

#[tokio::test]
async fn order_lookup_with_lines() {
    let addr = spawn_mock().await;
    let (status, body) = post_raw(
        addr,
        "/mcp",
        r#"{"method":"orders.get","params":{"orderId":"SO042","includeLines":true}}"#,
    )
    .await;
    assert_eq!(status, 200);
    let payload: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(payload["orderId"], "SO042");
    assert_eq!(payload["lines"][0]["productId"], "P001");
}

#[tokio::test]
async fn missing_params_use_defaults() {
    let addr = spawn_mock().await;
    let (status, body) = post_raw(addr, "/mcp", r#"{"method":"customers.search"}"#).await;
    assert_eq!(status, 200);
    let payload: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(payload["limit"], 20);
    assert_eq!(payload["offset"], 0);
}

#[tokio::test]
async fn unknown_method_is_echoed() {
    let addr = spawn_mock().await;
    let (status, body) = post_raw(addr, "/mcp", r#"{"method":"stock.count","params":{}}"#).await;
    assert_eq!(status, 200);
    let payload: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(payload["ok"], true);
    assert_eq!(payload["message"], "Método stock.count simulado");
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let addr = spawn_mock().await;
    let (status, _) = post_raw(addr, "/mcp", "not json").await;
    assert!((400..500).contains(&status), "unexpected status {status}");
}

#[tokio::test]
async fn non_string_method_is_echoed_as_json() {
    let addr = spawn_mock().await;
    let (status, body) = post_raw(addr, "/mcp", r#"{"method":5}"#).await;
    assert_eq!(status, 200);
    let payload: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(payload["ok"], true);
    assert_eq!(payload["message"], "Método 5 simulado");
}

#[tokio::test]
async fn absent_method_is_echoed_as_none() {
    let addr = spawn_mock().await;
    let (status, body) = post_raw(addr, "/mcp", "{}").await;
    assert_eq!(status, 200);
    let payload: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(payload["message"], "Método None simulado");
}
