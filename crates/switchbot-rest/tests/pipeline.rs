//! Integration tests for the signed request pipeline
//!
//! Covers header construction, dual status classification, and transport
//! failures against a local mock server.

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::*;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use switchbot_rest::{
    ApiErrorCause, ClientConfig, Codec, CodecError, Credentials, JsonCodec, Method, RestError,
    StatusCode, SwitchBotClient, TransportError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header as header_eq, method, path};
use wiremock::{Mock, ResponseTemplate};

// =============================================================================
// Signing
// =============================================================================

#[tokio::test]
async fn test_request_carries_signed_headers() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1.1/devices"))
        .and(header_eq("Authorization", TOKEN))
        .and(header_eq("Content-Type", "application/json; charset=utf-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let before: i64 = now_millis();
    client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap();
    let after: i64 = now_millis();

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];

    let t = header(request, "t");
    let nonce = header(request, "nonce");
    let sign = header(request, "sign");

    let ts: i64 = t.parse().unwrap();
    assert!(ts >= before && ts <= after);

    let parsed = uuid::Uuid::parse_str(nonce).unwrap();
    assert_eq!(nonce.len(), 36);
    assert_eq!(parsed.get_version_num(), 7);

    assert_eq!(sign, expected_sign(t, nonce));
}

#[tokio::test]
async fn test_every_request_gets_fresh_nonce() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({}))))
        .mount(&server)
        .await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .execute::<()>(Method::GET, "/v1.1/scenes", None)
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 16);

    let nonces: HashSet<String> = requests
        .iter()
        .map(|r| header(r, "nonce").to_string())
        .collect();
    assert_eq!(nonces.len(), 16);

    for request in &requests {
        assert_eq!(
            header(request, "sign"),
            expected_sign(header(request, "t"), header(request, "nonce"))
        );
    }
}

#[tokio::test]
async fn test_header_names_are_title_cased_on_the_wire() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let capture = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }

        let body = r#"{"statusCode":100,"message":"success","body":{}}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8(head).unwrap()
    });

    let config = ClientConfig::new()
        .with_credentials(Credentials::new(TOKEN, SECRET).unwrap())
        .with_base_url(format!("http://{}", addr));
    let client = SwitchBotClient::with_config(config).unwrap();
    client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap();

    let head = capture.await.unwrap();
    for name in ["Authorization: ", "T: ", "Nonce: ", "Sign: ", "Content-Type: "] {
        assert!(
            head.contains(&format!("\r\n{}", name)),
            "{:?} missing from {:?}",
            name,
            head
        );
    }
    assert!(head.contains(&format!("\r\nAuthorization: {}\r\n", TOKEN)));
}

#[tokio::test]
async fn test_request_body_is_json() {
    let (server, client) = setup().await;
    let payload = json!({"command": "turnOn", "parameter": "default", "commandType": "command"});

    Mock::given(method("POST"))
        .and(path("/v1.1/devices/ABC/commands"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    client
        .execute(Method::POST, "/v1.1/devices/ABC/commands", Some(&payload))
        .await
        .unwrap();
}

// =============================================================================
// Classification scenarios
// =============================================================================

#[tokio::test]
async fn test_success_returns_body() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1.1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "deviceList": [],
            "infraredRemoteList": []
        }))))
        .mount(&server)
        .await;

    let envelope = client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap();

    assert_eq!(envelope.status_code, 100);
    assert_eq!(envelope.message, "success");
    let body: Value = envelope.decode_body("device list").unwrap();
    assert_eq!(body, json!({"deviceList": [], "infraredRemoteList": []}));
}

#[tokio::test]
async fn test_known_application_error() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(161, "device offline", json!({}))),
        )
        .mount(&server)
        .await;

    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices/ABC/status", None)
        .await
        .unwrap_err();

    let api = err.api_error().expect("api error");
    assert_eq!(api.status_code, 161);
    assert_eq!(api.message, "device offline");
    assert_eq!(api.status(), Some(StatusCode::DeviceOffline));
    assert!(matches!(api.cause, Some(ApiErrorCause::Application(161))));
    assert_eq!(
        err.to_string(),
        "SwitchBot API error: statusCode=161, message='device offline' (caused by: application error 161)"
    );
}

#[tokio::test]
async fn test_error_body_is_raw_bytes() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"statusCode":152,"message":"device not found","body":{"zeta":1,"alpha":1.50}}"#,
        ))
        .mount(&server)
        .await;

    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices/ABC/status", None)
        .await
        .unwrap_err();

    let api = err.api_error().expect("api error");
    assert_eq!(api.status_code, 152);
    assert_eq!(api.body_text(), r#"{"zeta":1,"alpha":1.50}"#);
    assert!(err.to_string().contains(r#"body={"zeta":1,"alpha":1.50}"#));
}

#[tokio::test]
async fn test_whitespace_object_body_is_not_empty() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"statusCode":161,"message":"device offline","body":{ }}"#,
        ))
        .mount(&server)
        .await;

    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices/ABC/status", None)
        .await
        .unwrap_err();

    assert_eq!(err.api_error().expect("api error").body, b"{ }");
    assert!(err.to_string().contains("body={ }"));
}

#[tokio::test]
async fn test_http_status_overrides_success_code() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(envelope(
            100,
            "",
            json!({"reason": "bad token"}),
        )))
        .mount(&server)
        .await;

    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap_err();

    let api = err.api_error().expect("api error");
    assert_eq!(api.status_code, 401);
    assert!(!api.message.is_empty());
    assert_eq!(api.body, br#"{"reason":"bad token"}"#);
    assert!(api.is_http_error());
}

#[tokio::test]
async fn test_http_status_wins_over_known_code() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(envelope(190, "internal", json!(null))),
        )
        .mount(&server)
        .await;

    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_bare_unauthorized_body() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&server)
        .await;

    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap_err();

    let api = err.api_error().expect("api error");
    assert_eq!(api.status_code, 401);
    assert_eq!(api.message, "Unauthorized");
}

#[tokio::test]
async fn test_unlisted_code_passes_through() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            102,
            "accepted",
            json!({"commandId": "xyz"}),
        )))
        .mount(&server)
        .await;

    let envelope = client
        .execute::<()>(Method::POST, "/v1.1/devices/ABC/commands", None)
        .await
        .unwrap();
    assert_eq!(envelope.status_code, 102);
    let body: Value = envelope.decode_body("command").unwrap();
    assert_eq!(body["commandId"], "xyz");
}

#[tokio::test]
async fn test_unparsable_error_body() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("This is not JSON"))
        .mount(&server)
        .await;

    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap_err();

    let api = err.api_error().expect("api error");
    assert_eq!(api.status_code, 502);
    assert_eq!(api.body_text(), "This is not JSON");
    assert!(matches!(api.cause, Some(ApiErrorCause::Decode(_))));
    assert!(err.to_string().contains("body=This is not JSON"));
}

#[tokio::test]
async fn test_unparsable_success_body_is_protocol_error() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap_err();

    assert!(matches!(err, RestError::Protocol { status: 200, .. }));
    assert!(!err.is_api_error());
    assert!(!err.is_transport());
}

// =============================================================================
// Local errors
// =============================================================================

#[tokio::test]
async fn test_invalid_path_sends_nothing() {
    let (server, client) = setup().await;

    let err = client
        .execute::<()>(Method::GET, "http://[::1", None)
        .await
        .unwrap_err();

    assert!(matches!(err, RestError::InvalidPath { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("cannot serialize"))
    }
}

#[tokio::test]
async fn test_encode_failure_sends_nothing() {
    let (server, client) = setup().await;

    let err = client
        .execute(Method::POST, "/v1.1/devices/ABC/commands", Some(&Unserializable))
        .await
        .unwrap_err();

    assert!(matches!(err, RestError::Encode(_)));
    assert!(err.to_string().contains("cannot serialize"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Transport failures
// =============================================================================

#[tokio::test]
async fn test_deadline_yields_transport_error() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success(json!({})))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client
        .execute_with_timeout::<()>(Method::GET, "/v1.1/devices", None, Duration::from_millis(100))
        .await
        .unwrap_err();

    assert!(matches!(err, RestError::Transport(TransportError::Timeout(_))));
    assert!(!err.is_api_error());
}

#[tokio::test]
async fn test_cancellation_yields_transport_error() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success(json!({})))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = client
        .execute_with_cancel::<()>(Method::GET, "/v1.1/devices", None, &token)
        .await
        .unwrap_err();

    assert!(matches!(err, RestError::Transport(TransportError::Cancelled)));
}

#[tokio::test]
async fn test_client_timeout_yields_transport_error() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success(json!({})))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = SwitchBotClient::with_config(config_for(&server).with_timeout(1)).unwrap();
    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap_err();

    match err {
        RestError::Transport(TransportError::Http(e)) => assert!(e.is_timeout()),
        other => panic!("expected transport timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused_yields_transport_error() {
    let config = ClientConfig::new()
        .with_credentials(switchbot_rest::Credentials::new(TOKEN, SECRET).unwrap())
        .with_base_url("http://127.0.0.1:9");
    let client = SwitchBotClient::with_config(config).unwrap();

    let err = client
        .execute::<()>(Method::GET, "/v1.1/devices", None)
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status_code(), None);
}

// =============================================================================
// Custom codec
// =============================================================================

#[derive(Default)]
struct Counts {
    encoded: AtomicUsize,
    decoded: AtomicUsize,
}

#[derive(Default, Clone)]
struct CountingCodec(Arc<Counts>);

impl Codec for CountingCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        self.0.encoded.fetch_add(1, Ordering::SeqCst);
        JsonCodec.encode(value)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        self.0.decoded.fetch_add(1, Ordering::SeqCst);
        JsonCodec.decode(bytes)
    }
}

#[tokio::test]
async fn test_custom_codec_is_used() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({}))))
        .mount(&server)
        .await;

    let codec = CountingCodec::default();
    let client = SwitchBotClient::with_codec(config_for(&server), codec.clone()).unwrap();

    client
        .execute(Method::POST, "/v1.1/scenes/S1/execute", Some(&json!({"a": 1})))
        .await
        .unwrap();

    assert_eq!(codec.0.encoded.load(Ordering::SeqCst), 1);
    assert_eq!(codec.0.decoded.load(Ordering::SeqCst), 1);
}

#[test]
fn test_default_codec_roundtrip() {
    let payload: Value = json!({
        "action": "queryDetails",
        "urls": ["https://example.com/a", "https://example.com/b"],
        "nested": {"n": 1.5, "flag": true, "none": null}
    });
    let bytes = JsonCodec.encode(&payload).unwrap();
    let decoded: Value = JsonCodec.decode(&bytes).unwrap();
    assert_eq!(decoded, payload);
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}
