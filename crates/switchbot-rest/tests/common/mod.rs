//! Shared fixtures for integration tests

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use switchbot_rest::{ClientConfig, Credentials, SwitchBotClient};
use wiremock::{MockServer, Request};

pub const TOKEN: &str = "test-token-0123456789";
pub const SECRET: &str = "test-secret-abcdef";

/// Start a mock server and a client pointed at it
pub async fn setup() -> (MockServer, SwitchBotClient) {
    let server = MockServer::start().await;
    let client = client_for(&server);
    (server, client)
}

pub fn client_for(server: &MockServer) -> SwitchBotClient {
    SwitchBotClient::with_config(config_for(server)).expect("client")
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_credentials(Credentials::new(TOKEN, SECRET).unwrap())
        .with_base_url(server.uri())
}

/// Wire envelope
pub fn envelope(status_code: i32, message: &str, body: Value) -> Value {
    json!({
        "statusCode": status_code,
        "message": message,
        "body": body,
    })
}

/// Successful envelope
pub fn success(body: Value) -> Value {
    envelope(100, "success", body)
}

/// Recompute the signature independently of the client
pub fn expected_sign(t: &str, nonce: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(format!("{}{}{}", TOKEN, t, nonce).as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

pub fn header<'a>(request: &'a Request, name: &str) -> &'a str {
    request
        .headers
        .get(name)
        .unwrap_or_else(|| panic!("missing header {}", name))
        .to_str()
        .unwrap()
}
