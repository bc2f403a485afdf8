//! Shared wiremock helpers for integration tests.

use oneprovider::{Client, Credentials, OneProvider};
use serde_json::Value;
use wiremock::{MockServer, ResponseTemplate};

/// API key used by every mocked request.
pub const API_KEY: &str = "test-api-key";
/// Client key used by every mocked request.
pub const CLIENT_KEY: &str = "test-client-key";

/// Builds the services against a running mock server.
pub fn provider_for(server: &MockServer) -> OneProvider {
    let credentials = Credentials::new(&server.uri(), API_KEY, CLIENT_KEY)
        .unwrap_or_else(|err| panic!("credentials should validate: {err}"));
    let client =
        Client::new(credentials).unwrap_or_else(|err| panic!("client should build: {err}"));
    OneProvider::new(&client)
}

/// `200 OK` carrying `{"response": payload}`.
pub fn ok_response(payload: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": payload }))
}

/// `200 OK` carrying an embedded backend error.
pub fn embedded_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "result": "error",
        "error": { "code": code, "message": message },
    }))
}
