// Shared by several test crates; each uses a different subset
#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use pengajuan_core::{ApiClient, Credential, CredentialStore};
use serde_json::json;
use wiremock::{MockServer, ResponseTemplate};

pub fn credential(access: &str, refresh: &str) -> Credential {
    Credential::new("admin", "Aditya Singh", "admin", access, refresh)
}

pub fn store_with(access: &str, refresh: &str) -> CredentialStore {
    let store = CredentialStore::new();
    store.set(credential(access, refresh));
    store
}

pub fn client(server: &MockServer, store: CredentialStore) -> ApiClient {
    ApiClient::with_http_client(reqwest::Client::new(), &server.uri(), store)
}

/// JWT-shaped token whose payload carries `exp`
pub fn jwt(exp: i64) -> String {
    format!(
        "{}.{}.signature",
        general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        general_purpose::URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"admin","exp":{}}}"#, exp))
    )
}

pub fn refresh_ok(access: &str, refresh: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Status": "success",
        "data": { "accessToken": access, "refreshToken": refresh }
    }))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
