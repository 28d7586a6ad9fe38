// * The one-shot handshake, run once per worker before any lookup:
// *   1. GET a public detail page through the worker's own transport
// *   2. pull client_id/client_secret out of the embedded config
// *   3. derive a device identity and its HMAC token
// *   4. POST the device grant and keep the returned bearer token

use crate::auth::credentials::extract_client_credentials;
use crate::auth::device::{derive_device_token, generate_device_id};
use crate::config::constants::{AUTH_URL, DETAIL_URL, GRANT_TYPE_DEVICE};
use crate::network::cancel::CancelHandle;
use crate::network::client::HttpClient;
use crate::network::errors::AccessError;
use crate::network::retry::{classify_status, RetryError};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of the device-grant POST. Field names mirror the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub device_id: String,
    pub device_token: String,
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
}

// * Runs the whole handshake over `client`. Any failed step aborts the
// * bootstrap; the caller decides whether to give up on the proxy.
pub async fn obtain_access_token(
    client: &HttpClient,
    cancel: &CancelHandle,
) -> Result<String, AccessError> {
    let response = client.get(DETAIL_URL, cancel).await?;
    classify_status(response.status().as_u16()).map_err(RetryError::into_inner)?;

    let body = response.text().await?;
    let creds = extract_client_credentials(&body)?;

    let device_id = generate_device_id();
    let device_token = derive_device_token(&device_id);
    debug!(%device_id, client_id = %creds.client_id, "derived device identity");

    let params = TokenRequest {
        device_id,
        device_token,
        grant_type: GRANT_TYPE_DEVICE.to_string(),
        client_id: creds.client_id,
        client_secret: creds.client_secret,
    };

    let request = client.request(Method::POST, AUTH_URL).json(&params).build()?;
    let response = client.execute(request, cancel).await?;

    let status = response.status().as_u16();
    if status >= 400 {
        return Err(AccessError::TokenExchange(format!(
            "token endpoint returned status {status}"
        )));
    }

    let token: TokenResponse = response.json().await?;
    if token.access_token.is_empty() {
        return Err(AccessError::TokenExchange(
            "access_token missing from response".to_string(),
        ));
    }

    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_request_round_trips() {
        let original = TokenRequest {
            device_id: "845ecfa5-7c6f-4856-a75b-5be51720d28b".to_string(),
            device_token: "abc.def".to_string(),
            grant_type: GRANT_TYPE_DEVICE.to_string(),
            client_id: "100309".to_string(),
            client_secret: "QVnzW1SoFUt0JoNJmiBvMsKWkFvG9NUKZCdrjegVlZYCc8FR".to_string(),
        };

        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: TokenRequest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn token_request_fields_are_order_insensitive() {
        let shuffled = r#"{
            "client_secret": "s",
            "grant_type": "device",
            "device_token": "b64.hex",
            "client_id": "1",
            "device_id": "d"
        }"#;

        let decoded: TokenRequest = serde_json::from_str(shuffled).unwrap();
        assert_eq!(decoded.device_id, "d");
        assert_eq!(decoded.device_token, "b64.hex");
        assert_eq!(decoded.grant_type, "device");
        assert_eq!(decoded.client_id, "1");
        assert_eq!(decoded.client_secret, "s");
    }

    #[test]
    fn missing_access_token_decodes_to_empty() {
        let response: TokenResponse = serde_json::from_str(r#"{"error":"invalid_grant"}"#).unwrap();
        assert!(response.access_token.is_empty());
    }
}
