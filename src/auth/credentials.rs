// * Client credential extraction.
// * Listing detail pages ship `window.__INIT_CONFIG__ = "<escaped json>"`, a
// * JSON document double-encoded into a JS string literal. Rather than one
// * monolithic pattern over the whole page, the literal is located, unescaped
// * once, parsed, and the credential fields pulled out of the value tree at
// * whatever depth the frontend buried them.

use crate::network::errors::AccessError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// * Captures the string literal assigned to the config global
static INIT_CONFIG_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window\.__INIT_CONFIG__\s*=\s*"((?:[^"\\]|\\.)*)""#)
        .expect("! CRITICAL: Failed to compile config literal regex")
});

/// The public OAuth client pair embedded in every detail page. Not a secret in
/// the usual sense, but required by the token endpoint alongside the device
/// identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

// * Fails with CredentialsNotFound on any shape mismatch: marker missing,
// * literal not valid JSON once unescaped, or either field absent.
pub fn extract_client_credentials(body: &str) -> Result<ClientCredentials, AccessError> {
    let captured = INIT_CONFIG_LITERAL
        .captures(body)
        .ok_or(AccessError::CredentialsNotFound)?;

    // * Re-wrapping in quotes lets serde_json perform the single unescape pass
    let unescaped: String = serde_json::from_str(&format!("\"{}\"", &captured[1]))
        .map_err(|_| AccessError::CredentialsNotFound)?;

    let config: Value =
        serde_json::from_str(&unescaped).map_err(|_| AccessError::CredentialsNotFound)?;

    let client_id =
        find_string_field(&config, "client_id").ok_or(AccessError::CredentialsNotFound)?;
    let client_secret =
        find_string_field(&config, "client_secret").ok_or(AccessError::CredentialsNotFound)?;

    Ok(ClientCredentials {
        client_id,
        client_secret,
    })
}

// * Depth-first search for a string field; the config layout shifts between
// * frontend releases, so no fixed path is assumed.
fn find_string_field(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(found)) = map.get(key) {
                return Some(found.clone());
            }
            map.values().find_map(|nested| find_string_field(nested, key))
        }
        Value::Array(items) => items.iter().find_map(|item| find_string_field(item, key)),
        _ => None,
    }
}
