// * Device-identity handshake: scrape the public client credentials, derive a
// * signed device identity, exchange both for a bearer token.

pub mod bootstrap;
pub mod credentials;
pub mod device;

// * Re-exports for convenient access
pub use bootstrap::{obtain_access_token, TokenRequest, TokenResponse};
pub use credentials::{extract_client_credentials, ClientCredentials};
pub use device::{derive_device_token, device_id_from_bytes, generate_device_id};
