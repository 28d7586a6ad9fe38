// * Rate-limited, multi-identity access layer for the OLX limited-phones API.
// * Each worker owns a proxied HTTP client and a bearer token obtained through
// * the device-identity handshake; the pool spreads lookups across workers.

pub mod auth;
pub mod config;
pub mod engine;
pub mod feed;
pub mod network;
