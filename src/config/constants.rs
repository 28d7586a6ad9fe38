// * Configuration Constants
// * Central location for endpoints, transport timeouts, limiter quotas and
// * retry budgets used across the access layer.

use std::time::Duration;

// * OAuth token endpoint (device grant)
pub const AUTH_URL: &str = "https://www.olx.uz/api/open/oauth/token/";

// * Any public listing detail page; its source embeds the client credentials
pub const DETAIL_URL: &str = "https://www.olx.uz/d/nedvizhimost/";

// * Lookup endpoint, parameterized by the opaque listing id
pub fn offer_phones_url(listing_id: &str) -> String {
    format!("https://www.olx.uz/api/v1/offers/{listing_id}/limited-phones/")
}

// * Grant type expected by the token endpoint
pub const GRANT_TYPE_DEVICE: &str = "device";

// * Fixed HMAC key used by the device token derivation
pub const DEVICE_TOKEN_KEY: &[u8] = b"device";

// * Proxy entries are bare host:port; all egress goes over SOCKS5
pub const PROXY_SCHEME: &str = "socks5";

// * Transport timeouts
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// * Default bucket: one token per second, burst of 3
pub const DEFAULT_REFILL_PERIOD: Duration = Duration::from_secs(1);
pub const DEFAULT_BURST: u32 = 3;

// * Workers run a tighter bucket to stay under the remote's radar
pub const WORKER_REFILL_PERIOD: Duration = Duration::from_secs(1);
pub const WORKER_BURST: u32 = 2;

// * Lookup retry budget
pub const LOOKUP_MAX_ATTEMPTS: u32 = 3;
pub const LOOKUP_INITIAL_BACKOFF: Duration = Duration::from_millis(500);

// * Input feeds and the result sink
pub const PROXIES_FILE: &str = "proxies.txt";
pub const AGENTS_FILE: &str = "agents.txt";
pub const IDS_FILE: &str = "ids.txt";
pub const RESULT_FILE: &str = "result.csv";
