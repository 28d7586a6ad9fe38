use crate::config::constants::{
    CONNECT_TIMEOUT, DEFAULT_BURST, DEFAULT_REFILL_PERIOD, PROXY_SCHEME, REQUEST_TIMEOUT,
    TCP_KEEPALIVE,
};
use crate::network::cancel::CancelHandle;
use crate::network::errors::AccessError;
use governor::{Quota, RateLimiter as GovernorLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, Method, Proxy, Request, RequestBuilder, Response};
use std::num::NonZeroU32;
use std::time::Duration;

type DirectLimiter = GovernorLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

// * The Primary HTTP Engine. One instance per worker, so the bucket and the
// * cookie jar stay private to a single egress identity.
pub struct HttpClient {
    inner: Client,
    limiter: DirectLimiter,
}

impl HttpClient {
    // * Builds the transport with fixed connection timeouts and the default
    // * bucket (1 token/s, burst 3).
    // * @param proxy_addr - Optional bare host:port, routed over SOCKS5
    pub fn new(proxy_addr: Option<&str>) -> Result<Self, AccessError> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .connect_timeout(CONNECT_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .timeout(REQUEST_TIMEOUT);

        // * Apply Proxy if provided; all traffic for this client egresses there
        if let Some(addr) = proxy_addr {
            let proxy = Proxy::all(format!("{PROXY_SCHEME}://{addr}"))
                .map_err(|_| AccessError::InvalidProxy(addr.to_string()))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            inner: builder.build()?,
            limiter: build_limiter(DEFAULT_REFILL_PERIOD, DEFAULT_BURST),
        })
    }

    // * Replaces the token bucket (workers run a tighter quota than default).
    pub fn with_rate_limit(mut self, refill_period: Duration, burst: u32) -> Self {
        self.limiter = build_limiter(refill_period, burst);
        self
    }

    // * Waits for a bucket permit, then dispatches. Both waits race the cancel
    // * handle. One token is consumed per permitted call; no internal retry.
    pub async fn execute(
        &self,
        request: Request,
        cancel: &CancelHandle,
    ) -> Result<Response, AccessError> {
        if cancel.is_cancelled() {
            return Err(AccessError::Cancelled);
        }

        tokio::select! {
            _ = self.limiter.until_ready() => {}
            _ = cancel.cancelled() => return Err(AccessError::Cancelled),
        }

        tokio::select! {
            result = self.inner.execute(request) => Ok(result?),
            _ = cancel.cancelled() => Err(AccessError::Cancelled),
        }
    }

    pub async fn get(&self, url: &str, cancel: &CancelHandle) -> Result<Response, AccessError> {
        let request = self.inner.get(url).build()?;
        self.execute(request, cancel).await
    }

    // * Exposes the underlying builder so callers can attach headers/bodies
    // * before handing the built request back to `execute`.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.inner.request(method, url)
    }
}

fn build_limiter(refill_period: Duration, burst: u32) -> DirectLimiter {
    let quota = Quota::with_period(refill_period)
        .unwrap_or_else(|| Quota::per_second(nonzero!(1u32)))
        .allow_burst(NonZeroU32::new(burst).unwrap_or(nonzero!(1u32)));

    GovernorLimiter::direct(quota)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::cancel::cancel_channel;

    #[test]
    fn client_builds_without_proxy() {
        assert!(HttpClient::new(None).is_ok());
    }

    #[test]
    fn client_builds_with_proxy() {
        assert!(HttpClient::new(Some("127.0.0.1:9050")).is_ok());
    }

    #[tokio::test]
    async fn tripped_handle_short_circuits_execute() {
        let client = HttpClient::new(None).unwrap();
        let (tx, cancel) = cancel_channel();
        tx.send(true).unwrap();

        let request = client
            .request(Method::GET, "http://127.0.0.1:9/unreachable")
            .build()
            .unwrap();
        let result = client.execute(request, &cancel).await;
        assert!(matches!(result, Err(AccessError::Cancelled)));
    }

    #[tokio::test]
    async fn burst_permits_are_granted_immediately() {
        // * Burst of 2: two permits must clear without waiting on refill
        let client = HttpClient::new(None)
            .unwrap()
            .with_rate_limit(Duration::from_secs(60), 2);

        let started = std::time::Instant::now();
        for _ in 0..2 {
            tokio::select! {
                _ = client.limiter.until_ready() => {}
                _ = tokio::time::sleep(Duration::from_secs(5)) => panic!("permit not granted"),
            }
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
