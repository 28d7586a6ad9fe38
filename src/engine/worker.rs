// * A Worker is one authenticated identity: its own proxied transport, its own
// * bearer token, its own cookie jar. Construction goes through the handshake,
// * so a Worker that exists can always issue lookups.

use crate::auth::bootstrap::obtain_access_token;
use crate::config::constants::{
    offer_phones_url, LOOKUP_INITIAL_BACKOFF, LOOKUP_MAX_ATTEMPTS, WORKER_BURST,
    WORKER_REFILL_PERIOD,
};
use crate::network::cancel::CancelHandle;
use crate::network::client::HttpClient;
use crate::network::errors::AccessError;
use crate::network::retry::{classify_status, retry, RetryError};
use rand::Rng;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

pub struct Worker {
    client: HttpClient,
    access_token: String,
    user_agents: Vec<String>,
    proxy_addr: String,
}

#[derive(Debug, Deserialize)]
struct PhoneResponse {
    #[serde(default)]
    data: HashMap<String, Vec<String>>,
}

// * Lookup statuses the generic classification must not see first.
#[derive(Debug, PartialEq)]
enum Disposition {
    Blocked,
    NoData,
    Proceed,
}

fn lookup_disposition(status: u16) -> Disposition {
    match status {
        // * The remote flags the egress IP; retrying only deepens the block
        403 => Disposition::Blocked,
        // * The listing has no phone attached
        400 => Disposition::NoData,
        _ => Disposition::Proceed,
    }
}

fn first_phone(body: &str) -> Result<Option<String>, AccessError> {
    let parsed: PhoneResponse = serde_json::from_str(body)?;
    Ok(parsed
        .data
        .get("phones")
        .and_then(|phones| phones.first())
        .cloned())
}

impl Worker {
    // * Full construction path: proxied transport with the tight worker quota,
    // * then the device handshake for the bearer token.
    pub async fn bootstrap(
        proxy_addr: &str,
        user_agents: Vec<String>,
        cancel: &CancelHandle,
    ) -> Result<Self, AccessError> {
        let client = HttpClient::new(Some(proxy_addr))?
            .with_rate_limit(WORKER_REFILL_PERIOD, WORKER_BURST);
        let access_token = obtain_access_token(&client, cancel).await?;
        Self::new(client, access_token, user_agents, proxy_addr.to_string())
    }

    // * Direct constructor enforcing the worker invariants: a bearer token and
    // * at least one user agent.
    pub fn new(
        client: HttpClient,
        access_token: String,
        user_agents: Vec<String>,
        proxy_addr: String,
    ) -> Result<Self, AccessError> {
        if access_token.is_empty() {
            return Err(AccessError::TokenExchange("empty access token".to_string()));
        }
        if user_agents.is_empty() {
            return Err(AccessError::NoUserAgents);
        }

        Ok(Self {
            client,
            access_token,
            user_agents,
            proxy_addr,
        })
    }

    pub fn proxy_addr(&self) -> &str {
        &self.proxy_addr
    }

    // * Resolves the first phone attached to a listing, or None when the
    // * listing carries no phone (HTTP 400). A 403 surfaces as Blocked and is
    // * never retried; transport faults and 5xx go through the backoff loop.
    pub async fn get_phone(
        &self,
        listing_id: &str,
        cancel: &CancelHandle,
    ) -> Result<Option<String>, AccessError> {
        let url = offer_phones_url(listing_id);
        // * Fresh draw per lookup, not per attempt and not cached
        let user_agent = self.pick_user_agent();
        let bearer = format!("Bearer {}", self.access_token);

        retry(LOOKUP_MAX_ATTEMPTS, LOOKUP_INITIAL_BACKOFF, || {
            let url = url.clone();
            let user_agent = user_agent.clone();
            let bearer = bearer.clone();

            async move {
                let request = self
                    .client
                    .request(Method::GET, &url)
                    .header(AUTHORIZATION, bearer)
                    .header(USER_AGENT, user_agent)
                    .build()
                    .map_err(|err| RetryError::Fatal(AccessError::Transport(err)))?;

                let response = self.client.execute(request, cancel).await?;
                let status = response.status().as_u16();
                debug!(listing = listing_id, status, "lookup response");

                match lookup_disposition(status) {
                    Disposition::Blocked => {
                        return Err(RetryError::Fatal(AccessError::Blocked(status)))
                    }
                    Disposition::NoData => return Ok(None),
                    Disposition::Proceed => {}
                }
                classify_status(status)?;

                let body = response
                    .text()
                    .await
                    .map_err(|err| RetryError::Retryable(AccessError::Transport(err)))?;
                first_phone(&body).map_err(RetryError::Fatal)
            }
        })
        .await
    }

    fn pick_user_agent(&self) -> String {
        let index = rand::thread_rng().gen_range(0..self.user_agents.len());
        self.user_agents[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_matrix() {
        assert_eq!(lookup_disposition(403), Disposition::Blocked);
        assert_eq!(lookup_disposition(400), Disposition::NoData);
        assert_eq!(lookup_disposition(200), Disposition::Proceed);
        assert_eq!(lookup_disposition(500), Disposition::Proceed);
    }

    #[test]
    fn first_phone_returns_head_of_list() {
        let body = r#"{"data":{"phones":["+998901234567","+998907654321"]}}"#;
        assert_eq!(
            first_phone(body).unwrap(),
            Some("+998901234567".to_string())
        );
    }

    #[test]
    fn first_phone_handles_empty_and_absent_lists() {
        assert_eq!(first_phone(r#"{"data":{"phones":[]}}"#).unwrap(), None);
        assert_eq!(first_phone(r#"{"data":{}}"#).unwrap(), None);
        assert_eq!(first_phone(r#"{}"#).unwrap(), None);
    }

    #[test]
    fn first_phone_rejects_garbage() {
        assert!(matches!(
            first_phone("<html>not json</html>"),
            Err(AccessError::Decode(_))
        ));
    }

    #[test]
    fn construction_requires_token_and_agents() {
        let client = HttpClient::new(None).unwrap();
        let missing_token = Worker::new(
            client,
            String::new(),
            vec!["Agent/1.0".to_string()],
            "127.0.0.1:9050".to_string(),
        );
        assert!(matches!(missing_token, Err(AccessError::TokenExchange(_))));

        let client = HttpClient::new(None).unwrap();
        let missing_agents = Worker::new(
            client,
            "token".to_string(),
            Vec::new(),
            "127.0.0.1:9050".to_string(),
        );
        assert!(matches!(missing_agents, Err(AccessError::NoUserAgents)));
    }

    #[test]
    fn user_agent_is_drawn_from_the_pool() {
        let agents = vec!["A/1".to_string(), "B/2".to_string(), "C/3".to_string()];
        let worker = Worker::new(
            HttpClient::new(None).unwrap(),
            "token".to_string(),
            agents.clone(),
            "127.0.0.1:9050".to_string(),
        )
        .unwrap();

        for _ in 0..32 {
            assert!(agents.contains(&worker.pick_user_agent()));
        }
    }
}
