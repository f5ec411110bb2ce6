//! Request/response contract consumed by the store and the mutation gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use super::envelope::Envelope;
use super::error::{generic_message, Failure};
use crate::config::Config;

/// Abstract JSON transport. Implementations never retry; retry policy is
/// owned by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Envelope, Failure>;
    async fn patch(&self, path: &str, body: Value) -> Result<Envelope, Failure>;
}

/// `Transport` over HTTP(S) with reqwest
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.base_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read_envelope(response: Response) -> Result<Envelope, Failure> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let code = i64::from(status.as_u16());
            let message =
                Envelope::message_from_body(&body).unwrap_or_else(|| generic_message(Some(code)));
            return Err(Failure::network(message).with_status(code));
        }

        serde_json::from_slice::<Envelope>(&body)
            .map_err(|e| Failure::business(None, Some(format!("Malformed response: {}", e))))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Envelope, Failure> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::read_envelope(response).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Envelope, Failure> {
        let url = self.url(path);
        tracing::debug!(url = %url, "PATCH");
        let response = self.client.patch(&url).json(&body).send().await?;
        Self::read_envelope(response).await
    }
}
