//! Upstream quote proxy client.

use log::warn;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Fetches the quote of the moment from one configured upstream.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    http: Client,
    url: String,
}

impl QuoteClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }

    /// Returns the upstream JSON body unchanged.
    ///
    /// Transport errors, timeouts, non-2xx statuses and undecodable bodies are all errors.
    pub async fn fetch(&self) -> Result<Value, reqwest::Error> {
        let result = async {
            self.http
                .get(&self.url)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;

        if let Err(err) = &result {
            warn!(
                "event=quote_fetch module=quote status=error timeout={} status_code={}",
                err.is_timeout(),
                err.status().map_or(0, |status| status.as_u16())
            );
        }
        result
    }
}
