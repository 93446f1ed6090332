//! Telegram Bot API client.
//!
//! Minimal surface: long polling via getUpdates and outbound sendMessage.
//! The client can route all traffic through an HTTP proxy when the
//! deployment network requires one.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use relay_common::error::RelayError;
use serde::Deserialize;
use serde_json::json;

use crate::transport::{ChatTransport, Markup};

/// Envelope returned by every Bot API method
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One long-poll update
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// Incoming chat message. Non-text payloads (photos, stickers) arrive
/// with `text: None` and are skipped by the poller.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl User {
    /// Display name as shown in operator notifications.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

/// HTTP client for one bot credential.
pub struct TelegramTransport {
    client: reqwest::Client,
    base: String,
}

impl TelegramTransport {
    /// Build the client. The request timeout leaves headroom over the
    /// long-poll window so getUpdates is not cut off by our own timer.
    pub fn new(
        api_url: &str,
        token: &str,
        poll_timeout_secs: u64,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(poll_timeout_secs + 10));

        if let Some(url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(url).context("Invalid proxy URL")?);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    /// Long-poll for updates with ids at or past `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, RelayError> {
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });

        let raw = self
            .client
            .post(format!("{}/getUpdates", self.base))
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?
            .text()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        let resp: ApiResponse<Vec<Update>> = serde_json::from_str(&raw)?;
        if !resp.ok {
            return Err(RelayError::Api(
                resp.description
                    .unwrap_or_else(|| "getUpdates failed".to_string()),
            ));
        }

        Ok(resp.result.unwrap_or_default())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, recipient: i64, text: &str, markup: Markup) -> Result<(), RelayError> {
        let mut body = json!({
            "chat_id": recipient,
            "text": text,
        });
        if markup == Markup::Html {
            body["parse_mode"] = json!("HTML");
        }

        let raw = self
            .client
            .post(format!("{}/sendMessage", self.base))
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?
            .text()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        let resp: ApiResponse<serde_json::Value> = serde_json::from_str(&raw)?;
        if !resp.ok {
            return Err(RelayError::Api(
                resp.description
                    .unwrap_or_else(|| "sendMessage failed".to_string()),
            ));
        }

        Ok(())
    }
}
