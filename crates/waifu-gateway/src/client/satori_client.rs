//! Satori HTTP API client
//!
//! Every API call is `POST {endpoint}/v1/{resource}.{method}` with a JSON
//! body. The bot account a call acts as is selected with the platform and
//! self-id headers, so one client serves every login on the host.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use waifu_common::SatoriConfig;
use waifu_core::{HostError, MemberListSource, MemberPage};

use crate::error::{SatoriError, SatoriResult};

/// Shared HTTP client for one Satori host
#[derive(Debug, Clone)]
pub struct SatoriClient {
    http: Client,
    api_base: String,
    token: Option<String>,
}

impl SatoriClient {
    pub fn new(config: &SatoriConfig) -> SatoriResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base(),
            token: config.token.clone(),
        })
    }

    /// Bind the client to one bot login
    pub fn bot(&self, platform: impl Into<String>, self_id: impl Into<String>) -> SatoriBot {
        SatoriBot {
            client: self.clone(),
            platform: platform.into(),
            self_id: self_id.into(),
        }
    }
}

/// Client acting as one bot login
#[derive(Debug, Clone)]
pub struct SatoriBot {
    client: SatoriClient,
    platform: String,
    self_id: String,
}

impl SatoriBot {
    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    fn request(&self, method: &str, body: &Value) -> reqwest::RequestBuilder {
        let url = format!("{}/{method}", self.client.api_base);
        let builder = self
            .client
            .http
            .post(url)
            .header("Satori-Platform", &self.platform)
            .header("Satori-User-ID", &self.self_id)
            .header("X-Platform", &self.platform)
            .header("X-Self-ID", &self.self_id)
            .json(body);

        match &self.client.token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> SatoriResult<T> {
        let resp = self.request(method, &body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SatoriError::Status { status, body });
        }

        let text = resp.text().await?;
        // Some methods answer with an empty body
        let text = if text.trim().is_empty() { "null" } else { &text };
        Ok(serde_json::from_str(text)?)
    }

    /// Fetch one page of a guild's member list
    pub async fn guild_member_list_page(
        &self,
        guild_id: &str,
        next: Option<&str>,
    ) -> SatoriResult<MemberPage> {
        let mut body = json!({ "guild_id": guild_id });
        if let Some(next) = next {
            body["next"] = Value::String(next.to_string());
        }
        self.call("guild.member.list", body).await
    }

    /// Send a message to a channel
    pub async fn send_message(&self, channel_id: &str, content: &str) -> SatoriResult<()> {
        let _: Value = self
            .call(
                "message.create",
                json!({ "channel_id": channel_id, "content": content }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MemberListSource for SatoriBot {
    async fn guild_member_list(
        &self,
        guild_id: &str,
        next: Option<&str>,
    ) -> Result<MemberPage, HostError> {
        self.guild_member_list_page(guild_id, next)
            .await
            .map_err(HostError::from)
    }
}
