//! Minimal Telegram Bot API client over long polling
//!
//! The token is part of every request URL, so transport errors are logged
//! with the URL stripped.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use super::session::{ChatId, DURATION_CHOICES};
use crate::config::BotConfig;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize)]
struct InlineKeyboardButton {
    text: String,
    callback_data: String,
}

fn duration_keyboard() -> Value {
    let row: Vec<InlineKeyboardButton> = DURATION_CHOICES
        .iter()
        .map(|days| InlineKeyboardButton {
            text: format!("{days}-day forecast"),
            callback_data: days.to_string(),
        })
        .collect();
    json!({ "inline_keyboard": [row] })
}

#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    endpoint: String,
    poll_timeout: u32,
}

impl TelegramClient {
    pub fn new(config: &BotConfig, token: &str) -> Result<Self> {
        // Long polls hold the connection for up to poll_timeout seconds
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.poll_timeout_seconds) + 10))
            .build()
            .context("Failed to create Telegram HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}", config.api_base_url.trim_end_matches('/'), token),
            poll_timeout: config.poll_timeout_seconds,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: Value) -> Result<T> {
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("Telegram {method} request failed: {}", e.without_url()))?;

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| anyhow!("Telegram {method} response unreadable: {}", e.without_url()))?;

        if !body.ok {
            return Err(anyhow!(
                "Telegram {method} rejected: {}",
                body.description.unwrap_or_default()
            ));
        }
        body.result
            .ok_or_else(|| anyhow!("Telegram {method} returned no result"))
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "timeout": self.poll_timeout,
                    "allowed_updates": ["message", "callback_query"],
                }),
            )
            .await?;
        debug!("Received {} updates", updates.len());
        Ok(updates)
    }

    pub async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        with_duration_keyboard: bool,
    ) -> Result<()> {
        let mut payload = json!({ "chat_id": chat, "text": text });
        if with_duration_keyboard {
            payload["reply_markup"] = duration_keyboard();
        }
        let _: Value = self.call("sendMessage", payload).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        let _: Value = self
            .call(
                "answerCallbackQuery",
                json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }
}
