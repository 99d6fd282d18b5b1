// src/notify/telegram.rs
use anyhow::{anyhow, Context, Result};
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::DeliverySink;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramClient {
    token: String,
    base: String,
    client: Client,
    timeout: Duration,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self {
            token,
            base: API_BASE.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Point at a different Bot API server (local bot API, tests).
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base, self.token, method)
    }

    /// Long-poll for new updates after `offset`.
    pub async fn get_updates(&self, offset: i64, poll_secs: u64) -> Result<Vec<Update>> {
        let rsp = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[("offset", offset.to_string()), ("timeout", poll_secs.to_string())])
            .timeout(Duration::from_secs(poll_secs) + self.timeout)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("telegram getUpdates")?;
        let body: ApiResponse<Vec<Update>> = rsp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("telegram getUpdates body")?;
        body.into_result()
    }

    /// The bot's own account; used to ignore commands addressed to other bots.
    pub async fn get_me(&self) -> Result<User> {
        let rsp = self
            .client
            .get(self.method_url("getMe"))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("telegram getMe")?;
        let body: ApiResponse<User> = rsp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("telegram getMe body")?;
        body.into_result()
    }

    async fn post_json(&self, method: &str, payload: &impl Serialize) -> Result<()> {
        let rsp = self
            .client
            .post(self.method_url(method))
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("telegram {method}"))?;
        let body: ApiResponse<serde_json::Value> = rsp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("telegram {method} body"))?;
        body.into_result().map(|_| ())
    }
}

#[async_trait::async_trait]
impl DeliverySink for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        self.post_json("sendMessage", &payload).await
    }

    async fn send_file(&self, chat_id: i64, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/json")
            .context("document mime")?;
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let rsp = self
            .client
            .post(self.method_url("sendDocument"))
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("telegram sendDocument")?;
        let body: ApiResponse<serde_json::Value> = rsp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("telegram sendDocument body")?;
        body.into_result().map(|_| ())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T> {
        match (self.ok, self.result) {
            (true, Some(r)) => Ok(r),
            _ => Err(anyhow!(
                "telegram api error: {}",
                self.description.unwrap_or_else(|| "unknown".to_string())
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_deserialize() {
        let raw = r#"{"ok":true,"result":[
            {"update_id":7,"message":{"message_id":1,"chat":{"id":42,"type":"private"},"text":"/check"}},
            {"update_id":8,"edited_message":{}}
        ]}"#;
        let body: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let ups = body.into_result().unwrap();
        assert_eq!(ups.len(), 2);
        assert_eq!(ups[0].message.as_ref().unwrap().chat.id, 42);
        assert!(ups[1].message.is_none());
    }

    #[test]
    fn api_error_carries_description() {
        let raw = r#"{"ok":false,"description":"Unauthorized"}"#;
        let body: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let err = body.into_result().unwrap_err().to_string();
        assert!(err.contains("Unauthorized"));
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_token() {
        let c = TelegramClient::new("123456:SECRET_TOKEN".into())
            .with_base("http://127.0.0.1:9")
            .with_timeout(2);

        let err = c.send_text(1, "hi").await.unwrap_err();
        let shown = format!("{err:?} / {err:#}");
        assert!(shown.contains("telegram sendMessage"));
        assert!(!shown.contains("SECRET_TOKEN"), "{shown}");

        let err = c.send_file(1, "data.json", b"{}".to_vec()).await.unwrap_err();
        assert!(!format!("{err:?}").contains("SECRET_TOKEN"));

        let err = c.get_updates(0, 0).await.unwrap_err();
        assert!(!format!("{err:?}").contains("SECRET_TOKEN"));

        let err = c.get_me().await.unwrap_err();
        assert!(!format!("{err:?}").contains("SECRET_TOKEN"));
    }

    #[test]
    fn method_url_shape() {
        let c = TelegramClient::new("123:abc".into()).with_base("http://localhost:8081/");
        assert_eq!(c.method_url("getMe"), "http://localhost:8081/bot123:abc/getMe");
    }
}
