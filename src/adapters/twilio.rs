use crate::config::TwilioConfig;
use crate::domain::model::MessageChannel;
use crate::utils::error::{Result, TrackerError};
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "Twilio";

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Twilio Programmable Messaging：SMS 與 WhatsApp
pub struct TwilioClient {
    client: Client,
    messages_url: String,
    account_sid: String,
    auth_token: String,
    virtual_number: String,
    verified_number: String,
    whatsapp_number: String,
}

impl TwilioClient {
    pub fn new(config: &TwilioConfig) -> Self {
        let messages_url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.base_url.trim_end_matches('/'),
            config.account_sid
        );

        Self {
            client: Client::new(),
            messages_url,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            virtual_number: config.virtual_number.clone(),
            verified_number: config.verified_number.clone(),
            whatsapp_number: config.whatsapp_number.clone(),
        }
    }

    fn numbers(&self, channel: MessageChannel) -> (String, String) {
        match channel {
            MessageChannel::Sms => (self.virtual_number.clone(), self.verified_number.clone()),
            MessageChannel::Whatsapp => (
                format!("whatsapp:{}", self.whatsapp_number),
                format!("whatsapp:{}", self.verified_number),
            ),
        }
    }

    /// 回傳 Twilio 的訊息 SID
    pub async fn send(&self, channel: MessageChannel, body: &str) -> Result<String> {
        let (from, to) = self.numbers(channel);

        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", from.as_str()), ("To", to.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::http_status(SERVICE, status, body));
        }

        let message: MessageResponse = response.json().await?;
        tracing::info!(
            "{} message sent successfully (SID: {}, status: {})",
            channel,
            message.sid,
            message.status.as_deref().unwrap_or("unknown")
        );
        Ok(message.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn config(server: &MockServer) -> TwilioConfig {
        TwilioConfig {
            base_url: server.base_url(),
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            virtual_number: "+15005550006".to_string(),
            verified_number: "+447700900000".to_string(),
            whatsapp_number: "+14155238886".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_whatsapp_prefixes_numbers() {
        let server = MockServer::start();
        let message_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/2010-04-01/Accounts/AC123/Messages.json")
                // "AC123:token" in base64
                .header("Authorization", "Basic QUMxMjM6dG9rZW4=")
                .x_www_form_urlencoded_tuple("From", "whatsapp:+14155238886")
                .x_www_form_urlencoded_tuple("To", "whatsapp:+447700900000")
                .x_www_form_urlencoded_tuple("Body", "Low price alert!");
            then.status(201)
                .json_body(serde_json::json!({"sid": "SM001", "status": "queued"}));
        });

        let client = TwilioClient::new(&config(&server));
        let sid = client
            .send(MessageChannel::Whatsapp, "Low price alert!")
            .await
            .unwrap();

        message_mock.assert();
        assert_eq!(sid, "SM001");
    }

    #[tokio::test]
    async fn test_send_sms_uses_virtual_number() {
        let server = MockServer::start();
        let message_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/2010-04-01/Accounts/AC123/Messages.json")
                .x_www_form_urlencoded_tuple("From", "+15005550006")
                .x_www_form_urlencoded_tuple("To", "+447700900000");
            then.status(201).json_body(serde_json::json!({"sid": "SM002"}));
        });

        let client = TwilioClient::new(&config(&server));
        let sid = client.send(MessageChannel::Sms, "hello").await.unwrap();

        message_mock.assert();
        assert_eq!(sid, "SM002");
    }

    #[tokio::test]
    async fn test_send_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/2010-04-01/Accounts/AC123/Messages.json");
            then.status(401).json_body(serde_json::json!({"code": 20003, "message": "Authenticate"}));
        });

        let client = TwilioClient::new(&config(&server));
        let result = client.send(MessageChannel::Sms, "hello").await;
        assert!(matches!(result, Err(TrackerError::HttpStatus { status: 401, .. })));
    }
}
