use crate::adapters::smtp::SmtpMailer;
use crate::adapters::twilio::TwilioClient;
use crate::config::NotifyConfig;
use crate::domain::model::MessageChannel;
use crate::domain::ports::Notifier;
use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;

/// 把 Twilio 與 SMTP 包成單一通知介面
///
/// 設定不完整的管道只發出警告並停用，不會讓整個流程失敗。
pub struct NotificationManager {
    twilio: Option<TwilioClient>,
    mailer: Option<SmtpMailer>,
    channels: Vec<MessageChannel>,
}

impl NotificationManager {
    pub fn from_config(config: &NotifyConfig) -> Self {
        let twilio = match &config.twilio {
            Some(twilio) => {
                let missing = twilio.missing_fields_for(&config.channels);
                if missing.is_empty() {
                    let unused = twilio.missing_fields();
                    if !unused.is_empty() {
                        tracing::warn!(
                            "⚠️ Missing Twilio settings: {}. Some notification methods may not work",
                            unused.join(", ")
                        );
                    }
                    Some(TwilioClient::new(twilio))
                } else {
                    tracing::warn!(
                        "⚠️ Missing Twilio settings: {}. SMS/WhatsApp notifications are disabled",
                        missing.join(", ")
                    );
                    None
                }
            }
            None => None,
        };

        let mailer = match &config.email {
            Some(email) => {
                let missing = email.missing_fields();
                if !missing.is_empty() {
                    tracing::warn!(
                        "⚠️ Missing email settings: {}. Email notifications are disabled",
                        missing.join(", ")
                    );
                    None
                } else {
                    match SmtpMailer::new(email) {
                        Ok(mailer) => Some(mailer),
                        Err(e) => {
                            tracing::warn!("⚠️ {}. Email notifications are disabled", e);
                            None
                        }
                    }
                }
            }
            None => None,
        };

        Self {
            twilio,
            mailer,
            channels: config.channels.clone(),
        }
    }

    pub fn has_messaging(&self) -> bool {
        self.twilio.is_some()
    }

    pub fn has_email(&self) -> bool {
        self.mailer.is_some()
    }
}

#[async_trait]
impl Notifier for NotificationManager {
    fn message_channels(&self) -> &[MessageChannel] {
        &self.channels
    }

    async fn send_message(&self, channel: MessageChannel, body: &str) -> Result<String> {
        let twilio = self
            .twilio
            .as_ref()
            .ok_or_else(|| TrackerError::MissingConfigError {
                field: "notify.twilio".to_string(),
            })?;
        twilio.send(channel, body).await
    }

    async fn send_emails(&self, recipients: &[String], body: &str) -> Result<usize> {
        let mailer = self
            .mailer
            .as_ref()
            .ok_or_else(|| TrackerError::MissingConfigError {
                field: "notify.email".to_string(),
            })?;
        mailer.send_emails(recipients, body).await
    }
}
