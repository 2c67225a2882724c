use crate::config::EmailConfig;
use crate::utils::error::{Result, TrackerError};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

fn email_error(message: impl std::fmt::Display) -> TrackerError {
    TrackerError::EmailError {
        message: message.to_string(),
    }
}

/// 透過 SMTP (STARTTLS + 登入) 寄信給訂閱者
pub struct SmtpMailer {
    smtp_address: String,
    port: Option<u16>,
    from: Mailbox,
    credentials: Credentials,
    subject: String,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from: Mailbox = config
            .address
            .parse()
            .map_err(|e| email_error(format!("invalid sender '{}': {}", config.address, e)))?;

        Ok(Self {
            smtp_address: config.smtp_address.clone(),
            port: config.smtp_port,
            from,
            credentials: Credentials::new(config.address.clone(), config.password.clone()),
            subject: config.subject.clone(),
        })
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp_address)
            .map_err(email_error)?
            .credentials(self.credentials.clone());
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        Ok(builder.build())
    }

    pub fn build_message(&self, recipient: &str, body: &str) -> Result<Message> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| email_error(format!("invalid recipient '{}': {}", recipient, e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(email_error)
    }

    /// 先確認 SMTP 連線，再交給 [`SmtpMailer::deliver`] 寄出
    pub async fn send_emails(&self, recipients: &[String], body: &str) -> Result<usize> {
        if recipients.is_empty() {
            tracing::info!("No recipients provided for email notification");
            return Ok(0);
        }

        let transport = self.transport()?;
        transport.test_connection().await.map_err(email_error)?;

        self.deliver(&transport, recipients, body).await
    }

    /// 逐一寄出，單封失敗只記錄不中斷；回傳成功封數
    pub async fn deliver<T>(&self, transport: &T, recipients: &[String], body: &str) -> Result<usize>
    where
        T: AsyncTransport + Sync,
        T::Error: std::fmt::Display,
    {
        let mut successful = 0;
        for recipient in recipients {
            let sent = match self.build_message(recipient, body) {
                Ok(message) => transport.send(message).await.map_err(email_error),
                Err(e) => Err(e),
            };

            match sent {
                Ok(_) => successful += 1,
                Err(e) => tracing::warn!("Failed to send email to {}: {}", recipient, e),
            }
        }

        tracing::info!(
            "📧 Successfully sent {} out of {} emails",
            successful,
            recipients.len()
        );
        Ok(successful)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettre::transport::stub::AsyncStubTransport;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_address: "smtp.example.com".to_string(),
            smtp_port: None,
            address: "alerts@example.com".to_string(),
            password: "app-password".to_string(),
            subject: "New Low Price Flight!".to_string(),
        }
    }

    #[test]
    fn test_build_message_headers() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let message = mailer
            .build_message("ada@example.com", "Low price alert! Only £55 to fly direct")
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: alerts@example.com"));
        assert!(raw.contains("To: ada@example.com"));
        assert!(raw.contains("Subject: New Low Price Flight!"));
    }

    #[test]
    fn test_invalid_addresses() {
        let mut bad_sender = config();
        bad_sender.address = "not an address".to_string();
        assert!(matches!(
            SmtpMailer::new(&bad_sender),
            Err(TrackerError::EmailError { .. })
        ));

        let mailer = SmtpMailer::new(&config()).unwrap();
        assert!(mailer.build_message("nobody", "hi").is_err());
    }

    #[test]
    fn test_empty_recipient_list_sends_nothing() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let sent = tokio_test::block_on(mailer.send_emails(&[], "hi")).unwrap();
        assert_eq!(sent, 0);
    }

    fn recipients() -> Vec<String> {
        vec![
            "ada@example.com".to_string(),
            "not an address".to_string(),
            "di@example.com".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_deliver_skips_invalid_recipient() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let transport = AsyncStubTransport::new_ok();

        let sent = mailer
            .deliver(&transport, &recipients(), "Low price alert!")
            .await
            .unwrap();

        assert_eq!(sent, 2);
        let delivered = transport.messages().await;
        assert_eq!(delivered.len(), 2);
        assert!(delivered[0].1.contains("To: ada@example.com"));
        assert!(delivered[1].1.contains("To: di@example.com"));
    }

    #[tokio::test]
    async fn test_deliver_counts_transport_failures() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let transport = AsyncStubTransport::new_error();

        let sent = mailer
            .deliver(&transport, &recipients(), "Low price alert!")
            .await
            .unwrap();

        assert_eq!(sent, 0);
    }
}
