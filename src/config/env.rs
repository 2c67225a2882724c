use crate::config::toml_config::{
    AmadeusConfig, EmailConfig, NotifyConfig, SearchConfig, SheetyConfig, TrackerConfig,
    TwilioConfig, DEFAULT_AMADEUS_URL, DEFAULT_EMAIL_FIELD, DEFAULT_EMAIL_SUBJECT,
    DEFAULT_TWILIO_URL,
};

/// `smtp.gmail.com:587` -> (`smtp.gmail.com`, `Some(587)`)；沒有合法埠號時整串當主機名
fn split_smtp_address(raw: &str) -> (String, Option<u16>) {
    let raw = raw.trim();
    match raw.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => match port.parse::<u16>() {
            Ok(port) => (host.to_string(), Some(port)),
            Err(_) => (raw.to_string(), None),
        },
        _ => (raw.to_string(), None),
    }
}

impl TrackerConfig {
    /// 沒有 TOML 檔時，直接從環境變數組出配置
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).unwrap_or_default();
        let (smtp_address, smtp_port) = split_smtp_address(&var("EMAIL_PROVIDER_SMTP_ADDRESS"));

        TrackerConfig {
            search: SearchConfig::default(),
            sheety: SheetyConfig {
                prices_endpoint: var("SHEETY_PRICES_ENDPOINT"),
                users_endpoint: var("SHEETY_USERS_ENDPOINT"),
                username: var("SHEETY_USERNAME"),
                password: var("SHEETY_PASSWORD"),
                email_field: DEFAULT_EMAIL_FIELD.to_string(),
            },
            amadeus: AmadeusConfig {
                base_url: DEFAULT_AMADEUS_URL.to_string(),
                api_key: var("AMADEUS_API_KEY"),
                api_secret: var("AMADEUS_SECRET"),
            },
            notify: NotifyConfig {
                twilio: Some(TwilioConfig {
                    base_url: DEFAULT_TWILIO_URL.to_string(),
                    account_sid: var("TWILIO_SID"),
                    auth_token: var("TWILIO_AUTH_TOKEN"),
                    virtual_number: var("TWILIO_VIRTUAL_NUMBER"),
                    verified_number: var("TWILIO_VERIFIED_NUMBER"),
                    whatsapp_number: var("TWILIO_WHATSAPP_NUMBER"),
                }),
                email: Some(EmailConfig {
                    smtp_address,
                    smtp_port,
                    address: var("MY_EMAIL"),
                    password: var("MY_EMAIL_PASSWORD"),
                    subject: DEFAULT_EMAIL_SUBJECT.to_string(),
                }),
                ..NotifyConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TrackerError;
    use crate::utils::validation::Validate;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SHEETY_USERNAME", "user"),
            ("SHEETY_PASSWORD", "pass"),
            ("SHEETY_PRICES_ENDPOINT", "https://api.sheety.co/abc/flightDeals/prices"),
            ("SHEETY_USERS_ENDPOINT", "https://api.sheety.co/abc/flightDeals/users"),
            ("AMADEUS_API_KEY", "key"),
            ("AMADEUS_SECRET", "secret"),
            ("TWILIO_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "token"),
        ])
    }

    #[test]
    fn test_from_lookup_reads_variables() {
        let env = full_env();
        let config = TrackerConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.sheety.username, "user");
        assert_eq!(config.amadeus.api_secret, "secret");
        assert!(config.validate().is_ok());

        let twilio = config.notify.twilio.unwrap();
        assert_eq!(twilio.account_sid, "AC123");
        assert_eq!(
            twilio.missing_fields(),
            vec!["virtual_number", "verified_number", "whatsapp_number"]
        );
        assert_eq!(
            config.notify.email.unwrap().missing_fields(),
            vec!["smtp_address", "address", "password"]
        );
    }

    #[test]
    fn test_from_lookup_missing_sheety_credentials() {
        let mut env = full_env();
        env.remove("SHEETY_PASSWORD");
        let config = TrackerConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()));

        assert!(matches!(
            config.validate(),
            Err(TrackerError::MissingConfigError { field }) if field == "sheety.password"
        ));
    }

    #[test]
    fn test_smtp_address_with_port_is_split() {
        let mut env = full_env();
        env.insert("EMAIL_PROVIDER_SMTP_ADDRESS", "smtp.gmail.com:587");
        let config = TrackerConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()));

        let email = config.notify.email.unwrap();
        assert_eq!(email.smtp_address, "smtp.gmail.com");
        assert_eq!(email.smtp_port, Some(587));
    }

    #[test]
    fn test_split_smtp_address() {
        assert_eq!(
            split_smtp_address("smtp.mail.yahoo.com"),
            ("smtp.mail.yahoo.com".to_string(), None)
        );
        assert_eq!(
            split_smtp_address(" smtp.office365.com:25 "),
            ("smtp.office365.com".to_string(), Some(25))
        );
        assert_eq!(
            split_smtp_address("smtp.example.com:smtp"),
            ("smtp.example.com:smtp".to_string(), None)
        );
        assert_eq!(split_smtp_address(""), (String::new(), None));
    }
}
