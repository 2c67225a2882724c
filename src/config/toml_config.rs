use crate::domain::model::MessageChannel;
use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::{
    validate_alpha_code, validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_AMADEUS_URL: &str = "https://test.api.amadeus.com";
pub const DEFAULT_TWILIO_URL: &str = "https://api.twilio.com";
pub const DEFAULT_EMAIL_FIELD: &str = "whatIsYourEmail?";
pub const DEFAULT_EMAIL_SUBJECT: &str = "New Low Price Flight!";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub search: SearchConfig,
    pub sheety: SheetyConfig,
    pub amadeus: AmadeusConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub origin: String,
    pub currency: String,
    pub adults: u32,
    pub max_offers: u32,
    pub departure_offset_days: i64,
    pub return_window_days: i64,
    pub request_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            origin: "LON".to_string(),
            currency: "GBP".to_string(),
            adults: 1,
            max_offers: 10,
            departure_offset_days: 1,
            return_window_days: 6 * 30,
            request_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetyConfig {
    pub prices_endpoint: String,
    pub users_endpoint: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_email_field")]
    pub email_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmadeusConfig {
    #[serde(default = "default_amadeus_url")]
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_channels")]
    pub channels: Vec<MessageChannel>,
    pub twilio: Option<TwilioConfig>,
    pub email: Option<EmailConfig>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            twilio: None,
            email: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwilioConfig {
    #[serde(default = "default_twilio_url")]
    pub base_url: String,
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub virtual_number: String,
    #[serde(default)]
    pub verified_number: String,
    #[serde(default)]
    pub whatsapp_number: String,
}

impl TwilioConfig {
    /// 回傳尚未設定的欄位名稱
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("account_sid", &self.account_sid),
            ("auth_token", &self.auth_token),
            ("virtual_number", &self.virtual_number),
            ("verified_number", &self.verified_number),
            ("whatsapp_number", &self.whatsapp_number),
        ]
        .into_iter()
        .filter(|(_, value)| is_unset(value))
        .map(|(name, _)| name)
        .collect()
    }

    /// 只檢查指定管道真正會用到的欄位
    pub fn missing_fields_for(&self, channels: &[MessageChannel]) -> Vec<&'static str> {
        self.missing_fields()
            .into_iter()
            .filter(|field| match *field {
                "virtual_number" => channels.contains(&MessageChannel::Sms),
                "whatsapp_number" => channels.contains(&MessageChannel::Whatsapp),
                _ => true,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub smtp_address: String,
    pub smtp_port: Option<u16>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_email_subject")]
    pub subject: String,
}

impl EmailConfig {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("smtp_address", &self.smtp_address),
            ("address", &self.address),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| is_unset(value))
        .map(|(name, _)| name)
        .collect()
    }
}

/// 空字串或未被替換的 `${VAR}` 都視為未設定
pub(crate) fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || (value.starts_with("${") && value.ends_with('}'))
}

fn default_email_field() -> String {
    DEFAULT_EMAIL_FIELD.to_string()
}

fn default_amadeus_url() -> String {
    DEFAULT_AMADEUS_URL.to_string()
}

fn default_twilio_url() -> String {
    DEFAULT_TWILIO_URL.to_string()
}

fn default_email_subject() -> String {
    DEFAULT_EMAIL_SUBJECT.to_string()
}

fn default_channels() -> Vec<MessageChannel> {
    vec![MessageChannel::Whatsapp]
}

impl TrackerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrackerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TrackerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AMADEUS_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TrackerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search.request_delay_ms)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_alpha_code("search.origin", &self.search.origin)?;
        validate_alpha_code("search.currency", &self.search.currency)?;
        validate_range("search.adults", self.search.adults, 1, 9)?;
        validate_range("search.max_offers", self.search.max_offers, 1, 250)?;
        validate_range("search.departure_offset_days", self.search.departure_offset_days, 0, 365)?;
        validate_range("search.return_window_days", self.search.return_window_days, 1, 365)?;
        if self.search.return_window_days <= self.search.departure_offset_days {
            return Err(TrackerError::InvalidConfigValueError {
                field: "search.return_window_days".to_string(),
                value: self.search.return_window_days.to_string(),
                reason: "Return date must come after the departure date".to_string(),
            });
        }

        validate_url("sheety.prices_endpoint", &self.sheety.prices_endpoint)?;
        validate_url("sheety.users_endpoint", &self.sheety.users_endpoint)?;
        validate_set("sheety.username", &self.sheety.username)?;
        validate_set("sheety.password", &self.sheety.password)?;
        validate_non_empty_string("sheety.email_field", &self.sheety.email_field)?;

        validate_url("amadeus.base_url", &self.amadeus.base_url)?;
        validate_set("amadeus.api_key", &self.amadeus.api_key)?;
        validate_set("amadeus.api_secret", &self.amadeus.api_secret)?;

        // 通知設定不完整只會停用該管道，不算錯誤
        if let Some(twilio) = &self.notify.twilio {
            validate_url("notify.twilio.base_url", &twilio.base_url)?;
        }

        Ok(())
    }
}

fn validate_set(field_name: &str, value: &str) -> Result<()> {
    if is_unset(value) {
        return Err(TrackerError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

impl Validate for TrackerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
