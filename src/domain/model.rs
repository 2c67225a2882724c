use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// `prices` 工作表的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub city: String,
    #[serde(
        rename = "iataCode",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub iata_code: Option<String>,
    #[serde(
        rename = "lowestPrice",
        default,
        deserialize_with = "price_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub lowest_price: Option<f64>,
}

impl Destination {
    pub fn has_code(&self) -> bool {
        self.iata_code.is_some()
    }

    /// 沒有設定門檻價格時，任何找到的價格都算優惠
    pub fn is_deal(&self, price: f64) -> bool {
        price < self.lowest_price.unwrap_or(f64::INFINITY)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// 試算表的數字欄位可能是數字、字串或空白
fn price_or_absent<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// 一筆往返航班中最關鍵的資訊
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightData {
    pub price: f64,
    pub origin_airport: String,
    pub destination_airport: String,
    pub out_date: String,
    pub return_date: String,
    pub stops: usize,
}

impl FlightData {
    pub fn is_direct(&self) -> bool {
        self.stops == 0
    }

    pub fn summary(&self, currency: &str) -> String {
        let kind = if self.is_direct() {
            "Direct".to_string()
        } else {
            format!("{} stop(s)", self.stops)
        };
        format!(
            "{} flight from {} to {}: {} ({} - {})",
            kind,
            self.origin_airport,
            self.destination_airport,
            format_price(self.price, currency),
            self.out_date,
            self.return_date
        )
    }
}

/// `GBP` -> `£55.5`，沒有符號的幣別用代碼前綴 (`CHF 55.5`)
pub fn format_price(price: f64, currency: &str) -> String {
    match currency {
        "GBP" => format!("£{}", price),
        "EUR" => format!("€{}", price),
        "USD" => format!("${}", price),
        other => format!("{} {}", other, price),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub non_stop: bool,
    pub adults: u32,
    pub currency: String,
    pub max_results: u32,
}

impl FlightQuery {
    pub fn with_connections(&self) -> Self {
        Self {
            non_stop: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub destination: Destination,
    pub flight: Option<FlightData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deal {
    pub destination: Destination,
    pub flight: FlightData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageChannel {
    Sms,
    Whatsapp,
}

impl fmt::Display for MessageChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageChannel::Sms => write!(f, "SMS"),
            MessageChannel::Whatsapp => write!(f, "WhatsApp"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub destinations: usize,
    pub codes_backfilled: usize,
    pub codes_written: usize,
    pub customer_emails: usize,
    pub destinations_searched: usize,
    pub flights_found: usize,
    pub deals: usize,
    pub messages_sent: usize,
    pub emails_sent: usize,
}
