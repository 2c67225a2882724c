use crate::domain::model::{Destination, FlightQuery, MessageChannel};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 目的地與訂閱者資料來源 (試算表後端)
#[async_trait]
pub trait DestinationStore: Send + Sync {
    async fn destinations(&self) -> Result<Vec<Destination>>;
    async fn update_iata_code(&self, destination: &Destination) -> Result<()>;
    async fn customer_emails(&self) -> Result<Vec<String>>;
}

#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// `Ok(None)` 表示查無此城市
    async fn city_code(&self, city: &str) -> Result<Option<String>>;

    /// 回傳原始的 offer 陣列，逐筆解析交給 `core::flight_data`
    async fn search_offers(&self, query: &FlightQuery) -> Result<Vec<serde_json::Value>>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn message_channels(&self) -> &[MessageChannel];

    /// 成功時回傳訊息 ID
    async fn send_message(&self, channel: MessageChannel, body: &str) -> Result<String>;

    /// 回傳成功寄出的封數
    async fn send_emails(&self, recipients: &[String], body: &str) -> Result<usize>;
}
