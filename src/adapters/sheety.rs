use crate::config::SheetyConfig;
use crate::domain::model::Destination;
use crate::domain::ports::DestinationStore;
use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "Sheety";

#[derive(Debug, Deserialize)]
struct PricesResponse {
    #[serde(default)]
    prices: Vec<Destination>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Sheety 試算表 API：目的地 (`prices`) 與訂閱者 (`users`)
pub struct SheetyClient {
    client: Client,
    prices_endpoint: String,
    users_endpoint: String,
    username: String,
    password: String,
    email_field: String,
}

impl SheetyClient {
    pub fn new(config: &SheetyConfig) -> Self {
        Self {
            client: Client::new(),
            prices_endpoint: config.prices_endpoint.trim_end_matches('/').to_string(),
            users_endpoint: config.users_endpoint.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            email_field: config.email_field.clone(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::http_status(SERVICE, status, body));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DestinationStore for SheetyClient {
    async fn destinations(&self) -> Result<Vec<Destination>> {
        let data: PricesResponse = self.get_json(&self.prices_endpoint).await?;
        Ok(data.prices)
    }

    async fn update_iata_code(&self, destination: &Destination) -> Result<()> {
        let code = destination
            .iata_code
            .as_deref()
            .ok_or_else(|| TrackerError::ProcessingError {
                message: format!("{} has no IATA code to write back", destination.city),
            })?;

        let id = destination.id.ok_or_else(|| TrackerError::ProcessingError {
            message: format!("{} has no row id to update", destination.city),
        })?;

        let url = format!("{}/{}", self.prices_endpoint, id);
        let body = serde_json::json!({ "price": { "iataCode": code } });

        tracing::debug!("PUT {} {}", url, body);
        let response = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::http_status(SERVICE, status, body));
        }

        Ok(())
    }

    async fn customer_emails(&self) -> Result<Vec<String>> {
        let data: UsersResponse = self.get_json(&self.users_endpoint).await?;

        let emails = data
            .users
            .iter()
            .filter_map(|row| row.get(&self.email_field))
            .filter_map(|value| value.as_str())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string)
            .collect();

        Ok(emails)
    }
}
