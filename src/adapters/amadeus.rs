use crate::config::AmadeusConfig;
use crate::domain::model::FlightQuery;
use crate::domain::ports::FlightProvider;
use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const SERVICE: &str = "Amadeus";
const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const CITIES_PATH: &str = "/v1/reference-data/locations/cities";
const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const FLIGHT_OFFERS_DOCS: &str = "https://developers.amadeus.com/self-service/category/flights/api-doc/flight-offers-search/api-reference";

/// 提前一點換 token，避免請求途中過期
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct DataResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_expired(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN >= self.expires_at
    }
}

/// Amadeus Self-Service API (OAuth2 client credentials)
pub struct AmadeusClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    token: RwLock<AccessToken>,
}

impl AmadeusClient {
    /// 建立連線並立即取得 token；認證失敗直接回傳錯誤
    pub async fn connect(config: &AmadeusConfig) -> Result<Self> {
        let client = Client::new();
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let token =
            Self::authenticate(&client, &base_url, &config.api_key, &config.api_secret).await?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            token: RwLock::new(token),
        })
    }

    async fn authenticate(
        client: &Client,
        base_url: &str,
        api_key: &str,
        api_secret: &str,
    ) -> Result<AccessToken> {
        let response = client
            .post(format!("{}{}", base_url, TOKEN_PATH))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", api_key),
                ("client_secret", api_secret),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::AuthenticationError {
                message: format!("token endpoint returned HTTP {}: {}", status.as_u16(), body),
            });
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| TrackerError::AuthenticationError {
                    message: format!("malformed token response: {}", e),
                })?;

        tracing::info!(
            "🔑 Amadeus authentication successful. Token expires in {} seconds",
            token.expires_in
        );

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    async fn bearer_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if !token.is_expired() {
                return Ok(token.value.clone());
            }
        }

        let mut token = self.token.write().await;
        if token.is_expired() {
            tracing::debug!("Amadeus token expired, re-authenticating");
            *token =
                Self::authenticate(&self.client, &self.base_url, &self.api_key, &self.api_secret)
                    .await?;
        }
        Ok(token.value.clone())
    }

    async fn get_data(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<serde_json::Value>> {
        let token = self.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("GET {} {:?}", url, params);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::http_status(SERVICE, status, body));
        }

        let data: DataResponse = response.json().await?;
        Ok(data.data)
    }
}

#[async_trait]
impl FlightProvider for AmadeusClient {
    async fn city_code(&self, city: &str) -> Result<Option<String>> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(None);
        }

        let params = [
            ("keyword", city.to_string()),
            ("max", "2".to_string()),
            ("include", "AIRPORTS".to_string()),
        ];
        let data = self.get_data(CITIES_PATH, &params).await?;

        let code = data
            .first()
            .and_then(|location| location.get("iataCode"))
            .and_then(|code| code.as_str())
            .map(str::to_string);

        if code.is_none() {
            tracing::warn!("No airport data found for {}", city);
        }
        Ok(code)
    }

    async fn search_offers(&self, query: &FlightQuery) -> Result<Vec<serde_json::Value>> {
        if query.origin.trim().is_empty() || query.destination.trim().is_empty() {
            return Err(TrackerError::ProcessingError {
                message: "Missing origin or destination for flight search".to_string(),
            });
        }

        let params = [
            ("originLocationCode", query.origin.clone()),
            ("destinationLocationCode", query.destination.clone()),
            ("departureDate", query.departure_date.format("%Y-%m-%d").to_string()),
            ("returnDate", query.return_date.format("%Y-%m-%d").to_string()),
            ("adults", query.adults.to_string()),
            ("nonStop", query.non_stop.to_string()),
            ("currencyCode", query.currency.clone()),
            ("max", query.max_results.to_string()),
        ];

        match self.get_data(FLIGHT_OFFERS_PATH, &params).await {
            Ok(offers) => Ok(offers),
            Err(TrackerError::HttpStatus { service, status, body }) => {
                tracing::warn!("Flight search failed with status code: {}", status);
                tracing::debug!("Error details: {}", body);
                tracing::debug!("For more information, see: {}", FLIGHT_OFFERS_DOCS);
                Err(TrackerError::HttpStatus { service, status, body })
            }
            Err(e) => Err(e),
        }
    }
}
