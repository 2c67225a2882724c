use crate::config::TrackerConfig;
use crate::core::flight_data::find_cheapest_flight;
use crate::domain::model::{
    format_price, Deal, Destination, FlightData, FlightQuery, RunSummary, SearchResult,
};
use crate::domain::ports::{DestinationStore, FlightProvider, Notifier};
use crate::utils::error::{Result, TrackerError};
use chrono::{Local, NaiveDate, TimeDelta};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TrackerOptions {
    pub origin: String,
    pub currency: String,
    pub adults: u32,
    pub max_offers: u32,
    pub departure_offset_days: i64,
    pub return_window_days: i64,
    pub request_delay: Duration,
    pub dry_run: bool,
}

impl TrackerOptions {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            origin: config.search.origin.to_uppercase(),
            currency: config.search.currency.to_uppercase(),
            adults: config.search.adults,
            max_offers: config.search.max_offers,
            departure_offset_days: config.search.departure_offset_days,
            return_window_days: config.search.return_window_days,
            request_delay: config.request_delay(),
            dry_run: false,
        }
    }

    /// 出發日 (明天) 與回程日 (約六個月後)
    pub fn search_window(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let offset = |field: &str, days: i64| {
            TimeDelta::try_days(days)
                .and_then(|delta| today.checked_add_signed(delta))
                .ok_or_else(|| TrackerError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: days.to_string(),
                    reason: format!("Date out of range when added to {}", today),
                })
        };

        Ok((
            offset("search.departure_offset_days", self.departure_offset_days)?,
            offset("search.return_window_days", self.return_window_days)?,
        ))
    }
}

pub fn format_deal_message(deal: &Deal, currency: &str) -> String {
    let flight = &deal.flight;
    let price = format_price(flight.price, currency);

    if flight.is_direct() {
        format!(
            "Low price alert! Only {} to fly direct from {} to {}, on {} until {}.",
            price,
            flight.origin_airport,
            flight.destination_airport,
            flight.out_date,
            flight.return_date
        )
    } else {
        format!(
            "Low price alert! Only {} to fly from {} to {}, with {} stop(s) departing on {} and returning on {}.",
            price,
            flight.origin_airport,
            flight.destination_airport,
            flight.stops,
            flight.out_date,
            flight.return_date
        )
    }
}

/// 價格嚴格低於目的地門檻的航班才算優惠
pub fn check_for_deals(results: &[SearchResult], currency: &str) -> Vec<Deal> {
    results
        .iter()
        .filter_map(|result| {
            let flight = result.flight.as_ref()?;
            if !result.destination.is_deal(flight.price) {
                return None;
            }
            match result.destination.lowest_price {
                Some(threshold) => tracing::info!(
                    "💰 Deal found: {} for {} (below {})",
                    result.destination.city,
                    format_price(flight.price, currency),
                    format_price(threshold, currency)
                ),
                None => tracing::info!(
                    "💰 Deal found: {} for {} (no target price set)",
                    result.destination.city,
                    format_price(flight.price, currency)
                ),
            }
            Some(Deal {
                destination: result.destination.clone(),
                flight: flight.clone(),
            })
        })
        .collect()
}

/// 找目的地 → 補機場代碼 → 搜尋航班 → 比價 → 通知
pub struct FlightTracker<D: DestinationStore, F: FlightProvider, N: Notifier> {
    store: D,
    flights: F,
    notifier: N,
    options: TrackerOptions,
}

impl<D: DestinationStore, F: FlightProvider, N: Notifier> FlightTracker<D, F, N> {
    pub fn new(store: D, flights: F, notifier: N, options: TrackerOptions) -> Self {
        Self {
            store,
            flights,
            notifier,
            options,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.run_on(Local::now().date_naive()).await
    }

    pub async fn run_on(&self, today: NaiveDate) -> Result<RunSummary> {
        let window = self.options.search_window(today)?;
        let mut summary = RunSummary::default();

        let mut destinations = match self.store.destinations().await {
            Ok(destinations) => destinations,
            Err(e) => {
                tracing::error!("Error retrieving destination data: {}", e);
                Vec::new()
            }
        };
        summary.destinations = destinations.len();
        tracing::info!("📋 Found {} destinations to check", destinations.len());

        let (backfilled, written) = self.update_destination_codes(&mut destinations).await;
        summary.codes_backfilled = backfilled;
        summary.codes_written = written;

        let emails = match self.store.customer_emails().await {
            Ok(emails) => emails,
            Err(e) => {
                tracing::error!("Error retrieving customer data: {}", e);
                Vec::new()
            }
        };
        summary.customer_emails = emails.len();
        tracing::info!("👥 Found {} customer email addresses", emails.len());

        let results = self.search_for_flights(&destinations, window).await;
        summary.destinations_searched = results.len();
        summary.flights_found = results.iter().filter(|r| r.flight.is_some()).count();

        let deals = check_for_deals(&results, &self.options.currency);
        summary.deals = deals.len();

        if deals.is_empty() {
            tracing::info!("No flight deals found today");
        } else {
            tracing::info!("🎉 Found {} flight deals!", deals.len());
            let (messages, emails_sent) = self.send_notifications(&deals, &emails).await;
            summary.messages_sent = messages;
            summary.emails_sent = emails_sent;
        }

        Ok(summary)
    }

    /// 回傳 (查到的代碼數, 成功寫回試算表的數量)
    pub async fn update_destination_codes(&self, destinations: &mut [Destination]) -> (usize, usize) {
        tracing::info!("Updating destination codes...");

        let mut resolved = Vec::new();
        for destination in destinations.iter_mut().filter(|d| !d.has_code()) {
            tracing::info!("Getting IATA code for {}...", destination.city);

            match self.flights.city_code(&destination.city).await {
                Ok(Some(code)) => {
                    tracing::debug!("{} -> {}", destination.city, code);
                    destination.iata_code = Some(code);
                    resolved.push(destination.clone());
                }
                Ok(None) => tracing::warn!("No IATA code found for {}", destination.city),
                Err(e) => tracing::warn!(
                    "Error getting destination code for {}: {}",
                    destination.city,
                    e
                ),
            }
            self.pause().await;
        }

        let mut written = 0;
        for destination in &resolved {
            if destination.id.is_none() {
                tracing::warn!(
                    "{} has no row id, skipping IATA code write-back",
                    destination.city
                );
                continue;
            }
            match self.store.update_iata_code(destination).await {
                Ok(()) => written += 1,
                Err(e) => tracing::warn!("Error updating destination {}: {}", destination.city, e),
            }
        }
        if !resolved.is_empty() {
            tracing::info!("Updated {} destination(s) with IATA codes", written);
        }

        (resolved.len(), written)
    }

    /// 先找直飛，沒有直飛才放寬到轉機
    pub async fn search_for_flights(
        &self,
        destinations: &[Destination],
        (departure_date, return_date): (NaiveDate, NaiveDate),
    ) -> Vec<SearchResult> {
        tracing::info!("✈️ Searching flights from {}...", self.options.origin);

        let mut results = Vec::new();
        for destination in destinations {
            let Some(code) = destination.iata_code.as_deref() else {
                tracing::warn!(
                    "No valid IATA code for {}, skipping flight search",
                    destination.city
                );
                continue;
            };

            let query = FlightQuery {
                origin: self.options.origin.clone(),
                destination: code.to_string(),
                departure_date,
                return_date,
                non_stop: true,
                adults: self.options.adults,
                currency: self.options.currency.clone(),
                max_results: self.options.max_offers,
            };

            tracing::info!("Searching direct flights to {}...", destination.city);
            let mut flight = self.cheapest_for(&query).await;

            if flight.is_none() {
                tracing::info!(
                    "No direct flights to {}, trying with connections...",
                    destination.city
                );
                flight = self.cheapest_for(&query.with_connections()).await;
            }

            match &flight {
                Some(flight) => tracing::info!(
                    "{}: {}",
                    destination.city,
                    flight.summary(&self.options.currency)
                ),
                None => tracing::info!("{}: no flights found", destination.city),
            }

            results.push(SearchResult {
                destination: destination.clone(),
                flight,
            });
            self.pause().await;
        }

        results
    }

    async fn cheapest_for(&self, query: &FlightQuery) -> Option<FlightData> {
        match self.flights.search_offers(query).await {
            Ok(offers) => find_cheapest_flight(&offers),
            Err(e) => {
                tracing::warn!(
                    "Flight search {} -> {} failed: {}",
                    query.origin,
                    query.destination,
                    e
                );
                None
            }
        }
    }

    /// 回傳 (送出的簡訊/WhatsApp 數, 寄出的 email 數)
    pub async fn send_notifications(&self, deals: &[Deal], emails: &[String]) -> (usize, usize) {
        tracing::info!("Sending notifications for {} deals...", deals.len());

        let mut messages_sent = 0;
        let mut emails_sent = 0;
        for deal in deals {
            let message = format_deal_message(deal, &self.options.currency);

            if self.options.dry_run {
                tracing::info!("🔍 [dry run] {}", message);
                continue;
            }

            for channel in self.notifier.message_channels() {
                match self.notifier.send_message(*channel, &message).await {
                    Ok(_) => messages_sent += 1,
                    Err(e) => tracing::warn!("Failed to send {} message: {}", channel, e),
                }
            }

            if !emails.is_empty() {
                match self.notifier.send_emails(emails, &message).await {
                    Ok(sent) => {
                        emails_sent += sent;
                        tracing::info!("Notifications sent for {} deal", deal.destination.city);
                    }
                    Err(e) => tracing::warn!("Email service error: {}", e),
                }
            }
        }

        (messages_sent, emails_sent)
    }

    async fn pause(&self) {
        if !self.options.request_delay.is_zero() {
            tokio::time::sleep(self.options.request_delay).await;
        }
    }
}
