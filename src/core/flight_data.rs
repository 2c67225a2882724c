use crate::domain::model::FlightData;
use crate::utils::error::{Result, TrackerError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Offer {
    price: OfferPrice,
    itineraries: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
struct OfferPrice {
    #[serde(rename = "grandTotal")]
    grand_total: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    departure: Endpoint,
    arrival: Endpoint,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    #[serde(rename = "iataCode")]
    iata_code: String,
    at: Option<String>,
}

fn malformed(message: impl Into<String>) -> TrackerError {
    TrackerError::ProcessingError {
        message: message.into(),
    }
}

fn parse_price(value: &serde_json::Value) -> Result<f64> {
    let price = match value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    };
    price
        .filter(|p| p.is_finite())
        .ok_or_else(|| malformed(format!("invalid grandTotal: {}", value)))
}

/// `2026-10-17T06:30:00` -> `2026-10-17`
fn date_part(endpoint: &Endpoint) -> Result<String> {
    let at = endpoint
        .at
        .as_deref()
        .ok_or_else(|| malformed(format!("departure from {} has no time", endpoint.iata_code)))?;
    Ok(at.split('T').next().unwrap_or(at).to_string())
}

/// 從單筆 flight offer 取出價格、起訖機場、日期與轉機次數
pub fn extract_flight_details(offer: &serde_json::Value) -> Result<FlightData> {
    let offer: Offer = serde_json::from_value(offer.clone())?;
    let price = parse_price(&offer.price.grand_total)?;

    let outbound = offer
        .itineraries
        .first()
        .ok_or_else(|| malformed("offer has no itineraries"))?;
    let first_out = outbound
        .segments
        .first()
        .ok_or_else(|| malformed("outbound itinerary has no segments"))?;
    let last_out = outbound
        .segments
        .last()
        .ok_or_else(|| malformed("outbound itinerary has no segments"))?;

    let first_return = offer
        .itineraries
        .get(1)
        .and_then(|itinerary| itinerary.segments.first())
        .ok_or_else(|| malformed("offer has no return itinerary"))?;

    Ok(FlightData {
        price,
        origin_airport: first_out.departure.iata_code.clone(),
        destination_airport: last_out.arrival.iata_code.clone(),
        out_date: date_part(&first_out.departure)?,
        return_date: date_part(&first_return.departure)?,
        stops: outbound.segments.len() - 1,
    })
}

/// 找出最便宜的航班；壞掉的 offer 會被略過，同價時保留先出現的
pub fn find_cheapest_flight(offers: &[serde_json::Value]) -> Option<FlightData> {
    if offers.is_empty() {
        tracing::debug!("No valid flight data available");
        return None;
    }

    let mut cheapest: Option<FlightData> = None;
    for offer in offers {
        match extract_flight_details(offer) {
            Ok(flight) => {
                if cheapest.as_ref().map_or(true, |c| flight.price < c.price) {
                    tracing::debug!(
                        "Found cheaper flight to {}: {}",
                        flight.destination_airport,
                        flight.price
                    );
                    cheapest = Some(flight);
                }
            }
            Err(e) => tracing::warn!("Error processing flight data: {}", e),
        }
    }

    cheapest
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segment(from: &str, to: &str, at: &str) -> serde_json::Value {
        json!({
            "departure": {"iataCode": from, "at": at},
            "arrival": {"iataCode": to, "at": at}
        })
    }

    fn offer(price: &str, outbound: Vec<serde_json::Value>) -> serde_json::Value {
        json!({
            "type": "flight-offer",
            "price": {"currency": "GBP", "total": price, "grandTotal": price},
            "itineraries": [
                {"duration": "PT1H20M", "segments": outbound},
                {"duration": "PT1H25M", "segments": [segment("CDG", "LHR", "2027-04-14T19:10:00")]}
            ]
        })
    }

    #[test]
    fn test_extract_direct_flight() {
        let data = offer("81.20", vec![segment("LHR", "CDG", "2026-10-17T06:30:00")]);
        let flight = extract_flight_details(&data).unwrap();

        assert_eq!(flight.price, 81.2);
        assert_eq!(flight.origin_airport, "LHR");
        assert_eq!(flight.destination_airport, "CDG");
        assert_eq!(flight.out_date, "2026-10-17");
        assert_eq!(flight.return_date, "2027-04-14");
        assert_eq!(flight.stops, 0);
    }

    #[test]
    fn test_extract_flight_with_stops() {
        let data = offer(
            "412.00",
            vec![
                segment("LHR", "DOH", "2026-10-18T08:00:00"),
                segment("DOH", "BKK", "2026-10-18T20:00:00"),
            ],
        );
        let flight = extract_flight_details(&data).unwrap();

        assert_eq!(flight.origin_airport, "LHR");
        assert_eq!(flight.destination_airport, "BKK");
        assert_eq!(flight.stops, 1);
    }

    #[test]
    fn test_extract_numeric_price() {
        let mut data = offer("0", vec![segment("LHR", "CDG", "2026-10-17T06:30:00")]);
        data["price"]["grandTotal"] = json!(99.5);

        assert_eq!(extract_flight_details(&data).unwrap().price, 99.5);
    }

    #[test]
    fn test_extract_one_way_offer_is_malformed() {
        let data = json!({
            "price": {"grandTotal": "50.00"},
            "itineraries": [{"segments": [segment("LHR", "CDG", "2026-10-17T06:30:00")]}]
        });
        assert!(extract_flight_details(&data).is_err());
    }

    #[test]
    fn test_find_cheapest_flight() {
        let offers = vec![
            offer("120.00", vec![segment("LHR", "CDG", "2026-10-17T06:30:00")]),
            offer("75.40", vec![segment("LGW", "ORY", "2026-10-20T09:00:00")]),
            offer("99.99", vec![segment("STN", "BVA", "2026-10-21T11:00:00")]),
        ];

        let cheapest = find_cheapest_flight(&offers).unwrap();
        assert_eq!(cheapest.price, 75.4);
        assert_eq!(cheapest.origin_airport, "LGW");
        assert_eq!(cheapest.out_date, "2026-10-20");
    }

    #[test]
    fn test_find_cheapest_keeps_first_on_tie() {
        let offers = vec![
            offer("60.00", vec![segment("LHR", "CDG", "2026-10-17T06:30:00")]),
            offer("60.00", vec![segment("LGW", "ORY", "2026-10-20T09:00:00")]),
        ];

        assert_eq!(find_cheapest_flight(&offers).unwrap().origin_airport, "LHR");
    }

    #[test]
    fn test_find_cheapest_skips_malformed_offers() {
        let offers = vec![
            json!({"price": {"grandTotal": "10.00"}, "itineraries": []}),
            json!({"price": {"grandTotal": "not-a-number"}, "itineraries": []}),
            offer("88.00", vec![segment("LHR", "CDG", "2026-10-17T06:30:00")]),
        ];

        assert_eq!(find_cheapest_flight(&offers).unwrap().price, 88.0);
    }

    #[test]
    fn test_find_cheapest_empty_or_all_malformed() {
        assert!(find_cheapest_flight(&[]).is_none());
        assert!(find_cheapest_flight(&[json!({"id": "1"})]).is_none());
    }
}
