//! [`FlightDataProvider`] backed by the Amadeus self-service REST API.

use crate::config::{ConfigError, ProviderConfig};
use crate::provider::{FlightDataProvider, ProviderError};
use crate::record::{FlightRecord, RecordSource, UNKNOWN};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use flightdesk_parser::{AirportCode, FlightNumber};
use log::{debug, info, warn};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const SCHEDULE_PATH: &str = "/v2/schedule/flights";
const OFFERS_PATH: &str = "/v2/shopping/flight-offers";

const TOKEN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 1799;
/// Tokens are dropped this long before the provider would expire them.
const TOKEN_SAFETY_MARGIN_SECS: u64 = 300;
const MAX_OFFERS: usize = 5;
const ERROR_BODY_LIMIT: usize = 500;

static ISO_DURATION_RE: OnceLock<Regex> = OnceLock::new();

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct AmadeusProvider {
    client: reqwest::blocking::Client,
    config: ProviderConfig,
    token: Mutex<Option<CachedToken>>,
}

impl AmadeusProvider {
    /// Fails immediately on missing credentials; a constructed provider is always usable.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ConfigError::HttpClient)?;

        info!(
            "Flight-data provider ready — environment={} base_url={}",
            config.environment,
            config.environment.base_url()
        );
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.environment.base_url(), path)
    }

    fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self
            .token
            .lock()
            .map_err(|_| ProviderError::Other("token cache lock poisoned".to_string()))?;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
            debug!("Access token expired; requesting a new one");
        }

        let response = self
            .client
            .post(self.url(TOKEN_PATH))
            .timeout(Duration::from_secs(TOKEN_TIMEOUT_SECS))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.api_key.as_str()),
                ("client_secret", self.config.api_secret.as_str()),
            ])
            .send()?;
        let grant: TokenResponse = decode(check_status(response)?)?;

        let lifetime = grant
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            .saturating_sub(TOKEN_SAFETY_MARGIN_SECS);
        debug!("Access token acquired — reusable_for_secs={}", lifetime);

        *cached = Some(CachedToken {
            value: grant.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(grant.access_token)
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let token = self.access_token()?;
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .query(params)
            .send()?;
        decode(check_status(response)?)
    }
}

impl FlightDataProvider for AmadeusProvider {
    fn lookup_by_number(
        &self,
        flight_number: &FlightNumber,
        date: NaiveDate,
    ) -> Result<Option<FlightRecord>, ProviderError> {
        let params = [
            ("carrierCode", flight_number.carrier_code().to_string()),
            ("flightNumber", flight_number.number().to_string()),
            ("scheduledDepartureDate", date.format("%Y-%m-%d").to_string()),
        ];
        let body: DataEnvelope<DatedFlight> = self.get(SCHEDULE_PATH, &params)?;

        let Some(flight) = body.data.first() else {
            debug!(
                "Schedule lookup returned no dated flight — flight={} date={}",
                flight_number, date
            );
            return Ok(None);
        };
        let record = map_dated_flight(flight, flight_number);
        if record.is_none() {
            warn!(
                "Dated flight has fewer than two flight points — flight={}",
                flight_number
            );
        }
        Ok(record)
    }

    fn search_offers(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        date: NaiveDate,
        adults: u32,
        return_date: Option<NaiveDate>,
    ) -> Result<Vec<FlightRecord>, ProviderError> {
        let mut params = vec![
            ("originLocationCode", origin.to_string()),
            ("destinationLocationCode", destination.to_string()),
            ("departureDate", date.format("%Y-%m-%d").to_string()),
            ("adults", adults.to_string()),
            ("nonStop", "false".to_string()),
            ("max", MAX_OFFERS.to_string()),
        ];
        if let Some(back) = return_date {
            params.push(("returnDate", back.format("%Y-%m-%d").to_string()));
        }

        let body: DataEnvelope<FlightOffer> = self.get(OFFERS_PATH, &params)?;
        let offers: Vec<FlightRecord> = body
            .data
            .iter()
            .filter_map(map_offer)
            .take(MAX_OFFERS)
            .collect();
        debug!(
            "Offer search mapped — returned={} usable={}",
            body.data.len(),
            offers.len()
        );
        Ok(offers)
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: String = response
        .text()
        .unwrap_or_default()
        .chars()
        .take(ERROR_BODY_LIMIT)
        .collect();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ProviderError::Auth(body));
    }
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

fn decode<T: DeserializeOwned>(response: reqwest::blocking::Response) -> Result<T, ProviderError> {
    let text = response.text()?;
    serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))
}

// --- Response shapes (only the fields we read) ---

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DatedFlight {
    flight_points: Vec<FlightPoint>,
    segments: Vec<ScheduleSegment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FlightPoint {
    iata_code: Option<String>,
    departure: Option<PointEvent>,
    arrival: Option<PointEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PointEvent {
    timings: Vec<Timing>,
    terminal: Option<Terminal>,
}

impl PointEvent {
    fn stamp(&self) -> Option<&str> {
        self.timings
            .first()
            .and_then(|t| t.value.as_deref())
            .filter(|v| !v.is_empty())
    }

    fn terminal(&self) -> Option<String> {
        self.terminal.as_ref().and_then(|t| t.code.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Timing {
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Terminal {
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ScheduleSegment {
    partnership: Option<Partnership>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Partnership {
    operating_flight: Option<OperatingFlight>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OperatingFlight {
    equipment: Option<Equipment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Equipment {
    aircraft_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlightOffer {
    itineraries: Vec<Itinerary>,
    price: Option<Price>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Itinerary {
    duration: Option<String>,
    segments: Vec<OfferSegment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OfferSegment {
    departure: Option<Endpoint>,
    arrival: Option<Endpoint>,
    carrier_code: Option<String>,
    number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Endpoint {
    iata_code: Option<String>,
    at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Price {
    total: Option<String>,
    currency: Option<String>,
}

// --- Mapping ---

fn map_dated_flight(flight: &DatedFlight, flight_number: &FlightNumber) -> Option<FlightRecord> {
    let (first, last) = match flight.flight_points.as_slice() {
        [first, .., last] => (first, last),
        _ => return None,
    };

    let departure_stamp = first.departure.as_ref().and_then(PointEvent::stamp);
    let arrival_stamp = last.arrival.as_ref().and_then(PointEvent::stamp);
    let aircraft_type = flight
        .segments
        .first()
        .and_then(|s| s.partnership.as_ref())
        .and_then(|p| p.operating_flight.as_ref())
        .and_then(|o| o.equipment.as_ref())
        .and_then(|e| e.aircraft_type.clone());

    Some(FlightRecord {
        flight_number: flight_number.to_string(),
        carrier_code: Some(flight_number.carrier_code().to_string()),
        departure_airport: airport_or_unknown(&first.iata_code),
        arrival_airport: airport_or_unknown(&last.iata_code),
        departure_time: departure_stamp.map(clock_of),
        arrival_time: arrival_stamp.map(clock_of),
        departure_datetime: departure_stamp.map(str::to_string),
        arrival_datetime: arrival_stamp.map(str::to_string),
        duration: departure_stamp
            .zip(arrival_stamp)
            .and_then(|(dep, arr)| elapsed(dep, arr)),
        stops: Some(flight.flight_points.len().saturating_sub(2) as u32),
        aircraft_type,
        terminal_departure: first.departure.as_ref().and_then(PointEvent::terminal),
        terminal_arrival: last.arrival.as_ref().and_then(PointEvent::terminal),
        ..FlightRecord::new(RecordSource::FlightNumberLookup)
    })
}

fn map_offer(offer: &FlightOffer) -> Option<FlightRecord> {
    let itinerary = offer.itineraries.first()?;
    let first = itinerary.segments.first()?;
    let last = itinerary.segments.last()?;

    let departure = first.departure.as_ref();
    let arrival = last.arrival.as_ref();
    let departure_stamp = departure.and_then(|e| e.at.as_deref()).filter(|s| !s.is_empty());
    let arrival_stamp = arrival.and_then(|e| e.at.as_deref()).filter(|s| !s.is_empty());

    let flight_number = match (&first.carrier_code, &first.number) {
        (Some(carrier), Some(number)) => format!("{}{}", carrier, number),
        _ => UNKNOWN.to_string(),
    };

    Some(FlightRecord {
        flight_number,
        carrier_code: first.carrier_code.clone(),
        departure_airport: airport_or_unknown(&departure.and_then(|e| e.iata_code.clone())),
        arrival_airport: airport_or_unknown(&arrival.and_then(|e| e.iata_code.clone())),
        departure_time: departure_stamp.map(clock_of),
        arrival_time: arrival_stamp.map(clock_of),
        departure_datetime: departure_stamp.map(str::to_string),
        arrival_datetime: arrival_stamp.map(str::to_string),
        duration: itinerary
            .duration
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(format_iso_duration),
        stops: Some(itinerary.segments.len().saturating_sub(1) as u32),
        price: offer.price.as_ref().and_then(|p| p.total.clone()),
        currency: Some(
            offer
                .price
                .as_ref()
                .and_then(|p| p.currency.clone())
                .unwrap_or_else(|| "EUR".to_string()),
        ),
        ..FlightRecord::new(RecordSource::OriginDestinationSearch)
    })
}

fn airport_or_unknown(code: &Option<String>) -> String {
    code.clone().unwrap_or_else(|| UNKNOWN.to_string())
}

/// Provider timestamps come with or without seconds and offset.
fn parse_stamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp);
    }
    if let Ok(stamp) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Some(stamp);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// `HH:MM` in the timestamp's own offset, or the raw text when unreadable.
fn clock_of(raw: &str) -> String {
    parse_stamp(raw)
        .map(|stamp| stamp.format("%H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn elapsed(departure: &str, arrival: &str) -> Option<String> {
    let minutes = (parse_stamp(arrival)? - parse_stamp(departure)?).num_minutes();
    if minutes < 0 {
        return None;
    }
    Some(format!("{}h{:02}", minutes / 60, minutes % 60))
}

/// `PT8H30M` → `8h30`. Anything else is returned unchanged.
fn format_iso_duration(raw: &str) -> String {
    let re =
        ISO_DURATION_RE.get_or_init(|| Regex::new(r"^PT(?:([0-9]+)H)?(?:([0-9]+)M)?").unwrap());
    match re.captures(raw) {
        Some(caps) if caps.get(1).is_some() || caps.get(2).is_some() => {
            let hours = caps.get(1).map_or("0", |m| m.as_str());
            let minutes: u32 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
            format!("{}h{:02}", hours, minutes)
        }
        _ => raw.to_string(),
    }
}
