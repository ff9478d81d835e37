use crate::record::FlightRecord;
use chrono::NaiveDate;
use flightdesk_parser::{AirportCode, FlightNumber};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Authentication rejected by provider: {0}")]
    Auth(String),
    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected provider response: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

/// Remote source of flight data.
///
/// "Not found" is `Ok(None)` / `Ok(vec![])`; `Err` is reserved for transport,
/// auth and remote-API failures.
pub trait FlightDataProvider: Send + Sync {
    fn lookup_by_number(
        &self,
        flight_number: &FlightNumber,
        date: NaiveDate,
    ) -> Result<Option<FlightRecord>, ProviderError>;

    fn search_offers(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        date: NaiveDate,
        adults: u32,
        return_date: Option<NaiveDate>,
    ) -> Result<Vec<FlightRecord>, ProviderError>;
}
