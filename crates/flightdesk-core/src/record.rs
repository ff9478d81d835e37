use flightdesk_parser::{normalize, ClockTime, ParsedFlightQuery};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for identifiers the source could not provide.
pub const UNKNOWN: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    FlightNumberLookup,
    OriginDestinationSearch,
    ManualInput,
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordSource::FlightNumberLookup => "flight_number_lookup",
            RecordSource::OriginDestinationSearch => "origin_destination_search",
            RecordSource::ManualInput => "manual_input",
        })
    }
}

/// One concrete flight, either returned by a provider or synthesized from the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub flight_number: String,
    pub carrier_code: Option<String>,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    /// Raw provider timestamps, e.g. `2025-11-18T10:30:00`.
    pub departure_datetime: Option<String>,
    pub arrival_datetime: Option<String>,
    pub duration: Option<String>,
    pub stops: Option<u32>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub aircraft_type: Option<String>,
    pub terminal_departure: Option<String>,
    pub terminal_arrival: Option<String>,
    pub source: RecordSource,
    pub parsed_from_input: bool,
    /// Only set on manual records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

impl FlightRecord {
    /// Empty record with every identifier set to [`UNKNOWN`].
    pub fn new(source: RecordSource) -> Self {
        Self {
            flight_number: UNKNOWN.to_string(),
            carrier_code: None,
            departure_airport: UNKNOWN.to_string(),
            arrival_airport: UNKNOWN.to_string(),
            departure_time: None,
            arrival_time: None,
            departure_datetime: None,
            arrival_datetime: None,
            duration: None,
            stops: None,
            price: None,
            currency: None,
            aircraft_type: None,
            terminal_departure: None,
            terminal_arrival: None,
            source,
            parsed_from_input: false,
            complete: None,
        }
    }

    /// Builds the single record used when no remote lookup is made.
    pub fn from_query(query: &ParsedFlightQuery) -> Self {
        let text_or_unknown =
            |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            flight_number: text_or_unknown(query.flight_number().map(|f| f.to_string())),
            carrier_code: query.carrier_code().map(str::to_string),
            departure_airport: text_or_unknown(query.origin_airport().map(|a| a.to_string())),
            arrival_airport: text_or_unknown(query.destination_airport().map(|a| a.to_string())),
            departure_time: query.departure_time().map(|t| t.to_string()),
            arrival_time: query.arrival_time().map(|t| t.to_string()),
            parsed_from_input: true,
            complete: Some(crate::strategy::has_complete_schedule(query)),
            ..Self::new(RecordSource::ManualInput)
        }
    }

    /// Copy of this record re-tagged as coming from the operator's query.
    pub fn enriched(self, source: RecordSource) -> Self {
        Self {
            source,
            parsed_from_input: true,
            ..self
        }
    }

    /// The record's own departure time, if it reads as a clock time.
    pub fn departure_clock(&self) -> Option<ClockTime> {
        self.departure_time.as_deref().and_then(normalize::parse_time)
    }
}
