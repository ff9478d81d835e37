use chrono::NaiveDate;
use flightdesk_core::{
    FlightDataProvider, FlightRecord, FlightSearch, ProviderError, RecordSource, SearchReason,
    Strategy,
};
use flightdesk_parser::{AirportCode, FlightNumber};
use simplelog::{Config, LevelFilter, TestLogger};
use std::sync::{Arc, Mutex};

/// Scripted provider that records every call it receives.
struct MockProvider {
    calls: Arc<Mutex<Vec<String>>>,
    lookup: Option<FlightRecord>,
    offers: Vec<FlightRecord>,
    fail: bool,
}

impl MockProvider {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let provider = Self {
            calls: Arc::clone(&calls),
            lookup: None,
            offers: Vec::new(),
            fail: false,
        };
        (provider, calls)
    }

    fn failure(&self) -> ProviderError {
        ProviderError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        }
    }
}

impl FlightDataProvider for MockProvider {
    fn lookup_by_number(
        &self,
        flight_number: &FlightNumber,
        date: NaiveDate,
    ) -> Result<Option<FlightRecord>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("lookup {} {}", flight_number, date));
        if self.fail {
            return Err(self.failure());
        }
        Ok(self.lookup.clone())
    }

    fn search_offers(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        date: NaiveDate,
        adults: u32,
        return_date: Option<NaiveDate>,
    ) -> Result<Vec<FlightRecord>, ProviderError> {
        self.calls.lock().unwrap().push(format!(
            "offers {} {} {} adults={} return={:?}",
            origin, destination, date, adults, return_date
        ));
        if self.fail {
            return Err(self.failure());
        }
        Ok(self.offers.clone())
    }
}

fn init_logging() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

fn offer(number: &str, departure: &str) -> FlightRecord {
    FlightRecord {
        flight_number: number.to_string(),
        departure_airport: "BRU".to_string(),
        arrival_airport: "JFK".to_string(),
        departure_time: Some(departure.to_string()),
        ..FlightRecord::new(RecordSource::OriginDestinationSearch)
    }
}

#[test]
fn test_flight_number_lookup_is_tagged() {
    init_logging();
    let (mut provider, calls) = MockProvider::new();
    provider.lookup = Some(FlightRecord {
        flight_number: "AF001".to_string(),
        departure_airport: "CDG".to_string(),
        arrival_airport: "JFK".to_string(),
        ..FlightRecord::new(RecordSource::FlightNumberLookup)
    });

    let outcome = FlightSearch::new(provider).search("AF001 18/11/2025", None);

    assert_eq!(outcome.strategy, Some(Strategy::FlightNumber));
    assert_eq!(outcome.reason, SearchReason::FlightsFound);
    let records = outcome.records.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, RecordSource::FlightNumberLookup);
    assert!(records[0].parsed_from_input);
    assert_eq!(records[0].departure_airport, "CDG");
    assert_eq!(*calls.lock().unwrap(), vec!["lookup AF001 2025-11-18"]);
}

#[test]
fn test_flight_number_not_found() {
    init_logging();
    let (provider, _calls) = MockProvider::new();

    let outcome = FlightSearch::new(provider).search("AF001 18/11/2025", None);

    assert_eq!(outcome.strategy, Some(Strategy::FlightNumber));
    assert_eq!(outcome.reason, SearchReason::NoFlightsFound);
    assert!(outcome.records.is_none());
    assert!(outcome.parsed_query.is_some());
}

#[test]
fn test_origin_destination_ranks_by_departure_time() {
    init_logging();
    let (mut provider, calls) = MockProvider::new();
    provider.offers = vec![
        offer("SN501", "08:00"),
        offer("SN503", "09:45"),
        offer("SN505", "10:05"),
        offer("SN507", "13:00"),
        offer("SN509", "23:50"),
    ];

    let outcome = FlightSearch::new(provider).search("18NOV BRU JFK 10:00 14:00", Some(2025));

    assert_eq!(outcome.strategy, Some(Strategy::OriginDestination));
    let records = outcome.records.unwrap();
    let numbers: Vec<&str> = records.iter().map(|r| r.flight_number.as_str()).collect();
    assert_eq!(numbers, vec!["SN505", "SN503", "SN501"]);
    assert!(records
        .iter()
        .all(|r| r.parsed_from_input && r.source == RecordSource::OriginDestinationSearch));
    assert_eq!(
        *calls.lock().unwrap(),
        vec!["offers BRU JFK 2025-11-18 adults=1 return=None"]
    );
}

#[test]
fn test_round_trip_passes_return_date() {
    init_logging();
    let (mut provider, calls) = MockProvider::new();
    provider.offers = vec![offer("SN501", "10:30")];

    let outcome =
        FlightSearch::new(provider).search("18NOV-25NOV BRU JFK 10:00 14:00", Some(2025));

    assert_eq!(outcome.reason, SearchReason::FlightsFound);
    assert_eq!(
        *calls.lock().unwrap(),
        vec!["offers BRU JFK 2025-11-18 adults=1 return=Some(2025-11-25)"]
    );
}

#[test]
fn test_empty_offers_is_not_found() {
    init_logging();
    let (provider, _calls) = MockProvider::new();

    let outcome = FlightSearch::new(provider).search("18NOV BRU JFK 10:00 14:00", Some(2025));

    assert_eq!(outcome.strategy, Some(Strategy::OriginDestination));
    assert_eq!(outcome.reason, SearchReason::NoFlightsFound);
    assert!(outcome.records.is_none());
}

#[test]
fn test_provider_error_becomes_no_records() {
    init_logging();
    let (mut provider, _calls) = MockProvider::new();
    provider.fail = true;

    let outcome = FlightSearch::new(provider).search("AF001 18/11/2025", None);

    assert!(outcome.records.is_none());
    assert_eq!(outcome.reason, SearchReason::ProviderError);
    assert!(outcome.message().contains("503"));
}

#[test]
fn test_partial_query_never_calls_provider() {
    init_logging();
    let (provider, calls) = MockProvider::new();

    let outcome = FlightSearch::new(provider).search("Vol de CDG à JFK", Some(2025));

    assert_eq!(outcome.strategy, Some(Strategy::ManualPartial));
    let records = outcome.records.unwrap();
    assert_eq!(records[0].source, RecordSource::ManualInput);
    assert_eq!(records[0].complete, Some(false));
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_offline_complete_gds_is_manual_complete() {
    init_logging();
    let outcome = FlightSearch::offline().search("18NOV BRU JFK 10:00 14:00", Some(2025));

    assert_eq!(outcome.strategy, Some(Strategy::ManualComplete));
    let records = outcome.records.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].complete, Some(true));
    assert_eq!(records[0].departure_time.as_deref(), Some("10:00"));
}

#[test]
fn test_offline_flight_number_is_partial() {
    init_logging();
    let outcome = FlightSearch::offline().search("AF001 18/11/2025", None);

    assert_eq!(outcome.strategy, Some(Strategy::ManualPartial));
    assert_eq!(outcome.records.unwrap()[0].flight_number, "AF001");
}
