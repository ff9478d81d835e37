use crate::provider::{FlightDataProvider, ProviderError};
use crate::record::{FlightRecord, RecordSource};
use crate::strategy::Strategy;
use flightdesk_parser::{ClockTime, ParsedFlightQuery};
use log::{debug, info, warn};
use thiserror::Error;

/// Passenger count sent with every offer search.
pub const OFFER_ADULTS: u32 = 1;
/// Offers kept after ranking by departure-time proximity.
pub const PROXIMITY_KEEP: usize = 3;

/// Why a strategy produced no records.
#[derive(Error, Debug)]
pub enum SearchMiss {
    #[error("no matching flight found")]
    NotFound,
    #[error("query has no {0}")]
    MissingField(&'static str),
    #[error("no flight-data provider configured")]
    ProviderUnavailable,
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

pub struct SearchExecutor {
    provider: Option<Box<dyn FlightDataProvider>>,
}

impl SearchExecutor {
    pub fn new(provider: impl FlightDataProvider + 'static) -> Self {
        Self {
            provider: Some(Box::new(provider)),
        }
    }

    /// Executor without a remote source; remote strategies report
    /// [`SearchMiss::ProviderUnavailable`].
    pub fn offline() -> Self {
        Self { provider: None }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Runs `strategy` for `query`. Misses and provider failures are logged and
    /// collapse to `None`.
    pub fn execute(
        &self,
        strategy: Strategy,
        query: &ParsedFlightQuery,
    ) -> Option<Vec<FlightRecord>> {
        self.run(strategy, query).ok()
    }

    /// Like [`SearchExecutor::execute`] but keeps the reason for an empty result.
    pub fn run(
        &self,
        strategy: Strategy,
        query: &ParsedFlightQuery,
    ) -> Result<Vec<FlightRecord>, SearchMiss> {
        let result = match strategy {
            Strategy::FlightNumber => self.by_flight_number(query),
            Strategy::OriginDestination => self.by_origin_destination(query),
            Strategy::ManualComplete | Strategy::ManualPartial => {
                Ok(vec![FlightRecord::from_query(query)])
            }
        };

        match &result {
            Ok(records) => debug!(
                "Strategy produced records — strategy={} count={}",
                strategy,
                records.len()
            ),
            Err(SearchMiss::Provider(e)) => {
                warn!("Flight-data provider failed — strategy={} reason={}", strategy, e)
            }
            Err(miss) => info!("No flights found — strategy={} reason={}", strategy, miss),
        }
        result
    }

    fn provider(&self) -> Result<&dyn FlightDataProvider, SearchMiss> {
        self.provider.as_deref().ok_or(SearchMiss::ProviderUnavailable)
    }

    fn by_flight_number(&self, query: &ParsedFlightQuery) -> Result<Vec<FlightRecord>, SearchMiss> {
        let flight_number = query
            .flight_number()
            .ok_or(SearchMiss::MissingField("flight number"))?;
        let date = query
            .departure_date()
            .ok_or(SearchMiss::MissingField("departure date"))?;

        info!(
            "Looking up flight by number — flight={} date={}",
            flight_number, date
        );
        let record = self
            .provider()?
            .lookup_by_number(flight_number, date)?
            .ok_or(SearchMiss::NotFound)?;

        Ok(vec![record.enriched(RecordSource::FlightNumberLookup)])
    }

    fn by_origin_destination(
        &self,
        query: &ParsedFlightQuery,
    ) -> Result<Vec<FlightRecord>, SearchMiss> {
        let origin = query
            .origin_airport()
            .ok_or(SearchMiss::MissingField("origin airport"))?;
        let destination = query
            .destination_airport()
            .ok_or(SearchMiss::MissingField("destination airport"))?;
        let date = query
            .departure_date()
            .ok_or(SearchMiss::MissingField("departure date"))?;

        info!(
            "Searching offers — origin={} destination={} date={} return={:?}",
            origin,
            destination,
            date,
            query.return_date()
        );
        let offers = self.provider()?.search_offers(
            origin,
            destination,
            date,
            OFFER_ADULTS,
            query.return_date(),
        )?;
        if offers.is_empty() {
            return Err(SearchMiss::NotFound);
        }

        let offers: Vec<FlightRecord> = offers
            .into_iter()
            .map(|r| r.enriched(RecordSource::OriginDestinationSearch))
            .collect();

        Ok(match query.departure_time() {
            Some(target) => filter_by_time(offers, target),
            None => offers,
        })
    }
}

/// Keeps the [`PROXIMITY_KEEP`] records departing closest to `target`, nearest first.
///
/// Records without a readable departure time are dropped. If none is readable the
/// input comes back unchanged.
pub fn filter_by_time(records: Vec<FlightRecord>, target: ClockTime) -> Vec<FlightRecord> {
    if !records.iter().any(|r| r.departure_clock().is_some()) {
        debug!(
            "No offer has a readable departure time; skipping proximity filter — offers={}",
            records.len()
        );
        return records;
    }

    let mut ranked: Vec<(u32, FlightRecord)> = records
        .into_iter()
        .filter_map(|r| r.departure_clock().map(|t| (t.minutes_between(&target), r)))
        .collect();
    ranked.sort_by_key(|(diff, _)| *diff);

    ranked
        .into_iter()
        .take(PROXIMITY_KEEP)
        .map(|(_, record)| record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(departure: &str) -> FlightRecord {
        FlightRecord {
            departure_time: Some(departure.to_string()),
            ..FlightRecord::new(RecordSource::OriginDestinationSearch)
        }
    }

    fn departures(records: &[FlightRecord]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r.departure_time.as_deref().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_proximity_keeps_three_nearest() {
        let offers = ["08:00", "09:45", "10:05", "13:00", "23:50"]
            .into_iter()
            .map(offer)
            .collect();
        let target = "10:00".parse().unwrap();

        let kept = filter_by_time(offers, target);
        assert_eq!(departures(&kept), vec!["10:05", "09:45", "08:00"]);
    }

    #[test]
    fn test_proximity_drops_unreadable_times() {
        let offers = vec![offer("N/A"), offer("11:00"), offer("garbage")];
        let kept = filter_by_time(offers, "10:00".parse().unwrap());
        assert_eq!(departures(&kept), vec!["11:00"]);
    }

    #[test]
    fn test_proximity_falls_back_to_input_order() {
        let offers = vec![
            offer("N/A"),
            offer("soon"),
            FlightRecord::new(RecordSource::OriginDestinationSearch),
        ];
        let kept = filter_by_time(offers.clone(), "10:00".parse().unwrap());
        assert_eq!(kept, offers);
    }

    #[test]
    fn test_proximity_ties_keep_provider_order() {
        let mut first = offer("09:00");
        first.flight_number = "AF1".into();
        let mut second = offer("11:00");
        second.flight_number = "AF2".into();

        let kept = filter_by_time(vec![first, second], "10:00".parse().unwrap());
        let numbers: Vec<&str> = kept.iter().map(|r| r.flight_number.as_str()).collect();
        assert_eq!(numbers, vec!["AF1", "AF2"]);
    }

    #[test]
    fn test_offline_remote_strategy_is_unavailable() {
        let query = flightdesk_parser::parse("AF001 18/11/2025", None).unwrap();
        let executor = SearchExecutor::offline();
        assert!(matches!(
            executor.run(Strategy::FlightNumber, &query),
            Err(SearchMiss::ProviderUnavailable)
        ));
        assert!(executor.execute(Strategy::FlightNumber, &query).is_none());
    }

    #[test]
    fn test_manual_strategies_never_call_out() {
        let query = flightdesk_parser::parse("18NOV BRU JFK 10:00 14:00", Some(2025)).unwrap();
        let records = SearchExecutor::offline()
            .execute(Strategy::ManualComplete, &query)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, RecordSource::ManualInput);
        assert_eq!(records[0].complete, Some(true));
    }

    #[test]
    fn test_forced_strategy_with_missing_field() {
        let query = flightdesk_parser::parse("AF001", None).unwrap();
        assert!(matches!(
            SearchExecutor::offline().run(Strategy::FlightNumber, &query),
            Err(SearchMiss::MissingField("departure date"))
        ));
    }
}
