use flightdesk_parser::ParsedFlightQuery;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Direct lookup by flight number and date.
    FlightNumber,
    /// Offer search between two airports on a date.
    OriginDestination,
    /// Query already carries route and schedule; used as-is.
    ManualComplete,
    /// Whatever could be extracted, used as-is.
    ManualPartial,
}

impl Strategy {
    /// Picks the lookup for a query. Remote strategies win whenever their inputs exist.
    ///
    /// A query with route, date and both times still resolves to
    /// [`Strategy::OriginDestination`] so the stated departure time can rank real
    /// offers; [`Strategy::ManualComplete`] comes from [`Strategy::resolve_offline`].
    pub fn resolve(query: &ParsedFlightQuery) -> Self {
        let has_date = query.departure_date().is_some();

        if query.flight_number().is_some() && has_date {
            Strategy::FlightNumber
        } else if has_route(query) && has_date {
            Strategy::OriginDestination
        } else {
            Strategy::ManualPartial
        }
    }

    /// Resolution when no flight-data provider is available.
    pub fn resolve_offline(query: &ParsedFlightQuery) -> Self {
        if has_complete_schedule(query) {
            Strategy::ManualComplete
        } else {
            Strategy::ManualPartial
        }
    }

    pub fn requires_provider(self) -> bool {
        matches!(self, Strategy::FlightNumber | Strategy::OriginDestination)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::FlightNumber => "FLIGHT_NUMBER",
            Strategy::OriginDestination => "ORIGIN_DESTINATION",
            Strategy::ManualComplete => "MANUAL_COMPLETE",
            Strategy::ManualPartial => "MANUAL_PARTIAL",
        })
    }
}

fn has_route(query: &ParsedFlightQuery) -> bool {
    query.origin_airport().is_some() && query.destination_airport().is_some()
}

/// Origin, destination, departure time and arrival time are all known.
pub(crate) fn has_complete_schedule(query: &ParsedFlightQuery) -> bool {
    has_route(query) && query.departure_time().is_some() && query.arrival_time().is_some()
}
