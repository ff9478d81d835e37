use crate::executor::{SearchExecutor, SearchMiss};
use crate::provider::FlightDataProvider;
use crate::record::FlightRecord;
use crate::strategy::Strategy;
use flightdesk_parser::ParsedFlightQuery;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchReason {
    UnrecognizedInput,
    FlightsFound,
    NoFlightsFound,
    MissingField,
    ProviderUnavailable,
    ProviderError,
}

impl fmt::Display for SearchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchReason::UnrecognizedInput => "unrecognized_input",
            SearchReason::FlightsFound => "flights_found",
            SearchReason::NoFlightsFound => "no_flights_found",
            SearchReason::MissingField => "missing_field",
            SearchReason::ProviderUnavailable => "provider_unavailable",
            SearchReason::ProviderError => "provider_error",
        })
    }
}

impl From<&SearchMiss> for SearchReason {
    fn from(miss: &SearchMiss) -> Self {
        match miss {
            SearchMiss::NotFound => SearchReason::NoFlightsFound,
            SearchMiss::MissingField(_) => SearchReason::MissingField,
            SearchMiss::ProviderUnavailable => SearchReason::ProviderUnavailable,
            SearchMiss::Provider(_) => SearchReason::ProviderError,
        }
    }
}

/// Everything one `search` call learned. `records` is `None` whenever nothing was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub parsed_query: Option<ParsedFlightQuery>,
    pub strategy: Option<Strategy>,
    pub records: Option<Vec<FlightRecord>>,
    pub reason: SearchReason,
    /// Human detail for misses, e.g. the provider's error text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SearchOutcome {
    fn unrecognized() -> Self {
        Self {
            parsed_query: None,
            strategy: None,
            records: None,
            reason: SearchReason::UnrecognizedInput,
            detail: None,
        }
    }

    pub fn found(&self) -> bool {
        self.reason == SearchReason::FlightsFound
    }

    pub fn message(&self) -> String {
        let base = match self.reason {
            SearchReason::UnrecognizedInput => {
                "Input not recognized as a flight request".to_string()
            }
            SearchReason::FlightsFound => {
                let count = self.records.as_ref().map_or(0, Vec::len);
                format!("{} flight(s) found", count)
            }
            SearchReason::NoFlightsFound => "No flights found".to_string(),
            SearchReason::MissingField => "Query is missing a required field".to_string(),
            SearchReason::ProviderUnavailable => {
                "No flight-data provider configured".to_string()
            }
            SearchReason::ProviderError => "Flight-data provider failed".to_string(),
        };
        match &self.detail {
            Some(detail) => format!("{}: {}", base, detail),
            None => base,
        }
    }
}

/// Parse, resolve and execute in one call.
pub struct FlightSearch {
    executor: SearchExecutor,
}

impl FlightSearch {
    pub fn new(provider: impl FlightDataProvider + 'static) -> Self {
        Self {
            executor: SearchExecutor::new(provider),
        }
    }

    pub fn offline() -> Self {
        Self {
            executor: SearchExecutor::offline(),
        }
    }

    pub fn with_executor(executor: SearchExecutor) -> Self {
        Self { executor }
    }

    pub fn search(&self, input: &str, default_year: Option<i32>) -> SearchOutcome {
        let Some(query) = flightdesk_parser::parse(input, default_year) else {
            info!("Input not recognized as a flight request — length={}", input.len());
            return SearchOutcome::unrecognized();
        };

        let strategy = if self.executor.has_provider() {
            Strategy::resolve(&query)
        } else {
            Strategy::resolve_offline(&query)
        };
        debug!("Resolved strategy — format={} strategy={}", query.format(), strategy);

        let (records, reason, detail) = match self.executor.run(strategy, &query) {
            Ok(records) => (Some(records), SearchReason::FlightsFound, None),
            Err(miss) => {
                let detail = match &miss {
                    SearchMiss::NotFound => None,
                    SearchMiss::MissingField(field) => Some(field.to_string()),
                    other => Some(other.to_string()),
                };
                (None, SearchReason::from(&miss), detail)
            }
        };

        SearchOutcome {
            parsed_query: Some(query),
            strategy: Some(strategy),
            records,
            reason,
            detail,
        }
    }
}
