// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Strategy selection and execution for parsed flight queries.
//!
//! [`FlightSearch`] is the usual entry point: it parses the operator's text,
//! picks a [`Strategy`], runs it through a [`SearchExecutor`] and reports the
//! outcome with a [`SearchReason`].

pub mod amadeus;
pub mod config;
pub mod executor;
pub mod formatter;
pub mod provider;
pub mod record;
pub mod search;
pub mod strategy;

pub use amadeus::AmadeusProvider;
pub use config::{ApiEnvironment, ConfigError, ProviderConfig};
pub use executor::{filter_by_time, SearchExecutor, SearchMiss};
pub use formatter::{format_query, format_records};
pub use provider::{FlightDataProvider, ProviderError};
pub use record::{FlightRecord, RecordSource, UNKNOWN};
pub use search::{FlightSearch, SearchOutcome, SearchReason};
pub use strategy::Strategy;
