// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Turns one line of operator input (GDS shorthand, a flight number, or prose)
//! into a [`ParsedFlightQuery`].

pub mod input;
pub mod normalize;
pub mod query;

pub use input::parse;
pub use normalize::{normalize_date, normalize_time};
pub use query::{
    AirportCode, ClockTime, FlightFields, FlightNumber, FlightNumberQuery, GdsQuery, InputFormat,
    ParsedFlightQuery, ValueError,
};
