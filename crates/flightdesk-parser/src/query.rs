use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Invalid flight number: {0:?} (expected two letters and 1-4 digits)")]
    FlightNumber(String),
    #[error("Invalid IATA airport code: {0:?}")]
    AirportCode(String),
    #[error("Invalid clock time: {0:?} (expected HH:MM)")]
    ClockTime(String),
}

/// Marketing flight designator, e.g. `AF001` (carrier `AF`, number `001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FlightNumber {
    carrier: String,
    number: String,
}

impl FlightNumber {
    /// Caller guarantees `carrier` is two ASCII letters and `number` 1-4 digits.
    pub(crate) fn from_parts(carrier: &str, number: &str) -> Self {
        Self {
            carrier: carrier.to_ascii_uppercase(),
            number: number.to_string(),
        }
    }

    pub fn carrier_code(&self) -> &str {
        &self.carrier
    }

    /// Numeric part exactly as written (leading zeros kept).
    pub fn number(&self) -> &str {
        &self.number
    }
}

impl FromStr for FlightNumber {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || ValueError::FlightNumber(s.to_string());
        if !s.is_ascii() || s.len() < 3 {
            return Err(bad());
        }
        let (carrier, number) = s.split_at(2);
        if !carrier.chars().all(|c| c.is_ascii_alphabetic())
            || number.is_empty()
            || number.len() > 4
            || !number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(bad());
        }
        Ok(Self::from_parts(carrier, number))
    }
}

impl TryFrom<String> for FlightNumber {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FlightNumber> for String {
    fn from(value: FlightNumber) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FlightNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.carrier, self.number)
    }
}

/// Three-letter IATA airport code, always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode(String);

impl AirportCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AirportCode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(s.to_ascii_uppercase()))
        } else {
            Err(ValueError::AirportCode(s.to_string()))
        }
    }
}

impl TryFrom<String> for AirportCode {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AirportCode> for String {
    fn from(value: AirportCode) -> Self {
        value.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wall-clock time with minute precision. Displays as zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn minutes_of_day(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    /// Absolute distance in minutes on a single day; 23:50 and 00:10 are 1420 apart.
    pub fn minutes_between(&self, other: &ClockTime) -> u32 {
        self.minutes_of_day().abs_diff(other.minutes_of_day())
    }
}

impl FromStr for ClockTime {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::normalize::parse_time(s).ok_or_else(|| ValueError::ClockTime(s.to_string()))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Gds,
    FlightNumber,
    FreeText,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputFormat::Gds => "gds",
            InputFormat::FlightNumber => "flight_number",
            InputFormat::FreeText => "free_text",
        })
    }
}

/// `DDMON[-DDMON] AAA BBB HH:MM HH:MM`: everything except the return leg is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdsQuery {
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub origin_airport: AirportCode,
    pub destination_airport: AirportCode,
    pub departure_time: ClockTime,
    pub arrival_time: ClockTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightNumberQuery {
    pub flight_number: FlightNumber,
    pub departure_date: Option<NaiveDate>,
}

/// Common optional-field view shared by every query format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlightFields {
    pub flight_number: Option<FlightNumber>,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub origin_airport: Option<AirportCode>,
    pub destination_airport: Option<AirportCode>,
    pub departure_time: Option<ClockTime>,
    pub arrival_time: Option<ClockTime>,
}

impl FlightFields {
    /// True when at least one of flight number, date, origin or destination is set.
    /// Times alone do not make a query.
    pub fn is_meaningful(&self) -> bool {
        self.flight_number.is_some()
            || self.departure_date.is_some()
            || self.origin_airport.is_some()
            || self.destination_airport.is_some()
    }
}

/// Structured result of parsing one line of operator input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ParsedFlightQuery {
    Gds(GdsQuery),
    FlightNumber(FlightNumberQuery),
    FreeText(FlightFields),
}

impl ParsedFlightQuery {
    /// Runs the format cascade. See [`crate::input::parse`].
    pub fn parse(text: &str, default_year: Option<i32>) -> Option<Self> {
        crate::input::parse(text, default_year)
    }

    pub fn format(&self) -> InputFormat {
        match self {
            ParsedFlightQuery::Gds(_) => InputFormat::Gds,
            ParsedFlightQuery::FlightNumber(_) => InputFormat::FlightNumber,
            ParsedFlightQuery::FreeText(_) => InputFormat::FreeText,
        }
    }

    pub fn flight_number(&self) -> Option<&FlightNumber> {
        match self {
            ParsedFlightQuery::Gds(_) => None,
            ParsedFlightQuery::FlightNumber(q) => Some(&q.flight_number),
            ParsedFlightQuery::FreeText(f) => f.flight_number.as_ref(),
        }
    }

    pub fn carrier_code(&self) -> Option<&str> {
        self.flight_number().map(FlightNumber::carrier_code)
    }

    pub fn departure_date(&self) -> Option<NaiveDate> {
        match self {
            ParsedFlightQuery::Gds(q) => Some(q.departure_date),
            ParsedFlightQuery::FlightNumber(q) => q.departure_date,
            ParsedFlightQuery::FreeText(f) => f.departure_date,
        }
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        match self {
            ParsedFlightQuery::Gds(q) => q.return_date,
            ParsedFlightQuery::FlightNumber(_) => None,
            ParsedFlightQuery::FreeText(f) => f.return_date,
        }
    }

    pub fn origin_airport(&self) -> Option<&AirportCode> {
        match self {
            ParsedFlightQuery::Gds(q) => Some(&q.origin_airport),
            ParsedFlightQuery::FlightNumber(_) => None,
            ParsedFlightQuery::FreeText(f) => f.origin_airport.as_ref(),
        }
    }

    pub fn destination_airport(&self) -> Option<&AirportCode> {
        match self {
            ParsedFlightQuery::Gds(q) => Some(&q.destination_airport),
            ParsedFlightQuery::FlightNumber(_) => None,
            ParsedFlightQuery::FreeText(f) => f.destination_airport.as_ref(),
        }
    }

    pub fn departure_time(&self) -> Option<ClockTime> {
        match self {
            ParsedFlightQuery::Gds(q) => Some(q.departure_time),
            ParsedFlightQuery::FlightNumber(_) => None,
            ParsedFlightQuery::FreeText(f) => f.departure_time,
        }
    }

    pub fn arrival_time(&self) -> Option<ClockTime> {
        match self {
            ParsedFlightQuery::Gds(q) => Some(q.arrival_time),
            ParsedFlightQuery::FlightNumber(_) => None,
            ParsedFlightQuery::FreeText(f) => f.arrival_time,
        }
    }

    /// Flattens any variant into the all-optional record.
    pub fn fields(&self) -> FlightFields {
        FlightFields {
            flight_number: self.flight_number().cloned(),
            departure_date: self.departure_date(),
            return_date: self.return_date(),
            origin_airport: self.origin_airport().cloned(),
            destination_airport: self.destination_airport().cloned(),
            departure_time: self.departure_time(),
            arrival_time: self.arrival_time(),
        }
    }
}
