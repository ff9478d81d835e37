//! Format cascade for operator input: GDS line, then flight number, then free text.
//! The first sub-parser that recognizes the text wins; results are never merged.

use crate::normalize::{clock, ymd};
use crate::query::{
    AirportCode, ClockTime, FlightFields, FlightNumber, FlightNumberQuery, GdsQuery,
    ParsedFlightQuery,
};
use chrono::{Datelike, Local, NaiveDate};
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

static MONTH_CODES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Three-letter words that look like IATA codes once uppercased.
static AIRPORT_STOPWORDS: [&str; 11] = [
    "VOL", "DES", "LES", "UNE", "PAR", "SUR", "AUX", "VIA", "AND", "THE", "FOR",
];

/// Parses one line of operator input. Returns `None` when nothing meaningful
/// (flight number, date or airport) can be extracted.
///
/// `default_year` fills in dates written without a year; the current local
/// year is used when it is `None`.
pub fn parse(text: &str, default_year: Option<i32>) -> Option<ParsedFlightQuery> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let year = default_year.unwrap_or_else(|| Local::now().year());

    let parsed = parse_gds(text, year)
        .map(ParsedFlightQuery::Gds)
        .or_else(|| parse_flight_number(text, year).map(ParsedFlightQuery::FlightNumber))
        .or_else(|| parse_free_text(text, year).map(ParsedFlightQuery::FreeText));

    match &parsed {
        Some(query) => debug!(
            "Flight input recognized — format={} chars={}",
            query.format(),
            text.len()
        ),
        None => debug!("Flight input not recognized — chars={}", text.len()),
    }
    parsed
}

/// `18NOV BRU JFK 10:00 14:00` or `18NOV-25NOV BRU JFK 10:00 14:00`.
fn parse_gds(text: &str, year: i32) -> Option<GdsQuery> {
    static GDS_RE: OnceLock<Regex> = OnceLock::new();
    let gds_re = GDS_RE.get_or_init(|| {
        Regex::new(concat!(
            r"([0-9]{2}[A-Z]{3})(?:-([0-9]{2}[A-Z]{3}))?",
            r"\s+([A-Z]{3})\s+([A-Z]{3})",
            r"\s+([0-9]{1,2}:[0-9]{2})\s+([0-9]{1,2}:[0-9]{2})\b",
        ))
        .unwrap()
    });

    let upper = text.to_uppercase();
    let caps = gds_re.captures(&upper)?;

    let departure_date = gds_date(&caps[1], year)?;
    let return_date = match caps.get(2) {
        Some(token) => Some(return_leg_date(departure_date, gds_date(token.as_str(), year)?)?),
        None => None,
    };

    Some(GdsQuery {
        departure_date,
        return_date,
        origin_airport: caps[3].parse().ok()?,
        destination_airport: caps[4].parse().ok()?,
        departure_time: caps[5].parse::<ClockTime>().ok()?,
        arrival_time: caps[6].parse::<ClockTime>().ok()?,
    })
}

/// `AF001`, `AF001 18/11/2025`, `AF001 18NOV`.
fn parse_flight_number(text: &str, year: i32) -> Option<FlightNumberQuery> {
    static DMY_FULL_RE: OnceLock<Regex> = OnceLock::new();
    let dmy_full_re =
        DMY_FULL_RE.get_or_init(|| Regex::new(r"([0-9]{2})[/-]([0-9]{2})[/-]([0-9]{4})").unwrap());

    let upper = text.to_uppercase();
    let flight_number = find_flight_number(&upper)?;

    let departure_date = dmy_full_re
        .captures(text)
        .and_then(|caps| ymd(&caps[3], &caps[2], &caps[1]))
        .or_else(|| find_gds_date(&upper, year));

    Some(FlightNumberQuery {
        flight_number,
        departure_date,
    })
}

/// Best-effort extraction from prose, e.g. `Vol AF001 de CDG vers JFK le 18/11 a 10h30`.
fn parse_free_text(text: &str, year: i32) -> Option<FlightFields> {
    static DMY_RE: OnceLock<Regex> = OnceLock::new();
    static AIRPORT_RE: OnceLock<Regex> = OnceLock::new();
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    let dmy_re =
        DMY_RE.get_or_init(|| Regex::new(r"([0-9]{2})[/-]([0-9]{2})(?:[/-]([0-9]{4}))?").unwrap());
    let airport_re = AIRPORT_RE.get_or_init(|| Regex::new(r"\b[A-Z]{3}\b").unwrap());
    let time_re = TIME_RE.get_or_init(|| Regex::new(r"\b([0-9]{1,2})[hH:]([0-9]{2})\b").unwrap());

    let upper = text.to_uppercase();

    let departure_date = dmy_re.captures(text).and_then(|caps| {
        let year = caps
            .get(3)
            .map(|y| y.as_str().to_string())
            .unwrap_or_else(|| year.to_string());
        ymd(&year, &caps[2], &caps[1])
    });

    let mut airports = airport_re
        .find_iter(&upper)
        .map(|m| m.as_str())
        .filter(|token| !AIRPORT_STOPWORDS.contains(token))
        .filter_map(|token| token.parse::<AirportCode>().ok());

    let mut times = time_re
        .captures_iter(text)
        .filter_map(|caps| clock(&caps[1], &caps[2]));

    let fields = FlightFields {
        flight_number: find_flight_number(&upper),
        departure_date,
        return_date: None,
        origin_airport: airports.next(),
        destination_airport: airports.next(),
        departure_time: times.next(),
        arrival_time: times.next(),
    };

    fields.is_meaningful().then_some(fields)
}

fn find_flight_number(upper: &str) -> Option<FlightNumber> {
    static FLIGHT_RE: OnceLock<Regex> = OnceLock::new();
    let flight_re = FLIGHT_RE.get_or_init(|| Regex::new(r"\b([A-Z]{2})([0-9]{1,4})\b").unwrap());

    flight_re
        .captures(upper)
        .map(|caps| FlightNumber::from_parts(&caps[1], &caps[2]))
}

fn find_gds_date(upper: &str, year: i32) -> Option<NaiveDate> {
    static GDS_DATE_RE: OnceLock<Regex> = OnceLock::new();
    let gds_date_re = GDS_DATE_RE.get_or_init(|| Regex::new(r"\b([0-9]{2}[A-Z]{3})\b").unwrap());

    gds_date_re
        .captures(upper)
        .and_then(|caps| gds_date(&caps[1], year))
}

/// `18NOV` in the given year. Unknown month codes and impossible days yield `None`.
fn gds_date(token: &str, year: i32) -> Option<NaiveDate> {
    if token.len() != 5 || !token.is_ascii() {
        return None;
    }
    let (day, month) = token.split_at(2);
    let day: u32 = day.parse().ok()?;
    let month = month_number(month)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(code: &str) -> Option<u32> {
    let code = code.to_ascii_uppercase();
    MONTH_CODES
        .iter()
        .position(|m| *m == code)
        .map(|idx| idx as u32 + 1)
}

/// A return leg written earlier in the calendar than the outbound (`28DEC-04JAN`)
/// belongs to the following year.
fn return_leg_date(departure: NaiveDate, ret: NaiveDate) -> Option<NaiveDate> {
    if ret >= departure {
        Some(ret)
    } else {
        ret.with_year(ret.year() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_table() {
        assert_eq!(month_number("JAN"), Some(1));
        assert_eq!(month_number("nov"), Some(11));
        assert_eq!(month_number("DEC"), Some(12));
        assert_eq!(month_number("XYZ"), None);
    }

    #[test]
    fn test_gds_date() {
        assert_eq!(gds_date("18NOV", 2025), Some(date(2025, 11, 18)));
        assert_eq!(gds_date("31FEB", 2025), None);
        assert_eq!(gds_date("18XYZ", 2025), None);
        assert_eq!(gds_date("1NOV", 2025), None);
    }

    #[test]
    fn test_gds_without_return() {
        let q = parse_gds("18NOV BRU JFK 10:00 14:00", 2025).unwrap();
        assert_eq!(q.departure_date, date(2025, 11, 18));
        assert_eq!(q.return_date, None);
        assert_eq!(q.origin_airport.as_str(), "BRU");
        assert_eq!(q.destination_airport.as_str(), "JFK");
    }

    #[test]
    fn test_gds_pads_single_digit_hours() {
        let q = parse_gds("05mar cdg nce 7:15 8:40", 2026).unwrap();
        assert_eq!(q.departure_time.to_string(), "07:15");
        assert_eq!(q.arrival_time.to_string(), "08:40");
        assert_eq!(q.origin_airport.as_str(), "CDG");
    }

    #[test]
    fn test_gds_return_rolls_into_next_year() {
        let q = parse_gds("28DEC-04JAN BRU JFK 10:00 14:00", 2025).unwrap();
        assert_eq!(q.departure_date, date(2025, 12, 28));
        assert_eq!(q.return_date, Some(date(2026, 1, 4)));
    }

    #[test]
    fn test_gds_bad_month_falls_through() {
        assert!(parse_gds("18XYZ BRU JFK 10:00 14:00", 2025).is_none());
        assert!(parse_gds("18NOV-31FEB BRU JFK 10:00 14:00", 2025).is_none());
        assert!(parse_gds("18NOV BRU JFK 25:00 14:00", 2025).is_none());
    }

    #[test]
    fn test_flight_number_date_preference() {
        // Numeric date wins over the GDS token.
        let q = parse_flight_number("KL1234 20/12/2025 18NOV", 2025).unwrap();
        assert_eq!(q.departure_date, Some(date(2025, 12, 20)));

        // An impossible numeric date falls back to the GDS token.
        let q = parse_flight_number("KL1234 31/02/2025 18NOV", 2025).unwrap();
        assert_eq!(q.departure_date, Some(date(2025, 11, 18)));

        let q = parse_flight_number("KL1234", 2025).unwrap();
        assert_eq!(q.departure_date, None);
    }

    #[test]
    fn test_flight_number_accepts_dashes() {
        let q = parse_flight_number("ba2490 on 03-04-2026", 2025).unwrap();
        assert_eq!(q.flight_number.to_string(), "BA2490");
        assert_eq!(q.departure_date, Some(date(2026, 4, 3)));
    }

    #[test]
    fn test_free_text_extracts_airports_and_times() {
        let f = parse_free_text("Vol de CDG vers JFK le 18/11 départ 10h30 arrivée 13:45", 2025)
            .unwrap();
        assert_eq!(f.origin_airport.unwrap().as_str(), "CDG");
        assert_eq!(f.destination_airport.unwrap().as_str(), "JFK");
        assert_eq!(f.departure_date, Some(date(2025, 11, 18)));
        assert_eq!(f.departure_time.unwrap().to_string(), "10:30");
        assert_eq!(f.arrival_time.unwrap().to_string(), "13:45");
        assert_eq!(f.flight_number, None);
    }

    #[test]
    fn test_free_text_stopwords_are_not_airports() {
        let f = parse_free_text("the flight for LHR", 2025).unwrap();
        assert_eq!(f.origin_airport.unwrap().as_str(), "LHR");
        assert_eq!(f.destination_airport, None);
    }

    #[test]
    fn test_free_text_only_times_is_nothing() {
        assert!(parse_free_text("vers 10h30 ou 11h15", 2025).is_none());
    }

    #[test]
    fn test_free_text_invalid_date_is_dropped() {
        let f = parse_free_text("NCE 31/02", 2025).unwrap();
        assert_eq!(f.departure_date, None);
        assert_eq!(f.origin_airport.unwrap().as_str(), "NCE");
    }

    #[test]
    fn test_cascade_order() {
        let q = parse("18NOV BRU JFK 10:00 14:00", Some(2025)).unwrap();
        assert!(matches!(q, ParsedFlightQuery::Gds(_)));

        // Incomplete GDS line containing a flight number goes to the flight-number parser.
        let q = parse("AF001 18NOV BRU JFK", Some(2025)).unwrap();
        assert!(matches!(q, ParsedFlightQuery::FlightNumber(_)));

        let q = parse("18NOV BRU JFK", Some(2025)).unwrap();
        assert!(matches!(q, ParsedFlightQuery::FreeText(_)));
    }

    #[test]
    fn test_non_ascii_digits_are_not_flight_numbers() {
        let q = parse("AF\u{661}\u{662}\u{663} 18/11/2025", Some(2025)).unwrap();
        assert!(matches!(q, ParsedFlightQuery::FreeText(_)));
        assert_eq!(q.flight_number(), None);
        assert_eq!(q.departure_date(), Some(date(2025, 11, 18)));

        assert!(parse("AF\u{661}\u{662}\u{663}", Some(2025)).is_none());
        assert!(parse("\u{661}\u{668}/\u{661}\u{661}/2025", Some(2025)).is_none());
    }

    #[test]
    fn test_gds_line_may_follow_other_text() {
        let q = parse("X18NOV BRU JFK 10:00 14:00", Some(2025)).unwrap();
        assert!(matches!(q, ParsedFlightQuery::Gds(_)));
        assert_eq!(q.departure_date(), Some(date(2025, 11, 18)));
    }

    #[test]
    fn test_blank_input() {
        assert!(parse("", Some(2025)).is_none());
        assert!(parse("   \n\t", Some(2025)).is_none());
    }
}
