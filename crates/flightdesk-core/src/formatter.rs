//! Short human-readable summaries for logs and operator feedback.

use crate::record::FlightRecord;
use chrono::NaiveDate;
use flightdesk_parser::{InputFormat, ParsedFlightQuery};

pub fn format_query(query: &ParsedFlightQuery) -> String {
    let mut lines = vec![match query.format() {
        InputFormat::Gds => "GDS format detected".to_string(),
        InputFormat::FlightNumber => "Flight number format detected".to_string(),
        InputFormat::FreeText => "Free text format detected".to_string(),
    }];

    if let Some(flight) = query.flight_number() {
        lines.push(format!("   Flight: {} (carrier {})", flight, flight.carrier_code()));
    }
    if let Some(date) = query.departure_date() {
        lines.push(format!("   Departure date: {}", display_date(date)));
    }
    if let Some(date) = query.return_date() {
        lines.push(format!("   Return date: {}", display_date(date)));
    }
    if let Some(origin) = query.origin_airport() {
        lines.push(format!("   Origin: {}", origin));
    }
    if let Some(destination) = query.destination_airport() {
        lines.push(format!("   Destination: {}", destination));
    }
    if let Some(time) = query.departure_time() {
        lines.push(format!("   Departs: {}", time));
    }
    if let Some(time) = query.arrival_time() {
        lines.push(format!("   Arrives: {}", time));
    }

    lines.join("\n")
}

pub fn format_records(records: &[FlightRecord]) -> String {
    if records.is_empty() {
        return "No flights".to_string();
    }
    records
        .iter()
        .map(format_record)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_record(record: &FlightRecord) -> String {
    let mut lines = vec![
        format!("Flight {} [{}]", record.flight_number, record.source),
        format!(
            "   Route: {} -> {}",
            record.departure_airport, record.arrival_airport
        ),
    ];

    if record.departure_time.is_some() || record.arrival_time.is_some() {
        lines.push(format!(
            "   Schedule: {} - {}",
            record.departure_time.as_deref().unwrap_or("?"),
            record.arrival_time.as_deref().unwrap_or("?")
        ));
    }
    if let (Some(departure), Some(arrival)) =
        (&record.departure_datetime, &record.arrival_datetime)
    {
        lines.push(format!("   Timestamps: {} -> {}", departure, arrival));
    }
    if record.terminal_departure.is_some() || record.terminal_arrival.is_some() {
        lines.push(format!(
            "   Terminals: {} -> {}",
            record.terminal_departure.as_deref().unwrap_or("?"),
            record.terminal_arrival.as_deref().unwrap_or("?")
        ));
    }
    if let Some(duration) = &record.duration {
        lines.push(format!("   Duration: {}", duration));
    }
    if let Some(stops) = record.stops {
        lines.push(format!("   Stops: {}", stops));
    }
    if let Some(aircraft) = &record.aircraft_type {
        lines.push(format!("   Aircraft: {}", aircraft));
    }
    if let Some(price) = &record.price {
        lines.push(format!(
            "   Price: {} {}",
            price,
            record.currency.as_deref().unwrap_or("")
        ));
    }
    if let Some(complete) = record.complete {
        lines.push(format!(
            "   Complete: {}",
            if complete { "yes" } else { "no, some details missing" }
        ));
    }

    lines.join("\n")
}

/// Local display format, `DD/MM/YYYY`.
fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
