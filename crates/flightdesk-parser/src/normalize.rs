//! Date and time normalizers shared by every input format and by provider mapping.

use crate::query::ClockTime;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// `YYYY-MM-DD` passes through, `DD/MM/YYYY` becomes ISO, anything else is `None`.
pub fn normalize_date(input: &str) -> Option<String> {
    parse_date(input).map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    static ISO_RE: OnceLock<Regex> = OnceLock::new();
    static DMY_RE: OnceLock<Regex> = OnceLock::new();
    let iso_re = ISO_RE.get_or_init(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap());
    let dmy_re = DMY_RE.get_or_init(|| Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").unwrap());

    let s = input.trim();
    if let Some(caps) = iso_re.captures(s) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = dmy_re.captures(s) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }
    None
}

/// `H:MM`, `HH:MM` or `HhMM` become zero-padded `HH:MM`; anything else is `None`.
pub fn normalize_time(input: &str) -> Option<String> {
    parse_time(input).map(|t| t.to_string())
}

pub fn parse_time(input: &str) -> Option<ClockTime> {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    let time_re = TIME_RE.get_or_init(|| Regex::new(r"^([0-9]{1,2})[:hH]([0-9]{2})$").unwrap());

    let caps = time_re.captures(input.trim())?;
    clock(&caps[1], &caps[2])
}

pub(crate) fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

pub(crate) fn clock(hour: &str, minute: &str) -> Option<ClockTime> {
    ClockTime::from_hm(hour.parse().ok()?, minute.parse().ok()?)
}
