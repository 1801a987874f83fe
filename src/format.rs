// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::error::ApiError;

/// Month abbreviations used on episode pages (pt-BR)
const MONTHS_PT_BR: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Format a number of seconds as `HH:MM:SS`
///
/// Hours are not wrapped, so a ten hour episode renders as `10:00:00`.
pub fn duration_to_time_string(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Parse a `published_at` timestamp as served by the episodes API
pub fn parse_published_at(date_str: &str) -> Result<NaiveDateTime, ApiError> {
    let trimmed = date_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }

    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ApiError::InvalidDate {
            date_str: date_str.to_string(),
        })
}

/// Format a publication date as `d MMM yy`, e.g. `8 jan 21`
pub fn format_published_at(date: &NaiveDateTime) -> String {
    let month = MONTHS_PT_BR[date.month0() as usize];
    format!("{} {} {:02}", date.day(), month, date.year().rem_euclid(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_pads_all_units() {
        assert_eq!(duration_to_time_string(0), "00:00:00");
        assert_eq!(duration_to_time_string(59), "00:00:59");
        assert_eq!(duration_to_time_string(3661), "01:01:01");
        assert_eq!(duration_to_time_string(5403), "01:30:03");
    }

    #[test]
    fn duration_does_not_wrap_hours() {
        assert_eq!(duration_to_time_string(36000), "10:00:00");
        assert_eq!(duration_to_time_string(100 * 3600), "100:00:00");
    }

    #[test]
    fn parses_space_separated_timestamps() {
        let dt = parse_published_at("2021-01-22 19:22:25").unwrap();
        assert_eq!(format_published_at(&dt), "22 jan 21");
    }

    #[test]
    fn parses_rfc3339_and_plain_dates() {
        let dt = parse_published_at("2021-02-08T10:00:00-03:00").unwrap();
        assert_eq!(format_published_at(&dt), "8 fev 21");

        let dt = parse_published_at("2020-12-31").unwrap();
        assert_eq!(format_published_at(&dt), "31 dez 20");
    }

    #[test]
    fn year_is_zero_padded() {
        let dt = parse_published_at("2005-09-01 08:00:00").unwrap();
        assert_eq!(format_published_at(&dt), "1 set 05");
    }

    #[test]
    fn rejects_garbage_dates() {
        match parse_published_at("last tuesday") {
            Err(ApiError::InvalidDate { date_str }) => assert_eq!(date_str, "last tuesday"),
            other => panic!("Expected InvalidDate, got {other:?}"),
        }
    }
}
