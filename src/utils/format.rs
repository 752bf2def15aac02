// src/utils/format.rs
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const LMONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A message timestamp broken out the way the message listings
/// display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateDisplay {
    pub year: String,
    pub month: String,
    pub lmonth: String,
    pub day: String,
    pub time: String,
}

/// Split a timestamp into year, abbreviated and long month names, day,
/// and time of day.
pub fn split_datetime(dt: DateTime<Utc>) -> DateDisplay {
    let month = dt.month0() as usize;
    DateDisplay {
        year: dt.year().to_string(),
        month: MONTHS[month].to_string(),
        lmonth: LMONTHS[month].to_string(),
        day: dt.day().to_string(),
        time: format!("{:02}:{:02}", dt.hour(), dt.minute()),
    }
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn splits_a_timestamp() {
        let dt = Utc.with_ymd_and_hms(2019, 2, 18, 9, 5, 0).unwrap();
        let d = split_datetime(dt);
        assert_eq!(d.year, "2019");
        assert_eq!(d.month, "Feb");
        assert_eq!(d.lmonth, "February");
        assert_eq!(d.day, "18");
        assert_eq!(d.time, "09:05");
    }

    #[test]
    fn truncates_long_strings() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("somewhat longer", 8), "somewhat...");
    }
}
