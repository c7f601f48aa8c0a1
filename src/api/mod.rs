pub mod request;
pub mod response;

use chrono::NaiveDateTime;

/// Upper bound the node accepts for a single listing.
pub const SINGLE_QUERY_LIMIT: u16 = 1000;

pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn format_time(time: &NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn parse_time(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, TIME_FORMAT)
}
