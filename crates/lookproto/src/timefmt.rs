//! Wire timestamp format.
//!
//! The backend addresses footage with zone-less local timestamps
//! (`YYYY-MM-DD HH:MM:SS`), so everything downstream works in
//! [`NaiveDateTime`].

use chrono::NaiveDateTime;

pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_wire(t: NaiveDateTime) -> String {
    t.format(WIRE_FORMAT).to_string()
}

pub fn parse_wire(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), WIRE_FORMAT)
}
