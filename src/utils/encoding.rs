//! Character encoding utilities
//!
//! Converts the GBK strings stored in QQwry files to UTF-8 and strips the
//! vendor placeholder values.

use crate::error::{IpdbError, Result};
use encoding_rs::GBK;

/// Placeholder the QQwry vendor writes where no detail exists
pub const SENTINEL: &str = "CZ88.NET";

/// Which record field a string came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Country,
    Area,
}

impl Field {
    fn decode_error(self) -> IpdbError {
        match self {
            Field::Country => IpdbError::DecodeCountry,
            Field::Area => IpdbError::DecodeArea,
        }
    }
}

/// Convert GBK encoded bytes to a UTF-8 string.
///
/// Malformed sequences are an error for `field`, never replaced.
pub fn gbk_to_utf8(data: &[u8], field: Field) -> Result<String> {
    if data.is_empty() {
        return Ok(String::new());
    }

    GBK.decode_without_bom_handling_and_without_replacement(data)
        .map(|text| text.into_owned())
        .ok_or_else(|| field.decode_error())
}

/// Trim a decoded value and blank it out when it is empty or the sentinel
pub fn normalize(value: &str) -> String {
    let cleaned = value.trim();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(SENTINEL) {
        return String::new();
    }
    cleaned.to_string()
}
