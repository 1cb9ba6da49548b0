//! QQwry database implementation
//!
//! This module implements support for the QQwry IPv4 database format,
//! the most commonly used Chinese IP geolocation database.
//!
//! # File layout
//!
//! All integers are little-endian; pointers are 3 bytes wide.
//!
//! ```text
//! [index_start: u32][index_end: u32]       header
//! [end_ip: u32][mode / country ...]        records + string pool
//! [start_ip: u32][record: u24] ...         index, sorted by start_ip
//! ```
//!
//! A record's body is either a `0x00` tag followed by the country string
//! (older files omit the tag and start with the text), a `0x02` pointer
//! to the country followed by the area, or a `0x01` pointer to a shared
//! country/area block. Area fields may carry their own `0x01`/`0x02`
//! pointer, where a pointer of zero means no area. Strings are GBK.

mod database;
mod reader;
mod record;

#[cfg(test)]
pub(crate) mod fixture;

pub use database::{Header, QQwryDatabase, RawRecord, INDEX_ENTRY_LEN};
pub use reader::{ByteView, DIRECT_MODE, REDIRECT_MODE_1, REDIRECT_MODE_2};
pub use record::RecordLayout;
