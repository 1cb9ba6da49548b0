//! ipservice: offline IPv4 geolocation lookup over QQwry databases
//!
//! The [`database::qqwry`] decoder answers range queries against an
//! untrusted `qqwry.dat` buffer with every read bounds-checked. The
//! [`LookupService`] wraps it with GBK decoding, placeholder stripping and
//! hot reload.

pub mod cli;
pub mod config;
pub mod database;
pub mod download;
pub mod error;
pub mod service;
pub mod utils;

pub use database::{LoadMode, QQwryDatabase, RawRecord};
pub use error::{IpdbError, Result};
pub use service::{LookupResult, LookupService};
