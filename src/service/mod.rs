//! Lookup service
//!
//! Owns the current [`QQwryDatabase`] behind a swappable handle and turns raw
//! records into normalized [`LookupResult`]s.
//!
//! # Thread Safety
//!
//! `LookupService` is `Send + Sync`. Lookups clone the current `Arc` under a
//! read lock and release the lock before searching, so they never block each
//! other. [`LookupService::reload`] parses the new file without holding any
//! lock and takes the write lock only to swap the handle; lookups already
//! running finish against the previous database, which is dropped with its
//! last `Arc`.

use crate::database::{LoadMode, QQwryDatabase};
use crate::error::{IpdbError, Result};
use crate::utils::encoding::{Field, gbk_to_utf8, normalize};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Normalized answer for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    /// The address text as supplied by the caller
    pub ip: String,
    pub country: String,
    pub area: String,
}

pub struct LookupService {
    path: PathBuf,
    load_mode: LoadMode,
    current: RwLock<Arc<QQwryDatabase>>,
}

impl LookupService {
    /// Load the database at `path` and build a service around it
    pub fn open(path: impl Into<PathBuf>, load_mode: LoadMode) -> Result<Self> {
        let path = path.into();
        let database = load(&path, load_mode)?;
        Ok(Self::with_database(path, load_mode, database))
    }

    /// Build a service around an already parsed database.
    ///
    /// `path` is only used by [`reload`](Self::reload).
    pub fn with_database(path: impl Into<PathBuf>, load_mode: LoadMode, database: QQwryDatabase) -> Self {
        Self {
            path: path.into(),
            load_mode,
            current: RwLock::new(Arc::new(database)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle to the database currently serving lookups
    pub fn current(&self) -> Arc<QQwryDatabase> {
        // the guarded value is a single Arc, valid even after a panic elsewhere
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Resolve `ip_text` to its country and area
    pub fn lookup(&self, ip_text: &str) -> Result<LookupResult> {
        let address = parse_ipv4(ip_text)?;
        let database = self.current();
        let raw = database.lookup_raw(u32::from(address))?;

        let country = gbk_to_utf8(raw.country, Field::Country)?;
        let area = match raw.area {
            Some(bytes) => gbk_to_utf8(bytes, Field::Area)?,
            None => String::new(),
        };

        Ok(LookupResult {
            ip: ip_text.to_string(),
            country: normalize(&country),
            area: normalize(&area),
        })
    }

    /// Re-read the database file and swap it in.
    ///
    /// On failure the current database stays in place.
    pub fn reload(&self) -> Result<()> {
        let database = match load(&self.path, self.load_mode) {
            Ok(database) => Arc::new(database),
            Err(e) => {
                log::warn!("Reload of {:?} failed, keeping current database: {}", self.path, e);
                return Err(e);
            }
        };

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = database;
        drop(guard);

        log::info!("Reloaded QQwry database from {:?}", self.path);
        Ok(())
    }
}

fn load(path: &Path, load_mode: LoadMode) -> Result<QQwryDatabase> {
    log::info!("Loading QQwry database from: {:?} ({})", path, load_mode);
    let database = QQwryDatabase::open(path, load_mode)?;
    let header = database.header();
    log::info!(
        "Successfully loaded QQwry database: {} records, {} bytes, index at {:#x}..{:#x}",
        database.record_count(),
        database.size(),
        header.index_start,
        header.index_end
    );
    Ok(database)
}

/// Parse dotted IPv4 text.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are accepted as IPv4.
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr> {
    let address: IpAddr = text
        .parse()
        .map_err(|_| IpdbError::InvalidAddress(text.to_string()))?;

    match address {
        IpAddr::V4(v4) => Ok(v4),
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .ok_or_else(|| IpdbError::AddressFamilyUnsupported(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::qqwry::fixture::{FixtureBuilder, ip, u24};

    fn service(data: Vec<u8>) -> LookupService {
        let database = QQwryDatabase::from_bytes(data).unwrap();
        LookupService::with_database("unused.dat", LoadMode::Memory, database)
    }

    #[test]
    fn test_round_trip() {
        let mut b = FixtureBuilder::new();
        b.direct(ip("1.0.0.0"), ip("1.0.0.255"), b"TestCountry", b"TestArea");
        let result = service(b.finish()).lookup("1.0.0.5").unwrap();
        assert_eq!(
            result,
            LookupResult {
                ip: "1.0.0.5".to_string(),
                country: "TestCountry".to_string(),
                area: "TestArea".to_string(),
            }
        );
    }

    #[test]
    fn test_tagged_direct_record() {
        let mut b = FixtureBuilder::new();
        b.record(ip("1.0.0.0"), ip("1.0.0.255"), b"\x00TestCountry\x00TestArea\x00");
        let result = service(b.finish()).lookup("1.0.0.5").unwrap();
        assert_eq!(result.country, "TestCountry");
        assert_eq!(result.area, "TestArea");
    }

    #[test]
    fn test_modes_give_identical_results() {
        let mut b = FixtureBuilder::new();
        b.record(ip("1.0.0.0"), ip("1.0.0.255"), b"\x00TestCountry\x00TestArea\x00");

        let block = b.raw(b"TestCountry\0TestArea\0");
        let mut body = vec![0x01];
        body.extend_from_slice(&u24(block));
        b.record(ip("2.0.0.0"), ip("2.0.0.255"), &body);

        let country = b.cstr(b"TestCountry");
        let mut body = vec![0x02];
        body.extend_from_slice(&u24(country));
        body.extend_from_slice(b"TestArea\0");
        b.record(ip("3.0.0.0"), ip("3.0.0.255"), &body);

        let svc = service(b.finish());
        for address in ["1.0.0.5", "2.0.0.5", "3.0.0.5"] {
            let result = svc.lookup(address).unwrap();
            assert_eq!(result.country, "TestCountry", "{}", address);
            assert_eq!(result.area, "TestArea", "{}", address);
        }
    }

    #[test]
    fn test_gbk_and_sentinel() {
        let mut b = FixtureBuilder::new();
        b.direct(ip("1.0.0.0"), ip("1.0.0.255"), &[0xD6, 0xD0, 0xB9, 0xFA], b" CZ88.NET");
        let result = service(b.finish()).lookup("1.0.0.1").unwrap();
        assert_eq!(result.country, "中国");
        assert_eq!(result.area, "");
    }

    #[test]
    fn test_decode_errors() {
        let mut b = FixtureBuilder::new();
        b.direct(ip("1.0.0.0"), ip("1.0.0.255"), &[b'A', 0xFF], b"ok");
        b.direct(ip("2.0.0.0"), ip("2.0.0.255"), b"ok", &[0xFF]);
        let svc = service(b.finish());
        assert!(matches!(svc.lookup("1.0.0.1"), Err(IpdbError::DecodeCountry)));
        assert!(matches!(svc.lookup("2.0.0.1"), Err(IpdbError::DecodeArea)));
    }

    #[test]
    fn test_address_errors() {
        let mut b = FixtureBuilder::new();
        b.direct(ip("1.0.0.0"), ip("1.0.0.255"), b"C", b"A");
        let svc = service(b.finish());
        assert!(matches!(svc.lookup("::1"), Err(IpdbError::AddressFamilyUnsupported(_))));
        assert!(matches!(svc.lookup("not-an-ip"), Err(IpdbError::InvalidAddress(_))));
        assert!(matches!(svc.lookup(""), Err(IpdbError::InvalidAddress(_))));
        assert!(matches!(svc.lookup("1.0.0.256"), Err(IpdbError::InvalidAddress(_))));
        assert!(matches!(svc.lookup("3.0.0.0"), Err(IpdbError::NotFound)));
    }

    #[test]
    fn test_ipv4_mapped() {
        assert_eq!(parse_ipv4("::ffff:1.0.0.5").unwrap(), Ipv4Addr::new(1, 0, 0, 5));
        let mut b = FixtureBuilder::new();
        b.direct(ip("1.0.0.0"), ip("1.0.0.255"), b"C", b"A");
        let result = service(b.finish()).lookup("::ffff:1.0.0.5").unwrap();
        assert_eq!(result.ip, "::ffff:1.0.0.5");
        assert_eq!(result.country, "C");
    }

    #[test]
    fn test_reload_missing_file_keeps_database() {
        let mut b = FixtureBuilder::new();
        b.direct(ip("1.0.0.0"), ip("1.0.0.255"), b"Old", b"");
        let dir = tempfile::tempdir().unwrap();
        let database = QQwryDatabase::from_bytes(b.finish()).unwrap();
        let svc = LookupService::with_database(dir.path().join("gone.dat"), LoadMode::Memory, database);
        assert_eq!(svc.path(), dir.path().join("gone.dat"));

        assert!(matches!(svc.reload(), Err(IpdbError::Io(_))));
        assert_eq!(svc.lookup("1.0.0.1").unwrap().country, "Old");
    }

    #[test]
    fn test_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LookupService>();
        assert_send_sync::<QQwryDatabase>();
    }
}
