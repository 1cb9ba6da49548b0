//! QQwry database implementation core

use crate::database::source::{DatabaseSource, LoadMode};
use crate::error::{IpdbError, Result};
use std::net::Ipv4Addr;
use std::path::Path;

use super::reader::ByteView;
use super::record::RecordLayout;

/// 4 bytes start IP + 3 bytes record offset
pub const INDEX_ENTRY_LEN: u32 = 7;

/// Index region bounds stored in the first 8 bytes of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub index_start: u32,
    /// Offset of the last index entry
    pub index_end: u32,
}

impl Header {
    pub const LEN: usize = 8;

    fn parse(view: ByteView<'_>) -> Result<Self> {
        if view.len() < Self::LEN {
            return Err(IpdbError::Format("file too small"));
        }

        let index_start = view.read_u32(0)?;
        let index_end = view.read_u32(4)?;
        if index_end < index_start {
            return Err(IpdbError::Format("index end precedes index start"));
        }

        // the last entry must fit; everything else is checked on lookup
        if (index_end as usize).saturating_add(INDEX_ENTRY_LEN as usize) > view.len() {
            return Err(IpdbError::Format("index region exceeds file"));
        }

        Ok(Self {
            index_start,
            index_end,
        })
    }

    pub fn entry_count(&self) -> u32 {
        (self.index_end - self.index_start) / INDEX_ENTRY_LEN + 1
    }
}

/// One 7-byte index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexEntry {
    start_ip: u32,
    record_offset: u32,
}

/// Raw, undecoded answer for one address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub start_ip: Ipv4Addr,
    pub end_ip: Ipv4Addr,
    /// GBK bytes of the country field
    pub country: &'a [u8],
    /// GBK bytes of the area field, `None` when the record has no area
    pub area: Option<&'a [u8]>,
}

/// QQwry database implementation
///
/// Holds an immutable buffer and answers range-containment queries over it.
/// Only the header is validated at construction; every other read is
/// bounds-checked when a lookup touches it.
#[derive(Debug)]
pub struct QQwryDatabase {
    source: DatabaseSource,
    header: Header,
}

impl QQwryDatabase {
    /// Parse a database from an in-memory buffer
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_source(DatabaseSource::Memory(data))
    }

    pub fn from_source(source: DatabaseSource) -> Result<Self> {
        let header = Header::parse(ByteView::new(source.as_bytes()))?;
        Ok(Self { source, header })
    }

    /// Load and parse the file at `path`
    pub fn open(path: &Path, mode: LoadMode) -> Result<Self> {
        Self::from_source(DatabaseSource::load(path, mode)?)
    }

    pub fn header(&self) -> Header {
        self.header
    }

    /// Number of IP ranges in the index
    pub fn record_count(&self) -> u32 {
        self.header.entry_count()
    }

    /// Size of the underlying buffer in bytes
    pub fn size(&self) -> usize {
        self.source.as_bytes().len()
    }

    fn view(&self) -> ByteView<'_> {
        ByteView::new(self.source.as_bytes())
    }

    fn entry_at(&self, view: ByteView<'_>, position: u32) -> Result<IndexEntry> {
        let offset = self.header.index_start + position * INDEX_ENTRY_LEN;
        Ok(IndexEntry {
            start_ip: view.read_u32(offset)?,
            record_offset: view.read_u24(offset + 4)?,
        })
    }

    /// Binary search for the entry whose `[start_ip, end_ip]` contains `ip`.
    ///
    /// Returns the entry together with its `end_ip`.
    fn search(&self, view: ByteView<'_>, ip: u32) -> Result<(IndexEntry, u32)> {
        let mut left = 0u32;
        let mut right = self.header.entry_count() - 1;

        while left <= right {
            let mid = left + (right - left) / 2;
            let entry = self.entry_at(view, mid)?;
            let end_ip = view.read_u32(entry.record_offset)?;

            if ip < entry.start_ip {
                // nothing below the first entry
                if mid == 0 {
                    break;
                }
                right = mid - 1;
            } else if ip > end_ip {
                left = mid + 1;
            } else {
                return Ok((entry, end_ip));
            }
        }

        Err(IpdbError::NotFound)
    }

    /// Look up an IPv4 address given as its network-order `u32` value.
    ///
    /// Returns the raw country and area bytes of the containing range.
    pub fn lookup_raw(&self, ip: u32) -> Result<RawRecord<'_>> {
        let view = self.view();
        let (entry, end_ip) = self.search(view, ip)?;
        let (country, area) = RecordLayout::read(view, entry.record_offset)?.resolve(view)?;

        Ok(RawRecord {
            start_ip: Ipv4Addr::from(entry.start_ip),
            end_ip: Ipv4Addr::from(end_ip),
            country,
            area,
        })
    }
}
