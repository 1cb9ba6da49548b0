//! Backing storage for a loaded database file

use crate::error::{IpdbError, Result};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// How the database file is brought into memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Read the whole file into a heap buffer
    #[default]
    Memory,
    /// Map the file read-only.
    ///
    /// The file must be replaced by rename, never truncated or rewritten in
    /// place while mapped.
    Mmap,
}

impl FromStr for LoadMode {
    type Err = IpdbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(LoadMode::Memory),
            "mmap" => Ok(LoadMode::Mmap),
            other => Err(IpdbError::config(format!("unknown load mode: {}", other))),
        }
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Memory => write!(f, "memory"),
            LoadMode::Mmap => write!(f, "mmap"),
        }
    }
}

/// Immutable bytes of one database file
pub enum DatabaseSource {
    Memory(Vec<u8>),
    Mapped(Mmap),
}

impl DatabaseSource {
    /// Load the file at `path` using the given mode
    pub fn load(path: &Path, mode: LoadMode) -> Result<Self> {
        match mode {
            LoadMode::Memory => Ok(DatabaseSource::Memory(std::fs::read(path)?)),
            LoadMode::Mmap => {
                let file = File::open(path)?;
                // The downloader replaces the file by rename, so an existing
                // mapping is never truncated underneath us.
                let mmap = unsafe { Mmap::map(&file) }?;
                Ok(DatabaseSource::Mapped(mmap))
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            DatabaseSource::Memory(data) => data,
            DatabaseSource::Mapped(mmap) => mmap,
        }
    }
}

impl From<Vec<u8>> for DatabaseSource {
    fn from(data: Vec<u8>) -> Self {
        DatabaseSource::Memory(data)
    }
}

impl fmt::Debug for DatabaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            DatabaseSource::Memory(_) => "Memory",
            DatabaseSource::Mapped(_) => "Mapped",
        };
        f.debug_struct("DatabaseSource")
            .field("kind", &kind)
            .field("len", &self.as_bytes().len())
            .finish()
    }
}
