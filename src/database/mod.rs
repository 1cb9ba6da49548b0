//! Database module for ipservice
//!
//! # Module Organization
//!
//! - `source`: how the file bytes are held (heap buffer or memory map)
//! - `qqwry`: the QQwry format decoder

pub mod qqwry;
pub mod source;

pub use qqwry::{QQwryDatabase, RawRecord};
pub use source::{DatabaseSource, LoadMode};
