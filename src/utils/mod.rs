//! Shared helpers for text decoding and path handling

pub mod encoding;
pub mod path;
