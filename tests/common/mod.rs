//! Helpers for writing small QQwry files in integration tests

use std::net::Ipv4Addr;
use std::path::Path;

/// Network-order value of a dotted IPv4 address
pub fn ip(text: &str) -> u32 {
    u32::from(text.parse::<Ipv4Addr>().unwrap())
}

/// Build a file of `0x00`-tagged direct records: `(start, end, country, area)`
pub fn build(ranges: &[(&str, &str, &str, &str)]) -> Vec<u8> {
    let mut data = vec![0u8; 8];
    let mut index = Vec::new();

    for (start, end, country, area) in ranges {
        let offset = data.len() as u32;
        data.extend_from_slice(&ip(end).to_le_bytes());
        data.push(0x00);
        data.extend_from_slice(country.as_bytes());
        data.push(0);
        data.extend_from_slice(area.as_bytes());
        data.push(0);
        index.push((ip(start), offset));
    }

    index.sort_by_key(|&(start, _)| start);
    let index_start = data.len() as u32;
    for (start, offset) in &index {
        data.extend_from_slice(&start.to_le_bytes());
        data.extend_from_slice(&offset.to_le_bytes()[..3]);
    }
    let index_end = index_start + (index.len() as u32 - 1) * 7;
    data[0..4].copy_from_slice(&index_start.to_le_bytes());
    data[4..8].copy_from_slice(&index_end.to_le_bytes());
    data
}

/// Replace `path` by writing a sibling file and renaming it over the target
pub fn replace(path: &Path, data: &[u8]) {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data).unwrap();
    std::fs::rename(&tmp, path).unwrap();
}
