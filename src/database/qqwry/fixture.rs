//! Synthetic QQwry files for tests

/// Builds a database image: header, then records and string pool in
/// insertion order, then the index sorted by start IP.
pub struct FixtureBuilder {
    data: Vec<u8>,
    entries: Vec<(u32, u32)>,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self {
            data: vec![0; 8],
            entries: Vec::new(),
        }
    }

    /// Append raw bytes to the pool and return their offset
    pub fn raw(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(bytes);
        offset
    }

    /// Append a null-terminated string and return its offset
    pub fn cstr(&mut self, text: &[u8]) -> u32 {
        let offset = self.raw(text);
        self.data.push(0);
        offset
    }

    /// Append a record `end_ip` + `body` and index it under `start_ip`
    pub fn record(&mut self, start_ip: u32, end_ip: u32, body: &[u8]) -> u32 {
        let offset = self.raw(&end_ip.to_le_bytes());
        self.raw(body);
        self.entries.push((start_ip, offset));
        offset
    }

    /// Append a `0x00`-tagged record with inline country and area
    pub fn direct(&mut self, start_ip: u32, end_ip: u32, country: &[u8], area: &[u8]) -> u32 {
        let mut body = vec![0x00];
        body.extend_from_slice(country);
        body.push(0);
        body.extend_from_slice(area);
        body.push(0);
        self.record(start_ip, end_ip, &body)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.entries.sort_by_key(|&(start, _)| start);
        let index_start = self.data.len() as u32;
        for (start, offset) in &self.entries {
            self.data.extend_from_slice(&start.to_le_bytes());
            self.data.extend_from_slice(&u24(*offset));
        }
        let index_end = index_start + (self.entries.len().max(1) as u32 - 1) * 7;
        self.data[0..4].copy_from_slice(&index_start.to_le_bytes());
        self.data[4..8].copy_from_slice(&index_end.to_le_bytes());
        self.data
    }
}

pub fn u24(value: u32) -> [u8; 3] {
    let b = value.to_le_bytes();
    [b[0], b[1], b[2]]
}

/// Network-order value of a dotted IPv4 address
pub fn ip(text: &str) -> u32 {
    u32::from(text.parse::<std::net::Ipv4Addr>().unwrap())
}
