//! Inline annotation of IPv4 addresses found in free text

use once_cell::sync::Lazy;
use regex::Regex;

#[cfg(feature = "colored-output")]
use colored::Colorize;

/// IPv4 address regex
/// Matches standard IPv4 addresses like 192.168.1.1
pub static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)"
    )
    .expect("Failed to compile IPv4 regex")
});

/// Find all IPv4 addresses in text with their positions
pub fn find_ipv4(text: &str) -> Vec<(usize, usize, &str)> {
    IPV4_RE
        .find_iter(text)
        .map(|m| (m.start(), m.end(), m.as_str()))
        .collect()
}

/// Wrap location text in brackets, colored when requested
pub fn bracket(info: &str, use_color: bool) -> String {
    if use_color {
        #[cfg(feature = "colored-output")]
        {
            return format!("[{}]", info.green());
        }
    }
    format!("[{}]", info)
}

/// Insert `[location]` after every address that `describe` knows about.
///
/// Addresses `describe` returns `None` for are left untouched.
pub fn annotate_line<F>(line: &str, use_color: bool, mut describe: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(line.len() + 32);
    let mut last = 0;

    for (_, end, ip) in find_ipv4(line) {
        out.push_str(&line[last..end]);
        if let Some(info) = describe(ip) {
            out.push(' ');
            out.push_str(&bracket(&info, use_color));
        }
        last = end;
    }

    out.push_str(&line[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_regex() {
        let text = "Server IP: 192.168.1.1 and 8.8.8.8";
        let matches = find_ipv4(text);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].2, "192.168.1.1");
        assert_eq!(matches[1].2, "8.8.8.8");
    }

    #[test]
    fn test_invalid_ipv4() {
        assert!(find_ipv4("Invalid: 999.999.999.999").is_empty());
    }

    #[test]
    fn test_annotate_line() {
        let line = "from 1.0.0.5 to 9.9.9.9 done\n";
        let out = annotate_line(line, false, |ip| (ip == "1.0.0.5").then(|| "TestCountry TestArea".to_string()));
        assert_eq!(out, "from 1.0.0.5 [TestCountry TestArea] to 9.9.9.9 done\n");
    }

    #[test]
    fn test_annotate_plain_text() {
        let out = annotate_line("no addresses here", false, |_| Some("x".to_string()));
        assert_eq!(out, "no addresses here");
    }
}
