//! Bluetooth address wire forms.
//!
//! The canonical form is `XX:XX:XX:XX:XX:XX` in uppercase. Boards differ:
//! BC310X answers uppercase, BX310X expects and answers lowercase, BC127
//! drops the colons (`001122AABBCC`).

/// Whether `addr` is six colon-separated hex octets.
pub fn is_colon_form(addr: &str) -> bool {
    let bytes = addr.as_bytes();
    bytes.len() == 17
        && bytes.iter().enumerate().all(|(i, b)| {
            if i % 3 == 2 {
                *b == b':'
            } else {
                b.is_ascii_hexdigit()
            }
        })
}

pub fn to_canonical(addr: &str) -> String {
    addr.to_ascii_uppercase()
}

pub fn to_lowercase(addr: &str) -> String {
    addr.to_ascii_lowercase()
}

/// `00:11:22:AA:BB:CC` to `001122AABBCC`.
pub fn to_compact(addr: &str) -> String {
    addr.replace(':', "")
}

/// `001122AABBCC` to `00:11:22:AA:BB:CC`. Colon forms pass through.
pub fn from_compact(addr: &str) -> String {
    if addr.contains(':') {
        return to_canonical(addr);
    }
    let chars: Vec<char> = addr.chars().collect();
    chars
        .chunks(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(":")
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colon_form_validation() {
        assert!(is_colon_form("20:FA:BB:00:01:80"));
        assert!(is_colon_form("20:fa:bb:00:01:80"));
        assert!(!is_colon_form("20FABB000180"));
        assert!(!is_colon_form("20:FA:BB:00:01:8G"));
        assert!(!is_colon_form("20-FA-BB-00-01-80"));
        assert!(!is_colon_form(""));
    }

    #[test]
    fn test_compact_forms() {
        assert_eq!(to_compact("00:11:22:AA:BB:CC"), "001122AABBCC");
        assert_eq!(from_compact("001122aabbcc"), "00:11:22:AA:BB:CC");
        assert_eq!(from_compact("00:11:22:aa:bb:cc"), "00:11:22:AA:BB:CC");
    }

    #[test]
    fn test_case_forms() {
        assert_eq!(to_lowercase("20:FA:BB:00:01:80"), "20:fa:bb:00:01:80");
        assert_eq!(to_canonical("20:fa:bb:00:01:80"), "20:FA:BB:00:01:80");
    }
}
