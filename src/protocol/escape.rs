//! Escaped-hex payload codec.
//!
//! AT boards carry binary payloads inside quoted arguments as `\XX` per byte
//! (two uppercase hex digits). Inbound payloads may mix escapes with literal
//! characters; a literal character stands for its own byte value.

use std::fmt::Write;

const ESCAPE: char = '\\';

/// `[0x00, 0x5C, 0x41]` becomes `\00\5C\41`.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for byte in data {
        let _ = write!(out, "\\{byte:02X}");
    }
    out
}

/// [`encode`] wrapped in double quotes, ready to use as a command argument.
pub fn quoted(data: &[u8]) -> String {
    format!("\"{}\"", encode(data))
}

/// Inverse of [`encode`], tolerant of unescaped characters.
///
/// A backslash not followed by two hex digits is taken literally.
pub fn decode(text: &str) -> Vec<u8> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == ESCAPE {
            if let Some(byte) = hex_pair(chars.get(i + 1), chars.get(i + 2)) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(u8::try_from(u32::from(chars[i])).unwrap_or(b'?'));
        i += 1;
    }
    out
}

fn hex_pair(high: Option<&char>, low: Option<&char>) -> Option<u8> {
    let high = high?.to_digit(16)?;
    let low = low?.to_digit(16)?;
    u8::try_from(high * 16 + low).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_encode_uppercase() {
        assert_eq!(encode(&[0x02, 0x01, 0x06, 0xab]), r"\02\01\06\AB");
        assert_eq!(quoted(&[0x31, 0x38]), r#""\31\38""#);
        assert_eq!(quoted(&[]), r#""""#);
    }

    #[test]
    fn test_decode_mixed_literals() {
        assert_eq!(
            decode(r"\00\01\02Hello"),
            vec![0x00, 0x01, 0x02, 0x48, 0x65, 0x6c, 0x6c, 0x6f]
        );
    }

    #[test]
    fn test_decode_lowercase_escape() {
        assert_eq!(decode(r"\0d\0a"), vec![0x0d, 0x0a]);
    }

    #[test]
    fn test_decode_malformed_escape_is_literal() {
        assert_eq!(decode(r"A\Z"), vec![b'A', b'\\', b'Z']);
        assert_eq!(decode("\\"), vec![b'\\']);
        assert_eq!(decode(r"\4"), vec![b'\\', b'4']);
    }

    #[test]
    fn test_decode_latin1_char() {
        assert_eq!(decode("\u{ff}"), vec![0xff]);
    }

    proptest! {
        #[test]
        fn prop_round_trip(data in prop::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(decode(&encode(&data)), data);
        }

        #[test]
        fn prop_marker_and_nul_survive(prefix in prop::collection::vec(any::<u8>(), 0..8)) {
            let mut data = prefix;
            data.extend_from_slice(&[0x00, 0x5C, 0x5C, 0x00]);
            prop_assert_eq!(decode(&encode(&data)), data);
        }
    }
}
