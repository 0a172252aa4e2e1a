//! Line-oriented receive buffer shared with the background reader.
//!
//! Bytes are decoded one char per byte (ISO-8859-1), so the buffer holds the
//! exact received stream even when boards emit raw binary between text lines.

use memchr::memchr2;
use parking_lot::Mutex;

/// Everything received since the last [`TransportBuffer::clear`], split into
/// lines that keep their terminators. Only the last entry may be incomplete.
#[derive(Debug, Default)]
pub struct TransportBuffer {
    lines: Mutex<Vec<String>>,
}

impl TransportBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a received chunk.
    ///
    /// The previous trailing entry is re-split together with the new bytes,
    /// so a line cut anywhere (including between `\r` and `\n`) is rejoined.
    /// Returns the lines that became complete with this chunk, for mirroring
    /// to the diagnostic log.
    pub fn append(&self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }

        let mut lines = self.lines.lock();
        let (mut pending, tail_was_complete) = match lines.pop() {
            Some(last) => {
                let complete = is_terminated(&last);
                (last, complete)
            }
            None => (String::new(), false),
        };
        pending.extend(chunk.iter().map(|&b| char::from(b)));

        let pieces: Vec<String> = split_keep_ends(&pending)
            .into_iter()
            .map(str::to_owned)
            .collect();

        let completed = pieces
            .iter()
            .enumerate()
            // a tail that was already terminated has been reported before
            .filter(|(i, piece)| is_terminated(piece) && !(*i == 0 && tail_was_complete))
            .map(|(_, piece)| piece.clone())
            .collect();

        lines.extend(pieces);
        completed
    }

    /// Drop everything received so far.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    /// The whole buffer as one string. The lock is held only for the copy.
    pub fn snapshot(&self) -> String {
        self.lines.lock().concat()
    }

    /// Copy of the individual lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

fn is_terminated(line: &str) -> bool {
    line.ends_with('\n') || line.ends_with('\r')
}

/// Split after every `\r\n`, `\n` or lone `\r`, keeping the terminators.
fn split_keep_ends(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;

    while let Some(offset) = memchr2(b'\r', b'\n', &bytes[start..]) {
        let mut end = start + offset + 1;
        if bytes[end - 1] == b'\r' && bytes.get(end) == Some(&b'\n') {
            end += 1;
        }
        pieces.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_split_keep_ends() {
        assert_eq!(
            split_keep_ends("OK\r\nERROR\rREADY\npartial"),
            vec!["OK\r\n", "ERROR\r", "READY\n", "partial"]
        );
        assert!(split_keep_ends("").is_empty());
    }

    #[test]
    fn test_partial_line_is_extended() {
        let buffer = TransportBuffer::new();
        assert!(buffer.append(b"+FMI: Ac").is_empty());
        let done = buffer.append(b"me Corp\r\nO");

        assert_eq!(done, vec!["+FMI: Acme Corp\r\n".to_string()]);
        assert_eq!(buffer.lines(), vec!["+FMI: Acme Corp\r\n", "O"]);
    }

    #[test]
    fn test_cr_lf_split_across_chunks_is_one_line() {
        let buffer = TransportBuffer::new();
        assert_eq!(buffer.append(b"OK\r"), vec!["OK\r".to_string()]);
        // the rejoined "OK\r\n" was already reported as "OK\r"
        assert!(buffer.append(b"\n").is_empty());
        assert_eq!(buffer.lines(), vec!["OK\r\n"]);
    }

    #[test]
    fn test_complete_lines_are_never_merged() {
        let buffer = TransportBuffer::new();
        buffer.append(b"LINE1\r\n");
        buffer.append(b"LINE2\r\n");
        assert_eq!(buffer.lines(), vec!["LINE1\r\n", "LINE2\r\n"]);
    }

    #[test]
    fn test_binary_bytes_survive() {
        let buffer = TransportBuffer::new();
        buffer.append(&[0x00, 0xFF, b'\\', 0x80]);
        let text = buffer.snapshot();
        let bytes: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
        assert_eq!(bytes, vec![0x00, 0xFF, b'\\', 0x80]);
    }

    #[test]
    fn test_clear_then_snapshot_is_empty() {
        let buffer = TransportBuffer::new();
        buffer.append(b"+SRBLE_IND: 1,1\r\n");
        buffer.clear();
        assert_eq!(buffer.snapshot(), "");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear_races_with_reader() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let buffer = TransportBuffer::new();
        let stop = AtomicBool::new(false);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                let mut n = 0u32;
                // bounded so a failed assertion cannot leave the scope waiting
                while n < 1_000_000 && !stop.load(Ordering::Relaxed) {
                    buffer.append(format!("{n:06}\r\n").as_bytes());
                    n += 1;
                }
            });

            let mut newest_cleared = None;
            for _ in 0..500 {
                {
                    let mut lines = buffer.lines.lock();
                    lines.clear();
                    assert_eq!(lines.concat(), "");
                }
                buffer.clear();
                let snapshot = buffer.snapshot();

                // only whole lines appended after the clear, in order
                let numbers: Vec<u32> = split_keep_ends(&snapshot)
                    .into_iter()
                    .map(|line| {
                        assert_eq!(line.len(), 8, "torn line {line:?}");
                        line.trim_end().parse().unwrap()
                    })
                    .collect();
                assert!(numbers.windows(2).all(|w| w[1] == w[0] + 1));
                if let (Some(first), Some(cleared)) = (numbers.first(), newest_cleared) {
                    assert!(*first > cleared, "{first} survived a clear");
                }
                if let Some(last) = numbers.last() {
                    newest_cleared = Some(*last);
                }
            }
            stop.store(true, Ordering::Relaxed);
        });
    }

    proptest! {
        #[test]
        fn prop_snapshot_is_concatenation(chunks in prop::collection::vec(
            prop::collection::vec(any::<u8>(), 0..24), 0..16)
        ) {
            let buffer = TransportBuffer::new();
            let mut expected = String::new();
            for chunk in &chunks {
                buffer.append(chunk);
                expected.extend(chunk.iter().map(|&b| char::from(b)));
            }
            prop_assert_eq!(buffer.snapshot(), expected);
        }

        #[test]
        fn prop_only_last_line_is_partial(chunks in prop::collection::vec(
            "[A-Z\r\n]{0,12}", 1..12)
        ) {
            let buffer = TransportBuffer::new();
            for chunk in &chunks {
                buffer.append(chunk.as_bytes());
            }
            let lines = buffer.lines();
            if let Some((_, head)) = lines.split_last() {
                for line in head {
                    prop_assert!(is_terminated(line));
                    // a terminator only ever appears at the end of an entry
                    let body = line.trim_end_matches(['\r', '\n']);
                    prop_assert!(!body.contains('\r') && !body.contains('\n'));
                }
            }
        }
    }
}
