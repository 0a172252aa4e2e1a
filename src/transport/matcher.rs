//! Blocking, timeout-bounded searches over the receive buffer.
//!
//! Every search rescans the full buffer snapshot. Matching never happens
//! under the buffer lock, so the background reader is never stalled by a
//! slow pattern.

use super::buffer::TransportBuffer;
use regex::{Captures, Regex, RegexBuilder};
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Build a pattern in the matcher's mode: `.` also matches line terminators.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()
}

/// A compiled-once pattern for a string literal.
macro_rules! pattern {
    ($src:expr) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
            $crate::transport::compile($src).expect("built-in pattern must compile")
        });
        &*RE
    }};
}
pub(crate) use pattern;

/// Captured groups of one match, excluding the whole-match group.
///
/// Index 0 is the first parenthesised group. Groups that did not take part
/// in the match are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Groups(Vec<Option<String>>);

impl Groups {
    fn from_captures(caps: &Captures<'_>) -> Self {
        Self(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_owned()))
                .collect(),
        )
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|g| g.as_deref())
    }

    /// Parse a group with `FromStr`.
    pub fn parse<T: FromStr>(&self, index: usize) -> Option<T> {
        self.get(index).and_then(|s| s.parse().ok())
    }

    /// Parse a group written in hexadecimal.
    pub fn parse_hex(&self, index: usize) -> Option<u32> {
        self.get(index)
            .and_then(|s| u32::from_str_radix(s, 16).ok())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Polling search primitives bound to one buffer.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    buffer: Arc<TransportBuffer>,
    poll_interval: Duration,
}

impl PatternMatcher {
    pub fn new(buffer: Arc<TransportBuffer>, poll_interval: Duration) -> Self {
        Self {
            buffer,
            // never spin, never sleep longer than the documented 100 ms
            poll_interval: poll_interval.clamp(Duration::from_millis(1), Duration::from_millis(100)),
        }
    }

    /// Run `probe` until it yields a value or `timeout` elapses.
    ///
    /// The probe always runs at least once and once more at the deadline.
    pub fn poll<T>(&self, timeout: Duration, mut probe: impl FnMut() -> Option<T>) -> Option<T> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(found) = probe() {
                return Some(found);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }

    /// First match of `pattern`, waiting up to `timeout` for it to appear.
    pub fn search_first(&self, pattern: &Regex, timeout: Duration) -> Option<Groups> {
        self.search_first_where(pattern, timeout, |_| true)
    }

    /// First match of `pattern` whose groups satisfy `accept`.
    pub fn search_first_where(
        &self,
        pattern: &Regex,
        timeout: Duration,
        accept: impl Fn(&Groups) -> bool,
    ) -> Option<Groups> {
        self.poll(timeout, || {
            let text = self.buffer.snapshot();
            pattern
                .captures_iter(&text)
                .map(|caps| Groups::from_captures(&caps))
                .find(|groups| accept(groups))
        })
    }

    /// Every non-overlapping match, in order, after waiting the full `timeout`.
    ///
    /// Asynchronous events can arrive at any point in the window, so this
    /// never returns early.
    pub fn search_all(&self, pattern: &Regex, timeout: Duration) -> Vec<Groups> {
        if !timeout.is_zero() {
            thread::sleep(timeout);
        }
        let text = self.buffer.snapshot();
        pattern
            .captures_iter(&text)
            .map(|caps| Groups::from_captures(&caps))
            .collect()
    }

    /// Most recent line starting with `prefix`, trimmed.
    ///
    /// Lines that are blank after trimming are ignored.
    pub fn line_starts_with(&self, prefix: &str, timeout: Duration) -> Option<String> {
        self.poll(timeout, || {
            self.buffer
                .lines()
                .iter()
                .rev()
                .filter(|line| line.starts_with(prefix))
                .map(|line| line.trim())
                .find(|line| !line.is_empty())
                .map(str::to_owned)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matcher_with(data: &[u8]) -> PatternMatcher {
        let buffer = Arc::new(TransportBuffer::new());
        buffer.append(data);
        PatternMatcher::new(buffer, Duration::from_millis(5))
    }

    #[test]
    fn test_search_first_returns_groups() {
        let matcher = matcher_with(b"+SRBLECFG: 2,1,\"00:11:22:33:44:55\",23\r\nOK\r\n");
        let groups = matcher
            .search_first(pattern!(r#"\+SRBLECFG: (\d+),([0|1]),"([\w|:]{17})",(\d+)"#), Duration::ZERO)
            .unwrap();

        assert_eq!(groups.parse::<u32>(0), Some(2));
        assert_eq!(groups.get(2), Some("00:11:22:33:44:55"));
        assert_eq!(groups.parse::<u16>(3), Some(23));
        assert_eq!(groups.len(), 4);
    }

    #[test]
    fn test_dot_matches_line_terminators() {
        let matcher = matcher_with(b"Melody Audio Copyright 2018\rRelease 7.2\rBuild: 1234\r");
        let groups = matcher
            .search_first(
                pattern!(r"([\w| ]+) Copyright 2018\r([\w| |\.]+)\rBuild: (\d+)"),
                Duration::ZERO,
            )
            .unwrap();
        assert_eq!(groups.get(1), Some("Release 7.2"));

        let matcher = matcher_with(b"+SRREMCMD: \"VOL\r\nUP\"\r\n");
        let plain = Regex::new(r#"\+SRREMCMD: "(.+)""#).unwrap();
        assert!(!plain.is_match(&matcher.buffer.snapshot()));
        let groups = matcher
            .search_first(pattern!(r#"\+SRREMCMD: "(.+)""#), Duration::ZERO)
            .unwrap();
        assert_eq!(groups.get(0), Some("VOL\r\nUP"));
    }

    #[test]
    fn test_search_first_absent_after_timeout() {
        let matcher = matcher_with(b"OK\r\n");
        let started = Instant::now();
        let found = matcher.search_first(pattern!(r"\+IPR: (\d+)"), Duration::from_millis(30));
        assert!(found.is_none());
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_search_first_is_stable_without_new_data() {
        let matcher = matcher_with(b"+KGPIO: 3, 1\r\n+KGPIO: 4, 0\r\n");
        let re = pattern!(r"\+KGPIO: (\d+), (\d)");
        let first = matcher.search_first(re, Duration::ZERO);
        let second = matcher.search_first(re, Duration::from_millis(10));
        assert_eq!(first, second);
        assert_eq!(first.unwrap().get(0), Some("3"));
    }

    #[test]
    fn test_search_first_where_skips_rejected_matches() {
        let matcher = matcher_with(b"+SRBLE_IND: 1,0,19\r\n+SRBLE_IND: 2,0,19\r\n");
        let groups = matcher
            .search_first_where(pattern!(r"\+SRBLE_IND: (\d+),(0),(\d+)"), Duration::ZERO, |g| {
                g.parse::<u32>(0) == Some(2)
            })
            .unwrap();
        assert_eq!(groups.get(0), Some("2"));
    }

    #[test]
    fn test_search_all_in_order() {
        let matcher = matcher_with(b"+KGPIO: 3, 1\r\nnoise\r\n+KGPIO: 4, 0\r\n+KGPIO: 3, 0\r\n");
        let all = matcher.search_all(pattern!(r"\+KGPIO: (\d+), (\d)"), Duration::ZERO);
        let pins: Vec<_> = all.iter().map(|g| g.get(0).unwrap().to_string()).collect();
        assert_eq!(pins, vec!["3", "4", "3"]);
    }

    #[test]
    fn test_search_all_waits_full_timeout() {
        let buffer = Arc::new(TransportBuffer::new());
        let matcher = PatternMatcher::new(buffer.clone(), Duration::from_millis(5));
        let feeder = {
            let buffer = buffer.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                buffer.append(b"+KGPIO: 1, 1\r\n");
            })
        };
        let all = matcher.search_all(pattern!(r"\+KGPIO: (\d+), (\d)"), Duration::from_millis(80));
        feeder.join().unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_line_starts_with_prefers_most_recent() {
        let matcher = matcher_with(b"ERROR\r\nOK\r\n\r\nOK again\r\n");
        assert_eq!(
            matcher.line_starts_with("OK", Duration::ZERO),
            Some("OK again".to_string())
        );
        assert_eq!(
            matcher.line_starts_with("ERROR", Duration::ZERO),
            Some("ERROR".to_string())
        );
        assert_eq!(matcher.line_starts_with("READY", Duration::ZERO), None);
    }

    #[test]
    fn test_line_starts_with_ignores_blank_lines() {
        let matcher = matcher_with(b"\r\n \r\n");
        assert_eq!(matcher.line_starts_with("", Duration::ZERO), None);
    }

    #[test]
    fn test_groups_optional_and_hex() {
        let matcher = matcher_with(b"OPEN_OK 14 BLE 0011223344AA\r");
        let groups = matcher
            .search_first(pattern!(r"OPEN_OK (\d4) BLE (\w{12})(,x)?\r"), Duration::ZERO)
            .unwrap();
        assert_eq!(groups.parse_hex(0), Some(0x14));
        assert_eq!(groups.get(2), None);
        assert_eq!(groups.len(), 3);
    }
}
