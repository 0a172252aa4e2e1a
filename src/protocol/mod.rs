//! Command round-trip and status-line classification.
//!
//! Every command goes through the same steps: clear the receive buffer,
//! write the command line, then race the board's status rules against the
//! buffer until one matches or the budget runs out. The outcome is always
//! exactly one [`CommandResult`].

pub mod address;
pub mod escape;

use crate::transport::{pattern, SerialTransport};
use std::time::Duration;
use tracing::{debug, warn};

/// Line terminator expected by all supported boards.
pub const EOL: &str = "\r";

/// Outcome of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Success,
    /// Plain `ERROR` (or a board-specific error token).
    Error,
    /// Structured `+CME ERROR: <code>` reply; the code when one was printed.
    ProtocolError(Option<u32>),
    /// No status line within the budget, or the command never left the host.
    Timeout,
}

impl CommandResult {
    pub fn is_success(self) -> bool {
        self == CommandResult::Success
    }
}

/// One status token and the outcome it stands for.
///
/// Rules are checked in order against the most recent line carrying each
/// prefix; the first rule with a matching line decides the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusRule {
    Success(String),
    Error(String),
    ProtocolError(String),
}

impl StatusRule {
    pub fn success(prefix: impl Into<String>) -> Self {
        Self::Success(prefix.into())
    }

    pub fn error(prefix: impl Into<String>) -> Self {
        Self::Error(prefix.into())
    }

    pub fn protocol_error(prefix: impl Into<String>) -> Self {
        Self::ProtocolError(prefix.into())
    }

    fn prefix(&self) -> &str {
        match self {
            Self::Success(p) | Self::Error(p) | Self::ProtocolError(p) => p,
        }
    }

    fn classify(&self, line: &str) -> CommandResult {
        match self {
            Self::Success(_) => CommandResult::Success,
            Self::Error(_) => CommandResult::Error,
            Self::ProtocolError(_) => CommandResult::ProtocolError(error_code(line)),
        }
    }
}

/// Trailing numeric code of a structured error line.
fn error_code(line: &str) -> Option<u32> {
    pattern!(r"(\d+)\s*$")
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Wait for the first status rule to match, or time out.
pub fn await_status(
    transport: &SerialTransport,
    rules: &[StatusRule],
    timeout: Duration,
) -> CommandResult {
    transport
        .poll(timeout, || {
            rules.iter().find_map(|rule| {
                transport
                    .line_starts_with(rule.prefix(), Duration::ZERO)
                    .map(|line| rule.classify(&line))
            })
        })
        .unwrap_or(CommandResult::Timeout)
}

/// Clear, send `line` followed by [`EOL`], and classify the reply.
pub fn round_trip(
    transport: &mut SerialTransport,
    line: &str,
    rules: &[StatusRule],
    timeout: Duration,
) -> CommandResult {
    transport.clear();
    if let Err(e) = transport.write_str(&format!("{line}{EOL}")) {
        warn!(port = %transport.name(), command = line, error = %e, "command write failed");
        return CommandResult::Timeout;
    }
    let result = await_status(transport, rules, timeout);
    debug!(port = %transport.name(), command = line, ?result, "command finished");
    result
}

/// Shape of an AT command line.
#[derive(Debug, Clone, Copy)]
pub enum AtForm<'a> {
    /// `AT<cmd>`
    Execute,
    /// `AT<cmd>?`
    Query,
    /// `AT<cmd>=<a>,<b>,...`
    Write(&'a [String]),
}

/// Format each argument with `Display` for [`AtForm::Write`].
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($arg.to_string()),*]
    };
}
pub(crate) use args;

/// Build an AT command line (without terminator).
pub fn at_command(command: &str, form: AtForm<'_>) -> String {
    match form {
        AtForm::Execute => format!("AT{command}"),
        AtForm::Query => format!("AT{command}?"),
        AtForm::Write(args) => format!("AT{command}={}", args.join(",")),
    }
}
