//! Serial transport and response matching.
//!
//! ```text
//! serial port ──> BackgroundReader ──> TransportBuffer <── PatternMatcher <── board driver
//!      ^                                                                          │
//!      └──────────────────────────── SerialTransport::write ─────────────────────┘
//! ```
//!
//! The reader thread is the only producer; the calling thread clears the
//! buffer, writes a command, then polls for the reply.

pub mod buffer;
pub mod link;
pub mod matcher;
pub mod reader;

pub use buffer::TransportBuffer;
pub use link::{SerialTransport, TransportOptions};
pub(crate) use matcher::pattern;
pub use matcher::{compile, Groups, PatternMatcher};
pub use reader::BackgroundReader;
