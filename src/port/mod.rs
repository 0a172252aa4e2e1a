//! Port abstraction layer for serial communication.
//!
//! Provides the adapter trait plus a hardware-backed and a scripted mock
//! implementation, so board drivers can be exercised without a bench.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::MockSerialPort;
pub use sync_port::*;
pub use traits::*;
