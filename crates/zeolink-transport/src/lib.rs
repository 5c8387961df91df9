//! Serial transport for the Zeo raw data port.
//!
//! The base station streams its raw data output over a serial line at
//! 38400 baud, no parity, one stop bit. This crate opens that line and
//! exposes it as a [`ByteSource`], the only interface the frame reader
//! consumes. Replay files and in-memory buffers implement the same trait.

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use serial::{list_ports, SerialConfig, SerialStream, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
pub use traits::ByteSource;
