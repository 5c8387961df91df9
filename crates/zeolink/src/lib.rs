//! Decoding of the Zeo headband's raw data stream.
//!
//! The base station emits framed binary records over a 38400 baud serial
//! link. zeolink resynchronises on the wire, validates each frame,
//! reconstructs device time, and assembles per-second slices of waveform,
//! frequency bins, signal quality, impedance and sleep stage, alongside
//! discrete events.
//!
//! # Crate Structure
//!
//! - [`transport`] - Serial port access and the `ByteSource` abstraction
//! - [`frame`] - Sync search, frame validation and the wire codec
//! - [`decoder`] - Clock reconciliation, slice assembly and the capture worker

/// Re-export transport types.
pub mod transport {
    pub use zeolink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use zeolink_frame::*;
}

/// Re-export decoder types.
pub mod decoder {
    pub use zeolink_decoder::*;
}
