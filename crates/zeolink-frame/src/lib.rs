//! Framing for the Zeo raw data protocol.
//!
//! Every frame on the wire is introduced by:
//! - A 2-byte sync marker ("A4") for stream synchronization
//! - A 1-byte additive checksum over the payload
//! - A 2-byte little-endian payload length and its bitwise inverse
//! - An 8-bit clock byte, a 16-bit sub-second counter and a sequence number
//!
//! [`FrameReader`] scans for the sync marker, validates each frame and
//! resynchronises after anything malformed. Corrupt frames are dropped,
//! never repaired.

pub mod codec;
pub mod datatype;
pub mod error;
pub mod reader;

pub use codec::{checksum, encode_frame, Frame, FAULT_MARKER, HEADER_SIZE, MAX_PAYLOAD, SYNC};
pub use datatype::DataType;
pub use error::{FrameError, Result};
pub use reader::FrameReader;
