use bytes::{BufMut, Bytes, BytesMut};

use crate::datatype::DataType;
use crate::error::{FrameError, Result};

/// Sync marker: "A4" (0x41 0x34).
pub const SYNC: [u8; 2] = [0x41, 0x34];

/// Literal the device prints when it hits an unrecoverable fault.
pub const FAULT_MARKER: &[u8; 12] = b"FATAL_ERROR_";

/// Header following the sync marker: checksum (1) + length (2) +
/// inverse length (2) + clock byte (1) + sub-second (2) + sequence (1).
pub const HEADER_SIZE: usize = 9;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// A validated frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Additive checksum over the payload.
    pub checksum: u8,
    /// Payload length.
    pub length: u16,
    /// Low 8 bits of the device clock when the frame was sent.
    pub clock_low_byte: u8,
    /// Sub-second counter, running 0..=0xFFFF over one second.
    pub subsecond: u16,
    /// Sequence number. Carried for alignment, unused downstream.
    pub sequence: u8,
    /// Datatype decoded from `payload[0]`.
    pub datatype: DataType,
    /// The payload, datatype byte included.
    pub payload: Bytes,
}

impl Frame {
    /// Sub-second counter as a fraction of one second.
    pub fn subsecond_fraction(&self) -> f64 {
        f64::from(self.subsecond) / 65535.0
    }

    /// The total wire size of this frame (sync + header + payload).
    pub fn wire_size(&self) -> usize {
        SYNC.len() + HEADER_SIZE + self.payload.len()
    }
}

/// Sum of the payload bytes modulo 256.
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬──────┬────────┬────────┬───────┬──────────┬─────┬─────────┐
/// │ Sync   │ Sum  │ Length │ ~Len   │ Clock │ Subsec   │ Seq │ Payload │
/// │ "A4"   │ (1B) │ (2B LE)│ (2B LE)│ (1B)  │ (2B LE)  │(1B) │ (Length)│
/// └────────┴──────┴────────┴────────┴───────┴──────────┴─────┴─────────┘
/// ```
pub fn encode_frame(
    clock_low_byte: u8,
    subsecond: u16,
    sequence: u8,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let length = payload.len() as u16;

    dst.reserve(SYNC.len() + HEADER_SIZE + payload.len());
    dst.put_slice(&SYNC);
    dst.put_u8(checksum(payload));
    dst.put_u16_le(length);
    dst.put_u16_le(length ^ 0xFFFF);
    dst.put_u8(clock_low_byte);
    dst.put_u16_le(subsecond);
    dst.put_u8(sequence);
    dst.put_slice(payload);
    Ok(())
}
