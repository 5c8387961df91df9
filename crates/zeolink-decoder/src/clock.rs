//! Device clock tracking and timestamp reconstruction.
//!
//! Frames carry only the low byte of the device's seconds counter. The base
//! station periodically sends the full counter and its raw data output
//! version in dedicated frames; every other frame is stamped against the
//! most recent of those.

use tracing::debug;
use zeolink_frame::{DataType, Frame};

use crate::error::{DecodeError, Result};
use crate::record::{RawRecord, Timestamp};

/// What the clock did with a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// A clock or version report; absorbed into the clock state.
    Consumed,
    /// Clock or version not yet known, so the frame cannot be stamped.
    NoBasis,
    /// The frame with its reconstructed timestamp.
    Stamped(RawRecord),
}

/// Last reported device seconds and raw data output version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceClock {
    absolute_seconds: Option<u32>,
    version: Option<u32>,
}

impl DeviceClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absolute_seconds(&self) -> Option<u32> {
        self.absolute_seconds
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Absorb clock and version reports, and stamp everything else.
    pub fn reconcile(&mut self, frame: Frame) -> Result<Reconciled> {
        match frame.datatype {
            DataType::ZeoTimestamp => {
                let seconds = report_value(&frame)?;
                debug!(seconds, "device clock report");
                self.absolute_seconds = Some(seconds);
                Ok(Reconciled::Consumed)
            }
            DataType::Version => {
                let version = report_value(&frame)?;
                debug!(version, "raw data version report");
                self.version = Some(version);
                Ok(Reconciled::Consumed)
            }
            datatype => {
                let (Some(seconds), Some(version)) = (self.absolute_seconds, self.version) else {
                    return Ok(Reconciled::NoBasis);
                };
                let timestamp = Timestamp::new(
                    reconstruct_seconds(seconds, frame.clock_low_byte),
                    frame.subsecond_fraction(),
                );
                Ok(Reconciled::Stamped(RawRecord {
                    timestamp,
                    version,
                    datatype,
                    payload: frame.payload,
                }))
            }
        }
    }
}

/// Expand an 8-bit clock byte against the last reported device seconds.
///
/// The byte is matched against the reported second, then the one before,
/// then the one after. If none match the device clock has jumped, and the
/// reported seconds are used as-is.
pub fn reconstruct_seconds(absolute: u32, low_byte: u8) -> i64 {
    let absolute = i64::from(absolute);
    [absolute, absolute - 1, absolute + 1]
        .into_iter()
        .find(|candidate| (candidate & 0xFF) as u8 == low_byte)
        .unwrap_or_else(|| {
            debug!(absolute, low_byte, "clock byte out of range, using device seconds");
            absolute
        })
}

fn report_value(frame: &Frame) -> Result<u32> {
    frame
        .payload
        .get(1..5)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(DecodeError::TruncatedPayload {
            datatype: frame.datatype,
            len: frame.payload.len(),
        })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn frame(datatype: DataType, clock_low_byte: u8, body: &[u8]) -> Frame {
        let mut payload = vec![datatype.code()];
        payload.extend_from_slice(body);
        Frame {
            checksum: zeolink_frame::checksum(&payload),
            length: payload.len() as u16,
            clock_low_byte,
            subsecond: 0,
            sequence: 0,
            datatype,
            payload: Bytes::from(payload),
        }
    }

    fn synced(seconds: u32) -> DeviceClock {
        let mut clock = DeviceClock::new();
        clock
            .reconcile(frame(DataType::ZeoTimestamp, 0, &seconds.to_le_bytes()))
            .unwrap();
        clock
            .reconcile(frame(DataType::Version, 0, &3u32.to_le_bytes()))
            .unwrap();
        clock
    }

    #[test]
    fn reports_are_consumed() {
        let mut clock = DeviceClock::new();

        let result = clock
            .reconcile(frame(DataType::ZeoTimestamp, 0, &0x1234_5678u32.to_le_bytes()))
            .unwrap();
        assert_eq!(result, Reconciled::Consumed);
        assert_eq!(clock.absolute_seconds(), Some(0x1234_5678));
        assert_eq!(clock.version(), None);

        let result = clock
            .reconcile(frame(DataType::Version, 0, &3u32.to_le_bytes()))
            .unwrap();
        assert_eq!(result, Reconciled::Consumed);
        assert_eq!(clock.version(), Some(3));
    }

    #[test]
    fn frames_before_both_reports_have_no_basis() {
        let mut clock = DeviceClock::new();
        assert_eq!(
            clock.reconcile(frame(DataType::SliceEnd, 0, &[])).unwrap(),
            Reconciled::NoBasis
        );

        clock
            .reconcile(frame(DataType::ZeoTimestamp, 0, &100u32.to_le_bytes()))
            .unwrap();
        assert_eq!(
            clock.reconcile(frame(DataType::SliceEnd, 100, &[])).unwrap(),
            Reconciled::NoBasis
        );
    }

    #[test]
    fn stamps_with_reconstructed_seconds() {
        let mut clock = synced(0x0001_0200);
        let mut f = frame(DataType::SliceEnd, 0xFF, &[]);
        f.subsecond = 0x8000;

        let Reconciled::Stamped(record) = clock.reconcile(f).unwrap() else {
            panic!("expected a stamped record");
        };
        assert_eq!(record.timestamp.seconds, 0x0001_01FF);
        assert!((record.timestamp.subsecond - 0.500_007_6).abs() < 1e-6);
        assert_eq!(record.version, 3);
        assert_eq!(record.datatype, DataType::SliceEnd);
        assert_eq!(record.payload.as_ref(), &[0x02]);
    }

    #[test]
    fn candidate_order_is_same_previous_next() {
        let t = 1_000_000u32;
        assert_eq!(reconstruct_seconds(t, (t & 0xFF) as u8), i64::from(t));
        assert_eq!(reconstruct_seconds(t, ((t - 1) & 0xFF) as u8), i64::from(t) - 1);
        assert_eq!(reconstruct_seconds(t, ((t + 1) & 0xFF) as u8), i64::from(t) + 1);
    }

    #[test]
    fn candidates_never_collide() {
        for t in [0u32, 1, 0xFF, 0x100, 0x1FF, u32::MAX - 1, u32::MAX] {
            let t = i64::from(t);
            let bytes = [t & 0xFF, (t - 1) & 0xFF, (t + 1) & 0xFF];
            assert_ne!(bytes[0], bytes[1]);
            assert_ne!(bytes[0], bytes[2]);
            assert_ne!(bytes[1], bytes[2]);
        }
    }

    #[test]
    fn wraps_across_byte_boundaries() {
        assert_eq!(reconstruct_seconds(0x100, 0xFF), 0xFF);
        assert_eq!(reconstruct_seconds(0x1FF, 0x00), 0x200);
        assert_eq!(reconstruct_seconds(0, 0xFF), -1);
    }

    #[test]
    fn discontinuity_falls_back_to_device_seconds() {
        assert_eq!(reconstruct_seconds(0x1000, 0x80), 0x1000);
    }

    #[test]
    fn short_report_is_rejected() {
        let mut clock = DeviceClock::new();
        let err = clock
            .reconcile(frame(DataType::ZeoTimestamp, 0, &[0x01, 0x02]))
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedPayload {
                datatype: DataType::ZeoTimestamp,
                len: 3
            }
        ));
        assert_eq!(clock.absolute_seconds(), None);
    }
}
