use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;
use zeolink_frame::DataType;

use crate::tables::{EventKind, SleepStage};

/// Samples in one second of filtered waveform.
pub const WAVEFORM_SAMPLES: usize = 128;

/// Full device time of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timestamp {
    /// Seconds from the device's real-time clock.
    pub seconds: i64,
    /// Fraction of the second, 0.0..=1.0.
    pub subsecond: f64,
}

impl Timestamp {
    pub fn new(seconds: i64, subsecond: f64) -> Self {
        Self { seconds, subsecond }
    }

    /// Seconds plus the sub-second fraction.
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.subsecond
    }

    /// Whole seconds rendered as UTC `MM/DD/YYYY HH:MM:SS`, the way the
    /// base station's own tools print times.
    pub fn zeo_time(&self) -> String {
        chrono::DateTime::from_timestamp(self.seconds, 0)
            .map(|dt| dt.format("%m/%d/%Y %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// A validated frame stamped with full device time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub timestamp: Timestamp,
    /// Raw data output version in effect when the frame arrived.
    pub version: u32,
    pub datatype: DataType,
    /// The payload, datatype byte included.
    pub payload: Bytes,
}

/// A decoded event. Delivered once and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub timestamp: Timestamp,
    pub version: u32,
    pub kind: EventKind,
}

impl Event {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Measurements gathered between two slice-end markers.
///
/// Fields stay `None` (or empty) until a frame of the matching datatype
/// arrives, so a legitimate zero reading is distinguishable from no reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Slice {
    /// Time of the slice-end marker.
    pub timestamp: Option<Timestamp>,
    pub version: Option<u32>,
    /// Signal quality index, nominally 0-30.
    pub sqi: Option<u32>,
    /// Impedance magnitude in raw ADC units.
    pub impedance: Option<f64>,
    /// Filtered waveform in microvolts.
    pub waveform: Vec<f64>,
    /// Relative band power keyed by band label.
    pub frequency_bins: BTreeMap<&'static str, f64>,
    pub bad_signal: Option<bool>,
    pub sleep_stage: Option<SleepStage>,
}

impl Slice {
    /// Whether no measurement has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.sqi.is_none()
            && self.impedance.is_none()
            && self.waveform.is_empty()
            && self.frequency_bins.is_empty()
            && self.bad_signal.is_none()
            && self.sleep_stage.is_none()
    }
}

/// An event or slice, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    Event(Event),
    Slice(Slice),
}
