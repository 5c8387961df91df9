//! Decoding of Zeo raw data frames into events and slices.
//!
//! This is the stateful half of the pipeline:
//! - [`DeviceClock`] expands each frame's 8-bit clock byte into full device time
//! - [`Parser`] decodes payloads, filters the waveform and assembles slices
//! - [`BaseLink`] owns the byte stream and drives both on one worker
//!
//! Consumers register callbacks on the parser, or take records from a
//! bounded channel with [`handoff::attach`].

pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod handoff;
pub mod link;
pub mod parser;
pub mod record;
pub mod tables;

pub use clock::{reconstruct_seconds, DeviceClock, Reconciled};
pub use config::{DecoderConfig, DEFAULT_HANDOFF_CAPACITY, SUPPORTED_VERSION};
pub use error::{DecodeError, Result};
pub use filter::{filter_60hz, FILTER_KERNEL, FILTER_TAPS};
pub use link::{BaseLink, CancelToken, FrameCallback, LinkExit};
pub use parser::{EventCallback, Parser, SliceCallback};
pub use record::{Event, RawRecord, Record, Slice, Timestamp, WAVEFORM_SAMPLES};
pub use tables::{EventKind, SleepStage, FREQUENCY_BANDS};
