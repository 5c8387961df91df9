use tracing::{debug, trace};
use zeolink_frame::DataType;

use crate::config::DecoderConfig;
use crate::error::{DecodeError, Result};
use crate::filter::filter_60hz;
use crate::record::{Event, RawRecord, Slice, WAVEFORM_SAMPLES};
use crate::tables::{EventKind, SleepStage, FREQUENCY_BANDS};

/// Microvolts per ADC count.
const WAVEFORM_SCALE: f64 = 315.0 / 32768.0;

/// Samples are read from odd payload offsets below this bound.
const WAVEFORM_SPAN_END: usize = 256;

/// Filtered samples that belong to the current second. The earlier part of
/// the output is still settling on the previous second's data.
const WAVEFORM_WINDOW: std::ops::Range<usize> = 90..218;

/// Impedance readings whose in-phase half equals this are invalid.
const IMPEDANCE_INVALID: i32 = 0x7FFF;

/// Called with every decoded event.
pub type EventCallback = Box<dyn FnMut(&Event) + Send>;

/// Called with every completed slice.
pub type SliceCallback = Box<dyn FnMut(&Slice) + Send>;

/// Assembles stamped frames into events and slices.
///
/// Measurements accumulate in the open slice until a slice-end frame, which
/// delivers the slice to every slice callback and starts a fresh one. Events
/// go to the event callbacks as soon as they are decoded. Callbacks run in
/// registration order on the caller's thread, so a callback that blocks
/// stalls decoding.
pub struct Parser {
    config: DecoderConfig,
    slice: Slice,
    wave_buffer: Vec<f64>,
    event_callbacks: Vec<EventCallback>,
    slice_callbacks: Vec<SliceCallback>,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Create a new parser with explicit configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            slice: Slice::default(),
            wave_buffer: vec![0.0; WAVEFORM_SAMPLES],
            event_callbacks: Vec::new(),
            slice_callbacks: Vec::new(),
        }
    }

    /// Register a function to call when an event occurs.
    pub fn add_event_callback(&mut self, callback: impl FnMut(&Event) + Send + 'static) {
        self.event_callbacks.push(Box::new(callback));
    }

    /// Register a function to call when a slice is completed.
    pub fn add_slice_callback(&mut self, callback: impl FnMut(&Slice) + Send + 'static) {
        self.slice_callbacks.push(Box::new(callback));
    }

    /// The slice currently being assembled.
    pub fn current_slice(&self) -> &Slice {
        &self.slice
    }

    /// Current parser configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Fold one stamped frame into the parser state.
    ///
    /// On error the frame is dropped and the open slice is left as it was.
    pub fn update(&mut self, record: &RawRecord) -> Result<()> {
        if record.version != self.config.supported_version {
            return Err(DecodeError::UnsupportedProtocolVersion(record.version));
        }

        let payload = record.payload.as_ref();
        trace!(datatype = %record.datatype, len = payload.len(), "decoding frame");

        match record.datatype {
            DataType::Event => {
                let code = u32_at(record, 1)?;
                let kind = EventKind::from_code(code).ok_or(DecodeError::UnknownEvent(code))?;
                let event = Event {
                    timestamp: record.timestamp,
                    version: record.version,
                    kind,
                };
                for callback in &mut self.event_callbacks {
                    callback(&event);
                }
            }
            DataType::SliceEnd => {
                self.slice.timestamp = Some(record.timestamp);
                self.slice.version = Some(record.version);
                let slice = std::mem::take(&mut self.slice);
                for callback in &mut self.slice_callbacks {
                    callback(&slice);
                }
            }
            DataType::Waveform => self.update_waveform(payload),
            DataType::FrequencyBins => {
                let mut bins = Vec::with_capacity(FREQUENCY_BANDS.len());
                for (band, label) in FREQUENCY_BANDS.iter().enumerate() {
                    let raw = u16_at(record, band * 2 + 1)?;
                    bins.push((*label, f64::from(raw) / 32768.0));
                }
                self.slice.frequency_bins.extend(bins);
            }
            DataType::BadSignal => {
                self.slice.bad_signal = Some(u32_at(record, 1)? > 0);
            }
            DataType::SleepStage => {
                let code = u32_at(record, 1)?;
                let stage =
                    SleepStage::from_code(code).ok_or(DecodeError::UnknownSleepStage(code))?;
                self.slice.sleep_stage = Some(stage);
            }
            DataType::Impedance => {
                let raw = u32_at(record, 1)?;
                let in_phase = (raw & 0xFFFF) as i32 - 0x8000;
                let quadrature = (raw >> 16) as i32 - 0x8000;
                if in_phase == IMPEDANCE_INVALID {
                    debug!("invalid impedance reading");
                } else {
                    let (i, q) = (f64::from(in_phase), f64::from(quadrature));
                    self.slice.impedance = Some((i * i + q * q).sqrt());
                }
            }
            DataType::Sqi => {
                self.slice.sqi = Some(u32_at(record, 1)?);
            }
            DataType::ZeoTimestamp | DataType::Version => {
                debug!(datatype = %record.datatype, "clock report reached parser, ignoring");
            }
        }
        Ok(())
    }

    fn update_waveform(&mut self, payload: &[u8]) {
        let wave: Vec<f64> = (1..WAVEFORM_SPAN_END)
            .step_by(2)
            .map_while(|offset| payload.get(offset..offset + 2))
            .map(|b| f64::from(i16::from_le_bytes([b[0], b[1]])) * WAVEFORM_SCALE)
            .collect();

        let mut window = Vec::with_capacity(self.wave_buffer.len() + wave.len());
        window.extend_from_slice(&self.wave_buffer);
        window.extend_from_slice(&wave);
        let filtered = filter_60hz(&window);

        let end = WAVEFORM_WINDOW.end.min(filtered.len());
        let start = WAVEFORM_WINDOW.start.min(end);
        self.slice.waveform = filtered[start..end].to_vec();

        // A docked-then-undocked headband reuses a stale second here; only the
        // start of the first new second is affected.
        self.wave_buffer = wave;
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("config", &self.config)
            .field("slice", &self.slice)
            .field("event_callbacks", &self.event_callbacks.len())
            .field("slice_callbacks", &self.slice_callbacks.len())
            .finish()
    }
}

fn u32_at(record: &RawRecord, offset: usize) -> Result<u32> {
    record
        .payload
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| truncated(record))
}

fn u16_at(record: &RawRecord, offset: usize) -> Result<u16> {
    record
        .payload
        .get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| truncated(record))
}

fn truncated(record: &RawRecord) -> DecodeError {
    DecodeError::TruncatedPayload {
        datatype: record.datatype,
        len: record.payload.len(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;

    use super::*;
    use crate::filter::FILTER_KERNEL;
    use crate::record::Timestamp;

    fn record(datatype: DataType, body: &[u8]) -> RawRecord {
        let mut payload = vec![datatype.code()];
        payload.extend_from_slice(body);
        RawRecord {
            timestamp: Timestamp::new(1_000, 0.5),
            version: 3,
            datatype,
            payload: Bytes::from(payload),
        }
    }

    fn u32_record(datatype: DataType, value: u32) -> RawRecord {
        record(datatype, &value.to_le_bytes())
    }

    fn waveform(samples: &[i16]) -> RawRecord {
        let body: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        record(DataType::Waveform, &body)
    }

    fn collect_slices(parser: &mut Parser) -> Arc<Mutex<Vec<Slice>>> {
        let slices = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&slices);
        parser.add_slice_callback(move |slice| sink.lock().unwrap().push(slice.clone()));
        slices
    }

    fn collect_events(parser: &mut Parser) -> Arc<Mutex<Vec<Event>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        parser.add_event_callback(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn night_start_event_is_delivered_once() {
        let mut parser = Parser::new();
        let events = collect_events(&mut parser);
        let slices = collect_slices(&mut parser);

        parser.update(&u32_record(DataType::Event, 0x05)).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "NightStart");
        assert_eq!(events[0].version, 3);
        assert_eq!(events[0].timestamp, Timestamp::new(1_000, 0.5));
        assert!(slices.lock().unwrap().is_empty());
        assert!(parser.current_slice().is_empty());
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let mut parser = Parser::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in 0..3 {
            let order = Arc::clone(&order);
            parser.add_event_callback(move |_| order.lock().unwrap().push(id));
        }

        parser.update(&u32_record(DataType::Event, 0x15)).unwrap();

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn waveform_sqi_slice_end_yields_one_slice() {
        let mut parser = Parser::new();
        let slices = collect_slices(&mut parser);

        parser.update(&waveform(&[100; 128])).unwrap();
        parser.update(&u32_record(DataType::Sqi, 25)).unwrap();
        parser.update(&record(DataType::SliceEnd, &[])).unwrap();

        {
            let slices = slices.lock().unwrap();
            assert_eq!(slices.len(), 1);
            let slice = &slices[0];
            assert_eq!(slice.waveform.len(), 128);
            assert_eq!(slice.sqi, Some(25));
            assert_eq!(slice.timestamp, Some(Timestamp::new(1_000, 0.5)));
            assert_eq!(slice.version, Some(3));
            assert_eq!(slice.impedance, None);
            assert!(slice.frequency_bins.is_empty());
            assert_eq!(slice.bad_signal, None);
            assert_eq!(slice.sleep_stage, None);
        }

        parser.update(&record(DataType::SliceEnd, &[])).unwrap();

        let slices = slices.lock().unwrap();
        assert_eq!(slices.len(), 2);
        assert!(slices[1].is_empty());
        assert_eq!(slices[1].version, Some(3));
    }

    #[test]
    fn waveform_impulse_reproduces_kernel() {
        let mut parser = Parser::new();

        let mut samples = [0i16; 128];
        samples[0] = 1000;
        parser.update(&waveform(&samples)).unwrap();

        let scaled = 1000.0 * WAVEFORM_SCALE;
        let wave = &parser.current_slice().waveform;
        assert_eq!(wave.len(), 128);
        // The impulse sits at window index 128; output index 128 + j is
        // kernel tap j, which lands at slice index 38 + j.
        for (j, tap) in FILTER_KERNEL.iter().enumerate() {
            assert!((wave[38 + j] - scaled * tap).abs() < 1e-12, "tap {j}");
        }
        assert!(wave[..38].iter().all(|v| *v == 0.0));
        assert!(wave[89..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn waveform_bridges_previous_second() {
        let mut parser = Parser::new();
        parser.update(&waveform(&[1000; 128])).unwrap();
        parser.update(&waveform(&[0; 128])).unwrap();

        let expected_first = filter_60hz(
            &[vec![1000.0 * WAVEFORM_SCALE; 128], vec![0.0; 128]].concat(),
        );
        let wave = &parser.current_slice().waveform;
        assert_eq!(wave.as_slice(), &expected_first[90..218]);
        // The tail of the previous second leaks into the start of this one.
        assert!(wave[0].abs() > 0.0);
    }

    #[test]
    fn waveform_from_256_byte_payload_has_127_samples() {
        let mut parser = Parser::new();
        let slices = collect_slices(&mut parser);

        // Datatype byte plus 255 data bytes: the last sample is incomplete.
        let mut body = vec![0u8; 255];
        body[252] = 0x01;
        parser.update(&record(DataType::Waveform, &body)).unwrap();
        parser.update(&record(DataType::SliceEnd, &[])).unwrap();

        assert_eq!(parser.wave_buffer.len(), 127);
        assert_eq!(slices.lock().unwrap()[0].waveform.len(), 128);
    }

    #[test]
    fn frequency_bins_are_keyed_by_band() {
        let mut parser = Parser::new();
        let body: Vec<u8> = [0x8000u16, 0x4000, 0, 0x2000, 0x1000, 0x0800, 0xFFFF]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();

        parser
            .update(&record(DataType::FrequencyBins, &body))
            .unwrap();

        let bins = &parser.current_slice().frequency_bins;
        assert_eq!(bins.len(), 7);
        assert_eq!(bins["2-4"], 1.0);
        assert_eq!(bins["4-8"], 0.5);
        assert_eq!(bins["8-13"], 0.0);
        assert_eq!(bins["13-18"], 0.25);
        assert_eq!(bins["18-21"], 0.125);
        assert_eq!(bins["11-14"], 0.0625);
        assert_eq!(bins["30-50"], 65535.0 / 32768.0);
    }

    #[test]
    fn short_frequency_bins_leave_slice_untouched() {
        let mut parser = Parser::new();
        let err = parser
            .update(&record(DataType::FrequencyBins, &[0u8; 10]))
            .unwrap_err();

        assert!(matches!(
            err,
            DecodeError::TruncatedPayload {
                datatype: DataType::FrequencyBins,
                len: 11
            }
        ));
        assert!(parser.current_slice().frequency_bins.is_empty());
    }

    #[test]
    fn bad_signal_distinguishes_false_from_unset() {
        let mut parser = Parser::new();
        assert_eq!(parser.current_slice().bad_signal, None);

        parser.update(&u32_record(DataType::BadSignal, 0)).unwrap();
        assert_eq!(parser.current_slice().bad_signal, Some(false));

        parser.update(&u32_record(DataType::BadSignal, 7)).unwrap();
        assert_eq!(parser.current_slice().bad_signal, Some(true));
    }

    #[test]
    fn sleep_stage_is_mapped() {
        let mut parser = Parser::new();
        parser.update(&u32_record(DataType::SleepStage, 4)).unwrap();
        assert_eq!(parser.current_slice().sleep_stage, Some(SleepStage::Deep));

        let err = parser
            .update(&u32_record(DataType::SleepStage, 9))
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnknownSleepStage(9)));
        assert_eq!(parser.current_slice().sleep_stage, Some(SleepStage::Deep));
    }

    #[test]
    fn impedance_magnitude() {
        let mut parser = Parser::new();
        // In-phase 0x8000 + 3, quadrature 0x8000 + 4.
        let raw = (0x8004u32 << 16) | 0x8003;
        parser.update(&u32_record(DataType::Impedance, raw)).unwrap();
        assert_eq!(parser.current_slice().impedance, Some(5.0));
    }

    #[test]
    fn invalid_impedance_keeps_prior_value() {
        let mut parser = Parser::new();
        parser
            .update(&u32_record(DataType::Impedance, (0x8000 << 16) | 0x800A))
            .unwrap();
        assert_eq!(parser.current_slice().impedance, Some(10.0));

        // In-phase half decodes to 0x7FFF.
        parser
            .update(&u32_record(DataType::Impedance, (0x1234 << 16) | 0xFFFF))
            .unwrap();
        assert_eq!(parser.current_slice().impedance, Some(10.0));
    }

    #[test]
    fn sqi_is_stored_raw() {
        let mut parser = Parser::new();
        parser.update(&u32_record(DataType::Sqi, 42)).unwrap();
        assert_eq!(parser.current_slice().sqi, Some(42));
    }

    #[test]
    fn unsupported_version_is_dropped() {
        let mut parser = Parser::new();
        let events = collect_events(&mut parser);
        let mut rec = u32_record(DataType::Event, 0x05);
        rec.version = 4;

        let err = parser.update(&rec).unwrap_err();

        assert!(matches!(err, DecodeError::UnsupportedProtocolVersion(4)));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_event_code_is_not_delivered() {
        let mut parser = Parser::new();
        let events = collect_events(&mut parser);

        let err = parser
            .update(&u32_record(DataType::Event, 0x99))
            .unwrap_err();

        assert!(matches!(err, DecodeError::UnknownEvent(0x99)));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn clock_reports_are_ignored() {
        let mut parser = Parser::new();
        parser
            .update(&u32_record(DataType::ZeoTimestamp, 12345))
            .unwrap();
        assert!(parser.current_slice().is_empty());
    }
}
