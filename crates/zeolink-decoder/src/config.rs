/// Raw data output version this decoder understands.
pub const SUPPORTED_VERSION: u32 = 3;

/// Default depth of the record handoff channel.
pub const DEFAULT_HANDOFF_CAPACITY: usize = 256;

/// Controls decoding behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Frames reporting any other version are dropped. Default: 3.
    pub supported_version: u32,
    /// Records buffered between the decoder and a consumer thread before the
    /// decoder blocks. Default: 256.
    pub handoff_capacity: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            supported_version: SUPPORTED_VERSION,
            handoff_capacity: DEFAULT_HANDOFF_CAPACITY,
        }
    }
}
