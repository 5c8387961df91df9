/// Errors that can occur while reading or encoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A read returned fewer bytes than requested before the timeout.
    #[error("read timed out")]
    ReadTimeout,

    /// The length field does not match its redundant inverse.
    #[error("mismatched lengths (length {length:#06x}, inverse {inverse:#06x})")]
    LengthMismatch { length: u16, inverse: u16 },

    /// The payload does not sum to the transmitted checksum.
    #[error("bad checksum (expected {expected:#04x}, computed {actual:#04x})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// The leading payload byte is not a known datatype code.
    #[error("bad datatype {0:#04x}")]
    UnknownDatatype(u8),

    /// The frame carried no payload, so it has no datatype.
    #[error("empty payload")]
    EmptyPayload,

    /// The device reported an unrecoverable fault.
    #[error("device reported a fatal error")]
    FatalDeviceFault,

    /// The payload cannot be described by the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The source was exhausted.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O error occurred while reading frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport failed while resynchronising.
    #[error("transport error: {0}")]
    Transport(#[from] zeolink_transport::TransportError),
}

impl FrameError {
    /// Whether the reader can resume scanning for the next frame.
    ///
    /// Recoverable errors discard the in-flight frame only.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameError::ReadTimeout
                | FrameError::LengthMismatch { .. }
                | FrameError::ChecksumMismatch { .. }
                | FrameError::UnknownDatatype(_)
                | FrameError::EmptyPayload
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
