use zeolink_frame::DataType;

/// Errors that can occur while decoding frames into events and slices.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] zeolink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] zeolink_frame::FrameError),

    /// The device reports a raw data output version this decoder does not speak.
    #[error("unsupported raw data output version: {0}")]
    UnsupportedProtocolVersion(u32),

    /// The payload is too short for its datatype.
    #[error("{datatype} payload too short ({len} bytes)")]
    TruncatedPayload { datatype: DataType, len: usize },

    /// The event code is not in the event table.
    #[error("unknown event code {0:#x}")]
    UnknownEvent(u32),

    /// The sleep stage code is not in the stage table.
    #[error("unknown sleep stage {0}")]
    UnknownSleepStage(u32),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
