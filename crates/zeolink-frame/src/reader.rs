use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::{debug, error};
use zeolink_transport::ByteSource;

use crate::codec::{checksum, Frame, FAULT_MARKER, SYNC};
use crate::datatype::DataType;
use crate::error::{FrameError, Result};

/// Reads validated frames from a [`ByteSource`].
///
/// The reader slides a two-byte window over the stream looking for the sync
/// marker, and a twelve-byte window looking for the device's fault marker.
/// After any malformed frame it goes straight back to scanning from the
/// current stream position.
pub struct FrameReader<T> {
    inner: T,
    sync_window: [u8; 2],
    fault_window: [u8; 12],
    terminated: bool,
}

impl<T: ByteSource> FrameReader<T> {
    /// Create a new frame reader over a byte source.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            sync_window: [0; 2],
            fault_window: [0; 12],
            terminated: false,
        }
    }

    /// Advance the reader by one iteration.
    ///
    /// While unsynchronised this consumes a single byte and returns
    /// `Ok(None)`. Once the sync marker is seen the whole frame is read and
    /// either returned or rejected. Every error leaves the reader scanning
    /// for the next sync marker, except `FatalDeviceFault`, after which
    /// every call fails the same way.
    pub fn step(&mut self) -> Result<Option<Frame>> {
        if self.terminated {
            return Err(FrameError::FatalDeviceFault);
        }

        if self.sync_window != SYNC {
            let mut byte = [0u8; 1];
            self.read_or_resync(&mut byte)?;
            self.push_byte(byte[0]);

            if &self.fault_window == FAULT_MARKER {
                error!("device reported a fatal error");
                self.terminated = true;
                return Err(FrameError::FatalDeviceFault);
            }
            return Ok(None);
        }

        self.sync_window = [0; 2];
        self.read_body().map(Some)
    }

    /// Read the next valid frame (blocking).
    ///
    /// Returns the first error encountered; call again to keep scanning.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.step()? {
                return Ok(frame);
            }
        }
    }

    /// Whether the device fault marker has been seen.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn read_body(&mut self) -> Result<Frame> {
        let mut header = [0u8; 5];
        self.read_or_resync(&mut header)?;

        let expected = header[0];
        let length = u16::from_le_bytes([header[1], header[2]]);
        let inverse = u16::from_le_bytes([header[3], header[4]]);
        if length != inverse ^ 0xFFFF {
            debug!(length, inverse, "mismatched lengths");
            return Err(FrameError::LengthMismatch { length, inverse });
        }

        let mut stamp = [0u8; 4];
        self.read_or_resync(&mut stamp)?;
        let clock_low_byte = stamp[0];
        let subsecond = u16::from_le_bytes([stamp[1], stamp[2]]);
        let sequence = stamp[3];

        let mut payload = vec![0u8; usize::from(length)];
        self.read_or_resync(&mut payload)?;

        let actual = checksum(&payload);
        if actual != expected {
            debug!(expected, actual, sequence, "bad checksum");
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }

        let code = *payload.first().ok_or(FrameError::EmptyPayload)?;
        let datatype = DataType::from_code(code).ok_or_else(|| {
            debug!(code, "bad datatype");
            FrameError::UnknownDatatype(code)
        })?;

        Ok(Frame {
            checksum: expected,
            length,
            clock_low_byte,
            subsecond,
            sequence,
            datatype,
            payload: Bytes::from(payload),
        })
    }

    /// Fill `buf` completely, or fail with a timeout after resetting the
    /// sync window and discarding pending transport input.
    fn read_or_resync(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.fill(buf) {
            Err(FrameError::ReadTimeout) => {
                debug!(requested = buf.len(), "read timeout, resynchronising");
                self.sync_window = [0; 2];
                self.inner.flush_input()?;
                Err(FrameError::ReadTimeout)
            }
            other => other,
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Err(FrameError::ReadTimeout)
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    fn push_byte(&mut self, byte: u8) {
        self.sync_window.rotate_left(1);
        self.sync_window[1] = byte;
        self.fault_window.rotate_left(1);
        self.fault_window[11] = byte;
    }
}

impl<T> std::fmt::Debug for FrameReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("synced", &(self.sync_window == SYNC))
            .field("terminated", &self.terminated)
            .finish()
    }
}
