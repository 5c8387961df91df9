use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, error, info, warn};
use zeolink_frame::{Frame, FrameError, FrameReader};
use zeolink_transport::{ByteSource, SerialConfig, SerialStream};

use crate::clock::{DeviceClock, Reconciled};
use crate::error::{DecodeError, Result};
use crate::parser::Parser;
use crate::record::RawRecord;

/// Called with every stamped frame.
pub type FrameCallback = Box<dyn FnMut(&RawRecord) + Send>;

/// Cooperative cancellation flag shared between the worker and its owner.
///
/// The worker checks it once per loop iteration, so a read already in
/// progress finishes before the worker exits.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a capture session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkExit {
    /// The cancel token was set.
    Cancelled,
    /// The device printed its fatal error marker.
    DeviceFault,
    /// The byte source ran out.
    EndOfStream,
}

/// Owns the byte stream and turns it into stamped frames.
///
/// Every valid frame is passed through the device clock; clock and version
/// reports are absorbed, and everything else is handed to the registered
/// callbacks in registration order. Framing errors are logged and the
/// reader resynchronises; nothing malformed reaches a callback.
pub struct BaseLink<T> {
    reader: FrameReader<T>,
    clock: DeviceClock,
    callbacks: Vec<FrameCallback>,
    cancel: CancelToken,
}

impl BaseLink<SerialStream> {
    /// Open a serial port and wrap it in a link.
    pub fn open(path: impl AsRef<Path>, config: &SerialConfig) -> Result<Self> {
        let stream = SerialStream::open(path, config)?;
        Ok(Self::new(stream))
    }
}

impl<T: ByteSource> BaseLink<T> {
    /// Create a link over any byte source.
    pub fn new(source: T) -> Self {
        Self {
            reader: FrameReader::new(source),
            clock: DeviceClock::new(),
            callbacks: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Register a function to call with every stamped frame.
    pub fn add_callback(&mut self, callback: impl FnMut(&RawRecord) + Send + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Feed every stamped frame into a parser.
    ///
    /// Decode errors are logged and the frame is dropped.
    pub fn attach(&mut self, mut parser: Parser) {
        self.add_callback(move |record| {
            if let Err(err) = parser.update(record) {
                match err {
                    DecodeError::UnsupportedProtocolVersion(_) => warn!(error = %err, "dropping frame"),
                    _ => debug!(error = %err, datatype = %record.datatype, "dropping frame"),
                }
            }
        });
    }

    /// Token that stops [`run`](Self::run) at the next loop iteration.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Last clock and version reported by the device.
    pub fn clock(&self) -> &DeviceClock {
        &self.clock
    }

    /// Run the capture loop on the current thread until cancelled, the
    /// device faults, or the source is exhausted.
    ///
    /// The byte source is dropped, closing the transport, before this
    /// returns. Only I/O failures outside the timeout path are errors.
    pub fn run(mut self) -> Result<LinkExit> {
        info!("capture started");
        let exit = loop {
            if self.cancel.is_cancelled() {
                break LinkExit::Cancelled;
            }

            match self.reader.step() {
                Ok(None) => {}
                Ok(Some(frame)) => self.dispatch(frame),
                Err(FrameError::FatalDeviceFault) => {
                    error!("device fault, ending capture");
                    self.cancel.cancel();
                    break LinkExit::DeviceFault;
                }
                Err(FrameError::ConnectionClosed) => break LinkExit::EndOfStream,
                Err(err) if err.is_recoverable() => warn!(error = %err, "capture error"),
                Err(err) => return Err(err.into()),
            }
        };

        drop(self);
        info!(?exit, "capture stopped");
        Ok(exit)
    }

    /// Run the capture loop on a dedicated `zeolink-link` thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<Result<LinkExit>>>
    where
        T: Send + 'static,
    {
        std::thread::Builder::new()
            .name("zeolink-link".to_string())
            .spawn(move || self.run())
    }

    fn dispatch(&mut self, frame: Frame) {
        match self.clock.reconcile(frame) {
            Ok(Reconciled::Stamped(record)) => {
                for callback in &mut self.callbacks {
                    callback(&record);
                }
            }
            Ok(Reconciled::Consumed) => {}
            Ok(Reconciled::NoBasis) => debug!("no device clock yet, dropping frame"),
            Err(err) => warn!(error = %err, "capture error"),
        }
    }
}

impl<T> std::fmt::Debug for BaseLink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseLink")
            .field("reader", &self.reader)
            .field("clock", &self.clock)
            .field("callbacks", &self.callbacks.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
