use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::ByteSource;

/// Baud rate of the base station's raw data output.
pub const DEFAULT_BAUD_RATE: u32 = 38_400;

/// Read timeout applied to every blocking read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Serial line settings.
///
/// Framing is fixed at 8 data bits, no parity, one stop bit. Only the baud
/// rate and read timeout are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Line speed in bits per second. Default: 38400.
    pub baud_rate: u32,
    /// Upper bound on how long a single read may block. Default: 5 s.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// An open serial port connected to the base station.
///
/// The port is closed when the stream is dropped.
pub struct SerialStream {
    port: Box<dyn SerialPort>,
    path: PathBuf,
}

impl SerialStream {
    /// Open the port and discard whatever input was pending before the open.
    pub fn open(path: impl AsRef<Path>, config: &SerialConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let port = serialport::new(path.to_string_lossy(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        let mut stream = Self { port, path };
        stream.flush_input()?;

        info!(
            path = %stream.path.display(),
            baud_rate = config.baud_rate,
            "opened serial port"
        );
        Ok(stream)
    }

    /// Path the port was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Change the read timeout on the open port.
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.port
            .set_timeout(timeout)
            .map_err(|err| TransportError::Io(err.into()))
    }
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl ByteSource for SerialStream {
    fn flush_input(&mut self) -> Result<()> {
        debug!(path = %self.path.display(), "flushing serial input");
        self.port
            .clear(ClearBuffer::Input)
            .map_err(TransportError::Flush)
    }
}

impl Drop for SerialStream {
    fn drop(&mut self) {
        info!(path = %self.path.display(), "closed serial port");
    }
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialStream")
            .field("path", &self.path)
            .finish()
    }
}

/// Names of the serial ports present on this machine.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
