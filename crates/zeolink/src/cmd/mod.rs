use clap::{Args, Subcommand};
use std::path::PathBuf;

use zeolink_decoder::{Record, DEFAULT_HANDOFF_CAPACITY};
use zeolink_transport::DEFAULT_BAUD_RATE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod capture;
pub mod ports;
pub mod replay;
pub mod session;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode records live from a base station's serial port.
    Capture(CaptureArgs),
    /// Decode records from a raw byte capture file.
    Replay(ReplayArgs),
    /// List available serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Capture(args) => capture::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Serial port the base station is attached to.
    #[arg(env = "ZEOLINK_PORT")]
    pub port: PathBuf,
    /// Baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Read timeout before the stream is resynchronised (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Raw byte capture to decode.
    pub file: PathBuf,
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Options shared by every command that runs the decoding pipeline.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Exit after printing N records.
    #[arg(long)]
    pub count: Option<usize>,
    /// Print events only.
    #[arg(long, conflicts_with = "slices_only")]
    pub events_only: bool,
    /// Print slices only.
    #[arg(long)]
    pub slices_only: bool,
    /// Records buffered between the decoder and the printer.
    #[arg(long, default_value_t = DEFAULT_HANDOFF_CAPACITY)]
    pub capacity: usize,
}

impl SessionArgs {
    pub fn wants(&self, record: &Record) -> bool {
        match record {
            Record::Event(_) => !self.slices_only,
            Record::Slice(_) => !self.events_only,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
