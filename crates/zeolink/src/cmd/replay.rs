use std::fs::File;
use std::io::BufReader;

use zeolink_decoder::BaseLink;

use crate::cmd::{session, ReplayArgs};
use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let file = File::open(&args.file)
        .map_err(|err| io_error(&format!("open {} failed", args.file.display()), err))?;
    tracing::info!(path = %args.file.display(), "replaying capture");

    session::run(BaseLink::new(BufReader::new(file)), &args.session, format)
}
