use zeolink_decoder::{handoff, BaseLink, CancelToken, DecoderConfig, LinkExit, Parser};
use zeolink_transport::ByteSource;

use crate::cmd::SessionArgs;
use crate::exit::{decode_error, io_error, CliError, CliResult, DEVICE_FAULT, INTERNAL, SUCCESS};
use crate::output::{print_record, OutputFormat};

/// Decode `link` on a worker thread and print records as they arrive.
///
/// Ctrl-C, `--count`, the end of the source and a device fault all end the
/// session; only the fault is reported as a failure.
pub fn run<T>(mut link: BaseLink<T>, args: &SessionArgs, format: OutputFormat) -> CliResult<i32>
where
    T: ByteSource + Send + 'static,
{
    let config = DecoderConfig {
        handoff_capacity: args.capacity,
        ..DecoderConfig::default()
    };
    let mut parser = Parser::with_config(config);
    let records = handoff::attach(&mut parser, config.handoff_capacity);
    link.attach(parser);

    let token = link.cancel_token();
    install_ctrlc_handler(token.clone())?;

    let worker = link
        .spawn()
        .map_err(|err| io_error("worker start failed", err))?;

    let mut printed = 0usize;
    for record in records.iter() {
        if !args.wants(&record) {
            continue;
        }

        print_record(&record, format);
        printed = printed.saturating_add(1);

        if args.count.is_some_and(|count| printed >= count) {
            token.cancel();
            break;
        }
    }
    // Unblocks the worker if it is waiting on a full channel.
    drop(records);

    let exit = worker
        .join()
        .map_err(|_| CliError::new(INTERNAL, "capture worker panicked"))?
        .map_err(|err| decode_error("capture failed", err))?;
    tracing::info!(records = printed, ?exit, "session ended");

    match exit {
        LinkExit::DeviceFault => Err(CliError::new(
            DEVICE_FAULT,
            "capture failed: device reported a fatal error",
        )),
        LinkExit::Cancelled | LinkExit::EndOfStream => Ok(SUCCESS),
    }
}

fn install_ctrlc_handler(token: CancelToken) -> CliResult<()> {
    ctrlc::set_handler(move || token.cancel()).map_err(|err| {
        CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
    })
}
