use std::time::Duration;

use zeolink_decoder::BaseLink;
use zeolink_transport::SerialConfig;

use crate::cmd::{session, CaptureArgs};
use crate::exit::{decode_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub fn run(args: CaptureArgs, format: OutputFormat) -> CliResult<i32> {
    let config = SerialConfig {
        baud_rate: args.baud,
        read_timeout: parse_duration(&args.timeout)?,
    };
    let link = BaseLink::open(&args.port, &config).map_err(|err| decode_error("open failed", err))?;

    session::run(link, &args.session, format)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration(" 3 ").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_bad_input() {
        for input in ["", "0s", "fast", "-1s", "5m"] {
            let err = parse_duration(input).unwrap_err();
            assert_eq!(err.code, USAGE, "input {input:?}");
        }
    }
}
