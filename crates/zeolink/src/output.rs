use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde_json::Value;
use zeolink_decoder::{Event, Record, Slice, Timestamp};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_record(record: &Record, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", record_json(record)),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            match record {
                Record::Event(event) => {
                    table
                        .set_header(vec!["TIME", "EVENT", "VERSION"])
                        .add_row(vec![
                            event.timestamp.zeo_time(),
                            event.name().to_string(),
                            event.version.to_string(),
                        ]);
                }
                Record::Slice(slice) => {
                    table
                        .set_header(vec![
                            "TIME", "SQI", "IMPEDANCE", "BAD SIGNAL", "STAGE", "SAMPLES", "BINS",
                        ])
                        .add_row(vec![
                            zeo_time(slice.timestamp.as_ref()),
                            optional(slice.sqi),
                            slice
                                .impedance
                                .map(|ohms| format!("{ohms:.1}"))
                                .unwrap_or_else(|| "-".to_string()),
                            optional(slice.bad_signal),
                            optional(slice.sleep_stage),
                            slice.waveform.len().to_string(),
                            slice.frequency_bins.len().to_string(),
                        ]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => match record {
            Record::Event(event) => println!("{}", pretty_event(event)),
            Record::Slice(slice) => println!("{}", pretty_slice(slice)),
        },
    }
}

/// The serialized record with its Zeo-style time alongside.
fn record_json(record: &Record) -> String {
    let timestamp = match record {
        Record::Event(event) => Some(&event.timestamp),
        Record::Slice(slice) => slice.timestamp.as_ref(),
    };

    let mut value = serde_json::to_value(record).unwrap_or(Value::Null);
    if let Some(map) = value.as_object_mut() {
        map.insert("zeo_time".to_string(), Value::from(zeo_time(timestamp)));
    }
    value.to_string()
}

fn pretty_event(event: &Event) -> String {
    format!(
        "{} event {} (v{})",
        event.timestamp.zeo_time(),
        event.name(),
        event.version
    )
}

fn pretty_slice(slice: &Slice) -> String {
    format!(
        "{} slice sqi={} impedance={} bad_signal={} stage={} samples={} bins={}",
        zeo_time(slice.timestamp.as_ref()),
        optional(slice.sqi),
        optional(slice.impedance),
        optional(slice.bad_signal),
        optional(slice.sleep_stage),
        slice.waveform.len(),
        slice.frequency_bins.len()
    )
}

fn zeo_time(timestamp: Option<&Timestamp>) -> String {
    timestamp.map(Timestamp::zeo_time).unwrap_or_else(|| "-".to_string())
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
