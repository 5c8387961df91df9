//! Bounded handoff of decoded records to a consumer thread.
//!
//! Events and slices share one channel, so the consumer sees them in the
//! order the parser emitted them. When the channel is full the decoding
//! thread blocks rather than dropping records.

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::parser::Parser;
use crate::record::Record;

/// Route every event and slice from `parser` into a bounded channel.
///
/// Records emitted after the receiver is dropped are discarded.
pub fn attach(parser: &mut Parser, capacity: usize) -> Receiver<Record> {
    let (tx, rx) = crossbeam_channel::bounded(capacity);

    let events = tx.clone();
    parser.add_event_callback(move |event| forward(&events, Record::Event(event.clone())));
    parser.add_slice_callback(move |slice| forward(&tx, Record::Slice(slice.clone())));

    rx
}

fn forward(tx: &Sender<Record>, record: Record) {
    if tx.send(record).is_err() {
        debug!("record receiver dropped");
    }
}
