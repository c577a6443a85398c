//! Channel fan-in: merge many receivers into one.

use anyhow::{Context as _, Result};
use crossbeam_channel::Receiver;
use std::thread;
use tracing::trace;

/// Merge `inputs` into a single receiver.
///
/// Every value received on any input is forwarded to the output; no ordering is kept
/// across inputs. The output is a rendezvous channel, so a forwarder waits for the
/// consumer and a slow consumer backpressures the producers. The output disconnects
/// exactly once, after every input has disconnected and been drained. With no inputs the
/// returned receiver is already disconnected.
///
/// Each input gets its own forwarding thread because forwarders block on their producers.
/// If the returned receiver is dropped early, the forwarders stop at their next send.
///
/// # Errors
///
/// Returns an error if a forwarding thread can not be spawned.
///
/// # Example
///
/// ```
/// let (a_tx, a_rx) = crossbeam_channel::unbounded();
/// let (b_tx, b_rx) = crossbeam_channel::unbounded();
/// a_tx.send(1).unwrap();
/// b_tx.send(2).unwrap();
/// drop((a_tx, b_tx));
///
/// let merged = fanflow::fan_in(vec![a_rx, b_rx]).unwrap();
/// let mut got: Vec<i32> = merged.iter().collect();
/// got.sort();
/// assert_eq!(got, vec![1, 2]);
/// ```
pub fn fan_in<T: Send + 'static>(inputs: Vec<Receiver<T>>) -> Result<Receiver<T>> {
    fan_in_iter(inputs)
}

/// [`fan_in`] over any iterator of receivers.
///
/// # Errors
///
/// Returns an error if a forwarding thread can not be spawned.
pub fn fan_in_iter<T, I>(inputs: I) -> Result<Receiver<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = Receiver<T>>,
{
    let (tx, rx) = crossbeam_channel::bounded(0);

    for (source, input) in inputs.into_iter().enumerate() {
        let tx = tx.clone();
        thread::Builder::new()
            .name(format!("fanflow-fan-in-{source}"))
            .spawn(move || {
                trace!(source, "fan-in forwarder started");
                for value in input.iter() {
                    if tx.send(value).is_err() {
                        trace!(source, "fan-in consumer gone");
                        return;
                    }
                }
                trace!(source, "fan-in source drained");
            })
            .with_context(|| format!("failed to spawn fan-in forwarder {source}"))?;
    }

    // Each forwarder owns a sender clone; the output disconnects when the last one exits.
    drop(tx);
    Ok(rx)
}
