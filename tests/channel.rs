use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use fanflow::{fan_in, fan_in_iter};
use std::collections::HashSet;
use std::thread;
use std::time::Duration;

/// Drain `rx`, failing if it neither yields nor disconnects within `limit`.
fn drain<T>(rx: &Receiver<T>, limit: Duration) -> Vec<T> {
    let mut out = Vec::new();
    loop {
        match rx.recv_timeout(limit) {
            Ok(v) => out.push(v),
            Err(RecvTimeoutError::Disconnected) => return out,
            Err(RecvTimeoutError::Timeout) => panic!("fan-in output did not close in time"),
        }
    }
}

#[test]
fn fan_in_merges_preloaded_channels() -> Result<()> {
    let mut sources = Vec::new();
    for i in 0..5 {
        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(i)?;
        sources.push(rx);
    }

    let merged = fan_in(sources)?;
    let sum: i32 = drain(&merged, Duration::from_secs(5)).into_iter().sum();
    assert_eq!(sum, 10);
    Ok(())
}

#[test]
fn fan_in_yields_union_of_disjoint_inputs() -> Result<()> {
    let mut sources = Vec::new();
    let mut producers = Vec::new();
    for p in 0..4u32 {
        let (tx, rx) = crossbeam_channel::unbounded();
        sources.push(rx);
        producers.push(thread::spawn(move || {
            for i in 0..100u32 {
                if tx.send(p * 1_000 + i).is_err() {
                    return;
                }
            }
        }));
    }

    let merged = fan_in(sources)?;
    let got = drain(&merged, Duration::from_secs(5));
    for producer in producers {
        producer.join().expect("producer thread");
    }

    let expected: HashSet<u32> = (0..4u32)
        .flat_map(|p| (0..100u32).map(move |i| p * 1_000 + i))
        .collect();
    assert_eq!(got.len(), expected.len());
    assert_eq!(got.into_iter().collect::<HashSet<_>>(), expected);
    Ok(())
}

#[test]
fn fan_in_without_inputs_is_closed() -> Result<()> {
    let merged = fan_in(Vec::<Receiver<u8>>::new())?;
    assert_eq!(
        merged.recv_timeout(Duration::from_secs(1)),
        Err(RecvTimeoutError::Disconnected)
    );
    Ok(())
}

#[test]
fn fan_in_output_is_unbuffered() -> Result<()> {
    let (_tx, rx) = crossbeam_channel::unbounded::<u8>();
    let merged = fan_in(vec![rx])?;
    assert_eq!(merged.capacity(), Some(0));
    Ok(())
}

#[test]
fn fan_in_stays_open_until_last_input_closes() -> Result<()> {
    let (early_tx, early_rx) = crossbeam_channel::unbounded();
    let (late_tx, late_rx) = crossbeam_channel::unbounded();
    early_tx.send("early")?;
    drop(early_tx);

    let merged = fan_in(vec![early_rx, late_rx])?;
    assert_eq!(merged.recv_timeout(Duration::from_secs(5))?, "early");
    assert_eq!(
        merged.recv_timeout(Duration::from_millis(50)),
        Err(RecvTimeoutError::Timeout)
    );

    late_tx.send("late")?;
    drop(late_tx);
    assert_eq!(drain(&merged, Duration::from_secs(5)), vec!["late"]);
    Ok(())
}

#[test]
fn fan_in_stops_forwarding_after_consumer_drops() -> Result<()> {
    let (tx, rx) = crossbeam_channel::bounded(0);
    let merged = fan_in(vec![rx])?;
    drop(merged);

    // The forwarder exits on its first failed send, which disconnects the input.
    let mut sent = 0;
    while tx.send_timeout(sent, Duration::from_secs(5)).is_ok() {
        sent += 1;
        assert!(sent < 10, "forwarder kept accepting values");
    }
    Ok(())
}

#[test]
fn fan_in_iter_accepts_any_iterator() -> Result<()> {
    let merged = fan_in_iter((0..3).map(|i| {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(i).expect("unbounded send");
        rx
    }))?;
    let mut got = drain(&merged, Duration::from_secs(5));
    got.sort();
    assert_eq!(got, vec![0, 1, 2]);
    Ok(())
}
