//! Concurrent fan-out / fan-in transforms over slices.
//!
//! Both transforms spawn one rayon task per input element; rayon multiplexes those
//! tasks onto its worker threads.
//!
//! - [`parallel_map`] is infallible and index-preserving: slot `i` of the output is
//!   written by task `i` only, so no locking is involved.
//! - [`try_parallel_map`] runs fallible transforms under a [`Context`]. The first failure
//!   cancels the remaining work, every failure seen before the result channel closes is
//!   joined into a [`MultiError`], and no partial result is ever returned.

use crate::context::{CancelHandle, Context};
use crate::error::MultiError;
use anyhow::Context as _;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::thread;
use tracing::{debug, trace};

/// Apply `f` to every element of `input` concurrently.
///
/// `output[i] == f(&input[i])` for every `i`, and all calls have completed when this
/// returns. An empty input returns immediately without spawning anything. A panic inside
/// `f` is re-raised on the calling thread once every task has finished.
///
/// # Example
///
/// ```
/// let squares = fanflow::parallel_map(&[1, 2, 3, 4], |x: &i32| x * x);
/// assert_eq!(squares, vec![1, 4, 9, 16]);
/// ```
pub fn parallel_map<T, O, F>(input: &[T], f: F) -> Vec<O>
where
    T: Sync,
    O: Send,
    F: Fn(&T) -> O + Sync,
{
    if input.is_empty() {
        return Vec::new();
    }
    debug!(tasks = input.len(), "parallel_map fan-out");

    let mut slots: Vec<Option<O>> = Vec::with_capacity(input.len());
    slots.resize_with(input.len(), || None);

    let f = &f;
    let tasks = slots.iter_mut().zip(input);
    rayon::scope(move |s| {
        for (slot, item) in tasks {
            s.spawn(move |_| *slot = Some(f(item)));
        }
    });

    let out: Vec<O> = slots.into_iter().flatten().collect();
    debug_assert_eq!(out.len(), input.len());
    out
}

/// Apply the fallible `f` to every element of `input` concurrently, all-or-nothing.
///
/// Each task receives a child of `ctx`. The child is cancelled as soon as any task fails,
/// when `ctx` itself is cancelled, and unconditionally when this function returns. Tasks
/// that want to stop early should call [`Context::check`].
///
/// On success the results are returned in input order. On failure every error observed
/// before the last task finished is returned in a [`MultiError`], including the
/// cancellation errors of tasks that stopped because of the first failure.
///
/// # Example
///
/// ```
/// use fanflow::{Context, try_parallel_map};
///
/// let ctx = Context::background();
/// let parsed = try_parallel_map(&ctx, &["1", "2", "3"], |ctx, s: &&str| {
///     ctx.check()?;
///     Ok(s.parse::<i32>()?)
/// });
/// assert_eq!(parsed.unwrap(), vec![1, 2, 3]);
///
/// let failed = try_parallel_map(&ctx, &["1", "2", "x"], |_, s: &&str| Ok(s.parse::<i32>()?));
/// let err = failed.unwrap_err();
/// assert!(err.find::<std::num::ParseIntError>().is_some());
/// ```
pub fn try_parallel_map<T, O, F>(ctx: &Context, input: &[T], f: F) -> Result<Vec<O>, MultiError>
where
    T: Sync,
    O: Send,
    F: Fn(&Context, &T) -> anyhow::Result<O> + Sync,
{
    if input.is_empty() {
        return Ok(Vec::new());
    }
    debug!(tasks = input.len(), "try_parallel_map fan-out");

    let (child, cancel) = Context::with_cancel(ctx);
    let _guard = cancel.clone().drop_guard();

    // Capacity covers one message per task, so a publish only waits once the
    // aggregator has stopped draining.
    let (tx, rx) = crossbeam_channel::bounded::<(usize, anyhow::Result<O>)>(input.len());

    let f = &f;
    let child = &child;
    thread::scope(|s| -> Result<Vec<O>, MultiError> {
        // The aggregator gets its own thread so it never runs task bodies: a task
        // waiting for cancellation can not hold up the failure that triggers it.
        let aggregator = thread::Builder::new()
            .name("fanflow-aggregator".into())
            .spawn_scoped(s, || aggregate(rx, input.len(), &cancel))
            .context("failed to spawn result aggregator")?;

        // FIFO keeps the scheduling order close to input order, even on a one-thread pool.
        rayon::scope_fifo(|s| {
            for (idx, item) in input.iter().enumerate() {
                let tx = tx.clone();
                s.spawn_fifo(move |_| {
                    let outcome = f(child, item);
                    publish(&tx, child, (idx, outcome));
                });
            }
        });
        // The channel closes once every task has dropped its sender.
        drop(tx);

        aggregator
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    })
}

/// Drain task outcomes until the channel closes, cancelling on the first error.
fn aggregate<O>(
    rx: Receiver<(usize, anyhow::Result<O>)>,
    len: usize,
    cancel: &CancelHandle,
) -> Result<Vec<O>, MultiError> {
    let mut slots: Vec<Option<O>> = Vec::with_capacity(len);
    slots.resize_with(len, || None);
    let mut errors = MultiError::new();

    for (idx, outcome) in rx {
        match outcome {
            Ok(value) => slots[idx] = Some(value),
            Err(err) => {
                if errors.is_empty() {
                    debug!(index = idx, error = %err, "task failed; cancelling siblings");
                }
                errors.push(err);
                cancel.cancel();
            }
        }
    }

    if !errors.is_empty() {
        debug!(errors = errors.len(), "try_parallel_map failed");
        return Err(errors);
    }
    Ok(slots.into_iter().flatten().collect())
}

/// Send `msg`, or give up if the channel is full and `ctx` gets cancelled first.
fn publish<M>(tx: &Sender<M>, ctx: &Context, msg: M) {
    match tx.try_send(msg) {
        Ok(()) | Err(TrySendError::Disconnected(_)) => {}
        Err(TrySendError::Full(msg)) => {
            let done = ctx.done();
            crossbeam_channel::select! {
                send(tx, msg) -> _ => {}
                recv(done) -> _ => trace!("result publish abandoned after cancellation"),
            }
        }
    }
}
