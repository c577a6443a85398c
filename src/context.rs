//! Hierarchical cancellation contexts.
//!
//! A [`Context`] is a cheap, cloneable handle onto a cancellation signal. Contexts form a
//! tree: cancelling a context cancels all of its live descendants, but never its parent.
//! Once cancelled a context stays cancelled, and the first reason recorded wins.
//!
//! The signal is exposed three ways:
//! - polling: [`Context::is_cancelled`], [`Context::err`], [`Context::check`]
//! - blocking: [`Context::wait`]
//! - selecting: [`Context::done`] returns a receiver that disconnects on cancellation,
//!   so it can sit in a `crossbeam_channel::select!` next to other operations.
//!
//! # Example
//!
//! ```
//! use fanflow::{Context, ContextError};
//!
//! let root = Context::background();
//! let (ctx, cancel) = Context::with_cancel(&root);
//! assert!(ctx.check().is_ok());
//!
//! cancel.cancel();
//! assert_eq!(ctx.err(), Some(ContextError::Canceled));
//! assert!(!root.is_cancelled());
//! ```

use crate::error::ContextError;
use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

/// Cancellation signal shared by a subtree of work.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

/// Cancels the [`Context`] it was created with.
///
/// Separate from the context itself so that code receiving a `Context` can observe
/// cancellation without being able to trigger it.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

/// Cancels its context when dropped. See [`CancelHandle::drop_guard`].
#[must_use = "the context is cancelled as soon as the guard is dropped"]
pub struct DropGuard {
    handle: CancelHandle,
}

struct Inner {
    cancelled: AtomicBool,
    state: Mutex<State>,
    done_rx: Receiver<()>,
    deadline: Option<Instant>,
    parent: Option<Arc<Inner>>,
}

struct State {
    err: Option<ContextError>,
    // Never sent on; dropping it disconnects every clone of `done_rx`.
    done_tx: Option<Sender<()>>,
    children: Vec<Weak<Inner>>,
}

impl Inner {
    fn new(parent: Option<Arc<Inner>>, deadline: Option<Instant>) -> Arc<Self> {
        let (done_tx, done_rx) = crossbeam_channel::bounded(0);
        Arc::new(Self {
            cancelled: AtomicBool::new(false),
            state: Mutex::new(State {
                err: None,
                done_tx: Some(done_tx),
                children: Vec::new(),
            }),
            done_rx,
            deadline,
            parent,
        })
    }

    fn cancel(self: &Arc<Self>, reason: ContextError) {
        let children = {
            let mut state = self.state.lock();
            if state.err.is_some() {
                return;
            }
            state.err = Some(reason);
            self.cancelled.store(true, Ordering::Release);
            state.done_tx.take();
            std::mem::take(&mut state.children)
        };
        trace!(?reason, children = children.len(), "context cancelled");

        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel(reason);
        }

        if let Some(parent) = &self.parent {
            let me = Arc::as_ptr(self);
            parent
                .state
                .lock()
                .children
                .retain(|w| w.strong_count() > 0 && w.as_ptr() != me);
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Context {
    /// A root context. It is never cancelled on its own and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self {
            inner: Inner::new(None, None),
        }
    }

    /// Derive a child that can be cancelled independently of `parent`.
    ///
    /// The child is cancelled with the parent's reason when the parent is cancelled,
    /// including when the parent is already cancelled at the time of the call.
    #[must_use]
    pub fn with_cancel(parent: &Context) -> (Context, CancelHandle) {
        let inner = Inner::new(Some(Arc::clone(&parent.inner)), parent.inner.deadline);
        parent.attach(&inner);
        (
            Context {
                inner: Arc::clone(&inner),
            },
            CancelHandle { inner },
        )
    }

    /// Derive a child that is cancelled with [`ContextError::DeadlineExceeded`] once
    /// `deadline` passes.
    ///
    /// If the parent already has an earlier deadline this behaves like
    /// [`Context::with_cancel`]. A deadline in the past yields an already-expired context.
    ///
    /// # Errors
    ///
    /// Returns an error if the deadline timer thread can not be spawned.
    pub fn with_deadline(parent: &Context, deadline: Instant) -> Result<(Context, CancelHandle)> {
        if parent.inner.deadline.is_some_and(|d| d <= deadline) {
            return Ok(Self::with_cancel(parent));
        }

        let inner = Inner::new(Some(Arc::clone(&parent.inner)), Some(deadline));
        parent.attach(&inner);

        if inner.deadline_passed() {
            inner.cancel(ContextError::DeadlineExceeded);
        } else {
            // Weak, so dropping every handle frees the context and disconnects `done`,
            // which ends the timer thread early.
            let timer = Arc::downgrade(&inner);
            let done = inner.done_rx.clone();
            thread::Builder::new()
                .name("fanflow-deadline".into())
                .spawn(move || {
                    crossbeam_channel::select! {
                        recv(done) -> _ => {}
                        recv(crossbeam_channel::at(deadline)) -> _ => {
                            if let Some(timer) = timer.upgrade() {
                                timer.cancel(ContextError::DeadlineExceeded);
                            }
                        }
                    }
                })?;
        }

        Ok((
            Context {
                inner: Arc::clone(&inner),
            },
            CancelHandle { inner },
        ))
    }

    /// Shorthand for [`Context::with_deadline`] at `now + timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the deadline timer thread can not be spawned.
    pub fn with_timeout(parent: &Context, timeout: Duration) -> Result<(Context, CancelHandle)> {
        Self::with_deadline(parent, Instant::now() + timeout)
    }

    fn attach(&self, child: &Arc<Inner>) {
        let mut state = self.inner.state.lock();
        let parent_err = state.err;
        if let Some(reason) = parent_err {
            drop(state);
            child.cancel(reason);
            return;
        }
        state.children.retain(|w| w.strong_count() > 0);
        state.children.push(Arc::downgrade(child));
    }

    /// True once this context has been cancelled or its deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// Why the context was cancelled, or `None` while it is still live.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        if !self.inner.cancelled.load(Ordering::Acquire) {
            if !self.inner.deadline_passed() {
                return None;
            }
            self.inner.cancel(ContextError::DeadlineExceeded);
        }
        self.inner.state.lock().err
    }

    /// `Err` with the cancellation reason once the context is cancelled.
    ///
    /// Intended for task bodies: `ctx.check()?;` before each unit of work.
    pub fn check(&self) -> Result<(), ContextError> {
        match self.err() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Receiver that never yields a value and disconnects when the context is cancelled.
    ///
    /// Deadline expiry is delivered by a timer thread, so it can trail the polling
    /// methods by a scheduling quantum.
    #[must_use]
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done_rx
    }

    /// Block the current thread until the context is cancelled.
    pub fn wait(&self) {
        let _ = self.inner.done_rx.recv();
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("err", &self.err())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}

impl CancelHandle {
    /// Cancel the context with [`ContextError::Canceled`]. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel(ContextError::Canceled);
    }

    /// Turn this handle into a guard that cancels the context when dropped.
    pub fn drop_guard(self) -> DropGuard {
        DropGuard { handle: self }
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}
