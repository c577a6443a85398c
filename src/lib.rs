//! # Fanflow
//!
//! A **collection utility library** for Rust: sequential transforms over slices and maps,
//! plus a small set of concurrency helpers for fanning work out across threads and
//! fanning results back in.
//!
//! ## Key Features
//!
//! - **Parallel transforms** - apply a function to every element concurrently, keeping
//!   output order
//! - **Cancellable transforms** - fallible parallel transforms with first-error
//!   cancellation and aggregated errors
//! - **Cancellation contexts** - hierarchical, idempotent cancellation with deadlines
//! - **Channel fan-in** - merge any number of receivers into one
//! - **Concurrent maps** - a lock-guarded [`SafeMap`] and a sharded [`ConcurrentMap`]
//!   with compare-and-swap
//! - **Sequential helpers** - map, filter, group, distinct, set operations and friends
//!
//! ## Quick Start
//!
//! ```
//! use fanflow::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! // Infallible fan-out: output[i] == f(input[i])
//! let squares = parallel_map(&[1, 2, 3, 4], |x: &i32| x * x);
//! assert_eq!(squares, vec![1, 4, 9, 16]);
//!
//! // Fallible fan-out under a cancellation context
//! let ctx = Context::background();
//! let parsed = try_parallel_map(&ctx, &["10", "20"], |ctx, s: &&str| {
//!     ctx.check()?;
//!     Ok(s.parse::<u32>()?)
//! })?;
//! assert_eq!(parsed, vec![10, 20]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Fan-out
//!
//! [`parallel_map`] spawns one rayon task per element. Each task owns exactly one slot of
//! a pre-sized output buffer, so the result needs no locking and keeps input order.
//!
//! [`try_parallel_map`] runs fallible tasks under a child [`Context`]. The first failure
//! cancels the child, every error seen before the tasks finish is joined into a
//! [`MultiError`], and the caller gets either all results (in input order) or no results.
//!
//! ### Fan-in
//!
//! [`fan_in`] forwards every value from N receivers into one rendezvous channel that
//! disconnects once all inputs have disconnected.
//!
//! ### Maps
//!
//! Both maps implement the [`Store`] and [`AtomicStore`] traits. [`SafeMap`] takes a
//! reader/writer lock per operation; [`ConcurrentMap`] locks only the shard holding the key.
//!
//! ### Execution Modes
//!
//! A [`Runner`] picks between in-order execution on the calling thread and rayon fan-out,
//! optionally on a dedicated pool built from a serde-loadable [`RunnerConfig`].
//!
//! ## Logging
//!
//! The crate emits `tracing` events at `debug` and `trace` level. Install any subscriber
//! to see them; none is installed by the library.
//!
//! ## Module Overview
//!
//! - [`transform`] - [`parallel_map`] and [`try_parallel_map`]
//! - [`context`] - cancellation contexts
//! - [`channel`] - channel fan-in
//! - [`maps`] - concurrency-safe maps
//! - [`runner`] - sequential/parallel execution modes
//! - [`collection`] - sequential transforms
//! - [`error`] - error types

pub mod channel;
pub mod collection;
pub mod context;
pub mod error;
pub mod maps;
pub mod runner;
pub mod transform;

// General re-exports
pub use channel::{fan_in, fan_in_iter};
pub use context::{CancelHandle, Context, DropGuard};
pub use error::{ContextError, MultiError};
pub use maps::{AtomicStore, ConcurrentMap, SafeMap, Store};
pub use runner::{ExecMode, Runner, RunnerConfig};
pub use transform::{parallel_map, try_parallel_map};
