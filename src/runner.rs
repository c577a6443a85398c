//! Execution-mode configuration for the transforms.
//!
//! A [`Runner`] decides how a transform is executed:
//! - [`ExecMode::Sequential`] runs it in order on the calling thread, using the plain
//!   helpers from [`collection`](crate::collection).
//! - [`ExecMode::Parallel`] fans it out with [`parallel_map`] / [`try_parallel_map`],
//!   either on the global rayon pool or on a dedicated pool sized by `threads`.
//!
//! Both modes produce the same results; only scheduling differs.

use crate::collection::transform_by;
use crate::context::Context;
use crate::error::MultiError;
use crate::transform::{parallel_map, try_parallel_map};
use anyhow::{Context as _, Result};
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecMode {
    Sequential,
    /// `threads: None` runs on the global rayon pool; `Some(0)` means one thread per CPU.
    Parallel { threads: Option<usize> },
}

impl Default for ExecMode {
    fn default() -> Self {
        Self::Parallel { threads: None }
    }
}

/// Serializable runner settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub mode: ExecMode,
    /// Prefix for the worker thread names of a dedicated pool.
    pub thread_name_prefix: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: ExecMode::default(),
            thread_name_prefix: "fanflow-worker".to_string(),
        }
    }
}

impl RunnerConfig {
    /// Parse settings from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid runner config")
    }
}

#[derive(Clone, Default)]
pub struct Runner {
    pub mode: ExecMode,
    pool: Option<Arc<ThreadPool>>,
}

impl Runner {
    /// In-order execution on the calling thread.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            mode: ExecMode::Sequential,
            pool: None,
        }
    }

    /// Build a runner, creating a dedicated thread pool when the config asks for a
    /// specific thread count.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread pool can not be built.
    pub fn from_config(config: &RunnerConfig) -> Result<Self> {
        let pool = match config.mode {
            ExecMode::Parallel {
                threads: Some(threads),
            } => {
                let threads = if threads == 0 { num_cpus::get() } else { threads };
                let prefix = config.thread_name_prefix.clone();
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(move |i| format!("{prefix}-{i}"))
                    .build()
                    .context("failed to build runner thread pool")?;
                debug!(threads, "built dedicated runner pool");
                Some(Arc::new(pool))
            }
            _ => None,
        };
        Ok(Self {
            mode: config.mode,
            pool,
        })
    }

    /// Worker threads available to parallel transforms (1 when sequential).
    #[must_use]
    pub fn threads(&self) -> usize {
        match (self.mode, &self.pool) {
            (ExecMode::Sequential, _) => 1,
            (_, Some(pool)) => pool.current_num_threads(),
            (_, None) => rayon::current_num_threads(),
        }
    }

    /// Infallible transform; output order always matches input order.
    pub fn map<T, O, F>(&self, input: &[T], f: F) -> Vec<O>
    where
        T: Sync,
        O: Send,
        F: Fn(&T) -> O + Sync,
    {
        match self.mode {
            ExecMode::Sequential => transform_by(input, f),
            ExecMode::Parallel { .. } => {
                let f = &f;
                self.install(|| parallel_map(input, f))
            }
        }
    }

    /// Fallible, all-or-nothing transform under `ctx`.
    ///
    /// The sequential mode stops at the first failure (or at cancellation), so its
    /// [`MultiError`] always holds exactly one cause.
    pub fn try_map<T, O, F>(&self, ctx: &Context, input: &[T], f: F) -> Result<Vec<O>, MultiError>
    where
        T: Sync,
        O: Send,
        F: Fn(&Context, &T) -> Result<O> + Sync,
    {
        match self.mode {
            ExecMode::Sequential => {
                let mut out = Vec::with_capacity(input.len());
                for item in input {
                    ctx.check().map_err(anyhow::Error::from)?;
                    out.push(f(ctx, item)?);
                }
                Ok(out)
            }
            ExecMode::Parallel { .. } => {
                let f = &f;
                self.install(|| try_parallel_map(ctx, input, f))
            }
        }
    }

    fn install<R, OP>(&self, op: OP) -> R
    where
        R: Send,
        OP: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("mode", &self.mode)
            .field("threads", &self.threads())
            .finish()
    }
}
