//! Error types shared by the concurrent transforms.
//!
//! - [`ContextError`] is what a task sees once its [`Context`](crate::Context) has been
//!   cancelled or its deadline has passed.
//! - [`MultiError`] is the composite error returned by
//!   [`try_parallel_map`](crate::try_parallel_map): every failure observed before the
//!   result channel closed, joined into one value.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Reason a [`Context`](crate::Context) stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context (or one of its ancestors) was cancelled explicitly.
    #[error("context canceled")]
    Canceled,
    /// The context's deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// One or more task failures joined into a single error.
///
/// Causes are kept in the order the aggregator received them. `Display` prints one
/// cause per line.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<anyhow::Error>,
}

impl MultiError {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cause.
    pub fn push(&mut self, err: anyhow::Error) {
        self.errors.push(err);
    }

    /// Number of joined causes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// All joined causes.
    #[must_use]
    pub fn errors(&self) -> &[anyhow::Error] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &anyhow::Error> {
        self.errors.iter()
    }

    /// First cause whose chain contains an error of type `E`.
    #[must_use]
    pub fn find<E>(&self) -> Option<&E>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.errors
            .iter()
            .find_map(|e| e.chain().find_map(|c| c.downcast_ref::<E>()))
    }

    /// True when every cause is a [`ContextError`], i.e. the work stopped because of
    /// cancellation rather than a failing transform.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        !self.errors.is_empty()
            && self
                .errors
                .iter()
                .all(|e| e.chain().any(|c| c.is::<ContextError>()))
    }

    /// Consume the composite and return its causes.
    #[must_use]
    pub fn into_errors(self) -> Vec<anyhow::Error> {
        self.errors
    }

    /// `Ok(())` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.errors.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{err:#}")?;
        }
        Ok(())
    }
}

impl StdError for MultiError {}

impl From<anyhow::Error> for MultiError {
    fn from(err: anyhow::Error) -> Self {
        Self { errors: vec![err] }
    }
}

impl FromIterator<anyhow::Error> for MultiError {
    fn from_iter<I: IntoIterator<Item = anyhow::Error>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MultiError {
    type Item = anyhow::Error;
    type IntoIter = std::vec::IntoIter<anyhow::Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a anyhow::Error;
    type IntoIter = std::slice::Iter<'a, anyhow::Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
