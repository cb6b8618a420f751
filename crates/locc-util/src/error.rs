//! Error aggregation shared by the parser and the analyzer.
//!
//! Stages accumulate errors instead of aborting at the first failure. An
//! [`ErrorSet`] carries the whole batch together with the file name; its
//! own `Display` and range mirror the first error so IDE integrations get
//! a single primary location, while the full list stays available through
//! [`ErrorSet::iter`].

use std::error::Error;
use std::fmt;

use crate::pos::Range;

/// Implemented by every error value that points at source code.
pub trait Ranged {
    /// The range of the token or node that provoked the error.
    fn range(&self) -> Range;
}

/// A non-empty batch of errors from one stage over one file.
#[derive(Debug)]
pub struct ErrorSet<E> {
    file: String,
    errors: Vec<E>,
}

impl<E> ErrorSet<E> {
    /// Bundle the accumulated errors for `file`.
    ///
    /// Callers only construct a set when at least one error occurred; an
    /// empty `errors` list is a caller bug and panics in debug builds.
    pub fn new(file: impl Into<String>, errors: Vec<E>) -> Self {
        debug_assert!(!errors.is_empty(), "error set must not be empty");
        Self {
            file: file.into(),
            errors,
        }
    }

    /// The file the errors were found in.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The first error, which defines the set's primary position.
    pub fn first(&self) -> &E {
        &self.errors[0]
    }

    /// All errors, in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<E: Ranged> ErrorSet<E> {
    /// The range of the first error.
    pub fn range(&self) -> Range {
        self.first().range()
    }
}

impl<E: fmt::Display> fmt::Display for ErrorSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errors[0])
    }
}

impl<E: fmt::Debug + fmt::Display> Error for ErrorSet<E> {}
