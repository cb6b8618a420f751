//! locc-util - Shared infrastructure for the loc compiler.
//!
//! This crate holds the pieces every stage needs: source positions and
//! ranges, the small context stack used by the parser and the checker,
//! and the error-set aggregation that lets stages report many errors at
//! once instead of stopping at the first one.

pub mod error;
pub mod pos;
pub mod stack;

pub use error::{ErrorSet, Ranged};
pub use pos::{Position, Range};
pub use stack::Stack;
