//! locc-sem - Semantic analysis for the loc language.
//!
//! Takes the parsed AST and produces a fully typed view of the catalog:
//! a type environment, a value scope, the declared-target map, and the
//! section tree the emitter consumes. Analysis runs as five passes in a
//! fixed order (targets, imports, types, functions, sections) and
//! accumulates errors across all of them.
//!
//! The type system is a closed set of variants with four relations:
//! assignability (nominal), comparability and convertibility (root
//! structural), and operability (numeric roots only). See [`types`].

pub mod analyzer;
pub mod checker;
pub mod env;
pub mod error;
pub mod pkg;
pub mod scope;
pub mod types;

pub use analyzer::{Analysis, Analyzer, Key, Section, Template};
pub use checker::Checker;
pub use env::TypeEnv;
pub use error::{Resolvable, SemanticError};
pub use pkg::{BuiltinResolver, NoPackages, Package, PackageResolver};
pub use scope::Scope;
pub use types::{Constant, FnType, Operation, Type, TypePair};
