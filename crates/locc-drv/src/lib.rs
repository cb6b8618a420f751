//! locc-drv - The compilation driver.
//!
//! Wires the stages together: read a source file, parse it, analyze it,
//! and lower the result into emitter definitions. On failure the full
//! error set is preserved; [`format_errors`] renders each error in the
//! stable human format:
//!
//! ```text
//! <message> at <start> - <end> in <file>
//! ```
//!
//! where positions are `line:column`.

use std::fmt;
use std::fs;
use std::path::Path;

use locc_par::SyntaxError;
use locc_sem::{Analysis, Analyzer, BuiltinResolver, SemanticError};
use locc_util::{ErrorSet, Ranged};
use thiserror::Error;
use tracing::debug;

/// A named source text.
#[derive(Clone, Debug)]
pub struct Source {
    pub name: String,
    pub text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Read a source file from disk; the file name becomes the error
    /// report name.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self {
            name: path.display().to_string(),
            text,
        })
    }
}

/// A failed compilation: the stage that failed and its error batch.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    Syntax(ErrorSet<SyntaxError>),
    #[error("{0}")]
    Semantic(ErrorSet<SemanticError>),
}

impl CompileError {
    /// Every error in the batch, rendered in the stable format.
    pub fn format_errors(&self) -> Vec<String> {
        match self {
            CompileError::Syntax(set) => format_errors(set),
            CompileError::Semantic(set) => format_errors(set),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CompileError::Syntax(set) => set.len(),
            CompileError::Semantic(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render every error of a set as
/// `<message> at <start> - <end> in <file>`.
pub fn format_errors<E: fmt::Display + Ranged>(set: &ErrorSet<E>) -> Vec<String> {
    set.iter()
        .map(|error| format!("{} at {} in {}", error, error.range(), set.file()))
        .collect()
}

/// A successful compilation.
#[derive(Clone, Debug)]
pub struct Output {
    pub file: locc_par::ast::File,
    pub analysis: Analysis,
    pub module: locc_ir::Module,
}

/// Run the front-end over one source: parse, analyze, lower.
///
/// The emitter is never invoked on error; the error set comes back
/// intact instead.
pub fn compile(source: &Source) -> Result<Output, CompileError> {
    debug!(file = %source.name, bytes = source.text.len(), "compiling");

    let file = locc_par::parse(&source.name, &source.text).map_err(CompileError::Syntax)?;

    let analysis = Analyzer::with_resolver(&source.name, &file, BuiltinResolver)
        .run()
        .map_err(CompileError::Semantic)?;

    let module = locc_ir::lower(&file, &analysis);
    debug!(
        fns = module.fns.len(),
        types = module.types.len(),
        sections = analysis.sections.len(),
        "compiled"
    );

    Ok(Output {
        file,
        analysis,
        module,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> Source {
        Source::new("main.loc", text)
    }

    #[test]
    fn test_minimal_file_compiles() {
        let output = compile(&source("declare app (en)")).unwrap();
        assert_eq!(output.analysis.name, "app");
        assert!(output.module.fns.is_empty());
    }

    #[test]
    fn test_full_pipeline() {
        let output = compile(&source(
            r#"declare app (en "fr-FR" as fr)

import List

fn (names: string[]) listing List::Join(names)

section home {
    greeting(names: string[]) {
        en `hello { listing(names) }`
        fr `bonjour { listing(names) }`
    }
}"#,
        ))
        .unwrap();

        assert_eq!(output.analysis.targets.len(), 2);
        assert_eq!(output.analysis.sections.len(), 1);
        assert_eq!(output.module.fns.len(), 1);
    }

    #[test]
    fn test_syntax_error_formatting() {
        let err = compile(&source("declare app (en\n")).unwrap_err();
        let lines = err.format_errors();
        assert!(!lines.is_empty());
        assert!(lines[0].contains(" at "), "{}", lines[0]);
        assert!(lines[0].ends_with("in main.loc"), "{}", lines[0]);
    }

    #[test]
    fn test_semantic_error_formatting() {
        let err = compile(&source(
            "declare app (en)\ntype Test bool\ntype Test int",
        ))
        .unwrap_err();

        let lines = err.format_errors();
        assert_eq!(lines.len(), 1);
        // "<message> at <start> - <end> in <file>"
        assert!(
            lines[0].starts_with("duplicate definition: 'Test' is already defined here 2:1 - 2:15 at 3:1"),
            "{}",
            lines[0]
        );
        assert!(lines[0].ends_with("in main.loc"));
    }

    #[test]
    fn test_emitter_not_reached_on_error() {
        let err = compile(&source("declare app (en zz-ZZZZZZZZZ!)")).unwrap_err();
        assert!(matches!(err, CompileError::Syntax(_) | CompileError::Semantic(_)));
        assert!(!err.is_empty());
    }
}
