//! The `locc` command line.
//!
//! `locc check` runs the front-end and reports errors; `locc tokens` and
//! `locc ast` dump the lexer and parser views of a file for tooling and
//! debugging.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use locc_drv::{compile, Source};
use locc_lex::{Kind, Lexer};

/// Compiler front-end for loc message catalogs.
#[derive(Parser, Debug)]
#[command(name = "locc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler front-end for loc message catalogs", long_about = None)]
struct Cli {
    /// Enable verbose stage logging
    #[arg(short, long, global = true, env = "LOCC_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and analyze a catalog, reporting every error found
    Check {
        /// The .loc source file
        file: PathBuf,
    },

    /// Dump the token stream of a source file
    Tokens {
        /// The .loc source file
        file: PathBuf,
    },

    /// Dump the parsed syntax tree of a source file
    Ast {
        /// The .loc source file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Tokens { file } => tokens(&file),
        Commands::Ast { file } => ast(&file),
    }
}

fn read(path: &PathBuf) -> Result<Source, ExitCode> {
    Source::read(path)
        .with_context(|| format!("cannot read {}", path.display()))
        .map_err(|error| {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        })
}

fn check(path: &PathBuf) -> ExitCode {
    let source = match read(path) {
        Ok(source) => source,
        Err(code) => return code,
    };

    match compile(&source) {
        Ok(output) => {
            println!(
                "{}: {} targets, {} sections, {} fns, {} types",
                output.analysis.name,
                output.analysis.targets.len(),
                output.analysis.sections.len(),
                output.module.fns.len(),
                output.module.types.len(),
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            for line in error.format_errors() {
                eprintln!("{line}");
            }
            ExitCode::FAILURE
        }
    }
}

fn tokens(path: &PathBuf) -> ExitCode {
    let source = match read(path) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let mut lexer = Lexer::new(&source.text);
    loop {
        let token = lexer.next_token();
        println!("{} {}", token.range, token);
        if token.kind == Kind::Eof {
            break;
        }
    }

    ExitCode::SUCCESS
}

fn ast(path: &PathBuf) -> ExitCode {
    let source = match read(path) {
        Ok(source) => source,
        Err(code) => return code,
    };

    match locc_par::parse(&source.name, &source.text) {
        Ok(file) => {
            println!("{file:#?}");
            ExitCode::SUCCESS
        }
        Err(set) => {
            for error in set.iter() {
                use locc_util::Ranged;
                eprintln!("{} at {} in {}", error, error.range(), set.file());
            }
            ExitCode::FAILURE
        }
    }
}
