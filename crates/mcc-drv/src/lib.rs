//! mcc-drv - Compiler driver.
//!
//! The driver is the orchestrator for the compilation pipeline:
//!
//! 1. Parse command-line arguments into a [`Config`].
//! 2. Read the source: `.i` files directly, anything else through the
//!    external C preprocessor (`gcc -E -P`).
//! 3. Run the stages in order - lex, parse, semantic passes, IR lowering,
//!    codegen - stopping early at the stage the flag selects.
//! 4. Write `<stem>.s` next to the input, or print the requested
//!    intermediate representation.
//!
//! Every failure maps onto one process exit code (see
//! [`mcc_util::ExitCode`]); the driver reports the first error of the
//! first failing stage and stops. Error codes are returned as values and
//! compared against success explicitly, never folded into a condition.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use mcc_gen::CodegenError;
use mcc_lex::{Lexer, TokenKind};
use mcc_par::{ParseError, Parser};
use mcc_sem::SemanticError;
use mcc_util::{ExitCode, Handler};
use thiserror::Error;

/// How far down the pipeline to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Stop after lexing.
    Lex,
    /// Stop after parsing.
    Parse,
    /// Print the AST and stop.
    PrintAst,
    /// Print the IR and stop.
    Tacky,
    /// Stop after assembly-tree construction, no emission.
    Codegen,
    /// Full pipeline, writing the `.s` file.
    Full,
}

/// One driver invocation: which input, and how far to go.
#[derive(Clone, Debug)]
pub struct Config {
    pub stage: Stage,
    pub input: PathBuf,
}

impl Config {
    /// Parses command-line arguments (without the program name).
    pub fn from_args(args: &[String]) -> Result<Self, DriverError> {
        if args.is_empty() || args.len() > 2 {
            return Err(DriverError::Usage);
        }

        let input = PathBuf::from(args.last().expect("args checked non-empty"));
        if !input.is_file() {
            return Err(DriverError::InputNotFound(input.display().to_string()));
        }

        let stage = if args.len() == 2 {
            match args[0].as_str() {
                "--lex" => Stage::Lex,
                "--parse" => Stage::Parse,
                "--printAst" => Stage::PrintAst,
                "--tacky" => Stage::Tacky,
                "--codegen" => Stage::Codegen,
                flag => return Err(DriverError::InvalidFlag(flag.to_string())),
            }
        } else {
            Stage::Full
        };

        Ok(Config { stage, input })
    }
}

/// A driver-level failure, carrying its process exit code.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("usage: mcc [--lex|--parse|--printAst|--tacky|--codegen] <input.c>")]
    Usage,

    #[error("file '{0}' not found")]
    InputNotFound(String),

    #[error("invalid flag '{0}'")]
    InvalidFlag(String),

    #[error("{0}")]
    Lex(String),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Semantic(SemanticError),

    #[error("{0}")]
    Codegen(#[from] CodegenError),

    #[error("{0:#}")]
    Io(#[from] anyhow::Error),
}

impl DriverError {
    /// The exit code this failure maps to.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            DriverError::Usage => ExitCode::Usage,
            DriverError::InputNotFound(_) => ExitCode::InputNotFound,
            DriverError::InvalidFlag(_) => ExitCode::InvalidFlag,
            DriverError::Lex(_) => ExitCode::Lex,
            DriverError::Parse(_) => ExitCode::Parse,
            DriverError::Semantic(_) => ExitCode::Semantic,
            DriverError::Codegen(_) => ExitCode::Codegen,
            DriverError::Io(_) => ExitCode::Usage,
        }
    }
}

/// Command-line entry point: parse arguments, run, report, map exit code.
pub fn run_cli(args: &[String]) -> i32 {
    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {}", error);
            return error.exit_code().code();
        }
    };
    match run(&config) {
        Ok(()) => ExitCode::Success.code(),
        Err(error) => {
            eprintln!("error: {}", error);
            error.exit_code().code()
        }
    }
}

/// Runs the pipeline described by `config`.
pub fn run(config: &Config) -> Result<(), DriverError> {
    let source = read_source(&config.input)?;

    // Stage 1: lexing. Invalid tokens are accumulated, then reported
    // together; the first diagnostic names the failure.
    let mut handler = Handler::new();
    let tokens = Lexer::new(&source, &mut handler).tokenize();
    let has_invalid = tokens.iter().any(|t| t.kind == TokenKind::Invalid);
    if handler.has_errors() || has_invalid {
        let message = handler
            .first_error()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "invalid token".to_string());
        return Err(DriverError::Lex(message));
    }
    if config.stage == Stage::Lex {
        return Ok(());
    }

    // Stage 2: parsing (fail-fast).
    let mut program = Parser::new(&tokens).parse_program()?;
    if config.stage == Stage::Parse {
        return Ok(());
    }
    if config.stage == Stage::PrintAst {
        print!("{}", mcc_par::print_program(&program));
        return Ok(());
    }

    // Stage 3: semantic passes; report the first error of the failing pass.
    mcc_sem::analyze(&mut program).map_err(|errors| {
        DriverError::Semantic(
            errors
                .into_iter()
                .next()
                .expect("analyze returned Err with no errors"),
        )
    })?;

    // Stage 4: IR lowering (never fails on validated input).
    let tacky = mcc_tacky::lower_program(&program);
    if config.stage == Stage::Tacky {
        print!("{}", mcc_tacky::print_program(&tacky));
        return Ok(());
    }

    // Stage 5: assembly tree construction.
    let asm = mcc_gen::generate(&tacky)?;
    if config.stage == Stage::Codegen {
        return Ok(());
    }

    // Stage 6: emission.
    let text = mcc_gen::emit_program(&asm);
    let output = config.input.with_extension("s");
    std::fs::write(&output, text)
        .with_context(|| format!("cannot write '{}'", output.display()))?;
    Ok(())
}

/// Reads the preprocessed source for an input file.
///
/// Already-preprocessed `.i` files are read as-is. Anything else is run
/// through `gcc -E -P` into the system temp directory first.
fn read_source(input: &Path) -> Result<String, DriverError> {
    if input.extension().is_some_and(|ext| ext == "i") {
        let source = std::fs::read_to_string(input)
            .with_context(|| format!("cannot read '{}'", input.display()))?;
        return Ok(source);
    }

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input");
    let preprocessed =
        std::env::temp_dir().join(format!("{}.{}.i", stem, std::process::id()));

    let status = Command::new("gcc")
        .args(["-E", "-P"])
        .arg(input)
        .arg("-o")
        .arg(&preprocessed)
        .status()
        .context("cannot invoke the C preprocessor (gcc)")?;
    if !status.success() {
        return Err(DriverError::Io(anyhow::anyhow!(
            "preprocessor failed with status {}",
            status
        )));
    }

    let source = std::fs::read_to_string(&preprocessed)
        .with_context(|| format!("cannot read '{}'", preprocessed.display()))?;
    let _ = std::fs::remove_file(&preprocessed);
    Ok(source)
}
