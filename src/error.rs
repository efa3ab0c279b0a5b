//! Centralised error hierarchy for the **rill** interpreter.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here. This enables
//! a uniform `Result<T>` alias throughout the crate and ergonomic
//! inter-operation with `anyhow`, while still preserving rich diagnostic
//! detail.
//!
//! Formatting and "did anything fail" bookkeeping live in [`Diagnostics`],
//! which is threaded explicitly through the scan -> parse -> resolve ->
//! interpret pipeline instead of a process-wide error flag.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RillError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human-readable description.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error. `location` is empty, " at end", or
    /// " at '<lexeme>'".
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        location: String,
    },

    /// Static-analysis failure from the resolver pass.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error.
    #[error("[line {line}] Error: {message}")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent). Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RillError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        RillError::Lex { message, line }
    }

    /// Helper constructor for the **parser**. The offending token supplies
    /// the line and the location descriptor.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        RillError::Parse {
            message,
            line: token.line,
            location: locate(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        RillError::Resolve {
            message,
            line: token.line,
            location: locate(token),
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", line, message);

        RillError::Runtime { message, line }
    }
}

/// Location descriptor for parse/resolve diagnostics.
fn locate(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, RillError>;

/// Diagnostic sink shared by every pipeline stage.
///
/// Each reported error is printed to stderr and retained as text, and the
/// sink remembers whether any static or runtime error occurred so the driver
/// can decide whether to continue to the next stage and which exit code to
/// use. The core never decides exit codes itself.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<String>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format, print, and record one error.
    pub fn report(&mut self, err: &RillError) {
        eprintln!("{}", err);

        self.errors.push(err.to_string());

        match err {
            RillError::Runtime { .. } => self.had_runtime_error = true,
            _ => self.had_error = true,
        }
    }

    /// Any scan, parse, or resolve error so far?
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// Any runtime error so far?
    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Formatted text of every reported error, in order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Clear all recorded state. The REPL calls this between lines.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.had_error = false;
        self.had_runtime_error = false;
    }
}
