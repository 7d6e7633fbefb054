//! Error model shared by every stage of the pipeline.
//!
//! Each stage has its own error enum ([`LexError`], [`ParseError`],
//! [`CodegenError`]). [`CompileError`] wraps whichever of them stopped the
//! compilation and classifies it by [`ErrorKind`], [`Stage`] and
//! [`Severity`]. The library never terminates the process; the caller decides
//! how to surface the error.

use std::fmt;

use thiserror::Error;

use crate::codegen::CodegenError;
use crate::lexer::LexError;
use crate::parser::ParseError;

/// What went wrong, independent of the stage that noticed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A character or keyword the compiler has no meaning for.
    UnrecognizedToken,
    /// Malformed declaration, missing parenthesis or similar.
    SyntaxError,
    /// A recognized construct without an implementation. Always a compiler defect.
    NotImplemented,
    /// Reference to an identifier that was never declared.
    Undefined,
    /// Redeclaration of an existing identifier.
    IdentifierInUse,
    /// Every register is in use.
    NoFreeRegister,
    /// A byte address cannot be represented, or the instruction size would
    /// make every address collapse.
    AddressOutOfRange,
}

impl ErrorKind {
    /// Numeric code printed in diagnostics as `E<code>`.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::UnrecognizedToken => 0,
            ErrorKind::SyntaxError => 1,
            ErrorKind::NotImplemented => 2,
            ErrorKind::Undefined => 3,
            ErrorKind::IdentifierInUse => 4,
            ErrorKind::NoFreeRegister => 5,
            ErrorKind::AddressOutOfRange => 6,
        }
    }
}

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Comment stripping and line normalization. Infallible today.
    Preprocessing,
    /// Characters to tokens.
    Lexing,
    /// Tokens to syntax tree.
    Parsing,
    /// Syntax tree to assembly.
    Compiling,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Preprocessing => "PREPROCESSING",
            Stage::Lexing => "LEXING",
            Stage::Parsing => "PARSING",
            Stage::Compiling => "COMPILING",
        })
    }
}

/// Diagnostic severity. Only `Internal` and `Error` are produced, and both
/// abort the compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// A defect in the compiler itself.
    Internal,
    /// A defect in the compiled program.
    Error,
    /// Reserved.
    Warning,
    /// Reserved.
    Info,
    /// Reserved.
    Debug,
}

impl Severity {
    /// Whether a diagnostic of this severity stops the compilation.
    pub fn is_fatal(self) -> bool {
        self < Severity::Warning
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Internal => "INTERNAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        })
    }
}

/// The first error raised by any stage of a compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Raised by the lexer.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Raised by the parser.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Raised by the code generator.
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    /// Classification of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Lex(err) => err.kind(),
            CompileError::Parse(err) => err.kind(),
            CompileError::Codegen(err) => err.kind(),
        }
    }

    /// Stage the error was raised in.
    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Lex(_) => Stage::Lexing,
            CompileError::Parse(_) => Stage::Parsing,
            CompileError::Codegen(_) => Stage::Compiling,
        }
    }

    /// Severity of the error.
    pub fn severity(&self) -> Severity {
        match self {
            CompileError::Lex(err) => err.severity(),
            CompileError::Parse(err) => err.severity(),
            CompileError::Codegen(err) => err.severity(),
        }
    }

    /// One-line diagnostic: `[STAGE] SEVERITY: message (E<code>)`.
    pub fn report(&self) -> String {
        format!(
            "[{}] {}: {} (E{})",
            self.stage(),
            self.severity(),
            self,
            self.kind().code()
        )
    }
}
