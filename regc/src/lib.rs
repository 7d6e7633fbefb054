//! # regc
//!
//! A single-pass compiler from a tiny expression-and-variable language to the
//! assembly of a fixed-register, byte-addressed virtual machine.
//!
//! ## Overview
//!
//! ```text
//! uint16 x = 1;      SET R00 0x01
//! x + 2;        ->   SET R01 0x02
//!                    ADD R00 R01
//! ```
//!
//! ## Modules
//!
//! - [`preprocess`] - Strips comments and blank lines
//! - [`lexer`] - Tokenizes source code
//! - [`parser`] - Builds the syntax tree defined in [`ast`]
//! - [`codegen`] - Lowers the tree to assembly, using [`register`],
//!   [`variables`] and [`asm`]
//! - [`target`] - Registers, mnemonics and instruction size of the machine
//! - [`error`] - Error classification and diagnostics
//!
//! ## Quick Start
//!
//! ```
//! let asm = regc::compile_source("uint16 x = 1; x + 2;").unwrap();
//! assert_eq!(asm, "SET R00 0x01\nSET R01 0x02\nADD R00 R01");
//! ```
//!
//! ## Compilation Pipeline
//!
//! 1. **Preprocessing** - Comments and blank lines removed
//! 2. **Lexical Analysis** - Source text → Tokens
//! 3. **Parsing** - Tokens → AST
//! 4. **Code Generation** - AST → Assembly text
//!
//! Each stage runs to completion before the next starts. The first error in
//! any stage aborts the compilation.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod asm;
pub mod ast;
pub mod codegen;
pub mod error;
/// Lexical analyzer for tokenizing source code.
pub mod lexer;
/// Recursive-descent parser.
pub mod parser;
pub mod preprocess;
pub mod register;
pub mod target;
pub mod variables;

use tracing::{debug, info_span};

pub use error::{CompileError, ErrorKind, Severity, Stage};

use crate::ast::Program;
use crate::codegen::CodeGenerator;
use crate::lexer::Token;

/// Settings for one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Size in bytes of one encoded instruction; scales jump targets. Must be
    /// within `1..=target::MAX_INSTRUCTION_BYTE_LENGTH`.
    pub instruction_byte_length: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            instruction_byte_length: target::INSTRUCTION_BYTE_LENGTH,
        }
    }
}

/// Runs the pipeline.
///
/// Every call builds its own register file, variable registry and assembly
/// buffer, so one `Compiler` can be reused and independent compilations never
/// see each other's state.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// A compiler using `options`.
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Options this compiler was built with.
    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Preprocess and tokenize `source`.
    pub fn tokens(&self, source: &str) -> Result<Vec<Token>, CompileError> {
        let preprocessed = preprocess::preprocess(source);
        let tokens = lexer::lex(&preprocessed)?;
        debug!(count = tokens.len(), "lexing finished");
        Ok(tokens)
    }

    /// Preprocess, tokenize and parse `source`.
    pub fn ast(&self, source: &str) -> Result<Program, CompileError> {
        let tokens = self.tokens(source)?;
        let program = parser::parse(tokens)?;
        debug!(statements = program.body.len(), "parsing finished");
        Ok(program)
    }

    /// Compile `source` to an assembly listing.
    pub fn compile(&self, source: &str) -> Result<String, CompileError> {
        let _span = info_span!("compile", bytes = source.len()).entered();
        let program = self.ast(source)?;
        self.compile_program(&program)
    }

    /// Lower an already parsed program.
    pub fn compile_program(&self, program: &Program) -> Result<String, CompileError> {
        let mut generator = CodeGenerator::new(self.options)?;
        generator.generate(program)?;
        Ok(generator.finish())
    }
}

/// Compile `source` with default options.
pub fn compile_source(source: &str) -> Result<String, CompileError> {
    Compiler::default().compile(source)
}
