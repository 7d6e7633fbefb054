//! Lowers the syntax tree to target-machine assembly.
//!
//! Every expression evaluates into a register. Literals get a fresh one,
//! bound variables hand out the register they already live in, and binary
//! operators combine into the left operand's register. The machine has no
//! compare instruction, so `==` is lowered to a subtract followed by a
//! conditional jump over a corrective store.

use num_bigint::BigUint;
use thiserror::Error;
use tracing::{debug, trace};

use crate::CompileOptions;
use crate::asm::AsmBuffer;
use crate::ast::{BinaryOperator, DataType, Expression, Program, Statement};
use crate::error::{ErrorKind, Severity};
use crate::register::{RegisterError, RegisterFile, RegisterUsage};
use crate::target::{MAX_INSTRUCTION_BYTE_LENGTH, Mnemonic, Register, address_to_hex, to_hex};
use crate::variables::{Variable, VariableRegistry};

/// Immediate loaded into a declared but never assigned variable.
const UNINITIALIZED_VALUE: &str = "0x0";

/// Errors raised while lowering.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// The identifier is already declared.
    #[error("cannot redeclare variable {identifier}")]
    IdentifierInUse {
        /// The redeclared name.
        identifier: String,
    },

    /// The identifier was never declared.
    #[error("undefined identifier: {identifier}")]
    Undefined {
        /// The unknown name.
        identifier: String,
    },

    /// A variable was declared with a type the generator cannot store.
    #[error("unrecognized datatype: {data_type}")]
    UnsupportedDataType {
        /// The declared type.
        data_type: DataType,
    },

    /// The configured instruction size is zero or too large.
    #[error(
        "instruction length {length} is outside 1..={max}",
        max = MAX_INSTRUCTION_BYTE_LENGTH
    )]
    InvalidInstructionLength {
        /// The rejected size in bytes.
        length: u64,
    },

    /// A jump target address does not fit in 64 bits.
    #[error("jump target after line {line} does not fit in 64 bits")]
    AddressOverflow {
        /// Number of lines emitted when the address was computed.
        line: usize,
    },

    /// Register allocation failed.
    #[error(transparent)]
    Register(#[from] RegisterError),
}

impl CodegenError {
    /// Classification of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodegenError::IdentifierInUse { .. } => ErrorKind::IdentifierInUse,
            CodegenError::Undefined { .. } => ErrorKind::Undefined,
            CodegenError::UnsupportedDataType { .. } => ErrorKind::UnrecognizedToken,
            CodegenError::InvalidInstructionLength { .. }
            | CodegenError::AddressOverflow { .. } => ErrorKind::AddressOutOfRange,
            CodegenError::Register(RegisterError::NoFreeRegister) => ErrorKind::NoFreeRegister,
        }
    }

    /// Severity of the error.
    pub fn severity(&self) -> Severity {
        match self {
            CodegenError::IdentifierInUse { .. }
            | CodegenError::Undefined { .. }
            | CodegenError::InvalidInstructionLength { .. }
            | CodegenError::AddressOverflow { .. } => Severity::Error,
            CodegenError::UnsupportedDataType { .. } | CodegenError::Register(_) => {
                Severity::Internal
            }
        }
    }
}

/// Lower `program` with default options and return the listing.
pub fn compile(program: &Program) -> Result<String, CodegenError> {
    let mut generator = CodeGenerator::new(CompileOptions::default())?;
    generator.generate(program)?;
    Ok(generator.finish())
}

/// State of one lowering pass: registers, variables and emitted lines.
///
/// Build a new generator for every compilation; nothing is shared between
/// instances.
#[derive(Debug)]
pub struct CodeGenerator {
    registers: RegisterFile,
    variables: VariableRegistry,
    asm: AsmBuffer,
}

impl CodeGenerator {
    /// A generator with every register free and no variables.
    ///
    /// Fails unless the instruction size is within
    /// `1..=MAX_INSTRUCTION_BYTE_LENGTH`.
    pub fn new(options: CompileOptions) -> Result<Self, CodegenError> {
        let length = options.instruction_byte_length;
        if !(1..=MAX_INSTRUCTION_BYTE_LENGTH).contains(&length) {
            return Err(CodegenError::InvalidInstructionLength { length });
        }

        let mut registers = RegisterFile::new();
        registers.reset_all();
        Ok(Self {
            registers,
            variables: VariableRegistry::new(),
            asm: AsmBuffer::new(length),
        })
    }

    /// Lower every top-level statement in order. Stops at the first error.
    pub fn generate(&mut self, program: &Program) -> Result<(), CodegenError> {
        for statement in &program.body {
            self.compile_statement(statement)?;
        }
        debug!(
            lines = self.asm.len(),
            variables = self.variables.len(),
            free_registers = self.registers.free_count(),
            "generated program"
        );
        Ok(())
    }

    /// The listing, one instruction per line.
    pub fn finish(self) -> String {
        self.asm.into_text()
    }

    /// Register usage after lowering.
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Variables declared so far.
    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    /// Lines emitted so far.
    pub fn asm(&self) -> &AsmBuffer {
        &self.asm
    }

    /// Returns the register holding the statement's value, if it has one.
    fn compile_statement(
        &mut self,
        statement: &Statement,
    ) -> Result<Option<Register>, CodegenError> {
        match statement {
            Statement::VariableDeclaration {
                identifier,
                data_type,
                value,
            } => self.compile_declaration(identifier, *data_type, value.as_ref()),

            Statement::FunctionDefinition { identifier, .. } => {
                debug!(%identifier, "skipping function definition");
                Ok(None)
            }

            Statement::Expression(expression) => self.compile_expression(expression).map(Some),
        }
    }

    fn compile_declaration(
        &mut self,
        identifier: &str,
        data_type: DataType,
        value: Option<&Expression>,
    ) -> Result<Option<Register>, CodegenError> {
        if self.variables.find(identifier, None).is_some() {
            return Err(CodegenError::IdentifierInUse {
                identifier: identifier.to_string(),
            });
        }
        if data_type != DataType::Uint16 {
            return Err(CodegenError::UnsupportedDataType { data_type });
        }

        let bound_register = match value {
            Some(value) => {
                let register = self.compile_expression(value)?;
                self.registers.retag(register, RegisterUsage::Variable);
                Some(register)
            }
            None => None,
        };

        trace!(%identifier, ?bound_register, "declared variable");
        self.variables.add(
            Variable {
                identifier: identifier.to_string(),
                data_type,
                bound_register,
            },
            None,
        );
        Ok(bound_register)
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<Register, CodegenError> {
        match expression {
            Expression::NumericLiteral(value) => self.compile_literal(value),
            Expression::Identifier(identifier) => self.compile_identifier(identifier),
            Expression::Assignment { identifier, value } => {
                self.compile_assignment(identifier, value)
            }
            Expression::Binary {
                left,
                right,
                operator,
            } => self.compile_binary(left, right, *operator),
        }
    }

    fn compile_literal(&mut self, value: &BigUint) -> Result<Register, CodegenError> {
        let register = self.registers.allocate(RegisterUsage::Literal)?;
        self.asm.emit(Mnemonic::Set, register, to_hex(value));
        Ok(register)
    }

    fn compile_identifier(&mut self, identifier: &str) -> Result<Register, CodegenError> {
        let variable = self
            .variables
            .find(identifier, None)
            .ok_or_else(|| CodegenError::Undefined {
                identifier: identifier.to_string(),
            })?;

        if let Some(register) = variable.bound_register {
            return Ok(register);
        }

        let register = self.registers.allocate(RegisterUsage::Variable)?;
        self.asm.emit(Mnemonic::Set, register, UNINITIALIZED_VALUE);
        Ok(register)
    }

    /// The register previously bound to the variable is not released.
    fn compile_assignment(
        &mut self,
        identifier: &str,
        value: &Expression,
    ) -> Result<Register, CodegenError> {
        if self.variables.find(identifier, None).is_none() {
            return Err(CodegenError::Undefined {
                identifier: identifier.to_string(),
            });
        }

        let register = self.compile_expression(value)?;
        self.registers.retag(register, RegisterUsage::Variable);

        if let Some(variable) = self.variables.find_mut(identifier, None) {
            variable.bound_register = Some(register);
        }
        trace!(%identifier, %register, "rebound variable");
        Ok(register)
    }

    fn compile_binary(
        &mut self,
        left: &Expression,
        right: &Expression,
        operator: BinaryOperator,
    ) -> Result<Register, CodegenError> {
        let left = self.compile_expression(left)?;
        let right = self.compile_expression(right)?;

        match operator {
            BinaryOperator::Add => Ok(self.combine(Mnemonic::Add, left, right)),
            BinaryOperator::Sub => Ok(self.combine(Mnemonic::Sub, left, right)),
            BinaryOperator::Equal => self.compile_equality(left, right),
        }
    }

    /// `left op= right`; the result stays in `left`.
    fn combine(&mut self, mnemonic: Mnemonic, left: Register, right: Register) -> Register {
        self.asm.emit(mnemonic, left, right);
        self.registers.release(right);
        left
    }

    // Emits:
    //
    //   MOV   left   result
    //   SUB   result right
    //   MOV   result saved
    //   SET   result 0x01
    //   SET   target <address after the corrective store>
    //   CJUMP target saved
    //   SET   result 0x00
    //
    // When left == right, saved is zero, the jump falls through and result
    // ends up 0. Otherwise the jump skips the corrective store and result
    // stays 1.
    fn compile_equality(
        &mut self,
        left: Register,
        right: Register,
    ) -> Result<Register, CodegenError> {
        let result = self.registers.allocate(RegisterUsage::Manual)?;
        self.asm.emit(Mnemonic::Mov, left, result);
        self.asm.emit(Mnemonic::Sub, result, right);

        let saved = self.registers.allocate(RegisterUsage::Manual)?;
        self.asm.emit(Mnemonic::Mov, result, saved);
        self.asm.emit(Mnemonic::Set, result, to_hex(&BigUint::from(1u32)));

        let target = self.registers.allocate(RegisterUsage::Manual)?;
        let address = self
            .asm
            .next_free_address()
            .zip(self.asm.line_offset(3))
            .and_then(|(next, skip)| next.checked_add(skip))
            .ok_or(CodegenError::AddressOverflow {
                line: self.asm.len(),
            })?;
        self.asm.emit(Mnemonic::Set, target, address_to_hex(address));
        self.asm.emit(Mnemonic::Cjump, target, saved);
        self.asm.emit(Mnemonic::Set, result, to_hex(&BigUint::from(0u32)));

        self.registers.release(target);
        self.registers.release(saved);
        Ok(result)
    }
}
