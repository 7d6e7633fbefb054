//! Syntax tree produced by the parser.
//!
//! Statements and expressions are closed enums, so adding a node kind forces
//! every consumer to handle it.

use std::fmt;

use num_bigint::BigUint;

/// Root of the tree. Owns the top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// Top-level statements.
    pub body: Vec<Statement>,
}

/// Declared type of a variable or function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Unsigned 16-bit integer, the only width the code generator supports.
    Uint16,
    /// No value. Only meaningful as a function return type.
    Void,
}

impl DataType {
    /// Map a data-type keyword to its type.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "uint16" => Some(DataType::Uint16),
            "void" => Some(DataType::Void),
            _ => None,
        }
    }

    /// The keyword spelling of this type.
    pub fn keyword(self) -> &'static str {
        match self {
            DataType::Uint16 => "uint16",
            DataType::Void => "void",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A top-level or function-body statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `uint16 x;` or `uint16 x = <expr>;`
    VariableDeclaration {
        /// Declared name.
        identifier: String,
        /// Declared type.
        data_type: DataType,
        /// Initializer, if any.
        value: Option<Expression>,
    },

    /// `void main() { ... }`. Parsed but never lowered.
    FunctionDefinition {
        /// Function name.
        identifier: String,
        /// Declared return type.
        return_type: DataType,
        /// Statements of the body.
        body: Vec<Statement>,
    },

    /// An expression evaluated for its value.
    Expression(Expression),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `==`
    Equal,
}

impl BinaryOperator {
    /// Source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Equal => "==",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An expression. Every expression yields a value held in a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// `left <operator> right`
    Binary {
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
        /// Operator.
        operator: BinaryOperator,
    },

    /// Reference to a declared variable.
    Identifier(String),

    /// Non-negative integer of unbounded size.
    NumericLiteral(BigUint),

    /// `x = <expr>` on an already declared variable.
    Assignment {
        /// Target variable.
        identifier: String,
        /// New value.
        value: Box<Expression>,
    },
}

impl Expression {
    /// Build a binary expression.
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Self::Binary {
            left: Box::new(left),
            right: Box::new(right),
            operator,
        }
    }

    /// Build an assignment expression.
    pub fn assignment(identifier: impl Into<String>, value: Expression) -> Self {
        Self::Assignment {
            identifier: identifier.into(),
            value: Box::new(value),
        }
    }

    /// Build an identifier reference.
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Build a numeric literal.
    pub fn number(value: impl Into<BigUint>) -> Self {
        Self::NumericLiteral(value.into())
    }
}
