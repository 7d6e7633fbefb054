#![expect(missing_docs)]

//! The target machine contract.
//!
//! The compiler never encodes or executes instructions; it only needs the
//! register names, the mnemonic set, and the size of one encoded instruction
//! so that jump targets can be computed as byte addresses.

use std::fmt;

use num_bigint::BigUint;

/// Size in bytes of one encoded instruction on the target machine.
pub const INSTRUCTION_BYTE_LENGTH: u64 = 4;

/// Largest instruction size the compiler accepts.
pub const MAX_INSTRUCTION_BYTE_LENGTH: u64 = 256;

/// Number of general purpose registers the compiler may allocate.
pub const REGISTER_COUNT: usize = 11;

/// A general purpose register of the target machine.
///
/// Registers are opaque ids. They only become text when an instruction is
/// rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Register {
    R00,
    R01,
    R02,
    R03,
    R04,
    R05,
    R06,
    R07,
    R08,
    R09,
    R10,
}

impl Register {
    /// Every register in allocation order.
    pub const ALL: [Register; REGISTER_COUNT] = [
        Register::R00,
        Register::R01,
        Register::R02,
        Register::R03,
        Register::R04,
        Register::R05,
        Register::R06,
        Register::R07,
        Register::R08,
        Register::R09,
        Register::R10,
    ];

    /// Position of the register in [`Register::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Assembly name of the register.
    pub fn name(self) -> &'static str {
        match self {
            Register::R00 => "R00",
            Register::R01 => "R01",
            Register::R02 => "R02",
            Register::R03 => "R03",
            Register::R04 => "R04",
            Register::R05 => "R05",
            Register::R06 => "R06",
            Register::R07 => "R07",
            Register::R08 => "R08",
            Register::R09 => "R09",
            Register::R10 => "R10",
        }
    }

    /// Look a register up by its assembly name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|register| register.name() == name)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Instructions the code generator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    /// `SET <reg> <imm>`: load an immediate.
    Set,
    /// `ADD <dst> <src>`: `dst += src`.
    Add,
    /// `SUB <dst> <src>`: `dst -= src`.
    Sub,
    /// `MOV <src> <dst>`: copy `src` into `dst`.
    Mov,
    /// `CJUMP <target> <cond>`: jump to the address in `target` when `cond` is non-zero.
    Cjump,
}

impl Mnemonic {
    pub const ALL: [Mnemonic; 5] = [
        Mnemonic::Set,
        Mnemonic::Add,
        Mnemonic::Sub,
        Mnemonic::Mov,
        Mnemonic::Cjump,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Set => "SET",
            Mnemonic::Add => "ADD",
            Mnemonic::Sub => "SUB",
            Mnemonic::Mov => "MOV",
            Mnemonic::Cjump => "CJUMP",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mnemonic| mnemonic.as_str() == name)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render an immediate operand: lowercase hex, `0x` prefix, at least two digits.
pub fn to_hex(value: &BigUint) -> String {
    format!("0x{:0>2}", value.to_str_radix(16))
}

/// Render a byte address as an immediate operand.
pub fn address_to_hex(address: u64) -> String {
    to_hex(&BigUint::from(address))
}

/// Inverse of [`to_hex`]. Accepts an optional `0x` or `#` prefix.
pub fn parse_hex(text: &str) -> Option<BigUint> {
    let digits = text.trim_start_matches('#');
    let digits = digits.strip_prefix("0x").unwrap_or(digits);
    if digits.is_empty() {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
}
