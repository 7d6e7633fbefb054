//! Register allocation.
//!
//! There is no spilling: registers are handed out in ascending order and
//! running out is fatal.

use thiserror::Error;
use tracing::trace;

use crate::target::{REGISTER_COUNT, Register};

/// What a register currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterUsage {
    /// Available for allocation.
    #[default]
    Free,
    /// A transient computed value.
    Literal,
    /// The storage backing a declared variable.
    Variable,
    /// Reserved by a multi-instruction sequence that releases it itself.
    Manual,
}

/// Allocation failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// Every register is in use.
    #[error("no free register")]
    NoFreeRegister,
}

/// Usage tags for the fixed register set.
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    usage: [RegisterUsage; REGISTER_COUNT],
}

impl RegisterFile {
    /// A register file with every register free.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the lowest free register, tagged `usage`.
    pub fn allocate(&mut self, usage: RegisterUsage) -> Result<Register, RegisterError> {
        let register = Register::ALL
            .into_iter()
            .find(|register| self.usage(*register) == RegisterUsage::Free)
            .ok_or(RegisterError::NoFreeRegister)?;

        self.usage[register.index()] = usage;
        trace!(%register, ?usage, "allocated register");
        Ok(register)
    }

    /// Mark `register` free. Releasing a free register is a no-op.
    pub fn release(&mut self, register: Register) {
        self.usage[register.index()] = RegisterUsage::Free;
        trace!(%register, "released register");
    }

    /// Change what `register` is considered to hold.
    pub fn retag(&mut self, register: Register, usage: RegisterUsage) {
        self.usage[register.index()] = usage;
    }

    /// Free every register.
    pub fn reset_all(&mut self) {
        self.usage = [RegisterUsage::Free; REGISTER_COUNT];
    }

    /// Current tag of `register`.
    pub fn usage(&self, register: Register) -> RegisterUsage {
        self.usage[register.index()]
    }

    /// Number of registers currently free.
    pub fn free_count(&self) -> usize {
        self.usage
            .iter()
            .filter(|usage| **usage == RegisterUsage::Free)
            .count()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_allocates_in_ascending_order() {
        let mut registers = RegisterFile::new();
        assert_eq!(
            registers.allocate(RegisterUsage::Literal),
            Ok(Register::R00)
        );
        assert_eq!(
            registers.allocate(RegisterUsage::Variable),
            Ok(Register::R01)
        );
        assert_eq!(registers.usage(Register::R00), RegisterUsage::Literal);
        assert_eq!(registers.usage(Register::R01), RegisterUsage::Variable);
    }

    #[test]
    fn test_released_register_is_reused_first() {
        let mut registers = RegisterFile::new();
        let first = registers.allocate(RegisterUsage::Literal).unwrap();
        registers.allocate(RegisterUsage::Literal).unwrap();
        registers.release(first);
        assert_eq!(registers.allocate(RegisterUsage::Manual), Ok(first));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut registers = RegisterFile::new();
        registers.release(Register::R03);
        registers.release(Register::R03);
        assert_eq!(registers.usage(Register::R03), RegisterUsage::Free);
        assert_eq!(registers.free_count(), REGISTER_COUNT);
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let mut registers = RegisterFile::new();
        for _ in 0..REGISTER_COUNT {
            registers.allocate(RegisterUsage::Variable).unwrap();
        }
        assert_eq!(registers.free_count(), 0);
        assert_eq!(
            registers.allocate(RegisterUsage::Literal),
            Err(RegisterError::NoFreeRegister)
        );
    }

    #[test]
    fn test_retag_keeps_register_allocated() {
        let mut registers = RegisterFile::new();
        let register = registers.allocate(RegisterUsage::Literal).unwrap();
        registers.retag(register, RegisterUsage::Variable);
        assert_eq!(registers.usage(register), RegisterUsage::Variable);
        assert_ne!(registers.allocate(RegisterUsage::Literal), Ok(register));
    }

    #[test]
    fn test_reset_all() {
        let mut registers = RegisterFile::new();
        for _ in 0..4 {
            registers.allocate(RegisterUsage::Manual).unwrap();
        }
        registers.reset_all();
        assert_eq!(registers.free_count(), REGISTER_COUNT);
        assert_eq!(
            registers.allocate(RegisterUsage::Literal),
            Ok(Register::R00)
        );
    }
}
