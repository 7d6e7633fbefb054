//! Accumulates emitted assembly lines and tracks their byte addresses.

use std::fmt::Display;

use crate::target::{INSTRUCTION_BYTE_LENGTH, Mnemonic};

/// Ordered, append-only buffer of instruction lines.
///
/// Line `n` lives at byte address `n * instruction_byte_length`. Empty lines
/// are never stored so the arithmetic stays exact.
#[derive(Debug, Clone)]
pub struct AsmBuffer {
    lines: Vec<String>,
    instruction_byte_length: u64,
}

impl Default for AsmBuffer {
    fn default() -> Self {
        Self::new(INSTRUCTION_BYTE_LENGTH)
    }
}

impl AsmBuffer {
    /// An empty buffer for instructions of `instruction_byte_length` bytes.
    pub fn new(instruction_byte_length: u64) -> Self {
        Self {
            lines: Vec::new(),
            instruction_byte_length,
        }
    }

    /// Append one line. Empty lines are dropped.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if !line.is_empty() {
            self.lines.push(line);
        }
    }

    /// Append several lines, dropping empty ones.
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.push(line);
        }
    }

    /// Append `MNEMONIC OPERAND1 OPERAND2`.
    pub fn emit(&mut self, mnemonic: Mnemonic, operand1: impl Display, operand2: impl Display) {
        self.push(format!("{mnemonic} {operand1} {operand2}"));
    }

    /// Byte address the next pushed line will occupy, or `None` if it does
    /// not fit in a `u64`.
    pub fn next_free_address(&self) -> Option<u64> {
        self.line_offset(self.lines.len() as u64)
    }

    /// Size in bytes of `count` instructions, or `None` on overflow.
    pub fn line_offset(&self, count: u64) -> Option<u64> {
        count.checked_mul(self.instruction_byte_length)
    }

    /// Lines emitted so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines emitted so far.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The listing, one instruction per line.
    pub fn into_text(self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::target::Register;

    #[test]
    fn test_emit_formats_line() {
        let mut asm = AsmBuffer::default();
        asm.emit(Mnemonic::Add, Register::R00, Register::R01);
        assert_eq!(asm.lines(), ["ADD R00 R01"]);
    }

    #[test]
    fn test_empty_lines_are_not_counted() {
        let mut asm = AsmBuffer::new(4);
        asm.extend(["SET R00 0x01", "", "SET R01 0x02"]);
        asm.push("");
        assert_eq!(asm.len(), 2);
        assert_eq!(asm.next_free_address(), Some(8));
    }

    #[test]
    fn test_addresses_scale_with_instruction_length() {
        let mut asm = AsmBuffer::new(3);
        assert_eq!(asm.next_free_address(), Some(0));
        asm.push("SET R00 0x01");
        assert_eq!(asm.next_free_address(), Some(3));
        assert_eq!(asm.line_offset(3), Some(9));
    }

    #[test]
    fn test_address_overflow_is_reported() {
        let mut asm = AsmBuffer::new(u64::MAX / 2);
        assert_eq!(asm.line_offset(2), Some(u64::MAX - 1));
        assert_eq!(asm.line_offset(3), None);
        asm.extend(["SET R00 0x01", "SET R01 0x01"]);
        assert_eq!(asm.next_free_address(), Some(u64::MAX - 1));
        asm.push("MOV R00 R02");
        assert_eq!(asm.next_free_address(), None);
    }

    #[test]
    fn test_into_text_joins_lines() {
        let mut asm = AsmBuffer::default();
        assert!(asm.is_empty());
        asm.extend(["SET R00 0x01", "SET R01 0x02"]);
        assert_eq!(asm.into_text(), "SET R00 0x01\nSET R01 0x02");
    }
}
