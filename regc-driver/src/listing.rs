use anyhow::{Context, Result, bail};
use num_bigint::BigUint;
use regc::target::{Mnemonic, Register, parse_hex};

enum Operand {
    Register,
    Immediate(BigUint),
}

struct Instruction {
    mnemonic: Mnemonic,
    operands: [Operand; 2],
    text: String,
}

/// A compiled listing, checked against the target's instruction set.
pub struct Listing {
    instructions: Vec<Instruction>,
    instruction_byte_length: u64,
}

impl Listing {
    pub fn parse(source: &str, instruction_byte_length: u64) -> Result<Self> {
        let mut instructions = Vec::new();

        for (line_num, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let instruction = Self::parse_instruction(line)
                .with_context(|| format!("Line {}: {}", line_num + 1, line))?;
            instructions.push(instruction);
        }

        Ok(Self {
            instructions,
            instruction_byte_length,
        })
    }

    fn parse_instruction(line: &str) -> Result<Instruction> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((name, args)) = parts.split_first() else {
            bail!("empty instruction");
        };

        let Some(mnemonic) = Mnemonic::from_name(name) else {
            bail!("unknown instruction '{}'", name);
        };

        if args.len() != 2 {
            bail!("Expected 2 args, got {}", args.len());
        }

        let operands = [Self::parse_operand(args[0])?, Self::parse_operand(args[1])?];
        match (mnemonic, &operands) {
            (Mnemonic::Set, [Operand::Register, Operand::Immediate(_)]) => {}
            (Mnemonic::Set, _) => bail!("SET expects a register and an immediate"),
            (_, [Operand::Register, Operand::Register]) => {}
            _ => bail!("{} expects two registers", mnemonic),
        }

        Ok(Instruction {
            mnemonic,
            operands,
            text: line.to_string(),
        })
    }

    fn parse_operand(s: &str) -> Result<Operand> {
        if Register::from_name(s).is_some() {
            return Ok(Operand::Register);
        }
        if s.starts_with("0x") {
            if let Some(value) = parse_hex(s) {
                return Ok(Operand::Immediate(value));
            }
        }
        bail!("Expected register or 0x immediate, got {}", s)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Render the listing with the hex byte address of every instruction.
    /// `SET` immediates are repeated in decimal.
    pub fn annotate(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "; {} instructions, {} bytes each\n",
            self.instructions.len(),
            self.instruction_byte_length
        ));

        for (index, instruction) in self.instructions.iter().enumerate() {
            let address = index as u64 * self.instruction_byte_length;
            out.push_str(&format!("{:04x}  {}", address, instruction.text));

            if let (Mnemonic::Set, [_, Operand::Immediate(value)]) =
                (instruction.mnemonic, &instruction.operands)
            {
                out.push_str(&format!("  ; {}", value));
            }

            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_annotate_addresses() {
        let listing = Listing::parse("SET R00 0x0a\nSET R01 0x02\nADD R00 R01", 4).unwrap();
        assert_eq!(listing.len(), 3);
        assert_eq!(
            listing.annotate(),
            "; 3 instructions, 4 bytes each\n\
             0000  SET R00 0x0a  ; 10\n\
             0004  SET R01 0x02  ; 2\n\
             0008  ADD R00 R01\n"
        );
    }

    #[test]
    fn test_compiled_equality_parses() {
        let asm = regc::compile_source("1 == 1;").unwrap();
        let listing = Listing::parse(&asm, regc::target::INSTRUCTION_BYTE_LENGTH).unwrap();
        assert_eq!(listing.len(), 9);
        // the jump target 0x24 is the address of the line after the store
        let annotated = listing.annotate();
        assert!(annotated.contains("0018  SET R04 0x24  ; 36"));
        assert!(annotated.ends_with("0020  SET R02 0x00  ; 0\n"));
    }

    #[test]
    fn test_addresses_are_hex() {
        let source = ["SET R00 0x01"; 5].join("\n");
        let annotated = Listing::parse(&source, 4).unwrap().annotate();
        let addresses: Vec<&str> = annotated
            .lines()
            .skip(1)
            .filter_map(|line| line.split_whitespace().next())
            .collect();
        assert_eq!(addresses, ["0000", "0004", "0008", "000c", "0010"]);
    }

    #[test]
    fn test_uninitialized_default_is_accepted() {
        let listing = Listing::parse("SET R00 0x0", 4).unwrap();
        assert!(listing.annotate().contains("0000  SET R00 0x0  ; 0"));
    }

    #[test]
    fn test_unknown_instruction() {
        let err = Listing::parse("SET R00 0x01\nMUL R00 R01", 4)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Line 2: MUL R00 R01");
        assert_eq!(err.root_cause().to_string(), "unknown instruction 'MUL'");
    }

    #[test]
    fn test_wrong_operand_kinds() {
        assert!(Listing::parse("SET R00 R01", 4).is_err());
        assert!(Listing::parse("ADD R00 0x01", 4).is_err());
        assert!(Listing::parse("MOV R00", 4).is_err());
        assert!(Listing::parse("CJUMP R11 R00", 4).is_err());
    }
}
