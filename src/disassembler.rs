//! Decodes a byte slice into an [`Instruction`] and renders it as mnemonic text.
//!
//! Mirrors `Encode.cpp`'s `DecodeInstruction` path: classify the opcode, pull whatever
//! trailing bytes its family needs, and print `mnemonic operand,operand`. Immediates are
//! printed as `$`-prefixed hex, except `RST`'s vector and `IN`/`OUT`'s port, which the
//! original leaves as bare hex.

use crate::error::Error;
use crate::instruction::{Instruction, Operands};
use crate::isa::{classify, Isa};
use crate::registers::{register8_mnemonic, Register8, RegisterPair};
use crate::status_register::ConditionCode;
use crate::utils::bits;

/// Decodes the instruction at `memory[pc..]`. Errors if fewer bytes remain than the
/// instruction's family requires.
pub fn decode(memory: &[u8], pc: u16) -> Result<Instruction, Error> {
    let index = pc as usize;
    let opcode = *memory
        .get(index)
        .ok_or(Error::Addressing { address: pc, size: memory.len() })?;
    let isa = classify(opcode);
    let length = isa.length();
    let end = index + length as usize;
    if end > memory.len() {
        return Err(Error::Addressing { address: pc, size: memory.len() });
    }

    let imm16 = || u16::from_le_bytes([memory[index + 1], memory[index + 2]]);

    let operands = match isa {
        Isa::Nop
        | Isa::Rlc
        | Isa::Rrc
        | Isa::Ral
        | Isa::Rar
        | Isa::Daa
        | Isa::Cma
        | Isa::Stc
        | Isa::Cmc
        | Isa::Hlt
        | Isa::Ret
        | Isa::Xthl
        | Isa::Xchg
        | Isa::Pchl
        | Isa::Sphl
        | Isa::Ei
        | Isa::Di => Operands::None,

        Isa::Inr | Isa::Dcr => Operands::Reg(Register8::decode(bits(opcode, 3, 5))?),

        Isa::Mvi => Operands::RegImm8 { reg: Register8::decode(bits(opcode, 3, 5))?, imm: memory[index + 1] },

        Isa::Mov => Operands::RegReg {
            dst: Register8::decode(bits(opcode, 3, 5))?,
            src: Register8::decode(bits(opcode, 0, 2))?,
        },

        Isa::Add | Isa::Adc | Isa::Sub | Isa::Sbb | Isa::Ana | Isa::Xra | Isa::Ora | Isa::Cmp => {
            Operands::Reg(Register8::decode(bits(opcode, 0, 2))?)
        }

        Isa::Adi | Isa::Aci | Isa::Sui | Isa::Sbi | Isa::Ani | Isa::Xri | Isa::Ori | Isa::Cpi => {
            Operands::Imm8(memory[index + 1])
        }

        Isa::Lxi => {
            Operands::RegPairImm16 { pair: RegisterPair::decode(bits(opcode, 4, 5), true)?, imm: imm16() }
        }

        Isa::Dad | Isa::Inx | Isa::Dcx | Isa::Stax | Isa::Ldax => {
            Operands::RegPair(RegisterPair::decode(bits(opcode, 4, 5), true)?)
        }

        Isa::Push | Isa::Pop => Operands::RegPair(RegisterPair::decode(bits(opcode, 4, 5), false)?),

        Isa::Lhld | Isa::Shld | Isa::Lda | Isa::Sta | Isa::Jmp | Isa::Call => Operands::Imm16(imm16()),

        Isa::Jcc | Isa::Ccc => {
            Operands::ConditionImm16 { condition: ConditionCode::decode(bits(opcode, 3, 5))?, imm: imm16() }
        }

        Isa::Rcc => Operands::Condition(ConditionCode::decode(bits(opcode, 3, 5))?),

        Isa::Rst => Operands::Vector(bits(opcode, 3, 5)),

        Isa::In | Isa::Out => Operands::Port(memory[index + 1]),
    };

    Ok(Instruction { isa, operands, length })
}

/// Mnemonic name for a family with no baked-in condition code.
fn base_mnemonic(isa: Isa) -> &'static str {
    match isa {
        Isa::Nop => "nop",
        Isa::Mvi => "mvi",
        Isa::Rlc => "rlc",
        Isa::Rrc => "rrc",
        Isa::Ral => "ral",
        Isa::Rar => "rar",
        Isa::Daa => "daa",
        Isa::Cma => "cma",
        Isa::Stc => "stc",
        Isa::Cmc => "cmc",
        Isa::Ldax => "ldax",
        Isa::Lhld => "lhld",
        Isa::Lda => "lda",
        Isa::Stax => "stax",
        Isa::Shld => "shld",
        Isa::Sta => "sta",
        Isa::Dad => "dad",
        Isa::Lxi => "lxi",
        Isa::Inr => "inr",
        Isa::Dcr => "dcr",
        Isa::Inx => "inx",
        Isa::Dcx => "dcx",
        Isa::Mov => "mov",
        Isa::Hlt => "hlt",
        Isa::Add => "add",
        Isa::Adc => "adc",
        Isa::Sub => "sub",
        Isa::Sbb => "sbb",
        Isa::Ana => "ana",
        Isa::Xra => "xra",
        Isa::Ora => "ora",
        Isa::Cmp => "cmp",
        Isa::Jmp => "jmp",
        Isa::Call => "call",
        Isa::Ret => "ret",
        Isa::Push => "push",
        Isa::Pop => "pop",
        Isa::Xthl => "xthl",
        Isa::Xchg => "xchg",
        Isa::Pchl => "pchl",
        Isa::Sphl => "sphl",
        Isa::In => "in",
        Isa::Out => "out",
        Isa::Ei => "ei",
        Isa::Di => "di",
        Isa::Adi => "adi",
        Isa::Aci => "aci",
        Isa::Sui => "sui",
        Isa::Sbi => "sbi",
        Isa::Ani => "ani",
        Isa::Xri => "xri",
        Isa::Ori => "ori",
        Isa::Cpi => "cpi",
        Isa::Jcc | Isa::Ccc | Isa::Rcc => unreachable!("condition-bearing mnemonics have a dedicated formatter"),
    }
}

fn conditional_mnemonic(isa: Isa, condition: ConditionCode) -> String {
    let prefix = match isa {
        Isa::Jcc => "j",
        Isa::Ccc => "c",
        Isa::Rcc => "r",
        _ => unreachable!("conditional_mnemonic called on non-conditional family"),
    };
    format!("{prefix}{}", condition.mnemonic())
}

/// Renders a decoded instruction as `mnemonic operand,operand`.
pub fn format(instruction: &Instruction) -> String {
    match instruction.operands {
        Operands::None => base_mnemonic(instruction.isa).to_string(),
        Operands::Reg(r) => format!("{} {}", base_mnemonic(instruction.isa), register8_mnemonic(r)),
        Operands::RegPair(p) => format!("{} {}", base_mnemonic(instruction.isa), p.mnemonic()),
        Operands::RegReg { dst, src } => {
            format!("{} {},{}", base_mnemonic(instruction.isa), register8_mnemonic(dst), register8_mnemonic(src))
        }
        Operands::RegImm8 { reg, imm } => {
            format!("{} {},${imm:02x}", base_mnemonic(instruction.isa), register8_mnemonic(reg))
        }
        Operands::RegPairImm16 { pair, imm } => {
            format!("{} {},${imm:04x}", base_mnemonic(instruction.isa), pair.mnemonic())
        }
        Operands::Imm8(imm) => format!("{} ${imm:02x}", base_mnemonic(instruction.isa)),
        Operands::Imm16(imm) => format!("{} ${imm:04x}", base_mnemonic(instruction.isa)),
        Operands::Vector(n) => format!("{} {n}", base_mnemonic(instruction.isa)),
        Operands::Port(p) => format!("{} {p:02x}", base_mnemonic(instruction.isa)),
        Operands::Condition(condition) => conditional_mnemonic(instruction.isa, condition),
        Operands::ConditionImm16 { condition, imm } => {
            format!("{} ${imm:04x}", conditional_mnemonic(instruction.isa, condition))
        }
    }
}

/// Decodes and formats in one step.
pub fn disassemble(memory: &[u8], pc: u16) -> Result<(Instruction, String), Error> {
    let instruction = decode(memory, pc)?;
    let text = format(&instruction);
    Ok((instruction, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_and_formats_mvi() {
        let memory = [0x3E, 0x05];
        let (instr, text) = disassemble(&memory, 0).unwrap();
        assert_eq!(instr.length, 2);
        assert_eq!(text, "mvi a,$05");
    }

    #[test]
    fn decodes_and_formats_mov() {
        let memory = [0x41];
        let (_, text) = disassemble(&memory, 0).unwrap();
        assert_eq!(text, "mov b,c");
    }

    #[test]
    fn decodes_and_formats_conditional_jump() {
        let memory = [0xC2, 0x34, 0x12];
        let (_, text) = disassemble(&memory, 0).unwrap();
        assert_eq!(text, "jnz $1234");
    }

    #[test]
    fn decodes_rst_and_port_operands_without_dollar_prefix() {
        let memory = [0xCF];
        let (_, text) = disassemble(&memory, 0).unwrap();
        assert_eq!(text, "rst 1");

        let memory = [0xDB, 0x0A];
        let (_, text) = disassemble(&memory, 0).unwrap();
        assert_eq!(text, "in 0a");
    }

    #[test]
    fn truncated_instruction_reports_addressing_error() {
        let memory = [0x3E];
        assert!(decode(&memory, 0).is_err());
    }
}
