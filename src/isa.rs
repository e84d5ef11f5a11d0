//! Classifies an opcode byte into its instruction family and fixed byte length.
//!
//! [`classify`] is the single decode used by both the execute engine ([`crate::cpu`]) and
//! the disassembler ([`crate::disassembler`]), mirroring the teacher's `Isa`/`IsaEntry`
//! split: one decode, two consumers. The 8080's opcode space is regular enough (and only
//! 256 entries wide, versus the 68k's 65536) that a direct hierarchical match replaces the
//! teacher's generated lookup table and its dedicated generator binary.

use crate::utils::{bit, bits};

/// The instruction family an opcode decodes to. Byte length and cycle accounting both key
/// off this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Isa {
    Nop,
    Mvi,
    Rlc,
    Rrc,
    Ral,
    Rar,
    Daa,
    Cma,
    Stc,
    Cmc,
    Ldax,
    Lhld,
    Lda,
    Stax,
    Shld,
    Sta,
    Dad,
    Lxi,
    Inr,
    Dcr,
    Inx,
    Dcx,
    Mov,
    Hlt,
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
    Jmp,
    Call,
    Ret,
    Jcc,
    Ccc,
    Rcc,
    Rst,
    Push,
    Pop,
    Xthl,
    Xchg,
    Pchl,
    Sphl,
    In,
    Out,
    Ei,
    Di,
    Adi,
    Aci,
    Sui,
    Sbi,
    Ani,
    Xri,
    Ori,
    Cpi,
}

/// One of the eight accumulator ALU ops, selected by bits 5..3 in both the register-source
/// (field `10`) and immediate (field `11`, low nibble `6`/`E`) encodings.
fn alu_op(selector: u8, immediate: bool) -> Isa {
    match (selector, immediate) {
        (0b000, false) => Isa::Add,
        (0b001, false) => Isa::Adc,
        (0b010, false) => Isa::Sub,
        (0b011, false) => Isa::Sbb,
        (0b100, false) => Isa::Ana,
        (0b101, false) => Isa::Xra,
        (0b110, false) => Isa::Ora,
        (0b111, false) => Isa::Cmp,
        (0b000, true) => Isa::Adi,
        (0b001, true) => Isa::Aci,
        (0b010, true) => Isa::Sui,
        (0b011, true) => Isa::Sbi,
        (0b100, true) => Isa::Ani,
        (0b101, true) => Isa::Xri,
        (0b110, true) => Isa::Ori,
        (0b111, true) => Isa::Cpi,
        _ => unreachable!("3-bit selector out of range"),
    }
}

/// Classifies an opcode byte. Total: every byte value decodes to exactly one [`Isa`].
pub fn classify(opcode: u8) -> Isa {
    match bits(opcode, 6, 7) {
        0b00 => classify_field00(opcode),
        0b01 => {
            if opcode == 0b0111_0110 {
                Isa::Hlt
            } else {
                Isa::Mov
            }
        }
        0b10 => alu_op(bits(opcode, 3, 5), false),
        _ => classify_field11(opcode),
    }
}

fn classify_field00(opcode: u8) -> Isa {
    match bits(opcode, 0, 2) {
        0b000 => Isa::Nop,
        0b110 => Isa::Mvi,
        0b111 => match bits(opcode, 3, 5) {
            0b000 => Isa::Rlc,
            0b001 => Isa::Rrc,
            0b010 => Isa::Ral,
            0b011 => Isa::Rar,
            0b100 => Isa::Daa,
            0b101 => Isa::Cma,
            0b110 => Isa::Stc,
            _ => Isa::Cmc,
        },
        0b010 => {
            let load = bit(opcode, 3);
            match (bits(opcode, 4, 5), load) {
                (0b11, true) => Isa::Lda,
                (0b10, true) => Isa::Lhld,
                (_, true) => Isa::Ldax,
                (0b11, false) => Isa::Sta,
                (0b10, false) => Isa::Shld,
                (_, false) => Isa::Stax,
            }
        }
        0b001 => {
            if bit(opcode, 3) {
                Isa::Dad
            } else {
                Isa::Lxi
            }
        }
        _ if bit(opcode, 2) => {
            if bits(opcode, 0, 1) == 0b00 {
                Isa::Inr
            } else {
                Isa::Dcr
            }
        }
        _ => {
            if bit(opcode, 3) {
                Isa::Dcx
            } else {
                Isa::Inx
            }
        }
    }
}

fn classify_field11(opcode: u8) -> Isa {
    match opcode {
        0xC3 | 0xCB => return Isa::Jmp,
        0xFB => return Isa::Ei,
        0xF3 => return Isa::Di,
        0xE3 => return Isa::Xthl,
        0xEB => return Isa::Xchg,
        0xE9 => return Isa::Pchl,
        0xF9 => return Isa::Sphl,
        0xDB => return Isa::In,
        0xD3 => return Isa::Out,
        0xC9 | 0xD9 => return Isa::Ret,
        _ => {}
    }

    match bits(opcode, 0, 3) {
        0x1 => return Isa::Pop,
        0x5 => return Isa::Push,
        0x6 | 0xE => return alu_op(bits(opcode, 3, 5), true),
        0xD => return Isa::Call,
        _ => {}
    }

    match bits(opcode, 0, 2) {
        0b000 => Isa::Rcc,
        0b010 => Isa::Jcc,
        0b100 => Isa::Ccc,
        _ => Isa::Rst,
    }
}

impl Isa {
    /// Total instruction length in bytes: a function of the opcode's family alone.
    pub const fn length(self) -> u8 {
        match self {
            Isa::Mvi
            | Isa::In
            | Isa::Out
            | Isa::Adi
            | Isa::Aci
            | Isa::Sui
            | Isa::Sbi
            | Isa::Ani
            | Isa::Xri
            | Isa::Ori
            | Isa::Cpi => 2,

            Isa::Lhld | Isa::Lda | Isa::Shld | Isa::Sta | Isa::Lxi | Isa::Jmp | Isa::Call | Isa::Jcc | Isa::Ccc => 3,

            _ => 1,
        }
    }

    /// Whether this family carries a 3-bit register operand selected from the opcode byte
    /// itself (as opposed to no register operand, or a register-pair operand).
    pub const fn has_register_operand(self) -> bool {
        matches!(
            self,
            Isa::Mvi
                | Isa::Inr
                | Isa::Dcr
                | Isa::Mov
                | Isa::Add
                | Isa::Adc
                | Isa::Sub
                | Isa::Sbb
                | Isa::Ana
                | Isa::Xra
                | Isa::Ora
                | Isa::Cmp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_total() {
        for opcode in 0u16..=0xFF {
            let _ = classify(opcode as u8);
        }
    }

    #[test]
    fn classify_matches_known_opcodes() {
        assert_eq!(classify(0x00), Isa::Nop);
        assert_eq!(classify(0x76), Isa::Hlt);
        assert_eq!(classify(0x01), Isa::Lxi);
        assert_eq!(classify(0x09), Isa::Dad);
        assert_eq!(classify(0x3E), Isa::Mvi);
        assert_eq!(classify(0xC3), Isa::Jmp);
        assert_eq!(classify(0xCB), Isa::Jmp);
        assert_eq!(classify(0xCD), Isa::Call);
        assert_eq!(classify(0xC9), Isa::Ret);
        assert_eq!(classify(0xD9), Isa::Ret);
        assert_eq!(classify(0xC7), Isa::Rst);
        assert_eq!(classify(0xC2), Isa::Jcc);
        assert_eq!(classify(0xC4), Isa::Ccc);
        assert_eq!(classify(0xC0), Isa::Rcc);
        assert_eq!(classify(0xE6), Isa::Ani);
        assert_eq!(classify(0xFE), Isa::Cpi);
        assert_eq!(classify(0xA0), Isa::Ana);
    }

    #[test]
    fn lengths_match_format_table() {
        assert_eq!(Isa::Nop.length(), 1);
        assert_eq!(Isa::Mvi.length(), 2);
        assert_eq!(Isa::Lxi.length(), 3);
        assert_eq!(Isa::Jcc.length(), 3);
        assert_eq!(Isa::Rcc.length(), 1);
        assert_eq!(Isa::In.length(), 2);
    }
}
