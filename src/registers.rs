//! Register and register-pair codes, and the `M` (memory-indirect) special case.
//!
//! `M` (code `0b110`) is the only register code that indirects through memory, so
//! [`Register8`] is a tagged variant rather than a bare index, per the register-file
//! design note: `Direct(index) | Indirect`. The pair code `0b11` similarly means either
//! the stack pointer or the PSW depending on the instruction, captured by [`RegisterPair`].

use crate::error::{DomainKind, Error};

pub const REG_B: u8 = 0b000;
pub const REG_C: u8 = 0b001;
pub const REG_D: u8 = 0b010;
pub const REG_E: u8 = 0b011;
pub const REG_H: u8 = 0b100;
pub const REG_L: u8 = 0b101;
pub const REG_M: u8 = 0b110;
pub const REG_A: u8 = 0b111;

/// A decoded 3-bit register code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register8 {
    /// Index into [`crate::state::CpuState::registers`].
    Direct(u8),
    /// The byte at address `HL`.
    Indirect,
}

impl Register8 {
    pub fn decode(code: u8) -> Result<Self, Error> {
        match code {
            REG_B | REG_C | REG_D | REG_E | REG_H | REG_L | REG_A => Ok(Register8::Direct(register_index(code))),
            REG_M => Ok(Register8::Indirect),
            _ => Err(Error::Domain { kind: DomainKind::Register, code }),
        }
    }

    /// The 3-bit code this register was decoded from (used by the disassembler/encoder to
    /// round-trip register mnemonics).
    pub fn code(self) -> u8 {
        match self {
            Register8::Indirect => REG_M,
            Register8::Direct(index) => [REG_B, REG_C, REG_D, REG_E, REG_H, REG_L, REG_A][index as usize],
        }
    }
}

/// Maps a register code to its index in `CpuState::registers` (B, C, D, E, H, L, A).
fn register_index(code: u8) -> u8 {
    match code {
        REG_B => 0,
        REG_C => 1,
        REG_D => 2,
        REG_E => 3,
        REG_H => 4,
        REG_L => 5,
        REG_A => 6,
        _ => unreachable!("register_index called with non-register code {code}"),
    }
}

/// A decoded 2-bit register-pair code. `Sp`/`Psw` share the bit pattern `0b11`; which one
/// applies depends on the instruction (stack-manipulating vs. `LXI`/`DAD`-style).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterPair {
    Bc,
    De,
    Hl,
    Sp,
    Psw,
}

impl RegisterPair {
    pub fn decode(code: u8, sp_available: bool) -> Result<Self, Error> {
        match code {
            0b00 => Ok(RegisterPair::Bc),
            0b01 => Ok(RegisterPair::De),
            0b10 => Ok(RegisterPair::Hl),
            0b11 => Ok(if sp_available { RegisterPair::Sp } else { RegisterPair::Psw }),
            _ => Err(Error::Domain { kind: DomainKind::RegisterPair, code }),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            RegisterPair::Bc => 0b00,
            RegisterPair::De => 0b01,
            RegisterPair::Hl => 0b10,
            RegisterPair::Sp | RegisterPair::Psw => 0b11,
        }
    }

    /// High/low register indices for the `Bc`/`De`/`Hl` pairs. `None` for `Sp`/`Psw`, which
    /// are not stored in the register file.
    pub fn high_low(self) -> Option<(u8, u8)> {
        match self {
            RegisterPair::Bc => Some((0, 1)),
            RegisterPair::De => Some((2, 3)),
            RegisterPair::Hl => Some((4, 5)),
            RegisterPair::Sp | RegisterPair::Psw => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            RegisterPair::Bc => "b",
            RegisterPair::De => "d",
            RegisterPair::Hl => "h",
            RegisterPair::Sp => "sp",
            RegisterPair::Psw => "psw",
        }
    }
}

pub fn register8_mnemonic(r: Register8) -> &'static str {
    match r {
        Register8::Direct(0) => "b",
        Register8::Direct(1) => "c",
        Register8::Direct(2) => "d",
        Register8::Direct(3) => "e",
        Register8::Direct(4) => "h",
        Register8::Direct(5) => "l",
        Register8::Direct(6) => "a",
        Register8::Indirect => "m",
        Register8::Direct(other) => unreachable!("register index out of range: {other}"),
    }
}

pub fn register8_from_mnemonic(s: &str) -> Option<Register8> {
    let code = match s {
        "a" => REG_A,
        "b" => REG_B,
        "c" => REG_C,
        "d" => REG_D,
        "e" => REG_E,
        "h" => REG_H,
        "l" => REG_L,
        "m" => REG_M,
        _ => return None,
    };
    Register8::decode(code).ok()
}
