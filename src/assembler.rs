//! Encodes one line of mnemonic text into its instruction bytes: the inverse of
//! [`crate::disassembler`]. Mirrors `Encode.cpp`'s `EncodeInstruction` path: split the
//! mnemonic from its operand list, determine the argument shape, then assemble the opcode
//! byte from register/condition/immediate fields.

use crate::error::Error;
use crate::registers::{register8_from_mnemonic, RegisterPair};
use crate::status_register::ConditionCode;
use crate::utils::{normalize, u16_from_hex, u8_from_hex};

fn encode_err(mnemonic: &str, reason: impl Into<String>) -> Error {
    Error::Encode { mnemonic: mnemonic.to_string(), reason: reason.into() }
}

/// Assembles one line of text (e.g. `"mvi a,$05"`) into its 1-3 byte encoding.
pub fn assemble(line: &str) -> Result<Vec<u8>, Error> {
    let normalized = normalize(line);
    let mut words = normalized.splitn(2, char::is_whitespace);
    let mnemonic = words.next().unwrap_or("");
    let rest = words.next().unwrap_or("").trim();
    let operands: Vec<&str> = if rest.is_empty() { Vec::new() } else { rest.split(',').map(str::trim).collect() };

    if let Some(bytes) = encode_fixed(mnemonic, &operands)? {
        return Ok(bytes);
    }
    if let Some(bytes) = encode_conditional(mnemonic, &operands)? {
        return Ok(bytes);
    }
    Err(encode_err(mnemonic, "unrecognized mnemonic"))
}

fn expect_operand_count(mnemonic: &str, operands: &[&str], count: usize) -> Result<(), Error> {
    if operands.len() != count {
        return Err(encode_err(mnemonic, format!("expected {count} operand(s), found {}", operands.len())));
    }
    Ok(())
}

fn parse_reg8(mnemonic: &str, tok: &str) -> Result<u8, Error> {
    register8_from_mnemonic(tok).map(|r| r.code()).ok_or_else(|| encode_err(mnemonic, format!("'{tok}' is not a register")))
}

fn parse_reg_pair(mnemonic: &str, tok: &str, sp_available: bool) -> Result<u8, Error> {
    let pair = match (tok, sp_available) {
        ("b", _) => RegisterPair::Bc,
        ("d", _) => RegisterPair::De,
        ("h", _) => RegisterPair::Hl,
        ("sp", true) => RegisterPair::Sp,
        ("psw", false) => RegisterPair::Psw,
        _ => return Err(encode_err(mnemonic, format!("'{tok}' is not a valid register pair here"))),
    };
    Ok(pair.code())
}

fn parse_imm8(mnemonic: &str, tok: &str) -> Result<u8, Error> {
    tok.strip_prefix('$')
        .and_then(u8_from_hex)
        .ok_or_else(|| encode_err(mnemonic, format!("'{tok}' is not an 8-bit $hex immediate")))
}

fn parse_imm16(mnemonic: &str, tok: &str) -> Result<u16, Error> {
    tok.strip_prefix('$')
        .and_then(u16_from_hex)
        .ok_or_else(|| encode_err(mnemonic, format!("'{tok}' is not a 16-bit $hex immediate")))
}

fn parse_bare_hex8(mnemonic: &str, tok: &str) -> Result<u8, Error> {
    u8_from_hex(tok).ok_or_else(|| encode_err(mnemonic, format!("'{tok}' is not a hex byte")))
}

fn parse_vector(mnemonic: &str, tok: &str) -> Result<u8, Error> {
    let n: u8 = tok.parse().map_err(|_| encode_err(mnemonic, format!("'{tok}' is not an RST vector")))?;
    if n > 7 {
        return Err(encode_err(mnemonic, "RST vector must be 0-7"));
    }
    Ok(n)
}

/// Opcodes that do not embed a branch condition.
fn encode_fixed(mnemonic: &str, operands: &[&str]) -> Result<Option<Vec<u8>>, Error> {
    let alu_op = |name: &str| -> Option<u8> {
        Some(match name {
            "add" => 0b000,
            "adc" => 0b001,
            "sub" => 0b010,
            "sbb" => 0b011,
            "ana" => 0b100,
            "xra" => 0b101,
            "ora" => 0b110,
            "cmp" => 0b111,
            "adi" => 0b000,
            "aci" => 0b001,
            "sui" => 0b010,
            "sbi" => 0b011,
            "ani" => 0b100,
            "xri" => 0b101,
            "ori" => 0b110,
            "cpi" => 0b111,
            _ => return None,
        })
    };

    let bytes = match mnemonic {
        "nop" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x00]
        }
        "hlt" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x76]
        }
        "rlc" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x07]
        }
        "rrc" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x0F]
        }
        "ral" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x17]
        }
        "rar" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x1F]
        }
        "daa" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x27]
        }
        "cma" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x2F]
        }
        "stc" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x37]
        }
        "cmc" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0x3F]
        }
        "ret" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0xC9]
        }
        "xthl" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0xE3]
        }
        "xchg" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0xEB]
        }
        "pchl" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0xE9]
        }
        "sphl" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0xF9]
        }
        "ei" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0xFB]
        }
        "di" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0xF3]
        }

        "inr" | "dcr" => {
            expect_operand_count(mnemonic, operands, 1)?;
            let reg = parse_reg8(mnemonic, operands[0])?;
            let op = if mnemonic == "inr" { 0b100 } else { 0b101 };
            vec![(reg << 3) | op]
        }

        "mov" => {
            expect_operand_count(mnemonic, operands, 2)?;
            let dst = parse_reg8(mnemonic, operands[0])?;
            let src = parse_reg8(mnemonic, operands[1])?;
            if dst == crate::registers::REG_M && src == crate::registers::REG_M {
                return Err(encode_err(mnemonic, "mov m,m is not a valid encoding (that slot is HLT)"));
            }
            vec![0b0100_0000 | (dst << 3) | src]
        }

        "mvi" => {
            expect_operand_count(mnemonic, operands, 2)?;
            let reg = parse_reg8(mnemonic, operands[0])?;
            let imm = parse_imm8(mnemonic, operands[1])?;
            vec![0b0000_0110 | (reg << 3), imm]
        }

        "lxi" => {
            expect_operand_count(mnemonic, operands, 2)?;
            let pair = parse_reg_pair(mnemonic, operands[0], true)?;
            let imm = parse_imm16(mnemonic, operands[1])?;
            let [lo, hi] = imm.to_le_bytes();
            vec![0b0000_0001 | (pair << 4), lo, hi]
        }

        "dad" => vec![0b0000_1001 | (parse_reg_pair(mnemonic, single(mnemonic, operands)?, true)? << 4)],
        "inx" => vec![0b0000_0011 | (parse_reg_pair(mnemonic, single(mnemonic, operands)?, true)? << 4)],
        "dcx" => vec![0b0000_1011 | (parse_reg_pair(mnemonic, single(mnemonic, operands)?, true)? << 4)],

        "stax" => {
            let pair = single(mnemonic, operands)?;
            match pair {
                "b" => vec![0x02],
                "d" => vec![0x12],
                _ => return Err(encode_err(mnemonic, "stax only accepts b or d")),
            }
        }
        "ldax" => {
            let pair = single(mnemonic, operands)?;
            match pair {
                "b" => vec![0x0A],
                "d" => vec![0x1A],
                _ => return Err(encode_err(mnemonic, "ldax only accepts b or d")),
            }
        }

        "lhld" => vec![0x2A, 0, 0].tap_imm16(parse_imm16(mnemonic, single(mnemonic, operands)?)?),
        "shld" => vec![0x22, 0, 0].tap_imm16(parse_imm16(mnemonic, single(mnemonic, operands)?)?),
        "lda" => vec![0x3A, 0, 0].tap_imm16(parse_imm16(mnemonic, single(mnemonic, operands)?)?),
        "sta" => vec![0x32, 0, 0].tap_imm16(parse_imm16(mnemonic, single(mnemonic, operands)?)?),

        "jmp" => vec![0xC3, 0, 0].tap_imm16(parse_imm16(mnemonic, single(mnemonic, operands)?)?),
        "call" => vec![0xCD, 0, 0].tap_imm16(parse_imm16(mnemonic, single(mnemonic, operands)?)?),

        "push" => vec![0b1100_0101 | (parse_reg_pair(mnemonic, single(mnemonic, operands)?, false)? << 4)],
        "pop" => vec![0b1100_0001 | (parse_reg_pair(mnemonic, single(mnemonic, operands)?, false)? << 4)],

        "rst" => vec![0b1100_0111 | (parse_vector(mnemonic, single(mnemonic, operands)?)? << 3)],

        "in" => vec![0xDB, parse_bare_hex8(mnemonic, single(mnemonic, operands)?)?],
        "out" => vec![0xD3, parse_bare_hex8(mnemonic, single(mnemonic, operands)?)?],

        _ => {
            if let Some(op) = alu_op(mnemonic) {
                if ["add", "adc", "sub", "sbb", "ana", "xra", "ora", "cmp"].contains(&mnemonic) {
                    expect_operand_count(mnemonic, operands, 1)?;
                    vec![0b1000_0000 | (op << 3) | parse_reg8(mnemonic, operands[0])?]
                } else {
                    expect_operand_count(mnemonic, operands, 1)?;
                    vec![0b1100_0110 | (op << 3), parse_imm8(mnemonic, operands[0])?]
                }
            } else {
                return Ok(None);
            }
        }
    };
    Ok(Some(bytes))
}

/// `Jcc`/`Ccc`/`Rcc`: a `j`/`c`/`r` prefix followed by a condition mnemonic.
fn encode_conditional(mnemonic: &str, operands: &[&str]) -> Result<Option<Vec<u8>>, Error> {
    if mnemonic.is_empty() {
        return Ok(None);
    }
    let (prefix, suffix) = mnemonic.split_at(1);
    let Some(condition) = ConditionCode::from_mnemonic(suffix) else { return Ok(None) };
    let code = condition.code();

    let bytes = match prefix {
        "j" => {
            expect_operand_count(mnemonic, operands, 1)?;
            let imm = parse_imm16(mnemonic, operands[0])?;
            let [lo, hi] = imm.to_le_bytes();
            vec![0b1100_0010 | (code << 3), lo, hi]
        }
        "c" => {
            expect_operand_count(mnemonic, operands, 1)?;
            let imm = parse_imm16(mnemonic, operands[0])?;
            let [lo, hi] = imm.to_le_bytes();
            vec![0b1100_0100 | (code << 3), lo, hi]
        }
        "r" => {
            expect_operand_count(mnemonic, operands, 0)?;
            vec![0b1100_0000 | (code << 3)]
        }
        _ => return Ok(None),
    };
    Ok(Some(bytes))
}

fn single<'a>(mnemonic: &str, operands: &[&'a str]) -> Result<&'a str, Error> {
    expect_operand_count(mnemonic, operands, 1)?;
    Ok(operands[0])
}

trait TapImm16 {
    fn tap_imm16(self, imm: u16) -> Vec<u8>;
}

impl TapImm16 for Vec<u8> {
    fn tap_imm16(mut self, imm: u16) -> Vec<u8> {
        let [lo, hi] = imm.to_le_bytes();
        self[1] = lo;
        self[2] = hi;
        self
    }
}
