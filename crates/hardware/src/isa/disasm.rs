//! Instruction Disassembler for SIC/XE.
//!
//! Converts raw instruction bytes into assembler-like text for execution traces and
//! program listings, and splits loaded byte ranges into instructions.
//!
//! # Usage
//!
//! ```
//! use sicsim_core::isa::disasm::disassemble;
//! assert_eq!(disassemble(&[0x01, 0x00, 0x05]), "LDA #5");
//! assert_eq!(disassemble(&[0x4B, 0x10, 0x10, 0x36]), "+JSUB 0x01036");
//! ```

use super::decode::{instruction_length, lookup};
use super::instruction::{DISP_BITS, Format, InstructionBits};
use super::opcodes;
use crate::common::reg::Register;
use crate::common::word::sign_extend;

fn reg_name(idx: u8) -> &'static str {
    Register::from_index(idx).map_or("?", Register::name)
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// Disassembles one instruction.
///
/// Returns `BYTE X'..'` for bytes that do not start a known instruction or are too
/// short for their format.
///
/// # Arguments
///
/// * `bytes` - The instruction bytes, exactly as long as the instruction.
pub fn disassemble(bytes: &[u8]) -> String {
    let Some(&b0) = bytes.first() else {
        return String::new();
    };
    let Some(info) = lookup(b0) else {
        return format!("BYTE X'{}'", hex_bytes(bytes));
    };
    if instruction_length(b0, bytes.get(1).copied()) != Some(bytes.len()) {
        return format!("BYTE X'{}'", hex_bytes(bytes));
    }

    match info.format {
        Format::One => info.mnemonic.to_owned(),
        Format::Two => {
            let (r1, r2) = (bytes.r1(), bytes.r2());
            match info.opcode {
                opcodes::CLEAR | opcodes::TIXR => format!("{} {}", info.mnemonic, reg_name(r1)),
                opcodes::SVC => format!("SVC {r1}"),
                opcodes::SHIFTL | opcodes::SHIFTR => {
                    format!("{} {},{}", info.mnemonic, reg_name(r1), r2 + 1)
                }
                _ => format!("{} {},{}", info.mnemonic, reg_name(r1), reg_name(r2)),
            }
        }
        Format::ThreeFour => {
            let flags = bytes.flags();
            let plus = if flags.e { "+" } else { "" };
            if info.opcode == opcodes::RSUB {
                return format!("{plus}RSUB");
            }
            let mark = if flags.is_immediate() {
                "#"
            } else if flags.is_indirect() {
                "@"
            } else {
                ""
            };
            let field = bytes.address_field();
            let operand = if flags.e {
                format!("0x{field:05X}")
            } else if flags.is_immediate() && !flags.b && !flags.p {
                format!("{field}")
            } else if flags.signed_displacement() {
                let disp = sign_extend(field, DISP_BITS);
                let sign = if disp < 0 { "-" } else { "" };
                format!("{sign}0x{:03X}", disp.unsigned_abs())
            } else {
                format!("0x{field:03X}")
            };
            let base = match (flags.b, flags.p, flags.e) {
                (false, true, false) => "(PC)",
                (true, false, false) => "(B)",
                _ => "",
            };
            let index = if flags.x { ",X" } else { "" };
            format!("{plus}{} {mark}{operand}{base}{index}", info.mnemonic)
        }
    }
}

/// One line of a program listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingLine {
    /// Address of the first byte.
    pub address: u32,
    /// Raw bytes.
    pub bytes: Vec<u8>,
    /// Disassembled text.
    pub text: String,
}

/// Splits a loaded byte range into instructions.
///
/// Lengths come from the same decoder the engine uses. When an instruction would run
/// past the end of the range, the remaining bytes form the last line.
///
/// # Arguments
///
/// * `start` - Address of `bytes[0]`.
/// * `bytes` - The loaded bytes.
pub fn list_region(start: u32, bytes: &[u8]) -> Vec<ListingLine> {
    let mut lines = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let len = instruction_length(bytes[offset], bytes.get(offset + 1).copied())
            .unwrap_or(1)
            .min(bytes.len() - offset);
        let chunk = &bytes[offset..offset + len];
        lines.push(ListingLine {
            address: start.wrapping_add(offset as u32),
            bytes: chunk.to_vec(),
            text: disassemble(chunk),
        });
        offset += len;
    }
    lines
}

impl std::fmt::Display for ListingLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06X}  {:<8}  {}", self.address, hex_bytes(&self.bytes), self.text)
    }
}
