//! The SIMD executor: lanewise arithmetic, bytewise logical ops, DUP,
//! LD1/ST1 16-byte vector transfers, register move, and the custom
//! extract-to-scalar instruction.
//!
//! Built as a decision tree on the distinguishing bit ranges
//! (`instr[11:10]` op-class before the arithmetic/logical split,
//! `instr[23:22]` element size, `instr[15:10]` opcode) so the bitwise and
//! arithmetic families never need an exact-word fallback to disambiguate.

use emu_core::EmulatorError;

use crate::bits::{rd, rm, rn, top_byte};
use crate::bus::Arm64Bus;
use crate::registers::Registers;

fn unsupported_format(word: u32, detail: &str) -> EmulatorError {
    #[cfg(debug_assertions)]
    eprintln!("cpu-arm64: unsupported format, word={word:#010x} detail={detail}");
    EmulatorError::UnsupportedInstructionFormat {
        word,
        top_byte: top_byte(word),
        detail: detail.to_string(),
    }
}

/// Execute one SIMD-family instruction.
pub fn execute<B: Arm64Bus>(word: u32, regs: &mut Registers, bus: &mut B) -> Result<(), EmulatorError> {
    if top_byte(word) == 0x4C {
        return exec_ld1_st1(word, regs, bus);
    }
    if top_byte(word) == 0x0D {
        return exec_extract_to_scalar(word, regs);
    }
    execute_data_processing(word, regs)
}

fn element_size(word: u32) -> u8 {
    match (word >> 22) & 0x3 {
        0 => 1,
        1 => 2,
        2 => 4,
        _ => 8,
    }
}

fn execute_data_processing(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let op_class = (word >> 10) & 0x3;
    match op_class {
        0 => exec_logical_or_dup(word, regs),
        _ => exec_arithmetic_or_move(word, regs, op_class),
    }
}

/// `instr[11:10] == 0b00`: the bitwise/DUP family, disjoint from the
/// arithmetic family below because those always carry a nonzero op-class.
fn exec_logical_or_dup(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let opcode = (word >> 12) & 0x3;
    match opcode {
        0 => exec_bitwise(word, regs, |a, b| a & b),
        1 => exec_bitwise(word, regs, |a, b| a | b),
        2 => exec_bitwise(word, regs, |a, b| a ^ b),
        3 => exec_dup(word, regs),
        _ => Err(unsupported_format(word, "unreachable op-class-00 opcode")),
    }
}

fn exec_bitwise(word: u32, regs: &mut Registers, op: fn(u8, u8) -> u8) -> Result<(), EmulatorError> {
    let a = regs.v_bytes(rn(word));
    let b = regs.v_bytes(rm(word));
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = op(a[i], b[i]);
    }
    regs.set_v_bytes(rd(word), out);
    Ok(())
}

/// DUP: broadcast lane `instr[18:16]` (masked to the element width's lane
/// count) of Vn to every lane of Vd at the instruction's element size.
fn exec_dup(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let size = element_size(word);
    let lane_count = 16 / size;
    let lane = ((word >> 16) & 0x7) % lane_count as u32;
    let value = regs.v_lane(rn(word), size, lane as u8);
    for i in 0..lane_count {
        regs.set_v_lane(rd(word), size, i, value);
    }
    Ok(())
}

/// `instr[11:10] != 0b00`: ADD (01), SUB (10), MUL (11) lanewise, plus
/// register move selected by a dedicated bit pattern the arithmetic
/// opcodes never produce.
fn exec_arithmetic_or_move(word: u32, regs: &mut Registers, op_class: u32) -> Result<(), EmulatorError> {
    if word & 0xFFE0_FC00 == 0x4EA0_1C00 {
        return exec_register_move(word, regs);
    }
    let size = element_size(word);
    if op_class == 0b11 && size == 8 {
        return Err(unsupported_format(word, "MUL does not support doubleword elements"));
    }
    let lane_count = 16 / size;
    let n = rn(word);
    let m = rm(word);
    let d = rd(word);
    let modulus: u128 = 1u128 << (8 * size as u32);
    for lane in 0..lane_count {
        let a = u128::from(regs.v_lane(n, size, lane));
        let b = u128::from(regs.v_lane(m, size, lane));
        let result = match op_class {
            0b01 => (a + b) % modulus,
            0b10 => (a + modulus - b) % modulus,
            0b11 => (a * b) % modulus,
            _ => return Err(unsupported_format(word, "op-class must select ADD, SUB, or MUL")),
        };
        regs.set_v_lane(d, size, lane, result as u64);
    }
    Ok(())
}

/// Register move Vd <- Vn: copy all 16 bytes.
fn exec_register_move(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let bytes = regs.v_bytes(rn(word));
    regs.set_v_bytes(rd(word), bytes);
    Ok(())
}

/// LD1/ST1 {Vd.16B},[Xn]: 16 contiguous bytes at `[X[n], X[n]+16)`.
/// `instr[23]` set selects the post-increment variant, which adds 16 to
/// Xn after the transfer. `instr[22]` distinguishes ST1 (0) from LD1 (1),
/// mirroring the float LDR/STR L-bit convention.
fn exec_ld1_st1<B: Arm64Bus>(word: u32, regs: &mut Registers, bus: &mut B) -> Result<(), EmulatorError> {
    let n = rn(word);
    let d = rd(word);
    let addr = regs.x(n);
    let is_load = (word >> 22) & 1 != 0;
    let post_increment = (word >> 23) & 1 != 0;
    if is_load {
        let mut buf = [0u8; 16];
        bus.read_bytes(addr, &mut buf)?;
        regs.set_v_bytes(d, buf);
    } else {
        let bytes = regs.v_bytes(d);
        bus.write_bytes(addr, &bytes)?;
    }
    if post_increment {
        regs.set_x(n, addr.wrapping_add(16));
    }
    Ok(())
}

/// Extract-to-scalar (custom `0x0D......` opcode): `rd = instr[4:0]`,
/// `vn = instr[9:5]`, `index = instr[13:10]`; zero-extend `Vn.B[index]`
/// into Xd.
fn exec_extract_to_scalar(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let vn = rn(word);
    let d = rd(word);
    let index = ((word >> 10) & 0xF) as u8;
    if index >= 16 {
        return Err(unsupported_format(word, "extract-to-scalar index must be 0..16"));
    }
    let value = regs.v_lane(vn, 1, index);
    regs.set_x(d, value);
    Ok(())
}
