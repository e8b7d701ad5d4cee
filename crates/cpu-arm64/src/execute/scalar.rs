//! The scalar executor: integer arithmetic, logical, shift, division,
//! MOVZ, and all branch forms.
//!
//! None of these families touch memory, so this executor only needs the
//! register file — unlike the FP and SIMD executors, which also take a
//! bus for LDR/STR and LD1/ST1.

use emu_core::EmulatorError;

use crate::bits::{imm12, imm16, imm19, imm26, ra, rd, rm, rn, sign_extend, top_byte};
use crate::flags::{condition_holds, flags_for_add, flags_for_sub};
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

/// Execute one scalar-family instruction. `pc` is the address the word was
/// fetched from; branch forms write the new target directly into
/// `regs.pc`. If this function returns without touching `regs.pc`, the
/// engine loop advances it by 4.
pub fn execute(word: u32, pc: u64, regs: &mut Registers) -> Result<(), EmulatorError> {
    match top_byte(word) {
        0xD2 | 0xD3 => exec_movz(word, regs),
        0x91 => exec_add_immediate(word, regs),
        0x8B => exec_add_register(word, regs),
        0xCB => exec_sub_register(word, regs, false),
        0xD1 => exec_sub_immediate(word, regs),
        0xEB => exec_sub_register(word, regs, true),
        0x9B => exec_mul(word, regs),
        0x8A => exec_and_register(word, regs),
        0xAA => exec_orr_register(word, regs),
        0x92 | 0x93 => exec_orr_immediate(word, regs),
        0xCA => exec_eor_register(word, regs),
        0xAB => exec_shift_register(word, regs),
        0xD4 => exec_shift_immediate(word, regs),
        0x9A => exec_division(word, regs),
        0x54 => exec_b_cond(word, pc, regs),
        0x14 => exec_b(word, pc, regs),
        0x17 => exec_bl(word, pc, regs),
        0xD6 => exec_br(word, regs),
        0xD5 => exec_system(word),
        other => {
            #[cfg(debug_assertions)]
            eprintln!("cpu-arm64: unsupported top byte {other:#04x}, word={word:#010x}");
            Err(EmulatorError::UnsupportedInstruction { top_byte: other })
        }
    }
}

/// MOVZ: load a raw 16-bit immediate, zero-extended, ignoring the `hw`
/// shift field (the distilled subset's deliberate simplification).
fn exec_movz(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    regs.set_x(rd(word), u64::from(imm16(word)));
    Ok(())
}

fn exec_add_immediate(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let a = regs.x(rn(word));
    let b = u64::from(imm12(word));
    regs.set_x(rd(word), a.wrapping_add(b));
    Ok(())
}

fn exec_add_register(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let a = regs.x(rn(word));
    let b = regs.x(rm(word));
    regs.set_x(rd(word), a.wrapping_add(b));
    Ok(())
}

fn exec_sub_immediate(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let a = regs.x(rn(word));
    let b = u64::from(imm12(word));
    regs.set_x(rd(word), a.wrapping_sub(b));
    Ok(())
}

/// SUB/SUBS register. `set_flags` distinguishes SUBS (0xEB) from plain
/// SUB (0xCB); only SUBS updates NZCV.
fn exec_sub_register(word: u32, regs: &mut Registers, set_flags: bool) -> Result<(), EmulatorError> {
    let a = regs.x(rn(word));
    let b = regs.x(rm(word));
    let result = a.wrapping_sub(b);
    if set_flags {
        let (n, z, c, v) = flags_for_sub(a, b, result);
        regs.set_nzcv(n, z, c, v);
    }
    regs.set_x(rd(word), result);
    Ok(())
}

/// MUL, encoded as MADD with Ra = XZR (instr[31:21] == 0x4D8).
fn exec_mul(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    if (word >> 21) & 0x7FF != 0x4D8 {
        return Err(unsupported_format(word, "0x9B word is not a MADD encoding"));
    }
    if ra(word) != 31 {
        return Err(unsupported_format(word, "MUL requires Ra = XZR (MADD with nonzero Ra unsupported)"));
    }
    let a = regs.x(rn(word));
    let b = regs.x(rm(word));
    regs.set_x(rd(word), a.wrapping_mul(b));
    Ok(())
}

fn exec_and_register(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let a = regs.x(rn(word));
    let b = regs.x(rm(word));
    regs.set_x(rd(word), a & b);
    Ok(())
}

fn exec_orr_register(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let a = regs.x(rn(word));
    let b = regs.x(rm(word));
    regs.set_x(rd(word), a | b);
    Ok(())
}

/// Simplified ORR immediate: `imm = instr[21:10] << (instr[23:22] * 16)`.
fn exec_orr_immediate(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let raw = (word >> 10) & 0xFFF;
    let shift_field = (word >> 22) & 0x3;
    let imm = u64::from(raw) << (shift_field * 16);
    let a = regs.x(rn(word));
    regs.set_x(rd(word), a | imm);
    Ok(())
}

fn exec_eor_register(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let a = regs.x(rn(word));
    let b = regs.x(rm(word));
    regs.set_x(rd(word), a ^ b);
    Ok(())
}

/// Shift register form: LSL/LSR/ASR selected by `instr[15:10]`.
/// Shift amount is taken modulo 64 (masked with 0x3F).
fn exec_shift_register(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let op = (word >> 10) & 0x3F;
    let a = regs.x(rn(word));
    let amount = (regs.x(rm(word)) & 0x3F) as u32;
    let result = match op {
        0 => a.wrapping_shl(amount),
        1 => a.wrapping_shr(amount),
        2 => ((a as i64).wrapping_shr(amount)) as u64,
        _ => return Err(unsupported_format(word, "shift-register op must be 0 (LSL), 1 (LSR), or 2 (ASR)")),
    };
    regs.set_x(rd(word), result);
    Ok(())
}

/// Shift immediate form: opcode in `instr[23:22]`, amount in the raw 6-bit
/// field at `instr[15:10]`.
fn exec_shift_immediate(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let op = (word >> 22) & 0x3;
    let amount = (word >> 10) & 0x3F;
    let a = regs.x(rn(word));
    let result = match op {
        0 => a.wrapping_shl(amount),
        1 => a.wrapping_shr(amount),
        2 => ((a as i64).wrapping_shr(amount)) as u64,
        _ => return Err(unsupported_format(word, "shift-immediate op must be 0 (LSL), 1 (LSR), or 2 (ASR)")),
    };
    regs.set_x(rd(word), result);
    Ok(())
}

/// UDIV/SDIV, selected by `instr[10]`. Division by zero yields 0
/// architecturally; signed `INT64_MIN / -1` is clamped to `INT64_MIN`
/// rather than trapping the host.
fn exec_division(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    let a = regs.x(rn(word));
    let b = regs.x(rm(word));
    let signed = (word >> 10) & 1 != 0;
    let result = if signed {
        let a = a as i64;
        let b = b as i64;
        let signed_result = if b == 0 {
            0
        } else if a == i64::MIN && b == -1 {
            i64::MIN
        } else {
            a.wrapping_div(b)
        };
        signed_result as u64
    } else if b == 0 {
        0
    } else {
        a / b
    };
    regs.set_x(rd(word), result);
    Ok(())
}

/// B.cond: offset = sign-extend(imm19) * 4, added to the instruction's own
/// PC when the condition holds; otherwise control falls through (the loop
/// advances PC by 4 as normal).
fn exec_b_cond(word: u32, pc: u64, regs: &mut Registers) -> Result<(), EmulatorError> {
    let cond = (word & 0xF) as u8;
    if condition_holds(cond, regs) {
        let offset = i64::from(imm19(word)) * 4;
        regs.pc = pc.wrapping_add_signed(offset);
    }
    Ok(())
}

/// B: unconditional branch, offset = sign-extend(imm26) * 4.
fn exec_b(word: u32, pc: u64, regs: &mut Registers) -> Result<(), EmulatorError> {
    let offset = i64::from(imm26(word)) * 4;
    regs.pc = pc.wrapping_add_signed(offset);
    Ok(())
}

/// BL: like B, but also links the return address (pc + 4) into X30.
fn exec_bl(word: u32, pc: u64, regs: &mut Registers) -> Result<(), EmulatorError> {
    regs.set_x(30, pc.wrapping_add(4));
    let offset = i64::from(imm26(word)) * 4;
    regs.pc = pc.wrapping_add_signed(offset);
    Ok(())
}

/// BR Xn: `instr[31:21] == 0x6B0` (the top byte `0xD6` already fixes the
/// high 8 of those 11 bits to `0xD6`, so the remaining 3 bits must be
/// `000`, giving `0x358 << 3 | 0 == 0x6B0`). Sets PC directly to the
/// target so the loop's "advance by 4 only if unchanged" rule leaves it
/// alone.
fn exec_br(word: u32, regs: &mut Registers) -> Result<(), EmulatorError> {
    if (word >> 21) & 0x7FF != 0x6B0 {
        return Err(unsupported_format(word, "0xD6 word is not a BR encoding"));
    }
    regs.pc = regs.x(rn(word));
    Ok(())
}

/// System family: only the architectural NOP is recognized here. The
/// engine loop intercepts `0xD503201F` before dispatch (it is also the
/// program-end sentinel), so reaching this path means some other `0xD5`
/// word was fetched.
fn exec_system(word: u32) -> Result<(), EmulatorError> {
    Err(unsupported_format(word, "only NOP (0xD503201F) is supported in the system family"))
}
