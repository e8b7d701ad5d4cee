//! Condition-code evaluation (the AArch64 `cond` truth table) and the
//! scalar ALU flag-update contract.

use crate::registers::Registers;

/// Evaluate a 4-bit ARM condition code against the current NZCV flags.
///
/// Codes 0-15 are EQ, NE, CS, CC, MI, PL, VS, VC, HI, LS, GE, LT, GT, LE,
/// AL, NV in that order. AL is always true; NV (reserved) is always false.
#[must_use]
pub fn condition_holds(cond: u8, regs: &Registers) -> bool {
    let (n, z, c, v) = (regs.n(), regs.z(), regs.c(), regs.v());
    match cond & 0xF {
        0x0 => z,                      // EQ
        0x1 => !z,                     // NE
        0x2 => c,                      // CS/HS
        0x3 => !c,                     // CC/LO
        0x4 => n,                      // MI
        0x5 => !n,                     // PL
        0x6 => v,                      // VS
        0x7 => !v,                     // VC
        0x8 => c && !z,                // HI
        0x9 => !c || z,                // LS
        0xA => n == v,                 // GE
        0xB => n != v,                 // LT
        0xC => !z && (n == v),         // GT
        0xD => z || (n != v),          // LE
        0xE => true,                   // AL
        _ => false,                   // NV (0xF)
    }
}

/// Compute NZCV for `a + b = result` (unsigned add, 64-bit).
#[must_use]
pub fn flags_for_add(a: u64, b: u64, result: u64) -> (bool, bool, bool, bool) {
    let n = result & (1 << 63) != 0;
    let z = result == 0;
    let c = result < a; // unsigned overflow
    let sign_a = a & (1 << 63) != 0;
    let sign_b = b & (1 << 63) != 0;
    let sign_r = result & (1 << 63) != 0;
    let v = (sign_a == sign_b) && (sign_a != sign_r);
    (n, z, c, v)
}

/// Compute NZCV for `a - b = result` (unsigned subtract, 64-bit).
#[must_use]
pub fn flags_for_sub(a: u64, b: u64, result: u64) -> (bool, bool, bool, bool) {
    let n = result & (1 << 63) != 0;
    let z = result == 0;
    let c = a >= b; // no borrow
    let sign_a = a & (1 << 63) != 0;
    let sign_b = b & (1 << 63) != 0;
    let sign_r = result & (1 << 63) != 0;
    let v = (sign_a != sign_b) && (sign_a != sign_r);
    (n, z, c, v)
}
