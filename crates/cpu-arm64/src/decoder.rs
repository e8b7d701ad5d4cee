//! Top-level instruction classification: routes a fetched 32-bit word to
//! whichever of the three execute units understands its family.
//!
//! The scalar family covers the widest range of top bytes, so rather than
//! listing every one of them here, [`execute::scalar::execute`] owns that
//! whole match and this function only intercepts the top bytes that belong
//! to the floating-point and SIMD families before falling through to it.
//! This keeps the family boundaries visible in one place without
//! duplicating the scalar opcode table.

use emu_core::EmulatorError;

use crate::bits::top_byte;
use crate::bus::Arm64Bus;
use crate::execute::{fp, scalar, simd};
use crate::registers::Registers;

/// Decode `word` (fetched from `pc`) and dispatch it to the matching
/// execute unit, mutating `regs` and, for load/store forms, `bus`.
///
/// Branch forms write a new value into `regs.pc`; otherwise `regs.pc` is
/// left untouched and the caller (the engine loop) advances it by 4.
pub fn decode_and_execute<B: Arm64Bus>(
    word: u32,
    pc: u64,
    regs: &mut Registers,
    bus: &mut B,
) -> Result<(), EmulatorError> {
    match top_byte(word) {
        0x1E | 0x1F | 0x9E | 0xBD | 0xFD => fp::execute(word, regs, bus),
        0x4C | 0x4E | 0x6E | 0x0D => simd::execute(word, regs, bus),
        _ => scalar::execute(word, pc, regs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestBus {
        memory: Vec<u8>,
    }

    impl TestBus {
        fn new() -> Self {
            Self { memory: vec![0u8; 4096] }
        }
    }

    impl Arm64Bus for TestBus {
        fn read(&mut self, addr: u64, size: u8) -> Result<u64, EmulatorError> {
            let addr = addr as usize;
            let mut buf = [0u8; 8];
            buf[..size as usize].copy_from_slice(&self.memory[addr..addr + size as usize]);
            Ok(u64::from_le_bytes(buf))
        }
        fn write(&mut self, addr: u64, value: u64, size: u8) -> Result<(), EmulatorError> {
            let addr = addr as usize;
            let bytes = value.to_le_bytes();
            self.memory[addr..addr + size as usize].copy_from_slice(&bytes[..size as usize]);
            Ok(())
        }
        fn read_instruction(&mut self, addr: u64) -> Result<u32, EmulatorError> {
            Ok(self.read(addr, 4)? as u32)
        }
        fn read_bytes(&mut self, addr: u64, buf: &mut [u8]) -> Result<(), EmulatorError> {
            buf.copy_from_slice(&self.memory[addr as usize..addr as usize + buf.len()]);
            Ok(())
        }
        fn write_bytes(&mut self, addr: u64, buf: &[u8]) -> Result<(), EmulatorError> {
            self.memory[addr as usize..addr as usize + buf.len()].copy_from_slice(buf);
            Ok(())
        }
        fn is_instruction_address_valid(&self, addr: u64) -> bool {
            addr % 4 == 0 && (addr as usize) + 4 <= self.memory.len()
        }
    }

    #[test]
    fn movz_routes_through_scalar() {
        let mut regs = Registers::new();
        let mut bus = TestBus::new();
        let word = 0xD280_0140; // MOVZ X0, #10
        decode_and_execute(word, 0, &mut regs, &mut bus).unwrap();
        assert_eq!(regs.x(0), 10);
    }

    #[test]
    fn fadd_routes_through_fp() {
        let mut regs = Registers::new();
        let mut bus = TestBus::new();
        regs.set_s(1, 1.5);
        regs.set_s(2, 2.5);
        let word = 0x1E20_2800 | (2 << 16) | (1 << 5);
        decode_and_execute(word, 0, &mut regs, &mut bus).unwrap();
        assert_eq!(regs.s(0), 4.0);
    }

    #[test]
    fn extract_to_scalar_routes_through_simd() {
        let mut regs = Registers::new();
        let mut bus = TestBus::new();
        let mut src = [0u8; 16];
        src[2] = 0x42;
        regs.set_v_bytes(1, src);
        let word = 0x0D00_0000 | (2 << 10) | (1 << 5);
        decode_and_execute(word, 0, &mut regs, &mut bus).unwrap();
        assert_eq!(regs.x(0), 0x42);
    }

    #[test]
    fn unrecognized_top_byte_is_unsupported() {
        let mut regs = Registers::new();
        let mut bus = TestBus::new();
        let result = decode_and_execute(0xFF00_0000, 0, &mut regs, &mut bus);
        assert!(matches!(result, Err(EmulatorError::UnsupportedInstruction { top_byte: 0xFF })));
    }
}
