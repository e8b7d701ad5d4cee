//! The bus contract the CPU core needs from its host.
//!
//! `cpu-arm64` never touches a concrete `Memory`/`Bus` implementation
//! directly — it depends only on this trait, the same way `cpu-m68k`
//! depends on its own `M68kBus` rather than a concrete machine's bus.
//! `emu-arm64` supplies the implementation that routes between main
//! memory and mapped devices.

use emu_core::EmulatorError;

/// Everything the decode/execute units need to move bytes in and out of
/// the addressed world.
pub trait Arm64Bus {
    /// Read `size` bytes (1, 2, 4, or 8) at `addr`, little-endian, widened
    /// into a `u64`.
    fn read(&mut self, addr: u64, size: u8) -> Result<u64, EmulatorError>;

    /// Write the low `size` bytes of `value` at `addr`, little-endian.
    fn write(&mut self, addr: u64, value: u64, size: u8) -> Result<(), EmulatorError>;

    /// Fetch a 32-bit instruction word. `addr` must be 4-byte aligned and
    /// the full word must lie within memory; violations are the caller's
    /// responsibility to turn into `ProgramCounterOutOfBounds` (the engine
    /// loop checks alignment and bounds before calling this).
    fn read_instruction(&mut self, addr: u64) -> Result<u32, EmulatorError>;

    /// Read exactly `buf.len()` contiguous bytes starting at `addr` (used
    /// for 16-byte SIMD vector loads).
    fn read_bytes(&mut self, addr: u64, buf: &mut [u8]) -> Result<(), EmulatorError>;

    /// Write exactly `buf.len()` contiguous bytes starting at `addr` (used
    /// for 16-byte SIMD vector stores).
    fn write_bytes(&mut self, addr: u64, buf: &[u8]) -> Result<(), EmulatorError>;

    /// Whether `addr` is a legal instruction fetch address: 4-byte aligned
    /// and the full word fits within addressable memory. The engine loop
    /// calls this before every fetch so a bad PC is reported as
    /// `ProgramCounterOutOfBounds` rather than the generic
    /// `MemoryOutOfBounds` an ordinary load/store would raise.
    fn is_instruction_address_valid(&self, addr: u64) -> bool;
}
