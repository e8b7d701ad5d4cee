//! The ARM64 (AArch64) CPU core: register file, instruction decoder, and
//! the three execute units (scalar, floating-point, SIMD).
//!
//! This crate never touches a concrete memory or device implementation —
//! it depends only on the [`Arm64Bus`] trait, the same way `cpu-m68k`
//! depends on its own `M68kBus` rather than a concrete machine's bus.
//! `emu-arm64` supplies the memory/bus/emulator-loop implementation that
//! actually backs this trait.

pub mod bits;
pub mod bus;
pub mod decoder;
pub mod execute;
pub mod flags;
pub mod registers;

pub use bus::Arm64Bus;
pub use decoder::decode_and_execute;
pub use registers::Registers;
