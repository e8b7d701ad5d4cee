//! The ARM64 teaching emulator's host: flat memory, the address-routed
//! bus, and the [`Emulator`] facade that drives the fetch-decode-execute
//! loop over the `cpu-arm64` decoder and execute units.
//!
//! The sample-program library and any CLI/UI that picks programs to run
//! are deliberately outside this crate's scope — it only consumes
//! already-encoded 32-bit instruction words.

mod bus;
mod emulator;
mod memory;

pub use bus::Bus;
pub use emulator::{Emulator, EmulatorConfig, RunOutcome, NOP_WORD};
pub use memory::{Memory, Region, DEFAULT_MEMORY_SIZE};

pub use cpu_arm64::Arm64Bus;
pub use emu_core::{Device, EmulatorError, Observable, Value};
