//! The emulator's error taxonomy.
//!
//! One enum covers every fallible boundary in the core: memory, the bus,
//! the decoder, and the execute units. No `thiserror`/`anyhow` dependency —
//! `Display` and `std::error::Error` are implemented by hand, matching how
//! the rest of this workspace reports errors.

use std::fmt;

/// Every way a run can fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmulatorError {
    /// An access, instruction fetch, or write landed outside the backing
    /// array, crossed its end, or targeted a read-only region.
    MemoryOutOfBounds {
        /// The address that faulted.
        address: u64,
    },
    /// PC was unaligned or out of range at fetch time.
    ProgramCounterOutOfBounds {
        /// The offending PC value.
        address: u64,
    },
    /// The top byte of the instruction word matched no known family.
    UnsupportedInstruction {
        /// `instr[31:24]`.
        top_byte: u8,
    },
    /// A family matched but its sub-fields were not a recognized encoding.
    UnsupportedInstructionFormat {
        /// The full 32-bit instruction word.
        word: u32,
        /// `instr[31:24]`.
        top_byte: u8,
        /// Human-readable detail for diagnostics.
        detail: String,
    },
    /// The bus has no memory backing, a device rejected an access, or the
    /// instruction-count safety bound tripped.
    DeviceError {
        /// Human-readable detail for diagnostics.
        message: String,
    },
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MemoryOutOfBounds { address } => {
                write!(f, "memory access out of bounds at address {address:#x}")
            }
            Self::ProgramCounterOutOfBounds { address } => {
                write!(f, "program counter out of bounds at {address:#x}")
            }
            Self::UnsupportedInstruction { top_byte } => {
                write!(f, "unsupported instruction (top byte {top_byte:#04x})")
            }
            Self::UnsupportedInstructionFormat {
                word,
                top_byte,
                detail,
            } => {
                write!(
                    f,
                    "unsupported instruction format: word {word:#010x} (top byte {top_byte:#04x}): {detail}"
                )
            }
            Self::DeviceError { message } => write!(f, "device error: {message}"),
        }
    }
}

impl std::error::Error for EmulatorError {}
