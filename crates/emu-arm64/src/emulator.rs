//! The top-level emulator facade: owns the register file and bus, and
//! runs the fetch-decode-execute loop.

use emu_core::{EmulatorError, Observable, Value};

use cpu_arm64::registers::Registers;
use cpu_arm64::{decode_and_execute, Arm64Bus};

use crate::bus::Bus;
use crate::memory::{Memory, DEFAULT_MEMORY_SIZE};

/// The architectural NOP word, also this system's program-end sentinel.
pub const NOP_WORD: u32 = 0xD503_201F;

/// Construction-time configuration. Replaces anything that "looks global"
/// (memory size, the runaway-execution safety bound, initial PSTATE/FPCR)
/// with a plain struct passed to [`Emulator::new`], the same way the
/// teacher's machine crates take a `Config` struct rather than reading
/// process-wide state.
#[derive(Debug, Clone, Copy)]
pub struct EmulatorConfig {
    /// Size in bytes of the backing RAM array.
    pub memory_size: u64,
    /// Ceiling on instructions executed per [`Emulator::run`] call, to
    /// prevent a nonterminating program from hanging the caller.
    pub max_instructions: u64,
    /// PSTATE (NZCV) the register file starts with.
    pub initial_pstate: u32,
    /// FPCR the register file starts with.
    pub initial_fpcr: u32,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            max_instructions: 1000,
            initial_pstate: 0,
            initial_fpcr: 0,
        }
    }
}

/// How [`Emulator::run`] ended. Only one controlled outcome exists: a NOP
/// fetch. Everything else — the instruction-count safety bound tripping
/// included — is an [`EmulatorError`] on the `Err` side (see the error
/// taxonomy's `DeviceError`), since a runaway program is a fault, not a
/// second kind of success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program fetched the architectural NOP word and terminated
    /// normally.
    Nop,
}

/// The ARM64 teaching emulator: register file, bus (memory + devices),
/// and the engine loop that ties them together.
pub struct Emulator {
    regs: Registers,
    bus: Bus,
    max_instructions: u64,
}

impl Emulator {
    /// Build a fresh emulator: register file and memory constructed per
    /// `config`, both living for the emulator's lifetime.
    #[must_use]
    pub fn new(config: EmulatorConfig) -> Self {
        let mut regs = Registers::new();
        regs.set_pstate(config.initial_pstate);
        regs.fpcr = config.initial_fpcr;
        Self {
            regs,
            bus: Bus::new(Memory::new(config.memory_size)),
            max_instructions: config.max_instructions,
        }
    }

    /// Shared access to the bus, for device registration and raw memory
    /// inspection.
    pub fn bus(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Shared access to the backing memory, if any is attached.
    #[must_use]
    pub fn memory(&self) -> &Memory {
        self.bus.memory().expect("Emulator::new always attaches memory")
    }

    /// Mutable access to the backing memory.
    pub fn memory_mut(&mut self) -> &mut Memory {
        self.bus.memory_mut().expect("Emulator::new always attaches memory")
    }

    /// Write `words` little-endian starting at `base_address` and set PC
    /// to `base_address`. Bypasses read-only enforcement the same way
    /// [`Memory::write_block`] does, since this is how ROM-marked regions
    /// get their initial contents before being marked read-only.
    pub fn load_program(&mut self, base_address: u64, words: &[u32]) -> Result<(), EmulatorError> {
        self.memory_mut().write_block(base_address, words)?;
        self.regs.pc = base_address;
        Ok(())
    }

    /// Read Xn (X0..X30). Index 31 (XZR) and any out-of-range index read
    /// as 0.
    #[must_use]
    pub fn get_register(&self, index: u8) -> u64 {
        self.regs.x(index)
    }

    /// Write Xn. A write to index 31 (XZR) or any out-of-range index is
    /// discarded.
    pub fn set_register(&mut self, index: u8, value: u64) {
        self.regs.set_x(index, value);
    }

    /// Read Vn's double-precision (Dn) view.
    #[must_use]
    pub fn get_float_register(&self, index: u8) -> f64 {
        self.regs.d(index)
    }

    /// Write Vn's double-precision (Dn) view; the upper 64 bits of Vn are
    /// left untouched.
    pub fn set_float_register(&mut self, index: u8, value: f64) {
        self.regs.set_d(index, value);
    }

    /// Read Vn's single-precision (Sn) view.
    #[must_use]
    pub fn get_float_register_single(&self, index: u8) -> f32 {
        self.regs.s(index)
    }

    /// Write Vn's single-precision (Sn) view; the upper 96 bits of Vn are
    /// left untouched.
    pub fn set_float_register_single(&mut self, index: u8, value: f32) {
        self.regs.set_s(index, value);
    }

    /// Current program counter.
    #[must_use]
    pub fn pc(&self) -> u64 {
        self.regs.pc
    }

    /// Run one fetch-decode-execute step. Unlike [`Emulator::run`], a NOP
    /// fetch does not terminate — it is treated as the literal
    /// architectural no-op and PC simply advances by 4, which is what
    /// makes this safe to use for single-stepping through a program that
    /// happens to contain a NOP mid-stream.
    pub fn execute_one(&mut self) -> Result<(), EmulatorError> {
        if self.step()? {
            self.regs.pc = self.regs.pc.wrapping_add(4);
        }
        Ok(())
    }

    /// Run until the program fetches NOP or a fault occurs.
    ///
    /// Returns `Ok(RunOutcome::Nop)` on normal termination. Any fault —
    /// including the instruction-count safety bound tripping — surfaces
    /// as `Err`; partial state from instructions executed before the
    /// fault remains observable on `self`.
    pub fn run(&mut self) -> Result<RunOutcome, EmulatorError> {
        let mut executed = 0u64;
        loop {
            if self.step()? {
                return Ok(RunOutcome::Nop);
            }
            executed += 1;
            if executed >= self.max_instructions {
                return Err(EmulatorError::DeviceError {
                    message: format!("runaway execution: exceeded {} instructions", self.max_instructions),
                });
            }
        }
    }

    /// Fetch, decode, and execute one instruction, advancing PC by 4 if
    /// the instruction did not change it. Returns `Ok(true)` if the
    /// fetched word was the NOP sentinel (in which case `regs.pc` is left
    /// untouched — callers decide whether that means "terminate" or
    /// "step past it").
    fn step(&mut self) -> Result<bool, EmulatorError> {
        let pc = self.regs.pc;
        if !self.bus.is_instruction_address_valid(pc) {
            return Err(EmulatorError::ProgramCounterOutOfBounds { address: pc });
        }
        let instr = self.bus.read_instruction(pc)?;
        if instr == 0 {
            return Err(EmulatorError::UnsupportedInstructionFormat {
                word: 0,
                top_byte: 0,
                detail: "instruction word is zero (jumped into zeroed memory)".to_string(),
            });
        }
        if instr == NOP_WORD {
            return Ok(true);
        }
        decode_and_execute(instr, pc, &mut self.regs, &mut self.bus)?;
        if self.regs.pc == pc {
            self.regs.pc = pc.wrapping_add(4);
        }
        Ok(false)
    }
}

impl Observable for Emulator {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix('x') {
            let index: u8 = rest.parse().ok()?;
            if index <= 31 {
                return Some(Value::U64(self.regs.x(index)));
            }
        }
        if let Some(rest) = path.strip_prefix('s') {
            let index: u8 = rest.parse().ok()?;
            if index <= 31 {
                return Some(Value::F32(self.regs.s(index)));
            }
        }
        if let Some(rest) = path.strip_prefix('d') {
            let index: u8 = rest.parse().ok()?;
            if index <= 31 {
                return Some(Value::F64(self.regs.d(index)));
            }
        }
        match path {
            "pc" => Some(Value::U64(self.regs.pc)),
            "pstate" => Some(Value::U32(self.regs.pstate())),
            "flags.n" => Some(Value::Bool(self.regs.n())),
            "flags.z" => Some(Value::Bool(self.regs.z())),
            "flags.c" => Some(Value::Bool(self.regs.c())),
            "flags.v" => Some(Value::Bool(self.regs.v())),
            "fpsr" => Some(Value::U32(self.regs.fpsr)),
            "fpcr" => Some(Value::U32(self.regs.fpcr)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "pstate", "flags.n", "flags.z", "flags.c", "flags.v", "fpsr", "fpcr",
            "x0 (and x1..x31)", "s0 (and s1..s31)", "d0 (and d1..d31)",
        ]
    }
}
