//! The system bus: address-routed dispatch between main memory and
//! memory-mapped devices.
//!
//! Mirrors the cyclic-reference note in the design docs: rather than the
//! bus and memory holding references back into each other, the bus owns
//! memory outright and devices are boxed trait objects it also owns, the
//! same shape `machine-c64`'s `Memory` uses for its own mapped chips.

use emu_core::{Device, EmulatorError};

use cpu_arm64::Arm64Bus;

use crate::memory::Memory;

struct MappedDevice {
    base: u64,
    device: Box<dyn Device>,
}

impl MappedDevice {
    fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.base + self.device.size()
    }
}

/// Routes memory accesses either to a registered device or, failing that,
/// to main memory.
pub struct Bus {
    memory: Option<Memory>,
    devices: Vec<MappedDevice>,
}

impl Bus {
    /// A bus backed by `memory`.
    #[must_use]
    pub fn new(memory: Memory) -> Self {
        Self {
            memory: Some(memory),
            devices: Vec::new(),
        }
    }

    /// A bus with no memory attached. Any access that does not land on a
    /// registered device raises [`EmulatorError::DeviceError`].
    #[must_use]
    pub fn without_memory() -> Self {
        Self {
            memory: None,
            devices: Vec::new(),
        }
    }

    /// Shared access to the backing memory, if any.
    #[must_use]
    pub fn memory(&self) -> Option<&Memory> {
        self.memory.as_ref()
    }

    /// Mutable access to the backing memory, if any.
    pub fn memory_mut(&mut self) -> Option<&mut Memory> {
        self.memory.as_mut()
    }

    /// Register `device` at `base`. Lookups scan devices in registration
    /// order; an address belongs to the first device whose range contains
    /// it.
    pub fn register_device(&mut self, base: u64, device: Box<dyn Device>) {
        self.devices.push(MappedDevice { base, device });
    }

    fn find_device(&mut self, addr: u64) -> Option<&mut MappedDevice> {
        self.devices.iter_mut().find(|d| d.contains(addr))
    }

    fn require_memory(&self) -> Result<&Memory, EmulatorError> {
        self.memory.as_ref().ok_or_else(|| EmulatorError::DeviceError {
            message: "bus has no memory attached".to_string(),
        })
    }

    fn require_memory_mut(&mut self) -> Result<&mut Memory, EmulatorError> {
        self.memory.as_mut().ok_or_else(|| EmulatorError::DeviceError {
            message: "bus has no memory attached".to_string(),
        })
    }

    fn read_byte(&mut self, addr: u64) -> Result<u8, EmulatorError> {
        if let Some(dev) = self.find_device(addr) {
            let offset = addr - dev.base;
            return Ok(dev.device.read(offset));
        }
        let mem = self.require_memory()?;
        Ok(mem.read(addr, 1)? as u8)
    }

    fn write_byte(&mut self, addr: u64, value: u8) -> Result<(), EmulatorError> {
        if let Some(dev) = self.find_device(addr) {
            let offset = addr - dev.base;
            dev.device.write(offset, value);
            return Ok(());
        }
        self.require_memory_mut()?.write(addr, u64::from(value), 1)
    }
}

impl Arm64Bus for Bus {
    fn read(&mut self, addr: u64, size: u8) -> Result<u64, EmulatorError> {
        let mut buf = [0u8; 8];
        for (i, slot) in buf[..size as usize].iter_mut().enumerate() {
            *slot = self.read_byte(addr + i as u64)?;
        }
        Ok(u64::from_le_bytes(buf))
    }

    fn write(&mut self, addr: u64, value: u64, size: u8) -> Result<(), EmulatorError> {
        let bytes = value.to_le_bytes();
        for (i, byte) in bytes[..size as usize].iter().enumerate() {
            self.write_byte(addr + i as u64, *byte)?;
        }
        Ok(())
    }

    fn read_instruction(&mut self, addr: u64) -> Result<u32, EmulatorError> {
        self.require_memory()?.read_instruction(addr)
    }

    fn read_bytes(&mut self, addr: u64, buf: &mut [u8]) -> Result<(), EmulatorError> {
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte(addr + i as u64)?;
        }
        Ok(())
    }

    fn write_bytes(&mut self, addr: u64, buf: &[u8]) -> Result<(), EmulatorError> {
        for (i, byte) in buf.iter().enumerate() {
            self.write_byte(addr + i as u64, *byte)?;
        }
        Ok(())
    }

    fn is_instruction_address_valid(&self, addr: u64) -> bool {
        match &self.memory {
            Some(mem) => addr % 4 == 0 && addr.checked_add(4).is_some_and(|end| end <= mem.len()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        value: u8,
    }

    impl Device for Counter {
        fn size(&self) -> u64 {
            4
        }
        fn read(&mut self, _offset: u64) -> u8 {
            self.value
        }
        fn write(&mut self, _offset: u64, value: u8) {
            self.value = value;
        }
    }

    #[test]
    fn device_access_takes_precedence_over_memory() {
        let mut bus = Bus::new(Memory::new(64));
        bus.register_device(0x20, Box::new(Counter { value: 7 }));
        assert_eq!(bus.read(0x20, 1).unwrap(), 7);
        bus.write(0x21, 9, 1).unwrap();
        assert_eq!(bus.read(0x22, 1).unwrap(), 9); // same device, same counter value
    }

    #[test]
    fn falls_through_to_memory_outside_device_range() {
        let mut bus = Bus::new(Memory::new(64));
        bus.register_device(0x20, Box::new(Counter { value: 7 }));
        bus.write(0x0, 0x42, 1).unwrap();
        assert_eq!(bus.read(0x0, 1).unwrap(), 0x42);
    }

    #[test]
    fn missing_memory_is_a_device_error() {
        let mut bus = Bus::without_memory();
        assert!(matches!(bus.read(0, 1), Err(EmulatorError::DeviceError { .. })));
    }
}
