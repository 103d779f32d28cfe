//! Owns a CPU and memory map together and exposes a simple run loop.

use nes6502_cartridge::{Cartridge, CartridgeError};
use nes6502_cpu::{Cpu, TraceFormatter};

use crate::memory_map::MemoryMap;

/// A minimal NES host: a [`Cpu`] wired to a [`MemoryMap`].
///
/// There is no PPU/APU timing here (out of scope, §1 of the governing
/// design doc); `step_instruction` just drives the CPU's micro-op queue to
/// completion, one `clock()` per bus cycle, matching the one-clock-per-cycle
/// contract the core crate specifies.
pub struct Machine {
    cpu: Cpu,
    bus: MemoryMap,
}

impl Machine {
    /// Loads a cartridge from disk and builds a machine around it, powering
    /// on and resetting the CPU.
    ///
    /// # Errors
    ///
    /// Returns [`CartridgeError`] if the cartridge cannot be loaded.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, CartridgeError> {
        let cartridge = Cartridge::load(path)?;
        Ok(Self::new(cartridge))
    }

    /// Builds a machine over an already-loaded cartridge and resets the CPU.
    #[must_use]
    pub fn new(cartridge: Cartridge) -> Self {
        let mut cpu = Cpu::new();
        let mut bus = MemoryMap::new(cartridge);
        cpu.reset(&mut bus);
        Self { cpu, bus }
    }

    /// Runs the CPU forward until its micro-op queue drains (i.e. until the
    /// instruction boundary after the one this call started at), or until
    /// the CPU is jammed, whichever comes first.
    ///
    /// Returns `false` once the CPU is jammed and can make no further
    /// progress.
    pub fn step_instruction(&mut self) -> bool {
        if self.cpu.is_jammed() {
            return false;
        }
        loop {
            let boundary = self.cpu.clock(&mut self.bus);
            if self.cpu.is_jammed() {
                return false;
            }
            if boundary {
                return true;
            }
        }
    }

    /// Builds a machine whose RAM is pre-loaded with a raw binary image at
    /// `load_addr`, with the program counter forced to that same address.
    ///
    /// Some classic 6502 conformance binaries (Bruce Clark's cycle-timing
    /// test is the one this crate's tests exercise) ship as plain machine
    /// code meant to be dropped directly into memory at a fixed address,
    /// not as an iNES-wrapped cartridge with its own mapper and reset
    /// vector. This builds an otherwise-blank machine (no cartridge claims
    /// any address) so the whole 16-bit space behaves as RAM through the
    /// ordinary mirrored-RAM path.
    #[must_use]
    pub fn from_raw_binary(bytes: &[u8], load_addr: u16) -> Self {
        let blank = Cartridge::from_bytes(&Self::blank_ines_image())
            .expect("blank iNES image is well-formed");
        let mut machine = Self::new(blank);
        machine.bus.load_ram(load_addr, bytes);
        machine.force_pc(load_addr);
        machine
    }

    fn blank_ines_image() -> Vec<u8> {
        let mut data = b"NES\x1A".to_vec();
        data.push(1); // 1 PRG bank; never addressed when loading a raw image
        data.push(1);
        data.extend_from_slice(&[0; 10]);
        data.extend_from_slice(&[0u8; 16 * 1024]);
        data.extend_from_slice(&[0u8; 8 * 1024]);
        data
    }

    /// Forces the program counter to `pc`, bypassing whatever the cartridge's
    /// reset vector pointed at.
    ///
    /// Reference automation-mode traces (nestest's `$C000` entry point being
    /// the canonical example) start execution at a fixed address rather than
    /// the cartridge's actual GUI-interactive entry point; call this after
    /// [`Machine::new`]/[`Machine::from_path`] and before driving the machine.
    pub const fn force_pc(&mut self, pc: u16) {
        self.cpu.set_pc(pc);
    }

    /// Renders the nestest-format trace line for the instruction about to
    /// execute. Must be called before the `step_instruction` that runs it.
    #[must_use]
    pub fn trace_line(&mut self) -> String {
        TraceFormatter::new().format(&self.cpu, &mut self.bus)
    }

    /// Read-only access to the CPU, for inspection/testing.
    #[must_use]
    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Read-only access to the memory map, for inspection/testing.
    #[must_use]
    pub const fn bus(&self) -> &MemoryMap {
        &self.bus
    }
}
