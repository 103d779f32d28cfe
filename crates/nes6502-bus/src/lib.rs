//! NES CPU memory map and a small machine driver tying the core CPU to a
//! loaded cartridge.
//!
//! [`MemoryMap`] implements `nes6502_cpu::BusPort` by composing a cartridge
//! first, then 2 KiB of mirrored work RAM, then a no-op PPU register stub
//! (no PPU/APU timing is modelled; out of scope). [`Machine`] owns a `Cpu`
//! and a `MemoryMap` together and exposes a simple instruction-stepping run
//! loop for the CLI front-end.

#![warn(missing_docs)]

mod machine;
mod memory_map;

pub use machine::Machine;
pub use memory_map::MemoryMap;
