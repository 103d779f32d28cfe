//! iNES cartridge loading, nametable mirroring, and mapper address
//! translation for the NES family.
//!
//! [`Cartridge`] owns PRG/CHR storage and dispatches reads/writes through a
//! [`Mapper`]; `nes6502-bus`'s `MemoryMap` gives the cartridge first refusal
//! on every CPU address before falling through to work RAM or the PPU
//! register stub.

#![warn(missing_docs)]

mod cartridge;
mod mapper;
mod mirroring;

pub use cartridge::{Cartridge, CartridgeError};
pub use mapper::{Mapper, Mapper000};
pub use mirroring::Mirroring;
