//! iNES cartridge loading and the cartridge-first bus dispatch.

use std::fs;
use std::path::Path;

use crate::mapper::{Mapper, Mapper000};
use crate::mirroring::Mirroring;

const HEADER_LEN: usize = 16;
const MAGIC: [u8; 4] = *b"NES\x1A";
const TRAINER_LEN: usize = 512;
const PRG_BANK_LEN: usize = 16 * 1024;
const CHR_BANK_LEN: usize = 8 * 1024;

/// Errors that can occur while loading an iNES image.
#[derive(Debug, thiserror::Error)]
pub enum CartridgeError {
    /// The file is shorter than a 16-byte header.
    #[error("cartridge file too small: expected at least {HEADER_LEN} bytes, got {0}")]
    FileTooSmall(usize),
    /// The `NES\x1A` magic number is missing.
    #[error("invalid iNES magic number: expected {MAGIC:02X?}, got {0:02X?}")]
    InvalidMagic([u8; 4]),
    /// The file is shorter than the header's declared PRG-ROM size.
    #[error("PRG-ROM size mismatch: header declares {expected} bytes, file has {actual} remaining")]
    PrgSizeMismatch {
        /// Bytes the header says should be present.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },
    /// The file is shorter than the header's declared CHR-ROM size.
    #[error("CHR-ROM size mismatch: header declares {expected} bytes, file has {actual} remaining")]
    ChrSizeMismatch {
        /// Bytes the header says should be present.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },
    /// The header names a mapper this crate does not implement.
    #[error("unsupported mapper: {0}")]
    UnsupportedMapper(u8),
    /// Reading the cartridge file from disk failed.
    #[error("failed to read cartridge file: {0}")]
    Io(#[from] std::io::Error),
}

/// A loaded iNES cartridge: PRG/CHR storage, mirroring, and a mapper that
/// translates CPU/PPU addresses into offsets into that storage.
///
/// The cartridge is immutable after construction except for CHR-RAM writes
/// (mapper 0 has no PRG-RAM, so CPU-side writes are always absorbed).
#[derive(Debug, Clone)]
pub struct Cartridge {
    prg: Vec<u8>,
    chr: Vec<u8>,
    mapper: Mapper,
    mirroring: Mirroring,
}

impl Cartridge {
    /// Loads a cartridge from an iNES file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CartridgeError`] if the file cannot be read, is too short,
    /// carries the wrong magic number, declares sizes the file doesn't
    /// back, or names an unsupported mapper.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parses a cartridge from an in-memory iNES image.
    ///
    /// # Errors
    ///
    /// See [`Cartridge::load`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::FileTooSmall(data.len()));
        }

        let magic = [data[0], data[1], data[2], data[3]];
        if magic != MAGIC {
            return Err(CartridgeError::InvalidMagic(magic));
        }

        let prg_banks = data[4];
        let chr_banks = data[5];
        let flags6 = data[6];
        let flags7 = data[7];

        let has_trainer = flags6 & 0x04 != 0;
        let four_screen = flags6 & 0x08 != 0;
        let mirroring = if four_screen || flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let mapper_id = (flags7 & 0xF0) | (flags6 >> 4);
        if mapper_id != 0 {
            return Err(CartridgeError::UnsupportedMapper(mapper_id));
        }

        let mut offset = HEADER_LEN;
        if has_trainer {
            offset += TRAINER_LEN;
        }

        let prg_len = usize::from(prg_banks) * PRG_BANK_LEN;
        let prg_end = offset + prg_len;
        if data.len() < prg_end {
            return Err(CartridgeError::PrgSizeMismatch {
                expected: prg_len,
                actual: data.len().saturating_sub(offset),
            });
        }
        let prg = data[offset..prg_end].to_vec();
        offset = prg_end;

        let chr_len = usize::from(chr_banks) * CHR_BANK_LEN;
        let chr_end = offset + chr_len;
        let chr = if chr_banks == 0 {
            vec![0; CHR_BANK_LEN]
        } else {
            if data.len() < chr_end {
                return Err(CartridgeError::ChrSizeMismatch {
                    expected: chr_len,
                    actual: data.len().saturating_sub(offset),
                });
            }
            data[offset..chr_end].to_vec()
        };

        Ok(Self {
            prg,
            chr,
            mapper: Mapper::Mapper000(Mapper000::new(prg_banks, chr_banks)),
            mirroring,
        })
    }

    /// The cartridge's nametable mirroring mode.
    #[must_use]
    pub const fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// Attempts a CPU-side read. Returns `(handled, data)`; `handled` is
    /// `false` for addresses the cartridge does not claim.
    #[must_use]
    pub fn cpu_read(&self, addr: u16) -> (bool, u8) {
        match self.mapper.cpu_map_read(addr) {
            Some(offset) => (true, self.prg[offset as usize % self.prg.len().max(1)]),
            None => (false, 0),
        }
    }

    /// Attempts a CPU-side write. Mapper 0 always absorbs this silently
    /// (read-only PRG-ROM, no PRG-RAM), but still reports `handled = true`
    /// for addresses within cartridge space so the bus does not fall
    /// through to RAM.
    pub fn cpu_write(&mut self, addr: u16, _value: u8) -> bool {
        (0x8000..=0xFFFF).contains(&addr)
    }

    /// Attempts a PPU-side read of CHR data.
    #[must_use]
    pub fn ppu_read(&self, addr: u16) -> (bool, u8) {
        match self.mapper.ppu_map_read(addr) {
            Some(offset) => (true, self.chr[offset as usize]),
            None => (false, 0),
        }
    }

    /// Attempts a PPU-side write. Only succeeds in CHR-RAM mode.
    pub fn ppu_write(&mut self, addr: u16, value: u8) -> (bool, u8) {
        match self.mapper.ppu_map_write(addr) {
            Some(offset) => {
                self.chr[offset as usize] = value;
                (true, value)
            }
            None => (false, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_ines(prg_banks: u8, chr_banks: u8, mirror_bit: u8, trainer: bool) -> Vec<u8> {
        let mut data = MAGIC.to_vec();
        data.push(prg_banks);
        data.push(chr_banks);
        let mut flags6 = mirror_bit;
        if trainer {
            flags6 |= 0x04;
        }
        data.push(flags6);
        data.push(0); // flags7: mapper high nibble 0
        data.extend_from_slice(&[0; 8]);
        if trainer {
            data.extend_from_slice(&[0xEE; TRAINER_LEN]);
        }
        data.extend_from_slice(&vec![0x11; usize::from(prg_banks) * PRG_BANK_LEN]);
        data.extend_from_slice(&vec![0x22; usize::from(chr_banks) * CHR_BANK_LEN]);
        data
    }

    #[test]
    fn rejects_too_small_file() {
        let result = Cartridge::from_bytes(&[0x4E, 0x45, 0x53]);
        assert!(matches!(result, Err(CartridgeError::FileTooSmall(3))));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = build_ines(1, 1, 0, false);
        data[0] = 0x00;
        assert!(matches!(
            Cartridge::from_bytes(&data),
            Err(CartridgeError::InvalidMagic(_))
        ));
    }

    #[test]
    fn rejects_unsupported_mapper() {
        let mut data = build_ines(1, 1, 0, false);
        data[6] |= 0x10; // mapper low nibble 1
        assert!(matches!(
            Cartridge::from_bytes(&data),
            Err(CartridgeError::UnsupportedMapper(1))
        ));
    }

    #[test]
    fn loads_nrom_128_and_mirrors_prg_reads() {
        let data = build_ines(1, 1, 0, false);
        let cart = Cartridge::from_bytes(&data).unwrap();
        assert_eq!(cart.mirroring(), Mirroring::Horizontal);
        let (ok, value) = cart.cpu_read(0x8000);
        assert!(ok);
        assert_eq!(value, 0x11);
        assert_eq!(cart.cpu_read(0xC000), (true, 0x11));
    }

    #[test]
    fn skips_trainer_before_prg() {
        let data = build_ines(1, 1, 0, true);
        let cart = Cartridge::from_bytes(&data).unwrap();
        assert_eq!(cart.cpu_read(0x8000), (true, 0x11));
    }

    #[test]
    fn chr_rom_writes_are_rejected() {
        let data = build_ines(1, 1, 0, false);
        let mut cart = Cartridge::from_bytes(&data).unwrap();
        let (ok, _) = cart.ppu_write(0x0000, 0xAA);
        assert!(!ok);
    }

    #[test]
    fn chr_ram_writes_round_trip() {
        let data = build_ines(1, 0, 0, false);
        let mut cart = Cartridge::from_bytes(&data).unwrap();
        let (ok, _) = cart.ppu_write(0x0001, 0xAA);
        assert!(ok);
        assert_eq!(cart.ppu_read(0x0001), (true, 0xAA));
    }

    #[test]
    fn cpu_write_is_absorbed_but_reported_handled() {
        let data = build_ines(1, 1, 0, false);
        let mut cart = Cartridge::from_bytes(&data).unwrap();
        assert!(cart.cpu_write(0x8000, 0x99));
        assert_eq!(cart.cpu_read(0x8000), (true, 0x11));
    }

    #[test]
    fn vertical_mirroring_bit_is_read_from_header() {
        let data = build_ines(1, 1, 0x01, false);
        let cart = Cartridge::from_bytes(&data).unwrap();
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
    }
}
