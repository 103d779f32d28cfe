//! CPU status register (`P`) flags.
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! │  │  │  │  │  │  │  └─ Carry
//! │  │  │  │  │  │  └──── Zero
//! │  │  │  │  │  └─────── Interrupt disable
//! │  │  │  │  └────────── Decimal mode (present but unused on the NES 6502)
//! │  │  │  └───────────── Break (1 when pushed by PHP/BRK, 0 from IRQ/NMI)
//! │  │  └──────────────── Unused, always 1 once pushed
//! │  └─────────────────── Overflow
//! └────────────────────── Negative
//! ```

use bitflags::bitflags;

bitflags! {
    /// CPU status register flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable.
        const I = 1 << 2;
        /// Decimal mode (unused for arithmetic on this target).
        const D = 1 << 3;
        /// Break.
        const B = 1 << 4;
        /// Unused, always 1 on the stack.
        const U = 1 << 5;
        /// Overflow.
        const V = 1 << 6;
        /// Negative.
        const N = 1 << 7;
    }
}

impl Status {
    /// Flags immediately after reset: `U` and `I` set.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Mask of flags that `PLP`/`RTI` restore from the stack byte.
    pub const PLP_MASK: Self = Self::C
        .union(Self::Z)
        .union(Self::I)
        .union(Self::D)
        .union(Self::V)
        .union(Self::N);

    /// Creates the power-on default (`U|I`).
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Sets `Z` and `N` from `value`.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set_flag(Self::Z, value == 0);
        self.set_flag(Self::N, value & 0x80 != 0);
    }

    /// Sets or clears a single flag.
    #[inline]
    pub fn set_flag(&mut self, flag: Self, value: bool) {
        if value {
            *self |= flag;
        } else {
            *self &= !flag;
        }
    }

    /// Byte pushed to the stack; `U` is always set, `B` only when `brk` is true.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, brk: bool) -> u8 {
        let mut value = self.bits() | Self::U.bits();
        if brk {
            value |= Self::B.bits();
        }
        value
    }

    /// Reconstructs a `Status` pulled from the stack: `B` discarded, `U` forced set.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_status() {
        let status = Status::new();
        assert!(status.contains(Status::I));
        assert!(status.contains(Status::U));
        assert!(!status.contains(Status::C));
    }

    #[test]
    fn set_zn_zero() {
        let mut status = Status::empty();
        status.set_zn(0);
        assert!(status.contains(Status::Z));
        assert!(!status.contains(Status::N));
    }

    #[test]
    fn set_zn_negative() {
        let mut status = Status::empty();
        status.set_zn(0x80);
        assert!(!status.contains(Status::Z));
        assert!(status.contains(Status::N));
    }

    #[test]
    fn to_stack_byte_with_and_without_brk() {
        let status = Status::C | Status::Z;
        assert_eq!(status.to_stack_byte(true) & Status::B.bits(), Status::B.bits());
        assert_eq!(status.to_stack_byte(false) & Status::B.bits(), 0);
    }

    #[test]
    fn from_stack_byte_clears_b_sets_u() {
        let status = Status::from_stack_byte(0xFF);
        assert!(!status.contains(Status::B));
        assert!(status.contains(Status::U));
        assert!(status.contains(Status::N));
    }
}
