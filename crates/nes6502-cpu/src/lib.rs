//! Cycle-accurate MOS 6502 CPU core for the NES family.
//!
//! The [`Cpu`] is driven one bus cycle at a time via [`Cpu::clock`]; all
//! memory traffic flows through a single [`BusPort`] implementation supplied
//! by the caller (see `nes6502-bus` for the NES memory map). [`trace`]
//! renders the CPU's state in the `nestest.log` line format used to validate
//! instruction and cycle correctness against a known-good reference trace.

#![warn(missing_docs)]

pub mod addressing;
pub mod bus;
mod cpu;
pub mod opcodes;
pub mod queue;
pub mod status;
pub mod trace;

pub use bus::{AccessMode, BusPort};
pub use cpu::Cpu;
pub use opcodes::{decode, Kind, Op, OpcodeInfo};
pub use queue::{MicroOp, MicrocodeQueue, QUEUE_CAPACITY};
pub use status::Status;
pub use trace::TraceFormatter;

/// Error taxonomy for conditions the CPU core can detect but does not treat
/// as fatal (it logs and continues so the emulator can still produce a
/// trace for whatever the reference log expects).
#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum CpuError {
    /// An unofficial opcode with unstable/unmodelled real-hardware behaviour
    /// was fetched. Executed as a no-op; logged once.
    #[error("unstable/unmodelled opcode 0x{opcode:02X} at PC=0x{pc:04X}")]
    UnknownOpcode {
        /// The opcode byte.
        opcode: u8,
        /// The program counter at which it was fetched.
        pc: u16,
    },
    /// A hardware lock-up (`JAM`/`KIL`) opcode was fetched; the CPU will not
    /// make further progress until reset.
    #[error("JAM opcode 0x{opcode:02X} at PC=0x{pc:04X}, CPU halted")]
    Jammed {
        /// The opcode byte.
        opcode: u8,
        /// The program counter at which it was fetched.
        pc: u16,
    },
}
