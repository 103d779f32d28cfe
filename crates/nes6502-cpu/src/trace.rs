//! Renders CPU state in the `nestest.log` / `timingtest.log` reference
//! trace format, used to validate instruction and cycle correctness.
//!
//! Format: `PPPP  OP AA BB  MNEMONIC ...   A:AA X:XX Y:YY P:PP SP:SS PPU:SSS,DDD CYC:NNNNN`
//! Unofficial opcodes get a `*` prefix on the mnemonic field, which steals
//! one column from the raw-bytes field so everything stays aligned.

use crate::addressing::AddrMode;
use crate::bus::BusPort;
use crate::cpu::Cpu;
use crate::opcodes::decode;
use std::fmt::Write as _;

/// Formats [`Cpu`] state as one `nestest.log`-compatible trace line.
///
/// Call [`TraceFormatter::format`] *before* calling [`Cpu::clock`] for the
/// instruction at the current `PC` — the log records state at the start of
/// each instruction, including the cycle count accumulated so far, so the
/// formatter does its own read-only fetch/decode rather than reusing the
/// CPU's internal (post-fetch) latches.
#[derive(Debug, Default)]
pub struct TraceFormatter;

impl TraceFormatter {
    /// Creates a formatter. Stateless; exists for symmetry with other
    /// ambient-stack types and to leave room for future trace filtering.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders one trace line for the instruction about to run at `cpu.pc()`.
    /// The crate has no PPU, so the `PPU:` field is always `0,0`; a caller
    /// that wires one up externally may postprocess the line if it needs
    /// real dot/scanline values.
    #[must_use]
    pub fn format(&self, cpu: &Cpu, bus: &mut dyn BusPort) -> String {
        let pc = cpu.pc();
        let opcode = bus.peek(pc);
        let info = decode(opcode);

        let mut bytes_str = String::new();
        let _ = write!(bytes_str, "{opcode:02X}");
        match info.mode.operand_bytes() {
            1 => {
                let _ = write!(bytes_str, " {:02X}", bus.peek(pc.wrapping_add(1)));
            }
            2 => {
                let _ = write!(
                    bytes_str,
                    " {:02X} {:02X}",
                    bus.peek(pc.wrapping_add(1)),
                    bus.peek(pc.wrapping_add(2))
                );
            }
            _ => {}
        }

        let disasm = Self::disassemble(cpu, bus, pc, info);
        let illegal = disasm.starts_with('*');
        let bytes_width = if illegal { 9 } else { 10 };
        let disasm_width = if illegal { 33 } else { 32 };

        format!(
            "{pc:04X}  {:<bw$}{:<dw$}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} PPU:  0,  0 CYC:{}",
            bytes_str,
            disasm,
            cpu.a(),
            cpu.x(),
            cpu.y(),
            cpu.p(),
            cpu.sp(),
            cpu.cycles(),
            bw = bytes_width,
            dw = disasm_width,
        )
    }

    #[allow(clippy::too_many_lines)]
    fn disassemble(cpu: &Cpu, bus: &mut dyn BusPort, pc: u16, info: crate::opcodes::OpcodeInfo) -> String {
        let mnemonic = info.mnemonic;
        let prefix = if info.illegal { "*" } else { "" };

        match info.mode {
            AddrMode::Imp => format!("{prefix}{mnemonic}"),
            AddrMode::Acc => format!("{prefix}{mnemonic} A"),
            AddrMode::Imm => {
                let value = bus.peek(pc.wrapping_add(1));
                format!("{prefix}{mnemonic} #${value:02X}")
            }
            AddrMode::Zpi => {
                let addr = bus.peek(pc.wrapping_add(1));
                let value = bus.peek(u16::from(addr));
                format!("{prefix}{mnemonic} ${addr:02X} = {value:02X}")
            }
            AddrMode::Zpx => {
                let base = bus.peek(pc.wrapping_add(1));
                let addr = base.wrapping_add(cpu.x());
                let value = bus.peek(u16::from(addr));
                format!("{prefix}{mnemonic} ${base:02X},X @ {addr:02X} = {value:02X}")
            }
            AddrMode::Zpy => {
                let base = bus.peek(pc.wrapping_add(1));
                let addr = base.wrapping_add(cpu.y());
                let value = bus.peek(u16::from(addr));
                format!("{prefix}{mnemonic} ${base:02X},Y @ {addr:02X} = {value:02X}")
            }
            AddrMode::Abs => {
                let lo = bus.peek(pc.wrapping_add(1));
                let hi = bus.peek(pc.wrapping_add(2));
                let addr = u16::from_le_bytes([lo, hi]);
                if mnemonic == "JMP" || mnemonic == "JSR" {
                    format!("{prefix}{mnemonic} ${addr:04X}")
                } else {
                    let value = bus.peek(addr);
                    format!("{prefix}{mnemonic} ${addr:04X} = {value:02X}")
                }
            }
            AddrMode::Abx => {
                let lo = bus.peek(pc.wrapping_add(1));
                let hi = bus.peek(pc.wrapping_add(2));
                let base = u16::from_le_bytes([lo, hi]);
                let addr = base.wrapping_add(u16::from(cpu.x()));
                let value = bus.peek(addr);
                format!("{prefix}{mnemonic} ${base:04X},X @ {addr:04X} = {value:02X}")
            }
            AddrMode::Aby => {
                let lo = bus.peek(pc.wrapping_add(1));
                let hi = bus.peek(pc.wrapping_add(2));
                let base = u16::from_le_bytes([lo, hi]);
                let addr = base.wrapping_add(u16::from(cpu.y()));
                let value = bus.peek(addr);
                format!("{prefix}{mnemonic} ${base:04X},Y @ {addr:04X} = {value:02X}")
            }
            AddrMode::Ind => {
                let lo = bus.peek(pc.wrapping_add(1));
                let hi = bus.peek(pc.wrapping_add(2));
                let ptr = u16::from_le_bytes([lo, hi]);
                let target = bus.read_u16_wrapped(ptr);
                format!("{prefix}{mnemonic} (${ptr:04X}) = {target:04X}")
            }
            AddrMode::Iix => {
                let base = bus.peek(pc.wrapping_add(1));
                let ptr = base.wrapping_add(cpu.x());
                let lo = bus.peek(u16::from(ptr));
                let hi = bus.peek(u16::from(ptr.wrapping_add(1)));
                let addr = u16::from_le_bytes([lo, hi]);
                let value = bus.peek(addr);
                format!("{prefix}{mnemonic} (${base:02X},X) @ {ptr:02X} = {addr:04X} = {value:02X}")
            }
            AddrMode::Iiy => {
                let ptr = bus.peek(pc.wrapping_add(1));
                let lo = bus.peek(u16::from(ptr));
                let hi = bus.peek(u16::from(ptr.wrapping_add(1)));
                let base = u16::from_le_bytes([lo, hi]);
                let addr = base.wrapping_add(u16::from(cpu.y()));
                let value = bus.peek(addr);
                format!("{prefix}{mnemonic} (${ptr:02X}),Y = {base:04X} @ {addr:04X} = {value:02X}")
            }
            AddrMode::Rel => {
                let offset = bus.peek(pc.wrapping_add(1)) as i8;
                let target = pc.wrapping_add(2).wrapping_add_signed(i16::from(offset));
                format!("{prefix}{mnemonic} ${target:04X}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::AccessMode;

    struct TestBus {
        memory: Vec<u8>,
    }

    impl TestBus {
        fn new() -> Self {
            Self { memory: vec![0; 0x10000] }
        }
    }

    impl BusPort for TestBus {
        fn access(&mut self, addr: u16, mode: AccessMode, data: &mut u8) {
            match mode {
                AccessMode::Write => self.memory[addr as usize] = *data,
                _ => *data = self.memory[addr as usize],
            }
        }
    }

    fn stepped_cpu(bus: &mut TestBus) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.reset(bus);
        cpu
    }

    #[test]
    fn formats_lda_immediate() {
        let mut bus = TestBus::new();
        bus.memory[0xFFFC] = 0x00;
        bus.memory[0xFFFD] = 0xC0;
        bus.memory[0xC000] = 0xA9;
        bus.memory[0xC001] = 0x42;
        let cpu = stepped_cpu(&mut bus);
        let formatter = TraceFormatter::new();
        let line = formatter.format(&cpu, &mut bus);
        assert!(line.starts_with("C000"));
        assert!(line.contains("A9 42"));
        assert!(line.contains("LDA #$42"));
        assert!(line.contains("SP:FD"));
        assert!(line.contains("CYC:7"));
    }

    #[test]
    fn formats_jmp_absolute() {
        let mut bus = TestBus::new();
        bus.memory[0xFFFC] = 0x00;
        bus.memory[0xFFFD] = 0xC0;
        bus.memory[0xC000] = 0x4C;
        bus.memory[0xC001] = 0xF5;
        bus.memory[0xC002] = 0xC5;
        let cpu = stepped_cpu(&mut bus);
        let formatter = TraceFormatter::new();
        let line = formatter.format(&cpu, &mut bus);
        assert!(line.contains("4C F5 C5"));
        assert!(line.contains("JMP $C5F5"));
    }

    #[test]
    fn illegal_opcode_gets_star_prefix_and_narrower_bytes_field() {
        let mut bus = TestBus::new();
        bus.memory[0xFFFC] = 0x00;
        bus.memory[0xFFFD] = 0xC0;
        bus.memory[0xC000] = 0xA7; // LAX zp, illegal
        bus.memory[0xC001] = 0x10;
        let cpu = stepped_cpu(&mut bus);
        let formatter = TraceFormatter::new();
        let line = formatter.format(&cpu, &mut bus);
        assert!(line.contains("*LAX"));
    }
}
