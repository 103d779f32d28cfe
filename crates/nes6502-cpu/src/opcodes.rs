//! The 256-entry instruction table: the literal nestest-compatible mapping
//! from opcode byte to mnemonic, operation, addressing mode, access pattern
//! and base cycle count.

use crate::addressing::AddrMode;

/// Instruction identity — which operation a decoded opcode performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Op {
    Lda, Ldx, Ldy, Sta, Stx, Sty,
    Adc, Sbc, And, Ora, Eor, Cmp, Cpx, Cpy, Bit,
    Asl, Lsr, Rol, Ror, Inc, Dec,
    Inx, Iny, Dex, Dey,
    Tax, Tay, Txa, Tya, Tsx, Txs,
    Pha, Php, Pla, Plp,
    Jmp, Jsr, Rts, Rti, Brk,
    Bpl, Bmi, Bvc, Bvs, Bcc, Bcs, Bne, Beq,
    Clc, Sec, Cli, Sei, Clv, Cld, Sed,
    Nop,
    Lax, Sax, Dcp, Isc, Slo, Rla, Sre, Rra,
    Anc, Alr, Arr, Axs, Las,
}

/// How an instruction touches memory — drives both the page-crossing penalty
/// rule (§4.6) and which generic "finish" micro-op sequence the CPU enqueues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Reads a value (from memory or immediate) into a register or flag state.
    /// Page-crossing penalty applies conditionally.
    Read,
    /// Writes a register (or register combination) to memory. Always pays
    /// the indexed-addressing dummy-read cycle.
    Write,
    /// Read-modify-write. Always pays the dummy-read/dummy-write cycles.
    Rmw,
    /// No memory operand; acts on registers/flags directly.
    Implied,
    /// Shift/rotate acting on the accumulator.
    Accumulator,
    /// Conditional branch.
    Branch,
    /// `JMP` (absolute or indirect).
    Jump,
    /// `JSR`.
    JumpSub,
    /// `RTS`.
    ReturnSub,
    /// `RTI`.
    ReturnInt,
    /// `PHA`/`PHP`.
    Push,
    /// `PLA`/`PLP`.
    Pull,
    /// `BRK`.
    Break,
    /// A genuine hardware lock-up opcode.
    Jam,
    /// An unofficial opcode with unstable/unmodelled behaviour (e.g. `SHX`,
    /// `XAA`, `LXA`, `TAS`). Logged once and executed as a 2-cycle `NOP` so
    /// traces don't deadlock, per the `UnknownOpcode` error category.
    Unknown,
}

/// One decoded instruction-table entry.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    /// Canonical mnemonic, `*`-prefixed in trace output when `illegal` is true.
    pub mnemonic: &'static str,
    /// Which operation this opcode performs.
    pub op: Op,
    /// Addressing mode.
    pub mode: AddrMode,
    /// Access pattern, drives micro-op sequencing.
    pub kind: Kind,
    /// Total instruction cycle count, not counting page-crossing/branch penalties.
    pub cycles: u8,
    /// True for opcodes outside the official 56.
    pub illegal: bool,
}

const fn e(
    mnemonic: &'static str,
    op: Op,
    mode: AddrMode,
    kind: Kind,
    cycles: u8,
    illegal: bool,
) -> OpcodeInfo {
    OpcodeInfo { mnemonic, op, mode, kind, cycles, illegal }
}

use AddrMode::{Abs, Abx, Aby, Acc, Iix, Iiy, Imm, Imp, Ind, Rel, Zpi, Zpx, Zpy};
use Kind::{
    Accumulator, Branch, Break, Implied, Jam, Jump, JumpSub, Pull, Push, Read, ReturnInt,
    ReturnSub, Rmw, Unknown, Write,
};

/// Decodes one opcode byte into its instruction-table entry.
#[must_use]
#[rustfmt::skip]
pub const fn decode(opcode: u8) -> OpcodeInfo {
    match opcode {
        0x00 => e("BRK", Op::Brk, Imp, Break, 7, false),
        0x01 => e("ORA", Op::Ora, Iix, Read, 6, false),
        0x02 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0x03 => e("SLO", Op::Slo, Iix, Rmw, 8, true),
        0x04 => e("NOP", Op::Nop, Zpi, Read, 3, true),
        0x05 => e("ORA", Op::Ora, Zpi, Read, 3, false),
        0x06 => e("ASL", Op::Asl, Zpi, Rmw, 5, false),
        0x07 => e("SLO", Op::Slo, Zpi, Rmw, 5, true),
        0x08 => e("PHP", Op::Php, Imp, Push, 3, false),
        0x09 => e("ORA", Op::Ora, Imm, Read, 2, false),
        0x0A => e("ASL", Op::Asl, Acc, Accumulator, 2, false),
        0x0B => e("ANC", Op::Anc, Imm, Read, 2, true),
        0x0C => e("NOP", Op::Nop, Abs, Read, 4, true),
        0x0D => e("ORA", Op::Ora, Abs, Read, 4, false),
        0x0E => e("ASL", Op::Asl, Abs, Rmw, 6, false),
        0x0F => e("SLO", Op::Slo, Abs, Rmw, 6, true),

        0x10 => e("BPL", Op::Bpl, Rel, Branch, 2, false),
        0x11 => e("ORA", Op::Ora, Iiy, Read, 5, false),
        0x12 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0x13 => e("SLO", Op::Slo, Iiy, Rmw, 8, true),
        0x14 => e("NOP", Op::Nop, Zpx, Read, 4, true),
        0x15 => e("ORA", Op::Ora, Zpx, Read, 4, false),
        0x16 => e("ASL", Op::Asl, Zpx, Rmw, 6, false),
        0x17 => e("SLO", Op::Slo, Zpx, Rmw, 6, true),
        0x18 => e("CLC", Op::Clc, Imp, Implied, 2, false),
        0x19 => e("ORA", Op::Ora, Aby, Read, 4, false),
        0x1A => e("NOP", Op::Nop, Imp, Implied, 2, true),
        0x1B => e("SLO", Op::Slo, Aby, Rmw, 7, true),
        0x1C => e("NOP", Op::Nop, Abx, Read, 4, true),
        0x1D => e("ORA", Op::Ora, Abx, Read, 4, false),
        0x1E => e("ASL", Op::Asl, Abx, Rmw, 7, false),
        0x1F => e("SLO", Op::Slo, Abx, Rmw, 7, true),

        0x20 => e("JSR", Op::Jsr, Abs, JumpSub, 6, false),
        0x21 => e("AND", Op::And, Iix, Read, 6, false),
        0x22 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0x23 => e("RLA", Op::Rla, Iix, Rmw, 8, true),
        0x24 => e("BIT", Op::Bit, Zpi, Read, 3, false),
        0x25 => e("AND", Op::And, Zpi, Read, 3, false),
        0x26 => e("ROL", Op::Rol, Zpi, Rmw, 5, false),
        0x27 => e("RLA", Op::Rla, Zpi, Rmw, 5, true),
        0x28 => e("PLP", Op::Plp, Imp, Pull, 4, false),
        0x29 => e("AND", Op::And, Imm, Read, 2, false),
        0x2A => e("ROL", Op::Rol, Acc, Accumulator, 2, false),
        0x2B => e("ANC", Op::Anc, Imm, Read, 2, true),
        0x2C => e("BIT", Op::Bit, Abs, Read, 4, false),
        0x2D => e("AND", Op::And, Abs, Read, 4, false),
        0x2E => e("ROL", Op::Rol, Abs, Rmw, 6, false),
        0x2F => e("RLA", Op::Rla, Abs, Rmw, 6, true),

        0x30 => e("BMI", Op::Bmi, Rel, Branch, 2, false),
        0x31 => e("AND", Op::And, Iiy, Read, 5, false),
        0x32 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0x33 => e("RLA", Op::Rla, Iiy, Rmw, 8, true),
        0x34 => e("NOP", Op::Nop, Zpx, Read, 4, true),
        0x35 => e("AND", Op::And, Zpx, Read, 4, false),
        0x36 => e("ROL", Op::Rol, Zpx, Rmw, 6, false),
        0x37 => e("RLA", Op::Rla, Zpx, Rmw, 6, true),
        0x38 => e("SEC", Op::Sec, Imp, Implied, 2, false),
        0x39 => e("AND", Op::And, Aby, Read, 4, false),
        0x3A => e("NOP", Op::Nop, Imp, Implied, 2, true),
        0x3B => e("RLA", Op::Rla, Aby, Rmw, 7, true),
        0x3C => e("NOP", Op::Nop, Abx, Read, 4, true),
        0x3D => e("AND", Op::And, Abx, Read, 4, false),
        0x3E => e("ROL", Op::Rol, Abx, Rmw, 7, false),
        0x3F => e("RLA", Op::Rla, Abx, Rmw, 7, true),

        0x40 => e("RTI", Op::Rti, Imp, ReturnInt, 6, false),
        0x41 => e("EOR", Op::Eor, Iix, Read, 6, false),
        0x42 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0x43 => e("SRE", Op::Sre, Iix, Rmw, 8, true),
        0x44 => e("NOP", Op::Nop, Zpi, Read, 3, true),
        0x45 => e("EOR", Op::Eor, Zpi, Read, 3, false),
        0x46 => e("LSR", Op::Lsr, Zpi, Rmw, 5, false),
        0x47 => e("SRE", Op::Sre, Zpi, Rmw, 5, true),
        0x48 => e("PHA", Op::Pha, Imp, Push, 3, false),
        0x49 => e("EOR", Op::Eor, Imm, Read, 2, false),
        0x4A => e("LSR", Op::Lsr, Acc, Accumulator, 2, false),
        0x4B => e("ALR", Op::Alr, Imm, Read, 2, true),
        0x4C => e("JMP", Op::Jmp, Abs, Jump, 3, false),
        0x4D => e("EOR", Op::Eor, Abs, Read, 4, false),
        0x4E => e("LSR", Op::Lsr, Abs, Rmw, 6, false),
        0x4F => e("SRE", Op::Sre, Abs, Rmw, 6, true),

        0x50 => e("BVC", Op::Bvc, Rel, Branch, 2, false),
        0x51 => e("EOR", Op::Eor, Iiy, Read, 5, false),
        0x52 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0x53 => e("SRE", Op::Sre, Iiy, Rmw, 8, true),
        0x54 => e("NOP", Op::Nop, Zpx, Read, 4, true),
        0x55 => e("EOR", Op::Eor, Zpx, Read, 4, false),
        0x56 => e("LSR", Op::Lsr, Zpx, Rmw, 6, false),
        0x57 => e("SRE", Op::Sre, Zpx, Rmw, 6, true),
        0x58 => e("CLI", Op::Cli, Imp, Implied, 2, false),
        0x59 => e("EOR", Op::Eor, Aby, Read, 4, false),
        0x5A => e("NOP", Op::Nop, Imp, Implied, 2, true),
        0x5B => e("SRE", Op::Sre, Aby, Rmw, 7, true),
        0x5C => e("NOP", Op::Nop, Abx, Read, 4, true),
        0x5D => e("EOR", Op::Eor, Abx, Read, 4, false),
        0x5E => e("LSR", Op::Lsr, Abx, Rmw, 7, false),
        0x5F => e("SRE", Op::Sre, Abx, Rmw, 7, true),

        0x60 => e("RTS", Op::Rts, Imp, ReturnSub, 6, false),
        0x61 => e("ADC", Op::Adc, Iix, Read, 6, false),
        0x62 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0x63 => e("RRA", Op::Rra, Iix, Rmw, 8, true),
        0x64 => e("NOP", Op::Nop, Zpi, Read, 3, true),
        0x65 => e("ADC", Op::Adc, Zpi, Read, 3, false),
        0x66 => e("ROR", Op::Ror, Zpi, Rmw, 5, false),
        0x67 => e("RRA", Op::Rra, Zpi, Rmw, 5, true),
        0x68 => e("PLA", Op::Pla, Imp, Pull, 4, false),
        0x69 => e("ADC", Op::Adc, Imm, Read, 2, false),
        0x6A => e("ROR", Op::Ror, Acc, Accumulator, 2, false),
        0x6B => e("ARR", Op::Arr, Imm, Read, 2, true),
        0x6C => e("JMP", Op::Jmp, Ind, Jump, 5, false),
        0x6D => e("ADC", Op::Adc, Abs, Read, 4, false),
        0x6E => e("ROR", Op::Ror, Abs, Rmw, 6, false),
        0x6F => e("RRA", Op::Rra, Abs, Rmw, 6, true),

        0x70 => e("BVS", Op::Bvs, Rel, Branch, 2, false),
        0x71 => e("ADC", Op::Adc, Iiy, Read, 5, false),
        0x72 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0x73 => e("RRA", Op::Rra, Iiy, Rmw, 8, true),
        0x74 => e("NOP", Op::Nop, Zpx, Read, 4, true),
        0x75 => e("ADC", Op::Adc, Zpx, Read, 4, false),
        0x76 => e("ROR", Op::Ror, Zpx, Rmw, 6, false),
        0x77 => e("RRA", Op::Rra, Zpx, Rmw, 6, true),
        0x78 => e("SEI", Op::Sei, Imp, Implied, 2, false),
        0x79 => e("ADC", Op::Adc, Aby, Read, 4, false),
        0x7A => e("NOP", Op::Nop, Imp, Implied, 2, true),
        0x7B => e("RRA", Op::Rra, Aby, Rmw, 7, true),
        0x7C => e("NOP", Op::Nop, Abx, Read, 4, true),
        0x7D => e("ADC", Op::Adc, Abx, Read, 4, false),
        0x7E => e("ROR", Op::Ror, Abx, Rmw, 7, false),
        0x7F => e("RRA", Op::Rra, Abx, Rmw, 7, true),

        0x80 => e("NOP", Op::Nop, Imm, Read, 2, true),
        0x81 => e("STA", Op::Sta, Iix, Write, 6, false),
        0x82 => e("NOP", Op::Nop, Imm, Read, 2, true),
        0x83 => e("SAX", Op::Sax, Iix, Write, 6, true),
        0x84 => e("STY", Op::Sty, Zpi, Write, 3, false),
        0x85 => e("STA", Op::Sta, Zpi, Write, 3, false),
        0x86 => e("STX", Op::Stx, Zpi, Write, 3, false),
        0x87 => e("SAX", Op::Sax, Zpi, Write, 3, true),
        0x88 => e("DEY", Op::Dey, Imp, Implied, 2, false),
        0x89 => e("NOP", Op::Nop, Imm, Read, 2, true),
        0x8A => e("TXA", Op::Txa, Imp, Implied, 2, false),
        0x8B => e("XXX", Op::Nop, Imm, Unknown, 2, true),
        0x8C => e("STY", Op::Sty, Abs, Write, 4, false),
        0x8D => e("STA", Op::Sta, Abs, Write, 4, false),
        0x8E => e("STX", Op::Stx, Abs, Write, 4, false),
        0x8F => e("SAX", Op::Sax, Abs, Write, 4, true),

        0x90 => e("BCC", Op::Bcc, Rel, Branch, 2, false),
        0x91 => e("STA", Op::Sta, Iiy, Write, 6, false),
        0x92 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0x93 => e("XXX", Op::Nop, Iiy, Unknown, 6, true),
        0x94 => e("STY", Op::Sty, Zpx, Write, 4, false),
        0x95 => e("STA", Op::Sta, Zpx, Write, 4, false),
        0x96 => e("STX", Op::Stx, Zpy, Write, 4, false),
        0x97 => e("SAX", Op::Sax, Zpy, Write, 4, true),
        0x98 => e("TYA", Op::Tya, Imp, Implied, 2, false),
        0x99 => e("STA", Op::Sta, Aby, Write, 5, false),
        0x9A => e("TXS", Op::Txs, Imp, Implied, 2, false),
        0x9B => e("XXX", Op::Nop, Aby, Unknown, 5, true),
        0x9C => e("XXX", Op::Nop, Abx, Unknown, 5, true),
        0x9D => e("STA", Op::Sta, Abx, Write, 5, false),
        0x9E => e("XXX", Op::Nop, Aby, Unknown, 5, true),
        0x9F => e("XXX", Op::Nop, Aby, Unknown, 5, true),

        0xA0 => e("LDY", Op::Ldy, Imm, Read, 2, false),
        0xA1 => e("LDA", Op::Lda, Iix, Read, 6, false),
        0xA2 => e("LDX", Op::Ldx, Imm, Read, 2, false),
        0xA3 => e("LAX", Op::Lax, Iix, Read, 6, true),
        0xA4 => e("LDY", Op::Ldy, Zpi, Read, 3, false),
        0xA5 => e("LDA", Op::Lda, Zpi, Read, 3, false),
        0xA6 => e("LDX", Op::Ldx, Zpi, Read, 3, false),
        0xA7 => e("LAX", Op::Lax, Zpi, Read, 3, true),
        0xA8 => e("TAY", Op::Tay, Imp, Implied, 2, false),
        0xA9 => e("LDA", Op::Lda, Imm, Read, 2, false),
        0xAA => e("TAX", Op::Tax, Imp, Implied, 2, false),
        0xAB => e("XXX", Op::Nop, Imm, Unknown, 2, true),
        0xAC => e("LDY", Op::Ldy, Abs, Read, 4, false),
        0xAD => e("LDA", Op::Lda, Abs, Read, 4, false),
        0xAE => e("LDX", Op::Ldx, Abs, Read, 4, false),
        0xAF => e("LAX", Op::Lax, Abs, Read, 4, true),

        0xB0 => e("BCS", Op::Bcs, Rel, Branch, 2, false),
        0xB1 => e("LDA", Op::Lda, Iiy, Read, 5, false),
        0xB2 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0xB3 => e("LAX", Op::Lax, Iiy, Read, 5, true),
        0xB4 => e("LDY", Op::Ldy, Zpx, Read, 4, false),
        0xB5 => e("LDA", Op::Lda, Zpx, Read, 4, false),
        0xB6 => e("LDX", Op::Ldx, Zpy, Read, 4, false),
        0xB7 => e("LAX", Op::Lax, Zpy, Read, 4, true),
        0xB8 => e("CLV", Op::Clv, Imp, Implied, 2, false),
        0xB9 => e("LDA", Op::Lda, Aby, Read, 4, false),
        0xBA => e("TSX", Op::Tsx, Imp, Implied, 2, false),
        0xBB => e("LAS", Op::Las, Aby, Read, 4, true),
        0xBC => e("LDY", Op::Ldy, Abx, Read, 4, false),
        0xBD => e("LDA", Op::Lda, Abx, Read, 4, false),
        0xBE => e("LDX", Op::Ldx, Aby, Read, 4, false),
        0xBF => e("LAX", Op::Lax, Aby, Read, 4, true),

        0xC0 => e("CPY", Op::Cpy, Imm, Read, 2, false),
        0xC1 => e("CMP", Op::Cmp, Iix, Read, 6, false),
        0xC2 => e("NOP", Op::Nop, Imm, Read, 2, true),
        0xC3 => e("DCP", Op::Dcp, Iix, Rmw, 8, true),
        0xC4 => e("CPY", Op::Cpy, Zpi, Read, 3, false),
        0xC5 => e("CMP", Op::Cmp, Zpi, Read, 3, false),
        0xC6 => e("DEC", Op::Dec, Zpi, Rmw, 5, false),
        0xC7 => e("DCP", Op::Dcp, Zpi, Rmw, 5, true),
        0xC8 => e("INY", Op::Iny, Imp, Implied, 2, false),
        0xC9 => e("CMP", Op::Cmp, Imm, Read, 2, false),
        0xCA => e("DEX", Op::Dex, Imp, Implied, 2, false),
        0xCB => e("AXS", Op::Axs, Imm, Read, 2, true),
        0xCC => e("CPY", Op::Cpy, Abs, Read, 4, false),
        0xCD => e("CMP", Op::Cmp, Abs, Read, 4, false),
        0xCE => e("DEC", Op::Dec, Abs, Rmw, 6, false),
        0xCF => e("DCP", Op::Dcp, Abs, Rmw, 6, true),

        0xD0 => e("BNE", Op::Bne, Rel, Branch, 2, false),
        0xD1 => e("CMP", Op::Cmp, Iiy, Read, 5, false),
        0xD2 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0xD3 => e("DCP", Op::Dcp, Iiy, Rmw, 8, true),
        0xD4 => e("NOP", Op::Nop, Zpx, Read, 4, true),
        0xD5 => e("CMP", Op::Cmp, Zpx, Read, 4, false),
        0xD6 => e("DEC", Op::Dec, Zpx, Rmw, 6, false),
        0xD7 => e("DCP", Op::Dcp, Zpx, Rmw, 6, true),
        0xD8 => e("CLD", Op::Cld, Imp, Implied, 2, false),
        0xD9 => e("CMP", Op::Cmp, Aby, Read, 4, false),
        0xDA => e("NOP", Op::Nop, Imp, Implied, 2, true),
        0xDB => e("DCP", Op::Dcp, Aby, Rmw, 7, true),
        0xDC => e("NOP", Op::Nop, Abx, Read, 4, true),
        0xDD => e("CMP", Op::Cmp, Abx, Read, 4, false),
        0xDE => e("DEC", Op::Dec, Abx, Rmw, 7, false),
        0xDF => e("DCP", Op::Dcp, Abx, Rmw, 7, true),

        0xE0 => e("CPX", Op::Cpx, Imm, Read, 2, false),
        0xE1 => e("SBC", Op::Sbc, Iix, Read, 6, false),
        0xE2 => e("NOP", Op::Nop, Imm, Read, 2, true),
        0xE3 => e("ISC", Op::Isc, Iix, Rmw, 8, true),
        0xE4 => e("CPX", Op::Cpx, Zpi, Read, 3, false),
        0xE5 => e("SBC", Op::Sbc, Zpi, Read, 3, false),
        0xE6 => e("INC", Op::Inc, Zpi, Rmw, 5, false),
        0xE7 => e("ISC", Op::Isc, Zpi, Rmw, 5, true),
        0xE8 => e("INX", Op::Inx, Imp, Implied, 2, false),
        0xE9 => e("SBC", Op::Sbc, Imm, Read, 2, false),
        0xEA => e("NOP", Op::Nop, Imp, Implied, 2, false),
        0xEB => e("SBC", Op::Sbc, Imm, Read, 2, true),
        0xEC => e("CPX", Op::Cpx, Abs, Read, 4, false),
        0xED => e("SBC", Op::Sbc, Abs, Read, 4, false),
        0xEE => e("INC", Op::Inc, Abs, Rmw, 6, false),
        0xEF => e("ISC", Op::Isc, Abs, Rmw, 6, true),

        0xF0 => e("BEQ", Op::Beq, Rel, Branch, 2, false),
        0xF1 => e("SBC", Op::Sbc, Iiy, Read, 5, false),
        0xF2 => e("JAM", Op::Nop, Imp, Jam, 2, true),
        0xF3 => e("ISC", Op::Isc, Iiy, Rmw, 8, true),
        0xF4 => e("NOP", Op::Nop, Zpx, Read, 4, true),
        0xF5 => e("SBC", Op::Sbc, Zpx, Read, 4, false),
        0xF6 => e("INC", Op::Inc, Zpx, Rmw, 6, false),
        0xF7 => e("ISC", Op::Isc, Zpx, Rmw, 6, true),
        0xF8 => e("SED", Op::Sed, Imp, Implied, 2, false),
        0xF9 => e("SBC", Op::Sbc, Aby, Read, 4, false),
        0xFA => e("NOP", Op::Nop, Imp, Implied, 2, true),
        0xFB => e("ISC", Op::Isc, Aby, Rmw, 7, true),
        0xFC => e("NOP", Op::Nop, Abx, Read, 4, true),
        0xFD => e("SBC", Op::Sbc, Abx, Read, 4, false),
        0xFE => e("INC", Op::Inc, Abx, Rmw, 7, false),
        0xFF => e("ISC", Op::Isc, Abx, Rmw, 7, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lda_immediate() {
        let info = decode(0xA9);
        assert_eq!(info.mnemonic, "LDA");
        assert_eq!(info.mode, Imm);
        assert_eq!(info.cycles, 2);
        assert!(!info.illegal);
    }

    #[test]
    fn brk_is_seven_cycles() {
        assert_eq!(decode(0x00).cycles, 7);
    }

    #[test]
    fn jmp_indirect_is_five_cycles() {
        let info = decode(0x6C);
        assert_eq!(info.mode, Ind);
        assert_eq!(info.cycles, 5);
    }

    #[test]
    fn illegal_opcodes_are_flagged() {
        assert!(decode(0xA7).illegal); // LAX zp
        assert!(!decode(0xA5).illegal); // LDA zp
    }

    #[test]
    fn jam_opcodes_classified() {
        assert_eq!(decode(0x02).kind, Jam);
        assert_eq!(decode(0xF2).kind, Jam);
    }

    #[test]
    fn unstable_unofficial_opcodes_are_unknown() {
        assert_eq!(decode(0x8B).kind, Unknown);
        assert_eq!(decode(0x9E).kind, Unknown);
    }

    #[test]
    fn sbc_alias_at_eb() {
        let info = decode(0xEB);
        assert_eq!(info.op, Op::Sbc);
        assert!(info.illegal);
    }
}
