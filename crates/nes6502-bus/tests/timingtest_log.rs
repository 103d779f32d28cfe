//! Bruce Clark `timingtest` cycle-count equivalence check.
//!
//! Unlike nestest, this fixture is a raw 6502 binary meant to be loaded
//! directly into memory at `$1000`, not an iNES cartridge with its own
//! mapper and reset vector; [`Machine::from_raw_binary`] sets that up and
//! forces `PC` to `$1000` before the comparison loop starts. The golden
//! trace ends with the program parked at `PC = $1269` after 1141 cycles.
//!
//! Requires `tests/fixtures/timingtest.bin` and `tests/fixtures/timingtest.log`,
//! neither of which ships in this repository, so the test is `#[ignore]`d.

use std::path::Path;

use nes6502_bus::Machine;

#[test]
#[ignore = "requires tests/fixtures/timingtest.bin and tests/fixtures/timingtest.log"]
fn timingtest_log_matches_reference_trace() {
    let bin_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/timingtest.bin");
    let log_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/timingtest.log");

    let program = std::fs::read(&bin_path).expect("failed to read timingtest.bin");
    let mut machine = Machine::from_raw_binary(&program, 0x1000);

    let golden = std::fs::read_to_string(&log_path).expect("failed to read timingtest.log");

    for (i, expected) in golden.lines().enumerate() {
        let actual = machine.trace_line();
        assert_eq!(actual, expected, "trace diverged at line {}", i + 1);
        assert!(machine.step_instruction(), "CPU jammed at line {}", i + 1);
    }

    assert_eq!(machine.cpu().pc(), 0x1269);
    assert_eq!(machine.cpu().cycles(), 1141);
}
