//! `nes6502 <cartridge.nes> [--trace] [--max-instructions N]`
//!
//! Loads an iNES cartridge, drives the CPU core instruction by instruction,
//! and optionally emits a nestest-format trace line to stdout per
//! instruction boundary. Exits 0 on a clean run (instruction bound reached
//! or the process is killed externally) and 1 on a cartridge load error.

use std::env;
use std::process::ExitCode;

use nes6502_bus::Machine;

struct Args {
    cartridge_path: String,
    trace: bool,
    max_instructions: Option<u64>,
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut cartridge_path = None;
    let mut trace = false;
    let mut max_instructions = None;

    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--trace" => trace = true,
            "--max-instructions" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--max-instructions requires a value".to_string())?;
                max_instructions = Some(
                    value
                        .parse::<u64>()
                        .map_err(|e| format!("invalid --max-instructions value: {e}"))?,
                );
            }
            other if cartridge_path.is_none() => cartridge_path = Some(other.to_string()),
            other => return Err(format!("unexpected argument: {other}")),
        }
    }

    let cartridge_path = cartridge_path.ok_or_else(|| "missing <cartridge.nes> argument".to_string())?;
    Ok(Args {
        cartridge_path,
        trace,
        max_instructions,
    })
}

fn run(args: &Args) -> ExitCode {
    let mut machine = match Machine::from_path(&args.cartridge_path) {
        Ok(machine) => machine,
        Err(err) => {
            log::error!("failed to load {}: {err}", args.cartridge_path);
            return ExitCode::FAILURE;
        }
    };

    let mut executed = 0u64;
    loop {
        if let Some(max) = args.max_instructions {
            if executed >= max {
                break;
            }
        }

        if args.trace {
            println!("{}", machine.trace_line());
        }

        if !machine.step_instruction() {
            log::warn!("CPU jammed after {executed} instructions");
            break;
        }
        executed += 1;
    }

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::init();

    let argv: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("usage: nes6502 <cartridge.nes> [--trace] [--max-instructions N]");
            return ExitCode::FAILURE;
        }
    };

    run(&args)
}
