//! Runs a CP/M `.COM` image under a minimal emulated BDOS: function 2 (print one
//! character) and function 9 (print a `$`-terminated string) on `CALL 0x0005`, and a halt
//! trap on `CALL 0x0000` (the CP/M warm-boot vector).

use std::env;
use std::fs;
use std::process::ExitCode;

use emu8080::registers::{Register8, RegisterPair};
use emu8080::shell::Shell;

const MEMORY_SIZE: usize = 0x10000;

fn bdos(shell: &mut Shell) -> Result<(), emu8080::error::Error> {
    let function = shell.cpu.register8(Register8::Direct(1))?; // C

    match function {
        2 => {
            let e = shell.cpu.register8(Register8::Direct(3))?; // E
            shell.output.push(e as char);
        }
        9 => {
            let mut addr = shell.cpu.register_pair(RegisterPair::De);
            loop {
                let byte = shell.cpu.read_memory8(addr)?;
                if byte == b'$' {
                    break;
                }
                shell.output.push(byte as char);
                addr = addr.wrapping_add(1);
            }
        }
        other => log::warn!("unhandled BDOS function {other}"),
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: emu8080 <image.com>");
            return ExitCode::FAILURE;
        }
    };

    let image = match fs::read(&path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("failed to read '{path}': {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut shell = Shell::new(MEMORY_SIZE);
    if let Err(e) = shell.load_image(&image) {
        eprintln!("failed to load '{path}': {e}");
        return ExitCode::FAILURE;
    }

    shell.register_trap(0x0000, "reset", |shell| {
        shell.cpu.state.halt = true;
        Ok(())
    }).expect("reset trap is not already registered");
    shell.register_trap(0x0005, "bdos", bdos).expect("bdos trap is not already registered");

    while !shell.halted() {
        if let Err(e) = shell.run() {
            eprintln!("{e}");
            break;
        }

        let output = shell.output_stream(true);
        if !output.is_empty() {
            print!("{output}");
        }
    }

    println!();
    ExitCode::SUCCESS
}
