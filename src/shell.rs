//! The host shell: owns a [`Cpu`], its input/output/error text buffers, and a set of named
//! interrupt traps keyed by address. Mirrors `Emulator.h`/`.cpp`: `run()` fires any trap
//! registered at the current PC before stepping the CPU one cycle, but only when the CPU
//! is actually ready to fetch a new instruction (no outstanding wait cycles); `reset()`
//! rebuilds state the way `Emulator::ResetState` does, including poking a `RET` at address
//! `0x5` as a placeholder BDOS entry point before any real trap takes over that address.

use std::collections::HashMap;

use crate::cpu::Cpu;
use crate::error::Error;
use crate::state::{CpuState, RESET_PC};

/// A host-installed interrupt handler, invoked with the shell whenever the program counter
/// reaches the trap's address. Plays the role of `InterruptDelegate::HandleCallback`, minus
/// the delegate indirection: the handler closure is the delegate.
pub type TrapHandler = Box<dyn FnMut(&mut Shell) -> Result<(), Error>>;

struct Trap {
    address: u16,
    handler: TrapHandler,
}

/// `RET`. Placeholder occupant of address `0x5` until a real BDOS trap is registered there.
const STUB_RET: u8 = 0xC9;

/// Wraps a [`Cpu`] with the ambient pieces a standalone emulator needs but the core does
/// not: text I/O buffers and address-triggered callouts to host code.
pub struct Shell {
    pub cpu: Cpu,
    pub input: String,
    pub output: String,
    pub error: String,
    traps: HashMap<String, Trap>,
}

impl Shell {
    /// A freshly reset shell with `memory_size` bytes of RAM.
    pub fn new(memory_size: usize) -> Self {
        let mut shell =
            Shell { cpu: Cpu::new(memory_size), input: String::new(), output: String::new(), error: String::new(), traps: HashMap::new() };
        shell.reset();
        shell
    }

    /// Rebuilds CPU state as if newly constructed: zeroed registers and memory, `pc =
    /// 0x0100`, latches clear. Existing traps are left registered.
    pub fn reset(&mut self) {
        let fresh = CpuState::reset(self.cpu.state.memory_size());
        fresh.copy_to(&mut self.cpu.state, true);
        self.cpu.state.pc = RESET_PC;
        // Placeholder so an unhandled BDOS call returns harmlessly instead of running
        // whatever garbage byte was at 0x5.
        let _ = self.cpu.write_memory8(0x5, STUB_RET);
    }

    /// Loads a `.COM`-style image at the fixed CP/M load address `0x0100`.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), Error> {
        self.cpu.write_memory(RESET_PC, image)
    }

    /// Registers a named trap at `address`. Errors if `id` is already registered.
    pub fn register_trap(
        &mut self,
        address: u16,
        id: impl Into<String>,
        handler: impl FnMut(&mut Shell) -> Result<(), Error> + 'static,
    ) -> Result<(), Error> {
        let id = id.into();
        if self.traps.contains_key(&id) {
            return Err(Error::DuplicateTrap { id });
        }
        self.traps.insert(id, Trap { address, handler: Box::new(handler) });
        Ok(())
    }

    pub fn remove_trap(&mut self, id: &str) {
        self.traps.remove(id);
    }

    pub fn has_trap(&self, id: &str) -> bool {
        self.traps.contains_key(id)
    }

    /// Fires every trap registered at the current PC, then runs one scheduling tick. Traps
    /// only fire when the CPU has no outstanding wait cycles, i.e. right before it would
    /// fetch the next instruction — matching `Emulator::Run`'s placement of the callback
    /// loop ahead of `ExecuteCycle`.
    pub fn run(&mut self) -> Result<(), Error> {
        let pc = self.cpu.state.pc;
        if self.cpu.state.wait_cycles == 0 {
            let due: Vec<String> = self.traps.iter().filter(|(_, trap)| trap.address == pc).map(|(id, _)| id.clone()).collect();
            for id in due {
                // Temporarily remove the trap so its handler can borrow `self` mutably
                // without aliasing the map that owns it, then put it back.
                if let Some(mut trap) = self.traps.remove(&id) {
                    let result = (trap.handler)(self);
                    self.traps.insert(id, trap);
                    result?;
                }
            }
        }
        self.cpu.execute_cycle()
    }

    pub fn halted(&self) -> bool {
        self.cpu.state.halt
    }

    /// Returns the accumulated output, clearing the buffer if `clear`.
    pub fn output_stream(&mut self, clear: bool) -> String {
        let text = self.output.clone();
        if clear {
            self.output.clear();
        }
        text
    }

    /// Returns the accumulated error text, clearing the buffer if `clear`.
    pub fn error_stream(&mut self, clear: bool) -> String {
        let text = self.error.clone();
        if clear {
            self.error.clear();
        }
        text
    }

    pub fn set_input_stream(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn append_input_stream(&mut self, text: &str) {
        self.input.push_str(text);
    }
}
