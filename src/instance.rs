//! This module provides the [`Instance`] struct: one independent VM, owning its memory,
//! register file, breakpoint set, and halted flag, along with the step/run loop that drives it.

use log::{trace, warn};

use crate::breakpoints::Breakpoints;
use crate::decode::decode;
use crate::error::Error;
use crate::event::Event;
use crate::exec::{self, Outcome};
use crate::memory::Memory;
use crate::state::{Flags, PerfCounter, ProcessorState};

/// A stable identifier within the [`crate::registry::Registry`], distinct from the numeric
/// handle assigned at creation — observable via [`Instance::id`] but never itself used to look
/// the instance up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VmId(pub u64);

/// One independent virtual machine: its memory, processor state, breakpoint set, and halted
/// flag. Two instances share no mutable state.
pub struct Instance {
    memory: Memory,
    state: ProcessorState,
    halted: bool,
    breakpoints: Breakpoints,
    id: VmId,
    memory_size: u64,
    /// The address of a breakpoint `step` most recently stopped at without executing. If the
    /// next `step` call finds `pc` still at this address, it executes the instruction there
    /// instead of reporting the breakpoint again — this is what lets a debugger resume past a
    /// breakpoint with a single `step` without having to clear and reset it.
    breakpoint_armed_at: Option<u64>,
}

impl Instance {
    /// Allocates a fresh instance: zeroed memory of `memory_size` bytes, state initialized to
    /// `pc = 0x10000`, `sp = memory_size - 8`.
    pub fn new(memory_size: u64, id: VmId) -> Result<Self, Error> {
        Ok(Self {
            memory: Memory::new(memory_size)?,
            state: ProcessorState::new(memory_size),
            halted: false,
            breakpoints: Breakpoints::new(),
            id,
            memory_size,
            breakpoint_armed_at: None,
        })
    }

    /// The identifier assigned at creation time; stable for the instance's lifetime.
    pub fn id(&self) -> VmId {
        self.id
    }

    /// Whether the instance has halted.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// A read-only view of the processor state.
    pub fn state(&self) -> &ProcessorState {
        &self.state
    }

    /// Resets the instance to its just-created state: processor state reinitialized, halted
    /// flag cleared, breakpoints cleared. Memory is preserved, not zeroed.
    pub fn reset(&mut self) {
        self.state = ProcessorState::new(self.memory_size);
        self.halted = false;
        self.breakpoints.clear_all();
        self.breakpoint_armed_at = None;
    }

    /// Reads a general-purpose register.
    pub fn get_register(&self, index: usize) -> Result<u64, Error> {
        if index >= crate::state::NUM_GPRS {
            return Err(Error::InvalidArgument(format!("register index {index} out of range")));
        }
        Ok(self.state.gpr(index))
    }

    /// Writes a general-purpose register. Writes to index 0 succeed but are discarded.
    pub fn set_register(&mut self, index: usize, value: u64) -> Result<(), Error> {
        if index >= crate::state::NUM_GPRS {
            return Err(Error::InvalidArgument(format!("register index {index} out of range")));
        }
        self.state.set_gpr(index, value);
        Ok(())
    }

    /// Reads a performance counter.
    pub fn get_perf_counter(&self, index: usize) -> Result<u64, Error> {
        if index >= crate::state::NUM_PERF_COUNTERS {
            return Err(Error::InvalidArgument(format!("perf counter index {index} out of range")));
        }
        Ok(self.state.perf_counter(index))
    }

    /// Copies `len` bytes out of instance memory.
    pub fn read_memory(&self, address: u64, len: u64) -> Result<Vec<u8>, Error> {
        self.memory.read(address, len)
    }

    /// Copies `data` into instance memory.
    pub fn write_memory(&mut self, address: u64, data: &[u8]) -> Result<(), Error> {
        self.memory.write(address, data)
    }

    /// Copies `data` into instance memory and sets `pc := address`.
    pub fn load_program(&mut self, data: &[u8], address: u64) -> Result<(), Error> {
        self.memory.write(address, data)?;
        self.state.pc = address;
        Ok(())
    }

    /// Sets a breakpoint at `address`.
    pub fn set_breakpoint(&mut self, address: u64) -> Result<(), Error> {
        self.breakpoints.set(address)
    }

    /// Clears the breakpoint at `address`.
    pub fn clear_breakpoint(&mut self, address: u64) -> Result<(), Error> {
        self.breakpoints.clear(address)
    }

    /// Reports the instance's pending event without advancing execution: `Halted` if the
    /// instance has halted, otherwise `None` (no event is pending).
    pub fn poll_event(&self) -> Option<Event> {
        if self.halted {
            Some(Event::Halted)
        } else {
            None
        }
    }

    /// Executes a single step of the fetch/decode/execute loop.
    ///
    /// Returns `None` for a normal retirement, `Some(event)` for a halt, breakpoint, or
    /// exception. Faults are reported as events, not as errors — a fetch fault or unknown
    /// opcode halts the instance and is observed through [`Event::Exception`], never a panic
    /// or a propagated `Result::Err`.
    pub fn step(&mut self) -> Option<Event> {
        if self.halted {
            return Some(Event::Halted);
        }

        let pc = self.state.pc;

        if pc % 4 != 0 || pc.checked_add(4).map_or(true, |end| end > self.memory_size) {
            warn!("pc {pc:#x} misaligned or out of range; halting");
            self.halted = true;
            self.state.flags.insert(Flags::HALT);
            return Some(Event::Exception);
        }

        if self.breakpoint_armed_at == Some(pc) {
            // We stopped here on the previous step without executing; let it through once so a
            // debugger can resume past the breakpoint with a single `step`.
            self.breakpoint_armed_at = None;
        } else if self.breakpoints.contains(pc) {
            self.breakpoint_armed_at = Some(pc);
            return Some(Event::Breakpoint);
        }

        // Fetch is infallible here: the bounds/alignment check above already guarantees
        // `pc + 4 <= memory_size`.
        let word = self.memory.read_u32_le(pc).expect("fetch bounds already checked");
        let decoded = decode(word);

        // Advance PC by 4 unconditionally; a taken branch overwrites this below. This is the
        // single place PC is mutated by the step loop, so a branch and the default advance can
        // never both apply to the same step.
        self.state.pc = pc + 4;

        match exec::execute(&mut self.state, &mut self.memory, pc, decoded) {
            Outcome::Continue => {
                self.retire();
                trace!("retired {:#06x} at pc {pc:#x}", decoded.opcode_bits);
                None
            }
            Outcome::Branch { target } => {
                self.state.pc = target;
                self.retire();
                trace!("branch at pc {pc:#x} -> {target:#x}");
                None
            }
            Outcome::Halt => {
                self.halted = true;
                self.retire();
                trace!("halted at pc {pc:#x}");
                Some(Event::Halted)
            }
            Outcome::Exception => {
                warn!("exception executing opcode {:#04x} at pc {pc:#x}", decoded.opcode_bits);
                self.halted = true;
                self.state.flags.insert(Flags::HALT);
                Some(Event::Exception)
            }
        }
    }

    fn retire(&mut self) {
        self.state.bump_perf_counter(PerfCounter::InstructionsRetired);
        self.state.bump_perf_counter(PerfCounter::Cycles);
    }

    /// Repeatedly steps until the instance halts, a breakpoint or exception event occurs, or
    /// (when `max_instructions > 0`) that many instructions have retired. `max_instructions ==
    /// 0` means unbounded. Returns `None` (OK) if the instruction budget was exhausted without
    /// any of those events occurring.
    pub fn run(&mut self, max_instructions: u64) -> Option<Event> {
        let mut retired = 0u64;

        loop {
            match self.step() {
                Some(event) => return Some(event),
                None => {
                    retired += 1;
                    if max_instructions != 0 && retired >= max_instructions {
                        return None;
                    }
                }
            }
        }
    }
}
