//! This module provides the executor: ALU, load/store, and branch dispatch for a single decoded
//! instruction.

use crate::decode::{Decoded, Opcode};
use crate::memory::Memory;
use crate::state::{Flags, PerfCounter, ProcessorState};

/// The effect a single executed instruction has on control flow, as reported back to the
/// step loop. `execute` never touches `state.pc` directly — the step loop is the single place
/// that applies the unconditional +4 or a branch target, so the two updates can never both
/// land on the same step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The instruction retired normally; the step loop should apply the default `pc + 4`.
    Continue,
    /// A conditional branch was taken; the step loop should set `pc` to `target`.
    Branch { target: u64 },
    /// A `HALT` retired. The step loop marks the instance halted and reports `Event::Halted`.
    Halt,
    /// The opcode was unrecognized, or a memory access went out of range. The step loop marks
    /// the instance halted and reports `Event::Exception`. Does not count as a retirement.
    Exception,
}

/// Executes a single decoded instruction against `state` and `memory`, at the instruction whose
/// address (for branch displacement) is `pc_of_instruction`.
pub fn execute(
    state: &mut ProcessorState,
    memory: &mut Memory,
    pc_of_instruction: u64,
    decoded: Decoded,
) -> Outcome {
    let opcode = match decoded.opcode {
        Some(opcode) => opcode,
        None => return Outcome::Exception,
    };

    match opcode {
        Opcode::Add => {
            let value = state
                .gpr(decoded.rs1)
                .wrapping_add(state.gpr(decoded.rs2));
            state.set_gpr(decoded.rd, value);
            Outcome::Continue
        }
        Opcode::Sub => {
            let value = state
                .gpr(decoded.rs1)
                .wrapping_sub(state.gpr(decoded.rs2));
            state.set_gpr(decoded.rd, value);
            Outcome::Continue
        }
        Opcode::Mul => {
            let value = state
                .gpr(decoded.rs1)
                .wrapping_mul(state.gpr(decoded.rs2));
            state.set_gpr(decoded.rd, value);
            Outcome::Continue
        }
        Opcode::Div => {
            let divisor = state.gpr(decoded.rs2);
            if divisor != 0 {
                state.set_gpr(decoded.rd, state.gpr(decoded.rs1) / divisor);
            }
            Outcome::Continue
        }
        Opcode::Mod => {
            let divisor = state.gpr(decoded.rs2);
            if divisor != 0 {
                state.set_gpr(decoded.rd, state.gpr(decoded.rs1) % divisor);
            }
            Outcome::Continue
        }
        Opcode::And => {
            let value = state.gpr(decoded.rs1) & state.gpr(decoded.rs2);
            state.set_gpr(decoded.rd, value);
            Outcome::Continue
        }
        Opcode::Or => {
            let value = state.gpr(decoded.rs1) | state.gpr(decoded.rs2);
            state.set_gpr(decoded.rd, value);
            Outcome::Continue
        }
        Opcode::Xor => {
            let value = state.gpr(decoded.rs1) ^ state.gpr(decoded.rs2);
            state.set_gpr(decoded.rd, value);
            Outcome::Continue
        }
        Opcode::Shl => {
            let shift = state.gpr(decoded.rs2) & 63;
            let value = state.gpr(decoded.rs1) << shift;
            state.set_gpr(decoded.rd, value);
            Outcome::Continue
        }
        Opcode::Shr => {
            let shift = state.gpr(decoded.rs2) & 63;
            let value = state.gpr(decoded.rs1) >> shift;
            state.set_gpr(decoded.rd, value);
            Outcome::Continue
        }
        Opcode::Ld => {
            state.set_gpr(decoded.rd, decoded.imm16_signed() as u64);
            Outcome::Continue
        }
        Opcode::St => {
            let address = state
                .gpr(decoded.rs1)
                .wrapping_add(decoded.imm16_signed() as u64);

            match memory.write_u64_le(address, state.gpr(decoded.rd)) {
                Ok(()) => {
                    state.bump_perf_counter(PerfCounter::MemoryOps);
                    Outcome::Continue
                }
                Err(_) => Outcome::Exception,
            }
        }
        Opcode::Beq => branch_if(state, decoded, pc_of_instruction, |a, b| a == b),
        Opcode::Bne => branch_if(state, decoded, pc_of_instruction, |a, b| a != b),
        Opcode::Blt => {
            branch_if(state, decoded, pc_of_instruction, |a, b| (a as i64) < (b as i64))
        }
        Opcode::Halt => {
            state.flags.insert(Flags::HALT);
            Outcome::Halt
        }
        Opcode::Nop => Outcome::Continue,
    }
}

fn branch_if(
    state: &ProcessorState,
    decoded: Decoded,
    pc_of_instruction: u64,
    condition: impl Fn(u64, u64) -> bool,
) -> Outcome {
    if condition(state.gpr(decoded.rd), state.gpr(decoded.rs1)) {
        let displacement = decoded.imm16_signed() << 1;
        let target = pc_of_instruction.wrapping_add(displacement as u64);
        Outcome::Branch { target }
    } else {
        Outcome::Continue
    }
}
