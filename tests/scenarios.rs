//! Integration tests exercising the public [`nanocore::Runtime`] API against the concrete
//! scenarios and cross-cutting invariants.

use nanocore::{Event, Runtime};

fn encode(opcode: u8, rd: u8, rs1: u8, rs2_or_imm: u16) -> u32 {
    ((opcode as u32) << 26) | ((rd as u32) << 21) | ((rs1 as u32) << 16) | (rs2_or_imm as u32 & 0xFFFF)
}

fn to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

const MEM_SIZE: u64 = 1 << 20;

/// Dependent ADD chain: `ADD R(i+1), R0, Ri` for every valid destination register, then HALT.
/// Every addend traces back to R0 (always zero), so every register stays zero regardless of
/// chain length.
///
/// With 32 GPRs, `rd = i + 1` tops out at `i = 30` (writing R31), so the chain is 31 ADDs
/// followed by HALT: 32 retirements, not 33 — there is no valid `i` that keeps `rd` in range
/// and produces a 33rd chained instruction.
#[test]
fn dependent_add_chain() {
    let runtime = Runtime::new();
    let handle = runtime.create_vm(MEM_SIZE).unwrap();

    let mut words = Vec::new();
    for i in 0..31u8 {
        words.push(encode(0x00, i + 1, 0, (i as u16) << 11));
    }
    words.push(encode(0x21, 0, 0, 0));
    let instruction_count = words.len() as u64;
    assert_eq!(instruction_count, 32);

    runtime.load_program(handle, &to_bytes(&words), 0x10000).unwrap();

    let event = runtime.run(handle, 0).unwrap();
    assert_eq!(event, Some(Event::Halted));

    for i in 0..32 {
        assert_eq!(runtime.get_register(handle, i).unwrap(), 0, "gpr {i} should be 0");
    }

    let state = runtime.get_state(handle).unwrap();
    assert_eq!(state.pc, 0x10000 + instruction_count * 4);
    assert_eq!(runtime.get_perf_counter(handle, 0).unwrap(), instruction_count);
}

/// LD R1, 5; LD R2, 10; ADD R3, R1, R2; HALT.
#[test]
fn ld_and_add() {
    let runtime = Runtime::new();
    let handle = runtime.create_vm(MEM_SIZE).unwrap();

    let words = [
        encode(0x0F, 1, 0, 5),
        encode(0x0F, 2, 0, 10),
        encode(0x00, 3, 1, 2 << 11),
        encode(0x21, 0, 0, 0),
    ];
    runtime.load_program(handle, &to_bytes(&words), 0x10000).unwrap();

    let event = runtime.run(handle, 0).unwrap();
    assert_eq!(event, Some(Event::Halted));

    assert_eq!(runtime.get_register(handle, 1).unwrap(), 5);
    assert_eq!(runtime.get_register(handle, 2).unwrap(), 10);
    assert_eq!(runtime.get_register(handle, 3).unwrap(), 15);
}

/// `LD R0, 42` leaves R0 at zero.
#[test]
fn r0_write_is_discarded() {
    let runtime = Runtime::new();
    let handle = runtime.create_vm(MEM_SIZE).unwrap();

    let words = [encode(0x0F, 0, 0, 42)];
    runtime.load_program(handle, &to_bytes(&words), 0x10000).unwrap();

    runtime.step(handle).unwrap();

    assert_eq!(runtime.get_register(handle, 0).unwrap(), 0);
}

/// A breakpoint at the `ADD` instruction pauses before it executes; a following step executes
/// it and does not re-trigger the breakpoint.
#[test]
fn breakpoint_pauses_before_execution() {
    let runtime = Runtime::new();
    let handle = runtime.create_vm(MEM_SIZE).unwrap();

    let words = [
        encode(0x0F, 1, 0, 5),
        encode(0x0F, 2, 0, 10),
        encode(0x00, 3, 1, 2 << 11),
        encode(0x21, 0, 0, 0),
    ];
    runtime.load_program(handle, &to_bytes(&words), 0x10000).unwrap();

    let add_address = 0x10000 + 2 * 4;
    runtime.set_breakpoint(handle, add_address).unwrap();

    let event = runtime.run(handle, 0).unwrap();
    assert_eq!(event, Some(Event::Breakpoint));
    assert_eq!(runtime.get_register(handle, 3).unwrap(), 0);
    assert_eq!(runtime.get_state(handle).unwrap().pc, add_address);

    let event = runtime.step(handle).unwrap();
    assert_eq!(event, None);
    assert_eq!(runtime.get_register(handle, 3).unwrap(), 15);
}

/// An unknown opcode halts the instance and reports `Exception` without retiring.
#[test]
fn unknown_opcode_traps() {
    let runtime = Runtime::new();
    let handle = runtime.create_vm(MEM_SIZE).unwrap();

    let words = [0x3Fu32 << 26];
    runtime.load_program(handle, &to_bytes(&words), 0x10000).unwrap();

    let event = runtime.step(handle).unwrap();
    assert_eq!(event, Some(Event::Exception));
    assert_eq!(runtime.get_perf_counter(handle, 0).unwrap(), 0);

    let event = runtime.step(handle).unwrap();
    assert_eq!(event, Some(Event::Halted));
}

/// Backward branch loop: sums 3 + 2 + 1 by repeated SUB/ADD/BNE.
#[test]
fn backward_branch_loop() {
    let runtime = Runtime::new();
    let handle = runtime.create_vm(MEM_SIZE).unwrap();

    // R1 = 3 (counter), R2 = 0 (accumulator), R4 = 1 (decrement constant).
    // loop: R2 += R1; R1 -= R4; if R1 != R0 goto loop; HALT.
    let words = [
        encode(0x0F, 1, 0, 3),                  // 0: LD R1, 3
        encode(0x0F, 2, 0, 0),                  // 4: LD R2, 0
        encode(0x0F, 4, 0, 1),                  // 8: LD R4, 1
        encode(0x00, 2, 2, 1 << 11),            // 12 (loop): ADD R2, R2, R1
        encode(0x01, 1, 1, 4 << 11),            // 16: SUB R1, R1, R4
        encode(0x18, 1, 0, (((-2i16) << 1) as u16) & 0xFFFF), // 20: BNE R1, R0, loop
        encode(0x21, 0, 0, 0),                  // 24: HALT
    ];
    runtime.load_program(handle, &to_bytes(&words), 0x10000).unwrap();

    let event = runtime.run(handle, 10_000).unwrap();
    assert_eq!(event, Some(Event::Halted));

    assert_eq!(runtime.get_register(handle, 2).unwrap(), 6); // 3 + 2 + 1
    assert_eq!(runtime.get_register(handle, 1).unwrap(), 0);
}

/// `write_memory` followed by `read_memory` returns exactly what was written.
#[test]
fn memory_round_trip() {
    let runtime = Runtime::new();
    let handle = runtime.create_vm(MEM_SIZE).unwrap();

    let data = vec![10, 20, 30, 40, 50];
    runtime.write_memory(handle, 0x2000, &data).unwrap();

    assert_eq!(runtime.read_memory(handle, 0x2000, data.len() as u64).unwrap(), data);
}

/// `reset` followed by `reset` equals a single `reset`.
#[test]
fn reset_is_idempotent() {
    let runtime = Runtime::new();
    let handle = runtime.create_vm(MEM_SIZE).unwrap();

    runtime.set_register(handle, 7, 123).unwrap();
    runtime.set_breakpoint(handle, 0x10004).unwrap();

    runtime.reset_vm(handle).unwrap();
    let once = runtime.get_state(handle).unwrap();

    runtime.reset_vm(handle).unwrap();
    let twice = runtime.get_state(handle).unwrap();

    assert_eq!(once.pc, twice.pc);
    assert_eq!(once.sp, twice.sp);
    assert_eq!(runtime.get_register(handle, 7).unwrap(), 0);
    // The breakpoint from before the reset no longer halts a run through it.
    runtime.load_program(handle, &to_bytes(&[encode(0x21, 0, 0, 0)]), 0x10004).unwrap();
    let event = runtime.run(handle, 0).unwrap();
    assert_eq!(event, Some(Event::Halted));
}

/// Operations on one handle never mutate state observable through another.
#[test]
fn instances_are_isolated() {
    let runtime = Runtime::new();
    let a = runtime.create_vm(MEM_SIZE).unwrap();
    let b = runtime.create_vm(MEM_SIZE).unwrap();

    runtime.set_register(a, 9, 0xdead).unwrap();
    runtime.write_memory(a, 0x3000, &[1, 2, 3]).unwrap();

    assert_eq!(runtime.get_register(b, 9).unwrap(), 0);
    assert_eq!(runtime.read_memory(b, 0x3000, 3).unwrap(), vec![0, 0, 0]);
}

/// A store that would overflow the memory region halts the instance with `Exception` and
/// leaves memory unchanged.
#[test]
fn store_overflow_is_an_exception() {
    let runtime = Runtime::new();
    let handle = runtime.create_vm(MEM_SIZE).unwrap();

    // R1 + (-8), with R1 == 0, wraps to an address far past the end of any realistic memory
    // region.
    let program = to_bytes(&[encode(0x13, 0, 1, 0xFFF8u16)]);
    runtime.load_program(handle, &program, 0x10000).unwrap();

    let before = runtime.read_memory(handle, 0, 64).unwrap();
    let event = runtime.step(handle).unwrap();
    assert_eq!(event, Some(Event::Exception));
    assert_eq!(runtime.read_memory(handle, 0, 64).unwrap(), before);
}
