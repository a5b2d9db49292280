//! This module provides the literal, stable, handle-and-status-code surface, as free functions
//! over the process-wide [`crate::runtime::global`] runtime. It exists for host binding layers
//! (a C/FFI glue layer, a REPL, a profiler) that want to bind against the exact numeric ABI
//! rather than threading a [`crate::runtime::Runtime`] value and matching on
//! [`crate::error::Error`] themselves. Every function here returns a bare [`Status`] (or, for
//! `vm_step`/`vm_run`, a raw event code) and writes any output through an `out_*` parameter,
//! so the whole module binds cleanly across an `extern "C"` boundary with no `Result` crossing
//! it.
//!
//! Embedders writing Rust directly should prefer constructing a [`crate::runtime::Runtime`] and
//! calling its methods, which return `Result` rather than raw status ints.

use crate::error::{status_of, Status};
use crate::registry::VmHandle;
use crate::runtime::global;
use crate::state::ProcessorState;

/// Idempotent library initialization. NanoCore has no process-wide state to initialize beyond
/// the lazily-constructed registry, so this always succeeds.
pub fn init() -> Status {
    let _ = global();
    Status::Ok
}

/// Creates a new VM instance. Returns the handle on success, or a negative [`Status`] on
/// failure with `*out_handle` left unwritten.
pub fn vm_create(memory_size: u64, out_handle: &mut i32) -> Status {
    match global().create_vm(memory_size) {
        Ok(handle) => {
            *out_handle = handle.0 as i32;
            Status::Ok
        }
        Err(error) => Status::from(&error),
    }
}

/// Destroys the instance at `handle`.
pub fn vm_destroy(handle: i32) -> Status {
    status_of(&global().destroy_vm(VmHandle(handle as u32)))
}

/// Resets the instance at `handle` to its just-created state.
pub fn vm_reset(handle: i32) -> Status {
    status_of(&global().reset_vm(VmHandle(handle as u32)))
}

/// Executes a single step. Returns `OK` on a plain retirement, or the event code
/// (`HALTED`/`BREAKPOINT`/`EXCEPTION`) otherwise.
pub fn vm_step(handle: i32) -> i32 {
    match global().step(VmHandle(handle as u32)) {
        Ok(Some(event)) => event.code(),
        Ok(None) => Status::Ok as i32,
        Err(error) => Status::from(&error) as i32,
    }
}

/// Runs until termination, an event, or `max_instructions` steps (0 = unbounded).
pub fn vm_run(handle: i32, max_instructions: u64) -> i32 {
    match global().run(VmHandle(handle as u32), max_instructions) {
        Ok(Some(event)) => event.code(),
        Ok(None) => Status::Ok as i32,
        Err(error) => Status::from(&error) as i32,
    }
}

/// Copies out the full processor state.
pub fn vm_get_state(handle: i32, out_state: &mut ProcessorState) -> Status {
    match global().get_state(VmHandle(handle as u32)) {
        Ok(state) => {
            *out_state = state;
            Status::Ok
        }
        Err(error) => Status::from(&error),
    }
}

/// Reads a general-purpose register (`idx` in `0..32`).
pub fn vm_get_register(handle: i32, idx: u32, out_value: &mut u64) -> Status {
    match global().get_register(VmHandle(handle as u32), idx as usize) {
        Ok(value) => {
            *out_value = value;
            Status::Ok
        }
        Err(error) => Status::from(&error),
    }
}

/// Writes a general-purpose register (`idx` in `0..32`). Writes to index 0 succeed but are
/// discarded.
pub fn vm_set_register(handle: i32, idx: u32, value: u64) -> Status {
    status_of(&global().set_register(VmHandle(handle as u32), idx as usize, value))
}

/// Copies `bytes` into instance memory at `address` and sets `pc := address`.
pub fn vm_load_program(handle: i32, bytes: &[u8], address: u64) -> Status {
    status_of(&global().load_program(VmHandle(handle as u32), bytes, address))
}

/// Reads `len` bytes of instance memory starting at `address` into `out_buf`, replacing its
/// contents. `out_buf` is left untouched on failure.
pub fn vm_read_memory(handle: i32, address: u64, len: u64, out_buf: &mut Vec<u8>) -> Status {
    match global().read_memory(VmHandle(handle as u32), address, len) {
        Ok(bytes) => {
            *out_buf = bytes;
            Status::Ok
        }
        Err(error) => Status::from(&error),
    }
}

/// Writes `bytes` into instance memory starting at `address`.
pub fn vm_write_memory(handle: i32, address: u64, bytes: &[u8]) -> Status {
    status_of(&global().write_memory(VmHandle(handle as u32), address, bytes))
}

/// Sets a breakpoint at `address`.
pub fn vm_set_breakpoint(handle: i32, address: u64) -> Status {
    status_of(&global().set_breakpoint(VmHandle(handle as u32), address))
}

/// Clears the breakpoint at `address`.
pub fn vm_clear_breakpoint(handle: i32, address: u64) -> Status {
    status_of(&global().clear_breakpoint(VmHandle(handle as u32), address))
}

/// Reads a performance counter (`idx` in `0..8`).
pub fn vm_get_perf_counter(handle: i32, idx: u32, out_value: &mut u64) -> Status {
    match global().get_perf_counter(VmHandle(handle as u32), idx as usize) {
        Ok(value) => {
            *out_value = value;
            Status::Ok
        }
        Err(error) => Status::from(&error),
    }
}

/// Polls for a pending event without advancing execution. Writes the event code to
/// `out_event_type` and `0` to `out_event_data` (reserved for future event payloads) when an
/// event is pending, and leaves both untouched with `Status::Ok` when none is pending.
pub fn vm_poll_event(handle: i32, out_event_type: &mut i32, out_event_data: &mut u64) -> Status {
    match global().poll_event(VmHandle(handle as u32)) {
        Ok(Some(event)) => {
            *out_event_type = event.code();
            *out_event_data = 0;
            Status::Ok
        }
        Ok(None) => Status::Ok,
        Err(error) => Status::from(&error),
    }
}
