//! This module provides [`Runtime`], the single type embedding hosts drive: it owns the
//! process-wide [`Registry`] behind a lock and exposes the embedding API as inherent methods.

use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::error::Error;
use crate::event::Event;
use crate::registry::{Registry, VmHandle};
use crate::state::{ProcessorState, DEFAULT_ENTRY_POINT};

/// The smallest `memory_size` a `Runtime` will accept: large enough that the default entry
/// point (`0x10000`) plus one instruction word fits inside it, so the very first fetch does not
/// immediately fault. `create_vm` rejects smaller sizes with [`Error::InvalidArgument`] rather
/// than silently accepting a DOA instance.
pub const MIN_MEMORY_SIZE: u64 = DEFAULT_ENTRY_POINT + 4;

/// The embedding API's entry point: owns every live VM instance behind a single lock covering
/// create/destroy and per-instance access alike, trading away fine-grained per-instance locking
/// for coarse-grained simplicity.
pub struct Runtime {
    registry: Mutex<Registry>,
}

impl Runtime {
    /// Constructs a fresh, empty runtime. Idempotent in the sense that constructing one performs
    /// no global mutation beyond its own state — safe to call as many times as a host likes.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
        }
    }

    /// Creates a new VM instance with `memory_size` bytes of zeroed memory.
    pub fn create_vm(&self, memory_size: u64) -> Result<VmHandle, Error> {
        if memory_size < MIN_MEMORY_SIZE {
            return Err(Error::InvalidArgument(format!(
                "memory_size must be at least {MIN_MEMORY_SIZE:#x} so the default entry point fits"
            )));
        }

        self.registry.lock().unwrap().create(memory_size)
    }

    /// Destroys the instance at `handle`, releasing its memory. The handle is invalid afterward.
    pub fn destroy_vm(&self, handle: VmHandle) -> Result<(), Error> {
        self.registry.lock().unwrap().destroy(handle)
    }

    /// Resets the instance at `handle` to its just-created state.
    pub fn reset_vm(&self, handle: VmHandle) -> Result<(), Error> {
        self.registry.lock().unwrap().get_mut(handle)?.reset();
        Ok(())
    }

    /// Executes a single fetch/decode/execute step.
    pub fn step(&self, handle: VmHandle) -> Result<Option<Event>, Error> {
        Ok(self.registry.lock().unwrap().get_mut(handle)?.step())
    }

    /// Runs until halt, a breakpoint/exception event, or (if non-zero) `max_instructions` steps
    /// have retired.
    pub fn run(&self, handle: VmHandle, max_instructions: u64) -> Result<Option<Event>, Error> {
        Ok(self
            .registry
            .lock()
            .unwrap()
            .get_mut(handle)?
            .run(max_instructions))
    }

    /// Copies out the full processor state.
    pub fn get_state(&self, handle: VmHandle) -> Result<ProcessorState, Error> {
        Ok(self.registry.lock().unwrap().get(handle)?.state().clone())
    }

    /// Reads a general-purpose register (`idx` in `0..32`).
    pub fn get_register(&self, handle: VmHandle, idx: usize) -> Result<u64, Error> {
        self.registry.lock().unwrap().get(handle)?.get_register(idx)
    }

    /// Writes a general-purpose register (`idx` in `0..32`). Writing index 0 succeeds but is
    /// discarded.
    pub fn set_register(&self, handle: VmHandle, idx: usize, value: u64) -> Result<(), Error> {
        self.registry
            .lock()
            .unwrap()
            .get_mut(handle)?
            .set_register(idx, value)
    }

    /// Copies `data` into instance memory at `address` and sets `pc := address`.
    pub fn load_program(&self, handle: VmHandle, data: &[u8], address: u64) -> Result<(), Error> {
        self.registry
            .lock()
            .unwrap()
            .get_mut(handle)?
            .load_program(data, address)
    }

    /// Reads `len` bytes of instance memory starting at `address`.
    pub fn read_memory(&self, handle: VmHandle, address: u64, len: u64) -> Result<Vec<u8>, Error> {
        self.registry.lock().unwrap().get(handle)?.read_memory(address, len)
    }

    /// Writes `data` into instance memory starting at `address`.
    pub fn write_memory(&self, handle: VmHandle, address: u64, data: &[u8]) -> Result<(), Error> {
        self.registry
            .lock()
            .unwrap()
            .get_mut(handle)?
            .write_memory(address, data)
    }

    /// Sets a breakpoint at `address`.
    pub fn set_breakpoint(&self, handle: VmHandle, address: u64) -> Result<(), Error> {
        self.registry
            .lock()
            .unwrap()
            .get_mut(handle)?
            .set_breakpoint(address)
    }

    /// Clears the breakpoint at `address`.
    pub fn clear_breakpoint(&self, handle: VmHandle, address: u64) -> Result<(), Error> {
        self.registry
            .lock()
            .unwrap()
            .get_mut(handle)?
            .clear_breakpoint(address)
    }

    /// Reads a performance counter (`idx` in `0..8`).
    pub fn get_perf_counter(&self, handle: VmHandle, idx: usize) -> Result<u64, Error> {
        self.registry
            .lock()
            .unwrap()
            .get(handle)?
            .get_perf_counter(idx)
    }

    /// Polls for a pending event without advancing execution.
    pub fn poll_event(&self, handle: VmHandle) -> Result<Option<Event>, Error> {
        Ok(self.registry.lock().unwrap().get(handle)?.poll_event())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide singleton `Runtime` backing the free-function surface in [`crate::api`].
pub fn global() -> &'static Runtime {
    static RUNTIME: Lazy<Runtime> = Lazy::new(Runtime::new);
    &RUNTIME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_memory_too_small_for_default_entry_point() {
        let runtime = Runtime::new();
        assert!(runtime.create_vm(0x100).is_err());
    }

    #[test]
    fn reset_clears_halted_and_breakpoints_but_preserves_memory_size() {
        let runtime = Runtime::new();
        let handle = runtime.create_vm(1 << 20).unwrap();

        // HALT opcode.
        runtime.load_program(handle, &(0x21u32 << 26).to_le_bytes(), 0x10000).unwrap();
        runtime.run(handle, 0).unwrap();

        runtime.reset_vm(handle).unwrap();

        let state = runtime.get_state(handle).unwrap();
        assert_eq!(state.pc, DEFAULT_ENTRY_POINT);
        assert_eq!(state.perf_counter(0), 0);
    }

    #[test]
    fn reset_twice_equals_reset_once() {
        let runtime = Runtime::new();
        let handle = runtime.create_vm(1 << 20).unwrap();
        runtime.set_register(handle, 4, 77).unwrap();

        runtime.reset_vm(handle).unwrap();
        let after_one = runtime.get_state(handle).unwrap();

        runtime.reset_vm(handle).unwrap();
        let after_two = runtime.get_state(handle).unwrap();

        assert_eq!(after_one.pc, after_two.pc);
        assert_eq!(after_one.sp, after_two.sp);
    }
}
