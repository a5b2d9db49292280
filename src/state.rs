//! This module provides the [`ProcessorState`] struct representing the register file and
//! control state of a single VM instance, along with the [`Flags`] and [`PerfCounter`] types
//! used to interpret its `flags` and `perf_counters` words.

use bitflags::bitflags;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// The number of general-purpose registers. R0 is hardwired to zero.
pub const NUM_GPRS: usize = 32;
/// The number of reserved vector register slots.
pub const NUM_VREGS: usize = 16;
/// The number of lanes in each vector register slot.
pub const NUM_VREG_LANES: usize = 4;
/// The number of performance counter slots.
pub const NUM_PERF_COUNTERS: usize = 8;

/// The default program counter a freshly created instance starts at.
pub const DEFAULT_ENTRY_POINT: u64 = 0x10000;

bitflags! {
    /// The processor status flags, addressed by bit position as defined by the ISA.
    pub struct Flags: u64 {
        /// The result of the last flag-setting operation was zero.
        const ZERO             = 1 << 0;
        /// The last operation produced a carry out.
        const CARRY            = 1 << 1;
        /// The last operation overflowed.
        const OVERFLOW         = 1 << 2;
        /// The result of the last flag-setting operation was negative.
        const NEGATIVE         = 1 << 3;
        /// Interrupts are enabled.
        const INTERRUPT_ENABLE = 1 << 4;
        /// The processor is in user mode.
        const USER_MODE        = 1 << 5;
        /// The instance has halted.
        const HALT             = 1 << 7;
    }
}

/// The defined performance counter slots. Indices not named here are reserved.
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, PartialEq)]
pub enum PerfCounter {
    /// Instructions retired since the last reset.
    InstructionsRetired = 0,
    /// Cycles elapsed since the last reset.
    Cycles = 1,
    /// L1 cache misses (unmodeled; stays zero).
    L1Miss = 2,
    /// L2 cache misses (unmodeled; stays zero).
    L2Miss = 3,
    /// Branch mispredictions (unmodeled; stays zero).
    BranchMispredict = 4,
    /// Pipeline stalls (unmodeled; stays zero).
    PipelineStall = 5,
    /// Completed memory operations (loads and stores).
    MemoryOps = 6,
    /// SIMD operations (unmodeled; stays zero).
    SimdOps = 7,
}

impl PerfCounter {
    /// Resolves a raw index in `0..8` to the named counter it addresses.
    pub fn from_index(idx: u32) -> Option<Self> {
        FromPrimitive::from_u32(idx)
    }
}

/// A single 4-lane vector register slot. Reserved: no opcode in this core reads or writes it.
pub type VReg = [u64; NUM_VREG_LANES];

/// The processor state record owned by each VM instance: program counter, stack pointer,
/// flags, the general-purpose and vector register files, performance counters, and the two
/// reserved control words.
#[derive(Clone, Debug)]
pub struct ProcessorState {
    /// The byte-addressed program counter. Must be 4-byte aligned at fetch time.
    pub pc: u64,
    /// The stack pointer.
    pub sp: u64,
    /// The processor status flags.
    pub flags: Flags,
    gprs: [u64; NUM_GPRS],
    /// The reserved vector register file.
    pub vregs: [VReg; NUM_VREGS],
    perf_counters: [u64; NUM_PERF_COUNTERS],
    /// A reserved cache-control word.
    pub cache_ctrl: u64,
    /// A reserved vector-base control word.
    pub vbase: u64,
}

impl ProcessorState {
    /// Builds the state a freshly created (or reset) instance starts with.
    pub fn new(memory_size: u64) -> Self {
        Self {
            pc: DEFAULT_ENTRY_POINT,
            sp: memory_size.saturating_sub(8),
            flags: Flags::empty(),
            gprs: [0; NUM_GPRS],
            vregs: [[0; NUM_VREG_LANES]; NUM_VREGS],
            perf_counters: [0; NUM_PERF_COUNTERS],
            cache_ctrl: 0,
            vbase: 0,
        }
    }

    /// Reads a general-purpose register. Always returns 0 for index 0.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 32`; callers must validate the index range first, as the embedding
    /// API does before ever reaching this accessor.
    #[inline]
    pub fn gpr(&self, index: usize) -> u64 {
        if index == 0 {
            0
        } else {
            self.gprs[index]
        }
    }

    /// Writes a general-purpose register. Writes to index 0 are silently discarded — this is
    /// the single centralized enforcement point for the R0-is-zero invariant; no caller needs
    /// to special-case it.
    #[inline]
    pub fn set_gpr(&mut self, index: usize, value: u64) {
        if index != 0 {
            self.gprs[index] = value;
        }
    }

    /// Reads a performance counter by raw index.
    #[inline]
    pub fn perf_counter(&self, index: usize) -> u64 {
        self.perf_counters[index]
    }

    /// Increments a performance counter by one.
    #[inline]
    pub fn bump_perf_counter(&mut self, counter: PerfCounter) {
        self.perf_counters[counter as usize] += 1;
    }
}
