//! The nanocore crate provides an in-process virtual machine for NanoCore, a fixed-width,
//! 32-bit-encoded, 64-bit-wordsize RISC-style instruction set. It executes programs expressed
//! as sequences of 32-bit instructions against an isolated linear memory and a bank of
//! general-purpose and auxiliary registers, while exposing deterministic state inspection and
//! control points for embedding tools such as debuggers and profilers.
//!
//! This crate supports:
//!  * Creating and independently driving up to 256 isolated VM instances through the
//!    [`Runtime`].
//!  * Single-instruction stepping and budgeted running, with pre-execution breakpoints for
//!    debuggers.
//!  * Direct inspection of registers, memory, flags, and performance counters between steps.
//!
//! ```
//! use nanocore::Runtime;
//!
//! let runtime = Runtime::new();
//! let handle = runtime.create_vm(1 << 20).unwrap();
//!
//! // HALT: opcode 0x21 in the top 6 bits.
//! let program = (0x21u32 << 26).to_le_bytes();
//! runtime.load_program(handle, &program, 0x10000).unwrap();
//!
//! let event = runtime.run(handle, 0).unwrap();
//! assert_eq!(event, Some(nanocore::Event::Halted));
//! ```

pub mod api;
pub mod breakpoints;
pub mod decode;
pub mod error;
pub mod event;
pub mod exec;
pub mod instance;
pub mod memory;
pub mod registry;
pub mod runtime;
pub mod state;

pub use error::Error;
pub use event::Event;
pub use instance::{Instance, VmId};
pub use registry::{Registry, VmHandle};
pub use runtime::Runtime;
pub use state::{Flags, PerfCounter, ProcessorState};
