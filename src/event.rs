//! This module provides the [`Event`] enum, the closed set of non-error outcomes the step/run
//! loop can report.

/// A notable execution outcome reported by [`crate::instance::Instance::step`] or
/// [`crate::instance::Instance::run`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    /// The instance executed a `HALT`, or a fatal fault forced it to halt.
    Halted,
    /// The program counter reached a breakpointed address; the instruction there was not
    /// executed.
    Breakpoint,
    /// An unknown opcode was fetched, or the program counter or a memory access went out of
    /// range during execution.
    Exception,
    /// Reserved for a future device-interrupt source. The core never produces this variant.
    DeviceInterrupt,
}

impl Event {
    /// The numeric event code from the embedding API (`HALTED=0, BREAKPOINT=1, EXCEPTION=2,
    /// DEVICE_INTERRUPT=3`).
    pub fn code(self) -> i32 {
        match self {
            Event::Halted => 0,
            Event::Breakpoint => 1,
            Event::Exception => 2,
            Event::DeviceInterrupt => 3,
        }
    }
}
