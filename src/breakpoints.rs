//! This module provides the [`Breakpoints`] set: a small, deduplicating, bounded collection of
//! instruction addresses at which the step loop pauses before execution.

use std::collections::BTreeSet;

use crate::error::Error;

/// The maximum number of distinct breakpoints an instance may have set at once.
pub const MAX_BREAKPOINTS: usize = 64;

/// A bounded, deduplicating set of breakpoint addresses.
///
/// Deduplicating on insert makes `len()` an honest count of distinct addresses and makes
/// `clear` remove the address outright rather than one of several copies of it.
#[derive(Clone, Debug, Default)]
pub struct Breakpoints {
    addresses: BTreeSet<u64>,
}

impl Breakpoints {
    /// An empty breakpoint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a breakpoint at `address`. A duplicate is a harmless no-op. Fails once 64 distinct
    /// addresses are already present.
    pub fn set(&mut self, address: u64) -> Result<(), Error> {
        if self.addresses.contains(&address) {
            return Ok(());
        }

        if self.addresses.len() >= MAX_BREAKPOINTS {
            return Err(Error::BreakpointLimitReached);
        }

        self.addresses.insert(address);

        Ok(())
    }

    /// Clears the breakpoint at `address`. Fails if none was set there.
    pub fn clear(&mut self, address: u64) -> Result<(), Error> {
        if self.addresses.remove(&address) {
            Ok(())
        } else {
            Err(Error::BreakpointNotFound)
        }
    }

    /// Whether a breakpoint is set at `address`.
    #[inline]
    pub fn contains(&self, address: u64) -> bool {
        self.addresses.contains(&address)
    }

    /// Removes every breakpoint, as performed by `reset`.
    pub fn clear_all(&mut self) {
        self.addresses.clear();
    }

    /// The number of distinct breakpoints currently set.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether no breakpoints are set.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
