//! This module provides the [`Registry`]: a bounded pool of VM instance slots addressable by an
//! opaque [`VmHandle`], collecting what used to be a global instance table into a single owned
//! value a host can construct more than one of.

use log::debug;

use crate::error::Error;
use crate::instance::{Instance, VmId};

/// The maximum number of simultaneously live VM instances.
pub const MAX_INSTANCES: usize = 256;

/// An opaque handle identifying a VM instance within a [`Registry`]. Small integers, not raw
/// pointers, so they cross an FFI boundary safely.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VmHandle(pub u32);

/// A bounded pool of VM instance slots. Each created instance claims the lowest free slot; the
/// handle equals that slot index and is stable until the instance is destroyed.
pub struct Registry {
    slots: Vec<Option<Instance>>,
    next_vm_id: u64,
}

impl Registry {
    /// An empty registry with capacity for [`MAX_INSTANCES`] instances.
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(MAX_INSTANCES);
        slots.resize_with(MAX_INSTANCES, || None);

        Self {
            slots,
            next_vm_id: 1,
        }
    }

    /// Creates a new instance, claiming the lowest free slot. Fails with
    /// [`Error::RegistryFull`] if all 256 slots are occupied.
    pub fn create(&mut self, memory_size: u64) -> Result<VmHandle, Error> {
        let slot = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(Error::RegistryFull)?;

        let id = VmId(self.next_vm_id);
        self.next_vm_id += 1;

        let instance = Instance::new(memory_size, id)?;
        self.slots[slot] = Some(instance);

        debug!("created vm handle={slot} id={} memory_size={memory_size:#x}", id.0);

        Ok(VmHandle(slot as u32))
    }

    /// Releases the instance at `handle`, freeing its slot for reuse.
    pub fn destroy(&mut self, handle: VmHandle) -> Result<(), Error> {
        let slot = self.slot_mut(handle)?;
        *slot = None;

        debug!("destroyed vm handle={}", handle.0);

        Ok(())
    }

    /// Looks up the instance at `handle`.
    pub fn get(&self, handle: VmHandle) -> Result<&Instance, Error> {
        self.slots
            .get(handle.0 as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(Error::InvalidHandle)
    }

    /// Looks up the instance at `handle`, mutably.
    pub fn get_mut(&mut self, handle: VmHandle) -> Result<&mut Instance, Error> {
        self.slot_mut(handle)?.as_mut().ok_or(Error::InvalidHandle)
    }

    fn slot_mut(&mut self, handle: VmHandle) -> Result<&mut Option<Instance>, Error> {
        self.slots
            .get_mut(handle.0 as usize)
            .ok_or(Error::InvalidHandle)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
