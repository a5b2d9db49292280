//! This module provides the [`Memory`] struct, the flat byte-addressed memory region owned by
//! each VM instance.

use crate::error::Error;

/// A fixed-size, zero-initialized, byte-addressed memory region.
///
/// `Memory` performs a single bounds check per access (`address + len <= size`) and exposes
/// both a raw byte-slice interface for the embedding API and little-endian word accessors for
/// the decoder's fetch path and the executor's `ST` opcode.
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Allocates a new zeroed region of the given size. `size` must be non-zero.
    pub fn new(size: u64) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::InvalidArgument("memory_size must be non-zero".into()));
        }

        let size = usize::try_from(size)
            .map_err(|_| Error::InvalidArgument("memory_size out of range".into()))?;

        Ok(Self {
            bytes: vec![0u8; size],
        })
    }

    /// The size of this region in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    #[inline]
    fn check_bounds(&self, address: u64, len: u64) -> Result<(), Error> {
        let end = address
            .checked_add(len)
            .ok_or_else(|| Error::InvalidArgument("address + len overflowed".into()))?;

        if end > self.len() {
            return Err(Error::InvalidArgument(format!(
                "access [{address:#x}, {end:#x}) is out of range for a {}-byte region",
                self.bytes.len()
            )));
        }

        Ok(())
    }

    /// Copies `len` bytes starting at `address` out of the region.
    pub fn read(&self, address: u64, len: u64) -> Result<Vec<u8>, Error> {
        self.check_bounds(address, len)?;

        let start = address as usize;
        let end = start + len as usize;

        Ok(self.bytes[start..end].to_vec())
    }

    /// Copies `data` into the region starting at `address`.
    pub fn write(&mut self, address: u64, data: &[u8]) -> Result<(), Error> {
        self.check_bounds(address, data.len() as u64)?;

        let start = address as usize;
        let end = start + data.len();

        self.bytes[start..end].copy_from_slice(data);

        Ok(())
    }

    /// Fetches a little-endian 32-bit instruction word at `address`, without the alignment or
    /// access-fault handling the step loop layers on top.
    pub fn read_u32_le(&self, address: u64) -> Result<u32, Error> {
        self.check_bounds(address, 4)?;

        let start = address as usize;
        let bytes: [u8; 4] = self.bytes[start..start + 4].try_into().unwrap();

        Ok(u32::from_le_bytes(bytes))
    }

    /// Stores a little-endian 64-bit word at `address`, used by the `ST` opcode.
    pub fn write_u64_le(&mut self, address: u64, value: u64) -> Result<(), Error> {
        self.check_bounds(address, 8)?;

        let start = address as usize;
        self.bytes[start..start + 8].copy_from_slice(&value.to_le_bytes());

        Ok(())
    }
}
