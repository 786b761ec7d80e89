/*++

Licensed under the Apache-2.0 license.

File Name:

    ram.rs

Abstract:

    File contains implementation of RAM backing storage.

--*/

use crate::AccessSize;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusError {
    /// Load address misaligned
    LoadAddrMisaligned,

    /// Load access fault
    LoadAccessFault,

    /// Store address misaligned
    StoreAddrMisaligned,

    /// Store access fault
    StoreAccessFault,
}

/// Random access memory device, little-endian.
pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    /// Create new RAM filled with zeroes.
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the RAM in bytes
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Immutable view of the backing bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read data of specified size from given address.
    ///
    /// # Error
    ///
    /// * `BusError` - `LoadAccessFault` or `LoadAddrMisaligned`
    pub fn read(&self, size: AccessSize, addr: u32) -> Result<u32, BusError> {
        let addr = addr as usize;
        let width = size as usize;
        if addr % width != 0 {
            return Err(BusError::LoadAddrMisaligned);
        }
        let Some(bytes) = self.data.get(addr..addr + width) else {
            return Err(BusError::LoadAccessFault);
        };
        let mut val: u32 = 0;
        for (i, byte) in bytes.iter().enumerate() {
            val |= (*byte as u32) << (i * 8);
        }
        Ok(val)
    }

    /// Write data of specified size to given address.
    ///
    /// # Error
    ///
    /// * `BusError` - `StoreAccessFault` or `StoreAddrMisaligned`
    pub fn write(&mut self, size: AccessSize, addr: u32, val: u32) -> Result<(), BusError> {
        let addr = addr as usize;
        let width = size as usize;
        if addr % width != 0 {
            return Err(BusError::StoreAddrMisaligned);
        }
        let Some(bytes) = self.data.get_mut(addr..addr + width) else {
            return Err(BusError::StoreAccessFault);
        };
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (val >> (i * 8)) as u8;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut ram = Ram::new(16);
        ram.write(AccessSize::Word, 4, 0xDEAD_BEEF).unwrap();
        assert_eq!(ram.read(AccessSize::Word, 4).unwrap(), 0xDEAD_BEEF);
        assert_eq!(ram.read(AccessSize::Byte, 4).unwrap(), 0xEF);
        assert_eq!(ram.read(AccessSize::HalfWord, 6).unwrap(), 0xDEAD);
    }

    #[test]
    fn test_faults() {
        let mut ram = Ram::new(8);
        assert_eq!(
            ram.read(AccessSize::Word, 8).err(),
            Some(BusError::LoadAccessFault)
        );
        assert_eq!(
            ram.read(AccessSize::Word, 2).err(),
            Some(BusError::LoadAddrMisaligned)
        );
        assert_eq!(
            ram.write(AccessSize::HalfWord, 7, 0).err(),
            Some(BusError::StoreAddrMisaligned)
        );
        assert_eq!(
            ram.write(AccessSize::Word, 12, 0).err(),
            Some(BusError::StoreAccessFault)
        );
    }
}
