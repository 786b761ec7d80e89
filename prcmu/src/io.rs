/*++

Licensed under the Apache-2.0 license.

File Name:

    io.rs

Abstract:

    Access layer over the two PRCMU address windows.

--*/

use std::sync::Mutex;

use ux500_emu_bus::{AccessSize, Mmio};

use crate::wait::lock;

/// Window base addresses the driver operates on.
#[derive(Debug, Clone, Copy)]
pub struct PrcmuMap {
    pub reg_base: u32,
    pub tcdm_base: u32,
}

impl Default for PrcmuMap {
    fn default() -> Self {
        Self {
            reg_base: ux500_prcmu_regs::PRCMU_REG_BASE,
            tcdm_base: ux500_prcmu_regs::PRCMU_TCDM_BASE,
        }
    }
}

pub(crate) struct Io<M> {
    mmio: M,
    map: PrcmuMap,
    /// Serializes read-modify-write register updates.
    rmw_lock: Mutex<()>,
}

impl<M: Mmio> Io<M> {
    pub fn new(mmio: M, map: PrcmuMap) -> Self {
        Self {
            mmio,
            map,
            rmw_lock: Mutex::new(()),
        }
    }

    pub fn reg_read(&self, offset: u32) -> u32 {
        self.mmio.read(AccessSize::Word, self.map.reg_base + offset)
    }

    pub fn reg_write(&self, offset: u32, value: u32) {
        self.mmio
            .write(AccessSize::Word, self.map.reg_base + offset, value);
    }

    pub fn reg_read8(&self, offset: u32) -> u8 {
        self.mmio.read(AccessSize::Byte, self.map.reg_base + offset) as u8
    }

    pub fn reg_write8(&self, offset: u32, value: u8) {
        self.mmio.write(
            AccessSize::Byte,
            self.map.reg_base + offset,
            u32::from(value),
        );
    }

    pub fn reg_write_masked(&self, offset: u32, mask: u32, value: u32) {
        let _guard = lock(&self.rmw_lock);
        let val = self.reg_read(offset);
        self.reg_write(offset, (val & !mask) | (value & mask));
    }

    pub fn tcdm_read8(&self, offset: u32) -> u8 {
        self.mmio
            .read(AccessSize::Byte, self.map.tcdm_base + offset) as u8
    }

    pub fn tcdm_write8(&self, offset: u32, value: u8) {
        self.mmio.write(
            AccessSize::Byte,
            self.map.tcdm_base + offset,
            u32::from(value),
        );
    }

    pub fn tcdm_read16(&self, offset: u32) -> u16 {
        self.mmio
            .read(AccessSize::HalfWord, self.map.tcdm_base + offset) as u16
    }

    pub fn tcdm_write16(&self, offset: u32, value: u16) {
        self.mmio.write(
            AccessSize::HalfWord,
            self.map.tcdm_base + offset,
            u32::from(value),
        );
    }

    pub fn tcdm_read32(&self, offset: u32) -> u32 {
        self.mmio
            .read(AccessSize::Word, self.map.tcdm_base + offset)
    }

    pub fn tcdm_write32(&self, offset: u32, value: u32) {
        self.mmio
            .write(AccessSize::Word, self.map.tcdm_base + offset, value);
    }
}
