/*++

Licensed under the Apache-2.0 license.

File Name:

    ab8500.rs

Abstract:

    Firmware-mediated I2C access to the AB8500 analog baseband over
    mailbox 5. The current firmware handles single-register transfers
    only.

--*/

use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::tcdm;

use crate::error::{Error, Result};
use crate::wait::lock;
use crate::Prcmu;

impl<M: Mmio + 'static> Prcmu<M> {
    /// Read one ABB register.
    pub fn abb_read(&self, slave: u8, reg: u8) -> Result<u8> {
        let inner = &self.inner;
        let _guard = lock(&inner.mb5.lock);

        inner.claim(5, "ABB register read")?;

        inner
            .io
            .tcdm_write8(tcdm::PRCM_REQ_MB5_I2C_SLAVE_OP, tcdm::i2c_read_op(slave));
        inner
            .io
            .tcdm_write8(tcdm::PRCM_REQ_MB5_I2C_HW_BITS, tcdm::PRCMU_I2C_STOP_EN);
        inner.io.tcdm_write8(tcdm::PRCM_REQ_MB5_I2C_REG, reg);
        inner.io.tcdm_write8(tcdm::PRCM_REQ_MB5_I2C_VAL, 0);

        inner.fire(5);
        inner.wait_reply(5, &inner.mb5.work, "ABB register read")?;

        let ack = *lock(&inner.mb5.ack);
        if ack.status != tcdm::I2C_RD_OK {
            return Err(Error::I2c { status: ack.status });
        }
        Ok(ack.value)
    }

    /// Write one ABB register.
    pub fn abb_write(&self, slave: u8, reg: u8, value: u8) -> Result<()> {
        let inner = &self.inner;
        let _guard = lock(&inner.mb5.lock);

        inner.claim(5, "ABB register write")?;

        inner
            .io
            .tcdm_write8(tcdm::PRCM_REQ_MB5_I2C_SLAVE_OP, tcdm::i2c_write_op(slave));
        inner
            .io
            .tcdm_write8(tcdm::PRCM_REQ_MB5_I2C_HW_BITS, tcdm::PRCMU_I2C_STOP_EN);
        inner.io.tcdm_write8(tcdm::PRCM_REQ_MB5_I2C_REG, reg);
        inner.io.tcdm_write8(tcdm::PRCM_REQ_MB5_I2C_VAL, value);

        inner.fire(5);
        inner.wait_reply(5, &inner.mb5.work, "ABB register write")?;

        let ack = *lock(&inner.mb5.ack);
        if ack.status != tcdm::I2C_WR_OK {
            return Err(Error::I2c { status: ack.status });
        }
        Ok(())
    }
}
