/*++

Licensed under the Apache-2.0 license.

File Name:

    epod.rs

Abstract:

    Power-domain (EPOD) control over mailbox 2, and the autonomous
    power-management configuration shared with the firmware through TCDM.

--*/

use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::tcdm;

use crate::error::{Error, Result};
use crate::types::{AutoPmConfig, EpodId, EpodState, NUM_EPOD_ID};
use crate::wait::lock;
use crate::Prcmu;

impl<M: Mmio + 'static> Prcmu<M> {
    /// Set the state of one power domain. RAM retention is only a valid
    /// request for domains that have retainable RAM.
    pub fn set_epod(&self, epod: EpodId, state: EpodState) -> Result<()> {
        if state == EpodState::RamRetention && !epod.supports_ram_retention() {
            return Err(Error::InvalidArgument);
        }

        let inner = &self.inner;
        let _guard = lock(&inner.mb2.lock);

        inner.claim(2, "power domain request")?;

        // One state byte per domain; untouched domains get NoChange.
        for i in 0..NUM_EPOD_ID as u32 {
            inner
                .io
                .tcdm_write8(tcdm::PRCM_REQ_MB2 + i, EpodState::NoChange as u8);
        }
        inner
            .io
            .tcdm_write8(tcdm::PRCM_REQ_MB2 + epod as u32, state as u8);

        inner
            .io
            .tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB2, tcdm::MB2H_DPS);

        inner.fire(2);
        inner.wait_reply(2, &inner.mb2.work, "power domain request")?;

        if *lock(&inner.mb2.ack_status) != tcdm::HWACC_PWR_ST_OK {
            return Err(inner.desync(2, "power domain status mismatch"));
        }
        Ok(())
    }

    /// Configure autonomous power management for ApSleep and ApIdle. The
    /// packed words are shared variables in the mailbox 2 request region;
    /// no message is sent.
    pub fn configure_auto_pm(&self, sleep: &AutoPmConfig, idle: &AutoPmConfig) {
        let inner = &self.inner;
        let mut enabled = lock(&inner.mb2.auto_pm);

        inner
            .io
            .tcdm_write32(tcdm::PRCM_REQ_MB2_AUTO_PM_SLEEP, sleep.pack());
        inner
            .io
            .tcdm_write32(tcdm::PRCM_REQ_MB2_AUTO_PM_IDLE, idle.pack());

        *enabled = sleep.enables_auto_pm() || idle.enables_auto_pm();
    }

    pub fn is_auto_pm_enabled(&self) -> bool {
        *lock(&self.inner.mb2.auto_pm)
    }
}
