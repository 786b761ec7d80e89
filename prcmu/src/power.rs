/*++

Licensed under the Apache-2.0 license.

File Name:

    power.rs

Abstract:

    AP power-state requests, the modem host-access handshake, system reset
    bookkeeping and the fixed TCDM status locations.

--*/

use std::sync::atomic::Ordering;
use std::time::Duration;

use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::{reg, tcdm};

use crate::error::Result;
use crate::types::{ApPowerState, RomcodeRead, RomcodeWrite};
use crate::wait::lock;
use crate::{Inner, Prcmu};

/// The modem handshake has a hardware-characterized worst case; it does
/// not follow the adaptive comm timeout.
const AC_WAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between the wake pulse and the host-access request, per the
/// hardware integration spec.
const AC_WAKE_PULSE_US: u64 = 31;

impl<M: Mmio> Inner<M> {
    /// Persist the hardware reset reason into TCDM so it survives an APE
    /// software reset. Called once at init, before the status register's
    /// context can be lost.
    pub(crate) fn persist_reset_code(&self) {
        let reset_type = self.io.reg_read(reg::PRCM_RESET_STATUS);
        if reset_type != reg::PRCM_RESET_STATUS_APE_SOFTWARE_RESET && reset_type != 0 {
            self.io
                .tcdm_write16(tcdm::PRCM_RESET_REASON, reset_type as u16);
        }
    }
}

impl<M: Mmio + 'static> Prcmu<M> {
    /// Request an AP power-state transition. Fire-and-forget: the outcome
    /// is reported through the wakeup event stream.
    pub fn set_power_state(
        &self,
        state: ApPowerState,
        keep_ulp_clk: bool,
        keep_ap_pll: bool,
    ) -> Result<()> {
        let inner = &self.inner;
        let _state = lock(&inner.mb0.lock);

        inner.claim(0, "power state request")?;

        inner
            .io
            .tcdm_write8(tcdm::PRCM_REQ_MB0_AP_POWER_STATE, state as u8);
        inner
            .io
            .tcdm_write8(tcdm::PRCM_REQ_MB0_AP_PLL_STATE, keep_ap_pll as u8);
        inner
            .io
            .tcdm_write8(tcdm::PRCM_REQ_MB0_ULP_CLOCK_STATE, keep_ulp_clk as u8);
        inner.io.tcdm_write8(tcdm::PRCM_REQ_MB0_DO_NOT_WFI, 0);
        inner
            .io
            .tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB0, tcdm::MB0H_POWER_STATE_TRANS);

        inner.fire(0);
        Ok(())
    }

    /// Status of the last power-state transition, from the mailbox 0 ack
    /// region.
    pub fn power_transition_status(&self) -> u8 {
        self.inner
            .io
            .tcdm_read8(tcdm::PRCM_ACK_MB0_AP_PWRSTTR_STATUS)
    }

    /// Wake the modem before host-initiated traffic. Raises the wake pulse,
    /// waits the mandated settle time, then requests host access and waits
    /// for the firmware's AC_WAKE_ACK event.
    pub fn ac_wake_req(&self) -> Result<()> {
        let inner = &self.inner;
        let _guard = lock(&inner.mb0.ac_wake_lock);

        let mut val = inner.io.reg_read(reg::PRCM_HOSTACCESS_REQ);
        if val & reg::PRCM_HOSTACCESS_REQ_HOSTACCESS_REQ != 0 {
            return Ok(());
        }

        inner.mb0.ac_wake_requested.store(true, Ordering::Relaxed);

        // Force the modem awake before the host-access ping-pong so it
        // cannot fall asleep while acknowledging.
        val |= reg::PRCM_HOSTACCESS_REQ_WAKE_REQ;
        inner.io.reg_write(reg::PRCM_HOSTACCESS_REQ, val);

        inner.wait.pause(AC_WAKE_PULSE_US);

        val |= reg::PRCM_HOSTACCESS_REQ_HOSTACCESS_REQ;
        inner.io.reg_write(reg::PRCM_HOSTACCESS_REQ, val);

        if !inner.mb0.ac_wake_work.wait_timeout(AC_WAKE_TIMEOUT) {
            return Err(inner.desync(0, "modem wake handshake"));
        }
        Ok(())
    }

    /// Tell the firmware the host no longer needs the modem awake.
    pub fn ac_sleep_req(&self) -> Result<()> {
        let inner = &self.inner;
        let _guard = lock(&inner.mb0.ac_wake_lock);

        let mut val = inner.io.reg_read(reg::PRCM_HOSTACCESS_REQ);
        if val & reg::PRCM_HOSTACCESS_REQ_HOSTACCESS_REQ == 0 {
            return Ok(());
        }

        val &= !(reg::PRCM_HOSTACCESS_REQ_HOSTACCESS_REQ | reg::PRCM_HOSTACCESS_REQ_WAKE_REQ);
        inner.io.reg_write(reg::PRCM_HOSTACCESS_REQ, val);

        if !inner.mb0.ac_wake_work.wait_timeout(AC_WAKE_TIMEOUT) {
            return Err(inner.desync(0, "modem sleep handshake"));
        }

        inner.mb0.ac_wake_requested.store(false, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_ac_wake_requested(&self) -> bool {
        self.inner.mb0.ac_wake_requested.load(Ordering::Relaxed)
    }

    /// Store the reset reason for retrieval after reboot, then request an
    /// APE software reset from the firmware.
    pub fn system_reset(&self, reset_code: u16) {
        self.inner
            .io
            .tcdm_write16(tcdm::PRCM_RESET_REASON, reset_code);
        self.inner.io.reg_write(reg::PRCM_APE_SOFTRST, 1);
    }

    /// The hardware event that caused the last reset.
    pub fn get_reset_type(&self) -> u32 {
        self.inner.io.reg_read(reg::PRCM_RESET_STATUS)
    }

    /// The reset reason: the hardware event if there was one, otherwise
    /// the software code stored by [`Prcmu::system_reset`] before the last
    /// restart.
    pub fn get_reset_code(&self) -> u16 {
        let reset_type = self.get_reset_type();
        if reset_type != reg::PRCM_RESET_STATUS_APE_SOFTWARE_RESET && reset_type != 0 {
            self.inner
                .io
                .tcdm_write16(tcdm::PRCM_RESET_REASON, reset_type as u16);
            return reset_type as u16;
        }
        self.inner.io.tcdm_read16(tcdm::PRCM_RESET_REASON)
    }

    pub fn get_boot_status(&self) -> u8 {
        self.inner.io.tcdm_read8(tcdm::PRCM_BOOT_STATUS)
    }

    /// Run a romcode power-state sequence.
    pub fn set_romcode_a2p(&self, value: RomcodeWrite) {
        self.inner.io.tcdm_write8(tcdm::PRCM_ROMCODE_A2P, value as u8);
    }

    /// The power-state transition the romcode last reported, if the byte
    /// decodes to a known value.
    pub fn get_romcode_p2a(&self) -> Option<RomcodeRead> {
        RomcodeRead::from_u8(self.inner.io.tcdm_read8(tcdm::PRCM_ROMCODE_P2A))
    }

    /// Current xp70 power mode byte.
    pub fn get_xp70_current_state(&self) -> u8 {
        self.inner.io.tcdm_read8(tcdm::PRCM_XP70_CUR_PWR_STATE)
    }

    /// Whether the AVS settings enable the ARM MAX operating point.
    pub fn has_arm_maxopp(&self) -> bool {
        self.inner.io.tcdm_read8(tcdm::PRCM_AVS_VARM_MAX_OPP) & tcdm::PRCM_AVS_ISMODEENABLE_MASK
            != 0
    }
}
