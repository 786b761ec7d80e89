/*++

Licensed under the Apache-2.0 license.

File Name:

    dvfs.rs

Abstract:

    Operating-point control over mailbox 1: ARM and APE OPP, the
    reference-counted APE-100% voltage request, USB wakeup release, modem
    reset and the PLL-SOC1 on/off request. Also the register-backed DDR
    OPP.

--*/

use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::{reg, tcdm};

use crate::error::{Error, Result};
use crate::types::{ApeOpp, ArmOpp, DdrOpp};
use crate::wait::lock;
use crate::{Inner, Prcmu};

impl<M: Mmio + 'static> Prcmu<M> {
    /// Set the ARM operating point and verify the firmware applied it.
    pub fn set_arm_opp(&self, opp: ArmOpp) -> Result<()> {
        let inner = &self.inner;
        let _state = lock(&inner.mb1.lock);

        inner.claim(1, "ARM OPP request")?;

        inner
            .io
            .tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB1, tcdm::MB1H_ARM_APE_OPP);
        inner.io.tcdm_write8(tcdm::PRCM_REQ_MB1_ARM_OPP, opp as u8);
        inner
            .io
            .tcdm_write8(tcdm::PRCM_REQ_MB1_APE_OPP, ApeOpp::NoChange as u8);

        inner.fire(1);
        inner.wait_reply(1, &inner.mb1.work, "ARM OPP request")?;

        let ack = *lock(&inner.mb1.ack);
        if ack.header != tcdm::MB1H_ARM_APE_OPP || ack.arm_opp != opp as u8 {
            return Err(inner.desync(1, "ARM OPP acknowledgment mismatch"));
        }
        Ok(())
    }

    /// The ARM operating point the firmware last reported.
    pub fn get_arm_opp(&self) -> u8 {
        self.inner.io.tcdm_read8(tcdm::PRCM_ACK_MB1_CURRENT_ARM_OPP)
    }

    /// Set the APE operating point. `Opp50Partly25` additionally halves the
    /// ACLK/DMACLK interconnect dividers around the firmware request; only
    /// transitions touching `Opp100` are sent to the firmware at all.
    pub fn set_ape_opp(&self, opp: ApeOpp) -> Result<()> {
        let inner = &self.inner;
        let mut state = lock(&inner.mb1.lock);

        if state.ape_opp == opp {
            return Ok(());
        }

        if state.ape_opp == ApeOpp::Opp50Partly25 {
            inner.request_even_slower_clocks(false)?;
        }

        let mut result = Ok(());
        if opp == ApeOpp::Opp100 || state.ape_opp == ApeOpp::Opp100 {
            result = (|| {
                inner.claim(1, "APE OPP request")?;

                let wire = opp.wire_value();
                inner
                    .io
                    .tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB1, tcdm::MB1H_ARM_APE_OPP);
                inner
                    .io
                    .tcdm_write8(tcdm::PRCM_REQ_MB1_ARM_OPP, ArmOpp::NoChange as u8);
                inner.io.tcdm_write8(tcdm::PRCM_REQ_MB1_APE_OPP, wire);

                inner.fire(1);
                inner.wait_reply(1, &inner.mb1.work, "APE OPP request")?;

                let ack = *lock(&inner.mb1.ack);
                if ack.header != tcdm::MB1H_ARM_APE_OPP || ack.ape_opp != wire {
                    return Err(inner.desync(1, "APE OPP acknowledgment mismatch"));
                }
                Ok(())
            })();
        }

        match &result {
            Ok(()) if opp == ApeOpp::Opp50Partly25 => {
                inner.request_even_slower_clocks(true)?;
            }
            // Re-enter the partial state if the new OPP failed to apply.
            Err(_) if state.ape_opp == ApeOpp::Opp50Partly25 => {
                inner.request_even_slower_clocks(true)?;
            }
            _ => {}
        }

        if result.is_ok() {
            state.ape_opp = opp;
        }
        result
    }

    /// The APE operating point the firmware last reported.
    pub fn get_ape_opp(&self) -> u8 {
        self.inner.io.tcdm_read8(tcdm::PRCM_ACK_MB1_CURRENT_APE_OPP)
    }

    /// Request or release the voltage needed for APE OPP 100%. Requests
    /// are counted; the firmware sees only the 0->1 and 1->0 edges. A
    /// release with no outstanding request is an error.
    pub fn request_ape_opp_100_voltage(&self, enable: bool) -> Result<()> {
        let inner = &self.inner;
        let mut state = lock(&inner.mb1.lock);

        let header = if enable {
            state.ape_opp100_requests += 1;
            if state.ape_opp100_requests != 1 {
                return Ok(());
            }
            tcdm::MB1H_REQUEST_APE_OPP_100_VOLT
        } else {
            if state.ape_opp100_requests == 0 {
                return Err(Error::Unbalanced);
            }
            state.ape_opp100_requests -= 1;
            if state.ape_opp100_requests != 0 {
                return Ok(());
            }
            tcdm::MB1H_RELEASE_APE_OPP_100_VOLT
        };

        inner.claim(1, "APE voltage request")?;

        inner.io.tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB1, header);

        inner.fire(1);
        inner.wait_reply(1, &inner.mb1.work, "APE voltage request")?;

        let ack = *lock(&inner.mb1.ack);
        if ack.header != header || ack.ape_voltage_status & 1 != 0 {
            return Err(inner.desync(1, "APE voltage acknowledgment mismatch"));
        }
        Ok(())
    }

    /// Release the power-state requirements of a USB wakeup.
    pub fn release_usb_wakeup_state(&self) -> Result<()> {
        let inner = &self.inner;
        let _state = lock(&inner.mb1.lock);

        inner.claim(1, "USB wakeup release")?;

        inner
            .io
            .tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB1, tcdm::MB1H_RELEASE_USB_WAKEUP);

        inner.fire(1);
        inner.wait_reply(1, &inner.mb1.work, "USB wakeup release")?;

        let ack = *lock(&inner.mb1.ack);
        if ack.header != tcdm::MB1H_RELEASE_USB_WAKEUP || ack.ape_voltage_status & 1 != 0 {
            return Err(inner.desync(1, "USB wakeup release acknowledgment mismatch"));
        }
        Ok(())
    }

    /// Ask the firmware to reset the modem. The modem's reset state is
    /// tracked above this driver, so the ack carries no status to check.
    pub fn modem_reset(&self) -> Result<()> {
        let inner = &self.inner;
        let _state = lock(&inner.mb1.lock);

        inner.claim(1, "modem reset")?;

        inner
            .io
            .tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB1, tcdm::MB1H_RESET_MODEM);

        inner.fire(1);
        inner.wait_reply(1, &inner.mb1.work, "modem reset")
    }

    /// Set the DDR operating point through the bandwidth request register.
    pub fn set_ddr_opp(&self, opp: DdrOpp) {
        self.inner
            .io
            .reg_write8(reg::PRCM_DDR_SUBSYS_APE_MINBW, opp as u8);
    }

    pub fn get_ddr_opp(&self) -> u8 {
        self.inner.io.reg_read8(reg::PRCM_DDR_SUBSYS_APE_MINBW)
    }
}

impl<M: Mmio> Inner<M> {
    /// Reference-counted PLL-SOC1 enable over mailbox 1; the firmware sees
    /// only the edges.
    pub(crate) fn request_pll_soc1(&self, enable: bool) -> Result<()> {
        let mut state = lock(&self.mb1.lock);

        let value = if enable {
            state.pll_soc1_requests += 1;
            if state.pll_soc1_requests != 1 {
                return Ok(());
            }
            tcdm::PLL_SOC1_ON
        } else {
            if state.pll_soc1_requests == 0 {
                return Err(Error::Unbalanced);
            }
            state.pll_soc1_requests -= 1;
            if state.pll_soc1_requests != 0 {
                return Ok(());
            }
            tcdm::PLL_SOC1_OFF
        };

        self.claim(1, "PLL on/off request")?;

        self.io
            .tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB1, tcdm::MB1H_PLL_ON_OFF);
        self.io.tcdm_write8(tcdm::PRCM_REQ_MB1_PLL_ON_OFF, value);

        self.fire(1);
        self.wait_reply(1, &self.mb1.work, "PLL on/off request")?;

        let ack = *lock(&self.mb1.ack);
        if ack.header != tcdm::MB1H_PLL_ON_OFF {
            return Err(self.desync(1, "PLL on/off acknowledgment mismatch"));
        }
        Ok(())
    }
}
