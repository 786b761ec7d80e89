/*++

Licensed under the Apache-2.0 license.

File Name:

    watchdog.rs

Abstract:

    Mailbox 4 housekeeping: memory states for deep sleep, thermal
    supervision (hotdog/hotmon/hot-period) and the A9 watchdogs.

--*/

use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::tcdm;

use crate::error::{Error, Result};
use crate::types::{Esram0DeepSleepState, DDR_PWR_STATE_OFFHIGHLAT, DDR_PWR_STATE_ON};
use crate::Prcmu;

impl<M: Mmio + 'static> Prcmu<M> {
    /// Configure the esram0 state to apply in ApDeepSleep, together with
    /// the fixed DDR states for the sleep and deep-idle transitions.
    pub fn config_esram0_deep_sleep(&self, state: Esram0DeepSleepState) -> Result<()> {
        self.inner.mb4_request(
            tcdm::MB4H_MEM_ST,
            &[
                (
                    tcdm::PRCM_REQ_MB4_DDR_ST_AP_SLEEP_IDLE,
                    (DDR_PWR_STATE_OFFHIGHLAT << 4) | DDR_PWR_STATE_ON,
                ),
                (tcdm::PRCM_REQ_MB4_DDR_ST_AP_DEEP_IDLE, DDR_PWR_STATE_ON),
                (tcdm::PRCM_REQ_MB4_ESRAM0_ST, state as u8),
            ],
            "esram0 deep-sleep state",
        )
    }

    /// Set the thermal shutdown threshold.
    pub fn config_hotdog(&self, threshold: u8) -> Result<()> {
        self.inner.mb4_request(
            tcdm::MB4H_HOTDOG,
            &[(tcdm::PRCM_REQ_MB4_HOTDOG_THRESHOLD, threshold)],
            "hotdog threshold",
        )
    }

    /// Set the temperature window monitored by the firmware; crossing
    /// either bound raises the matching HOTMON wakeup event.
    pub fn config_hotmon(&self, low: u8, high: u8) -> Result<()> {
        self.inner.mb4_request(
            tcdm::MB4H_HOTMON,
            &[
                (tcdm::PRCM_REQ_MB4_HOTMON_LOW, low),
                (tcdm::PRCM_REQ_MB4_HOTMON_HIGH, high),
                (
                    tcdm::PRCM_REQ_MB4_HOTMON_CONFIG,
                    tcdm::HOTMON_CONFIG_LOW | tcdm::HOTMON_CONFIG_HIGH,
                ),
            ],
            "hotmon window",
        )
    }

    fn config_hot_period(&self, cycles32k: u16) -> Result<()> {
        let bytes = cycles32k.to_le_bytes();
        self.inner.mb4_request(
            tcdm::MB4H_HOT_PERIOD,
            &[
                (tcdm::PRCM_REQ_MB4_HOT_PERIOD, bytes[0]),
                (tcdm::PRCM_REQ_MB4_HOT_PERIOD + 1, bytes[1]),
            ],
            "temperature measurement period",
        )
    }

    /// Start periodic temperature measurement. The period is in cycles of
    /// the 32 kHz clock; 0xFFFF is reserved for stopping.
    pub fn start_temp_sense(&self, cycles32k: u16) -> Result<()> {
        if cycles32k == 0xFFFF {
            return Err(Error::InvalidArgument);
        }
        self.config_hot_period(cycles32k)
    }

    pub fn stop_temp_sense(&self) -> Result<()> {
        self.config_hot_period(0xFFFF)
    }

    fn a9wdog(&self, cmd: u8, d0: u8, d1: u8, d2: u8, d3: u8) -> Result<()> {
        self.inner.mb4_request(
            cmd,
            &[
                (tcdm::PRCM_REQ_MB4_A9WDOG_0, d0),
                (tcdm::PRCM_REQ_MB4_A9WDOG_1, d1),
                (tcdm::PRCM_REQ_MB4_A9WDOG_2, d2),
                (tcdm::PRCM_REQ_MB4_A9WDOG_3, d3),
            ],
            "A9 watchdog command",
        )
    }

    /// Configure the number of A9 watchdogs and whether they pause
    /// automatically in sleep.
    pub fn config_a9wdog(&self, num: u8, sleep_auto_off: bool) -> Result<()> {
        if num == 0 || num > tcdm::A9WDOG_ID_MASK {
            return Err(Error::InvalidArgument);
        }
        self.a9wdog(
            tcdm::MB4H_A9WDOG_CONF,
            num,
            0,
            0,
            if sleep_auto_off {
                tcdm::A9WDOG_AUTO_OFF_EN
            } else {
                tcdm::A9WDOG_AUTO_OFF_DIS
            },
        )
    }

    pub fn enable_a9wdog(&self, id: u8) -> Result<()> {
        self.a9wdog(tcdm::MB4H_A9WDOG_EN, id, 0, 0, 0)
    }

    pub fn disable_a9wdog(&self, id: u8) -> Result<()> {
        self.a9wdog(tcdm::MB4H_A9WDOG_DIS, id, 0, 0, 0)
    }

    pub fn kick_a9wdog(&self, id: u8) -> Result<()> {
        self.a9wdog(tcdm::MB4H_A9WDOG_KICK, id, 0, 0, 0)
    }

    /// Load a watchdog timeout. The timeout is 28 bits of milliseconds,
    /// packed after the 4-bit watchdog id.
    pub fn load_a9wdog(&self, id: u8, timeout_ms: u32) -> Result<()> {
        self.a9wdog(
            tcdm::MB4H_A9WDOG_LOAD,
            (id & tcdm::A9WDOG_ID_MASK) | ((timeout_ms << 4) & 0xF0) as u8,
            (timeout_ms >> 4) as u8,
            (timeout_ms >> 12) as u8,
            (timeout_ms >> 20) as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    // Packing checks for the watchdog timeout bytes, mirrored against the
    // firmware's unpacking (id in the low nibble, timeout from bit 4 up).
    #[test]
    fn test_a9wdog_timeout_packing() {
        let id: u8 = 0x3;
        let timeout_ms: u32 = 0x0ABC_DE5;
        let d0 = (id & 0xF) | ((timeout_ms << 4) & 0xF0) as u8;
        let d1 = (timeout_ms >> 4) as u8;
        let d2 = (timeout_ms >> 12) as u8;
        let d3 = (timeout_ms >> 20) as u8;
        assert_eq!(d0 & 0xF, id);
        let unpacked = (u32::from(d0 >> 4))
            | (u32::from(d1) << 4)
            | (u32::from(d2) << 12)
            | (u32::from(d3) << 20);
        assert_eq!(unpacked, timeout_ms & 0x0FFF_FFFF);
    }
}
