/*++

Licensed under the Apache-2.0 license.

File Name:

    irq.rs

Abstract:

    Comm worker: decodes mailbox replies, clears the per-channel interrupt
    bits and releases the blocked requesters. Fed by the non-blocking top
    half and by wakeup mask updates.

--*/

use std::sync::atomic::Ordering;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use log::{error, warn};
use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::wakeup::{PrcmuIrq, WakeupBit};
use ux500_prcmu_regs::{mbox_bit, reg, tcdm, NUM_MB};

use crate::wait::lock;
use crate::Inner;

pub(crate) enum Work {
    /// Mailbox ready vector read by the top half.
    Dispatch(u32),
    /// Push the wakeup configuration after an irq mask change.
    ConfigWakeups,
    Shutdown,
}

pub(crate) fn worker_loop<M: Mmio>(inner: Arc<Inner<M>>, work_rx: Receiver<Work>) {
    loop {
        match work_rx.recv() {
            Ok(Work::Dispatch(bits)) => inner.dispatch(bits),
            Ok(Work::ConfigWakeups) => {
                let mut state = lock(&inner.mb0.lock);
                if let Err(e) = inner.config_wakeups(&mut state) {
                    error!("prcmu: wakeup configuration push failed: {e}");
                }
            }
            Ok(Work::Shutdown) | Err(_) => break,
        }
    }
}

impl<M: Mmio> Inner<M> {
    /// Decode ready channels in ascending order.
    fn dispatch(&self, bits: u32) {
        for n in 0..NUM_MB {
            if bits & mbox_bit(n) != 0 {
                match n {
                    0 => self.read_mailbox_0(),
                    1 => self.read_mailbox_1(),
                    2 => self.read_mailbox_2(),
                    3 => self.read_mailbox_3(),
                    4 => self.read_mailbox_4(),
                    5 => self.read_mailbox_5(),
                    _ => self.read_mailbox_unused(n),
                }
            }
        }
    }

    fn read_mailbox_0(&self) {
        let header = self.io.tcdm_read8(tcdm::PRCM_MBOX_HEADER_ACK_MB0);
        let mut got_wakeup_events = false;
        match header {
            tcdm::MB0H_WAKEUP_EXE | tcdm::MB0H_WAKEUP_SLEEP => {
                let ev = if self.io.tcdm_read8(tcdm::PRCM_ACK_MB0_READ_POINTER) & 1 != 0 {
                    self.io.tcdm_read32(tcdm::PRCM_ACK_MB0_WAKEUP_1_8500)
                } else {
                    self.io.tcdm_read32(tcdm::PRCM_ACK_MB0_WAKEUP_0_8500)
                };

                if ev & (WakeupBit::AC_WAKE_ACK | WakeupBit::AC_SLEEP_ACK).bits() != 0 {
                    self.mb0.ac_wake_work.complete();
                }
                if ev & WakeupBit::SYSCLK_OK.bits() != 0 {
                    self.mb3.sysclk_work.complete();
                }

                let ev = ev & self.mb0.dbb_irqs.load(Ordering::Relaxed);
                if let Some(sink) = &self.wakeup_sink {
                    for irq in PrcmuIrq::ALL {
                        if ev & irq.bit().bits() != 0 {
                            sink(irq);
                        }
                    }
                }
                got_wakeup_events = true;
            }
            _ => warn!("prcmu: Unknown message header ({header}) in mailbox 0."),
        }

        self.io.reg_write(reg::PRCM_ARM_IT1_CLR, mbox_bit(0));

        if got_wakeup_events {
            self.ack_dbb_wakeup();
        }
    }

    /// Tell the firmware the event buffer has been consumed so it can flip
    /// the double buffer. Sent immediately when the channel is free,
    /// otherwise after a bounded spin on the pending bit.
    fn ack_dbb_wakeup(&self) {
        let _state = lock(&self.mb0.lock);

        match self.claim(0, "wakeup read acknowledgment") {
            Ok(()) => {
                self.io
                    .tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB0, tcdm::MB0H_READ_WAKEUP_ACK);
                self.fire(0);
            }
            Err(e) => error!("prcmu: could not acknowledge wakeup events: {e}"),
        }
    }

    fn read_mailbox_1(&self) {
        {
            let mut ack = lock(&self.mb1.ack);
            ack.header = self.io.tcdm_read8(tcdm::PRCM_MBOX_HEADER_REQ_MB1);
            ack.arm_opp = self.io.tcdm_read8(tcdm::PRCM_ACK_MB1_CURRENT_ARM_OPP);
            ack.ape_opp = self.io.tcdm_read8(tcdm::PRCM_ACK_MB1_CURRENT_APE_OPP);
            ack.ape_voltage_status = self.io.tcdm_read8(tcdm::PRCM_ACK_MB1_APE_VOLTAGE_STATUS);
        }
        self.io.reg_write(reg::PRCM_ARM_IT1_CLR, mbox_bit(1));
        self.mb1.work.complete();
    }

    fn read_mailbox_2(&self) {
        *lock(&self.mb2.ack_status) = self.io.tcdm_read8(tcdm::PRCM_ACK_MB2_DPS_STATUS);
        self.io.reg_write(reg::PRCM_ARM_IT1_CLR, mbox_bit(2));
        self.mb2.work.complete();
    }

    fn read_mailbox_3(&self) {
        // Sysclk completion rides on the SYSCLK_OK event through mailbox 0.
        self.io.reg_write(reg::PRCM_ARM_IT1_CLR, mbox_bit(3));
    }

    fn read_mailbox_4(&self) {
        let header = self.io.tcdm_read8(tcdm::PRCM_MBOX_HEADER_REQ_MB4);
        let known = matches!(
            header,
            tcdm::MB4H_MEM_ST
                | tcdm::MB4H_HOTDOG
                | tcdm::MB4H_HOTMON
                | tcdm::MB4H_HOT_PERIOD
                | tcdm::MB4H_A9WDOG_CONF
                | tcdm::MB4H_A9WDOG_EN
                | tcdm::MB4H_A9WDOG_DIS
                | tcdm::MB4H_A9WDOG_LOAD
                | tcdm::MB4H_A9WDOG_KICK
        );
        if !known {
            warn!("prcmu: Unknown message header ({header}) in mailbox 4.");
        }

        self.io.reg_write(reg::PRCM_ARM_IT1_CLR, mbox_bit(4));

        if known {
            self.mb4.work.complete();
        }
    }

    fn read_mailbox_5(&self) {
        {
            let mut ack = lock(&self.mb5.ack);
            ack.status = self.io.tcdm_read8(tcdm::PRCM_ACK_MB5_I2C_STATUS);
            ack.value = self.io.tcdm_read8(tcdm::PRCM_ACK_MB5_I2C_VAL);
        }
        self.io.reg_write(reg::PRCM_ARM_IT1_CLR, mbox_bit(5));
        self.mb5.work.complete();
    }

    fn read_mailbox_unused(&self, n: usize) {
        self.io.reg_write(reg::PRCM_ARM_IT1_CLR, mbox_bit(n));
    }
}
