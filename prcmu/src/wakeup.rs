/*++

Licensed under the Apache-2.0 license.

File Name:

    wakeup.rs

Abstract:

    Wakeup/event configuration: which hardware events the firmware should
    wake or interrupt the host for, pushed over mailbox 0 as an
    execute/sleep header pair.

--*/

use std::sync::atomic::Ordering;

use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::wakeup::{wakeup_bits, PrcmuIrq, PrcmuWakeups, WakeupBit};
use ux500_prcmu_regs::tcdm;

use crate::error::Result;
use crate::irq::Work;
use crate::mailbox::Mb0State;
use crate::wait::lock;
use crate::{Inner, Prcmu};

impl<M: Mmio> Inner<M> {
    /// Push the combined wakeup configuration to the firmware, once with
    /// the execute header and once with the sleep header. Skipped when
    /// nothing changed since the last push. The caller holds the mailbox 0
    /// lock.
    pub(crate) fn config_wakeups(&self, state: &mut Mb0State) -> Result<()> {
        const HEADERS: [u8; 2] = [tcdm::MB0H_CONFIG_WAKEUPS_EXE, tcdm::MB0H_CONFIG_WAKEUPS_SLEEP];

        let mut dbb_events = self.mb0.dbb_irqs.load(Ordering::Relaxed) | state.dbb_wakeups;
        // The modem handshake acks must always get through.
        dbb_events |= (WakeupBit::AC_WAKE_ACK | WakeupBit::AC_SLEEP_ACK).bits();

        let abb_events = state.abb_events;

        if dbb_events == state.last_dbb_events && abb_events == state.last_abb_events {
            return Ok(());
        }

        for header in HEADERS {
            self.claim(0, "wakeup configuration")?;
            self.io.tcdm_write32(tcdm::PRCM_REQ_MB0_WAKEUP_8500, dbb_events);
            self.io.tcdm_write32(tcdm::PRCM_REQ_MB0_WAKEUP_4500, abb_events);
            self.io.tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB0, header);
            self.fire(0);
        }
        state.last_dbb_events = dbb_events;
        state.last_abb_events = abb_events;
        Ok(())
    }
}

impl<M: Mmio + 'static> Prcmu<M> {
    /// Select which wakeup sources may bring the AP out of a low-power
    /// state. Replaces the previous set.
    pub fn enable_wakeups(&self, wakeups: PrcmuWakeups) -> Result<()> {
        let bits = wakeup_bits(wakeups).bits();

        let mut state = lock(&self.inner.mb0.lock);
        state.dbb_wakeups = bits;
        self.inner.config_wakeups(&mut state)
    }

    /// Configure which analog-baseband events the firmware copies into the
    /// event readout buffer.
    pub fn config_abb_event_readout(&self, abb_events: u32) -> Result<()> {
        let mut state = lock(&self.inner.mb0.lock);
        state.abb_events = abb_events;
        self.inner.config_wakeups(&mut state)
    }

    /// Stop forwarding a logical wakeup interrupt. The firmware push is
    /// done by the comm worker.
    pub fn mask_wakeup_irq(&self, irq: PrcmuIrq) {
        self.inner
            .mb0
            .dbb_irqs
            .fetch_and(!irq.bit().bits(), Ordering::Relaxed);
        // CA_SLEEP stays permanently configured in the firmware.
        if irq != PrcmuIrq::CaSleep {
            self.queue(Work::ConfigWakeups);
        }
    }

    /// Start forwarding a logical wakeup interrupt.
    pub fn unmask_wakeup_irq(&self, irq: PrcmuIrq) {
        self.inner
            .mb0
            .dbb_irqs
            .fetch_or(irq.bit().bits(), Ordering::Relaxed);
        if irq != PrcmuIrq::CaSleep {
            self.queue(Work::ConfigWakeups);
        }
    }

    /// Snapshot of the analog-baseband event buffer the firmware filled
    /// last, selected by the read-pointer bit.
    pub fn abb_event_buffer(&self) -> [u8; tcdm::PRCM_ACK_MB0_EVENT_4500_NUMBERS as usize] {
        let base = if self.inner.io.tcdm_read8(tcdm::PRCM_ACK_MB0_READ_POINTER) & 1 != 0 {
            tcdm::PRCM_ACK_MB0_WAKEUP_1_4500
        } else {
            tcdm::PRCM_ACK_MB0_WAKEUP_0_4500
        };
        let mut buf = [0u8; tcdm::PRCM_ACK_MB0_EVENT_4500_NUMBERS as usize];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.inner.io.tcdm_read8(base + i as u32);
        }
        buf
    }
}
