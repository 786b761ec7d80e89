/*++

Licensed under the Apache-2.0 license.

File Name:

    wakeup_tests.rs

Abstract:

    Wakeup configuration and event dispatch tests: firmware push
    idempotence, interrupt masking, the analog-baseband event buffer and
    the modem host-access handshake.

--*/

mod common;

use std::sync::{Arc, Mutex};

use common::Harness;
use ux500_prcmu_regs::tcdm;
use ux500_prcmu::{PrcmuArgs, PrcmuIrq, PrcmuWakeups, RomcodeRead, RomcodeWrite, WakeupBit};

fn config_exe_count(h: &Harness) -> usize {
    h.fw.mb0_headers()
        .iter()
        .filter(|hd| **hd == tcdm::MB0H_CONFIG_WAKEUPS_EXE)
        .count()
}

#[test]
fn test_wakeup_config_pushed_once_per_change() {
    let h = Harness::new();

    h.prcmu
        .enable_wakeups(PrcmuWakeups::RTC | PrcmuWakeups::USB)
        .unwrap();
    h.wait_until("first wakeup push", || config_exe_count(&h) == 1);
    // The execute header is always paired with the sleep header.
    assert_eq!(
        h.fw.mb0_headers()
            .iter()
            .filter(|hd| **hd == tcdm::MB0H_CONFIG_WAKEUPS_SLEEP)
            .count(),
        1
    );

    // An identical configuration is not pushed again.
    h.prcmu
        .enable_wakeups(PrcmuWakeups::RTC | PrcmuWakeups::USB)
        .unwrap();
    assert_eq!(config_exe_count(&h), 1);

    h.prcmu.enable_wakeups(PrcmuWakeups::ARM).unwrap();
    h.wait_until("second wakeup push", || config_exe_count(&h) == 2);
}

#[test]
fn test_event_dispatch_respects_irq_mask() {
    let seen: Arc<Mutex<Vec<PrcmuIrq>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let h = Harness::with_args(PrcmuArgs {
        wakeup_sink: Some(Box::new(move |irq| {
            sink_seen.lock().unwrap().push(irq);
        })),
        ..Harness::args()
    });

    h.prcmu.unmask_wakeup_irq(PrcmuIrq::Rtc);
    h.wait_until("mask push", || config_exe_count(&h) >= 1);

    // An RTC event reaches the sink; the unsolicited USB event does not.
    h.fw.post_wakeup_event((WakeupBit::RTC | WakeupBit::USB).bits(), &[]);
    h.wait_until("RTC delivery", || {
        seen.lock().unwrap().contains(&PrcmuIrq::Rtc)
    });
    assert!(!seen.lock().unwrap().contains(&PrcmuIrq::Usb));

    // Every delivered event gets acknowledged back to the firmware.
    h.wait_until("wakeup readout ack", || {
        h.fw.mb0_headers().contains(&tcdm::MB0H_READ_WAKEUP_ACK)
    });

    h.prcmu.mask_wakeup_irq(PrcmuIrq::Rtc);
    h.wait_until("unmask push", || config_exe_count(&h) >= 2);
    let before = seen.lock().unwrap().len();
    h.fw.post_wakeup_event(WakeupBit::RTC.bits(), &[]);
    h.wait_until("masked event consumed", || {
        h.fw.mb0_headers()
            .iter()
            .filter(|hd| **hd == tcdm::MB0H_READ_WAKEUP_ACK)
            .count()
            >= 2
    });
    assert_eq!(seen.lock().unwrap().len(), before);
}

#[test]
fn test_abb_event_buffer_readout() {
    let h = Harness::new();

    h.fw.post_wakeup_event(WakeupBit::ABB_FIFO.bits(), &[0x11, 0x22, 0x33]);
    h.wait_until("event consumed", || {
        h.fw.mb0_headers().contains(&tcdm::MB0H_READ_WAKEUP_ACK)
    });

    let buf = h.prcmu.abb_event_buffer();
    assert_eq!(&buf[..3], &[0x11, 0x22, 0x33]);
}

#[test]
fn test_modem_host_access_handshake() {
    let h = Harness::new();

    assert!(!h.prcmu.is_ac_wake_requested());
    h.prcmu.ac_wake_req().unwrap();
    assert!(h.prcmu.is_ac_wake_requested());
    // Idempotent while the host-access line is already up.
    h.prcmu.ac_wake_req().unwrap();

    h.prcmu.ac_sleep_req().unwrap();
    assert!(!h.prcmu.is_ac_wake_requested());
}

#[test]
fn test_romcode_mailbox_bytes() {
    let h = Harness::new();

    h.prcmu.set_romcode_a2p(RomcodeWrite::ReadyToDeepSleep);
    assert_eq!(
        h.fw.tcdm_value(tcdm::PRCM_ROMCODE_A2P),
        RomcodeWrite::ReadyToDeepSleep as u8
    );

    h.fw.set_tcdm_value(tcdm::PRCM_ROMCODE_P2A, 0x0B);
    assert_eq!(h.prcmu.get_romcode_p2a(), Some(RomcodeRead::EndDs));
    h.fw.set_tcdm_value(tcdm::PRCM_ROMCODE_P2A, 0x55);
    assert_eq!(h.prcmu.get_romcode_p2a(), None);
}

#[test]
fn test_system_reset_persists_the_code() {
    let h = Harness::new();

    h.prcmu.system_reset(0xBEEF);
    assert_eq!(h.prcmu.get_reset_code(), 0xBEEF);
    assert_eq!(h.fw.soft_reset_count(), 1);
}
