/*++

Licensed under the Apache-2.0 license.

File Name:

    mailbox_tests.rs

Abstract:

    Driver-against-firmware tests for the mailbox transaction engine:
    operating points, power domains, firmware-mediated I2C, the watchdog
    channel and the desync failure paths.

--*/

mod common;

use std::time::Duration;

use common::Harness;
use ux500_prcmu_regs::tcdm;
use ux500_prcmu::{
    ApPowerState, ApeOpp, ArmOpp, EpodId, EpodState, Error, Esram0DeepSleepState,
};

#[test]
fn test_arm_opp_round_trip() {
    let h = Harness::new();

    h.prcmu.set_arm_opp(ArmOpp::Opp100).unwrap();
    assert_eq!(h.prcmu.get_arm_opp(), ArmOpp::Opp100 as u8);

    h.prcmu.set_arm_opp(ArmOpp::Opp50).unwrap();
    assert_eq!(h.prcmu.get_arm_opp(), ArmOpp::Opp50 as u8);

    assert!(h.fw.violations().is_empty());
}

#[test]
fn test_arm_opp_ack_mismatch_is_desync() {
    let h = Harness::new();

    h.fw.set_arm_opp_ack(Some(ArmOpp::Opp50 as u8));
    let err = h.prcmu.set_arm_opp(ArmOpp::Opp100).unwrap_err();
    match err {
        Error::ProtocolDesync(dump) => assert_eq!(dump.mailbox, 1),
        other => panic!("expected desync, got {other}"),
    }
}

#[test]
fn test_reply_timeout_is_desync() {
    let h = Harness::new();
    h.prcmu.set_comm_timeout(Duration::from_millis(50));
    h.fw.set_respond(1, false);

    let err = h.prcmu.set_arm_opp(ArmOpp::Opp100).unwrap_err();
    assert!(matches!(err, Error::ProtocolDesync(_)));
    // The request is still sitting unserviced in the channel.
    assert_eq!(h.fw.pending_requests() & (1 << 1), 1 << 1);
}

#[test]
fn test_wedged_channel_trips_claim_bound() {
    let h = Harness::new();
    h.prcmu.set_comm_timeout(Duration::from_millis(50));
    h.fw.set_respond(1, false);

    let _ = h.prcmu.set_arm_opp(ArmOpp::Opp100);
    // Second transaction cannot claim the channel.
    let err = h.prcmu.set_arm_opp(ArmOpp::Opp50).unwrap_err();
    assert!(matches!(err, Error::ProtocolDesync(_)));
    assert_eq!(h.fw.transaction_count(1), 0);
}

#[test]
fn test_ape_opp_partly25_reshapes_interconnect_dividers() {
    use ux500_prcmu_regs::reg;

    let h = Harness::new();
    let mgt = reg::PRCM_CLK_MGT_CLKEN | reg::PRCM_CLK_MGT_CLKPLLSW_SOC0 | 4;
    h.fw.set_reg_value(reg::PRCM_ACLK_MGT, mgt);
    h.fw.set_reg_value(reg::PRCM_DMACLK_MGT, mgt);

    h.prcmu.set_ape_opp(ApeOpp::Opp50Partly25).unwrap();
    assert_eq!(
        h.fw.reg_value(reg::PRCM_ACLK_MGT) & reg::PRCM_CLK_MGT_CLKPLLDIV_MASK,
        8
    );
    assert_eq!(
        h.fw.reg_value(reg::PRCM_DMACLK_MGT) & reg::PRCM_CLK_MGT_CLKPLLDIV_MASK,
        8
    );

    // Leaving the partial state halves them back.
    h.prcmu.set_ape_opp(ApeOpp::Opp50).unwrap();
    assert_eq!(
        h.fw.reg_value(reg::PRCM_ACLK_MGT) & reg::PRCM_CLK_MGT_CLKPLLDIV_MASK,
        4
    );
}

#[test]
fn test_ape_opp_100_voltage_refcount() {
    let h = Harness::new();

    // Two requests, one firmware edge.
    h.prcmu.request_ape_opp_100_voltage(true).unwrap();
    h.prcmu.request_ape_opp_100_voltage(true).unwrap();
    assert_eq!(h.fw.transaction_count(1), 1);

    h.prcmu.request_ape_opp_100_voltage(false).unwrap();
    assert_eq!(h.fw.transaction_count(1), 1);
    h.prcmu.request_ape_opp_100_voltage(false).unwrap();
    assert_eq!(h.fw.transaction_count(1), 2);

    // Releasing below zero is a caller bug.
    let err = h.prcmu.request_ape_opp_100_voltage(false).unwrap_err();
    assert!(matches!(err, Error::Unbalanced));
}

#[test]
fn test_epod_round_trip() {
    let h = Harness::new();

    h.prcmu.set_epod(EpodId::SvaMmdsp, EpodState::On).unwrap();
    assert_eq!(
        h.fw.tcdm_value(tcdm::PRCM_REQ_MB2 + EpodId::SvaMmdsp as u32),
        EpodState::On as u8
    );

    // RAM retention is only valid for domains with retainable RAM.
    let err = h
        .prcmu
        .set_epod(EpodId::Sga, EpodState::RamRetention)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument));

    h.fw.set_dps_status(Some(0x00));
    let err = h
        .prcmu
        .set_epod(EpodId::SiaMmdsp, EpodState::RamRetention)
        .unwrap_err();
    assert!(matches!(err, Error::ProtocolDesync(_)));
}

#[test]
fn test_abb_register_access() {
    let h = Harness::new();

    h.fw.set_abb_value(0x0F, 0x10, 0x5A);
    assert_eq!(h.prcmu.abb_read(0x0F, 0x10).unwrap(), 0x5A);

    h.prcmu.abb_write(0x0F, 0x11, 0x77).unwrap();
    assert_eq!(h.fw.abb_value(0x0F, 0x11), 0x77);

    // A device NACK is not a protocol desync.
    h.fw.set_i2c_status(Some(0x00));
    let err = h.prcmu.abb_read(0x0F, 0x10).unwrap_err();
    assert!(matches!(err, Error::I2c { status: 0x00 }));
}

#[test]
fn test_a9wdog_load_packs_the_timeout() {
    let h = Harness::new();

    h.prcmu.config_a9wdog(1, false).unwrap();
    h.prcmu.load_a9wdog(2, 0x12345).unwrap();

    assert_eq!(
        h.fw.tcdm_value(tcdm::PRCM_MBOX_HEADER_REQ_MB4),
        tcdm::MB4H_A9WDOG_LOAD
    );
    assert_eq!(h.fw.tcdm_value(tcdm::PRCM_REQ_MB4_A9WDOG_0), 0x52);
    assert_eq!(h.fw.tcdm_value(tcdm::PRCM_REQ_MB4_A9WDOG_1), 0x34);
    assert_eq!(h.fw.tcdm_value(tcdm::PRCM_REQ_MB4_A9WDOG_2), 0x12);
    assert_eq!(h.fw.tcdm_value(tcdm::PRCM_REQ_MB4_A9WDOG_3), 0x00);
}

#[test]
fn test_temp_sense_period() {
    let h = Harness::new();

    h.prcmu.start_temp_sense(0x1234).unwrap();
    assert_eq!(h.fw.tcdm_value(tcdm::PRCM_REQ_MB4_HOT_PERIOD), 0x34);
    assert_eq!(h.fw.tcdm_value(tcdm::PRCM_REQ_MB4_HOT_PERIOD + 1), 0x12);

    // The stop sentinel is not a valid measurement period.
    assert!(matches!(
        h.prcmu.start_temp_sense(0xFFFF).unwrap_err(),
        Error::InvalidArgument
    ));

    h.prcmu.stop_temp_sense().unwrap();
    assert_eq!(h.fw.tcdm_value(tcdm::PRCM_REQ_MB4_HOT_PERIOD), 0xFF);
    assert_eq!(h.fw.tcdm_value(tcdm::PRCM_REQ_MB4_HOT_PERIOD + 1), 0xFF);
}

#[test]
fn test_esram0_deep_sleep_state() {
    let h = Harness::new();

    h.prcmu
        .config_esram0_deep_sleep(Esram0DeepSleepState::Retention)
        .unwrap();
    assert_eq!(
        h.fw.tcdm_value(tcdm::PRCM_REQ_MB4_ESRAM0_ST),
        Esram0DeepSleepState::Retention as u8
    );
}

#[test]
fn test_power_state_request_is_fire_and_forget() {
    let h = Harness::new();

    h.prcmu
        .set_power_state(ApPowerState::Sleep, false, true)
        .unwrap();
    h.wait_until("power state request serviced", || {
        h.fw.mb0_headers()
            .contains(&tcdm::MB0H_POWER_STATE_TRANS)
    });
    assert!(h.fw.violations().is_empty());
}

#[test]
fn test_no_payload_writes_while_channel_pending() {
    let h = Harness::new();

    // Hammer several channels; every payload write must land while the
    // host still owns the request region.
    for _ in 0..20 {
        h.prcmu.set_arm_opp(ArmOpp::Opp100).unwrap();
        h.prcmu.set_epod(EpodId::SvaPipe, EpodState::On).unwrap();
        h.prcmu.abb_write(0x04, 0x01, 0xAA).unwrap();
        h.prcmu.kick_a9wdog(0).unwrap();
    }
    assert!(h.fw.violations().is_empty());
}

#[test]
fn test_deferred_wakeup_ack_under_mb0_traffic() {
    let h = Harness::new();

    // Wakeup events force READ_WAKEUP_ACK requests from the comm worker
    // while the test thread keeps the channel busy with power requests.
    let mut acks = 0;
    for i in 0..50 {
        h.prcmu
            .set_power_state(ApPowerState::Idle, i % 2 == 0, false)
            .unwrap();
        if i % 5 == 0 {
            h.fw.post_wakeup_event(0, &[]);
            acks += 1;
        }
    }

    h.wait_until("all wakeup events acknowledged", || {
        h.fw.mb0_headers()
            .iter()
            .filter(|h| **h == tcdm::MB0H_READ_WAKEUP_ACK)
            .count()
            >= acks
    });
    assert!(h.fw.violations().is_empty());
}
