/*++

Licensed under the Apache-2.0 license.

File Name:

    clock_tests.rs

Abstract:

    Clock engine tests against the emulated register window: rate readback
    through the PLL dividers, divider programming, PLLDSI lock handling,
    gating and the programmable clock outputs.

--*/

mod common;

use common::Harness;
use ux500_prcmu::{Clock, ClkoutSource, Error, ROOT_CLOCK_RATE};
use ux500_prcmu_regs::reg;

/// PLLSOC0 at D=50, N=1: 1.92 GHz raw, 960 MHz on the FIX branch.
fn setup_pll_soc0(h: &Harness) {
    h.fw.set_reg_value(reg::PRCM_PLLSOC0_FREQ, 50 | (1 << 8));
}

#[test]
fn test_clock_rate_through_pll() {
    let h = Harness::new();
    setup_pll_soc0(&h);

    assert_eq!(h.prcmu.clock_rate(Clock::PllSoc0), 1_920_000_000);

    // UARTCLK runs on the FIX branch of PLLSOC0 with a divider of 16.
    h.fw.set_reg_value(
        reg::PRCM_UARTCLK_MGT,
        reg::PRCM_CLK_MGT_CLKEN | reg::PRCM_CLK_MGT_CLKPLLSW_SOC0 | 16,
    );
    assert_eq!(h.prcmu.clock_rate(Clock::UartClk), 60_000_000);

    // CLK38 short-circuits the PLL entirely.
    h.fw.set_reg_value(
        reg::PRCM_I2CCLK_MGT,
        reg::PRCM_CLK_MGT_CLK38 | reg::PRCM_CLK_MGT_CLK38DIV,
    );
    assert_eq!(h.prcmu.clock_rate(Clock::I2cClk), ROOT_CLOCK_RATE / 2);

    assert_eq!(h.prcmu.clock_rate(Clock::TimClk), ROOT_CLOCK_RATE / 16);
    assert_eq!(h.prcmu.clock_rate(Clock::SysClk), ROOT_CLOCK_RATE);
}

#[test]
fn test_sgaclk_divide_by_2_5() {
    let h = Harness::new();
    setup_pll_soc0(&h);

    h.fw.set_reg_value(
        reg::PRCM_SGACLK_MGT,
        reg::PRCM_CLK_MGT_CLKEN
            | reg::PRCM_CLK_MGT_CLKPLLSW_SOC0
            | reg::PRCM_SGACLK_MGT_SGACLKDIV_BY_2_5_EN,
    );
    // SGACLK rides the DIV branch undivided; 1.92 GHz / 2.5.
    assert_eq!(h.prcmu.clock_rate(Clock::SgaClk), 768_000_000);
}

#[test]
fn test_set_clock_rate_programs_divider() {
    let h = Harness::new();
    setup_pll_soc0(&h);
    h.fw.set_reg_value(
        reg::PRCM_UARTCLK_MGT,
        reg::PRCM_CLK_MGT_CLKEN | reg::PRCM_CLK_MGT_CLKPLLSW_SOC0 | 1,
    );

    assert_eq!(
        h.prcmu.round_clock_rate(Clock::UartClk, 120_000_000),
        120_000_000
    );
    h.prcmu.set_clock_rate(Clock::UartClk, 120_000_000).unwrap();
    assert_eq!(
        h.fw.reg_value(reg::PRCM_UARTCLK_MGT) & reg::PRCM_CLK_MGT_CLKPLLDIV_MASK,
        8
    );
    assert_eq!(h.prcmu.clock_rate(Clock::UartClk), 120_000_000);
    // Semaphore released.
    assert_eq!(h.fw.reg_value(reg::PRCM_SEM), 0);
}

#[test]
fn test_gating_remembers_pll_selector() {
    let h = Harness::new();
    setup_pll_soc0(&h);
    h.fw.set_reg_value(
        reg::PRCM_MSP1CLK_MGT,
        reg::PRCM_CLK_MGT_CLKEN | reg::PRCM_CLK_MGT_CLKPLLSW_SOC0 | 4,
    );

    h.prcmu.request_clock(Clock::Msp1Clk, false).unwrap();
    let val = h.fw.reg_value(reg::PRCM_MSP1CLK_MGT);
    assert_eq!(val & reg::PRCM_CLK_MGT_CLKEN, 0);
    assert_eq!(val & reg::PRCM_CLK_MGT_CLKPLLSW_MASK, 0);

    h.prcmu.request_clock(Clock::Msp1Clk, true).unwrap();
    let val = h.fw.reg_value(reg::PRCM_MSP1CLK_MGT);
    assert_eq!(val & reg::PRCM_CLK_MGT_CLKEN, reg::PRCM_CLK_MGT_CLKEN);
    assert_eq!(
        val & reg::PRCM_CLK_MGT_CLKPLLSW_MASK,
        reg::PRCM_CLK_MGT_CLKPLLSW_SOC0
    );
}

#[test]
fn test_sga_clock_holds_interconnect_bypass() {
    let h = Harness::new();
    setup_pll_soc0(&h);
    h.fw.set_reg_value(reg::PRCM_SGACLK_MGT, reg::PRCM_CLK_MGT_CLKPLLSW_SOC0 | 2);

    h.prcmu.request_clock(Clock::SgaClk, true).unwrap();
    assert_eq!(
        h.fw.reg_value(reg::PRCM_CGATING_BYPASS) & reg::PRCM_CGATING_BYPASS_ICN2,
        reg::PRCM_CGATING_BYPASS_ICN2
    );

    h.prcmu.request_clock(Clock::SgaClk, false).unwrap();
    assert_eq!(
        h.fw.reg_value(reg::PRCM_CGATING_BYPASS) & reg::PRCM_CGATING_BYPASS_ICN2,
        0
    );
}

#[test]
fn test_plldsi_programming_and_lock() {
    let h = Harness::new();
    // HDMICLK on the 38.4 MHz bypass feeds PLLDSI.
    h.fw.set_reg_value(reg::PRCM_HDMICLK_MGT, reg::PRCM_CLK_MGT_CLK38);

    h.prcmu.set_clock_rate(Clock::PllDsi, 420_000_000).unwrap();
    assert_eq!(
        h.fw.reg_value(reg::PRCM_PLLDSI_FREQ),
        76 | (7 << 16) | (1 << 8)
    );
    assert_eq!(h.prcmu.clock_rate(Clock::PllDsi), 416_914_285);

    // Lock never comes up: the driver rolls the PLL back off.
    let err = h.prcmu.request_clock(Clock::PllDsi, true).unwrap_err();
    assert!(matches!(err, Error::PllNotLocked));
    assert_eq!(
        h.fw.reg_value(reg::PRCM_PLLDSI_ENABLE) & reg::PRCM_PLLDSI_ENABLE_PRCM_PLLDSI_ENABLE,
        0
    );

    h.fw.set_reg_value(
        reg::PRCM_PLLDSI_LOCKP,
        reg::PRCM_PLLDSI_LOCKP_PRCM_PLLDSI_LOCKP3 | reg::PRCM_PLLDSI_LOCKP_PRCM_PLLDSI_LOCKP10,
    );
    h.prcmu.request_clock(Clock::PllDsi, true).unwrap();
    assert_eq!(
        h.fw.reg_value(reg::PRCM_APE_RESETN_SET) & reg::PRCM_APE_RESETN_DSIPLL_RESETN,
        reg::PRCM_APE_RESETN_DSIPLL_RESETN
    );
}

#[test]
fn test_plldsi_before_hdmiclk_is_sourced() {
    let h = Harness::new();
    // HDMICLK left at its reset value: no source selected, rate unknown.
    assert_eq!(h.prcmu.clock_rate(Clock::HdmiClk), 0);

    assert_eq!(h.prcmu.round_clock_rate(Clock::PllDsi, 420_000_000), 0);
    let err = h
        .prcmu
        .set_clock_rate(Clock::PllDsi, 420_000_000)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument));
    assert_eq!(h.fw.reg_value(reg::PRCM_PLLDSI_FREQ), 0);
}

#[test]
fn test_sysclk_request_over_mailbox() {
    let h = Harness::new();

    h.prcmu.request_clock(Clock::SysClk, true).unwrap();
    assert!(h.fw.sysclk_on());

    // Disable is not acknowledged; the request just goes out.
    h.prcmu.request_clock(Clock::SysClk, false).unwrap();
    h.wait_until("sysclk released", || !h.fw.sysclk_on());
}

#[test]
fn test_pll_soc1_request_is_refcounted() {
    let h = Harness::new();

    h.prcmu.request_clock(Clock::PllSoc1, true).unwrap();
    h.prcmu.request_clock(Clock::PllSoc1, true).unwrap();
    assert!(h.fw.pll_soc1_on());
    assert_eq!(h.fw.transaction_count(1), 1);

    h.prcmu.request_clock(Clock::PllSoc1, false).unwrap();
    assert!(h.fw.pll_soc1_on());
    h.prcmu.request_clock(Clock::PllSoc1, false).unwrap();
    assert!(!h.fw.pll_soc1_on());
}

#[test]
fn test_clkout_conflicts_and_release() {
    let h = Harness::new();

    h.prcmu.config_clkout(0, ClkoutSource::TvClk, 4).unwrap();
    // Same configuration stacks.
    h.prcmu.config_clkout(0, ClkoutSource::TvClk, 4).unwrap();
    // A different divider conflicts while requests are outstanding.
    assert!(matches!(
        h.prcmu.config_clkout(0, ClkoutSource::TvClk, 8).unwrap_err(),
        Error::Busy
    ));

    h.prcmu.config_clkout(0, ClkoutSource::TvClk, 0).unwrap();
    h.prcmu.config_clkout(0, ClkoutSource::TvClk, 0).unwrap();
    // Nothing left to release.
    assert!(matches!(
        h.prcmu.config_clkout(0, ClkoutSource::TvClk, 0).unwrap_err(),
        Error::InvalidArgument
    ));
}

#[test]
fn test_timclk_gating() {
    let h = Harness::new();

    h.prcmu.request_clock(Clock::TimClk, true).unwrap();
    assert_eq!(
        h.fw.reg_value(reg::PRCM_TCR),
        reg::PRCM_TCR_DOZE_MODE | reg::PRCM_TCR_TENSEL_MASK
    );
    h.prcmu.request_clock(Clock::TimClk, false).unwrap();
    assert_eq!(
        h.fw.reg_value(reg::PRCM_TCR) & reg::PRCM_TCR_STOP_TIMERS,
        reg::PRCM_TCR_STOP_TIMERS
    );
}
