/*++

Licensed under the Apache-2.0 license.

File Name:

    firmware.rs

Abstract:

    Emulated xp70 firmware behind the two PRCMU address windows. Backs the
    register and TCDM windows with RAM, models the mailbox pending bits and
    the interrupt line, and services requests the way the power firmware
    does: acks written back into TCDM, wakeup events double-buffered into
    the mailbox 0 region. Response behavior is overridable per mailbox so
    tests can provoke the driver's failure paths.

--*/

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, trace};
use ux500_emu_bus::{AccessSize, Mmio, Ram};
use ux500_prcmu_regs::wakeup::WakeupBit;
use ux500_prcmu_regs::{
    mbox_bit, reg, tcdm, PRCMU_REG_BASE, PRCMU_REG_SIZE, PRCMU_TCDM_BASE, PRCMU_TCDM_SIZE,
};

/// A host write into a mailbox request region while that mailbox's pending
/// bit was still set. The firmware owns the payload at that point; such a
/// write is a protocol bug in the driver.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct OwnershipViolation {
    pub mailbox: usize,
    /// TCDM offset of the offending write.
    pub offset: u32,
}

struct State {
    regs: Ram,
    tcdm: Ram,
    /// Host-to-firmware pending bits (`PRCM_MBOX_CPU_VAL`).
    cpu_val: u32,
    /// Firmware-to-host interrupt bits (`PRCM_ARM_IT1_VAL`).
    it1: u32,
    read_pointer: u8,
    hostaccess: u32,

    /// Per-mailbox response switch; a cleared entry models wedged firmware.
    respond: [bool; 6],
    transactions: [u32; 6],
    mb0_headers: Vec<u8>,
    violations: Vec<OwnershipViolation>,

    current_arm_opp: u8,
    current_ape_opp: u8,
    arm_opp_ack: Option<u8>,
    ape_opp_ack: Option<u8>,
    voltage_status_ack: Option<u8>,
    dps_status: Option<u8>,
    i2c_status: Option<u8>,

    /// Analog-baseband register banks reached through mailbox 5, keyed by
    /// the slave address as it appears in the I2C op byte.
    abb: HashMap<u8, [u8; 256]>,
    pll_soc1_on: bool,
    sysclk_on: bool,
    soft_resets: u32,
}

/// The firmware model. Cheap to clone; all clones share the same state, so
/// a test can hand one clone to the driver as its device window and keep
/// another to drive [`PrcmuFirmware::service`] and inspect the interaction.
#[derive(Clone)]
pub struct PrcmuFirmware {
    state: Arc<Mutex<State>>,
}

fn lock(state: &Mutex<State>) -> MutexGuard<State> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poison) => poison.into_inner(),
    }
}

/// The slave address as it round-trips through the I2C op byte.
fn abb_bank(slave: u8) -> u8 {
    (((slave << 1) | (1 << 6)) >> 1) & 0x7F
}

impl Default for PrcmuFirmware {
    fn default() -> Self {
        Self::new()
    }
}

impl PrcmuFirmware {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                regs: Ram::new(PRCMU_REG_SIZE as usize),
                tcdm: Ram::new(PRCMU_TCDM_SIZE as usize),
                cpu_val: 0,
                it1: 0,
                read_pointer: 0,
                hostaccess: 0,
                respond: [true; 6],
                transactions: [0; 6],
                mb0_headers: Vec::new(),
                violations: Vec::new(),
                current_arm_opp: 0x02,
                current_ape_opp: 0x02,
                arm_opp_ack: None,
                ape_opp_ack: None,
                voltage_status_ack: None,
                dps_status: None,
                i2c_status: None,
                abb: HashMap::new(),
                pll_soc1_on: false,
                sysclk_on: false,
                soft_resets: 0,
            })),
        }
    }

    /// Service all pending host requests, writing acks back into TCDM and
    /// raising the per-mailbox interrupt bits. Tests call this from their
    /// harness loop, interleaved with the driver's interrupt entry point.
    pub fn service(&self) {
        let mut state = lock(&self.state);
        for n in 0..6 {
            if state.cpu_val & mbox_bit(n) == 0 || !state.respond[n] {
                continue;
            }
            state.transactions[n] += 1;
            match n {
                0 => Self::service_mb0(&mut state),
                1 => Self::service_mb1(&mut state),
                2 => Self::service_mb2(&mut state),
                3 => Self::service_mb3(&mut state),
                4 => Self::service_mb4(&mut state),
                _ => Self::service_mb5(&mut state),
            }
            state.cpu_val &= !mbox_bit(n);
        }
    }

    fn service_mb0(state: &mut State) {
        let header = tcdm_read8(state, tcdm::PRCM_MBOX_HEADER_REQ_MB0);
        state.mb0_headers.push(header);
        match header {
            tcdm::MB0H_POWER_STATE_TRANS => {
                let pwr = tcdm_read8(state, tcdm::PRCM_REQ_MB0_AP_POWER_STATE);
                debug!("prcmu-fw: power state transition request ({pwr})");
            }
            tcdm::MB0H_CONFIG_WAKEUPS_EXE | tcdm::MB0H_CONFIG_WAKEUPS_SLEEP => {
                let dbb = tcdm_read32(state, tcdm::PRCM_REQ_MB0_WAKEUP_8500);
                trace!("prcmu-fw: wakeup configuration 0x{dbb:08x} ({header})");
            }
            tcdm::MB0H_READ_WAKEUP_ACK => {
                trace!("prcmu-fw: wakeup events acknowledged");
            }
            _ => debug!("prcmu-fw: unknown mailbox 0 request header ({header})"),
        }
    }

    fn service_mb1(state: &mut State) {
        let header = tcdm_read8(state, tcdm::PRCM_MBOX_HEADER_REQ_MB1);
        match header {
            tcdm::MB1H_ARM_APE_OPP => {
                const OPP_NO_CHANGE: u8 = 0x01;
                let arm = tcdm_read8(state, tcdm::PRCM_REQ_MB1_ARM_OPP);
                let ape = tcdm_read8(state, tcdm::PRCM_REQ_MB1_APE_OPP);
                if arm != OPP_NO_CHANGE {
                    state.current_arm_opp = arm;
                }
                if ape != OPP_NO_CHANGE {
                    state.current_ape_opp = ape;
                }
                let arm_ack = state.arm_opp_ack.unwrap_or(state.current_arm_opp);
                let ape_ack = state.ape_opp_ack.unwrap_or(state.current_ape_opp);
                tcdm_write8(state, tcdm::PRCM_ACK_MB1_CURRENT_ARM_OPP, arm_ack);
                tcdm_write8(state, tcdm::PRCM_ACK_MB1_CURRENT_APE_OPP, ape_ack);
            }
            tcdm::MB1H_REQUEST_APE_OPP_100_VOLT | tcdm::MB1H_RELEASE_APE_OPP_100_VOLT => {
                let status = state.voltage_status_ack.unwrap_or(0);
                tcdm_write8(state, tcdm::PRCM_ACK_MB1_APE_VOLTAGE_STATUS, status);
            }
            tcdm::MB1H_PLL_ON_OFF => {
                let req = tcdm_read8(state, tcdm::PRCM_REQ_MB1_PLL_ON_OFF);
                if req & tcdm::PLL_SOC1_ON != 0 {
                    state.pll_soc1_on = true;
                }
                if req & tcdm::PLL_SOC1_OFF != 0 {
                    state.pll_soc1_on = false;
                }
            }
            tcdm::MB1H_RESET_MODEM | tcdm::MB1H_RELEASE_USB_WAKEUP => (),
            _ => debug!("prcmu-fw: unknown mailbox 1 request header ({header})"),
        }
        state.it1 |= mbox_bit(1);
    }

    fn service_mb2(state: &mut State) {
        let header = tcdm_read8(state, tcdm::PRCM_MBOX_HEADER_REQ_MB2);
        if header == tcdm::MB2H_DPS {
            let status = state.dps_status.unwrap_or(tcdm::HWACC_PWR_ST_OK);
            tcdm_write8(state, tcdm::PRCM_ACK_MB2_DPS_STATUS, status);
        }
        state.it1 |= mbox_bit(2);
    }

    fn service_mb3(state: &mut State) {
        let header = tcdm_read8(state, tcdm::PRCM_MBOX_HEADER_REQ_MB3);
        if header == tcdm::MB3H_SYSCLK {
            let enable = tcdm_read8(state, tcdm::PRCM_REQ_MB3_SYSCLK_MGT) != 0;
            state.sysclk_on = enable;
            if enable {
                post_wakeup_event(state, WakeupBit::SYSCLK_OK.bits(), &[]);
            }
        }
        state.it1 |= mbox_bit(3);
    }

    fn service_mb4(state: &mut State) {
        let header = tcdm_read8(state, tcdm::PRCM_MBOX_HEADER_REQ_MB4);
        trace!("prcmu-fw: mailbox 4 request ({header})");
        state.it1 |= mbox_bit(4);
    }

    fn service_mb5(state: &mut State) {
        let op = tcdm_read8(state, tcdm::PRCM_REQ_MB5_I2C_SLAVE_OP);
        let reg_addr = tcdm_read8(state, tcdm::PRCM_REQ_MB5_I2C_REG);
        let bank = (op >> 1) & 0x7F;

        if op & 1 != 0 {
            let val = state
                .abb
                .get(&bank)
                .map(|b| b[reg_addr as usize])
                .unwrap_or(0);
            let status = state.i2c_status.unwrap_or(tcdm::I2C_RD_OK);
            tcdm_write8(state, tcdm::PRCM_ACK_MB5_I2C_VAL, val);
            tcdm_write8(state, tcdm::PRCM_ACK_MB5_I2C_STATUS, status);
        } else {
            let val = tcdm_read8(state, tcdm::PRCM_REQ_MB5_I2C_VAL);
            let status = state.i2c_status.unwrap_or(tcdm::I2C_WR_OK);
            if status == tcdm::I2C_WR_OK {
                state.abb.entry(bank).or_insert([0; 256])[reg_addr as usize] = val;
            }
            tcdm_write8(state, tcdm::PRCM_ACK_MB5_I2C_STATUS, status);
        }
        state.it1 |= mbox_bit(5);
    }

    /// Deliver a wakeup event to the host: the firmware-side event words go
    /// into the buffer the read pointer does not currently select, then the
    /// pointer flips over to it. `abb` is the 4500 event FIFO, at most
    /// [`tcdm::PRCM_ACK_MB0_EVENT_4500_NUMBERS`] bytes.
    pub fn post_wakeup_event(&self, dbb_events: u32, abb_events: &[u8]) {
        post_wakeup_event(&mut lock(&self.state), dbb_events, abb_events);
    }

    /// Preload an analog-baseband register value.
    pub fn set_abb_value(&self, slave: u8, reg_addr: u8, value: u8) {
        lock(&self.state)
            .abb
            .entry(abb_bank(slave))
            .or_insert([0; 256])[reg_addr as usize] = value;
    }

    pub fn abb_value(&self, slave: u8, reg_addr: u8) -> u8 {
        lock(&self.state)
            .abb
            .get(&abb_bank(slave))
            .map(|b| b[reg_addr as usize])
            .unwrap_or(0)
    }

    /// Report the given power-transition status through the mailbox 0 ack
    /// region.
    pub fn set_power_transition_status(&self, status: u8) {
        tcdm_write8(
            &mut lock(&self.state),
            tcdm::PRCM_ACK_MB0_AP_PWRSTTR_STATUS,
            status,
        );
    }

    /// Turn responses for one mailbox on or off. With responses off the
    /// pending bit stays set and no ack is produced.
    pub fn set_respond(&self, mailbox: usize, respond: bool) {
        lock(&self.state).respond[mailbox] = respond;
    }

    /// Force the ARM operating-point byte in DVFS acks.
    pub fn set_arm_opp_ack(&self, ack: Option<u8>) {
        lock(&self.state).arm_opp_ack = ack;
    }

    /// Force the APE operating-point byte in DVFS acks.
    pub fn set_ape_opp_ack(&self, ack: Option<u8>) {
        lock(&self.state).ape_opp_ack = ack;
    }

    /// Force the APE voltage status byte (bit 0 set refuses the request).
    pub fn set_voltage_status_ack(&self, ack: Option<u8>) {
        lock(&self.state).voltage_status_ack = ack;
    }

    /// Force the power-domain status byte in mailbox 2 acks.
    pub fn set_dps_status(&self, status: Option<u8>) {
        lock(&self.state).dps_status = status;
    }

    /// Force the I2C status byte in mailbox 5 acks. A forced status also
    /// suppresses the register-bank write.
    pub fn set_i2c_status(&self, status: Option<u8>) {
        lock(&self.state).i2c_status = status;
    }

    /// Number of requests serviced on a mailbox.
    pub fn transaction_count(&self, mailbox: usize) -> u32 {
        lock(&self.state).transactions[mailbox]
    }

    /// Request headers serviced on mailbox 0, in order.
    pub fn mb0_headers(&self) -> Vec<u8> {
        lock(&self.state).mb0_headers.clone()
    }

    pub fn violations(&self) -> Vec<OwnershipViolation> {
        lock(&self.state).violations.clone()
    }

    pub fn pll_soc1_on(&self) -> bool {
        lock(&self.state).pll_soc1_on
    }

    pub fn sysclk_on(&self) -> bool {
        lock(&self.state).sysclk_on
    }

    pub fn soft_reset_count(&self) -> u32 {
        lock(&self.state).soft_resets
    }

    /// Interrupt bits currently asserted toward the host. Harness loops
    /// treat the line as level-triggered: raise the driver's interrupt
    /// entry point while this is nonzero.
    pub fn pending_irqs(&self) -> u32 {
        lock(&self.state).it1
    }

    /// Host-to-firmware pending bits not yet drained by `service`.
    pub fn pending_requests(&self) -> u32 {
        lock(&self.state).cpu_val
    }

    /// Raw register-window cell, for asserting on clock-tree writes.
    pub fn reg_value(&self, offset: u32) -> u32 {
        reg_read(&lock(&self.state), offset)
    }

    pub fn set_reg_value(&self, offset: u32, value: u32) {
        reg_write(&mut lock(&self.state), offset, value);
    }

    pub fn tcdm_value(&self, offset: u32) -> u8 {
        tcdm_read8(&lock(&self.state), offset)
    }

    pub fn set_tcdm_value(&self, offset: u32, value: u8) {
        tcdm_write8(&mut lock(&self.state), offset, value);
    }
}

fn post_wakeup_event(state: &mut State, dbb_events: u32, abb_events: &[u8]) {
    state.read_pointer ^= 1;
    let (dbb_off, abb_off) = if state.read_pointer & 1 != 0 {
        (
            tcdm::PRCM_ACK_MB0_WAKEUP_1_8500,
            tcdm::PRCM_ACK_MB0_WAKEUP_1_4500,
        )
    } else {
        (
            tcdm::PRCM_ACK_MB0_WAKEUP_0_8500,
            tcdm::PRCM_ACK_MB0_WAKEUP_0_4500,
        )
    };
    tcdm_write32(state, dbb_off, dbb_events);
    for (i, b) in abb_events
        .iter()
        .take(tcdm::PRCM_ACK_MB0_EVENT_4500_NUMBERS as usize)
        .enumerate()
    {
        tcdm_write8(state, abb_off + i as u32, *b);
    }
    tcdm_write8(state, tcdm::PRCM_ACK_MB0_READ_POINTER, state.read_pointer);
    tcdm_write8(state, tcdm::PRCM_MBOX_HEADER_ACK_MB0, tcdm::MB0H_WAKEUP_EXE);
    state.it1 |= mbox_bit(0);
}

fn reg_read(state: &State, offset: u32) -> u32 {
    state
        .regs
        .read(AccessSize::Word, offset)
        .unwrap_or_else(|e| panic!("register read fault at 0x{offset:x}: {e:?}"))
}

fn reg_write(state: &mut State, offset: u32, value: u32) {
    state
        .regs
        .write(AccessSize::Word, offset, value)
        .unwrap_or_else(|e| panic!("register write fault at 0x{offset:x}: {e:?}"));
}

fn tcdm_read8(state: &State, offset: u32) -> u8 {
    state
        .tcdm
        .read(AccessSize::Byte, offset)
        .unwrap_or_else(|e| panic!("tcdm read fault at 0x{offset:x}: {e:?}")) as u8
}

fn tcdm_write8(state: &mut State, offset: u32, value: u8) {
    state
        .tcdm
        .write(AccessSize::Byte, offset, u32::from(value))
        .unwrap_or_else(|e| panic!("tcdm write fault at 0x{offset:x}: {e:?}"));
}

fn tcdm_read32(state: &State, offset: u32) -> u32 {
    state
        .tcdm
        .read(AccessSize::Word, offset)
        .unwrap_or_else(|e| panic!("tcdm read fault at 0x{offset:x}: {e:?}"))
}

fn tcdm_write32(state: &mut State, offset: u32, value: u32) {
    state
        .tcdm
        .write(AccessSize::Word, offset, value)
        .unwrap_or_else(|e| panic!("tcdm write fault at 0x{offset:x}: {e:?}"));
}

impl Mmio for PrcmuFirmware {
    fn read(&self, size: AccessSize, addr: u32) -> u32 {
        let state = lock(&self.state);
        if (PRCMU_REG_BASE..PRCMU_REG_BASE + PRCMU_REG_SIZE).contains(&addr) {
            let offset = addr - PRCMU_REG_BASE;
            return match offset {
                reg::PRCM_MBOX_CPU_VAL => state.cpu_val,
                reg::PRCM_ARM_IT1_VAL => state.it1,
                reg::PRCM_HOSTACCESS_REQ => state.hostaccess,
                _ => state
                    .regs
                    .read(size, offset)
                    .unwrap_or_else(|e| panic!("register read fault at 0x{offset:x}: {e:?}")),
            };
        }
        if (PRCMU_TCDM_BASE..PRCMU_TCDM_BASE + PRCMU_TCDM_SIZE).contains(&addr) {
            let offset = addr - PRCMU_TCDM_BASE;
            return state
                .tcdm
                .read(size, offset)
                .unwrap_or_else(|e| panic!("tcdm read fault at 0x{offset:x}: {e:?}"));
        }
        panic!("read outside the PRCMU windows: 0x{addr:08x}");
    }

    fn write(&self, size: AccessSize, addr: u32, val: u32) {
        let mut state = lock(&self.state);
        if (PRCMU_REG_BASE..PRCMU_REG_BASE + PRCMU_REG_SIZE).contains(&addr) {
            let offset = addr - PRCMU_REG_BASE;
            match offset {
                reg::PRCM_MBOX_CPU_SET => state.cpu_val |= val,
                reg::PRCM_ARM_IT1_CLR => state.it1 &= !val,
                reg::PRCM_APE_SOFTRST => state.soft_resets += 1,
                reg::PRCM_HOSTACCESS_REQ => {
                    let was = state.hostaccess & reg::PRCM_HOSTACCESS_REQ_HOSTACCESS_REQ;
                    let now = val & reg::PRCM_HOSTACCESS_REQ_HOSTACCESS_REQ;
                    state.hostaccess = val;
                    if state.respond[0] && was != now {
                        let ack = if now != 0 {
                            WakeupBit::AC_WAKE_ACK
                        } else {
                            WakeupBit::AC_SLEEP_ACK
                        };
                        post_wakeup_event(&mut state, ack.bits(), &[]);
                    }
                }
                _ => state
                    .regs
                    .write(size, offset, val)
                    .unwrap_or_else(|e| panic!("register write fault at 0x{offset:x}: {e:?}")),
            }
            return;
        }
        if (PRCMU_TCDM_BASE..PRCMU_TCDM_BASE + PRCMU_TCDM_SIZE).contains(&addr) {
            let offset = addr - PRCMU_TCDM_BASE;
            for n in 0..6 {
                if state.cpu_val & mbox_bit(n) == 0 {
                    continue;
                }
                let (start, len) = tcdm::req_region(n);
                let header = tcdm::_PRCM_MBOX_HEADER + n as u32;
                if (start..start + len).contains(&offset) || offset == header {
                    state.violations.push(OwnershipViolation {
                        mailbox: n,
                        offset,
                    });
                }
            }
            state
                .tcdm
                .write(size, offset, val)
                .unwrap_or_else(|e| panic!("tcdm write fault at 0x{offset:x}: {e:?}"));
            return;
        }
        panic!("write outside the PRCMU windows: 0x{addr:08x}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox5_register_bank_round_trip() {
        let fw = PrcmuFirmware::new();
        fw.set_tcdm_value(tcdm::PRCM_REQ_MB5_I2C_SLAVE_OP, tcdm::i2c_write_op(0x0F));
        fw.set_tcdm_value(tcdm::PRCM_REQ_MB5_I2C_REG, 0x42);
        fw.set_tcdm_value(tcdm::PRCM_REQ_MB5_I2C_VAL, 0xA5);
        fw.write(
            AccessSize::Word,
            PRCMU_REG_BASE + reg::PRCM_MBOX_CPU_SET,
            mbox_bit(5),
        );
        fw.service();

        assert_eq!(fw.abb_value(0x0F, 0x42), 0xA5);
        assert_eq!(
            fw.tcdm_value(tcdm::PRCM_ACK_MB5_I2C_STATUS),
            tcdm::I2C_WR_OK
        );
        assert_eq!(
            fw.read(AccessSize::Word, PRCMU_REG_BASE + reg::PRCM_ARM_IT1_VAL),
            mbox_bit(5)
        );
        // Pending bit consumed.
        assert_eq!(
            fw.read(AccessSize::Word, PRCMU_REG_BASE + reg::PRCM_MBOX_CPU_VAL),
            0
        );
    }

    #[test]
    fn test_wakeup_event_double_buffering() {
        let fw = PrcmuFirmware::new();
        fw.post_wakeup_event(WakeupBit::RTC.bits(), &[]);
        assert_eq!(fw.tcdm_value(tcdm::PRCM_ACK_MB0_READ_POINTER) & 1, 1);
        fw.post_wakeup_event(WakeupBit::USB.bits(), &[1, 2, 3]);
        assert_eq!(fw.tcdm_value(tcdm::PRCM_ACK_MB0_READ_POINTER) & 1, 0);
        assert_eq!(fw.tcdm_value(tcdm::PRCM_ACK_MB0_WAKEUP_0_4500), 1);
        // The first buffer still holds the earlier event word.
        assert_eq!(
            fw.tcdm_value(tcdm::PRCM_ACK_MB0_WAKEUP_1_8500),
            WakeupBit::RTC.bits() as u8
        );
    }

    #[test]
    fn test_payload_write_while_pending_is_recorded() {
        let fw = PrcmuFirmware::new();
        fw.write(
            AccessSize::Word,
            PRCMU_REG_BASE + reg::PRCM_MBOX_CPU_SET,
            mbox_bit(1),
        );
        fw.write(
            AccessSize::Byte,
            PRCMU_TCDM_BASE + tcdm::PRCM_REQ_MB1_ARM_OPP,
            0x02,
        );
        let violations = fw.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].mailbox, 1);
        assert_eq!(violations[0].offset, tcdm::PRCM_REQ_MB1_ARM_OPP);
    }
}
