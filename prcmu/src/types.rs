/*++

Licensed under the Apache-2.0 license.

File Name:

    types.rs

Abstract:

    Firmware protocol value types: operating points, power states, power
    domains and romcode handshake values. Discriminants are the wire
    encodings.

--*/

/// ARM operating point.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum ArmOpp {
    NoChange = 0x01,
    Opp100 = 0x02,
    Opp50 = 0x03,
    MaxOpp = 0x04,
    MaxFreq100 = 0x05,
    ExtClk = 0x07,
}

/// APE operating point. `Opp50Partly25` is a host-side refinement of
/// `Opp50` where interconnect clocks are additionally halved; on the wire
/// it is requested as `Opp50`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum ApeOpp {
    NoChange = 0x01,
    Opp100 = 0x02,
    Opp50 = 0x03,
    Opp50Partly25 = 0xFF,
}

impl ApeOpp {
    /// The encoding actually sent to the firmware.
    pub(crate) fn wire_value(self) -> u8 {
        match self {
            ApeOpp::Opp50Partly25 => ApeOpp::Opp50 as u8,
            other => other as u8,
        }
    }
}

/// DDR operating point, written to the DDR subsystem bandwidth register.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum DdrOpp {
    Opp100 = 0x00,
    Opp50 = 0x01,
    Opp25 = 0x02,
}

/// AP power state requested through mailbox 0.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum ApPowerState {
    Sleep = 0x01,
    DeepSleep = 0x02,
    Idle = 0x03,
    DeepIdle = 0x04,
}

/// Power domains controlled through mailbox 2. The discriminant is the
/// byte index within the request region.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum EpodId {
    SvaMmdsp = 0,
    SvaPipe = 1,
    SiaMmdsp = 2,
    SiaPipe = 3,
    Sga = 4,
    B2r2Mcde = 5,
    Esram12 = 6,
    Esram34 = 7,
}

pub const NUM_EPOD_ID: usize = 8;

impl EpodId {
    /// Whether the domain's RAM can be kept in retention while it is off.
    pub fn supports_ram_retention(self) -> bool {
        matches!(
            self,
            EpodId::SvaMmdsp | EpodId::SiaMmdsp | EpodId::Esram12 | EpodId::Esram34
        )
    }
}

/// Requested power-domain state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum EpodState {
    NoChange = 0x00,
    Off = 0x01,
    RamRetention = 0x02,
    On = 0x03,
}

/// esram0 state to apply in ApDeepSleep.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Esram0DeepSleepState {
    Off = 1,
    Retention = 2,
}

// DDR power states used in the mailbox 4 memory-state request.
pub(crate) const DDR_PWR_STATE_ON: u8 = 0x01;
pub(crate) const DDR_PWR_STATE_OFFHIGHLAT: u8 = 0x03;

/// Power-state sequence requests written to the romcode handshake byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum RomcodeWrite {
    ReadyToDeepSleep = 0x09,
    ReadyToXp70Reset = 0x10,
}

/// Power-state transitions reported back by the romcode.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum RomcodeRead {
    Init = 0x00,
    FsToDs = 0x0A,
    EndDs = 0x0B,
    DsToFs = 0x0C,
    EndFs = 0x0D,
    Swr = 0x0E,
    EndSwr = 0x0F,
}

impl RomcodeRead {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(RomcodeRead::Init),
            0x0A => Some(RomcodeRead::FsToDs),
            0x0B => Some(RomcodeRead::EndDs),
            0x0C => Some(RomcodeRead::DsToFs),
            0x0D => Some(RomcodeRead::EndFs),
            0x0E => Some(RomcodeRead::Swr),
            0x0F => Some(RomcodeRead::EndSwr),
            _ => None,
        }
    }
}

/// Source selectors for the programmable clock outputs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum ClkoutSource {
    Clk38M = 0x00,
    AClk = 0x01,
    SysClk = 0x02,
    LcdClk = 0x03,
    SdmmcClk = 0x04,
    TvClk = 0x05,
    TimClk = 0x06,
    Clk009 = 0x07,
}

pub const AUTO_PM_OFF: u8 = 0x00;
pub const AUTO_PM_ON: u8 = 0x01;

/// Autonomous power-management configuration for one AP state, packed into
/// a shared TCDM word.
#[derive(Debug, Copy, Clone, Default)]
pub struct AutoPmConfig {
    pub sva_auto_pm_enable: u8,
    pub sia_auto_pm_enable: u8,
    pub sva_power_on: u8,
    pub sia_power_on: u8,
    pub sva_policy: u8,
    pub sia_policy: u8,
}

impl AutoPmConfig {
    pub(crate) fn pack(&self) -> u32 {
        let mut cfg = u32::from(self.sva_auto_pm_enable & 0xF);
        cfg = (cfg << 4) | u32::from(self.sia_auto_pm_enable & 0xF);
        cfg = (cfg << 8) | u32::from(self.sva_power_on);
        cfg = (cfg << 8) | u32::from(self.sia_power_on);
        cfg = (cfg << 4) | u32::from(self.sva_policy & 0xF);
        (cfg << 4) | u32::from(self.sia_policy & 0xF)
    }

    pub(crate) fn enables_auto_pm(&self) -> bool {
        self.sva_auto_pm_enable == AUTO_PM_ON || self.sia_auto_pm_enable == AUTO_PM_ON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_pm_packing() {
        let cfg = AutoPmConfig {
            sva_auto_pm_enable: AUTO_PM_ON,
            sia_auto_pm_enable: AUTO_PM_OFF,
            sva_power_on: 0xAB,
            sia_power_on: 0xCD,
            sva_policy: 0x2,
            sia_policy: 0x3,
        };
        assert_eq!(cfg.pack(), 0x10AB_CD23);
        assert!(cfg.enables_auto_pm());
    }

    #[test]
    fn test_ape_opp_wire_value() {
        assert_eq!(ApeOpp::Opp50Partly25.wire_value(), ApeOpp::Opp50 as u8);
        assert_eq!(ApeOpp::Opp100.wire_value(), 0x02);
    }
}
