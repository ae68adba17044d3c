// Threshold and timing constants for the charge controller.
// Temperatures are in tenths of a degree C, matching what the fuel
// gauge / modem reports over the property interface.

use embassy_time::Duration;

pub const TOTAL_CHARGING_TIME: Duration = Duration::from_secs(6 * 60 * 60);
pub const TOTAL_RECHARGING_TIME: Duration = Duration::from_secs(90 * 60);

pub const FAST_POLL: Duration = Duration::from_secs(60);
pub const SLOW_POLL: Duration = Duration::from_secs(10 * 60);

// The wake request is a range, not an instant, so the platform can
// coalesce it with other wake events: no earlier than T - POLL_LEAD,
// acceptable up to POLL_LEAD + POLL_SLACK later.
pub const POLL_LEAD: Duration = Duration::from_secs(10);
pub const POLL_SLACK: Duration = Duration::from_secs(20);

/// CHGR1 register field codes for one charge profile. Opaque to the
/// state machine beyond "program profile A or B"; the values land in
/// the PMIC's topoff/restart/fast-charge current fields unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChargeProfile {
    pub topoff_current: u8,
    pub restart_threshold: u8,
    pub fast_charge_current: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProfileTable {
    pub ac: ChargeProfile,
    pub usb: ChargeProfile,
}

// AC pulls the full fast-charge current, USB stays within 500mA bus
// budget with a later topoff cutoff.
pub const PROFILE_TABLE_MAX8998: ProfileTable = ProfileTable {
    ac: ChargeProfile {
        topoff_current: 2,
        restart_threshold: 3,
        fast_charge_current: 5,
    },
    usb: ChargeProfile {
        topoff_current: 6,
        restart_threshold: 3,
        fast_charge_current: 2,
    },
};

/// Temperature block/recover thresholds in tenths of a degree C.
/// Block and recover are deliberately separated for hysteresis: a
/// tripped flag only clears once the temperature crosses back past
/// the recover point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThermalLimits {
    pub high_block_decic: i16,
    pub high_recover_decic: i16,
    pub low_block_decic: i16,
    pub low_recover_decic: i16,
}

pub const THERMAL_LIMITS_HIGH_END: ThermalLimits = ThermalLimits {
    high_block_decic: 630,
    high_recover_decic: 580,
    low_block_decic: -40,
    low_recover_decic: 10,
};

pub const THERMAL_LIMITS_DEFAULT: ThermalLimits = ThermalLimits {
    high_block_decic: 500,
    high_recover_decic: 420,
    low_block_decic: 0,
    low_recover_decic: 20,
};

/// Static configuration for one controller instance.
///
/// `lpm_charging_mode` is the "booted only to charge" flag: when the
/// platform set it and external power disappears, the controller
/// requests a platform power-off instead of idling on the battery.
#[derive(Clone, Debug)]
pub struct ChargerConfig {
    pub profiles: Option<ProfileTable>,
    pub thermal: ThermalLimits,
    pub full_charge_window: Duration,
    pub recharge_window: Duration,
    pub fast_poll: Duration,
    pub slow_poll: Duration,
    pub lpm_charging_mode: bool,
}

impl Default for ChargerConfig {
    fn default() -> Self {
        Self {
            profiles: Some(PROFILE_TABLE_MAX8998),
            thermal: THERMAL_LIMITS_DEFAULT,
            full_charge_window: TOTAL_CHARGING_TIME,
            recharge_window: TOTAL_RECHARGING_TIME,
            fast_poll: FAST_POLL,
            slow_poll: SLOW_POLL,
            lpm_charging_mode: false,
        }
    }
}
