// The central decision: given cable state and the reason mask, decide
// whether the PMIC should charge, which profile to program, and what
// status to report. Also owns the charge-cycle deadline arming and the
// full reset on physical disconnect.

use embassy_time::{Duration, Instant};

use crate::deadline::DeadlineTracker;
use crate::reason::DischargeReasonMask;
use crate::state::{CableType, ChargeState, ChargeStatus};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProfileKind {
    Ac,
    Usb,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Decision {
    pub enable: bool,
    pub status: ChargeStatus,
    pub profile: Option<ProfileKind>,
    pub request_power_off: bool,
}

pub struct ChargeDecisionEngine {
    full_charge_window: Duration,
    recharge_window: Duration,
    lpm_charging_mode: bool,
}

impl ChargeDecisionEngine {
    pub const fn new(
        full_charge_window: Duration,
        recharge_window: Duration,
        lpm_charging_mode: bool,
    ) -> ChargeDecisionEngine {
        ChargeDecisionEngine {
            full_charge_window,
            recharge_window,
            lpm_charging_mode,
        }
    }

    pub fn set_lpm_charging_mode(&mut self, lpm: bool) {
        self.lpm_charging_mode = lpm;
    }

    pub fn lpm_charging_mode(&self) -> bool {
        self.lpm_charging_mode
    }

    pub fn decide(
        &self,
        cable: CableType,
        vdc_present: bool,
        mask: &mut DischargeReasonMask,
        charge: &mut ChargeState,
        deadline: &mut DeadlineTracker,
        now: Instant,
    ) -> Decision {
        if !vdc_present {
            // physical disconnect resets the whole cycle
            charge.charging = false;
            charge.status = ChargeStatus::Discharging;
            charge.is_full = false;
            charge.full_pending = false;
            charge.charge_timeout_latched = false;
            *mask = DischargeReasonMask::empty();
            deadline.clear();

            return Decision {
                enable: false,
                status: charge.status,
                profile: None,
                // booted only to charge, and the charger is gone
                request_power_off: self.lpm_charging_mode,
            };
        }

        if !mask.is_empty() {
            // have external power, but something blocks charging; the
            // evaluator owns clearing the mask, we only stop the clock
            // and drop the full re-arm so a later recharge can start
            charge.charging = false;
            charge.status = if charge.is_full {
                ChargeStatus::Full
            } else {
                ChargeStatus::NotCharging
            };
            charge.full_pending = false;
            deadline.clear();

            return Decision {
                enable: false,
                status: charge.status,
                profile: None,
                request_power_off: false,
            };
        }

        // able to charge
        let window = if charge.is_full || charge.charge_timeout_latched {
            self.recharge_window
        } else {
            self.full_charge_window
        };
        deadline.arm(now, window);

        charge.charging = true;
        charge.status = if charge.is_full {
            ChargeStatus::Full
        } else {
            ChargeStatus::Charging
        };

        Decision {
            enable: true,
            status: charge.status,
            profile: Some(if cable == CableType::Ac {
                ProfileKind::Ac
            } else {
                ProfileKind::Usb
            }),
            request_power_off: false,
        }
    }
}
