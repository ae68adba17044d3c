// The "why are we not charging" bitmask and the fixed-order pass that
// maintains it. Each flag is cleared only by its own recovery
// condition; later rules may re-assert a flag a recovery rule cleared
// earlier in the same pass, and that ordering is load-bearing.

use bitflags::bitflags;
use embassy_time::Instant;

use crate::config::ThermalLimits;
use crate::deadline::DeadlineTracker;
use crate::state::{BatteryFacts, BatteryHealth, ChargeState};

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct DischargeReasonMask: u8 {
        const BATTERY_FULL = 0x1;
        const OVERHEAT = 0x2;
        const FREEZE = 0x4;
        const OVER_TIME = 0x8;
    }
}

pub struct DischargeReasonEvaluator {
    thermal: ThermalLimits,
}

impl DischargeReasonEvaluator {
    pub const fn new(thermal: ThermalLimits) -> DischargeReasonEvaluator {
        DischargeReasonEvaluator { thermal }
    }

    /// One evaluation pass. Mutates the full/timeout latches on
    /// `charge` and returns the updated reason mask.
    pub fn evaluate(
        &self,
        facts: &BatteryFacts,
        deadline: &DeadlineTracker,
        charge: &mut ChargeState,
        mask: DischargeReasonMask,
        now: Instant,
    ) -> DischargeReasonMask {
        let mut next = mask;

        // recovery conditions, each scoped to its own flag
        if mask.contains(DischargeReasonMask::BATTERY_FULL) && facts.percentage < 100 {
            next.remove(DischargeReasonMask::BATTERY_FULL);
        }

        if mask.contains(DischargeReasonMask::OVERHEAT)
            && facts.temp_decic <= self.thermal.high_recover_decic
        {
            next.remove(DischargeReasonMask::OVERHEAT);
        }

        if mask.contains(DischargeReasonMask::FREEZE)
            && facts.temp_decic >= self.thermal.low_recover_decic
        {
            next.remove(DischargeReasonMask::FREEZE);
        }

        if mask.contains(DischargeReasonMask::OVER_TIME) && facts.percentage < 100 {
            next.remove(DischargeReasonMask::OVER_TIME);
        }

        if facts.percentage >= 100 {
            charge.is_full = true;
            charge.full_pending = true;
        }

        // the pending latch wins over the percentage recovery above
        if charge.full_pending {
            next.insert(DischargeReasonMask::BATTERY_FULL);
        }

        // health reports and hard temperature blocks override any
        // thermal recovery from this same pass
        match facts.health {
            BatteryHealth::Good => {}
            BatteryHealth::Overheat => next.insert(DischargeReasonMask::OVERHEAT),
            _ => next.insert(DischargeReasonMask::FREEZE),
        }

        if facts.temp_decic >= self.thermal.high_block_decic {
            next.insert(DischargeReasonMask::OVERHEAT);
        }
        if facts.temp_decic <= self.thermal.low_block_decic {
            next.insert(DischargeReasonMask::FREEZE);
        }

        if deadline.expired(now) {
            charge.charge_timeout_latched = true;
            next.insert(DischargeReasonMask::OVER_TIME);
        }

        next
    }
}
