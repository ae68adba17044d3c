// Ties the evaluator, decision engine, deadline tracker and poll
// scheduler together behind a single event entry point. Every inbound
// signal source funnels into `handle_event`, so one evaluation pass
// (evaluate -> decide -> apply) is always a single critical section
// and concurrent sources serialize instead of interleaving.

use embassy_time::{Duration, Instant};
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::config::{ChargeProfile, ChargerConfig, ProfileTable, POLL_LEAD};
use crate::deadline::DeadlineTracker;
use crate::decision::{ChargeDecisionEngine, ProfileKind};
use crate::poll::{PollPlan, PollScheduler};
use crate::programmer::{ChargeRegisterProgrammer, ChargeSetting};
use crate::reason::{DischargeReasonEvaluator, DischargeReasonMask};
use crate::state::{
    BatteryFacts, BatterySnapshot, CableType, ChargeState, DebugAttr, Property, PropertyValue,
    PropertyWrite,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum ChargerError {
    #[error("no charge profile table supplied")]
    NoProfileTable,
    #[error("invalid charger configuration")]
    BadConfig,
}

/// One inbound signal. All sources (timer, interrupt, property write,
/// suspend notifier) produce these; the charger task consumes them one
/// at a time.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChargeEvent {
    CableChanged(CableType),
    PropertyWrite(PropertyWrite),
    DebugAttrWrite(DebugAttr, bool),
    FullBatteryInterrupt,
    SuspendStateChanged(bool),
    Tick,
}

/// What one handled event asks of the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Next wake request, when this event completed an evaluation.
    pub plan: Option<PollPlan>,
    pub battery_changed: bool,
    pub supplies_changed: bool,
    pub power_off_requested: bool,
    /// A register access failed this tick. The in-memory decision
    /// stands; the hardware may lag until the next successful tick.
    pub programmer_fault: bool,
}

pub struct ChargeController<P: ChargeRegisterProgrammer> {
    programmer: P,
    profiles: ProfileTable,
    evaluator: DischargeReasonEvaluator,
    engine: ChargeDecisionEngine,

    facts: BatteryFacts,
    cable: CableType,
    vdc_present: bool,
    charge: ChargeState,
    mask: DischargeReasonMask,
    deadline: DeadlineTracker,
    poll: PollScheduler,
}

impl<P: ChargeRegisterProgrammer> ChargeController<P> {
    pub fn new(
        config: ChargerConfig,
        programmer: P,
        now: Instant,
    ) -> Result<ChargeController<P>, ChargerError> {
        let profiles = config.profiles.ok_or(ChargerError::NoProfileTable)?;
        Self::validate(&config)?;

        info!(
            "Charger - controller init, lpm_charging_mode={}",
            config.lpm_charging_mode
        );

        Ok(ChargeController {
            programmer,
            profiles,
            evaluator: DischargeReasonEvaluator::new(config.thermal),
            engine: ChargeDecisionEngine::new(
                config.full_charge_window,
                config.recharge_window,
                config.lpm_charging_mode,
            ),
            facts: BatteryFacts::default(),
            cable: CableType::None,
            vdc_present: false,
            charge: ChargeState::default(),
            mask: DischargeReasonMask::empty(),
            deadline: DeadlineTracker::new(),
            poll: PollScheduler::new(config.fast_poll, config.slow_poll, now),
        })
    }

    fn validate(config: &ChargerConfig) -> Result<(), ChargerError> {
        let t = &config.thermal;
        if t.high_recover_decic >= t.high_block_decic || t.low_block_decic >= t.low_recover_decic {
            return Err(ChargerError::BadConfig);
        }

        if config.full_charge_window == Duration::from_ticks(0)
            || config.recharge_window == Duration::from_ticks(0)
        {
            return Err(ChargerError::BadConfig);
        }

        if config.fast_poll <= POLL_LEAD || config.slow_poll < config.fast_poll {
            return Err(ChargerError::BadConfig);
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: ChargeEvent, now: Instant) -> TickReport {
        match event {
            ChargeEvent::CableChanged(cable) => {
                info!("Charger - cable changed: {:?}", cable);
                self.cable = cable;
                let mut report = self.run_tick(now);
                report.supplies_changed = true;
                report
            }
            ChargeEvent::PropertyWrite(write) => {
                self.apply_property(write);
                self.run_tick(now)
            }
            ChargeEvent::DebugAttrWrite(attr, value) => {
                match attr {
                    DebugAttr::ChargingModeBooting => {
                        self.engine.set_lpm_charging_mode(value);
                    }
                    DebugAttr::BattFullCheck => {
                        self.charge.is_full = value;
                    }
                }
                self.run_tick(now)
            }
            ChargeEvent::FullBatteryInterrupt => {
                info!("Charger - pmic battery full interrupt");
                self.charge.is_full = true;
                self.charge.full_pending = true;
                self.mask.insert(DischargeReasonMask::BATTERY_FULL);
                self.run_tick(now)
            }
            ChargeEvent::SuspendStateChanged(true) => TickReport {
                plan: self.poll.entered_suspend(self.charge.charging),
                ..TickReport::default()
            },
            ChargeEvent::SuspendStateChanged(false) => {
                if self.poll.left_suspend() {
                    // we were on the slow cycle, resample immediately
                    self.run_tick(now)
                } else {
                    TickReport::default()
                }
            }
            ChargeEvent::Tick => self.run_tick(now),
        }
    }

    fn apply_property(&mut self, write: PropertyWrite) {
        match write {
            PropertyWrite::Status(status) => self.charge.status = status,
            PropertyWrite::Health(health) => self.facts.health = health,
            PropertyWrite::Present(present) => self.facts.present = present,
            PropertyWrite::Temp(temp_decic) => self.facts.temp_decic = temp_decic,
            PropertyWrite::Capacity(percentage) => self.facts.percentage = percentage,
        }
    }

    /// One full evaluation pass. Runs to completion once started; the
    /// poll timestamp only advances when the pass finishes.
    fn run_tick(&mut self, now: Instant) -> TickReport {
        let mut fault = false;

        match self.programmer.vdc_present() {
            Ok(vdc) => self.vdc_present = vdc,
            Err(err) => {
                // keep the last known value, next tick resamples
                warn!("Charger - vdc sense failed: {:?}", err);
                fault = true;
            }
        }

        self.mask = self.evaluator.evaluate(
            &self.facts,
            &self.deadline,
            &mut self.charge,
            self.mask,
            now,
        );

        debug!(
            "Charger - level {}%, reasons {:?}, deadline {:?}",
            self.facts.percentage,
            self.mask,
            self.deadline.deadline()
        );

        let decision = self.engine.decide(
            self.cable,
            self.vdc_present,
            &mut self.mask,
            &mut self.charge,
            &mut self.deadline,
            now,
        );

        let setting = match decision.profile {
            Some(ProfileKind::Ac) => ChargeSetting::Enabled(&self.profiles.ac),
            Some(ProfileKind::Usb) => ChargeSetting::Enabled(&self.profiles.usb),
            None => ChargeSetting::Disabled,
        };

        if let Err(err) = self.programmer.apply(setting) {
            // transient: the in-memory decision stands, hardware
            // catches up on the next successful tick
            error!("Charger - charge register apply failed: {:?}", err);
            fault = true;
        }

        TickReport {
            plan: Some(self.poll.completed_poll(now)),
            battery_changed: true,
            supplies_changed: false,
            power_off_requested: decision.request_power_off,
            programmer_fault: fault,
        }
    }

    pub fn snapshot(&self) -> BatterySnapshot {
        BatterySnapshot {
            status: self.charge.status,
            health: self.facts.health,
            present: self.facts.present,
            temp_decic: self.facts.temp_decic,
            percentage: self.facts.percentage,
            charging: self.charge.charging,
            is_full: self.charge.is_full,
            usb_online: self.cable == CableType::Usb && self.vdc_present,
            ac_online: self.cable == CableType::Ac && self.vdc_present,
            charging_mode_booting: self.engine.lpm_charging_mode(),
        }
    }

    pub fn get_property(&self, prop: Property) -> PropertyValue {
        self.snapshot().property(prop)
    }

    pub fn charge_state(&self) -> &ChargeState {
        &self.charge
    }

    pub fn reason_mask(&self) -> DischargeReasonMask {
        self.mask
    }

    pub fn deadline(&self) -> &DeadlineTracker {
        &self.deadline
    }

    pub fn facts(&self) -> &BatteryFacts {
        &self.facts
    }

    pub fn cable(&self) -> CableType {
        self.cable
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.poll
    }

    pub fn programmer(&self) -> &P {
        &self.programmer
    }

    pub fn programmer_mut(&mut self) -> &mut P {
        &mut self.programmer
    }

    pub fn active_profile(&self, kind: ProfileKind) -> &ChargeProfile {
        match kind {
            ProfileKind::Ac => &self.profiles.ac,
            ProfileKind::Usb => &self.profiles.usb,
        }
    }
}
