// Temperature and health driven blocking with hysteresis.

mod common;

use common::{controller, controller_with, t0, Applied};
use embassy_time::Duration;

use wave_charger::config::{ChargerConfig, THERMAL_LIMITS_HIGH_END};
use wave_charger::controller::ChargeEvent;
use wave_charger::reason::DischargeReasonMask;
use wave_charger::state::{BatteryHealth, CableType, ChargeStatus, PropertyWrite};

#[test]
fn overheat_blocks_then_recovers_past_hysteresis_point() {
    let mut ctrl = controller();
    let mut now = t0();

    ctrl.programmer_mut().vdc = true;
    ctrl.handle_event(ChargeEvent::CableChanged(CableType::Ac), now);

    // 60.0 C is over the default 50.0 C block threshold
    now += Duration::from_secs(60);
    ctrl.handle_event(ChargeEvent::PropertyWrite(PropertyWrite::Temp(600)), now);

    assert!(ctrl.reason_mask().contains(DischargeReasonMask::OVERHEAT));
    assert!(!ctrl.charge_state().charging);
    assert_eq!(ctrl.charge_state().status, ChargeStatus::NotCharging);
    assert_eq!(ctrl.programmer().applied.last(), Some(&Applied::Disabled));

    // 45.0 C is below block but above the 42.0 C recovery point
    now += Duration::from_secs(60);
    ctrl.handle_event(ChargeEvent::PropertyWrite(PropertyWrite::Temp(450)), now);
    assert!(ctrl.reason_mask().contains(DischargeReasonMask::OVERHEAT));
    assert!(!ctrl.charge_state().charging);

    // 41.0 C crosses the recovery point, charging resumes
    now += Duration::from_secs(60);
    ctrl.handle_event(ChargeEvent::PropertyWrite(PropertyWrite::Temp(410)), now);
    assert!(ctrl.reason_mask().is_empty());
    assert!(ctrl.charge_state().charging);
    assert_eq!(ctrl.charge_state().status, ChargeStatus::Charging);
}

#[test]
fn freeze_blocks_at_low_temperature() {
    let mut ctrl = controller();
    let mut now = t0();

    ctrl.programmer_mut().vdc = true;
    ctrl.handle_event(ChargeEvent::CableChanged(CableType::Ac), now);

    now += Duration::from_secs(60);
    ctrl.handle_event(ChargeEvent::PropertyWrite(PropertyWrite::Temp(-50)), now);
    assert!(ctrl.reason_mask().contains(DischargeReasonMask::FREEZE));
    assert!(!ctrl.charge_state().charging);

    // 1.0 C is above block (0.0) but below recovery (2.0)
    now += Duration::from_secs(60);
    ctrl.handle_event(ChargeEvent::PropertyWrite(PropertyWrite::Temp(10)), now);
    assert!(ctrl.reason_mask().contains(DischargeReasonMask::FREEZE));

    now += Duration::from_secs(60);
    ctrl.handle_event(ChargeEvent::PropertyWrite(PropertyWrite::Temp(30)), now);
    assert!(ctrl.reason_mask().is_empty());
    assert!(ctrl.charge_state().charging);
}

#[test]
fn bad_health_report_blocks_even_at_benign_temperature() {
    let mut ctrl = controller();
    let mut now = t0();

    ctrl.programmer_mut().vdc = true;
    ctrl.handle_event(ChargeEvent::CableChanged(CableType::Ac), now);

    now += Duration::from_secs(60);
    ctrl.handle_event(
        ChargeEvent::PropertyWrite(PropertyWrite::Health(BatteryHealth::Overheat)),
        now,
    );

    assert!(ctrl.reason_mask().contains(DischargeReasonMask::OVERHEAT));
    assert!(!ctrl.charge_state().charging);

    // temperature is fine the whole time, so a Good report recovers
    // immediately through the hysteresis clear
    now += Duration::from_secs(60);
    ctrl.handle_event(
        ChargeEvent::PropertyWrite(PropertyWrite::Health(BatteryHealth::Good)),
        now,
    );
    assert!(ctrl.reason_mask().is_empty());
    assert!(ctrl.charge_state().charging);
}

#[test]
fn high_end_profile_uses_its_own_thresholds() {
    let config = ChargerConfig {
        thermal: THERMAL_LIMITS_HIGH_END,
        ..ChargerConfig::default()
    };
    let mut ctrl = controller_with(config);
    let mut now = t0();

    ctrl.programmer_mut().vdc = true;
    ctrl.handle_event(ChargeEvent::CableChanged(CableType::Ac), now);

    // 60.0 C blocks the default profile but not the high-end one
    now += Duration::from_secs(60);
    ctrl.handle_event(ChargeEvent::PropertyWrite(PropertyWrite::Temp(600)), now);
    assert!(ctrl.reason_mask().is_empty());
    assert!(ctrl.charge_state().charging);

    now += Duration::from_secs(60);
    ctrl.handle_event(ChargeEvent::PropertyWrite(PropertyWrite::Temp(640)), now);
    assert!(ctrl.reason_mask().contains(DischargeReasonMask::OVERHEAT));

    // recovery point is 58.0 C on the high-end profile
    now += Duration::from_secs(60);
    ctrl.handle_event(ChargeEvent::PropertyWrite(PropertyWrite::Temp(575)), now);
    assert!(ctrl.reason_mask().is_empty());
}
