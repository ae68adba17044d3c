use embassy_time::Instant;

use wave_charger::config::{ChargeProfile, ChargerConfig};
use wave_charger::controller::ChargeController;
use wave_charger::programmer::{ChargeRegisterProgrammer, ChargeSetting};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Disabled,
    Enabled(ChargeProfile),
}

/// Records every register programming request and lets tests drive
/// the VDC sense bit and inject bus faults.
#[derive(Default)]
pub struct FakeProgrammer {
    pub vdc: bool,
    pub fail_apply: bool,
    pub fail_vdc: bool,
    pub applied: Vec<Applied>,
}

impl ChargeRegisterProgrammer for FakeProgrammer {
    type Error = BusError;

    fn apply(&mut self, setting: ChargeSetting<'_>) -> Result<(), BusError> {
        if self.fail_apply {
            return Err(BusError);
        }

        self.applied.push(match setting {
            ChargeSetting::Disabled => Applied::Disabled,
            ChargeSetting::Enabled(profile) => Applied::Enabled(*profile),
        });
        Ok(())
    }

    fn vdc_present(&mut self) -> Result<bool, BusError> {
        if self.fail_vdc {
            return Err(BusError);
        }
        Ok(self.vdc)
    }
}

pub fn t0() -> Instant {
    Instant::from_secs(1_000)
}

pub fn controller() -> ChargeController<FakeProgrammer> {
    ChargeController::new(ChargerConfig::default(), FakeProgrammer::default(), t0())
        .expect("default config must construct")
}

#[allow(dead_code)]
pub fn controller_with(config: ChargerConfig) -> ChargeController<FakeProgrammer> {
    ChargeController::new(config, FakeProgrammer::default(), t0())
        .expect("config must construct")
}
