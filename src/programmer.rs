use core::fmt::Debug;

use crate::config::ChargeProfile;

/// What the hardware should be doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeSetting<'a> {
    Disabled,
    Enabled(&'a ChargeProfile),
}

/// The hardware seam: pushes a charge decision into the PMIC and
/// samples the external-power detect bit.
///
/// `apply` may block on the I2C bus, so implementations are only ever
/// driven from the charger task, never from interrupt context. A bus
/// error is a transient fault: the in-memory decision stands and the
/// next tick retries naturally.
pub trait ChargeRegisterProgrammer {
    type Error: Debug;

    fn apply(&mut self, setting: ChargeSetting<'_>) -> Result<(), Self::Error>;

    /// Whether an external power source is electrically present,
    /// independent of which cable type was reported.
    fn vdc_present(&mut self) -> Result<bool, Self::Error>;
}
