// Data model for the charge controller: externally supplied readings,
// the derived charge state, the read/write property surface, and a
// lock-free snapshot other tasks can observe without touching the
// controller's serialized event queue.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};

use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CableType {
    #[default]
    None,
    Usb,
    Ac,
}

impl CableType {
    pub const fn code(self) -> u8 {
        match self {
            CableType::None => 0,
            CableType::Usb => 1,
            CableType::Ac => 2,
        }
    }

    pub const fn from_code(code: u8) -> Option<CableType> {
        match code {
            0 => Some(CableType::None),
            1 => Some(CableType::Usb),
            2 => Some(CableType::Ac),
            _ => None,
        }
    }
}

// Property codes follow the power_supply convention the modem-side
// writer already speaks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BatteryHealth {
    Unknown,
    Good,
    Overheat,
    Dead,
    Cold,
}

impl BatteryHealth {
    pub const fn code(self) -> u8 {
        match self {
            BatteryHealth::Unknown => 0,
            BatteryHealth::Good => 1,
            BatteryHealth::Overheat => 2,
            BatteryHealth::Dead => 3,
            BatteryHealth::Cold => 6,
        }
    }

    pub const fn from_code(code: u8) -> Option<BatteryHealth> {
        match code {
            0 => Some(BatteryHealth::Unknown),
            1 => Some(BatteryHealth::Good),
            2 => Some(BatteryHealth::Overheat),
            3 => Some(BatteryHealth::Dead),
            6 => Some(BatteryHealth::Cold),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChargeStatus {
    Charging,
    Full,
    NotCharging,
    Discharging,
}

impl ChargeStatus {
    pub const fn code(self) -> u8 {
        match self {
            ChargeStatus::Charging => 1,
            ChargeStatus::Discharging => 2,
            ChargeStatus::NotCharging => 3,
            ChargeStatus::Full => 4,
        }
    }

    pub const fn from_code(code: u8) -> Option<ChargeStatus> {
        match code {
            1 => Some(ChargeStatus::Charging),
            2 => Some(ChargeStatus::Discharging),
            3 => Some(ChargeStatus::NotCharging),
            4 => Some(ChargeStatus::Full),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Technology {
    LithiumIon,
}

/// Externally supplied battery readings. The fuel gauge (or the modem
/// on its behalf) pushes these through the writable property surface;
/// the controller itself never measures anything. The defaults are
/// bring-up placeholders that stand in until the first real report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryFacts {
    pub temp_decic: i16,
    pub percentage: u8,
    pub health: BatteryHealth,
    pub present: bool,
}

impl Default for BatteryFacts {
    fn default() -> Self {
        Self {
            temp_decic: 100,
            percentage: 50,
            health: BatteryHealth::Good,
            present: true,
        }
    }
}

/// Derived charging state.
///
/// `is_full` is the externally visible sticky latch: once the battery
/// hits 100% (or the PMIC fires its full interrupt) it stays set until
/// external power goes away. `full_pending` is the re-arm flag the
/// reason evaluator consults when re-asserting the full block; the
/// decision engine drops it while blocked, which is what lets a full
/// battery later re-enter a recharge cycle while `is_full` persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChargeState {
    pub charging: bool,
    pub status: ChargeStatus,
    pub is_full: bool,
    pub full_pending: bool,
    pub charge_timeout_latched: bool,
}

impl Default for ChargeState {
    fn default() -> Self {
        Self {
            charging: false,
            status: ChargeStatus::NotCharging,
            is_full: false,
            full_pending: false,
            charge_timeout_latched: false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Supply {
    Battery,
    Usb,
    Ac,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Property {
    Status,
    Health,
    Present,
    Temp,
    Online,
    Capacity,
    Technology,
}

impl Property {
    pub const fn is_writeable(self) -> bool {
        matches!(
            self,
            Property::Status
                | Property::Health
                | Property::Present
                | Property::Temp
                | Property::Capacity
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PropertyValue {
    Status(ChargeStatus),
    Health(BatteryHealth),
    Present(bool),
    Temp(i16),
    Online(bool),
    Capacity(u8),
    Technology(Technology),
}

/// A validated write to one of the writable properties. Raw external
/// writes go through [`PropertyWrite::parse`] first so malformed input
/// is rejected before anything reaches the controller's event queue.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PropertyWrite {
    Status(ChargeStatus),
    Health(BatteryHealth),
    Present(bool),
    Temp(i16),
    Capacity(u8),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum PropertyError {
    #[error("property is not writable")]
    NotWritable,
    #[error("invalid property value")]
    InvalidValue,
}

impl PropertyWrite {
    pub fn parse(prop: Property, value: i32) -> Result<PropertyWrite, PropertyError> {
        if !prop.is_writeable() {
            return Err(PropertyError::NotWritable);
        }

        match prop {
            Property::Status => {
                let code = u8::try_from(value).map_err(|_| PropertyError::InvalidValue)?;
                ChargeStatus::from_code(code)
                    .map(PropertyWrite::Status)
                    .ok_or(PropertyError::InvalidValue)
            }
            Property::Health => {
                let code = u8::try_from(value).map_err(|_| PropertyError::InvalidValue)?;
                BatteryHealth::from_code(code)
                    .map(PropertyWrite::Health)
                    .ok_or(PropertyError::InvalidValue)
            }
            Property::Present => Ok(PropertyWrite::Present(value != 0)),
            Property::Temp => i16::try_from(value)
                .map(PropertyWrite::Temp)
                .map_err(|_| PropertyError::InvalidValue),
            Property::Capacity => match u8::try_from(value) {
                Ok(pct) if pct <= 100 => Ok(PropertyWrite::Capacity(pct)),
                _ => Err(PropertyError::InvalidValue),
            },
            Property::Online | Property::Technology => Err(PropertyError::NotWritable),
        }
    }
}

/// Debug-style attributes, readable and writable as text. Each write
/// forces an immediate re-evaluation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DebugAttr {
    ChargingModeBooting,
    BattFullCheck,
}

impl DebugAttr {
    pub fn parse(text: &str) -> Result<bool, PropertyError> {
        text.trim()
            .parse::<i32>()
            .map(|v| v != 0)
            .map_err(|_| PropertyError::InvalidValue)
    }
}

/// Read-only view of the controller published after every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatterySnapshot {
    pub status: ChargeStatus,
    pub health: BatteryHealth,
    pub present: bool,
    pub temp_decic: i16,
    pub percentage: u8,
    pub charging: bool,
    pub is_full: bool,
    pub usb_online: bool,
    pub ac_online: bool,
    pub charging_mode_booting: bool,
}

impl Default for BatterySnapshot {
    fn default() -> Self {
        let facts = BatteryFacts::default();
        Self {
            status: ChargeStatus::NotCharging,
            health: facts.health,
            present: facts.present,
            temp_decic: facts.temp_decic,
            percentage: facts.percentage,
            charging: false,
            is_full: false,
            usb_online: false,
            ac_online: false,
            charging_mode_booting: false,
        }
    }
}

impl BatterySnapshot {
    pub fn property(&self, prop: Property) -> PropertyValue {
        match prop {
            Property::Status => PropertyValue::Status(self.status),
            Property::Health => PropertyValue::Health(self.health),
            Property::Present => PropertyValue::Present(self.present),
            Property::Temp => PropertyValue::Temp(self.temp_decic),
            // the battery supply itself is always online
            Property::Online => PropertyValue::Online(true),
            Property::Capacity => PropertyValue::Capacity(self.percentage),
            Property::Technology => PropertyValue::Technology(Technology::LithiumIon),
        }
    }

    pub fn attr(&self, attr: DebugAttr) -> bool {
        match attr {
            DebugAttr::ChargingModeBooting => self.charging_mode_booting,
            DebugAttr::BattFullCheck => self.is_full,
        }
    }
}

/// Atomics-backed mirror of [`BatterySnapshot`] for observers that
/// cannot go through the event queue. Written only by the charger
/// task, read from anywhere.
pub struct SharedBatteryState {
    status: AtomicU8,
    health: AtomicU8,
    present: AtomicBool,
    temp_decic: AtomicI32,
    percentage: AtomicU8,
    charging: AtomicBool,
    is_full: AtomicBool,
    usb_online: AtomicBool,
    ac_online: AtomicBool,
    charging_mode_booting: AtomicBool,
}

impl SharedBatteryState {
    pub const fn new() -> SharedBatteryState {
        SharedBatteryState {
            status: AtomicU8::new(ChargeStatus::NotCharging.code()),
            health: AtomicU8::new(BatteryHealth::Good.code()),
            present: AtomicBool::new(true),
            temp_decic: AtomicI32::new(100),
            percentage: AtomicU8::new(50),
            charging: AtomicBool::new(false),
            is_full: AtomicBool::new(false),
            usb_online: AtomicBool::new(false),
            ac_online: AtomicBool::new(false),
            charging_mode_booting: AtomicBool::new(false),
        }
    }

    pub fn publish(&self, snapshot: &BatterySnapshot) {
        self.status.store(snapshot.status.code(), Ordering::Relaxed);
        self.health.store(snapshot.health.code(), Ordering::Relaxed);
        self.present.store(snapshot.present, Ordering::Relaxed);
        self.temp_decic
            .store(snapshot.temp_decic as i32, Ordering::Relaxed);
        self.percentage.store(snapshot.percentage, Ordering::Relaxed);
        self.charging.store(snapshot.charging, Ordering::Relaxed);
        self.is_full.store(snapshot.is_full, Ordering::Relaxed);
        self.usb_online.store(snapshot.usb_online, Ordering::Relaxed);
        self.ac_online.store(snapshot.ac_online, Ordering::Relaxed);
        self.charging_mode_booting
            .store(snapshot.charging_mode_booting, Ordering::Relaxed);
    }

    pub fn get_state(&self) -> BatterySnapshot {
        BatterySnapshot {
            status: ChargeStatus::from_code(self.status.load(Ordering::Relaxed))
                .unwrap_or(ChargeStatus::NotCharging),
            health: BatteryHealth::from_code(self.health.load(Ordering::Relaxed))
                .unwrap_or(BatteryHealth::Unknown),
            present: self.present.load(Ordering::Relaxed),
            temp_decic: self.temp_decic.load(Ordering::Relaxed) as i16,
            percentage: self.percentage.load(Ordering::Relaxed),
            charging: self.charging.load(Ordering::Relaxed),
            is_full: self.is_full.load(Ordering::Relaxed),
            usb_online: self.usb_online.load(Ordering::Relaxed),
            ac_online: self.ac_online.load(Ordering::Relaxed),
            charging_mode_booting: self.charging_mode_booting.load(Ordering::Relaxed),
        }
    }
}

impl Default for SharedBatteryState {
    fn default() -> Self {
        Self::new()
    }
}
