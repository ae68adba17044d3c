// The worker task: one serialized consumer of charge events plus the
// wake timer. Producers (cable detect, fuel gauge writes, the PMIC
// full interrupt, suspend notifier) push into the event channel
// through a `ChargerHandle` and never touch controller state directly.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Instant, Timer};

use crate::controller::{ChargeController, ChargeEvent, TickReport};
use crate::programmer::ChargeRegisterProgrammer;
use crate::state::{
    BatterySnapshot, CableType, DebugAttr, Property, PropertyError, PropertyValue, PropertyWrite,
    SharedBatteryState, Supply,
};

pub const EVENT_QUEUE_DEPTH: usize = 8;

pub type ChargeEventChannel = Channel<CriticalSectionRawMutex, ChargeEvent, EVENT_QUEUE_DEPTH>;
pub type ChargeEventSender =
    Sender<'static, CriticalSectionRawMutex, ChargeEvent, EVENT_QUEUE_DEPTH>;
pub type ChargeEventReceiver =
    Receiver<'static, CriticalSectionRawMutex, ChargeEvent, EVENT_QUEUE_DEPTH>;

/// Platform effects the state machine cannot perform itself.
pub trait PlatformOps {
    /// A supply's externally visible state changed; observers of the
    /// battery/usb/ac supplies should re-read.
    fn notify_supply_changed(&mut self, supply: Supply);

    /// Asserted from low-power charging-only mode once external power
    /// disappears.
    fn request_power_off(&mut self);
}

pub struct ChargerTask<P: ChargeRegisterProgrammer, H: PlatformOps> {
    controller: ChargeController<P>,
    shared_state: &'static SharedBatteryState,
    events: ChargeEventReceiver,
    platform: H,
    next_wake: Instant,
}

impl<P: ChargeRegisterProgrammer, H: PlatformOps> ChargerTask<P, H> {
    pub fn new(
        controller: ChargeController<P>,
        channel: &'static ChargeEventChannel,
        shared_state: &'static SharedBatteryState,
        platform: H,
    ) -> Self {
        ChargerTask {
            controller,
            shared_state,
            events: channel.receiver(),
            platform,
            next_wake: Instant::now(),
        }
    }

    pub async fn charger_task_entry(&mut self) -> ! {
        log::info!("Charger - task startup");

        // initial evaluation before the first scheduled wake
        self.dispatch(ChargeEvent::Tick);

        loop {
            match select(self.events.receive(), Timer::at(self.next_wake)).await {
                Either::First(event) => self.dispatch(event),
                Either::Second(()) => self.dispatch(ChargeEvent::Tick),
            }
        }
    }

    fn dispatch(&mut self, event: ChargeEvent) {
        let report = self.controller.handle_event(event, Instant::now());
        self.shared_state.publish(&self.controller.snapshot());
        self.complete(report);
    }

    fn complete(&mut self, report: TickReport) {
        if let Some(plan) = report.plan {
            // a single timer can't express the slack range, so target
            // the earliest acceptable instant
            self.next_wake = plan.earliest;
        }

        if report.supplies_changed {
            self.platform.notify_supply_changed(Supply::Usb);
            self.platform.notify_supply_changed(Supply::Ac);
        }

        if report.battery_changed {
            self.platform.notify_supply_changed(Supply::Battery);
        }

        if report.power_off_requested {
            self.platform.request_power_off();
        }
    }
}

/// Producer-side handle: validates external input, then enqueues.
/// Cheap to copy; safe to use from interrupt context via the
/// non-blocking `try_send` paths.
#[derive(Clone, Copy)]
pub struct ChargerHandle {
    events: ChargeEventSender,
    shared_state: &'static SharedBatteryState,
}

impl ChargerHandle {
    pub fn new(
        channel: &'static ChargeEventChannel,
        shared_state: &'static SharedBatteryState,
    ) -> ChargerHandle {
        ChargerHandle {
            events: channel.sender(),
            shared_state,
        }
    }

    fn enqueue(&self, event: ChargeEvent) {
        if self.events.try_send(event).is_err() {
            // the pending tick will pick up current state anyway
            log::warn!("Charger - event queue full, dropped {:?}", event);
        }
    }

    pub fn set_cable(&self, cable: CableType) {
        self.enqueue(ChargeEvent::CableChanged(cable));
    }

    /// Write path of the property surface. Invalid writes are rejected
    /// here, before anything reaches the controller.
    pub fn write_property(&self, prop: Property, value: i32) -> Result<(), PropertyError> {
        let write = PropertyWrite::parse(prop, value)?;
        self.enqueue(ChargeEvent::PropertyWrite(write));
        Ok(())
    }

    pub fn read_property(&self, prop: Property) -> PropertyValue {
        self.shared_state.get_state().property(prop)
    }

    pub fn write_attr(&self, attr: DebugAttr, text: &str) -> Result<(), PropertyError> {
        let value = DebugAttr::parse(text)?;
        self.enqueue(ChargeEvent::DebugAttrWrite(attr, value));
        Ok(())
    }

    pub fn read_attr(&self, attr: DebugAttr) -> bool {
        self.shared_state.get_state().attr(attr)
    }

    /// Hardware "battery full" pulse. Only enqueues; the evaluation
    /// itself happens in the task, outside interrupt context.
    pub fn battery_full_interrupt(&self) {
        self.enqueue(ChargeEvent::FullBatteryInterrupt);
    }

    pub fn set_suspended(&self, suspended: bool) {
        self.enqueue(ChargeEvent::SuspendStateChanged(suspended));
    }

    pub fn state(&self) -> BatterySnapshot {
        self.shared_state.get_state()
    }
}
