//! Shared builders for driving the application against the in-memory mocks

use tank_core::hal::mock::{
    MockDelay, MockDisplay, MockMux, MockNvStore, MockRangingPort, ScriptedKeypadPort,
};
use tank_core::{App, Keypad, MonitorConfig, OverflowCounter, RangeSensor, TankConfig, TankStore};

/// The application fully wired to mocks
pub type MockApp<'a> = App<
    'a,
    MockDisplay,
    ScriptedKeypadPort,
    MockRangingPort<'a>,
    MockMux,
    MockNvStore,
    MockDelay,
>;

/// Application over a virgin store and an empty keypad script
pub fn make_app(counter: &OverflowCounter) -> MockApp<'_> {
    App::new(
        MonitorConfig::default(),
        MockDisplay::new(),
        Keypad::new(ScriptedKeypadPort::new(), MockDelay::new(), 1),
        RangeSensor::new(MockRangingPort::new(counter), counter),
        MockMux::new(),
        TankStore::new(MockNvStore::new()),
        counter,
        MockDelay::new(),
    )
}

/// A 100x50x80 cm tank, the reference fixture for fill math:
/// 400 L capacity in 5 L per height-cm steps
pub fn reference_tank(name: &[u8; 6]) -> TankConfig {
    TankConfig {
        name: *name,
        length_cm: 100,
        width_cm: 50,
        height_cm: 80,
    }
}
