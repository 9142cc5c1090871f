#![cfg_attr(not(feature = "std"), no_std)]

//! # Tank Core
//!
//! Multi-tank liquid level monitor core logic for embedded systems.
//! Ultrasonic ranging over a sensor mux, a keypad-driven configuration FSM,
//! character display rendering and EEPROM-backed tank records.

pub mod editor;
pub mod fsm;
pub mod hal;
pub mod keypad;
pub mod ranging;
pub mod store;
pub mod timer;
pub mod types;

pub use fsm::{App, CHANNEL_SELECT_CODES};
pub use hal::{DisplaySurface, HalError, KeypadPort, NvStore, RangingPort, SensorMux};
pub use keypad::Keypad;
pub use ranging::RangeSensor;
pub use store::TankStore;
pub use timer::OverflowCounter;
pub use types::*;

/// Monitor library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timing configuration for the reference board
pub fn default_config() -> MonitorConfig {
    MonitorConfig::default()
}
