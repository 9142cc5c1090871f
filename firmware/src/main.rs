#![cfg_attr(target_arch = "riscv32", no_std)]
#![cfg_attr(target_arch = "riscv32", no_main)]

//! Firmware entry point.
//!
//! Wires the application FSM to the board peripherals and runs the poll loop.
//! Until the board HAL lands this builds against the mock board, which also
//! backs the host build for a smoke run.

#[cfg(feature = "defmt")]
use defmt_rtt as _;

#[cfg(target_arch = "riscv32")]
use panic_halt as _;

use tank_core::{default_config, App, Keypad, OverflowCounter, RangeSensor, TankStore};
use tanklevel_firmware::mock_hardware::{
    FixedRangingPort, IdleKeypad, NoopDelay, NullDisplay, NullMux, RamStore,
};

/// Overflow tick counter advanced by the machine timer interrupt
static TICKS: OverflowCounter = OverflowCounter::new();

/// Machine timer expiry: one overflow tick. Board bring-up re-arms mtimecmp
/// here for the 16.4 ms overflow period.
#[cfg(target_arch = "riscv32")]
#[export_name = "MachineTimer"]
fn machine_timer() {
    TICKS.tick();
}

type MockApp = App<'static, NullDisplay, IdleKeypad, FixedRangingPort, NullMux, RamStore, NoopDelay>;

fn build_app() -> MockApp {
    let config = default_config();
    let keypad = Keypad::new(IdleKeypad, NoopDelay, config.keypad_settle_ms);
    let ranging = RangeSensor::new(FixedRangingPort::new(100), &TICKS);
    let store = TankStore::new(RamStore::new());
    App::new(
        config,
        NullDisplay,
        keypad,
        ranging,
        NullMux,
        store,
        &TICKS,
        NoopDelay,
    )
}

#[cfg(target_arch = "riscv32")]
#[riscv_rt::entry]
fn main() -> ! {
    #[cfg(feature = "defmt")]
    defmt::info!("tanklevel firmware starting, core {}", tank_core::VERSION);

    let mut app = build_app();
    while app.boot().is_err() {}

    loop {
        if app.poll().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("poll cycle failed");
        }
    }
}

#[cfg(not(target_arch = "riscv32"))]
fn main() {
    let mut app = build_app();
    if app.boot().is_err() {
        eprintln!("boot failed");
        return;
    }
    for _ in 0..1000 {
        if app.poll().is_err() {
            eprintln!("poll cycle failed");
            return;
        }
    }
    println!("tanklevel host smoke run complete, state {:?}", app.state());
}
