//! Scenario-level integration run: boot, configure a tank through the keypad,
//! then watch the idle refresh render it.

use tanklevel_tests::support::{make_app, reference_tank};

use tank_core::hal::mock::EchoScript;
use tank_core::{AppState, Key, KeyEvent, OverflowCounter};

fn main() {
    println!("Tank monitor integration scenarios");

    scenario_first_boot();
    scenario_configure_and_view();

    println!("All scenarios passed.");
    println!();
    println!("Run the full suite with: cargo test");
}

fn scenario_first_boot() {
    println!("- first boot on a virgin store");
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().expect("boot");
    assert_eq!(app.state(), AppState::Idle);
    assert_eq!(&app.display().line(1)[..8], "No Data.");
    assert!(app.store_mut().is_initialized().expect("sentinel read"));
}

fn scenario_configure_and_view() {
    println!("- configure one tank, then idle into a refresh");
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().expect("boot");

    // Through the menu: *, 1, then sensor 1 / name "A" / 100 x 50 x 80
    app.dispatch(KeyEvent::KeyStar).expect("menu");
    app.keypad_port_mut().push_keys(&[
        Some(Key::Digit(1)),
        Some(Key::Star),
        Some(Key::Digit(2)),
        Some(Key::Star),
        Some(Key::Digit(1)),
        Some(Key::Digit(0)),
        Some(Key::Digit(0)),
        Some(Key::Star),
        Some(Key::Digit(5)),
        Some(Key::Digit(0)),
        Some(Key::Star),
        Some(Key::Digit(8)),
        Some(Key::Digit(0)),
        Some(Key::Star),
    ]);
    app.dispatch(KeyEvent::Key1).expect("add entry");
    assert_eq!(app.state(), AppState::AddEdit);
    assert_eq!(app.tanks()[0].height_cm, reference_tank(b"A     ").height_cm);

    // Back out to the menu, exit to the view, then let the idle clock expire
    app.dispatch(KeyEvent::KeyHash).expect("back to menu");
    app.ranging_port_mut().push_readings(&[
        EchoScript::Reading {
            ticks: 36,
            overflows: 1,
        },
        EchoScript::Reading {
            ticks: 36,
            overflows: 1,
        },
    ]);
    app.dispatch(KeyEvent::Key3).expect("exit to view");
    counter.set(250);
    app.dispatch(KeyEvent::KeyNone).expect("idle refresh");
    assert_eq!(app.display().line(1), "A      205 L|51%");
}
