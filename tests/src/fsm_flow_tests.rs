//! End-to-end FSM flows over scripted keypad input and echo readings

use crate::support::{make_app, reference_tank};
use rstest::rstest;
use tank_core::hal::mock::EchoScript;
use tank_core::store::{SENTINEL_ADDR, SENTINEL_MAGIC};
use tank_core::{AppState, Key, KeyEvent, OverflowCounter, TankConfig};

#[test]
fn boot_on_virgin_store_initializes_and_shows_help() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().unwrap();

    assert_eq!(app.state(), AppState::Idle);
    assert_eq!(&app.display().line(1)[..8], "No Data.");
    assert_eq!(&app.display().line(2)[..11], "Press * for");
    assert_eq!(&app.display().line(3)[..8], "options.");
    assert!(app.store_mut().is_initialized().unwrap());
    assert_eq!(
        app.store_mut().nv_mut().bytes()[SENTINEL_ADDR as usize],
        SENTINEL_MAGIC
    );
    assert!(counter.is_enabled());
}

#[test]
fn idle_threshold_renders_configured_tank() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.tanks_mut()[0] = reference_tank(b"TANK1 ");

    // 36 stopwatch ticks, no overflow: 39 cm of air above the surface
    app.ranging_port_mut().push_readings(&[EchoScript::Reading {
        ticks: 36,
        overflows: 1,
    }]);
    counter.set(250);
    app.dispatch(KeyEvent::KeyNone).unwrap();

    // 41 cm of liquid in 5 L/cm steps: 205 L of 400 L = 51%
    assert_eq!(app.display().line(1), "TANK1  205 L|51%");
    assert_eq!(app.mux().selections(), &[0b000]);
    assert_eq!(app.state(), AppState::Idle);
}

#[test]
fn view_renders_each_configured_tank_on_its_own_line() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.tanks_mut()[0] = reference_tank(b"UPPER ");
    app.tanks_mut()[2] = reference_tank(b"LOWER ");

    app.ranging_port_mut().push_readings(&[
        EchoScript::Reading {
            ticks: 36,
            overflows: 1,
        },
        EchoScript::NoEcho,
    ]);
    counter.set(250);
    app.dispatch(KeyEvent::KeyNone).unwrap();

    assert_eq!(&app.display().line(1)[..6], "UPPER ");
    // Ranging timeout reads as an empty tank, not a skipped line
    assert_eq!(app.display().line(2), "LOWER  0   L|0 %");
    assert_eq!(app.mux().selections(), &[0b000, 0b100]);
}

#[test]
fn star_opens_options_and_exit_returns_to_view() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().unwrap();

    app.dispatch(KeyEvent::KeyStar).unwrap();
    assert_eq!(app.state(), AppState::Options);
    assert_eq!(&app.display().line(1)[..16], "1.Add/Edit entry");

    app.dispatch(KeyEvent::Key3).unwrap();
    assert_eq!(app.state(), AppState::Idle);
    assert_eq!(&app.display().line(1)[..8], "No Data.");
}

#[rstest]
#[case(KeyEvent::Key4)]
#[case(KeyEvent::Any)]
#[case(KeyEvent::KeyNone)]
fn options_ignores_unbound_events(#[case] event: KeyEvent) {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.set_state(AppState::Options);
    app.dispatch(event).unwrap();
    assert_eq!(app.state(), AppState::Options);
    assert_eq!(app.display().clear_count(), 0);
}

#[test]
fn view_returns_to_idle_on_no_key() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.set_state(AppState::View);
    app.dispatch(KeyEvent::KeyNone).unwrap();
    assert_eq!(app.state(), AppState::Idle);
}

#[test]
fn add_edit_persists_the_configured_slot() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().unwrap();
    app.set_state(AppState::Options);

    // Sensor 1, name "A", length 100, width 50, height 80
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
    app.dispatch(KeyEvent::Key1).unwrap();

    assert_eq!(app.state(), AppState::AddEdit);
    assert_eq!(&app.display().line(1)[..11], "Successful!");
    let tank = app.tanks()[0];
    assert_eq!(&tank.name, b"A     ");
    assert_eq!((tank.length_cm, tank.width_cm, tank.height_cm), (100, 50, 80));

    // The slot is flushed before the handler returns
    let bytes = app.store_mut().nv_mut().bytes();
    assert_eq!(&bytes[0..6], b"A     ");
    assert_eq!(bytes[6], 0);
    assert_eq!(&bytes[7..13], &[0, 100, 0, 50, 0, 80]);

    // '#' leaves the confirmation screen for the menu
    app.dispatch(KeyEvent::KeyHash).unwrap();
    assert_eq!(app.state(), AppState::Options);
}

#[test]
fn add_edit_rejects_out_of_range_sensor_then_accepts() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().unwrap();
    app.set_state(AppState::Options);

    // Sensor 7 is refused and the prompt loops; then a minimal valid entry
    app.keypad_port_mut().push_keys(&[
        Some(Key::Digit(7)),
        Some(Key::Star),
        Some(Key::Digit(2)),
        Some(Key::Star),
        Some(Key::Digit(2)),
        Some(Key::Star),
        Some(Key::Digit(9)),
        Some(Key::Digit(0)),
        Some(Key::Star),
        Some(Key::Digit(9)),
        Some(Key::Digit(0)),
        Some(Key::Star),
        Some(Key::Digit(9)),
        Some(Key::Digit(0)),
        Some(Key::Star),
    ]);
    app.dispatch(KeyEvent::Key1).unwrap();

    let tank = app.tanks()[1];
    assert_eq!(&tank.name, b"A     ");
    assert_eq!((tank.length_cm, tank.width_cm, tank.height_cm), (90, 90, 90));
    // Only slot 2 was written; slot 7 does not exist
    for index in [0, 2, 3] {
        assert!(!app.tanks()[index].is_configured());
    }
}

#[test]
fn add_edit_reprompts_on_leading_space_name() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().unwrap();
    app.set_state(AppState::Options);

    // First name attempt edits only position 1; the prompt loops with the
    // buffer kept, then position 0 is filled in
    app.keypad_port_mut().push_keys(&[
        Some(Key::Digit(1)),
        Some(Key::Star),
        Some(Key::Digit(6)),
        Some(Key::Digit(2)),
        Some(Key::Star),
        Some(Key::Digit(2)),
        Some(Key::Star),
        Some(Key::Digit(5)),
        Some(Key::Star),
        Some(Key::Digit(5)),
        Some(Key::Star),
        Some(Key::Digit(5)),
        Some(Key::Star),
    ]);
    app.dispatch(KeyEvent::Key1).unwrap();

    assert_eq!(&app.tanks()[0].name, b"AA    ");
}

#[test]
fn delete_with_no_entries_only_reports() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().unwrap();
    app.set_state(AppState::Options);

    let writes_before = app.store_mut().nv_mut().write_count();
    app.dispatch(KeyEvent::Key2).unwrap();

    assert_eq!(app.state(), AppState::Delete);
    assert_eq!(&app.display().line(1)[..13], "No entries to");
    assert_eq!(app.store_mut().nv_mut().write_count(), writes_before);
    for tank in app.tanks() {
        assert_eq!(*tank, TankConfig::empty());
    }

    app.dispatch(KeyEvent::KeyHash).unwrap();
    assert_eq!(app.state(), AppState::Options);
}

#[test]
fn delete_scrolls_past_empty_slots() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().unwrap();
    app.tanks_mut()[0] = reference_tank(b"FIRST ");
    app.tanks_mut()[2] = reference_tank(b"THIRD ");
    app.set_state(AppState::Options);

    // Scroll down once: slot 1 is empty and is skipped to slot 2
    app.keypad_port_mut()
        .push_keys(&[Some(Key::Digit(8)), Some(Key::Star)]);
    app.dispatch(KeyEvent::Key2).unwrap();

    assert_eq!(app.state(), AppState::Delete);
    assert_eq!(&app.display().line(1)[..14], "Entry deleted!");
    assert_eq!(app.tanks()[2], TankConfig::empty());
    assert!(app.tanks()[0].is_configured());
    // The cleared slot is flushed
    assert_eq!(&app.store_mut().nv_mut().bytes()[64..70], b"      ");
}

#[test]
fn delete_scroll_up_wraps_and_skips() {
    let counter = OverflowCounter::new();
    let mut app = make_app(&counter);
    app.boot().unwrap();
    app.tanks_mut()[0] = reference_tank(b"ONLY  ");
    app.set_state(AppState::Options);

    // Scrolling up from slot 0 wraps through 3..1 back to the only entry
    app.keypad_port_mut()
        .push_keys(&[Some(Key::Digit(2)), Some(Key::Star)]);
    app.dispatch(KeyEvent::Key2).unwrap();

    assert_eq!(app.tanks()[0], TankConfig::empty());
}
