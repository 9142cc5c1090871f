//! Application finite-state machine
//!
//! One synchronous dispatch loop: read a key, map it to an event, scan the
//! transition table in declaration order and run the first handler whose
//! (state, event) pair matches. A cycle with no match leaves the state alone.
//! Handlers do all their display, ranging and storage side effects inline and
//! return the next state; only the dispatcher ever writes the current state.

use embedded_hal::delay::DelayNs;

use crate::editor::{enter_name, enter_number, format_u32, NameStatus};
use crate::hal::{DisplaySurface, HalError, KeypadPort, NvStore, RangingPort, SensorMux};
use crate::keypad::Keypad;
use crate::ranging::RangeSensor;
use crate::store::TankStore;
use crate::timer::OverflowCounter;
use crate::types::{AppState, Key, KeyEvent, MonitorConfig, TankConfig, TANK_COUNT};

/// Channel-select codes driven onto the sensor mux lines, one per tank slot.
/// Fixed by the board wiring: mutually exclusive 2-bit codes on bits 1..2 of
/// the shared select port.
pub const CHANNEL_SELECT_CODES: [u8; TANK_COUNT] = [0b000, 0b010, 0b100, 0b110];

/// Application context: tank registry, current state and every peripheral the
/// handlers touch
pub struct App<'a, D, K, R, M, N, DL> {
    state: AppState,
    tanks: [TankConfig; TANK_COUNT],
    config: MonitorConfig,
    display: D,
    keypad: Keypad<K, DL>,
    ranging: RangeSensor<'a, R>,
    mux: M,
    store: TankStore<N>,
    ticks: &'a OverflowCounter,
    delay: DL,
}

impl<'a, E, D, K, R, M, N, DL> App<'a, D, K, R, M, N, DL>
where
    E: From<HalError>,
    D: DisplaySurface<Error = E>,
    K: KeypadPort<Error = E>,
    R: RangingPort<Error = E>,
    M: SensorMux<Error = E>,
    N: NvStore<Error = E>,
    DL: DelayNs,
{
    /// Transition table, scanned in declaration order; first match wins
    const TRANSITIONS: [(AppState, KeyEvent, fn(&mut Self) -> Result<AppState, E>); 8] = [
        (AppState::Idle, KeyEvent::KeyNone, Self::idle),
        (AppState::Idle, KeyEvent::KeyStar, Self::options),
        (AppState::Options, KeyEvent::Key1, Self::add_edit),
        (AppState::Options, KeyEvent::Key2, Self::delete),
        (AppState::Options, KeyEvent::Key3, Self::view),
        (AppState::View, KeyEvent::KeyNone, Self::idle),
        (AppState::AddEdit, KeyEvent::KeyHash, Self::options),
        (AppState::Delete, KeyEvent::KeyHash, Self::options),
    ];

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: MonitorConfig,
        display: D,
        keypad: Keypad<K, DL>,
        ranging: RangeSensor<'a, R>,
        mux: M,
        store: TankStore<N>,
        ticks: &'a OverflowCounter,
        delay: DL,
    ) -> Self {
        Self {
            state: AppState::Idle,
            tanks: [TankConfig::empty(); TANK_COUNT],
            config,
            display,
            keypad,
            ranging,
            mux,
            store,
            ticks,
            delay,
        }
    }

    /// Boot sequence: load the registry (initializing a virgin store), then
    /// render the first View. Leaves the FSM in the View handler's successor
    /// state.
    pub fn boot(&mut self) -> Result<(), E> {
        self.store.load_or_init(&mut self.tanks)?;
        self.state = self.view()?;
        Ok(())
    }

    /// Read one event from the keypad
    pub fn poll_event(&mut self) -> Result<KeyEvent, E> {
        Ok(KeyEvent::from(self.keypad.read()?))
    }

    /// One dispatch cycle against the transition table
    pub fn dispatch(&mut self, event: KeyEvent) -> Result<(), E> {
        #[cfg(feature = "defmt")]
        defmt::trace!("dispatch state={} event={}", self.state, event);
        for (state, ev, handler) in Self::TRANSITIONS {
            if self.state == state && event == ev {
                self.state = handler(self)?;
                break;
            }
        }
        Ok(())
    }

    /// Read an event and dispatch it; the firmware main loop body
    pub fn poll(&mut self) -> Result<(), E> {
        let event = self.poll_event()?;
        self.dispatch(event)
    }

    /// Idle: hand off to View once the overflow counter crosses the refresh
    /// threshold (~5 s), otherwise stay put. The only time-triggered
    /// transition in the table.
    fn idle(&mut self) -> Result<AppState, E> {
        if self.ticks.get() >= self.config.idle_refresh_ticks {
            self.ticks.reset();
            return self.view();
        }
        Ok(AppState::Idle)
    }

    /// View: measure and render every configured tank, or the help screen if
    /// there are none. Re-arms the idle clock on the way out.
    fn view(&mut self) -> Result<AppState, E> {
        self.display.clear()?;
        let mut line = 1;
        for index in 0..TANK_COUNT {
            let tank = self.tanks[index];
            if !tank.is_configured() {
                continue;
            }
            self.mux.select(CHANNEL_SELECT_CODES[index])?;
            let distance = self.ranging.measure(&mut self.delay)?;
            let (liters, percent) = tank.fill_from_distance(distance);
            self.display.put_str(tank.name_str(), line, 1)?;
            self.display.put_str(&format_u32(liters), line, 8)?;
            self.display.put_str("L|", line, 12)?;
            self.display.put_str(&format_u32(u32::from(percent)), line, 14)?;
            self.display.put_char(b'%', line, 16)?;
            line += 1;
        }
        if line == 1 {
            self.display.put_str("No Data.", 1, 1)?;
            self.display.put_str("Press * for", 2, 1)?;
            self.display.put_str("options.", 3, 1)?;
        }
        self.ticks.enable();
        Ok(AppState::Idle)
    }

    /// Options: render the static menu; routing happens in the table
    fn options(&mut self) -> Result<AppState, E> {
        self.display.clear()?;
        self.display.put_str("1.Add/Edit entry", 1, 1)?;
        self.display.put_str("2.Delete entry", 2, 1)?;
        self.display.put_str("3.Exit", 3, 1)?;
        Ok(AppState::Options)
    }

    /// Add/Edit wizard: sensor index, name, then the three dimensions; the
    /// edited slot is flushed before the handler returns
    fn add_edit(&mut self) -> Result<AppState, E> {
        let index = loop {
            self.display.clear()?;
            self.display.put_str("Enter sensor num", 1, 1)?;
            self.display.put_str("from 1 to 4:", 2, 1)?;
            self.display.put_str("*: Confirm", 4, 1)?;
            self.display.set_cursor(3, 1)?;
            self.display.cursor_visible(true)?;
            self.display.cursor_blink(true)?;
            let sensor = enter_number(&mut self.display, &mut self.keypad, 3)?;
            if (1..=TANK_COUNT as u16).contains(&sensor) {
                break sensor as usize - 1;
            }
            self.display.clear()?;
            self.display.cursor_blink(false)?;
            self.display.cursor_visible(false)?;
            self.display.put_str("Number should be", 1, 1)?;
            self.display.put_str("from 1 to 4!", 2, 1)?;
            self.delay.delay_ms(self.config.message_hold_ms);
        };

        loop {
            self.display.clear()?;
            self.display.put_str("Enter name: ", 1, 1)?;
            self.display.put_str(self.tanks[index].name_str(), 2, 1)?;
            self.display.put_str("2/8: Up/Down", 3, 1)?;
            self.display.put_str("4/6: Left/Right", 4, 1)?;
            self.display.set_cursor(2, 1)?;
            let mut name = self.tanks[index].name;
            let status = enter_name(&mut self.display, &mut self.keypad, &mut name, 2)?;
            self.tanks[index].name = name;
            match status {
                NameStatus::Accepted => break,
                NameStatus::LeadingSpace => {
                    self.display.clear()?;
                    self.display.put_str("ERROR: Name must", 1, 1)?;
                    self.display.put_str("not start with a", 2, 1)?;
                    self.display.put_str("space.", 3, 1)?;
                    self.delay.delay_ms(self.config.message_hold_ms);
                }
            }
        }

        self.tanks[index].length_cm = self.prompt_dimension("Enter length cm:")?;
        self.tanks[index].width_cm = self.prompt_dimension("Enter width cm:")?;
        self.tanks[index].height_cm = self.prompt_dimension("Enter height cm:")?;

        self.display.cursor_blink(false)?;
        self.display.cursor_visible(false)?;
        self.display.clear()?;
        self.display.put_str("Successful!", 1, 1)?;
        self.display.put_str("Press '#' to", 2, 1)?;
        self.display.put_str("continue.", 3, 1)?;

        self.store.write_tank(index, &self.tanks[index])?;
        Ok(AppState::AddEdit)
    }

    fn prompt_dimension(&mut self, label: &str) -> Result<u16, E> {
        self.display.clear()?;
        self.display.put_str(label, 1, 1)?;
        self.display.put_str("#: Reset", 3, 1)?;
        self.display.put_str("*: Confirm", 4, 1)?;
        self.display.set_cursor(2, 1)?;
        enter_number(&mut self.display, &mut self.keypad, 2)
    }

    /// Delete: scroll through configured slots, confirm with `*`, reset the
    /// slot and flush. With nothing to delete, only a notice is shown.
    fn delete(&mut self) -> Result<AppState, E> {
        if self.tanks.iter().all(|tank| !tank.is_configured()) {
            self.display.clear()?;
            self.display.put_str("No entries to", 1, 1)?;
            self.display.put_str("delete.", 2, 1)?;
            self.display.put_str("Press '#' key to", 3, 1)?;
            self.display.put_str("continue.", 4, 1)?;
            return Ok(AppState::Delete);
        }

        self.display.clear()?;
        self.display.put_str("Choose entry:", 1, 1)?;
        self.display.put_str("2/8: Up/Down", 3, 1)?;
        self.display.put_str("*: Select", 4, 1)?;

        let mut index: u8 = 0;
        // Seed the scroll direction downward so the skip loop below can walk
        // off an initial empty slot
        let mut key = Some(Key::Digit(8));
        loop {
            // Walk in the direction of travel until a configured slot shows up
            while !self.tanks[index as usize].is_configured() {
                match key {
                    Some(Key::Digit(8)) => {
                        index += 1;
                        if index >= TANK_COUNT as u8 {
                            index = 0;
                        }
                    }
                    Some(Key::Digit(2)) => {
                        index = index.wrapping_sub(1);
                        if index >= TANK_COUNT as u8 {
                            index = TANK_COUNT as u8 - 1;
                        }
                    }
                    // A non-direction key can only arrive while a configured
                    // slot is selected, so this arm never spins
                    _ => break,
                }
            }

            self.display.clear_line(2)?;
            self.display
                .put_str(self.tanks[index as usize].name_str(), 2, 1)?;
            self.delay.delay_ms(self.config.scroll_hold_ms);

            key = self.keypad.read()?;
            match key {
                Some(Key::Star) => break,
                Some(Key::Digit(8)) => {
                    index += 1;
                    if index >= TANK_COUNT as u8 {
                        index = 0;
                    }
                }
                Some(Key::Digit(2)) => {
                    index = index.wrapping_sub(1);
                    if index >= TANK_COUNT as u8 {
                        index = TANK_COUNT as u8 - 1;
                    }
                }
                _ => {}
            }
        }

        self.tanks[index as usize] = TankConfig::empty();
        self.store
            .write_tank(index as usize, &self.tanks[index as usize])?;

        self.display.clear()?;
        self.display.put_str("Entry deleted!", 1, 1)?;
        self.display.put_str("Press '#' key to", 2, 1)?;
        self.display.put_str("continue.", 3, 1)?;
        Ok(AppState::Delete)
    }

    /// Current FSM state
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Tank registry snapshot
    pub fn tanks(&self) -> &[TankConfig; TANK_COUNT] {
        &self.tanks
    }

    /// Display peripheral, for inspection
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Sensor mux peripheral, for inspection
    pub fn mux(&self) -> &M {
        &self.mux
    }

    /// Mutable store access, for slot-level verification
    pub fn store_mut(&mut self) -> &mut TankStore<N> {
        &mut self.store
    }

    /// Mutable keypad port access, for scripting input mid-test
    pub fn keypad_port_mut(&mut self) -> &mut K {
        self.keypad.port_mut()
    }

    /// Mutable ranging port access, for scripting measurements mid-test
    pub fn ranging_port_mut(&mut self) -> &mut R {
        self.ranging.port_mut()
    }

    /// Force the FSM into a state (for testing)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_state(&mut self, state: AppState) {
        self.state = state;
    }

    /// Mutable registry access (for testing)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn tanks_mut(&mut self) -> &mut [TankConfig; TANK_COUNT] {
        &mut self.tanks
    }
}
