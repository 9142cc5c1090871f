//! Hardware Abstraction Layer for the tank monitor
//!
//! The core consumes hardware through the narrow trait contracts below; the
//! firmware crate provides pin- and bus-backed adapters, and `hal::mock`
//! provides in-memory fakes for host testing.

use crate::types::Key;

/// Character columns on the display
pub const DISPLAY_COLS: u8 = 16;
/// Character rows on the display
pub const DISPLAY_ROWS: u8 = 4;

/// Keypad matrix row count
pub const KEYPAD_ROWS: usize = 4;
/// Keypad matrix column count
pub const KEYPAD_COLS: usize = 3;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Bus transaction (display or storage) failed
    BusError,
    /// Non-volatile storage access failed
    StorageError,
    /// Hardware not initialized
    NotInitialized,
    /// Invalid configuration
    InvalidConfig,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::BusError => write!(f, "Bus transaction failed"),
            HalError::StorageError => write!(f, "Non-volatile storage access failed"),
            HalError::NotInitialized => write!(f, "Hardware not initialized"),
            HalError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Trait for the character display surface.
///
/// Rows and columns are 1-based, matching the physical 16x4 module. After
/// `clear` the logical cursor is at row 1, column 1.
pub trait DisplaySurface {
    type Error: From<HalError>;

    /// Clear the whole display and home the cursor
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Move the cursor to an absolute position
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Self::Error>;

    /// Write one character at the given position
    fn put_char(&mut self, ch: u8, row: u8, col: u8) -> Result<(), Self::Error>;

    /// Write a string starting at the given column; column 0 centers the text
    fn put_str(&mut self, text: &str, row: u8, col: u8) -> Result<(), Self::Error>;

    /// Blank one display line
    fn clear_line(&mut self, row: u8) -> Result<(), Self::Error>;

    /// Show or hide the cursor
    fn cursor_visible(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Enable or disable cursor blinking
    fn cursor_blink(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Move the cursor one cell left without changing contents
    fn shift_cursor_left(&mut self) -> Result<(), Self::Error>;

    /// Move the cursor one cell right without changing contents
    fn shift_cursor_right(&mut self) -> Result<(), Self::Error>;
}

/// Trait for the ranging sensor channel-select lines.
///
/// The two select bits route the trigger/echo pair to one of four sensors; the
/// channel codes are fixed by the board wiring (see
/// [`crate::fsm::CHANNEL_SELECT_CODES`]).
pub trait SensorMux {
    type Error: From<HalError>;

    /// Drive the select lines with the given 2-bit channel code
    fn select(&mut self, code: u8) -> Result<(), Self::Error>;
}

/// Trait for the ultrasonic trigger/echo pin pair plus the hardware tick timer
/// the ranging driver stopwatches with.
pub trait RangingPort {
    type Error: From<HalError>;

    /// Drive the trigger output high or low
    fn set_trigger(&mut self, level: bool) -> Result<(), Self::Error>;

    /// Sample the echo input
    fn echo(&mut self) -> Result<bool, Self::Error>;

    /// Zero the free-running hardware tick timer
    fn reset_timer(&mut self) -> Result<(), Self::Error>;

    /// Current hardware tick timer value
    fn timer_ticks(&mut self) -> Result<u8, Self::Error>;
}

/// Trait for the keypad matrix pins: three column outputs, four row inputs.
pub trait KeypadPort {
    type Error: From<HalError>;

    /// Drive exactly the given column line high, all others low
    fn drive_column(&mut self, col: usize) -> Result<(), Self::Error>;

    /// Sample one row input while a column is driven
    fn row_high(&mut self, row: usize) -> Result<bool, Self::Error>;
}

/// Trait for byte-addressable non-volatile storage.
///
/// The store must span at least the four 32-byte tank slots plus the sentinel
/// byte at [`crate::store::SENTINEL_ADDR`].
pub trait NvStore {
    type Error: From<HalError>;

    fn read_byte(&mut self, addr: u8) -> Result<u8, Self::Error>;

    fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), Self::Error>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use crate::keypad::KEY_LAYOUT;
    use crate::timer::OverflowCounter;
    use embedded_hal::delay::DelayNs;
    use heapless::Deque;

    /// In-memory 16x4 character display tracking cursor state
    pub struct MockDisplay {
        grid: [[u8; DISPLAY_COLS as usize]; DISPLAY_ROWS as usize],
        cursor: (u8, u8),
        cursor_on: bool,
        blink_on: bool,
        clears: u32,
    }

    impl MockDisplay {
        pub fn new() -> Self {
            Self {
                grid: [[b' '; DISPLAY_COLS as usize]; DISPLAY_ROWS as usize],
                cursor: (1, 1),
                cursor_on: false,
                blink_on: false,
                clears: 0,
            }
        }

        /// Full 16-character contents of one line
        pub fn line(&self, row: u8) -> &str {
            core::str::from_utf8(&self.grid[row as usize - 1]).unwrap_or("")
        }

        /// Current (row, col) cursor position
        pub fn cursor(&self) -> (u8, u8) {
            self.cursor
        }

        pub fn cursor_shown(&self) -> bool {
            self.cursor_on
        }

        pub fn blink_shown(&self) -> bool {
            self.blink_on
        }

        /// Number of full-display clears observed
        pub fn clear_count(&self) -> u32 {
            self.clears
        }

        fn write_at(&mut self, ch: u8, row: u8, col: u8) {
            if (1..=DISPLAY_ROWS).contains(&row) && (1..=DISPLAY_COLS).contains(&col) {
                self.grid[row as usize - 1][col as usize - 1] = ch;
                self.cursor = (row, (col + 1).min(DISPLAY_COLS));
            }
        }
    }

    impl Default for MockDisplay {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DisplaySurface for MockDisplay {
        type Error = HalError;

        fn clear(&mut self) -> Result<(), Self::Error> {
            self.grid = [[b' '; DISPLAY_COLS as usize]; DISPLAY_ROWS as usize];
            self.cursor = (1, 1);
            self.clears += 1;
            Ok(())
        }

        fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Self::Error> {
            self.cursor = (row, col);
            Ok(())
        }

        fn put_char(&mut self, ch: u8, row: u8, col: u8) -> Result<(), Self::Error> {
            self.write_at(ch, row, col);
            Ok(())
        }

        fn put_str(&mut self, text: &str, row: u8, col: u8) -> Result<(), Self::Error> {
            let start = if col == 0 {
                (DISPLAY_COLS.saturating_sub(text.len() as u8)) / 2 + 1
            } else {
                col
            };
            for (i, ch) in text.bytes().enumerate() {
                self.write_at(ch, row, start + i as u8);
            }
            Ok(())
        }

        fn clear_line(&mut self, row: u8) -> Result<(), Self::Error> {
            if (1..=DISPLAY_ROWS).contains(&row) {
                self.grid[row as usize - 1] = [b' '; DISPLAY_COLS as usize];
                self.cursor = (row, 1);
            }
            Ok(())
        }

        fn cursor_visible(&mut self, on: bool) -> Result<(), Self::Error> {
            self.cursor_on = on;
            Ok(())
        }

        fn cursor_blink(&mut self, on: bool) -> Result<(), Self::Error> {
            self.blink_on = on;
            Ok(())
        }

        fn shift_cursor_left(&mut self) -> Result<(), Self::Error> {
            if self.cursor.1 > 1 {
                self.cursor.1 -= 1;
            }
            Ok(())
        }

        fn shift_cursor_right(&mut self) -> Result<(), Self::Error> {
            if self.cursor.1 < DISPLAY_COLS {
                self.cursor.1 += 1;
            }
            Ok(())
        }
    }

    /// Pin-level keypad mock holding at most one pressed key
    #[derive(Default)]
    pub struct MockKeypadPort {
        pressed: Option<(usize, usize)>,
        driven: Option<usize>,
    }

    impl MockKeypadPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Press the key at (row, col), or release with `None`
        pub fn set_pressed(&mut self, position: Option<(usize, usize)>) {
            self.pressed = position;
        }
    }

    impl KeypadPort for MockKeypadPort {
        type Error = HalError;

        fn drive_column(&mut self, col: usize) -> Result<(), Self::Error> {
            if col >= KEYPAD_COLS {
                return Err(HalError::GpioError);
            }
            self.driven = Some(col);
            Ok(())
        }

        fn row_high(&mut self, row: usize) -> Result<bool, Self::Error> {
            if row >= KEYPAD_ROWS {
                return Err(HalError::GpioError);
            }
            Ok(matches!(
                (self.pressed, self.driven),
                (Some((r, c)), Some(d)) if r == row && c == d
            ))
        }
    }

    /// Keypad mock fed by a script of scan outcomes.
    ///
    /// One script entry is consumed per full scan sweep: the entry's key is
    /// made to appear on its matrix position for the duration of the sweep; a
    /// `None` entry (and an exhausted script) produces a miss.
    pub struct ScriptedKeypadPort {
        script: Deque<Option<Key>, 64>,
        current: Option<(usize, usize)>,
        driven: Option<usize>,
    }

    impl ScriptedKeypadPort {
        pub fn new() -> Self {
            Self {
                script: Deque::new(),
                current: None,
                driven: None,
            }
        }

        /// Append scan outcomes to the script
        pub fn push_keys(&mut self, keys: &[Option<Key>]) {
            for key in keys {
                self.script.push_back(*key).ok();
            }
        }

        /// Remaining scripted entries
        pub fn remaining(&self) -> usize {
            self.script.len()
        }

        fn position_of(key: Key) -> Option<(usize, usize)> {
            for (r, row) in KEY_LAYOUT.iter().enumerate() {
                for (c, k) in row.iter().enumerate() {
                    if *k == key {
                        return Some((r, c));
                    }
                }
            }
            None
        }
    }

    impl Default for ScriptedKeypadPort {
        fn default() -> Self {
            Self::new()
        }
    }

    impl KeypadPort for ScriptedKeypadPort {
        type Error = HalError;

        fn drive_column(&mut self, col: usize) -> Result<(), Self::Error> {
            if col >= KEYPAD_COLS {
                return Err(HalError::GpioError);
            }
            if col == 0 {
                // New sweep: advance the script
                self.current = self.script.pop_front().flatten().and_then(Self::position_of);
            }
            self.driven = Some(col);
            Ok(())
        }

        fn row_high(&mut self, row: usize) -> Result<bool, Self::Error> {
            if row >= KEYPAD_ROWS {
                return Err(HalError::GpioError);
            }
            Ok(matches!(
                (self.current, self.driven),
                (Some((r, c)), Some(d)) if r == row && c == d
            ))
        }
    }

    /// One scripted ranging outcome, consumed per trigger pulse
    #[derive(Copy, Clone, Debug)]
    pub enum EchoScript {
        /// Normal measurement: hardware ticks and overflow count at deassert
        Reading { ticks: u8, overflows: u8 },
        /// Echo never asserts (first-phase timeout)
        NoEcho,
        /// Echo asserts but never releases (second-phase timeout)
        StuckHigh,
    }

    #[derive(Copy, Clone, PartialEq)]
    enum EchoPhase {
        Quiet,
        Armed,
        High,
        Done,
    }

    /// Ranging port mock that advances the shared overflow counter to simulate
    /// elapsed time during the busy-wait phases
    pub struct MockRangingPort<'a> {
        counter: &'a OverflowCounter,
        script: Deque<EchoScript, 8>,
        current: EchoScript,
        phase: EchoPhase,
        trigger_pulses: u32,
    }

    impl<'a> MockRangingPort<'a> {
        pub fn new(counter: &'a OverflowCounter) -> Self {
            Self {
                counter,
                script: Deque::new(),
                current: EchoScript::NoEcho,
                phase: EchoPhase::Quiet,
                trigger_pulses: 0,
            }
        }

        /// Append measurement outcomes, one per expected trigger pulse
        pub fn push_readings(&mut self, readings: &[EchoScript]) {
            for reading in readings {
                self.script.push_back(*reading).ok();
            }
        }

        /// Number of trigger pulses emitted so far
        pub fn trigger_pulses(&self) -> u32 {
            self.trigger_pulses
        }
    }

    impl RangingPort for MockRangingPort<'_> {
        type Error = HalError;

        fn set_trigger(&mut self, level: bool) -> Result<(), Self::Error> {
            if level {
                self.trigger_pulses += 1;
                self.current = self.script.pop_front().unwrap_or(EchoScript::NoEcho);
            } else {
                self.phase = EchoPhase::Armed;
            }
            Ok(())
        }

        fn echo(&mut self) -> Result<bool, Self::Error> {
            match self.phase {
                EchoPhase::Armed => match self.current {
                    EchoScript::NoEcho => {
                        self.counter.tick();
                        Ok(false)
                    }
                    _ => {
                        self.phase = EchoPhase::High;
                        Ok(true)
                    }
                },
                EchoPhase::High => match self.current {
                    EchoScript::StuckHigh => {
                        self.counter.tick();
                        Ok(true)
                    }
                    EchoScript::Reading { overflows, .. } => {
                        self.counter.set(overflows);
                        self.phase = EchoPhase::Done;
                        Ok(false)
                    }
                    EchoScript::NoEcho => Ok(false),
                },
                _ => Ok(false),
            }
        }

        fn reset_timer(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn timer_ticks(&mut self) -> Result<u8, Self::Error> {
            match self.current {
                EchoScript::Reading { ticks, .. } => Ok(ticks),
                _ => Ok(0),
            }
        }
    }

    /// Channel-select mock recording every driven code
    #[derive(Default)]
    pub struct MockMux {
        selections: heapless::Vec<u8, 16>,
    }

    impl MockMux {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn selections(&self) -> &[u8] {
            &self.selections
        }
    }

    impl SensorMux for MockMux {
        type Error = HalError;

        fn select(&mut self, code: u8) -> Result<(), Self::Error> {
            self.selections.push(code).ok();
            Ok(())
        }
    }

    /// 256-byte RAM-backed non-volatile store
    pub struct MockNvStore {
        bytes: [u8; 256],
        writes: u32,
    }

    impl MockNvStore {
        /// Virgin store: all bytes 0xFF like unprogrammed EEPROM
        pub fn new() -> Self {
            Self {
                bytes: [0xFF; 256],
                writes: 0,
            }
        }

        pub fn bytes(&self) -> &[u8; 256] {
            &self.bytes
        }

        /// Number of byte writes observed
        pub fn write_count(&self) -> u32 {
            self.writes
        }
    }

    impl Default for MockNvStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl NvStore for MockNvStore {
        type Error = HalError;

        fn read_byte(&mut self, addr: u8) -> Result<u8, Self::Error> {
            Ok(self.bytes[addr as usize])
        }

        fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
            self.bytes[addr as usize] = value;
            self.writes += 1;
            Ok(())
        }
    }

    /// Delay provider that only accounts for requested time
    #[derive(Default)]
    pub struct MockDelay {
        total_ns: u64,
    }

    impl MockDelay {
        pub fn new() -> Self {
            Self::default()
        }

        /// Total nanoseconds of delay requested so far
        pub fn total_ns(&self) -> u64 {
            self.total_ns
        }
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }
}
