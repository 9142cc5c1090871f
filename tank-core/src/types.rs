//! Core data types for the tank level monitor

/// Number of physical sensor channels (one tank slot per channel)
pub const TANK_COUNT: usize = 4;

/// Length of a tank name, excluding the terminator appended at the store boundary
pub const NAME_LEN: usize = 6;

/// Raw keypad symbols as laid out on the 4x3 matrix
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// One of the digit keys '0'..'9'
    Digit(u8),
    /// The '*' key
    Star,
    /// The '#' key
    Hash,
}

impl Key {
    /// ASCII representation of the key, as echoed on the display
    pub const fn ascii(&self) -> u8 {
        match self {
            Key::Digit(d) => b'0' + *d,
            Key::Star => b'*',
            Key::Hash => b'#',
        }
    }
}

/// Symbolic events consumed by the FSM dispatcher
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEvent {
    Key1,
    Key2,
    Key3,
    Key4,
    KeyStar,
    KeyHash,
    /// No key pressed this dispatch cycle
    KeyNone,
    /// A key with no dedicated event (5, 6, 7, 8, 9, 0)
    Any,
}

impl From<Option<Key>> for KeyEvent {
    fn from(key: Option<Key>) -> Self {
        match key {
            Some(Key::Digit(1)) => KeyEvent::Key1,
            Some(Key::Digit(2)) => KeyEvent::Key2,
            Some(Key::Digit(3)) => KeyEvent::Key3,
            Some(Key::Digit(4)) => KeyEvent::Key4,
            Some(Key::Star) => KeyEvent::KeyStar,
            Some(Key::Hash) => KeyEvent::KeyHash,
            Some(Key::Digit(_)) => KeyEvent::Any,
            None => KeyEvent::KeyNone,
        }
    }
}

/// FSM states for the application controller
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppState {
    /// Waiting for input; transitions to View on the idle-timer threshold
    Idle,
    /// Tank readings are being rendered
    View,
    /// Static menu; routing is done by the dispatcher table
    Options,
    /// Add/edit wizard for one tank slot
    AddEdit,
    /// Entry selection and deletion
    Delete,
}

/// Configuration record for one liquid tank.
///
/// A slot is "configured" iff the first name byte is not a space. An
/// unconfigured slot carries an all-space name and zero dimensions. Tanks are
/// cuboid; dimensions are centimeters.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TankConfig {
    pub name: [u8; NAME_LEN],
    pub length_cm: u16,
    pub width_cm: u16,
    pub height_cm: u16,
}

impl TankConfig {
    /// The empty (unconfigured) slot representation
    pub const fn empty() -> Self {
        Self {
            name: [b' '; NAME_LEN],
            length_cm: 0,
            width_cm: 0,
            height_cm: 0,
        }
    }

    /// Whether this slot holds a real entry
    pub fn is_configured(&self) -> bool {
        self.name[0] != b' '
    }

    /// Name as a display string. Name bytes only ever come from the editor's
    /// glyph ring, so they are always ASCII.
    pub fn name_str(&self) -> &str {
        core::str::from_utf8(&self.name).unwrap_or("")
    }

    /// Liters currently held and percent full for a measured surface distance.
    ///
    /// A distance of 0 (ranging timeout) or one beyond the tank height reads as
    /// empty. Degenerate dimensions that would zero the capacity also read as
    /// empty, guarding the division.
    pub fn fill_from_distance(&self, distance_cm: u16) -> (u32, u8) {
        if distance_cm == 0 || distance_cm > self.height_cm {
            return (0, 0);
        }
        // liters = length * width * depth / 1000, staged to stay inside u32
        let base = u32::from(self.length_cm) / 10 * u32::from(self.width_cm) / 100;
        let total_liters = base * u32::from(self.height_cm);
        if total_liters == 0 {
            return (0, 0);
        }
        let liters = base * u32::from(self.height_cm - distance_cm);
        let percent = (liters * 100 / total_liters) as u8;
        (liters, percent)
    }
}

impl Default for TankConfig {
    fn default() -> Self {
        Self::empty()
    }
}

/// Application timing configuration
#[derive(Copy, Clone, Debug)]
pub struct MonitorConfig {
    /// Overflow ticks spent in Idle before an automatic View refresh (~5 s)
    pub idle_refresh_ticks: u8,
    /// Hold time for error/confirmation screens, in milliseconds
    pub message_hold_ms: u32,
    /// Hold time between Delete-list scroll renders, in milliseconds
    pub scroll_hold_ms: u32,
    /// Settle delay applied after a successful keypad read, in milliseconds
    pub keypad_settle_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            idle_refresh_ticks: 250,
            message_hold_ms: 2500,
            scroll_hold_ms: 500,
            keypad_settle_ms: 350,
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration with validation
    pub fn new(
        idle_refresh_ticks: u8,
        message_hold_ms: u32,
        scroll_hold_ms: u32,
        keypad_settle_ms: u32,
    ) -> Result<Self, &'static str> {
        if idle_refresh_ticks == 0 {
            return Err("Idle refresh threshold must be nonzero");
        }
        if message_hold_ms > 10_000 {
            return Err("Message hold must be <= 10s");
        }
        if keypad_settle_ms == 0 || keypad_settle_ms > 1000 {
            return Err("Keypad settle must be within 1..=1000ms");
        }
        Ok(Self {
            idle_refresh_ticks,
            message_hold_ms,
            scroll_hold_ms,
            keypad_settle_ms,
        })
    }
}
