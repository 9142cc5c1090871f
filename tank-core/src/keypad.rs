//! 4x3 matrix keypad driver

use embedded_hal::delay::DelayNs;

use crate::hal::{KeypadPort, KEYPAD_COLS, KEYPAD_ROWS};
use crate::types::Key;

/// Fixed character layout of the matrix, indexed `[row][column]`
pub const KEY_LAYOUT: [[Key; KEYPAD_COLS]; KEYPAD_ROWS] = [
    [Key::Digit(1), Key::Digit(2), Key::Digit(3)],
    [Key::Digit(4), Key::Digit(5), Key::Digit(6)],
    [Key::Digit(7), Key::Digit(8), Key::Digit(9)],
    [Key::Star, Key::Digit(0), Key::Hash],
];

/// Matrix scanner with press settle delay.
///
/// `read` drives one column line high at a time and samples the four rows; the
/// first row seen high decodes through [`KEY_LAYOUT`]. A successful read blocks
/// for the settle delay before returning, so a held key is not reported again
/// by the next few poll cycles; a miss returns immediately.
pub struct Keypad<P, D> {
    port: P,
    delay: D,
    settle_ms: u32,
}

impl<P, D> Keypad<P, D>
where
    P: KeypadPort,
    D: DelayNs,
{
    pub fn new(port: P, delay: D, settle_ms: u32) -> Self {
        Self {
            port,
            delay,
            settle_ms,
        }
    }

    /// Access the underlying port, mainly for test scripting
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// One full column sweep; `None` when no key is down
    pub fn read(&mut self) -> Result<Option<Key>, P::Error> {
        for col in 0..KEYPAD_COLS {
            self.port.drive_column(col)?;
            for row in 0..KEYPAD_ROWS {
                if self.port.row_high(row)? {
                    self.delay.delay_ms(self.settle_ms);
                    return Ok(Some(KEY_LAYOUT[row][col]));
                }
            }
        }
        Ok(None)
    }
}
