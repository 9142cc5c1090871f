//! Text and number entry sub-protocols driven by the keypad
//!
//! Both editors own the display line they were given: they loop reading keys,
//! echo edits in place and return only on the `*` terminator.

use embedded_hal::delay::DelayNs;

use crate::hal::{DisplaySurface, HalError, KeypadPort};
use crate::keypad::Keypad;
use crate::types::Key;

/// Digits accepted by numeric entry; keeps every entered value below 1000
pub const MAX_ENTRY_DIGITS: u8 = 3;

/// Outcome of a name entry session
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NameStatus {
    /// First character is not a space; the buffer is usable
    Accepted,
    /// Name still starts with a space; caller should re-prompt with the
    /// buffer left as edited
    LeadingSpace,
}

/// Next character on the editing ring:
/// space -> 'A'..'Z' -> 'a'..'z' -> '0'..'9' -> space
pub const fn next_glyph(ch: u8) -> u8 {
    match ch {
        b' ' => b'A',
        b'Z' => b'a',
        b'z' => b'0',
        b'9' => b' ',
        c => c + 1,
    }
}

/// Previous character on the editing ring; exact inverse of [`next_glyph`]
pub const fn prev_glyph(ch: u8) -> u8 {
    match ch {
        b' ' => b'9',
        b'0' => b'z',
        b'a' => b'Z',
        b'A' => b' ',
        c => c - 1,
    }
}

/// Render an unsigned value as decimal digits, `"0"` for zero
pub fn format_u32(value: u32) -> heapless::String<10> {
    let mut digits = [0u8; 10];
    let mut n = value;
    let mut len = 0;
    loop {
        digits[len] = b'0' + (n % 10) as u8;
        n /= 10;
        len += 1;
        if n == 0 {
            break;
        }
    }
    let mut out = heapless::String::new();
    for i in (0..len).rev() {
        out.push(digits[i] as char).ok();
    }
    out
}

/// Numeric entry loop on one display line.
///
/// Digits accumulate left to right and echo at increasing columns; `#` resets
/// the value and blanks the line; `*` returns the accumulated value (0 when
/// nothing was entered). A fourth digit keypress is ignored, bounding the
/// result below 1000.
pub fn enter_number<E, D, P, DL>(
    display: &mut D,
    keypad: &mut Keypad<P, DL>,
    row: u8,
) -> Result<u16, E>
where
    E: From<HalError>,
    D: DisplaySurface<Error = E>,
    P: KeypadPort<Error = E>,
    DL: DelayNs,
{
    let mut value: u16 = 0;
    let mut entered: u8 = 0;
    loop {
        match keypad.read()? {
            Some(Key::Star) => return Ok(value),
            Some(Key::Hash) => {
                value = 0;
                entered = 0;
                display.clear_line(row)?;
            }
            Some(Key::Digit(d)) if entered < MAX_ENTRY_DIGITS => {
                value = value * 10 + u16::from(d);
                entered += 1;
                display.put_char(b'0' + d, row, entered)?;
            }
            _ => {}
        }
    }
}

/// Name entry loop over a fixed-length buffer.
///
/// The buffer arrives pre-seeded (existing name or spaces) and is edited in
/// place. Key4/Key6 move the cursor left/right within the buffer bounds;
/// Key2/Key8 cycle the character under the cursor through the glyph ring,
/// re-rendering the cell and pulling the cursor back onto it. `*` terminates;
/// a buffer still starting with a space is reported, not reset.
pub fn enter_name<E, D, P, DL>(
    display: &mut D,
    keypad: &mut Keypad<P, DL>,
    name: &mut [u8],
    row: u8,
) -> Result<NameStatus, E>
where
    E: From<HalError>,
    D: DisplaySurface<Error = E>,
    P: KeypadPort<Error = E>,
    DL: DelayNs,
{
    let mut cursor: usize = 0;
    loop {
        match keypad.read()? {
            Some(Key::Star) => break,
            Some(Key::Digit(2)) => {
                name[cursor] = next_glyph(name[cursor]);
                display.put_char(name[cursor], row, cursor as u8 + 1)?;
                display.shift_cursor_left()?;
            }
            Some(Key::Digit(8)) => {
                name[cursor] = prev_glyph(name[cursor]);
                display.put_char(name[cursor], row, cursor as u8 + 1)?;
                display.shift_cursor_left()?;
            }
            Some(Key::Digit(4)) => {
                if cursor > 0 {
                    display.shift_cursor_left()?;
                    cursor -= 1;
                }
            }
            Some(Key::Digit(6)) => {
                if cursor + 1 < name.len() {
                    display.shift_cursor_right()?;
                    cursor += 1;
                }
            }
            _ => {}
        }
    }
    if name[0] == b' ' {
        Ok(NameStatus::LeadingSpace)
    } else {
        Ok(NameStatus::Accepted)
    }
}
