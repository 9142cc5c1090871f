#![no_std]

//! Board adapters binding the core HAL traits to real peripherals, plus a
//! mock board for bring-up and host runs

pub use heapless::String;
pub use static_cell::StaticCell;

pub use tank_core::*;

pub use crate::hardware::*;
pub use crate::mock_hardware::*;

/// Generic peripheral adapters over `embedded-hal` pin and bus traits.
///
/// Every adapter is written against the 1.0 trait contracts so any board HAL
/// with type-erased pins can be dropped in without touching the core.
pub mod hardware {
    use embedded_hal::delay::DelayNs;
    use embedded_hal::digital::{InputPin, OutputPin};
    use embedded_hal::i2c::I2c;
    use tank_core::hal::{
        DisplaySurface, HalError, KeypadPort, NvStore, RangingPort, SensorMux, DISPLAY_COLS,
        KEYPAD_COLS, KEYPAD_ROWS,
    };

    /// Free-running hardware timer the ranging driver stopwatches with.
    ///
    /// Maps onto an 8-bit prescaled timer register; the overflow interrupt
    /// feeding [`tank_core::OverflowCounter`] is configured separately.
    pub trait EchoTimer {
        /// Zero the timer register
        fn reset(&mut self);
        /// Current timer register value
        fn ticks(&self) -> u8;
    }

    /// DDRAM start address of each display line on the 16x4 module.
    /// Lines 3 and 4 continue lines 1 and 2 in the controller's address space.
    const ROW_ADDR: [u8; 4] = [0x00, 0x40, 0x10, 0x50];

    const LCD_CLEAR: u8 = 0x01;
    const LCD_ENTRY_MODE: u8 = 0x06;
    const LCD_DISPLAY_CTRL: u8 = 0x08;
    const LCD_CURSOR_LEFT: u8 = 0x10;
    const LCD_CURSOR_RIGHT: u8 = 0x14;
    const LCD_FUNCTION_4BIT_2LINE: u8 = 0x28;
    const LCD_SET_DDRAM: u8 = 0x80;

    const CTRL_DISPLAY_ON: u8 = 0x04;
    const CTRL_CURSOR_ON: u8 = 0x02;
    const CTRL_BLINK_ON: u8 = 0x01;

    /// HD44780-compatible character module driven over a 4-bit parallel bus
    pub struct Hd44780<P, DL> {
        rs: P,
        en: P,
        data: [P; 4],
        delay: DL,
        ctrl: u8,
        cursor: (u8, u8),
    }

    impl<P, DL> Hd44780<P, DL>
    where
        P: OutputPin,
        DL: DelayNs,
    {
        pub fn new(rs: P, en: P, data: [P; 4], delay: DL) -> Self {
            Self {
                rs,
                en,
                data,
                delay,
                ctrl: CTRL_DISPLAY_ON,
                cursor: (1, 1),
            }
        }

        /// Power-on initialization: force 8-bit mode three times, drop to
        /// 4-bit, then program function, display and entry mode.
        pub fn init(&mut self) -> Result<(), HalError> {
            self.delay.delay_ms(15);
            for _ in 0..3 {
                self.write_nibble(0x03, false)?;
                self.delay.delay_ms(5);
            }
            self.write_nibble(0x02, false)?;
            self.command(LCD_FUNCTION_4BIT_2LINE)?;
            self.command(LCD_DISPLAY_CTRL | self.ctrl)?;
            self.command(LCD_ENTRY_MODE)?;
            self.command(LCD_CLEAR)?;
            self.delay.delay_ms(2);
            Ok(())
        }

        fn write_nibble(&mut self, nibble: u8, is_data: bool) -> Result<(), HalError> {
            self.rs
                .set_state(is_data.into())
                .map_err(|_| HalError::GpioError)?;
            for (bit, pin) in self.data.iter_mut().enumerate() {
                pin.set_state(((nibble >> bit) & 1 == 1).into())
                    .map_err(|_| HalError::GpioError)?;
            }
            self.en.set_high().map_err(|_| HalError::GpioError)?;
            self.delay.delay_us(1);
            self.en.set_low().map_err(|_| HalError::GpioError)?;
            self.delay.delay_us(40);
            Ok(())
        }

        fn write_byte(&mut self, byte: u8, is_data: bool) -> Result<(), HalError> {
            self.write_nibble(byte >> 4, is_data)?;
            self.write_nibble(byte & 0x0F, is_data)
        }

        fn command(&mut self, cmd: u8) -> Result<(), HalError> {
            self.write_byte(cmd, false)
        }
    }

    impl<P, DL> DisplaySurface for Hd44780<P, DL>
    where
        P: OutputPin,
        DL: DelayNs,
    {
        type Error = HalError;

        fn clear(&mut self) -> Result<(), Self::Error> {
            self.command(LCD_CLEAR)?;
            self.delay.delay_ms(2);
            self.cursor = (1, 1);
            Ok(())
        }

        fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Self::Error> {
            if !(1..=4).contains(&row) || !(1..=DISPLAY_COLS).contains(&col) {
                return Err(HalError::InvalidConfig);
            }
            self.command(LCD_SET_DDRAM | (ROW_ADDR[row as usize - 1] + col - 1))?;
            self.cursor = (row, col);
            Ok(())
        }

        fn put_char(&mut self, ch: u8, row: u8, col: u8) -> Result<(), Self::Error> {
            self.set_cursor(row, col)?;
            self.write_byte(ch, true)?;
            self.cursor.1 = (col + 1).min(DISPLAY_COLS);
            Ok(())
        }

        fn put_str(&mut self, text: &str, row: u8, col: u8) -> Result<(), Self::Error> {
            let start = if col == 0 {
                DISPLAY_COLS.saturating_sub(text.len() as u8) / 2 + 1
            } else {
                col
            };
            self.set_cursor(row, start)?;
            for ch in text.bytes().take(usize::from(DISPLAY_COLS - start) + 1) {
                self.write_byte(ch, true)?;
                self.cursor.1 = (self.cursor.1 + 1).min(DISPLAY_COLS);
            }
            Ok(())
        }

        fn clear_line(&mut self, row: u8) -> Result<(), Self::Error> {
            self.set_cursor(row, 1)?;
            for _ in 0..DISPLAY_COLS {
                self.write_byte(b' ', true)?;
            }
            self.set_cursor(row, 1)
        }

        fn cursor_visible(&mut self, on: bool) -> Result<(), Self::Error> {
            if on {
                self.ctrl |= CTRL_CURSOR_ON;
            } else {
                self.ctrl &= !CTRL_CURSOR_ON;
            }
            self.command(LCD_DISPLAY_CTRL | self.ctrl)
        }

        fn cursor_blink(&mut self, on: bool) -> Result<(), Self::Error> {
            if on {
                self.ctrl |= CTRL_BLINK_ON;
            } else {
                self.ctrl &= !CTRL_BLINK_ON;
            }
            self.command(LCD_DISPLAY_CTRL | self.ctrl)
        }

        fn shift_cursor_left(&mut self) -> Result<(), Self::Error> {
            self.command(LCD_CURSOR_LEFT)?;
            if self.cursor.1 > 1 {
                self.cursor.1 -= 1;
            }
            Ok(())
        }

        fn shift_cursor_right(&mut self) -> Result<(), Self::Error> {
            self.command(LCD_CURSOR_RIGHT)?;
            if self.cursor.1 < DISPLAY_COLS {
                self.cursor.1 += 1;
            }
            Ok(())
        }
    }

    /// 4x3 keypad matrix wiring: three column drivers, four row inputs with
    /// external pull-downs
    pub struct MatrixKeypad<O, I> {
        cols: [O; KEYPAD_COLS],
        rows: [I; KEYPAD_ROWS],
    }

    impl<O, I> MatrixKeypad<O, I>
    where
        O: OutputPin,
        I: InputPin,
    {
        pub fn new(cols: [O; KEYPAD_COLS], rows: [I; KEYPAD_ROWS]) -> Self {
            Self { cols, rows }
        }
    }

    impl<O, I> KeypadPort for MatrixKeypad<O, I>
    where
        O: OutputPin,
        I: InputPin,
    {
        type Error = HalError;

        fn drive_column(&mut self, col: usize) -> Result<(), Self::Error> {
            if col >= KEYPAD_COLS {
                return Err(HalError::InvalidConfig);
            }
            for (i, pin) in self.cols.iter_mut().enumerate() {
                pin.set_state((i == col).into())
                    .map_err(|_| HalError::GpioError)?;
            }
            Ok(())
        }

        fn row_high(&mut self, row: usize) -> Result<bool, Self::Error> {
            if row >= KEYPAD_ROWS {
                return Err(HalError::InvalidConfig);
            }
            self.rows[row].is_high().map_err(|_| HalError::GpioError)
        }
    }

    /// HC-SR04 trigger/echo pin pair plus the stopwatch timer
    pub struct HcSr04Port<O, I, T> {
        trigger: O,
        echo: I,
        timer: T,
    }

    impl<O, I, T> HcSr04Port<O, I, T>
    where
        O: OutputPin,
        I: InputPin,
        T: EchoTimer,
    {
        pub fn new(trigger: O, echo: I, timer: T) -> Self {
            Self {
                trigger,
                echo,
                timer,
            }
        }
    }

    impl<O, I, T> RangingPort for HcSr04Port<O, I, T>
    where
        O: OutputPin,
        I: InputPin,
        T: EchoTimer,
    {
        type Error = HalError;

        fn set_trigger(&mut self, level: bool) -> Result<(), Self::Error> {
            self.trigger
                .set_state(level.into())
                .map_err(|_| HalError::GpioError)
        }

        fn echo(&mut self) -> Result<bool, Self::Error> {
            self.echo.is_high().map_err(|_| HalError::GpioError)
        }

        fn reset_timer(&mut self) -> Result<(), Self::Error> {
            self.timer.reset();
            Ok(())
        }

        fn timer_ticks(&mut self) -> Result<u8, Self::Error> {
            Ok(self.timer.ticks())
        }
    }

    /// Two GPIO lines selecting one of four ultrasonic channels.
    /// The channel code places its bits at positions 1 and 2, matching the
    /// select port wiring.
    pub struct MuxPins<O> {
        sel_a: O,
        sel_b: O,
    }

    impl<O> MuxPins<O>
    where
        O: OutputPin,
    {
        pub fn new(sel_a: O, sel_b: O) -> Self {
            Self { sel_a, sel_b }
        }
    }

    impl<O> SensorMux for MuxPins<O>
    where
        O: OutputPin,
    {
        type Error = HalError;

        fn select(&mut self, code: u8) -> Result<(), Self::Error> {
            self.sel_a
                .set_state((code & 0b010 != 0).into())
                .map_err(|_| HalError::GpioError)?;
            self.sel_b
                .set_state((code & 0b100 != 0).into())
                .map_err(|_| HalError::GpioError)
        }
    }

    /// 24LC-style serial EEPROM behind an I2C bus.
    ///
    /// Single-byte transactions only, matching the core's access pattern; the
    /// write-cycle time is waited out after every write.
    pub struct I2cEeprom<B, DL> {
        bus: B,
        delay: DL,
        device_addr: u8,
    }

    /// Write-cycle time for 24LC-class parts, milliseconds
    const EEPROM_TWR_MS: u32 = 5;

    impl<B, DL> I2cEeprom<B, DL>
    where
        B: I2c,
        DL: DelayNs,
    {
        pub fn new(bus: B, delay: DL, device_addr: u8) -> Self {
            Self {
                bus,
                delay,
                device_addr,
            }
        }
    }

    impl<B, DL> NvStore for I2cEeprom<B, DL>
    where
        B: I2c,
        DL: DelayNs,
    {
        type Error = HalError;

        fn read_byte(&mut self, addr: u8) -> Result<u8, Self::Error> {
            let mut buf = [0u8; 1];
            self.bus
                .write_read(self.device_addr, &[addr], &mut buf)
                .map_err(|_| HalError::StorageError)?;
            Ok(buf[0])
        }

        fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
            self.bus
                .write(self.device_addr, &[addr, value])
                .map_err(|_| HalError::StorageError)?;
            self.delay.delay_ms(EEPROM_TWR_MS);
            Ok(())
        }
    }
}

/// In-memory board stand-in used until the real board HAL lands, and by the
/// host build of the firmware binary
pub mod mock_hardware {
    use embedded_hal::delay::DelayNs;
    use tank_core::hal::{
        DisplaySurface, HalError, KeypadPort, NvStore, RangingPort, SensorMux, DISPLAY_COLS,
        DISPLAY_ROWS, KEYPAD_COLS, KEYPAD_ROWS,
    };

    /// Display that accepts everything and renders nowhere
    #[derive(Default)]
    pub struct NullDisplay;

    impl DisplaySurface for NullDisplay {
        type Error = HalError;

        fn clear(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Self::Error> {
            if !(1..=DISPLAY_ROWS).contains(&row) || !(1..=DISPLAY_COLS).contains(&col) {
                return Err(HalError::InvalidConfig);
            }
            Ok(())
        }

        fn put_char(&mut self, _ch: u8, _row: u8, _col: u8) -> Result<(), Self::Error> {
            Ok(())
        }

        fn put_str(&mut self, _text: &str, _row: u8, _col: u8) -> Result<(), Self::Error> {
            Ok(())
        }

        fn clear_line(&mut self, _row: u8) -> Result<(), Self::Error> {
            Ok(())
        }

        fn cursor_visible(&mut self, _on: bool) -> Result<(), Self::Error> {
            Ok(())
        }

        fn cursor_blink(&mut self, _on: bool) -> Result<(), Self::Error> {
            Ok(())
        }

        fn shift_cursor_left(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn shift_cursor_right(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    /// Keypad with no keys ever pressed
    #[derive(Default)]
    pub struct IdleKeypad;

    impl KeypadPort for IdleKeypad {
        type Error = HalError;

        fn drive_column(&mut self, col: usize) -> Result<(), Self::Error> {
            if col >= KEYPAD_COLS {
                return Err(HalError::InvalidConfig);
            }
            Ok(())
        }

        fn row_high(&mut self, row: usize) -> Result<bool, Self::Error> {
            if row >= KEYPAD_ROWS {
                return Err(HalError::InvalidConfig);
            }
            Ok(false)
        }
    }

    /// Ranging port reporting a fixed tick count on every measurement
    pub struct FixedRangingPort {
        pub ticks: u8,
        echo_polls: u8,
    }

    impl FixedRangingPort {
        pub fn new(ticks: u8) -> Self {
            Self {
                ticks,
                echo_polls: 0,
            }
        }
    }

    impl RangingPort for FixedRangingPort {
        type Error = HalError;

        fn set_trigger(&mut self, level: bool) -> Result<(), Self::Error> {
            if !level {
                self.echo_polls = 0;
            }
            Ok(())
        }

        fn echo(&mut self) -> Result<bool, Self::Error> {
            // One poll high, then low: a minimal echo pulse
            self.echo_polls = self.echo_polls.wrapping_add(1);
            Ok(self.echo_polls == 1)
        }

        fn reset_timer(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn timer_ticks(&mut self) -> Result<u8, Self::Error> {
            Ok(self.ticks)
        }
    }

    /// Channel select that goes nowhere
    #[derive(Default)]
    pub struct NullMux;

    impl SensorMux for NullMux {
        type Error = HalError;

        fn select(&mut self, _code: u8) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    /// RAM-backed store, virgin on every boot
    pub struct RamStore {
        bytes: [u8; 256],
    }

    impl RamStore {
        pub fn new() -> Self {
            Self { bytes: [0xFF; 256] }
        }
    }

    impl Default for RamStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl NvStore for RamStore {
        type Error = HalError;

        fn read_byte(&mut self, addr: u8) -> Result<u8, Self::Error> {
            Ok(self.bytes[addr as usize])
        }

        fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
            self.bytes[addr as usize] = value;
            Ok(())
        }
    }

    /// Delay provider that returns immediately
    #[derive(Default, Clone, Copy)]
    pub struct NoopDelay;

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }
}
