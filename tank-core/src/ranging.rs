//! Ultrasonic ranging driver (HC-SR04 style trigger/echo protocol)
//!
//! A measurement is two bounded busy-waits: one for the echo line to assert
//! after the trigger pulse, one for it to release. Both are clocked by the
//! shared overflow counter; blowing either bound reads as distance 0, which
//! callers treat as "no object in range".

use embedded_hal::delay::DelayNs;

use crate::hal::RangingPort;
use crate::timer::OverflowCounter;

/// Instruction clock feeding the stopwatch timer (4 MHz crystal / 4)
pub const TIMER_CLOCK_HZ: u32 = 1_000_000;

/// Stopwatch timer prescaler
pub const TIMER_PRESCALE: u32 = 64;

/// Speed of sound in air, cm/s
pub const SPEED_OF_SOUND_CM_S: u32 = 34_300;

/// Overflow ticks allowed in each echo wait before giving up
pub const ECHO_TIMEOUT_TICKS: u8 = 25;

/// Minimum trigger pulse width, microseconds
pub const TRIGGER_PULSE_US: u32 = 10;

/// One-way distance per stopwatch tick, in thousandths of a centimeter.
/// Derived from the clock configuration so a different board recomputes it.
pub const MILLI_CM_PER_TICK: u32 =
    TIMER_PRESCALE * SPEED_OF_SOUND_CM_S / (TIMER_CLOCK_HZ / 1000) / 2;

/// Ranging driver bound to one trigger/echo port and the shared tick counter
pub struct RangeSensor<'a, P> {
    port: P,
    ticks: &'a OverflowCounter,
}

impl<'a, P> RangeSensor<'a, P>
where
    P: RangingPort,
{
    pub fn new(port: P, ticks: &'a OverflowCounter) -> Self {
        Self { port, ticks }
    }

    /// Perform one measurement, returning centimeters or 0 on timeout.
    ///
    /// The overflow counter starts from the sentinel value 1 so that a
    /// measurement completing before the first overflow multiplies by one.
    pub fn measure<D: DelayNs>(&mut self, delay: &mut D) -> Result<u16, P::Error> {
        self.ticks.set(1);
        self.port.set_trigger(true)?;
        delay.delay_us(TRIGGER_PULSE_US);
        self.port.set_trigger(false)?;

        self.ticks.enable();
        self.port.reset_timer()?;

        // Wait for the echo line to assert
        while !self.port.echo()? {
            if self.ticks.get() >= ECHO_TIMEOUT_TICKS {
                return Ok(0);
            }
        }

        self.port.reset_timer()?;
        self.ticks.set(1);

        // Wait for the echo line to release; its high time encodes the
        // round-trip flight time
        while self.port.echo()? {
            if self.ticks.get() >= ECHO_TIMEOUT_TICKS {
                break;
            }
        }
        let raw = self.port.timer_ticks()?;
        let overflows = self.ticks.get();
        self.ticks.disable();

        if overflows >= ECHO_TIMEOUT_TICKS {
            return Ok(0);
        }
        Ok((u32::from(raw) * u32::from(overflows) * MILLI_CM_PER_TICK / 1000) as u16)
    }

    /// Access the underlying port, mainly for test inspection
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutable port access, for scripting measurements in tests
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}
