//! Persistent tank configuration store
//!
//! Each tank occupies a fixed 32-byte slot: six name characters plus a zero
//! terminator, then length/width/height as big-endian u16 fields; the rest of
//! the slot is reserved. One sentinel byte outside the slot area distinguishes
//! a virgin store from a warm boot. The layout is a wire contract shared with
//! deployed units and must not drift from the constants below.

use crate::hal::NvStore;
use crate::types::{TankConfig, NAME_LEN, TANK_COUNT};

/// Bytes reserved per tank record
pub const SLOT_SIZE: u8 = 32;

/// Slot offset of the length field (after name + terminator)
pub const DIMS_OFFSET: u8 = NAME_LEN as u8 + 1;

/// Address of the initialization sentinel byte
pub const SENTINEL_ADDR: u8 = 0xAA;

/// Magic value marking an initialized store
pub const SENTINEL_MAGIC: u8 = 0x2A;

/// Tank record codec over a byte-addressable non-volatile store
pub struct TankStore<N> {
    nv: N,
}

impl<N> TankStore<N>
where
    N: NvStore,
{
    pub fn new(nv: N) -> Self {
        Self { nv }
    }

    /// Whether the sentinel marks this store as initialized. A corrupted
    /// sentinel is indistinguishable from a virgin store and triggers
    /// reinitialization; accepted data-loss mode.
    pub fn is_initialized(&mut self) -> Result<bool, N::Error> {
        Ok(self.nv.read_byte(SENTINEL_ADDR)? == SENTINEL_MAGIC)
    }

    /// Write the initialization sentinel
    pub fn mark_initialized(&mut self) -> Result<(), N::Error> {
        self.nv.write_byte(SENTINEL_ADDR, SENTINEL_MAGIC)
    }

    /// Persist one tank record to its slot
    pub fn write_tank(&mut self, index: usize, tank: &TankConfig) -> Result<(), N::Error> {
        let base = (index as u8) << 5;
        for (i, byte) in tank.name.iter().enumerate() {
            self.nv.write_byte(base + i as u8, *byte)?;
        }
        self.nv.write_byte(base + NAME_LEN as u8, 0)?;
        let mut offset = base + DIMS_OFFSET;
        for field in [tank.length_cm, tank.width_cm, tank.height_cm] {
            let [hi, lo] = field.to_be_bytes();
            self.nv.write_byte(offset, hi)?;
            self.nv.write_byte(offset + 1, lo)?;
            offset += 2;
        }
        Ok(())
    }

    /// Read one tank record from its slot
    pub fn read_tank(&mut self, index: usize) -> Result<TankConfig, N::Error> {
        let base = (index as u8) << 5;
        let mut tank = TankConfig::empty();
        for i in 0..NAME_LEN {
            tank.name[i] = self.nv.read_byte(base + i as u8)?;
        }
        let mut offset = base + DIMS_OFFSET;
        let mut fields = [0u16; 3];
        for field in &mut fields {
            let hi = self.nv.read_byte(offset)?;
            let lo = self.nv.read_byte(offset + 1)?;
            *field = u16::from_be_bytes([hi, lo]);
            offset += 2;
        }
        tank.length_cm = fields[0];
        tank.width_cm = fields[1];
        tank.height_cm = fields[2];
        Ok(tank)
    }

    /// Populate the registry at boot: load every slot from a warm store, or
    /// write empty slots plus the sentinel on first boot.
    pub fn load_or_init(&mut self, tanks: &mut [TankConfig; TANK_COUNT]) -> Result<(), N::Error> {
        if self.is_initialized()? {
            for (index, tank) in tanks.iter_mut().enumerate() {
                *tank = self.read_tank(index)?;
            }
        } else {
            for (index, tank) in tanks.iter_mut().enumerate() {
                *tank = TankConfig::empty();
                self.write_tank(index, tank)?;
            }
            self.mark_initialized()?;
        }
        Ok(())
    }

    /// Access the underlying store, mainly for test inspection
    pub fn nv_mut(&mut self) -> &mut N {
        &mut self.nv
    }
}
