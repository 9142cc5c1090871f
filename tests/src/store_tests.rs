//! Store behavior beyond the codec round trips covered in the core crate

use proptest::prelude::*;
use tank_core::hal::mock::MockNvStore;
use tank_core::hal::NvStore;
use tank_core::store::{SENTINEL_ADDR, TankStore};
use tank_core::{TankConfig, TANK_COUNT};

#[test]
fn corrupted_sentinel_reinitializes_the_registry() {
    let mut store = TankStore::new(MockNvStore::new());
    let mut tanks = [TankConfig::empty(); TANK_COUNT];
    store.load_or_init(&mut tanks).unwrap();
    store
        .write_tank(
            1,
            &TankConfig {
                name: *b"KEEP  ",
                length_cm: 100,
                width_cm: 50,
                height_cm: 80,
            },
        )
        .unwrap();

    // A wiped sentinel reads as a virgin store; the data is not recovered
    store.nv_mut().write_byte(SENTINEL_ADDR, 0xFF).unwrap();
    let mut reloaded = [TankConfig::empty(); TANK_COUNT];
    store.load_or_init(&mut reloaded).unwrap();
    assert_eq!(reloaded[1], TankConfig::empty());
    assert!(store.is_initialized().unwrap());
}

fn glyph() -> impl Strategy<Value = u8> {
    prop_oneof![
        Just(b' '),
        b'A'..=b'Z',
        b'a'..=b'z',
        b'0'..=b'9',
    ]
}

proptest! {
    #[test]
    fn any_record_round_trips_through_its_slot(
        first in b'A'..=b'Z',
        rest in proptest::collection::vec(glyph(), 5),
        length_cm in 0u16..1000,
        width_cm in 0u16..1000,
        height_cm in 0u16..1000,
        index in 0usize..TANK_COUNT,
    ) {
        let mut name = [b' '; 6];
        name[0] = first;
        name[1..].copy_from_slice(&rest);
        let tank = TankConfig { name, length_cm, width_cm, height_cm };

        let mut store = TankStore::new(MockNvStore::new());
        store.write_tank(index, &tank).unwrap();
        prop_assert_eq!(store.read_tank(index).unwrap(), tank);
    }
}
