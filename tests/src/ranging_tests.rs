//! Distance conversion and timeout behavior of the ranging driver

use rstest::rstest;
use tank_core::hal::mock::{EchoScript, MockDelay, MockRangingPort};
use tank_core::ranging::MILLI_CM_PER_TICK;
use tank_core::{OverflowCounter, RangeSensor};

#[rstest]
#[case(10, 1, 10)]
#[case(36, 1, 39)]
#[case(100, 1, 109)]
#[case(50, 3, 164)]
#[case(0, 1, 0)]
fn ticks_scale_to_centimeters(#[case] ticks: u8, #[case] overflows: u8, #[case] expected: u16) {
    let counter = OverflowCounter::new();
    let mut port = MockRangingPort::new(&counter);
    port.push_readings(&[EchoScript::Reading { ticks, overflows }]);
    let mut sensor = RangeSensor::new(port, &counter);
    assert_eq!(sensor.measure(&mut MockDelay::new()).unwrap(), expected);
}

#[test]
fn conversion_matches_the_scale_constant() {
    // The rstest cases above are fixed points of this formula
    assert_eq!(50 * 3 * MILLI_CM_PER_TICK / 1000, 164);
}

#[test]
fn back_to_back_measurements_consume_one_reading_each() {
    let counter = OverflowCounter::new();
    let mut port = MockRangingPort::new(&counter);
    port.push_readings(&[
        EchoScript::Reading {
            ticks: 10,
            overflows: 1,
        },
        EchoScript::NoEcho,
        EchoScript::Reading {
            ticks: 20,
            overflows: 1,
        },
    ]);
    let mut sensor = RangeSensor::new(port, &counter);
    let mut delay = MockDelay::new();

    assert_eq!(sensor.measure(&mut delay).unwrap(), 10);
    assert_eq!(sensor.measure(&mut delay).unwrap(), 0);
    assert_eq!(sensor.measure(&mut delay).unwrap(), 21);
    assert_eq!(sensor.port().trigger_pulses(), 3);
}
