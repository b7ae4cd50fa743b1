//! LED update loop: bootstrap frame, requested colors, brightness, faults.

mod common;

use button_shim::{Error, Options, State};
use common::{BusFault, ScriptBus, Step};
use embassy_futures::block_on;
use embassy_futures::join::join;

const LED_DATA_BIT: u8 = 1 << 7;
const LED_CLOCK_BIT: u8 = 1 << 6;

static IDENTITY: [u8; 256] = identity_gamma();

const fn identity_gamma() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut index = 0;
    while index < 256 {
        table[index] = index as u8;
        index += 1;
    }
    table
}

/// Recovers the logical bytes from a snapshot payload: the data bit at each
/// clock-high snapshot, MSB first.
fn decode(frames: &[u8]) -> Vec<u8> {
    assert_eq!(frames.len() % 16, 0);
    frames
        .chunks(16)
        .map(|chunk| {
            chunk
                .iter()
                .filter(|frame| *frame & LED_CLOCK_BIT != 0)
                .fold(0u8, |byte, frame| {
                    (byte << 1) | u8::from(frame & LED_DATA_BIT != 0)
                })
        })
        .collect()
}

fn script_for(color_writes: usize) -> ScriptBus {
    let mut steps = vec![Step::Write(Ok(())); 3 + color_writes];
    // A scripted fault on the final write is the only way to stop the loop.
    steps.push(Step::Write(Err(BusFault)));
    ScriptBus::new(steps)
}

#[test]
fn writes_black_bootstrap_frame_then_each_requested_color_in_order() {
    static STATE: State = State::new();
    let led = script_for(2); // black + first color; second color faults

    let (shim, _button_runner, led_runner) = block_on(button_shim::new(
        &STATE,
        ScriptBus::new([]),
        led.clone(),
        Options::default().with_gamma(&IDENTITY),
    ))
    .ok()
    .unwrap();

    let (fault, ()) = block_on(join(led_runner.run(), async {
        shim.set_color(10, 20, 30).await;
        shim.set_color(200, 100, 50).await;
    }));
    assert!(matches!(fault, Error::Transport(BusFault)));

    let writes = led.writes();
    assert_eq!(writes.len(), 6);
    for command in &writes[3..] {
        // Output register address followed by 8 bytes x 16 snapshots.
        assert_eq!(command[0], 0x01);
        assert_eq!(command.len(), 129);
    }
    assert_eq!(decode(&writes[3][1..]), vec![0, 0, 0xEF, 0, 0, 0, 0, 0]);
    assert_eq!(decode(&writes[4][1..]), vec![0, 0, 0xEF, 30, 20, 10, 0, 0]);
    assert_eq!(decode(&writes[5][1..]), vec![0, 0, 0xEF, 50, 100, 200, 0, 0]);
}

#[test]
fn brightness_attenuates_the_next_encode() {
    static STATE: State = State::new();
    let led = script_for(2);

    let (shim, _button_runner, led_runner) = block_on(button_shim::new(
        &STATE,
        ScriptBus::new([]),
        led.clone(),
        Options::default().with_gamma(&IDENTITY),
    ))
    .ok()
    .unwrap();

    let (fault, ()) = block_on(join(led_runner.run(), async {
        shim.set_brightness(128);
        shim.set_color(255, 255, 255).await;
        shim.set_color(0, 0, 0).await;
    }));
    assert!(matches!(fault, Error::Transport(BusFault)));

    let writes = led.writes();
    assert_eq!(
        decode(&writes[4][1..]),
        vec![0, 0, 0xEF, 128, 128, 128, 0, 0]
    );
}
