//! RGB color handling and the bit-banged LED command encoder.
//!
//! The RGB LED sits behind two expander output pins driven as a software
//! serial link: each logical byte becomes 16 output-register snapshots, two
//! per bit (clock low with the data bit, then clock high with the data bit
//! unchanged), most-significant bit first. A full LED command shifts out
//! eight bytes: two zero start bytes, a marker byte, the blue, green, and red
//! channel values, and two zero trailing bytes.

/// RGB color representation re-exported from the `smart_leds` crate.
pub type Rgb = smart_leds::RGB8;

/// Expander pin carrying the LED data line.
const PIN_LED_DATA: u8 = 7;

/// Expander pin carrying the LED clock line.
const PIN_LED_CLOCK: u8 = 6;

/// Marker byte opening the channel segment. The top three bits select "write
/// all three channels"; the bottom five pin the LED's hardware brightness to
/// maximum, since brightness is applied in software before gamma lookup.
const LED_MARKER: u8 = 0xEF;

/// Control bytes per LED command.
const COMMAND_BYTES: usize = 8;

/// Output-register snapshots per encoded byte.
pub(crate) const FRAMES_PER_BYTE: usize = 16;

/// Snapshot bytes in one full LED command payload.
pub(crate) const LED_FRAME_LEN: usize = COMMAND_BYTES * FRAMES_PER_BYTE;

// ============================================================================
// Gamma correction
// ============================================================================

/// Default gamma correction curve: gamma 2.2 for 8-bit values, pre-computed
/// to avoid floating point math (`corrected = (value/255)^2.2 * 255`).
///
/// Override it with [`Options::with_gamma`](crate::Options::with_gamma).
pub const DEFAULT_GAMMA: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 11, 11,
    11, 12, 12, 13, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 22, 22, 23,
    23, 24, 25, 25, 26, 26, 27, 28, 28, 29, 30, 30, 31, 32, 33, 33, 34, 35, 35, 36, 37, 38, 39, 39,
    40, 41, 42, 43, 43, 44, 45, 46, 47, 48, 49, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 73, 74, 75, 76, 77, 78, 79, 81, 82, 83, 84, 85, 87, 88,
    89, 90, 91, 93, 94, 95, 97, 98, 99, 100, 102, 103, 105, 106, 107, 109, 110, 111, 113, 114, 116,
    117, 119, 120, 121, 123, 124, 126, 127, 129, 130, 132, 133, 135, 137, 138, 140, 141, 143, 145,
    146, 148, 149, 151, 153, 154, 156, 158, 159, 161, 163, 165, 166, 168, 170, 172, 173, 175, 177,
    179, 181, 182, 184, 186, 188, 190, 192, 194, 196, 197, 199, 201, 203, 205, 207, 209, 211, 213,
    215, 217, 219, 221, 223, 225, 227, 229, 231, 234, 236, 238, 240, 242, 244, 246, 248, 251, 253,
    255,
];

/// Scales a raw channel value by the shared brightness scalar.
/// 255 means no attenuation; integer math keeps the result in 0–255.
pub(crate) fn scale(value: u8, brightness: u8) -> u8 {
    ((u16::from(value) * u16::from(brightness)) / 255) as u8
}

// ============================================================================
// Bit-stream encoder
// ============================================================================

/// Incrementally built sequence of output-register snapshots.
///
/// Each snapshot starts as a copy of the previous one with only the clock and
/// data bits touched, so frames for a whole command compose without
/// disturbing the other expander pins.
struct PinFrames {
    frames: heapless::Vec<u8, LED_FRAME_LEN>,
    state: u8,
}

impl PinFrames {
    fn new() -> Self {
        Self {
            frames: heapless::Vec::new(),
            state: 0,
        }
    }

    /// Shifts one byte out as 16 snapshots, MSB first.
    fn push_byte(&mut self, byte: u8) {
        let mut byte = byte;
        for _ in 0..8 {
            self.state &= !(1 << PIN_LED_CLOCK);
            if byte & 0x80 != 0 {
                self.state |= 1 << PIN_LED_DATA;
            } else {
                self.state &= !(1 << PIN_LED_DATA);
            }
            let _ = self.frames.push(self.state);
            self.state |= 1 << PIN_LED_CLOCK;
            let _ = self.frames.push(self.state);
            byte <<= 1;
        }
    }
}

/// Builds the full snapshot payload for one LED command.
///
/// The channel segment is blue, green, red, each scaled by `brightness` and
/// then gamma-corrected. The caller prefixes the output register address to
/// form the device write.
pub(crate) fn led_frames(
    color: Rgb,
    brightness: u8,
    gamma: &[u8; 256],
) -> heapless::Vec<u8, LED_FRAME_LEN> {
    let mut queue = PinFrames::new();
    queue.push_byte(0);
    queue.push_byte(0);
    queue.push_byte(LED_MARKER);
    queue.push_byte(gamma[usize::from(scale(color.b, brightness))]);
    queue.push_byte(gamma[usize::from(scale(color.g, brightness))]);
    queue.push_byte(gamma[usize::from(scale(color.r, brightness))]);
    queue.push_byte(0);
    queue.push_byte(0);
    queue.frames
}
