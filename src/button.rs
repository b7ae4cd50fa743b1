//! Button identities and edge detection over the polled input register.

use embassy_time::{Duration, Instant};
use heapless::Vec;

// ============================================================================
// Button - The five momentary buttons
// ============================================================================

/// One of the five momentary buttons, left to right.
///
/// Each button owns one bit position (0–4) in the expander's input register.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Leftmost button, input register bit 0.
    A = 0,
    /// Input register bit 1.
    B = 1,
    /// Input register bit 2.
    C = 2,
    /// Input register bit 3.
    D = 3,
    /// Rightmost button, input register bit 4.
    E = 4,
}

impl Button {
    /// Number of buttons on the board.
    pub const COUNT: usize = 5;

    /// All buttons in register-bit order. Use `Button::ALL.len()` instead of
    /// hardcoding the button count.
    pub const ALL: [Self; Self::COUNT] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Position of this button in [`Button::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit mask for this button in the input register.
    #[must_use]
    pub(crate) const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    /// The letter printed next to the button on the board.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }
}

impl core::fmt::Display for Button {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Edge detection
// ============================================================================

/// A press or release transition observed between two consecutive polls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Edge {
    /// Bit went 0 -> 1 since the last poll.
    Pressed(Button),
    /// Bit went 1 -> 0 since the last poll; carries the observed held time.
    Released(Button, Duration),
}

/// Tracks which buttons are currently pressed and since when.
///
/// Exactly one entry per currently-pressed button; `None` means not pressed.
pub(crate) struct PressTracker {
    pressed_since: [Option<Instant>; Button::COUNT],
}

impl PressTracker {
    pub(crate) const fn new() -> Self {
        Self {
            pressed_since: [None; Button::COUNT],
        }
    }

    /// Compares one input-register snapshot against the table and returns the
    /// edges it implies, updating the table in place.
    ///
    /// All five buttons are evaluated against the same snapshot, so
    /// simultaneous presses surface in the same cycle. A press shorter than
    /// one poll interval is never observed; held-time granularity is bounded
    /// below by the poll interval.
    pub(crate) fn scan(&mut self, register: u8, now: Instant) -> Vec<Edge, { Button::COUNT }> {
        let mut edges = Vec::new();
        for (button, slot) in Button::ALL.into_iter().zip(&mut self.pressed_since) {
            let held_down = register & button.mask() != 0;
            match (held_down, *slot) {
                (true, None) => {
                    *slot = Some(now);
                    let _ = edges.push(Edge::Pressed(button));
                }
                (false, Some(since)) => {
                    *slot = None;
                    let _ = edges.push(Edge::Released(button, now - since));
                }
                // Bit unchanged relative to the table; nothing to do.
                _ => {}
            }
        }
        edges
    }
}
