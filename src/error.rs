//! Error types for driver construction, the runtime loops, and subscription.

use crate::button::Button;

/// Driver result alias, generic over the underlying bus error type.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Errors surfaced by driver construction and the two runtime loops.
///
/// Generic over the bus error type so callers can match on the underlying
/// hardware failure.
///
/// Configuration variants are reported before any hardware interaction, so a
/// rejected [`Options`](crate::Options) never leaves the device half
/// configured. A `Transport` fault terminates the loop that observed it; a
/// malfunctioning bus cannot be independently verified, so the loops never
/// retry on their own.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum Error<E> {
    /// One of the three initialization writes failed. The driver is not
    /// usable; construction may be retried.
    #[display("setup write failed")]
    Setup(#[error(not(source))] E),

    /// A read or write failed during steady-state polling or LED updates.
    /// Returned by [`ButtonRunner::run`](crate::ButtonRunner::run) or
    /// [`LedRunner::run`](crate::LedRunner::run); the affected loop stops.
    #[display("transport fault during steady-state operation")]
    Transport(#[error(not(source))] E),

    /// The supplied gamma table did not have exactly 256 entries.
    #[display("gamma table must have 256 entries, got {len}")]
    InvalidGamma {
        /// Number of entries in the rejected table.
        len: usize,
    },

    /// The poll interval was zero.
    #[display("poll interval must be non-zero")]
    ZeroPollInterval,
}

/// All subscriber slots for a button/event kind are taken.
///
/// Endpoints are statically allocated, so each button supports at most
/// [`MAX_SUBSCRIBERS`](crate::MAX_SUBSCRIBERS) subscribers per event kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq, derive_more::Display, derive_more::Error)]
#[display("no subscriber slots left for button {button}")]
pub struct SubscribeError {
    /// The button whose slots are exhausted.
    pub button: Button,
}
