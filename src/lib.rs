//! Driver for Button SHIM-style boards: five momentary buttons and one RGB
//! LED behind a TCA9554A GPIO expander on I2C.
//!
//! The driver runs as two long-lived loops plus a cheap [`ButtonShim`]
//! handle:
//!
//! - [`ButtonRunner`] polls the expander's input register and turns raw bit
//!   transitions into press/release events, fanned out to every subscriber
//!   without ever blocking on a slow consumer.
//! - [`LedRunner`] waits on a one-slot color mailbox and bit-bangs each
//!   requested color to the LED through the expander's output register.
//!
//! Both loops are bus-generic over [`embedded_hal_async::i2c::I2c`]; share
//! one physical bus between them with `embedded-hal-bus`. A transport fault
//! terminates the affected loop and is returned to the task that spawned it
//! rather than crashing the process.
//!
//! # Example
//!
//! ```no_run
//! use button_shim::{Button, Options, State};
//! use embedded_hal_async::i2c::I2c;
//!
//! static STATE: State = State::new();
//!
//! async fn bring_up<BUS: I2c>(
//!     buttons_bus: BUS,
//!     led_bus: BUS,
//! ) -> Result<(), button_shim::Error<BUS::Error>> {
//!     let (shim, _button_runner, _led_runner) =
//!         button_shim::new(&STATE, buttons_bus, led_bus, Options::default()).await?;
//!     // Hand `_button_runner.run()` and `_led_runner.run()` to your executor
//!     // as two tasks, then interact through the handle:
//!     let presses = shim.subscribe_to_press(Button::A).expect("subscriber slot");
//!     shim.set_color(255, 64, 0).await;
//!     loop {
//!         presses.next().await;
//!         shim.set_color(0, 255, 0).await;
//!     }
//! }
//! ```
//!
//! # Event delivery
//!
//! Each subscription owns a small bounded buffer. If a subscriber stops
//! draining it, new events for that subscriber are silently dropped; the
//! poll loop never stalls and other subscribers are unaffected. A press
//! shorter than one poll interval may be missed entirely; the driver does
//! no debouncing beyond poll granularity.

#![cfg_attr(not(test), no_std)]

mod button;
mod driver;
mod error;
mod events;
mod led;

pub use button::Button;
pub use driver::{
    ButtonRunner, ButtonShim, DEFAULT_POLL_INTERVAL, LedRunner, Options, State, new,
};
pub use error::{Error, Result, SubscribeError};
pub use events::{EVENT_QUEUE_DEPTH, Events, MAX_SUBSCRIBERS, PressEvents, ReleaseEvents};
pub use led::{DEFAULT_GAMMA, Rgb};
