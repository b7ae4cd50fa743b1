//! Driver construction, the caller-facing handle, and the two runtime loops.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal_async::i2c::I2c;
use portable_atomic::{AtomicU8, Ordering};

use crate::button::{Button, Edge, PressTracker};
use crate::error::{Error, Result, SubscribeError};
use crate::events::{Dispatcher, PressEvents, ReleaseEvents};
use crate::led::{DEFAULT_GAMMA, LED_FRAME_LEN, Rgb, led_frames};

// ============================================================================
// Hardware constants
// ============================================================================

/// Fixed bus address of the expander.
pub(crate) const SHIM_ADDRESS: u8 = 0x3f;

/// Button state register.
const REG_INPUT: u8 = 0x00;
/// Output register driving the LED clock/data pins.
const REG_OUTPUT: u8 = 0x01;
/// Input polarity register.
const REG_POLARITY: u8 = 0x02;
/// Pin direction register.
const REG_CONFIG: u8 = 0x03;

/// Direction mask: button bits 0–4 are inputs, the LED pins outputs.
const DIRECTION_MASK: u8 = 0x1f;

/// Default time between button polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Options
// ============================================================================

/// Driver configuration.
///
/// Validated by [`new`] before any hardware interaction, so a rejected value
/// never leaves the device half configured.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Time between button polls. A longer interval uses fewer resources but
    /// risks missing a fast press entirely. Default 50 ms.
    pub poll_interval: Duration,
    /// Gamma correction table; must hold exactly 256 level mappings.
    /// Default [`DEFAULT_GAMMA`].
    pub gamma: &'static [u8],
}

impl Options {
    /// Replaces the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Replaces the gamma correction table.
    #[must_use]
    pub const fn with_gamma(mut self, gamma: &'static [u8]) -> Self {
        self.gamma = gamma;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            gamma: &DEFAULT_GAMMA,
        }
    }
}

// ============================================================================
// State - Static resources shared by the handle and the runners
// ============================================================================

/// Static resources owned by one driver instance.
///
/// Place it in a `static` and hand it to [`new`]; one `State` supports one
/// driver for the lifetime of the program.
pub struct State {
    color: Channel<CriticalSectionRawMutex, Rgb, 1>,
    brightness: AtomicU8,
    press: [Dispatcher<()>; Button::COUNT],
    release: [Dispatcher<Duration>; Button::COUNT],
}

impl State {
    /// Creates an empty state. Brightness starts at 255 (no attenuation).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            color: Channel::new(),
            brightness: AtomicU8::new(255),
            press: [const { Dispatcher::new() }; Button::COUNT],
            release: [const { Dispatcher::new() }; Button::COUNT],
        }
    }

    fn dispatch(&self, edge: Edge) {
        match edge {
            Edge::Pressed(button) => {
                log::trace!("button {button} pressed");
                self.press[button.index()].publish(());
            }
            Edge::Released(button, held) => {
                log::trace!("button {button} released after {} ms", held.as_millis());
                self.release[button.index()].publish(held);
            }
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Construction
// ============================================================================

/// Configures the expander and returns the driver handle plus the two
/// runtime loops.
///
/// Performs the three setup writes (pin directions, non-inverted polarity,
/// outputs low) and queues a black frame so the LED starts quiesced once the
/// update loop runs. The caller spawns [`ButtonRunner::run`] and
/// [`LedRunner::run`] as two long-lived tasks; to share one physical bus
/// between them, wrap it with `embedded-hal-bus`.
///
/// # Errors
///
/// [`Error::InvalidGamma`] or [`Error::ZeroPollInterval`] if `options` is
/// rejected (before any bus traffic); [`Error::Setup`] if one of the three
/// initialization writes fails.
pub async fn new<BUTTONS, LED>(
    state: &'static State,
    buttons_bus: BUTTONS,
    mut led_bus: LED,
    options: Options,
) -> Result<(ButtonShim, ButtonRunner<BUTTONS>, LedRunner<LED>), LED::Error>
where
    BUTTONS: I2c,
    LED: I2c,
{
    let gamma: &'static [u8; 256] = options.gamma.try_into().map_err(|_| Error::InvalidGamma {
        len: options.gamma.len(),
    })?;
    if options.poll_interval.as_ticks() == 0 {
        return Err(Error::ZeroPollInterval);
    }

    led_bus
        .write(SHIM_ADDRESS, &[REG_CONFIG, DIRECTION_MASK])
        .await
        .map_err(Error::Setup)?;
    led_bus
        .write(SHIM_ADDRESS, &[REG_POLARITY, 0x00])
        .await
        .map_err(Error::Setup)?;
    led_bus
        .write(SHIM_ADDRESS, &[REG_OUTPUT, 0x00])
        .await
        .map_err(Error::Setup)?;
    log::debug!("button shim configured at address {SHIM_ADDRESS:#04x}");

    state.color.send(Rgb::new(0, 0, 0)).await;

    let shim = ButtonShim { state };
    let button_runner = ButtonRunner {
        bus: buttons_bus,
        state,
        poll_interval: options.poll_interval,
    };
    let led_runner = LedRunner {
        bus: led_bus,
        state,
        gamma,
    };
    Ok((shim, button_runner, led_runner))
}

// ============================================================================
// ButtonShim - Caller-facing handle
// ============================================================================

/// Handle for interacting with the driver. Cheap to copy; all state lives in
/// the [`State`] it was created from.
#[derive(Clone, Copy)]
pub struct ButtonShim {
    state: &'static State,
}

impl ButtonShim {
    /// Requests a new LED color.
    ///
    /// Requests form a FIFO of exactly the colors issued; there is no
    /// coalescing. The mailbox holds a single in-flight request, so this may
    /// wait until the update loop accepts the previous one.
    pub async fn set_color(&self, red: u8, green: u8, blue: u8) {
        self.state.color.send(Rgb::new(red, green, blue)).await;
    }

    /// Sets the brightness scalar applied to all three channels at encode
    /// time. 255 (the default) means no attenuation; takes effect with the
    /// next color request. Last writer wins.
    pub fn set_brightness(&self, brightness: u8) {
        self.state.brightness.store(brightness, Ordering::Relaxed);
    }

    /// Registers a new subscription for press events on `button`.
    ///
    /// Each subscriber receives events independently; see
    /// [`PressEvents::next`](crate::Events::next). Registration is
    /// append-only for the lifetime of the driver.
    ///
    /// # Errors
    ///
    /// [`SubscribeError`] when all subscriber slots for this button are
    /// taken.
    pub fn subscribe_to_press(
        &self,
        button: Button,
    ) -> core::result::Result<PressEvents<'static>, SubscribeError> {
        self.state.press[button.index()]
            .subscribe()
            .ok_or(SubscribeError { button })
    }

    /// Registers a new subscription for release events on `button`. The
    /// event carries the observed held time.
    ///
    /// # Errors
    ///
    /// [`SubscribeError`] when all subscriber slots for this button are
    /// taken.
    pub fn subscribe_to_release(
        &self,
        button: Button,
    ) -> core::result::Result<ReleaseEvents<'static>, SubscribeError> {
        self.state.release[button.index()]
            .subscribe()
            .ok_or(SubscribeError { button })
    }

    /// Best-effort quiesce: asks the update loop to blank the LED. Does not
    /// stop the background loops; if the mailbox is full the request is
    /// dropped.
    pub fn halt(&self) {
        let _ = self.state.color.try_send(Rgb::new(0, 0, 0));
    }
}

// ============================================================================
// ButtonRunner - Button poll loop
// ============================================================================

/// The button poll loop. Spawn [`run`](Self::run) once at startup.
pub struct ButtonRunner<BUS: I2c> {
    bus: BUS,
    state: &'static State,
    poll_interval: Duration,
}

impl<BUS: I2c> ButtonRunner<BUS> {
    /// Polls the input register forever, dispatching press/release edges to
    /// subscribers.
    ///
    /// Returns only on a transport fault: the bus cannot be independently
    /// verified, so the loop stops rather than act on stale data. The owning
    /// task decides whether that is fatal to the process.
    pub async fn run(mut self) -> Error<BUS::Error> {
        let mut tracker = PressTracker::new();
        loop {
            let mut register = [0u8; 1];
            if let Err(source) = self
                .bus
                .write_read(SHIM_ADDRESS, &[REG_INPUT], &mut register)
                .await
            {
                log::error!("button poll read failed; stopping poll loop");
                return Error::Transport(source);
            }
            let now = Instant::now();
            for edge in tracker.scan(register[0], now) {
                self.state.dispatch(edge);
            }
            Timer::after(self.poll_interval).await;
        }
    }
}

// ============================================================================
// LedRunner - LED update loop
// ============================================================================

/// The LED update loop. Spawn [`run`](Self::run) once at startup.
pub struct LedRunner<BUS: I2c> {
    bus: BUS,
    state: &'static State,
    gamma: &'static [u8; 256],
}

impl<BUS: I2c> LedRunner<BUS> {
    /// Waits for color requests forever, encoding and writing one LED
    /// command per request.
    ///
    /// Returns only on a transport fault, like [`ButtonRunner::run`].
    pub async fn run(mut self) -> Error<BUS::Error> {
        loop {
            let color = self.state.color.receive().await;
            let brightness = self.state.brightness.load(Ordering::Relaxed);
            let frames = led_frames(color, brightness, self.gamma);

            let mut command: heapless::Vec<u8, { LED_FRAME_LEN + 1 }> = heapless::Vec::new();
            let _ = command.push(REG_OUTPUT);
            let _ = command.extend_from_slice(&frames);

            if let Err(source) = self.bus.write(SHIM_ADDRESS, &command).await {
                log::error!("LED command write failed; stopping update loop");
                return Error::Transport(source);
            }
        }
    }
}
