//! Multi-subscriber event fan-out with bounded, drop-on-full delivery.
//!
//! Every subscription claims one statically allocated endpoint: a small
//! bounded channel the poll loop publishes into with `try_send`. A subscriber
//! that stops draining its endpoint loses events once the buffer fills, but
//! never stalls the poll loop and never affects other subscribers. Button
//! events are latency-sensitive and low-volume, so dropping stale duplicates
//! beats blocking hardware polling.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Duration;

/// Events buffered per subscriber endpoint before new ones are dropped.
pub const EVENT_QUEUE_DEPTH: usize = 4;

/// Subscriber endpoints available per button and event kind.
pub const MAX_SUBSCRIBERS: usize = 4;

type Endpoint<T> = Channel<CriticalSectionRawMutex, T, EVENT_QUEUE_DEPTH>;

// ============================================================================
// Dispatcher - One button/kind's subscriber endpoints
// ============================================================================

/// Endpoint slots for one button and one event kind.
///
/// Registration is append-only for the lifetime of the driver. The slot count
/// lives behind a critical-section mutex so a late subscription while the
/// poll loop is publishing can never be observed mid-claim.
pub(crate) struct Dispatcher<T> {
    endpoints: [Endpoint<T>; MAX_SUBSCRIBERS],
    registered: Mutex<CriticalSectionRawMutex, RefCell<usize>>,
}

impl<T: Clone> Dispatcher<T> {
    pub(crate) const fn new() -> Self {
        Self {
            endpoints: [const { Channel::new() }; MAX_SUBSCRIBERS],
            registered: Mutex::new(RefCell::new(0)),
        }
    }

    /// Claims the next endpoint in registration order, or `None` when all
    /// slots are taken.
    pub(crate) fn subscribe(&self) -> Option<Events<'_, T>> {
        self.registered.lock(|registered| {
            let mut registered = registered.borrow_mut();
            let endpoint = self.endpoints.get(*registered)?;
            *registered += 1;
            Some(Events { endpoint })
        })
    }

    /// Delivers `event` to every registered endpoint, in registration order.
    ///
    /// Delivery is non-blocking: a full endpoint silently loses this event
    /// and the remaining endpoints are still attempted.
    pub(crate) fn publish(&self, event: T) {
        let registered = self.registered.lock(|registered| *registered.borrow());
        for endpoint in self.endpoints.iter().take(registered) {
            let _ = endpoint.try_send(event.clone());
        }
    }
}

// ============================================================================
// Events - Subscriber read handle
// ============================================================================

/// Read handle for one subscription, returned by
/// [`ButtonShim::subscribe_to_press`](crate::ButtonShim::subscribe_to_press)
/// and [`ButtonShim::subscribe_to_release`](crate::ButtonShim::subscribe_to_release).
pub struct Events<'a, T> {
    endpoint: &'a Endpoint<T>,
}

impl<T> Events<'_, T> {
    /// Waits for the next event on this subscription.
    pub async fn next(&self) -> T {
        self.endpoint.receive().await
    }

    /// Returns the next buffered event without waiting, if any.
    pub fn try_next(&self) -> Option<T> {
        self.endpoint.try_receive().ok()
    }
}

/// Press notifications. The event carries no payload; use it as a signal.
pub type PressEvents<'a> = Events<'a, ()>;

/// Release notifications carrying the observed held time. Accuracy is
/// bounded by the poll interval.
pub type ReleaseEvents<'a> = Events<'a, Duration>;
