//! Price tick sources and their fan-out plumbing.
//!
//! A [`TickSource`] hands out revocable [`Subscription`]s to [`TickObserver`]s
//! and can be paused, resumed and closed. [`PriceStream`] is the simulated
//! source; a live market-data feed implements the same trait.

pub mod clock;
pub mod generator;
pub mod hub;

use std::fmt;

use tokio::sync::mpsc;

use crate::model::tick::Tick;

pub use clock::{Clock, WallClock};
pub use generator::{PriceStream, RandomWalk, StreamOptions};
pub use hub::{SubscriberHub, SubscriptionId};

/// Receives ticks from a source.
///
/// Returning `false` tells the source the observer is gone and may be dropped.
pub trait TickObserver: Send + 'static {
    fn on_tick(&mut self, tick: &Tick) -> bool;
}

impl TickObserver for mpsc::UnboundedSender<Tick> {
    fn on_tick(&mut self, tick: &Tick) -> bool {
        self.send(*tick).is_ok()
    }
}

/// Adapts a closure into a [`TickObserver`].
pub struct FnObserver<F>(pub F);

impl<F> TickObserver for FnObserver<F>
where
    F: FnMut(&Tick) + Send + 'static,
{
    fn on_tick(&mut self, tick: &Tick) -> bool {
        (self.0)(tick);
        true
    }
}

/// Handle for one registered observer.
///
/// `unsubscribe` removes exactly that observer and is a no-op after the first
/// call. Dropping the handle unsubscribes.
pub struct Subscription {
    id: SubscriptionId,
    revoke: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, revoke: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            revoke: Some(Box::new(revoke)),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.revoke.is_some()
    }

    pub fn unsubscribe(&mut self) {
        if let Some(revoke) = self.revoke.take() {
            revoke();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Contract shared by the simulated generator and any live feed.
///
/// - `subscribe` delivers one tick at the latest known price right away, then
///   every cadence tick until unsubscribed.
/// - `pause` suppresses generation and delivery without dropping observers;
///   `resume` continues from the frozen price.
/// - `close` stops the cadence for good and discards every observer. Calling
///   it again does nothing.
pub trait TickSource {
    fn subscribe(&self, observer: Box<dyn TickObserver>) -> Subscription;
    fn pause(&self);
    fn resume(&self);
    fn close(&self);
    fn is_paused(&self) -> bool;
    fn is_closed(&self) -> bool;
}
