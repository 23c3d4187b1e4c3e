//! Simulated price stream.
//!
//! A tokio task owns the random-walk price and the cadence timer. Subscribe
//! and unsubscribe reach it over a command channel; pause and close are
//! `watch` flags. The observer hub sits behind a mutex shared with the
//! handle: a fan-out holds the lock for its whole duration and `close` takes
//! it to set the closed flag and clear the observers. Once `close` returns no
//! delivery is in flight and none can start.
//!
//! Observers must not call `close` from inside `on_tick`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::clock::{Clock, WallClock};
use super::hub::{SubscriberHub, SubscriptionId};
use super::{Subscription, TickObserver, TickSource};
use crate::model::tick::Tick;

pub const DEFAULT_START_PRICE: f64 = 67_000.0;
pub const DEFAULT_CADENCE_MS: u64 = 350;
pub const DEFAULT_MAX_STEP: f64 = 15.0;
pub const DEFAULT_PRICE_FLOOR: f64 = 100.0;
const MIN_QUOTE: f64 = 0.01;

/// Finite, non-negative and no larger than `reference`, so the sampling
/// range can never overflow.
fn sanitize_step(max_step: f64, reference: f64) -> f64 {
    if !max_step.is_finite() {
        return DEFAULT_MAX_STEP;
    }
    let cap = if reference.is_finite() && reference > 0.0 {
        reference
    } else {
        DEFAULT_START_PRICE
    };
    let step = max_step.abs();
    if step > cap {
        tracing::warn!(max_step, cap, "max step larger than start price, clamping");
        cap
    } else {
        step
    }
}

pub fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamOptions {
    pub start_price: f64,
    pub cadence: Duration,
    /// Largest absolute change applied per cadence step.
    pub max_step: f64,
    pub price_floor: f64,
    /// Fixed RNG seed for reproducible walks. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            start_price: DEFAULT_START_PRICE,
            cadence: Duration::from_millis(DEFAULT_CADENCE_MS),
            max_step: DEFAULT_MAX_STEP,
            price_floor: DEFAULT_PRICE_FLOOR,
            seed: None,
        }
    }
}

impl StreamOptions {
    pub fn with_start(start_price: f64) -> Self {
        Self {
            start_price,
            ..Self::default()
        }
    }

    /// Replace unusable values with defaults instead of failing.
    pub fn normalized(mut self) -> Self {
        if !(self.start_price.is_finite() && self.start_price > 0.0) {
            tracing::warn!(
                start_price = self.start_price,
                fallback = DEFAULT_START_PRICE,
                "non-positive start price, using default"
            );
            self.start_price = DEFAULT_START_PRICE;
        }
        if !(self.price_floor.is_finite() && self.price_floor > 0.0) {
            self.price_floor = DEFAULT_PRICE_FLOOR;
        }
        self.max_step = sanitize_step(self.max_step, self.start_price);
        if self.cadence.is_zero() {
            self.cadence = Duration::from_millis(DEFAULT_CADENCE_MS);
        }
        self
    }
}

/// Bounded symmetric random walk clamped to a positive floor.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    price: f64,
    max_step: f64,
    floor: f64,
    rng: StdRng,
}

impl RandomWalk {
    pub fn new(start_price: f64, max_step: f64, floor: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            price: start_price,
            max_step: sanitize_step(max_step, start_price),
            floor,
            rng,
        }
    }

    pub fn from_options(options: &StreamOptions) -> Self {
        Self::new(
            options.start_price,
            options.max_step,
            options.price_floor,
            options.seed,
        )
    }

    /// Unrounded internal price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Current price as published in ticks.
    pub fn quote(&self) -> f64 {
        round_cents(self.price).max(MIN_QUOTE)
    }

    pub fn step(&mut self) -> f64 {
        let drift = if self.max_step > 0.0 {
            self.rng.gen_range(-self.max_step..=self.max_step)
        } else {
            0.0
        };
        self.price = (self.price + drift).max(self.floor);
        self.quote()
    }
}

enum Command {
    Subscribe {
        id: SubscriptionId,
        observer: Box<dyn TickObserver>,
    },
    Unsubscribe(SubscriptionId),
}

fn lock_hub(hub: &Mutex<SubscriberHub>) -> MutexGuard<'_, SubscriberHub> {
    // the hub is a plain map; a panicking observer leaves it consistent
    hub.lock().unwrap_or_else(PoisonError::into_inner)
}

struct StreamEngine {
    walk: RandomWalk,
    hub: Arc<Mutex<SubscriberHub>>,
    clock: Arc<dyn Clock>,
    last_timestamp_ms: u64,
}

impl StreamEngine {
    /// Timestamps never go backwards even if the wall clock does.
    fn stamp(&mut self, price: f64) -> Tick {
        let ts = self.clock.now_ms().max(self.last_timestamp_ms);
        self.last_timestamp_ms = ts;
        Tick::new(ts, price)
    }

    fn attach(
        &mut self,
        id: SubscriptionId,
        observer: Box<dyn TickObserver>,
        closed: &watch::Receiver<bool>,
    ) {
        let tick = self.stamp(self.walk.quote());
        let mut hub = lock_hub(&self.hub);
        if *closed.borrow() {
            return;
        }
        hub.insert(id, observer);
        hub.deliver_to(id, &tick);
        tracing::debug!(
            subscription = id.0,
            observers = hub.len(),
            price = tick.price,
            "observer subscribed"
        );
    }

    fn detach(&mut self, id: SubscriptionId) {
        let mut hub = lock_hub(&self.hub);
        if hub.remove(id) {
            tracing::debug!(
                subscription = id.0,
                observers = hub.len(),
                "observer unsubscribed"
            );
        }
    }

    fn advance(&mut self, closed: &watch::Receiver<bool>) {
        let price = self.walk.step();
        let tick = self.stamp(price);
        let mut hub = lock_hub(&self.hub);
        let delivered = hub.broadcast(&tick, || *closed.borrow());
        tracing::trace!(price = tick.price, ts = tick.timestamp_ms, delivered, "tick");
    }
}

async fn run(
    mut engine: StreamEngine,
    mut commands: mpsc::UnboundedReceiver<Command>,
    paused: watch::Receiver<bool>,
    mut closed: watch::Receiver<bool>,
    cadence: Duration,
) {
    let mut ticker = time::interval_at(time::Instant::now() + cadence, cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if *closed.borrow() {
            break;
        }
        tokio::select! {
            biased;
            changed = closed.changed() => {
                if changed.is_err() || *closed.borrow() {
                    break;
                }
            }
            command = commands.recv() => match command {
                Some(Command::Subscribe { id, observer }) => engine.attach(id, observer, &closed),
                Some(Command::Unsubscribe(id)) => engine.detach(id),
                None => break,
            },
            _ = ticker.tick() => {
                if *paused.borrow() {
                    continue;
                }
                engine.advance(&closed);
            }
        }
    }

    lock_hub(&engine.hub).clear();
    tracing::debug!("price stream task exited");
}

/// Simulated [`TickSource`] emitting a random walk on a fixed cadence.
///
/// Must be created inside a tokio runtime. Dropping the stream closes it.
pub struct PriceStream {
    commands: mpsc::UnboundedSender<Command>,
    hub: Arc<Mutex<SubscriberHub>>,
    paused: watch::Sender<bool>,
    closed: watch::Sender<bool>,
    next_id: AtomicU64,
    task: JoinHandle<()>,
}

impl PriceStream {
    pub fn spawn(options: StreamOptions) -> Self {
        Self::spawn_with_clock(options, Arc::new(WallClock))
    }

    pub fn spawn_with_clock(options: StreamOptions, clock: Arc<dyn Clock>) -> Self {
        let options = options.normalized();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (paused, paused_rx) = watch::channel(false);
        let (closed, closed_rx) = watch::channel(false);

        let hub = Arc::new(Mutex::new(SubscriberHub::new()));
        let engine = StreamEngine {
            walk: RandomWalk::from_options(&options),
            hub: hub.clone(),
            clock,
            last_timestamp_ms: 0,
        };

        tracing::info!(
            start_price = options.start_price,
            cadence_ms = options.cadence.as_millis() as u64,
            max_step = options.max_step,
            "price stream started"
        );
        let task = tokio::spawn(run(engine, command_rx, paused_rx, closed_rx, options.cadence));

        Self {
            commands,
            hub,
            paused,
            closed,
            next_id: AtomicU64::new(1),
            task,
        }
    }
}

impl TickSource for PriceStream {
    fn subscribe(&self, observer: Box<dyn TickObserver>) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if self
            .commands
            .send(Command::Subscribe { id, observer })
            .is_err()
        {
            tracing::debug!(subscription = id.0, "subscribe on closed stream ignored");
        }
        let commands = self.commands.clone();
        Subscription::new(id, move || {
            let _ = commands.send(Command::Unsubscribe(id));
        })
    }

    fn pause(&self) {
        if !self.paused.send_replace(true) {
            tracing::info!("price stream paused");
        }
    }

    fn resume(&self) {
        if self.paused.send_replace(false) {
            tracing::info!("price stream resumed");
        }
    }

    fn close(&self) {
        {
            // waits out any fan-out in progress
            let mut hub = lock_hub(&self.hub);
            if self.closed.send_replace(true) {
                return;
            }
            hub.clear();
        }
        self.task.abort();
        tracing::info!("price stream closed");
    }

    fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

impl Drop for PriceStream {
    fn drop(&mut self) {
        self.close();
    }
}
