#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use ticker_pnl::model::tick::Tick;
use ticker_pnl::stream::{Clock, Subscription, SubscriptionId, TickObserver, TickSource};

#[derive(Default)]
pub struct ManualInner {
    pub observers: BTreeMap<u64, Box<dyn TickObserver>>,
    pub next_id: u64,
    pub subscribes: usize,
    pub unsubscribes: usize,
    pub pauses: usize,
    pub resumes: usize,
    pub closes: usize,
    pub paused: bool,
    pub closed: bool,
}

/// Hand-driven tick source that records every call made to it.
#[derive(Clone, Default)]
pub struct ManualSource {
    pub inner: Arc<Mutex<ManualInner>>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a tick to every observer unless paused or closed.
    pub fn emit(&self, tick: Tick) -> usize {
        let mut inner = self.inner.lock().unwrap();
        if inner.paused || inner.closed {
            return 0;
        }
        let mut delivered = 0;
        for observer in inner.observers.values_mut() {
            if observer.on_tick(&tick) {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().unwrap().observers.len()
    }

    pub fn counts(&self) -> (usize, usize, usize, usize, usize) {
        let inner = self.inner.lock().unwrap();
        (
            inner.subscribes,
            inner.unsubscribes,
            inner.pauses,
            inner.resumes,
            inner.closes,
        )
    }
}

impl TickSource for ManualSource {
    fn subscribe(&self, observer: Box<dyn TickObserver>) -> Subscription {
        let id = {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.subscribes += 1;
            inner.observers.insert(id, observer);
            id
        };
        let inner = self.inner.clone();
        Subscription::new(SubscriptionId(id), move || {
            let mut inner = inner.lock().unwrap();
            inner.unsubscribes += 1;
            inner.observers.remove(&id);
        })
    }

    fn pause(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.pauses += 1;
        inner.paused = true;
    }

    fn resume(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.resumes += 1;
        inner.paused = false;
    }

    fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closes += 1;
        inner.closed = true;
        inner.observers.clear();
    }

    fn is_paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }

    fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

/// Clock that reads tokio's (pausable) time, offset from a fixed epoch.
pub struct TokioClock {
    start: tokio::time::Instant,
    epoch_ms: u64,
}

impl TokioClock {
    pub fn new(epoch_ms: u64) -> Self {
        Self {
            start: tokio::time::Instant::now(),
            epoch_ms,
        }
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> u64 {
        self.epoch_ms + self.start.elapsed().as_millis() as u64
    }
}

/// Clock that runs backwards by one second on every read.
pub struct RewindingClock(pub AtomicU64);

impl Clock for RewindingClock {
    fn now_ms(&self) -> u64 {
        self.0.fetch_sub(1_000, Ordering::SeqCst)
    }
}

pub fn tick(ts: u64, price: f64) -> Tick {
    Tick::new(ts, price)
}
