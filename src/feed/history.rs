use std::collections::VecDeque;

use crate::model::tick::Tick;

/// Matches a 60 s window at the default cadence with room to spare.
pub const DEFAULT_HISTORY_LEN: usize = 241;
pub const ONE_MINUTE_MS: u64 = 60_000;

/// Rolling tick buffer in arrival order, bounded FIFO.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    ticks: VecDeque<Tick>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ticks: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a tick, returning the oldest one if it was evicted.
    pub fn push(&mut self, tick: Tick) -> Option<Tick> {
        self.ticks.push_back(tick);
        if self.ticks.len() > self.capacity {
            self.ticks.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Tick> {
        self.ticks.back()
    }

    pub fn oldest(&self) -> Option<&Tick> {
        self.ticks.front()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Tick> + ExactSizeIterator {
        self.ticks.iter()
    }

    pub fn to_vec(&self) -> Vec<Tick> {
        self.ticks.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
    }

    /// Newest tick that is at least one minute old at `now_ms`.
    ///
    /// Not the tick nearest to exactly 60 s: a 59 s old tick never qualifies,
    /// and among qualifying ticks the most recent wins.
    pub fn one_minute_ago(&self, now_ms: u64) -> Option<&Tick> {
        self.ticks
            .iter()
            .rev()
            .find(|tick| tick.age_ms(now_ms) >= ONE_MINUTE_MS)
    }
}

pub fn one_minute_ago_price(history: &History, now_ms: u64) -> Option<f64> {
    history.one_minute_ago(now_ms).map(|tick| tick.price)
}
