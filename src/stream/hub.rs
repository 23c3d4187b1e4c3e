use std::collections::BTreeMap;

use crate::model::tick::Tick;

use super::TickObserver;

/// Identity of one registration. Ids are handed out in increasing order, so
/// map order is registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Fan-out registry of observers.
#[derive(Default)]
pub struct SubscriberHub {
    observers: BTreeMap<SubscriptionId, Box<dyn TickObserver>>,
}

impl SubscriberHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SubscriptionId, observer: Box<dyn TickObserver>) {
        self.observers.insert(id, observer);
    }

    /// Returns false when `id` was not registered (already removed).
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.observers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    /// Deliver `tick` to one observer. Drops it if it reports itself gone.
    pub fn deliver_to(&mut self, id: SubscriptionId, tick: &Tick) -> bool {
        let Some(observer) = self.observers.get_mut(&id) else {
            return false;
        };
        if observer.on_tick(tick) {
            true
        } else {
            self.observers.remove(&id);
            false
        }
    }

    /// Deliver `tick` to every observer in registration order.
    ///
    /// `halted` is checked before each delivery; once it reports true nothing
    /// further is delivered. Returns how many observers received the tick.
    pub fn broadcast(&mut self, tick: &Tick, halted: impl Fn() -> bool) -> usize {
        let mut delivered = 0;
        let mut gone = Vec::new();
        for (id, observer) in self.observers.iter_mut() {
            if halted() {
                break;
            }
            if observer.on_tick(tick) {
                delivered += 1;
            } else {
                gone.push(*id);
            }
        }
        for id in gone {
            tracing::debug!(subscription = id.0, "dropping disconnected observer");
            self.observers.remove(&id);
        }
        delivered
    }
}
