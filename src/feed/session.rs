use tokio::sync::mpsc;

use super::history::History;
use crate::model::tick::Tick;
use crate::stream::{Subscription, TickSource};

/// Everything a card needs from the feed. Only the owning session mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub latest_price: Option<f64>,
    pub paused: bool,
    pub history: History,
}

impl FeedState {
    pub fn new(history_len: usize) -> Self {
        Self {
            latest_price: None,
            paused: false,
            history: History::new(history_len),
        }
    }

    pub fn apply(&mut self, tick: Tick) {
        self.latest_price = Some(tick.price);
        self.history.push(tick);
    }
}

/// One display session over one tick source.
///
/// Starting the session subscribes; ending or dropping it unsubscribes and
/// closes the source, once.
pub struct FeedSession<S: TickSource> {
    symbol: String,
    source: S,
    subscription: Subscription,
    ticks: mpsc::UnboundedReceiver<Tick>,
    state: FeedState,
    ended: bool,
}

impl<S: TickSource> FeedSession<S> {
    pub fn start(symbol: impl Into<String>, source: S, history_len: usize) -> Self {
        let symbol = symbol.into();
        let (tx, ticks) = mpsc::unbounded_channel();
        let subscription = source.subscribe(Box::new(tx));
        tracing::info!(
            symbol = %symbol,
            subscription = subscription.id().0,
            history_len,
            "feed session started"
        );
        Self {
            symbol,
            source,
            subscription,
            ticks,
            state: FeedState::new(history_len),
            ended: false,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// Owned copy of the current state for a consumer that outlives the borrow.
    pub fn snapshot(&self) -> FeedState {
        self.state.clone()
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.state.latest_price
    }

    pub fn history(&self) -> &History {
        &self.state.history
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Apply every tick delivered so far without waiting. Returns how many.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(tick) = self.ticks.try_recv() {
            self.state.apply(tick);
            applied += 1;
        }
        applied
    }

    /// Wait for the next delivered tick and apply it. `None` once the source
    /// has closed and everything delivered has been consumed.
    pub async fn next_tick(&mut self) -> Option<Tick> {
        let tick = self.ticks.recv().await?;
        self.state.apply(tick);
        Some(tick)
    }

    /// Flip between paused and active. Returns the new paused flag.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.paused = !self.state.paused;
        if self.state.paused {
            self.source.pause();
        } else {
            self.source.resume();
        }
        tracing::info!(symbol = %self.symbol, paused = self.state.paused, "feed pause toggled");
        self.state.paused
    }

    pub fn end(mut self) {
        self.teardown();
    }

    pub(crate) fn teardown(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.subscription.unsubscribe();
        self.source.close();
        tracing::info!(symbol = %self.symbol, "feed session ended");
    }
}

impl<S: TickSource> Drop for FeedSession<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
