use super::history::DEFAULT_HISTORY_LEN;
use super::session::{FeedSession, FeedState};
use crate::stream::TickSource;

/// Keeps exactly one live session, replacing it whenever the symbol changes.
///
/// `factory` builds a fresh source for a symbol.
pub struct PriceFeed<S, F>
where
    S: TickSource,
    F: FnMut(&str) -> S,
{
    factory: F,
    history_len: usize,
    session: FeedSession<S>,
}

impl<S, F> PriceFeed<S, F>
where
    S: TickSource,
    F: FnMut(&str) -> S,
{
    pub fn new(symbol: &str, factory: F) -> Self {
        Self::with_history_len(symbol, DEFAULT_HISTORY_LEN, factory)
    }

    pub fn with_history_len(symbol: &str, history_len: usize, mut factory: F) -> Self {
        let session = FeedSession::start(symbol, factory(symbol), history_len);
        Self {
            factory,
            history_len,
            session,
        }
    }

    pub fn symbol(&self) -> &str {
        self.session.symbol()
    }

    pub fn session(&self) -> &FeedSession<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut FeedSession<S> {
        &mut self.session
    }

    pub fn state(&self) -> &FeedState {
        self.session.state()
    }

    pub fn pump(&mut self) -> usize {
        self.session.pump()
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.session.toggle_pause()
    }

    /// Switch to `symbol`. The old session is torn down before the new source
    /// starts; the new one begins unpaused with empty history. Returns false
    /// when the symbol is unchanged.
    pub fn set_symbol(&mut self, symbol: &str) -> bool {
        if symbol == self.session.symbol() {
            return false;
        }
        tracing::info!(from = %self.session.symbol(), to = %symbol, "switching feed symbol");
        self.session.teardown();
        let fresh = FeedSession::start(symbol, (self.factory)(symbol), self.history_len);
        drop(std::mem::replace(&mut self.session, fresh));
        true
    }
}
