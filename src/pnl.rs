//! PnL arithmetic and the derived metrics a card displays.

use crate::feed::{one_minute_ago_price, FeedState};
use crate::model::position::{Position, Side};

/// Percentage PnL of a position entered at `entry` marked at `current`.
///
/// A zero (or NaN) entry or current price yields 0 rather than an error.
pub fn pnl_percent(side: Side, entry: f64, current: f64) -> f64 {
    if entry == 0.0 || current == 0.0 || entry.is_nan() || current.is_nan() {
        return 0.0;
    }
    let base = ((current - entry) / entry) * 100.0;
    match side {
        Side::Long => base,
        Side::Short => -base,
    }
}

/// Dollar PnL for a notional `size`. Callers decide whether a zero size means
/// "not applicable"; this always returns the arithmetic result.
pub fn pnl_dollar(pct: f64, size: f64) -> f64 {
    (pct / 100.0) * size
}

pub fn one_minute_change_percent(current: f64, reference: f64) -> f64 {
    ((current - reference) / reference) * 100.0
}

/// Display-ready numbers for one position at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardMetrics {
    pub price: Option<f64>,
    pub paused: bool,
    pub pnl_percent: f64,
    pub pnl_dollar: Option<f64>,
    pub one_minute_change_percent: Option<f64>,
}

impl CardMetrics {
    pub fn derive(position: &Position, state: &FeedState, now_ms: u64) -> Self {
        let price = state.latest_price;
        let pct = price
            .map(|current| pnl_percent(position.side, position.entry_price, current))
            .unwrap_or(0.0);
        let dollars = position
            .dollar_pnl_applicable()
            .then(|| pnl_dollar(pct, position.size));
        let one_minute = match price {
            Some(current) if state.history.len() >= 2 => {
                one_minute_ago_price(&state.history, now_ms)
                    .map(|reference| one_minute_change_percent(current, reference))
            }
            _ => None,
        };

        Self {
            price,
            paused: state.paused,
            pnl_percent: pct,
            pnl_dollar: dollars,
            one_minute_change_percent: one_minute,
        }
    }

    /// Zero counts as profitable for colouring.
    pub fn is_profitable(&self) -> bool {
        self.pnl_percent >= 0.0
    }
}
