/// One timestamped price observation. Never mutated after emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub timestamp_ms: u64,
    pub price: f64,
}

impl Tick {
    pub fn new(timestamp_ms: u64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }

    /// Age of this tick relative to `now_ms`. Ticks stamped in the future are age 0.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_saturates_for_future_ticks() {
        let tick = Tick::new(10_000, 100.0);
        assert_eq!(tick.age_ms(70_000), 60_000);
        assert_eq!(tick.age_ms(5_000), 0);
    }
}
