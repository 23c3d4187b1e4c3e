use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::AppError;
use crate::feed::DEFAULT_HISTORY_LEN;
use crate::model::position::{Position, Side};
use crate::stream::generator::{
    DEFAULT_CADENCE_MS, DEFAULT_MAX_STEP, DEFAULT_PRICE_FLOOR, DEFAULT_START_PRICE,
};
use crate::stream::StreamOptions;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub card: CardConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardConfig {
    pub symbol: String,
    /// Extra symbols the card can cycle through.
    #[serde(default)]
    pub symbols: Vec<String>,
    pub side: Side,
    pub entry_price: f64,
    #[serde(default)]
    pub size: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub start_price: f64,
    pub cadence_ms: u64,
    pub max_step: f64,
    pub price_floor: f64,
    pub history_len: usize,
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            start_price: DEFAULT_START_PRICE,
            cadence_ms: DEFAULT_CADENCE_MS,
            max_step: DEFAULT_MAX_STEP,
            price_floor: DEFAULT_PRICE_FLOOR,
            history_len: DEFAULT_HISTORY_LEN,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CardConfig {
    pub fn position(&self) -> Position {
        Position::new(
            self.symbol.trim().to_ascii_uppercase(),
            self.side,
            self.entry_price,
            self.size,
        )
    }

    /// Primary symbol first, then the extras, uppercased and deduplicated.
    pub fn tracked_symbols(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.symbol.trim().is_empty() {
            out.push(self.symbol.trim().to_ascii_uppercase());
        }
        for sym in &self.symbols {
            let s = sym.trim().to_ascii_uppercase();
            if !s.is_empty() && !out.iter().any(|v| v == &s) {
                out.push(s);
            }
        }
        out
    }
}

impl FeedConfig {
    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            start_price: self.start_price,
            cadence: Duration::from_millis(self.cadence_ms),
            max_step: self.max_step,
            price_floor: self.price_floor,
            seed: self.seed,
        }
    }
}

impl Config {
    /// Load from `TICKER_PNL_CONFIG` or `config/default.toml`, after `.env`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var("TICKER_PNL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(AppError::from)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, AppError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.card.symbol.trim().is_empty() {
            return Err(AppError::Config("card.symbol must not be empty".to_string()));
        }
        if !(self.card.entry_price.is_finite() && self.card.entry_price > 0.0) {
            return Err(AppError::Config(format!(
                "card.entry_price must be positive, got {}",
                self.card.entry_price
            )));
        }
        if !(self.card.size.is_finite() && self.card.size >= 0.0) {
            return Err(AppError::Config(format!(
                "card.size must be non-negative, got {}",
                self.card.size
            )));
        }
        if self.feed.history_len == 0 {
            return Err(AppError::Config("feed.history_len must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_symbols_dedup_and_include_primary() {
        let card = CardConfig {
            symbol: "btc-perp".to_string(),
            symbols: vec![
                "ETH-PERP".to_string(),
                "BTC-PERP".to_string(),
                "  ".to_string(),
            ],
            side: Side::Long,
            entry_price: 1.0,
            size: 0.0,
        };
        assert_eq!(
            card.tracked_symbols(),
            vec!["BTC-PERP".to_string(), "ETH-PERP".to_string()]
        );
    }

    #[test]
    fn feed_section_defaults_when_missing() {
        let config = Config::from_toml_str(
            r#"
[card]
symbol = "BTC-PERP"
side = "long"
entry_price = 100.0
"#,
        )
        .unwrap();
        assert_eq!(config.feed.history_len, DEFAULT_HISTORY_LEN);
        assert_eq!(config.feed.cadence_ms, DEFAULT_CADENCE_MS);
        assert_eq!(config.card.size, 0.0);
        assert_eq!(config.logging.level, "info");
    }
}
