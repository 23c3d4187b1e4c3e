use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl FromStr for Side {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Side::Long),
            "short" => Ok(Side::Short),
            other => Err(AppError::InvalidSide(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// The position a card tracks. Fixed for the lifetime of a display session.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    /// Notional size in dollars. Zero means dollar PnL is not shown.
    pub size: f64,
}

impl Position {
    pub fn new(symbol: impl Into<String>, side: Side, entry_price: f64, size: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            entry_price,
            size,
        }
    }

    pub fn dollar_pnl_applicable(&self) -> bool {
        self.size > 0.0
    }
}
