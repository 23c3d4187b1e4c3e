use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ticker_pnl::config::Config;
use ticker_pnl::error::AppError;
use ticker_pnl::model::position::Side;

const FULL: &str = r#"
[card]
symbol = "btc-perp"
symbols = ["ETH-PERP", "BTC-PERP"]
side = "short"
entry_price = 67250.0
size = 100.0

[feed]
start_price = 67000.0
cadence_ms = 350
max_step = 15.0
price_floor = 100.0
history_len = 241
seed = 42

[ui]
refresh_rate_ms = 100

[logging]
level = "debug"
"#;

#[test]
fn parse_full_toml() {
    let config = Config::from_toml_str(FULL).unwrap();
    assert_eq!(config.card.side, Side::Short);
    assert!((config.card.entry_price - 67_250.0).abs() < f64::EPSILON);
    assert_eq!(config.feed.history_len, 241);
    assert_eq!(config.ui.refresh_rate_ms, 100);
    assert_eq!(config.logging.level, "debug");

    let position = config.card.position();
    assert_eq!(position.symbol, "BTC-PERP");
    assert!((position.size - 100.0).abs() < f64::EPSILON);

    let options = config.feed.stream_options();
    assert_eq!(options.cadence, Duration::from_millis(350));
    assert_eq!(options.seed, Some(42));

    assert_eq!(
        config.card.tracked_symbols(),
        vec!["BTC-PERP".to_string(), "ETH-PERP".to_string()]
    );
}

#[test]
fn rejects_non_positive_entry_price() {
    let toml_str = FULL.replace("entry_price = 67250.0", "entry_price = 0.0");
    assert!(matches!(
        Config::from_toml_str(&toml_str),
        Err(AppError::Config(_))
    ));
}

#[test]
fn rejects_negative_size() {
    let toml_str = FULL.replace("size = 100.0", "size = -1.0");
    assert!(matches!(
        Config::from_toml_str(&toml_str),
        Err(AppError::Config(_))
    ));
}

#[test]
fn rejects_unknown_side() {
    let toml_str = FULL.replace("side = \"short\"", "side = \"flat\"");
    assert!(matches!(
        Config::from_toml_str(&toml_str),
        Err(AppError::Toml(_))
    ));
}

#[test]
fn load_from_path_reads_file() {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("ticker-pnl-config-{}.toml", ts));
    std::fs::write(&path, FULL).expect("write temp config");

    let config = Config::load_from_path(&path).expect("config should load");
    assert_eq!(config.card.symbol, "btc-perp");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn load_from_missing_path_fails_with_context() {
    let path = std::env::temp_dir().join("ticker-pnl-definitely-missing.toml");
    let err = Config::load_from_path(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("failed to read"));
}

#[test]
fn bundled_default_config_is_valid() {
    let config = Config::load_from_path(std::path::Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/config/default.toml"
    )))
    .expect("bundled config should load");
    assert_eq!(config.card.position().symbol, "BTC-PERP");
}
