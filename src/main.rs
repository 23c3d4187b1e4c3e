use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind};

use ticker_pnl::config::Config;
use ticker_pnl::feed::PriceFeed;
use ticker_pnl::pnl::CardMetrics;
use ticker_pnl::stream::{Clock, PriceStream, WallClock};
use ticker_pnl::ui::{self, CardView};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set TICKER_PNL_CONFIG or create config/default.toml");
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with the TUI
    let log_file = std::fs::File::create("ticker-pnl.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.logging.level.as_str())
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let symbols = config.card.tracked_symbols();
    let mut position = config.card.position();
    tracing::info!(
        symbol = %position.symbol,
        side = %position.side,
        entry_price = position.entry_price,
        size = position.size,
        "Starting ticker-pnl"
    );

    let stream_options = config.feed.stream_options();
    let mut feed = PriceFeed::with_history_len(
        &position.symbol,
        config.feed.history_len,
        move |_symbol: &str| PriceStream::spawn(stream_options.clone()),
    );
    let clock = WallClock;
    let mut symbol_index = 0usize;

    let mut terminal = ratatui::init();
    let outcome: Result<()> = loop {
        feed.pump();
        let metrics = CardMetrics::derive(&position, feed.state(), clock.now_ms());
        let view = CardView {
            position: &position,
            metrics,
            history: &feed.state().history,
        };
        if let Err(e) = terminal.draw(|frame| ui::render(frame, &view)) {
            break Err(e.into());
        }

        let polled = tokio::task::block_in_place(|| {
            crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))
        });
        match polled {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => break Err(e.into()),
        }
        let event = match crossterm::event::read() {
            Ok(ev) => ev,
            Err(e) => break Err(e.into()),
        };
        let Event::Key(key) = event else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                tracing::info!("User quit");
                break Ok(());
            }
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => {
                feed.toggle_pause();
            }
            KeyCode::Char('n') | KeyCode::Char('N') if symbols.len() > 1 => {
                symbol_index = (symbol_index + 1) % symbols.len();
                let next = &symbols[symbol_index];
                if feed.set_symbol(next) {
                    position.symbol = next.clone();
                }
            }
            _ => {}
        }
    };
    ratatui::restore();

    drop(feed);
    tracing::info!("Shutdown complete");
    outcome
}
