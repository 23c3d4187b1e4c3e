use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline, Widget},
};

use crate::feed::History;
use crate::model::position::{Position, Side};
use crate::pnl::CardMetrics;

/// `$67,012.35` style formatting with thousands separators.
pub fn format_usd(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

fn signed_pct(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

pub struct PnlCard<'a> {
    position: &'a Position,
    metrics: &'a CardMetrics,
}

impl<'a> PnlCard<'a> {
    pub fn new(position: &'a Position, metrics: &'a CardMetrics) -> Self {
        Self { position, metrics }
    }
}

impl Widget for PnlCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let m = self.metrics;
        let pnl_color = if m.is_profitable() {
            Color::Green
        } else {
            Color::Red
        };
        let side_color = match self.position.side {
            Side::Long => Color::Green,
            Side::Short => Color::Red,
        };
        let label = Style::default().fg(Color::DarkGray);

        let price_str = m
            .price
            .map(format_usd)
            .unwrap_or_else(|| "Loading...".to_string());
        let one_min_str = m
            .one_minute_change_percent
            .map(signed_pct)
            .unwrap_or_else(|| "---".to_string());

        let mut pnl_spans = vec![
            Span::styled("PnL:   ", label),
            Span::styled(
                signed_pct(m.pnl_percent),
                Style::default().fg(pnl_color).add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(dollars) = m.pnl_dollar {
            let sign = if dollars > 0.0 { "+" } else { "" };
            pnl_spans.push(Span::styled(
                format!(" ({}{})", sign, format_usd(dollars)),
                Style::default().fg(pnl_color),
            ));
        }

        let status = if m.paused {
            Span::styled("PAUSED", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("LIVE", Style::default().fg(Color::Green))
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Price: ", label),
                Span::styled(
                    price_str,
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Side:  ", label),
                Span::styled(
                    self.position.side.to_string(),
                    Style::default().fg(side_color),
                ),
                Span::styled("  Entry: ", label),
                Span::styled(
                    format_usd(self.position.entry_price),
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(vec![
                Span::styled("1-min: ", label),
                Span::styled(one_min_str, Style::default().fg(Color::White)),
            ]),
            Line::from(pnl_spans),
            Line::from(vec![Span::styled("Feed:  ", label), status]),
        ];

        let block = Block::default()
            .title(format!(" {} ", self.position.symbol))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(pnl_color));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

/// Recent price path, scaled to cents above the window minimum.
pub struct PriceTrail<'a> {
    history: &'a History,
}

impl<'a> PriceTrail<'a> {
    pub fn new(history: &'a History) -> Self {
        Self { history }
    }
}

impl Widget for PriceTrail<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let min = self
            .history
            .iter()
            .map(|t| t.price)
            .fold(f64::INFINITY, f64::min);
        let points: Vec<u64> = self
            .history
            .iter()
            .map(|t| ((t.price - min) * 100.0).round().max(0.0) as u64 + 1)
            .collect();
        let skip = points.len().saturating_sub(area.width.saturating_sub(2) as usize);

        Sparkline::default()
            .block(
                Block::default()
                    .title(" Trail ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .data(&points[skip..])
            .style(Style::default().fg(Color::Cyan))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_formatting_groups_thousands() {
        assert_eq!(format_usd(67_250.0), "$67,250.00");
        assert_eq!(format_usd(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_usd(3.3457), "$3.35");
        assert_eq!(format_usd(-3.3457), "-$3.35");
        assert_eq!(format_usd(0.0), "$0.00");
    }

    #[test]
    fn signed_pct_prefixes_gains() {
        assert_eq!(signed_pct(3.3457), "+3.35%");
        assert_eq!(signed_pct(-1.0), "-1.00%");
        assert_eq!(signed_pct(0.0), "0.00%");
    }
}
