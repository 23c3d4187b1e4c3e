pub mod card;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::feed::History;
use crate::model::position::Position;
use crate::pnl::CardMetrics;

use card::{PnlCard, PriceTrail};

/// What one frame of the card needs.
pub struct CardView<'a> {
    pub position: &'a Position,
    pub metrics: CardMetrics,
    pub history: &'a History,
}

pub fn render(frame: &mut Frame, view: &CardView) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // card
            Constraint::Min(3),    // trail
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    frame.render_widget(PnlCard::new(view.position, &view.metrics), outer[0]);
    frame.render_widget(PriceTrail::new(view.history), outer[1]);

    let pause_hint = if view.metrics.paused {
        " resume  "
    } else {
        " pause  "
    };
    let keys = Line::from(vec![
        Span::styled("[p]", Style::default().fg(Color::Yellow)),
        Span::raw(pause_hint),
        Span::styled("[n]", Style::default().fg(Color::Yellow)),
        Span::raw(" next symbol  "),
        Span::styled("[q]", Style::default().fg(Color::Yellow)),
        Span::raw(" quit"),
    ]);
    frame.render_widget(Paragraph::new(keys), outer[2]);
}
