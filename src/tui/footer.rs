use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{ReportView, NARROW_WIDTH_THRESHOLD};

pub fn render(f: &mut Frame, area: Rect, view: &ReportView) {
    let narrow = area.width < NARROW_WIDTH_THRESHOLD;
    let has_shots = view
        .detail()
        .is_some_and(|d| !d.screenshots().is_empty());

    let mut hints: Vec<(&str, &str)> = if narrow {
        vec![
            ("j/k", "nav"),
            ("⏎", "show"),
            ("spc", "fold"),
            ("f", "filter"),
            ("q", "quit"),
        ]
    } else {
        vec![
            ("↑↓/jk", "navigate"),
            ("Enter", "details"),
            ("Space", "toggle"),
            ("E/C", "expand/collapse all"),
            ("f/a/p/x/s", "filter"),
            ("J/K", "scroll"),
            ("q", "quit"),
        ]
    };
    if has_shots {
        hints.insert(hints.len() - 1, ("1-9", "screenshot"));
    }

    let mut spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {desc}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}
