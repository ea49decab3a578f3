use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::ReportView;
use crate::tree::Scope;

pub fn render(f: &mut Frame, area: Rect, view: &ReportView) {
    let badges = view.badges();
    let mut spans = vec![
        Span::styled(
            format!(
                " trv v{}+{} ",
                env!("CARGO_PKG_VERSION"),
                env!("BUILD_NUMBER")
            ),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            view.suite().name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} tests ", badges.total),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("✓{} ", badges.passed),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("✗{} ", badges.failed),
            Style::default().fg(Color::Red),
        ),
        Span::styled(
            format!("⊘{}", badges.skipped),
            Style::default().fg(Color::Yellow),
        ),
    ];

    if view.scope() != Scope::All {
        spans.push(Span::styled(
            format!(" [{}]", view.scope().as_str()),
            Style::default().fg(Color::Magenta),
        ));
    }

    if view.error_message().is_some() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(header, area);
}
