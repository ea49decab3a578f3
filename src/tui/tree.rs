use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::app::ReportView;
use crate::model::Rates;
use crate::tree::{Scope, UiNode};
use crate::tui::{status_icon, truncate};

const RATE_BAR_WIDTH: usize = 10;

pub fn render(f: &mut Frame, area: Rect, view: &ReportView) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner_width = area.width.saturating_sub(1) as usize;

    if view.tree().is_empty() {
        let msg = match view.scope() {
            Scope::All => "Report has no tests",
            Scope::Passed => "No passed tests",
            Scope::Failed => "No failed tests",
            Scope::Skipped => "No skipped tests",
        };
        let para = Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(para, area);
        return;
    }

    let visible_height = area.height as usize;
    let scroll_offset = if view.cursor >= visible_height {
        view.cursor - visible_height + 1
    } else {
        0
    };

    let show_badges = view.config.show_filter_badges;
    let lines: Vec<Line> = view
        .visible_rows()
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height)
        .filter_map(|(row, &(id, depth))| {
            let node = view.tree().get(id)?;
            Some(render_node_line(
                node,
                depth,
                row == view.cursor,
                view.tree().is_selected(id),
                show_badges,
                inner_width,
            ))
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_node_line(
    node: &UiNode,
    depth: usize,
    is_cursor: bool,
    is_selected: bool,
    show_badges: bool,
    max_width: usize,
) -> Line<'static> {
    let indent = "  ".repeat(depth);
    let mut spans = Vec::new();

    let prefix = if node.is_branch() {
        let sign = if node.expanded { "-" } else { "+" };
        spans.push(Span::styled(
            format!("{indent}{sign} "),
            Style::default().fg(Color::DarkGray),
        ));
        format!("{indent}{sign} ")
    } else {
        let (icon, color) = status_icon(node.status);
        spans.push(Span::styled(
            format!("{indent}{icon} "),
            Style::default().fg(color),
        ));
        format!("{indent}{icon} ")
    };

    let badge = if show_badges && node.is_branch() {
        format!(" {}", node.count.total)
    } else {
        String::new()
    };
    let bar_width = if show_badges && node.is_branch() {
        RATE_BAR_WIDTH + 1
    } else {
        0
    };
    let label_max = max_width
        .saturating_sub(UnicodeWidthStr::width(prefix.as_str()) + badge.len() + bar_width);

    let mut label_style = Style::default();
    if is_selected {
        label_style = label_style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
    }
    if is_cursor {
        label_style = label_style.add_modifier(Modifier::REVERSED);
    }
    spans.push(Span::styled(truncate(&node.label, label_max), label_style));

    if !badge.is_empty() {
        spans.push(Span::styled(badge, Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(" "));
        spans.extend(rate_bar(&node.rates, RATE_BAR_WIDTH));
    }

    Line::from(spans)
}

fn rate_bar(rates: &Rates, width: usize) -> Vec<Span<'static>> {
    let (pass, fail, skip) = rate_bar_widths(rates, width);
    vec![
        Span::styled("█".repeat(pass), Style::default().fg(Color::Green)),
        Span::styled("█".repeat(fail), Style::default().fg(Color::Red)),
        Span::styled("█".repeat(skip), Style::default().fg(Color::Yellow)),
        Span::styled(
            "░".repeat(width - pass - fail - skip),
            Style::default().fg(Color::DarkGray),
        ),
    ]
}

/// Split `width` cells by rate. Fail and skip are rounded and pass takes the
/// remainder, with one cell held back for a nonzero pass rate. The three widths
/// never exceed `width`.
fn rate_bar_widths(rates: &Rates, width: usize) -> (usize, usize, usize) {
    if width == 0 || rates.sum() <= 0.0 {
        return (0, 0, 0);
    }
    let cells = |rate: f64| -> usize {
        if rate <= 0.0 {
            0
        } else {
            ((rate * width as f64 / 100.0).round() as usize).max(1)
        }
    };
    let reserve = usize::from(rates.pass > 0.0);
    let fail = cells(rates.fail).min(width - reserve);
    let skip = cells(rates.skip).min(width.saturating_sub(reserve + fail));
    let pass = if rates.pass > 0.0 {
        width - fail - skip
    } else {
        0
    };
    (pass, fail, skip)
}
