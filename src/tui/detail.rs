use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::app::ReportView;
use crate::detail::{DetailPanel, Field, FieldValue};
use crate::tui::{status_icon, truncate};

pub fn render(f: &mut Frame, area: Rect, view: &ReportView) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::NONE)
        .title_style(Style::default().fg(Color::Cyan));

    let Some(panel) = view.detail() else {
        let hint = if view.tree().is_empty() {
            ""
        } else {
            " Press Enter on a row to show its details"
        };
        let para = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(para, area);
        return;
    };

    let lines = panel_lines(panel, area.width.saturating_sub(1) as usize);
    let max_scroll = lines.len().saturating_sub(1);
    let scroll = view.detail_scroll.min(max_scroll).min(u16::MAX as usize) as u16;
    let para = Paragraph::new(lines).block(block).scroll((scroll, 0));
    f.render_widget(para, area);
}

/// Lay the panel out as plain rows: header, fields, then one section per fixture.
pub fn panel_lines(panel: &DetailPanel, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (icon, color) = status_icon(panel.status);
    let mut header = vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(
            truncate(&panel.header, width.saturating_sub(4)),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(count) = panel.badges {
        header.push(Span::styled(
            format!("  {} ", count.total),
            Style::default().fg(Color::White),
        ));
        header.push(Span::styled(
            format!("✓{} ", count.passed),
            Style::default().fg(Color::Green),
        ));
        header.push(Span::styled(
            format!("✗{} ", count.failed),
            Style::default().fg(Color::Red),
        ));
        header.push(Span::styled(
            format!("⊘{}", count.skipped),
            Style::default().fg(Color::Yellow),
        ));
    }
    lines.push(Line::from(header));

    push_fields(&mut lines, &panel.fields, widest_label(&panel.fields), width);

    for fixture in &panel.fixtures {
        lines.push(Line::raw(""));
        let (icon, color) = status_icon(fixture.status);
        lines.push(Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(color)),
            Span::styled(
                fixture.heading.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]));
        push_fields(&mut lines, &fixture.fields, widest_label(&fixture.fields), width);
    }

    lines
}

fn widest_label(fields: &[Field]) -> usize {
    fields
        .iter()
        .map(|f| UnicodeWidthStr::width(f.label))
        .max()
        .unwrap_or(0)
}

fn push_fields(
    lines: &mut Vec<Line<'static>>,
    fields: &[Field],
    label_width: usize,
    width: usize,
) {
    let label_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let value_max = width.saturating_sub(label_width + 3);
    let blank = " ".repeat(label_width + 3);

    for field in fields {
        let label = Span::styled(format!(" {:>label_width$}  ", field.label), label_style);
        match &field.value {
            FieldValue::Text(text) => {
                // Multi-line values (stack traces) continue under the value column
                for (i, part) in text.lines().enumerate() {
                    let lead = if i == 0 {
                        label.clone()
                    } else {
                        Span::raw(blank.clone())
                    };
                    lines.push(Line::from(vec![lead, Span::raw(truncate(part, value_max))]));
                }
                if text.is_empty() {
                    lines.push(Line::from(vec![label]));
                }
            }
            FieldValue::Tags(tags) => {
                let mut spans = vec![label];
                for tag in tags {
                    spans.push(Span::styled(
                        format!("[{tag}]"),
                        Style::default().fg(Color::Black).bg(Color::Blue),
                    ));
                    spans.push(Span::raw(" "));
                }
                lines.push(Line::from(spans));
            }
            FieldValue::Logs(logs) => {
                if logs.is_empty() {
                    lines.push(Line::from(vec![label.clone()]));
                }
                for (i, entry) in logs.iter().enumerate() {
                    let lead = if i == 0 {
                        label.clone()
                    } else {
                        Span::raw(blank.clone())
                    };
                    let level = format!("[{}] ", entry.level);
                    let message_max = value_max.saturating_sub(level.len());
                    lines.push(Line::from(vec![
                        lead,
                        Span::styled(level, log_level_style(&entry.level)),
                        Span::raw(truncate(&entry.message, message_max)),
                    ]));
                }
            }
            FieldValue::Screenshot { index, path } => {
                let key = format!("[{index}] ");
                let path_max = value_max.saturating_sub(key.len());
                lines.push(Line::from(vec![
                    label,
                    Span::styled(key, Style::default().fg(Color::Magenta)),
                    Span::styled(
                        truncate(path, path_max),
                        Style::default().add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
            }
        }
    }
}

fn log_level_style(level: &str) -> Style {
    match level.to_ascii_lowercase().as_str() {
        "error" | "fatal" | "critical" => Style::default().fg(Color::Red),
        "warn" | "warning" => Style::default().fg(Color::Yellow),
        "debug" | "trace" => Style::default().fg(Color::DarkGray),
        _ => Style::default().fg(Color::Blue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::detail;
    use crate::model::{FixtureType, LogEntry, NodeRef, Status, TestCase, TestFixture};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn case_panel_layout() {
        let test = TestFixture::new(FixtureType::Test, "login", "t.login", Status::Failed)
            .with_logs(vec![
                LogEntry {
                    level: "info".into(),
                    message: "open".into(),
                },
                LogEntry {
                    level: "error".into(),
                    message: "boom".into(),
                },
            ]);
        let case = TestCase::new("login", "t.login", test).unwrap();
        let panel = detail::render(NodeRef::Case(&case), &ViewConfig::default());
        let text: Vec<String> = panel_lines(&panel, 80).iter().map(line_text).collect();

        assert!(text[0].contains("t.login"));
        assert!(text.iter().any(|l| l.contains("@test")));
        assert!(text.iter().any(|l| l.contains("[info] open")));
        assert!(text.iter().any(|l| l.contains("[error] boom")));
    }

    #[test]
    fn stack_trace_spans_lines() {
        let mut fixture = TestFixture::new(FixtureType::Test, "a", "t.a", Status::Failed);
        fixture.failure = Some(crate::model::FailureInfo {
            message: "bad".into(),
            kind: None,
            stack_trace: Some("line one\nline two".into()),
        });
        let panel = detail::render(NodeRef::Fixture(&fixture), &ViewConfig::default());
        let text: Vec<String> = panel_lines(&panel, 80).iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.ends_with("line one")));
        assert!(text.iter().any(|l| l.trim() == "line two"));
    }

    #[test]
    fn fixture_labels_align_to_their_own_section() {
        let case = TestCase::new(
            "a",
            "t.a",
            TestFixture::new(FixtureType::Test, "a", "t.a", Status::Passed),
        )
        .unwrap();
        let panel = detail::render(NodeRef::Case(&case), &ViewConfig::default());
        let text: Vec<String> = panel_lines(&panel, 80).iter().map(line_text).collect();

        // "Method Name" is the widest fixture label, "Description" the widest case label
        let fixture_width = "Method Name".len();
        let case_width = "Description".len();
        assert!(text.contains(&format!(" {:>fixture_width$}  t.a", "Full Name")));
        assert!(text.contains(&format!(" {:>case_width$}  ", "Group")));
        assert!(text.contains(&format!(" {:>fixture_width$}  ", "Logs")));
        assert_eq!(text.len(), panel.line_count());
    }
}
