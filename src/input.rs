use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::tree::Scope;

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    DismissError,
    MoveUp,
    MoveDown,
    JumpToStart,
    JumpToEnd,
    Select,
    Toggle,
    Expand,
    Collapse,
    ExpandAll,
    CollapseAll,
    CycleScope,
    SetScope(Scope),
    OpenScreenshot(usize),
    ScrollDetailUp,
    ScrollDetailDown,
    None,
}

/// Captures the UI state needed to interpret a key press.
#[derive(Debug, Clone, Default)]
pub struct InputContext {
    pub has_error: bool,
    pub has_detail: bool,
}

pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => {
            if ctx.has_error {
                Action::DismissError
            } else {
                Action::Quit
            }
        }
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Home | KeyCode::Char('g') => Action::JumpToStart,
        KeyCode::End | KeyCode::Char('G') => Action::JumpToEnd,
        KeyCode::Enter => Action::Select,
        KeyCode::Char(' ') => Action::Toggle,
        KeyCode::Right | KeyCode::Char('l') => Action::Expand,
        KeyCode::Left | KeyCode::Char('h') => Action::Collapse,
        KeyCode::Char('E') => Action::ExpandAll,
        KeyCode::Char('C') => Action::CollapseAll,
        KeyCode::Char('f') => Action::CycleScope,
        KeyCode::Char('a') => Action::SetScope(Scope::All),
        KeyCode::Char('p') => Action::SetScope(Scope::Passed),
        KeyCode::Char('x') => Action::SetScope(Scope::Failed),
        KeyCode::Char('s') => Action::SetScope(Scope::Skipped),
        KeyCode::Char('J') | KeyCode::PageDown if ctx.has_detail => Action::ScrollDetailDown,
        KeyCode::Char('K') | KeyCode::PageUp if ctx.has_detail => Action::ScrollDetailUp,
        KeyCode::Char(c) if c.is_ascii_digit() && c != '0' && ctx.has_detail => {
            Action::OpenScreenshot((c as u8 - b'0') as usize)
        }
        _ => Action::None,
    }
}
