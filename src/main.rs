use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use trv::app::ReportView;
use trv::cli::Cli;
use trv::events::{AppEvent, EventHandler};
use trv::input::{self, Action, InputContext};
use trv::parser::load_report;
use trv::tui;
use trv::viewer::SystemImageViewer;

/// Rows moved per J/K press in the detail panel.
const DETAIL_SCROLL_STEP: usize = 3;

fn setup_verbose_logging() -> Result<()> {
    let state_dir = state_dir_or_fallback();
    std::fs::create_dir_all(&state_dir)
        .map_err(|e| eyre!("Failed to create log directory {state_dir:?}: {e}"))?;
    let log_path = state_dir.join("debug.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| eyre!("Failed to open log file {log_path:?}: {e}"))?;
    tracing_subscriber::fmt()
        .with_writer(file)
        .with_ansi(false)
        .init();
    tracing::info!(
        "trv v{} starting with verbose logging",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

fn state_dir_or_fallback() -> PathBuf {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME") {
        PathBuf::from(state).join("trv")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("state").join("trv")
    } else {
        PathBuf::from("/tmp/trv")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    if args.verbose {
        setup_verbose_logging()?;
    }

    // Load before touching the terminal so errors print normally
    let suite = load_report(&args.report)
        .wrap_err_with(|| format!("Cannot open report {}", args.report.display()))?;

    let mut view = ReportView::new(Arc::new(suite), args.view_config());
    view.set_scope(args.filter);
    let viewer = SystemImageViewer::new(args.viewer.clone(), args.report_dir());

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Failed to disable raw mode during panic: {e}");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, SetTitle("")) {
            eprintln!("Failed to leave alternate screen during panic: {e}");
        }
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        SetTitle(format!("trv {}", view.suite().name))
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let events = EventHandler::new(Duration::from_millis(250));
    let result = run_app(&mut terminal, &mut view, events, &viewer).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, SetTitle(""))?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    view: &mut ReportView,
    mut events: EventHandler,
    viewer: &SystemImageViewer,
) -> Result<()> {
    loop {
        terminal.draw(|f| tui::render::render(f, view))?;

        view.prune_error();

        let Some(event) = events.next().await else {
            break;
        };
        match event {
            AppEvent::Key(key) => {
                let ctx = InputContext {
                    has_error: view.error_message().is_some(),
                    has_detail: view.detail().is_some(),
                };
                match input::map_key(key, &ctx) {
                    Action::Quit => view.should_quit = true,
                    Action::DismissError => view.clear_error(),
                    Action::MoveUp => view.move_cursor_up(),
                    Action::MoveDown => view.move_cursor_down(),
                    Action::JumpToStart => view.jump_to_start(),
                    Action::JumpToEnd => view.jump_to_end(),
                    Action::Select => {
                        view.select_cursor();
                    }
                    Action::Toggle => {
                        view.toggle_cursor();
                    }
                    Action::Expand => view.expand_cursor(),
                    Action::Collapse => view.collapse_cursor(),
                    Action::ExpandAll => {
                        view.expand_all();
                    }
                    Action::CollapseAll => {
                        view.collapse_all();
                    }
                    Action::CycleScope => view.cycle_scope(),
                    Action::SetScope(scope) => view.set_scope(scope),
                    Action::OpenScreenshot(n) => {
                        if let Err(e) = view.open_screenshot(n, viewer) {
                            view.set_error(format!("{e}"));
                        }
                    }
                    Action::ScrollDetailUp => view.scroll_detail_up(DETAIL_SCROLL_STEP),
                    Action::ScrollDetailDown => view.scroll_detail_down(DETAIL_SCROLL_STEP),
                    Action::None => {}
                }
            }
            AppEvent::Resize | AppEvent::Tick => {}
            AppEvent::Error(msg) => {
                tracing::warn!("{msg}");
                view.set_error(msg);
            }
        }

        if view.should_quit {
            break;
        }
    }

    events.stop();
    Ok(())
}
