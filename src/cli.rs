use std::path::PathBuf;

use clap::Parser;

use crate::config::ViewConfig;
use crate::tree::Scope;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_NUMBER"));

#[derive(Parser, Debug)]
#[command(name = "trv", version = VERSION, about = "Test Report Viewer TUI")]
pub struct Cli {
    /// Exported result tree (JSON)
    pub report: PathBuf,

    /// Initial status filter
    #[arg(short, long, value_enum, default_value_t = Scope::All)]
    pub filter: Scope,

    /// Branches shallower than this start expanded (suite is depth 0)
    #[arg(short, long, default_value_t = 1)]
    pub collapse_depth: usize,

    /// Hide branch totals and rate bars
    #[arg(long)]
    pub no_badges: bool,

    /// Hide suite/class/group fixtures in the tree
    #[arg(long)]
    pub no_fixtures: bool,

    /// Command used to open screenshots (defaults to the platform opener)
    #[arg(long, value_name = "CMD")]
    pub viewer: Option<String>,

    /// Write debug logs to $XDG_STATE_HOME/trv/debug.log
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            collapse_depth: self.collapse_depth,
            show_filter_badges: !self.no_badges,
            show_fixtures: !self.no_fixtures,
            ..ViewConfig::default()
        }
    }

    /// Directory relative screenshot paths resolve against.
    pub fn report_dir(&self) -> Option<PathBuf> {
        self.report
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
    }
}
