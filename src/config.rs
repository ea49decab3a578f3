/// Label templates fed to [`crate::format`]. Keys available are listed per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTemplates {
    /// `{name}`, `{fullName}`, `{total}`
    pub branch: String,
    /// `{name}`, `{fullName}`, `{status}`
    pub case: String,
    /// `{fixtureType}`, `{name}`, `{fullName}`, `{status}`
    pub fixture: String,
    /// `{0}` = elapsed seconds
    pub duration: String,
}

impl Default for LabelTemplates {
    fn default() -> Self {
        Self {
            branch: "{name}".to_string(),
            case: "{name}".to_string(),
            fixture: "@{fixtureType}".to_string(),
            duration: "{0}s".to_string(),
        }
    }
}

/// Rendering options for one report view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Branches shallower than this start expanded (suite is depth 0).
    pub collapse_depth: usize,
    /// Show total badges and rate bars on branch rows and the case status badge.
    pub show_filter_badges: bool,
    /// Show non-empty suite/class/group fixtures as tree leaves.
    pub show_fixtures: bool,
    pub labels: LabelTemplates,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            collapse_depth: 1,
            show_filter_badges: true,
            show_fixtures: true,
            labels: LabelTemplates::default(),
        }
    }
}
