use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use color_eyre::eyre::{eyre, Result};

use crate::config::ViewConfig;
use crate::detail::{self, DetailPanel};
use crate::model::{StatusCount, TestSuite};
use crate::tree::{self, Scope, UiNode, UiTree};
use crate::viewer::ImageViewer;

// UI constants
pub const ERROR_TTL_SECS: u64 = 10;
pub const NARROW_WIDTH_THRESHOLD: u16 = 60;

/// State of one open report: the immutable model, the navigation tree built
/// from it for the current scope, and the panel of the selected node.
pub struct ReportView {
    suite: Arc<TestSuite>,
    pub config: ViewConfig,
    tree: UiTree,
    /// Cached `tree.visible_nodes()`; `cursor` indexes into it.
    visible: Vec<(usize, usize)>,
    pub cursor: usize,
    detail: Option<DetailPanel>,
    pub detail_scroll: usize,
    badges: StatusCount,
    error: Option<(String, Instant)>,
    pub should_quit: bool,
}

impl ReportView {
    pub fn new(suite: Arc<TestSuite>, config: ViewConfig) -> Self {
        let mut view = Self {
            suite,
            config,
            tree: UiTree::default(),
            visible: Vec::new(),
            cursor: 0,
            detail: None,
            detail_scroll: 0,
            badges: StatusCount::default(),
            error: None,
            should_quit: false,
        };
        view.rebuild(Scope::All);
        view
    }

    /// Discard tree, cursor, selection and detail, then build for `scope`.
    fn rebuild(&mut self, scope: Scope) {
        self.tree = tree::build(&self.suite, scope, &self.config);
        self.visible = self.tree.visible_nodes();
        self.cursor = 0;
        self.detail = None;
        self.detail_scroll = 0;
        self.badges = self.suite.status_count;
    }

    pub fn suite(&self) -> &TestSuite {
        &self.suite
    }

    pub fn tree(&self) -> &UiTree {
        &self.tree
    }

    pub fn scope(&self) -> Scope {
        self.tree.scope()
    }

    /// Root totals of the loaded report, independent of the scope.
    pub fn badges(&self) -> StatusCount {
        self.badges
    }

    pub fn detail(&self) -> Option<&DetailPanel> {
        self.detail.as_ref()
    }

    /// Visible rows as `(node id, depth)`.
    pub fn visible_rows(&self) -> &[(usize, usize)] {
        &self.visible
    }

    pub fn cursor_node(&self) -> Option<&UiNode> {
        self.visible
            .get(self.cursor)
            .and_then(|&(id, _)| self.tree.get(id))
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.rebuild(scope);
        tracing::debug!(
            scope = scope.as_str(),
            visible = self.visible.len(),
            "scope changed"
        );
    }

    pub fn cycle_scope(&mut self) {
        self.set_scope(self.scope().cycle());
    }

    /// Mark `id` selected and render its detail panel.
    pub fn select(&mut self, id: usize) -> bool {
        let Some(source) = self.tree.get(id).map(|n| n.source) else {
            return false;
        };
        let Some(node) = self.suite.resolve(&source) else {
            return false;
        };
        self.detail = Some(detail::render(node, &self.config));
        self.detail_scroll = 0;
        self.tree.select(id)
    }

    pub fn select_cursor(&mut self) -> bool {
        match self.cursor_node().map(|n| n.id) {
            Some(id) => self.select(id),
            None => false,
        }
    }

    pub fn toggle(&mut self, id: usize) -> Option<bool> {
        let expanded = self.tree.toggle(id)?;
        self.refresh_visible();
        Some(expanded)
    }

    pub fn toggle_cursor(&mut self) -> Option<bool> {
        let id = self.cursor_node()?.id;
        self.toggle(id)
    }

    pub fn expand_cursor(&mut self) {
        if let Some(id) = self.cursor_node().map(|n| n.id) {
            if self.tree.expand(id) {
                self.refresh_visible();
            }
        }
    }

    /// Collapse the cursor branch, or move to its parent when already collapsed or a leaf.
    pub fn collapse_cursor(&mut self) {
        let Some(node) = self.cursor_node() else {
            return;
        };
        let (id, parent) = (node.id, node.parent);
        if self.tree.collapse(id) {
            self.refresh_visible();
        } else if let Some(row) = parent.and_then(|p| self.row_of(p)) {
            self.cursor = row;
        }
    }

    pub fn expand_all(&mut self) -> usize {
        let n = self.tree.expand_all();
        self.refresh_visible();
        tracing::debug!(toggled = n, "expand all");
        n
    }

    pub fn collapse_all(&mut self) -> usize {
        let n = self.tree.collapse_all();
        self.refresh_visible();
        tracing::debug!(toggled = n, "collapse all");
        n
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_down(&mut self) {
        if !self.visible.is_empty() && self.cursor < self.visible.len() - 1 {
            self.cursor += 1;
        }
    }

    pub fn jump_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn jump_to_end(&mut self) {
        self.cursor = self.visible.len().saturating_sub(1);
    }

    pub fn scroll_detail_up(&mut self, amount: usize) {
        self.detail_scroll = self.detail_scroll.saturating_sub(amount);
    }

    /// Stops with the last panel line at the top.
    pub fn scroll_detail_down(&mut self, amount: usize) {
        if let Some(panel) = &self.detail {
            let max = panel.line_count().saturating_sub(1);
            self.detail_scroll = self.detail_scroll.saturating_add(amount).min(max);
        }
    }

    /// Hand the `n`-th (1-based) screenshot of the current panel to `viewer`.
    pub fn open_screenshot(&self, n: usize, viewer: &dyn ImageViewer) -> Result<()> {
        let path = self
            .detail
            .as_ref()
            .and_then(|d| d.screenshot(n))
            .ok_or_else(|| eyre!("No screenshot #{n} in the detail panel"))?;
        viewer.show(Path::new(path)).inspect_err(|e| {
            tracing::warn!(path, error = %e, "screenshot viewer failed");
        })
    }

    fn row_of(&self, id: usize) -> Option<usize> {
        self.visible.iter().position(|&(v, _)| v == id)
    }

    /// Recompute visible rows, keeping the cursor on its node or the nearest
    /// visible ancestor when the node was hidden.
    fn refresh_visible(&mut self) {
        let focused = self.cursor_node().map(|n| n.id);
        self.visible = self.tree.visible_nodes();
        let mut current = focused;
        let mut row = None;
        while let Some(id) = current {
            row = self.row_of(id);
            if row.is_some() {
                break;
            }
            current = self.tree.get(id).and_then(|n| n.parent);
        }
        self.cursor = row.unwrap_or(0);
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some((msg, Instant::now()));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn prune_error(&mut self) {
        if let Some((_, ts)) = &self.error {
            if ts.elapsed().as_secs() >= ERROR_TTL_SECS {
                self.error = None;
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|(msg, _)| msg.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FixtureType, Status, TestCase, TestClass, TestFixture, TestGroup};
    use std::cell::RefCell;
    use std::path::PathBuf;

    fn make_case(full: &str, status: Status) -> TestCase {
        let name = full.rsplit('.').next().unwrap_or(full);
        TestCase::new(
            name,
            full,
            TestFixture::new(FixtureType::Test, name, full, status),
        )
        .unwrap()
    }

    fn make_suite() -> TestSuite {
        let login = TestClass::new(
            "LoginTest",
            "t.LoginTest",
            vec![TestGroup::new(
                "DEFAULT",
                "t.LoginTest.DEFAULT",
                vec![
                    make_case("t.LoginTest.ok", Status::Passed),
                    make_case("t.LoginTest.bad", Status::Failed),
                ],
            )],
        );
        let shot = TestCase::new(
            "shot",
            "t.CartTest.shot",
            TestFixture::new(FixtureType::Test, "shot", "t.CartTest.shot", Status::Skipped)
                .with_screenshot("cart.png"),
        )
        .unwrap();
        let cart = TestClass::new(
            "CartTest",
            "t.CartTest",
            vec![TestGroup::new(
                "smoke",
                "t.CartTest.smoke",
                vec![shot, make_case("t.CartTest.add", Status::Passed)],
            )],
        );
        TestSuite::new("suite", vec![login, cart])
    }

    fn make_view() -> ReportView {
        ReportView::new(Arc::new(make_suite()), ViewConfig::default())
    }

    fn cursor_name(view: &ReportView) -> &str {
        view.cursor_node().map_or("", |n| n.full_name.as_str())
    }

    fn move_to(view: &mut ReportView, full_name: &str) {
        let id = view.tree().find(full_name).unwrap();
        view.cursor = view.row_of(id).unwrap();
    }

    #[derive(Default)]
    struct RecordingViewer {
        shown: RefCell<Vec<PathBuf>>,
    }

    impl ImageViewer for RecordingViewer {
        fn show(&self, path: &Path) -> Result<()> {
            self.shown.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    // --- Construction ---

    #[test]
    fn new_view_shows_suite_and_classes() {
        let view = make_view();
        assert_eq!(view.scope(), Scope::All);
        assert_eq!(view.visible_rows().len(), 3);
        assert_eq!(view.cursor, 0);
        assert!(view.detail().is_none());
        assert_eq!(
            view.badges(),
            StatusCount {
                total: 4,
                passed: 2,
                failed: 1,
                skipped: 1
            }
        );
    }

    // --- Cursor movement ---

    #[test]
    fn cursor_up_at_zero_stays() {
        let mut view = make_view();
        view.move_cursor_up();
        assert_eq!(view.cursor, 0);
    }

    #[test]
    fn cursor_down_at_end_stays() {
        let mut view = make_view();
        view.jump_to_end();
        assert_eq!(view.cursor, 2);
        view.move_cursor_down();
        assert_eq!(view.cursor, 2);
        view.jump_to_start();
        assert_eq!(view.cursor, 0);
    }

    // --- Expand / collapse ---

    #[test]
    fn toggle_cursor_reveals_children() {
        let mut view = make_view();
        move_to(&mut view, "t.LoginTest");
        assert_eq!(view.toggle_cursor(), Some(true));
        assert_eq!(view.visible_rows().len(), 4);
        assert_eq!(cursor_name(&view), "t.LoginTest");
        assert_eq!(view.toggle_cursor(), Some(false));
        assert_eq!(view.visible_rows().len(), 3);
    }

    #[test]
    fn collapse_hiding_cursor_moves_to_ancestor() {
        let mut view = make_view();
        view.expand_all();
        move_to(&mut view, "t.CartTest.add");
        let class = view.tree().find("t.CartTest").unwrap();
        view.toggle(class);
        assert_eq!(cursor_name(&view), "t.CartTest");
    }

    #[test]
    fn collapse_on_leaf_moves_to_parent() {
        let mut view = make_view();
        view.expand_all();
        move_to(&mut view, "t.LoginTest.bad");
        view.collapse_cursor();
        assert_eq!(cursor_name(&view), "t.LoginTest.DEFAULT");
        view.collapse_cursor();
        assert_eq!(cursor_name(&view), "t.LoginTest.DEFAULT");
        assert!(!view.tree().get(view.cursor_node().unwrap().id).unwrap().expanded);
        view.collapse_cursor();
        assert_eq!(cursor_name(&view), "t.LoginTest");
    }

    #[test]
    fn expand_cursor_only_expands() {
        let mut view = make_view();
        move_to(&mut view, "t.CartTest");
        view.expand_cursor();
        view.expand_cursor();
        assert_eq!(view.visible_rows().len(), 4);
    }

    #[test]
    fn expand_all_then_collapse_all() {
        let mut view = make_view();
        assert_eq!(view.expand_all(), 4);
        assert_eq!(view.visible_rows().len(), view.tree().len());
        view.jump_to_end();
        assert_eq!(view.collapse_all(), 5);
        assert_eq!(view.visible_rows().len(), 1);
        assert_eq!(view.cursor, 0);
    }

    // --- Selection and detail ---

    #[test]
    fn select_renders_detail() {
        let mut view = make_view();
        view.expand_all();
        move_to(&mut view, "t.LoginTest.bad");
        assert!(view.select_cursor());
        let detail = view.detail().unwrap();
        assert_eq!(detail.header, "t.LoginTest.bad");
        assert_eq!(detail.status, Some(Status::Failed));
    }

    #[test]
    fn selecting_another_node_replaces_mark_and_detail() {
        let mut view = make_view();
        let a = view.tree().find("t.LoginTest").unwrap();
        let b = view.tree().find("t.CartTest").unwrap();
        view.select(a);
        view.detail_scroll = 3;
        view.select(b);
        assert_eq!(view.tree().selected(), Some(b));
        assert_eq!(view.detail().unwrap().header, "t.CartTest");
        assert_eq!(view.detail_scroll, 0);
    }

    #[test]
    fn detail_scroll_stops_at_last_line() {
        let mut view = make_view();
        view.scroll_detail_down(5);
        assert_eq!(view.detail_scroll, 0);

        let id = view.tree().find("t.LoginTest.bad").unwrap();
        view.select(id);
        let max = view.detail().unwrap().line_count() - 1;
        view.scroll_detail_down(10_000);
        assert_eq!(view.detail_scroll, max);
        view.scroll_detail_up(1);
        assert_eq!(view.detail_scroll, max - 1);
    }

    #[test]
    fn select_unknown_id_is_rejected() {
        let mut view = make_view();
        assert!(!view.select(999));
        assert!(view.detail().is_none());
    }

    #[test]
    fn selection_survives_collapse() {
        let mut view = make_view();
        view.expand_all();
        let leaf = view.tree().find("t.LoginTest.ok").unwrap();
        view.select(leaf);
        view.collapse_all();
        assert_eq!(view.tree().selected(), Some(leaf));
        assert!(view.detail().is_some());
    }

    // --- Scope ---

    #[test]
    fn scope_change_resets_state() {
        let mut view = make_view();
        view.expand_all();
        view.jump_to_end();
        view.select(1);
        view.set_scope(Scope::Failed);
        assert_eq!(view.scope(), Scope::Failed);
        assert_eq!(view.cursor, 0);
        assert!(view.detail().is_none());
        assert_eq!(view.tree().selected(), None);
        assert_eq!(view.badges().total, 4);
    }

    #[test]
    fn cycle_scope_order() {
        let mut view = make_view();
        view.cycle_scope();
        assert_eq!(view.scope(), Scope::Passed);
        view.cycle_scope();
        assert_eq!(view.scope(), Scope::Failed);
        view.cycle_scope();
        assert_eq!(view.scope(), Scope::Skipped);
        view.cycle_scope();
        assert_eq!(view.scope(), Scope::All);
    }

    #[test]
    fn empty_scope_result_is_navigable() {
        let suite = TestSuite::new(
            "suite",
            vec![TestClass::new(
                "C",
                "t.C",
                vec![TestGroup::new("g", "t.C.g", vec![make_case("t.C.a", Status::Passed)])],
            )],
        );
        let mut view = ReportView::new(Arc::new(suite), ViewConfig::default());
        view.set_scope(Scope::Failed);
        assert!(view.tree().is_empty());
        view.move_cursor_down();
        view.jump_to_end();
        assert_eq!(view.cursor, 0);
        assert!(!view.select_cursor());
        assert_eq!(view.toggle_cursor(), None);
        view.collapse_cursor();
        assert_eq!(view.expand_all(), 0);
    }

    // --- Screenshots ---

    #[test]
    fn open_screenshot_hands_path_to_viewer() {
        let mut view = make_view();
        let id = view.tree().find("t.CartTest.shot").unwrap();
        view.select(id);
        let viewer = RecordingViewer::default();
        view.open_screenshot(1, &viewer).unwrap();
        assert_eq!(*viewer.shown.borrow(), vec![PathBuf::from("cart.png")]);
    }

    #[test]
    fn open_missing_screenshot_errors() {
        let mut view = make_view();
        let viewer = RecordingViewer::default();
        assert!(view.open_screenshot(1, &viewer).is_err());
        let id = view.tree().find("t.CartTest.shot").unwrap();
        view.select(id);
        assert!(view.open_screenshot(2, &viewer).is_err());
        assert!(viewer.shown.borrow().is_empty());
    }

    // --- Errors ---

    #[test]
    fn error_lifecycle() {
        let mut view = make_view();
        assert!(view.error_message().is_none());
        view.set_error("boom".to_string());
        assert_eq!(view.error_message(), Some("boom"));
        view.prune_error();
        assert_eq!(view.error_message(), Some("boom"));
        view.clear_error();
        assert!(view.error_message().is_none());
    }
}
