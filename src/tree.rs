//! Navigation tree built from a result tree: status-scope pruning, per-branch
//! expand/collapse state and the single selection mark.

use clap::ValueEnum;

use crate::config::ViewConfig;
use crate::format::format_named;
use crate::model::{
    FixtureSlot, NodeKind, NodeRef, Rates, SourceRef, Status, StatusCount, TestCase, TestFixture,
    TestSuite,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Scope {
    #[default]
    All,
    Passed,
    Failed,
    Skipped,
}

impl Scope {
    pub fn status(self) -> Option<Status> {
        match self {
            Scope::All => None,
            Scope::Passed => Some(Status::Passed),
            Scope::Failed => Some(Status::Failed),
            Scope::Skipped => Some(Status::Skipped),
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Scope::All => Scope::Passed,
            Scope::Passed => Scope::Failed,
            Scope::Failed => Scope::Skipped,
            Scope::Skipped => Scope::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Passed => "passed",
            Scope::Failed => "failed",
            Scope::Skipped => "skipped",
        }
    }

    /// Whether a leaf with this status belongs in the scope.
    pub fn admits(self, status: Option<Status>) -> bool {
        match self.status() {
            None => true,
            Some(wanted) => status == Some(wanted),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiNode {
    pub id: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: usize,
    pub kind: NodeKind,
    /// Back-reference into the result tree for detail rendering.
    pub source: SourceRef,
    pub label: String,
    pub full_name: String,
    /// Leaf status. Branches have none.
    pub status: Option<Status>,
    /// Displayed count: the node's own count, or the scope-matching count when filtered.
    pub count: StatusCount,
    pub rates: Rates,
    /// Only meaningful for branches.
    pub expanded: bool,
}

impl UiNode {
    pub fn is_branch(&self) -> bool {
        self.kind.is_branch()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiTree {
    nodes: Vec<UiNode>,
    selected: Option<usize>,
    scope: Scope,
}

impl UiTree {
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// An empty tree is a valid outcome of filtering, not an error.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<&UiNode> {
        self.nodes.first()
    }

    pub fn get(&self, id: usize) -> Option<&UiNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[UiNode] {
        &self.nodes
    }

    pub fn find(&self, full_name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .find(|n| n.full_name == full_name)
            .map(|n| n.id)
    }

    /// Rows whose ancestors are all expanded, pre-order, paired with depth.
    pub fn visible_nodes(&self) -> Vec<(usize, usize)> {
        let mut result = Vec::new();
        if !self.nodes.is_empty() {
            self.collect_visible(0, &mut result);
        }
        result
    }

    fn collect_visible(&self, id: usize, result: &mut Vec<(usize, usize)>) {
        let node = &self.nodes[id];
        result.push((id, node.depth));
        if node.is_branch() && node.expanded {
            for &child in &node.children {
                self.collect_visible(child, result);
            }
        }
    }

    pub fn is_visible(&self, id: usize) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let mut current = node.parent;
        while let Some(pid) = current {
            let parent = &self.nodes[pid];
            if !parent.expanded {
                return false;
            }
            current = parent.parent;
        }
        true
    }

    /// Flip one branch. Descendants keep their own state. Returns the new state,
    /// or `None` for leaves and unknown ids.
    pub fn toggle(&mut self, id: usize) -> Option<bool> {
        let node = self.nodes.get_mut(id)?;
        if !node.is_branch() {
            return None;
        }
        node.expanded = !node.expanded;
        Some(node.expanded)
    }

    /// Returns `true` if the branch changed state.
    pub fn expand(&mut self, id: usize) -> bool {
        match self.nodes.get(id) {
            Some(node) if node.is_branch() && !node.expanded => self.toggle(id).is_some(),
            _ => false,
        }
    }

    /// Returns `true` if the branch changed state.
    pub fn collapse(&mut self, id: usize) -> bool {
        match self.nodes.get(id) {
            Some(node) if node.is_branch() && node.expanded => self.toggle(id).is_some(),
            _ => false,
        }
    }

    /// Toggle every collapsed branch exactly once. Returns how many were toggled.
    pub fn expand_all(&mut self) -> usize {
        self.toggle_where(|n| !n.expanded)
    }

    /// Toggle every expanded branch exactly once. Returns how many were toggled.
    pub fn collapse_all(&mut self) -> usize {
        self.toggle_where(|n| n.expanded)
    }

    fn toggle_where(&mut self, pred: impl Fn(&UiNode) -> bool) -> usize {
        let targets: Vec<usize> = self
            .nodes
            .iter()
            .filter(|n| n.is_branch() && pred(n))
            .map(|n| n.id)
            .collect();
        for &id in &targets {
            self.toggle(id);
        }
        targets.len()
    }

    /// Mark `id` as the one selected node, clearing any previous mark.
    pub fn select(&mut self, id: usize) -> bool {
        if id < self.nodes.len() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_selected(&self, id: usize) -> bool {
        self.selected == Some(id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

/// Build a fresh navigation tree for `scope`. Collapse and selection state start over.
pub fn build(suite: &TestSuite, scope: Scope, config: &ViewConfig) -> UiTree {
    let mut builder = Builder {
        config,
        scope,
        nodes: Vec::new(),
    };
    builder.suite(suite);
    let tree = UiTree {
        nodes: builder.nodes,
        selected: None,
        scope,
    };
    tracing::debug!(
        scope = scope.as_str(),
        nodes = tree.len(),
        "built navigation tree"
    );
    tree
}

struct Builder<'c> {
    config: &'c ViewConfig,
    scope: Scope,
    nodes: Vec<UiNode>,
}

impl Builder<'_> {
    fn suite(&mut self, suite: &TestSuite) {
        let Some(root) = self.branch(None, NodeRef::Suite(suite), SourceRef::suite()) else {
            return;
        };
        self.fixture(
            root,
            &suite.before_suite,
            SourceRef::suite().fixture(FixtureSlot::Before),
        );

        for (ci, class) in suite.test_classes.iter().enumerate() {
            let class_ref = NodeRef::Class(class);
            let Some(class_id) = self.branch(Some(root), class_ref, SourceRef::class(ci)) else {
                continue;
            };
            self.fixture(
                class_id,
                &class.before_class,
                SourceRef::class(ci).fixture(FixtureSlot::Before),
            );

            for (gi, group) in class.test_groups.iter().enumerate() {
                let Some(group_id) =
                    self.branch(Some(class_id), NodeRef::Group(group), SourceRef::group(ci, gi))
                else {
                    continue;
                };
                self.fixture(
                    group_id,
                    &group.before_group,
                    SourceRef::group(ci, gi).fixture(FixtureSlot::Before),
                );
                for (ki, case) in group.test_cases.iter().enumerate() {
                    self.case(group_id, case, SourceRef::case(ci, gi, ki));
                }
                self.fixture(
                    group_id,
                    &group.after_group,
                    SourceRef::group(ci, gi).fixture(FixtureSlot::After),
                );
            }

            self.fixture(
                class_id,
                &class.after_class,
                SourceRef::class(ci).fixture(FixtureSlot::After),
            );
        }

        self.fixture(
            root,
            &suite.after_suite,
            SourceRef::suite().fixture(FixtureSlot::After),
        );
    }

    /// `None` when the scope prunes the branch (no matching descendant case).
    fn branch(
        &mut self,
        parent: Option<usize>,
        node: NodeRef<'_>,
        source: SourceRef,
    ) -> Option<usize> {
        let own = node.status_count().copied().unwrap_or_default();
        let (count, rates) = match self.scope.status() {
            None => (own, own.rates()),
            Some(status) if own.of(status) > 0 => {
                (StatusCount::only(status, own.of(status)), Rates::single(status))
            }
            Some(_) => return None,
        };
        let depth = parent.map_or(0, |p| self.nodes[p].depth + 1);
        let total = count.total.to_string();
        let label = format_named(
            &self.config.labels.branch,
            &[
                ("name", Some(node.name())),
                ("fullName", Some(node.full_name())),
                ("total", Some(total.as_str())),
            ],
        );
        Some(self.push(UiNode {
            id: 0,
            parent,
            children: Vec::new(),
            depth,
            kind: node.kind(),
            source,
            label,
            full_name: node.full_name().to_string(),
            status: None,
            count,
            rates,
            expanded: depth < self.config.collapse_depth,
        }))
    }

    fn case(&mut self, parent: usize, case: &TestCase, source: SourceRef) {
        if !self.scope.admits(Some(case.status)) {
            return;
        }
        let label = format_named(
            &self.config.labels.case,
            &[
                ("name", Some(case.name.as_str())),
                ("fullName", Some(case.full_name.as_str())),
                ("status", Some(case.status.as_str())),
            ],
        );
        self.push(UiNode {
            id: 0,
            parent: Some(parent),
            children: Vec::new(),
            depth: self.nodes[parent].depth + 1,
            kind: NodeKind::Case,
            source,
            label,
            full_name: case.full_name.clone(),
            status: Some(case.status),
            count: case.status_count,
            rates: Rates::single(case.status),
            expanded: false,
        });
    }

    fn fixture(&mut self, parent: usize, fixture: &TestFixture, source: SourceRef) {
        if fixture.is_empty || !self.config.show_fixtures || !self.scope.admits(fixture.status) {
            return;
        }
        let label = format_named(
            &self.config.labels.fixture,
            &[
                ("fixtureType", Some(fixture.fixture_type.as_str())),
                ("name", Some(fixture.name.as_str())),
                ("fullName", Some(fixture.full_name.as_str())),
                ("status", fixture.status.map(Status::as_str)),
            ],
        );
        self.push(UiNode {
            id: 0,
            parent: Some(parent),
            children: Vec::new(),
            depth: self.nodes[parent].depth + 1,
            kind: NodeKind::Fixture,
            source,
            label,
            full_name: fixture.full_name.clone(),
            status: fixture.status,
            count: StatusCount::default(),
            rates: Rates::default(),
            expanded: false,
        });
    }

    fn push(&mut self, mut node: UiNode) -> usize {
        let id = self.nodes.len();
        node.id = id;
        if let Some(parent) = node.parent {
            self.nodes[parent].children.push(id);
        }
        self.nodes.push(node);
        id
    }
}
