//! Result tree model: suite → classes → groups → cases, with fixtures at every level.
//!
//! Aggregates (`status_count`, `rates`) are computed once by the constructors and are
//! treated as read-only afterwards. Nothing in the rendering core mutates a model.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ReportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCount {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl StatusCount {
    /// Count for a single test case.
    pub fn single(status: Status) -> Self {
        Self::only(status, 1)
    }

    /// A count holding `n` entries in one bucket only.
    pub fn only(status: Status, n: usize) -> Self {
        let mut count = Self::default();
        match status {
            Status::Passed => count.passed = n,
            Status::Failed => count.failed = n,
            Status::Skipped => count.skipped = n,
        }
        count.total = n;
        count
    }

    pub fn sum<'a>(counts: impl IntoIterator<Item = &'a StatusCount>) -> Self {
        counts.into_iter().fold(Self::default(), |acc, c| Self {
            total: acc.total + c.total,
            passed: acc.passed + c.passed,
            failed: acc.failed + c.failed,
            skipped: acc.skipped + c.skipped,
        })
    }

    pub fn of(&self, status: Status) -> usize {
        match status {
            Status::Passed => self.passed,
            Status::Failed => self.failed,
            Status::Skipped => self.skipped,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.passed + self.failed + self.skipped
    }

    pub fn rates(&self) -> Rates {
        if self.total == 0 {
            return Rates::default();
        }
        let total = self.total as f64;
        Rates {
            pass: self.passed as f64 * 100.0 / total,
            fail: self.failed as f64 * 100.0 / total,
            skip: self.skipped as f64 * 100.0 / total,
        }
    }
}

/// Percentage share of each status, exact (not rounded).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rates {
    pub pass: f64,
    pub fail: f64,
    pub skip: f64,
}

impl Rates {
    /// 100% in the bucket of `status`, zero elsewhere.
    pub fn single(status: Status) -> Self {
        let mut rates = Self::default();
        match status {
            Status::Passed => rates.pass = 100.0,
            Status::Failed => rates.fail = 100.0,
            Status::Skipped => rates.skip = 100.0,
        }
        rates
    }

    pub fn of(&self, status: Status) -> f64 {
        match status {
            Status::Passed => self.pass,
            Status::Failed => self.fail,
            Status::Skipped => self.skip,
        }
    }

    pub fn sum(&self) -> f64 {
        self.pass + self.fail + self.skip
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixtureType {
    BeforeSuite,
    AfterSuite,
    BeforeClass,
    AfterClass,
    BeforeGroup,
    AfterGroup,
    BeforeMethod,
    AfterMethod,
    Test,
}

impl FixtureType {
    pub fn as_str(self) -> &'static str {
        match self {
            FixtureType::BeforeSuite => "beforeSuite",
            FixtureType::AfterSuite => "afterSuite",
            FixtureType::BeforeClass => "beforeClass",
            FixtureType::AfterClass => "afterClass",
            FixtureType::BeforeGroup => "beforeGroup",
            FixtureType::AfterGroup => "afterGroup",
            FixtureType::BeforeMethod => "beforeMethod",
            FixtureType::AfterMethod => "afterMethod",
            FixtureType::Test => "test",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    SingleLine,
    Parallel,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::SingleLine => "singleline",
            RunMode::Parallel => "parallel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timing {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds.
    pub elapsed_time: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureInfo {
    pub message: String,
    pub kind: Option<String>,
    pub stack_trace: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestFixture {
    pub fixture_type: FixtureType,
    /// The fixture was never invoked. Empty fixtures are elided from tree and detail views.
    pub is_empty: bool,
    /// `None` only for empty fixtures.
    pub status: Option<Status>,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub logs: Vec<LogEntry>,
    pub screenshot: Option<String>,
    pub timing: Timing,
    pub failure: Option<FailureInfo>,
    pub skip_message: Option<String>,
}

impl TestFixture {
    pub fn empty(fixture_type: FixtureType) -> Self {
        Self {
            fixture_type,
            is_empty: true,
            status: None,
            name: String::new(),
            full_name: String::new(),
            description: None,
            logs: Vec::new(),
            screenshot: None,
            timing: Timing::default(),
            failure: None,
            skip_message: None,
        }
    }

    pub fn new(
        fixture_type: FixtureType,
        name: impl Into<String>,
        full_name: impl Into<String>,
        status: Status,
    ) -> Self {
        Self {
            is_empty: false,
            status: Some(status),
            name: name.into(),
            full_name: full_name.into(),
            ..Self::empty(fixture_type)
        }
    }

    pub fn with_logs(mut self, logs: Vec<LogEntry>) -> Self {
        self.logs = logs;
        self
    }

    pub fn with_screenshot(mut self, path: impl Into<String>) -> Self {
        self.screenshot = Some(path.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub full_name: String,
    /// Status of the `test` fixture.
    pub status: Status,
    pub tags: Vec<String>,
    pub group: Option<String>,
    pub description: Option<String>,
    pub timing: Timing,
    pub before_method: TestFixture,
    pub test: TestFixture,
    pub after_method: TestFixture,
    pub status_count: StatusCount,
}

impl TestCase {
    /// `test` must be a non-empty `test` fixture with a status; that status becomes
    /// the case status.
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        test: TestFixture,
    ) -> Result<Self, ReportError> {
        let full_name = full_name.into();
        if test.fixture_type != FixtureType::Test {
            return Err(ReportError::malformed(
                &full_name,
                format!("expected `test` fixture, found `{}`", test.fixture_type.as_str()),
            ));
        }
        if test.is_empty {
            return Err(ReportError::malformed(&full_name, "`test` fixture must not be empty"));
        }
        let Some(status) = test.status else {
            return Err(ReportError::malformed(&full_name, "`test` fixture has no status"));
        };
        Ok(Self {
            name: name.into(),
            full_name,
            status,
            tags: Vec::new(),
            group: None,
            description: None,
            timing: Timing::default(),
            before_method: TestFixture::empty(FixtureType::BeforeMethod),
            test,
            after_method: TestFixture::empty(FixtureType::AfterMethod),
            status_count: StatusCount::single(status),
        })
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        self.tags = unique;
        self
    }

    pub fn with_before(mut self, fixture: TestFixture) -> Self {
        self.before_method = fixture;
        self
    }

    pub fn with_after(mut self, fixture: TestFixture) -> Self {
        self.after_method = fixture;
        self
    }

    pub fn rates(&self) -> Rates {
        self.status_count.rates()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestGroup {
    pub name: String,
    pub full_name: String,
    pub timing: Timing,
    pub before_group: TestFixture,
    pub after_group: TestFixture,
    pub test_cases: Vec<TestCase>,
    pub status_count: StatusCount,
    pub rates: Rates,
}

impl TestGroup {
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        test_cases: Vec<TestCase>,
    ) -> Self {
        let status_count = StatusCount::sum(test_cases.iter().map(|c| &c.status_count));
        Self {
            name: name.into(),
            full_name: full_name.into(),
            timing: Timing::default(),
            before_group: TestFixture::empty(FixtureType::BeforeGroup),
            after_group: TestFixture::empty(FixtureType::AfterGroup),
            test_cases,
            rates: status_count.rates(),
            status_count,
        }
    }

    pub fn with_before(mut self, fixture: TestFixture) -> Self {
        self.before_group = fixture;
        self
    }

    pub fn with_after(mut self, fixture: TestFixture) -> Self {
        self.after_group = fixture;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestClass {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub run_mode: RunMode,
    pub timing: Timing,
    pub before_class: TestFixture,
    pub after_class: TestFixture,
    pub test_groups: Vec<TestGroup>,
    pub status_count: StatusCount,
    pub rates: Rates,
}

impl TestClass {
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        test_groups: Vec<TestGroup>,
    ) -> Self {
        let status_count = StatusCount::sum(test_groups.iter().map(|g| &g.status_count));
        Self {
            name: name.into(),
            full_name: full_name.into(),
            description: None,
            run_mode: RunMode::default(),
            timing: Timing::default(),
            before_class: TestFixture::empty(FixtureType::BeforeClass),
            after_class: TestFixture::empty(FixtureType::AfterClass),
            test_groups,
            rates: status_count.rates(),
            status_count,
        }
    }

    pub fn with_before(mut self, fixture: TestFixture) -> Self {
        self.before_class = fixture;
        self
    }

    pub fn with_after(mut self, fixture: TestFixture) -> Self {
        self.after_class = fixture;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestSuite {
    pub name: String,
    pub full_name: String,
    pub timing: Timing,
    pub before_suite: TestFixture,
    pub after_suite: TestFixture,
    pub test_classes: Vec<TestClass>,
    pub status_count: StatusCount,
    pub rates: Rates,
}

impl TestSuite {
    pub fn new(name: impl Into<String>, test_classes: Vec<TestClass>) -> Self {
        let name = name.into();
        let status_count = StatusCount::sum(test_classes.iter().map(|c| &c.status_count));
        Self {
            full_name: name.clone(),
            name,
            timing: Timing::default(),
            before_suite: TestFixture::empty(FixtureType::BeforeSuite),
            after_suite: TestFixture::empty(FixtureType::AfterSuite),
            test_classes,
            rates: status_count.rates(),
            status_count,
        }
    }

    pub fn with_before(mut self, fixture: TestFixture) -> Self {
        self.before_suite = fixture;
        self
    }

    pub fn with_after(mut self, fixture: TestFixture) -> Self {
        self.after_suite = fixture;
        self
    }

    pub fn resolve(&self, source: &SourceRef) -> Option<NodeRef<'_>> {
        let Some(class_idx) = source.class else {
            return Some(match source.fixture {
                Some(FixtureSlot::Before) => NodeRef::Fixture(&self.before_suite),
                Some(FixtureSlot::After) => NodeRef::Fixture(&self.after_suite),
                None => NodeRef::Suite(self),
            });
        };
        let class = self.test_classes.get(class_idx)?;
        let Some(group_idx) = source.group else {
            return Some(match source.fixture {
                Some(FixtureSlot::Before) => NodeRef::Fixture(&class.before_class),
                Some(FixtureSlot::After) => NodeRef::Fixture(&class.after_class),
                None => NodeRef::Class(class),
            });
        };
        let group = class.test_groups.get(group_idx)?;
        let Some(case_idx) = source.case else {
            return Some(match source.fixture {
                Some(FixtureSlot::Before) => NodeRef::Fixture(&group.before_group),
                Some(FixtureSlot::After) => NodeRef::Fixture(&group.after_group),
                None => NodeRef::Group(group),
            });
        };
        let case = group.test_cases.get(case_idx)?;
        Some(match source.fixture {
            Some(FixtureSlot::Before) => NodeRef::Fixture(&case.before_method),
            Some(FixtureSlot::After) => NodeRef::Fixture(&case.after_method),
            None => NodeRef::Case(case),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Suite,
    Class,
    Group,
    Case,
    Fixture,
}

impl NodeKind {
    pub fn is_branch(self) -> bool {
        matches!(self, NodeKind::Suite | NodeKind::Class | NodeKind::Group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureSlot {
    Before,
    After,
}

/// Index path from the suite root to a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceRef {
    pub class: Option<usize>,
    pub group: Option<usize>,
    pub case: Option<usize>,
    /// Set when the path ends at the before/after fixture of the addressed container.
    pub fixture: Option<FixtureSlot>,
}

impl SourceRef {
    pub fn suite() -> Self {
        Self::default()
    }

    pub fn class(class: usize) -> Self {
        Self {
            class: Some(class),
            ..Self::default()
        }
    }

    pub fn group(class: usize, group: usize) -> Self {
        Self {
            group: Some(group),
            ..Self::class(class)
        }
    }

    pub fn case(class: usize, group: usize, case: usize) -> Self {
        Self {
            case: Some(case),
            ..Self::group(class, group)
        }
    }

    pub fn fixture(self, slot: FixtureSlot) -> Self {
        Self {
            fixture: Some(slot),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Suite(&'a TestSuite),
    Class(&'a TestClass),
    Group(&'a TestGroup),
    Case(&'a TestCase),
    Fixture(&'a TestFixture),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Suite(_) => NodeKind::Suite,
            NodeRef::Class(_) => NodeKind::Class,
            NodeRef::Group(_) => NodeKind::Group,
            NodeRef::Case(_) => NodeKind::Case,
            NodeRef::Fixture(_) => NodeKind::Fixture,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            NodeRef::Suite(s) => &s.name,
            NodeRef::Class(c) => &c.name,
            NodeRef::Group(g) => &g.name,
            NodeRef::Case(c) => &c.name,
            NodeRef::Fixture(f) => &f.name,
        }
    }

    pub fn full_name(&self) -> &'a str {
        match self {
            NodeRef::Suite(s) => &s.full_name,
            NodeRef::Class(c) => &c.full_name,
            NodeRef::Group(g) => &g.full_name,
            NodeRef::Case(c) => &c.full_name,
            NodeRef::Fixture(f) => &f.full_name,
        }
    }

    /// Leaf status; branches have none.
    pub fn status(&self) -> Option<Status> {
        match self {
            NodeRef::Case(c) => Some(c.status),
            NodeRef::Fixture(f) => f.status,
            NodeRef::Suite(_) | NodeRef::Class(_) | NodeRef::Group(_) => None,
        }
    }

    /// Fixtures carry no count.
    pub fn status_count(&self) -> Option<&'a StatusCount> {
        match self {
            NodeRef::Suite(s) => Some(&s.status_count),
            NodeRef::Class(c) => Some(&c.status_count),
            NodeRef::Group(g) => Some(&g.status_count),
            NodeRef::Case(c) => Some(&c.status_count),
            NodeRef::Fixture(_) => None,
        }
    }

    pub fn timing(&self) -> &'a Timing {
        match self {
            NodeRef::Suite(s) => &s.timing,
            NodeRef::Class(c) => &c.timing,
            NodeRef::Group(g) => &g.timing,
            NodeRef::Case(c) => &c.timing,
            NodeRef::Fixture(f) => &f.timing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str, status: Status) -> TestCase {
        TestCase::new(
            name,
            format!("mod.C.{name}"),
            TestFixture::new(FixtureType::Test, name, format!("mod.C.{name}"), status),
        )
        .unwrap()
    }

    #[test]
    fn single_count_has_one_in_bucket() {
        let c = StatusCount::single(Status::Failed);
        assert_eq!(c.total, 1);
        assert_eq!(c.failed, 1);
        assert_eq!(c.passed + c.skipped, 0);
    }

    #[test]
    fn group_sums_children() {
        let group = TestGroup::new(
            "g",
            "mod.C.g",
            vec![
                case("a", Status::Passed),
                case("b", Status::Failed),
                case("c", Status::Skipped),
                case("d", Status::Passed),
            ],
        );
        assert_eq!(
            group.status_count,
            StatusCount {
                total: 4,
                passed: 2,
                failed: 1,
                skipped: 1
            }
        );
        assert!(group.status_count.is_consistent());
    }

    #[test]
    fn rates_sum_to_hundred() {
        let count = StatusCount {
            total: 8,
            passed: 0,
            failed: 1,
            skipped: 7,
        };
        let rates = count.rates();
        assert!((rates.sum() - 100.0).abs() < 1e-9);
        assert!((rates.fail - 12.5).abs() < 1e-9);
    }

    #[test]
    fn rates_zero_when_empty() {
        assert_eq!(StatusCount::default().rates(), Rates::default());
    }

    #[test]
    fn case_status_follows_test_fixture() {
        let c = case("x", Status::Skipped);
        assert_eq!(c.status, Status::Skipped);
        assert_eq!(c.status_count, StatusCount::single(Status::Skipped));
    }

    #[test]
    fn case_rejects_empty_or_statusless_test() {
        let err = TestCase::new("x", "mod.C.x", TestFixture::empty(FixtureType::Test)).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("mod.C.x"), "{err}");

        let mut no_status = TestFixture::new(FixtureType::Test, "x", "mod.C.x", Status::Passed);
        no_status.status = None;
        assert!(TestCase::new("x", "mod.C.x", no_status)
            .unwrap_err()
            .is_malformed());

        let wrong = TestFixture::new(FixtureType::BeforeMethod, "x", "mod.C.x", Status::Passed);
        assert!(TestCase::new("x", "mod.C.x", wrong).is_err());
    }

    #[test]
    fn tags_are_deduplicated_in_order() {
        let c = case("x", Status::Passed).with_tags(vec![
            "smoke".into(),
            "ui".into(),
            "smoke".into(),
        ]);
        assert_eq!(c.tags, vec!["smoke".to_string(), "ui".to_string()]);
    }

    #[test]
    fn resolve_walks_index_path() {
        let suite = TestSuite::new(
            "suite",
            vec![TestClass::new(
                "C",
                "mod.C",
                vec![TestGroup::new("g", "mod.C.g", vec![case("a", Status::Passed)])],
            )
            .with_before(TestFixture::new(
                FixtureType::BeforeClass,
                "setup",
                "mod.C.setup",
                Status::Passed,
            ))],
        );
        assert!(matches!(suite.resolve(&SourceRef::suite()), Some(NodeRef::Suite(_))));
        assert!(matches!(
            suite.resolve(&SourceRef::case(0, 0, 0)),
            Some(NodeRef::Case(c)) if c.name == "a"
        ));
        assert!(matches!(
            suite.resolve(&SourceRef::class(0).fixture(FixtureSlot::Before)),
            Some(NodeRef::Fixture(f)) if f.name == "setup"
        ));
        assert!(suite.resolve(&SourceRef::class(3)).is_none());
        assert!(suite.resolve(&SourceRef::case(0, 0, 9)).is_none());
    }
}
