//! Decodes an exported result tree (JSON) into the model.
//!
//! Every node carries a `type` tag. Required fields are checked here so that the
//! rendering side never sees a half-populated node; the first violation rejects the
//! whole document.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::error::Category;

use crate::error::ReportError;
use crate::model::{
    FailureInfo, FixtureType, LogEntry, RunMode, Status, TestCase, TestClass, TestFixture,
    TestGroup, TestSuite, Timing,
};

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawNode {
    TestSuite(RawSuite),
    TestClass(RawClass),
    TestGroup(RawGroup),
    TestCase(RawCase),
    TestFixture(RawFixture),
    #[serde(other)]
    Unknown,
}

impl RawNode {
    fn tag(&self) -> &'static str {
        match self {
            RawNode::TestSuite(_) => "testsuite",
            RawNode::TestClass(_) => "testclass",
            RawNode::TestGroup(_) => "testgroup",
            RawNode::TestCase(_) => "testcase",
            RawNode::TestFixture(_) => "testfixture",
            RawNode::Unknown => "unknown",
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawTiming {
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    elapsed_time: Option<f64>,
}

impl From<RawTiming> for Timing {
    fn from(raw: RawTiming) -> Self {
        Timing {
            start_time: raw.start_time,
            end_time: raw.end_time,
            elapsed_time: raw.elapsed_time,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSuite {
    name: Option<String>,
    full_name: Option<String>,
    #[serde(flatten)]
    timing: RawTiming,
    before_suite: Option<Box<RawNode>>,
    after_suite: Option<Box<RawNode>>,
    test_classes: Option<Vec<RawNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClass {
    name: Option<String>,
    full_name: Option<String>,
    description: Option<String>,
    run_mode: Option<RunMode>,
    #[serde(flatten)]
    timing: RawTiming,
    before_class: Option<Box<RawNode>>,
    after_class: Option<Box<RawNode>>,
    test_groups: Option<Vec<RawNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroup {
    name: Option<String>,
    full_name: Option<String>,
    #[serde(flatten)]
    timing: RawTiming,
    before_group: Option<Box<RawNode>>,
    after_group: Option<Box<RawNode>>,
    test_cases: Option<Vec<RawNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCase {
    name: Option<String>,
    full_name: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    group: Option<String>,
    description: Option<String>,
    #[serde(flatten)]
    timing: RawTiming,
    before_method: Option<Box<RawNode>>,
    test: Option<Box<RawNode>>,
    after_method: Option<Box<RawNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFixture {
    fixture_type: Option<FixtureType>,
    #[serde(default)]
    is_empty: bool,
    status: Option<Status>,
    name: Option<String>,
    full_name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    logs: Vec<LogEntry>,
    screenshot: Option<String>,
    #[serde(flatten)]
    timing: RawTiming,
    failure_message: Option<String>,
    failure_type: Option<String>,
    stack_trace: Option<String>,
    skip_message: Option<String>,
}

/// Parse a result tree document. The top-level node must be a `testsuite`.
pub fn parse_report(json: &str) -> Result<TestSuite, ReportError> {
    let root: RawNode = serde_json::from_str(json).map_err(classify_json_error)?;
    let suite = match root {
        RawNode::TestSuite(raw) => convert_suite(raw)?,
        RawNode::Unknown => {
            return Err(ReportError::UnknownVariant {
                path: "<root>".to_string(),
            })
        }
        other => {
            return Err(ReportError::malformed(
                "<root>",
                format!("expected testsuite, found {}", other.tag()),
            ))
        }
    };
    tracing::info!(
        suite = %suite.full_name,
        classes = suite.test_classes.len(),
        total = suite.status_count.total,
        passed = suite.status_count.passed,
        failed = suite.status_count.failed,
        skipped = suite.status_count.skipped,
        "loaded result tree"
    );
    Ok(suite)
}

/// Read and parse a result tree file.
pub fn load_report(path: &Path) -> Result<TestSuite, ReportError> {
    let json = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_report(&json).inspect_err(|e| {
        tracing::warn!("rejected report {}: {e}", path.display());
    })
}

/// Type mismatches and missing `type` tags are shape problems; broken syntax is not.
fn classify_json_error(err: serde_json::Error) -> ReportError {
    match err.classify() {
        Category::Data => ReportError::malformed(
            format!("line {} column {}", err.line(), err.column()),
            err.to_string(),
        ),
        Category::Io | Category::Syntax | Category::Eof => ReportError::Json(err),
    }
}

fn required(value: Option<String>, path: &str, field: &str) -> Result<String, ReportError> {
    value.ok_or_else(|| ReportError::malformed(path, format!("missing required field `{field}`")))
}

fn convert_suite(raw: RawSuite) -> Result<TestSuite, ReportError> {
    let name = required(raw.name, "<root>", "name")?;
    let path = raw.full_name.clone().unwrap_or_else(|| name.clone());
    let classes = raw
        .test_classes
        .ok_or_else(|| ReportError::malformed(&path, "missing required field `testClasses`"))?
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let child_path = format!("{path}.testClasses[{i}]");
            match node {
                RawNode::TestClass(c) => convert_class(c, &child_path),
                other => Err(wrong_variant(&child_path, "testclass", &other)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut suite = TestSuite::new(name, classes)
        .with_before(convert_fixture(raw.before_suite, FixtureType::BeforeSuite, &path)?)
        .with_after(convert_fixture(raw.after_suite, FixtureType::AfterSuite, &path)?);
    if let Some(full_name) = raw.full_name {
        suite.full_name = full_name;
    }
    suite.timing = raw.timing.into();
    Ok(suite)
}

fn convert_class(raw: RawClass, path: &str) -> Result<TestClass, ReportError> {
    let name = required(raw.name, path, "name")?;
    let full_name = required(raw.full_name, path, "fullName")?;
    let groups = raw
        .test_groups
        .ok_or_else(|| ReportError::malformed(&full_name, "missing required field `testGroups`"))?
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let child_path = format!("{full_name}.testGroups[{i}]");
            match node {
                RawNode::TestGroup(g) => convert_group(g, &child_path),
                other => Err(wrong_variant(&child_path, "testgroup", &other)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let before = convert_fixture(raw.before_class, FixtureType::BeforeClass, &full_name)?;
    let after = convert_fixture(raw.after_class, FixtureType::AfterClass, &full_name)?;
    let mut class = TestClass::new(name, full_name, groups)
        .with_before(before)
        .with_after(after);
    class.description = raw.description;
    class.run_mode = raw.run_mode.unwrap_or_default();
    class.timing = raw.timing.into();
    Ok(class)
}

fn convert_group(raw: RawGroup, path: &str) -> Result<TestGroup, ReportError> {
    let name = required(raw.name, path, "name")?;
    let full_name = required(raw.full_name, path, "fullName")?;
    let cases = raw
        .test_cases
        .ok_or_else(|| ReportError::malformed(&full_name, "missing required field `testCases`"))?
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let child_path = format!("{full_name}.testCases[{i}]");
            match node {
                RawNode::TestCase(c) => convert_case(c, &child_path),
                other => Err(wrong_variant(&child_path, "testcase", &other)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let before = convert_fixture(raw.before_group, FixtureType::BeforeGroup, &full_name)?;
    let after = convert_fixture(raw.after_group, FixtureType::AfterGroup, &full_name)?;
    let mut group = TestGroup::new(name, full_name, cases)
        .with_before(before)
        .with_after(after);
    group.timing = raw.timing.into();
    Ok(group)
}

fn convert_case(raw: RawCase, path: &str) -> Result<TestCase, ReportError> {
    let name = required(raw.name, path, "name")?;
    let full_name = required(raw.full_name, path, "fullName")?;
    let Some(test_node) = raw.test else {
        return Err(ReportError::malformed(&full_name, "missing required field `test`"));
    };
    let test = convert_fixture(Some(test_node), FixtureType::Test, &full_name)?;
    let before = convert_fixture(raw.before_method, FixtureType::BeforeMethod, &full_name)?;
    let after = convert_fixture(raw.after_method, FixtureType::AfterMethod, &full_name)?;
    let mut case = TestCase::new(name, full_name, test)?
        .with_tags(raw.tags)
        .with_before(before)
        .with_after(after);
    case.group = raw.group;
    case.description = raw.description;
    case.timing = raw.timing.into();
    Ok(case)
}

/// An absent before/after fixture is treated as empty. The slot decides the expected type.
fn convert_fixture(
    node: Option<Box<RawNode>>,
    slot: FixtureType,
    owner: &str,
) -> Result<TestFixture, ReportError> {
    let path = format!("{owner}@{}", slot.as_str());
    let raw = match node.map(|n| *n) {
        None => return Ok(TestFixture::empty(slot)),
        Some(RawNode::TestFixture(raw)) => raw,
        Some(other) => return Err(wrong_variant(&path, "testfixture", &other)),
    };

    if let Some(declared) = raw.fixture_type {
        if declared != slot {
            return Err(ReportError::malformed(
                &path,
                format!("fixtureType `{}` in `{}` slot", declared.as_str(), slot.as_str()),
            ));
        }
    }
    if raw.is_empty {
        return Ok(TestFixture::empty(slot));
    }

    let status = raw
        .status
        .ok_or_else(|| ReportError::malformed(&path, "missing required field `status`"))?;
    let name = required(raw.name, &path, "name")?;
    let full_name = raw.full_name.unwrap_or_else(|| format!("{owner}.{name}"));

    let mut fixture = TestFixture::new(slot, name, full_name, status)
        .with_logs(raw.logs)
        .with_timing(raw.timing.into());
    fixture.description = raw.description;
    fixture.screenshot = raw.screenshot.filter(|s| !s.is_empty());
    fixture.failure = raw.failure_message.map(|message| FailureInfo {
        message,
        kind: raw.failure_type,
        stack_trace: raw.stack_trace,
    });
    fixture.skip_message = raw.skip_message.filter(|s| !s.is_empty());
    Ok(fixture)
}

fn wrong_variant(path: &str, expected: &str, found: &RawNode) -> ReportError {
    match found {
        RawNode::Unknown => ReportError::UnknownVariant {
            path: path.to_string(),
        },
        other => {
            ReportError::malformed(path, format!("expected {expected}, found {}", other.tag()))
        }
    }
}
