//! Detail panel content for the selected node. Pure: the same node and config
//! always yield the same panel, and each render is a complete replacement.

use chrono::{DateTime, Utc};

use crate::config::ViewConfig;
use crate::format::format_positional;
use crate::model::{
    FixtureType, LogEntry, NodeKind, NodeRef, Status, StatusCount, TestCase, TestFixture, Timing,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Tags(Vec<String>),
    /// In recorded order.
    Logs(Vec<LogEntry>),
    /// `index` is 1-based across the whole panel.
    Screenshot { index: usize, path: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: FieldValue::Text(value.into()),
        }
    }

    fn optional(label: &'static str, value: Option<&str>) -> Self {
        Self::text(label, value.unwrap_or_default())
    }

    /// Rows this field occupies once laid out.
    fn line_count(&self) -> usize {
        match &self.value {
            FieldValue::Text(text) => text.lines().count().max(1),
            FieldValue::Logs(logs) => logs.len().max(1),
            FieldValue::Tags(_) | FieldValue::Screenshot { .. } => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixturePanel {
    /// `@<fixtureType>`
    pub heading: String,
    pub fixture_type: FixtureType,
    pub status: Option<Status>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    pub kind: NodeKind,
    pub header: String,
    pub status: Option<Status>,
    /// Container nodes show their own count.
    pub badges: Option<StatusCount>,
    pub fields: Vec<Field>,
    pub fixtures: Vec<FixturePanel>,
}

impl DetailPanel {
    pub fn field(&self, label: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| &f.value)
    }

    /// Screenshot paths in index order.
    pub fn screenshots(&self) -> Vec<&str> {
        self.fields
            .iter()
            .chain(self.fixtures.iter().flat_map(|p| p.fields.iter()))
            .filter_map(|f| match &f.value {
                FieldValue::Screenshot { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn screenshot(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.screenshots().get(i).copied())
    }

    /// Laid-out height: the header, every field row, and a spacer plus heading per fixture.
    pub fn line_count(&self) -> usize {
        let fields = |fields: &[Field]| fields.iter().map(Field::line_count).sum::<usize>();
        1 + fields(&self.fields)
            + self
                .fixtures
                .iter()
                .map(|p| 2 + fields(&p.fields))
                .sum::<usize>()
    }
}

pub fn render(node: NodeRef<'_>, config: &ViewConfig) -> DetailPanel {
    let mut r = Renderer {
        config,
        screenshots: 0,
    };
    match node {
        NodeRef::Case(case) => r.case(case),
        NodeRef::Fixture(fixture) => {
            let panel = r.fixture(fixture);
            DetailPanel {
                kind: NodeKind::Fixture,
                header: panel.heading,
                status: panel.status,
                badges: None,
                fields: panel.fields,
                fixtures: Vec::new(),
            }
        }
        NodeRef::Suite(suite) => {
            let fields = r.timing_fields(&suite.timing);
            r.container(node, fields, [&suite.before_suite, &suite.after_suite])
        }
        NodeRef::Class(class) => {
            let mut fields = r.timing_fields(&class.timing);
            fields.push(Field::text("Run Mode", class.run_mode.as_str()));
            fields.push(Field::optional("Description", class.description.as_deref()));
            r.container(node, fields, [&class.before_class, &class.after_class])
        }
        NodeRef::Group(group) => {
            let fields = r.timing_fields(&group.timing);
            r.container(node, fields, [&group.before_group, &group.after_group])
        }
    }
}

struct Renderer<'c> {
    config: &'c ViewConfig,
    screenshots: usize,
}

impl Renderer<'_> {
    fn case(&mut self, case: &TestCase) -> DetailPanel {
        let mut fields = vec![
            Field {
                label: "Tags",
                value: FieldValue::Tags(case.tags.clone()),
            },
            Field::optional("Group", case.group.as_deref()),
        ];
        fields.extend(self.timing_fields(&case.timing));
        fields.push(Field::optional("Description", case.description.as_deref()));

        let fixtures = [&case.before_method, &case.test, &case.after_method]
            .into_iter()
            .filter(|f| !f.is_empty)
            .map(|f| self.fixture(f))
            .collect();

        DetailPanel {
            kind: NodeKind::Case,
            header: case.full_name.clone(),
            status: Some(case.status),
            badges: None,
            fields,
            fixtures,
        }
    }

    fn container(
        &mut self,
        node: NodeRef<'_>,
        fields: Vec<Field>,
        fixtures: [&TestFixture; 2],
    ) -> DetailPanel {
        let fixtures = fixtures
            .into_iter()
            .filter(|f| !f.is_empty)
            .map(|f| self.fixture(f))
            .collect();
        DetailPanel {
            kind: node.kind(),
            header: node.full_name().to_string(),
            status: None,
            badges: node.status_count().copied(),
            fields,
            fixtures,
        }
    }

    fn fixture(&mut self, fixture: &TestFixture) -> FixturePanel {
        let mut fields = vec![
            Field::text("Full Name", fixture.full_name.as_str()),
            Field::text("Method Name", fixture.name.as_str()),
        ];
        fields.extend(self.timing_fields(&fixture.timing));
        fields.push(Field::optional("Description", fixture.description.as_deref()));
        fields.push(Field {
            label: "Logs",
            value: FieldValue::Logs(fixture.logs.clone()),
        });
        if let Some(failure) = &fixture.failure {
            let message = match &failure.kind {
                Some(kind) => format!("{kind}: {}", failure.message),
                None => failure.message.clone(),
            };
            fields.push(Field::text("Failure", message));
            if let Some(trace) = &failure.stack_trace {
                fields.push(Field::text("Stack Trace", trace.as_str()));
            }
        }
        if let Some(reason) = &fixture.skip_message {
            fields.push(Field::text("Skip Reason", reason.as_str()));
        }
        if let Some(path) = &fixture.screenshot {
            self.screenshots += 1;
            fields.push(Field {
                label: "Screenshot",
                value: FieldValue::Screenshot {
                    index: self.screenshots,
                    path: path.clone(),
                },
            });
        }

        FixturePanel {
            heading: format!("@{}", fixture.fixture_type.as_str()),
            fixture_type: fixture.fixture_type,
            status: fixture.status,
            fields,
        }
    }

    /// Always three rows; a missing value renders as an empty one.
    fn timing_fields(&self, timing: &Timing) -> Vec<Field> {
        let duration = timing.elapsed_time.map(|elapsed| {
            let secs = elapsed.to_string();
            format_positional(&self.config.labels.duration, &[Some(secs.as_str())])
        });
        vec![
            Field::text("Start Time", timing.start_time.map(format_time).unwrap_or_default()),
            Field::text("End Time", timing.end_time.map(format_time).unwrap_or_default()),
            Field::text("Duration", duration.unwrap_or_default()),
        ]
    }
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format(TIME_FORMAT).to_string()
}
