use serde::{Deserialize, Serialize};
use std::fmt;

/// Grade of one health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Warn,
    Fail,
    Info,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
            Status::Info => "INFO",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Stable identifier, e.g. `stalled_ships`.
    pub id: String,
    pub status: Status,
    pub message: String,
}

impl CheckResult {
    pub fn new(id: &str, status: Status, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReportItem {
    /// Plain line.
    Line(String),
    Check(CheckResult),
    /// Supporting detail; renderers may dim it.
    Detail(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub items: Vec<ReportItem>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.items.push(ReportItem::Line(text.into()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    pub fn check(&mut self, result: CheckResult) -> &mut Self {
        self.items.push(ReportItem::Check(result));
        self
    }

    pub fn detail(&mut self, text: impl Into<String>) -> &mut Self {
        self.items.push(ReportItem::Detail(text.into()));
        self
    }

    pub fn checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.items.iter().filter_map(|item| match item {
            ReportItem::Check(c) => Some(c),
            _ => None,
        })
    }
}

/// Ordered sections, ready for a renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub sections: Vec<Section>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn extend(&mut self, other: Report) {
        self.sections.extend(other.sections);
    }

    pub fn checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.sections.iter().flat_map(Section::checks)
    }

    pub fn check(&self, id: &str) -> Option<&CheckResult> {
        self.checks().find(|c| c.id == id)
    }

    /// Worst grade present, ignoring INFO.
    pub fn worst(&self) -> Status {
        let mut worst = Status::Pass;
        for c in self.checks() {
            match c.status {
                Status::Fail => return Status::Fail,
                Status::Warn => worst = Status::Warn,
                _ => {}
            }
        }
        worst
    }
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
