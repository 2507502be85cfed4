use crate::patterns::PatternTable;
use crate::types::{Category, CategorySet, LogLine, Timestamp, ERROR_TAG, MOD_TAG_PREFIX};

/// Classifies raw log lines against a [`PatternTable`].
///
/// Every category test is an independent predicate, so a line can match
/// several categories at once (a `CRITICAL THREAT` line is both a threat and
/// a ship destruction).
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'t> {
    table: &'t PatternTable,
}

impl Default for Classifier<'static> {
    fn default() -> Self {
        Self::new(PatternTable::shared())
    }
}

impl<'t> Classifier<'t> {
    pub fn new(table: &'t PatternTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t PatternTable {
        self.table
    }

    /// Read the `[Scripts] <secs> ***` marker, if present.
    pub fn timestamp<'a>(&self, line: &'a str) -> Option<Timestamp<'a>> {
        let caps = self.table.timestamp.captures(line)?;
        let literal = caps.get(1)?.as_str();
        let secs = literal.parse::<f64>().ok()?;
        Some(Timestamp { secs, literal })
    }

    pub fn parse_line<'a>(&self, text: &'a str) -> LogLine<'a> {
        LogLine {
            text,
            timestamp: self.timestamp(text),
        }
    }

    /// `[=ERROR=]` lines minus the benign ones on the denylist.
    pub fn is_error(&self, line: &str) -> bool {
        line.contains(ERROR_TAG) && self.table.false_error(line).is_none()
    }

    pub fn is_property_lookup_fail(&self, line: &str) -> bool {
        self.table.property_lookup.is_match(line)
    }

    /// Engine-level critical/exception lines. Mod-tagged lines are left out;
    /// the mod prints its own `CRITICAL THREAT` messages.
    pub fn is_critical(&self, line: &str) -> bool {
        self.table.critical.is_match(line) && !line.contains(MOD_TAG_PREFIX)
    }

    /// Categories evaluated on every line.
    pub fn diagnostics(&self, line: &str) -> CategorySet {
        let mut set = CategorySet::new();
        if self.is_error(line) {
            set.insert(Category::Error);
        }
        if self.is_property_lookup_fail(line) {
            set.insert(Category::PropertyLookupFail);
        }
        if self.is_critical(line) {
            set.insert(Category::Critical);
        }
        set
    }

    /// Mod event categories. Only meaningful for mod-relevant lines.
    pub fn events(&self, line: &str) -> CategorySet {
        self.table
            .event_rules
            .iter()
            .filter(|rule| rule.pattern.is_match(line))
            .map(|rule| rule.category)
            .collect()
    }

    /// Full classification: diagnostics plus events.
    pub fn classify(&self, line: &str) -> CategorySet {
        self.diagnostics(line).union(self.events(line))
    }
}
