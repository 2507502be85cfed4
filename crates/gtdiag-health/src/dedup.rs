use gtdiag_core::{truncate, PatternTable};
use serde::Serialize;
use std::collections::HashMap;

/// Width of a normalized error message.
pub const ERROR_MESSAGE_WIDTH: usize = 120;

pub const MOD_RELATED_LIMIT: usize = 15;
pub const OTHER_LIMIT: usize = 10;

const MOD_TOKENS: [&str; 2] = ["GT", "GalaxyTrader"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorGroup {
    pub message: String,
    pub count: u64,
}

/// Error groups split by origin, each sorted by descending count with ties
/// kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub mod_related: Vec<ErrorGroup>,
    pub other: Vec<ErrorGroup>,
}

impl ErrorSummary {
    pub fn is_empty(&self) -> bool {
        self.mod_related.is_empty() && self.other.is_empty()
    }

    pub fn unique(&self) -> usize {
        self.mod_related.len() + self.other.len()
    }
}

/// Strip the timestamp and everything up to the error tag, then truncate.
/// `None` when nothing is left.
pub fn normalize_error(table: &PatternTable, line: &str) -> Option<String> {
    let without_ts = table.error_timestamp.replace_all(line, "[=ERROR=] ");
    let msg = table.error_prefix.replace(&without_ts, "");
    let msg = msg.trim();
    if msg.is_empty() {
        return None;
    }
    Some(truncate(msg, ERROR_MESSAGE_WIDTH))
}

pub fn is_mod_related(message: &str) -> bool {
    MOD_TOKENS.iter().any(|t| message.contains(t))
}

pub fn dedup_errors<'a, I>(table: &PatternTable, lines: I) -> ErrorSummary
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: Vec<ErrorGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for line in lines {
        let Some(msg) = normalize_error(table, line) else {
            continue;
        };
        match index.get(&msg) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(msg.clone(), groups.len());
                groups.push(ErrorGroup {
                    message: msg,
                    count: 1,
                });
            }
        }
    }

    let (mut mod_related, mut other): (Vec<_>, Vec<_>) =
        groups.into_iter().partition(|g| is_mod_related(&g.message));
    // stable sort keeps first-seen order among equal counts
    mod_related.sort_by(|a, b| b.count.cmp(&a.count));
    other.sort_by(|a, b| b.count.cmp(&a.count));
    ErrorSummary { mod_related, other }
}
