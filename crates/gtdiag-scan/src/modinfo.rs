use gtdiag_core::{PatternTable, MOD_BANNER};
use serde::Serialize;
use std::collections::BTreeMap;

/// Only the first lines of the file carry the engine header.
pub const SESSION_HEADER_LINES: u64 = 30;

const LOGFILE_STARTED: &str = "Logfile started";
const GPU_VENDORS: [&str; 3] = ["NVIDIA", "AMD", "Intel"];

// ── Mod version & settings ──

/// What the mod prints about itself at game load. Later loads overwrite
/// earlier ones, so the values describe the most recent load in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModInfo {
    pub version: Option<String>,
    pub content_version: Option<String>,
    /// Settings category → raw `key=value key=value` text, unparsed.
    pub settings: BTreeMap<String, String>,
    /// Raw text after `BLACKLISTED_SECTORS:`.
    pub blacklist_raw: Option<String>,
}

impl ModInfo {
    pub fn observe(&mut self, table: &PatternTable, line: &str) {
        if !line.contains(MOD_BANNER) {
            return;
        }
        if let Some(caps) = table.mod_init.captures(line) {
            self.version = Some(caps[1].to_string());
            self.content_version = Some(caps[2].to_string());
        }
        if let Some(caps) = table.mod_settings.captures(line) {
            self.settings
                .insert(caps[1].to_string(), caps[2].trim().to_string());
        }
        if let Some(caps) = table.mod_blacklist.captures(line) {
            self.blacklist_raw = Some(caps[1].trim().to_string());
        }
    }

    pub fn blacklist(&self, table: &PatternTable) -> Option<Blacklist> {
        self.blacklist_raw
            .as_deref()
            .map(|raw| Blacklist::parse(table, raw))
    }
}

/// Parsed `Count=N | Sector(L1) Sector(L2)` snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Blacklist {
    pub count: u32,
    pub entries: Vec<String>,
}

impl Blacklist {
    /// A missing or unparsable `Count=` reads as zero; entries are whatever
    /// follows the first `|`.
    pub fn parse(table: &PatternTable, raw: &str) -> Self {
        let count = table
            .blacklist_count
            .captures(raw)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or(0);
        let entries = raw
            .split_once('|')
            .map(|(_, rest)| rest.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        Self { count, entries }
    }
}

// ── Session header ──

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionHeader {
    pub started: Option<String>,
    pub gpus: Vec<String>,
}

impl SessionHeader {
    /// Feed line `index` (0-based). Lines past the header are ignored.
    pub fn observe(&mut self, index: u64, line: &str) {
        if index >= SESSION_HEADER_LINES {
            return;
        }
        if index == 0 && line.starts_with(LOGFILE_STARTED) {
            let started = line
                .strip_prefix("Logfile started, time ")
                .unwrap_or(line)
                .trim();
            self.started = Some(started.to_string());
            return;
        }
        if line.contains("[General]") && GPU_VENDORS.iter().any(|v| line.contains(v)) {
            if let Some(name) = quoted(line) {
                self.gpus.push(name.to_string());
            }
        }
    }
}

/// First `'single-quoted'` run in the line.
fn quoted(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once('\'')?;
    let (inner, _) = rest.split_once('\'')?;
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static PatternTable {
        PatternTable::shared()
    }

    #[test]
    fn init_line() {
        let mut info = ModInfo::default();
        info.observe(
            table(),
            "[Scripts] 1.00 *** [GalaxyTrader MK3] INIT: Version=0.8.0.0 ContentVersion=0800",
        );
        assert_eq!(info.version.as_deref(), Some("0.8.0.0"));
        assert_eq!(info.content_version.as_deref(), Some("0800"));
    }

    #[test]
    fn settings_last_occurrence_wins() {
        let mut info = ModInfo::default();
        info.observe(table(), "[GalaxyTrader MK3] SETTINGS.Fleet: MaxShips=10 Reserve=5");
        info.observe(table(), "[GalaxyTrader MK3] SETTINGS.Debug: Level=1");
        info.observe(table(), "[GalaxyTrader MK3] SETTINGS.Fleet: MaxShips=20 Reserve=5  ");
        assert_eq!(info.settings.len(), 2);
        assert_eq!(info.settings["Fleet"], "MaxShips=20 Reserve=5");
        assert_eq!(info.settings["Debug"], "Level=1");
    }

    #[test]
    fn settings_line_without_colon_is_ignored() {
        let mut info = ModInfo::default();
        info.observe(table(), "[GalaxyTrader MK3] SETTINGS.Fleet MaxShips=10");
        assert!(info.settings.is_empty());
    }

    #[test]
    fn blacklist_parsing() {
        let mut info = ModInfo::default();
        info.observe(
            table(),
            "[GalaxyTrader MK3] BLACKLISTED_SECTORS: Count=2 | SavageSpurI(L3) FiresOfDefeat(L5)",
        );
        let bl = info.blacklist(table()).unwrap();
        assert_eq!(bl.count, 2);
        assert_eq!(bl.entries, vec!["SavageSpurI(L3)", "FiresOfDefeat(L5)"]);
    }

    #[test]
    fn blacklist_degrades_gracefully() {
        let bl = Blacklist::parse(table(), "garbage without count");
        assert_eq!(bl.count, 0);
        assert!(bl.entries.is_empty());

        let bl = Blacklist::parse(table(), "Count=0");
        assert_eq!(bl, Blacklist::default());
    }

    #[test]
    fn session_header() {
        let mut h = SessionHeader::default();
        h.observe(0, "Logfile started, time Sat Oct 10 18:22:01 2026");
        h.observe(3, "[General] 0.00 Using GPU 'NVIDIA GeForce RTX 4070' driver 560.1");
        h.observe(4, "[General] 0.00 Display mode 2560x1440");
        h.observe(40, "[General] 0.00 Fallback GPU 'AMD Radeon' (too late)");
        assert_eq!(h.started.as_deref(), Some("Sat Oct 10 18:22:01 2026"));
        assert_eq!(h.gpus, vec!["NVIDIA GeForce RTX 4070"]);
    }
}
