use std::sync::LazyLock;

use regex::Regex;

use crate::types::Category;

/// Engine lines tagged `[=ERROR=]` that are not errors.
///
/// X4 routes every Lua `DebugError` call through the same tag, so mod load
/// banners and usage hints arrive looking like errors. Each entry is
/// `(name, pattern)`; add new benign messages here.
pub const FALSE_ERROR_PATTERNS: &[(&str, &str)] = &[
    ("separator", r"={10,}"),
    ("gt-lua-module", r"^\[=ERROR=\].*\[GT-Mods-Lua\]"),
    ("gt-context-menu", r"^\[=ERROR=\].*\[GT Context"),
    ("mod-init-banner", r"^\[=ERROR=\].*\bInit$"),
    ("module-loaded", r"^\[=ERROR=\].*\bModule\s+loaded"),
    ("registered-event", r"^\[=ERROR=\].*\bRegistered\s+event"),
    ("usage-hint", r"^\[=ERROR=\].*\bTo use:"),
    ("duplicate-md-file", r"^\[=ERROR=\].*\bSkipping MD file\b"),
    ("duplicate-addon", r"^\[=ERROR=\].*\bDuplicate addon\b"),
    ("missing-signature", r"^\[=ERROR=\].*\bCould not find signature file\b"),
    ("restricted-function", r"^\[=ERROR=\].*\bRestricted function\b"),
];

/// Event signatures for mod-relevant lines. One category may list several
/// alternatives; they are joined with `|`.
const EVENT_SIGNATURES: &[(Category, &[&str])] = &[
    (Category::RequestSent, &[r"SENDING GT_Find_(?:Trade|Sell)\b"]),
    (
        Category::OrderCreated,
        &[
            r"\bCreated (?:BUY|SELL) trade order\b",
            // No trailing \b: a boundary after ':' only holds when a word
            // character follows, which would skip the usual "created: 2".
            r"\bTrade orders created:",
            r"\bexecuting trade\b",
        ],
    ),
    (Category::NoTradeFound, &[r"GT_No_Trade_Found\b"]),
    (Category::Timeout, &[r"MD system response timeout\b"]),
    (Category::AllRejected, &[r"\bALL\s+\d+\s+trades.*were rejected"]),
    (
        Category::QueueBusy,
        &[r"Live search busy\s+\(active:\s+\d+/\d+\)\s+-\s+QUEUING"],
    ),
    (
        Category::HomeDeny,
        &[r"Home-sector live refresh already active.*denying live search"],
    ),
    (Category::LockAcquired, &[r"\[GT-Lock\].*LOCK ACQUIRED"]),
    (Category::LockReleased, &[r"\[GT-Lock\].*LOCK RELEASED"]),
    (Category::BestTradeSelected, &[r"BEST TRADE SELECTED:"]),
    (
        Category::ClaimSwitch,
        &[r"\[GT-Fleet\].*Best trade was already reserved.*switched"],
    ),
    (
        Category::Threat,
        &[
            r"\[GT-Threat\]",
            r"\[GT-Blacklist\]",
            r"CRITICAL THREAT",
            r"Ship destruction ignored",
        ],
    ),
    (
        Category::ShipDestroyed,
        &[r"CRITICAL THREAT", r"Ship destruction"],
    ),
    (Category::FundsBlockedMd, &[r"\[GT-Funds\].*BLOCKED \(MD\)"]),
    (Category::FundsBlockedAi, &[r"\[GT-Funds\].*BLOCKED \(AI\)"]),
    (Category::FundsGateSkip, &[r"(?i)\[GT-Funds\].*\bgate\b.*\bskip"]),
    (
        Category::FundsCapSkip,
        &[r"(?i)\[GT-Funds\].*\bcap reached\b.*\bskip"],
    ),
    (Category::FundsCapCleared, &[r"(?i)\[GT-Funds\].*\bcap cleared\b"]),
    (Category::FundsWait, &[r"(?i)\[GT-Funds\].*\bwaiting for funds\b"]),
];

/// One category signature.
#[derive(Debug)]
pub struct CategoryRule {
    pub category: Category,
    pub pattern: Regex,
}

/// One benign `[=ERROR=]` message shape.
#[derive(Debug)]
pub struct SuppressRule {
    pub name: &'static str,
    pub pattern: Regex,
}

/// Every compiled pattern the scanner uses, built once and shared by
/// reference.
#[derive(Debug)]
pub struct PatternTable {
    pub timestamp: Regex,
    pub event_rules: Vec<CategoryRule>,
    pub false_errors: Vec<SuppressRule>,
    pub property_lookup: Regex,
    pub critical: Regex,

    pub ship_gt_ai: Regex,
    pub ship_paren: Regex,
    pub ship_attr: Regex,
    pub ship_bare: Regex,

    pub home_base: Regex,
    pub home_sector_kv: Regex,

    pub money: Regex,
    pub cost: Regex,

    pub mod_init: Regex,
    pub mod_settings: Regex,
    pub mod_blacklist: Regex,
    pub blacklist_count: Regex,

    pub error_timestamp: Regex,
    pub error_prefix: Regex,
}

static SHARED: LazyLock<PatternTable> =
    LazyLock::new(|| PatternTable::compile().expect("built-in patterns are valid"));

impl PatternTable {
    /// The process-wide table.
    pub fn shared() -> &'static PatternTable {
        &SHARED
    }

    pub fn compile() -> Result<Self, regex::Error> {
        let event_rules = EVENT_SIGNATURES
            .iter()
            .map(|(category, alts)| {
                Ok(CategoryRule {
                    category: *category,
                    pattern: Regex::new(&alts.join("|"))?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let false_errors = FALSE_ERROR_PATTERNS
            .iter()
            .map(|&(name, pat)| {
                Ok(SuppressRule {
                    name,
                    pattern: Regex::new(pat)?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            timestamp: Regex::new(r"\[Scripts\]\s+(\d+\.\d+)\s+\*\*\*")?,
            event_rules,
            false_errors,
            property_lookup: Regex::new(r"(?i)Property lookup failed")?,
            critical: Regex::new(r"(?i)CRITICAL|EXCEPTION")?,

            ship_gt_ai: Regex::new(r"\[GT-AI\]\s+([A-Z]{3}-[0-9]{3})\b")?,
            ship_paren: Regex::new(r"\(([A-Z]{3}-[0-9]{3})\)")?,
            ship_attr: Regex::new(r"Ship=([A-Z]{3}-[0-9]{3})")?,
            ship_bare: Regex::new(r"\b([A-Z]{3}-[0-9]{3})\b")?,

            home_base: Regex::new(r"Operating with home base:\s+(?P<home>.+?)\s+\(maxbuy=")?,
            home_sector_kv: Regex::new(r"homeSector=(?P<home>.+?)(?:\s+[\w.]+\s*=|,|$)")?,

            money: Regex::new(r"\bmoney=(-?[0-9][0-9,_]*)")?,
            cost: Regex::new(r"\bcost=(-?[0-9][0-9,_]*)")?,

            mod_init: Regex::new(
                r"\[GalaxyTrader MK3\] INIT: Version=(\S+)\s+ContentVersion=(\S+)",
            )?,
            mod_settings: Regex::new(r"\[GalaxyTrader MK3\] SETTINGS\.(\S+?):\s+(.*)")?,
            mod_blacklist: Regex::new(r"\[GalaxyTrader MK3\] BLACKLISTED_SECTORS:\s+(.*)")?,
            blacklist_count: Regex::new(r"^Count=(\d+)")?,

            error_timestamp: Regex::new(r"\[=ERROR=\]\s+\d+\.\d+\s*")?,
            error_prefix: Regex::new(r"^.*?\[=ERROR=\]\s*")?,
        })
    }

    /// Name of the first suppression rule matching `line`, if any.
    pub fn false_error(&self, line: &str) -> Option<&'static str> {
        self.false_errors
            .iter()
            .find(|r| r.pattern.is_match(line))
            .map(|r| r.name)
    }
}
