use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag carried by every GalaxyTrader log line (`[GT-AI]`, `[GT-Lock]`, ...).
pub const MOD_TAG_PREFIX: &str = "[GT-";

/// Prefix of the mod's init/settings lines.
pub const MOD_BANNER: &str = "[GalaxyTrader MK3]";

/// The engine's only severity tag. Lua has no other log level, so info and
/// warnings arrive under it too.
pub const ERROR_TAG: &str = "[=ERROR=]";

// ── Ship identifier ──

/// Ship code as printed by the game: three uppercase letters, a hyphen and
/// three digits (`ABC-123`). Identity is plain text equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipId(String);

impl ShipId {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        if !Self::is_valid(s) {
            anyhow::bail!("not a ship id: {s:?}");
        }
        Ok(Self(s.to_string()))
    }

    pub fn is_valid(s: &str) -> bool {
        let b = s.as_bytes();
        b.len() == 7
            && b[..3].iter().all(u8::is_ascii_uppercase)
            && b[3] == b'-'
            && b[4..].iter().all(u8::is_ascii_digit)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Categories ──

/// Closed set of event categories a line can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    RequestSent,
    OrderCreated,
    NoTradeFound,
    Timeout,
    AllRejected,
    QueueBusy,
    HomeDeny,
    LockAcquired,
    LockReleased,
    BestTradeSelected,
    ClaimSwitch,
    Threat,
    ShipDestroyed,
    FundsBlockedMd,
    FundsBlockedAi,
    FundsGateSkip,
    FundsCapSkip,
    FundsCapCleared,
    FundsWait,
    Error,
    PropertyLookupFail,
    Critical,
}

impl Category {
    pub const ALL: [Category; 22] = [
        Category::RequestSent,
        Category::OrderCreated,
        Category::NoTradeFound,
        Category::Timeout,
        Category::AllRejected,
        Category::QueueBusy,
        Category::HomeDeny,
        Category::LockAcquired,
        Category::LockReleased,
        Category::BestTradeSelected,
        Category::ClaimSwitch,
        Category::Threat,
        Category::ShipDestroyed,
        Category::FundsBlockedMd,
        Category::FundsBlockedAi,
        Category::FundsGateSkip,
        Category::FundsCapSkip,
        Category::FundsCapCleared,
        Category::FundsWait,
        Category::Error,
        Category::PropertyLookupFail,
        Category::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::RequestSent => "request-sent",
            Category::OrderCreated => "order-created",
            Category::NoTradeFound => "no-trade-found",
            Category::Timeout => "timeout",
            Category::AllRejected => "all-rejected",
            Category::QueueBusy => "queue-busy",
            Category::HomeDeny => "home-deny",
            Category::LockAcquired => "lock-acquired",
            Category::LockReleased => "lock-released",
            Category::BestTradeSelected => "best-trade-selected",
            Category::ClaimSwitch => "claim-switch",
            Category::Threat => "threat",
            Category::ShipDestroyed => "ship-destroyed",
            Category::FundsBlockedMd => "funds-blocked-md",
            Category::FundsBlockedAi => "funds-blocked-ai",
            Category::FundsGateSkip => "funds-gate-skip",
            Category::FundsCapSkip => "funds-cap-skip",
            Category::FundsCapCleared => "funds-cap-cleared",
            Category::FundsWait => "funds-wait",
            Category::Error => "error",
            Category::PropertyLookupFail => "property-lookup-fail",
            Category::Critical => "critical",
        }
    }

    /// Categories evaluated on every line, mod-tagged or not.
    pub fn is_diagnostic(self) -> bool {
        matches!(
            self,
            Category::Error | Category::PropertyLookupFail | Category::Critical
        )
    }

    pub fn is_funds(self) -> bool {
        matches!(
            self,
            Category::FundsBlockedMd
                | Category::FundsBlockedAi
                | Category::FundsGateSkip
                | Category::FundsCapSkip
                | Category::FundsCapCleared
                | Category::FundsWait
        )
    }

    /// Events that close an open trade request.
    pub fn is_terminal(self) -> bool {
        matches!(self, Category::OrderCreated | Category::NoTradeFound)
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown category: {s}"))
    }
}

/// Set of categories matched by one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySet(u32);

impl CategorySet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, c: Category) {
        self.0 |= c.bit();
    }

    pub fn contains(&self, c: Category) -> bool {
        self.0 & c.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn union(self, other: CategorySet) -> CategorySet {
        CategorySet(self.0 | other.0)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = CategorySet::new();
        for c in iter {
            set.insert(c);
        }
        set
    }
}

// ── Log line ──

/// One raw line with its game-time timestamp, if it carries one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLine<'a> {
    pub text: &'a str,
    pub timestamp: Option<Timestamp<'a>>,
}

/// Game time in seconds since session start, plus the literal text it was
/// parsed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamp<'a> {
    pub secs: f64,
    pub literal: &'a str,
}

/// True if the line belongs to the mod: either tagged or one of the
/// request/response signal names the MD side prints untagged.
pub fn is_mod_relevant(line: &str) -> bool {
    line.contains(MOD_TAG_PREFIX)
        || line.contains("GT_Find_")
        || line.contains("GT_No_Trade")
        || line.contains("GT_Trade")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ship_id_validation() {
        assert!(ShipId::is_valid("ABC-123"));
        assert!(!ShipId::is_valid("abc-123"));
        assert!(!ShipId::is_valid("ABC-12"));
        assert!(!ShipId::is_valid("ABCD-123"));
        assert!(!ShipId::is_valid("ABC_123"));
        assert!(ShipId::parse("XYZ-999").is_ok());
        assert!(ShipId::parse("XYZ-99a").is_err());
    }

    #[test]
    fn ship_id_serializes_as_plain_string() {
        let id = ShipId::parse("KLM-042").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"KLM-042\"");
    }

    #[test]
    fn category_names_round_trip() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
        assert!("bogus".parse::<Category>().is_err());
    }

    #[test]
    fn category_set_basics() {
        let mut set = CategorySet::new();
        assert!(set.is_empty());
        set.insert(Category::Timeout);
        set.insert(Category::Critical);
        set.insert(Category::Timeout);
        assert_eq!(set.len(), 2);
        assert!(set.contains(Category::Timeout));
        assert!(!set.contains(Category::Error));
        let listed: Vec<_> = set.iter().collect();
        assert_eq!(listed, vec![Category::Timeout, Category::Critical]);
    }

    #[test]
    fn mod_relevance() {
        assert!(is_mod_relevant("[Scripts] 1.00 *** [GT-AI] ABC-123 idle"));
        assert!(is_mod_relevant("SENDING GT_Find_Trade"));
        assert!(is_mod_relevant("signal GT_No_Trade_Found raised"));
        assert!(!is_mod_relevant("[General] 0.00 Loading textures"));
    }
}
