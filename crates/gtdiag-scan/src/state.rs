use gtdiag_core::{percentile, Category, ShipId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::modinfo::{ModInfo, SessionHeader};

/// Trailing slice of game time treated as "recent".
pub const RECENT_WINDOW_SECS: f64 = 300.0;

pub const ERROR_SAMPLE_CAP: usize = 200;
pub const PROPERTY_LOOKUP_SAMPLE_CAP: usize = 50;
pub const CRITICAL_SAMPLE_CAP: usize = 50;

pub const DEFAULT_TAIL_LINES: usize = 500;

// ── Options ──

/// How many mod-relevant lines to keep for the end of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    All,
    Last(usize),
}

impl Default for TailPolicy {
    fn default() -> Self {
        TailPolicy::Last(DEFAULT_TAIL_LINES)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOptions {
    #[serde(default)]
    pub tail: TailPolicy,
}

// ── Buffers ──

/// Insertion-ordered sample of lines, capped. Overflow is dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleBuffer {
    cap: usize,
    lines: Vec<String>,
}

impl SampleBuffer {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap,
            lines: Vec::new(),
        }
    }

    /// Returns false if the buffer was already full.
    pub fn push(&mut self, line: &str) -> bool {
        if self.lines.len() >= self.cap {
            return false;
        }
        self.lines.push(line.to_string());
        true
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

/// Last mod-relevant lines seen, for context at the end of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailBuffer {
    policy: TailPolicy,
    lines: VecDeque<String>,
}

impl TailBuffer {
    pub fn new(policy: TailPolicy) -> Self {
        Self {
            policy,
            lines: VecDeque::new(),
        }
    }

    pub fn push(&mut self, line: &str) {
        match self.policy {
            TailPolicy::All => {}
            TailPolicy::Last(0) => return,
            TailPolicy::Last(n) => {
                while self.lines.len() >= n {
                    self.lines.pop_front();
                }
            }
        }
        self.lines.push_back(line.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ── Funds ──

/// One funds-related event for a ship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundsEvent {
    pub timestamp: Option<f64>,
    pub kind: Category,
    pub money: Option<i64>,
    pub cost: Option<i64>,
}

// ── Recent window ──

/// Per-ship counts for events inside the trailing window.
///
/// Membership is decided when the event is seen, against the largest
/// timestamp seen up to that point, not against the final timestamp of the
/// file. An event early in a file that later jumps far ahead still counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecentCounters {
    pub no_trade: BTreeMap<ShipId, u64>,
    pub rejected: BTreeMap<ShipId, u64>,
    pub timeout: BTreeMap<ShipId, u64>,
}

impl RecentCounters {
    pub fn is_empty(&self) -> bool {
        self.no_trade.is_empty() && self.rejected.is_empty() && self.timeout.is_empty()
    }
}

/// True if `ts` falls in `[max_ts - RECENT_WINDOW_SECS, max_ts]`.
pub fn in_recent_window(ts: f64, max_ts: f64) -> bool {
    ts >= max_ts - RECENT_WINDOW_SECS && ts <= max_ts
}

// ── Aggregate state ──

/// Everything one pass over a log produces. Built by
/// [`Aggregator`](crate::Aggregator) and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateState {
    pub total_lines: u64,
    pub mod_lines: u64,
    pub counts: BTreeMap<Category, u64>,

    pub first_ts: Option<f64>,
    /// Running maximum; equals the largest timestamp in the file once the
    /// pass is over.
    pub last_ts: Option<f64>,
    /// Parsed game time (shortest decimal form) → mod-relevant lines logged at
    /// that instant.
    pub ops_per_timestamp: BTreeMap<String, u64>,

    pub ship_ids: BTreeSet<ShipId>,
    pub home_sectors: BTreeSet<String>,
    /// Ship → time of its last trade request (0.0 if the line had no time).
    pub ships_with_request: BTreeMap<ShipId, f64>,
    pub ships_with_terminal: BTreeSet<ShipId>,
    pub recent: RecentCounters,

    pub error_lines: SampleBuffer,
    pub property_lookup_fails: SampleBuffer,
    pub critical_lines: SampleBuffer,

    pub funds_events_per_ship: BTreeMap<ShipId, Vec<FundsEvent>>,

    pub tail: TailBuffer,
    pub mod_info: ModInfo,
    pub session: SessionHeader,
}

/// Frame-load statistics derived from `ops_per_timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpsStats {
    pub peak: u64,
    pub p95: f64,
    pub avg: f64,
    pub unique_frames: usize,
}

impl AggregateState {
    pub fn new(options: &ScanOptions) -> Self {
        Self {
            total_lines: 0,
            mod_lines: 0,
            counts: BTreeMap::new(),
            first_ts: None,
            last_ts: None,
            ops_per_timestamp: BTreeMap::new(),
            ship_ids: BTreeSet::new(),
            home_sectors: BTreeSet::new(),
            ships_with_request: BTreeMap::new(),
            ships_with_terminal: BTreeSet::new(),
            recent: RecentCounters::default(),
            error_lines: SampleBuffer::with_cap(ERROR_SAMPLE_CAP),
            property_lookup_fails: SampleBuffer::with_cap(PROPERTY_LOOKUP_SAMPLE_CAP),
            critical_lines: SampleBuffer::with_cap(CRITICAL_SAMPLE_CAP),
            funds_events_per_ship: BTreeMap::new(),
            tail: TailBuffer::new(options.tail),
            mod_info: ModInfo::default(),
            session: SessionHeader::default(),
        }
    }

    pub fn count(&self, category: Category) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Game time between the first timestamp and the running maximum.
    pub fn duration_secs(&self) -> f64 {
        match (self.first_ts, self.last_ts) {
            (Some(first), Some(last)) => (last - first).max(0.0),
            _ => 0.0,
        }
    }

    /// Ships that sent a trade request and never got an order or a
    /// no-trade answer, with the time of their last request. Sorted by id.
    pub fn stalled_ships(&self) -> Vec<(&ShipId, f64)> {
        self.ships_with_request
            .iter()
            .filter(|(id, _)| !self.ships_with_terminal.contains(*id))
            .map(|(id, ts)| (id, *ts))
            .collect()
    }

    /// Acquired minus released. Positive means locks still held at the end
    /// of the log, which is either a leak or a search still in flight.
    pub fn unreleased_locks(&self) -> i64 {
        self.count(Category::LockAcquired) as i64 - self.count(Category::LockReleased) as i64
    }

    /// Orders created per request, in percent. `None` without requests.
    pub fn trade_success_rate(&self) -> Option<f64> {
        let requests = self.count(Category::RequestSent);
        if requests == 0 {
            return None;
        }
        Some(self.count(Category::OrderCreated) as f64 * 100.0 / requests as f64)
    }

    /// Claim switches per trade selection, in percent.
    pub fn claim_switch_rate(&self) -> Option<f64> {
        let selections = self.count(Category::BestTradeSelected);
        if selections == 0 {
            return None;
        }
        Some(self.count(Category::ClaimSwitch) as f64 * 100.0 / selections as f64)
    }

    pub fn funds_blocks_total(&self) -> u64 {
        self.count(Category::FundsBlockedMd) + self.count(Category::FundsBlockedAi)
    }

    pub fn ops_stats(&self) -> Option<OpsStats> {
        if self.ops_per_timestamp.is_empty() {
            return None;
        }
        let mut values: Vec<u64> = self.ops_per_timestamp.values().copied().collect();
        values.sort_unstable();
        let as_f64: Vec<f64> = values.iter().map(|v| *v as f64).collect();
        let sum: u64 = values.iter().sum();
        Some(OpsStats {
            peak: values.last().copied().unwrap_or(0),
            p95: percentile(&as_f64, 95.0),
            avg: sum as f64 / values.len() as f64,
            unique_frames: values.len(),
        })
    }
}
