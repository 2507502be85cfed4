use gtdiag_core::{
    extract_home_sector, extract_money, extract_ship_id, is_mod_relevant, Category, CategorySet,
    Classifier, ShipId,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::cursor::LineCursor;
use crate::error::ScanError;
use crate::state::{in_recent_window, AggregateState, FundsEvent, SampleBuffer, ScanOptions};

/// Report reading progress every this many percent of the file.
const PROGRESS_STEP_PCT: u64 = 5;

/// Single forward pass over a log. Feed lines in file order with
/// [`push`](Self::push), then take the state with [`finish`](Self::finish).
pub struct Aggregator<'t> {
    classifier: Classifier<'t>,
    state: AggregateState,
    overflow_reported: CategorySet,
}

impl Aggregator<'static> {
    pub fn new(options: &ScanOptions) -> Self {
        Self::with_classifier(Classifier::default(), options)
    }
}

impl<'t> Aggregator<'t> {
    pub fn with_classifier(classifier: Classifier<'t>, options: &ScanOptions) -> Self {
        Self {
            classifier,
            state: AggregateState::new(options),
            overflow_reported: CategorySet::new(),
        }
    }

    pub fn push(&mut self, raw: &str) {
        let text = raw.trim_end();
        let line = self.classifier.parse_line(text);
        let table = self.classifier.table();
        let index = self.state.total_lines;
        self.state.total_lines += 1;

        let ts = line.timestamp;
        if let Some(t) = ts {
            self.state.first_ts.get_or_insert(t.secs);
            self.state.last_ts = Some(match self.state.last_ts {
                Some(max) => max.max(t.secs),
                None => t.secs,
            });
        }

        self.state.session.observe(index, text);
        self.state.mod_info.observe(table, text);

        for category in self.classifier.diagnostics(text).iter() {
            self.bump(category);
            self.sample(category, text);
        }

        if !is_mod_relevant(text) {
            return;
        }
        self.state.mod_lines += 1;

        if let Some(t) = ts {
            *self
                .state
                .ops_per_timestamp
                .entry(frame_key(t.secs))
                .or_insert(0) += 1;
        }
        self.state.tail.push(text);

        let ship = extract_ship_id(table, text);
        if let Some(id) = &ship {
            self.state.ship_ids.insert(id.clone());
        }
        if let Some(home) = extract_home_sector(table, text) {
            self.state.home_sectors.insert(home);
        }

        let events = self.classifier.events(text);
        if events.is_empty() {
            return;
        }
        for category in events.iter() {
            self.bump(category);
        }

        let Some(id) = ship else {
            return;
        };

        if events.contains(Category::RequestSent) {
            self.state
                .ships_with_request
                .insert(id.clone(), ts.map(|t| t.secs).unwrap_or(0.0));
        }
        if events.iter().any(Category::is_terminal) {
            self.state.ships_with_terminal.insert(id.clone());
        }

        if let (Some(t), Some(max)) = (ts, self.state.last_ts) {
            if in_recent_window(t.secs, max) {
                self.bump_recent(&events, &id);
            }
        }

        if events.iter().any(Category::is_funds) {
            let fields = extract_money(table, text);
            if !fields.is_empty() {
                let log = self.state.funds_events_per_ship.entry(id).or_default();
                for kind in events.iter().filter(|c| c.is_funds()) {
                    log.push(FundsEvent {
                        timestamp: ts.map(|t| t.secs),
                        kind,
                        money: fields.money,
                        cost: fields.cost,
                    });
                }
            }
        }
    }

    pub fn finish(self) -> AggregateState {
        let st = &self.state;
        tracing::info!(
            lines = st.total_lines,
            mod_lines = st.mod_lines,
            ships = st.ship_ids.len(),
            stalled = st.stalled_ships().len(),
            "scan complete"
        );
        self.state
    }

    fn bump(&mut self, category: Category) {
        *self.state.counts.entry(category).or_insert(0) += 1;
    }

    fn bump_recent(&mut self, events: &CategorySet, id: &ShipId) {
        let recent = &mut self.state.recent;
        for (category, map) in [
            (Category::NoTradeFound, &mut recent.no_trade),
            (Category::AllRejected, &mut recent.rejected),
            (Category::Timeout, &mut recent.timeout),
        ] {
            if events.contains(category) {
                *map.entry(id.clone()).or_insert(0) += 1;
            }
        }
    }

    fn sample(&mut self, category: Category, text: &str) {
        let buf: &mut SampleBuffer = match category {
            Category::Error => &mut self.state.error_lines,
            Category::PropertyLookupFail => &mut self.state.property_lookup_fails,
            Category::Critical => &mut self.state.critical_lines,
            _ => return,
        };
        if !buf.push(text) && !self.overflow_reported.contains(category) {
            self.overflow_reported.insert(category);
            tracing::warn!(
                %category,
                cap = buf.cap(),
                "sample buffer full, further lines are counted but not kept"
            );
        }
    }
}

/// `10.0` and `10.00` are the same frame.
fn frame_key(secs: f64) -> String {
    secs.to_string()
}

// ── Entry points ──

#[derive(Debug, Clone, Serialize)]
pub struct ScanStats {
    pub bytes_read: u64,
    pub file_size: Option<u64>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

/// Result of scanning one file.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub state: AggregateState,
    pub stats: ScanStats,
}

/// Aggregate an in-memory sequence of lines.
pub fn scan_lines<I, S>(lines: I, options: &ScanOptions) -> AggregateState
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut agg = Aggregator::new(options);
    for line in lines {
        agg.push(line.as_ref());
    }
    agg.finish()
}

/// Aggregate everything `reader` yields. `size_hint` (total bytes) enables
/// progress logging.
pub fn scan_reader<R: BufRead>(
    reader: R,
    size_hint: Option<u64>,
    options: &ScanOptions,
) -> Result<ScanOutcome, ScanError> {
    let started = Instant::now();
    let mut cursor = LineCursor::new(reader);
    let mut agg = Aggregator::new(options);
    let mut next_report = PROGRESS_STEP_PCT;

    loop {
        let line = match cursor.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(source) => {
                return Err(ScanError::Read {
                    offset: cursor.offset(),
                    source,
                })
            }
        };
        agg.push(&line);

        if let Some(total) = size_hint.filter(|t| *t > 0) {
            let pct = cursor.offset() * 100 / total;
            if pct >= next_report {
                tracing::debug!(pct, "reading log");
                next_report = pct - pct % PROGRESS_STEP_PCT + PROGRESS_STEP_PCT;
            }
        }
    }

    Ok(ScanOutcome {
        state: agg.finish(),
        stats: ScanStats {
            bytes_read: cursor.offset(),
            file_size: size_hint,
            elapsed: started.elapsed(),
        },
    })
}

/// Open `path` and aggregate it in one pass. Failing to open the file is
/// the only error that happens before any line is read.
pub fn scan_file(path: &Path, options: &ScanOptions) -> Result<ScanOutcome, ScanError> {
    let open_err = |source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_err)?;
    let size = file.metadata().map_err(open_err)?.len();
    tracing::debug!(path = %path.display(), size, "scanning log");
    scan_reader(BufReader::with_capacity(1 << 16, file), Some(size), options)
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
