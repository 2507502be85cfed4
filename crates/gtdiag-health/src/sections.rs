use gtdiag_core::{truncate, Category, PatternTable, ShipId};
use gtdiag_scan::{AggregateState, ScanStats};
use std::collections::BTreeMap;

use crate::checks::*;
use crate::dedup::{dedup_errors, ErrorGroup, MOD_RELATED_LIMIT, OTHER_LIMIT};
use crate::report::{group_thousands, CheckResult, Report, Section, Status};

pub const SAMPLE_WIDTH: usize = 120;
pub const TAIL_LINE_WIDTH: usize = 160;

const STALLED_DETAILS: usize = 10;
const RECENT_DETAILS: usize = 10;
const FUNDS_DETAILS: usize = 10;
const PROPERTY_LOOKUP_DETAILS: usize = 10;
const CRITICAL_DETAILS: usize = 5;

/// Settings categories shown first, in this order. Anything else follows
/// alphabetically.
const SETTINGS_ORDER: [&str; 12] = [
    "Fleet",
    "XP",
    "Performance",
    "Performance2",
    "ThreatAvoidance",
    "Notifications",
    "Debug",
    "AutoRepair",
    "MobileIntel",
    "Modifications",
    "ShipNaming",
    "NumberFormat",
];

/// Graded results only, in report order.
pub fn evaluate(state: &AggregateState) -> Vec<CheckResult> {
    build_report(state, None).checks().cloned().collect()
}

/// Everything derived from the aggregate state. Callers prepend whatever
/// they know about the host and the file.
pub fn build_report(state: &AggregateState, stats: Option<&ScanStats>) -> Report {
    let table = PatternTable::shared();
    let mut report = Report::new();
    report.push(session_section(state));
    report.push(mod_section(state, table));
    report.push(overview_section(state, stats));
    report.push(health_section(state));
    report.push(error_section(state, table));
    report.push(recent_section(state));
    report.push(tail_section(state));
    report
}

fn session_section(state: &AggregateState) -> Section {
    let mut s = Section::new("Game Session Info");
    let header = &state.session;
    if header.started.is_none() && header.gpus.is_empty() {
        s.line("  (no session header found)");
        return s;
    }
    if let Some(started) = &header.started {
        s.line(format!("  Log started           : {started}"));
    }
    for gpu in &header.gpus {
        s.line(format!("  GPU                   : {gpu}"));
    }
    s
}

fn mod_section(state: &AggregateState, table: &PatternTable) -> Section {
    let mut s = Section::new("GalaxyTrader MK3 Version & Settings");
    let info = &state.mod_info;
    match (&info.version, &info.content_version) {
        (Some(v), Some(cv)) => {
            s.line(format!("  Version               : {v}"));
            s.line(format!("  Content version       : {cv}"));
        }
        _ => {
            s.line("  (no init line found; the mod may not be loaded)");
        }
    }

    if !info.settings.is_empty() {
        s.blank().line("  Settings:");
        for (category, raw) in ordered_settings(&info.settings) {
            s.line(format!("    [{category}]"));
            for pair in raw.split_whitespace() {
                s.line(format!("      {pair}"));
            }
        }
    }

    if let Some(blacklist) = info.blacklist(table) {
        s.blank()
            .line(format!("  Blacklisted sectors   : {}", blacklist.count));
        for entry in &blacklist.entries {
            s.detail(format!("    - {entry}"));
        }
    }
    s
}

fn ordered_settings(settings: &BTreeMap<String, String>) -> Vec<(&str, &str)> {
    let mut out: Vec<(&str, &str)> = SETTINGS_ORDER
        .iter()
        .filter_map(|k| settings.get_key_value(*k))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    // BTreeMap iteration is already sorted
    out.extend(
        settings
            .iter()
            .filter(|(k, _)| !SETTINGS_ORDER.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    out
}

fn overview_section(state: &AggregateState, stats: Option<&ScanStats>) -> Section {
    let mut s = Section::new("Fleet Overview");
    s.line(format!(
        "  Total log lines       : {}",
        group_thousands(state.total_lines)
    ));
    s.line(format!(
        "  GT-relevant lines     : {}",
        group_thousands(state.mod_lines)
    ));
    match (state.first_ts, state.last_ts) {
        (Some(first), Some(last)) => {
            let dur = state.duration_secs();
            s.line(format!(
                "  Game time range       : {first:.2}s - {last:.2}s ({dur:.0}s / {:.1} min)",
                dur / 60.0
            ));
        }
        _ => {
            s.line("  Game time range       : (no timestamps found)");
        }
    }
    s.line(format!("  Unique ships          : {}", state.ship_ids.len()));
    s.line(format!(
        "  Home sectors          : {}",
        state.home_sectors.len()
    ));
    for sector in &state.home_sectors {
        s.detail(format!("    - {sector}"));
    }
    if let Some(stats) = stats {
        s.line(format!(
            "  Analysis time         : {:.2}s",
            stats.elapsed.as_secs_f64()
        ));
    }
    s
}

fn health_section(state: &AggregateState) -> Section {
    let mut s = Section::new("Health Checks");

    s.line("--- Performance ---");
    match state.ops_stats() {
        Some(ops) => {
            s.check(grade_peak_ops(ops.peak));
            s.check(grade_p95_ops(ops.p95));
            s.detail(format!(
                "      avg={:.1}, p95={:.0}, peak={}, unique_frames={}",
                ops.avg, ops.p95, ops.peak, ops.unique_frames
            ));
        }
        None => {
            s.check(CheckResult::new(
                "peak_ops",
                Status::Warn,
                "No GT frame data found",
            ));
        }
    }

    let requests = state.count(Category::RequestSent);
    let orders = state.count(Category::OrderCreated);
    s.blank().line("--- Trade Pipeline ---");
    s.line(format!(
        "  Requests: {requests} | Orders created: {orders} | No trade found: {} | Timeouts: {}",
        state.count(Category::NoTradeFound),
        state.count(Category::Timeout)
    ));
    s.check(grade_trade_success(requests, orders));

    let stalled = state.stalled_ships();
    s.check(grade_stalled(stalled.len()));
    for (id, ts) in stalled.iter().take(STALLED_DETAILS) {
        s.detail(format!("      {id}: last request at t={ts:.2}"));
    }
    s.check(grade_timeouts(state.count(Category::Timeout)));
    s.check(grade_rejected(state.count(Category::AllRejected)));
    s.check(grade_queue_busy(state.count(Category::QueueBusy)));
    s.check(grade_home_deny(state.count(Category::HomeDeny)));

    s.blank().line("--- Locks & Claims ---");
    s.check(grade_locks(
        state.count(Category::LockAcquired),
        state.count(Category::LockReleased),
    ));
    s.check(grade_claim_switch(
        state.count(Category::BestTradeSelected),
        state.count(Category::ClaimSwitch),
    ));

    let destroyed = state.count(Category::ShipDestroyed);
    s.blank().line("--- Threats ---");
    s.line(format!(
        "  Threat events: {} | Ship destruction events: {destroyed}",
        state.count(Category::Threat)
    ));
    s.check(grade_destructions(destroyed));

    s.blank().line("--- Funds ---");
    s.line(format!(
        "  Blocked (MD): {} | Blocked (AI): {} | Gate skips: {} | Cap skips: {} | Cap cleared: {} | Waiting: {}",
        state.count(Category::FundsBlockedMd),
        state.count(Category::FundsBlockedAi),
        state.count(Category::FundsGateSkip),
        state.count(Category::FundsCapSkip),
        state.count(Category::FundsCapCleared),
        state.count(Category::FundsWait),
    ));
    s.check(grade_funds_blocks(
        state.count(Category::FundsBlockedMd),
        state.count(Category::FundsBlockedAi),
    ));
    funds_details(state, &mut s);

    s.blank().line("--- Script Diagnostics ---");
    s.check(grade_property_lookups(
        state.count(Category::PropertyLookupFail),
    ));
    let mut seen: Vec<String> = Vec::new();
    for line in state
        .property_lookup_fails
        .lines()
        .iter()
        .take(PROPERTY_LOOKUP_DETAILS)
    {
        let short = truncate(line, SAMPLE_WIDTH);
        if !seen.contains(&short) {
            seen.push(short);
        }
    }
    for line in seen {
        s.detail(format!("      {line}"));
    }
    s.check(grade_critical(state.count(Category::Critical)));
    for line in state.critical_lines.lines().iter().take(CRITICAL_DETAILS) {
        s.detail(format!("      {}", truncate(line, SAMPLE_WIDTH)));
    }
    s
}

fn funds_details(state: &AggregateState, s: &mut Section) {
    let mut ships: Vec<(&ShipId, usize)> = state
        .funds_events_per_ship
        .iter()
        .map(|(id, events)| (id, events.len()))
        .collect();
    ships.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    for (id, n) in ships.into_iter().take(FUNDS_DETAILS) {
        let last = state.funds_events_per_ship[id].last();
        let money = last
            .and_then(|e| e.money)
            .map_or_else(|| "-".to_string(), |m| m.to_string());
        let cost = last
            .and_then(|e| e.cost)
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        s.detail(format!(
            "      {id}: {n} events, last money={money} cost={cost}"
        ));
    }
}

fn error_section(state: &AggregateState, table: &PatternTable) -> Section {
    let mut s = Section::new("Error Summary");
    let total = state.count(Category::Error);
    s.line(format!(
        "  Script error lines    : {} (sampled {})",
        group_thousands(total),
        state.error_lines.len()
    ));
    let summary = dedup_errors(table, state.error_lines.lines().iter().map(String::as_str));
    if let Some(clean) = grade_mod_errors(summary.mod_related.len()) {
        s.check(clean);
    }
    if !summary.mod_related.is_empty() {
        s.blank().line(format!(
            "  GT-related errors ({} unique):",
            summary.mod_related.len()
        ));
        push_groups(&mut s, &summary.mod_related, MOD_RELATED_LIMIT);
    }
    if !summary.other.is_empty() {
        s.blank().line(format!(
            "  Other errors ({} unique, top {OTHER_LIMIT}):",
            summary.other.len()
        ));
        push_groups(&mut s, &summary.other, OTHER_LIMIT);
    }
    s
}

fn push_groups(s: &mut Section, groups: &[ErrorGroup], limit: usize) {
    for g in groups.iter().take(limit) {
        s.line(format!("    {:>3}x  {}", g.count, g.message));
    }
    if groups.len() > limit {
        s.detail(format!("    ... and {} more", groups.len() - limit));
    }
}

/// Ships at or above `min`, most frequent first.
fn recurring(counts: &BTreeMap<ShipId, u64>, min: u64) -> Vec<(&ShipId, u64)> {
    let mut out: Vec<(&ShipId, u64)> = counts
        .iter()
        .filter(|(_, n)| **n >= min)
        .map(|(id, n)| (id, *n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    out
}

fn recent_section(state: &AggregateState) -> Section {
    let mut s = Section::new("Recent Ship Issues (last 5 minutes of game time)");
    if state.last_ts.is_none() {
        s.line("  (no timestamps found; recent window unavailable)");
    }

    let recent = &state.recent;
    let groups = [
        (
            "recent_no_trade",
            Status::Warn,
            "Ships with repeated GT_No_Trade_Found (>=3x)",
            recurring(&recent.no_trade, RECENT_NO_TRADE_MIN),
        ),
        (
            "recent_rejected",
            Status::Warn,
            "Ships with all-trades-rejected (>=2x)",
            recurring(&recent.rejected, RECENT_REJECTED_MIN),
        ),
        (
            "recent_timeouts",
            Status::Fail,
            "Ships with MD timeouts",
            recurring(&recent.timeout, RECENT_TIMEOUT_MIN),
        ),
    ];

    let mut flagged = false;
    for (id, status, label, ships) in groups {
        if ships.is_empty() {
            continue;
        }
        flagged = true;
        s.check(CheckResult::new(
            id,
            status,
            format!("{label}: {}", ships.len()),
        ));
        for (ship, n) in ships.into_iter().take(RECENT_DETAILS) {
            s.detail(format!("      {ship}: {n}x"));
        }
    }
    if !flagged {
        s.check(CheckResult::new(
            "recent_issues",
            Status::Pass,
            "No recurring ship issues in the last 5 minutes of game time",
        ));
    }
    s
}

fn tail_section(state: &AggregateState) -> Section {
    let mut s = Section::new("Last GT Log Lines (for context)");
    if state.tail.is_empty() {
        s.line("  (no GT-relevant lines found)");
        return s;
    }
    s.line(format!(
        "  Showing last {} GT-relevant lines:",
        state.tail.len()
    ));
    s.blank();
    for line in state.tail.iter() {
        s.line(format!("  {}", truncate(line, TAIL_LINE_WIDTH)));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportItem;
    use gtdiag_scan::{scan_lines, ScanOptions};

    fn report(lines: &[&str]) -> Report {
        let state = scan_lines(lines.iter().copied(), &ScanOptions::default());
        build_report(&state, None)
    }

    fn request(ts: f64, ship: &str) -> String {
        format!("[Scripts] {ts:.2} *** [GT-AI] {ship} SENDING GT_Find_Trade")
    }

    #[test]
    fn low_success_rate_warns() {
        let mut lines: Vec<String> = (0..10).map(|i| request(i as f64 + 1.0, "ABC-123")).collect();
        lines.push("[Scripts] 20.00 *** [GT-Orders] Created BUY trade order (ABC-123)".into());
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let r = report(&refs);
        let c = r.check("trade_success").unwrap();
        assert_eq!(c.status, Status::Warn);
        assert!(c.message.starts_with("Trade success rate: 10.0%"));
    }

    #[test]
    fn six_stalled_ships_fail() {
        let lines: Vec<String> = ["AAA-001", "AAA-002", "AAA-003", "AAA-004", "AAA-005", "AAA-006"]
            .iter()
            .enumerate()
            .map(|(i, ship)| request(i as f64 + 1.0, ship))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let r = report(&refs);
        let c = r.check("stalled_ships").unwrap();
        assert_eq!(c.status, Status::Fail);
        assert_eq!(c.message, "Stalled ships (request but no response): 6");
    }

    #[test]
    fn empty_log_reports_info_not_failure() {
        let r = report(&[]);
        assert_eq!(r.check("trade_success").unwrap().status, Status::Info);
        assert_eq!(r.check("locks").unwrap().status, Status::Info);
        assert_eq!(r.check("claim_switch").unwrap().status, Status::Info);
        assert_eq!(r.check("recent_issues").unwrap().status, Status::Pass);
        assert_eq!(r.check("stalled_ships").unwrap().status, Status::Pass);
        assert_eq!(r.sections.len(), 7);
    }

    #[test]
    fn low_p95_is_graded_pass() {
        let r = report(&["[Scripts] 1.00 *** [GT-AI] ABC-123 idle"]);
        let c = r.check("p95_ops").unwrap();
        assert_eq!(c.status, Status::Pass);
        assert_eq!(c.message, "p95 operations/frame: 1");
    }

    #[test]
    fn gt_errors_are_listed_not_graded() {
        let r = report(&["[Scripts] 1.00 *** [=ERROR=] 1.00 GT_Trade: missing ware"]);
        assert!(r.check("mod_errors").is_none());
        assert_eq!(r.worst(), Status::Pass);
        let errors = r.sections.iter().find(|s| s.title == "Error Summary").unwrap();
        assert!(errors
            .items
            .contains(&ReportItem::Line("      1x  GT_Trade: missing ware".to_string())));

        let clean = report(&["[Scripts] 1.00 *** [GT-AI] ABC-123 idle"]);
        let c = clean.check("mod_errors").unwrap();
        assert_eq!(c.status, Status::Pass);
        assert_eq!(c.message, "No GT-related errors");
    }

    #[test]
    fn settings_follow_preferred_order() {
        let mut settings = BTreeMap::new();
        for k in ["Zeta", "Debug", "Alpha", "Fleet"] {
            settings.insert(k.to_string(), "x=1".to_string());
        }
        let keys: Vec<&str> = ordered_settings(&settings).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Fleet", "Debug", "Alpha", "Zeta"]);
    }

    #[test]
    fn recurring_needs_minimum_and_sorts_by_count() {
        let mut counts = BTreeMap::new();
        counts.insert(ShipId::parse("AAA-001").unwrap(), 2);
        counts.insert(ShipId::parse("BBB-002").unwrap(), 5);
        counts.insert(ShipId::parse("CCC-003").unwrap(), 3);
        let hits: Vec<(String, u64)> = recurring(&counts, 3)
            .into_iter()
            .map(|(id, n)| (id.to_string(), n))
            .collect();
        assert_eq!(hits, vec![("BBB-002".to_string(), 5), ("CCC-003".to_string(), 3)]);
    }

    #[test]
    fn evaluate_matches_report_checks() {
        let st = scan_lines(std::iter::empty::<&str>(), &ScanOptions::default());
        let checks = evaluate(&st);
        assert!(checks.iter().any(|c| c.id == "critical" && c.status == Status::Pass));
    }
}
