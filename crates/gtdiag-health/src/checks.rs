//! Threshold grading. Each function maps one metric to a [`CheckResult`];
//! the boundaries live here and nowhere else.

use crate::report::{CheckResult, Status};

pub const PEAK_OPS_WARN: u64 = 50;
pub const PEAK_OPS_FAIL: u64 = 100;
pub const P95_OPS_WARN: f64 = 30.0;

/// Below this many requests the success rate is reported but never graded
/// down.
pub const MIN_REQUESTS_FOR_RATE: u64 = 10;
pub const SUCCESS_RATE_WARN: f64 = 30.0;
pub const SUCCESS_RATE_FAIL: f64 = 10.0;

pub const STALLED_FAIL_ABOVE: usize = 5;
pub const TIMEOUTS_FAIL: u64 = 10;
pub const REJECTED_FAIL: u64 = 20;
pub const QUEUE_BUSY_WARN: u64 = 50;
pub const HOME_DENY_WARN: u64 = 50;
pub const HOME_DENY_FAIL: u64 = 200;
pub const LOCKS_FAIL_ABOVE: i64 = 5;
pub const CLAIM_SWITCH_FAIL_ABOVE: f64 = 30.0;
pub const DESTRUCTIONS_FAIL_ABOVE: u64 = 10;
pub const FUNDS_WARN_ABOVE: u64 = 20;
pub const FUNDS_FAIL_ABOVE: u64 = 100;
pub const PROPERTY_LOOKUP_FAIL: u64 = 10;

pub const RECENT_NO_TRADE_MIN: u64 = 3;
pub const RECENT_REJECTED_MIN: u64 = 2;
pub const RECENT_TIMEOUT_MIN: u64 = 1;

fn check(id: &str, status: Status, message: String) -> CheckResult {
    CheckResult::new(id, status, message)
}

pub fn grade_peak_ops(peak: u64) -> CheckResult {
    let (status, note) = if peak >= PEAK_OPS_FAIL {
        (Status::Fail, " (very high, likely stutter)")
    } else if peak >= PEAK_OPS_WARN {
        (Status::Warn, " (elevated)")
    } else {
        (Status::Pass, "")
    };
    check(
        "peak_ops",
        status,
        format!("Peak operations/frame: {peak}{note}"),
    )
}

pub fn grade_p95_ops(p95: f64) -> CheckResult {
    if p95 >= P95_OPS_WARN {
        check(
            "p95_ops",
            Status::Warn,
            format!("p95 operations/frame: {p95:.0} (sustained high load)"),
        )
    } else {
        check(
            "p95_ops",
            Status::Pass,
            format!("p95 operations/frame: {p95:.0}"),
        )
    }
}

pub fn grade_trade_success(requests: u64, orders: u64) -> CheckResult {
    if requests == 0 {
        return check(
            "trade_success",
            Status::Info,
            "No trade requests found in log".to_string(),
        );
    }
    let rate = orders as f64 * 100.0 / requests as f64;
    let enough = requests >= MIN_REQUESTS_FOR_RATE;
    let (status, note) = if enough && rate < SUCCESS_RATE_FAIL {
        (Status::Fail, " (very low)")
    } else if enough && rate < SUCCESS_RATE_WARN {
        (Status::Warn, " (low)")
    } else {
        (Status::Pass, "")
    };
    check(
        "trade_success",
        status,
        format!("Trade success rate: {rate:.1}% ({orders}/{requests}){note}"),
    )
}

pub fn grade_stalled(stalled: usize) -> CheckResult {
    let (status, message) = match stalled {
        0 => (Status::Pass, "No stalled ships detected".to_string()),
        n if n > STALLED_FAIL_ABOVE => (
            Status::Fail,
            format!("Stalled ships (request but no response): {n}"),
        ),
        n => (
            Status::Warn,
            format!("Stalled ships: {n} (may still be in progress)"),
        ),
    };
    check("stalled_ships", status, message)
}

pub fn grade_timeouts(n: u64) -> CheckResult {
    match n {
        0 => check("md_timeouts", Status::Pass, "No MD timeouts".to_string()),
        n if n >= TIMEOUTS_FAIL => check("md_timeouts", Status::Fail, format!("MD timeouts: {n}")),
        n => check("md_timeouts", Status::Warn, format!("MD timeouts: {n}")),
    }
}

pub fn grade_rejected(n: u64) -> CheckResult {
    let status = match n {
        0 => {
            return check(
                "all_rejected",
                Status::Pass,
                "No all-trades-rejected events".to_string(),
            )
        }
        n if n >= REJECTED_FAIL => Status::Fail,
        _ => Status::Warn,
    };
    check(
        "all_rejected",
        status,
        format!("All-trades-rejected events: {n}"),
    )
}

pub fn grade_queue_busy(n: u64) -> CheckResult {
    match n {
        0 => check("queue_busy", Status::Pass, "No queue busy events".to_string()),
        n if n >= QUEUE_BUSY_WARN => check(
            "queue_busy",
            Status::Warn,
            format!("Queue busy (saturated) events: {n}"),
        ),
        n => check("queue_busy", Status::Pass, format!("Queue busy events: {n}")),
    }
}

pub fn grade_home_deny(n: u64) -> CheckResult {
    if n >= HOME_DENY_FAIL {
        check(
            "home_deny",
            Status::Fail,
            format!("Home-refresh denials: {n} (very high)"),
        )
    } else if n >= HOME_DENY_WARN {
        check(
            "home_deny",
            Status::Warn,
            format!("Home-refresh denials: {n} (high, may be normal for large fleets)"),
        )
    } else {
        check("home_deny", Status::Pass, format!("Home-refresh denials: {n}"))
    }
}

pub fn grade_locks(acquired: u64, released: u64) -> CheckResult {
    if acquired == 0 && released == 0 {
        return check(
            "locks",
            Status::Info,
            "No lock operations found (lock logging may not be enabled)".to_string(),
        );
    }
    let unreleased = acquired as i64 - released as i64;
    if unreleased > LOCKS_FAIL_ABOVE {
        check(
            "locks",
            Status::Fail,
            format!("Unreleased locks: {unreleased} (acq={acquired} rel={released})"),
        )
    } else if unreleased > 0 {
        check(
            "locks",
            Status::Warn,
            format!("Unreleased locks: {unreleased} (may be in-progress searches)"),
        )
    } else {
        check(
            "locks",
            Status::Pass,
            format!("All locks released (acq={acquired} rel={released})"),
        )
    }
}

pub fn grade_claim_switch(selections: u64, switches: u64) -> CheckResult {
    if selections == 0 {
        return check(
            "claim_switch",
            Status::Info,
            "No trade selections found".to_string(),
        );
    }
    let rate = switches as f64 * 100.0 / selections as f64;
    if rate > CLAIM_SWITCH_FAIL_ABOVE {
        check(
            "claim_switch",
            Status::Fail,
            format!("Claim-switch rate: {rate:.1}% (high contention)"),
        )
    } else {
        check(
            "claim_switch",
            Status::Pass,
            format!("Claim-switch rate: {rate:.1}% ({switches}/{selections})"),
        )
    }
}

pub fn grade_destructions(n: u64) -> CheckResult {
    match n {
        0 => check(
            "ship_destroyed",
            Status::Pass,
            "No ship destruction events".to_string(),
        ),
        n if n > DESTRUCTIONS_FAIL_ABOVE => check(
            "ship_destroyed",
            Status::Fail,
            format!("Ship destructions: {n} (fleet is taking losses)"),
        ),
        n => check(
            "ship_destroyed",
            Status::Warn,
            format!("Ship destructions: {n}"),
        ),
    }
}

pub fn grade_funds_blocks(md: u64, ai: u64) -> CheckResult {
    let total = md + ai;
    if total == 0 {
        return check("funds_blocks", Status::Pass, "No funds blocks".to_string());
    }
    let (status, note) = if total > FUNDS_FAIL_ABOVE {
        (Status::Fail, "ships cannot afford trades, ")
    } else if total > FUNDS_WARN_ABOVE {
        (Status::Warn, "elevated, ")
    } else {
        (Status::Warn, "")
    };
    check(
        "funds_blocks",
        status,
        format!("Funds blocks: {total} ({note}md={md} ai={ai})"),
    )
}

pub fn grade_property_lookups(n: u64) -> CheckResult {
    match n {
        0 => check(
            "property_lookup",
            Status::Pass,
            "No property lookup failures".to_string(),
        ),
        n if n >= PROPERTY_LOOKUP_FAIL => check(
            "property_lookup",
            Status::Fail,
            format!("Property lookup failures: {n}"),
        ),
        n => check(
            "property_lookup",
            Status::Warn,
            format!("Property lookup failures: {n}"),
        ),
    }
}

pub fn grade_critical(n: u64) -> CheckResult {
    if n == 0 {
        check("critical", Status::Pass, "No critical exceptions".to_string())
    } else {
        check(
            "critical",
            Status::Fail,
            format!("Critical/exception lines: {n}"),
        )
    }
}

/// A clean bill only; when mod errors exist the grouped listing stands on
/// its own, ungraded.
pub fn grade_mod_errors(unique: usize) -> Option<CheckResult> {
    (unique == 0).then(|| {
        check(
            "mod_errors",
            Status::Pass,
            "No GT-related errors".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_ops_boundaries() {
        assert_eq!(grade_peak_ops(49).status, Status::Pass);
        assert_eq!(grade_peak_ops(50).status, Status::Warn);
        assert_eq!(grade_peak_ops(99).status, Status::Warn);
        assert_eq!(grade_peak_ops(100).status, Status::Fail);
    }

    #[test]
    fn p95_graded_on_both_sides_of_warn_line() {
        let low = grade_p95_ops(29.9);
        assert_eq!(low.id, "p95_ops");
        assert_eq!(low.status, Status::Pass);
        assert_eq!(low.message, "p95 operations/frame: 30");
        assert_eq!(grade_p95_ops(30.0).status, Status::Warn);
    }

    #[test]
    fn mod_errors_only_graded_when_clean() {
        assert_eq!(grade_mod_errors(0).unwrap().status, Status::Pass);
        assert!(grade_mod_errors(1).is_none());
    }

    #[test]
    fn ten_percent_success_is_warn() {
        let c = grade_trade_success(10, 1);
        assert_eq!(c.status, Status::Warn);
        assert_eq!(c.message, "Trade success rate: 10.0% (1/10) (low)");
    }

    #[test]
    fn success_rate_grading() {
        assert_eq!(grade_trade_success(0, 0).status, Status::Info);
        assert_eq!(grade_trade_success(20, 1).status, Status::Fail);
        assert_eq!(grade_trade_success(10, 3).status, Status::Pass);
        // too few requests to judge
        assert_eq!(grade_trade_success(9, 0).status, Status::Pass);
    }

    #[test]
    fn stalled_boundaries() {
        assert_eq!(grade_stalled(0).status, Status::Pass);
        assert_eq!(grade_stalled(1).status, Status::Warn);
        assert_eq!(grade_stalled(5).status, Status::Warn);
        let six = grade_stalled(6);
        assert_eq!(six.status, Status::Fail);
        assert!(six.message.ends_with(": 6"));
    }

    #[test]
    fn counter_boundaries() {
        assert_eq!(grade_timeouts(9).status, Status::Warn);
        assert_eq!(grade_timeouts(10).status, Status::Fail);
        assert_eq!(grade_rejected(19).status, Status::Warn);
        assert_eq!(grade_rejected(20).status, Status::Fail);
        assert_eq!(grade_queue_busy(1).status, Status::Pass);
        assert_eq!(grade_queue_busy(49).status, Status::Pass);
        assert_eq!(grade_queue_busy(50).status, Status::Warn);
        assert_eq!(grade_home_deny(49).status, Status::Pass);
        assert_eq!(grade_home_deny(50).status, Status::Warn);
        assert_eq!(grade_home_deny(200).status, Status::Fail);
        assert!(grade_home_deny(200).message.contains("very high"));
        assert_eq!(grade_destructions(10).status, Status::Warn);
        assert_eq!(grade_destructions(11).status, Status::Fail);
        assert_eq!(grade_property_lookups(9).status, Status::Warn);
        assert_eq!(grade_property_lookups(10).status, Status::Fail);
    }

    #[test]
    fn balanced_locks_pass() {
        let c = grade_locks(10, 10);
        assert_eq!(c.status, Status::Pass);
        assert_eq!(c.message, "All locks released (acq=10 rel=10)");
        assert_eq!(grade_locks(0, 0).status, Status::Info);
        assert_eq!(grade_locks(15, 10).status, Status::Warn);
        assert_eq!(grade_locks(16, 10).status, Status::Fail);
    }

    #[test]
    fn claim_switch_fails_above_thirty_percent() {
        assert_eq!(grade_claim_switch(0, 0).status, Status::Info);
        assert_eq!(grade_claim_switch(10, 3).status, Status::Pass);
        assert_eq!(grade_claim_switch(10, 4).status, Status::Fail);
    }

    #[test]
    fn funds_tiers() {
        assert_eq!(grade_funds_blocks(0, 0).status, Status::Pass);
        assert_eq!(grade_funds_blocks(20, 0).status, Status::Warn);
        let elevated = grade_funds_blocks(15, 6);
        assert_eq!(elevated.status, Status::Warn);
        assert!(elevated.message.contains("elevated"));
        assert_eq!(grade_funds_blocks(100, 0).status, Status::Warn);
        assert_eq!(grade_funds_blocks(60, 41).status, Status::Fail);
    }
}
