use gtdiag_core::PatternTable;
use gtdiag_health::{dedup_errors, ErrorGroup};
use gtdiag_scan::ScanOptions;
use std::path::Path;

/// `gtdiag errors [LOGFILE] [--limit N] [--json]`
pub fn execute(path: &Path, options: &ScanOptions, limit: usize, json: bool) -> anyhow::Result<()> {
    let outcome = crate::cmd_scan::scan(path, options)?;
    let state = &outcome.state;
    let mut summary = dedup_errors(
        PatternTable::shared(),
        state.error_lines.lines().iter().map(String::as_str),
    );
    summary.mod_related.truncate(limit);
    summary.other.truncate(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Script error lines: {} (sampled {})",
        state.count(gtdiag_core::Category::Error),
        state.error_lines.len()
    );
    print_groups("GT-related", &summary.mod_related);
    print_groups("Other", &summary.other);
    Ok(())
}

fn print_groups(label: &str, groups: &[ErrorGroup]) {
    println!();
    if groups.is_empty() {
        println!("{label}: none");
        return;
    }
    println!("{label}:");
    for g in groups {
        println!("  {:>3}x  {}", g.count, g.message);
    }
}
