use anyhow::Context;
use gtdiag_health::{build_report, Report, Section};
use gtdiag_scan::ScanOutcome;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::Settings;
use crate::logpath::human_size;
use crate::render::render_text;

pub const REPORT_PREFIX: &str = "GT_BugReport_";

/// `gtdiag report [LOGFILE]`
pub fn execute(path: &Path, settings: &Settings, json: bool) -> anyhow::Result<()> {
    let outcome = crate::cmd_scan::scan(path, &settings.scan_options())?;
    let now = chrono::Local::now();
    let report = assemble(path, &outcome, &now.format("%Y-%m-%d %H:%M:%S").to_string());
    let text = render_text(&report);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{text}");
    }

    let name = format!("{REPORT_PREFIX}{}.txt", now.format("%Y%m%d_%H%M%S"));
    let target = settings.report_dir_for(path).join(name);
    write_atomic(&target, text.as_bytes())
        .with_context(|| format!("cannot write report to {}", target.display()))?;
    eprintln!("Report saved to: {}", target.display());
    eprintln!("Attach this file when reporting a bug.");
    Ok(())
}

/// Host and file facts first, then everything derived from the scan.
pub fn assemble(path: &Path, outcome: &ScanOutcome, generated_at: &str) -> Report {
    let mut report = Report::new();
    report.push(system_section(path, outcome, generated_at));
    report.extend(build_report(&outcome.state, Some(&outcome.stats)));
    report
}

fn system_section(path: &Path, outcome: &ScanOutcome, generated_at: &str) -> Section {
    let mut s = Section::new("System Information");
    s.line(format!(
        "  OS                    : {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    ));
    s.line(format!("  Report generated      : {generated_at}"));
    s.line(format!(
        "  Tool version          : gtdiag {}",
        env!("CARGO_PKG_VERSION")
    ));
    s.line(format!("  Log file              : {}", path.display()));
    let size = outcome.stats.file_size.unwrap_or(outcome.stats.bytes_read);
    s.line(format!("  Log size              : {}", human_size(size)));
    s
}

/// Write to a temp file in the target directory, then rename over `path`.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}
