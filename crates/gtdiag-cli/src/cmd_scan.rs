use anyhow::Context;
use gtdiag_scan::{scan_file, ScanOptions, ScanOutcome};
use std::path::Path;

use crate::logpath::PATH_HINT;

/// Scan `path`, turning an unreadable file into an actionable message.
pub fn scan(path: &Path, options: &ScanOptions) -> anyhow::Result<ScanOutcome> {
    match scan_file(path, options) {
        Ok(outcome) => Ok(outcome),
        Err(e) if e.is_open_failure() => Err(anyhow::Error::new(e).context(format!(
            "could not read the log file; {PATH_HINT}"
        ))),
        Err(e) => Err(e).with_context(|| format!("scan of {} aborted", path.display())),
    }
}

/// `gtdiag scan [LOGFILE]`
pub fn execute(path: &Path, options: &ScanOptions) -> anyhow::Result<()> {
    let outcome = scan(path, options)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
