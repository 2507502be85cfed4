use std::io;
use std::path::PathBuf;

/// Failures that abort a scan. Everything else (undecodable bytes, lines
/// matching nothing, half-written structured lines) is absorbed by the pass.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read failed at byte {offset}: {source}")]
    Read {
        offset: u64,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// True when the file could not be opened at all, as opposed to failing
    /// mid-read.
    pub fn is_open_failure(&self) -> bool {
        matches!(self, ScanError::Open { .. })
    }
}
