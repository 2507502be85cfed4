use std::path::{Path, PathBuf};

/// Tried in order when no log path is given.
pub const DEFAULT_LOG_NAMES: [&str; 2] = ["log.log", "log.log.txt"];

pub const PATH_HINT: &str =
    "pass the log path explicitly, e.g. `gtdiag report \"C:\\Games\\X4\\log.log\"`";

/// An explicit path is returned as given (relative to `cwd`) even if it
/// does not exist; opening it reports the failure.
pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> anyhow::Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(if p.is_relative() {
            cwd.join(p)
        } else {
            p.to_path_buf()
        });
    }
    for name in DEFAULT_LOG_NAMES {
        let candidate = cwd.join(name);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using default log file");
            return Ok(candidate);
        }
    }
    anyhow::bail!(
        "no log file found in {} (looked for {}); {PATH_HINT}",
        cwd.display(),
        DEFAULT_LOG_NAMES.join(", ")
    )
}

/// `812.4 KB` or `12.3 MB`.
pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KB * KB {
        format!("{:.1} MB", b / (KB * KB))
    } else {
        format!("{:.1} KB", b / KB)
    }
}
