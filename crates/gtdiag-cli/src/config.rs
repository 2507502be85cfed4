use anyhow::Context;
use gtdiag_scan::{ScanOptions, TailPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "gtdiag.json";
pub const TAIL_ENV: &str = "GTDIAG_TAIL";

/// Contents of `gtdiag.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Number of trailing GT lines to keep; 0 keeps all.
    pub tail: Option<usize>,
    /// Where report files are written.
    pub report_dir: Option<PathBuf>,
}

/// Flags that override every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tail: Option<usize>,
    pub tail_all: bool,
    pub out: Option<PathBuf>,
}

/// Effective settings after layering.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tail: TailPolicy,
    /// Set by `--out` or the config file; otherwise reports land beside the log.
    pub report_dir: Option<PathBuf>,
}

impl Settings {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions { tail: self.tail }
    }

    pub fn report_dir_for(&self, log: &Path) -> PathBuf {
        match &self.report_dir {
            Some(dir) => dir.clone(),
            None => log
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf(),
        }
    }
}

fn tail_policy(n: usize) -> TailPolicy {
    if n == 0 {
        TailPolicy::All
    } else {
        TailPolicy::Last(n)
    }
}

/// Read the config file. An explicit path must exist; the implicit
/// `gtdiag.json` in `cwd` is optional.
pub fn load_file(explicit: Option<&Path>, cwd: &Path) -> anyhow::Result<FileConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let implicit = cwd.join(CONFIG_FILE);
            if !implicit.exists() {
                return Ok(FileConfig::default());
            }
            implicit
        }
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let config: FileConfig = serde_json::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

/// defaults → file → environment → flags.
pub fn resolve(
    file: FileConfig,
    env_tail: Option<&str>,
    flags: &Overrides,
    cwd: &Path,
) -> anyhow::Result<Settings> {
    let mut tail = TailPolicy::default();
    if let Some(n) = file.tail {
        tail = tail_policy(n);
    }
    if let Some(raw) = env_tail {
        let n: usize = raw
            .trim()
            .parse()
            .with_context(|| format!("{TAIL_ENV} must be a line count, got {raw:?}"))?;
        tail = tail_policy(n);
    }
    if let Some(n) = flags.tail {
        tail = tail_policy(n);
    }
    if flags.tail_all {
        tail = TailPolicy::All;
    }

    let report_dir = flags
        .out
        .clone()
        .or(file.report_dir)
        .map(|dir| if dir.is_relative() { cwd.join(dir) } else { dir });

    Ok(Settings { tail, report_dir })
}

/// Full layering with the process environment.
pub fn load(explicit: Option<&Path>, flags: &Overrides, cwd: &Path) -> anyhow::Result<Settings> {
    let file = load_file(explicit, cwd)?;
    let env_tail = std::env::var(TAIL_ENV).ok();
    resolve(file, env_tail.as_deref(), flags, cwd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_any_layer() {
        let cwd = Path::new("/work");
        let s = resolve(FileConfig::default(), None, &Overrides::default(), cwd).unwrap();
        assert_eq!(s.tail, TailPolicy::Last(500));
        assert_eq!(s.report_dir, None);
    }

    #[test]
    fn report_dir_defaults_to_log_directory() {
        let cwd = Path::new("/work");
        let s = resolve(FileConfig::default(), None, &Overrides::default(), cwd).unwrap();
        assert_eq!(
            s.report_dir_for(Path::new("/games/x4/log.log")),
            PathBuf::from("/games/x4")
        );
        assert_eq!(s.report_dir_for(Path::new("log.log")), PathBuf::from("."));

        let flags = Overrides {
            out: Some(PathBuf::from("reports")),
            ..Default::default()
        };
        let s = resolve(FileConfig::default(), None, &flags, cwd).unwrap();
        assert_eq!(
            s.report_dir_for(Path::new("/games/x4/log.log")),
            PathBuf::from("/work/reports")
        );
    }

    #[test]
    fn layers_override_in_order() {
        let cwd = Path::new("/work");
        let file = FileConfig {
            tail: Some(100),
            report_dir: Some(PathBuf::from("reports")),
        };
        let s = resolve(file.clone(), None, &Overrides::default(), cwd).unwrap();
        assert_eq!(s.tail, TailPolicy::Last(100));
        assert_eq!(s.report_dir, Some(PathBuf::from("/work/reports")));

        let s = resolve(file.clone(), Some("0"), &Overrides::default(), cwd).unwrap();
        assert_eq!(s.tail, TailPolicy::All);

        let flags = Overrides {
            tail: Some(20),
            out: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        };
        let s = resolve(file, Some("0"), &flags, cwd).unwrap();
        assert_eq!(s.tail, TailPolicy::Last(20));
        assert_eq!(s.report_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn tail_all_flag_wins() {
        let flags = Overrides {
            tail: Some(20),
            tail_all: true,
            ..Default::default()
        };
        let s = resolve(FileConfig::default(), None, &flags, Path::new("/w")).unwrap();
        assert_eq!(s.tail, TailPolicy::All);
    }

    #[test]
    fn bad_env_value_is_an_error() {
        let err = resolve(
            FileConfig::default(),
            Some("lots"),
            &Overrides::default(),
            Path::new("/w"),
        )
        .unwrap_err();
        assert!(err.to_string().contains(TAIL_ENV));
    }

    #[test]
    fn implicit_file_is_optional_explicit_is_not() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_file(None, dir.path()).unwrap(), FileConfig::default());
        assert!(load_file(Some(&dir.path().join("missing.json")), dir.path()).is_err());
    }

    #[test]
    fn reads_implicit_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "tail": 0, "report_dir": "out" }"#,
        )
        .unwrap();
        let cfg = load_file(None, dir.path()).unwrap();
        assert_eq!(cfg.tail, Some(0));
        assert_eq!(cfg.report_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, r#"{ "tale": 3 }"#).unwrap();
        assert!(load_file(Some(&path), dir.path()).is_err());
    }
}
