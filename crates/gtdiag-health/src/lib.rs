pub mod checks;
pub mod dedup;
mod sections;
pub mod report;

pub use dedup::{dedup_errors, normalize_error, ErrorGroup, ErrorSummary};
pub use sections::{build_report, evaluate, SAMPLE_WIDTH, TAIL_LINE_WIDTH};
pub use report::{CheckResult, Report, ReportItem, Section, Status};
