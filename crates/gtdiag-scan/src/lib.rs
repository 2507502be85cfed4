mod aggregate;
mod cursor;
mod error;
pub mod modinfo;
pub mod state;

pub use aggregate::{scan_file, scan_lines, scan_reader, Aggregator, ScanOutcome, ScanStats};
pub use cursor::LineCursor;
pub use error::ScanError;
pub use modinfo::{Blacklist, ModInfo, SessionHeader};
pub use state::{AggregateState, FundsEvent, OpsStats, ScanOptions, TailPolicy};
