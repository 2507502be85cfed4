pub mod classify;
pub mod extract;
pub mod patterns;
pub mod text;
pub mod types;

pub use classify::Classifier;
pub use extract::{extract_home_sector, extract_money, extract_ship_id, MoneyFields};
pub use patterns::{PatternTable, FALSE_ERROR_PATTERNS};
pub use text::{percentile, truncate};
pub use types::*;
