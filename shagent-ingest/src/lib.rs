//! shagent-ingest: adapters that turn goal sheets, OKR files and calendar exports into core data.

pub mod parsers;
pub mod types;

pub use parsers::busy_csv::parse_busy_csv;
pub use parsers::goals_csv::{load_goals_csv, parse_goals_csv};
pub use parsers::ics::parse_ics;
pub use parsers::okr_json::{load_okr_json, parse_okr_json};
pub use types::GoalRow;
