pub mod busy_csv;
pub mod goals_csv;
pub mod ics;
pub mod okr_json;
