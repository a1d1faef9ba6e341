//! Calendar CSV parser
//!
//! Expected header:
//!   start,end,title
//! with ISO-8601 datetimes. Offsets ("...+02:00", "...Z") are converted to the
//! profile zone; naive values are taken as wall-clock time.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use shagent_core::time::to_local;
use shagent_core::BusyInterval;
use std::io::Read;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct RawBusyRow {
    start: String,
    end: String,
    #[serde(default)]
    title: Option<String>,
}

fn parse_iso(s: &str, tz: Tz) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(to_local(dt.with_timezone(&Utc), tz));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

pub fn parse_busy_csv<R: Read>(reader: R, tz: Tz) -> Result<Vec<BusyInterval>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for (idx, rec) in rdr.deserialize::<RawBusyRow>().enumerate() {
        let row = match rec {
            Ok(r) => r,
            Err(e) => {
                warn!(row = idx, error = %e, "skipping malformed calendar row");
                continue;
            }
        };
        let (Some(start), Some(end)) = (parse_iso(&row.start, tz), parse_iso(&row.end, tz)) else {
            warn!(row = idx, start = %row.start, end = %row.end, "skipping calendar row with bad datetimes");
            continue;
        };
        let title = row.title.filter(|t| !t.is_empty()).unwrap_or_else(|| "busy".to_string());
        out.push(BusyInterval::new(start, end, title));
    }
    Ok(out)
}
