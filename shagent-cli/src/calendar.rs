use anyhow::{bail, Context, Result};
use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use shagent_core::{BusyInterval, PlannedBlock};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const ICS_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

pub async fn fetch_ics(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(ICS_FETCH_TIMEOUT)
        .build()
        .context("build HTTP client")?;
    let resp = client.get(url).send().await.context("calendar request")?;
    let status = resp.status();
    if !status.is_success() {
        bail!("calendar fetch failed: {status}");
    }
    resp.text().await.context("read calendar body")
}

/// Busy intervals from a published ICS feed. A feed that cannot be fetched
/// or parsed counts as an empty calendar.
pub async fn busy_from_ics_url(url: &str, tz: Tz) -> Vec<BusyInterval> {
    let text = match fetch_ics(url).await {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "calendar unavailable; planning without busy intervals");
            return Vec::new();
        }
    };
    match shagent_ingest::parse_ics(&text, tz) {
        Ok(busy) => {
            info!(events = busy.len(), "calendar loaded");
            busy
        }
        Err(e) => {
            warn!(error = %e, "calendar unparseable; planning without busy intervals");
            Vec::new()
        }
    }
}

/// Busy intervals from a calendar CSV export. A missing or unreadable file
/// counts as an empty calendar.
pub fn busy_from_csv(path: &Path, tz: Tz) -> Vec<BusyInterval> {
    let f = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "calendar CSV unavailable; planning without it");
            return Vec::new();
        }
    };
    match shagent_ingest::parse_busy_csv(f, tz) {
        Ok(busy) => {
            info!(path = %path.display(), events = busy.len(), "calendar CSV loaded");
            busy
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "calendar CSV unparseable; planning without it");
            Vec::new()
        }
    }
}

/// Wall-clock time in `tz` rendered as an ICS UTC stamp. Times inside a DST
/// gap have no instant and fall back to a floating local stamp.
fn ics_stamp(local: NaiveDateTime, tz: Tz) -> String {
    match tz.from_local_datetime(&local).earliest() {
        Some(dt) => dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string(),
        None => local.format("%Y%m%dT%H%M%S").to_string(),
    }
}

/// Emit a minimal ICS calendar with one VEVENT per planned block.
pub fn plan_to_ics(plan: &[PlannedBlock], tz: Tz) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//shagent//EN\r\n");

    for b in plan {
        s.push_str("BEGIN:VEVENT\r\n");
        s.push_str(&format!(
            "UID:shagent-{}-{}@shagent\r\n",
            b.start.format("%Y%m%dT%H%M"),
            escape_ics(&b.task.id)
        ));
        s.push_str(&format!("DTSTART:{}\r\n", ics_stamp(b.start, tz)));
        s.push_str(&format!("DTEND:{}\r\n", ics_stamp(b.end, tz)));
        s.push_str(&format!("SUMMARY:{}\r\n", escape_ics(&b.task.title)));
        let description = format!(
            "Task {}\nEnergy: {} (slot {:.2})\nPriority: {}",
            b.task.id, b.task.energy, b.energy, b.task.priority
        );
        s.push_str(&format!("DESCRIPTION:{}\r\n", escape_ics(&description)));
        s.push_str("END:VEVENT\r\n");
    }

    s.push_str("END:VCALENDAR\r\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shagent_core::Task;

    #[test]
    fn escapes_text_values() {
        assert_eq!(escape_ics("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }

    #[test]
    fn missing_calendar_csv_is_an_empty_calendar() {
        let tz: Tz = "America/Chicago".parse().unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(busy_from_csv(&dir.path().join("nope.csv"), tz).is_empty());

        let p = dir.path().join("busy.csv");
        fs::write(&p, "start,end,title
2025-06-02 09:00:00,2025-06-02 09:30:00,Standup
").unwrap();
        let busy = busy_from_csv(&p, tz);
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].label, "Standup");
    }

    #[test]
    fn exported_plan_reads_back_as_busy() {
        let tz: Tz = "America/Chicago".parse().unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let plan = vec![PlannedBlock {
            start: day.and_hms_opt(10, 0, 0).unwrap(),
            end: day.and_hms_opt(10, 50, 0).unwrap(),
            task: Task::new("3", "Edit draft, round two"),
            energy: 0.8,
        }];

        let ics = plan_to_ics(&plan, tz);
        assert!(ics.contains("DTSTART:20250602T150000Z"));
        assert!(ics.contains("SUMMARY:Edit draft\\, round two"));

        let busy = shagent_ingest::parse_ics(&ics, tz).unwrap();
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].start, plan[0].start);
        assert_eq!(busy[0].end, plan[0].end);
        assert_eq!(busy[0].label, "Edit draft, round two");
    }
}
