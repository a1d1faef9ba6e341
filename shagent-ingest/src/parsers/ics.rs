//! iCalendar (ICS) busy-interval parser
//!
//! Reads DTSTART / DTEND / SUMMARY from each VEVENT. Supported value forms:
//!   20250602T140000Z                      (UTC, converted to the profile zone)
//!   20250602T090000                       (floating wall clock)
//!   DTSTART;TZID=America/New_York:20250602T090000
//!   DTSTART;VALUE=DATE:20250602           (all day, midnight)
//! Events whose times cannot be parsed are skipped.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use shagent_core::time::to_local;
use shagent_core::BusyInterval;
use tracing::{debug, warn};

const DEFAULT_SUMMARY: &str = "busy";

/// Undo RFC 5545 line folding (continuation lines start with a space or tab).
fn unfold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix([' ', '\t']) {
            out.push_str(rest);
        } else {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(line);
        }
    }
    out
}

fn parse_ics_time(value: &str, tzid: Option<&str>, tz: Tz) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        return Some(to_local(Utc.from_utc_datetime(&naive), tz));
    }
    if value.contains('T') {
        let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
        return match tzid.and_then(|id| id.parse::<Tz>().ok()) {
            Some(src) if src != tz => {
                let zoned = src.from_local_datetime(&naive).earliest()?;
                Some(zoned.with_timezone(&tz).naive_local())
            }
            _ => Some(naive),
        };
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse ICS text into busy intervals expressed in `tz` wall-clock time.
pub fn parse_ics(text: &str, tz: Tz) -> Result<Vec<BusyInterval>> {
    let prop_re = Regex::new(r"^(?P<name>DTSTART|DTEND|SUMMARY)(?P<params>(?:;[^:]*)?):(?P<value>.*)$")?;
    let tzid_re = Regex::new(r"TZID=(?P<tzid>[^;:]+)")?;

    let unfolded = unfold(text);
    let mut out = Vec::new();

    for raw_event in unfolded.split("BEGIN:VEVENT").skip(1) {
        let block = raw_event.split("END:VEVENT").next().unwrap_or(raw_event);
        let mut start = None;
        let mut end = None;
        let mut summary = None;

        for line in block.lines() {
            let Some(caps) = prop_re.captures(line.trim_end()) else {
                continue;
            };
            let tzid = tzid_re
                .captures(&caps["params"])
                .map(|c| c["tzid"].trim_matches('"').to_string());
            match &caps["name"] {
                "DTSTART" if start.is_none() => start = parse_ics_time(&caps["value"], tzid.as_deref(), tz),
                "DTEND" if end.is_none() => end = parse_ics_time(&caps["value"], tzid.as_deref(), tz),
                "SUMMARY" if summary.is_none() => {
                    let s = caps["value"].replace("\\,", ",").replace("\\;", ";");
                    summary = Some(s.trim().to_string());
                }
                _ => {}
            }
        }

        let (Some(start), Some(end)) = (start, end) else {
            warn!("skipping calendar event with unparseable start/end");
            continue;
        };
        let label = summary
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());
        debug!(%start, %end, %label, "busy interval");
        out.push(BusyInterval::new(start, end, label));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parses_utc_floating_and_date_events() {
        let ics = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\nDTSTART:20250602T140000Z\r\nDTEND:20250602T150000Z\r\nSUMMARY:Standup\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nDTSTART:20250602T120000\r\nDTEND:20250602T130000\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nDTSTART;VALUE=DATE:20250603\r\nDTEND;VALUE=DATE:20250604\r\nSUMMARY:Offsite\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";
        let tz: Tz = "America/Chicago".parse().unwrap();
        let busy = parse_ics(ics, tz).unwrap();
        assert_eq!(busy.len(), 3);
        // 14:00Z is 09:00 CDT
        assert_eq!((busy[0].start, busy[0].end), (at(2, 9, 0), at(2, 10, 0)));
        assert_eq!(busy[0].label, "Standup");
        assert_eq!(busy[1].label, "busy");
        assert_eq!(busy[1].start, at(2, 12, 0));
        assert_eq!((busy[2].start, busy[2].end), (at(3, 0, 0), at(4, 0, 0)));
    }

    #[test]
    fn test_tzid_and_folded_summary() {
        let ics = "BEGIN:VEVENT\n\
DTSTART;TZID=America/New_York:20250602T100000\n\
DTEND;TZID=America/New_York:20250602T110000\n\
SUMMARY:Quarterly planning with\n  the whole team\n\
END:VEVENT\n";
        let tz: Tz = "America/Chicago".parse().unwrap();
        let busy = parse_ics(ics, tz).unwrap();
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].start, at(2, 9, 0));
        assert_eq!(busy[0].label, "Quarterly planning with the whole team");
    }

    #[test]
    fn test_skips_unparseable_events() {
        let ics = "BEGIN:VEVENT\nDTSTART:tomorrow\nDTEND:20250602T110000\nEND:VEVENT\n";
        let tz: Tz = "UTC".parse().unwrap();
        assert!(parse_ics(ics, tz).unwrap().is_empty());
    }
}
