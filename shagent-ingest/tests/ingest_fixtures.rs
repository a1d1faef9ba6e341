use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use shagent_core::{categorize, unscheduled, BusyCalendar, EnergyCurve, SlotScheduler, Task};
use shagent_ingest::{load_goals_csv, parse_ics};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap().and_hms_opt(h, m, 0).unwrap()
}

#[test]
fn goals_sheet_loads_and_categorizes() {
    let rows = load_goals_csv(&fixture("goals.csv")).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows.iter().filter(|r| r.is_active()).count(), 4);

    let cats: Vec<_> = rows.iter().map(|r| categorize(&r.task, &r.objective)).collect();
    assert_eq!(cats[0].categories, vec!["Writing"]);
    assert_eq!(cats[1].categories, vec!["Career"]);
    assert_eq!(cats[2].categories, vec!["Mental Health"]);
}

#[test]
fn calendar_fixture_blocks_the_plan() {
    let tz: Tz = "America/Chicago".parse().unwrap();
    let text = std::fs::read_to_string(fixture("calendar.ics")).unwrap();
    let busy = parse_ics(&text, tz).unwrap();
    assert_eq!(busy.len(), 2);
    assert_eq!((busy[0].start, busy[0].end), (at(10, 0), at(10, 30)));
    assert_eq!(busy[1].label, "Lunch, with Sam");

    let rows = load_goals_csv(&fixture("goals.csv")).unwrap();
    let tasks: Vec<Task> = rows.iter().filter(|r| r.is_active()).map(|r| r.to_task()).collect();

    let scheduler = SlotScheduler::new(EnergyCurve::workday(), BusyCalendar::new(busy.clone()));
    let plan = scheduler.build_plan(tasks.clone(), at(9, 0), at(17, 30)).unwrap();

    for block in &plan {
        assert_eq!(block.minutes(), block.task.duration_minutes);
        assert!(busy.iter().all(|b| !b.overlaps(block.start, block.end)));
    }
    let placed: Vec<&str> = plan.iter().map(|b| b.task.id.as_str()).collect();
    assert_eq!(placed, vec!["2", "3"]);
    assert_eq!(plan[1].start, at(10, 40));

    // The sonnet collides with the sync and the resume task never gets 0.95.
    let left: Vec<&str> = unscheduled(&tasks, &plan).into_iter().map(|t| t.id.as_str()).collect();
    assert_eq!(left, vec!["0", "1"]);
}

#[test]
fn okr_goals_expand_into_plannable_tasks() {
    let goals = shagent_ingest::load_okr_json(&fixture("okrs.json")).unwrap();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[1].priority, 3);

    let tasks = shagent_core::goals_to_tasks(&goals, 50);
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["goal-0-kr-1", "goal-0-kr-2"]);

    let curve = EnergyCurve::from_labels([("09:00", 0.8), ("10:00", 0.8)], 0.6).unwrap();
    let plan = SlotScheduler::new(curve, BusyCalendar::empty())
        .build_plan(tasks, at(9, 0), at(12, 0))
        .unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!((plan[1].start, plan[1].end), (at(10, 0), at(10, 50)));
    assert_eq!(plan[1].task.title, "Publish one poem per week • KR2: Submit to one journal");
}
