use chrono::{NaiveDate, NaiveDateTime};
use shagent_core::{
    advise, build_plan, unscheduled, AdviceAction, AdvisorInput, BusyInterval, DailyFocusBudget,
    EnergyCurve, EnergyLevel, MemoryLedgerStore, PlannedBlock, ScheduleOptions, Task, TaskStatus,
    TrackedTask,
};

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap().and_hms_opt(h, m, 0).unwrap()
}

fn summary(plan: &[PlannedBlock]) -> Vec<(NaiveDateTime, NaiveDateTime, String, f64)> {
    plan.iter()
        .map(|b| (b.start, b.end, b.task.id.clone(), b.energy))
        .collect()
}

fn assert_plan_invariants(plan: &[PlannedBlock], busy: &[BusyInterval], start: NaiveDateTime, end: NaiveDateTime) {
    for b in plan {
        assert_eq!(b.minutes(), b.task.duration_minutes, "block length must equal task duration");
        assert!(b.start >= start && b.end <= end, "block outside the day");
        for i in busy {
            assert!(!i.overlaps(b.start, b.end), "block {} overlaps busy {}", b.task.id, i.label);
        }
    }
    for pair in plan.windows(2) {
        assert!(pair[0].end <= pair[1].start, "blocks overlap or are out of order");
    }
}

#[test]
fn medium_task_waits_for_enough_energy() {
    let task = Task::new("A", "Write report").with_duration(50).with_energy(EnergyLevel::Medium);

    // Flat default energy never admits a medium task.
    let plan = build_plan(
        vec![task.clone()],
        at(9, 0),
        at(17, 0),
        &EnergyCurve::default(),
        Vec::new(),
        ScheduleOptions::default(),
    )
    .unwrap();
    assert!(plan.is_empty());

    let curve = EnergyCurve::from_labels([("09:00", 0.8)], 0.6).unwrap();
    let plan = build_plan(vec![task], at(9, 0), at(17, 0), &curve, Vec::new(), ScheduleOptions::default()).unwrap();
    assert_eq!(summary(&plan), vec![(at(9, 0), at(9, 50), "A".to_string(), 0.8)]);
}

#[test]
fn high_energy_task_conflicting_with_meeting_is_never_placed() {
    let curve = EnergyCurve::from_labels([("09:00", 0.95)], 0.6).unwrap();
    let a = Task::new("A", "Deep work").with_energy(EnergyLevel::High).with_duration(50).with_priority(1);
    let b = Task::new("B", "Inbox").with_energy(EnergyLevel::Low).with_duration(30).with_priority(2);
    let busy = vec![BusyInterval::new(at(9, 0), at(9, 50), "standup")];
    let tasks = vec![a.clone(), b.clone()];

    let plan = build_plan(tasks.clone(), at(9, 0), at(17, 0), &curve, busy.clone(), ScheduleOptions::default()).unwrap();
    assert_plan_invariants(&plan, &busy, at(9, 0), at(17, 0));
    assert!(plan.iter().all(|p| p.task.id != "A"));
    // B is tried at 09:15, still inside the meeting, and dropped too.
    assert!(plan.is_empty());
    assert_eq!(unscheduled(&tasks, &plan).len(), 2);

    // A shorter meeting lets B land right after the conflict step.
    let busy = vec![BusyInterval::new(at(9, 0), at(9, 15), "standup")];
    let plan = build_plan(tasks, at(9, 0), at(17, 0), &curve, busy.clone(), ScheduleOptions::default()).unwrap();
    assert_plan_invariants(&plan, &busy, at(9, 0), at(17, 0));
    assert_eq!(summary(&plan), vec![(at(9, 15), at(9, 45), "B".to_string(), 0.95)]);
}

#[test]
fn full_day_respects_plan_invariants() {
    let tasks = vec![
        Task::new("1", "Outline chapter").with_energy(EnergyLevel::High).with_duration(50).with_priority(1),
        Task::new("2", "Review PR").with_energy(EnergyLevel::Medium).with_duration(40).with_priority(1),
        Task::new("3", "Email").with_energy(EnergyLevel::Low).with_duration(20).with_priority(2),
        Task::new("4", "Expense report").with_energy(EnergyLevel::Low).with_duration(25).with_priority(4),
        Task::new("5", "Study notes").with_energy(EnergyLevel::Medium).with_duration(45).with_priority(3),
    ];
    let curve = EnergyCurve::from_labels(
        [("09:00", 0.7), ("10:00", 0.96), ("11:00", 0.9), ("13:00", 0.8), ("14:00", 0.6)],
        0.55,
    )
    .unwrap();
    let busy = vec![
        BusyInterval::new(at(12, 0), at(13, 0), "lunch"),
        BusyInterval::new(at(15, 30), at(16, 0), "1:1"),
    ];

    let plan = build_plan(tasks.clone(), at(9, 0), at(17, 0), &curve, busy.clone(), ScheduleOptions::default()).unwrap();
    assert!(!plan.is_empty());
    assert_plan_invariants(&plan, &busy, at(9, 0), at(17, 0));

    let placed = plan.len() + unscheduled(&tasks, &plan).len();
    assert_eq!(placed, tasks.len());
}

#[test]
fn tracked_focus_feeds_the_advisor() {
    let mut budget = DailyFocusBudget::new(MemoryLedgerStore::new());
    let tasks = vec![TrackedTask::new(
        Task::new("7", "Draft poem").with_energy(EnergyLevel::Low),
        TaskStatus::Ready,
    )];

    let status = budget.track(200, Some("7".into()), None, at(14, 0)).unwrap();
    assert_eq!(status.remaining_minutes, 40);
    let a = advise(&AdvisorInput { attention: 0.4, hour: 14, focus: status }, &tasks);
    assert_eq!(a.action, AdviceAction::StartTask);
    assert_eq!(a.task_id.as_deref(), Some("7"));

    let status = budget.track(40, None, None, at(15, 0)).unwrap();
    assert!(status.limit_reached);
    let a = advise(&AdvisorInput { attention: 0.9, hour: 15, focus: status }, &tasks);
    assert_eq!(a.action, AdviceAction::Rest);
}
