use anyhow::{Context, Result};
use shagent_core::time::{parse_clock, parse_timezone};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::{load_config, save_config, Config};

pub(crate) fn prompt(label: &str, current: &str) -> Result<String> {
    if current.is_empty() {
        print!("{}: ", label);
    } else {
        print!("{} [{}]: ", label, current);
    }
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    let s = s.trim();
    Ok(if s.is_empty() { current.to_string() } else { s.to_string() })
}

fn prompt_multiline(label: &str) -> Result<Vec<String>> {
    println!("{} (enter one per line; blank line to finish)", label);
    let mut out = Vec::new();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut s = String::new();
        io::stdin().read_line(&mut s)?;
        let s = s.trim().to_string();
        if s.is_empty() {
            break;
        }
        out.push(s);
    }
    Ok(out)
}

/// Parse "HH:00=level" lines into curve entries.
fn parse_curve_lines(lines: &[String]) -> Result<Vec<(String, f64)>> {
    lines
        .iter()
        .map(|l| -> Result<(String, f64)> {
            let (label, level) = l
                .split_once('=')
                .with_context(|| format!("expected HH:00=level, got '{l}'"))?;
            let level: f64 = level
                .trim()
                .parse()
                .with_context(|| format!("bad energy level in '{l}'"))?;
            Ok((label.trim().to_string(), level))
        })
        .collect()
}

pub fn run_setup() -> Result<()> {
    println!("shagent setup\n");
    let mut cfg = load_config().unwrap_or_else(|_| Config::default());

    let tz = prompt("Timezone (IANA)", &cfg.profile.timezone)?;
    parse_timezone(&tz)?;
    cfg.profile.timezone = tz;

    let current_goals = cfg
        .profile
        .goals_csv
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let goals = prompt("Goals CSV path", &current_goals)?;
    cfg.profile.goals_csv = (!goals.is_empty()).then(|| PathBuf::from(goals));

    let start = prompt("Day start (HH:MM)", &cfg.schedule.day_start)?;
    parse_clock(&start)?;
    cfg.schedule.day_start = start;

    let end = prompt("Day end (HH:MM)", &cfg.schedule.day_end)?;
    parse_clock(&end)?;
    cfg.schedule.day_end = end;

    let cap = prompt("Daily focus cap (minutes)", &cfg.focus.daily_cap_minutes.to_string())?;
    cfg.focus.daily_cap_minutes = cap.parse().context("focus cap must be a whole number")?;

    let ics = prompt(
        "Calendar ICS URL (optional)",
        cfg.schedule.calendar_ics_url.as_deref().unwrap_or(""),
    )?;
    cfg.schedule.calendar_ics_url = (!ics.is_empty()).then_some(ics);

    let curve = parse_curve_lines(&prompt_multiline(
        "Energy samples as HH:00=level (blank keeps the current curve)",
    )?)?;
    if !curve.is_empty() {
        cfg.schedule.energy_curve = curve.into_iter().collect();
    }
    cfg.energy_curve()?;

    let p = save_config(&cfg)?;
    println!("\nWrote {}", p.display());

    println!("\nNext recommended steps:");
    println!("- export OPENAI_API_KEY or ANTHROPIC_API_KEY   (optional, for writing critique)");
    println!("- shagent context check");
    println!("- shagent plan");

    Ok(())
}
