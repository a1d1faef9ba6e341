use anyhow::{bail, Context, Result};
use chrono::{NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use shagent_core::time::{day_bounds, to_local};
use shagent_core::{
    actionability_report, advise, attention_nudge, categorize, check_attention, context_questions,
    goals_to_tasks, heuristic_critique, parse_generated_critique, record_answers, set_status, summarize,
    today_overview, unscheduled, AdvisorInput, BusyCalendar, ContextStore, DailyFocusBudget,
    PlannedBlock, SlotScheduler, Task, TaskCard, TaskStatus, TrackedTask,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod calendar;
mod config;
mod llm;
mod setup;
mod state;
mod tasks;

use config::Config;
use state::{JsonContextStore, JsonLedgerStore};

#[derive(Parser, Debug)]
#[command(
    name = "shagent",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SHAGENT_BUILD_SHA"), ")"),
    about = "Energy-aware day planner with a focus budget"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Goals CSV (defaults to [profile] goals_csv)
    #[arg(long, global = true)]
    goals: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive setup: write ~/.shagent/config.toml
    Setup,

    /// Build today's plan from ready tasks, energy and calendar
    Plan(PlanArgs),

    /// Daily focus budget
    Focus {
        #[command(subcommand)]
        command: FocusCommand,
    },

    /// Record an attention ping (0.0-1.0) and print a nudge
    Attention { score: f64 },

    /// Recommend the next action
    Next {
        /// Attention to use instead of the last recorded ping
        #[arg(long)]
        attention: Option<f64>,
    },

    /// Today's tasks by category and status
    Today,

    /// Task context answers and status
    Context {
        #[command(subcommand)]
        command: ContextCommand,
    },

    /// Goal sheet utilities
    Goals {
        #[command(subcommand)]
        command: GoalsCommand,
    },

    /// Calendar feed utilities
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },

    /// Critique a piece of writing
    Critique {
        file: PathBuf,

        /// Critique goal (e.g. audience, seo, publication)
        #[arg(long, default_value = "audience")]
        mode: String,

        /// Free-text detail about the target
        #[arg(long, default_value = "")]
        target: String,
    },
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Day start HH:MM (default [schedule] day_start)
    #[arg(long)]
    start: Option<String>,

    /// Day end HH:MM (default [schedule] day_end)
    #[arg(long)]
    end: Option<String>,

    /// Calendar ICS feed (default [schedule] calendar_ics_url)
    #[arg(long)]
    ics_url: Option<String>,

    /// Calendar CSV with start,end,title (default [schedule] calendar_csv)
    #[arg(long)]
    busy_csv: Option<PathBuf>,

    /// Also write the plan as an ICS file
    #[arg(long)]
    export_ics: Option<PathBuf>,

    /// OKR goals (JSON); each key result becomes one focus-block task
    #[arg(long)]
    okrs: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum FocusCommand {
    /// Log a focus session
    Track {
        minutes: i64,
        #[arg(long)]
        task_id: Option<String>,
        #[arg(long)]
        task_title: Option<String>,
    },
    /// Minutes left today
    Remaining,
}

#[derive(Subcommand, Debug)]
enum ContextCommand {
    /// Which tasks are actionable and which still need context
    Check,
    /// Stored context for a task
    Show { id: String },
    /// Answer a task's context questions interactively
    Answer { id: String },
    /// Force a task status (needs-info, ready, in-progress, completed)
    Status { id: String, status: String },
    /// Questions asked for a domain/objective pair
    Questions { domain: String, objective: String },
}

#[derive(Subcommand, Debug)]
enum GoalsCommand {
    /// Tag goal rows by life area and count them
    Categorize,
}

#[derive(Subcommand, Debug)]
enum CalendarCommand {
    /// List busy intervals from an ICS feed
    Busy {
        /// Feed URL (default [schedule] calendar_ics_url)
        url: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "shagent=debug" } else { "shagent=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn local_now(tz: Tz) -> NaiveDateTime {
    to_local(Utc::now(), tz)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config()?;
    let json = cli.json;
    let goals = cli.goals;

    match cli.command {
        Command::Setup => setup::run_setup()?,
        Command::Plan(args) => cmd_plan(&cfg, goals, args, json).await?,
        Command::Focus { command } => cmd_focus(&cfg, command, json)?,
        Command::Attention { score } => cmd_attention(&cfg, score, json)?,
        Command::Next { attention } => cmd_next(&cfg, goals, attention, json)?,
        Command::Today => cmd_today(&cfg, goals, json)?,
        Command::Context { command } => cmd_context(&cfg, goals, command, json)?,
        Command::Goals { command } => match command {
            GoalsCommand::Categorize => cmd_categorize(&cfg, goals, json)?,
        },
        Command::Calendar { command } => match command {
            CalendarCommand::Busy { url } => cmd_calendar_busy(&cfg, url, json).await?,
        },
        Command::Critique { file, mode, target } => cmd_critique(&cfg, &file, &mode, &target, json).await?,
    }

    Ok(())
}

fn load_cards(cfg: &Config, goals: Option<PathBuf>) -> Result<Vec<TaskCard>> {
    let contexts = JsonContextStore::open_default()?.load_all()?;
    tasks::load_cards(&tasks::goals_path(cfg, goals)?, &contexts)
}

fn focus_budget(cfg: &Config) -> Result<DailyFocusBudget<JsonLedgerStore>> {
    Ok(DailyFocusBudget::with_ceiling(
        JsonLedgerStore::open_default()?,
        cfg.focus.daily_cap_minutes,
    ))
}

fn print_block(b: &PlannedBlock) {
    println!(
        "{}-{}  [{:<6} {:.2}]  {}  (#{})",
        b.start.format("%H:%M"),
        b.end.format("%H:%M"),
        b.task.energy,
        b.energy,
        b.task.title,
        b.task.id
    );
}

async fn cmd_plan(cfg: &Config, goals: Option<PathBuf>, args: PlanArgs, json: bool) -> Result<()> {
    let tz = cfg.timezone()?;
    let now = local_now(tz);
    let start = args.start.unwrap_or_else(|| cfg.schedule.day_start.clone());
    let end = args.end.unwrap_or_else(|| cfg.schedule.day_end.clone());
    let (day_start, day_end) = day_bounds(now.date(), &start, &end)?;

    let options = cfg.schedule_options();
    // An OKR file alone is enough; the goals sheet is optional then.
    let has_sheet = goals.is_some() || cfg.profile.goals_csv.is_some();
    let mut tasks: Vec<Task> = if has_sheet || args.okrs.is_none() {
        load_cards(cfg, goals)?
            .iter()
            .filter(|c| c.status().is_workable())
            .map(|c| c.tracked.task.clone())
            .collect()
    } else {
        Vec::new()
    };
    if let Some(p) = &args.okrs {
        let okr_tasks = goals_to_tasks(&shagent_ingest::load_okr_json(p)?, options.block_minutes);
        info!(path = %p.display(), tasks = okr_tasks.len(), "OKR tasks added");
        tasks.extend(okr_tasks);
    }

    let mut busy = Vec::new();
    if let Some(url) = args.ics_url.or_else(|| cfg.schedule.calendar_ics_url.clone()) {
        busy.extend(calendar::busy_from_ics_url(&url, tz).await);
    }
    if let Some(p) = args.busy_csv.or_else(|| cfg.schedule.calendar_csv.clone()) {
        busy.extend(calendar::busy_from_csv(&p, tz));
    }

    let scheduler = SlotScheduler::new(cfg.energy_curve()?, BusyCalendar::new(busy))
        .with_options(options);
    let plan = scheduler.build_plan(tasks.clone(), day_start, day_end)?;
    let left = unscheduled(&tasks, &plan);

    if let Some(out) = &args.export_ics {
        fs::write(out, calendar::plan_to_ics(&plan, tz)).with_context(|| format!("write {}", out.display()))?;
        info!(path = %out.display(), blocks = plan.len(), "plan exported");
    }

    if json {
        return print_json(&json!({
            "date": now.date(),
            "day_start": day_start,
            "day_end": day_end,
            "plan": plan,
            "unscheduled": left.iter().map(|t| &t.id).collect::<Vec<_>>(),
        }));
    }

    println!(
        "# Plan for {} ({}-{}, {})\n",
        now.date(),
        day_start.format("%H:%M"),
        day_end.format("%H:%M"),
        tz
    );
    if plan.is_empty() {
        println!("Nothing fits today with the current energy curve and calendar.");
    }
    for b in &plan {
        print_block(b);
    }
    if !left.is_empty() {
        println!("\nUnscheduled ({}):", left.len());
        for t in &left {
            println!("- {} ({} min, {} energy, #{})", t.title, t.duration_minutes, t.energy, t.id);
        }
    }
    Ok(())
}

fn cmd_focus(cfg: &Config, command: FocusCommand, json: bool) -> Result<()> {
    let tz = cfg.timezone()?;
    let now = local_now(tz);
    let mut budget = focus_budget(cfg)?;

    let status = match command {
        FocusCommand::Track { minutes, task_id, task_title } => {
            budget.track(minutes, task_id, task_title, now)?
        }
        FocusCommand::Remaining => budget.remaining(now.date())?,
    };

    if json {
        return print_json(&status);
    }
    println!(
        "Focus today: {} min used, {} of {} min left",
        status.total_minutes, status.remaining_minutes, status.ceiling_minutes
    );
    if status.limit_reached {
        println!("Daily focus limit reached. Time to recharge.");
    } else if status.warning {
        println!("Heads up: less than 30 minutes of focus left today.");
    }
    Ok(())
}

fn cmd_attention(cfg: &Config, score: f64, json: bool) -> Result<()> {
    let score = check_attention(score)?;
    let tz = cfg.timezone()?;
    let p = state::attention_path()?;
    state::write_attention(
        &p,
        &state::AttentionState {
            last: score,
            recorded_at: Some(local_now(tz)),
        },
    )?;
    let nudge = attention_nudge(score);
    if json {
        return print_json(&json!({ "ok": true, "nudge": nudge, "attention": score }));
    }
    println!("{nudge}");
    Ok(())
}

fn cmd_next(cfg: &Config, goals: Option<PathBuf>, attention: Option<f64>, json: bool) -> Result<()> {
    let tz = cfg.timezone()?;
    let now = local_now(tz);
    let attention = match attention {
        Some(a) => a,
        None => state::read_attention(&state::attention_path()?)?.last,
    };
    let focus = focus_budget(cfg)?.remaining(now.date())?;
    let tracked: Vec<TrackedTask> = load_cards(cfg, goals)?.into_iter().map(|c| c.tracked).collect();

    let input = AdvisorInput::new(attention, now.hour(), focus)?;
    let advice = advise(&input, &tracked);
    if json {
        return print_json(&json!({ "advice": advice, "attention": attention }));
    }
    println!("{}", advice.message);
    println!("  why: {}", advice.rationale);
    if let Some(m) = advice.estimated_minutes {
        println!("  estimate: {m} min");
    }
    Ok(())
}

fn cmd_today(cfg: &Config, goals: Option<PathBuf>, json: bool) -> Result<()> {
    let now = local_now(cfg.timezone()?);
    let focus = focus_budget(cfg)?.remaining(now.date())?;
    let cards = load_cards(cfg, goals)?;
    let overview = today_overview(&cards, focus);
    if json {
        return print_json(&overview);
    }

    let s = overview.summary;
    println!("# Today ({})\n", now.date());
    println!(
        "{} tasks: {} ready, {} need context, {} in progress, {} completed",
        s.total, s.ready, s.needs_context, s.in_progress, s.completed
    );
    println!(
        "Focus: {} of {} min left\n",
        overview.focus_limit.remaining_minutes, overview.focus_limit.ceiling_minutes
    );
    for bucket in overview.categories.values() {
        println!("## {}", bucket.name);
        for c in &bucket.tasks {
            println!("- [{}] {} (#{})", c.status(), c.tracked.task.title, c.id());
        }
        println!();
    }
    Ok(())
}

fn cmd_context(cfg: &Config, goals: Option<PathBuf>, command: ContextCommand, json: bool) -> Result<()> {
    let mut store = JsonContextStore::open_default()?;

    match command {
        ContextCommand::Check => {
            let report = actionability_report(&load_cards(cfg, goals)?);
            if json {
                return print_json(&report);
            }
            println!("Ready: {}", report.ready.len());
            for e in &report.ready {
                println!("- {} (#{}, p{})", e.title, e.id, e.priority);
            }
            println!("\nIn progress: {}", report.in_progress.len());
            for e in &report.in_progress {
                println!("- {} (#{})", e.title, e.id);
            }
            println!("\nNeeds context: {}", report.needs_context.len());
            for e in &report.needs_context {
                println!("- {} (#{}) [{}]", e.title, e.id, e.domain);
                for q in &e.missing_context {
                    println!("    ? {q}");
                }
            }
        }

        ContextCommand::Show { id } => {
            let contexts = store.load_all()?;
            match contexts.get(&id) {
                Some(entry) => print_json(entry)?,
                None => println!("No context stored for task #{id}"),
            }
        }

        ContextCommand::Answer { id } => {
            let cards = load_cards(cfg, goals)?;
            let Some(card) = cards.iter().find(|c| c.id() == id) else {
                bail!("no active task #{id} in the goals sheet");
            };
            if card.context_questions.is_empty() {
                println!("Task #{id} has no context questions.");
                return Ok(());
            }
            println!("Context for: {}\n", card.tracked.task.title);
            let mut answers = BTreeMap::new();
            for q in &card.context_questions {
                let a = setup::prompt(q, "")?;
                if !a.is_empty() {
                    answers.insert(q.clone(), a);
                }
            }
            if answers.is_empty() {
                println!("No answers given; nothing saved.");
                return Ok(());
            }
            let mut contexts = store.load_all()?;
            let status = record_answers(&mut contexts, &id, answers, local_now(cfg.timezone()?));
            store.save_all(&contexts)?;
            println!("Saved. Task #{id} is now {status}.");
        }

        ContextCommand::Status { id, status } => {
            let status: TaskStatus = status.parse()?;
            let mut contexts = store.load_all()?;
            set_status(&mut contexts, &id, status, local_now(cfg.timezone()?));
            store.save_all(&contexts)?;
            println!("Task #{id} marked {status}.");
        }

        ContextCommand::Questions { domain, objective } => {
            let questions = context_questions(&domain, &objective);
            if json {
                return print_json(&questions);
            }
            if questions.is_empty() {
                println!("No context questions for {domain} / {objective}.");
            }
            for q in questions {
                println!("- {q}");
            }
        }
    }
    Ok(())
}

fn cmd_categorize(cfg: &Config, goals: Option<PathBuf>, json: bool) -> Result<()> {
    let rows = shagent_ingest::load_goals_csv(&tasks::goals_path(cfg, goals)?)?;
    let results: Vec<_> = rows.iter().map(|r| categorize(&r.task, &r.objective)).collect();
    let summary = summarize(results.iter());

    if json {
        let sample: Vec<_> = rows
            .iter()
            .zip(&results)
            .take(20)
            .map(|(r, c)| json!({ "id": r.id, "task": r.task, "categories": c.joined(), "multi_goal": c.multi_goal }))
            .collect();
        return print_json(&json!({ "summary": summary, "sample": sample }));
    }

    println!("{} goal rows", rows.len());
    for (cat, n) in &summary.by_category {
        println!("- {cat}: {n}");
    }
    println!("Multi-goal tasks: {}", summary.multi_goal_tasks);
    Ok(())
}

async fn cmd_calendar_busy(cfg: &Config, url: Option<String>, json: bool) -> Result<()> {
    let Some(url) = url.or_else(|| cfg.schedule.calendar_ics_url.clone()) else {
        bail!("no calendar URL; pass one or set [schedule] calendar_ics_url");
    };
    let tz = cfg.timezone()?;
    let text = calendar::fetch_ics(&url).await?;
    let busy = shagent_ingest::parse_ics(&text, tz)?;
    if json {
        return print_json(&busy);
    }
    for b in &busy {
        println!("{} - {}  {}", b.start.format("%Y-%m-%d %H:%M"), b.end.format("%H:%M"), b.label);
    }
    Ok(())
}

async fn cmd_critique(cfg: &Config, file: &Path, mode: &str, target: &str, json: bool) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let system = "You are a writing coach. Reply with one JSON object that follows the given schema.";
    let prompt = shagent_core::writing::critique_prompt(&text, mode, target);

    let generated = match llm::LlmClient::new(cfg.llm.clone()) {
        Ok(client) => client.complete(system, &prompt).await,
        Err(e) => Err(e),
    };
    let critique = match generated.and_then(|g| Ok(parse_generated_critique(&g)?)) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "generated critique unavailable; using heuristic");
            heuristic_critique(&text, mode)
        }
    };

    if json {
        return print_json(&critique);
    }
    println!("{}\n", critique.doc_summary);
    if let Some(layers) = critique.layers.as_object() {
        for (name, layer) in layers {
            match layer.get("score") {
                Some(score) => println!("{name}: {score}"),
                None => println!("{name}"),
            }
        }
    }
    Ok(())
}
