//! DailyFocusBudget: per-day focus minutes against a fixed ceiling.
//!
//! Ledgers are append-only within a day and created lazily on the first
//! write. Persistence goes through an injected [`LedgerStore`]; callers that
//! share a store across writers must serialize read-modify-write per day.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::error::{CoreError, Result};

pub const DEFAULT_DAILY_CAP_MINUTES: i64 = 240;
pub const WARNING_THRESHOLD_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    pub timestamp: NaiveDateTime,
    pub minutes: i64,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusLedger {
    pub date: NaiveDate,
    pub total_minutes: i64,
    #[serde(default)]
    pub sessions: Vec<FocusSession>,
}

impl FocusLedger {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_minutes: 0,
            sessions: Vec::new(),
        }
    }

    fn append(&mut self, session: FocusSession) -> Result<()> {
        self.total_minutes = self
            .total_minutes
            .checked_add(session.minutes)
            .ok_or_else(|| {
                CoreError::invalid(format!(
                    "{} more minutes would overflow the total for {}",
                    session.minutes, self.date
                ))
            })?;
        self.sessions.push(session);
        Ok(())
    }
}

/// Snapshot of today's focus totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStatus {
    pub total_minutes: i64,
    pub remaining_minutes: i64,
    pub ceiling_minutes: i64,
    pub warning: bool,
    pub limit_reached: bool,
}

impl FocusStatus {
    pub fn from_total(total_minutes: i64, ceiling_minutes: i64) -> Self {
        let remaining = ceiling_minutes.saturating_sub(total_minutes).max(0);
        Self {
            total_minutes,
            remaining_minutes: remaining,
            ceiling_minutes,
            warning: remaining > 0 && remaining <= WARNING_THRESHOLD_MINUTES,
            limit_reached: remaining == 0,
        }
    }
}

/// Load/save seam for per-day ledgers.
pub trait LedgerStore {
    fn load(&self, date: NaiveDate) -> Result<Option<FocusLedger>>;
    fn save(&mut self, ledger: &FocusLedger) -> Result<()>;
}

/// Process-local store, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    ledgers: HashMap<NaiveDate, FocusLedger>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self, date: NaiveDate) -> Result<Option<FocusLedger>> {
        Ok(self.ledgers.get(&date).cloned())
    }

    fn save(&mut self, ledger: &FocusLedger) -> Result<()> {
        self.ledgers.insert(ledger.date, ledger.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DailyFocusBudget<S: LedgerStore> {
    store: S,
    ceiling_minutes: i64,
}

impl<S: LedgerStore> DailyFocusBudget<S> {
    pub fn new(store: S) -> Self {
        Self::with_ceiling(store, DEFAULT_DAILY_CAP_MINUTES)
    }

    pub fn with_ceiling(store: S, ceiling_minutes: i64) -> Self {
        Self {
            store,
            ceiling_minutes,
        }
    }

    pub fn ceiling_minutes(&self) -> i64 {
        self.ceiling_minutes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Totals for `day`; a day with no ledger reports zero minutes.
    pub fn remaining(&self, day: NaiveDate) -> Result<FocusStatus> {
        let total = self
            .store
            .load(day)?
            .map(|l| l.total_minutes)
            .unwrap_or(0);
        Ok(FocusStatus::from_total(total, self.ceiling_minutes))
    }

    /// Record a focus session at `now` (its date selects the ledger).
    pub fn track(
        &mut self,
        minutes: i64,
        task_id: Option<String>,
        task_title: Option<String>,
        now: NaiveDateTime,
    ) -> Result<FocusStatus> {
        if minutes <= 0 {
            return Err(CoreError::invalid(format!(
                "minutes must be positive (got {minutes})"
            )));
        }

        let day = now.date();
        let mut ledger = self.store.load(day)?.unwrap_or_else(|| FocusLedger::new(day));
        ledger.append(FocusSession {
            timestamp: now,
            minutes,
            task_id,
            task_title,
        })?;
        self.store.save(&ledger)?;

        let status = FocusStatus::from_total(ledger.total_minutes, self.ceiling_minutes);
        info!(
            %day,
            minutes,
            total = status.total_minutes,
            remaining = status.remaining_minutes,
            "focus tracked"
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn fresh_day_has_full_budget() {
        let b = DailyFocusBudget::new(MemoryLedgerStore::new());
        let s = b.remaining(now(9).date()).unwrap();
        assert_eq!(s.total_minutes, 0);
        assert_eq!(s.remaining_minutes, 240);
        assert!(!s.warning);
        assert!(!s.limit_reached);
    }

    #[test]
    fn non_positive_minutes_rejected() {
        let mut b = DailyFocusBudget::new(MemoryLedgerStore::new());
        assert!(b.track(0, None, None, now(9)).unwrap_err().is_invalid_input());
        assert!(b.track(-5, None, None, now(9)).unwrap_err().is_invalid_input());
        assert!(b.store().load(now(9).date()).unwrap().is_none());
    }

    #[test]
    fn tracking_decrements_remaining_exactly() {
        let mut b = DailyFocusBudget::new(MemoryLedgerStore::new());
        let before = b.remaining(now(9).date()).unwrap();
        let after = b.track(50, Some("3".into()), Some("Draft poem".into()), now(10)).unwrap();
        assert_eq!(before.remaining_minutes - after.remaining_minutes, 50);

        let ledger = b.store().load(now(10).date()).unwrap().unwrap();
        assert_eq!(ledger.sessions.len(), 1);
        assert_eq!(ledger.sessions[0].task_id.as_deref(), Some("3"));
    }

    #[test]
    fn warning_then_limit() {
        let mut b = DailyFocusBudget::new(MemoryLedgerStore::new());
        let s = b.track(215, None, None, now(9)).unwrap();
        assert_eq!(s.remaining_minutes, 25);
        assert!(s.warning);
        assert!(!s.limit_reached);

        let s = b.track(60, None, None, now(14)).unwrap();
        assert_eq!(s.total_minutes, 275);
        assert_eq!(s.remaining_minutes, 0);
        assert!(!s.warning);
        assert!(s.limit_reached);
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let mut b = DailyFocusBudget::new(MemoryLedgerStore::new());
        b.track(i64::MAX, None, None, now(9)).unwrap();
        assert!(b.track(1, None, None, now(10)).unwrap_err().is_invalid_input());

        let ledger = b.store().load(now(9).date()).unwrap().unwrap();
        assert_eq!(ledger.total_minutes, i64::MAX);
        assert_eq!(ledger.sessions.len(), 1);
    }

    #[test]
    fn days_are_independent() {
        let mut b = DailyFocusBudget::with_ceiling(MemoryLedgerStore::new(), 100);
        b.track(100, None, None, now(9)).unwrap();
        let next_day = now(9).date().succ_opt().unwrap();
        assert_eq!(b.remaining(next_day).unwrap().remaining_minutes, 100);
    }
}
