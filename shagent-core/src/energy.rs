//! EnergyCurve: sparse hour-of-day -> energy level mapping.
//!
//! Lookups truncate to the hour; there is no interpolation between samples.
//! Hours without a sample fall back to the curve's default level.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

pub const DEFAULT_ENERGY: f64 = 0.6;

/// One hourly sample of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySample {
    /// Hour of day (0-23).
    pub hour: u32,
    /// Energy level (0.0-1.0).
    pub level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCurve {
    points: BTreeMap<u32, f64>,
    default_level: f64,
}

impl Default for EnergyCurve {
    fn default() -> Self {
        Self::new(DEFAULT_ENERGY)
    }
}

impl EnergyCurve {
    /// Empty curve: every hour reports `default_level`.
    pub fn new(default_level: f64) -> Self {
        Self {
            points: BTreeMap::new(),
            default_level: default_level.clamp(0.0, 1.0),
        }
    }

    /// Typical workday curve: morning peak, post-lunch dip, late fade.
    pub fn workday() -> Self {
        let mut c = Self::default();
        for (hour, level) in [(9, 0.6), (10, 0.8), (11, 0.9), (13, 0.7), (15, 0.6), (16, 0.5)] {
            c.points.insert(hour, level);
        }
        c
    }

    /// Build from caller-supplied labels like "09:00" -> 0.8.
    pub fn from_labels<'a, I>(labels: I, default_level: f64) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        if !(0.0..=1.0).contains(&default_level) {
            return Err(CoreError::invalid(format!(
                "default energy must be within 0..=1 (got {default_level})"
            )));
        }
        let mut c = Self::new(default_level);
        for (label, level) in labels {
            let hour = parse_hour_label(label)?;
            c.set(hour, level)?;
        }
        Ok(c)
    }

    pub fn with_sample(mut self, hour: u32, level: f64) -> Result<Self> {
        self.set(hour, level)?;
        Ok(self)
    }

    pub fn set(&mut self, hour: u32, level: f64) -> Result<()> {
        if hour > 23 {
            return Err(CoreError::invalid(format!("hour must be 0..=23 (got {hour})")));
        }
        if !(0.0..=1.0).contains(&level) {
            return Err(CoreError::invalid(format!(
                "energy level for {hour:02}:00 must be within 0..=1 (got {level})"
            )));
        }
        self.points.insert(hour, level);
        Ok(())
    }

    pub fn default_level(&self) -> f64 {
        self.default_level
    }

    /// Energy at `at`, snapped down to its hour.
    pub fn level_at(&self, at: NaiveDateTime) -> f64 {
        self.points
            .get(&at.hour())
            .copied()
            .unwrap_or(self.default_level)
    }

    pub fn samples(&self) -> Vec<EnergySample> {
        self.points
            .iter()
            .map(|(&hour, &level)| EnergySample { hour, level })
            .collect()
    }
}

/// "9:00" / "09:00" -> 9. Labels must sit on the hour.
fn parse_hour_label(label: &str) -> Result<u32> {
    let bad = || CoreError::invalid(format!("energy curve key '{label}' must look like HH:00"));
    let (h, m) = label.trim().split_once(':').ok_or_else(bad)?;
    let hour: u32 = h.parse().map_err(|_| bad())?;
    if m != "00" || hour > 23 {
        return Err(bad());
    }
    Ok(hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn snaps_down_to_hour() {
        let c = EnergyCurve::workday();
        assert_eq!(c.level_at(at(10, 0)), 0.8);
        assert_eq!(c.level_at(at(10, 59)), 0.8);
        assert_eq!(c.level_at(at(11, 15)), 0.9);
    }

    #[test]
    fn missing_hour_uses_default() {
        let c = EnergyCurve::workday();
        assert_eq!(c.level_at(at(12, 30)), DEFAULT_ENERGY);
        assert_eq!(EnergyCurve::new(0.4).level_at(at(3, 0)), 0.4);
    }

    #[test]
    fn from_labels_accepts_single_digit_hours() {
        let c = EnergyCurve::from_labels([("9:00", 0.8), ("14:00", 0.55)], 0.6).unwrap();
        assert_eq!(c.level_at(at(9, 40)), 0.8);
        assert_eq!(c.samples().len(), 2);
        assert_eq!(c.samples()[0], EnergySample { hour: 9, level: 0.8 });
    }

    #[test]
    fn from_labels_rejects_bad_input() {
        assert!(EnergyCurve::from_labels([("09:30", 0.8)], 0.6).is_err());
        assert!(EnergyCurve::from_labels([("nine", 0.8)], 0.6).is_err());
        assert!(EnergyCurve::from_labels([("09:00", 1.4)], 0.6).is_err());
        assert!(EnergyCurve::from_labels(Vec::<(&str, f64)>::new(), 1.2).is_err());
    }
}
