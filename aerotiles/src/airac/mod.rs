//! AIRAC cycle calendar.
//!
//! Aeronautical data is published in fixed 28-day cycles. Cycle 1 starts at
//! a reference date injected into [`CycleCalculator`]; every later cycle
//! starts exactly 28 days after the previous one.
//!
//! Cycles are also known by a `YYNN` identifier: the two-digit year of the
//! cycle start followed by the ordinal of the cycle within that year.
//!
//! # Example
//!
//! ```
//! use aerotiles::airac::{CycleCalculator, FixedClock};
//! use chrono::NaiveDate;
//!
//! let reference = NaiveDate::from_ymd_opt(2025, 1, 23).unwrap();
//! let today = NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
//! let calc = CycleCalculator::with_clock(reference, FixedClock(today));
//!
//! assert!(calc.is_cycle_start(today));
//! assert_eq!(calc.current_cycle().unwrap().ident(), "2502");
//! ```

mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

/// Length of one AIRAC cycle in days.
pub const CYCLE_DAYS: i64 = 28;

/// First AIRAC cycle of 2025 (2501).
pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 23).unwrap_or(NaiveDate::MIN)
}

/// Errors raised by cycle computations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiracError {
    /// The date lies before the first cycle.
    #[error("Date {date} precedes the AIRAC reference date {reference}")]
    InvalidDate {
        date: NaiveDate,
        reference: NaiveDate,
    },
}

/// One 28-day AIRAC cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    number: u32,
    start: NaiveDate,
    ident: String,
}

impl Cycle {
    fn nth(reference: NaiveDate, number: u32) -> Self {
        let start = reference + Duration::days(CYCLE_DAYS * (i64::from(number) - 1));
        Self {
            number,
            start,
            ident: cycle_ident(reference, start),
        }
    }

    /// Sequential cycle number; cycle 1 starts at the reference date.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// First day of the cycle.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the cycle (start + 27 days).
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(CYCLE_DAYS - 1)
    }

    /// First day of the following cycle.
    pub fn next_start(&self) -> NaiveDate {
        self.start + Duration::days(CYCLE_DAYS)
    }

    /// `YYNN` identifier, e.g. `2502`.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Whether `date` falls inside this cycle.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.ident, self.start, self.end())
    }
}

/// Computes the `YYNN` identifier of the cycle starting at `start`.
///
/// `NN` counts the grid starts within the calendar year of `start`, so the
/// first cycle starting on or after 1 January is `01`.
fn cycle_ident(reference: NaiveDate, start: NaiveDate) -> String {
    let year = start.year();
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(start);

    let to_jan1 = (jan1 - reference).num_days();
    let first_of_year = if to_jan1 > 0 {
        // Smallest grid date on or after 1 January
        let cycles = (to_jan1 + CYCLE_DAYS - 1).div_euclid(CYCLE_DAYS);
        reference + Duration::days(cycles * CYCLE_DAYS)
    } else {
        reference
    };

    let ordinal = (start - first_of_year).num_days().div_euclid(CYCLE_DAYS) + 1;
    format!("{:02}{:02}", year.rem_euclid(100), ordinal)
}

/// Pure AIRAC date arithmetic over an injected reference date and clock.
#[derive(Debug, Clone)]
pub struct CycleCalculator<C: Clock = SystemClock> {
    reference: NaiveDate,
    clock: C,
}

impl CycleCalculator<SystemClock> {
    /// Creates a calculator that reads "today" from the system clock (UTC).
    pub fn new(reference: NaiveDate) -> Self {
        Self::with_clock(reference, SystemClock)
    }
}

impl<C: Clock> CycleCalculator<C> {
    /// Creates a calculator with an explicit clock.
    pub fn with_clock(reference: NaiveDate, clock: C) -> Self {
        Self { reference, clock }
    }

    /// The start date of cycle 1.
    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// Returns the cycle containing `date`.
    ///
    /// # Errors
    ///
    /// [`AiracError::InvalidDate`] if `date` precedes the reference date.
    pub fn cycle_for(&self, date: NaiveDate) -> Result<Cycle, AiracError> {
        let elapsed = (date - self.reference).num_days();
        if elapsed < 0 {
            return Err(AiracError::InvalidDate {
                date,
                reference: self.reference,
            });
        }

        let count = elapsed.div_euclid(CYCLE_DAYS);
        Ok(Cycle::nth(self.reference, count as u32 + 1))
    }

    /// True iff `date` is the first day of some cycle.
    pub fn is_cycle_start(&self, date: NaiveDate) -> bool {
        let elapsed = (date - self.reference).num_days();
        elapsed >= 0 && elapsed % CYCLE_DAYS == 0
    }

    /// The cycle containing today's date.
    pub fn current_cycle(&self) -> Result<Cycle, AiracError> {
        self.cycle_for(self.clock.today())
    }

    /// Whether today starts a new cycle.
    pub fn is_cycle_start_today(&self) -> bool {
        self.is_cycle_start(self.clock.today())
    }

    /// The next `n` cycles strictly after the one containing today.
    ///
    /// If today precedes the reference date the sequence starts at cycle 1.
    pub fn future_cycles(&self, n: usize) -> FutureCycles {
        let first = match self.current_cycle() {
            Ok(current) => current.number() + 1,
            Err(_) => 1,
        };

        FutureCycles {
            reference: self.reference,
            first,
            count: n,
        }
    }
}

/// A finite, restartable sequence of consecutive cycles.
///
/// Cycles are computed lazily; iterating the same value twice yields the
/// same cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FutureCycles {
    reference: NaiveDate,
    first: u32,
    count: usize,
}

impl FutureCycles {
    /// Starts a fresh pass over the sequence.
    pub fn iter(&self) -> FutureCyclesIter {
        FutureCyclesIter {
            reference: self.reference,
            next: self.first,
            remaining: self.count,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl IntoIterator for FutureCycles {
    type Item = Cycle;
    type IntoIter = FutureCyclesIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &FutureCycles {
    type Item = Cycle;
    type IntoIter = FutureCyclesIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over [`FutureCycles`].
#[derive(Debug, Clone)]
pub struct FutureCyclesIter {
    reference: NaiveDate,
    next: u32,
    remaining: usize,
}

impl Iterator for FutureCyclesIter {
    type Item = Cycle;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let cycle = Cycle::nth(self.reference, self.next);
        self.next += 1;
        self.remaining -= 1;
        Some(cycle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for FutureCyclesIter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calc_at(today: NaiveDate) -> CycleCalculator<FixedClock> {
        CycleCalculator::with_clock(date(2025, 1, 23), FixedClock(today))
    }

    #[test]
    fn test_reference_cycle_boundaries() {
        let calc = calc_at(date(2025, 1, 23));
        assert!(calc.is_cycle_start(date(2025, 1, 23)));
        assert!(calc.is_cycle_start(date(2025, 2, 20)));
        assert!(!calc.is_cycle_start(date(2025, 1, 24)));
        assert!(!calc.is_cycle_start(date(2024, 12, 26)));
    }

    #[test]
    fn test_cycle_for_reference_date() {
        let calc = calc_at(date(2025, 1, 23));
        let cycle = calc.cycle_for(date(2025, 1, 23)).unwrap();
        assert_eq!(cycle.number(), 1);
        assert_eq!(cycle.start(), date(2025, 1, 23));
        assert_eq!(cycle.end(), date(2025, 2, 19));
        assert_eq!(cycle.ident(), "2501");
    }

    #[test]
    fn test_cycle_for_mid_cycle() {
        let calc = calc_at(date(2025, 3, 1));
        let cycle = calc.cycle_for(date(2025, 3, 1)).unwrap();
        assert_eq!(cycle.number(), 2);
        assert_eq!(cycle.start(), date(2025, 2, 20));
        assert_eq!(cycle.ident(), "2502");
        assert!(cycle.contains(date(2025, 3, 19)));
        assert!(!cycle.contains(date(2025, 3, 20)));
        assert_eq!(cycle.next_start(), date(2025, 3, 20));
    }

    #[test]
    fn test_cycle_for_before_reference_fails() {
        let calc = calc_at(date(2025, 1, 23));
        assert_eq!(
            calc.cycle_for(date(2025, 1, 22)),
            Err(AiracError::InvalidDate {
                date: date(2025, 1, 22),
                reference: date(2025, 1, 23),
            })
        );
    }

    #[test]
    fn test_ident_resets_each_year() {
        let calc = calc_at(date(2026, 1, 22));
        // 2025 has 13 cycles; the 14th starts 2026-01-22
        let last_2025 = calc.cycle_for(date(2025, 12, 31)).unwrap();
        assert_eq!(last_2025.start(), date(2025, 12, 25));
        assert_eq!(last_2025.ident(), "2513");

        let first_2026 = calc.current_cycle().unwrap();
        assert_eq!(first_2026.start(), date(2026, 1, 22));
        assert_eq!(first_2026.ident(), "2601");
    }

    #[test]
    fn test_is_cycle_start_today() {
        assert!(calc_at(date(2025, 2, 20)).is_cycle_start_today());
        assert!(!calc_at(date(2025, 2, 21)).is_cycle_start_today());
    }

    #[test]
    fn test_future_cycles_follow_current() {
        let calc = calc_at(date(2025, 3, 1));
        let future = calc.future_cycles(3);
        let starts: Vec<_> = future.iter().map(|c| c.start()).collect();
        assert_eq!(
            starts,
            vec![date(2025, 3, 20), date(2025, 4, 17), date(2025, 5, 15)]
        );
    }

    #[test]
    fn test_future_cycles_restartable() {
        let calc = calc_at(date(2025, 3, 1));
        let future = calc.future_cycles(5);
        let first: Vec<_> = (&future).into_iter().collect();
        let second: Vec<_> = future.iter().collect();
        assert_eq!(first, second);
        assert_eq!(future.len(), 5);
        assert_eq!(future.iter().len(), 5);
    }

    #[test]
    fn test_future_cycles_before_reference_start_at_first() {
        let calc = calc_at(date(2024, 6, 1));
        let cycles: Vec<_> = calc.future_cycles(2).into_iter().collect();
        assert_eq!(cycles[0].number(), 1);
        assert_eq!(cycles[0].start(), date(2025, 1, 23));
        assert_eq!(cycles[1].number(), 2);
    }

    #[test]
    fn test_future_cycles_zero_is_empty() {
        let calc = calc_at(date(2025, 3, 1));
        let future = calc.future_cycles(0);
        assert!(future.is_empty());
        assert_eq!(future.iter().count(), 0);
    }

    #[test]
    fn test_cycle_display() {
        let calc = calc_at(date(2025, 1, 23));
        let cycle = calc.cycle_for(date(2025, 1, 23)).unwrap();
        assert_eq!(cycle.to_string(), "2501 (2025-01-23 - 2025-02-19)");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_grid_dates_are_cycle_starts(k in 0i64..2000) {
                let calc = calc_at(date(2025, 1, 23));
                let start = date(2025, 1, 23) + Duration::days(CYCLE_DAYS * k);
                prop_assert!(calc.is_cycle_start(start));
                prop_assert!(!calc.is_cycle_start(start + Duration::days(1)));
            }

            #[test]
            fn test_dates_before_reference_fail(days in 1i64..100_000) {
                let calc = calc_at(date(2025, 1, 23));
                let before = date(2025, 1, 23) - Duration::days(days);
                prop_assert!(calc.cycle_for(before).is_err());
                prop_assert!(!calc.is_cycle_start(before));
            }

            #[test]
            fn test_cycle_contains_its_date(days in 0i64..20_000) {
                let calc = calc_at(date(2025, 1, 23));
                let day = date(2025, 1, 23) + Duration::days(days);
                let cycle = calc.cycle_for(day)?;
                prop_assert!(cycle.contains(day));
                prop_assert!(calc.is_cycle_start(cycle.start()));
                prop_assert_eq!((cycle.end() - cycle.start()).num_days(), CYCLE_DAYS - 1);
            }

            #[test]
            fn test_ident_ordinal_within_year(days in 0i64..20_000) {
                let calc = calc_at(date(2025, 1, 23));
                let cycle = calc.cycle_for(date(2025, 1, 23) + Duration::days(days))?;
                let ordinal: u32 = cycle.ident()[2..].parse().unwrap();
                prop_assert!((1..=14).contains(&ordinal));
            }
        }
    }
}
