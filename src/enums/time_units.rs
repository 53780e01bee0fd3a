// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **TimeUnits Module** - *Temporal Units and Date Offsets*
//!
//! Defines the time units used to build datetime and time-delta values, and the
//! `DateOffset` object that may appear inside generic (object) sequences.
//!
//! All temporal buffers in Minframe hold signed 64-bit nanosecond ticks.
//! `TimeUnit` scales a raw count into those ticks.
//! `DateOffset` is either an absolute, fixed duration, or a calendar offset
//! (months, years) whose length depends on the anchor date. Only fixed offsets
//! can take part in temporal arithmetic.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Nanoseconds per day.
pub const NANOS_PER_DAY: i64 = 86_400_000_000_000;

/// # TimeUnit
///
/// Unified time unit enumeration.
///
/// ## Behaviour
/// - Used when constructing datetime and time-delta values from raw counts.
/// - Every unit converts into nanosecond ticks, the single internal resolution.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
    Microseconds,
    #[default]
    Nanoseconds,
    Days,
}

impl TimeUnit {
    /// Number of nanosecond ticks in one unit.
    #[inline]
    pub const fn nanos(self) -> i64 {
        match self {
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Days => NANOS_PER_DAY,
        }
    }

    /// Scales `count` units into nanosecond ticks, wrapping on overflow.
    #[inline]
    pub const fn to_ticks(self, count: i64) -> i64 {
        count.wrapping_mul(self.nanos())
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TimeUnit::Seconds => f.write_str("Seconds"),
            TimeUnit::Milliseconds => f.write_str("Milliseconds"),
            TimeUnit::Microseconds => f.write_str("Microseconds"),
            TimeUnit::Nanoseconds => f.write_str("Nanoseconds"),
            TimeUnit::Days => f.write_str("Days"),
        }
    }
}

/// # DateOffset
///
/// A generic date offset object.
///
/// - `Fixed` has an absolute duration in nanosecond ticks, e.g. `Hour(3)`.
/// - `Calendar` moves by whole months, so its duration is not fixed,
/// e.g. `MonthEnd` or `YearBegin`. These are rejected by temporal arithmetic.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum DateOffset {
    Fixed { nanos: i64 },
    Calendar { months: i32, name: &'static str },
}

impl DateOffset {
    /// Fixed offset of `count` units.
    pub fn fixed(count: i64, unit: TimeUnit) -> Self {
        DateOffset::Fixed {
            nanos: unit.to_ticks(count),
        }
    }

    pub fn days(n: i64) -> Self {
        Self::fixed(n, TimeUnit::Days)
    }

    pub fn hours(n: i64) -> Self {
        Self::fixed(n.wrapping_mul(3600), TimeUnit::Seconds)
    }

    pub fn minutes(n: i64) -> Self {
        Self::fixed(n.wrapping_mul(60), TimeUnit::Seconds)
    }

    pub fn seconds(n: i64) -> Self {
        Self::fixed(n, TimeUnit::Seconds)
    }

    pub fn months(n: i32) -> Self {
        DateOffset::Calendar {
            months: n,
            name: "MonthOffset",
        }
    }

    pub fn years(n: i32) -> Self {
        DateOffset::Calendar {
            months: n.wrapping_mul(12),
            name: "YearOffset",
        }
    }

    /// The absolute duration in ticks, or `None` for calendar offsets.
    #[inline]
    pub fn delta(&self) -> Option<i64> {
        match self {
            DateOffset::Fixed { nanos } => Some(*nanos),
            DateOffset::Calendar { .. } => None,
        }
    }
}

impl Display for DateOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DateOffset::Fixed { nanos } => write!(f, "<{} Nanos>", nanos),
            DateOffset::Calendar { months, name } => write!(f, "<{} * {}s>", months, name),
        }
    }
}
