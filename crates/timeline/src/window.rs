use chrono::{Days, NaiveDate};

/// A normalized `[start, end]` day range plus a result limit.
///
/// Both bounds are inclusive, `start <= end` always holds and `limit` is at
/// least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineWindow {
    start: NaiveDate,
    end: NaiveDate,
    limit: usize,
}

impl TimelineWindow {
    /// Builds a window from explicit bounds, swapping them when reversed.
    pub fn new(start: NaiveDate, end: NaiveDate, limit: usize) -> Self {
        let (start, end) = if start > end {
            (end, start)
        } else {
            (start, end)
        };

        Self {
            start,
            end,
            limit: limit.max(1),
        }
    }

    /// Fills in missing bounds relative to `today`.
    ///
    /// A missing end defaults to `today`; a missing start to `default_days - 1`
    /// days before `today`, so the default window spans `default_days` days.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: usize,
        today: NaiveDate,
        default_days: u32,
    ) -> Self {
        let end = end.unwrap_or(today);
        let lookback = Days::new(u64::from(default_days.max(1) - 1));
        let start = start.unwrap_or_else(|| today.checked_sub_days(lookback).unwrap_or(today));

        Self::new(start, end, limit)
    }

    /// Shrinks the window to its newest `max_days` days.
    pub fn clamp_days(self, max_days: u32) -> Self {
        let max_days = u64::from(max_days.max(1));
        if self.days() <= max_days {
            return self;
        }

        let start = self
            .end
            .checked_sub_days(Days::new(max_days - 1))
            .unwrap_or(self.start);
        Self { start, ..self }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of day partitions covered.
    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days().unsigned_abs() + 1
    }

    /// Day partitions of the window, newest first.
    pub fn partitions(&self) -> PartitionScan {
        PartitionScan {
            next: Some(self.end),
            start: self.start,
        }
    }
}

/// Lazily yields days from a window's end back to its start.
#[derive(Debug, Clone)]
pub struct PartitionScan {
    next: Option<NaiveDate>,
    start: NaiveDate,
}

impl Iterator for PartitionScan {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|day| *day >= self.start)?;
        self.next = current.pred_opt();
        Some(current)
    }
}
