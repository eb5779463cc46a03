use crate::Score;
use chrono::{Days, NaiveDate};

/// Review interval in days for the `n`th position of the sequence
/// 1, 1, 2, 3, 5, 8, ... Saturates at `u64::MAX`.
pub fn fib(n: u64) -> u64 {
    let (mut prev, mut cur) = (1u64, 1u64);
    for _ in 1..n {
        let next = prev.saturating_add(cur);
        prev = cur;
        cur = next;
    }
    cur
}

/// Decides when a deck should next be reviewed given its date-sorted history.
pub trait SchedulePolicy {
    fn next_due_date(&self, sorted_scores: &[Score], today: NaiveDate) -> NaiveDate;
}

/// Fixed Fibonacci spacing keyed on review count alone; score quality is ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct FibonacciSchedule;

impl SchedulePolicy for FibonacciSchedule {
    fn next_due_date(&self, sorted_scores: &[Score], today: NaiveDate) -> NaiveDate {
        next_due_date(sorted_scores, today)
    }
}

pub fn next_due_date(sorted_scores: &[Score], today: NaiveDate) -> NaiveDate {
    let Some(last) = sorted_scores.last() else {
        return today;
    };
    let k = sorted_scores.len() as u64;
    last.date
        .checked_add_days(Days::new(fib(k)))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slow_fib(n: u64) -> u64 {
        if n < 2 {
            1
        } else {
            slow_fib(n - 2) + slow_fib(n - 1)
        }
    }

    #[test]
    fn matches_recursive_definition() {
        for n in 0..25 {
            assert_eq!(fib(n), slow_fib(n), "fib({n})");
        }
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        assert_eq!(fib(500), u64::MAX);
        let d = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let scores: Vec<Score> = (0..200).map(|i| Score::new(format!("s{i}"), 1, 1, d)).collect();
        assert_eq!(next_due_date(&scores, d), NaiveDate::MAX);
    }
}
