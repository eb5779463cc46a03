use chrono::NaiveDate;
use duedeck_core::{fib, next_due_date, FibonacciSchedule, SchedulePolicy, Score};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn history(n: usize, last: NaiveDate) -> Vec<Score> {
    (0..n)
        .map(|i| {
            let back = chrono::Days::new((n - 1 - i) as u64);
            Score::new(format!("s{i}"), 5, 10, last - back)
        })
        .collect()
}

#[test]
fn fib_sequence() {
    assert_eq!(fib(0), 1);
    assert_eq!(fib(1), 1);
    for n in 2..60 {
        assert_eq!(fib(n), fib(n - 1) + fib(n - 2));
    }
    let first: Vec<u64> = (0..8).map(fib).collect();
    assert_eq!(first, vec![1, 1, 2, 3, 5, 8, 13, 21]);
}

#[test]
fn no_history_is_due_today() {
    let today = d(2024, 3, 15);
    assert_eq!(next_due_date(&[], today), today);
}

#[test]
fn one_score_adds_one_day() {
    let s = history(1, d(2023, 1, 1));
    assert_eq!(next_due_date(&s, d(2030, 1, 1)), d(2023, 1, 2));
}

#[test]
fn two_scores_add_two_days() {
    let s = history(2, d(2023, 1, 10));
    assert_eq!(next_due_date(&s, d(2023, 1, 10)), d(2023, 1, 12));
}

#[test]
fn five_scores_add_eight_days() {
    let s = history(5, d(2023, 6, 1));
    assert_eq!(next_due_date(&s, d(2023, 6, 1)), d(2023, 6, 9));
}

#[test]
fn quality_does_not_move_due_date() {
    let last = d(2023, 6, 1);
    let mut perfect = history(3, last);
    let mut failed = history(3, last);
    for s in &mut perfect {
        s.num_correct = s.num_total;
    }
    for s in &mut failed {
        s.num_correct = 0;
    }
    let today = d(2023, 6, 2);
    assert_eq!(
        FibonacciSchedule.next_due_date(&perfect, today),
        FibonacciSchedule.next_due_date(&failed, today)
    );
}
