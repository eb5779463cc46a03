use chrono::{Days, NaiveDate};
use duedeck_core::{
    all_decks_view, due_decks_view, filter_by_name, resolve_decks, resolve_scores, summarize,
    totals, RawDeck, ResolvedDeck, Score,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn refs(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn resolved(id: &str, due: NaiveDate) -> ResolvedDeck {
    ResolvedDeck {
        id: id.into(),
        name: format!("deck {id}"),
        url: format!("https://example.com/{id}"),
        scores: vec![],
        due_date: due,
    }
}

#[test]
fn scores_join_by_ref_and_drop_unknown() {
    let all = vec![
        Score::new("a", 1, 2, d(2023, 1, 3)),
        Score::new("b", 2, 2, d(2023, 1, 1)),
        Score::new("c", 0, 2, d(2023, 1, 2)),
    ];
    let out = resolve_scores(&all, &refs(&["a", "b", "missing"]));
    let ids: Vec<&str> = out.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn scores_sorted_for_any_input_order() {
    let base = vec![
        Score::new("s1", 1, 1, d(2023, 5, 4)),
        Score::new("s2", 1, 1, d(2023, 5, 1)),
        Score::new("s3", 1, 1, d(2023, 5, 9)),
        Score::new("s4", 1, 1, d(2023, 5, 1)),
        Score::new("s5", 1, 1, d(2023, 5, 2)),
    ];
    let wanted = refs(&["s1", "s2", "s3", "s4", "s5"]);
    let mut rotated = base.clone();
    let mut first: Option<Vec<Score>> = None;
    for _ in 0..base.len() {
        rotated.rotate_left(1);
        let out = resolve_scores(&rotated, &wanted);
        assert!(out.windows(2).all(|w| w[0].date <= w[1].date));
        match &first {
            None => first = Some(out),
            Some(f) => assert_eq!(f, &out, "ties must break the same way every time"),
        }
    }
    let ids: Vec<String> = first.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["s2", "s4", "s5", "s1", "s3"]);
}

#[test]
fn decks_resolve_in_input_order() {
    let today = d(2023, 2, 1);
    let raw = vec![
        RawDeck::new("z", "Zeta", "u1").with_refs(["s1", "s2"]),
        RawDeck::new("a", "Alpha", "u2"),
        RawDeck::new("m", "Mu", "u3").with_refs(["nope"]),
    ];
    let scores = vec![
        Score::new("s2", 3, 4, d(2023, 1, 10)),
        Score::new("s1", 4, 4, d(2023, 1, 5)),
    ];
    let out = resolve_decks(&raw, &scores, today);
    let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["z", "a", "m"]);
    assert_eq!(out[0].scores.len(), 2);
    assert_eq!(out[0].due_date, d(2023, 1, 12));
    assert_eq!(out[1].due_date, today);
    assert!(out[2].scores.is_empty());
    assert_eq!(out[2].due_date, today);

    let again = resolve_decks(&raw, &scores, today);
    assert_eq!(out, again);
}

#[test]
fn all_view_orders_by_due_then_id() {
    let decks = vec![
        resolved("b", d(2023, 1, 5)),
        resolved("c", d(2023, 1, 1)),
        resolved("a", d(2023, 1, 5)),
    ];
    let ids: Vec<String> = all_decks_view(&decks).into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn due_view_boundary() {
    let today = d(2023, 3, 10);
    let decks = vec![
        resolved("tomorrow", today + Days::new(1)),
        resolved("today", today),
        resolved("overdue", today - Days::new(4)),
    ];
    let ids: Vec<String> = due_decks_view(&decks, today).into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["overdue", "today"]);
}

#[test]
fn name_filter_and_summaries() {
    let today = d(2023, 3, 10);
    let mut verbs = resolved("v", today);
    verbs.name = "Russian verbs".into();
    verbs.scores = vec![
        Score::new("s1", 1, 4, d(2023, 3, 1)),
        Score::new("s2", 2, 3, d(2023, 3, 2)),
    ];
    let nouns = resolved("n", today + Days::new(3));
    let decks = vec![verbs, nouns];

    assert_eq!(filter_by_name(&decks, "VERB").len(), 1);
    assert_eq!(filter_by_name(&decks, "  ").len(), 2);

    let s = summarize(&decks);
    assert_eq!(s[0].repetitions, 2);
    assert_eq!(s[0].last_score_percent, Some(67));
    assert_eq!(s[0].last_score_label(), "Last score: 67%");
    assert_eq!(s[1].last_score_label(), "No scores");

    let t = totals(&decks, today);
    assert_eq!((t.decks, t.due, t.never_reviewed, t.reviews), (2, 1, 1, 2));
}
