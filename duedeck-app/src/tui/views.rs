use crate::tui::theme::*;
use chrono::NaiveDate;
use duedeck_core::{DeckSummary, ResolvedDeck};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Due,
    All,
}

impl ViewKind {
    pub fn toggled(self) -> Self {
        match self {
            ViewKind::Due => ViewKind::All,
            ViewKind::All => ViewKind::Due,
        }
    }

    fn title(self) -> &'static str {
        match self {
            ViewKind::Due => "Due decks",
            ViewKind::All => "All decks",
        }
    }
}

pub struct Screen<'a> {
    pub view: ViewKind,
    pub today: NaiveDate,
    pub decks: &'a [ResolvedDeck],
    pub sel: usize,
    pub error: Option<&'a str>,
}

pub fn draw_ui(f: &mut Frame, area: Rect, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    draw_decks(f, chunks[0], screen);
    draw_detail(f, chunks[1], screen);

    let foot = Paragraph::new(Line::from(vec![
        Span::raw(" ↑/k ↓/j select  "),
        Span::raw(" tab due/all  "),
        Span::raw(" r refresh  "),
        Span::raw(" q quit "),
    ]))
    .style(footer_style())
    .block(Block::default().borders(Borders::TOP));
    let fh = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };
    f.render_widget(foot, fh);
}

fn draw_decks(f: &mut Frame, area: Rect, screen: &Screen) {
    let items: Vec<_> = screen
        .decks
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let label = format!("{}  {}", d.due_date.format("%Y-%m-%d"), d.name);
            let line = if i == screen.sel {
                Line::from(label).style(selected_style())
            } else if d.due_date < screen.today {
                Line::from(label).style(overdue_style())
            } else {
                Line::from(label)
            };
            ListItem::new(line)
        })
        .collect();

    let title = Paragraph::new(Line::from(vec![
        Span::raw(screen.view.title()).style(title_style()),
        Span::raw(format!("  ({})", screen.decks.len())).style(muted_style()),
    ]));
    let th = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    f.render_widget(title, th);

    let list_area = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(2),
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL));
    f.render_widget(list, list_area);
}

fn draw_detail(f: &mut Frame, area: Rect, screen: &Screen) {
    let block = Block::default().title("Deck").borders(Borders::ALL);
    let area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };

    if let Some(err) = screen.error {
        let p = Paragraph::new(Line::from(Span::raw(err).style(error_style())))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let Some(deck) = screen.decks.get(screen.sel) else {
        let msg = match screen.view {
            ViewKind::Due => "Nothing due. Press tab to see all decks.",
            ViewKind::All => "No decks.",
        };
        f.render_widget(Paragraph::new(msg).wrap(Wrap { trim: true }).block(block), area);
        return;
    };

    let summary = DeckSummary::of(deck);
    let mut text = vec![
        Line::from(Span::raw(summary.name.clone()).style(title_style())),
        Line::from(Span::raw(summary.url.clone()).style(muted_style())),
        Line::from(""),
        Line::from(format!("Due: {}", summary.due_date.format("%Y-%m-%d"))),
        Line::from(format!("Repetitions: {}", summary.repetitions)),
        Line::from(summary.last_score_label()),
        Line::from(""),
    ];
    for s in deck.scores.iter().rev() {
        let pct = s.percent().map(|p| format!("{p}%")).unwrap_or_else(|| "-".into());
        text.push(Line::from(format!(
            "{}  {}/{}  {}",
            s.date.format("%Y-%m-%d"),
            s.num_correct,
            s.num_total,
            pct
        )));
    }
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(block), area);
}
