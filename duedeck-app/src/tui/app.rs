use crate::tui::{
    inputs::{map_event, Action},
    views::{self, Screen, ViewKind},
};
use crossterm::{
    event::{self},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use chrono::NaiveDate;
use duedeck_core::{all_decks_view, due_decks_view, service, DeckService, ResolvedDeck, UserId};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::sync::Arc;
use tokio::runtime::Runtime;

pub struct TuiApp {
    pub service: Arc<DeckService>,
    pub rt: Arc<Runtime>,
    user: UserId,
    today: NaiveDate,
    view: ViewKind,
    decks: Vec<ResolvedDeck>,
    shown: Vec<ResolvedDeck>,
    sel: usize,
    error: Option<String>,
}

impl TuiApp {
    pub fn new(service: Arc<DeckService>, rt: Arc<Runtime>, user: UserId) -> Self {
        Self {
            service,
            rt,
            user,
            today: service::today(),
            view: ViewKind::Due,
            decks: vec![],
            shown: vec![],
            sel: 0,
            error: None,
        }
    }

    fn load_decks(&mut self) {
        self.today = service::today();
        match self.rt.block_on(self.service.get_decks_on(&self.user, self.today)) {
            Ok(v) => {
                self.decks = v;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "loading decks failed");
                self.decks.clear();
                self.error = Some(e.to_string());
            }
        }
        self.apply_view();
    }

    fn apply_view(&mut self) {
        self.shown = match self.view {
            ViewKind::Due => due_decks_view(&self.decks, self.today),
            ViewKind::All => all_decks_view(&self.decks),
        };
        self.sel = self.sel.min(self.shown.len().saturating_sub(1));
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.load_decks();

        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.mainloop(&mut terminal);

        disable_raw_mode().ok();
        let mut out: Stdout = std::io::stdout();
        execute!(out, LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();

        res
    }

    fn mainloop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        loop {
            terminal.draw(|f| {
                let screen = Screen {
                    view: self.view,
                    today: self.today,
                    decks: &self.shown,
                    sel: self.sel,
                    error: self.error.as_deref(),
                };
                views::draw_ui(f, f.size(), &screen);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                match map_event(event::read()?) {
                    Action::Quit => break,
                    Action::Up => self.sel = self.sel.saturating_sub(1),
                    Action::Down => {
                        if self.sel + 1 < self.shown.len() {
                            self.sel += 1;
                        }
                    }
                    Action::ToggleView => {
                        self.view = self.view.toggled();
                        self.sel = 0;
                        self.apply_view();
                    }
                    Action::Refresh => {
                        self.service.invalidate(&self.user);
                        self.load_decks();
                    }
                    Action::None => {}
                }
            }
        }
        Ok(())
    }
}
