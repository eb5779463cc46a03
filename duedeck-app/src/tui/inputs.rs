use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    ToggleView,
    Refresh,
    None,
}

pub fn map_event(ev: Event) -> Action {
    match ev {
        Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => Action::Up,
            KeyCode::Down | KeyCode::Char('j') => Action::Down,
            KeyCode::Tab | KeyCode::Char('a') => Action::ToggleView,
            KeyCode::Char('r') => Action::Refresh,
            _ => Action::None,
        },
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn keys_map_to_actions() {
        let key = |c| Event::Key(KeyEvent::new(c, KeyModifiers::NONE));
        assert_eq!(map_event(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(map_event(key(KeyCode::Tab)), Action::ToggleView);
        assert_eq!(map_event(key(KeyCode::Char('j'))), Action::Down);
        assert_eq!(map_event(key(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(map_event(key(KeyCode::Char('x'))), Action::None);
    }
}
