use ratatui::style::{Color, Style};
use ratatui::style::Stylize;

pub fn title_style() -> Style { Style::default().fg(Color::Cyan).bold() }
pub fn muted_style() -> Style { Style::default().fg(Color::DarkGray) }
pub fn selected_style() -> Style { Style::default().fg(Color::Yellow).bold() }
pub fn overdue_style() -> Style { Style::default().fg(Color::Red) }
pub fn footer_style() -> Style { Style::default().fg(Color::Gray) }
pub fn error_style() -> Style { Style::default().fg(Color::Red).bold() }
