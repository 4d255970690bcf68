use tui::style::{Color, Modifier, Style};

/// Named colors shared by every widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Accent,
    Dim,
    Live,
    Winner,
    Qualifying,
    Eliminated,
    Danger,
    Focus,
}

pub fn tone(t: Tone) -> Style {
    match t {
        Tone::Accent => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Tone::Dim => Style::default().fg(Color::DarkGray),
        Tone::Live => Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        Tone::Winner => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Tone::Qualifying => Style::default().fg(Color::Green),
        Tone::Eliminated => Style::default().fg(Color::Red),
        Tone::Danger => Style::default().fg(Color::LightRed),
        Tone::Focus => Style::default().fg(Color::Black).bg(Color::Cyan),
    }
}

pub fn status_color(status: ggforge_api::TournamentStatus) -> Color {
    use ggforge_api::TournamentStatus::*;
    match status {
        Open => Color::Green,
        Ongoing => Color::LightRed,
        Completed => Color::Blue,
        Cancelled => Color::DarkGray,
    }
}
