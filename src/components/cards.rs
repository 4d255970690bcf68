use ggforge_api::{
    Game, GameAccount, Match, MatchStatus, Team, TournamentSummary, User, format_starts_at,
    media_url,
};
use tui::style::{Color, Style};
use tui::text::{Line, Span};

use crate::components::theme::{Tone, status_color, tone};

fn marker(selected: bool) -> Span<'static> {
    if selected {
        Span::styled("▶ ", tone(Tone::Accent))
    } else {
        Span::raw("  ")
    }
}

pub fn game_card(game: &Game, selected: bool) -> Line<'static> {
    Line::from(vec![
        marker(selected),
        Span::styled(game.title.clone(), tone(Tone::Accent)),
    ])
}

pub fn tournament_card(t: &TournamentSummary, selected: bool) -> Line<'static> {
    Line::from(vec![
        marker(selected),
        Span::styled(
            format!("{:<12}", t.status.label()),
            Style::default().fg(status_color(t.status)),
        ),
        Span::raw(format!("{:<28} ", t.title)),
        Span::styled(format_starts_at(t.starts_at), tone(Tone::Dim)),
        Span::styled(format!("  {}", t.info), tone(Tone::Dim)),
    ])
}

pub fn user_card(user: &User, selected: bool, note: Option<&str>) -> Line<'static> {
    let dot = if user.is_online {
        Span::styled("● ", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ ", tone(Tone::Dim))
    };
    let mut spans = vec![marker(selected), dot, Span::raw(user.name.clone())];
    if let Some(note) = note {
        spans.push(Span::styled(format!("  {note}"), tone(Tone::Dim)));
    }
    Line::from(spans)
}

pub fn team_card(team: &Team, selected: bool) -> Line<'static> {
    Line::from(vec![
        marker(selected),
        Span::styled(team.name.clone(), tone(Tone::Accent)),
        Span::styled(format!("  {} members", team.members.len()), tone(Tone::Dim)),
    ])
}

pub fn account_card(account: &GameAccount, selected: bool) -> Line<'static> {
    Line::from(vec![
        marker(selected),
        Span::raw(format!("{:<20}", account.game_title)),
        Span::styled(account.nickname.clone(), tone(Tone::Accent)),
    ])
}

/// One-line match summary used in the match lists.
pub fn match_row(m: &Match, selected: bool) -> Line<'static> {
    let name = |p: &Option<ggforge_api::Participant>| {
        p.as_ref().map(|p| p.name.clone()).unwrap_or_else(|| "TBD".to_string())
    };
    let status_style = match m.status {
        MatchStatus::Ongoing => tone(Tone::Live),
        MatchStatus::Completed => tone(Tone::Winner),
        _ => tone(Tone::Dim),
    };
    Line::from(vec![
        marker(selected),
        Span::styled(format!("#{:<3}", m.number), tone(Tone::Dim)),
        Span::raw(format!("{:>16} ", name(&m.participant1))),
        Span::styled(format!("{}:{}", m.score1, m.score2), tone(Tone::Accent)),
        Span::raw(format!(" {:<16}", name(&m.participant2))),
        Span::styled(format!(" {} {}", m.format, m.status.label()), status_style),
    ])
}

/// `label: url` line for an avatar, logo or cover image.
pub fn media_line(label: &str, base: &str, path: Option<&str>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), tone(Tone::Dim)),
        Span::raw(media_url(base, path)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggforge_api::fixtures::Fixtures;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn match_row_shows_tbd_for_missing_slot() {
        let fixtures = Fixtures::sample();
        let final_match = fixtures.tournament("1").unwrap().final_match.as_ref().unwrap();
        let line = text(&match_row(final_match, true));
        assert!(line.starts_with("▶ "));
        assert!(line.contains("TBD"));
        assert!(line.contains("BO5"));
    }

    #[test]
    fn media_line_falls_back_to_default_avatar() {
        let line = text(&media_line("Avatar", "http://api.local", None));
        assert_eq!(line, format!("Avatar: {}", ggforge_api::DEFAULT_AVATAR));
    }
}
