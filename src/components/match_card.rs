use ggforge_api::{Match, Participant, media_url};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::text::{Line, Span};
use tui::widgets::{Paragraph, Widget, Wrap};

use crate::components::theme::{Tone, tone};
use crate::components::widgets::button_line;
use crate::state::match_card::{MatchCardState, MatchPanel, Slot};

/// Details panel of one match: header, participants, then the body for the viewer's panel.
pub struct MatchCardView<'a> {
    pub m: &'a Match,
    pub card: &'a MatchCardState,
    pub panel: MatchPanel,
    pub media_base: &'a str,
}

impl<'a> MatchCardView<'a> {
    pub fn lines(&self) -> Vec<Line<'static>> {
        let m = self.m;
        let mut lines = vec![
            Line::from(vec![
                Span::styled(format!("Match #{}", m.number), tone(Tone::Accent)),
                Span::styled(format!("  {}  {}", m.format, m.status.label()), tone(Tone::Dim)),
            ]),
            participant_line(m.participant1.as_ref(), m.score1, self.media_base),
            participant_line(m.participant2.as_ref(), m.score2, self.media_base),
            Line::raw(""),
        ];

        match self.panel {
            MatchPanel::Start => lines.extend(self.start_lines()),
            MatchPanel::OngoingMaps => lines.extend(self.ongoing_lines()),
            MatchPanel::Winners => lines.extend(self.winner_lines()),
        }

        if let Some(err) = &self.card.last_error {
            lines.push(Line::raw(""));
            lines.push(Line::styled(format!("! {err}"), tone(Tone::Danger)));
        }
        lines
    }

    fn start_lines(&self) -> Vec<Line<'static>> {
        let label = if self.card.started {
            "Match started"
        } else if self.card.pending {
            "Starting..."
        } else {
            "Start match"
        };
        vec![
            button_line(label, self.card.can_start(), true),
            Line::styled("s: start", tone(Tone::Dim)),
        ]
    }

    fn ongoing_lines(&self) -> Vec<Line<'static>> {
        let m = self.m;
        let name = |slot: Slot| {
            slot.participant(m).map(|p| p.name.clone()).unwrap_or_else(|| "TBD".to_string())
        };
        let mut lines = Vec::with_capacity(self.card.drafts.len() + 3);
        for (i, draft) in self.card.drafts.iter().enumerate() {
            let radio = |slot: Slot| if draft.winner == Some(slot) { "(•)" } else { "( )" };
            let selected = i == self.card.selected_map;
            let cursor = if selected && self.card.editing_url { "▏" } else { "" };
            let line = Line::from(vec![
                Span::styled(
                    format!("{}Map {} ", if selected { "▶ " } else { "  " }, i + 1),
                    tone(Tone::Accent),
                ),
                Span::raw(format!(
                    "{} {}  {} {}",
                    radio(Slot::First),
                    name(Slot::First),
                    radio(Slot::Second),
                    name(Slot::Second)
                )),
                Span::styled(format!("  url: {}{cursor}", draft.external_url), tone(Tone::Dim)),
            ]);
            lines.push(line);
        }
        if self.card.drafts.is_empty() {
            lines.push(Line::styled("No maps", tone(Tone::Dim)));
        }
        lines.push(Line::raw(""));
        let label = if self.card.finished {
            "Match finished"
        } else if self.card.pending {
            "Finishing..."
        } else {
            "Finish match"
        };
        lines.push(button_line(label, self.card.can_finish(), true));
        lines.push(Line::styled(
            "j/k: map  1/2: winner  u: edit url  f: finish",
            tone(Tone::Dim),
        ));
        lines
    }

    fn winner_lines(&self) -> Vec<Line<'static>> {
        let m = self.m;
        if m.maps.is_empty() {
            return vec![Line::styled("No maps played yet", tone(Tone::Dim))];
        }
        m.maps
            .iter()
            .enumerate()
            .map(|(i, map)| {
                let winner = match m.map_winner(map) {
                    Some(p) => Span::styled(
                        format!("{} ({})", p.name, media_url(self.media_base, p.avatar.as_deref())),
                        tone(Tone::Winner),
                    ),
                    None => Span::styled("-", tone(Tone::Dim)),
                };
                let watch = match map.external_url.as_deref() {
                    Some(url) => Span::styled(format!("  watch: {url}"), tone(Tone::Accent)),
                    None => Span::styled("  watch", tone(Tone::Dim)),
                };
                Line::from(vec![Span::raw(format!("Map {}: ", i + 1)), winner, watch])
            })
            .collect()
    }
}

fn participant_line(p: Option<&Participant>, score: u32, base: &str) -> Line<'static> {
    match p {
        Some(p) => Line::from(vec![
            Span::raw(format!("{:<20}", p.name)),
            Span::styled(format!("{score:>2}  "), tone(Tone::Accent)),
            Span::styled(media_url(base, p.avatar.as_deref()), tone(Tone::Dim)),
        ]),
        None => Line::styled("TBD", tone(Tone::Dim)),
    }
}

impl<'a> Widget for MatchCardView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines()).wrap(Wrap { trim: false }).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggforge_api::fixtures::Fixtures;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn winners_panel_resolves_names_and_disables_missing_links() {
        let fixtures = Fixtures::sample();
        let t = fixtures.tournament("1").unwrap();
        let m = t.find_match("po-1").unwrap();
        let card = MatchCardState::new(m);
        let view = MatchCardView { m, card: &card, panel: MatchPanel::Winners, media_base: "http://x" };
        let out = text(&view.lines());
        assert_eq!(out.matches("Map ").count(), m.maps.len());
        let winner = m.map_winner(&m.maps[0]).unwrap();
        assert!(out.contains(&winner.name));
    }

    #[test]
    fn start_button_reads_started_after_success() {
        let fixtures = Fixtures::sample();
        let m = fixtures.tournament("2").unwrap().find_match("oi-1").unwrap();
        let mut card = MatchCardState::new(m);
        assert!(card.begin_start());
        card.on_start_result(Ok(()));
        let view = MatchCardView { m, card: &card, panel: MatchPanel::Start, media_base: "http://x" };
        let out = text(&view.lines());
        assert!(out.contains("[ Match started ]"));
        assert!(!card.can_start());
    }
}
