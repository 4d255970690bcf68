use ggforge_api::client::MapCompletion;
use ggforge_api::{Match, MatchStatus, Participant};

/// Who is looking at a match card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Viewer {
    pub user_id: Option<String>,
    pub is_admin: bool,
}

impl Viewer {
    /// Admins and the match creator may drive the match lifecycle.
    pub fn is_privileged(&self, m: &Match) -> bool {
        self.is_admin
            || matches!(
                (&self.user_id, &m.creator_id),
                (Some(user), Some(creator)) if user == creator
            )
    }
}

/// Which body the match details panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPanel {
    Start,
    OngoingMaps,
    Winners,
}

pub fn panel_for(m: &Match, viewer: &Viewer) -> MatchPanel {
    let privileged = viewer.is_privileged(m);
    match m.status {
        MatchStatus::Scheduled if privileged && m.has_both_participants() => MatchPanel::Start,
        MatchStatus::Ongoing if privileged => MatchPanel::OngoingMaps,
        _ => MatchPanel::Winners,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn participant<'a>(&self, m: &'a Match) -> Option<&'a Participant> {
        match self {
            Slot::First => m.participant1.as_ref(),
            Slot::Second => m.participant2.as_ref(),
        }
    }
}

/// Winner choice and external link typed in for one map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapDraft {
    pub map_id: String,
    pub winner: Option<Slot>,
    pub external_url: String,
}

/// Local state of an open match details panel.
#[derive(Debug, Clone, Default)]
pub struct MatchCardState {
    pub tournament_id: String,
    pub match_id: String,
    /// Set once the start request succeeded. The displayed status stays as loaded.
    pub started: bool,
    pub finished: bool,
    /// A start or finish request is in flight.
    pub pending: bool,
    pub drafts: Vec<MapDraft>,
    pub selected_map: usize,
    pub editing_url: bool,
    pub last_error: Option<String>,
}

impl MatchCardState {
    pub fn new(m: &Match) -> Self {
        Self {
            tournament_id: m.tournament_id.clone(),
            match_id: m.id.clone(),
            drafts: m
                .maps
                .iter()
                .map(|map| MapDraft {
                    map_id: map.id.clone(),
                    winner: None,
                    external_url: map.external_url.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn can_start(&self) -> bool {
        !self.started && !self.pending
    }

    /// Mark the start request as in flight. Returns false if the control is disabled.
    pub fn begin_start(&mut self) -> bool {
        if !self.can_start() {
            return false;
        }
        self.pending = true;
        self.last_error = None;
        true
    }

    pub fn on_start_result(&mut self, result: Result<(), String>) {
        self.pending = false;
        match result {
            Ok(()) => self.started = true,
            Err(message) => self.last_error = Some(message),
        }
    }

    pub fn set_winner(&mut self, map_idx: usize, slot: Slot) {
        if self.finished || self.pending {
            return;
        }
        if let Some(draft) = self.drafts.get_mut(map_idx) {
            draft.winner = Some(slot);
        }
    }

    pub fn selected_draft_mut(&mut self) -> Option<&mut MapDraft> {
        if self.finished {
            return None;
        }
        self.drafts.get_mut(self.selected_map)
    }

    pub fn select_next_map(&mut self) {
        if self.selected_map + 1 < self.drafts.len() {
            self.selected_map += 1;
        }
    }

    pub fn select_prev_map(&mut self) {
        self.selected_map = self.selected_map.saturating_sub(1);
    }

    pub fn can_finish(&self) -> bool {
        !self.finished && !self.pending && self.drafts.iter().all(|d| d.winner.is_some())
    }

    /// Collect map results to submit, in map order. `None` if finishing is disabled.
    pub fn begin_finish(&mut self, m: &Match) -> Option<Vec<MapCompletion>> {
        if !self.can_finish() {
            return None;
        }
        let completions = self
            .drafts
            .iter()
            .filter_map(|d| {
                let winner = d.winner?.participant(m)?;
                Some(MapCompletion {
                    map_id: d.map_id.clone(),
                    winner_id: winner.id.clone(),
                })
            })
            .collect();
        self.pending = true;
        self.last_error = None;
        Some(completions)
    }

    pub fn on_finish_result(&mut self, result: Result<(), String>) {
        self.pending = false;
        match result {
            Ok(()) => self.finished = true,
            Err(message) => self.last_error = Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggforge_api::{MatchFormat, MatchMap};

    fn participant(id: &str) -> Participant {
        Participant { id: id.into(), name: format!("player {id}"), ..Default::default() }
    }

    fn scheduled_match() -> Match {
        Match {
            id: "m1".into(),
            tournament_id: "t1".into(),
            format: MatchFormat::Bo3,
            status: MatchStatus::Scheduled,
            participant1: Some(participant("a")),
            participant2: Some(participant("b")),
            creator_id: Some("creator".into()),
            ..Default::default()
        }
    }

    fn ongoing_match(maps: usize) -> Match {
        Match {
            status: MatchStatus::Ongoing,
            maps: (0..maps)
                .map(|i| MatchMap { id: format!("map{i}"), ..Default::default() })
                .collect(),
            ..scheduled_match()
        }
    }

    fn creator() -> Viewer {
        Viewer { user_id: Some("creator".into()), is_admin: false }
    }

    #[test]
    fn start_is_shown_to_privileged_viewers_with_both_participants() {
        let m = scheduled_match();
        assert_eq!(panel_for(&m, &creator()), MatchPanel::Start);
        assert_eq!(panel_for(&m, &Viewer { user_id: None, is_admin: true }), MatchPanel::Start);
        assert_eq!(
            panel_for(&m, &Viewer { user_id: Some("someone".into()), is_admin: false }),
            MatchPanel::Winners
        );

        let half_empty = Match { participant2: None, ..scheduled_match() };
        assert_eq!(panel_for(&half_empty, &creator()), MatchPanel::Winners);
    }

    #[test]
    fn start_stays_enabled_until_it_succeeds() {
        let mut card = MatchCardState::new(&scheduled_match());
        assert!(card.can_start());

        assert!(card.begin_start());
        assert!(!card.can_start());
        assert!(!card.begin_start());

        card.on_start_result(Err("Match is missing participants".into()));
        assert!(card.can_start());
        assert_eq!(card.last_error.as_deref(), Some("Match is missing participants"));

        assert!(card.begin_start());
        card.on_start_result(Ok(()));
        assert!(!card.can_start());
        assert!(card.last_error.is_none());
    }

    #[test]
    fn ongoing_panel_needs_privilege() {
        let m = ongoing_match(1);
        assert_eq!(panel_for(&m, &creator()), MatchPanel::OngoingMaps);
        assert_eq!(panel_for(&m, &Viewer::default()), MatchPanel::Winners);
        let done = Match { status: MatchStatus::Completed, ..ongoing_match(1) };
        assert_eq!(panel_for(&done, &creator()), MatchPanel::Winners);
    }

    #[test]
    fn finish_requires_a_winner_on_every_map() {
        let m = ongoing_match(3);
        let mut card = MatchCardState::new(&m);
        assert!(!card.can_finish());

        card.set_winner(0, Slot::First);
        card.set_winner(1, Slot::Second);
        assert!(!card.can_finish());
        assert!(card.begin_finish(&m).is_none());

        card.set_winner(2, Slot::First);
        assert!(card.can_finish());
    }

    #[test]
    fn finish_submits_maps_in_order_and_disables_after_success() {
        let m = ongoing_match(2);
        let mut card = MatchCardState::new(&m);
        card.set_winner(0, Slot::Second);
        card.set_winner(1, Slot::First);

        let completions = card.begin_finish(&m).unwrap();
        assert_eq!(
            completions,
            vec![
                MapCompletion { map_id: "map0".into(), winner_id: "b".into() },
                MapCompletion { map_id: "map1".into(), winner_id: "a".into() },
            ]
        );
        assert!(!card.can_finish());

        card.on_finish_result(Ok(()));
        assert!(card.finished);
        card.set_winner(0, Slot::First);
        assert_eq!(card.drafts[0].winner, Some(Slot::Second));
    }

    #[test]
    fn failed_finish_keeps_drafts_for_retry() {
        let m = ongoing_match(1);
        let mut card = MatchCardState::new(&m);
        card.set_winner(0, Slot::First);
        card.begin_finish(&m).unwrap();
        card.on_finish_result(Err("Failed to complete map map0".into()));
        assert!(!card.finished);
        assert!(card.can_finish());
    }
}
