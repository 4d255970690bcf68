pub mod client;
pub mod fixtures;
pub mod wire;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static asset shown wherever the backend has no media path for an entity.
pub const DEFAULT_AVATAR: &str = "static/default-avatar.png";

/// Display format used by the platform for tournament start times.
pub const DATE_TIME_FORMAT: &str = "%d.%m.%Y | %H:%M";

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the backend wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    #[default]
    None,
    Pending,
    Accepted,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub is_online: bool,
    pub registered_on: Option<NaiveDate>,
    pub friendship: FriendshipStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: String,
    pub logo: Option<String>,
    pub members: Vec<User>,
}

/// Catalog entry for a game tournaments can be hosted for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Game {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameAccount {
    pub id: String,
    pub game_title: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    #[default]
    Open,
    Ongoing,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub const ALL: [TournamentStatus; 4] = [
        TournamentStatus::Open,
        TournamentStatus::Ongoing,
        TournamentStatus::Completed,
        TournamentStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TournamentStatus::Open => "Open",
            TournamentStatus::Ongoing => "In progress",
            TournamentStatus::Completed => "Completed",
            TournamentStatus::Cancelled => "Cancelled",
        }
    }

    /// Value used in query strings (`?tournament=open`).
    pub fn as_query(&self) -> &'static str {
        match self {
            TournamentStatus::Open => "open",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_query(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_query() == s)
    }
}

/// One card in a tournament listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentSummary {
    pub id: String,
    pub game_id: String,
    pub title: String,
    pub image: Option<String>,
    pub status: TournamentStatus,
    pub starts_at: Option<NaiveDateTime>,
    pub info: String, // "5v5 | 32 slots | 1,000,000"
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tournament {
    pub id: String,
    pub game_id: String,
    pub title: String,
    pub image: Option<String>,
    pub starts_at: Option<NaiveDateTime>,
    pub status: TournamentStatus,
    pub prize_fund: Option<u64>,
    pub contact: Option<String>,
    pub organizer: Option<User>,
    pub description: String,
    /// Applications must be made on behalf of a team.
    pub requires_team: bool,
    pub has_group_stage: bool,
    pub group_stage: Option<GroupStage>,
    pub playoff: PlayoffStage,
    pub final_match: Option<Match>,
    pub participants: Vec<User>,
    pub prizes: Vec<PrizePlace>,
}

impl Tournament {
    pub fn summary(&self) -> TournamentSummary {
        TournamentSummary {
            id: self.id.clone(),
            game_id: self.game_id.clone(),
            title: self.title.clone(),
            image: self.image.clone(),
            status: self.status,
            starts_at: self.starts_at,
            info: self
                .prize_fund
                .map(|fund| format!("{} slots | {}", self.participants.len(), format_prize(fund)))
                .unwrap_or_else(|| format!("{} slots", self.participants.len())),
        }
    }

    /// Every match of the tournament: group stage, playoff rounds, then the final.
    pub fn all_matches(&self) -> impl Iterator<Item = &Match> {
        self.group_stage
            .iter()
            .flat_map(|stage| stage.groups.iter())
            .flat_map(|group| group.matches.iter())
            .chain(self.playoff.rounds.iter().flat_map(|round| round.matches.iter()))
            .chain(self.final_match.iter())
    }

    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.all_matches().find(|m| m.id == match_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrizePlace {
    pub place: u32,
    pub participant: Participant,
    pub prize: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupStage {
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub id: String,
    pub letter: String,
    /// Supplied pre-sorted by place.
    pub rows: Vec<StandingsRow>,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StandingsEntity {
    Team(Participant),
    User(Participant),
}

impl StandingsEntity {
    pub fn participant(&self) -> &Participant {
        match self {
            StandingsEntity::Team(p) | StandingsEntity::User(p) => p,
        }
    }

    /// Client route of the entity's page.
    pub fn link(&self) -> String {
        match self {
            StandingsEntity::Team(p) => format!("/team/{}", p.id),
            StandingsEntity::User(p) => format!("/profile/{}", p.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsRow {
    pub id: String,
    pub place: u32,
    pub entity: StandingsEntity,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl StandingsRow {
    /// Two points per win, one per draw. Never stored.
    pub fn points(&self) -> u64 {
        u64::from(self.wins) * 2 + u64::from(self.draws)
    }
}

/// Cosmetic banding of a standings row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowBand {
    Qualifying,
    Eliminated,
}

/// Number of rows at the top of a group shown as qualifying.
pub fn qualifying_cutoff(rows: usize) -> usize {
    match rows {
        0..=4 => rows.div_ceil(2),
        5 => 2,
        6..=8 => 4,
        _ => rows - 2,
    }
}

pub fn row_band(index: usize, rows: usize) -> RowBand {
    if index < qualifying_cutoff(rows) {
        RowBand::Qualifying
    } else {
        RowBand::Eliminated
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayoffStage {
    pub rounds: Vec<Round>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Round {
    pub id: String,
    pub label: String,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchFormat {
    #[default]
    Bo1,
    Bo2,
    Bo3,
    Bo5,
}

impl MatchFormat {
    pub fn maps(&self) -> usize {
        match self {
            MatchFormat::Bo1 => 1,
            MatchFormat::Bo2 => 2,
            MatchFormat::Bo3 => 3,
            MatchFormat::Bo5 => 5,
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BO{}", self.maps())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    #[serde(alias = "upcoming")]
    Scheduled,
    Ongoing,
    #[serde(alias = "concluded", alias = "tech_win")]
    Completed,
    #[serde(other)]
    Cancelled,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Upcoming",
            MatchStatus::Ongoing => "Live",
            MatchStatus::Completed => "Finished",
            MatchStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParticipantKind {
    #[default]
    User,
    Team,
}

/// A resolved match participant: either a user or a team, with its avatar
/// already turned into a displayable URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub kind: ParticipantKind,
}

impl From<&User> for Participant {
    fn from(user: &User) -> Self {
        Participant {
            id: user.id.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            kind: ParticipantKind::User,
        }
    }
}

impl From<&Team> for Participant {
    fn from(team: &Team) -> Self {
        Participant {
            id: team.id.clone(),
            name: team.name.clone(),
            avatar: team.logo.clone(),
            kind: ParticipantKind::Team,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchMap {
    pub id: String,
    pub winner_id: Option<String>,
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub id: String,
    pub tournament_id: String,
    pub number: u32,
    pub format: MatchFormat,
    pub status: MatchStatus,
    pub participant1: Option<Participant>,
    pub participant2: Option<Participant>,
    pub score1: u32,
    pub score2: u32,
    pub creator_id: Option<String>,
    pub maps: Vec<MatchMap>,
}

impl Match {
    pub fn has_both_participants(&self) -> bool {
        self.participant1.is_some() && self.participant2.is_some()
    }

    /// Resolve the winner of a map by comparing IDs as strings.
    pub fn map_winner(&self, map: &MatchMap) -> Option<&Participant> {
        let winner_id = map.winner_id.as_deref()?;
        [&self.participant1, &self.participant2]
            .into_iter()
            .flatten()
            .find(|p| p.id == winner_id)
    }
}

/// Resolve a backend media path against the media base URL.
///
/// Absolute URLs pass through; missing or blank paths fall back to
/// [`DEFAULT_AVATAR`].
pub fn media_url(base: &str, path: Option<&str>) -> String {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) if p.starts_with("http://") || p.starts_with("https://") => p.to_string(),
        Some(p) => format!("{}/{}", base.trim_end_matches('/'), p.trim_start_matches('/')),
        None => DEFAULT_AVATAR.to_string(),
    }
}

/// "1000000" → "1,000,000"
pub fn format_prize(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_starts_at(starts_at: Option<NaiveDateTime>) -> String {
    starts_at
        .map(|t| t.format(DATE_TIME_FORMAT).to_string())
        .unwrap_or_else(|| "TBA".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(wins: u32, draws: u32, losses: u32) -> StandingsRow {
        StandingsRow {
            id: "r".into(),
            place: 1,
            entity: StandingsEntity::User(Participant::default()),
            wins,
            draws,
            losses,
        }
    }

    #[test]
    fn points_are_two_per_win_and_one_per_draw() {
        for wins in 0..6 {
            for draws in 0..6 {
                assert_eq!(row(wins, draws, 3).points(), u64::from(wins * 2 + draws));
            }
        }
        assert_eq!(row(u32::MAX / 2 + 1, 0, 0).points(), 1u64 << 32);
        assert_eq!(row(u32::MAX, u32::MAX, 0).points(), 3 * u64::from(u32::MAX));
    }

    #[test]
    fn qualifying_cutoff_follows_row_count() {
        let expected = [
            (0, 0),
            (1, 1),
            (2, 1),
            (3, 2),
            (4, 2),
            (5, 2),
            (6, 4),
            (7, 4),
            (8, 4),
            (9, 7),
            (12, 10),
        ];
        for (rows, cutoff) in expected {
            assert_eq!(qualifying_cutoff(rows), cutoff, "rows={rows}");
        }
    }

    #[test]
    fn row_band_splits_at_cutoff() {
        let bands: Vec<RowBand> = (0..5).map(|i| row_band(i, 5)).collect();
        assert_eq!(
            bands,
            vec![
                RowBand::Qualifying,
                RowBand::Qualifying,
                RowBand::Eliminated,
                RowBand::Eliminated,
                RowBand::Eliminated,
            ]
        );
    }

    #[test]
    fn media_url_resolves_relative_paths() {
        assert_eq!(
            media_url("http://api.local/", Some("/uploads/a.png")),
            "http://api.local/uploads/a.png"
        );
        assert_eq!(
            media_url("http://api.local", Some("https://cdn.x/a.png")),
            "https://cdn.x/a.png"
        );
        assert_eq!(media_url("http://api.local", Some("  ")), DEFAULT_AVATAR);
        assert_eq!(media_url("http://api.local", None), DEFAULT_AVATAR);
    }

    #[test]
    fn map_winner_compares_ids_as_strings() {
        let m = Match {
            participant1: Some(Participant { id: "7".into(), name: "a".into(), ..Default::default() }),
            participant2: Some(Participant { id: "8".into(), name: "b".into(), ..Default::default() }),
            ..Default::default()
        };
        let map = MatchMap { id: "m1".into(), winner_id: Some("8".into()), external_url: None };
        assert_eq!(m.map_winner(&map).map(|p| p.name.as_str()), Some("b"));
        let unset = MatchMap { id: "m2".into(), winner_id: None, external_url: None };
        assert!(m.map_winner(&unset).is_none());
    }

    #[test]
    fn format_prize_groups_thousands() {
        assert_eq!(format_prize(0), "0");
        assert_eq!(format_prize(999), "999");
        assert_eq!(format_prize(1000), "1,000");
        assert_eq!(format_prize(1_000_000), "1,000,000");
    }

    #[test]
    fn match_status_accepts_backend_aliases() {
        let parse = |s: &str| serde_json::from_str::<MatchStatus>(&format!("\"{s}\"")).unwrap();
        assert_eq!(parse("upcoming"), MatchStatus::Scheduled);
        assert_eq!(parse("concluded"), MatchStatus::Completed);
        assert_eq!(parse("tech_win"), MatchStatus::Completed);
        assert_eq!(parse("whatever"), MatchStatus::Cancelled);
    }
}
