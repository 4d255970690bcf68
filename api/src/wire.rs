/// Backend wire types: serde shapes for deserializing GGForge API responses
/// and fixture snapshots. These map to the clean domain types in client.rs.
use serde::{Deserialize, Serialize};

use crate::{FriendshipStatus, MatchFormat, MatchStatus, TournamentStatus};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Every failing endpoint answers with `{"msg": "..."}`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ErrorBody {
    pub msg: Option<String>,
}

// ---------------------------------------------------------------------------
// Users and teams
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireUser {
    pub id: WireId,
    #[serde(alias = "username")]
    pub name: Option<String>,
    pub avatar: Option<String>,
    #[serde(default, alias = "isOnline")]
    pub is_online: bool,
    /// "DD.MM.YYYY" or ISO "YYYY-MM-DD".
    #[serde(alias = "registeredDays")]
    pub registered_on: Option<String>,
    #[serde(default)]
    pub friendship: FriendshipStatus,
}

/// `GET /teams/{id}`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct TeamResponse {
    pub id: WireId,
    pub title: Option<String>,
    pub logo_path: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub players: Vec<WireUser>,
}

/// The backend mixes numeric and UUID identifiers; the client treats both as strings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum WireId {
    Num(u64),
    Str(String),
}

impl Default for WireId {
    fn default() -> Self {
        WireId::Str(String::new())
    }
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Num(n) => n.to_string(),
            WireId::Str(s) => s,
        }
    }
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

/// A match slot as sent by the backend. Individual tournaments nest the
/// player under `user`; team tournaments send the team fields inline.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireParticipant {
    pub id: Option<WireId>,
    #[serde(alias = "title")]
    pub name: Option<String>,
    #[serde(alias = "logo_path")]
    pub avatar: Option<String>,
    pub user: Option<WireUser>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMap {
    pub id: WireId,
    pub winner_id: Option<String>,
    pub external_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatch {
    pub id: WireId,
    pub tournament_id: Option<WireId>,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub format: MatchFormat,
    #[serde(default)]
    pub status: MatchStatus,
    /// "solo" or "team"
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub participant1: Option<WireParticipant>,
    pub participant2: Option<WireParticipant>,
    #[serde(default, alias = "participant1_score")]
    pub score1: u32,
    #[serde(default, alias = "participant2_score")]
    pub score2: u32,
    pub creator: Option<WireId>,
    #[serde(default)]
    pub maps: Vec<WireMap>,
}

/// `POST .../maps/{map_id}/complete` body.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CompleteMapBody<'a> {
    pub winner_id: &'a str,
}

/// `POST .../maps/{map_id}/complete`: the match part of the response.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CompleteMapResponse {
    pub msg: Option<String>,
    #[serde(rename = "match")]
    pub match_state: Option<MatchProgress>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MatchProgress {
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub score1: u32,
    #[serde(default)]
    pub score2: u32,
}

// ---------------------------------------------------------------------------
// Social and registration
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FriendRequestBody<'a> {
    pub target_user_id: &'a str,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RegistrationBody<'a> {
    pub is_team: bool,
    pub participant_id: &'a str,
}

// ---------------------------------------------------------------------------
// Fixture snapshot (GGFORGE_FIXTURES)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FixtureSnapshot {
    #[serde(default)]
    pub games: Vec<WireGame>,
    #[serde(default)]
    pub tournaments: Vec<WireTournament>,
    #[serde(default)]
    pub teams: Vec<TeamResponse>,
    #[serde(default)]
    pub team_invites: Vec<TeamResponse>,
    #[serde(default)]
    pub friends: Vec<WireUser>,
    #[serde(default)]
    pub incoming_requests: Vec<WireUser>,
    #[serde(default)]
    pub outgoing_requests: Vec<WireUser>,
    #[serde(default)]
    pub users: Vec<WireUser>,
    pub me: Option<WireUser>,
    /// IDs of tournaments the current user organizes; the rest are ones they play in.
    #[serde(default)]
    pub organized: Vec<WireId>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireGame {
    pub id: WireId,
    pub title: String,
    #[serde(alias = "img")]
    pub image: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTournament {
    pub id: WireId,
    #[serde(default)]
    pub game_id: Option<WireId>,
    pub title: String,
    #[serde(alias = "img")]
    pub image: Option<String>,
    /// "DD.MM.YYYY | HH:MM"
    pub date: Option<String>,
    #[serde(default)]
    pub status: TournamentStatus,
    pub prize_fund: Option<u64>,
    pub contact: Option<String>,
    #[serde(alias = "manager")]
    pub organizer: Option<WireUser>,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "team")]
    pub requires_team: bool,
    #[serde(default, alias = "has_groupstage")]
    pub has_group_stage: bool,
    pub group_stage: Option<WireGroupStage>,
    #[serde(default)]
    pub playoff_stage: WirePlayoffStage,
    #[serde(rename = "final")]
    pub final_match: Option<WireMatch>,
    #[serde(default)]
    pub participants: Vec<WireUser>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireGroupStage {
    #[serde(default)]
    pub groups: Vec<WireGroup>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireGroup {
    pub id: WireId,
    pub letter: String,
    #[serde(default)]
    pub group_rows: Vec<WireGroupRow>,
    #[serde(default)]
    pub matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireGroupRow {
    pub id: WireId,
    pub place: u32,
    pub team: Option<WireParticipant>,
    pub user: Option<WireParticipant>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default, alias = "loses")]
    pub losses: u32,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WirePlayoffStage {
    #[serde(default)]
    pub rounds: Vec<WireRound>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireRound {
    pub id: WireId,
    #[serde(alias = "letter")]
    pub label: String,
    #[serde(default)]
    pub matches: Vec<WireMatch>,
}
