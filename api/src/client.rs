use crate::wire::{
    CompleteMapBody, CompleteMapResponse, ErrorBody, FixtureSnapshot, FriendRequestBody,
    RegistrationBody, TeamResponse, WireGroup, WireGroupRow, WireMatch, WireParticipant,
    WireRound, WireTournament, WireUser,
};
use crate::{
    Game, Group, GroupStage, Match, MatchMap, Participant, ParticipantKind, PlayoffStage, Round,
    StandingsEntity, StandingsRow, Team, Tournament, User, DATE_TIME_FORMAT, media_url,
};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use reqwest::{Client, Response, StatusCode};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

/// GGForge backend client.
#[derive(Debug, Clone)]
pub struct GgForgeApi {
    client: Client,
    base_url: String,
    media_base: String,
    timeout: Duration,
}

impl Default for GgForgeApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    /// Non-success status. `message` is the body's `msg` when present.
    Api { status: u16, message: String, url: String },
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api { status, message, .. } => write!(f, "{message} (HTTP {status})"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// One map result to submit when finishing a match.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCompletion {
    pub map_id: String,
    pub winner_id: String,
}

/// A match finish aborted part-way. Maps listed in `completed` stay completed
/// on the backend; nothing is rolled back.
#[derive(Debug)]
pub struct MapCompletionError {
    pub completed: Vec<String>,
    pub failed_map: String,
    pub source: ApiError,
}

impl fmt::Display for MapCompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to complete map {} ({} of the earlier maps were saved): {}",
            self.failed_map,
            self.completed.len(),
            self.source
        )
    }
}

impl std::error::Error for MapCompletionError {}

impl GgForgeApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .user_agent(concat!("ggforge/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            media_base: base_url.clone(),
            base_url,
            timeout: Duration::from_secs(10),
        }
    }

    /// Media paths (avatars, logos) are served from a different origin in some deployments.
    pub fn with_media_base(mut self, media_base: impl Into<String>) -> Self {
        self.media_base = media_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn media_base(&self) -> &str {
        &self.media_base
    }

    /// `GET /teams/{id}`
    pub async fn fetch_team(&self, team_id: &str) -> ApiResult<Team> {
        let url = format!("{}/teams/{team_id}", self.base_url);
        let raw: TeamResponse = self.get(&url).await?;
        Ok(map_team(raw, &self.media_base))
    }

    /// Move a scheduled match to ongoing. The backend creates its maps.
    pub async fn start_match(&self, tournament_id: &str, match_id: &str) -> ApiResult<()> {
        let url = format!(
            "{}/tournaments/{tournament_id}/matches/{match_id}/start",
            self.base_url
        );
        debug!("starting match {match_id} of tournament {tournament_id}");
        self.post(&url, None::<&()>).await.map(drop)
    }

    pub async fn complete_map(
        &self,
        tournament_id: &str,
        match_id: &str,
        map_id: &str,
        winner_id: &str,
    ) -> ApiResult<()> {
        let url = format!(
            "{}/tournaments/{tournament_id}/matches/{match_id}/maps/{map_id}/complete",
            self.base_url
        );
        debug!("completing map {map_id} of match {match_id}, winner {winner_id}");
        let response = self.post(&url, Some(&CompleteMapBody { winner_id })).await?;
        // The body is informational; a missing or odd one does not fail the map.
        if let Ok(CompleteMapResponse { match_state: Some(progress), .. }) =
            response.json::<CompleteMapResponse>().await
        {
            debug!(
                "match {match_id} now {} ({}:{})",
                progress.status.label(),
                progress.score1,
                progress.score2
            );
        }
        Ok(())
    }

    /// Submit map results one at a time, stopping at the first failure.
    pub async fn complete_maps(
        &self,
        tournament_id: &str,
        match_id: &str,
        completions: &[MapCompletion],
    ) -> Result<(), MapCompletionError> {
        let mut completed = Vec::with_capacity(completions.len());
        for c in completions {
            if let Err(source) = self
                .complete_map(tournament_id, match_id, &c.map_id, &c.winner_id)
                .await
            {
                return Err(MapCompletionError {
                    completed,
                    failed_map: c.map_id.clone(),
                    source,
                });
            }
            completed.push(c.map_id.clone());
        }
        Ok(())
    }

    /// `POST /users/me/friends`. A request that already exists (409) counts as sent.
    pub async fn send_friend_request(&self, target_user_id: &str) -> ApiResult<()> {
        let url = format!("{}/users/me/friends", self.base_url);
        let body = FriendRequestBody { target_user_id };
        match self.post(&url, Some(&body)).await {
            Err(ApiError::Api { status: 409, .. }) => Ok(()),
            other => other.map(drop),
        }
    }

    /// `DELETE /users/me/friends/requests/{id}`. A missing request counts as cancelled.
    pub async fn cancel_friend_request(&self, target_user_id: &str) -> ApiResult<()> {
        let url = format!("{}/users/me/friends/requests/{target_user_id}", self.base_url);
        self.delete_idempotent(&url).await
    }

    /// `DELETE /users/me/friends/{id}`. An unknown friend counts as removed.
    pub async fn remove_friend(&self, friend_id: &str) -> ApiResult<()> {
        let url = format!("{}/users/me/friends/{friend_id}", self.base_url);
        self.delete_idempotent(&url).await
    }

    pub async fn register_for_tournament(
        &self,
        tournament_id: &str,
        is_team: bool,
        participant_id: &str,
    ) -> ApiResult<()> {
        let url = format!("{}/tournaments/{tournament_id}/register", self.base_url);
        let body = RegistrationBody { is_team, participant_id };
        self.post(&url, Some(&body)).await.map(drop)
    }

    pub async fn unregister_from_tournament(
        &self,
        tournament_id: &str,
        is_team: bool,
        participant_id: &str,
    ) -> ApiResult<()> {
        let url = format!("{}/tournaments/{tournament_id}/unregister", self.base_url);
        let body = RegistrationBody { is_team, participant_id };
        self.post(&url, Some(&body)).await.map(drop)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.to_owned()));
        }
        check_status(response, url)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }

    async fn post<B: serde::Serialize>(&self, url: &str, body: Option<&B>) -> ApiResult<Response> {
        let mut request = self.client.post(url).timeout(self.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        check_status(response, url).await
    }

    async fn delete_idempotent(&self, url: &str) -> ApiResult<()> {
        let response = self
            .client
            .delete(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response, url).await.map(drop)
    }
}

/// Pass successful responses through; turn failures into `ApiError::Api`
/// carrying the body's `msg`, falling back to the status reason.
async fn check_status(response: Response, url: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.msg)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    Err(ApiError::Api {
        status: status.as_u16(),
        message,
        url: url.to_owned(),
    })
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

/// Resolve a wire participant into a display-ready one.
///
/// When the slot nests a `user`, the user becomes the participant and its avatar
/// is rewritten to `{media_base}/{avatar}`. Inline participants keep their own
/// fields, with relative media paths resolved against the same base. A slot
/// without any ID is empty.
pub fn normalize_participant(
    wire: WireParticipant,
    media_base: &str,
    inline_kind: ParticipantKind,
) -> Option<Participant> {
    if let Some(user) = wire.user {
        return Some(Participant {
            id: user.id.into_string(),
            name: user.name.unwrap_or_default(),
            avatar: user.avatar.map(|a| format!("{media_base}/{a}")),
            kind: ParticipantKind::User,
        });
    }
    let id = wire.id?.into_string();
    Some(Participant {
        id,
        name: wire.name.unwrap_or_default(),
        avatar: wire.avatar.map(|a| media_url(media_base, Some(&a))),
        kind: inline_kind,
    })
}

pub fn map_user(raw: WireUser, media_base: &str) -> User {
    User {
        id: raw.id.into_string(),
        name: raw.name.unwrap_or_default(),
        avatar: raw.avatar.map(|a| media_url(media_base, Some(&a))),
        is_online: raw.is_online,
        registered_on: raw.registered_on.as_deref().and_then(parse_date),
        friendship: raw.friendship,
    }
}

pub fn map_team(raw: TeamResponse, media_base: &str) -> Team {
    Team {
        id: raw.id.into_string(),
        name: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        logo: raw.logo_path.map(|p| media_url(media_base, Some(&p))),
        members: raw
            .players
            .into_iter()
            .map(|p| map_user(p, media_base))
            .collect(),
    }
}

pub fn map_match(raw: WireMatch, media_base: &str, fallback_tournament_id: &str) -> Match {
    let inline_kind = match raw.kind.as_deref() {
        Some("team") => ParticipantKind::Team,
        _ => ParticipantKind::User,
    };
    Match {
        id: raw.id.into_string(),
        tournament_id: raw
            .tournament_id
            .map(|id| id.into_string())
            .unwrap_or_else(|| fallback_tournament_id.to_string()),
        number: raw.number,
        format: raw.format,
        status: raw.status,
        participant1: raw
            .participant1
            .and_then(|p| normalize_participant(p, media_base, inline_kind)),
        participant2: raw
            .participant2
            .and_then(|p| normalize_participant(p, media_base, inline_kind)),
        score1: raw.score1,
        score2: raw.score2,
        creator_id: raw.creator.map(|id| id.into_string()),
        maps: raw
            .maps
            .into_iter()
            .map(|m| MatchMap {
                id: m.id.into_string(),
                winner_id: m.winner_id,
                external_url: m.external_url.filter(|u| !u.trim().is_empty()),
            })
            .collect(),
    }
}

fn map_group_row(raw: WireGroupRow, media_base: &str) -> Option<StandingsRow> {
    let entity = match (raw.team, raw.user) {
        (Some(team), _) => StandingsEntity::Team(normalize_participant(
            team,
            media_base,
            ParticipantKind::Team,
        )?),
        (None, Some(user)) => StandingsEntity::User(normalize_participant(
            user,
            media_base,
            ParticipantKind::User,
        )?),
        (None, None) => return None,
    };
    Some(StandingsRow {
        id: raw.id.into_string(),
        place: raw.place,
        entity,
        wins: raw.wins,
        draws: raw.draws,
        losses: raw.losses,
    })
}

fn map_group(raw: WireGroup, media_base: &str, tournament_id: &str) -> Group {
    let mut rows: Vec<StandingsRow> = raw
        .group_rows
        .into_iter()
        .filter_map(|r| map_group_row(r, media_base))
        .collect();
    rows.sort_by_key(|r| r.place);
    let mut dropped = Vec::new();
    rows.dedup_by(|row, kept| {
        let duplicate = row.place == kept.place;
        if duplicate {
            dropped.push(row.id.clone());
        }
        duplicate
    });
    let id = raw.id.into_string();
    if !dropped.is_empty() {
        warn!("group {id}: dropped rows with a duplicate place: {}", dropped.join(", "));
    }
    Group {
        id,
        letter: raw.letter,
        rows,
        matches: raw
            .matches
            .into_iter()
            .map(|m| map_match(m, media_base, tournament_id))
            .collect(),
    }
}

fn map_round(raw: WireRound, media_base: &str, tournament_id: &str) -> Round {
    Round {
        id: raw.id.into_string(),
        label: raw.label,
        matches: raw
            .matches
            .into_iter()
            .map(|m| map_match(m, media_base, tournament_id))
            .collect(),
    }
}

pub fn map_tournament(raw: WireTournament, media_base: &str) -> Tournament {
    let id = raw.id.into_string();
    Tournament {
        game_id: raw.game_id.map(|g| g.into_string()).unwrap_or_default(),
        title: raw.title,
        image: raw.image.map(|p| media_url(media_base, Some(&p))),
        starts_at: raw.date.as_deref().and_then(parse_starts_at),
        status: raw.status,
        prize_fund: raw.prize_fund,
        contact: raw.contact.filter(|c| !c.trim().is_empty()),
        organizer: raw.organizer.map(|u| map_user(u, media_base)),
        description: raw.description,
        requires_team: raw.requires_team,
        has_group_stage: raw.has_group_stage,
        group_stage: raw.group_stage.filter(|_| raw.has_group_stage).map(|gs| GroupStage {
            groups: gs
                .groups
                .into_iter()
                .map(|g| map_group(g, media_base, &id))
                .collect(),
        }),
        playoff: PlayoffStage {
            rounds: raw
                .playoff_stage
                .rounds
                .into_iter()
                .map(|r| map_round(r, media_base, &id))
                .collect(),
        },
        final_match: raw.final_match.map(|m| map_match(m, media_base, &id)),
        participants: raw
            .participants
            .into_iter()
            .map(|u| map_user(u, media_base))
            .collect(),
        prizes: Vec::new(),
        id,
    }
}

pub fn map_game(raw: crate::wire::WireGame, media_base: &str) -> Game {
    Game {
        id: raw.id.into_string(),
        title: raw.title,
        image: raw.image.map(|p| media_url(media_base, Some(&p))),
        description: raw.description,
    }
}

/// Parse a snapshot into its domain pieces. Used by fixture loading.
pub(crate) fn map_snapshot(raw: FixtureSnapshot, media_base: &str) -> crate::fixtures::Fixtures {
    let users = |list: Vec<WireUser>| -> Vec<User> {
        list.into_iter().map(|u| map_user(u, media_base)).collect()
    };
    let organized: Vec<String> = raw.organized.into_iter().map(|id| id.into_string()).collect();
    crate::fixtures::Fixtures {
        games: raw.games.into_iter().map(|g| map_game(g, media_base)).collect(),
        tournaments: raw
            .tournaments
            .into_iter()
            .map(|t| map_tournament(t, media_base))
            .collect(),
        teams: raw.teams.into_iter().map(|t| map_team(t, media_base)).collect(),
        team_invites: raw
            .team_invites
            .into_iter()
            .map(|t| map_team(t, media_base))
            .collect(),
        friends: users(raw.friends),
        incoming_requests: users(raw.incoming_requests),
        outgoing_requests: users(raw.outgoing_requests),
        users: users(raw.users),
        me: raw.me.map(|u| map_user(u, media_base)).unwrap_or_default(),
        game_accounts: Vec::new(),
        organized,
    }
}

/// "17.05.2021" or "2021-05-17"
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// "12.12.2025 | 17:00"
pub fn parse_starts_at(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), DATE_TIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireId;
    use crate::{MatchFormat, MatchStatus};
    use mockito::{Matcher, Server};

    fn nested(avatar: &str) -> WireParticipant {
        WireParticipant {
            id: Some(WireId::Num(99)),
            name: Some("slot".into()),
            avatar: None,
            user: Some(WireUser {
                id: WireId::Str("u-1".into()),
                name: Some("Nova".into()),
                avatar: Some(avatar.into()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn nested_user_replaces_participant_and_prefixes_avatar() {
        let p = normalize_participant(nested("uploads/nova.png"), "http://media.local", ParticipantKind::Team)
            .unwrap();
        assert_eq!(p.id, "u-1");
        assert_eq!(p.name, "Nova");
        assert_eq!(p.avatar.as_deref(), Some("http://media.local/uploads/nova.png"));
        assert_eq!(p.kind, ParticipantKind::User);
    }

    #[test]
    fn inline_participant_without_id_is_an_empty_slot() {
        let wire = WireParticipant { name: Some("TBD".into()), ..Default::default() };
        assert!(normalize_participant(wire, "http://m", ParticipantKind::User).is_none());
    }

    #[test]
    fn wire_match_maps_with_backend_field_names() {
        let raw: WireMatch = serde_json::from_str(
            r#"{
                "id": 4, "number": 2, "format": "bo3", "status": "upcoming", "type": "team",
                "participant1": {"id": 10, "title": "Owls", "logo_path": "logos/owls.png"},
                "participant2": {"id": 11, "title": "Foxes"},
                "participant1_score": 1, "participant2_score": 0,
                "creator": "u-9",
                "maps": [{"id": "m1", "winner_id": "10", "external_url": ""}]
            }"#,
        )
        .unwrap();
        let m = map_match(raw, "http://m", "t-1");
        assert_eq!(m.id, "4");
        assert_eq!(m.tournament_id, "t-1");
        assert_eq!(m.format, MatchFormat::Bo3);
        assert_eq!(m.status, MatchStatus::Scheduled);
        let p1 = m.participant1.as_ref().unwrap();
        assert_eq!(p1.kind, ParticipantKind::Team);
        assert_eq!(p1.avatar.as_deref(), Some("http://m/logos/owls.png"));
        assert_eq!(m.creator_id.as_deref(), Some("u-9"));
        assert_eq!(m.score1, 1);
        assert!(m.maps[0].external_url.is_none());
        assert_eq!(m.map_winner(&m.maps[0]).map(|p| p.name.as_str()), Some("Owls"));
    }

    #[test]
    fn tournament_and_game_images_resolve_against_media_base() {
        let raw: WireTournament = serde_json::from_str(
            r#"{
                "id": 7, "title": "Cup", "img": "covers/cup.png", "has_groupstage": true,
                "group_stage": {"groups": [{"id": 1, "letter": "A", "group_rows": [
                    {"id": 1, "place": 1, "user": {"id": 5, "name": "Kes"}, "wins": 2},
                    {"id": 2, "place": 1, "user": {"id": 6, "name": "Ash"}},
                    {"id": 3, "place": 2, "user": {"id": 7, "name": "Vex"}}
                ]}]}
            }"#,
        )
        .unwrap();
        let t = map_tournament(raw, "http://m/");
        assert_eq!(t.image.as_deref(), Some("http://m/covers/cup.png"));
        let rows = &t.group_stage.as_ref().unwrap().groups[0].rows;
        assert_eq!(rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["1", "3"]);

        let game: crate::wire::WireGame =
            serde_json::from_str(r#"{"id": 1, "title": "Arena", "image": "https://cdn/a.png"}"#)
                .unwrap();
        assert_eq!(map_game(game, "http://m").image.as_deref(), Some("https://cdn/a.png"));
        let game: crate::wire::WireGame =
            serde_json::from_str(r#"{"id": 2, "title": "Duel", "img": "games/duel.png"}"#).unwrap();
        assert_eq!(map_game(game, "http://m").image.as_deref(), Some("http://m/games/duel.png"));
    }

    #[test]
    fn parse_starts_at_uses_platform_format() {
        let t = parse_starts_at("12.12.2025 | 17:00").unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M").to_string(), "2025-12-12 17:00");
        assert!(parse_starts_at("2025-12-12").is_none());
        assert_eq!(parse_date("2021-05-20"), parse_date("20.05.2021"));
    }

    #[tokio::test]
    async fn fetch_team_resolves_media_paths() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/teams/5")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": 5, "title": "Night Owls", "logo_path": "logos/5.png",
                    "description": "late games only",
                    "players": [{"id": "p1", "name": "Ola", "avatar": "a/p1.png"}]}"#,
            )
            .create_async()
            .await;

        let api = GgForgeApi::new(server.url()).with_media_base("http://cdn.local");
        let team = api.fetch_team("5").await.unwrap();

        mock.assert_async().await;
        assert_eq!(team.id, "5");
        assert_eq!(team.name, "Night Owls");
        assert_eq!(team.logo.as_deref(), Some("http://cdn.local/logos/5.png"));
        assert_eq!(team.members.len(), 1);
        assert_eq!(team.members[0].avatar.as_deref(), Some("http://cdn.local/a/p1.png"));
    }

    #[tokio::test]
    async fn fetch_team_maps_404_to_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/teams/404")
            .with_status(404)
            .create_async()
            .await;
        let api = GgForgeApi::new(server.url());
        assert!(matches!(api.fetch_team("404").await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn start_match_surfaces_backend_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/tournaments/t1/matches/m1/start")
            .with_status(422)
            .with_body(r#"{"msg": "Match is missing participants"}"#)
            .create_async()
            .await;
        let api = GgForgeApi::new(server.url());
        let err = api.start_match("t1", "m1").await.unwrap_err();
        match &err {
            ApiError::Api { status, message, .. } => {
                assert_eq!(*status, 422);
                assert_eq!(message, "Match is missing participants");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Match is missing participants"));
    }

    #[tokio::test]
    async fn complete_maps_stops_at_first_failure() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("POST", "/tournaments/t1/matches/m1/maps/a/complete")
            .match_body(Matcher::Json(serde_json::json!({"winner_id": "p1"})))
            .with_status(200)
            .with_body(r#"{"msg": "Map updated"}"#)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/tournaments/t1/matches/m1/maps/b/complete")
            .with_status(500)
            .with_body(r#"{"msg": "Database error"}"#)
            .create_async()
            .await;
        let third = server
            .mock("POST", "/tournaments/t1/matches/m1/maps/c/complete")
            .expect(0)
            .create_async()
            .await;

        let api = GgForgeApi::new(server.url());
        let completions = ["a", "b", "c"].map(|id| MapCompletion {
            map_id: id.into(),
            winner_id: "p1".into(),
        });
        let err = api.complete_maps("t1", "m1", &completions).await.unwrap_err();

        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
        assert_eq!(err.completed, vec!["a".to_string()]);
        assert_eq!(err.failed_map, "b");
        assert!(err.to_string().contains("Database error"));
    }

    #[tokio::test]
    async fn social_actions_are_idempotent() {
        let mut server = Server::new_async().await;
        let _send = server
            .mock("POST", "/users/me/friends")
            .match_body(Matcher::Json(serde_json::json!({"target_user_id": "u2"})))
            .with_status(409)
            .with_body(r#"{"msg": "Request already sent"}"#)
            .create_async()
            .await;
        let _cancel = server
            .mock("DELETE", "/users/me/friends/requests/u2")
            .with_status(404)
            .create_async()
            .await;

        let api = GgForgeApi::new(server.url());
        assert!(api.send_friend_request("u2").await.is_ok());
        assert!(api.cancel_friend_request("u2").await.is_ok());
    }

    #[tokio::test]
    async fn register_sends_participant_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/tournaments/t9/register")
            .match_body(Matcher::Json(serde_json::json!({
                "is_team": true,
                "participant_id": "team-3"
            })))
            .with_status(200)
            .with_body(r#"{"msg": "ok"}"#)
            .create_async()
            .await;
        let api = GgForgeApi::new(server.url());
        api.register_for_tournament("t9", true, "team-3").await.unwrap();
        mock.assert_async().await;
    }
}
