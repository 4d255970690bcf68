//! Built-in sample data for the pages the backend does not serve yet.
//!
//! Fixtures are plain values: build them once with [`Fixtures::sample`] or
//! [`Fixtures::load_json`] and hand them to whatever renders them.

use crate::client::{ApiError, ApiResult, map_snapshot};
use crate::wire::FixtureSnapshot;
use crate::{
    FriendshipStatus, Game, GameAccount, Group, GroupStage, Match, MatchFormat, MatchMap,
    MatchStatus, Participant, PlayoffStage, PrizePlace, Round, StandingsEntity, StandingsRow,
    Team, Tournament, TournamentStatus, TournamentSummary, User,
};
use chrono::{NaiveDate, NaiveDateTime};

/// Whose tournaments to list on the "your tournaments" page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TournamentRole {
    #[default]
    Manager,
    Participant,
}

impl TournamentRole {
    pub fn as_query(&self) -> &'static str {
        match self {
            TournamentRole::Manager => "manager",
            TournamentRole::Participant => "participant",
        }
    }

    pub fn from_query(s: &str) -> Option<Self> {
        match s {
            "manager" => Some(TournamentRole::Manager),
            "participant" => Some(TournamentRole::Participant),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TournamentRole::Manager => "Organizer",
            TournamentRole::Participant => "Participant",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub games: Vec<Game>,
    pub tournaments: Vec<Tournament>,
    pub teams: Vec<Team>,
    pub team_invites: Vec<Team>,
    pub friends: Vec<User>,
    pub incoming_requests: Vec<User>,
    pub outgoing_requests: Vec<User>,
    /// Everyone searchable from the "add friend" dialog.
    pub users: Vec<User>,
    pub me: User,
    pub game_accounts: Vec<GameAccount>,
    /// IDs of tournaments organized by `me`.
    pub organized: Vec<String>,
}

impl Fixtures {
    /// Load a JSON snapshot (same field names as the backend).
    pub fn load_json(path: &str, media_base: &str) -> ApiResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApiError::NotFound(format!("could not read {path}: {e}")))?;
        Self::from_json(&content, media_base)
            .map_err(|e| ApiError::Other(format!("invalid fixture json at {path}: {e}")))
    }

    pub fn from_json(content: &str, media_base: &str) -> Result<Self, serde_json::Error> {
        let raw: FixtureSnapshot = serde_json::from_str(content)?;
        Ok(map_snapshot(raw, media_base))
    }

    pub fn game(&self, id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn tournament(&self, id: &str) -> Option<&Tournament> {
        self.tournaments.iter().find(|t| t.id == id)
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams
            .iter()
            .chain(self.team_invites.iter())
            .find(|t| t.id == id)
    }

    /// Look a user up in every collection, `me` included.
    pub fn user(&self, id: &str) -> Option<&User> {
        std::iter::once(&self.me)
            .chain(self.users.iter())
            .chain(self.friends.iter())
            .chain(self.incoming_requests.iter())
            .chain(self.outgoing_requests.iter())
            .find(|u| u.id == id)
    }

    pub fn tournaments_for_game(&self, game_id: &str) -> Vec<TournamentSummary> {
        self.tournaments
            .iter()
            .filter(|t| t.game_id == game_id)
            .map(Tournament::summary)
            .collect()
    }

    pub fn popular_tournaments(&self) -> Vec<TournamentSummary> {
        let mut list: Vec<&Tournament> = self
            .tournaments
            .iter()
            .filter(|t| t.status != TournamentStatus::Cancelled)
            .collect();
        list.sort_by(|a, b| b.prize_fund.cmp(&a.prize_fund));
        list.into_iter().take(4).map(Tournament::summary).collect()
    }

    pub fn my_tournaments(&self, role: TournamentRole) -> Vec<TournamentSummary> {
        self.tournaments
            .iter()
            .filter(|t| {
                let organized = self.organized.contains(&t.id);
                match role {
                    TournamentRole::Manager => organized,
                    TournamentRole::Participant => !organized,
                }
            })
            .map(Tournament::summary)
            .collect()
    }

    /// Teams the user plays in, invitations included.
    pub fn teams_of(&self, user_id: &str) -> Vec<&Team> {
        self.teams
            .iter()
            .chain(self.team_invites.iter())
            .filter(|t| t.members.iter().any(|m| m.id == user_id))
            .collect()
    }

    /// Tournaments the user is registered for.
    pub fn tournaments_of(&self, user_id: &str) -> Vec<TournamentSummary> {
        self.tournaments
            .iter()
            .filter(|t| t.participants.iter().any(|p| p.id == user_id))
            .map(Tournament::summary)
            .collect()
    }

    pub fn sample() -> Self {
        let me = user("u-1", "iburdinova", true, "20.05.2021", FriendshipStatus::None);
        let friends = vec![
            user("u-2", "gg", true, "01.02.2022", FriendshipStatus::Accepted),
            user("u-3", "Olya", false, "14.07.2022", FriendshipStatus::Accepted),
            user("u-4", "scc", true, "03.03.2023", FriendshipStatus::Accepted),
        ];
        let incoming_requests = vec![
            user("u-5", "ww", false, "11.11.2023", FriendshipStatus::Pending),
            user("u-6", "da", true, "09.01.2024", FriendshipStatus::Pending),
        ];
        let outgoing_requests = vec![user("u-7", "nova", false, "17.08.2024", FriendshipStatus::Pending)];
        let mut users = friends.clone();
        users.extend(incoming_requests.iter().cloned());
        users.extend(outgoing_requests.iter().cloned());
        users.extend([
            user("u-8", "inova", true, "05.05.2021", FriendshipStatus::None),
            user("u-9", "kestrel", false, "12.10.2024", FriendshipStatus::None),
            user("u-10", "Iris", true, "30.06.2025", FriendshipStatus::None),
        ]);

        let teams = vec![
            team("team-1", "Night Owls", "We only play after midnight.", &friends[..2]),
            team("team-2", "Red Foxes", "", &friends[1..]),
        ];
        let team_invites = vec![team("team-3", "Iron Wolves", "Looking for a fifth.", &users[5..7])];

        let games = vec![
            game("1", "Dota 2", "Two teams of five fight over three lanes."),
            game("2", "Counter-Strike 2", "Tactical shooter, best of thirty rounds."),
            game("3", "Valorant", "Agents, abilities and a spike to plant."),
            game("4", "Rocket League", "Football, but with rocket-powered cars."),
        ];

        let tournaments = vec![
            showcase_tournament(&me, &users, &teams),
            playoff_only_tournament(&me, &users),
            summary_tournament("3", "2", "Autumn Clash", TournamentStatus::Ongoing, 250_000, &users[..8]),
            summary_tournament("4", "2", "Rookie Cup", TournamentStatus::Completed, 10_000, &users[..4]),
            summary_tournament("5", "3", "Spike Rush Weekly", TournamentStatus::Open, 50_000, &users[..6]),
            summary_tournament("6", "1", "Midnight Mayhem", TournamentStatus::Cancelled, 0, &users[..2]),
            summary_tournament("7", "4", "Aerial Open", TournamentStatus::Open, 120_000, &users[..8]),
        ];

        Fixtures {
            games,
            tournaments,
            teams,
            team_invites,
            friends,
            incoming_requests,
            outgoing_requests,
            users,
            game_accounts: vec![
                GameAccount { id: "acc-1".into(), game_title: "Dota 2".into(), nickname: "PlayerOne".into() },
                GameAccount { id: "acc-2".into(), game_title: "Valorant".into(), nickname: "GamerGirl".into() },
            ],
            me,
            organized: vec!["1".into(), "2".into(), "6".into()],
        }
    }
}

fn user(id: &str, name: &str, is_online: bool, registered: &str, friendship: FriendshipStatus) -> User {
    User {
        id: id.into(),
        name: name.into(),
        avatar: Some(format!("static/avatars/{id}.png")),
        is_online,
        registered_on: NaiveDate::parse_from_str(registered, "%d.%m.%Y").ok(),
        friendship,
    }
}

fn team(id: &str, name: &str, description: &str, members: &[User]) -> Team {
    Team {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        logo: Some(format!("static/logos/{id}.png")),
        members: members.to_vec(),
    }
}

fn game(id: &str, title: &str, description: &str) -> Game {
    Game {
        id: id.into(),
        title: title.into(),
        image: Some(format!("static/games/{id}.jpg")),
        description: description.into(),
    }
}

fn starts_at(s: &str) -> Option<NaiveDateTime> {
    crate::client::parse_starts_at(s)
}

fn maps(count: usize, match_id: &str, winners: &[&str]) -> Vec<MatchMap> {
    (0..count)
        .map(|i| MatchMap {
            id: format!("{match_id}-map{}", i + 1),
            winner_id: winners.get(i).map(|w| w.to_string()),
            external_url: winners
                .get(i)
                .map(|_| format!("https://twitch.tv/ggforge/{match_id}-{}", i + 1)),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn fixture_match(
    id: &str,
    tournament_id: &str,
    number: u32,
    format: MatchFormat,
    status: MatchStatus,
    p1: Option<Participant>,
    p2: Option<Participant>,
    winners: &[&str],
    creator: &str,
) -> Match {
    let score1 = winners
        .iter()
        .filter(|w| p1.as_ref().is_some_and(|p| p.id == **w))
        .count() as u32;
    let score2 = winners
        .iter()
        .filter(|w| p2.as_ref().is_some_and(|p| p.id == **w))
        .count() as u32;
    Match {
        id: id.into(),
        tournament_id: tournament_id.into(),
        number,
        format,
        status,
        maps: match status {
            MatchStatus::Scheduled | MatchStatus::Cancelled => Vec::new(),
            _ => maps(format.maps(), id, winners),
        },
        participant1: p1,
        participant2: p2,
        score1,
        score2,
        creator_id: Some(creator.into()),
    }
}

fn standings(group_id: &str, entries: &[(&User, u32, u32, u32)]) -> Vec<StandingsRow> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (u, wins, draws, losses))| StandingsRow {
            id: format!("{group_id}-row{}", i + 1),
            place: i as u32 + 1,
            entity: StandingsEntity::User(Participant::from(*u)),
            wins: *wins,
            draws: *draws,
            losses: *losses,
        })
        .collect()
}

/// The fully populated sample: groups, two playoff rounds and a final.
fn showcase_tournament(me: &User, users: &[User], teams: &[Team]) -> Tournament {
    let p = |i: usize| Some(Participant::from(&users[i]));
    let tid = "1";
    let creator = me.id.as_str();

    let group_a = Group {
        id: "g-a".into(),
        letter: "A".into(),
        rows: standings(
            "g-a",
            &[(&users[0], 3, 0, 0), (&users[1], 2, 0, 1), (&users[2], 1, 0, 2), (&users[3], 0, 0, 3)],
        ),
        matches: vec![
            fixture_match("ga-1", tid, 1, MatchFormat::Bo1, MatchStatus::Completed, p(0), p(1), &["u-2"], creator),
            fixture_match("ga-2", tid, 2, MatchFormat::Bo1, MatchStatus::Completed, p(2), p(3), &["u-4"], creator),
        ],
    };
    let group_b = Group {
        id: "g-b".into(),
        letter: "B".into(),
        rows: standings(
            "g-b",
            &[
                (&users[4], 3, 1, 0),
                (&users[5], 2, 1, 1),
                (&users[6], 2, 0, 2),
                (&users[7], 1, 0, 3),
                (&users[8], 0, 0, 4),
            ],
        ),
        matches: vec![
            fixture_match("gb-1", tid, 3, MatchFormat::Bo1, MatchStatus::Completed, p(4), p(5), &["u-6"], creator),
            fixture_match("gb-2", tid, 4, MatchFormat::Bo1, MatchStatus::Completed, p(6), p(7), &["u-8"], creator),
        ],
    };

    let semis = Round {
        id: "r-1".into(),
        label: "1".into(),
        matches: vec![
            fixture_match("po-1", tid, 5, MatchFormat::Bo3, MatchStatus::Completed, p(0), p(5), &["u-2", "u-7", "u-2"], creator),
            fixture_match("po-2", tid, 6, MatchFormat::Bo3, MatchStatus::Ongoing, p(4), p(1), &[], creator),
        ],
    };
    let decider = Round {
        id: "r-2".into(),
        label: "2".into(),
        matches: vec![fixture_match("po-3", tid, 7, MatchFormat::Bo3, MatchStatus::Scheduled, p(0), p(4), &[], creator)],
    };
    let final_match = fixture_match("final", tid, 8, MatchFormat::Bo5, MatchStatus::Scheduled, p(0), None, &[], creator);

    Tournament {
        id: tid.into(),
        game_id: "1".into(),
        title: "GGForge Winter Major".into(),
        image: Some("static/tournaments/1.jpg".into()),
        starts_at: starts_at("12.12.2025 | 17:00"),
        status: TournamentStatus::Ongoing,
        prize_fund: Some(1_000_000),
        contact: Some("@ggforge_admin".into()),
        organizer: Some(me.clone()),
        description: "Eight players, two groups, best-of-three playoffs and a best-of-five final.".into(),
        requires_team: false,
        has_group_stage: true,
        group_stage: Some(GroupStage { groups: vec![group_a, group_b] }),
        playoff: PlayoffStage { rounds: vec![semis, decider] },
        final_match: Some(final_match),
        participants: users[..9].to_vec(),
        prizes: vec![
            PrizePlace { place: 1, participant: Participant::from(&teams[0]), prize: 500_000 },
            PrizePlace { place: 2, participant: Participant::from(&teams[1]), prize: 300_000 },
        ],
    }
}

/// Open team tournament without a group stage: one round of two matches and a final.
fn playoff_only_tournament(me: &User, users: &[User]) -> Tournament {
    let p = |i: usize| Some(Participant::from(&users[i]));
    let tid = "2";
    let creator = me.id.as_str();
    Tournament {
        id: tid.into(),
        game_id: "1".into(),
        title: "Owl Invitational".into(),
        image: Some("static/tournaments/2.jpg".into()),
        starts_at: starts_at("05.01.2026 | 19:00"),
        status: TournamentStatus::Open,
        prize_fund: Some(75_000),
        contact: Some("@owl_org".into()),
        organizer: Some(me.clone()),
        description: String::new(),
        requires_team: true,
        has_group_stage: false,
        group_stage: None,
        playoff: PlayoffStage {
            rounds: vec![Round {
                id: "r-1".into(),
                label: "1".into(),
                matches: vec![
                    fixture_match("oi-1", tid, 1, MatchFormat::Bo1, MatchStatus::Scheduled, p(0), p(1), &[], creator),
                    fixture_match("oi-2", tid, 2, MatchFormat::Bo1, MatchStatus::Scheduled, p(2), p(3), &[], creator),
                ],
            }],
        },
        final_match: Some(fixture_match("oi-final", tid, 3, MatchFormat::Bo3, MatchStatus::Scheduled, None, None, &[], creator)),
        participants: users[..4].to_vec(),
        prizes: Vec::new(),
    }
}

fn summary_tournament(
    id: &str,
    game_id: &str,
    title: &str,
    status: TournamentStatus,
    prize_fund: u64,
    participants: &[User],
) -> Tournament {
    Tournament {
        id: id.into(),
        game_id: game_id.into(),
        title: title.into(),
        image: Some(format!("static/tournaments/{id}.jpg")),
        starts_at: starts_at("12.12.2025 | 17:00"),
        status,
        prize_fund: (prize_fund > 0).then_some(prize_fund),
        contact: None,
        organizer: None,
        description: String::new(),
        requires_team: false,
        has_group_stage: false,
        group_stage: None,
        playoff: PlayoffStage::default(),
        final_match: None,
        participants: participants.to_vec(),
        prizes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_standings_are_unique_by_place() {
        let fixtures = Fixtures::sample();
        for t in &fixtures.tournaments {
            for group in t.group_stage.iter().flat_map(|gs| gs.groups.iter()) {
                let mut places: Vec<u32> = group.rows.iter().map(|r| r.place).collect();
                places.dedup();
                assert_eq!(places.len(), group.rows.len(), "group {}", group.letter);
            }
        }
    }

    #[test]
    fn my_tournaments_split_by_role() {
        let fixtures = Fixtures::sample();
        let managed = fixtures.my_tournaments(TournamentRole::Manager);
        let played = fixtures.my_tournaments(TournamentRole::Participant);
        assert_eq!(managed.len(), 3);
        assert_eq!(managed.len() + played.len(), fixtures.tournaments.len());
        assert!(managed.iter().all(|t| fixtures.organized.contains(&t.id)));
    }

    #[test]
    fn user_lookup_covers_me_and_requests() {
        let fixtures = Fixtures::sample();
        assert_eq!(fixtures.user("u-1").map(|u| u.name.as_str()), Some("iburdinova"));
        assert!(fixtures.user("u-7").is_some());
        assert!(fixtures.user("nobody").is_none());
    }

    #[test]
    fn teams_of_includes_invitations() {
        let fixtures = Fixtures::sample();
        let names = |id: &str| -> Vec<String> {
            fixtures.teams_of(id).into_iter().map(|t| t.name.clone()).collect()
        };
        assert_eq!(names("u-2"), vec!["Night Owls"]);
        assert_eq!(names("u-3"), vec!["Night Owls", "Red Foxes"]);
        assert_eq!(names("u-7"), vec!["Iron Wolves"]);
        assert!(names("u-10").is_empty());
    }

    #[test]
    fn snapshot_json_loads_through_wire_types() {
        let json = r#"{
            "games": [{"id": 1, "title": "Dota 2", "img": "games/dota.jpg"}],
            "tournaments": [{
                "id": 10, "game_id": 1, "title": "Snapshot Cup", "date": "01.02.2026 | 18:30",
                "status": "open", "has_groupstage": true, "team": true,
                "group_stage": {"groups": [{
                    "id": "g1", "letter": "A",
                    "group_rows": [
                        {"id": 2, "place": 2, "user": {"id": "b", "name": "B"}, "wins": 1, "loses": 1},
                        {"id": 1, "place": 1, "user": {"id": "a", "name": "A"}, "wins": 2}
                    ]
                }]},
                "playoff_stage": {"rounds": [{"id": "r1", "letter": "1", "matches": []}]},
                "final": {"id": "f", "format": "bo3", "status": "scheduled"}
            }],
            "me": {"id": "me", "name": "Me"},
            "organized": [10]
        }"#;
        let fixtures = Fixtures::from_json(json, "http://media").unwrap();
        assert_eq!(fixtures.games[0].title, "Dota 2");
        let t = fixtures.tournament("10").unwrap();
        assert!(t.requires_team);
        assert!(t.starts_at.is_some());
        let rows = &t.group_stage.as_ref().unwrap().groups[0].rows;
        assert_eq!(rows[0].place, 1);
        assert_eq!(rows[1].losses, 1);
        assert_eq!(t.final_match.as_ref().unwrap().tournament_id, "10");
        assert_eq!(fixtures.my_tournaments(TournamentRole::Manager).len(), 1);
    }
}
