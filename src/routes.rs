use ggforge_api::TournamentStatus;
use ggforge_api::fixtures::TournamentRole;

/// Identifies one visit to a page. Network responses carry the token of the
/// page that asked for them and are dropped once the user has moved on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteToken(pub u64);

impl RouteToken {
    pub fn next(self) -> Self {
        RouteToken(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Home,
    Games,
    AboutGame { id: String },
    Friends,
    Teams,
    TeamPage { id: String },
    Tournaments { status: TournamentStatus, role: TournamentRole },
    TournamentPage { id: String },
    /// The game is carried in the query (`?game=ID`); it is required.
    NewTournament { game_id: Option<String> },
    MyProfile,
    Profile { id: String },
    NotFound { path: String },
}

/// Top-level sections reachable with the number keys.
pub const SECTIONS: [(&str, &str); 6] = [
    ("Home", "/"),
    ("Games", "/games"),
    ("Tournaments", "/tournaments"),
    ("Teams", "/teams"),
    ("Friends", "/friends"),
    ("Profile", "/profile"),
];

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let (path_part, query) = match path.split_once('?') {
            Some((p, q)) => (p, q),
            None => (path, ""),
        };
        let segments: Vec<&str> = path_part.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["games"] => Route::Games,
            ["games", id] => Route::AboutGame { id: id.to_string() },
            ["friends"] => Route::Friends,
            ["teams"] => Route::Teams,
            ["team", id] => Route::TeamPage { id: id.to_string() },
            ["tournaments"] => Route::Tournaments {
                status: query_param(query, "tournament")
                    .and_then(TournamentStatus::from_query)
                    .unwrap_or_default(),
                role: query_param(query, "organizer")
                    .and_then(TournamentRole::from_query)
                    .unwrap_or_default(),
            },
            ["tournament", id] => Route::TournamentPage { id: id.to_string() },
            ["newtournament"] => Route::NewTournament {
                game_id: query_param(query, "game")
                    .filter(|g| !g.is_empty())
                    .map(str::to_string),
            },
            ["profile"] => Route::MyProfile,
            ["profile", id] => Route::Profile { id: id.to_string() },
            _ => Route::NotFound { path: path.to_string() },
        }
    }

    /// Canonical path. The tournaments list always carries both filters.
    pub fn to_path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Games => "/games".to_string(),
            Route::AboutGame { id } => format!("/games/{id}"),
            Route::Friends => "/friends".to_string(),
            Route::Teams => "/teams".to_string(),
            Route::TeamPage { id } => format!("/team/{id}"),
            Route::Tournaments { status, role } => format!(
                "/tournaments?tournament={}&organizer={}",
                status.as_query(),
                role.as_query()
            ),
            Route::TournamentPage { id } => format!("/tournament/{id}"),
            Route::NewTournament { game_id: Some(game) } => format!("/newtournament?game={game}"),
            Route::NewTournament { game_id: None } => "/newtournament".to_string(),
            Route::MyProfile => "/profile".to_string(),
            Route::Profile { id } => format!("/profile/{id}"),
            Route::NotFound { path } => path.clone(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Games => "Games",
            Route::AboutGame { .. } => "Game",
            Route::Friends => "Friends",
            Route::Teams => "Teams",
            Route::TeamPage { .. } => "Team",
            Route::Tournaments { .. } => "Your tournaments",
            Route::TournamentPage { .. } => "Tournament",
            Route::NewTournament { .. } => "New tournament",
            Route::MyProfile => "Profile",
            Route::Profile { .. } => "User",
            Route::NotFound { .. } => "Not found",
        }
    }

    /// Index into [`SECTIONS`] for the tab bar.
    pub fn section(&self) -> usize {
        match self {
            Route::Home | Route::NotFound { .. } => 0,
            Route::Games | Route::AboutGame { .. } | Route::NewTournament { .. } => 1,
            Route::Tournaments { .. } | Route::TournamentPage { .. } => 2,
            Route::Teams | Route::TeamPage { .. } => 3,
            Route::Friends | Route::Profile { .. } => 4,
            Route::MyProfile => 5,
        }
    }
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_page() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/games"), Route::Games);
        assert_eq!(Route::parse("/games/3"), Route::AboutGame { id: "3".into() });
        assert_eq!(Route::parse("/friends/"), Route::Friends);
        assert_eq!(Route::parse("/teams"), Route::Teams);
        assert_eq!(Route::parse("/team/7"), Route::TeamPage { id: "7".into() });
        assert_eq!(Route::parse("/tournament/1"), Route::TournamentPage { id: "1".into() });
        assert_eq!(Route::parse("/profile"), Route::MyProfile);
        assert_eq!(Route::parse("/profile/u-2"), Route::Profile { id: "u-2".into() });
        assert_eq!(
            Route::parse("/nope/x/y"),
            Route::NotFound { path: "/nope/x/y".into() }
        );
    }

    #[test]
    fn tournaments_query_round_trips_and_defaults() {
        let route = Route::parse("/tournaments?organizer=participant&tournament=completed");
        assert_eq!(
            route,
            Route::Tournaments {
                status: TournamentStatus::Completed,
                role: TournamentRole::Participant
            }
        );
        assert_eq!(
            route.to_path(),
            "/tournaments?tournament=completed&organizer=participant"
        );

        assert_eq!(
            Route::parse("/tournaments?tournament=bogus").to_path(),
            "/tournaments?tournament=open&organizer=manager"
        );
    }

    #[test]
    fn new_tournament_carries_game() {
        assert_eq!(
            Route::parse("/newtournament?game=2"),
            Route::NewTournament { game_id: Some("2".into()) }
        );
        assert_eq!(Route::parse("/newtournament?game="), Route::NewTournament { game_id: None });
    }

    #[test]
    fn tokens_advance() {
        let t = RouteToken::default();
        assert_ne!(t, t.next());
    }
}
