use crate::routes::RouteToken;
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use ggforge_api::Team;
use ggforge_api::client::MapCompletion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendAction {
    SendRequest,
    CancelRequest,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    LoadTeam {
        token: RouteToken,
        team_id: String,
    },
    StartMatch {
        token: RouteToken,
        tournament_id: String,
        match_id: String,
    },
    CompleteMatch {
        token: RouteToken,
        tournament_id: String,
        match_id: String,
        completions: Vec<MapCompletion>,
    },
    Friendship {
        token: RouteToken,
        user_id: String,
        action: FriendAction,
    },
    Registration {
        token: RouteToken,
        tournament_id: String,
        is_team: bool,
        participant_id: String,
        register: bool,
    },
}

/// Results carry the message to show on failure; the worker has already logged it.
#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged {
        loading_state: LoadingState,
    },
    TeamLoaded {
        token: RouteToken,
        team_id: String,
        result: Result<Team, String>,
    },
    MatchStarted {
        token: RouteToken,
        match_id: String,
        result: Result<(), String>,
    },
    MatchCompleted {
        token: RouteToken,
        match_id: String,
        result: Result<(), String>,
    },
    FriendshipUpdated {
        token: RouteToken,
        user_id: String,
        action: FriendAction,
        result: Result<(), String>,
    },
    RegistrationUpdated {
        token: RouteToken,
        tournament_id: String,
        is_team: bool,
        participant_id: String,
        register: bool,
        result: Result<(), String>,
    },
}

impl NetworkResponse {
    /// Token of the page that asked for this response. Loading updates have none.
    pub fn token(&self) -> Option<RouteToken> {
        match self {
            NetworkResponse::LoadingStateChanged { .. } => None,
            NetworkResponse::TeamLoaded { token, .. }
            | NetworkResponse::MatchStarted { token, .. }
            | NetworkResponse::MatchCompleted { token, .. }
            | NetworkResponse::FriendshipUpdated { token, .. }
            | NetworkResponse::RegistrationUpdated { token, .. } => Some(*token),
        }
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
