use crate::routes::{Route, RouteToken};
use crate::state::forms::{GameAccountForm, NewTournamentForm, SettingsForm, TeamForm};
use crate::state::match_card::MatchCardState;
use crate::state::messages::FriendAction;
use ggforge_api::fixtures::{Fixtures, TournamentRole};
use ggforge_api::{
    FriendshipStatus, Game, Match, Team, Tournament, TournamentStatus, TournamentSummary, User,
};
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Shell state
// ---------------------------------------------------------------------------

/// A blocking message box; every key except Enter/Esc is swallowed while it is up.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertState {
    pub title: String,
    pub message: String,
}

impl AlertState {
    pub fn error(message: impl Into<String>) -> Self {
        Self { title: "Error".into(), message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { title: "Done".into(), message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.title == "Error"
    }
}

pub struct AppState {
    pub route: Route,
    pub token: RouteToken,
    pub history: Vec<Route>,
    pub page: PageState,
    pub alert: Option<AlertState>,
    /// Path typed after `:`.
    pub prompt: Option<String>,
    pub show_logs: bool,
    pub show_help: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            route: Route::Home,
            token: RouteToken::default(),
            history: Vec::new(),
            page: PageState::Home(ListState::default()),
            alert: None,
            prompt: None,
            show_logs: false,
            show_help: false,
        }
    }
}

pub enum PageState {
    Home(ListState),
    Games(GamesState),
    AboutGame(AboutGameState),
    Friends(FriendsState),
    Teams(TeamsState),
    TeamPage(TeamPageState),
    Tournaments(TournamentsState),
    TournamentPage(Box<TournamentPageState>),
    NewTournament(NewTournamentForm),
    MyProfile(MyProfileState),
    Profile(ProfileState),
    NotFound,
}

/// Cursor over a list of cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ListState {
    pub selected: usize,
}

impl ListState {
    pub fn down(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

/// Tab bars: cycle through the variants in declaration order.
pub trait TabCycle: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The first listed variant is the default tab.
macro_rules! tabs {
    ($name:ident { $first:ident => $first_label:literal $(, $variant:ident => $label:literal)* $(,)? }) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub enum $name {
            #[default]
            $first,
            $($variant),*
        }

        impl TabCycle for $name {
            const ALL: &'static [Self] = &[$name::$first, $($name::$variant),*];

            fn label(&self) -> &'static str {
                match self {
                    $name::$first => $first_label,
                    $($name::$variant => $label),*
                }
            }
        }
    };
}

tabs!(AboutGameTab { Overview => "Overview", Tournaments => "Tournaments" });
tabs!(FriendsTab { Friends => "Friends", Requests => "Requests", Submitted => "Submitted" });
tabs!(TeamsTab { Yours => "Your teams", Invitations => "Team invitations" });
tabs!(TeamTab { Information => "Information", Participants => "Participants" });
tabs!(ProfileTab {
    Information => "Information",
    Teams => "Teams",
    Friends => "Friends",
    Tournaments => "Tournaments",
});
tabs!(TournamentTab {
    Overview => "Overview",
    Bracket => "Bracket",
    Matches => "Matches",
    Participants => "Participants",
    Prizes => "Prizes",
});
tabs!(MyProfileSection { Settings => "Settings", GameAccounts => "Game accounts" });

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct GamesState {
    pub filter: String,
    pub filtering: bool,
    pub list: ListState,
}

impl GamesState {
    pub fn visible<'a>(&self, games: &'a [Game]) -> Vec<&'a Game> {
        let needle = self.filter.trim().to_lowercase();
        games
            .iter()
            .filter(|g| needle.is_empty() || g.title.to_lowercase().contains(&needle))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AboutGameState {
    pub game_id: String,
    pub tab: AboutGameTab,
    /// `None` shows every status.
    pub status_filter: Option<TournamentStatus>,
    pub list: ListState,
}

impl AboutGameState {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self { game_id: game_id.into(), ..Default::default() }
    }

    pub fn cycle_status(&mut self) {
        self.status_filter = match self.status_filter {
            None => Some(TournamentStatus::ALL[0]),
            Some(current) => TournamentStatus::ALL
                .iter()
                .position(|s| *s == current)
                .and_then(|i| TournamentStatus::ALL.get(i + 1).copied()),
        };
        self.list = ListState::default();
    }

    pub fn visible(&self, fixtures: &Fixtures) -> Vec<TournamentSummary> {
        fixtures
            .tournaments_for_game(&self.game_id)
            .into_iter()
            .filter(|t| self.status_filter.is_none_or(|s| t.status == s))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Friends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct AddFriendModal {
    pub query: String,
    pub list: ListState,
}

impl AddFriendModal {
    /// Case-insensitive name search over everyone except `me`.
    pub fn matches<'a>(&self, users: &'a [User], me: &str) -> Vec<&'a User> {
        let needle = self.query.trim().to_lowercase();
        users
            .iter()
            .filter(|u| u.id != me)
            .filter(|u| needle.is_empty() || u.name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FriendsState {
    pub tab: FriendsTab,
    pub list: ListState,
    pub add_modal: Option<AddFriendModal>,
    /// Users a request was sent to from the modal; their control stays disabled.
    pub sent: HashSet<String>,
}

impl FriendsState {
    pub fn current<'a>(&self, fixtures: &'a Fixtures) -> &'a [User] {
        match self.tab {
            FriendsTab::Friends => &fixtures.friends,
            FriendsTab::Requests => &fixtures.incoming_requests,
            FriendsTab::Submitted => &fixtures.outgoing_requests,
        }
    }

    /// Mark a user as sent to. Returns false if the control was already disabled.
    pub fn mark_sent(&mut self, user_id: &str) -> bool {
        self.sent.insert(user_id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TeamsState {
    pub tab: TeamsTab,
    pub list: ListState,
    pub create: Option<TeamForm>,
}

impl TeamsState {
    pub fn current<'a>(&self, fixtures: &'a Fixtures) -> &'a [Team] {
        match self.tab {
            TeamsTab::Yours => &fixtures.teams,
            TeamsTab::Invitations => &fixtures.team_invites,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamPageState {
    pub team_id: String,
    pub tab: TeamTab,
    pub team: Option<Team>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub list: ListState,
}

impl TeamPageState {
    /// Start from the fixture team, if any; the backend copy replaces it when it arrives.
    pub fn new(team_id: impl Into<String>, fixture: Option<Team>) -> Self {
        Self { team_id: team_id.into(), team: fixture, loading: true, ..Default::default() }
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    pub user_id: String,
    pub tab: ProfileTab,
    pub friendship: FriendshipStatus,
    /// We have an outstanding request to this user.
    pub request_sent: bool,
    /// They sent us a request; the action button is hidden.
    pub incoming: bool,
    pub pending: bool,
    /// Relationship before the in-flight action, restored if it fails.
    pub rollback: Option<(FriendshipStatus, bool)>,
    pub list: ListState,
}

impl ProfileState {
    pub fn new(user_id: &str, fixtures: &Fixtures) -> Self {
        let is_friend = fixtures.friends.iter().any(|u| u.id == user_id);
        let incoming = fixtures.incoming_requests.iter().any(|u| u.id == user_id);
        let request_sent = fixtures.outgoing_requests.iter().any(|u| u.id == user_id);
        let friendship = if is_friend {
            FriendshipStatus::Accepted
        } else if incoming || request_sent {
            FriendshipStatus::Pending
        } else {
            fixtures.user(user_id).map(|u| u.friendship).unwrap_or_default()
        };
        Self {
            user_id: user_id.to_string(),
            friendship,
            request_sent,
            incoming,
            ..Default::default()
        }
    }

    pub fn friend_action(&self) -> Option<FriendAction> {
        if self.incoming {
            return None;
        }
        Some(match (self.friendship, self.request_sent) {
            (FriendshipStatus::Accepted, _) => FriendAction::Remove,
            (_, true) => FriendAction::CancelRequest,
            (_, false) => FriendAction::SendRequest,
        })
    }

    /// Apply an action locally; returns the previous state for rollback.
    pub fn apply(&mut self, action: FriendAction) -> (FriendshipStatus, bool) {
        let previous = (self.friendship, self.request_sent);
        match action {
            FriendAction::SendRequest => {
                self.friendship = FriendshipStatus::Pending;
                self.request_sent = true;
            }
            FriendAction::CancelRequest | FriendAction::Remove => {
                self.friendship = FriendshipStatus::None;
                self.request_sent = false;
            }
        }
        self.pending = true;
        self.rollback = Some(previous);
        previous
    }

    /// The backend answered; a failure puts the previous relationship back.
    pub fn settle(&mut self, ok: bool) {
        self.pending = false;
        if let Some((friendship, request_sent)) = self.rollback.take()
            && !ok
        {
            self.friendship = friendship;
            self.request_sent = request_sent;
        }
    }
}

pub fn friend_action_label(action: FriendAction) -> &'static str {
    match action {
        FriendAction::SendRequest => "Add friend",
        FriendAction::CancelRequest => "Cancel request",
        FriendAction::Remove => "Remove friend",
    }
}

#[derive(Debug, Clone, Default)]
pub struct MyProfileState {
    pub section: MyProfileSection,
    pub settings: SettingsForm,
    pub accounts: ListState,
    pub account_form: Option<GameAccountForm>,
}

impl MyProfileState {
    pub fn new(me: &User) -> Self {
        Self {
            settings: SettingsForm { name: me.name.clone(), ..Default::default() },
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tournaments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TournamentsState {
    pub status: TournamentStatus,
    pub role: TournamentRole,
    pub list: ListState,
}

impl TournamentsState {
    pub fn visible(&self, fixtures: &Fixtures) -> Vec<TournamentSummary> {
        fixtures
            .my_tournaments(self.role)
            .into_iter()
            .filter(|t| t.status == self.status)
            .collect()
    }

    pub fn route(&self) -> Route {
        Route::Tournaments { status: self.status, role: self.role }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFilter {
    Group,
    Playoff,
    Final,
}

impl StageFilter {
    pub fn label(&self) -> &'static str {
        match self {
            StageFilter::Group => "Group stage",
            StageFilter::Playoff => "Playoff",
            StageFilter::Final => "Final",
        }
    }

    /// Group is offered only when the tournament has a group stage.
    pub fn available(t: &Tournament) -> Vec<StageFilter> {
        let mut stages = Vec::with_capacity(3);
        if t.has_group_stage {
            stages.push(StageFilter::Group);
        }
        stages.push(StageFilter::Playoff);
        stages.push(StageFilter::Final);
        stages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Ignored,
    Cancelled,
    PickerOpened,
    Applied,
}

/// Local "apply to tournament" toggle. No capacity enforcement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationState {
    pub applied: bool,
    pub picker_open: bool,
    pub selected_team: Option<usize>,
}

impl ApplicationState {
    pub fn apply(&mut self, status: TournamentStatus, requires_team: bool) -> ApplyOutcome {
        if status != TournamentStatus::Open {
            return ApplyOutcome::Ignored;
        }
        if self.applied {
            self.applied = false;
            return ApplyOutcome::Cancelled;
        }
        if requires_team {
            self.picker_open = true;
            return ApplyOutcome::PickerOpened;
        }
        self.applied = true;
        ApplyOutcome::Applied
    }

    /// Returns the picked team index if the application went through.
    pub fn confirm_team(&mut self) -> Option<usize> {
        let team = self.selected_team?;
        self.applied = true;
        self.picker_open = false;
        self.selected_team = None;
        Some(team)
    }

    pub fn close_picker(&mut self) {
        self.picker_open = false;
        self.selected_team = None;
    }

    pub fn select_next_team(&mut self, teams: usize) {
        if teams == 0 {
            return;
        }
        self.selected_team = Some(match self.selected_team {
            None => 0,
            Some(i) => (i + 1) % teams,
        });
    }

    pub fn select_prev_team(&mut self, teams: usize) {
        if teams == 0 {
            return;
        }
        self.selected_team = Some(match self.selected_team {
            None | Some(0) => teams - 1,
            Some(i) => i - 1,
        });
    }
}

pub struct TournamentPageState {
    pub tournament_id: String,
    pub tab: TournamentTab,
    pub stage: StageFilter,
    pub application: ApplicationState,
    /// Team the current application was made with, for unregistering.
    pub applied_with: Option<String>,
    pub matches: ListState,
    pub participants: ListState,
    pub group: usize,
    /// Card state per match id, kept while the page is open.
    pub cards: HashMap<String, MatchCardState>,
    /// Match whose card is shown.
    pub open_card: Option<String>,
}

impl TournamentPageState {
    pub fn new(tournament: &Tournament) -> Self {
        Self {
            tournament_id: tournament.id.clone(),
            tab: TournamentTab::default(),
            stage: StageFilter::available(tournament)[0],
            application: ApplicationState::default(),
            applied_with: None,
            matches: ListState::default(),
            participants: ListState::default(),
            group: 0,
            cards: HashMap::new(),
            open_card: None,
        }
    }

    /// Show the card for `m`, reusing its state if it was opened before.
    pub fn show_card(&mut self, m: &Match) {
        self.cards.entry(m.id.clone()).or_insert_with(|| MatchCardState::new(m));
        self.open_card = Some(m.id.clone());
    }

    pub fn hide_card(&mut self) {
        if let Some(card) = self.match_card_mut() {
            card.editing_url = false;
        }
        self.open_card = None;
    }

    pub fn match_card(&self) -> Option<&MatchCardState> {
        self.cards.get(self.open_card.as_deref()?)
    }

    pub fn match_card_mut(&mut self) -> Option<&mut MatchCardState> {
        self.cards.get_mut(self.open_card.as_deref()?)
    }

    pub fn cycle_stage(&mut self, tournament: &Tournament) {
        let stages = StageFilter::available(tournament);
        let idx = stages.iter().position(|s| *s == self.stage).unwrap_or(0);
        self.stage = stages[(idx + 1) % stages.len()];
        self.matches = ListState::default();
        self.group = 0;
    }

    /// Matches listed under the current stage filter, in display order.
    pub fn stage_matches<'a>(&self, t: &'a Tournament) -> Vec<&'a Match> {
        match self.stage {
            StageFilter::Group => t
                .group_stage
                .iter()
                .flat_map(|gs| gs.groups.iter())
                .flat_map(|g| g.matches.iter())
                .collect(),
            StageFilter::Playoff => t.playoff.rounds.iter().flat_map(|r| r.matches.iter()).collect(),
            StageFilter::Final => t.final_match.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggforge_api::fixtures::Fixtures;

    #[test]
    fn apply_does_nothing_unless_open() {
        for status in [
            TournamentStatus::Ongoing,
            TournamentStatus::Completed,
            TournamentStatus::Cancelled,
        ] {
            let mut app = ApplicationState::default();
            assert_eq!(app.apply(status, false), ApplyOutcome::Ignored);
            assert!(!app.applied);

            let mut applied = ApplicationState { applied: true, ..Default::default() };
            assert_eq!(applied.apply(status, true), ApplyOutcome::Ignored);
            assert!(applied.applied);
            assert!(!applied.picker_open);
        }
    }

    #[test]
    fn apply_toggles_for_solo_tournaments() {
        let mut app = ApplicationState::default();
        assert_eq!(app.apply(TournamentStatus::Open, false), ApplyOutcome::Applied);
        assert!(app.applied);
        assert_eq!(app.apply(TournamentStatus::Open, false), ApplyOutcome::Cancelled);
        assert!(!app.applied);
    }

    #[test]
    fn team_tournaments_go_through_the_picker() {
        let mut app = ApplicationState::default();
        assert_eq!(app.apply(TournamentStatus::Open, true), ApplyOutcome::PickerOpened);
        assert!(app.picker_open);
        assert!(!app.applied);

        assert_eq!(app.confirm_team(), None);
        assert!(app.picker_open);

        app.select_next_team(2);
        app.select_next_team(2);
        assert_eq!(app.confirm_team(), Some(1));
        assert!(app.applied);
        assert!(!app.picker_open);
        assert_eq!(app.selected_team, None);
    }

    #[test]
    fn team_picker_moves_both_ways_and_wraps() {
        let mut app = ApplicationState::default();
        app.select_prev_team(3);
        assert_eq!(app.selected_team, Some(2));
        app.select_prev_team(3);
        assert_eq!(app.selected_team, Some(1));
        app.select_next_team(3);
        app.select_next_team(3);
        assert_eq!(app.selected_team, Some(0));
        app.select_prev_team(3);
        assert_eq!(app.selected_team, Some(2));

        app.select_prev_team(0);
        assert_eq!(app.selected_team, Some(2));
    }

    #[test]
    fn stage_filter_offers_group_only_with_group_stage() {
        let fixtures = Fixtures::sample();
        let with_groups = fixtures.tournament("1").unwrap();
        let without = fixtures.tournament("2").unwrap();
        assert_eq!(
            StageFilter::available(with_groups),
            vec![StageFilter::Group, StageFilter::Playoff, StageFilter::Final]
        );
        assert_eq!(
            StageFilter::available(without),
            vec![StageFilter::Playoff, StageFilter::Final]
        );

        let mut page = TournamentPageState::new(without);
        assert_eq!(page.stage, StageFilter::Playoff);
        assert_eq!(page.stage_matches(without).len(), 2);
        page.cycle_stage(without);
        assert_eq!(page.stage_matches(without).len(), 1);
        page.cycle_stage(without);
        assert_eq!(page.stage, StageFilter::Playoff);
    }

    #[test]
    fn add_friend_search_is_case_insensitive() {
        let fixtures = Fixtures::sample();
        let modal = AddFriendModal { query: "NOVA".into(), ..Default::default() };
        let names: Vec<&str> = modal
            .matches(&fixtures.users, &fixtures.me.id)
            .iter()
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(names, vec!["nova", "inova"]);

        let mut friends = FriendsState::default();
        assert!(friends.mark_sent("u-8"));
        assert!(!friends.mark_sent("u-8"));
    }

    #[test]
    fn profile_friend_button_follows_relationship() {
        let fixtures = Fixtures::sample();
        assert_eq!(ProfileState::new("u-2", &fixtures).friend_action(), Some(FriendAction::Remove));
        assert_eq!(ProfileState::new("u-5", &fixtures).friend_action(), None);
        assert_eq!(
            ProfileState::new("u-7", &fixtures).friend_action(),
            Some(FriendAction::CancelRequest)
        );

        let mut stranger = ProfileState::new("u-9", &fixtures);
        assert_eq!(stranger.friend_action(), Some(FriendAction::SendRequest));
        let previous = stranger.apply(FriendAction::SendRequest);
        assert_eq!(stranger.friend_action(), Some(FriendAction::CancelRequest));
        assert_eq!(previous, (FriendshipStatus::None, false));
        stranger.settle(false);
        assert!(!stranger.pending);
        assert_eq!(stranger.friend_action(), Some(FriendAction::SendRequest));
    }

    #[test]
    fn about_game_status_filter_cycles_through_all() {
        let fixtures = Fixtures::sample();
        let mut page = AboutGameState::new("1");
        assert_eq!(page.visible(&fixtures).len(), 3);
        page.cycle_status();
        assert_eq!(page.status_filter, Some(TournamentStatus::Open));
        assert_eq!(page.visible(&fixtures).len(), 1);
        for _ in 0..4 {
            page.cycle_status();
        }
        assert_eq!(page.status_filter, None);
    }
}
