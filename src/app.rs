use crate::components::bracket::{bracket_columns, bracket_matches};
use crate::routes::Route;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{
    AddFriendModal, AboutGameState, AboutGameTab, AlertState, AppState, ApplyOutcome, FriendsState,
    GamesState, ListState, MyProfileSection, MyProfileState, PageState, ProfileState, ProfileTab,
    StageFilter, TabCycle, TeamPageState, TeamTab, TeamsState, TournamentPageState,
    TournamentTab, TournamentsState,
};
use crate::state::forms::{Form, GameAccountForm, NewTournamentForm, TeamForm};
use crate::state::match_card::{MatchCardState, MatchPanel, Slot, Viewer, panel_for};
use crate::state::messages::{FriendAction, NetworkRequest, NetworkResponse};
use ggforge_api::fixtures::{Fixtures, TournamentRole};
use ggforge_api::{
    GameAccount, GroupStage, Match, MatchStatus, Team, Tournament, TournamentStatus, media_url,
};
use log::{debug, info, warn};

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub fixtures: Fixtures,
    pub viewer: Viewer,
}

impl App {
    pub fn new(settings: AppSettings, fixtures: Fixtures) -> Self {
        let viewer = Viewer {
            user_id: settings
                .user_id
                .clone()
                .or_else(|| Some(fixtures.me.id.clone()).filter(|id| !id.is_empty())),
            is_admin: settings.is_admin,
        };

        let app = Self { state: AppState::new(), settings, fixtures, viewer };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn navigate(&mut self, route: Route) -> Vec<NetworkRequest> {
        let previous = self.state.route.clone();
        let requests = self.open(route);
        if self.state.route != previous {
            self.state.history.push(previous);
        }
        requests
    }

    pub fn navigate_path(&mut self, path: &str) -> Vec<NetworkRequest> {
        self.navigate(Route::parse(path))
    }

    pub fn go_back(&mut self) -> Vec<NetworkRequest> {
        match self.state.history.pop() {
            Some(route) => self.open(route),
            None => Vec::new(),
        }
    }

    /// Build the page for `route` in place of the current one. Every visit gets
    /// a fresh token, so responses requested by the previous page are dropped.
    pub fn open(&mut self, route: Route) -> Vec<NetworkRequest> {
        let route = self.redirect(route);
        self.state.token = self.state.token.next();
        self.state.prompt = None;
        let token = self.state.token;
        info!("opening {}", route.to_path());

        let mut requests = Vec::new();
        self.state.page = match &route {
            Route::Home => PageState::Home(ListState::default()),
            Route::Games => PageState::Games(GamesState::default()),
            Route::AboutGame { id } => PageState::AboutGame(AboutGameState::new(id.clone())),
            Route::Friends => PageState::Friends(FriendsState::default()),
            Route::Teams => PageState::Teams(TeamsState::default()),
            Route::TeamPage { id } => {
                requests.push(NetworkRequest::LoadTeam { token, team_id: id.clone() });
                PageState::TeamPage(TeamPageState::new(id.clone(), self.fixtures.team(id).cloned()))
            }
            Route::Tournaments { status, role } => PageState::Tournaments(TournamentsState {
                status: *status,
                role: *role,
                list: ListState::default(),
            }),
            Route::TournamentPage { id } => match self.fixtures.tournament(id) {
                Some(t) => PageState::TournamentPage(Box::new(TournamentPageState::new(t))),
                None => PageState::NotFound,
            },
            Route::NewTournament { game_id: Some(game_id) } => {
                PageState::NewTournament(NewTournamentForm::new(game_id.clone()))
            }
            Route::NewTournament { game_id: None } => PageState::Home(ListState::default()),
            Route::MyProfile => PageState::MyProfile(MyProfileState::new(&self.fixtures.me)),
            Route::Profile { id } => match self.fixtures.user(id) {
                Some(_) => PageState::Profile(ProfileState::new(id, &self.fixtures)),
                None => PageState::NotFound,
            },
            Route::NotFound { .. } => PageState::NotFound,
        };
        self.state.route = route;
        requests
    }

    fn redirect(&self, route: Route) -> Route {
        match route {
            Route::NewTournament { game_id: None } => {
                warn!("new tournament opened without a game, going home");
                Route::Home
            }
            Route::NewTournament { game_id: Some(ref id) } if self.fixtures.game(id).is_none() => {
                warn!("new tournament opened for unknown game {id}, going home");
                Route::Home
            }
            Route::Profile { ref id } if *id == self.fixtures.me.id => Route::MyProfile,
            other => other,
        }
    }

    pub fn jump_to_section(&mut self, index: usize) -> Vec<NetworkRequest> {
        match crate::routes::SECTIONS.get(index) {
            Some((_, path)) => self.navigate_path(path),
            None => Vec::new(),
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn toggle_help(&mut self) {
        self.state.show_help = !self.state.show_help;
    }

    pub fn dismiss_alert(&mut self) {
        self.state.alert = None;
    }

    fn alert_error(&mut self, message: impl Into<String>) {
        self.state.alert = Some(AlertState::error(message));
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_network_response(&mut self, response: NetworkResponse) {
        if let Some(token) = response.token()
            && token != self.state.token
        {
            debug!("dropping response for a page that is gone (token {})", token.0);
            return;
        }

        match response {
            NetworkResponse::LoadingStateChanged { .. } => {}
            NetworkResponse::TeamLoaded { team_id, result, .. } => {
                if let PageState::TeamPage(page) = &mut self.state.page
                    && page.team_id == team_id
                {
                    page.loading = false;
                    match result {
                        Ok(team) => {
                            page.team = Some(team);
                            page.last_error = None;
                        }
                        Err(message) => page.last_error = Some(message),
                    }
                }
            }
            NetworkResponse::MatchStarted { match_id, result, .. } => {
                if let Some(card) = self.stored_card_mut(&match_id) {
                    card.on_start_result(result);
                }
            }
            NetworkResponse::MatchCompleted { match_id, result, .. } => {
                if let Some(card) = self.stored_card_mut(&match_id) {
                    card.on_finish_result(result);
                }
            }
            NetworkResponse::FriendshipUpdated { user_id, action, result, .. } => {
                self.on_friendship_updated(user_id, action, result)
            }
            NetworkResponse::RegistrationUpdated {
                tournament_id,
                is_team,
                participant_id,
                register,
                result,
                ..
            } => {
                self.on_registration_updated(tournament_id, is_team, participant_id, register, result)
            }
        }
    }

    fn on_friendship_updated(
        &mut self,
        user_id: String,
        action: FriendAction,
        result: Result<(), String>,
    ) {
        match &mut self.state.page {
            PageState::Profile(profile) if profile.user_id == user_id => {
                profile.settle(result.is_ok())
            }
            PageState::Friends(friends) if result.is_err() => {
                friends.sent.remove(&user_id);
            }
            _ => {}
        }
        match result {
            Ok(()) => {
                info!("friend action {action:?} for {user_id} done");
                self.record_friendship(&user_id, action);
            }
            Err(message) => self.alert_error(message),
        }
    }

    /// Mirror a confirmed social action in the local collections.
    fn record_friendship(&mut self, user_id: &str, action: FriendAction) {
        let fixtures = &mut self.fixtures;
        match action {
            FriendAction::SendRequest => {
                if !fixtures.outgoing_requests.iter().any(|u| u.id == user_id)
                    && let Some(user) = fixtures.user(user_id).cloned()
                {
                    fixtures.outgoing_requests.push(user);
                }
            }
            FriendAction::CancelRequest => fixtures.outgoing_requests.retain(|u| u.id != user_id),
            FriendAction::Remove => fixtures.friends.retain(|u| u.id != user_id),
        }
    }

    fn on_registration_updated(
        &mut self,
        tournament_id: String,
        is_team: bool,
        participant_id: String,
        register: bool,
        result: Result<(), String>,
    ) {
        let Err(message) = result else {
            info!("registration for tournament {tournament_id} updated (register: {register})");
            return;
        };
        if let PageState::TournamentPage(page) = &mut self.state.page
            && page.tournament_id == tournament_id
        {
            page.application.applied = !register;
            // A failed cancel leaves the application as it was, team included.
            page.applied_with = (!register && is_team).then_some(participant_id);
        }
        self.alert_error(format!("Could not update the application: {message}"));
    }

    // -----------------------------------------------------------------------
    // Lists and tabs
    // -----------------------------------------------------------------------

    /// Number of rows in the list the cursor is on.
    fn list_len(&self) -> usize {
        let f = &self.fixtures;
        match &self.state.page {
            PageState::Home(_) => f.games.len() + f.popular_tournaments().len(),
            PageState::Games(page) => page.visible(&f.games).len(),
            PageState::AboutGame(page) => match page.tab {
                AboutGameTab::Tournaments => page.visible(f).len(),
                AboutGameTab::Overview => 0,
            },
            PageState::Friends(page) => match &page.add_modal {
                Some(modal) => modal.matches(&f.users, &f.me.id).len(),
                None => page.current(f).len(),
            },
            PageState::Teams(page) => page.current(f).len(),
            PageState::TeamPage(page) => match page.tab {
                TeamTab::Participants => page.team.as_ref().map_or(0, |t| t.members.len()),
                TeamTab::Information => 0,
            },
            PageState::Tournaments(page) => page.visible(f).len(),
            PageState::TournamentPage(page) => {
                let Some(t) = f.tournament(&page.tournament_id) else {
                    return 0;
                };
                match page.tab {
                    TournamentTab::Matches => page.stage_matches(t).len(),
                    TournamentTab::Bracket if page.stage == StageFilter::Group => {
                        t.group_stage.as_ref().map_or(0, |gs| gs.groups.len())
                    }
                    TournamentTab::Bracket => bracket_matches(&bracket_columns(t)).len(),
                    TournamentTab::Participants => t.participants.len(),
                    _ => 0,
                }
            }
            PageState::MyProfile(page) => match page.section {
                MyProfileSection::GameAccounts => f.game_accounts.len(),
                MyProfileSection::Settings => 0,
            },
            PageState::Profile(page) => match page.tab {
                ProfileTab::Teams => f.teams_of(&page.user_id).len(),
                ProfileTab::Friends => f.friends.len(),
                ProfileTab::Tournaments => f.tournaments_of(&page.user_id).len(),
                ProfileTab::Information => 0,
            },
            PageState::NewTournament(_) | PageState::NotFound => 0,
        }
    }

    fn list_mut(&mut self) -> Option<&mut ListState> {
        match &mut self.state.page {
            PageState::Home(list) => Some(list),
            PageState::Games(page) => Some(&mut page.list),
            PageState::AboutGame(page) => Some(&mut page.list),
            PageState::Friends(page) => match &mut page.add_modal {
                Some(modal) => Some(&mut modal.list),
                None => Some(&mut page.list),
            },
            PageState::Teams(page) => Some(&mut page.list),
            PageState::TeamPage(page) => Some(&mut page.list),
            PageState::Tournaments(page) => Some(&mut page.list),
            PageState::TournamentPage(page) => match page.tab {
                TournamentTab::Participants => Some(&mut page.participants),
                _ => Some(&mut page.matches),
            },
            PageState::MyProfile(page) => Some(&mut page.accounts),
            PageState::Profile(page) => Some(&mut page.list),
            PageState::NewTournament(_) | PageState::NotFound => None,
        }
    }

    pub fn move_selection(&mut self, down: bool) {
        if let PageState::TournamentPage(page) = &mut self.state.page {
            if let Some(card) = page.match_card_mut() {
                if down { card.select_next_map() } else { card.select_prev_map() }
                return;
            }
            if page.application.picker_open {
                let teams = self.fixtures.teams.len();
                if down {
                    page.application.select_next_team(teams);
                } else {
                    page.application.select_prev_team(teams);
                }
                return;
            }
            if page.tab == TournamentTab::Bracket && page.stage == StageFilter::Group {
                let groups = self
                    .fixtures
                    .tournament(&page.tournament_id)
                    .and_then(|t| t.group_stage.as_ref())
                    .map_or(0, |gs| gs.groups.len());
                page.group = if down {
                    (page.group + 1).min(groups.saturating_sub(1))
                } else {
                    page.group.saturating_sub(1)
                };
                return;
            }
        }
        let len = self.list_len();
        if let Some(list) = self.list_mut() {
            if down { list.down(len) } else { list.up() }
        }
    }

    pub fn switch_tab(&mut self, forward: bool) {
        fn step<T: TabCycle>(tab: T, forward: bool) -> T {
            if forward { tab.next() } else { tab.prev() }
        }
        match &mut self.state.page {
            PageState::AboutGame(page) => {
                page.tab = step(page.tab, forward);
                page.list = ListState::default();
            }
            PageState::Friends(page) if page.add_modal.is_none() => {
                page.tab = step(page.tab, forward);
                page.list = ListState::default();
            }
            PageState::Teams(page) if page.create.is_none() => {
                page.tab = step(page.tab, forward);
                page.list = ListState::default();
            }
            PageState::TeamPage(page) => {
                page.tab = step(page.tab, forward);
                page.list = ListState::default();
            }
            PageState::TournamentPage(page) if page.match_card().is_none() => {
                page.tab = step(page.tab, forward);
                page.matches = ListState::default();
            }
            PageState::MyProfile(page) if page.account_form.is_none() => {
                page.section = step(page.section, forward);
            }
            PageState::Profile(page) => {
                page.tab = step(page.tab, forward);
                page.list = ListState::default();
            }
            _ => {}
        }
    }

    /// Enter on a list row: follow it to its page.
    pub fn activate(&mut self) -> Vec<NetworkRequest> {
        match self.selected_route() {
            Some(route) => self.navigate(route),
            None => Vec::new(),
        }
    }

    fn selected_route(&self) -> Option<Route> {
        let f = &self.fixtures;
        match &self.state.page {
            PageState::Home(list) => {
                let idx = list.selected;
                match f.games.get(idx) {
                    Some(game) => Some(Route::AboutGame { id: game.id.clone() }),
                    None => f
                        .popular_tournaments()
                        .get(idx - f.games.len())
                        .map(|t| Route::TournamentPage { id: t.id.clone() }),
                }
            }
            PageState::Games(page) => page
                .visible(&f.games)
                .get(page.list.selected)
                .map(|g| Route::AboutGame { id: g.id.clone() }),
            PageState::AboutGame(page) if page.tab == AboutGameTab::Tournaments => page
                .visible(f)
                .get(page.list.selected)
                .map(|t| Route::TournamentPage { id: t.id.clone() }),
            PageState::Friends(page) if page.add_modal.is_none() => page
                .current(f)
                .get(page.list.selected)
                .map(|u| Route::Profile { id: u.id.clone() }),
            PageState::Teams(page) if page.create.is_none() => page
                .current(f)
                .get(page.list.selected)
                .map(|t| Route::TeamPage { id: t.id.clone() }),
            PageState::TeamPage(page) if page.tab == TeamTab::Participants => page
                .team
                .as_ref()
                .and_then(|t| t.members.get(page.list.selected))
                .map(|u| Route::Profile { id: u.id.clone() }),
            PageState::Tournaments(page) => page
                .visible(f)
                .get(page.list.selected)
                .map(|t| Route::TournamentPage { id: t.id.clone() }),
            PageState::TournamentPage(page) if page.tab == TournamentTab::Participants => f
                .tournament(&page.tournament_id)
                .and_then(|t| t.participants.get(page.participants.selected))
                .map(|u| Route::Profile { id: u.id.clone() }),
            PageState::Profile(page) => match page.tab {
                ProfileTab::Teams => f
                    .teams_of(&page.user_id)
                    .get(page.list.selected)
                    .map(|t| Route::TeamPage { id: t.id.clone() }),
                ProfileTab::Friends => f
                    .friends
                    .get(page.list.selected)
                    .map(|u| Route::Profile { id: u.id.clone() }),
                ProfileTab::Tournaments => f
                    .tournaments_of(&page.user_id)
                    .get(page.list.selected)
                    .map(|t| Route::TournamentPage { id: t.id.clone() }),
                ProfileTab::Information => None,
            },
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Games and tournament lists
    // -----------------------------------------------------------------------

    pub fn cycle_game_status_filter(&mut self) {
        if let PageState::AboutGame(page) = &mut self.state.page {
            page.cycle_status();
        }
    }

    pub fn new_tournament_for_game(&mut self) -> Vec<NetworkRequest> {
        let PageState::AboutGame(page) = &self.state.page else {
            return Vec::new();
        };
        let game_id = page.game_id.clone();
        self.navigate(Route::NewTournament { game_id: Some(game_id) })
    }

    /// Change the status filter; the route follows so the path stays in sync.
    pub fn cycle_tournaments_status(&mut self, forward: bool) {
        let PageState::Tournaments(page) = &mut self.state.page else {
            return;
        };
        let all = TournamentStatus::ALL;
        let idx = all.iter().position(|s| *s == page.status).unwrap_or(0);
        page.status = if forward {
            all[(idx + 1) % all.len()]
        } else {
            all[(idx + all.len() - 1) % all.len()]
        };
        page.list = ListState::default();
        self.state.route = page.route();
    }

    pub fn toggle_tournaments_role(&mut self) {
        let PageState::Tournaments(page) = &mut self.state.page else {
            return;
        };
        page.role = match page.role {
            TournamentRole::Manager => TournamentRole::Participant,
            TournamentRole::Participant => TournamentRole::Manager,
        };
        page.list = ListState::default();
        self.state.route = page.route();
    }

    // -----------------------------------------------------------------------
    // Tournament page
    // -----------------------------------------------------------------------

    pub fn cycle_stage(&mut self) {
        if let PageState::TournamentPage(page) = &mut self.state.page
            && let Some(t) = self.fixtures.tournament(&page.tournament_id)
        {
            page.cycle_stage(t);
        }
    }

    pub fn apply_to_tournament(&mut self) -> Vec<NetworkRequest> {
        let token = self.state.token;
        let PageState::TournamentPage(page) = &mut self.state.page else {
            return Vec::new();
        };
        let Some(t) = self.fixtures.tournament(&page.tournament_id) else {
            return Vec::new();
        };
        let me = self.fixtures.me.id.clone();
        match page.application.apply(t.status, t.requires_team) {
            ApplyOutcome::Ignored | ApplyOutcome::PickerOpened => Vec::new(),
            ApplyOutcome::Applied => {
                page.applied_with = None;
                vec![NetworkRequest::Registration {
                    token,
                    tournament_id: t.id.clone(),
                    is_team: false,
                    participant_id: me,
                    register: true,
                }]
            }
            ApplyOutcome::Cancelled => {
                let (is_team, participant_id) = match page.applied_with.take() {
                    Some(team_id) => (true, team_id),
                    None => (false, me),
                };
                vec![NetworkRequest::Registration {
                    token,
                    tournament_id: t.id.clone(),
                    is_team,
                    participant_id,
                    register: false,
                }]
            }
        }
    }

    pub fn confirm_team_pick(&mut self) -> Vec<NetworkRequest> {
        let token = self.state.token;
        let PageState::TournamentPage(page) = &mut self.state.page else {
            return Vec::new();
        };
        let Some(idx) = page.application.confirm_team() else {
            return Vec::new();
        };
        let Some(team) = self.fixtures.teams.get(idx) else {
            return Vec::new();
        };
        page.applied_with = Some(team.id.clone());
        vec![NetworkRequest::Registration {
            token,
            tournament_id: page.tournament_id.clone(),
            is_team: true,
            participant_id: team.id.clone(),
            register: true,
        }]
    }

    pub fn close_team_picker(&mut self) {
        if let PageState::TournamentPage(page) = &mut self.state.page {
            page.application.close_picker();
        }
    }

    /// Open the details panel of the highlighted match (Matches or Bracket tab).
    pub fn open_match_card(&mut self) {
        let PageState::TournamentPage(page) = &mut self.state.page else {
            return;
        };
        let Some(t) = self.fixtures.tournament(&page.tournament_id) else {
            return;
        };
        let selected = match page.tab {
            TournamentTab::Matches => page.stage_matches(t).get(page.matches.selected).copied(),
            TournamentTab::Bracket if page.stage != StageFilter::Group => {
                bracket_matches(&bracket_columns(t)).get(page.matches.selected).copied()
            }
            _ => None,
        };
        if let Some(m) = selected {
            debug!("opening match {} ({:?})", m.id, panel_for(m, &self.viewer));
            page.show_card(m);
        }
    }

    /// Hide the card. Its state stays with the page.
    pub fn close_match_card(&mut self) {
        if let PageState::TournamentPage(page) = &mut self.state.page {
            page.hide_card();
        }
    }

    fn match_card_mut(&mut self) -> Option<&mut MatchCardState> {
        match &mut self.state.page {
            PageState::TournamentPage(page) => page.match_card_mut(),
            _ => None,
        }
    }

    /// Card state of `match_id` on the current page, shown or not.
    fn stored_card_mut(&mut self, match_id: &str) -> Option<&mut MatchCardState> {
        match &mut self.state.page {
            PageState::TournamentPage(page) => page.cards.get_mut(match_id),
            _ => None,
        }
    }

    /// The open card together with its match and the panel the viewer gets.
    fn card_context(&mut self) -> Option<(&mut MatchCardState, &Match, MatchPanel)> {
        let PageState::TournamentPage(page) = &mut self.state.page else {
            return None;
        };
        let t = self.fixtures.tournament(&page.tournament_id)?;
        let card = page.match_card_mut()?;
        let m = t.find_match(&card.match_id)?;
        let panel = panel_for(m, &self.viewer);
        Some((card, m, panel))
    }

    pub fn start_match(&mut self) -> Vec<NetworkRequest> {
        let token = self.state.token;
        let Some((card, m, panel)) = self.card_context() else {
            return Vec::new();
        };
        if panel != MatchPanel::Start || !card.begin_start() {
            return Vec::new();
        }
        info!("starting match {}", m.id);
        vec![NetworkRequest::StartMatch {
            token,
            tournament_id: card.tournament_id.clone(),
            match_id: m.id.clone(),
        }]
    }

    pub fn finish_match(&mut self) -> Vec<NetworkRequest> {
        let token = self.state.token;
        let Some((card, m, panel)) = self.card_context() else {
            return Vec::new();
        };
        if panel != MatchPanel::OngoingMaps {
            return Vec::new();
        }
        let Some(completions) = card.begin_finish(m) else {
            return Vec::new();
        };
        info!("finishing match {} with {} maps", m.id, completions.len());
        vec![NetworkRequest::CompleteMatch {
            token,
            tournament_id: card.tournament_id.clone(),
            match_id: m.id.clone(),
            completions,
        }]
    }

    pub fn set_map_winner(&mut self, slot: Slot) {
        if let Some((card, _, MatchPanel::OngoingMaps)) = self.card_context() {
            card.set_winner(card.selected_map, slot);
        }
    }

    pub fn toggle_url_editing(&mut self) {
        if let Some((card, _, MatchPanel::OngoingMaps)) = self.card_context()
            && !card.finished
        {
            card.editing_url = !card.editing_url;
        }
    }

    /// The external URL being typed into, if any.
    pub fn editing_url_mut(&mut self) -> Option<&mut String> {
        let card = self.match_card_mut()?;
        if !card.editing_url {
            return None;
        }
        card.selected_draft_mut().map(|d| &mut d.external_url)
    }

    pub fn stop_url_editing(&mut self) {
        if let Some(card) = self.match_card_mut() {
            card.editing_url = false;
        }
    }

    // -----------------------------------------------------------------------
    // Friends and profiles
    // -----------------------------------------------------------------------

    pub fn open_add_friend(&mut self) {
        if let PageState::Friends(page) = &mut self.state.page {
            page.add_modal = Some(AddFriendModal::default());
        }
    }

    pub fn close_add_friend(&mut self) {
        if let PageState::Friends(page) = &mut self.state.page {
            page.add_modal = None;
        }
    }

    pub fn add_friend_query_mut(&mut self) -> Option<&mut AddFriendModal> {
        match &mut self.state.page {
            PageState::Friends(page) => page.add_modal.as_mut(),
            _ => None,
        }
    }

    /// Send a request to the highlighted search result, once per user.
    pub fn send_friend_request(&mut self) -> Vec<NetworkRequest> {
        let token = self.state.token;
        let PageState::Friends(page) = &mut self.state.page else {
            return Vec::new();
        };
        let Some(modal) = &page.add_modal else {
            return Vec::new();
        };
        let Some(user_id) = modal
            .matches(&self.fixtures.users, &self.fixtures.me.id)
            .get(modal.list.selected)
            .map(|u| u.id.clone())
        else {
            return Vec::new();
        };
        if !page.mark_sent(&user_id) {
            return Vec::new();
        }
        info!("sending friend request to {user_id}");
        vec![NetworkRequest::Friendship { token, user_id, action: FriendAction::SendRequest }]
    }

    pub fn profile_friend_action(&mut self) -> Vec<NetworkRequest> {
        let token = self.state.token;
        let PageState::Profile(page) = &mut self.state.page else {
            return Vec::new();
        };
        if page.pending {
            return Vec::new();
        }
        let Some(action) = page.friend_action() else {
            return Vec::new();
        };
        page.apply(action);
        vec![NetworkRequest::Friendship { token, user_id: page.user_id.clone(), action }]
    }

    // -----------------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------------

    /// The form keyboard input goes to, if one is showing.
    pub fn active_form(&mut self) -> Option<&mut dyn Form> {
        match &mut self.state.page {
            PageState::NewTournament(form) => Some(form),
            PageState::Teams(page) => page.create.as_mut().map(|f| f as &mut dyn Form),
            PageState::MyProfile(page) => match (&mut page.account_form, page.section) {
                (Some(form), _) => Some(form),
                (None, MyProfileSection::Settings) => Some(&mut page.settings),
                (None, MyProfileSection::GameAccounts) => None,
            },
            _ => None,
        }
    }

    /// The active form lives in a modal that Esc closes.
    pub fn form_is_modal(&self) -> bool {
        match &self.state.page {
            PageState::Teams(page) => page.create.is_some(),
            PageState::MyProfile(page) => page.account_form.is_some(),
            _ => false,
        }
    }

    pub fn close_modal_form(&mut self) {
        match &mut self.state.page {
            PageState::Teams(page) => page.create = None,
            PageState::MyProfile(page) => page.account_form = None,
            _ => {}
        }
    }

    pub fn open_create_team(&mut self) {
        if let PageState::Teams(page) = &mut self.state.page {
            page.create = Some(TeamForm::default());
        }
    }

    pub fn open_account_form(&mut self) {
        let games = self.fixtures.games.iter().map(|g| g.title.clone()).collect();
        if let PageState::MyProfile(page) = &mut self.state.page
            && page.section == MyProfileSection::GameAccounts
        {
            page.account_form = Some(GameAccountForm::new(games));
        }
    }

    pub fn delete_game_account(&mut self) {
        let PageState::MyProfile(page) = &mut self.state.page else {
            return;
        };
        if page.section != MyProfileSection::GameAccounts || page.account_form.is_some() {
            return;
        }
        if page.accounts.selected < self.fixtures.game_accounts.len() {
            let removed = self.fixtures.game_accounts.remove(page.accounts.selected);
            info!("removed {} account {}", removed.game_title, removed.nickname);
            page.accounts.clamp(self.fixtures.game_accounts.len());
        }
    }

    pub fn submit_form(&mut self) -> Vec<NetworkRequest> {
        match &self.state.page {
            PageState::NewTournament(_) => self.submit_new_tournament(),
            PageState::Teams(_) => {
                self.submit_team();
                Vec::new()
            }
            PageState::MyProfile(page) if page.account_form.is_some() => {
                self.submit_game_account();
                Vec::new()
            }
            PageState::MyProfile(_) => {
                self.submit_settings();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn submit_new_tournament(&mut self) -> Vec<NetworkRequest> {
        let PageState::NewTournament(form) = &self.state.page else {
            return Vec::new();
        };
        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(e) => {
                self.alert_error(e.to_string());
                return Vec::new();
            }
        };

        let id = self
            .fixtures
            .tournaments
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = id.to_string();
        info!(
            "created tournament {id} \"{}\": {} slots, {} matches, {}, final {}",
            draft.title,
            draft.slots,
            draft.match_format,
            draft.playoff.label(),
            draft.final_format
        );
        let base = self.settings.media_base().to_string();
        self.fixtures.tournaments.push(Tournament {
            id: id.clone(),
            game_id: draft.game_id,
            title: draft.title,
            image: draft.image_path.map(|p| media_url(&base, Some(&p))),
            starts_at: Some(draft.starts_at),
            status: TournamentStatus::Open,
            prize_fund: draft.prize_fund,
            contact: Some(draft.contact),
            organizer: Some(self.fixtures.me.clone()),
            description: draft.description,
            requires_team: false,
            has_group_stage: draft.group_stage,
            group_stage: draft.group_stage.then(GroupStage::default),
            final_match: Some(Match {
                id: format!("{id}-final"),
                tournament_id: id.clone(),
                number: 1,
                format: draft.final_format,
                status: MatchStatus::Scheduled,
                creator_id: Some(self.fixtures.me.id.clone()),
                ..Default::default()
            }),
            ..Default::default()
        });
        self.fixtures.organized.push(id);

        let requests = self.navigate(Route::Tournaments {
            status: TournamentStatus::Open,
            role: TournamentRole::Manager,
        });
        self.state.alert = Some(AlertState::info("Tournament created"));
        requests
    }

    fn submit_team(&mut self) {
        let PageState::Teams(page) = &mut self.state.page else {
            return;
        };
        let Some(form) = &page.create else {
            return;
        };
        match form.validate() {
            Ok(draft) => {
                let id = format!(
                    "team-{}",
                    self.fixtures.teams.len() + self.fixtures.team_invites.len() + 1
                );
                info!("created team {id} \"{}\"", draft.name);
                self.fixtures.teams.push(Team {
                    id,
                    name: draft.name,
                    description: draft.description,
                    logo: draft.logo_path.map(|p| media_url(self.settings.media_base(), Some(&p))),
                    members: vec![self.fixtures.me.clone()],
                });
                page.create = None;
                page.tab = Default::default();
                self.state.alert = Some(AlertState::info("Team created"));
            }
            Err(e) => self.state.alert = Some(AlertState::error(e.to_string())),
        }
    }

    fn submit_settings(&mut self) {
        let PageState::MyProfile(page) = &mut self.state.page else {
            return;
        };
        match page.settings.validate() {
            Ok(update) => {
                if update.password_changed {
                    info!("password changed");
                }
                self.fixtures.me.name = update.name;
                if let Some(path) = update.avatar_path {
                    self.fixtures.me.avatar = Some(media_url(self.settings.media_base(), Some(&path)));
                }
                page.settings.clear_passwords();
                self.state.alert = Some(AlertState::info("Settings saved"));
            }
            Err(e) => self.state.alert = Some(AlertState::error(e.to_string())),
        }
    }

    fn submit_game_account(&mut self) {
        let PageState::MyProfile(page) = &mut self.state.page else {
            return;
        };
        let Some(form) = &page.account_form else {
            return;
        };
        match form.validate() {
            Ok((game_title, nickname)) => {
                let id = format!("acc-{}", self.fixtures.game_accounts.len() + 1);
                self.fixtures.game_accounts.push(GameAccount { id, game_title, nickname });
                page.account_form = None;
            }
            Err(e) => self.state.alert = Some(AlertState::error(e.to_string())),
        }
    }

    pub fn games_filter_mut(&mut self) -> Option<&mut GamesState> {
        match &mut self.state.page {
            PageState::Games(page) if page.filtering => Some(page),
            _ => None,
        }
    }

    pub fn start_games_filter(&mut self) {
        if let PageState::Games(page) = &mut self.state.page {
            page.filtering = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteToken;

    fn app() -> App {
        App::new(AppSettings::default(), Fixtures::sample())
    }

    #[test]
    fn stale_team_response_is_dropped() {
        let mut app = app();
        let requests = app.navigate_path("/team/team-1");
        let Some(NetworkRequest::LoadTeam { token, .. }) = requests.first().cloned() else {
            panic!("team page should load the team: {requests:?}");
        };

        app.navigate_path("/team/team-2");
        app.on_network_response(NetworkResponse::TeamLoaded {
            token,
            team_id: "team-1".into(),
            result: Err("late".into()),
        });
        let PageState::TeamPage(page) = &app.state.page else { panic!("expected team page") };
        assert_eq!(page.team_id, "team-2");
        assert!(page.loading);
        assert!(page.last_error.is_none());

        let current = app.state.token;
        app.on_network_response(NetworkResponse::TeamLoaded {
            token: current,
            team_id: "team-2".into(),
            result: Ok(Team { id: "team-2".into(), name: "Fresh Foxes".into(), ..Default::default() }),
        });
        let PageState::TeamPage(page) = &app.state.page else { panic!("expected team page") };
        assert_eq!(page.team.as_ref().map(|t| t.name.as_str()), Some("Fresh Foxes"));
        assert!(!page.loading);
    }

    #[test]
    fn tournaments_filters_follow_the_query_both_ways() {
        let mut app = app();
        app.navigate_path("/tournaments?tournament=completed&organizer=participant");
        let PageState::Tournaments(page) = &app.state.page else { panic!("expected list") };
        assert_eq!(page.status, TournamentStatus::Completed);
        assert_eq!(page.role, TournamentRole::Participant);

        app.cycle_tournaments_status(true);
        app.toggle_tournaments_role();
        assert_eq!(
            app.state.route.to_path(),
            "/tournaments?tournament=cancelled&organizer=manager"
        );
        let PageState::Tournaments(page) = &app.state.page else { panic!("expected list") };
        let ids: Vec<String> = page.visible(&app.fixtures).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["6"]);
    }

    #[test]
    fn new_tournament_without_game_goes_home() {
        let mut app = app();
        app.navigate_path("/games");
        app.navigate_path("/newtournament");
        assert_eq!(app.state.route, Route::Home);
        assert!(matches!(app.state.page, PageState::Home(_)));

        app.navigate_path("/newtournament?game=2");
        assert!(matches!(app.state.page, PageState::NewTournament(_)));
    }

    #[test]
    fn created_tournament_lands_in_managed_open_list() {
        let mut app = app();
        app.navigate_path("/games/1");
        app.new_tournament_for_game();
        if let PageState::NewTournament(form) = &mut app.state.page {
            form.title = "Spring Brawl".into();
            form.date = "01.03.2026".into();
            form.time = "18:00".into();
            form.contact = "@me".into();
        }
        app.submit_form();

        assert_eq!(app.state.route.to_path(), "/tournaments?tournament=open&organizer=manager");
        assert_eq!(app.state.alert.as_ref().map(|a| a.message.as_str()), Some("Tournament created"));
        let PageState::Tournaments(page) = &app.state.page else { panic!("expected list") };
        assert!(page.visible(&app.fixtures).iter().any(|t| t.title == "Spring Brawl"));
    }

    #[test]
    fn invalid_form_raises_blocking_alert() {
        let mut app = app();
        app.navigate_path("/profile");
        if let PageState::MyProfile(page) = &mut app.state.page {
            page.settings.new_password = "a".into();
            page.settings.confirm_password = "b".into();
        }
        app.submit_form();
        assert_eq!(
            app.state.alert.as_ref().map(|a| a.message.as_str()),
            Some("New passwords do not match")
        );
    }

    #[test]
    fn failed_registration_reverts_application() {
        let mut app = app();
        app.navigate_path("/tournament/2");
        // Tournament 2 requires a team: apply opens the picker.
        assert!(app.apply_to_tournament().is_empty());
        app.move_selection(true);
        let requests = app.confirm_team_pick();
        let [NetworkRequest::Registration { token, is_team, participant_id, register, .. }] =
            requests.as_slice()
        else {
            panic!("expected a registration request: {requests:?}");
        };
        assert!(*is_team && *register);
        assert_eq!(participant_id, "team-1");

        app.on_network_response(NetworkResponse::RegistrationUpdated {
            token: *token,
            tournament_id: "2".into(),
            is_team: true,
            participant_id: "team-1".into(),
            register: true,
            result: Err("Registration closed".into()),
        });
        let PageState::TournamentPage(page) = &app.state.page else { panic!("expected page") };
        assert!(!page.application.applied);
        assert!(page.applied_with.is_none());
        assert!(app.state.alert.is_some());
    }

    #[test]
    fn failed_team_cancel_keeps_the_team() {
        let mut app = app();
        app.navigate_path("/tournament/2");
        app.apply_to_tournament();
        app.move_selection(true);
        app.confirm_team_pick();
        let token = app.state.token;
        app.on_network_response(NetworkResponse::RegistrationUpdated {
            token,
            tournament_id: "2".into(),
            is_team: true,
            participant_id: "team-1".into(),
            register: true,
            result: Ok(()),
        });

        let requests = app.apply_to_tournament();
        assert!(matches!(
            requests.as_slice(),
            [NetworkRequest::Registration { is_team: true, register: false, participant_id, .. }]
                if participant_id == "team-1"
        ));
        app.on_network_response(NetworkResponse::RegistrationUpdated {
            token,
            tournament_id: "2".into(),
            is_team: true,
            participant_id: "team-1".into(),
            register: false,
            result: Err("down".into()),
        });
        let PageState::TournamentPage(page) = &app.state.page else { panic!("expected page") };
        assert!(page.application.applied);
        assert_eq!(page.applied_with.as_deref(), Some("team-1"));

        let requests = app.apply_to_tournament();
        assert!(matches!(
            requests.as_slice(),
            [NetworkRequest::Registration { is_team: true, register: false, participant_id, .. }]
                if participant_id == "team-1"
        ));
    }

    #[test]
    fn start_only_for_scheduled_match_with_both_participants() {
        let mut app = app();
        app.navigate_path("/tournament/2");
        app.switch_tab(true); // Bracket
        app.switch_tab(true); // Matches
        app.open_match_card();
        let requests = app.start_match();
        assert!(matches!(
            requests.as_slice(),
            [NetworkRequest::StartMatch { match_id, .. }] if match_id == "oi-1"
        ));
        // In flight: a second press does nothing.
        assert!(app.start_match().is_empty());

        app.on_network_response(NetworkResponse::MatchStarted {
            token: RouteToken(0),
            match_id: "oi-1".into(),
            result: Ok(()),
        });
        let PageState::TournamentPage(page) = &app.state.page else { panic!("expected page") };
        assert!(!page.match_card().unwrap().started, "stale token must be ignored");

        let token = app.state.token;
        app.on_network_response(NetworkResponse::MatchStarted {
            token,
            match_id: "oi-1".into(),
            result: Ok(()),
        });
        assert!(app.start_match().is_empty());
    }

    #[test]
    fn started_match_stays_started_after_reopening_the_card() {
        let mut app = app();
        app.navigate_path("/tournament/2");
        app.switch_tab(true);
        app.switch_tab(true);
        app.open_match_card();
        assert_eq!(app.start_match().len(), 1);

        // The reply lands while the card is hidden.
        app.close_match_card();
        let token = app.state.token;
        app.on_network_response(NetworkResponse::MatchStarted {
            token,
            match_id: "oi-1".into(),
            result: Ok(()),
        });

        app.open_match_card();
        let PageState::TournamentPage(page) = &app.state.page else { panic!("expected page") };
        assert!(page.match_card().unwrap().started);
        assert!(app.start_match().is_empty());

        app.close_match_card();
        app.open_match_card();
        assert!(app.start_match().is_empty());
    }

    #[test]
    fn finishing_needs_every_map_winner() {
        let mut app = app();
        app.navigate_path("/tournament/1");
        app.switch_tab(true);
        app.switch_tab(true);
        app.cycle_stage(); // Playoff
        app.move_selection(true); // po-2, ongoing Bo3
        app.open_match_card();

        app.set_map_winner(Slot::First);
        app.move_selection(true);
        app.set_map_winner(Slot::Second);
        assert!(app.finish_match().is_empty());

        app.move_selection(true);
        app.set_map_winner(Slot::First);
        let requests = app.finish_match();
        let [NetworkRequest::CompleteMatch { completions, .. }] = requests.as_slice() else {
            panic!("expected completion request: {requests:?}");
        };
        assert_eq!(completions.len(), 3);

        let token = app.state.token;
        app.on_network_response(NetworkResponse::MatchCompleted {
            token,
            match_id: "po-2".into(),
            result: Ok(()),
        });
        app.close_match_card();
        app.open_match_card();
        assert!(app.finish_match().is_empty());
    }

    #[test]
    fn friend_request_sent_once_and_rolled_back_on_failure() {
        let mut app = app();
        app.navigate_path("/friends");
        app.open_add_friend();
        if let Some(modal) = app.add_friend_query_mut() {
            modal.query = "kes".into();
        }
        let requests = app.send_friend_request();
        assert_eq!(requests.len(), 1);
        assert!(app.send_friend_request().is_empty());

        let token = app.state.token;
        app.on_network_response(NetworkResponse::FriendshipUpdated {
            token,
            user_id: "u-9".into(),
            action: FriendAction::SendRequest,
            result: Err("Server unavailable".into()),
        });
        let PageState::Friends(page) = &app.state.page else { panic!("expected friends") };
        assert!(!page.sent.contains("u-9"));
        assert!(app.state.alert.is_some());
    }

    #[test]
    fn own_profile_redirects_to_my_profile() {
        let mut app = app();
        app.navigate_path("/profile/u-1");
        assert_eq!(app.state.route, Route::MyProfile);
        app.navigate_path("/profile/u-3");
        assert!(matches!(app.state.page, PageState::Profile(_)));
        app.go_back();
        assert_eq!(app.state.route, Route::MyProfile);
    }
}
