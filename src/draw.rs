use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

use crate::app::App;
use crate::components::bracket::{
    BracketView, StandingsTable, bracket_columns, cell_center, locate, standings_height,
};
use crate::components::cards::{
    account_card, game_card, match_row, media_line, team_card, tournament_card, user_card,
};
use crate::components::match_card::MatchCardView;
use crate::components::theme::{Tone, status_color, tone};
use crate::components::widgets::{FormView, Modal, button_line, form_height, tab_switch};
use crate::routes::SECTIONS;
use crate::state::app_state::{
    AboutGameState, AboutGameTab, AddFriendModal, FriendsState, FriendsTab, GamesState, ListState,
    MyProfileSection, MyProfileState, PageState, ProfileState, ProfileTab, StageFilter, TabCycle,
    TeamPageState, TeamTab, TeamsState, TeamsTab, TournamentPageState, TournamentTab,
    TournamentsState, friend_action_label,
};
use crate::state::forms::{Form, NewTournamentForm};
use crate::state::match_card::panel_for;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::{LayoutAreas, centered_rect};
use ggforge_api::{Tournament, TournamentStatus, format_prize, format_starts_at};
use log::error;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);
    let app = &*app;

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        draw_page(f, layout.main, app);

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_status(f, layout.status, app);

        if app.state.show_help {
            draw_help(f, layout.main);
        }
        if let Some(alert) = &app.state.alert {
            let area = centered_rect(f.area(), 56, 7);
            f.render_widget(
                Modal {
                    title: &alert.title,
                    body: vec![Line::raw(alert.message.as_str())],
                    hint: "Enter/Esc: close",
                    danger: alert.is_error(),
                },
                area,
            );
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("Failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let titles: Vec<Line> = SECTIONS
        .iter()
        .enumerate()
        .map(|(i, (title, _))| Line::from(format!("{} {title}", i + 1)))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(app.state.route.section())
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_page(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(format!(" {} ", app.state.route.title()));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    match &app.state.page {
        PageState::Home(list) => draw_home(f, inner, app, list),
        PageState::Games(page) => draw_games(f, inner, app, page),
        PageState::AboutGame(page) => draw_about_game(f, inner, app, page),
        PageState::Friends(page) => draw_friends(f, inner, app, page),
        PageState::Teams(page) => draw_teams(f, inner, app, page),
        PageState::TeamPage(page) => draw_team_page(f, inner, app, page),
        PageState::Tournaments(page) => draw_tournaments(f, inner, app, page),
        PageState::TournamentPage(page) => draw_tournament_page(f, inner, app, page),
        PageState::NewTournament(form) => draw_new_tournament(f, inner, app, form),
        PageState::MyProfile(page) => draw_my_profile(f, inner, app, page),
        PageState::Profile(page) => draw_profile(f, inner, app, page),
        PageState::NotFound => draw_placeholder(
            f,
            inner,
            &format!("Nothing at {}\n\nBackspace: back   : go to path", app.state.route.to_path()),
        ),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(msg.lines().count() as u16),
        Constraint::Fill(1),
    ])
    .areas(area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        middle,
    );
}

fn tab_labels<T: TabCycle>() -> Vec<&'static str> {
    T::ALL.iter().map(|t| t.label()).collect()
}

/// Splits off a two-row strip at the top for a tab switch or filter line.
fn header_and_body(area: Rect, header: u16) -> (Rect, Rect) {
    let [top, body] =
        Layout::vertical([Constraint::Length(header), Constraint::Fill(1)]).areas(area);
    (top, body)
}

/// Only the rows that fit, scrolled so `selected` stays in view.
fn scrolled<'a>(lines: Vec<Line<'a>>, selected: usize, height: u16) -> Vec<Line<'a>> {
    let height = height as usize;
    let skip = (selected + 1).saturating_sub(height);
    lines.into_iter().skip(skip).take(height).collect()
}

fn draw_list(f: &mut Frame, area: Rect, lines: Vec<Line<'static>>, selected: usize, empty: &str) {
    if lines.is_empty() {
        f.render_widget(Paragraph::new(empty.to_string()).style(tone(Tone::Dim)), area);
        return;
    }
    f.render_widget(Paragraph::new(scrolled(lines, selected, area.height)), area);
}

fn draw_form_modal(f: &mut Frame, area: Rect, title: &str, form: &dyn Form, media_base: &str) {
    let rect = centered_rect(area, 76, form_height(form) + 2);
    f.render_widget(Clear, rect);
    let block = default_border(Color::Cyan)
        .title(format!(" {title} "))
        .title_bottom(Line::from(" Tab: next field  Esc: cancel ").right_aligned());
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    f.render_widget(FormView { form, media_base: Some(media_base) }, inner);
}

// ---------------------------------------------------------------------------
// Home and games
// ---------------------------------------------------------------------------

fn draw_home(f: &mut Frame, area: Rect, app: &App, list: &ListState) {
    let (intro, body) = header_and_body(area, 3);
    f.render_widget(
        Paragraph::new(vec![
            Line::styled("GGForge", tone(Tone::Accent)),
            Line::styled(
                "Pick a game, join a tournament and follow its bracket.",
                tone(Tone::Dim),
            ),
        ]),
        intro,
    );

    let games = &app.fixtures.games;
    let popular = app.fixtures.popular_tournaments();
    let mut lines = Vec::with_capacity(games.len() + popular.len() + 3);
    let mut selected_row = 0;

    lines.push(Line::styled("Games", tone(Tone::Dim)));
    for (i, game) in games.iter().enumerate() {
        if i == list.selected {
            selected_row = lines.len();
        }
        lines.push(game_card(game, i == list.selected));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("Popular tournaments", tone(Tone::Dim)));
    for (i, t) in popular.iter().enumerate() {
        let idx = games.len() + i;
        if idx == list.selected {
            selected_row = lines.len();
        }
        lines.push(tournament_card(t, idx == list.selected));
    }
    draw_list(f, body, lines, selected_row, "");
}

fn draw_games(f: &mut Frame, area: Rect, app: &App, page: &GamesState) {
    let (filter, body) = header_and_body(area, 2);
    let filter_line = if page.filtering {
        Line::from(vec![
            Span::styled("Filter: ", tone(Tone::Accent)),
            Span::raw(format!("{}▏", page.filter)),
        ])
    } else if page.filter.is_empty() {
        Line::styled("/ to filter by title", tone(Tone::Dim))
    } else {
        Line::styled(format!("Filter: {}", page.filter), tone(Tone::Dim))
    };
    f.render_widget(Paragraph::new(filter_line), filter);

    let lines = page
        .visible(&app.fixtures.games)
        .into_iter()
        .enumerate()
        .map(|(i, g)| game_card(g, i == page.list.selected))
        .collect();
    draw_list(f, body, lines, page.list.selected, "No games match the filter");
}

fn draw_about_game(f: &mut Frame, area: Rect, app: &App, page: &AboutGameState) {
    let Some(game) = app.fixtures.game(&page.game_id) else {
        draw_placeholder(f, area, &format!("Game {} not found", page.game_id));
        return;
    };

    let (tabs, body) = header_and_body(area, 2);
    f.render_widget(tab_switch(&tab_labels::<AboutGameTab>(), page.tab.index()), tabs);

    match page.tab {
        AboutGameTab::Overview => {
            let lines = vec![
                Line::styled(game.title.clone(), tone(Tone::Accent)),
                media_line("Image", app.settings.media_base(), game.image.as_deref()),
                Line::raw(""),
                Line::raw(game.description.clone()),
                Line::raw(""),
                Line::styled("n: create a tournament for this game", tone(Tone::Dim)),
            ];
            f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
        }
        AboutGameTab::Tournaments => {
            let (filter, list) = header_and_body(body, 2);
            let status = page.status_filter.map_or("All", |s| s.label());
            f.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("Status: ", tone(Tone::Dim)),
                    Span::styled(status, tone(Tone::Accent)),
                    Span::styled("   s: change", tone(Tone::Dim)),
                ])),
                filter,
            );
            let lines = page
                .visible(&app.fixtures)
                .iter()
                .enumerate()
                .map(|(i, t)| tournament_card(t, i == page.list.selected))
                .collect();
            draw_list(f, list, lines, page.list.selected, "No tournaments");
        }
    }
}

// ---------------------------------------------------------------------------
// Friends and teams
// ---------------------------------------------------------------------------

fn draw_friends(f: &mut Frame, area: Rect, app: &App, page: &FriendsState) {
    let (tabs, body) = header_and_body(area, 2);
    f.render_widget(tab_switch(&tab_labels::<FriendsTab>(), page.tab.index()), tabs);

    let note = match page.tab {
        FriendsTab::Friends => None,
        FriendsTab::Requests => Some("wants to be friends"),
        FriendsTab::Submitted => Some("request sent"),
    };
    let lines = page
        .current(&app.fixtures)
        .iter()
        .enumerate()
        .map(|(i, u)| user_card(u, i == page.list.selected, note))
        .collect();
    draw_list(f, body, lines, page.list.selected, "Nobody here yet. a: add a friend");

    if let Some(modal) = &page.add_modal {
        draw_add_friend(f, area, app, page, modal);
    }
}

fn draw_add_friend(f: &mut Frame, area: Rect, app: &App, page: &FriendsState, modal: &AddFriendModal) {
    let rect = centered_rect(area, 52, 16);
    let results: Vec<Line> = modal
        .matches(&app.fixtures.users, &app.fixtures.me.id)
        .into_iter()
        .enumerate()
        .map(|(i, u)| {
            let note = page.sent.contains(&u.id).then_some("request sent");
            user_card(u, i == modal.list.selected, note)
        })
        .collect();

    let mut body = vec![
        Line::from(vec![
            Span::styled("Search: ", tone(Tone::Accent)),
            Span::raw(format!("{}▏", modal.query)),
        ]),
        Line::raw(""),
    ];
    if results.is_empty() {
        body.push(Line::styled("No users found", tone(Tone::Dim)));
    } else {
        // border, search line, spacer and hint take five rows
        body.extend(scrolled(results, modal.list.selected, rect.height.saturating_sub(5)));
    }

    f.render_widget(
        Modal {
            title: "Add friend",
            body,
            hint: "↑/↓: pick  Enter: send request  Esc: close",
            danger: false,
        },
        rect,
    );
}

fn draw_teams(f: &mut Frame, area: Rect, app: &App, page: &TeamsState) {
    let (tabs, body) = header_and_body(area, 2);
    f.render_widget(tab_switch(&tab_labels::<TeamsTab>(), page.tab.index()), tabs);

    let lines = page
        .current(&app.fixtures)
        .iter()
        .enumerate()
        .map(|(i, t)| team_card(t, i == page.list.selected))
        .collect();
    let empty = match page.tab {
        TeamsTab::Yours => "You are not in a team yet. c: create one",
        TeamsTab::Invitations => "No invitations",
    };
    draw_list(f, body, lines, page.list.selected, empty);

    if let Some(form) = &page.create {
        draw_form_modal(f, area, "Create team", form, app.settings.media_base());
    }
}

fn draw_team_page(f: &mut Frame, area: Rect, app: &App, page: &TeamPageState) {
    let Some(team) = page.team.as_ref() else {
        let msg = match (&page.last_error, page.loading) {
            (Some(err), _) => format!("Team load failed:\n{err}"),
            (None, true) => "Loading team...".to_string(),
            (None, false) => format!("Team {} not found", page.team_id),
        };
        draw_placeholder(f, area, &msg);
        return;
    };

    let (tabs, body) = header_and_body(area, 2);
    f.render_widget(tab_switch(&tab_labels::<TeamTab>(), page.tab.index()), tabs);

    match page.tab {
        TeamTab::Information => {
            let mut lines = vec![
                Line::styled(team.name.clone(), tone(Tone::Accent)),
                media_line("Logo", app.settings.media_base(), team.logo.as_deref()),
                Line::styled(format!("{} members", team.members.len()), tone(Tone::Dim)),
                Line::raw(""),
                Line::raw(team.description.clone()),
            ];
            if page.loading {
                lines.push(Line::raw(""));
                lines.push(Line::styled("Refreshing...", tone(Tone::Dim)));
            } else if let Some(err) = &page.last_error {
                lines.push(Line::raw(""));
                lines.push(Line::styled(format!("! Refresh failed: {err}"), tone(Tone::Danger)));
            }
            f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
        }
        TeamTab::Participants => {
            let lines = team
                .members
                .iter()
                .enumerate()
                .map(|(i, u)| user_card(u, i == page.list.selected, None))
                .collect();
            draw_list(f, body, lines, page.list.selected, "No members");
        }
    }
}

// ---------------------------------------------------------------------------
// Tournaments
// ---------------------------------------------------------------------------

fn draw_tournaments(f: &mut Frame, area: Rect, app: &App, page: &TournamentsState) {
    let (filters, body) = header_and_body(area, 2);

    let mut spans = vec![Span::styled("Status: ", tone(Tone::Dim))];
    for status in TournamentStatus::ALL {
        let style = if status == page.status { tone(Tone::Focus) } else { tone(Tone::Dim) };
        spans.push(Span::styled(format!(" {} ", status.label()), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("  Role: ", tone(Tone::Dim)));
    spans.push(Span::styled(page.role.label(), tone(Tone::Accent)));
    f.render_widget(Paragraph::new(Line::from(spans)), filters);

    let lines = page
        .visible(&app.fixtures)
        .iter()
        .enumerate()
        .map(|(i, t)| tournament_card(t, i == page.list.selected))
        .collect();
    draw_list(f, body, lines, page.list.selected, "No tournaments with this filter");
}

fn draw_tournament_page(f: &mut Frame, area: Rect, app: &App, page: &TournamentPageState) {
    let Some(t) = app.fixtures.tournament(&page.tournament_id) else {
        draw_placeholder(f, area, &format!("Tournament {} not found", page.tournament_id));
        return;
    };

    let [header, tabs, body] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(t.title.clone(), tone(Tone::Accent)),
                Span::styled(
                    format!("  {}", t.status.label()),
                    Style::default().fg(status_color(t.status)),
                ),
            ]),
            Line::styled(
                format!("{}   Stage: {}", format_starts_at(t.starts_at), page.stage.label()),
                tone(Tone::Dim),
            ),
        ]),
        header,
    );
    f.render_widget(tab_switch(&tab_labels::<TournamentTab>(), page.tab.index()), tabs);

    match page.tab {
        TournamentTab::Overview => draw_tournament_overview(f, body, app, t, page),
        TournamentTab::Bracket => draw_tournament_bracket(f, body, app, t, page),
        TournamentTab::Matches => draw_tournament_matches(f, body, app, t, page),
        TournamentTab::Participants => {
            let lines = t
                .participants
                .iter()
                .enumerate()
                .map(|(i, u)| user_card(u, i == page.participants.selected, None))
                .collect();
            draw_list(f, body, lines, page.participants.selected, "No participants yet");
        }
        TournamentTab::Prizes => draw_prizes(f, body, t),
    }

    if page.application.picker_open {
        draw_team_picker(f, area, app, page);
    }
}

fn draw_tournament_overview(
    f: &mut Frame,
    area: Rect,
    app: &App,
    t: &Tournament,
    page: &TournamentPageState,
) {
    let game = app.fixtures.game(&t.game_id).map_or("-", |g| g.title.as_str());
    let field = |label: &str, value: String| {
        Line::from(vec![Span::styled(format!("{label:<12}"), tone(Tone::Dim)), Span::raw(value)])
    };

    let mut lines = vec![
        field("Game", game.to_string()),
        field("Starts", format_starts_at(t.starts_at)),
        field("Format", if t.requires_team { "Teams" } else { "Solo" }.to_string()),
        field("Groups", if t.has_group_stage { "Yes" } else { "No" }.to_string()),
    ];
    if let Some(fund) = t.prize_fund {
        lines.push(field("Prize fund", format_prize(fund)));
    }
    if let Some(contact) = &t.contact {
        lines.push(field("Contact", contact.clone()));
    }
    if let Some(organizer) = &t.organizer {
        lines.push(field("Organizer", organizer.name.clone()));
    }
    lines.push(media_line("Image", app.settings.media_base(), t.image.as_deref()));
    lines.push(Line::raw(""));
    lines.push(Line::raw(t.description.clone()));
    lines.push(Line::raw(""));

    let label = if page.application.applied { "Cancel application" } else { "Apply" };
    lines.push(button_line(label, t.status == TournamentStatus::Open, true));
    if let Some(team) = page.applied_with.as_deref().and_then(|id| app.fixtures.team(id)) {
        lines.push(Line::styled(format!("Applied with {}", team.name), tone(Tone::Dim)));
    }
    if t.status != TournamentStatus::Open {
        lines.push(Line::styled("Applications are closed", tone(Tone::Dim)));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

/// Splits off the right side for the match card when one is open.
fn split_for_card(area: Rect, page: &TournamentPageState) -> (Rect, Option<Rect>) {
    if page.match_card().is_none() {
        return (area, None);
    }
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);
    (left, Some(right))
}

fn draw_tournament_bracket(
    f: &mut Frame,
    area: Rect,
    app: &App,
    t: &Tournament,
    page: &TournamentPageState,
) {
    if page.stage == StageFilter::Group {
        let Some(stage) = t.group_stage.as_ref().filter(|gs| !gs.groups.is_empty()) else {
            draw_placeholder(f, area, "Groups have not been drawn yet");
            return;
        };
        let mut y = area.y;
        for group in stage.groups.iter().skip(page.group) {
            if y >= area.bottom() {
                break;
            }
            let height = standings_height(group).min(area.bottom() - y);
            f.render_widget(
                StandingsTable { group, selected: None },
                Rect::new(area.x, y, area.width, height),
            );
            y = y.saturating_add(height + 1);
        }
        return;
    }

    let (main, card_area) = split_for_card(area, page);
    let columns = bracket_columns(t);
    if columns.is_empty() {
        draw_placeholder(f, main, "The bracket is empty");
    } else {
        let selected = locate(&columns, page.matches.selected);
        // the first row of the view holds column titles
        let body_height = main.height.saturating_sub(1);
        let scroll_offset = selected
            .and_then(|s| cell_center(&columns, s))
            .map_or(0, |center| (center + 2).saturating_sub(body_height));
        f.render_widget(BracketView { columns: &columns, selected, scroll_offset }, main);
    }

    if let Some(card_area) = card_area {
        draw_match_card(f, card_area, app, t, page);
    }
}

fn draw_tournament_matches(
    f: &mut Frame,
    area: Rect,
    app: &App,
    t: &Tournament,
    page: &TournamentPageState,
) {
    let (main, card_area) = split_for_card(area, page);
    let lines = page
        .stage_matches(t)
        .into_iter()
        .enumerate()
        .map(|(i, m)| match_row(m, i == page.matches.selected))
        .collect();
    draw_list(f, main, lines, page.matches.selected, "No matches in this stage. s: change stage");

    if let Some(card_area) = card_area {
        draw_match_card(f, card_area, app, t, page);
    }
}

fn draw_match_card(f: &mut Frame, area: Rect, app: &App, t: &Tournament, page: &TournamentPageState) {
    let Some(card) = page.match_card() else {
        return;
    };
    f.render_widget(Clear, area);
    let block = default_border(Color::Cyan)
        .title(" Match ")
        .title_bottom(Line::from(" Esc: close ").right_aligned());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(m) = t.find_match(&card.match_id) else {
        draw_placeholder(f, inner, "Match not found");
        return;
    };
    f.render_widget(
        MatchCardView {
            m,
            card,
            panel: panel_for(m, &app.viewer),
            media_base: app.settings.media_base(),
        },
        inner,
    );
}

fn draw_prizes(f: &mut Frame, area: Rect, t: &Tournament) {
    if t.status != TournamentStatus::Completed {
        draw_placeholder(f, area, "The tournament has not finished yet");
        return;
    }
    if t.prizes.is_empty() {
        draw_placeholder(f, area, "No prizes");
        return;
    }
    let lines: Vec<Line> = t
        .prizes
        .iter()
        .map(|p| {
            let style = if p.place == 1 { tone(Tone::Winner) } else { Style::default() };
            Line::styled(
                format!("{:>3}.  {:<24} {:>12}", p.place, p.participant.name, format_prize(p.prize)),
                style,
            )
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_team_picker(f: &mut Frame, area: Rect, app: &App, page: &TournamentPageState) {
    let teams = &app.fixtures.teams;
    let rect = centered_rect(area, 48, teams.len().max(1) as u16 + 4);
    let body: Vec<Line> = if teams.is_empty() {
        vec![Line::styled("You have no teams. Create one on the Teams page.", tone(Tone::Dim))]
    } else {
        teams
            .iter()
            .enumerate()
            .map(|(i, team)| {
                let picked = page.application.selected_team == Some(i);
                let radio = if picked { "(•) " } else { "( ) " };
                let style = if picked { tone(Tone::Accent) } else { Style::default() };
                Line::styled(format!("{radio}{}", team.name), style)
            })
            .collect()
    };
    f.render_widget(
        Modal {
            title: "Apply with team",
            body,
            hint: "j/k: pick  Enter: apply  Esc: cancel",
            danger: false,
        },
        rect,
    );
}

fn draw_new_tournament(f: &mut Frame, area: Rect, app: &App, form: &NewTournamentForm) {
    let game = app.fixtures.game(&form.game_id).map_or("-", |g| g.title.as_str());
    let (header, body) = header_and_body(area, 2);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Game: ", tone(Tone::Dim)),
            Span::styled(game.to_string(), tone(Tone::Accent)),
        ])),
        header,
    );
    f.render_widget(FormView { form, media_base: Some(app.settings.media_base()) }, body);
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

fn draw_my_profile(f: &mut Frame, area: Rect, app: &App, page: &MyProfileState) {
    let (tabs, body) = header_and_body(area, 2);
    f.render_widget(tab_switch(&tab_labels::<MyProfileSection>(), page.section.index()), tabs);
    let media_base = app.settings.media_base();

    match page.section {
        MyProfileSection::Settings => {
            let me = &app.fixtures.me;
            let (info, form) = header_and_body(body, 3);
            f.render_widget(
                Paragraph::new(vec![
                    Line::styled(me.name.clone(), tone(Tone::Accent)),
                    media_line("Avatar", media_base, me.avatar.as_deref()),
                ]),
                info,
            );
            f.render_widget(FormView { form: &page.settings, media_base: Some(media_base) }, form);
        }
        MyProfileSection::GameAccounts => {
            let lines = app
                .fixtures
                .game_accounts
                .iter()
                .enumerate()
                .map(|(i, a)| account_card(a, i == page.accounts.selected))
                .collect();
            draw_list(f, body, lines, page.accounts.selected, "No game accounts. a: add one");
        }
    }

    if let Some(form) = &page.account_form {
        draw_form_modal(f, area, "Add game account", form, media_base);
    }
}

fn draw_profile(f: &mut Frame, area: Rect, app: &App, page: &ProfileState) {
    let Some(user) = app.fixtures.user(&page.user_id) else {
        draw_placeholder(f, area, &format!("User {} not found", page.user_id));
        return;
    };

    let [info, tabs, body] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(area);

    let presence = if user.is_online {
        Span::styled("  online", Style::default().fg(Color::Green))
    } else {
        Span::styled("  offline", tone(Tone::Dim))
    };
    let action = match page.friend_action() {
        Some(action) => {
            let label = if page.pending { "Working..." } else { friend_action_label(action) };
            button_line(label, !page.pending, true)
        }
        None => Line::styled("Sent you a friend request", tone(Tone::Dim)),
    };
    f.render_widget(
        Paragraph::new(vec![
            Line::from(vec![Span::styled(user.name.clone(), tone(Tone::Accent)), presence]),
            media_line("Avatar", app.settings.media_base(), user.avatar.as_deref()),
            action,
        ]),
        info,
    );
    f.render_widget(tab_switch(&tab_labels::<ProfileTab>(), page.tab.index()), tabs);

    let selected = page.list.selected;
    match page.tab {
        ProfileTab::Information => {
            let registered = user
                .registered_on
                .map(|d| d.format("%d.%m.%Y").to_string())
                .unwrap_or_else(|| "-".to_string());
            f.render_widget(
                Paragraph::new(vec![
                    Line::from(vec![
                        Span::styled("Registered  ", tone(Tone::Dim)),
                        Span::raw(registered),
                    ]),
                    Line::from(vec![
                        Span::styled("Teams       ", tone(Tone::Dim)),
                        Span::raw(app.fixtures.teams_of(&user.id).len().to_string()),
                    ]),
                ]),
                body,
            );
        }
        ProfileTab::Teams => {
            let lines = app
                .fixtures
                .teams_of(&user.id)
                .into_iter()
                .enumerate()
                .map(|(i, t)| team_card(t, i == selected))
                .collect();
            draw_list(f, body, lines, selected, "No teams");
        }
        ProfileTab::Friends => {
            let lines = app
                .fixtures
                .friends
                .iter()
                .enumerate()
                .map(|(i, u)| user_card(u, i == selected, None))
                .collect();
            draw_list(f, body, lines, selected, "No friends");
        }
        ProfileTab::Tournaments => {
            let lines = app
                .fixtures
                .tournaments_of(&user.id)
                .iter()
                .enumerate()
                .map(|(i, t)| tournament_card(t, i == selected))
                .collect();
            draw_list(f, body, lines, selected, "No tournaments");
        }
    }
}

// ---------------------------------------------------------------------------
// Bars and overlays
// ---------------------------------------------------------------------------

fn page_hints(app: &App) -> &'static str {
    match &app.state.page {
        PageState::Home(_) => "j/k: move  Enter: open",
        PageState::Games(_) => "/: filter  Enter: open",
        PageState::AboutGame(_) => "Tab: tabs  s: status  n: new tournament",
        PageState::Friends(_) => "Tab: tabs  a: add friend  Enter: profile",
        PageState::Teams(_) => "Tab: tabs  c: create team  Enter: open",
        PageState::TeamPage(_) => "Tab: tabs  Enter: profile",
        PageState::Tournaments(_) => "h/l: status  r: role  Enter: open",
        PageState::TournamentPage(page) if page.match_card().is_some() => {
            "s: start  j/k: map  1/2: winner  u: url  f: finish  Esc: close"
        }
        PageState::TournamentPage(_) => "Tab: tabs  s: stage  a: apply  Enter: match",
        PageState::NewTournament(_) => "Tab: next field  ←/→: change  Enter on Create: submit",
        PageState::MyProfile(_) => "Tab: section  a: add account  d: delete",
        PageState::Profile(_) => "Tab: tabs  f: friend action  Enter: open",
        PageState::NotFound => "Backspace: back",
    }
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.state.prompt {
        Some(prompt) => Line::from(vec![
            Span::styled(":", tone(Tone::Accent)),
            Span::raw(format!("{prompt}▏")),
        ]),
        None => Line::from(vec![
            Span::styled(app.state.route.to_path(), tone(Tone::Accent)),
            Span::styled(format!("  {}  :: path  q: quit", page_hints(app)), tone(Tone::Dim)),
        ]),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let rows: [(&str, &str); 14] = [
        ("1-6", "jump to a section"),
        (":", "go to a path, e.g. /tournament/1"),
        ("Backspace", "back"),
        ("j/k ↑/↓", "move"),
        ("Tab/S-Tab", "switch tab"),
        ("Enter", "open / select"),
        ("Esc", "close dialog"),
        ("s", "stage or status filter"),
        ("a", "apply, add friend, add account"),
        ("1/2 ←/→", "map winner in a match"),
        ("u / f", "edit map URL / finish match"),
        ("\"", "toggle logs"),
        ("F", "toggle full screen"),
        ("q", "quit"),
    ];
    let body: Vec<Line> = rows
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:<12}"), tone(Tone::Accent)),
                Span::raw(*what),
            ])
        })
        .collect();
    let rect = centered_rect(area, 56, rows.len() as u16 + 3);
    f.render_widget(Modal { title: "Keys", body, hint: "?/Esc: close", danger: false }, rect);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray))
        .output_separator(' ')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false);
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
