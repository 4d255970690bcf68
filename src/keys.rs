use crate::app::App;
use crate::state::app_state::{MyProfileSection, PageState, TournamentTab};
use crate::state::forms::FieldKind;
use crate::state::match_card::Slot;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// What the main loop should do after a key press.
#[derive(Debug, PartialEq)]
pub enum KeyOutcome {
    Handled(Vec<NetworkRequest>),
    Quit,
}

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let outcome = handle_key(&mut guard, key_event);
    drop(guard);

    match outcome {
        KeyOutcome::Quit => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }
        KeyOutcome::Handled(requests) => {
            for request in requests {
                let _ = network_requests.send(request).await;
            }
        }
    }
}

/// Modal layers first (alert, path prompt, text entry), then global keys, then the page.
pub fn handle_key(app: &mut App, key_event: KeyEvent) -> KeyOutcome {
    let (code, modifiers) = (key_event.code, key_event.modifiers);
    let none = || KeyOutcome::Handled(Vec::new());

    if let (Char('c'), KeyModifiers::CONTROL) = (code, modifiers) {
        return KeyOutcome::Quit;
    }

    if app.state.alert.is_some() {
        if matches!(code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
        return none();
    }

    if let Some(prompt) = app.state.prompt.as_mut() {
        match code {
            Char(c) => prompt.push(c),
            KeyCode::Backspace => {
                prompt.pop();
            }
            KeyCode::Enter => {
                let path = prompt.trim().to_string();
                app.state.prompt = None;
                if !path.is_empty() {
                    return KeyOutcome::Handled(app.navigate_path(&path));
                }
            }
            KeyCode::Esc => app.state.prompt = None,
            _ => {}
        }
        return none();
    }

    if let Some(outcome) = handle_text_entry(app, code) {
        return outcome;
    }
    if let Some(outcome) = handle_form(app, code) {
        return outcome;
    }

    if app.state.show_help {
        if matches!(code, KeyCode::Esc | Char('?')) {
            app.toggle_help();
        }
        return none();
    }

    let card_open =
        matches!(&app.state.page, PageState::TournamentPage(page) if page.match_card().is_some());

    match code {
        Char('q') => return KeyOutcome::Quit,
        Char(c @ '1'..='6') if !card_open => {
            let index = c as usize - '1' as usize;
            return KeyOutcome::Handled(app.jump_to_section(index));
        }
        Char(':') => {
            app.state.prompt = Some(String::new());
            return none();
        }
        KeyCode::Backspace => return KeyOutcome::Handled(app.go_back()),
        Char('"') => {
            app.toggle_show_logs();
            return none();
        }
        Char('?') => {
            app.toggle_help();
            return none();
        }
        Char('F') => {
            app.toggle_full_screen();
            return none();
        }
        KeyCode::Tab => {
            app.switch_tab(true);
            return none();
        }
        KeyCode::BackTab => {
            app.switch_tab(false);
            return none();
        }
        Char('j') | KeyCode::Down => {
            app.move_selection(true);
            return none();
        }
        Char('k') | KeyCode::Up => {
            app.move_selection(false);
            return none();
        }
        _ => {}
    }

    KeyOutcome::Handled(handle_page_key(app, code))
}

/// Free-text inputs that are not forms: game filter, friend search, map URL.
fn handle_text_entry(app: &mut App, code: KeyCode) -> Option<KeyOutcome> {
    let none = || Some(KeyOutcome::Handled(Vec::new()));

    if let Some(url) = app.editing_url_mut() {
        match code {
            Char(c) => url.push(c),
            KeyCode::Backspace => {
                url.pop();
            }
            KeyCode::Enter | KeyCode::Esc => app.stop_url_editing(),
            _ => {}
        }
        return none();
    }

    if let Some(page) = app.games_filter_mut() {
        match code {
            Char(c) => page.filter.push(c),
            KeyCode::Backspace => {
                page.filter.pop();
            }
            KeyCode::Enter | KeyCode::Esc => page.filtering = false,
            _ => {}
        }
        page.list = Default::default();
        return none();
    }

    if let Some(modal) = app.add_friend_query_mut() {
        match code {
            Char(c) => {
                modal.query.push(c);
                modal.list = Default::default();
            }
            KeyCode::Backspace => {
                modal.query.pop();
                modal.list = Default::default();
            }
            KeyCode::Esc => app.close_add_friend(),
            KeyCode::Down => app.move_selection(true),
            KeyCode::Up => app.move_selection(false),
            KeyCode::Enter => return Some(KeyOutcome::Handled(app.send_friend_request())),
            _ => {}
        }
        return none();
    }

    None
}

/// Keys for the focused form. Returns `None` to let global keys through.
fn handle_form(app: &mut App, code: KeyCode) -> Option<KeyOutcome> {
    let modal = app.form_is_modal();
    let new_tournament = matches!(app.state.page, PageState::NewTournament(_));
    let form = app.active_form()?;
    let kind = form.focused_kind()?;
    let typing = form.is_typing();

    match (code, kind) {
        (KeyCode::Esc, _) => {
            if modal {
                app.close_modal_form();
                return Some(KeyOutcome::Handled(Vec::new()));
            }
            return Some(KeyOutcome::Handled(app.go_back()));
        }
        (KeyCode::Down, _) => form.focus_next(),
        (KeyCode::Up, _) => form.focus_prev(),
        (KeyCode::Tab, _) if modal || new_tournament => form.focus_next(),
        (KeyCode::BackTab, _) if modal || new_tournament => form.focus_prev(),
        (KeyCode::Enter, FieldKind::Multiline) => form.insert_char('\n'),
        (KeyCode::Enter, FieldKind::Submit) => return Some(KeyOutcome::Handled(app.submit_form())),
        (KeyCode::Enter, FieldKind::Toggle) | (Char(' '), FieldKind::Toggle) => {
            let focus = form.focus();
            form.toggle(focus);
        }
        (KeyCode::Enter, _) => form.focus_next(),
        (KeyCode::Left | Char('h'), FieldKind::Choice | FieldKind::Toggle) => {
            let focus = form.focus();
            form.cycle(focus, false);
        }
        (KeyCode::Right | Char('l') | Char(' '), FieldKind::Choice | FieldKind::Toggle) => {
            let focus = form.focus();
            form.cycle(focus, true);
        }
        (Char('j'), _) if !typing => form.focus_next(),
        (Char('k'), _) if !typing => form.focus_prev(),
        (Char(c), _) if typing => form.insert_char(c),
        (KeyCode::Backspace, _) if typing => form.delete_char(),
        _ if modal => {}
        _ => return None,
    }
    Some(KeyOutcome::Handled(Vec::new()))
}

fn handle_page_key(app: &mut App, code: KeyCode) -> Vec<NetworkRequest> {
    match &app.state.page {
        PageState::Games(_) => match code {
            Char('/') => app.start_games_filter(),
            KeyCode::Enter => return app.activate(),
            _ => {}
        },
        PageState::AboutGame(_) => match code {
            Char('s') => app.cycle_game_status_filter(),
            Char('n') => return app.new_tournament_for_game(),
            KeyCode::Enter => return app.activate(),
            _ => {}
        },
        PageState::Friends(_) => match code {
            Char('a') => app.open_add_friend(),
            KeyCode::Enter => return app.activate(),
            _ => {}
        },
        PageState::Teams(_) => match code {
            Char('c') => app.open_create_team(),
            KeyCode::Enter => return app.activate(),
            _ => {}
        },
        PageState::Tournaments(_) => match code {
            Char('s') | KeyCode::Right | Char('l') => app.cycle_tournaments_status(true),
            KeyCode::Left | Char('h') => app.cycle_tournaments_status(false),
            Char('r') => app.toggle_tournaments_role(),
            KeyCode::Enter => return app.activate(),
            _ => {}
        },
        PageState::TournamentPage(page) => {
            let card_open = page.match_card().is_some();
            let picker_open = page.application.picker_open;
            let tab = page.tab;
            if picker_open {
                match code {
                    KeyCode::Enter => return app.confirm_team_pick(),
                    KeyCode::Esc => app.close_team_picker(),
                    _ => {}
                }
            } else if card_open {
                match code {
                    Char('s') => return app.start_match(),
                    Char('f') => return app.finish_match(),
                    Char('u') => app.toggle_url_editing(),
                    Char('1') | KeyCode::Left => app.set_map_winner(Slot::First),
                    Char('2') | KeyCode::Right => app.set_map_winner(Slot::Second),
                    KeyCode::Esc => app.close_match_card(),
                    _ => {}
                }
            } else {
                match (code, tab) {
                    (Char('a'), _) => return app.apply_to_tournament(),
                    (Char('s'), _) => app.cycle_stage(),
                    (KeyCode::Enter, TournamentTab::Matches | TournamentTab::Bracket) => {
                        app.open_match_card()
                    }
                    (KeyCode::Enter, _) => return app.activate(),
                    _ => {}
                }
            }
        }
        PageState::MyProfile(page) if page.section == MyProfileSection::GameAccounts => {
            match code {
                Char('a') => app.open_account_form(),
                Char('d') | KeyCode::Delete => app.delete_game_account(),
                _ => {}
            }
        }
        PageState::Profile(_) => match code {
            Char('f') => return app.profile_friend_action(),
            KeyCode::Enter => return app.activate(),
            _ => {}
        },
        PageState::Home(_) | PageState::TeamPage(_) => {
            if code == KeyCode::Enter {
                return app.activate();
            }
        }
        _ => {}
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::Route;
    use crate::state::app_settings::AppSettings;
    use ggforge_api::fixtures::Fixtures;

    fn press(app: &mut App, code: KeyCode) -> KeyOutcome {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, Char(c));
        }
    }

    #[test]
    fn alert_swallows_keys_until_dismissed() {
        let mut app = App::new(AppSettings::default(), Fixtures::sample());
        app.state.alert = Some(crate::state::app_state::AlertState::error("boom"));
        assert_eq!(press(&mut app, Char('q')), KeyOutcome::Handled(vec![]));
        assert_eq!(press(&mut app, Char('2')), KeyOutcome::Handled(vec![]));
        assert_eq!(app.state.route, Route::Home);
        press(&mut app, KeyCode::Enter);
        assert!(app.state.alert.is_none());
        assert_eq!(press(&mut app, Char('q')), KeyOutcome::Quit);
    }

    #[test]
    fn path_prompt_navigates_and_backspace_returns() {
        let mut app = App::new(AppSettings::default(), Fixtures::sample());
        press(&mut app, Char(':'));
        type_str(&mut app, "/games/3");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.route, Route::AboutGame { id: "3".into() });
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.state.route, Route::Home);
    }

    #[test]
    fn typing_in_form_does_not_trigger_global_keys() {
        let mut app = App::new(AppSettings::default(), Fixtures::sample());
        app.navigate_path("/newtournament?game=1");
        type_str(&mut app, "q1");
        let PageState::NewTournament(form) = &app.state.page else { panic!("left the form") };
        assert_eq!(form.title, "q1");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.route, Route::Home);
    }

    #[test]
    fn sections_jump_by_number() {
        let mut app = App::new(AppSettings::default(), Fixtures::sample());
        press(&mut app, Char('3'));
        assert_eq!(app.state.route.to_path(), "/tournaments?tournament=open&organizer=manager");
        press(&mut app, Char('5'));
        assert_eq!(app.state.route, Route::Friends);
    }
}
