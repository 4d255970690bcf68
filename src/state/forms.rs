use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ggforge_api::MatchFormat;
use std::fmt;

/// A form submission that failed local validation. Shown as a blocking alert.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    Required(&'static str),
    InvalidDate(String),
    InvalidTime(String),
    InvalidNumber { field: &'static str, value: String },
    PasswordMismatch,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Required(field) => write!(f, "{field} is required"),
            FormError::InvalidDate(value) => {
                write!(f, "Invalid date \"{value}\", expected DD.MM.YYYY")
            }
            FormError::InvalidTime(value) => write!(f, "Invalid time \"{value}\", expected HH:MM"),
            FormError::InvalidNumber { field, value } => {
                write!(f, "{field} must be a whole number, got \"{value}\"")
            }
            FormError::PasswordMismatch => write!(f, "New passwords do not match"),
        }
    }
}

impl std::error::Error for FormError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Text that is rendered masked.
    Secret,
    Multiline,
    Toggle,
    Choice,
    Submit,
}

/// Keyboard-driven form: one focused field at a time.
pub trait Form {
    fn fields(&self) -> Vec<(&'static str, FieldKind)>;
    fn focus(&self) -> usize;
    fn set_focus(&mut self, focus: usize);
    fn text_mut(&mut self, _field: usize) -> Option<&mut String> {
        None
    }
    fn toggle(&mut self, _field: usize) {}
    fn cycle(&mut self, _field: usize, _forward: bool) {}
    /// Current value of a field as shown to the user.
    fn value(&self, field: usize) -> String;

    fn focused_kind(&self) -> Option<FieldKind> {
        self.fields().get(self.focus()).map(|(_, kind)| *kind)
    }

    fn focus_next(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.set_focus((self.focus() + 1) % count);
        }
    }

    fn focus_prev(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.set_focus((self.focus() + count - 1) % count);
        }
    }

    /// The focused field accepts typed characters.
    fn is_typing(&self) -> bool {
        matches!(
            self.focused_kind(),
            Some(FieldKind::Text | FieldKind::Secret | FieldKind::Multiline)
        )
    }

    fn insert_char(&mut self, c: char) {
        let focus = self.focus();
        if let Some(text) = self.text_mut(focus) {
            text.push(c);
        }
    }

    fn delete_char(&mut self) {
        let focus = self.focus();
        if let Some(text) = self.text_mut(focus) {
            text.pop();
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Required(field));
    }
    Ok(value.to_string())
}

// ---------------------------------------------------------------------------
// New tournament
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayoffKind {
    #[default]
    Single,
    Double,
}

impl PlayoffKind {
    pub fn label(&self) -> &'static str {
        match self {
            PlayoffKind::Single => "Single elimination",
            PlayoffKind::Double => "Double elimination",
        }
    }
}

pub const FINAL_FORMATS: [MatchFormat; 3] = [MatchFormat::Bo1, MatchFormat::Bo3, MatchFormat::Bo5];

#[derive(Debug, Clone, PartialEq)]
pub struct NewTournamentForm {
    pub game_id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub contact: String,
    pub prize_fund: String,
    pub description: String,
    pub group_stage: bool,
    pub slots: u32,
    pub match_format: MatchFormat,
    pub playoff: PlayoffKind,
    pub final_format: MatchFormat,
    pub image_path: String,
    pub focus: usize,
}

/// A validated new tournament.
#[derive(Debug, Clone, PartialEq)]
pub struct TournamentDraft {
    pub game_id: String,
    pub title: String,
    pub starts_at: NaiveDateTime,
    pub contact: String,
    pub prize_fund: Option<u64>,
    pub description: String,
    pub group_stage: bool,
    pub slots: u32,
    pub match_format: MatchFormat,
    pub playoff: PlayoffKind,
    pub final_format: MatchFormat,
    pub image_path: Option<String>,
}

impl NewTournamentForm {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            title: String::new(),
            date: String::new(),
            time: String::new(),
            contact: String::new(),
            prize_fund: String::new(),
            description: String::new(),
            group_stage: false,
            slots: 4,
            match_format: MatchFormat::Bo1,
            playoff: PlayoffKind::Single,
            final_format: MatchFormat::Bo1,
            image_path: String::new(),
            focus: 0,
        }
    }

    pub fn slot_options(&self) -> Vec<u32> {
        if self.group_stage {
            (4..=32).step_by(2).collect()
        } else {
            vec![4, 8, 16, 32]
        }
    }

    pub fn match_format_options(&self) -> &'static [MatchFormat] {
        if self.group_stage {
            &[MatchFormat::Bo1, MatchFormat::Bo2, MatchFormat::Bo3]
        } else {
            &[MatchFormat::Bo1, MatchFormat::Bo3]
        }
    }

    pub fn set_group_stage(&mut self, group_stage: bool) {
        self.group_stage = group_stage;
        if !self.slot_options().contains(&self.slots) {
            self.slots = 4;
        }
        if !self.match_format_options().contains(&self.match_format) {
            self.match_format = MatchFormat::Bo1;
        }
    }

    pub fn validate(&self) -> Result<TournamentDraft, FormError> {
        let title = required(&self.title, "Title")?;
        let date_str = required(&self.date, "Date")?;
        let date = NaiveDate::parse_from_str(&date_str, "%d.%m.%Y")
            .map_err(|_| FormError::InvalidDate(date_str.clone()))?;
        let time_str = required(&self.time, "Start time")?;
        let time = NaiveTime::parse_from_str(&time_str, "%H:%M")
            .map_err(|_| FormError::InvalidTime(time_str.clone()))?;
        let contact = required(&self.contact, "Contact")?;
        let prize = self.prize_fund.trim().replace([',', ' '], "");
        let prize_fund = if prize.is_empty() {
            None
        } else {
            Some(prize.parse::<u64>().map_err(|_| FormError::InvalidNumber {
                field: "Prize fund",
                value: self.prize_fund.trim().to_string(),
            })?)
        };

        Ok(TournamentDraft {
            game_id: self.game_id.clone(),
            title,
            starts_at: date.and_time(time),
            contact,
            prize_fund,
            description: self.description.trim().to_string(),
            group_stage: self.group_stage,
            slots: self.slots,
            match_format: self.match_format,
            playoff: self.playoff,
            final_format: self.final_format,
            image_path: Some(self.image_path.trim().to_string()).filter(|p| !p.is_empty()),
        })
    }
}

fn cycle_in<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let Some(idx) = options.iter().position(|o| *o == current) else {
        return options.first().copied().unwrap_or(current);
    };
    let len = options.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    options[next]
}

impl Form for NewTournamentForm {
    fn fields(&self) -> Vec<(&'static str, FieldKind)> {
        vec![
            ("Title", FieldKind::Text),
            ("Date (DD.MM.YYYY)", FieldKind::Text),
            ("Start time (HH:MM)", FieldKind::Text),
            ("Contact", FieldKind::Text),
            ("Prize fund", FieldKind::Text),
            ("Description", FieldKind::Multiline),
            ("Group stage", FieldKind::Toggle),
            ("Participants", FieldKind::Choice),
            ("Match format", FieldKind::Choice),
            ("Playoff", FieldKind::Choice),
            ("Final format", FieldKind::Choice),
            ("Image", FieldKind::Text),
            ("Create", FieldKind::Submit),
        ]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus;
    }

    fn text_mut(&mut self, field: usize) -> Option<&mut String> {
        match field {
            0 => Some(&mut self.title),
            1 => Some(&mut self.date),
            2 => Some(&mut self.time),
            3 => Some(&mut self.contact),
            4 => Some(&mut self.prize_fund),
            5 => Some(&mut self.description),
            11 => Some(&mut self.image_path),
            _ => None,
        }
    }

    fn toggle(&mut self, field: usize) {
        if field == 6 {
            self.set_group_stage(!self.group_stage);
        }
    }

    fn cycle(&mut self, field: usize, forward: bool) {
        match field {
            6 => self.toggle(field),
            7 => self.slots = cycle_in(&self.slot_options(), self.slots, forward),
            8 => {
                self.match_format = cycle_in(self.match_format_options(), self.match_format, forward)
            }
            9 => {
                self.playoff = cycle_in(
                    &[PlayoffKind::Single, PlayoffKind::Double],
                    self.playoff,
                    forward,
                )
            }
            10 => self.final_format = cycle_in(&FINAL_FORMATS, self.final_format, forward),
            _ => {}
        }
    }

    fn value(&self, field: usize) -> String {
        match field {
            0 => self.title.clone(),
            1 => self.date.clone(),
            2 => self.time.clone(),
            3 => self.contact.clone(),
            4 => self.prize_fund.clone(),
            5 => self.description.clone(),
            6 => if self.group_stage { "yes" } else { "no" }.to_string(),
            7 => self.slots.to_string(),
            8 => self.match_format.to_string(),
            9 => self.playoff.label().to_string(),
            10 => self.final_format.to_string(),
            11 => self.image_path.clone(),
            _ => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Create team
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamForm {
    pub name: String,
    pub description: String,
    pub logo_path: String,
    pub focus: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamDraft {
    pub name: String,
    pub description: String,
    pub logo_path: Option<String>,
}

impl TeamForm {
    pub fn validate(&self) -> Result<TeamDraft, FormError> {
        Ok(TeamDraft {
            name: required(&self.name, "Team name")?,
            description: self.description.trim().to_string(),
            logo_path: Some(self.logo_path.trim().to_string()).filter(|p| !p.is_empty()),
        })
    }
}

impl Form for TeamForm {
    fn fields(&self) -> Vec<(&'static str, FieldKind)> {
        vec![
            ("Logo", FieldKind::Text),
            ("Team name", FieldKind::Text),
            ("Description", FieldKind::Multiline),
            ("Create", FieldKind::Submit),
        ]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus;
    }

    fn text_mut(&mut self, field: usize) -> Option<&mut String> {
        match field {
            0 => Some(&mut self.logo_path),
            1 => Some(&mut self.name),
            2 => Some(&mut self.description),
            _ => None,
        }
    }

    fn value(&self, field: usize) -> String {
        match field {
            0 => self.logo_path.clone(),
            1 => self.name.clone(),
            2 => self.description.clone(),
            _ => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsForm {
    pub avatar_path: String,
    pub name: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub focus: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsUpdate {
    pub name: String,
    pub avatar_path: Option<String>,
    pub password_changed: bool,
}

impl SettingsForm {
    pub fn validate(&self) -> Result<SettingsUpdate, FormError> {
        let name = required(&self.name, "Name")?;
        let changing_password = !self.new_password.is_empty() || !self.confirm_password.is_empty();
        if changing_password {
            if self.new_password != self.confirm_password {
                return Err(FormError::PasswordMismatch);
            }
            required(&self.current_password, "Current password")?;
        }
        Ok(SettingsUpdate {
            name,
            avatar_path: Some(self.avatar_path.trim().to_string()).filter(|p| !p.is_empty()),
            password_changed: changing_password,
        })
    }

    pub fn clear_passwords(&mut self) {
        self.current_password.clear();
        self.new_password.clear();
        self.confirm_password.clear();
    }
}

impl Form for SettingsForm {
    fn fields(&self) -> Vec<(&'static str, FieldKind)> {
        vec![
            ("Avatar", FieldKind::Text),
            ("Name", FieldKind::Text),
            ("Current password", FieldKind::Secret),
            ("New password", FieldKind::Secret),
            ("Repeat new password", FieldKind::Secret),
            ("Save", FieldKind::Submit),
        ]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus;
    }

    fn text_mut(&mut self, field: usize) -> Option<&mut String> {
        match field {
            0 => Some(&mut self.avatar_path),
            1 => Some(&mut self.name),
            2 => Some(&mut self.current_password),
            3 => Some(&mut self.new_password),
            4 => Some(&mut self.confirm_password),
            _ => None,
        }
    }

    fn value(&self, field: usize) -> String {
        match field {
            0 => self.avatar_path.clone(),
            1 => self.name.clone(),
            2 => self.current_password.clone(),
            3 => self.new_password.clone(),
            4 => self.confirm_password.clone(),
            _ => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Game account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameAccountForm {
    /// Titles offered by the game picker.
    pub games: Vec<String>,
    pub game: usize,
    pub nickname: String,
    pub focus: usize,
}

impl GameAccountForm {
    pub fn new(games: Vec<String>) -> Self {
        Self { games, ..Default::default() }
    }

    /// Returns (game title, nickname).
    pub fn validate(&self) -> Result<(String, String), FormError> {
        let game = self
            .games
            .get(self.game)
            .cloned()
            .ok_or(FormError::Required("Game"))?;
        Ok((game, required(&self.nickname, "Nickname")?))
    }
}

impl Form for GameAccountForm {
    fn fields(&self) -> Vec<(&'static str, FieldKind)> {
        vec![
            ("Game", FieldKind::Choice),
            ("Nickname", FieldKind::Text),
            ("Add", FieldKind::Submit),
        ]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus;
    }

    fn text_mut(&mut self, field: usize) -> Option<&mut String> {
        (field == 1).then_some(&mut self.nickname)
    }

    fn cycle(&mut self, field: usize, forward: bool) {
        let len = self.games.len();
        if field == 0 && len > 0 {
            self.game = if forward { (self.game + 1) % len } else { (self.game + len - 1) % len };
        }
    }

    fn value(&self, field: usize) -> String {
        match field {
            0 => self.games.get(self.game).cloned().unwrap_or_default(),
            1 => self.nickname.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> NewTournamentForm {
        NewTournamentForm {
            title: "Winter Cup".into(),
            date: "12.12.2025".into(),
            time: "17:00".into(),
            contact: "@admin".into(),
            prize_fund: "1 000 000".into(),
            ..NewTournamentForm::new("1")
        }
    }

    #[test]
    fn new_tournament_validates_required_fields() {
        let draft = filled().validate().unwrap();
        assert_eq!(draft.prize_fund, Some(1_000_000));
        assert_eq!(
            draft.starts_at.format("%d.%m.%Y | %H:%M").to_string(),
            "12.12.2025 | 17:00"
        );
        assert!(draft.image_path.is_none());

        let no_title = NewTournamentForm { title: "  ".into(), ..filled() };
        assert_eq!(no_title.validate(), Err(FormError::Required("Title")));
        let bad_date = NewTournamentForm { date: "2025-12-12".into(), ..filled() };
        assert_eq!(bad_date.validate(), Err(FormError::InvalidDate("2025-12-12".into())));
        let bad_time = NewTournamentForm { time: "25:00".into(), ..filled() };
        assert_eq!(bad_time.validate(), Err(FormError::InvalidTime("25:00".into())));
        let no_contact = NewTournamentForm { contact: String::new(), ..filled() };
        assert_eq!(no_contact.validate(), Err(FormError::Required("Contact")));
        let bad_prize = NewTournamentForm { prize_fund: "lots".into(), ..filled() };
        assert!(matches!(bad_prize.validate(), Err(FormError::InvalidNumber { .. })));
        let no_prize = NewTournamentForm { prize_fund: String::new(), ..filled() };
        assert_eq!(no_prize.validate().unwrap().prize_fund, None);
    }

    #[test]
    fn group_stage_changes_slot_and_format_choices() {
        let mut form = NewTournamentForm::new("1");
        assert_eq!(form.slot_options(), vec![4, 8, 16, 32]);
        form.cycle(7, true);
        assert_eq!(form.slots, 8);

        form.toggle(6);
        assert!(form.group_stage);
        assert_eq!(form.slot_options().len(), 15);
        form.cycle(7, true);
        assert_eq!(form.slots, 10);
        form.cycle(8, false);
        assert_eq!(form.match_format, MatchFormat::Bo3);
        form.cycle(8, false);
        assert_eq!(form.match_format, MatchFormat::Bo2);

        form.toggle(6);
        assert_eq!(form.slots, 4);
        assert_eq!(form.match_format, MatchFormat::Bo1);
    }

    #[test]
    fn focus_wraps_and_typing_goes_to_focused_field() {
        let mut form = TeamForm::default();
        form.focus_prev();
        assert_eq!(form.focused_kind(), Some(FieldKind::Submit));
        assert!(!form.is_typing());
        form.focus_next();
        form.focus_next();
        for c in "Owls".chars() {
            form.insert_char(c);
        }
        form.delete_char();
        assert_eq!(form.name, "Owl");
        assert_eq!(form.validate().unwrap().name, "Owl");
        assert_eq!(TeamForm::default().validate(), Err(FormError::Required("Team name")));
    }

    #[test]
    fn settings_reject_mismatched_passwords() {
        let form = SettingsForm {
            name: "nova".into(),
            current_password: "old".into(),
            new_password: "secret1".into(),
            confirm_password: "secret2".into(),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err, FormError::PasswordMismatch);
        assert_eq!(err.to_string(), "New passwords do not match");

        let ok = SettingsForm { confirm_password: "secret1".into(), ..form.clone() };
        assert!(ok.validate().unwrap().password_changed);

        let name_only = SettingsForm { name: "nova".into(), ..Default::default() };
        assert!(!name_only.validate().unwrap().password_changed);
    }

    #[test]
    fn game_account_needs_nickname() {
        let mut form = GameAccountForm::new(vec!["Dota 2".into(), "Valorant".into()]);
        form.cycle(0, false);
        assert_eq!(form.game, 1);
        assert_eq!(form.validate(), Err(FormError::Required("Nickname")));
        form.nickname = "Ace".into();
        assert_eq!(form.validate().unwrap(), ("Valorant".to_string(), "Ace".to_string()));
    }
}
