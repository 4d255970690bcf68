use tui::buffer::Buffer;
use tui::layout::{Alignment, Rect};
use tui::style::{Modifier, Style};
use tui::text::Line;
use tui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Widget, Wrap};

use crate::components::theme::{Tone, tone};
use crate::state::forms::{FieldKind, Form};
use ggforge_api::media_url;

const LABEL_WIDTH: usize = 22;

/// Fields whose value is a media path; the resolved URL is previewed next to it.
const MEDIA_FIELDS: [&str; 3] = ["Avatar", "Logo", "Image"];

/// Renders any [`Form`] as one line per field, highlighting the focused one.
pub struct FormView<'a> {
    pub form: &'a dyn Form,
    /// Enables the resolved-URL preview on media fields.
    pub media_base: Option<&'a str>,
}

impl<'a> Widget for FormView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let focus = self.form.focus();
        for (i, (label, kind)) in self.form.fields().into_iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let focused = i == focus;
            let value = self.form.value(i);
            let shown = match kind {
                FieldKind::Text => value.clone(),
                FieldKind::Secret => "•".repeat(value.chars().count()),
                FieldKind::Multiline => value.replace('\n', " ↵ "),
                FieldKind::Toggle => {
                    if value == "yes" { "[x]" } else { "[ ]" }.to_string()
                }
                FieldKind::Choice => format!("‹ {value} ›"),
                FieldKind::Submit => String::new(),
            };

            let line = if kind == FieldKind::Submit {
                format!("{:LABEL_WIDTH$}[ {label} ]", "")
            } else {
                let cursor = if focused && is_text(kind) { "▏" } else { "" };
                format!("{label:<LABEL_WIDTH$}{shown}{cursor}")
            };
            let style = if focused { tone(Tone::Focus) } else { Style::default() };
            let text: String = line.chars().take(area.width as usize).collect();
            let used = text.chars().count() as u16;
            buf.set_string(area.x, y, &text, style);

            if let Some(base) = self.media_base
                && MEDIA_FIELDS.contains(&label)
                && !value.trim().is_empty()
                && used + 4 < area.width
            {
                let preview = format!("  → {}", media_url(base, Some(&value)));
                let room = (area.width - used) as usize;
                let preview: String = preview.chars().take(room).collect();
                buf.set_string(area.x + used, y, preview, tone(Tone::Dim));
            }
        }
    }
}

fn is_text(kind: FieldKind) -> bool {
    matches!(kind, FieldKind::Text | FieldKind::Secret | FieldKind::Multiline)
}

/// Lines a form needs.
pub fn form_height(form: &dyn Form) -> u16 {
    form.fields().len() as u16
}

/// Inner tab switch shown at the top of a page.
pub fn tab_switch<'a>(labels: &[&'a str], selected: usize) -> Tabs<'a> {
    Tabs::new(labels.iter().map(|l| Line::from(*l)).collect::<Vec<_>>())
        .select(selected)
        .style(tone(Tone::Dim))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
        .divider("│")
}

/// A modal dialog box: clears what is below, then draws a bordered body.
pub struct Modal<'a> {
    pub title: &'a str,
    pub body: Vec<Line<'a>>,
    pub hint: &'a str,
    pub danger: bool,
}

impl<'a> Widget for Modal<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let border = if self.danger { tone(Tone::Danger) } else { tone(Tone::Accent) };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(tui::widgets::BorderType::Rounded)
            .border_style(border)
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 {
            return;
        }

        let body_area = Rect { height: inner.height.saturating_sub(1), ..inner };
        Paragraph::new(self.body).wrap(Wrap { trim: true }).render(body_area, buf);

        let hint_area = Rect { y: inner.y + inner.height - 1, height: 1, ..inner };
        Paragraph::new(self.hint)
            .style(tone(Tone::Dim))
            .alignment(Alignment::Right)
            .render(hint_area, buf);
    }
}

/// A labelled action that may be greyed out.
pub fn button_line(label: &str, enabled: bool, focused: bool) -> Line<'static> {
    let style = match (enabled, focused) {
        (false, _) => tone(Tone::Dim),
        (true, true) => tone(Tone::Focus),
        (true, false) => tone(Tone::Accent),
    };
    Line::styled(format!("[ {label} ]"), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::{NewTournamentForm, SettingsForm};

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn secrets_are_masked_and_focus_is_marked() {
        let form = SettingsForm {
            name: "iburdinova".into(),
            new_password: "hunter2".into(),
            focus: 1,
            ..Default::default()
        };
        let area = Rect::new(0, 0, 50, form_height(&form));
        let mut buf = Buffer::empty(area);
        FormView { form: &form, media_base: None }.render(area, &mut buf);

        assert!(row(&buf, 1).contains("iburdinova▏"));
        assert_eq!(buf[(0, 1)].bg, tone(Tone::Focus).bg.unwrap());
        assert!(row(&buf, 3).contains("•••••••"));
        assert!(!row(&buf, 3).contains("hunter2"));
        assert!(row(&buf, 5).contains("[ Save ]"));
    }

    #[test]
    fn toggles_choices_and_media_preview() {
        let mut form = NewTournamentForm::new("1");
        form.set_group_stage(true);
        form.image_path = "uploads/cup.png".into();
        form.focus = 0;
        let area = Rect::new(0, 0, 80, form_height(&form));
        let mut buf = Buffer::empty(area);
        FormView { form: &form, media_base: Some("http://api.local") }.render(area, &mut buf);

        assert!(row(&buf, 6).contains("[x]"));
        assert!(row(&buf, 7).contains("‹ 4 ›"));
        assert!(row(&buf, 11).contains("http://api.local/uploads/cup.png"));
    }
}
