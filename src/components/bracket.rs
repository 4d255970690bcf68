use ggforge_api::{
    Group, Match, MatchStatus, Participant, RowBand, StandingsRow, Tournament, row_band,
};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

use crate::components::theme::{Tone, tone};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per match cell: participant 1, status line, participant 2.
pub const MATCH_HEIGHT: u16 = 3;

/// Blank rows between two cells of the same column.
pub const MATCH_GAP: u16 = 1;

/// Width of the connector zone drawn between adjacent columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Maximum match cell width in wider terminals.
const CELL_W_FULL: u16 = 24;

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// One vertical column of the playoff bracket.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketColumn<'a> {
    pub title: String,
    pub matches: Vec<&'a Match>,
}

/// Playoff rounds in the order supplied, then a single "Final" column if the
/// tournament has a final match. The structure is never recomputed here.
pub fn bracket_columns(t: &Tournament) -> Vec<BracketColumn<'_>> {
    let mut columns: Vec<BracketColumn> = t
        .playoff
        .rounds
        .iter()
        .map(|round| BracketColumn {
            title: format!("Round {}", round.label),
            matches: round.matches.iter().collect(),
        })
        .collect();
    if let Some(final_match) = &t.final_match {
        columns.push(BracketColumn { title: "Final".to_string(), matches: vec![final_match] });
    }
    columns
}

/// Every bracket match, column by column.
pub fn bracket_matches<'a>(columns: &[BracketColumn<'a>]) -> Vec<&'a Match> {
    columns.iter().flat_map(|c| c.matches.iter().copied()).collect()
}

/// Column and row of the `index`-th match of [`bracket_matches`].
pub fn locate(columns: &[BracketColumn], index: usize) -> Option<(usize, usize)> {
    let mut rest = index;
    for (c, column) in columns.iter().enumerate() {
        if rest < column.matches.len() {
            return Some((c, rest));
        }
        rest -= column.matches.len();
    }
    None
}

/// Body row at the center of a cell, for scrolling it into view.
pub fn cell_center(columns: &[BracketColumn], (column, row): (usize, usize)) -> Option<u16> {
    let counts: Vec<usize> = columns.iter().map(|c| c.matches.len()).collect();
    column_centers(&counts).get(column)?.get(row).copied()
}

/// Center row of every cell, per column. Each column's cells are spread so that
/// a cell sits halfway between the two it follows from, when counts halve.
fn column_centers(counts: &[usize]) -> Vec<Vec<u16>> {
    let mut centers: Vec<Vec<u16>> = Vec::with_capacity(counts.len());
    for (c, &count) in counts.iter().enumerate() {
        let column = match c.checked_sub(1).and_then(|p| centers.get(p)) {
            Some(prev) if count > 0 && prev.len() == count * 2 => (0..count)
                .map(|i| (prev[2 * i] + prev[2 * i + 1]) / 2)
                .collect(),
            Some(prev) if count == 1 && !prev.is_empty() => {
                vec![(prev[0] + prev[prev.len() - 1]) / 2]
            }
            _ => (0..count)
                .map(|i| MATCH_HEIGHT / 2 + i as u16 * (MATCH_HEIGHT + MATCH_GAP))
                .collect(),
        };
        centers.push(column);
    }
    centers
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

/// Renders playoff columns left to right with box-drawing connectors.
pub struct BracketView<'a> {
    pub columns: &'a [BracketColumn<'a>],
    /// (column, match) of the highlighted cell.
    pub selected: Option<(usize, usize)>,
    pub scroll_offset: u16,
}

impl<'a> Widget for BracketView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.columns.is_empty() || area.width < 12 || area.height < MATCH_HEIGHT + 1 {
            return;
        }

        let cols = self.columns.len() as u16;
        let per_col = area
            .width
            .saturating_sub(CONNECTOR_WIDTH * cols.saturating_sub(1))
            / cols;
        let cell_width = per_col.clamp(8, CELL_W_FULL);
        let stride = cell_width + CONNECTOR_WIDTH;

        let counts: Vec<usize> = self.columns.iter().map(|c| c.matches.len()).collect();
        let centers = column_centers(&counts);

        // Header row: column titles.
        for (c, column) in self.columns.iter().enumerate() {
            let x = area.x + c as u16 * stride;
            if x >= area.x + area.width {
                break;
            }
            let title: String = column.title.chars().take(cell_width as usize).collect();
            buf.set_string(x, area.y, title, tone(Tone::Accent));
        }
        let body = Rect::new(area.x, area.y + 1, area.width, area.height - 1);

        // Pass 1: match cells.
        for (c, column) in self.columns.iter().enumerate() {
            let x = body.x + c as u16 * stride;
            for (i, m) in column.matches.iter().enumerate() {
                let selected = self.selected == Some((c, i));
                draw_match_cell(m, x, centers[c][i], cell_width, selected, body, self.scroll_offset, buf);
            }
        }

        // Pass 2: connectors where a column halves into the next.
        for c in 0..self.columns.len().saturating_sub(1) {
            let (children, parents) = (&centers[c], &centers[c + 1]);
            let conn_x = body.x + c as u16 * stride + cell_width;
            if children.len() == parents.len() * 2 {
                for (j, parent) in parents.iter().enumerate() {
                    draw_connector(children[2 * j], *parent, children[2 * j + 1], conn_x, body, self.scroll_offset, buf);
                }
            } else if parents.len() == 1 && !children.is_empty() {
                draw_connector(children[0], parents[0], children[children.len() - 1], conn_x, body, self.scroll_offset, buf);
            }
        }
    }
}

/// Convert a bracket-relative row to an absolute screen y, applying scroll + area bounds.
fn screen_y(bracket_row: u16, scroll: u16, area: Rect) -> Option<u16> {
    if bracket_row < scroll {
        return None;
    }
    let rel = bracket_row - scroll;
    if rel >= area.height {
        return None;
    }
    Some(area.y + rel)
}

#[allow(clippy::too_many_arguments)]
fn draw_match_cell(
    m: &Match,
    x: u16,
    center_row: u16,
    cell_width: u16,
    selected: bool,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    if x >= area.x + area.width {
        return;
    }
    let avail_w = (area.x + area.width).saturating_sub(x) as usize;
    let base_style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Gray)
    };
    let leader = leading_slot(m);

    let rows = [
        (center_row.saturating_sub(1), 0u8),
        (center_row, 1),
        (center_row.saturating_add(1), 2),
    ];
    for (bracket_row, slot) in rows {
        let Some(sy) = screen_y(bracket_row, scroll, area) else {
            continue;
        };
        let (content, style) = match slot {
            0 => (
                format_slot_line(m.participant1.as_ref(), m.score1, cell_width as usize),
                if m.status == MatchStatus::Completed && leader == Some(0) {
                    tone(Tone::Winner)
                } else {
                    base_style
                },
            ),
            2 => (
                format_slot_line(m.participant2.as_ref(), m.score2, cell_width as usize),
                if m.status == MatchStatus::Completed && leader == Some(1) {
                    tone(Tone::Winner)
                } else {
                    base_style
                },
            ),
            _ => (
                format_status_line(m, cell_width as usize),
                match m.status {
                    MatchStatus::Ongoing => tone(Tone::Live),
                    _ => tone(Tone::Dim),
                },
            ),
        };
        let text: String = content.chars().take(avail_w).collect();
        buf.set_string(x, sy, &text, style);
    }
}

/// Slot index (0 or 1) with the higher score, if any.
fn leading_slot(m: &Match) -> Option<u8> {
    match m.score1.cmp(&m.score2) {
        std::cmp::Ordering::Greater => Some(0),
        std::cmp::Ordering::Less => Some(1),
        std::cmp::Ordering::Equal => None,
    }
}

/// `"[name        ] [score]"`, exactly `width` columns.
pub fn format_slot_line(p: Option<&Participant>, score: u32, width: usize) -> String {
    let name = p.map(|p| p.name.as_str()).unwrap_or("TBD");
    let score_str = if p.is_some() { format!("{score:>2}") } else { "  ".to_string() };
    let name_w = width.saturating_sub(4);
    let name_trunc: String = name.chars().take(name_w).collect();
    let line = format!(" {name_trunc:<name_w$} {score_str}");
    line.chars().take(width).collect()
}

fn format_status_line(m: &Match, width: usize) -> String {
    let raw = format!(" #{} {} {}", m.number, m.format, m.status.label());
    let padded = format!("{raw:<width$}");
    padded.chars().take(width).collect()
}

/// ```text
///  child_top  ──┐
///               │
///  parent     ──├──
///               │
///  child_bot  ──┘
/// ```
fn draw_connector(
    r_top: u16,
    r_mid: u16,
    r_bot: u16,
    conn_base_x: u16,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let style = tone(Tone::Dim);
    let (col_a, col_b, col_c) = (conn_base_x, conn_base_x + 1, conn_base_x + 2);
    let limit_x = area.x + area.width;

    let mut put = |x: u16, row: u16, ch: char| {
        if x < limit_x
            && let Some(sy) = screen_y(row, scroll, area)
        {
            put_char(buf, x, sy, ch, style);
        }
    };

    if r_top == r_bot {
        put(col_a, r_mid, '─');
        put(col_b, r_mid, '─');
        put(col_c, r_mid, '─');
        return;
    }
    put(col_a, r_top, '─');
    put(col_b, r_top, '┐');
    for row in (r_top + 1)..r_mid {
        put(col_b, row, '│');
    }
    put(col_a, r_mid, ' ');
    put(col_b, r_mid, '├');
    put(col_c, r_mid, '─');
    for row in (r_mid + 1)..r_bot {
        put(col_b, row, '│');
    }
    put(col_a, r_bot, '─');
    put(col_b, r_bot, '┘');
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// StandingsTable widget
// ---------------------------------------------------------------------------

/// One group's standings: place, participant, W, D, L, points. Rows above the
/// group's qualifying cutoff are banded green, the rest red.
pub struct StandingsTable<'a> {
    pub group: &'a Group,
    pub selected: Option<usize>,
}

pub const STANDINGS_HEADER: &str = "  #  Participant          W  D  L  Pts";

impl<'a> Widget for StandingsTable<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < 20 {
            return;
        }
        let width = area.width as usize;
        buf.set_string(
            area.x,
            area.y,
            format!("Group {}", self.group.letter),
            tone(Tone::Accent),
        );
        if area.height < 2 {
            return;
        }
        let header: String = STANDINGS_HEADER.chars().take(width).collect();
        buf.set_string(area.x, area.y + 1, header, tone(Tone::Dim));

        let total = self.group.rows.len();
        for (i, row) in self.group.rows.iter().enumerate() {
            let y = area.y + 2 + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let band_style = match row_band(i, total) {
                RowBand::Qualifying => tone(Tone::Qualifying),
                RowBand::Eliminated => tone(Tone::Eliminated),
            };
            let style = if self.selected == Some(i) {
                band_style.add_modifier(Modifier::REVERSED)
            } else {
                band_style
            };
            let text: String = format_standings_row(row).chars().take(width).collect();
            buf.set_string(area.x, y, text, style);
        }
    }
}

pub fn format_standings_row(row: &StandingsRow) -> String {
    let name: String = row.entity.participant().name.chars().take(18).collect();
    format!(
        "{:>3}  {:<18} {:>2} {:>2} {:>2} {:>4}",
        row.place,
        name,
        row.wins,
        row.draws,
        row.losses,
        row.points()
    )
}

/// Rows needed to draw a group table.
pub fn standings_height(group: &Group) -> u16 {
    group.rows.len() as u16 + 2
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ggforge_api::fixtures::Fixtures;
    use ggforge_api::{PlayoffStage, Round, StandingsEntity, qualifying_cutoff};

    fn m(id: &str) -> Match {
        Match { id: id.into(), ..Default::default() }
    }

    #[test]
    fn columns_are_rounds_then_final() {
        let t = Tournament {
            has_group_stage: false,
            playoff: PlayoffStage {
                rounds: vec![Round { id: "r1".into(), label: "1".into(), matches: vec![m("a"), m("b")] }],
            },
            final_match: Some(m("f")),
            ..Default::default()
        };
        let columns = bracket_columns(&t);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].matches.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(columns[1].title, "Final");
        assert_eq!(columns[1].matches[0].id, "f");
    }

    #[test]
    fn playoff_only_tournament_has_round_then_final() {
        let fixtures = Fixtures::sample();
        let t = fixtures.tournament("2").unwrap();
        assert!(!t.has_group_stage);
        let shape: Vec<(String, usize)> = bracket_columns(t)
            .into_iter()
            .map(|c| (c.title, c.matches.len()))
            .collect();
        assert_eq!(shape, vec![("Round 1".to_string(), 2), ("Final".to_string(), 1)]);
    }

    #[test]
    fn no_final_means_no_final_column() {
        let t = Tournament {
            playoff: PlayoffStage {
                rounds: vec![
                    Round { id: "r1".into(), label: "1".into(), matches: vec![m("a"), m("b")] },
                    Round { id: "r2".into(), label: "2".into(), matches: vec![m("c")] },
                ],
            },
            ..Default::default()
        };
        let titles: Vec<String> = bracket_columns(&t).into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Round 1", "Round 2"]);
    }

    #[test]
    fn locate_walks_columns_in_order() {
        let fixtures = Fixtures::sample();
        let columns = bracket_columns(fixtures.tournament("1").unwrap());
        assert_eq!(bracket_matches(&columns).len(), 4);
        assert_eq!(locate(&columns, 0), Some((0, 0)));
        assert_eq!(locate(&columns, 2), Some((1, 0)));
        assert_eq!(locate(&columns, 3), Some((2, 0)));
        assert_eq!(locate(&columns, 4), None);

        assert_eq!(cell_center(&columns, (0, 1)), Some(5));
        assert_eq!(cell_center(&columns, (2, 0)), Some(3));
        assert_eq!(cell_center(&columns, (2, 1)), None);
    }

    #[test]
    fn halving_columns_center_between_children() {
        let centers = column_centers(&[4, 2, 1]);
        assert_eq!(centers[0], vec![1, 5, 9, 13]);
        assert_eq!(centers[1], vec![3, 11]);
        assert_eq!(centers[2], vec![7]);
    }

    #[test]
    fn qualifying_rows_match_cutoff_per_group() {
        let fixtures = Fixtures::sample();
        let t = fixtures.tournament("1").unwrap();
        for group in &t.group_stage.as_ref().unwrap().groups {
            let n = group.rows.len();
            let qualifying = (0..n).filter(|i| row_band(*i, n) == RowBand::Qualifying).count();
            assert_eq!(qualifying, qualifying_cutoff(n), "group {}", group.letter);
        }
    }

    #[test]
    fn standings_render_bands_and_points() {
        let group = Group {
            id: "g".into(),
            letter: "A".into(),
            rows: (0..5u32)
                .map(|i| StandingsRow {
                    id: format!("r{i}"),
                    place: i + 1,
                    entity: StandingsEntity::User(Participant {
                        id: format!("p{i}"),
                        name: format!("player{i}"),
                        ..Default::default()
                    }),
                    wins: 4 - i,
                    draws: 1,
                    losses: i,
                })
                .collect(),
            matches: vec![],
        };
        let area = Rect::new(0, 0, 40, standings_height(&group));
        let mut buf = Buffer::empty(area);
        StandingsTable { group: &group, selected: None }.render(area, &mut buf);

        let row_text = |y: u16| -> String {
            (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
        };
        assert!(row_text(0).starts_with("Group A"));
        assert!(row_text(2).trim_end().ends_with('9'));
        assert_eq!(buf[(3, 3)].fg, tone(Tone::Qualifying).fg.unwrap());
        assert_eq!(buf[(3, 4)].fg, tone(Tone::Eliminated).fg.unwrap());
    }

    #[test]
    fn slot_line_is_exact_width() {
        let p = Participant { name: "A very long participant name".into(), ..Default::default() };
        assert_eq!(format_slot_line(Some(&p), 2, 18).chars().count(), 18);
        assert!(format_slot_line(None, 0, 12).contains("TBD"));
    }
}
