use std::mem;

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tokio::runtime::Handle;

use crate::client::BirdApiClient;
use crate::dto::{BirdDto, SightingDto};
use crate::query::BirdQuery;

use super::forms::{BirdField, BirdForm, ConfirmDelete, FilterForm, SightingField, SightingForm};
use super::helpers::{centered_rect, cursor_column, surface_error};
use super::tables::{bird_cells, sighting_cells, TableRows, BIRD_COLUMNS, SIGHTING_COLUMNS};
use super::worker::{Action, Outcome, Worker};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Four fields, a spacer, a hint line, and the border.
const BIRD_FORM_HEIGHT: u16 = 8;
const SIGHTING_FORM_HEIGHT: u16 = 6;

/// Panels that can hold keyboard focus, in Tab order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Pane {
    BirdForm,
    SightingForm,
    Birds,
    Sightings,
}

impl Pane {
    fn next(self) -> Self {
        match self {
            Pane::BirdForm => Pane::SightingForm,
            Pane::SightingForm => Pane::Birds,
            Pane::Birds => Pane::Sightings,
            Pane::Sightings => Pane::BirdForm,
        }
    }

    fn previous(self) -> Self {
        match self {
            Pane::BirdForm => Pane::Sightings,
            Pane::SightingForm => Pane::BirdForm,
            Pane::Birds => Pane::SightingForm,
            Pane::Sightings => Pane::Birds,
        }
    }
}

/// Popups layered over the main layout.
enum Mode {
    Normal,
    EditingBird { id: i64, form: BirdForm },
    ConfirmDelete(ConfirmDelete),
    Filtering(FilterForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    worker: Worker,
    focus: Pane,
    bird_form: BirdForm,
    sighting_form: SightingForm,
    birds: TableRows<BirdDto>,
    sightings: TableRows<SightingDto>,
    /// Bird whose sightings are currently shown.
    sightings_for: Option<i64>,
    /// Bird to highlight once the next bird list arrives.
    focus_after_load: Option<i64>,
    filter: BirdQuery,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app around a client; requests run on `runtime`.
    pub fn new(client: BirdApiClient, runtime: Handle) -> Self {
        Self {
            worker: Worker::new(client, runtime),
            focus: Pane::Birds,
            bird_form: BirdForm::default(),
            sighting_form: SightingForm::default(),
            birds: TableRows::default(),
            sightings: TableRows::default(),
            sightings_for: None,
            focus_after_load: None,
            filter: BirdQuery::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Reload the bird table with the active filter.
    pub fn refresh(&mut self) {
        self.worker.load_birds(&self.filter);
    }

    /// Apply every background result that arrived since the last tick.
    pub fn poll_worker(&mut self) {
        for outcome in self.worker.drain() {
            self.apply(outcome);
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::BirdsLoaded(birds) => {
                let focus = self
                    .focus_after_load
                    .take()
                    .or_else(|| self.birds.current_id());
                self.birds.replace(birds, focus);
                self.reload_sightings();
            }
            Outcome::SightingsLoaded { bird_id, sightings } => {
                // Ignore answers for a bird that is no longer selected.
                if self.birds.current_id() == Some(bird_id) {
                    let focus = if self.sightings_for == Some(bird_id) {
                        self.sightings.current_id()
                    } else {
                        None
                    };
                    self.sightings.replace(sightings, focus);
                    self.sightings_for = Some(bird_id);
                }
            }
            Outcome::BirdAdded(bird) => {
                self.set_status(
                    format!("Added bird #{} {}.", bird.id, bird.name),
                    StatusKind::Info,
                );
                self.bird_form.clear();
                self.focus_after_load = Some(bird.id);
                self.refresh();
            }
            Outcome::BirdUpdated(bird) => {
                self.set_status(
                    format!("Updated bird #{} {}.", bird.id, bird.name),
                    StatusKind::Info,
                );
                self.focus_after_load = Some(bird.id);
                self.refresh();
            }
            Outcome::BirdDeleted(id) => {
                self.set_status(format!("Deleted bird #{id}."), StatusKind::Info);
                self.refresh();
            }
            Outcome::SightingAdded(sighting) => {
                self.set_status(
                    format!(
                        "Recorded sighting #{} of {} at {}.",
                        sighting.id, sighting.bird.name, sighting.location
                    ),
                    StatusKind::Info,
                );
                self.sighting_form.reset_location();
                if self.birds.current_id() == Some(sighting.bird.id)
                    || self.birds.select_id(sighting.bird.id)
                {
                    self.reload_sightings();
                }
            }
            Outcome::SightingDeleted { id, bird_id } => {
                self.set_status(format!("Deleted sighting #{id}."), StatusKind::Info);
                if self.birds.current_id() == Some(bird_id) {
                    self.reload_sightings();
                }
            }
            Outcome::Failed { action, error } => {
                let message = format!("{action} failed: {error}");
                match action {
                    Action::AddBird => self.bird_form.error = Some(error.to_string()),
                    Action::AddSighting => self.sighting_form.error = Some(error.to_string()),
                    _ => {}
                }
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    /// Ask for the sightings of the highlighted bird, or empty the table when
    /// nothing is selected.
    fn reload_sightings(&mut self) {
        match self.birds.current_id() {
            Some(bird_id) => self.worker.load_sightings(bird_id),
            None => {
                self.sightings.clear();
                self.sightings_for = None;
            }
        }
    }

    fn selection_changed(&mut self) {
        if self.sightings_for != self.birds.current_id() {
            self.sightings.clear();
        }
        self.reload_sightings();
    }

    fn focus_pane(&mut self, pane: Pane) {
        if pane == Pane::SightingForm {
            if let Some(bird_id) = self.birds.current_id() {
                self.sighting_form.suggest_bird(bird_id);
            }
        }
        self.focus = pane;
    }

    /// Top-level keyboard dispatcher. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::EditingBird { id, form } => self.handle_edit_bird(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Filtering(form) => self.handle_filter(code, form)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Tab => {
                self.focus_pane(self.focus.next());
                return Ok(Mode::Normal);
            }
            KeyCode::BackTab => {
                self.focus_pane(self.focus.previous());
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.focus {
            Pane::BirdForm => {
                self.handle_bird_form_key(code);
                Ok(Mode::Normal)
            }
            Pane::SightingForm => {
                self.handle_sighting_form_key(code);
                Ok(Mode::Normal)
            }
            Pane::Birds => Ok(self.handle_birds_key(code, exit)),
            Pane::Sightings => Ok(self.handle_sightings_key(code, exit)),
        }
    }

    fn handle_bird_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.focus = Pane::Birds,
            KeyCode::Up => self.bird_form.previous_field(),
            KeyCode::Down => self.bird_form.next_field(),
            KeyCode::Backspace => self.bird_form.backspace(),
            KeyCode::Enter => match self.bird_form.parse_inputs() {
                Ok(bird) => {
                    self.bird_form.error = None;
                    self.set_status(format!("Saving {}...", bird.name), StatusKind::Info);
                    self.worker.add_bird(bird);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    self.bird_form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if self.bird_form.push_char(ch) {
                    self.bird_form.error = None;
                }
            }
            _ => {}
        }
    }

    fn handle_sighting_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.focus = Pane::Birds,
            KeyCode::Up | KeyCode::Down => self.sighting_form.toggle_field(),
            KeyCode::Backspace => self.sighting_form.backspace(),
            KeyCode::Enter => {
                let now = Local::now().naive_local();
                match self.sighting_form.parse_inputs(now) {
                    Ok(sighting) => {
                        self.sighting_form.error = None;
                        self.set_status("Recording sighting...", StatusKind::Info);
                        self.worker.add_sighting(sighting);
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        self.sighting_form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if self.sighting_form.push_char(ch) {
                    self.sighting_form.error = None;
                }
            }
            _ => {}
        }
    }

    fn handle_birds_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let moved = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
                false
            }
            KeyCode::Up => self.birds.move_selection(-1),
            KeyCode::Down => self.birds.move_selection(1),
            KeyCode::PageUp => self.birds.move_selection(-10),
            KeyCode::PageDown => self.birds.move_selection(10),
            KeyCode::Home => self.birds.select_first(),
            KeyCode::End => self.birds.select_last(),
            KeyCode::Enter => {
                if !self.birds.is_empty() {
                    self.focus = Pane::Sightings;
                }
                false
            }
            KeyCode::Char('e') => {
                return match self.birds.current() {
                    Some(bird) => Mode::EditingBird {
                        id: bird.id,
                        form: BirdForm::from_bird(bird),
                    },
                    None => {
                        self.set_status("No bird selected.", StatusKind::Error);
                        Mode::Normal
                    }
                };
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                return match self.birds.current() {
                    Some(bird) => Mode::ConfirmDelete(ConfirmDelete::Bird(bird.clone())),
                    None => Mode::Normal,
                };
            }
            KeyCode::Char('f') => return Mode::Filtering(FilterForm::from_query(&self.filter)),
            KeyCode::Char('r') => {
                self.set_status("Refreshing...", StatusKind::Info);
                self.refresh();
                false
            }
            _ => false,
        };

        if moved {
            self.selection_changed();
        }
        Mode::Normal
    }

    fn handle_sightings_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => self.focus = Pane::Birds,
            KeyCode::Up => {
                self.sightings.move_selection(-1);
            }
            KeyCode::Down => {
                self.sightings.move_selection(1);
            }
            KeyCode::Home => {
                self.sightings.select_first();
            }
            KeyCode::End => {
                self.sightings.select_last();
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(sighting) = self.sightings.current() {
                    return Mode::ConfirmDelete(ConfirmDelete::Sighting(sighting.clone()));
                }
            }
            KeyCode::Char('r') => self.reload_sightings(),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_edit_bird(&mut self, code: KeyCode, id: i64, mut form: BirdForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok(bird) => {
                    self.set_status(format!("Saving {}...", bird.name), StatusKind::Info);
                    self.worker.update_bird(id, bird);
                    keep_open = false;
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingBird { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match confirm {
                    ConfirmDelete::Bird(bird) => self.worker.delete_bird(bird.id),
                    ConfirmDelete::Sighting(sighting) => {
                        self.worker.delete_sighting(sighting.id, sighting.bird.id)
                    }
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_filter(&mut self, code: KeyCode, mut form: FilterForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Filter unchanged.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter => {
                self.filter = form.to_query();
                let message = if self.filter == BirdQuery::default() {
                    "Showing all birds."
                } else {
                    "Filter applied."
                };
                self.set_status(message, StatusKind::Info);
                self.refresh();
                Ok(Mode::Normal)
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.toggle_field();
                Ok(Mode::Filtering(form))
            }
            KeyCode::Backspace => {
                form.backspace();
                Ok(Mode::Filtering(form))
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Ok(Mode::Filtering(form))
            }
            _ => Ok(Mode::Filtering(form)),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    /// Render the two-pane layout, the footer, and any popup.
    pub(crate) fn draw(&self, frame: &mut Frame) {
        let size = frame.area();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(layout[0]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(BIRD_FORM_HEIGHT),
                Constraint::Length(SIGHTING_FORM_HEIGHT),
                Constraint::Min(0),
            ])
            .split(columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        self.draw_bird_form(frame, left[0]);
        self.draw_sighting_form(frame, left[1]);
        self.draw_filter_summary(frame, left[2]);
        self.draw_birds(frame, right[0]);
        self.draw_sightings(frame, right[1]);
        self.draw_footer(frame, layout[1]);

        match &self.mode {
            Mode::Normal => {}
            Mode::EditingBird { id, form } => self.draw_edit_popup(frame, size, *id, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm(frame, size, confirm),
            Mode::Filtering(form) => self.draw_filter_popup(frame, size, form),
        }
    }

    fn pane_block(&self, title: String, pane: Pane) -> Block<'static> {
        let style = if self.focus == pane && matches!(self.mode, Mode::Normal) {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(style)
    }

    fn form_hint(error: &Option<String>, hint: &'static str) -> Line<'static> {
        match error {
            Some(error) => Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
        }
    }

    fn draw_bird_form(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Pane::BirdForm && matches!(self.mode, Mode::Normal);
        let block = self.pane_block("Add Bird".to_string(), Pane::BirdForm);
        let inner = block.inner(area);

        let mut lines: Vec<Line> = BirdField::ALL
            .iter()
            .map(|field| self.bird_form.build_line(*field, focused))
            .collect();
        lines.push(Line::from(""));
        lines.push(Self::form_hint(&self.bird_form.error, "Enter to add"));

        frame.render_widget(Paragraph::new(lines).block(block), area);

        if focused {
            let field = self.bird_form.active;
            let row = BirdField::ALL
                .iter()
                .position(|candidate| *candidate == field)
                .unwrap_or(0) as u16;
            let x = cursor_column(inner, field.label(), self.bird_form.value_len(field));
            frame.set_cursor_position((x, inner.y + row));
        }
    }

    fn draw_sighting_form(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Pane::SightingForm && matches!(self.mode, Mode::Normal);
        let block = self.pane_block("Add Sighting".to_string(), Pane::SightingForm);
        let inner = block.inner(area);

        let mut lines: Vec<Line> = SightingField::ALL
            .iter()
            .map(|field| self.sighting_form.build_line(*field, focused))
            .collect();
        lines.push(Line::from(""));
        lines.push(Self::form_hint(
            &self.sighting_form.error,
            "Enter to record (timestamped now)",
        ));

        frame.render_widget(Paragraph::new(lines).block(block), area);

        if focused {
            let field = self.sighting_form.active;
            let row = match field {
                SightingField::BirdId => 0,
                SightingField::Location => 1,
            };
            let x = cursor_column(inner, field.label(), self.sighting_form.value_len(field));
            frame.set_cursor_position((x, inner.y + row));
        }
    }

    fn draw_filter_summary(&self, frame: &mut Frame, area: Rect) {
        let describe = |value: &Option<String>| value.clone().unwrap_or_else(|| "any".to_string());
        let mut lines = vec![
            Line::from(format!("Name: {}", describe(&self.filter.name))),
            Line::from(format!("Color: {}", describe(&self.filter.color))),
        ];
        if self.filter.name.is_none() && self.filter.color.is_some() {
            lines.push(Line::from(Span::styled(
                "Color only applies together with a name.",
                Style::default().fg(Color::Gray),
            )));
        }
        let in_flight = self.worker.in_flight();
        if in_flight > 0 {
            lines.push(Line::from(Span::styled(
                format!("{in_flight} request(s) pending"),
                Style::default().fg(Color::Yellow),
            )));
        }

        let block = Block::default().title("Filter").borders(Borders::ALL);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_birds(&self, frame: &mut Frame, area: Rect) {
        let title = format!("Birds ({})", self.birds.len());
        let header = Row::new(BIRD_COLUMNS).style(header_style());
        let rows = self
            .birds
            .rows()
            .iter()
            .map(|bird| Row::new(bird_cells(bird)));
        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Length(8),
            Constraint::Length(8),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(self.pane_block(title, Pane::Birds))
            .row_highlight_style(highlight_style())
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(self.birds.selected_index());
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_sightings(&self, frame: &mut Frame, area: Rect) {
        let title = match self.birds.current() {
            Some(bird) => format!("Sightings of {} ({})", bird.name, self.sightings.len()),
            None => "Sightings".to_string(),
        };
        let header = Row::new(SIGHTING_COLUMNS).style(header_style());
        let rows = self
            .sightings
            .rows()
            .iter()
            .map(|sighting| Row::new(sighting_cells(sighting)));
        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(20),
            Constraint::Percentage(35),
            Constraint::Length(19),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(self.pane_block(title, Pane::Sightings))
            .row_highlight_style(highlight_style())
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(self.sightings.selected_index());
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.mode, self.focus) {
            (Mode::EditingBird { .. }, _) => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::ConfirmDelete(_), _) => &[("[y]", " Delete   "), ("[n]", " Keep")],
            (Mode::Filtering(_), _) => &[
                ("[Tab]", " Switch field   "),
                ("[Enter]", " Apply   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::Normal, Pane::BirdForm | Pane::SightingForm) => &[
                ("[Tab]", " Next pane   "),
                ("[↑↓]", " Field   "),
                ("[Enter]", " Submit   "),
                ("[Esc]", " Back to birds"),
            ],
            (Mode::Normal, Pane::Birds) => &[
                ("[Tab]", " Next pane   "),
                ("[↑↓]", " Navigate   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[f]", " Filter   "),
                ("[r]", " Refresh   "),
                ("[q]", " Quit"),
            ],
            (Mode::Normal, Pane::Sightings) => &[
                ("[Tab]", " Next pane   "),
                ("[↑↓]", " Navigate   "),
                ("[-]", " Delete   "),
                ("[r]", " Refresh   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_edit_popup(&self, frame: &mut Frame, area: Rect, id: i64, form: &BirdForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Edit Bird #{id}"))
            .borders(Borders::ALL);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BirdField::ALL
            .iter()
            .map(|field| form.build_line(*field, true))
            .collect();
        lines.push(Line::from(""));
        lines.push(Self::form_hint(
            &form.error,
            "Enter to save • Tab to switch • Esc to cancel",
        ));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let row = BirdField::ALL
            .iter()
            .position(|candidate| *candidate == form.active)
            .unwrap_or(0) as u16;
        let x = cursor_column(inner, form.active.label(), form.value_len(form.active));
        frame.set_cursor_position((x, inner.y + row));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL);
        let mut lines = vec![Line::from(confirm.prompt()), Line::from("")];
        if let ConfirmDelete::Bird(_) = confirm {
            lines.push(Line::from(Span::styled(
                "Birds that still have sightings cannot be deleted.",
                Style::default().fg(Color::Gray),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N to cancel.",
            Style::default().fg(Color::Yellow),
        )));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_filter_popup(&self, frame: &mut Frame, area: Rect, form: &FilterForm) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Filter Birds").borders(Borders::ALL);
        let inner = block.inner(popup_area);

        let mut lines = form.lines();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Leave both blank to show every bird.",
            Style::default().fg(Color::Gray),
        )));

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);

        let (label, len, row) = form.cursor();
        frame.set_cursor_position((cursor_column(inner, label, len), inner.y + row));
    }
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn highlight_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}
