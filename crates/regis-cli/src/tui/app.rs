//! Interactive console: tabbed entity tables with form and confirm overlays.
//!
//! [`App`] is a pure state machine: key events go in, [`AppCommand`]s come
//! out, and the run loop in [`run`] executes those commands against the
//! per-entity list controllers. Nothing in `App` touches the network, which
//! keeps every interaction testable without a terminal or a backend.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};
use serde_json::Value;

use regis_client::api::{ApiClient, ApiError, RestGateway};
use regis_client::controller::{DeleteOutcome, FetchOutcome, ListController};
use regis_client::session::Session;
use regis_core::model::{College, Program, Record, Student};

use super::filter::{FilterAction, FilterMenu};
use super::form::{FormAction, FormMode, SimpleForm, StudentForm};
use super::notify::{Level, Notifier};
use super::pane::{ListPane, PaneState, footer_line};

/// Which entity table is in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Students,
    Colleges,
    Programs,
}

impl Tab {
    const ALL: [Self; 3] = [Self::Students, Self::Colleges, Self::Programs];

    const fn title(self) -> &'static str {
        match self {
            Self::Students => "Students",
            Self::Colleges => "Colleges",
            Self::Programs => "Programs",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Students => Self::Colleges,
            Self::Colleges => Self::Programs,
            Self::Programs => Self::Students,
        }
    }
}

/// A delete waiting on the confirmation slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub tab: Tab,
    pub key: String,
}

/// Side effects the run loop executes on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Refetch every collection.
    Refresh,
    Create { tab: Tab, payload: Value },
    Update { tab: Tab, key: String, payload: Value },
    Delete { tab: Tab, key: String },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Normal,
    /// Typing into the search box.
    Search,
}

enum ActiveForm {
    Student(StudentForm),
    Simple { tab: Tab, form: SimpleForm },
}

pub struct App {
    pub tab: Tab,
    pub students: ListPane<Student>,
    pub colleges: ListPane<College>,
    pub programs: ListPane<Program>,
    pub notifier: Notifier<PendingDelete>,
    mode: InputMode,
    search_input: String,
    form: Option<ActiveForm>,
    filter: Option<FilterMenu>,
    /// Distinct-value lookups behind the student filter menu; synced by the
    /// run loop and refetched after student mutations.
    year_levels: Vec<u8>,
    genders: Vec<String>,
    should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tab: Tab::Students,
            students: ListPane::new(&["id_number", "last_name", "first_name", "year_level"]),
            colleges: ListPane::new(&["college_code", "college_name"]),
            programs: ListPane::new(&["program_code", "program_name", "college_name"]),
            notifier: Notifier::default(),
            mode: InputMode::default(),
            search_input: String::new(),
            form: None,
            filter: None,
            year_levels: Vec::new(),
            genders: Vec::new(),
            should_quit: false,
        }
    }

    /// Replace the distinct-value lookups the filter menu offers.
    pub fn set_student_lookups(&mut self, year_levels: Vec<u8>, genders: Vec<String>) {
        self.year_levels = year_levels;
        self.genders = genders;
    }

    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn tick(&mut self) {
        self.notifier.tick();
    }

    /// Feed one key event; returns a command for the run loop to execute.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        // The confirmation overlay swallows everything until answered.
        if self.notifier.pending_confirm().is_some() {
            return self.handle_confirm_key(key);
        }
        if self.form.is_some() {
            return self.handle_form_key(key);
        }
        if self.filter.is_some() {
            return self.handle_filter_key(key);
        }
        if self.mode == InputMode::Search {
            return self.handle_search_key(key);
        }
        self.handle_normal_key(key)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        let accepted = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return None,
        };
        let pending = self.notifier.resolve_confirm(accepted)?;
        Some(AppCommand::Delete {
            tab: pending.tab,
            key: pending.key,
        })
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        let Some(form) = self.form.as_mut() else {
            return None;
        };
        let (action, tab, record_key) = match form {
            ActiveForm::Student(f) => (f.handle_key(key), Tab::Students, Some(f.key())),
            ActiveForm::Simple { tab, form } => {
                (form.handle_key(key), *tab, form.key().map(String::from))
            }
        };
        let editing = match form {
            ActiveForm::Student(f) => f.mode == FormMode::Edit,
            ActiveForm::Simple { form, .. } => form.mode == FormMode::Edit,
        };
        match action? {
            FormAction::Cancel => {
                self.form = None;
                None
            }
            // The form stays open until the write succeeds, so a rejected
            // payload keeps the entered data on screen.
            FormAction::Submit(payload) => {
                if editing {
                    record_key.map(|key| AppCommand::Update { tab, key, payload })
                } else {
                    Some(AppCommand::Create { tab, payload })
                }
            }
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        let Some(menu) = self.filter.as_mut() else {
            return None;
        };
        match menu.handle_key(key)? {
            FilterAction::Cancel => self.filter = None,
            FilterAction::Apply { field, value } => {
                self.filter = None;
                self.students.set_filter(field, value);
            }
        }
        None
    }

    #[must_use]
    pub fn has_open_form(&self) -> bool {
        self.form.is_some()
    }

    #[must_use]
    pub fn has_open_filter(&self) -> bool {
        self.filter.is_some()
    }

    fn close_form(&mut self) {
        self.form = None;
    }

    fn set_form_error(&mut self, message: impl Into<String>) {
        match &mut self.form {
            Some(ActiveForm::Student(form)) => form.set_error(message),
            Some(ActiveForm::Simple { form, .. }) => form.set_error(message),
            None => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.search_input.clear();
                self.apply_search();
            }
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.search_input.pop();
                self.apply_search();
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.apply_search();
            }
            _ => {}
        }
        None
    }

    fn apply_search(&mut self) {
        let query = self.search_input.clone();
        match self.tab {
            Tab::Students => self.students.set_search(query),
            Tab::Colleges => self.colleges.set_search(query),
            Tab::Programs => self.programs.set_search(query),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Some(AppCommand::Quit)
            }
            KeyCode::Tab => {
                self.tab = self.tab.next();
                None
            }
            KeyCode::Char('1') => {
                self.tab = Tab::Students;
                None
            }
            KeyCode::Char('2') => {
                self.tab = Tab::Colleges;
                None
            }
            KeyCode::Char('3') => {
                self.tab = Tab::Programs;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.with_pane(ListPane::select_next, ListPane::select_next, ListPane::select_next);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.with_pane(ListPane::select_prev, ListPane::select_prev, ListPane::select_prev);
                None
            }
            KeyCode::Char('n') | KeyCode::Right => {
                self.with_pane(ListPane::next_page, ListPane::next_page, ListPane::next_page);
                None
            }
            KeyCode::Char('p') | KeyCode::Left => {
                self.with_pane(ListPane::prev_page, ListPane::prev_page, ListPane::prev_page);
                None
            }
            KeyCode::Char('s') => {
                self.with_pane(ListPane::cycle_sort, ListPane::cycle_sort, ListPane::cycle_sort);
                None
            }
            KeyCode::Char('o') => {
                self.with_pane(
                    ListPane::toggle_order,
                    ListPane::toggle_order,
                    ListPane::toggle_order,
                );
                None
            }
            KeyCode::Char('/') => {
                self.mode = InputMode::Search;
                self.search_input = match self.tab {
                    Tab::Students => self.students.view.search.clone(),
                    Tab::Colleges => self.colleges.view.search.clone(),
                    Tab::Programs => self.programs.view.search.clone(),
                };
                None
            }
            KeyCode::Char('f') => {
                // Field filters exist for students only.
                if self.tab == Tab::Students {
                    self.filter = Some(FilterMenu::students(
                        self.colleges.records(),
                        self.programs.records(),
                        &self.year_levels,
                        &self.genders,
                        &self.students.view.filters,
                    ));
                }
                None
            }
            KeyCode::Char('r') => Some(AppCommand::Refresh),
            KeyCode::Char('a') => {
                self.open_form(FormMode::Create);
                None
            }
            KeyCode::Char('e') => {
                self.open_form(FormMode::Edit);
                None
            }
            KeyCode::Enter | KeyCode::Char('v') => {
                self.open_form(FormMode::View);
                None
            }
            KeyCode::Char('d') => {
                self.request_delete();
                None
            }
            _ => None,
        }
    }

    fn with_pane(
        &mut self,
        on_students: impl FnOnce(&mut ListPane<Student>),
        on_colleges: impl FnOnce(&mut ListPane<College>),
        on_programs: impl FnOnce(&mut ListPane<Program>),
    ) {
        match self.tab {
            Tab::Students => on_students(&mut self.students),
            Tab::Colleges => on_colleges(&mut self.colleges),
            Tab::Programs => on_programs(&mut self.programs),
        }
    }

    fn open_form(&mut self, mode: FormMode) {
        let form = match self.tab {
            Tab::Students => {
                let colleges = self.colleges.records().to_vec();
                let programs = self.programs.records().to_vec();
                if mode == FormMode::Create {
                    if colleges.is_empty() {
                        self.notifier
                            .notify(Level::Error, "add a college before enrolling students");
                        return;
                    }
                    Some(ActiveForm::Student(StudentForm::create(colleges, programs)))
                } else {
                    self.students.selected().map(|student| {
                        ActiveForm::Student(StudentForm::edit(&student, colleges, programs, mode))
                    })
                }
            }
            Tab::Colleges => {
                if mode == FormMode::Create {
                    Some(ActiveForm::Simple {
                        tab: Tab::Colleges,
                        form: SimpleForm::college(mode, None),
                    })
                } else {
                    self.colleges.selected().map(|college| ActiveForm::Simple {
                        tab: Tab::Colleges,
                        form: SimpleForm::college(mode, Some(&college)),
                    })
                }
            }
            Tab::Programs => {
                let colleges = self.colleges.records().to_vec();
                if mode == FormMode::Create {
                    if colleges.is_empty() {
                        self.notifier
                            .notify(Level::Error, "add a college before adding programs");
                        return;
                    }
                    Some(ActiveForm::Simple {
                        tab: Tab::Programs,
                        form: SimpleForm::program(mode, None, colleges),
                    })
                } else {
                    self.programs.selected().map(|program| ActiveForm::Simple {
                        tab: Tab::Programs,
                        form: SimpleForm::program(mode, Some(&program), colleges),
                    })
                }
            }
        };
        if form.is_some() {
            self.form = form;
        }
    }

    fn request_delete(&mut self) {
        let (key, label) = match self.tab {
            Tab::Students => match self.students.selected() {
                Some(s) => (s.key(), format!("student '{}'", s.id_number)),
                None => return,
            },
            Tab::Colleges => match self.colleges.selected() {
                Some(c) => (c.key(), format!("college '{}'", c.college_code)),
                None => return,
            },
            Tab::Programs => match self.programs.selected() {
                Some(p) => (p.key(), format!("program '{}'", p.program_code)),
                None => return,
            },
        };
        let pending = PendingDelete { tab: self.tab, key };
        if !self
            .notifier
            .request_confirm(format!("Delete {label}? (y/n)"), pending)
        {
            self.notifier
                .notify(Level::Error, "another confirmation is already pending");
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_tabs(frame, chunks[0]);
        self.render_table(frame, chunks[1]);
        self.render_footer(frame, chunks[2]);
        self.render_status(frame, chunks[3]);

        match &self.form {
            Some(ActiveForm::Student(form)) => form.render(frame, area),
            Some(ActiveForm::Simple { form, .. }) => form.render(frame, area),
            None => {}
        }
        if let Some(menu) = &self.filter {
            menu.render(frame, area);
        }
        if let Some(question) = self.notifier.pending_confirm() {
            render_confirm(frame, area, question);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (i, tab) in Tab::ALL.into_iter().enumerate() {
            let style = if tab == self.tab {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, tab.title()), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        match self.tab {
            Tab::Students => {
                let page = self.students.page();
                let rows: Vec<Row> = page
                    .records
                    .iter()
                    .map(|s| {
                        Row::new(vec![
                            Cell::from(s.id_number.clone()),
                            Cell::from(s.last_name.clone()),
                            Cell::from(s.first_name.clone()),
                            Cell::from(s.gender.to_string()),
                            Cell::from(s.year_level.to_string()),
                            Cell::from(s.program.clone().unwrap_or_default()),
                        ])
                    })
                    .collect();
                let table = entity_table(
                    rows,
                    &["ID Number", "Last Name", "First Name", "Gender", "Year", "Program"],
                    &[11, 16, 16, 7, 9, 24],
                    self.students.state,
                );
                frame.render_stateful_widget(table, area, &mut self.students.table);
            }
            Tab::Colleges => {
                let page = self.colleges.page();
                let rows: Vec<Row> = page
                    .records
                    .iter()
                    .map(|c| {
                        Row::new(vec![
                            Cell::from(c.id.to_string()),
                            Cell::from(c.college_code.clone()),
                            Cell::from(c.college_name.clone()),
                            Cell::from(c.num_programs.to_string()),
                            Cell::from(c.num_students.to_string()),
                        ])
                    })
                    .collect();
                let table = entity_table(
                    rows,
                    &["ID", "Code", "Name", "Programs", "Students"],
                    &[6, 10, 36, 9, 9],
                    self.colleges.state,
                );
                frame.render_stateful_widget(table, area, &mut self.colleges.table);
            }
            Tab::Programs => {
                let page = self.programs.page();
                let rows: Vec<Row> = page
                    .records
                    .iter()
                    .map(|p| {
                        Row::new(vec![
                            Cell::from(p.id.to_string()),
                            Cell::from(p.program_code.clone()),
                            Cell::from(p.program_name.clone()),
                            Cell::from(p.college_name.clone()),
                            Cell::from(p.num_students.to_string()),
                        ])
                    })
                    .collect();
                let table = entity_table(
                    rows,
                    &["ID", "Code", "Name", "College", "Students"],
                    &[6, 10, 32, 26, 9],
                    self.programs.state,
                );
                frame.render_stateful_widget(table, area, &mut self.programs.table);
            }
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let summary = match self.tab {
            Tab::Students => footer_line(&self.students),
            Tab::Colleges => footer_line(&self.colleges),
            Tab::Programs => footer_line(&self.programs),
        };
        let line = if self.mode == InputMode::Search {
            format!("/{}_", self.search_input)
        } else if self.tab == Tab::Students {
            format!(
                "{summary} | / search  f filter  s sort  o order  a add  e edit  d delete  r refresh  q quit"
            )
        } else {
            format!(
                "{summary} | / search  s sort  o order  a add  e edit  d delete  r refresh  q quit"
            )
        };
        frame.render_widget(
            Paragraph::new(line).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if let Some(notice) = self.notifier.notice() {
            frame.render_widget(
                Paragraph::new(notice.message.clone())
                    .style(Style::default().fg(notice.level.color())),
                area,
            );
        }
    }
}

fn entity_table<'a>(
    rows: Vec<Row<'a>>,
    headers: &'a [&'static str],
    widths: &[u16],
    state: PaneState,
) -> Table<'a> {
    let header = Row::new(headers.iter().map(|h| Cell::from(*h))).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let title = if state == PaneState::Loading {
        " loading… "
    } else {
        ""
    };
    let constraints: Vec<Constraint> = widths.iter().map(|w| Constraint::Length(*w)).collect();
    Table::new(rows, constraints)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("► ")
}

fn render_confirm(frame: &mut Frame, area: Rect, question: &str) {
    let width = (question.len() as u16 + 6).min(area.width.saturating_sub(2));
    let dialog = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(5) / 2,
        width,
        height: 5.min(area.height),
    };
    frame.render_widget(Clear, dialog);
    frame.render_widget(
        Paragraph::new(vec![
            Line::raw(""),
            Line::from(Span::raw(question.to_string())).centered(),
            Line::from(Span::styled(
                "y confirm  n cancel",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        ),
        dialog,
    );
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

/// Outcome of executing one [`AppCommand`].
enum Flow {
    Continue,
    SessionExpired,
}

/// Launch the interactive console over the given session.
pub fn run(session: &mut Session) -> Result<()> {
    if !session.is_authenticated() {
        anyhow::bail!("not logged in; run 'regis login' first");
    }

    let client = session.client();
    let mut students = ListController::new(RestGateway::<Student>::new(&client));
    let mut colleges = ListController::new(RestGateway::<College>::new(&client));
    let mut programs = ListController::new(RestGateway::<Program>::new(&client));

    let mut app = App::new();
    let mut terminal = ratatui::init();
    let result = event_loop(
        &mut terminal,
        &mut app,
        &client,
        &mut students,
        &mut colleges,
        &mut programs,
    );
    ratatui::restore();

    if matches!(result, Ok(Flow::SessionExpired)) {
        session.force_logout()?;
        anyhow::bail!("session expired; run 'regis login' to sign in again");
    }
    result.map(|_| ())
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    client: &ApiClient,
    students: &mut ListController<RestGateway<'_, Student>>,
    colleges: &mut ListController<RestGateway<'_, College>>,
    programs: &mut ListController<RestGateway<'_, Program>>,
) -> Result<Flow> {
    if let Flow::SessionExpired = refresh_all(app, students, colleges, programs) {
        return Ok(Flow::SessionExpired);
    }
    sync_lookups(app, client);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(command) = app.handle_key(key) {
                    match execute(command, app, client, students, colleges, programs) {
                        Flow::Continue => {}
                        Flow::SessionExpired => return Ok(Flow::SessionExpired),
                    }
                }
            }
        }
        app.tick();

        if app.should_quit() {
            return Ok(Flow::Continue);
        }
    }
}

fn execute(
    command: AppCommand,
    app: &mut App,
    client: &ApiClient,
    students: &mut ListController<RestGateway<'_, Student>>,
    colleges: &mut ListController<RestGateway<'_, College>>,
    programs: &mut ListController<RestGateway<'_, Program>>,
) -> Flow {
    match command {
        AppCommand::Quit => Flow::Continue,
        AppCommand::Refresh => {
            let flow = refresh_all(app, students, colleges, programs);
            if matches!(flow, Flow::Continue) {
                sync_lookups(app, client);
            }
            flow
        }
        AppCommand::Create { tab, payload } => {
            let result = match tab {
                Tab::Students => students.create(&payload),
                Tab::Colleges => colleges.create(&payload),
                Tab::Programs => programs.create(&payload),
            };
            finish_write(result, tab, app, client, students, colleges, programs)
        }
        AppCommand::Update { tab, key, payload } => {
            let result = match tab {
                Tab::Students => students.update(&key, &payload),
                Tab::Colleges => colleges.update(&key, &payload),
                Tab::Programs => programs.update(&key, &payload),
            };
            finish_write(result, tab, app, client, students, colleges, programs)
        }
        AppCommand::Delete { tab, key } => {
            // The confirm overlay already ran; the controller gate is a pass-through.
            let outcome = match tab {
                Tab::Students => students.delete(&key, || true),
                Tab::Colleges => colleges.delete(&key, || true),
                Tab::Programs => programs.delete(&key, || true),
            };
            match outcome {
                DeleteOutcome::Deleted(message) => {
                    app.notifier.notify(Level::Success, message);
                    sync_panes(app, students, colleges, programs);
                    if tab == Tab::Students {
                        sync_lookups(app, client);
                    }
                    Flow::Continue
                }
                DeleteOutcome::Cancelled => Flow::Continue,
                DeleteOutcome::SessionExpired => Flow::SessionExpired,
                DeleteOutcome::Rejected(message) => {
                    app.notifier.notify(Level::Error, message);
                    Flow::Continue
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn finish_write(
    result: Result<String, ApiError>,
    tab: Tab,
    app: &mut App,
    client: &ApiClient,
    students: &mut ListController<RestGateway<'_, Student>>,
    colleges: &mut ListController<RestGateway<'_, College>>,
    programs: &mut ListController<RestGateway<'_, Program>>,
) -> Flow {
    match result {
        Ok(message) => {
            app.notifier.notify(Level::Success, message);
            app.close_form();
            sync_panes(app, students, colleges, programs);
            if tab == Tab::Students {
                sync_lookups(app, client);
            }
            Flow::Continue
        }
        Err(ApiError::Unauthorized) => Flow::SessionExpired,
        // Rejected write: show the server's message inline and keep the
        // dialog open with the entered data intact.
        Err(e) => {
            if app.has_open_form() {
                app.set_form_error(e.to_string());
            } else {
                app.notifier.notify(Level::Error, e.to_string());
            }
            Flow::Continue
        }
    }
}

fn refresh_all(
    app: &mut App,
    students: &mut ListController<RestGateway<'_, Student>>,
    colleges: &mut ListController<RestGateway<'_, College>>,
    programs: &mut ListController<RestGateway<'_, Program>>,
) -> Flow {
    for outcome in [students.fetch(), colleges.fetch(), programs.fetch()] {
        if outcome == FetchOutcome::SessionExpired {
            return Flow::SessionExpired;
        }
    }
    sync_panes(app, students, colleges, programs);
    Flow::Continue
}

fn sync_panes(
    app: &mut App,
    students: &mut ListController<RestGateway<'_, Student>>,
    colleges: &mut ListController<RestGateway<'_, College>>,
    programs: &mut ListController<RestGateway<'_, Program>>,
) {
    app.students.set_records(students.records().to_vec());
    app.colleges.set_records(colleges.records().to_vec());
    app.programs.set_records(programs.records().to_vec());
}

/// Refresh the distinct-value lookups behind the student filter menu. A
/// failed lookup reads as an empty list; the menu falls back to the full
/// value ranges.
fn sync_lookups(app: &mut App, client: &ApiClient) {
    let year_levels = client.student_year_levels().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "year-level lookup failed");
        Vec::new()
    });
    let genders = client.student_genders().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "gender lookup failed");
        Vec::new()
    });
    app.set_student_lookups(year_levels, genders);
}
