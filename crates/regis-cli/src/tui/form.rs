//! Entity form overlays.
//!
//! [`StudentForm`] is the full record editor with the dependent
//! college → program dropdown; [`SimpleForm`] covers colleges and programs
//! (code, name, and for programs an owning-college dropdown). Both are pure
//! state machines driven by key events, so they test without a terminal.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use serde_json::Value;

use regis_core::model::{College, Gender, Program, Student, YearLevel};
use regis_core::validate::{validate_id_number, validate_name, validate_required};

/// Why the form is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
    View,
}

impl FormMode {
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::View)
    }

    const fn title(self, entity: &'static str) -> (&'static str, &'static str) {
        match self {
            Self::Create => ("Add ", entity),
            Self::Edit => ("Edit ", entity),
            Self::View => ("View ", entity),
        }
    }
}

/// What the form wants the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// Write this payload (POST for create, PUT for edit).
    Submit(Value),
    /// Close without writing.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum StudentField {
    #[default]
    IdNumber,
    FirstName,
    LastName,
    Gender,
    Year,
    College,
    Program,
}

impl StudentField {
    fn next(self) -> Self {
        match self {
            Self::IdNumber => Self::FirstName,
            Self::FirstName => Self::LastName,
            Self::LastName => Self::Gender,
            Self::Gender => Self::Year,
            Self::Year => Self::College,
            Self::College => Self::Program,
            Self::Program => Self::IdNumber,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::IdNumber => Self::Program,
            Self::FirstName => Self::IdNumber,
            Self::LastName => Self::FirstName,
            Self::Gender => Self::LastName,
            Self::Year => Self::Gender,
            Self::College => Self::Year,
            Self::Program => Self::College,
        }
    }
}

/// Student editor with the dependent program dropdown.
pub struct StudentForm {
    pub mode: FormMode,
    focus: StudentField,
    id_number: String,
    first_name: String,
    last_name: String,
    gender_idx: usize,
    year_idx: usize,
    colleges: Vec<College>,
    programs: Vec<Program>,
    college_idx: usize,
    /// Index into [`Self::filtered_programs`].
    program_idx: usize,
    /// Set while the edit-mode form still shows the record's own program.
    /// The first college sync keeps that selection; later changes reset it.
    initial_load: bool,
    photo_url: Option<String>,
    error: Option<String>,
}

impl StudentForm {
    pub fn create(colleges: Vec<College>, programs: Vec<Program>) -> Self {
        Self {
            mode: FormMode::Create,
            focus: StudentField::default(),
            id_number: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            gender_idx: 0,
            year_idx: 0,
            colleges,
            programs,
            college_idx: 0,
            program_idx: 0,
            initial_load: false,
            photo_url: None,
            error: None,
        }
    }

    /// Open over an existing record, preselecting its college and program.
    pub fn edit(
        student: &Student,
        colleges: Vec<College>,
        programs: Vec<Program>,
        mode: FormMode,
    ) -> Self {
        let college_idx = colleges
            .iter()
            .position(|c| c.id == student.college_id)
            .unwrap_or(0);
        let mut form = Self {
            mode,
            focus: StudentField::default(),
            id_number: student.id_number.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            gender_idx: match student.gender {
                Gender::Male => 0,
                Gender::Female => 1,
            },
            year_idx: (student.year_level.number() - 1) as usize,
            colleges,
            programs,
            college_idx,
            program_idx: 0,
            initial_load: true,
            photo_url: student.photo_url.clone(),
            error: None,
        };
        form.program_idx = form
            .filtered_programs()
            .iter()
            .position(|p| p.id == student.program_id)
            .unwrap_or(0);
        form
    }

    fn gender(&self) -> Gender {
        if self.gender_idx == 0 {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    fn year(&self) -> YearLevel {
        YearLevel::ALL[self.year_idx.min(3)]
    }

    fn selected_college(&self) -> Option<&College> {
        self.colleges.get(self.college_idx)
    }

    /// Programs offered by the selected college, in snapshot order.
    pub fn filtered_programs(&self) -> Vec<&Program> {
        let Some(college) = self.selected_college() else {
            return Vec::new();
        };
        self.programs
            .iter()
            .filter(|p| p.college_id == college.id)
            .collect()
    }

    fn selected_program(&self) -> Option<&Program> {
        self.filtered_programs().get(self.program_idx).copied()
    }

    /// Move the college selection and resync the program dropdown. On the
    /// form's first interaction after an edit-mode open, the record's own
    /// program stays selected; any later college move resets to the first
    /// offered program.
    fn move_college(&mut self, delta: isize) {
        if self.colleges.is_empty() {
            return;
        }
        let len = self.colleges.len() as isize;
        let idx = (self.college_idx as isize + delta).rem_euclid(len);
        if idx as usize == self.college_idx {
            return;
        }
        self.college_idx = idx as usize;
        self.initial_load = false;
        self.program_idx = 0;
    }

    fn move_program(&mut self, delta: isize) {
        let len = self.filtered_programs().len() as isize;
        if len == 0 {
            return;
        }
        self.initial_load = false;
        self.program_idx = (self.program_idx as isize + delta).rem_euclid(len) as usize;
    }

    fn validate(&self) -> Result<(), String> {
        validate_id_number(&self.id_number).map_err(|e| e.to_string())?;
        validate_name("first_name", &self.first_name).map_err(|e| e.to_string())?;
        validate_name("last_name", &self.last_name).map_err(|e| e.to_string())?;
        if self.selected_college().is_none() {
            return Err("invalid college: is required".to_string());
        }
        if self.selected_program().is_none() {
            return Err("invalid program: is required".to_string());
        }
        Ok(())
    }

    fn build_payload(&self) -> Option<Value> {
        let college = self.selected_college()?;
        let program = self.selected_program()?;
        Some(serde_json::json!({
            "id_number": self.id_number,
            "first_name": self.first_name,
            "last_name": self.last_name,
            "gender": self.gender().to_string(),
            "year_level": self.year().number(),
            "college_id": college.id,
            "program_id": program.id,
            "photo_url": self.photo_url,
        }))
    }

    /// The record key a submit should PUT to (edit mode).
    pub fn key(&self) -> String {
        self.id_number.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show a server-side rejection inline; the form stays open.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Feed a key event. Returns `Some` when the form is finished.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormAction> {
        if key.code == KeyCode::Esc {
            return Some(FormAction::Cancel);
        }
        if self.mode.is_read_only() {
            // View mode: close, or demote to edit.
            return match key.code {
                KeyCode::Enter | KeyCode::Char('q') => Some(FormAction::Cancel),
                KeyCode::Char('e') => {
                    self.mode = FormMode::Edit;
                    None
                }
                _ => None,
            };
        }

        match key.code {
            KeyCode::Enter => match self.validate() {
                Ok(()) => {
                    self.error = None;
                    self.build_payload().map(FormAction::Submit)
                }
                Err(message) => {
                    // Blocked submit: show why, keep editing.
                    self.error = Some(message);
                    None
                }
            },
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Backspace => {
                match self.focus {
                    StudentField::IdNumber if self.mode == FormMode::Create => {
                        self.id_number.pop();
                    }
                    StudentField::FirstName => {
                        self.first_name.pop();
                    }
                    StudentField::LastName => {
                        self.last_name.pop();
                    }
                    _ => {}
                }
                None
            }
            KeyCode::Left => {
                self.move_select(-1);
                None
            }
            KeyCode::Right => {
                self.move_select(1);
                None
            }
            KeyCode::Char(c) => {
                match self.focus {
                    // The ID number is the record key; it is immutable once created.
                    StudentField::IdNumber if self.mode == FormMode::Create => {
                        self.id_number.push(c);
                    }
                    StudentField::FirstName => self.first_name.push(c),
                    StudentField::LastName => self.last_name.push(c),
                    _ => {}
                }
                None
            }
            _ => None,
        }
    }

    fn move_select(&mut self, delta: isize) {
        match self.focus {
            StudentField::Gender => self.gender_idx = (self.gender_idx + 1) % 2,
            StudentField::Year => {
                let idx = (self.year_idx as isize + delta).rem_euclid(4);
                self.year_idx = idx as usize;
            }
            StudentField::College => self.move_college(delta),
            StudentField::Program => self.move_program(delta),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (verb, entity) = self.mode.title("Student");
        let dialog = centered_rect(56, 13, area);
        frame.render_widget(Clear, dialog);
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {verb}{entity} "))
                .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            dialog,
        );

        let inner = dialog.inner(ratatui::layout::Margin::new(2, 1));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1); 9])
            .split(inner);

        let program_label = self
            .selected_program()
            .map_or_else(|| "(none)".to_string(), |p| p.program_name.clone());
        let college_label = self
            .selected_college()
            .map_or_else(|| "(none)".to_string(), |c| c.college_name.clone());

        let fields: [(StudentField, &str, String); 7] = [
            (StudentField::IdNumber, "ID Number", self.id_number.clone()),
            (StudentField::FirstName, "First Name", self.first_name.clone()),
            (StudentField::LastName, "Last Name", self.last_name.clone()),
            (StudentField::Gender, "Gender", self.gender().to_string()),
            (StudentField::Year, "Year Level", self.year().to_string()),
            (StudentField::College, "College", college_label),
            (StudentField::Program, "Program", program_label),
        ];

        for (i, (field, label, value)) in fields.into_iter().enumerate() {
            let style = if field == self.focus && !self.mode.is_read_only() {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let line = Line::from(vec![
                Span::styled(format!("{label:<12}"), style),
                Span::raw(value),
            ]);
            frame.render_widget(Paragraph::new(line), rows[i]);
        }

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
                rows[7],
            );
        }
        let hint = if self.mode.is_read_only() {
            "e edit  Esc close"
        } else {
            "Enter save  Tab next field  ←/→ change selection  Esc cancel"
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            rows[8],
        );
    }
}

/// Two-field form for colleges and programs. Programs additionally pick an
/// owning college.
pub struct SimpleForm {
    pub mode: FormMode,
    entity: &'static str,
    code_label: &'static str,
    name_label: &'static str,
    code: String,
    name: String,
    colleges: Option<Vec<College>>,
    college_idx: usize,
    focus: usize,
    key: Option<String>,
    error: Option<String>,
}

impl SimpleForm {
    pub fn college(mode: FormMode, existing: Option<&College>) -> Self {
        Self {
            mode,
            entity: "College",
            code_label: "Code",
            name_label: "Name",
            code: existing.map(|c| c.college_code.clone()).unwrap_or_default(),
            name: existing.map(|c| c.college_name.clone()).unwrap_or_default(),
            colleges: None,
            college_idx: 0,
            focus: 0,
            key: existing.map(|c| c.id.to_string()),
            error: None,
        }
    }

    pub fn program(mode: FormMode, existing: Option<&Program>, colleges: Vec<College>) -> Self {
        let college_idx = existing
            .and_then(|p| colleges.iter().position(|c| c.id == p.college_id))
            .unwrap_or(0);
        Self {
            mode,
            entity: "Program",
            code_label: "Code",
            name_label: "Name",
            code: existing.map(|p| p.program_code.clone()).unwrap_or_default(),
            name: existing.map(|p| p.program_name.clone()).unwrap_or_default(),
            colleges: Some(colleges),
            college_idx,
            focus: 0,
            key: existing.map(|p| p.id.to_string()),
            error: None,
        }
    }

    fn field_count(&self) -> usize {
        if self.colleges.is_some() { 3 } else { 2 }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show a server-side rejection inline; the form stays open.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    fn validate(&self) -> Result<(), String> {
        validate_required("code", &self.code).map_err(|e| e.to_string())?;
        validate_required("name", &self.name).map_err(|e| e.to_string())?;
        if let Some(colleges) = &self.colleges {
            if colleges.get(self.college_idx).is_none() {
                return Err("invalid college: is required".to_string());
            }
        }
        Ok(())
    }

    fn build_payload(&self) -> Value {
        match &self.colleges {
            Some(colleges) => serde_json::json!({
                "program_code": self.code,
                "program_name": self.name,
                "college_id": colleges.get(self.college_idx).map(|c| c.id),
            }),
            None => serde_json::json!({
                "college_code": self.code,
                "college_name": self.name,
            }),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormAction> {
        if key.code == KeyCode::Esc {
            return Some(FormAction::Cancel);
        }
        if self.mode.is_read_only() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char('q') => Some(FormAction::Cancel),
                KeyCode::Char('e') => {
                    self.mode = FormMode::Edit;
                    None
                }
                _ => None,
            };
        }

        match key.code {
            KeyCode::Enter => match self.validate() {
                Ok(()) => {
                    self.error = None;
                    Some(FormAction::Submit(self.build_payload()))
                }
                Err(message) => {
                    self.error = Some(message);
                    None
                }
            },
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.field_count();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.field_count() - 1) % self.field_count();
                None
            }
            KeyCode::Backspace => {
                match self.focus {
                    0 => {
                        self.code.pop();
                    }
                    1 => {
                        self.name.pop();
                    }
                    _ => {}
                }
                None
            }
            KeyCode::Left | KeyCode::Right if self.focus == 2 => {
                if let Some(colleges) = &self.colleges {
                    if !colleges.is_empty() {
                        let delta: isize = if key.code == KeyCode::Left { -1 } else { 1 };
                        let len = colleges.len() as isize;
                        self.college_idx =
                            (self.college_idx as isize + delta).rem_euclid(len) as usize;
                    }
                }
                None
            }
            KeyCode::Char(c) => {
                match self.focus {
                    0 => self.code.push(c),
                    1 => self.name.push(c),
                    _ => {}
                }
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (verb, entity) = self.mode.title(self.entity);
        let dialog = centered_rect(50, 9, area);
        frame.render_widget(Clear, dialog);
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {verb}{entity} "))
                .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            dialog,
        );

        let inner = dialog.inner(ratatui::layout::Margin::new(2, 1));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1); 5])
            .split(inner);

        let mut fields = vec![
            (self.code_label, self.code.clone()),
            (self.name_label, self.name.clone()),
        ];
        if let Some(colleges) = &self.colleges {
            let label = colleges
                .get(self.college_idx)
                .map_or_else(|| "(none)".to_string(), |c| c.college_name.clone());
            fields.push(("College", label));
        }

        for (i, (label, value)) in fields.into_iter().enumerate() {
            let style = if i == self.focus && !self.mode.is_read_only() {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let line = Line::from(vec![
                Span::styled(format!("{label:<10}"), style),
                Span::raw(value),
            ]);
            frame.render_widget(Paragraph::new(line), rows[i]);
        }

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
                rows[3],
            );
        }
        let hint = if self.mode.is_read_only() {
            "e edit  Esc close"
        } else {
            "Enter save  Tab next field  Esc cancel"
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            rows[4],
        );
    }
}

/// A fixed-size rect centered in `area`, clamped to fit.
pub(super) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}
