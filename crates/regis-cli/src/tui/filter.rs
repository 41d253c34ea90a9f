//! Filter menu overlay for the students tab.
//!
//! Two-step picker: choose a field (college, program, gender, year level),
//! then choose a value for it. The value lists come from the current
//! college/program snapshots and the backend's distinct-value lookups, so
//! the menu only ever offers values that exist. Pure state machine, same as
//! the forms.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::collections::BTreeMap;

use regis_core::model::{College, Program, YearLevel};

use super::form::centered_rect;

/// What the menu wants the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Set (`Some`) or clear (`None`) the exact-match filter on `field`.
    Apply {
        field: &'static str,
        value: Option<String>,
    },
    /// Close without changing anything.
    Cancel,
}

struct FilterOption {
    label: String,
    /// `None` is the "(all)" entry that clears the field's filter.
    value: Option<String>,
}

struct FilterField {
    name: &'static str,
    label: &'static str,
    options: Vec<FilterOption>,
    /// The value currently applied to the view, if any.
    current: Option<String>,
}

pub struct FilterMenu {
    fields: Vec<FilterField>,
    field_idx: usize,
    option_idx: usize,
    /// `false` while choosing a field, `true` while choosing its value.
    picking: bool,
}

impl FilterMenu {
    /// Build the menu for the students table from the current snapshots,
    /// the distinct-value lookups, and the filters already applied.
    pub fn students(
        colleges: &[College],
        programs: &[Program],
        year_levels: &[u8],
        genders: &[String],
        active: &BTreeMap<String, String>,
    ) -> Self {
        let gender_options = if genders.is_empty() {
            vec!["Male".to_string(), "Female".to_string()]
        } else {
            genders.to_vec()
        };
        let year_options: Vec<u8> = if year_levels.is_empty() {
            YearLevel::ALL.iter().map(|y| y.number()).collect()
        } else {
            year_levels.to_vec()
        };

        let fields = vec![
            FilterField {
                name: "college_id",
                label: "College",
                options: with_all(colleges.iter().map(|c| FilterOption {
                    label: c.college_name.clone(),
                    value: Some(c.id.to_string()),
                })),
                current: active.get("college_id").cloned(),
            },
            FilterField {
                name: "program_id",
                label: "Program",
                options: with_all(programs.iter().map(|p| FilterOption {
                    label: p.program_name.clone(),
                    value: Some(p.id.to_string()),
                })),
                current: active.get("program_id").cloned(),
            },
            FilterField {
                name: "gender",
                label: "Gender",
                options: with_all(gender_options.into_iter().map(|g| FilterOption {
                    label: g.clone(),
                    value: Some(g),
                })),
                current: active.get("gender").cloned(),
            },
            FilterField {
                name: "year_level",
                label: "Year Level",
                options: with_all(year_options.into_iter().map(|n| FilterOption {
                    label: YearLevel::try_from(n)
                        .map_or_else(|_| format!("Year {n}"), |y| y.label().to_string()),
                    value: Some(n.to_string()),
                })),
                current: active.get("year_level").cloned(),
            },
        ];

        Self {
            fields,
            field_idx: 0,
            option_idx: 0,
            picking: false,
        }
    }

    /// Feed a key event. Returns `Some` when the menu is finished.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FilterAction> {
        match key.code {
            KeyCode::Esc => {
                if self.picking {
                    self.picking = false;
                    None
                } else {
                    Some(FilterAction::Cancel)
                }
            }
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => {
                self.move_cursor(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => {
                self.move_cursor(-1);
                None
            }
            KeyCode::Enter => {
                if self.picking {
                    let field = &self.fields[self.field_idx];
                    Some(FilterAction::Apply {
                        field: field.name,
                        value: field
                            .options
                            .get(self.option_idx)
                            .and_then(|o| o.value.clone()),
                    })
                } else {
                    self.picking = true;
                    self.option_idx = self.current_option_index();
                    None
                }
            }
            _ => None,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = if self.picking {
            self.fields[self.field_idx].options.len()
        } else {
            self.fields.len()
        };
        if len == 0 {
            return;
        }
        let idx = if self.picking {
            &mut self.option_idx
        } else {
            &mut self.field_idx
        };
        *idx = (*idx as isize + delta).rem_euclid(len as isize) as usize;
    }

    /// Where the cursor should land when opening a field's value list: on
    /// the value already applied, or on "(all)".
    fn current_option_index(&self) -> usize {
        let field = &self.fields[self.field_idx];
        field
            .options
            .iter()
            .position(|o| o.value == field.current)
            .unwrap_or(0)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (lines, cursor, hint) = if self.picking {
            let field = &self.fields[self.field_idx];
            let lines: Vec<String> = field.options.iter().map(|o| o.label.clone()).collect();
            (lines, self.option_idx, "Enter apply  Esc back")
        } else {
            let lines: Vec<String> = self
                .fields
                .iter()
                .map(|f| format!("{:<12}{}", f.label, current_label(f)))
                .collect();
            (lines, self.field_idx, "Enter select  Esc close")
        };

        let height = (lines.len() as u16 + 4).min(area.height);
        let dialog = centered_rect(44, height, area);
        frame.render_widget(Clear, dialog);
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .title(" Filter Students ")
                .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            dialog,
        );

        let inner = dialog.inner(ratatui::layout::Margin::new(2, 1));
        let constraints: Vec<Constraint> = (0..=lines.len()).map(|_| Constraint::Length(1)).collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, line) in lines.iter().enumerate() {
            let style = if i == cursor {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            if let Some(row) = rows.get(i) {
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(line.clone(), style))),
                    *row,
                );
            }
        }
        if let Some(row) = rows.get(lines.len()) {
            frame.render_widget(
                Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
                *row,
            );
        }
    }
}

fn with_all(options: impl IntoIterator<Item = FilterOption>) -> Vec<FilterOption> {
    let mut all = vec![FilterOption {
        label: "(all)".to_string(),
        value: None,
    }];
    all.extend(options);
    all
}

fn current_label(field: &FilterField) -> &str {
    field
        .options
        .iter()
        .find(|o| o.value == field.current)
        .map_or("(all)", |o| o.label.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colleges() -> Vec<College> {
        vec![College {
            id: 1,
            college_code: "CCS".into(),
            college_name: "Computer Studies".into(),
            num_programs: 1,
            num_students: 1,
        }]
    }

    fn programs() -> Vec<Program> {
        vec![Program {
            id: 10,
            program_code: "BSCS".into(),
            program_name: "Computer Science".into(),
            college_id: 1,
            college_name: "Computer Studies".into(),
            num_students: 1,
        }]
    }

    fn menu() -> FilterMenu {
        FilterMenu::students(
            &colleges(),
            &programs(),
            &[1, 2],
            &["Male".to_string(), "Female".to_string()],
            &BTreeMap::new(),
        )
    }

    fn press(menu: &mut FilterMenu, code: KeyCode) -> Option<FilterAction> {
        menu.handle_key(KeyEvent::from(code))
    }

    #[test]
    fn picking_a_gender_value_applies_it() {
        let mut menu = menu();
        press(&mut menu, KeyCode::Char('j')); // program
        press(&mut menu, KeyCode::Char('j')); // gender
        press(&mut menu, KeyCode::Enter);
        press(&mut menu, KeyCode::Char('j')); // Male
        press(&mut menu, KeyCode::Char('j')); // Female

        let action = press(&mut menu, KeyCode::Enter).expect("apply");
        assert_eq!(
            action,
            FilterAction::Apply {
                field: "gender",
                value: Some("Female".to_string()),
            }
        );
    }

    #[test]
    fn the_all_entry_clears_the_field() {
        let mut menu = menu();
        press(&mut menu, KeyCode::Enter); // into college options
        let action = press(&mut menu, KeyCode::Enter).expect("apply"); // "(all)"
        assert_eq!(
            action,
            FilterAction::Apply {
                field: "college_id",
                value: None,
            }
        );
    }

    #[test]
    fn an_active_filter_preselects_its_value() {
        let mut active = BTreeMap::new();
        active.insert("year_level".to_string(), "2".to_string());
        let mut menu = FilterMenu::students(&colleges(), &programs(), &[1, 2], &[], &active);

        for _ in 0..3 {
            press(&mut menu, KeyCode::Char('j')); // year level
        }
        press(&mut menu, KeyCode::Enter);

        // Cursor sits on the applied value; Enter re-applies it unchanged.
        let action = press(&mut menu, KeyCode::Enter).expect("apply");
        assert_eq!(
            action,
            FilterAction::Apply {
                field: "year_level",
                value: Some("2".to_string()),
            }
        );
    }

    #[test]
    fn empty_lookups_fall_back_to_the_full_ranges() {
        let mut menu = FilterMenu::students(&[], &[], &[], &[], &BTreeMap::new());
        press(&mut menu, KeyCode::Char('j'));
        press(&mut menu, KeyCode::Char('j')); // gender
        press(&mut menu, KeyCode::Enter);
        assert_eq!(menu.fields[menu.field_idx].options.len(), 3); // (all), Male, Female

        press(&mut menu, KeyCode::Esc); // back to fields
        press(&mut menu, KeyCode::Char('j')); // year level
        press(&mut menu, KeyCode::Enter);
        assert_eq!(menu.fields[menu.field_idx].options.len(), 5); // (all) + 4 years
    }

    #[test]
    fn esc_steps_back_then_cancels() {
        let mut menu = menu();
        press(&mut menu, KeyCode::Enter);
        assert_eq!(press(&mut menu, KeyCode::Esc), None); // back to field list
        assert_eq!(press(&mut menu, KeyCode::Esc), Some(FilterAction::Cancel));
    }
}
