use chrono::{NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use taskline_core::project::{CreateProject, Project, UpdateProject};
use taskline_core::ProjectStatus;

use super::centered_rect;

/// The in-progress, not-yet-submitted copy of a project's fields.
/// Text fields are kept as raw input; parsing happens at submit time.
#[derive(Debug, Clone)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub status: ProjectStatus,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            status: ProjectStatus::Planning,
        }
    }
}

impl ProjectDraft {
    /// Seed from an existing project for editing.
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone().unwrap_or_default(),
            start_date: project
                .start_date
                .map(|d| d.format("%Y-%m-%dT%H:%M").to_string())
                .unwrap_or_default(),
            end_date: project
                .end_date
                .map(|d| d.format("%Y-%m-%dT%H:%M").to_string())
                .unwrap_or_default(),
            status: project.status,
        }
    }

    pub fn create_payload(&self) -> Result<CreateProject, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".into());
        }
        Ok(CreateProject {
            name: name.to_string(),
            description: optional(&self.description),
            start_date: parse_datetime(&self.start_date)?,
            end_date: parse_datetime(&self.end_date)?,
            status: self.status,
        })
    }

    pub fn update_payload(&self) -> Result<UpdateProject, String> {
        let create = self.create_payload()?;
        Ok(UpdateProject {
            name: Some(create.name),
            description: create.description,
            start_date: create.start_date,
            end_date: create.end_date,
            status: Some(self.status),
        })
    }
}

fn optional(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accepts `2024-01-31T09:00`, with seconds, or a bare date (midnight).
/// Empty input means the field was left blank.
fn parse_datetime(s: &str) -> Result<Option<NaiveDateTime>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            s.parse::<NaiveDate>()
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap())
        })
        .map(Some)
        .map_err(|_| format!("Invalid date: {s}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Description,
    StartDate,
    EndDate,
    Status,
}

impl ProjectField {
    pub const ALL: &[ProjectField] = &[
        ProjectField::Name,
        ProjectField::Description,
        ProjectField::StartDate,
        ProjectField::EndDate,
        ProjectField::Status,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProjectField::Name => "Name",
            ProjectField::Description => "Description",
            ProjectField::StartDate => "Start date",
            ProjectField::EndDate => "End date",
            ProjectField::Status => "Status",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Apply one keystroke to the draft. Returns false for keys the form does
/// not consume (Enter and Esc stay with the controller).
pub fn edit_draft(draft: &mut ProjectDraft, field: &mut ProjectField, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            *field = field.next();
            true
        }
        KeyCode::BackTab | KeyCode::Up => {
            *field = field.prev();
            true
        }
        KeyCode::Left if *field == ProjectField::Status => {
            draft.status = cycle_status(draft.status, -1);
            true
        }
        KeyCode::Right if *field == ProjectField::Status => {
            draft.status = cycle_status(draft.status, 1);
            true
        }
        KeyCode::Char(c) => {
            if let Some(value) = text_field_mut(draft, *field) {
                value.push(c);
            }
            true
        }
        KeyCode::Backspace => {
            if let Some(value) = text_field_mut(draft, *field) {
                value.pop();
            }
            true
        }
        _ => false,
    }
}

fn text_field_mut(draft: &mut ProjectDraft, field: ProjectField) -> Option<&mut String> {
    match field {
        ProjectField::Name => Some(&mut draft.name),
        ProjectField::Description => Some(&mut draft.description),
        ProjectField::StartDate => Some(&mut draft.start_date),
        ProjectField::EndDate => Some(&mut draft.end_date),
        ProjectField::Status => None,
    }
}

fn cycle_status(current: ProjectStatus, step: i64) -> ProjectStatus {
    let all = ProjectStatus::ALL;
    let idx = all.iter().position(|&s| s == current).unwrap() as i64;
    let next = (idx + step).rem_euclid(all.len() as i64) as usize;
    all[next]
}

pub fn render(
    frame: &mut Frame,
    draft: &ProjectDraft,
    field: ProjectField,
    editing: bool,
    message: Option<&str>,
) {
    let title = if editing { " Edit Project " } else { " New Project " };
    let area = centered_rect(52, 16, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for &f in ProjectField::ALL {
        let value = match f {
            ProjectField::Name => draft.name.as_str(),
            ProjectField::Description => draft.description.as_str(),
            ProjectField::StartDate => draft.start_date.as_str(),
            ProjectField::EndDate => draft.end_date.as_str(),
            ProjectField::Status => draft.status.display_name(),
        };
        let style = if f == field {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", f.label()), Style::default().fg(Color::DarkGray)),
            Span::styled(value.to_string(), style),
        ]));
    }
    lines.push(Line::raw(""));
    if let Some(msg) = message {
        lines.push(Line::styled(msg.to_string(), Style::default().fg(Color::Red)));
    }
    lines.push(Line::styled(
        "Tab next field   \u{2190}/\u{2192} status   Enter save   Esc cancel",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines), inner);
}
