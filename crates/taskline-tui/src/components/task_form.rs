use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use taskline_core::task::{CreateTask, Task, UpdateTask};
use taskline_core::{Priority, TaskStatus};

use super::centered_rect;

/// Draft for the task modal. `project_id` is pinned to the selected
/// project: the controller resyncs it if the selection changes while a
/// creation draft is open, and the submit path overrides it again with
/// the live selection, so a stale value can never reach the wire.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub priority: String,
    pub start_date: String,
    pub end_date: String,
    pub project_id: i64,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(project_id: i64) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            assignee: String::new(),
            priority: "3".into(),
            start_date: String::new(),
            end_date: String::new(),
            project_id,
            status: TaskStatus::Pending,
        }
    }

    /// Seed from an existing task for editing.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            assignee: task.assignee.clone(),
            priority: task.priority.as_u8().to_string(),
            start_date: task.start_date.to_string(),
            end_date: task.end_date.to_string(),
            project_id: task.project_id,
            status: task.status,
        }
    }

    /// Creation payload. `live_project_id` wins over whatever the draft
    /// holds.
    pub fn create_payload(&self, live_project_id: i64) -> Result<CreateTask, String> {
        let (title, assignee) = self.required_text()?;
        Ok(CreateTask {
            title,
            description: optional(&self.description),
            assignee,
            start_date: parse_date(&self.start_date, "Start date")?,
            end_date: parse_date(&self.end_date, "End date")?,
            priority: self.parse_priority()?,
            project_id: live_project_id,
        })
    }

    pub fn update_payload(&self) -> Result<UpdateTask, String> {
        let (title, assignee) = self.required_text()?;
        Ok(UpdateTask {
            title: Some(title),
            description: optional(&self.description),
            assignee: Some(assignee),
            start_date: Some(parse_date(&self.start_date, "Start date")?),
            end_date: Some(parse_date(&self.end_date, "End date")?),
            priority: Some(self.parse_priority()?),
            status: Some(self.status),
        })
    }

    fn required_text(&self) -> Result<(String, String), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".into());
        }
        let assignee = self.assignee.trim();
        if assignee.is_empty() {
            return Err("Assignee is required".into());
        }
        Ok((title.to_string(), assignee.to_string()))
    }

    fn parse_priority(&self) -> Result<Priority, String> {
        self.priority
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|n| Priority::try_from(n).ok())
            .ok_or_else(|| "Priority must be a number from 1 to 5".into())
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

fn parse_date(s: &str, label: &str) -> Result<NaiveDate, String> {
    s.trim()
        .parse::<NaiveDate>()
        .map_err(|_| format!("{label} must look like 2024-01-31"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Assignee,
    Priority,
    StartDate,
    EndDate,
}

impl TaskField {
    pub const ALL: &[TaskField] = &[
        TaskField::Title,
        TaskField::Description,
        TaskField::Assignee,
        TaskField::Priority,
        TaskField::StartDate,
        TaskField::EndDate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskField::Title => "Title",
            TaskField::Description => "Description",
            TaskField::Assignee => "Assignee",
            TaskField::Priority => "Priority (1-5)",
            TaskField::StartDate => "Start date",
            TaskField::EndDate => "End date",
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

/// Apply one keystroke to the draft. Enter and Esc stay with the
/// controller.
pub fn edit_draft(draft: &mut TaskDraft, field: &mut TaskField, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            *field = field.next();
            true
        }
        KeyCode::BackTab | KeyCode::Up => {
            *field = field.prev();
            true
        }
        KeyCode::Char(c) => {
            text_field_mut(draft, *field).push(c);
            true
        }
        KeyCode::Backspace => {
            text_field_mut(draft, *field).pop();
            true
        }
        _ => false,
    }
}

fn text_field_mut(draft: &mut TaskDraft, field: TaskField) -> &mut String {
    match field {
        TaskField::Title => &mut draft.title,
        TaskField::Description => &mut draft.description,
        TaskField::Assignee => &mut draft.assignee,
        TaskField::Priority => &mut draft.priority,
        TaskField::StartDate => &mut draft.start_date,
        TaskField::EndDate => &mut draft.end_date,
    }
}

pub fn render(
    frame: &mut Frame,
    draft: &TaskDraft,
    field: TaskField,
    editing: bool,
    message: Option<&str>,
) {
    let title = if editing { " Edit Task " } else { " New Task " };
    let area = centered_rect(52, 16, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for &f in TaskField::ALL {
        let value = match f {
            TaskField::Title => draft.title.as_str(),
            TaskField::Description => draft.description.as_str(),
            TaskField::Assignee => draft.assignee.as_str(),
            TaskField::Priority => draft.priority.as_str(),
            TaskField::StartDate => draft.start_date.as_str(),
            TaskField::EndDate => draft.end_date.as_str(),
        };
        let style = if f == field {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<16}", f.label()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(value.to_string(), style),
        ]));
    }
    lines.push(Line::raw(""));
    if let Some(msg) = message {
        lines.push(Line::styled(msg.to_string(), Style::default().fg(Color::Red)));
    }
    lines.push(Line::styled(
        "Tab next field   Enter save   Esc cancel",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines), inner);
}
