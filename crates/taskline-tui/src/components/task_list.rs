use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use taskline_core::task::Task;
use taskline_core::{Priority, TaskStatus};

/// The single shared task list component. Renders the current array in
/// backend order with a cursor; edit/delete/status actions on the
/// highlighted task are delegated to the controller.
pub struct TaskListView {
    state: ListState,
}

impl TaskListView {
    pub fn new() -> Self {
        Self {
            state: ListState::default(),
        }
    }

    pub fn sync(&mut self, len: usize) {
        if len == 0 {
            self.state.select(None);
        } else {
            match self.state.selected() {
                Some(i) if i < len => {}
                Some(_) => self.state.select(Some(len - 1)),
                None => self.state.select(Some(0)),
            }
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn handle_key(&mut self, key: KeyEvent, len: usize) {
        if len == 0 {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') => self.state.select(Some(0)),
            KeyCode::Char('G') => self.state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        tasks: &[Task],
        title: &str,
        focused: bool,
    ) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(border_style);

        let items: Vec<ListItem> = tasks
            .iter()
            .map(|task| {
                let priority = Span::styled(
                    format!("{} ", task.priority),
                    priority_color(task.priority),
                );
                let text = Span::raw(task.title.as_str());
                let assignee = Span::styled(
                    format!("  @{}", task.assignee),
                    Style::default().fg(Color::DarkGray),
                );
                let status = Span::styled(
                    format!("  [{}]", task.status.display_name()),
                    status_color(task.status),
                );
                let due_style = if task.is_overdue {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let due = Span::styled(format!("  due {}", task.end_date), due_style);
                ListItem::new(Line::from(vec![priority, text, assignee, status, due]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = self.state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn status_color(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Pending => Style::default().fg(Color::Gray),
        TaskStatus::InProgress => Style::default().fg(Color::Yellow),
        TaskStatus::Completed => Style::default().fg(Color::Green),
    }
}

fn priority_color(priority: Priority) -> Style {
    match priority {
        Priority::Critical => Style::default().fg(Color::Red).bold(),
        Priority::Urgent => Style::default().fg(Color::LightRed),
        Priority::High => Style::default().fg(Color::Yellow),
        Priority::Medium => Style::default().fg(Color::Blue),
        Priority::Low => Style::default().fg(Color::DarkGray),
    }
}
