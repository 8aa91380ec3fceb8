use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use taskline_core::project::Project;
use taskline_core::ProjectStatus;

/// Cursor-owning view over the projects array. Pure rendering plus
/// navigation; all actions on the highlighted project are delegated to
/// the controller.
pub struct ProjectListView {
    state: ListState,
}

impl ProjectListView {
    pub fn new() -> Self {
        Self {
            state: ListState::default(),
        }
    }

    /// Keep the cursor valid after the array was replaced wholesale.
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
        projects: &[Project],
        selected_id: Option<i64>,
        focused: bool,
    ) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(" Projects ")
            .borders(Borders::ALL)
            .border_style(border_style);

        let items: Vec<ListItem> = projects
            .iter()
            .map(|project| {
                let marker = if selected_id == Some(project.id) {
                    Span::styled("* ", Style::default().fg(Color::Green).bold())
                } else {
                    Span::raw("  ")
                };
                let name = Span::raw(project.name.as_str());
                let status = Span::styled(
                    format!("  [{}]", project.status.display_name()),
                    status_color(project.status),
                );
                let count = Span::styled(
                    format!("  Tasks: {}", project.total_tasks()),
                    Style::default().fg(Color::DarkGray),
                );
                ListItem::new(Line::from(vec![marker, name, status, count]))
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

fn status_color(status: ProjectStatus) -> Style {
    match status {
        ProjectStatus::Planning => Style::default().fg(Color::Blue),
        ProjectStatus::Active => Style::default().fg(Color::Green),
        ProjectStatus::OnHold => Style::default().fg(Color::Yellow),
        ProjectStatus::Completed => Style::default().fg(Color::Magenta),
        ProjectStatus::Cancelled => Style::default().fg(Color::Red),
    }
}
