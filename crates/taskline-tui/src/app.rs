use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use taskline_client::BlockingClient;
use taskline_core::project::{Project, ProjectFilter};
use taskline_core::task::{Task, TaskFilter};
use taskline_core::TaskStatus;

use crate::components::project_form::{self, ProjectDraft, ProjectField};
use crate::components::project_list::ProjectListView;
use crate::components::task_form::{self, TaskDraft, TaskField};
use crate::components::task_list::TaskListView;
use crate::components::centered_rect;

/// Which modal (if any) is open, and its transient state.
#[derive(Debug, Clone)]
pub enum Mode {
    /// List navigation
    Normal,
    /// Project create/edit form; `editing` holds the id when editing
    ProjectForm {
        draft: ProjectDraft,
        editing: Option<i64>,
        field: ProjectField,
        message: Option<String>,
    },
    /// Task create/edit form
    TaskForm {
        draft: TaskDraft,
        editing: Option<i64>,
        field: TaskField,
        message: Option<String>,
    },
    /// Confirm project deletion
    ConfirmDeleteProject { project: Project },
    /// Confirm task deletion
    ConfirmDeleteTask { task: Task },
    /// Inline status selector for a task
    TaskStatusPick { task: Task, selected: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Projects,
    Tasks,
}

/// Root controller. Owns the canonical in-memory state; every state slot
/// is written through exactly one method, and every mutation refetches
/// the owning list wholesale.
pub struct App {
    client: BlockingClient,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    selected_project: Option<Project>,
    loading: bool,
    error: Option<String>,
    status_message: Option<String>,
    mode: Mode,
    focus: Pane,
    project_list: ProjectListView,
    task_list: TaskListView,
}

impl App {
    pub fn new(client: BlockingClient) -> Self {
        let mut app = Self {
            client,
            projects: Vec::new(),
            tasks: Vec::new(),
            selected_project: None,
            loading: false,
            error: None,
            status_message: None,
            mode: Mode::Normal,
            focus: Pane::Projects,
            project_list: ProjectListView::new(),
            task_list: TaskListView::new(),
        };
        app.load_projects();
        app
    }

    // -- Accessors (used by the event loop and tests) --

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selected_project.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::ProjectForm { .. } | Mode::TaskForm { .. })
    }

    // -- State entry points --

    fn set_projects(&mut self, projects: Vec<Project>) {
        self.projects = projects;
        self.project_list.sync(self.projects.len());
    }

    fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.task_list.sync(self.tasks.len());
    }

    /// Change the selected project. Clearing the selection empties the
    /// task list; setting it refetches tasks and resyncs the pinned
    /// `project_id` of an open creation draft.
    pub fn select_project(&mut self, project: Option<Project>) {
        self.selected_project = project;
        match self.selected_project.as_ref().map(|p| p.id) {
            Some(id) => {
                if let Mode::TaskForm {
                    draft,
                    editing: None,
                    ..
                } = &mut self.mode
                {
                    draft.project_id = id;
                }
                self.load_tasks();
            }
            None => self.set_tasks(Vec::new()),
        }
    }

    fn fail(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn clear_error(&mut self) {
        self.error = None;
    }

    // -- Fetching --

    fn load_projects(&mut self) {
        self.loading = true;
        match self.client.list_projects(&ProjectFilter::default()) {
            Ok(projects) => {
                self.set_projects(projects);
                self.clear_error();
            }
            Err(_) => self.fail("Failed to load projects"),
        }
        self.loading = false;
    }

    /// Refetch tasks for the current selection, replacing the array
    /// wholesale. No selection means no tasks.
    fn load_tasks(&mut self) {
        let Some(project_id) = self.selected_project.as_ref().map(|p| p.id) else {
            self.set_tasks(Vec::new());
            return;
        };
        self.loading = true;
        let filter = TaskFilter {
            project_id: Some(project_id),
            ..Default::default()
        };
        match self.client.list_tasks(&filter) {
            Ok(tasks) => {
                self.set_tasks(tasks);
                self.clear_error();
            }
            Err(_) => self.fail("Failed to load tasks"),
        }
        self.loading = false;
    }

    fn cursor_project(&self) -> Option<&Project> {
        self.project_list
            .selected_index()
            .and_then(|i| self.projects.get(i))
    }

    fn cursor_task(&self) -> Option<&Task> {
        self.task_list
            .selected_index()
            .and_then(|i| self.tasks.get(i))
    }

    // -- Key handling --

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match self.mode.clone() {
            Mode::Normal => self.handle_normal(key),
            Mode::ProjectForm {
                draft,
                editing,
                field,
                ..
            } => self.handle_project_form(key, draft, editing, field),
            Mode::TaskForm {
                draft,
                editing,
                field,
                ..
            } => self.handle_task_form(key, draft, editing, field),
            Mode::ConfirmDeleteProject { project } => {
                self.handle_confirm_delete_project(key, project)
            }
            Mode::ConfirmDeleteTask { task } => self.handle_confirm_delete_task(key, task),
            Mode::TaskStatusPick { task, selected } => {
                self.handle_task_status_pick(key, task, selected)
            }
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Pane::Projects => Pane::Tasks,
                    Pane::Tasks => Pane::Projects,
                };
                return;
            }
            KeyCode::Char('r') => {
                self.load_projects();
                if self.selected_project.is_some() {
                    self.load_tasks();
                }
                return;
            }
            _ => {}
        }

        match self.focus {
            Pane::Projects => self.handle_projects_pane(key),
            Pane::Tasks => self.handle_tasks_pane(key),
        }
    }

    fn handle_projects_pane(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if let Some(project) = self.cursor_project().cloned() {
                    self.select_project(Some(project));
                }
            }
            KeyCode::Char('n') => {
                self.mode = Mode::ProjectForm {
                    draft: ProjectDraft::default(),
                    editing: None,
                    field: ProjectField::Name,
                    message: None,
                };
            }
            KeyCode::Char('e') => {
                if let Some(project) = self.cursor_project() {
                    self.mode = Mode::ProjectForm {
                        draft: ProjectDraft::from_project(project),
                        editing: Some(project.id),
                        field: ProjectField::Name,
                        message: None,
                    };
                }
            }
            KeyCode::Char('d') => {
                if let Some(project) = self.cursor_project().cloned() {
                    self.mode = Mode::ConfirmDeleteProject { project };
                }
            }
            _ => self.project_list.handle_key(key, self.projects.len()),
        }
    }

    fn handle_tasks_pane(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => match self.selected_project.as_ref().map(|p| p.id) {
                Some(project_id) => {
                    self.mode = Mode::TaskForm {
                        draft: TaskDraft::new(project_id),
                        editing: None,
                        field: TaskField::Title,
                        message: None,
                    };
                }
                None => self.fail("Please select a project first"),
            },
            KeyCode::Char('e') => {
                if let Some(task) = self.cursor_task() {
                    self.mode = Mode::TaskForm {
                        draft: TaskDraft::from_task(task),
                        editing: Some(task.id),
                        field: TaskField::Title,
                        message: None,
                    };
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.cursor_task().cloned() {
                    self.mode = Mode::ConfirmDeleteTask { task };
                }
            }
            KeyCode::Char('s') => {
                if let Some(task) = self.cursor_task().cloned() {
                    let selected = TaskStatus::ALL
                        .iter()
                        .position(|&s| s == task.status)
                        .unwrap_or(0);
                    self.mode = Mode::TaskStatusPick { task, selected };
                }
            }
            _ => self.task_list.handle_key(key, self.tasks.len()),
        }
    }

    fn handle_project_form(
        &mut self,
        key: KeyEvent,
        mut draft: ProjectDraft,
        editing: Option<i64>,
        mut field: ProjectField,
    ) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => self.submit_project_form(draft, editing, field),
            _ => {
                if project_form::edit_draft(&mut draft, &mut field, key) {
                    self.mode = Mode::ProjectForm {
                        draft,
                        editing,
                        field,
                        message: None,
                    };
                }
            }
        }
    }

    /// Validation failures keep the form open; the request outcome closes
    /// it either way, with the projects list refetched on success.
    fn submit_project_form(
        &mut self,
        draft: ProjectDraft,
        editing: Option<i64>,
        field: ProjectField,
    ) {
        let result = match editing {
            Some(id) => match draft.update_payload() {
                Ok(update) => self
                    .client
                    .update_project(id, &update)
                    .map(|_| ())
                    .map_err(|_| "Failed to update project"),
                Err(message) => {
                    self.mode = Mode::ProjectForm {
                        draft,
                        editing,
                        field,
                        message: Some(message),
                    };
                    return;
                }
            },
            None => match draft.create_payload() {
                Ok(input) => self
                    .client
                    .create_project(&input)
                    .map(|_| ())
                    .map_err(|_| "Failed to create project"),
                Err(message) => {
                    self.mode = Mode::ProjectForm {
                        draft,
                        editing,
                        field,
                        message: Some(message),
                    };
                    return;
                }
            },
        };

        self.mode = Mode::Normal;
        match result {
            Ok(()) => {
                self.clear_error();
                self.status_message = Some("Project saved".into());
                self.load_projects();
            }
            Err(message) => self.fail(message),
        }
    }

    fn handle_task_form(
        &mut self,
        key: KeyEvent,
        mut draft: TaskDraft,
        editing: Option<i64>,
        mut field: TaskField,
    ) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => self.submit_task_form(draft, editing, field),
            _ => {
                if task_form::edit_draft(&mut draft, &mut field, key) {
                    self.mode = Mode::TaskForm {
                        draft,
                        editing,
                        field,
                        message: None,
                    };
                }
            }
        }
    }

    fn submit_task_form(&mut self, draft: TaskDraft, editing: Option<i64>, field: TaskField) {
        let result = match editing {
            Some(id) => match draft.update_payload() {
                Ok(update) => self
                    .client
                    .update_task(id, &update)
                    .map(|_| ())
                    .map_err(|_| "Failed to update task"),
                Err(message) => {
                    self.mode = Mode::TaskForm {
                        draft,
                        editing,
                        field,
                        message: Some(message),
                    };
                    return;
                }
            },
            None => {
                // The live selection wins over the draft's pinned id.
                let Some(project_id) = self.selected_project.as_ref().map(|p| p.id) else {
                    self.mode = Mode::Normal;
                    self.fail("Please select a project first");
                    return;
                };
                match draft.create_payload(project_id) {
                    Ok(input) => self
                        .client
                        .create_task(&input)
                        .map(|_| ())
                        .map_err(|_| "Failed to create task"),
                    Err(message) => {
                        self.mode = Mode::TaskForm {
                            draft,
                            editing,
                            field,
                            message: Some(message),
                        };
                        return;
                    }
                }
            }
        };

        self.mode = Mode::Normal;
        match result {
            Ok(()) => {
                self.clear_error();
                self.status_message = Some("Task saved".into());
                self.load_tasks();
            }
            Err(message) => self.fail(message),
        }
    }

    fn handle_confirm_delete_project(&mut self, key: KeyEvent, project: Project) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.mode = Mode::Normal;
                self.delete_project(project);
            }
            KeyCode::Char('n') | KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    fn handle_confirm_delete_task(&mut self, key: KeyEvent, task: Task) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.mode = Mode::Normal;
                self.delete_task(task);
            }
            KeyCode::Char('n') | KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    fn handle_task_status_pick(&mut self, key: KeyEvent, task: Task, selected: usize) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let selected = (selected + 1).min(TaskStatus::ALL.len() - 1);
                self.mode = Mode::TaskStatusPick { task, selected };
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let selected = selected.saturating_sub(1);
                self.mode = Mode::TaskStatusPick { task, selected };
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                self.change_task_status(task.id, TaskStatus::ALL[selected]);
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    // -- Mutations (request, then refetch the owning list) --

    fn delete_project(&mut self, project: Project) {
        match self.client.delete_project(project.id) {
            Ok(()) => {
                self.clear_error();
                self.status_message = Some("Project deleted".into());
                self.load_projects();
                if self
                    .selected_project
                    .as_ref()
                    .is_some_and(|p| p.id == project.id)
                {
                    self.select_project(None);
                }
            }
            Err(_) => self.fail("Failed to delete project"),
        }
    }

    fn delete_task(&mut self, task: Task) {
        match self.client.delete_task(task.id) {
            Ok(()) => {
                self.clear_error();
                self.status_message = Some("Task deleted".into());
                self.load_tasks();
            }
            Err(_) => self.fail("Failed to delete task"),
        }
    }

    /// Exactly one status-change call, then exactly one task refetch.
    fn change_task_status(&mut self, task_id: i64, status: TaskStatus) {
        match self.client.set_task_status(task_id, status) {
            Ok(_) => {
                self.clear_error();
                self.load_tasks();
            }
            Err(_) => self.fail("Failed to update task status"),
        }
    }

    // -- Rendering --

    pub fn render(&self, frame: &mut Frame) {
        let banner_height = if self.error.is_some() { 1 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(banner_height),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        if let Some(ref error) = self.error {
            frame.render_widget(
                Paragraph::new(error.as_str())
                    .style(Style::default().fg(Color::White).bg(Color::Red)),
                chunks[0],
            );
        }

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
            .split(chunks[1]);

        let normal = matches!(self.mode, Mode::Normal);
        self.project_list.render(
            frame,
            panes[0],
            &self.projects,
            self.selected_project.as_ref().map(|p| p.id),
            normal && self.focus == Pane::Projects,
        );

        match self.selected_project {
            Some(ref project) => {
                let title = format!("Tasks - {}", project.name);
                self.task_list.render(
                    frame,
                    panes[1],
                    &self.tasks,
                    &title,
                    normal && self.focus == Pane::Tasks,
                );
            }
            None => {
                let block = Block::default()
                    .title(" Tasks ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray));
                frame.render_widget(
                    Paragraph::new("Select a project to view tasks")
                        .style(Style::default().fg(Color::DarkGray))
                        .block(block),
                    panes[1],
                );
            }
        }

        self.render_footer(frame, chunks[2]);
        self.render_modal(frame);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let text = if self.loading {
            "Loading...".to_string()
        } else if let Some(ref msg) = self.status_message {
            msg.clone()
        } else {
            "q quit  Tab pane  Enter select  n new  e edit  d delete  s status  r reload".into()
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }

    fn render_modal(&self, frame: &mut Frame) {
        match &self.mode {
            Mode::Normal => {}
            Mode::ProjectForm {
                draft,
                editing,
                field,
                message,
            } => project_form::render(frame, draft, *field, editing.is_some(), message.as_deref()),
            Mode::TaskForm {
                draft,
                editing,
                field,
                message,
            } => task_form::render(frame, draft, *field, editing.is_some(), message.as_deref()),
            Mode::ConfirmDeleteProject { project } => {
                render_confirm(frame, &format!("Delete project \"{}\"?", project.name));
            }
            Mode::ConfirmDeleteTask { task } => {
                render_confirm(frame, &format!("Delete task \"{}\"?", task.title));
            }
            Mode::TaskStatusPick { selected, .. } => render_status_pick(frame, *selected),
        }
    }
}

fn render_confirm(frame: &mut Frame, prompt: &str) {
    let area = centered_rect(46, 5, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(" Confirm Delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::raw(prompt.to_string()),
            Line::raw(""),
            Line::styled("y delete   n/Esc cancel", Style::default().fg(Color::DarkGray)),
        ]),
        inner,
    );
}

fn render_status_pick(frame: &mut Frame, selected: usize) {
    let area = centered_rect(30, TaskStatus::ALL.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(" Set Status ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let items: Vec<ListItem> = TaskStatus::ALL
        .iter()
        .map(|s| ListItem::new(s.display_name()))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}
