use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use rstodo_core::add_form::{AddForm, SaveOutcome};
use rstodo_core::api::HttpApi;
use rstodo_core::board::{Board, CompletionChange, EditTarget};
use rstodo_core::config::Config;
use rstodo_core::login::LoginForm;
use rstodo_core::model::{TaskId, Title, TitleId};
use rstodo_core::session::Session;
use rstodo_core::util::pluralise;
use std::io;
use std::time::{Duration, Instant};
use tracing::{error, info};

const TICK: Duration = Duration::from_millis(100);

/// Which screen the TUI is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Todo,
}

/// Panes of the Todo screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Ongoing,
    Completed,
    Done,
}

impl Pane {
    fn next(self) -> Self {
        match self {
            Pane::Ongoing => Pane::Completed,
            Pane::Completed => Pane::Done,
            Pane::Done => Pane::Ongoing,
        }
    }

    fn prev(self) -> Self {
        match self {
            Pane::Ongoing => Pane::Done,
            Pane::Completed => Pane::Ongoing,
            Pane::Done => Pane::Completed,
        }
    }
}

/// A status message shown at the bottom
struct StatusMessage {
    text: String,
    is_error: bool,
}

/// Applies an editing key to a single-line text field.
///
/// `cursor` is a byte offset kept on a char boundary. Returns false for keys
/// that are not text editing.
fn edit_text(text: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    *cursor = (*cursor).min(text.len());
    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                let prev = text[..*cursor]
                    .char_indices()
                    .last()
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                text.remove(prev);
                *cursor = prev;
            }
        }
        KeyCode::Delete => {
            if *cursor < text.len() {
                text.remove(*cursor);
            }
        }
        KeyCode::Left => {
            if *cursor > 0 {
                *cursor = text[..*cursor]
                    .char_indices()
                    .last()
                    .map(|(i, _)| i)
                    .unwrap_or(0);
            }
        }
        KeyCode::Right => {
            if let Some(c) = text[*cursor..].chars().next() {
                *cursor += c.len_utf8();
            }
        }
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = text.len(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            text.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        _ => return false,
    }
    true
}

/// Renders a text field, drawing a block cursor when focused
fn input_spans(text: &str, cursor: usize, focused: bool, masked: bool) -> Vec<Span<'static>> {
    let (shown, col) = if masked {
        let col = text[..cursor.min(text.len())].chars().count();
        ("*".repeat(text.chars().count()), col)
    } else {
        (text.to_string(), cursor.min(text.len()))
    };

    if !focused {
        return vec![Span::raw(shown)];
    }

    let ch_len = shown[col..].chars().next().map(|c| c.len_utf8()).unwrap_or(0);
    let cursor_char = if ch_len > 0 {
        shown[col..col + ch_len].to_string()
    } else {
        " ".to_string()
    };

    vec![
        Span::raw(shown[..col].to_string()),
        Span::styled(cursor_char, Style::default().bg(Color::White).fg(Color::Black)),
        Span::raw(shown[col + ch_len..].to_string()),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Username,
    Password,
}

/// Login screen state: the form plus cursor and focus
struct LoginScreen {
    form: LoginForm,
    focus: LoginField,
    cursor: usize,
}

impl LoginScreen {
    fn new(username: Option<String>) -> Self {
        let form = match username {
            Some(u) => LoginForm::with_username(u),
            None => LoginForm::new(),
        };
        // Jump straight to the password when the username is remembered
        let focus = if form.username.is_empty() {
            LoginField::Username
        } else {
            LoginField::Password
        };
        LoginScreen {
            form,
            focus,
            cursor: 0,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
        self.cursor = self.field().len();
    }

    fn field(&self) -> &str {
        match self.focus {
            LoginField::Username => &self.form.username,
            LoginField::Password => &self.form.password,
        }
    }

    fn handle_text(&mut self, key: KeyEvent) {
        let field = match self.focus {
            LoginField::Username => &mut self.form.username,
            LoginField::Password => &mut self.form.password,
        };
        edit_text(field, &mut self.cursor, key);
    }
}

/// The Add Task overlay. Focus 0 is the title, 1.. are the entries.
struct AddModal {
    form: AddForm,
    focus: usize,
    cursor: usize,
    /// Set after a successful save; the overlay closes once it passes
    dismiss_at: Option<Instant>,
}

impl AddModal {
    fn new() -> Self {
        AddModal {
            form: AddForm::new(),
            focus: 0,
            cursor: 0,
            dismiss_at: None,
        }
    }

    fn field_count(&self) -> usize {
        self.form.entries().len() + 1
    }

    fn field_text(&self, index: usize) -> &str {
        if index == 0 {
            self.form.title()
        } else {
            self.form
                .entries()
                .get(index - 1)
                .map(|s| s.as_str())
                .unwrap_or("")
        }
    }

    fn focus_on(&mut self, index: usize) {
        self.focus = index.min(self.field_count() - 1);
        self.cursor = self.field_text(self.focus).len();
    }

    fn focus_next(&mut self) {
        self.focus_on((self.focus + 1) % self.field_count());
    }

    fn focus_prev(&mut self) {
        let n = self.field_count();
        self.focus_on((self.focus + n - 1) % n);
    }

    fn add_entry(&mut self) {
        let i = self.form.add_entry();
        self.focus_on(i + 1);
    }

    /// Removes the focused entry; the title and the last entry stay
    fn remove_entry(&mut self) {
        if self.focus > 0 && self.form.remove_entry(self.focus - 1) {
            self.focus_on(self.focus);
        }
    }

    fn handle_text(&mut self, key: KeyEvent) {
        let field = if self.focus == 0 {
            Some(self.form.title_mut())
        } else {
            self.form.entry_mut(self.focus - 1)
        };
        if let Some(field) = field {
            edit_text(field, &mut self.cursor, key);
        }
    }
}

/// What a confirmation popup is confirming
#[derive(Debug, Clone)]
enum ConfirmAction {
    DeleteTitle { id: TitleId, name: String },
    DeleteTask { id: TaskId, desc: String },
}

struct ConfirmPopup {
    action: ConfirmAction,
    message: String,
}

impl ConfirmPopup {
    fn new(action: ConfirmAction) -> Self {
        let message = match &action {
            ConfirmAction::DeleteTitle { name, .. } => {
                format!("Delete \"{}\" and all of its tasks?", name)
            }
            ConfirmAction::DeleteTask { desc, .. } => format!("Delete task \"{}\"?", desc),
        };
        ConfirmPopup { action, message }
    }
}

struct App {
    api: HttpApi,
    conf: Config,
    screen: Screen,
    login: LoginScreen,
    session: Option<Session>,
    board: Board,
    pane: Pane,
    ongoing_state: ListState,
    completed_state: ListState,
    done_state: ListState,
    /// Selection inside the Task List overlay
    task_state: ListState,
    /// Cursor into the draft while editing a title or task
    edit_cursor: usize,
    add_modal: Option<AddModal>,
    confirm_popup: Option<ConfirmPopup>,
    status_message: Option<StatusMessage>,
    show_help: bool,
    should_quit: bool,
}

impl App {
    fn new(conf: Config) -> rstodo_core::Result<Self> {
        let api = HttpApi::from_config(&conf)?;
        let session = Session::load(&conf.session_file);
        let login = LoginScreen::new(session.as_ref().map(|s| s.username.clone()));

        Ok(App {
            api,
            conf,
            screen: Screen::Login,
            login,
            session,
            board: Board::new(),
            pane: Pane::Ongoing,
            ongoing_state: ListState::default(),
            completed_state: ListState::default(),
            done_state: ListState::default(),
            task_state: ListState::default(),
            edit_cursor: 0,
            add_modal: None,
            confirm_popup: None,
            status_message: None,
            show_help: false,
            should_quit: false,
        })
    }

    fn set_status(&mut self, msg: &str, is_error: bool) {
        self.status_message = Some(StatusMessage {
            text: msg.to_string(),
            is_error,
        });
    }

    /// Loads the board, reporting a failure in the status bar
    fn reload(&mut self) {
        match self.board.refresh_all(&self.api) {
            Ok(report) if report.is_success() => {
                let msg = format!("Loaded {}", pluralise(self.board.titles().len(), "title"));
                self.set_status(&msg, false);
            }
            Ok(report) => {
                let msg = format!(
                    "Loaded {}, tasks of {} could not be loaded",
                    pluralise(self.board.titles().len(), "title"),
                    report.failed.len()
                );
                self.set_status(&msg, true);
            }
            Err(e) => {
                error!(error = %e, "loading the board failed");
                self.set_status("Could not load titles", true);
            }
        }
        self.clamp_selections();
    }

    fn pane_len(&self, pane: Pane) -> usize {
        match pane {
            Pane::Ongoing => self.board.ongoing_titles().len(),
            Pane::Completed => self.board.completed_titles().len(),
            Pane::Done => self.board.done_tasks().len(),
        }
    }

    fn pane_state(&mut self, pane: Pane) -> &mut ListState {
        match pane {
            Pane::Ongoing => &mut self.ongoing_state,
            Pane::Completed => &mut self.completed_state,
            Pane::Done => &mut self.done_state,
        }
    }

    fn clamp_selections(&mut self) {
        for pane in [Pane::Ongoing, Pane::Completed, Pane::Done] {
            let len = self.pane_len(pane);
            clamp(self.pane_state(pane), len);
        }
        let len = self.board.open_list().len();
        clamp(&mut self.task_state, len);
    }

    fn move_selection(&mut self, delta: i32) {
        let (state, len) = if self.board.current_title().is_some() {
            let len = self.board.open_list().len();
            (&mut self.task_state, len)
        } else {
            let len = self.pane_len(self.pane);
            (self.pane_state(self.pane), len)
        };
        if len == 0 {
            state.select(None);
            return;
        }
        let current = state.selected().unwrap_or(0) as i32;
        let next = (current + delta).clamp(0, len as i32 - 1);
        state.select(Some(next as usize));
    }

    fn selected_title(&self) -> Option<(TitleId, String)> {
        let (titles, state) = match self.pane {
            Pane::Ongoing => (self.board.ongoing_titles(), &self.ongoing_state),
            Pane::Completed => (self.board.completed_titles(), &self.completed_state),
            Pane::Done => return None,
        };
        state
            .selected()
            .and_then(|i| titles.get(i))
            .map(|t| (t.id.clone(), t.title.clone()))
    }

    fn selected_done_task(&self) -> Option<(TaskId, String)> {
        self.done_state
            .selected()
            .and_then(|i| self.board.done_tasks().get(i).copied())
            .map(|t| (t.id.clone(), t.list_desc.clone()))
    }

    fn selected_open_task(&self) -> Option<(TaskId, String)> {
        self.task_state
            .selected()
            .and_then(|i| self.board.open_list().get(i).copied())
            .map(|t| (t.id.clone(), t.list_desc.clone()))
    }

    /// Closes the add overlay once its dismissal delay has passed
    fn tick(&mut self) {
        let due = self
            .add_modal
            .as_ref()
            .and_then(|m| m.dismiss_at)
            .is_some_and(|at| Instant::now() >= at);
        if due {
            self.add_modal = None;
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Global quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                self.should_quit = true;
                return;
            }

            if self.show_help {
                self.show_help = false;
                return;
            }

            if self.screen == Screen::Login {
                self.handle_login_input(key);
                return;
            }

            if self.confirm_popup.is_some() {
                self.handle_confirm_popup_input(key);
                return;
            }

            if self.board.editing().is_some() {
                self.handle_edit_input(key);
                return;
            }

            if self.add_modal.is_some() {
                self.handle_add_input(key);
                return;
            }

            if self.board.current_title().is_some() {
                self.handle_task_list_input(key);
                return;
            }

            self.handle_board_input(key);
        }
    }

    fn handle_login_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login.toggle_focus();
            }
            KeyCode::Enter => self.do_login(),
            _ => self.login.handle_text(key),
        }
    }

    fn do_login(&mut self) {
        let session = match self.login.form.submit(&self.api) {
            Some(s) => s,
            None => return,
        };

        if let Err(e) = session.save(&self.conf.session_file) {
            error!(error = %e, "could not save session");
        }
        info!(username = %session.username, "entering todo screen");
        self.session = Some(session);
        self.login.form.password.clear();
        self.screen = Screen::Todo;
        self.reload();
    }

    fn handle_board_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.pane = self.pane.next(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.pane = self.pane.prev()
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('a') => self.add_modal = Some(AddModal::new()),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Enter => {
                if let Some((id, _)) = self.selected_title() {
                    self.do_open_title(&id);
                }
            }
            KeyCode::Char('e') => match self.pane {
                Pane::Done => {
                    if let Some((id, _)) = self.selected_done_task() {
                        self.begin_task_edit(&id);
                    }
                }
                _ => {
                    if let Some((id, _)) = self.selected_title() {
                        self.begin_title_edit(&id);
                    }
                }
            },
            KeyCode::Char(' ') | KeyCode::Char('u') if self.pane == Pane::Done => {
                if let Some((id, _)) = self.selected_done_task() {
                    self.do_set_done(&id, false);
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => match self.pane {
                Pane::Done => {
                    if let Some((id, desc)) = self.selected_done_task() {
                        self.confirm_popup =
                            Some(ConfirmPopup::new(ConfirmAction::DeleteTask { id, desc }));
                    }
                }
                _ => {
                    if let Some((id, name)) = self.selected_title() {
                        self.confirm_popup =
                            Some(ConfirmPopup::new(ConfirmAction::DeleteTitle { id, name }));
                    }
                }
            },
            _ => {}
        }
    }

    fn handle_task_list_input(&mut self, key: KeyEvent) {
        let open_id = match self.board.current_title() {
            Some(open) => open.id.clone(),
            None => return,
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.board.close_title();
                self.task_state.select(None);
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some((id, _)) = self.selected_open_task() {
                    let done = self.board.store().task(&id).is_some_and(|t| t.done);
                    self.do_set_done(&id, !done);
                }
            }
            KeyCode::Char('m') => self.do_mark_all(&open_id),
            KeyCode::Char('e') => {
                if let Some((id, _)) = self.selected_open_task() {
                    self.begin_task_edit(&id);
                }
            }
            KeyCode::Char('E') => self.begin_title_edit(&open_id),
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some((id, desc)) = self.selected_open_task() {
                    self.confirm_popup =
                        Some(ConfirmPopup::new(ConfirmAction::DeleteTask { id, desc }));
                }
            }
            _ => {}
        }
    }

    fn handle_edit_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.board.cancel_edit();
                self.set_status("Edit cancelled", false);
            }
            KeyCode::Enter => match self.board.commit_edit(&self.api) {
                Ok(()) => self.set_status("Saved", false),
                Err(e) => {
                    error!(error = %e, "saving edit failed");
                    self.set_status(&format!("Could not save: {}", e), true);
                }
            },
            _ => {
                if let Some(draft) = self.board.edit_draft_mut() {
                    edit_text(draft, &mut self.edit_cursor, key);
                }
            }
        }
    }

    fn handle_add_input(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let modal = match self.add_modal.as_mut() {
            Some(m) => m,
            None => return,
        };

        // Saved and waiting to close
        if modal.dismiss_at.is_some() {
            if key.code == KeyCode::Esc {
                self.add_modal = None;
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.add_modal = None,
            KeyCode::Tab | KeyCode::Down => modal.focus_next(),
            KeyCode::BackTab | KeyCode::Up => modal.focus_prev(),
            KeyCode::Char('n') if ctrl => modal.add_entry(),
            KeyCode::Char('d') if ctrl => modal.remove_entry(),
            KeyCode::Char('s') if ctrl => self.do_save_add(),
            KeyCode::Enter => self.do_save_add(),
            _ => modal.handle_text(key),
        }
    }

    fn do_save_add(&mut self) {
        let modal = match self.add_modal.as_mut() {
            Some(m) => m,
            None => return,
        };

        let mut added = None;
        let outcome = modal
            .form
            .save(&self.api, self.session.as_ref(), |id| added = Some(id.cloned()));

        if let SaveOutcome::Saved { dismiss_after, .. } = outcome {
            modal.dismiss_at = Some(Instant::now() + dismiss_after);
        }

        if let Some(new_id) = added {
            match self.board.on_title_added(&self.api, new_id.as_ref()) {
                Ok(()) => self.task_state.select(Some(0)),
                Err(e) => {
                    error!(error = %e, "refreshing after add failed");
                    self.set_status("Title added, but the list could not be refreshed", true);
                }
            }
            self.clamp_selections();
        }
    }

    fn do_open_title(&mut self, id: &TitleId) {
        match self.board.open_title(&self.api, id) {
            Ok(()) => {
                let len = self.board.open_list().len();
                self.task_state.select(if len > 0 { Some(0) } else { None });
            }
            Err(e) => {
                error!(error = %e, "opening title failed");
                self.set_status("Could not load tasks", true);
            }
        }
        self.clamp_selections();
    }

    fn do_set_done(&mut self, id: &TaskId, done: bool) {
        match self.board.set_task_done(&self.api, id, done) {
            Ok(CompletionChange::Completed(t)) => {
                let name = self.title_name(&t);
                self.set_status(&format!("\"{}\" completed", name), false);
            }
            Ok(CompletionChange::Reopened(t)) => {
                let name = self.title_name(&t);
                self.set_status(&format!("\"{}\" is ongoing again", name), false);
            }
            Ok(CompletionChange::Unchanged) => {
                self.set_status(if done { "Marked done" } else { "Marked not done" }, false);
            }
            Err(e) => {
                error!(error = %e, "toggling task failed");
                self.set_status("Could not update task", true);
            }
        }
        self.clamp_selections();
    }

    fn do_mark_all(&mut self, title_id: &TitleId) {
        match self.board.mark_all_done(&self.api, title_id) {
            Ok(report) if report.is_success() => {
                let msg = format!("Marked {} done", pluralise(report.succeeded.len(), "task"));
                self.set_status(&msg, false);
            }
            Ok(report) => {
                let msg = format!(
                    "Marked {} done, {} failed",
                    pluralise(report.succeeded.len(), "task"),
                    report.failed.len()
                );
                self.set_status(&msg, true);
            }
            Err(e) => {
                error!(error = %e, "mark all failed");
                self.set_status("Could not mark tasks done", true);
            }
        }
        self.clamp_selections();
    }

    fn begin_title_edit(&mut self, id: &TitleId) {
        if self.board.begin_title_edit(id).is_ok() {
            self.edit_cursor = self.board.editing().map(|e| e.draft.len()).unwrap_or(0);
        }
    }

    fn begin_task_edit(&mut self, id: &TaskId) {
        if self.board.begin_task_edit(id).is_ok() {
            self.edit_cursor = self.board.editing().map(|e| e.draft.len()).unwrap_or(0);
        }
    }

    fn title_name(&self, id: &TitleId) -> String {
        self.board
            .store()
            .title(id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn handle_confirm_popup_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(popup) = self.confirm_popup.take() {
                    self.execute_confirmed_action(popup.action);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_popup = None;
                self.set_status("Cancelled", false);
            }
            _ => {}
        }
    }

    fn execute_confirmed_action(&mut self, action: ConfirmAction) {
        let (result, what) = match &action {
            ConfirmAction::DeleteTitle { id, name } => {
                (self.board.delete_title(&self.api, id), name)
            }
            ConfirmAction::DeleteTask { id, desc } => (self.board.delete_task(&self.api, id), desc),
        };
        match result {
            Ok(()) => self.set_status(&format!("Deleted \"{}\"", what), false),
            Err(e) => {
                error!(error = %e, "delete failed");
                self.set_status(&format!("Could not delete \"{}\"", what), true);
            }
        }
        self.clamp_selections();
    }
}

fn clamp(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let term_width = f.area().width as usize;
    let hint_text = build_help_hint(app);
    let hint_height = if term_width > 0 {
        hint_text.len().div_ceil(term_width).max(1) as u16
    } else {
        1
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),           // Header
            Constraint::Min(5),              // Main content
            Constraint::Length(1),           // Status bar
            Constraint::Length(hint_height), // Help hint (wraps)
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    match app.screen {
        Screen::Login => draw_login(f, app, chunks[1]),
        Screen::Todo => draw_board(f, app, chunks[1]),
    }

    draw_status_bar(f, app, chunks[2]);
    draw_help_hint(f, &hint_text, chunks[3]);

    if app.screen == Screen::Todo {
        if app.board.current_title().is_some() {
            draw_task_list(f, app);
        }
        if app.add_modal.is_some() {
            draw_add_modal(f, app);
        }
        if app.board.editing().is_some() {
            draw_edit_popup(f, app);
        }
        if app.confirm_popup.is_some() {
            draw_confirm_popup(f, app);
        }
    }

    if app.show_help {
        draw_help_popup(f);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " rstodo ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let (Screen::Todo, Some(session)) = (app.screen, &app.session) {
        spans.push(Span::styled(
            format!(" {} ", session.username),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        format!(" {}", app.api.base()),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_login(f: &mut Frame, app: &App, area: Rect) {
    let login = &app.login;
    let box_area = centered_rect_abs(50, 9, area);
    f.render_widget(Clear, box_area);

    let label = |text: &'static str, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(text, style)
    };

    let user_focused = login.focus == LoginField::Username;
    let mut user_line = vec![label("  Username: ", user_focused)];
    user_line.extend(input_spans(
        &login.form.username,
        login.cursor,
        user_focused,
        false,
    ));

    let mut pass_line = vec![label("  Password: ", !user_focused)];
    pass_line.extend(input_spans(
        &login.form.password,
        login.cursor,
        !user_focused,
        true,
    ));

    let mut lines = vec![
        Line::from(""),
        Line::from(user_line),
        Line::from(""),
        Line::from(pass_line),
        Line::from(""),
    ];
    if let Some(err) = &login.form.error {
        lines.push(Line::from(Span::styled(
            format!("  {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(" Log in ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(widget, box_area);
}

/// Title rows with a done/total count once their tasks are loaded
fn title_items(board: &Board, titles: Vec<&Title>, color: Color) -> Vec<ListItem<'static>> {
    titles
        .into_iter()
        .map(|t| {
            let tasks = board.store().tasks_of(&t.id);
            let done = tasks.iter().filter(|t| t.done).count();
            let progress = if board.store().is_loaded(&t.id) {
                format!("  {}/{}", done, tasks.len())
            } else {
                String::new()
            };
            ListItem::new(Line::from(vec![
                Span::styled(t.title.clone(), Style::default().fg(color)),
                Span::styled(progress, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect()
}

fn draw_board(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(30),
            Constraint::Percentage(35),
        ])
        .split(area);

    let ongoing = title_items(&app.board, app.board.ongoing_titles(), Color::White);
    let completed = title_items(&app.board, app.board.completed_titles(), Color::Green);
    let done: Vec<ListItem<'static>> = app
        .board
        .done_tasks()
        .into_iter()
        .map(|t| {
            ListItem::new(Line::from(vec![
                Span::styled("[x] ", Style::default().fg(Color::Green)),
                Span::styled(
                    t.list_desc.clone(),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                ),
            ]))
        })
        .collect();

    let panes = [
        (Pane::Ongoing, " Ongoing ", ongoing),
        (Pane::Completed, " Completed ", completed),
        (Pane::Done, " Done ", done),
    ];

    for (i, (pane, name, items)) in panes.into_iter().enumerate() {
        let count = items.len();
        let border = if pane == app.pane {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{}({}) ", name, count))
                    .borders(Borders::ALL)
                    .border_style(border),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Indexed(236))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        f.render_stateful_widget(list, columns[i], app.pane_state(pane));
    }
}

fn draw_task_list(f: &mut Frame, app: &mut App) {
    let open = match app.board.current_title() {
        Some(o) => o.clone(),
        None => return,
    };

    let area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = app
        .board
        .open_list()
        .into_iter()
        .map(|t| {
            let line = if t.done {
                vec![
                    Span::styled("[x] ", Style::default().fg(Color::Green)),
                    Span::styled(t.list_desc.clone(), Style::default().fg(Color::DarkGray)),
                ]
            } else {
                vec![
                    Span::styled("[ ] ", Style::default().fg(Color::DarkGray)),
                    Span::raw(t.list_desc.clone()),
                ]
            };
            ListItem::new(Line::from(line))
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" {} ", open.name))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Indexed(236))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.task_state);

    if empty {
        let inner = Rect::new(area.x + 2, area.y + 1, area.width.saturating_sub(4), 1);
        f.render_widget(
            Paragraph::new(Span::styled(
                "Nothing left to do",
                Style::default().fg(Color::DarkGray),
            )),
            inner,
        );
    }
}

fn draw_add_modal(f: &mut Frame, app: &App) {
    let modal = match &app.add_modal {
        Some(m) => m,
        None => return,
    };

    let entries = modal.form.entries();
    let width = (f.area().width as usize * 70 / 100).clamp(40, 80) as u16;
    let height = (entries.len() as u16 + 8).min(f.area().height);
    let area = centered_rect_abs(width, height, f.area());
    f.render_widget(Clear, area);

    let field_line = |index: usize, label: String| {
        let focused = modal.focus == index;
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![Span::styled(label, style)];
        spans.extend(input_spans(
            modal.field_text(index),
            modal.cursor,
            focused,
            false,
        ));
        Line::from(spans)
    };

    let mut lines = vec![field_line(0, "  Title: ".to_string()), Line::from("")];
    for i in 0..entries.len() {
        lines.push(field_line(i + 1, format!("  {:>2}. ", i + 1)));
    }
    lines.push(Line::from(""));
    if let Some(msg) = modal.form.message() {
        let color = if msg.is_error { Color::Red } else { Color::Green };
        lines.push(Line::from(Span::styled(
            format!("  {}", msg.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        " Enter: save | Tab: next field | Ctrl+N: add task | Ctrl+D: remove task | Esc: close",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Add Task ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn draw_edit_popup(f: &mut Frame, app: &App) {
    let edit = match app.board.editing() {
        Some(e) => e,
        None => return,
    };

    let title = match edit.target {
        EditTarget::Title(_) => " Rename title ",
        EditTarget::Task(_) => " Edit task ",
    };

    let width = (f.area().width as usize * 60 / 100).clamp(30, 70) as u16;
    let area = centered_rect_abs(width, 5, f.area());
    f.render_widget(Clear, area);

    let mut input = vec![Span::styled("  > ", Style::default().fg(Color::Yellow))];
    input.extend(input_spans(&edit.draft, app.edit_cursor, true, false));

    let lines = vec![
        Line::from(input),
        Line::from(""),
        Line::from(Span::styled(
            " Enter: save | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(widget, area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let popup = match &app.confirm_popup {
        Some(p) => p,
        None => return,
    };

    let width = (popup.message.len() + 6).clamp(30, 60) as u16;
    let area = centered_rect_abs(width, 5, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            &popup.message,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " y: confirm | n/Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Confirm ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.status_message {
        Some(msg) if msg.is_error => (
            msg.text.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Some(msg) => (msg.text.clone(), Style::default().fg(Color::Green)),
        None => (String::new(), Style::default().fg(Color::DarkGray)),
    };

    f.render_widget(Paragraph::new(Span::styled(text, style)), area);
}

fn build_help_hint(app: &App) -> String {
    let segments: Vec<&str> = if app.screen == Screen::Login {
        vec!["Tab: switch field", "Enter: log in", "Esc: quit"]
    } else if app.confirm_popup.is_some() {
        vec!["y: confirm", "n/Esc: cancel"]
    } else if app.board.editing().is_some() {
        vec!["Enter: save", "Esc: cancel"]
    } else if app.add_modal.is_some() {
        vec![
            "Enter: save",
            "Tab: next field",
            "Ctrl+N: add task",
            "Ctrl+D: remove task",
            "Esc: close",
        ]
    } else if app.board.current_title().is_some() {
        vec![
            "?: help",
            "Esc: close",
            "Space: check/uncheck",
            "m: mark all",
            "e: edit",
            "E: rename title",
            "x: delete",
        ]
    } else {
        vec![
            "?: help",
            "q: quit",
            "Tab: pane",
            "Enter: open",
            "a: add",
            "e: edit",
            "x: delete",
            "Space: undo done",
            "r: reload",
        ]
    };

    format!(" {}", segments.join(" | "))
}

fn draw_help_hint(f: &mut Frame, hint_text: &str, area: Rect) {
    let hint_widget = Paragraph::new(Span::styled(
        hint_text,
        Style::default().fg(Color::DarkGray),
    ))
    .wrap(Wrap { trim: false });
    f.render_widget(hint_widget, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = centered_rect(70, 80, f.area());
    f.render_widget(Clear, area);

    let section = |name: &'static str| {
        Line::from(Span::styled(
            name,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("    {:<12}", k), Style::default().fg(Color::White)),
            Span::styled(what, Style::default().fg(Color::DarkGray)),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("  Board"),
        key("Tab/h/l", "Switch pane"),
        key("j/k", "Move selection"),
        key("Enter", "Open the selected title"),
        key("a", "Add a title with tasks"),
        key("e", "Rename title / edit done task"),
        key("x", "Delete title / done task"),
        key("Space/u", "Mark a done task not done"),
        key("r", "Reload everything"),
        Line::from(""),
        section("  Task list"),
        key("Space", "Check or uncheck task"),
        key("m", "Mark every task done"),
        key("e / E", "Edit task / rename title"),
        key("x", "Delete task"),
        key("Esc", "Close"),
        Line::from(""),
        section("  Add Task"),
        key("Tab/Up/Down", "Move between fields"),
        key("Ctrl+N", "Add a task row"),
        key("Ctrl+D", "Remove the focused row"),
        key("Enter", "Save"),
        Line::from(""),
        Line::from(Span::styled(
            "  Press any key to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(help, area);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Helper to create a centered rect with absolute width/height
fn centered_rect_abs(width: u16, height: u16, r: Rect) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    let x = r.x + (r.width.saturating_sub(w)) / 2;
    let y = r.y + (r.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

/// Entry point for the TUI
pub fn run_tui(conf: Config) -> anyhow::Result<()> {
    let mut app = App::new(conf)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            let ev = event::read()?;
            app.handle_event(ev);
        }
        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}
