use crate::config::Config;
use crossterm::event::{KeyCode, KeyEvent};
use focusme_core::{FileStore, KeyValueStore, Series, Tick, TimerState, Tracker, Window};

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppMode {
    #[default]
    Normal,
    AddingTodo,
    EditingFocus,
    EditingBreak,
    ConfirmBreak,
    ShowHelp,
}

pub struct App<S: KeyValueStore = FileStore> {
    pub tracker: Tracker<S>,
    pub config: Config,
    pub mode: AppMode,
    pub input_buffer: String,
    pub selected_todo: usize,
    pub window: Window,
    /// One-line feedback shown in the status bar.
    pub message: Option<String>,
    pub should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(tracker: Tracker<S>, config: Config) -> Self {
        Self {
            tracker,
            config,
            mode: AppMode::Normal,
            input_buffer: String::new(),
            selected_todo: 0,
            window: Window::default(),
            message: None,
            should_quit: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.tracker.timer_state().is_running()
    }

    pub fn series(&self) -> Series {
        self.tracker.series(self.window)
    }

    pub fn on_tick(&mut self) {
        match self.tracker.tick() {
            Tick::FocusCompleted => self.mode = AppMode::ConfirmBreak,
            Tick::BreakCompleted => self.message = Some("Break complete!".to_string()),
            Tick::Ignored | Tick::Counting { .. } => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            AppMode::Normal => self.handle_normal(key.code),
            AppMode::AddingTodo | AppMode::EditingFocus | AppMode::EditingBreak => match key.code {
                KeyCode::Esc => {
                    self.mode = AppMode::Normal;
                    self.input_buffer.clear();
                }
                KeyCode::Enter => self.handle_char('\n'),
                KeyCode::Backspace => self.handle_backspace(),
                KeyCode::Char(c) => self.handle_char(c),
                _ => {}
            },
            AppMode::ConfirmBreak => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.tracker.begin_break();
                    self.mode = AppMode::Normal;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.tracker.skip_break();
                    self.mode = AppMode::Normal;
                }
                _ => {}
            },
            AppMode::ShowHelp => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.mode = AppMode::Normal;
                }
            }
        }
    }

    fn handle_normal(&mut self, code: KeyCode) {
        self.message = None;
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(' ') => self.toggle_timer(),
            KeyCode::Char('r') => self.tracker.reset(),
            KeyCode::Char('f') => self.begin_edit(AppMode::EditingFocus),
            KeyCode::Char('b') => self.begin_edit(AppMode::EditingBreak),
            KeyCode::Char('a') => {
                self.mode = AppMode::AddingTodo;
                self.input_buffer.clear();
            }
            KeyCode::Char('x') | KeyCode::Enter => self.toggle_selected_todo(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected_todo(),
            KeyCode::Char('w') | KeyCode::Tab => self.window = self.window.next(),
            KeyCode::Char('?') => self.mode = AppMode::ShowHelp,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection_down(),
            _ => {}
        }
    }

    pub fn toggle_timer(&mut self) {
        match self.tracker.timer_state() {
            TimerState::Focusing | TimerState::OnBreak => {
                self.tracker.pause();
            }
            TimerState::BreakReady => self.mode = AppMode::ConfirmBreak,
            TimerState::Idle | TimerState::Paused(_) => {
                self.tracker.start();
            }
        }
    }

    fn begin_edit(&mut self, mode: AppMode) {
        if self.tracker.timer_state() != TimerState::Idle {
            self.message = Some("Durations are locked while a session is active".to_string());
            return;
        }
        let durations = self.tracker.durations();
        self.input_buffer = match mode {
            AppMode::EditingBreak => durations.break_minutes.to_string(),
            _ => durations.focus_minutes.to_string(),
        };
        self.mode = mode;
    }

    pub fn handle_char(&mut self, c: char) {
        match self.mode {
            AppMode::AddingTodo => {
                if c == '\n' {
                    if self.tracker.add_todo(&self.input_buffer).is_some() {
                        self.selected_todo = self.tracker.todos().len() - 1;
                    }
                    self.input_buffer.clear();
                    self.mode = AppMode::Normal;
                } else {
                    self.input_buffer.push(c);
                }
            }
            AppMode::EditingFocus | AppMode::EditingBreak => {
                if c == '\n' {
                    if self.mode == AppMode::EditingFocus {
                        self.tracker.set_focus_minutes(&self.input_buffer);
                    } else {
                        self.tracker.set_break_minutes(&self.input_buffer);
                    }
                    self.input_buffer.clear();
                    self.mode = AppMode::Normal;
                } else if c.is_ascii_digit() {
                    self.input_buffer.push(c);
                }
            }
            _ => {}
        }
    }

    pub fn handle_backspace(&mut self) {
        self.input_buffer.pop();
    }

    fn selected_id(&self) -> Option<i64> {
        self.tracker.todos().get(self.selected_todo).map(|t| t.id)
    }

    pub fn toggle_selected_todo(&mut self) {
        if let Some(id) = self.selected_id() {
            self.tracker.toggle_todo(id);
        }
    }

    pub fn delete_selected_todo(&mut self) {
        if let Some(id) = self.selected_id() {
            self.tracker.delete_todo(id);
            let len = self.tracker.todos().len();
            if len > 0 && self.selected_todo >= len {
                self.selected_todo = len - 1;
            }
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected_todo = self.selected_todo.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let len = self.tracker.todos().len();
        if len > 0 {
            self.selected_todo = (self.selected_todo + 1).min(len - 1);
        }
    }
}
