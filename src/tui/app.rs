//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Dispatching console commands to the request worker
//! - Periodic ranking refresh and notification expiry

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::HttpTriageClient;
use crate::application::{
    Command, CommandExecutor, Console, ConsoleEvent, NotificationKind, Notifications,
};
use crate::config::ConsoleConfig;
use crate::ports::TriageApi;

use super::ui::{
    intake::{render_intake_form, IntakeFormState},
    notification_height,
    ranking::{render_ranking, row_action, RowAction},
    render_disclaimer, render_notifications,
    result::render_result,
};
use super::worker::RequestWorker;

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Ranking,
    Intake,
    Result,
}

/// Main application state
pub struct App<A>
where
    A: TriageApi + 'static,
{
    screen: Screen,
    should_quit: bool,

    console: Console,
    worker: RequestWorker<A>,

    intake_state: IntakeFormState,

    /// Highlighted ranking row
    selected_row: Option<usize>,

    /// Automatic refresh period; `None` disables it
    refresh_interval: Option<Duration>,
    last_refresh: Instant,

    /// A prediction is in flight; further submissions are ignored
    prediction_pending: bool,
}

impl App<HttpTriageClient> {
    /// Create the application against the configured scoring server.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let client = HttpTriageClient::new(config.server_url.as_str(), config.request_timeout())
            .map_err(|e| anyhow!("Failed to create client for {}: {}", config.server_url, e))?;
        let executor = CommandExecutor::new(Arc::new(client), config.export_path.clone());

        Ok(Self::with_dependencies(
            executor,
            Notifications::with_ttl(config.notification_ttl()),
            config.refresh_interval(),
        ))
    }
}

impl<A> App<A>
where
    A: TriageApi + 'static,
{
    /// Create application with an injected executor (Composition Root pattern).
    pub fn with_dependencies(
        executor: CommandExecutor<A>,
        notifications: Notifications,
        refresh_interval: Option<Duration>,
    ) -> Self {
        Self {
            screen: Screen::Ranking,
            should_quit: false,
            console: Console::new(notifications),
            worker: RequestWorker::new(executor),
            intake_state: IntakeFormState::default(),
            selected_row: None,
            refresh_interval,
            last_refresh: Instant::now(),
            prediction_pending: false,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.start();

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    /// Load the ranking once at startup.
    pub fn start(&mut self) {
        tracing::info!("loading initial ranking");
        self.request_refresh();
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();
            self.tick(Instant::now());

            terminal.draw(|f| self.draw(f))?;

            // Short poll keeps the worker and timers responsive
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        tracing::info!(in_flight = self.worker.in_flight(), "leaving main loop");
        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(notification_height(&self.console.notifications)),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(f.area());

        if !self.console.notifications.is_empty() {
            render_notifications(f, chunks[0], &self.console.notifications);
        }

        match self.screen {
            Screen::Ranking => render_ranking(f, chunks[1], &self.console, self.selected_row),
            Screen::Intake => render_intake_form(
                f,
                chunks[1],
                &self.intake_state,
                &self.console.invalid_fields,
                self.prediction_pending,
            ),
            Screen::Result => render_result(f, chunks[1], self.console.result.as_ref()),
        }

        render_disclaimer(f, chunks[2]);
    }

    /// Drain completed requests from the worker.
    fn poll_worker(&mut self) {
        while let Some(event) = self.worker.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: ConsoleEvent) {
        let prediction = match &event {
            ConsoleEvent::Predicted(result) => Some(result.is_ok()),
            _ => None,
        };

        let follow_ups = self.console.apply(event);

        match prediction {
            Some(true) => {
                self.prediction_pending = false;
                self.intake_state.clear_sensitive();
                self.screen = Screen::Result;
            }
            // Keep the draft so the operator can retry.
            Some(false) => self.prediction_pending = false,
            None => {}
        }

        for command in follow_ups {
            self.dispatch(command);
        }
        self.clamp_selection();
    }

    /// Expire notifications and fire the periodic refresh.
    fn tick(&mut self, now: Instant) {
        self.console.notifications.expire(now);

        if let Some(interval) = self.refresh_interval {
            let due = now.saturating_duration_since(self.last_refresh) >= interval;
            if due && !self.console.is_refreshing() {
                tracing::debug!("periodic ranking refresh");
                self.request_refresh();
            }
        }
    }

    fn dispatch(&mut self, command: Command) {
        if matches!(command, Command::RefreshRanking(_)) {
            self.last_refresh = Instant::now();
        }
        self.worker.dispatch(command);
    }

    fn request_refresh(&mut self) {
        let command = self.console.refresh();
        self.dispatch(command);
    }

    fn clamp_selection(&mut self) {
        let len = self.console.ranking.len();
        self.selected_row = match (len, self.selected_row) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(row)) => Some(row.min(len - 1)),
        };
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Ranking => self.handle_ranking_key(key),
            Screen::Intake => self.handle_intake_key(key, modifiers),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_ranking_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.screen = Screen::Intake;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.request_refresh();
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                let command = self.console.export();
                self.dispatch(command);
            }
            KeyCode::Up => {
                self.selected_row = self.selected_row.map(|row| row.saturating_sub(1));
            }
            KeyCode::Down => {
                let last = self.console.ranking.len().saturating_sub(1);
                self.selected_row = self.selected_row.map(|row| (row + 1).min(last));
            }
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Enter => {
                self.mark_selected_attended();
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                if self.console.result.is_some() {
                    self.screen = Screen::Result;
                }
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.console.notifications.dismiss_newest();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn mark_selected_attended(&mut self) {
        let Some(entry) = self
            .selected_row
            .and_then(|row| self.console.ranking.get(row))
        else {
            return;
        };

        match row_action(entry) {
            RowAction::MarkAttended(patient_id) => {
                let command = self.console.mark_attended(patient_id);
                self.dispatch(command);
            }
            RowAction::Completed => {
                self.console
                    .notifications
                    .push(NotificationKind::Info, "El paciente ya fue atendido");
            }
        }
    }

    fn handle_intake_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('s') | KeyCode::Char('S') = key {
                self.intake_state.load_sample_data();
            }
            return;
        }

        match key {
            KeyCode::Esc => {
                self.screen = Screen::Ranking;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.intake_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.intake_state.next_field();
            }
            KeyCode::Left => {
                self.intake_state.cycle(false);
            }
            KeyCode::Right => {
                self.intake_state.cycle(true);
            }
            KeyCode::Char(c) => {
                self.intake_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.intake_state.delete_char();
            }
            KeyCode::Delete => {
                self.intake_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_intake();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.screen = Screen::Ranking;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.screen = Screen::Intake;
            }
            _ => {}
        }
    }

    fn submit_intake(&mut self) {
        if self.prediction_pending {
            return;
        }
        if let Some(command) = self.console.submit(&self.intake_state.draft) {
            self.prediction_pending = true;
            self.dispatch(command);
        }
    }
}
