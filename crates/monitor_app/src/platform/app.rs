use std::io;
use std::mem;

use anyhow::Context;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use monitor_core::{
    update, AppState, AppViewModel, DashboardOptions, Msg, SectionView, TableBody, ViewTarget,
};
use monitor_engine::EngineHandle;
use monitor_logging::{monitor_info, monitor_warn};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::constants::INPUT_POLL;
use super::ui::input::Prompt;
use super::ui::keymap::{map_key, Action, InputEdit, KeyContext};
use super::ui::{render, UiState};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let engine = EngineHandle::new(config.engine_config()).context("starting fetch engine")?;
    let mut dashboard = Dashboard::new(config.dashboard_options(), EffectRunner::new(engine));
    monitor_info!("dashboard connecting to {}", config.base_url);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = dashboard.run_loop(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    monitor_info!("dashboard closed");
    result
}

struct Dashboard {
    state: AppState,
    view: AppViewModel,
    ui: UiState,
    runner: EffectRunner,
}

impl Dashboard {
    fn new(options: DashboardOptions, runner: EffectRunner) -> Self {
        let state = AppState::with_options(options);
        let view = state.view();
        Self {
            state,
            view,
            ui: UiState::default(),
            runner,
        }
    }

    fn run_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        self.dispatch(Msg::Started);
        loop {
            for msg in self.runner.poll() {
                self.dispatch(msg);
            }
            terminal.draw(|frame| render::draw(frame, &self.view, &self.ui))?;

            if !event::poll(INPUT_POLL)? {
                self.dispatch(Msg::Tick);
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = map_key(key, &self.key_context());
                if action == Action::Quit {
                    return Ok(());
                }
                self.apply(action);
            }
        }
    }

    fn key_context(&self) -> KeyContext {
        KeyContext {
            active_tab: self.view.active_tab,
            modal_open: self.view.modal.is_some(),
            editing: self.ui.prompt.is_some(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            let previous_tab = self.view.active_tab;
            let had_modal = self.view.modal.is_some();
            self.view = state.view();
            if self.view.active_tab != previous_tab {
                self.ui.selected = 0;
            }
            if self.view.modal.is_some() && !had_modal {
                self.ui.modal_scroll = 0;
            }
            self.ui.selected = move_selection(self.ui.selected, 0, row_count(&self.view));
        }
        self.state = state;
        self.runner.run(effects);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit | Action::Ignore => {}
            Action::Dispatch(msg) => self.dispatch(msg),
            Action::MoveSelection(delta) => {
                self.ui.selected = move_selection(self.ui.selected, delta, row_count(&self.view));
            }
            Action::ViewSelected => {
                if let Some(target) = selected_target(&self.view, self.ui.selected) {
                    self.dispatch(Msg::ViewRequested(target));
                }
            }
            Action::ScrollModal(delta) => {
                let lines = self
                    .view
                    .modal
                    .as_ref()
                    .map(|modal| modal.body.lines().count())
                    .unwrap_or(0);
                self.ui.modal_scroll = scroll_modal(self.ui.modal_scroll, delta, lines);
            }
            Action::BeginInput(field) => self.ui.prompt = Some(Prompt::open(field, &self.view)),
            Action::Edit(edit) => self.edit_prompt(edit),
        }
    }

    fn edit_prompt(&mut self, edit: InputEdit) {
        match edit {
            InputEdit::Char(ch) => {
                if let Some(prompt) = self.ui.prompt.as_mut() {
                    prompt.buffer.push(ch);
                }
            }
            InputEdit::Backspace => {
                if let Some(prompt) = self.ui.prompt.as_mut() {
                    prompt.buffer.pop();
                }
            }
            InputEdit::Cancel => self.ui.prompt = None,
            InputEdit::Submit => {
                let Some(prompt) = self.ui.prompt.take() else {
                    return;
                };
                match prompt.submit(&self.view) {
                    Some(msg) => self.dispatch(msg),
                    None => monitor_warn!(
                        "ignored {} input {:?}",
                        prompt.field.label(),
                        prompt.buffer
                    ),
                }
            }
        }
    }
}

fn row_count(view: &AppViewModel) -> usize {
    match &view.section {
        SectionView::Table(table) => match &table.body {
            TableBody::Rows(rows) => rows.len(),
            TableBody::Placeholder(_) => 0,
        },
        _ => 0,
    }
}

/// Moves within `0..len`, stopping at both ends.
fn move_selection(selected: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    selected.saturating_add_signed(delta).min(len - 1)
}

fn scroll_modal(current: u16, delta: i32, body_lines: usize) -> u16 {
    let max = i32::try_from(body_lines.saturating_sub(1)).unwrap_or(i32::MAX);
    let next = (i32::from(current) + delta).clamp(0, max.max(0));
    u16::try_from(next).unwrap_or(u16::MAX)
}

fn selected_target(view: &AppViewModel, selected: usize) -> Option<ViewTarget> {
    match &view.section {
        SectionView::Table(table) => match &table.body {
            TableBody::Rows(rows) => rows.get(selected).and_then(|row| row.action.clone()),
            TableBody::Placeholder(_) => None,
        },
        _ => None,
    }
}
