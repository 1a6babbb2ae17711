use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use monitor_core::{ListFilter, ListSection, Msg, Tab};

use super::input::InputField;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Dispatch(Msg),
    MoveSelection(isize),
    ViewSelected,
    ScrollModal(i32),
    BeginInput(InputField),
    Edit(InputEdit),
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEdit {
    Char(char),
    Backspace,
    Submit,
    Cancel,
}

/// What the key handler needs to know about the screen.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext {
    pub active_tab: Tab,
    pub modal_open: bool,
    pub editing: bool,
}

pub fn map_key(key: KeyEvent, ctx: &KeyContext) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if ctx.editing {
        return match key.code {
            KeyCode::Enter => Action::Edit(InputEdit::Submit),
            KeyCode::Esc => Action::Edit(InputEdit::Cancel),
            KeyCode::Backspace => Action::Edit(InputEdit::Backspace),
            KeyCode::Char(ch) => Action::Edit(InputEdit::Char(ch)),
            _ => Action::Ignore,
        };
    }
    if ctx.modal_open {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Action::Dispatch(Msg::ModalClosed),
            KeyCode::Char('d') => Action::Dispatch(Msg::DownloadClicked),
            KeyCode::Up | KeyCode::Char('k') => Action::ScrollModal(-1),
            KeyCode::Down | KeyCode::Char('j') => Action::ScrollModal(1),
            KeyCode::PageUp => Action::ScrollModal(-super::constants::MODAL_PAGE),
            KeyCode::PageDown | KeyCode::Char(' ') => Action::ScrollModal(super::constants::MODAL_PAGE),
            _ => Action::Ignore,
        };
    }

    let list_section = match ctx.active_tab {
        Tab::Spools => Some(ListSection::Spools),
        Tab::JobLogs => Some(ListSection::JobLogs),
        _ => None,
    };
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
            Action::Dispatch(Msg::TabSelected(ctx.active_tab.next()))
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
            Action::Dispatch(Msg::TabSelected(ctx.active_tab.previous()))
        }
        KeyCode::Char(ch @ '1'..='5') => {
            let idx = ch as usize - '1' as usize;
            Action::Dispatch(Msg::TabSelected(Tab::ALL[idx]))
        }
        KeyCode::Char('r') => Action::Dispatch(Msg::RefreshClicked),
        KeyCode::Char('a') => Action::Dispatch(Msg::AutoRefreshToggled),
        KeyCode::Char('/') => Action::BeginInput(InputField::Search),
        KeyCode::Char('s') => Action::Dispatch(Msg::StreamStartClicked),
        KeyCode::Char('x') => Action::Dispatch(Msg::StreamStopClicked),
        KeyCode::Up | KeyCode::Char('k') => Action::MoveSelection(-1),
        KeyCode::Down | KeyCode::Char('j') => Action::MoveSelection(1),
        KeyCode::Enter | KeyCode::Char('v') if list_section.is_some() => Action::ViewSelected,
        KeyCode::Char('f') if list_section.is_some() => Action::BeginInput(InputField::FilterJobName),
        KeyCode::Char('i') if list_section.is_some() => Action::BeginInput(InputField::FilterJobId),
        KeyCode::Char('c') => match list_section {
            Some(section) => Action::Dispatch(Msg::FilterChanged {
                section,
                filter: ListFilter::default(),
            }),
            None => Action::Ignore,
        },
        KeyCode::Char('o') if ctx.active_tab == Tab::Logs => Action::BeginInput(InputField::LogName),
        KeyCode::Char('n') if ctx.active_tab == Tab::Logs => Action::BeginInput(InputField::LogLines),
        _ => Action::Ignore,
    }
}
