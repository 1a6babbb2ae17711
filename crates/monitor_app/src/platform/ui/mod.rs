pub mod constants;
pub mod input;
pub mod keymap;
pub mod layout;
pub mod render;

use input::Prompt;

/// Terminal-only state the core does not model.
#[derive(Debug, Default)]
pub struct UiState {
    /// Highlighted row of the visible table.
    pub selected: usize,
    pub modal_scroll: u16,
    pub prompt: Option<Prompt>,
}
