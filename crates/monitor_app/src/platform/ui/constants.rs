use std::time::Duration;

use ratatui::style::Color;

/// How long the loop waits for a key before checking engine events again.
pub const INPUT_POLL: Duration = Duration::from_millis(100);

pub const TITLE: &str = "SPOOL MONITOR";

pub const ACCENT: Color = Color::Cyan;
pub const MUTED: Color = Color::DarkGray;
pub const OK: Color = Color::Green;
pub const WARN: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;

pub const MODAL_WIDTH_PERCENT: u16 = 85;
pub const MODAL_HEIGHT_PERCENT: u16 = 80;
pub const MODAL_PAGE: i32 = 10;

pub const HELP_LIST: &str =
    "q quit  tab/1-5 switch  ↑↓ select  enter view  r refresh  a auto  f name  i id  c clear  / search";
pub const HELP_LOGS: &str =
    "q quit  tab/1-5 switch  r refresh  a auto  o log file  n lines  / search";
pub const HELP_CONSOLE: &str = "q quit  tab/1-5 switch  s start stream  x stop stream  / search";
pub const HELP_PROCESSES: &str = "q quit  tab/1-5 switch  r refresh  a auto  / search";
pub const HELP_MODAL: &str = "esc close  ↑↓ pgup pgdn scroll  d download";
pub const HELP_INPUT: &str = "enter apply  esc cancel";
