use monitor_core::{
    AppViewModel, ConsoleView, ModalView, ReadyView, SectionView, Severity, TableBody, TableView,
    Tab, TextView,
};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs};
use ratatui::Frame;

use super::constants::*;
use super::layout::{centered, dashboard_areas, inner_height};
use super::UiState;

pub fn draw(frame: &mut Frame, view: &AppViewModel, ui: &UiState) {
    let screen = frame.area();
    let areas = dashboard_areas(screen);
    draw_header(frame, areas.header, view);
    draw_tabs(frame, areas.tabs, view);
    match &view.section {
        SectionView::Table(table) => draw_table(frame, areas.body, table, ui.selected),
        SectionView::Text(text) => draw_text(frame, areas.body, text),
        SectionView::Console(console) => draw_console(frame, areas.body, console),
    }
    draw_status(frame, areas.status, view, ui);
    draw_help(frame, areas.help, view, ui);
    if let Some(modal) = &view.modal {
        draw_modal(frame, screen, modal, ui.modal_scroll);
    }
}

fn fg(color: ratatui::style::Color) -> Style {
    Style::default().fg(color)
}

fn section_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(fg(ACCENT))
}

fn draw_header(frame: &mut Frame, area: Rect, view: &AppViewModel) {
    let (ready, ready_color) = match view.ready {
        ReadyView::Ready => ("● ready", OK),
        ReadyView::NotReady => ("● not ready", ERROR),
        ReadyView::Unknown => ("● unknown", MUTED),
    };
    let refresh = if view.auto_refresh {
        format!("auto-refresh {}s", view.refresh_interval_secs)
    } else {
        "auto-refresh off".to_string()
    };
    let stream = if view.stream_live {
        Span::styled("stream live", fg(OK))
    } else {
        Span::styled("stream idle", fg(MUTED))
    };
    let line = Line::from(vec![
        Span::styled(TITLE, fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::styled(ready, fg(ready_color)),
        Span::raw("   "),
        Span::styled(refresh, fg(MUTED)),
        Span::raw("   "),
        stream,
    ]);
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_type(BorderType::Thick),
    );
    frame.render_widget(header, area);
}

fn draw_tabs(frame: &mut Frame, area: Rect, view: &AppViewModel) {
    let titles: Vec<Line> = view
        .tabs
        .iter()
        .enumerate()
        .map(|(idx, tab)| Line::from(format!("{} {}", idx + 1, tab.label)))
        .collect();
    let selected = view.tabs.iter().position(|tab| tab.active).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(fg(MUTED))
        .highlight_style(fg(ACCENT).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn table_title(table: &TableView) -> String {
    match &table.filter {
        Some(filter) => {
            let or_any = |value: &str| {
                if value.is_empty() {
                    "*".to_string()
                } else {
                    value.to_string()
                }
            };
            format!(
                " {} [name {} · id {}] ",
                table.title,
                or_any(&filter.job_name),
                or_any(&filter.job_id)
            )
        }
        None => format!(" {} ", table.title),
    }
}

fn draw_table(frame: &mut Frame, area: Rect, table: &TableView, selected: usize) {
    let block = section_block(table_title(table));
    let rows = match &table.body {
        TableBody::Placeholder(text) => {
            let placeholder = Paragraph::new(text.as_str()).style(fg(MUTED)).block(block);
            frame.render_widget(placeholder, area);
            return;
        }
        TableBody::Rows(rows) => rows,
    };

    let header = Row::new(table.columns.iter().map(|column| Cell::from(*column)))
        .style(fg(ACCENT).add_modifier(Modifier::BOLD));
    let body = rows
        .iter()
        .map(|row| Row::new(row.cells.iter().map(|cell| Cell::from(cell.as_str()))));
    let widths = table.columns.iter().map(|column| {
        if column.is_empty() {
            Constraint::Length(6)
        } else {
            Constraint::Fill(1)
        }
    });
    let widget = Table::new(body, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = TableState::default().with_selected(Some(selected.min(rows.len().saturating_sub(1))));
    frame.render_stateful_widget(widget, area, &mut state);
}

/// Last lines that fit, so the newest output stays visible.
fn tail_lines<'a>(lines: impl Iterator<Item = &'a str>, area: Rect) -> Vec<Line<'a>> {
    let lines: Vec<&str> = lines.collect();
    let start = lines.len().saturating_sub(inner_height(area));
    lines[start..].iter().map(|line| Line::from(*line)).collect()
}

fn draw_text(frame: &mut Frame, area: Rect, text: &TextView) {
    let body = Paragraph::new(tail_lines(text.body.lines(), area))
        .block(section_block(format!(" {} ", text.title)));
    frame.render_widget(body, area);
}

fn draw_console(frame: &mut Frame, area: Rect, console: &ConsoleView) {
    let title = if console.live {
        " Console (live) "
    } else {
        " Console (stopped) "
    };
    let block = section_block(title.to_string());
    if console.lines.is_empty() {
        let hint = Paragraph::new("No stream output yet. Press s to start the live stream.")
            .style(fg(MUTED))
            .block(block);
        frame.render_widget(hint, area);
        return;
    }
    let lines = console.lines.iter().map(String::as_str);
    let body = if console.follow_tail {
        tail_lines(lines, area)
    } else {
        lines.map(Line::from).collect()
    };
    frame.render_widget(Paragraph::new(body).block(block), area);
}

fn draw_status(frame: &mut Frame, area: Rect, view: &AppViewModel, ui: &UiState) {
    let line = match (&ui.prompt, &view.status) {
        (Some(prompt), _) => Line::from(vec![
            Span::styled(format!("{}: ", prompt.field.label()), fg(ACCENT)),
            Span::raw(prompt.buffer.clone()),
            Span::styled("_", fg(MUTED)),
        ]),
        (None, Some(status)) => {
            let color = match status.severity {
                Severity::Info => OK,
                Severity::Warning => WARN,
                Severity::Error => ERROR,
            };
            Line::from(Span::styled(status.text.clone(), fg(color)))
        }
        (None, None) => Line::default(),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help(frame: &mut Frame, area: Rect, view: &AppViewModel, ui: &UiState) {
    let help = if ui.prompt.is_some() {
        HELP_INPUT
    } else if view.modal.is_some() {
        HELP_MODAL
    } else {
        match view.active_tab {
            Tab::Spools | Tab::JobLogs => HELP_LIST,
            Tab::Logs => HELP_LOGS,
            Tab::Processes => HELP_PROCESSES,
            Tab::Console => HELP_CONSOLE,
        }
    };
    frame.render_widget(Paragraph::new(help).style(fg(MUTED)), area);
}

fn draw_modal(frame: &mut Frame, screen: Rect, modal: &ModalView, scroll: u16) {
    let area = centered(screen, MODAL_WIDTH_PERCENT, MODAL_HEIGHT_PERCENT);
    frame.render_widget(Clear, area);
    let block = section_block(format!(" {} ", modal.title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_height = modal.header_lines.len().min(inner.height as usize / 2) as u16;
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(header_height),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let header_lines: Vec<Line> = modal
        .header_lines
        .iter()
        .map(|line| Line::styled(line.as_str(), fg(MUTED)))
        .collect();
    frame.render_widget(Paragraph::new(header_lines), header);

    let body_style = if modal.body_is_content {
        Style::default()
    } else {
        fg(WARN)
    };
    frame.render_widget(
        Paragraph::new(modal.body.as_str())
            .style(body_style)
            .scroll((scroll, 0)),
        body,
    );

    let footer_text = match &modal.download {
        Some(label) => format!("[d] {label}   [esc] close"),
        None => "[esc] close".to_string(),
    };
    frame.render_widget(Paragraph::new(footer_text).style(fg(ACCENT)), footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::{update, AppState, Msg, SpoolEntry};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(view: &AppViewModel, ui: &UiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| draw(frame, view, ui)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn loaded_spools_show_job_columns() {
        let state = AppState::new();
        let (state, _) = update(state, Msg::Started);
        let (state, _) = update(
            state,
            Msg::SpoolsLoaded {
                request: 1,
                result: Ok(vec![SpoolEntry {
                    file_name: "JOB1.txt".into(),
                    job_name: Some("PAYROLL".into()),
                    job_id: Some("JOB00001".into()),
                    job_rc: Some("CC 0000".into()),
                    size_bytes: Some(2048),
                }]),
            },
        );
        let text = screen_text(&state.view(), &UiState::default());
        assert!(text.contains("PAYROLL"));
        assert!(text.contains("JOB00001"));
        assert!(text.contains("2.0 KB"));
        assert!(text.contains("View"));
    }

    #[test]
    fn empty_list_shows_placeholder() {
        let (state, _) = update(AppState::new(), Msg::Started);
        let (state, _) = update(
            state,
            Msg::SpoolsLoaded {
                request: 1,
                result: Ok(Vec::new()),
            },
        );
        assert!(screen_text(&state.view(), &UiState::default()).contains("No spools"));
    }

    #[test]
    fn prompt_replaces_status_line() {
        let ui = UiState {
            prompt: Some(super::super::input::Prompt {
                field: super::super::input::InputField::Search,
                buffer: "IEF450I".into(),
            }),
            ..UiState::default()
        };
        let text = screen_text(&AppState::new().view(), &ui);
        assert!(text.contains("Search raw dump: IEF450I"));
    }
}
