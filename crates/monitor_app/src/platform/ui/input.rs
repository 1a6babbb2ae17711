use monitor_core::{AppViewModel, ListFilter, ListSection, Msg, SectionView, Tab};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    FilterJobName,
    FilterJobId,
    Search,
    LogName,
    LogLines,
}

impl InputField {
    pub fn label(self) -> &'static str {
        match self {
            InputField::FilterJobName => "Job name filter",
            InputField::FilterJobId => "Job id filter",
            InputField::Search => "Search raw dump",
            InputField::LogName => "Log file",
            InputField::LogLines => "Lines",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub field: InputField,
    pub buffer: String,
}

impl Prompt {
    /// Opens with the current value so the user edits rather than retypes.
    pub fn open(field: InputField, view: &AppViewModel) -> Self {
        let filter = current_filter(view);
        let buffer = match field {
            InputField::FilterJobName => filter.job_name,
            InputField::FilterJobId => filter.job_id,
            InputField::Search => String::new(),
            InputField::LogName => view.log_name.clone(),
            InputField::LogLines => view.log_lines.to_string(),
        };
        Self { field, buffer }
    }

    /// Message for the submitted value; `None` when it cannot be used.
    pub fn submit(&self, view: &AppViewModel) -> Option<Msg> {
        match self.field {
            InputField::FilterJobName | InputField::FilterJobId => {
                let section = match view.active_tab {
                    Tab::Spools => ListSection::Spools,
                    Tab::JobLogs => ListSection::JobLogs,
                    _ => return None,
                };
                let current = current_filter(view);
                let filter = if self.field == InputField::FilterJobName {
                    ListFilter::new(self.buffer.as_str(), current.job_id)
                } else {
                    ListFilter::new(current.job_name, self.buffer.as_str())
                };
                Some(Msg::FilterChanged { section, filter })
            }
            InputField::Search => Some(Msg::SearchSubmitted(self.buffer.clone())),
            InputField::LogName => Some(Msg::LogTargetChanged {
                name: self.buffer.clone(),
                lines: view.log_lines,
            }),
            InputField::LogLines => {
                let lines = self.buffer.trim().parse().ok()?;
                Some(Msg::LogTargetChanged {
                    name: view.log_name.clone(),
                    lines,
                })
            }
        }
    }
}

fn current_filter(view: &AppViewModel) -> ListFilter {
    match &view.section {
        SectionView::Table(table) => table.filter.clone().unwrap_or_default(),
        _ => ListFilter::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::{update, AppState, DashboardOptions};

    fn view_after(msgs: Vec<Msg>) -> AppViewModel {
        let mut state = AppState::with_options(DashboardOptions::default());
        for msg in msgs {
            state = update(state, msg).0;
        }
        state.view()
    }

    #[test]
    fn editing_one_filter_field_keeps_the_other() {
        let view = view_after(vec![Msg::FilterChanged {
            section: ListSection::Spools,
            filter: ListFilter::new("PAYROLL", "JOB1"),
        }]);
        let prompt = Prompt {
            field: InputField::FilterJobId,
            buffer: " JOB2 ".into(),
        };
        assert_eq!(
            prompt.submit(&view),
            Some(Msg::FilterChanged {
                section: ListSection::Spools,
                filter: ListFilter::new("PAYROLL", "JOB2"),
            })
        );
    }

    #[test]
    fn prompt_starts_with_current_value() {
        let view = view_after(vec![Msg::FilterChanged {
            section: ListSection::Spools,
            filter: ListFilter::new("PAYROLL", ""),
        }]);
        assert_eq!(Prompt::open(InputField::FilterJobName, &view).buffer, "PAYROLL");
        assert_eq!(Prompt::open(InputField::LogLines, &view).buffer, "200");
    }

    #[test]
    fn non_numeric_line_count_is_rejected() {
        let view = view_after(vec![Msg::TabSelected(Tab::Logs)]);
        let prompt = Prompt {
            field: InputField::LogLines,
            buffer: "lots".into(),
        };
        assert_eq!(prompt.submit(&view), None);
        let prompt = Prompt {
            field: InputField::LogLines,
            buffer: "50".into(),
        };
        assert_eq!(
            prompt.submit(&view),
            Some(Msg::LogTargetChanged {
                name: "console_bridge.log".into(),
                lines: 50,
            })
        );
    }
}
