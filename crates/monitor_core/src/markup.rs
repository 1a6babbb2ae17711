//! HTML fragments for browser hosts and static snapshots.
//!
//! Every server-provided string goes through [`escape_html`] before it lands in
//! markup, including attribute values.

use crate::format::escape_html;
use crate::{EntryKind, TableBody, TableView};

/// `<table>` for one list section; the placeholder row spans every column.
pub fn render_table(table: &TableView) -> String {
    let mut out = String::from("<table class=\"data-table\">\n<thead><tr>");
    for column in table.columns {
        out.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    match &table.body {
        TableBody::Placeholder(text) => {
            out.push_str(&format!(
                "<tr><td colspan=\"{}\" class=\"placeholder\">{}</td></tr>\n",
                table.columns.len().max(1),
                escape_html(text)
            ));
        }
        TableBody::Rows(rows) => {
            for row in rows {
                out.push_str("<tr>");
                let action_cell = row.action.as_ref().map(|_| row.cells.len() - 1);
                for (idx, cell) in row.cells.iter().enumerate() {
                    match (&row.action, Some(idx) == action_cell) {
                        (Some(target), true) => {
                            let kind = match target.kind {
                                EntryKind::Spool => "spool",
                                EntryKind::JobLog => "joblog",
                            };
                            out.push_str(&format!(
                                "<td><button class=\"view-btn\" data-kind=\"{kind}\" data-file=\"{}\" data-jobname=\"{}\" data-jobid=\"{}\">{}</button></td>",
                                escape_html(&target.file_name),
                                escape_html(target.job_name.as_deref().unwrap_or_default()),
                                escape_html(target.job_id.as_deref().unwrap_or_default()),
                                escape_html(cell),
                            ));
                        }
                        _ => out.push_str(&format!("<td>{}</td>", escape_html(cell))),
                    }
                }
                out.push_str("</tr>\n");
            }
        }
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

/// Stand-alone page with one heading and table per section.
pub fn render_page(title: &str, generated_at: &str, sections: &[TableView]) -> String {
    let mut out = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{0}</title>\n</head>\n<body>\n<h1>{0}</h1>\n<p class=\"generated\">Generated {1}</p>\n",
        escape_html(title),
        escape_html(generated_at)
    );
    for table in sections {
        out.push_str(&format!("<h2>{}</h2>\n", escape_html(table.title)));
        out.push_str(&render_table(table));
    }
    out.push_str("</body>\n</html>\n");
    out
}
