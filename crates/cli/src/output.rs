//! Human-readable check report.

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use console::Style;

use contrib_checker_core::{CheckResult, Mode, MetadataSource};

/// How the report marks a source, an author or the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Credited,
    Missing,
    Unreadable,
}

impl Status {
    fn mark(self) -> &'static str {
        match self {
            Status::Credited => "✓",
            Status::Missing => "✗",
            Status::Unreadable => "⚠",
        }
    }

    fn style(self) -> Style {
        match self {
            Status::Credited => Style::new().green(),
            Status::Missing => Style::new().red(),
            Status::Unreadable => Style::new().yellow(),
        }
    }

    fn color(self) -> Color {
        match self {
            Status::Credited => Color::Green,
            Status::Missing => Color::Red,
            Status::Unreadable => Color::Yellow,
        }
    }

    /// `msg` prefixed with the colored mark.
    fn line(self, msg: &str) -> String {
        format!("{} {}", self.style().apply_to(self.mark()), msg)
    }

    fn cell(self, label: &str) -> Cell {
        Cell::new(format!("{} {}", self.mark(), label)).fg(self.color())
    }
}

/// Error line printed when a check could not run.
pub fn failure(msg: &str) -> String {
    Status::Missing.line(msg)
}

/// Render `result` as the text printed after a check.
pub fn render_report(result: &CheckResult) -> String {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let mut out = Vec::new();

    out.push(String::new());
    out.push(
        bold.apply_to(format!("Contributor check: {}", result.description))
            .to_string(),
    );
    out.push(
        dim.apply_to(format!(
            "mode: {}  authors: {}  ignored: {}",
            result.mode,
            result.authors.len(),
            result.ignored.len()
        ))
        .to_string(),
    );
    out.push(String::new());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Source", "Status", "Missing"]);
    for source in MetadataSource::ALL {
        let (status, missing) = match result.missing_per_file.get(&source) {
            Some(missing) if missing.is_empty() => {
                (Status::Credited.cell("complete"), Cell::new(0))
            }
            Some(missing) => (Status::Missing.cell("incomplete"), Cell::new(missing.len())),
            None if result.skipped(source).is_some() => {
                (Status::Unreadable.cell("unreadable"), Cell::new("—"))
            }
            None => (Cell::new("not present"), Cell::new("—")),
        };
        table.add_row(vec![Cell::new(source.file_name()), status, missing]);
    }
    out.push(table.to_string());

    for skipped in &result.metadata_errors {
        out.push(Status::Unreadable.line(&skipped.reason));
    }

    if !result.missing_overall.is_empty() {
        out.push(String::new());
        out.push(bold.apply_to("Missing from every metadata file:").to_string());
        for author in &result.missing_overall {
            out.push(format!("  {}", Status::Missing.line(&author.to_string())));
        }
    }

    if !result.matched.is_empty() {
        out.push(String::new());
        out.push(bold.apply_to("Credited:").to_string());
        for author in &result.matched {
            out.push(format!("  {}", Status::Credited.line(&author.to_string())));
        }
    }

    out.push(String::new());
    out.push(summary_line(result));
    out.join("\n")
}

fn summary_line(result: &CheckResult) -> String {
    match (result.missing_overall.len(), result.mode) {
        (0, _) => Status::Credited.line("All contributors are credited."),
        (n, Mode::Warn) => Status::Unreadable.line(&format!(
            "{n} contributor(s) missing from metadata (mode: warn, not failing)."
        )),
        (n, Mode::Fail) => {
            Status::Missing.line(&format!("{n} contributor(s) missing from metadata."))
        }
    }
}
