//! Markdown report, suitable for pull request comments and wikis.

use std::io::Write;

use super::{truncate_chars, RenderOptions};
use crate::duplicates::{DuplicateGroup, DuplicateReport, GroupKey};

/// Markdown renderer.
pub struct MarkdownOutput<'a> {
    report: &'a DuplicateReport,
    options: &'a RenderOptions,
}

impl<'a> MarkdownOutput<'a> {
    /// Create a renderer over `report`.
    #[must_use]
    pub fn new(report: &'a DuplicateReport, options: &'a RenderOptions) -> Self {
        Self { report, options }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# Duplicate type declarations")?;
        writeln!(writer)?;
        self.write_summary(writer)?;

        for &key in self.report.mode.keys() {
            let groups = self.report.groups(key).unwrap_or_default();
            self.write_pass(writer, key, groups)?;
        }

        self.write_skipped(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let summary = &self.report.summary;
        writeln!(writer, "| Metric | Value |")?;
        writeln!(writer, "| --- | --- |")?;
        writeln!(writer, "| Mode | {} |", self.report.mode)?;
        writeln!(writer, "| Units analyzed | {} |", summary.units_analyzed)?;
        writeln!(writer, "| Units skipped | {} |", summary.units_failed)?;
        writeln!(writer, "| Declarations | {} |", summary.declarations_found)?;
        writeln!(writer, "| Re-exports ignored | {} |", summary.reexports_skipped)?;
        if self.report.mode.includes(GroupKey::Name) {
            writeln!(writer, "| Name groups | {} |", summary.name_groups)?;
        }
        if self.report.mode.includes(GroupKey::Shape) {
            writeln!(writer, "| Shape groups | {} |", summary.shape_groups)?;
        }
        writeln!(writer)
    }

    fn write_pass<W: Write>(
        &self,
        writer: &mut W,
        key: GroupKey,
        groups: &[DuplicateGroup],
    ) -> std::io::Result<()> {
        match key {
            GroupKey::Name => writeln!(writer, "## Name duplicates")?,
            GroupKey::Shape => writeln!(writer, "## Shape duplicates")?,
        }
        writeln!(writer)?;

        if groups.is_empty() {
            writeln!(writer, "_None found._")?;
            return writeln!(writer);
        }

        writeln!(writer, "| Key | Count | Locations |")?;
        writeln!(writer, "| --- | --- | --- |")?;
        for group in groups {
            let label = truncate_chars(&group.key, self.options.snippet_max_chars);
            let locations = group
                .members
                .iter()
                .map(|m| code_span(&m.location.to_string()))
                .collect::<Vec<_>>()
                .join("<br>");
            writeln!(
                writer,
                "| {} | {} | {} |",
                code_span(&label),
                group.count(),
                locations
            )?;
        }
        writeln!(writer)
    }

    fn write_skipped<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let errors = &self.report.unit_errors;
        if errors.is_empty() {
            return Ok(());
        }

        writeln!(writer, "## Skipped units")?;
        writeln!(writer)?;
        for error in errors.iter().take(self.options.max_reported_errors) {
            writeln!(
                writer,
                "- {}: {}",
                code_span(error.unit_id()),
                escape_cell(&error.to_string())
            )?;
        }
        let hidden = errors.len().saturating_sub(self.options.max_reported_errors);
        if hidden > 0 {
            writeln!(writer, "- _{hidden} more not shown_")?;
        }
        writeln!(writer)
    }
}

/// Inline code that survives backticks and table pipes in `text`.
fn code_span(text: &str) -> String {
    let escaped = text.replace('|', "\\|");
    if escaped.contains('`') {
        format!("`` {escaped} ``")
    } else {
        format!("`{escaped}`")
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
