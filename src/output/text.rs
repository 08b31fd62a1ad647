//! Plain-text report for terminals.
//!
//! ```text
//! Name duplicates: 1 group
//!
//! User (2)
//!   src/a.ts:5  interface  User
//!   src/b.ts:1  type  User
//!
//! Skipped units: 1
//!   src/broken.ts  Syntax error in src/broken.ts at 1:11
//!
//! 3 declarations in 2 units, 1 skipped, 2 groups in 0.01s
//! ```

use std::fmt::Display;
use std::io::Write;

use yansi::{Color, Paint, Style};

use super::{truncate_chars, RenderOptions};
use crate::duplicates::{DuplicateGroup, DuplicateReport, GroupKey};

const HEADING: Style = Style::new().bold();
const KEY: Style = Style::new().fg(Color::Cyan).bold();
const LOCATION: Style = Style::new().fg(Color::Green);
const DIM: Style = Style::new().dim();
const WARNING: Style = Style::new().fg(Color::Yellow).bold();

/// Text renderer.
pub struct TextOutput<'a> {
    report: &'a DuplicateReport,
    options: &'a RenderOptions,
}

impl<'a> TextOutput<'a> {
    /// Create a renderer over `report`.
    #[must_use]
    pub fn new(report: &'a DuplicateReport, options: &'a RenderOptions) -> Self {
        Self { report, options }
    }

    fn paint<T: Display>(&self, value: T, style: Style) -> String {
        if self.options.color {
            value.paint(style).to_string()
        } else {
            value.to_string()
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for &key in self.report.mode.keys() {
            let groups = self.report.groups(key).unwrap_or_default();
            self.write_pass(writer, key, groups)?;
        }
        self.write_skipped(writer)?;
        self.write_footer(writer)
    }

    fn write_pass<W: Write>(
        &self,
        writer: &mut W,
        key: GroupKey,
        groups: &[DuplicateGroup],
    ) -> std::io::Result<()> {
        let title = match key {
            GroupKey::Name => "Name duplicates",
            GroupKey::Shape => "Shape duplicates",
        };
        let plural = if groups.len() == 1 { "group" } else { "groups" };
        writeln!(
            writer,
            "{}",
            self.paint(format!("{title}: {} {plural}", groups.len()), HEADING)
        )?;

        if groups.is_empty() {
            writeln!(writer, "  {}", self.paint("none", DIM))?;
            return writeln!(writer);
        }

        for group in groups {
            writeln!(writer)?;
            let label = truncate_chars(&group.key, self.options.snippet_max_chars);
            writeln!(
                writer,
                "{} ({})",
                self.paint(label, KEY),
                group.count()
            )?;
            for member in &group.members {
                writeln!(
                    writer,
                    "  {}  {}  {}",
                    self.paint(&member.location, LOCATION),
                    self.paint(member.kind, DIM),
                    member.name
                )?;
            }
        }
        writeln!(writer)
    }

    fn write_skipped<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let errors = &self.report.unit_errors;
        if errors.is_empty() {
            return Ok(());
        }

        writeln!(
            writer,
            "{}",
            self.paint(format!("Skipped units: {}", errors.len()), WARNING)
        )?;
        for error in errors.iter().take(self.options.max_reported_errors) {
            writeln!(writer, "  {}  {}", error.unit_id(), self.paint(error, DIM))?;
        }
        let hidden = errors.len().saturating_sub(self.options.max_reported_errors);
        if hidden > 0 {
            writeln!(writer, "  ... and {hidden} more")?;
        }
        writeln!(writer)
    }

    fn write_footer<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let summary = &self.report.summary;
        let mut line = format!(
            "{} declarations in {} units",
            summary.declarations_found, summary.units_analyzed
        );
        if summary.units_failed > 0 {
            line.push_str(&format!(", {} skipped", summary.units_failed));
        }
        if summary.reexports_skipped > 0 {
            line.push_str(&format!(
                ", {} re-exports ignored",
                summary.reexports_skipped
            ));
        }
        line.push_str(&format!(
            ", {} groups in {:.2}s",
            summary.total_groups(),
            summary.scan_duration.as_secs_f64()
        ));
        writeln!(writer, "{}", self.paint(line, DIM))
    }
}
