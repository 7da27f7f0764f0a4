use crate::core::{Impact, Severity};
use crate::engine::Report;
use colored::*;
use serde::Serialize;
use std::io::Write;

pub const NO_CHANGES_MESSAGE: &str = "(no API-impacting changes detected)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    #[value(name = "md")]
    Markdown,
    Json,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    level: Option<Severity>,
    confidence: f64,
    reasons: &'a [String],
    impacts: &'a [Impact],
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()> {
        let payload = JsonReport {
            level: report.decision.level,
            confidence: report.decision.confidence,
            reasons: &report.decision.reasons,
            impacts: &report.impacts,
        };
        let json = serde_json::to_string_pretty(&payload)?;
        writeln!(self.writer, "{json}")?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()> {
        writeln!(
            self.writer,
            "**Suggested bump:** `{}`",
            report.decision.level_label()
        )?;
        writeln!(
            self.writer,
            "**Confidence:** {:.2}",
            report.decision.confidence
        )?;
        writeln!(self.writer)?;

        if report.impacts.is_empty() {
            writeln!(self.writer, "_{NO_CHANGES_MESSAGE}_")?;
            return Ok(());
        }

        writeln!(self.writer, "| Severity | Symbol | Reason |")?;
        writeln!(self.writer, "|----------|--------|--------|")?;
        for impact in &report.impacts {
            writeln!(
                self.writer,
                "| {} | `{}` | {} |",
                impact.severity,
                impact.symbol.replace('|', "\\|"),
                impact.reason.replace('|', "\\|")
            )?;
        }
        Ok(())
    }
}

pub struct TextWriter<W: Write> {
    writer: W,
}

impl<W: Write> TextWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

fn severity_tag(severity: Severity) -> ColoredString {
    let tag = format!("[{}]", severity.as_str().to_uppercase());
    match severity {
        Severity::Major => tag.red().bold(),
        Severity::Minor => tag.yellow(),
        Severity::Patch => tag.green(),
        Severity::Warn => tag.dimmed(),
    }
}

impl<W: Write> OutputWriter for TextWriter<W> {
    fn write_report(&mut self, report: &Report) -> anyhow::Result<()> {
        let level = match report.decision.level {
            Some(level) => severity_tag(level).to_string(),
            None => "none".bold().to_string(),
        };
        writeln!(
            self.writer,
            "Suggested bump: {} (confidence {:.2})",
            level, report.decision.confidence
        )?;

        if report.impacts.is_empty() {
            writeln!(self.writer, "{NO_CHANGES_MESSAGE}")?;
            return Ok(());
        }

        for impact in &report.impacts {
            writeln!(
                self.writer,
                "  {} {}: {}",
                severity_tag(impact.severity),
                impact.symbol.bold(),
                impact.reason
            )?;
        }
        Ok(())
    }
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(std::io::stdout())),
        OutputFormat::Text => Box::new(TextWriter::new(std::io::stdout())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(writer: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut buffer = Vec::new();
        writer(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn sample() -> Report {
        Report::from_impacts(vec![
            Impact::major("m:f", "Removed public symbol"),
            Impact::minor("m:g", "Added public symbol"),
        ])
    }

    #[test]
    fn test_json_fields() {
        let out = render(|buf| JsonWriter::new(buf).write_report(&sample()));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["level"], "major");
        assert_eq!(value["confidence"], 0.5);
        assert_eq!(value["reasons"], serde_json::json!(["Removed public symbol"]));
        assert_eq!(value["impacts"][1]["symbol"], "m:g");
        assert_eq!(value["impacts"][1]["severity"], "minor");
    }

    #[test]
    fn test_json_empty_report_has_null_level() {
        let out = render(|buf| JsonWriter::new(buf).write_report(&Report::empty()));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["level"].is_null());
        assert_eq!(value["impacts"], serde_json::json!([]));
    }

    #[test]
    fn test_text_no_changes_message() {
        colored::control::set_override(false);
        let out = render(|buf| TextWriter::new(buf).write_report(&Report::empty()));
        assert_eq!(
            out,
            format!("Suggested bump: none (confidence 0.00)\n{NO_CHANGES_MESSAGE}\n")
        );
    }

    #[test]
    fn test_markdown_table() {
        let out = render(|buf| MarkdownWriter::new(buf).write_report(&sample()));
        assert!(out.starts_with("**Suggested bump:** `major`\n**Confidence:** 0.50\n"));
        assert!(out.contains("| major | `m:f` | Removed public symbol |"));
    }

    #[test]
    fn test_output_format_parsing() {
        use clap::ValueEnum;
        assert_eq!(
            OutputFormat::from_str("md", false).unwrap(),
            OutputFormat::Markdown
        );
        assert_eq!(
            OutputFormat::from_str("JSON", true).unwrap(),
            OutputFormat::Json
        );
        assert!(OutputFormat::from_str("markdown", false).is_err());
    }
}
