//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits tab-separated lines.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use unires_core::Summary;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Summary line, green when every row went through.
pub fn summary_line(summary: &Summary, color: bool) -> String {
    let text = summary.to_string();
    if !color {
        return text;
    }
    if summary.failed > 0 {
        text.red().to_string()
    } else if summary.skipped > 0 {
        text.yellow().to_string()
    } else {
        text.green().to_string()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// `plain_fn` turns each item into one output line.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&plain_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single document; `table_fn` and `plain_fn` build the text views.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    table_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(table_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(plain_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    Ok(if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    })
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Item {
        vlan: u16,
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { vlan: 1, name: "LAN".into() },
            Item { vlan: 20, name: "IoT".into() },
        ]
    }

    #[test]
    fn renders_each_format() {
        let data = items();
        let row = |i: &Item| Item { vlan: i.vlan, name: i.name.clone() };
        let plain = |i: &Item| format!("{}\t{}", i.vlan, i.name);

        let table = render_list(&OutputFormat::Table, &data, row, plain).unwrap();
        assert!(table.contains("IoT"));

        let json = render_list(&OutputFormat::JsonCompact, &data, row, plain).unwrap();
        assert_eq!(json, r#"[{"vlan":1,"name":"LAN"},{"vlan":20,"name":"IoT"}]"#);

        let yaml = render_list(&OutputFormat::Yaml, &data, row, plain).unwrap();
        assert!(yaml.contains("name: IoT"));

        let text = render_list(&OutputFormat::Plain, &data, row, plain).unwrap();
        assert_eq!(text, "1\tLAN\n20\tIoT");
    }

    #[test]
    fn summary_line_without_color_is_plain_text() {
        let summary = Summary {
            total: 1,
            created: 1,
            ..Summary::default()
        };
        assert_eq!(
            summary_line(&summary, false),
            "1 rows: 1 created, 0 updated, 0 unchanged, 0 skipped, 0 failed"
        );
        assert!(summary_line(&summary, true).contains("\u{1b}["));
    }
}
