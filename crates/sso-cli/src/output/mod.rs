use serde::Serialize;

use crate::cli::OutputFormat;

/// Plain-text rendering for `--format text`.
pub trait TextRender {
    fn render_text(&self) -> String;
}

/// Render a response to a string in the requested format.
pub fn render<T: Serialize + TextRender>(
    value: &T,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Text => Ok(value.render_text()),
    }
}

/// Print a response to stdout in the requested format.
pub fn output<T: Serialize + TextRender>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Indented bullet list, or a placeholder when empty.
pub fn bullet_list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return format!("  ({empty})");
    }
    items
        .iter()
        .map(|item| format!("  \u{2022} {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
