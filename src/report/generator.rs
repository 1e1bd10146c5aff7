//! Markdown and JSON report rendering.
//!
//! This module turns a [`ReportContent`] into a one-page Markdown
//! document, or serializes it for an external renderer.

use crate::report::content::{ChartSeries, ReportContent};
use anyhow::Result;
use std::path::Path;

/// Block characters used for the inline sparkline, lowest first.
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Rendering switches taken from the `[report]` config section.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Currency prefix for prices.
    pub currency: String,
    /// Emit the value-history section when the series allows it.
    pub include_chart: bool,
    /// Width of the polyline box, in document units.
    pub chart_width: f64,
    /// Height of the polyline box, in document units.
    pub chart_height: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            currency: "R$".to_string(),
            include_chart: true,
            chart_width: 170.0,
            chart_height: 40.0,
        }
    }
}

impl From<&crate::config::ReportConfig> for RenderOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            currency: config.currency.clone(),
            include_chart: config.include_chart,
            chart_width: config.chart_width,
            chart_height: config.chart_height,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(content: &ReportContent, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# m²\n\n");
    output.push_str("*local real-estate index*\n\n");

    output.push_str(&generate_property_section(content, options));
    output.push_str(&generate_market_section(content, options));
    output.push_str(&generate_diagnosis_section(content));

    if options.include_chart {
        if let Some(ref chart) = content.chart {
            output.push_str(&generate_chart_section(chart, options));
        }
    }

    output.push_str(&generate_footer(content));

    output
}

fn generate_property_section(content: &ReportContent, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Property\n\n");
    section.push_str(&format!("- **Condominium:** {}\n", content.condominium));
    section.push_str(&format!("- **Neighborhood:** {}\n", content.neighborhood));
    section.push_str(&format!("- **Area:** {} m²\n", content.area));
    section.push_str(&format!("- **Price:** {} {}\n", options.currency, content.price));
    match content.unit_value {
        Some(value) => section.push_str(&format!(
            "- **Value per m²:** {} {:.2}\n",
            options.currency, value
        )),
        None => section.push_str("- **Value per m²:** n/a\n"),
    }
    section.push('\n');

    section
}

fn generate_market_section(content: &ReportContent, options: &RenderOptions) -> String {
    if content.percent_difference.is_none() && content.group_average.is_none() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Market Comparison\n\n");
    if let Some(diff) = content.percent_difference {
        section.push_str(&format!("- **Difference to market:** {:.1}%\n", diff));
    }
    if let Some(avg) = content.group_average {
        section.push_str(&format!(
            "- **Condominium average:** {} {:.2}/m²\n",
            options.currency, avg
        ));
    }
    section.push('\n');

    section
}

fn generate_diagnosis_section(content: &ReportContent) -> String {
    let Some(position) = content.position else {
        return String::new();
    };

    let mut section = String::new();

    section.push_str("## Diagnosis\n\n");
    section.push_str(&format!(
        "{} **{}**\n\n",
        position.tone().emoji(),
        capitalize(position.label())
    ));

    if let Some(conclusion) = content.conclusion {
        section.push_str("**Conclusion:**\n\n");
        section.push_str(&format!("> {}\n\n", conclusion));
    }

    section
}

fn generate_chart_section(chart: &ChartSeries, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Value History\n\n");
    section.push_str(&format!("`{}`\n\n", sparkline(chart)));

    section.push_str("| Date | Value per m² |\n");
    section.push_str("|:---|---:|\n");
    for point in chart.points() {
        let date = point
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        section.push_str(&format!(
            "| {} | {} {:.2} |\n",
            date, options.currency, point.unit_value
        ));
    }
    section.push('\n');

    let vertices: Vec<String> = chart
        .polyline(options.chart_width, options.chart_height)
        .into_iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect();
    section.push_str(&format!("<!-- polyline: {} -->\n\n", vertices.join(" ")));

    section
}

/// One block character per point, scaled between the series min and max.
pub fn sparkline(chart: &ChartSeries) -> String {
    let top = (SPARK_LEVELS.len() - 1) as f64;
    chart
        .normalized()
        .into_iter()
        .map(|level| SPARK_LEVELS[(level * top).round() as usize])
        .collect()
}

fn generate_footer(content: &ReportContent) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*m² the market does not opine, it reveals*\n\n");
    footer.push_str(&format!(
        "- **Issued on:** {}\n",
        content.issued_on.format("%Y-%m-%d")
    ));
    footer.push_str(&format!("- **Responsible:** {}\n\n", content.responsible));
    footer.push_str("*Document generated by m² local real-estate index*\n");

    footer
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generate a JSON report.
pub fn generate_json_report(content: &ReportContent) -> Result<String> {
    serde_json::to_string_pretty(content).map_err(Into::into)
}

/// Write rendered report text to a file.
pub fn write_report(output: &str, path: &Path) -> Result<()> {
    std::fs::write(path, output)?;
    Ok(())
}
