//! Report formatting utilities for InfraPulse outputs.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DeviceCategory, DeviceRecord, SanityLevel};
use crate::scoring::NO_DATA;

/// Column headings of the report table, after the category column.
const TABLE_HEADINGS: [&str; 4] = ["Icon", "Risk", "Status", "Solution"];

const PRINT_STYLES: &str = "\
body { font-family: system-ui, sans-serif; padding: 24px; color: #111; }
.toolbar { display: flex; justify-content: space-between; align-items: center; margin-bottom: 16px; }
.generated { color: #666; font-size: 14px; }
table { width: 100%; border-collapse: collapse; }
th { border-bottom: 2px solid #000; text-align: left; padding: 8px 6px; }
td { border-bottom: 1px solid #ddd; padding: 8px 6px; }
td.category { font-weight: 600; }
td.wrap { white-space: pre-wrap; }
@media print {
  .no-print { display: none !important; }
  body { -webkit-print-color-adjust: exact; print-color-adjust: exact; }
  @page { size: A4 portrait; margin: 16mm; }
  table { page-break-inside: auto; }
  tr { page-break-inside: avoid; page-break-after: auto; }
  thead { display: table-header-group; }
  tfoot { display: table-footer-group; }
}
";

/// One device category row of the infrastructure report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Device category.
    pub category: DeviceCategory,
    /// Sanity rating, if recorded.
    pub sanity_icon: Option<SanityLevel>,
    /// Status line.
    pub status: Option<String>,
    /// Risk description.
    pub risk: Option<String>,
    /// Proposed solution.
    pub solution: Option<String>,
}

impl ReportRow {
    /// Build a row from an optional stored device. Blank text is treated as absent.
    pub fn from_device(category: DeviceCategory, device: Option<&DeviceRecord>) -> Self {
        match device {
            Some(device) => Self {
                category,
                sanity_icon: device.sanity_icon,
                status: non_empty(device.status.as_deref()),
                risk: non_empty(device.risk.as_deref()),
                solution: non_empty(device.solution.as_deref()),
            },
            None => Self {
                category,
                sanity_icon: None,
                status: None,
                risk: None,
                solution: None,
            },
        }
    }

    /// Icon and label for the rating column.
    pub fn icon_text(&self) -> String {
        match self.sanity_icon {
            Some(level) => format!("{} {}", level.icon(), level.label()),
            None => NO_DATA.to_string(),
        }
    }
}

/// Infrastructure report for a single client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfraReport {
    /// Client display name.
    pub client_name: String,
    /// Client slug.
    pub client_slug: String,
    /// Human-readable generation timestamp.
    pub generated_at: String,
    /// Weighted infrastructure percentage, absent when nothing is recorded.
    pub infra_percent: Option<u8>,
    /// Category rows, switches first.
    pub rows: Vec<ReportRow>,
}

impl InfraReport {
    /// Report title, falling back to the slug when the name is blank.
    pub fn title(&self) -> &str {
        if self.client_name.trim().is_empty() {
            &self.client_slug
        } else {
            &self.client_name
        }
    }

    /// Section heading including the percentage when one exists.
    pub fn heading(&self) -> String {
        match self.infra_percent {
            Some(percent) => format!("INFRASTRUCTURE — {percent}%"),
            None => "INFRASTRUCTURE".to_string(),
        }
    }
}

/// Render a report as plain text.
pub fn render_report_text(report: &InfraReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Client: {}", report.title());
    let _ = writeln!(output, "Generated: {}", report.generated_at);
    let _ = writeln!(output, "{}", report.heading());
    for row in &report.rows {
        let _ = writeln!(output, "- {}: {}", row.category.label(), row.icon_text());
        let _ = writeln!(output, "  Risk: {}", or_dash(row.risk.as_deref()));
        let _ = writeln!(output, "  Status: {}", or_dash(row.status.as_deref()));
        let _ = writeln!(output, "  Solution: {}", or_dash(row.solution.as_deref()));
    }
    output
}

/// Render a report as Markdown.
pub fn render_report_markdown(report: &InfraReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {}\n", report.title());
    let _ = writeln!(output, "Generated: {}\n", report.generated_at);
    let _ = writeln!(output, "## {}\n", report.heading());
    let _ = writeln!(output, "| | {} |", TABLE_HEADINGS.join(" | "));
    let _ = writeln!(output, "|---|---|---|---|---|");
    for row in &report.rows {
        let _ = writeln!(
            output,
            "| **{}** | {} | {} | {} | {} |",
            row.category.label(),
            row.icon_text(),
            markdown_cell(row.risk.as_deref()),
            markdown_cell(row.status.as_deref()),
            markdown_cell(row.solution.as_deref()),
        );
    }
    output
}

/// Render a report as a standalone printable HTML document.
pub fn render_report_html(report: &InfraReport) -> String {
    let title = escape_html(report.title());
    let mut output = String::new();
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html lang=\"en\">");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "<meta charset=\"utf-8\">");
    let _ = writeln!(output, "<title>{title} infrastructure report</title>");
    let _ = writeln!(output, "<style>\n{PRINT_STYLES}</style>");
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(output, "<div class=\"toolbar no-print\">");
    let _ = writeln!(
        output,
        "<a href=\"/{}\">&larr; Back</a>",
        escape_html(&report.client_slug)
    );
    let _ = writeln!(
        output,
        "<button onclick=\"window.print()\">Print / Save as PDF</button>"
    );
    let _ = writeln!(output, "</div>");
    let _ = writeln!(output, "<header>");
    let _ = writeln!(output, "<h1>{title}</h1>");
    let _ = writeln!(
        output,
        "<div class=\"generated\">Generated: {}</div>",
        escape_html(&report.generated_at)
    );
    let _ = writeln!(output, "</header>");
    let _ = writeln!(output, "<h2>{}</h2>", escape_html(&report.heading()));
    let _ = writeln!(output, "<table>");
    let _ = write!(output, "<thead><tr><th></th>");
    for heading in TABLE_HEADINGS {
        let _ = write!(output, "<th>{heading}</th>");
    }
    let _ = writeln!(output, "</tr></thead>");
    let _ = writeln!(output, "<tbody>");
    for row in &report.rows {
        let _ = writeln!(
            output,
            "<tr><td class=\"category\">{}</td><td>{}</td><td class=\"wrap\">{}</td><td>{}</td><td class=\"wrap\">{}</td></tr>",
            row.category.label(),
            escape_html(&row.icon_text()),
            escape_html(or_dash(row.risk.as_deref())),
            escape_html(or_dash(row.status.as_deref())),
            escape_html(or_dash(row.solution.as_deref())),
        );
    }
    let _ = writeln!(output, "</tbody>");
    let _ = writeln!(output, "</table>");
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|text| !text.is_empty()).map(str::to_string)
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or(NO_DATA)
}

fn markdown_cell(value: Option<&str>) -> String {
    or_dash(value).replace('|', "\\|").replace('\n', "<br>")
}
