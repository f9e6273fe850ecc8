#![deny(missing_docs)]
//! InfraPulse command-line interface.
//!
//! Scores device sanity ratings offline and manages client inventory and
//! reports through the InfraPulse server.

mod api;

use api::{ClientSummary, DEFAULT_SERVER_URL, DeviceResponse, InventoryApi};
use clap::{Args, Parser, Subcommand, ValueEnum};
use infrapulse_core::{
    DeviceCategory, DeviceForm, InfraReport, SanityLevel, SanityRecord, format_percent,
    infra_percent, render_json, render_report_html, render_report_markdown, render_report_text,
};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use std::str::FromStr;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "infrapulse", version, about = "InfraPulse CLI")]
struct Cli {
    /// Base URL of the InfraPulse server.
    #[arg(long, global = true, env = "INFRAPULSE_API_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Markdown,
    Html,
    Json,
}

#[derive(Args, Clone)]
struct DeviceTarget {
    /// Client slug.
    #[arg(long)]
    client: String,
    /// Device category: firewall or switches.
    #[arg(long, value_parser = parse_category)]
    category: DeviceCategory,
}

#[derive(Args, Clone, Default)]
struct DeviceFieldArgs {
    /// Sanity rating: good, warning, or critical.
    #[arg(long, value_parser = parse_rating)]
    rating: Option<SanityLevel>,
    /// Importance weight, clamped to 1..=10 when scoring.
    #[arg(long)]
    weight: Option<f64>,
    /// Status line.
    #[arg(long)]
    status: Option<String>,
    /// Risk description.
    #[arg(long)]
    risk: Option<String>,
    /// Proposed solution.
    #[arg(long)]
    solution: Option<String>,
    /// Management IP address.
    #[arg(long)]
    ip_address: Option<String>,
    /// Firmware version.
    #[arg(long)]
    firmware_version: Option<String>,
    /// Vendor.
    #[arg(long)]
    make: Option<String>,
    /// Model name.
    #[arg(long)]
    model: Option<String>,
    /// Free-form notes.
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum ClientCommands {
    /// List clients with their infrastructure percentage.
    List {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Create a client.
    Add {
        /// Client display name.
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum DeviceCommands {
    /// Show the stored form for a device category.
    Show {
        #[command(flatten)]
        target: DeviceTarget,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Update fields of a device category; unspecified fields keep their values.
    Set {
        #[command(flatten)]
        target: DeviceTarget,
        #[command(flatten)]
        fields: DeviceFieldArgs,
    },
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the weighted infrastructure percentage from device ratings offline.
    Score {
        /// Device rating with optional weight, e.g. `good:9`, `critical`, `none:3`.
        #[arg(long = "device", value_parser = parse_device_spec)]
        devices: Vec<SanityRecord>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Manage clients on the server.
    Clients {
        #[command(subcommand)]
        command: ClientCommands,
    },
    /// Inspect or edit device category forms on the server.
    Device {
        #[command(subcommand)]
        command: DeviceCommands,
    },
    /// Render the infrastructure report for a client.
    Report {
        /// Client slug.
        #[arg(long)]
        client: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Serialize)]
struct ScoreOutput {
    percent: Option<u8>,
    display: String,
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Score { devices, json } => print!("{}", render_score(&devices, json)?),
        Commands::Clients { command } => {
            let api = api::ReqwestInventoryApi::new(&cli.server_url)?;
            let contents = match command {
                ClientCommands::List { json } => run_clients_list(&api, json).await?,
                ClientCommands::Add { name } => run_clients_add(&api, &name).await?,
            };
            print!("{contents}");
        }
        Commands::Device { command } => {
            let api = api::ReqwestInventoryApi::new(&cli.server_url)?;
            let contents = match command {
                DeviceCommands::Show { target, json } => {
                    run_device_show(&api, &target, json).await?
                }
                DeviceCommands::Set { target, fields } => {
                    run_device_set(&api, &target, &fields).await?
                }
            };
            print!("{contents}");
        }
        Commands::Report { client, output } => {
            let api = api::ReqwestInventoryApi::new(&cli.server_url)?;
            run_report(&api, &client, &output).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

fn parse_category(raw: &str) -> Result<DeviceCategory, String> {
    DeviceCategory::from_str(raw).map_err(|err| err.to_string())
}

fn parse_rating(raw: &str) -> Result<SanityLevel, String> {
    SanityLevel::from_str(raw).map_err(|err| err.to_string())
}

/// Parse `RATING[:WEIGHT]`, where rating `none` records an unrated device.
fn parse_device_spec(raw: &str) -> Result<SanityRecord, String> {
    let (rating, weight) = match raw.split_once(':') {
        Some((rating, weight)) => (rating, Some(weight)),
        None => (raw, None),
    };
    let rating = match rating.trim() {
        value if value.eq_ignore_ascii_case("none") => None,
        value => Some(parse_rating(value)?),
    };
    let weight = match weight {
        Some(value) => Some(
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid weight {value:?}; expected a number"))?,
        ),
        None => None,
    };
    Ok(SanityRecord::new(rating, weight))
}

fn render_score(devices: &[SanityRecord], json: bool) -> CliResult<String> {
    let percent = infra_percent(devices);
    if json {
        let payload = ScoreOutput {
            percent,
            display: format_percent(percent),
        };
        return Ok(format!("{}\n", render_json(&payload)?));
    }
    Ok(format!("Infrastructure: {}\n", format_percent(percent)))
}

fn apply_device_fields(form: &mut DeviceForm, fields: &DeviceFieldArgs) {
    if let Some(rating) = fields.rating {
        form.sanity_icon = rating;
    }
    if let Some(weight) = fields.weight {
        form.weight = weight;
    }
    let text_fields = [
        (&mut form.status, &fields.status),
        (&mut form.risk, &fields.risk),
        (&mut form.solution, &fields.solution),
        (&mut form.ip_address, &fields.ip_address),
        (&mut form.firmware_version, &fields.firmware_version),
        (&mut form.make, &fields.make),
        (&mut form.model, &fields.model),
        (&mut form.notes, &fields.notes),
    ];
    for (target, value) in text_fields {
        if let Some(value) = value {
            target.clone_from(value);
        }
    }
}

async fn run_clients_list<A: InventoryApi>(api: &A, json: bool) -> CliResult<String> {
    let clients = api.list_clients().await?;
    if json {
        return Ok(format!("{}\n", render_json(&clients)?));
    }
    Ok(render_clients_text(&clients))
}

async fn run_clients_add<A: InventoryApi>(api: &A, name: &str) -> CliResult<String> {
    let client = api.create_client(name).await?;
    Ok(format!("Created client {} ({})\n", client.name, client.slug))
}

async fn run_device_show<A: InventoryApi>(
    api: &A,
    target: &DeviceTarget,
    json: bool,
) -> CliResult<String> {
    let device = api.fetch_device(&target.client, target.category).await?;
    if json {
        return Ok(format!("{}\n", render_json(&device)?));
    }
    Ok(render_device_text(&device))
}

async fn run_device_set<A: InventoryApi>(
    api: &A,
    target: &DeviceTarget,
    fields: &DeviceFieldArgs,
) -> CliResult<String> {
    let current = api.fetch_device(&target.client, target.category).await?;
    let mut form = current.form;
    apply_device_fields(&mut form, fields);
    let saved = api
        .save_device(&target.client, target.category, &form)
        .await?;
    Ok(render_device_text(&saved))
}

async fn run_report<A: InventoryApi>(api: &A, slug: &str, output: &OutputArgs) -> CliResult<()> {
    let report = api.fetch_report(slug).await?;
    emit_report(&report, output).await
}

async fn emit_report(report: &InfraReport, output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_report_text(report),
        OutputFormat::Markdown => render_report_markdown(report),
        OutputFormat::Html => render_report_html(report),
        OutputFormat::Json => render_json(report)?,
    };
    emit_output(output, contents).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_clients_text(clients: &[ClientSummary]) -> String {
    if clients.is_empty() {
        return "No clients yet.\n".to_string();
    }
    let mut output = String::new();
    for client in clients {
        let _ = writeln!(
            output,
            "{}\t{}\t{}",
            client.slug,
            client.name,
            format_percent(client.infra_percent)
        );
    }
    output
}

fn render_device_text(device: &DeviceResponse) -> String {
    let form = &device.form;
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} / {}",
        device.client.name,
        device.category.label()
    );
    let _ = writeln!(
        output,
        "Sanity: {} {}",
        form.sanity_icon.icon(),
        form.sanity_icon.label()
    );
    let _ = writeln!(output, "Weight: {}", form.weight);
    let fields = [
        ("Status", &form.status),
        ("Risk", &form.risk),
        ("Solution", &form.solution),
        ("IP address", &form.ip_address),
        ("Firmware", &form.firmware_version),
        ("Make", &form.make),
        ("Model", &form.model),
        ("Notes", &form.notes),
    ];
    for (label, value) in fields {
        if !value.trim().is_empty() {
            let _ = writeln!(output, "{label}: {value}");
        }
    }
    let _ = writeln!(
        output,
        "Infrastructure: {}",
        format_percent(device.infra_percent)
    );
    output
}
