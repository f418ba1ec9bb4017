use std::path::Path;

use colored::{ColoredString, Colorize};

use cablepath::config::Config;
use cablepath::input::RoutingInput;
use cablepath::{BatchOutcome, RouteResult, RouteStatus, run_batch, summarize};

use crate::cli::ReportFormat;

pub fn run(
    file: &Path,
    format: ReportFormat,
    config: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };
    let options = config.routing_options();

    let input = RoutingInput::load(file)?;
    let (containment, equipment, manifest) = input.into_parts(options.connection_tolerance)?;

    if !quiet {
        eprintln!(
            "Routing {} cables over {} containment units ({} equipment)",
            manifest.len(),
            containment.len(),
            equipment.len(),
        );
    }

    let outcome = run_batch(
        &manifest,
        &containment,
        &equipment,
        &options,
        || false,
        |p| {
            if !quiet {
                eprintln!(
                    "  [{}/{}] {} ({} -> {}): {}",
                    p.index,
                    p.total,
                    p.cable_reference,
                    p.from_identifier,
                    p.to_identifier,
                    p.status
                );
            }
        },
    );

    let rows = match outcome {
        BatchOutcome::Completed(rows) => rows,
        BatchOutcome::Cancelled { processed, total } => {
            anyhow::bail!(
                "Routing cancelled after {processed} of {total} cables; no report written"
            )
        }
    };

    let scale = config.length_scale();
    let rows: Vec<RouteResult> = rows
        .into_iter()
        .map(|mut row| {
            row.physical_length *= scale;
            row.virtual_length *= scale;
            row
        })
        .collect();

    match format {
        ReportFormat::Table => print_table(&rows),
        ReportFormat::Yaml => print!("{}", serde_yaml::to_string(&rows)?),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }

    if !quiet && format == ReportFormat::Table {
        println!();
        for (status, count) in summarize(&rows) {
            println!("  {} {count}", paint(status, &format!("{status}:")));
        }
    }

    Ok(())
}

fn paint(status: RouteStatus, text: &str) -> ColoredString {
    match status {
        RouteStatus::Confirmed => text.green(),
        RouteStatus::ConfirmedFrom | RouteStatus::ConfirmedTo => text.cyan(),
        RouteStatus::Unconfirmed => text.yellow(),
        RouteStatus::NoContainmentAssigned => text.dimmed(),
        RouteStatus::ProcessingError => text.red(),
    }
}

const HEADERS: [&str; 10] = [
    "Cable", "From", "To", "From Match", "To Match", "Status", "Length", "Virtual", "Branches",
    "Route",
];

fn print_table(rows: &[RouteResult]) {
    let cells: Vec<[String; 10]> = rows
        .iter()
        .map(|row| {
            [
                row.cable_reference.clone(),
                row.from_identifier.clone(),
                row.to_identifier.clone(),
                row.from_match.to_string(),
                row.to_match.to_string(),
                row.status.to_string(),
                format!("{:.2}", row.physical_length),
                format!("{:.2}", row.virtual_length),
                row.branch_sequence.clone(),
                row.message.clone().unwrap_or_else(|| row.route.clone()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for line in &cells {
        for (w, cell) in widths.iter_mut().zip(line) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    println!("{}", header.join("  ").trim_end().bold());

    for (row, line) in rows.iter().zip(&cells) {
        let mut out = Vec::with_capacity(line.len());
        for (i, (cell, w)) in line.iter().zip(widths).enumerate() {
            let padded = format!("{cell:<w$}");
            if i == 5 {
                out.push(paint(row.status, &padded).to_string());
            } else {
                out.push(padded);
            }
        }
        println!("{}", out.join("  ").trim_end());
    }
}
