use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use labelsort::{
    load_targets, sort_label_pdf, AssembleOptions, DocumentType, EmptyIdentifierPolicy,
    LabelSorter, PageReport, Region, SortOptions, SortOutcome, TargetColumns, TargetEntry,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "labelsort",
    about = "Reorder shipping-label PDF pages to match a spreadsheet's barcode order",
    version,
    author
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the label pages in spreadsheet order
    Sort {
        /// Input label PDF
        #[arg(long)]
        pdf: PathBuf,

        /// Target sheet (.xlsx, .xls, .xlsb, .ods or .csv)
        #[arg(long)]
        sheet: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        columns: ColumnArgs,

        /// Let an empty barcode cell claim a page with no barcode
        #[arg(long)]
        match_empty: bool,

        /// Drop the document information dictionary
        #[arg(long)]
        no_metadata: bool,

        /// Compress streams in the output
        #[arg(long)]
        compress: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the identifier read from every page
    Scan {
        /// Input label PDF
        #[arg(long)]
        pdf: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a target sheet and list its rows
    Targets {
        /// Target sheet (.xlsx, .xls, .xlsb, .ods or .csv)
        #[arg(long)]
        sheet: PathBuf,

        #[command(flatten)]
        columns: ColumnArgs,

        /// Print the targets as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// Label layout: standard (18-digit barcode in the text) or fba (barcode box)
    #[arg(short = 't', long = "type", default_value = "standard")]
    document_type: DocumentType,

    /// Crop region "x0,top,x1,bottom" in points from the top-left corner
    #[arg(short, long, value_parser = parse_region)]
    region: Option<Region>,
}

#[derive(Args)]
struct ColumnArgs {
    /// Header of the barcode column
    #[arg(long, default_value = "label_bar_code")]
    id_column: String,

    /// Header of the carton column
    #[arg(long, default_value = "carton_code")]
    key_column: String,
}

impl ColumnArgs {
    fn to_columns(&self) -> TargetColumns {
        TargetColumns::new(&self.id_column, &self.key_column)
    }
}

fn parse_region(s: &str) -> std::result::Result<Region, String> {
    Region::parse(s).map_err(|e| e.to_string())
}

#[derive(Serialize)]
struct SortSummary<'a> {
    output: String,
    matched: usize,
    unmatched: &'a [TargetEntry],
    page_order: Vec<usize>,
    pages: &'a [PageReport],
}

impl<'a> SortSummary<'a> {
    fn new(output: &Path, outcome: &'a SortOutcome) -> Self {
        Self {
            output: output.display().to_string(),
            matched: outcome.matched,
            unmatched: &outcome.unmatched,
            page_order: outcome.page_order.clone(),
            pages: &outcome.report,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn display_identifier(identifier: &str) -> &str {
    if identifier.is_empty() {
        "(none)"
    } else {
        identifier
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sort {
            pdf,
            sheet,
            output,
            layout,
            columns,
            match_empty,
            no_metadata,
            compress,
            json,
        } => {
            let options = SortOptions {
                document_type: layout.document_type,
                region: layout.region,
                columns: columns.to_columns(),
                empty_policy: if match_empty {
                    EmptyIdentifierPolicy::Legacy
                } else {
                    EmptyIdentifierPolicy::NeverMatch
                },
                assemble: AssembleOptions {
                    preserve_metadata: !no_metadata,
                    compress,
                },
                ..Default::default()
            };

            tracing::debug!("Identifier strategy: {:?}", options.strategy());

            let outcome = sort_label_pdf(&pdf, &sheet, &output, options).with_context(|| {
                format!("Failed to sort {} by {}", pdf.display(), sheet.display())
            })?;

            if json {
                let summary = SortSummary::new(&output, &outcome);
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "✓ Wrote {} page(s) to {}",
                    outcome.matched,
                    output.display()
                );
                if outcome.unmatched.is_empty() {
                    println!("All targets matched");
                } else {
                    println!("{} target(s) not found:", outcome.unmatched.len());
                    for target in &outcome.unmatched {
                        println!(
                            "  {} (carton {})",
                            display_identifier(&target.identifier),
                            target.destination_key
                        );
                    }
                }
            }
        }

        Commands::Scan { pdf, layout, json } => {
            let bytes = std::fs::read(&pdf)
                .with_context(|| format!("Failed to read {}", pdf.display()))?;
            let options = SortOptions {
                document_type: layout.document_type,
                region: layout.region,
                ..Default::default()
            };

            let reports = LabelSorter::new(options)
                .scan(&bytes)
                .with_context(|| format!("Failed to open PDF {}", pdf.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    println!(
                        "Page {} → {}",
                        report.page_index + 1,
                        display_identifier(&report.identifier)
                    );
                }
            }
        }

        Commands::Targets {
            sheet,
            columns,
            json,
        } => {
            let targets = load_targets(&sheet, &columns.to_columns())
                .with_context(|| format!("Failed to load targets from {}", sheet.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(targets.entries())?);
            } else {
                println!("{} target(s) in {}", targets.len(), sheet.display());
                for target in &targets {
                    println!(
                        "{:>4}. {} → {}",
                        target.sequence_position + 1,
                        display_identifier(&target.identifier),
                        target.destination_key
                    );
                }
            }
        }
    }

    Ok(())
}
