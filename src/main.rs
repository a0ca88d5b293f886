//! I-REC Projection CLI
//!
//! Command-line interface for running certificate revenue projections

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;

use irec_projection::assumptions::{CsvRates, FallbackRates, FeeSchedule, RateProvider, StaticRates};
use irec_projection::projection::export;
use irec_projection::{AggregateResult, ProjectionRequest, UnitMetric};

/// Multi-year I-REC revenue and cost projections
#[derive(Parser)]
#[command(name = "irec", version, about = "Multi-year I-REC revenue and cost projections")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a request file (or the built-in 2026 ICX hybrid defaults)
    Run(RunArgs),
    /// Print the built-in fee schedules as JSON
    Presets,
}

#[derive(Args)]
struct RunArgs {
    /// Path to a JSON projection request
    #[arg(long)]
    request: Option<PathBuf>,

    /// Exchange rate CSV (currency,rate); falls back to the request's rates if unreadable
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Override the number of projection years
    #[arg(long)]
    years: Option<u32>,

    /// Also write year_summary.csv and fee_lines.csv into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
    Csv,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args, &cli.output),
        Commands::Presets => {
            let presets = serde_json::json!({
                "icx_2026_v1": FeeSchedule::icx_2026_v1(),
                "itrack_2026_v2": FeeSchedule::itrack_2026_v2(),
            });
            println!("{}", serde_json::to_string_pretty(&presets)?);
            Ok(())
        }
    }
}

fn run(args: RunArgs, output: &OutputFormat) -> Result<()> {
    let mut request = match &args.request {
        Some(path) => ProjectionRequest::from_path(path)
            .with_context(|| format!("Failed to load request {}", path.display()))?,
        None => ProjectionRequest::default(),
    };

    if let Some(path) = &args.rates {
        let provider = FallbackRates::new(
            CsvRates::new(path, &request.rates.reporting),
            StaticRates(request.rates.clone()),
        );
        request.rates = provider.resolve().context("No usable exchange rates")?;
    }
    if let Some(years) = args.years {
        request.horizon.years = years;
    }

    info!("Projecting {} over {} year(s)", request.project.name, request.horizon.years);
    let results = request.run().context("Projection failed")?;

    if let Some(dir) = &args.out_dir {
        export::write_csv_reports(dir, &results)
            .with_context(|| format!("Failed to write reports to {}", dir.display()))?;
        eprintln!("Reports written to: {}", dir.display());
    }

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Csv => export::write_year_summary(std::io::stdout(), &results)?,
        OutputFormat::Table => print_tables(&request, &results),
    }
    Ok(())
}

fn print_tables(request: &ProjectionRequest, results: &[AggregateResult]) {
    let currency = &request.rates.reporting;

    println!("{}", request.project.name);
    println!("{}", "=".repeat(request.project.name.len()));
    for segment in &request.project.technologies {
        println!("  {:<8} {:>8.2} MW  CUF {:.2}", segment.technology, segment.capacity_mw, segment.cuf);
    }
    println!("  Reporting currency: {}", currency);

    for agg in results {
        println!("\nScenario: {} (price {:.4} {}/I-REC)", agg.scenario, agg.price, currency);
        println!("{:>4} {:>12} {:>16} {:>14} {:>14} {:>16} {:>18}",
            "Year", "Units", "Revenue", "Fees", "Success", "Net Profit", "Cumulative");
        println!("{}", "-".repeat(100));

        for row in &agg.years {
            println!("{:>4} {:>12.1} {:>16.2} {:>14.2} {:>14.2} {:>16.2} {:>18.2}",
                row.year,
                row.units,
                row.gross_revenue,
                row.total_cost,
                row.success_fee,
                row.net_profit,
                row.cumulative_net_profit,
            );
        }

        println!("\n  Totals over {} year(s):", agg.horizon_years());
        println!("    Certificates:   {:.1}", agg.total_units);
        println!("    Gross revenue:  {:.2}", agg.gross_revenue);
        println!("    Total expenses: {:.2}", agg.total_expenses);
        println!("    Net profit:     {:.2}", agg.net_profit);

        println!("\n  Per certificate:");
        for (name, metric) in &agg.cost_per_unit.fees {
            println!("    {:<40} {:>12}", name, per_unit(metric));
        }
        println!("    {:<40} {:>12}", "Total expenses", per_unit(&agg.cost_per_unit.total_expenses));
        println!("    {:<40} {:>12}", "Net profit", per_unit(&agg.cost_per_unit.net_profit));
    }
}

fn per_unit(metric: &UnitMetric) -> String {
    match metric.as_option() {
        Some(v) => format!("{:.4}", v),
        None => "n/a".to_string(),
    }
}
