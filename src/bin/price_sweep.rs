//! Sweep certificate prices for one project and write net profit per price
//!
//! Mirrors the calculator's price slider: every step is an independent scenario.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use irec_projection::{Price, ProjectionRequest, ScenarioRunner};

#[derive(Parser)]
#[command(name = "price_sweep", about = "Net profit across a range of certificate prices")]
struct SweepArgs {
    /// Path to a JSON projection request (defaults to the built-in hybrid project)
    #[arg(long)]
    request: Option<PathBuf>,

    /// Lowest price
    #[arg(long, default_value_t = 0.20)]
    min: f64,

    /// Highest price
    #[arg(long, default_value_t = 1.50)]
    max: f64,

    /// Price increment
    #[arg(long, default_value_t = 0.05)]
    step: f64,

    /// Currency of the swept prices
    #[arg(long, default_value = "USD")]
    currency: String,

    /// Override the number of projection years
    #[arg(long)]
    years: Option<u32>,

    /// Output CSV path
    #[arg(long, default_value = "price_sweep.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct SweepRow<'a> {
    price: f64,
    currency: &'a str,
    reporting_price: f64,
    units: f64,
    gross_revenue: f64,
    total_cost: f64,
    success_fee: f64,
    net_profit: f64,
    net_profit_per_unit: Option<f64>,
}

fn sweep_prices(min: f64, max: f64, step: f64, currency: &str) -> Result<Vec<Price>> {
    if !(step > 0.0) {
        bail!("step must be > 0, got {}", step);
    }
    if min < 0.0 || max < min {
        bail!("invalid price range {}..{}", min, max);
    }
    // Integer stepping avoids accumulating float drift across the range
    let steps = ((max - min) / step + 1e-9).floor() as usize;
    Ok((0..=steps)
        .map(|i| Price::new(min + i as f64 * step, currency))
        .collect())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = SweepArgs::parse();

    let mut request = match &args.request {
        Some(path) => ProjectionRequest::from_path(path)
            .with_context(|| format!("Failed to load request {}", path.display()))?,
        None => ProjectionRequest::default(),
    };
    if let Some(years) = args.years {
        request.horizon.years = years;
    }

    let prices = sweep_prices(args.min, args.max, args.step, &args.currency)?;
    println!("Sweeping {} prices for {}...", prices.len(), request.project.name);

    let start = Instant::now();
    let runner = ScenarioRunner::with_assumptions(request.assumptions());
    let results = runner
        .run_price_sweep(&request.project, &prices, request.horizon.years)
        .context("Price sweep failed")?;
    println!("Projected in {:?}", start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Unable to create {}", args.output.display()))?;
    for (price, agg) in prices.iter().zip(&results) {
        writer.serialize(SweepRow {
            price: price.amount,
            currency: &price.currency,
            reporting_price: agg.price,
            units: agg.total_units,
            gross_revenue: agg.gross_revenue,
            total_cost: agg.total_cost,
            success_fee: agg.success_fee,
            net_profit: agg.net_profit,
            net_profit_per_unit: agg.cost_per_unit.net_profit.as_option(),
        })?;
    }
    writer.flush()?;

    if let Some(breakeven) = results.iter().zip(&prices).find(|(agg, _)| agg.net_profit > 0.0) {
        println!("Lowest profitable price: {:.2} {}", breakeven.1.amount, breakeven.1.currency);
    } else {
        println!("No profitable price in range");
    }
    println!("Results written to: {}", args.output.display());
    Ok(())
}
