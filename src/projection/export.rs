//! CSV export of projection results for reporting tools

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::cashflows::{AggregateResult, FeeLine, YearResult};
use crate::error::LoadError;

#[derive(Debug, Serialize)]
struct YearRow<'a> {
    scenario: &'a str,
    year: u32,
    price: f64,
    units: f64,
    gross_revenue: f64,
    total_cost: f64,
    net_pre_fee: f64,
    success_fee: f64,
    total_expenses: f64,
    net_profit: f64,
    cumulative_net_profit: f64,
    cost_per_unit: Option<f64>,
}

impl<'a> From<&'a YearResult> for YearRow<'a> {
    fn from(r: &'a YearResult) -> Self {
        Self {
            scenario: &r.scenario,
            year: r.year,
            price: r.price,
            units: r.units,
            gross_revenue: r.gross_revenue,
            total_cost: r.total_cost,
            net_pre_fee: r.net_pre_fee,
            success_fee: r.success_fee,
            total_expenses: r.total_expenses,
            net_profit: r.net_profit,
            cumulative_net_profit: r.cumulative_net_profit,
            cost_per_unit: r.cost_per_unit.as_option(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FeeRow<'a> {
    scenario: &'a str,
    year: u32,
    fee: &'a str,
    kind: &'static str,
    amount: f64,
    per_unit: Option<f64>,
}

/// Write one row per (scenario, year)
pub fn write_year_summary<W: Write>(writer: W, results: &[AggregateResult]) -> Result<(), LoadError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in results.iter().flat_map(|agg| agg.years.iter()) {
        csv_writer.serialize(YearRow::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write one row per (scenario, year, fee), operating fees before success fees
pub fn write_fee_lines<W: Write>(writer: W, results: &[AggregateResult]) -> Result<(), LoadError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in results.iter().flat_map(|agg| agg.years.iter()) {
        let tagged = row
            .fees
            .iter()
            .map(|l| ("operating", l))
            .chain(row.success_fees.iter().map(|l| ("success", l)));

        for (kind, line) in tagged {
            csv_writer.serialize(fee_row(row, kind, line))?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

fn fee_row<'a>(row: &'a YearResult, kind: &'static str, line: &'a FeeLine) -> FeeRow<'a> {
    FeeRow {
        scenario: &row.scenario,
        year: row.year,
        fee: &line.name,
        kind,
        amount: line.amount,
        per_unit: (row.units > 0.0).then(|| line.amount / row.units),
    }
}

/// Write `year_summary.csv` and `fee_lines.csv` into `dir`
pub fn write_csv_reports(dir: &Path, results: &[AggregateResult]) -> Result<(), LoadError> {
    std::fs::create_dir_all(dir)?;
    write_year_summary(File::create(dir.join("year_summary.csv"))?, results)?;
    write_fee_lines(File::create(dir.join("fee_lines.csv"))?, results)?;
    Ok(())
}
