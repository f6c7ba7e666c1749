use crate::application::analyzer::{AggregateResult, GroupSummary};
use crate::error::Result;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt::Display;
use std::io::Write;

/// Decimal places for money columns.
pub const MONEY_DP: u32 = 2;
/// Decimal places for rate columns.
pub const RATE_DP: u32 = 4;

/// Output encodings of the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// One rendered output row. Rounding happens here and nowhere upstream.
#[derive(Debug, Serialize)]
struct SummaryRow {
    group: String,
    count: usize,
    total_amount: Decimal,
    total_fee: Decimal,
    mean_effective_rate: Decimal,
    median_effective_rate: Decimal,
    weighted_effective_rate: Decimal,
    fee_share: Decimal,
    p10: Decimal,
    p25: Decimal,
    p50: Decimal,
    p75: Decimal,
    p90: Decimal,
    p95: Decimal,
    p99: Decimal,
}

impl SummaryRow {
    fn new(group: String, summary: &GroupSummary) -> Self {
        let p = &summary.percentiles;
        Self {
            group,
            count: summary.count,
            total_amount: money(summary.total_amount),
            total_fee: money(summary.total_fee),
            mean_effective_rate: rate(summary.mean_effective_rate),
            median_effective_rate: rate(summary.median_effective_rate),
            weighted_effective_rate: rate(summary.weighted_effective_rate),
            fee_share: rate(summary.fee_share),
            p10: rate(p.p10),
            p25: rate(p.p25),
            p50: rate(p.p50),
            p75: rate(p.p75),
            p90: rate(p.p90),
            p95: rate(p.p95),
            p99: rate(p.p99),
        }
    }
}

fn money(value: Decimal) -> Decimal {
    fixed(value, MONEY_DP)
}

fn rate(value: Decimal) -> Decimal {
    fixed(value, RATE_DP)
}

/// Rounds half to even and pads to exactly `dp` places.
fn fixed(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(dp);
    rounded
}

/// Writes an [`AggregateResult`] as CSV or a JSON array, one entry per group in key order.
pub struct SummaryWriter<W: Write> {
    output: W,
    format: OutputFormat,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(output: W, format: OutputFormat) -> Self {
        Self { output, format }
    }

    pub fn write_summary<K: Ord + Display>(self, result: &AggregateResult<K>) -> Result<()> {
        let rows = result
            .iter()
            .map(|(key, summary)| SummaryRow::new(key.to_string(), summary));

        match self.format {
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(self.output);
                let mut wrote_any = false;
                for row in rows {
                    writer.serialize(row)?;
                    wrote_any = true;
                }
                if !wrote_any {
                    writer.write_record(HEADER)?;
                }
                writer.flush()?;
            }
            OutputFormat::Json => {
                let mut output = self.output;
                serde_json::to_writer_pretty(&mut output, &rows.collect::<Vec<_>>())?;
                writeln!(output)?;
            }
        }
        Ok(())
    }
}

/// CSV header, also written when there are no groups.
pub const HEADER: [&str; 15] = [
    "group",
    "count",
    "total_amount",
    "total_fee",
    "mean_effective_rate",
    "median_effective_rate",
    "weighted_effective_rate",
    "fee_share",
    "p10",
    "p25",
    "p50",
    "p75",
    "p90",
    "p95",
    "p99",
];
