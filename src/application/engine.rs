use super::calculator;
use crate::domain::channel::{ChannelKind, ChannelRegistry, TransferSpeed};
use crate::domain::currency::Currency;
use crate::domain::fee::FeeBreakdown;
use crate::domain::transaction::{Amount, Transaction};
use crate::error::{FeeError, Result};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A priced transaction.
pub type FeeRecord = (Transaction, FeeBreakdown);

/// A record that could not be priced, with its position in the input.
#[derive(Debug)]
pub struct Failure {
    pub position: usize,
    pub transaction_id: String,
    pub error: FeeError,
}

/// Outcome of a batch: priced records in input order, plus the skipped ones.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<FeeRecord>,
    pub failures: Vec<Failure>,
}

/// Chunk result before duplicate ids are resolved; records keep their input position.
#[derive(Default)]
struct PricedChunk {
    records: Vec<(usize, FeeRecord)>,
    failures: Vec<Failure>,
}

impl PricedChunk {
    fn absorb(&mut self, other: PricedChunk) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
    }

    /// Keeps the first priced record of every id; later priced ones become failures.
    ///
    /// A record that failed to price does not claim its id, so a corrected
    /// resubmission later in the batch is priced normally.
    fn into_report(self) -> BatchReport {
        let mut seen = HashSet::new();
        let mut report = BatchReport {
            records: Vec::with_capacity(self.records.len()),
            failures: self.failures,
        };
        for (position, (tx, fee)) in self.records {
            if seen.insert(tx.id.clone()) {
                report.records.push((tx, fee));
            } else {
                warn!(transaction = %tx.id, position, "skipping duplicate transaction id");
                report.failures.push(Failure {
                    position,
                    transaction_id: tx.id.clone(),
                    error: FeeError::invalid(tx.id, "duplicate transaction id"),
                });
            }
        }
        report.failures.sort_by_key(|f| f.position);
        log_outcome(&report);
        report
    }
}

/// Price of one amount on one channel, used to compare channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelQuote {
    pub kind: ChannelKind,
    pub name: String,
    pub speed: Option<TransferSpeed>,
    pub breakdown: FeeBreakdown,
}

/// Prices transactions against a shared, read-only channel registry.
///
/// Record-level failures are collected in the [`BatchReport`] and never stop
/// the batch. Any other error aborts it.
#[derive(Debug, Clone)]
pub struct FeeEngine {
    registry: Arc<ChannelRegistry>,
}

impl FeeEngine {
    pub fn new(registry: ChannelRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Prices a single transaction on the channel its kind selects.
    pub fn calculate(&self, tx: &Transaction) -> Result<FeeBreakdown> {
        calculate_with(&self.registry, tx)
    }

    /// Prices a batch in order.
    ///
    /// An id that was already priced earlier in the batch is skipped and
    /// reported as a duplicate. Records that fail pricing do not count, so a
    /// rejected record may be resubmitted under the same id.
    pub fn process_batch<I>(&self, transactions: I) -> Result<BatchReport>
    where
        I: IntoIterator<Item = Transaction>,
    {
        let priced = price_chunk(&self.registry, transactions.into_iter().enumerate())?;
        Ok(priced.into_report())
    }

    /// Same result as [`FeeEngine::process_batch`], with the pricing split into
    /// contiguous chunks on the blocking pool.
    pub async fn process_sharded(
        &self,
        transactions: Vec<Transaction>,
        shards: NonZeroUsize,
    ) -> Result<BatchReport> {
        let chunk_size = transactions.len().div_ceil(shards.get()).max(1);
        debug!(records = transactions.len(), shards = shards.get(), chunk_size, "dispatching shards");

        let mut handles = Vec::new();
        let mut pending = transactions.into_iter().enumerate().peekable();
        while pending.peek().is_some() {
            let chunk: Vec<_> = pending.by_ref().take(chunk_size).collect();
            let registry = Arc::clone(&self.registry);
            handles.push(tokio::task::spawn_blocking(move || {
                price_chunk(&registry, chunk)
            }));
        }

        let mut priced = PricedChunk::default();
        for handle in handles {
            priced.absorb(handle.await??);
        }
        Ok(priced.into_report())
    }

    /// Prices `amount` on every channel that accepts `currency`, cheapest first.
    ///
    /// A channel that cannot price the amount is left out of the comparison.
    pub fn quote(&self, amount: Amount, currency: Currency) -> Result<Vec<ChannelQuote>> {
        let mut quotes = Vec::new();
        for channel in self.registry.channels().filter(|c| c.supports(currency)) {
            let breakdown = match calculator::price(channel, amount, currency) {
                Ok(breakdown) => breakdown,
                Err(error) if error.is_record_level() => {
                    warn!(channel = %channel.kind(), %error, "leaving channel out of quote");
                    continue;
                }
                Err(error) => return Err(error),
            };
            quotes.push(ChannelQuote {
                kind: channel.kind(),
                name: channel.name().to_string(),
                speed: channel.variant().transfer_speed(),
                breakdown,
            });
        }
        quotes.sort_by(|a, b| {
            a.breakdown
                .total_fee
                .cmp(&b.breakdown.total_fee)
                .then(a.kind.cmp(&b.kind))
        });
        Ok(quotes)
    }

    pub fn cheapest_channel(&self, amount: Amount, currency: Currency) -> Result<Option<ChannelQuote>> {
        Ok(self.quote(amount, currency)?.into_iter().next())
    }
}

fn calculate_with(registry: &ChannelRegistry, tx: &Transaction) -> Result<FeeBreakdown> {
    let channel = registry.get(tx.channel_kind).ok_or_else(|| {
        FeeError::invalid(
            tx.id.clone(),
            format!("no channel configured for {}", tx.channel_kind),
        )
    })?;
    calculator::compute(tx, channel)
}

fn price_chunk<I>(registry: &ChannelRegistry, chunk: I) -> Result<PricedChunk>
where
    I: IntoIterator<Item = (usize, Transaction)>,
{
    let mut report = PricedChunk::default();
    for (position, tx) in chunk {
        match calculate_with(registry, &tx) {
            Ok(breakdown) => report.records.push((position, (tx, breakdown))),
            Err(error) if error.is_record_level() => {
                warn!(transaction = %tx.id, position, %error, "skipping transaction");
                report.failures.push(Failure {
                    position,
                    transaction_id: tx.id,
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }
    Ok(report)
}

fn log_outcome(report: &BatchReport) {
    info!(
        priced = report.records.len(),
        skipped = report.failures.len(),
        "batch complete"
    );
}
