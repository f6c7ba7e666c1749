//! Aggregation of priced transactions into grouped summary statistics.
//!
//! Aggregation is a pure fold. Sums merge associatively across shards; the
//! raw effective rates are kept until [`PartialAggregate::finish`] because
//! percentiles cannot be merged from partial summaries.

use super::engine::FeeRecord;
use crate::domain::channel::ChannelKind;
use crate::domain::currency::Currency;
use crate::domain::fee::FeeBreakdown;
use crate::domain::transaction::Transaction;
use crate::error::{FeeError, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Built-in key selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Channel,
    Currency,
    Day,
    Week,
    Month,
}

impl GroupBy {
    pub fn key(self, tx: &Transaction, _fee: &FeeBreakdown) -> GroupKey {
        match self {
            GroupBy::Channel => GroupKey::Channel(tx.channel_kind),
            GroupBy::Currency => GroupKey::Currency(tx.currency),
            GroupBy::Day => GroupKey::Day(tx.timestamp.date_naive()),
            GroupBy::Week => {
                let week = tx.timestamp.iso_week();
                GroupKey::Week {
                    year: week.year(),
                    week: week.week(),
                }
            }
            GroupBy::Month => GroupKey::Month {
                year: tx.timestamp.year(),
                month: tx.timestamp.month(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Channel(ChannelKind),
    Currency(Currency),
    Day(NaiveDate),
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Channel(kind) => write!(f, "{kind}"),
            GroupKey::Currency(currency) => write!(f, "{currency}"),
            GroupKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            GroupKey::Week { year, week } => write!(f, "{year}-W{week:02}"),
            GroupKey::Month { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}

/// Effective-rate percentiles, linearly interpolated between ranks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Percentiles {
    pub p10: Decimal,
    pub p25: Decimal,
    pub p50: Decimal,
    pub p75: Decimal,
    pub p90: Decimal,
    pub p95: Decimal,
    pub p99: Decimal,
}

impl Percentiles {
    fn from_sorted(sorted: &[Decimal]) -> Self {
        Self {
            p10: percentile(sorted, dec!(0.10)),
            p25: percentile(sorted, dec!(0.25)),
            p50: percentile(sorted, dec!(0.50)),
            p75: percentile(sorted, dec!(0.75)),
            p90: percentile(sorted, dec!(0.90)),
            p95: percentile(sorted, dec!(0.95)),
            p99: percentile(sorted, dec!(0.99)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub count: usize,
    pub total_amount: Decimal,
    pub total_fee: Decimal,
    pub mean_amount: Decimal,
    pub mean_fee: Decimal,
    /// Unweighted mean of per-transaction effective rates.
    pub mean_effective_rate: Decimal,
    pub median_effective_rate: Decimal,
    /// `total_fee / total_amount`.
    pub weighted_effective_rate: Decimal,
    /// This group's share of the fees across all groups of the result.
    pub fee_share: Decimal,
    pub percentiles: Percentiles,
}

/// Running totals for one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAccumulator {
    count: usize,
    total_amount: Decimal,
    total_fee: Decimal,
    rates: Vec<Decimal>,
}

impl GroupAccumulator {
    /// Adds one record. On overflow the accumulator is left unchanged.
    pub fn push(&mut self, tx: &Transaction, fee: &FeeBreakdown) -> Result<()> {
        let total_amount = checked_add(self.total_amount, tx.amount, "total amount")?;
        let total_fee = checked_add(self.total_fee, fee.total_fee, "total fee")?;
        self.count += 1;
        self.total_amount = total_amount;
        self.total_fee = total_fee;
        self.rates.push(fee.effective_rate);
        Ok(())
    }

    pub fn merge(&mut self, other: GroupAccumulator) -> Result<()> {
        let total_amount = checked_add(self.total_amount, other.total_amount, "total amount")?;
        let total_fee = checked_add(self.total_fee, other.total_fee, "total fee")?;
        self.count += other.count;
        self.total_amount = total_amount;
        self.total_fee = total_fee;
        self.rates.extend(other.rates);
        Ok(())
    }

    fn finish(mut self, fee_pool: Decimal) -> Result<GroupSummary> {
        self.rates.sort_unstable();
        let count = Decimal::from(self.count);
        let rate_sum = checked_sum(self.rates.iter().copied(), "effective rate sum")?;
        Ok(GroupSummary {
            count: self.count,
            total_amount: self.total_amount,
            total_fee: self.total_fee,
            mean_amount: self.total_amount / count,
            mean_fee: self.total_fee / count,
            mean_effective_rate: rate_sum / count,
            median_effective_rate: median(&self.rates),
            weighted_effective_rate: ratio(self.total_fee, self.total_amount)?,
            fee_share: ratio(self.total_fee, fee_pool)?,
            percentiles: Percentiles::from_sorted(&self.rates),
        })
    }
}

/// Accumulated but not yet summarized groups; merge shards, then finish.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialAggregate<K: Ord> {
    groups: BTreeMap<K, GroupAccumulator>,
}

impl<K: Ord> Default for PartialAggregate<K> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }
}

impl<K: Ord> PartialAggregate<K> {
    pub fn from_records<'a, I, F>(records: I, group_by: F) -> Result<Self>
    where
        I: IntoIterator<Item = &'a FeeRecord>,
        F: Fn(&Transaction, &FeeBreakdown) -> K,
    {
        let mut partial = Self::default();
        for (tx, fee) in records {
            partial
                .groups
                .entry(group_by(tx, fee))
                .or_default()
                .push(tx, fee)?;
        }
        Ok(partial)
    }

    pub fn merge(mut self, other: PartialAggregate<K>) -> Result<Self> {
        for (key, acc) in other.groups {
            self.groups.entry(key).or_default().merge(acc)?;
        }
        Ok(self)
    }

    pub fn finish(self) -> Result<AggregateResult<K>> {
        let fee_pool = checked_sum(self.groups.values().map(|acc| acc.total_fee), "fee pool")?;
        let groups = self
            .groups
            .into_iter()
            .map(|(key, acc)| acc.finish(fee_pool).map(|summary| (key, summary)))
            .collect::<Result<_>>()?;
        Ok(AggregateResult { groups })
    }
}

/// Group key to summary. Iterates in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult<K: Ord> {
    groups: BTreeMap<K, GroupSummary>,
}

impl<K: Ord + fmt::Display> AggregateResult<K> {
    /// Summary of a named group; an absent group is an error, not an empty summary.
    pub fn get(&self, key: &K) -> Result<&GroupSummary> {
        self.groups
            .get(key)
            .ok_or_else(|| FeeError::EmptyGroupError(key.to_string()))
    }
}

impl<K: Ord> AggregateResult<K> {
    pub fn iter(&self) -> impl Iterator<Item = (&K, &GroupSummary)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups ordered by mean effective rate, cheapest first. Ties keep key order.
    pub fn ranked_by_effective_rate(&self) -> Vec<(&K, &GroupSummary)> {
        let mut ranked: Vec<_> = self.groups.iter().collect();
        ranked.sort_by(|a, b| a.1.mean_effective_rate.cmp(&b.1.mean_effective_rate));
        ranked
    }

    /// Groups ordered by total amount, largest first, numbered from 1.
    pub fn ranked_by_volume(&self) -> Vec<VolumeRank<'_, K>> {
        let mut ranked: Vec<_> = self.groups.iter().collect();
        ranked.sort_by(|a, b| b.1.total_amount.cmp(&a.1.total_amount));
        ranked
            .into_iter()
            .enumerate()
            .map(|(index, (key, summary))| VolumeRank {
                rank: index + 1,
                key,
                summary,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeRank<'a, K> {
    pub rank: usize,
    pub key: &'a K,
    pub summary: &'a GroupSummary,
}

/// Field used to order individual records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrder {
    Amount,
    Fee,
    EffectiveRate,
}

impl RecordOrder {
    fn value(self, (tx, fee): &FeeRecord) -> Decimal {
        match self {
            RecordOrder::Amount => tx.amount,
            RecordOrder::Fee => fee.total_fee,
            RecordOrder::EffectiveRate => fee.effective_rate,
        }
    }
}

/// The first `n` records ordered by `by`, largest first unless `ascending`.
/// Equal values keep input order.
pub fn top_records(
    records: &[FeeRecord],
    n: usize,
    by: RecordOrder,
    ascending: bool,
) -> Vec<&FeeRecord> {
    let mut sorted: Vec<_> = records.iter().collect();
    sorted.sort_by(|a, b| {
        let ordering = by.value(a).cmp(&by.value(b));
        if ascending { ordering } else { ordering.reverse() }
    });
    sorted.truncate(n);
    sorted
}

/// Groups `records` by `group_by` and summarizes every group.
///
/// Fails with `AggregateOverflowError` when a sum leaves the decimal range.
pub fn aggregate<'a, K, I, F>(records: I, group_by: F) -> Result<AggregateResult<K>>
where
    K: Ord,
    I: IntoIterator<Item = &'a FeeRecord>,
    F: Fn(&Transaction, &FeeBreakdown) -> K,
{
    PartialAggregate::from_records(records, group_by)?.finish()
}

/// One summary over every record, or `None` when there are none.
pub fn summarize<'a, I>(records: I) -> Result<Option<GroupSummary>>
where
    I: IntoIterator<Item = &'a FeeRecord>,
{
    let mut acc = GroupAccumulator::default();
    for (tx, fee) in records {
        acc.push(tx, fee)?;
    }
    if acc.count == 0 {
        return Ok(None);
    }
    let pool = acc.total_fee;
    acc.finish(pool).map(Some)
}

/// Record filter; unset criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    currency: Option<Currency>,
    channel: Option<ChannelKind>,
    min_amount: Option<Decimal>,
    max_amount: Option<Decimal>,
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn channel(mut self, channel: ChannelKind) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Inclusive on both ends.
    pub fn amount_between(mut self, min: Decimal, max: Decimal) -> Self {
        self.min_amount = Some(min);
        self.max_amount = Some(max);
        self
    }

    /// Inclusive on both ends.
    pub fn between(mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.until = Some(until);
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.currency.is_none_or(|c| tx.currency == c)
            && self.channel.is_none_or(|k| tx.channel_kind == k)
            && self.min_amount.is_none_or(|min| tx.amount >= min)
            && self.max_amount.is_none_or(|max| tx.amount <= max)
            && self.from.is_none_or(|from| tx.timestamp >= from)
            && self.until.is_none_or(|until| tx.timestamp <= until)
    }

    pub fn apply<'a>(&'a self, records: &'a [FeeRecord]) -> impl Iterator<Item = &'a FeeRecord> {
        records.iter().filter(|(tx, _)| self.matches(tx))
    }
}

fn checked_add(left: Decimal, right: Decimal, what: &str) -> Result<Decimal> {
    left.checked_add(right)
        .ok_or_else(|| FeeError::AggregateOverflowError(what.to_string()))
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>, what: &str) -> Result<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, value| checked_add(sum, value, what))
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Result<Decimal> {
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| FeeError::AggregateOverflowError("ratio".to_string()))
}

/// Middle value, or the mean of the two middle values for even counts.
fn median(sorted: &[Decimal]) -> Decimal {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        sorted[mid - 1] + (sorted[mid] - sorted[mid - 1]) / dec!(2)
    } else {
        sorted[mid]
    }
}

fn percentile(sorted: &[Decimal], p: Decimal) -> Decimal {
    let last = sorted.len() - 1;
    let position = p * Decimal::from(last);
    let lower = position.floor();
    let index = lower.to_usize().unwrap_or(last).min(last);
    match sorted.get(index + 1) {
        Some(next) => sorted[index] + (*next - sorted[index]) * (position - lower),
        None => sorted[index],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::RateTier;
    use chrono::TimeZone;

    fn record(id: &str, amount: Decimal, fee: Decimal, kind: ChannelKind, day: u32) -> FeeRecord {
        let tx = Transaction::new(
            id,
            amount,
            Currency::USD,
            kind,
            Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap(),
        );
        let breakdown = FeeBreakdown {
            tier: RateTier::new(dec!(0), None, dec!(0)),
            base_fee: fee,
            percentage_fee: dec!(0),
            conversion_fee: dec!(0),
            adjustment: dec!(0),
            total_fee: fee,
            bound_applied: None,
            effective_rate: fee / amount,
        };
        (tx, breakdown)
    }

    #[test]
    fn test_mean_and_median_of_two_rates() {
        let records = vec![
            record("a", dec!(100), dec!(2), ChannelKind::CardNetwork, 1),
            record("b", dec!(100), dec!(3), ChannelKind::CardNetwork, 1),
        ];
        let result = aggregate(&records, |tx, fee| GroupBy::Channel.key(tx, fee)).unwrap();
        let summary = result.get(&GroupKey::Channel(ChannelKind::CardNetwork)).unwrap();

        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_amount, dec!(200));
        assert_eq!(summary.total_fee, dec!(5));
        assert_eq!(summary.mean_effective_rate, dec!(0.025));
        assert_eq!(summary.median_effective_rate, dec!(0.025));
        assert_eq!(summary.weighted_effective_rate, dec!(0.025));
        assert_eq!(summary.fee_share, dec!(1));
        assert_eq!(summary.percentiles.p50, dec!(0.025));
    }

    #[test]
    fn test_odd_median_and_percentiles() {
        let records: Vec<_> = (1..=5)
            .map(|i| {
                record(
                    &format!("t{i}"),
                    dec!(100),
                    Decimal::from(i),
                    ChannelKind::EWallet,
                    2,
                )
            })
            .collect();
        let summary = summarize(&records).unwrap().unwrap();

        assert_eq!(summary.median_effective_rate, dec!(0.03));
        assert_eq!(summary.percentiles.p10, dec!(0.014));
        assert_eq!(summary.percentiles.p25, dec!(0.02));
        assert_eq!(summary.percentiles.p75, dec!(0.04));
        assert_eq!(summary.percentiles.p99, dec!(0.0496));
        assert_eq!(summary.mean_fee, dec!(3));
    }

    #[test]
    fn test_single_record_group() {
        let records = vec![record("solo", dec!(80), dec!(2), ChannelKind::BankTransfer, 3)];
        let summary = summarize(&records).unwrap().unwrap();
        assert_eq!(summary.median_effective_rate, dec!(0.025));
        assert_eq!(summary.percentiles.p10, dec!(0.025));
        assert_eq!(summary.percentiles.p99, dec!(0.025));
    }

    #[test]
    fn test_empty_input_gives_empty_result() {
        let records: Vec<FeeRecord> = Vec::new();
        let result = aggregate(&records, |tx, fee| GroupBy::Currency.key(tx, fee)).unwrap();
        assert!(result.is_empty());
        assert!(summarize(&records).unwrap().is_none());
    }

    #[test]
    fn test_named_empty_group_is_an_error() {
        let records = vec![record("a", dec!(100), dec!(2), ChannelKind::CardNetwork, 1)];
        let result = aggregate(&records, |tx, fee| GroupBy::Channel.key(tx, fee)).unwrap();

        let err = result
            .get(&GroupKey::Channel(ChannelKind::EWallet))
            .unwrap_err();
        assert!(matches!(err, FeeError::EmptyGroupError(ref name) if name == "ewallet"));
        assert!(result.get(&GroupKey::Channel(ChannelKind::CardNetwork)).is_ok());
    }

    #[test]
    fn test_fee_share_and_ranking() {
        let records = vec![
            record("a", dec!(100), dec!(3), ChannelKind::CardNetwork, 1),
            record("b", dec!(100), dec!(1), ChannelKind::BankTransfer, 1),
        ];
        let result = aggregate(&records, |tx, fee| GroupBy::Channel.key(tx, fee)).unwrap();

        let card = result.get(&GroupKey::Channel(ChannelKind::CardNetwork)).unwrap();
        assert_eq!(card.fee_share, dec!(0.75));

        let ranked: Vec<_> = result
            .ranked_by_effective_rate()
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect();
        assert_eq!(ranked, ["bank_transfer", "card_network"]);
    }

    #[test]
    fn test_time_bucket_keys() {
        let records = vec![
            record("a", dec!(100), dec!(1), ChannelKind::CardNetwork, 6),
            record("b", dec!(100), dec!(1), ChannelKind::CardNetwork, 6),
            record("c", dec!(100), dec!(1), ChannelKind::CardNetwork, 20),
        ];

        let by_day = aggregate(&records, |tx, fee| GroupBy::Day.key(tx, fee)).unwrap();
        let days: Vec<_> = by_day.iter().map(|(k, s)| (k.to_string(), s.count)).collect();
        assert_eq!(
            days,
            [("2024-05-06".to_string(), 2), ("2024-05-20".to_string(), 1)]
        );

        let by_week = aggregate(&records, |tx, fee| GroupBy::Week.key(tx, fee)).unwrap();
        let weeks: Vec<_> = by_week.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(weeks, ["2024-W19", "2024-W21"]);

        let by_month = aggregate(&records, |tx, fee| GroupBy::Month.key(tx, fee)).unwrap();
        assert_eq!(by_month.len(), 1);
        assert!(by_month.get(&GroupKey::Month { year: 2024, month: 5 }).is_ok());
    }

    #[test]
    fn test_custom_composite_key() {
        let records = vec![
            record("a", dec!(100), dec!(1), ChannelKind::CardNetwork, 1),
            record("b", dec!(300), dec!(1), ChannelKind::CardNetwork, 1),
            record("c", dec!(100), dec!(1), ChannelKind::EWallet, 1),
        ];
        let result =
            aggregate(&records, |tx, _| (tx.channel_kind, tx.amount >= dec!(200))).unwrap();
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_merged_shards_equal_single_pass() {
        let records: Vec<_> = (1..=9)
            .map(|i| {
                let kind = if i % 2 == 0 {
                    ChannelKind::CardNetwork
                } else {
                    ChannelKind::BankTransfer
                };
                record(&format!("t{i}"), Decimal::from(i * 10), Decimal::from(i), kind, 1)
            })
            .collect();
        let key = |tx: &Transaction, fee: &FeeBreakdown| GroupBy::Channel.key(tx, fee);

        let whole = aggregate(&records, key).unwrap();
        let left = PartialAggregate::from_records(&records[..4], key).unwrap();
        let right = PartialAggregate::from_records(&records[4..], key).unwrap();

        assert_eq!(right.clone().merge(left.clone()).unwrap().finish().unwrap(), whole);
        assert_eq!(left.merge(right).unwrap().finish().unwrap(), whole);
    }

    #[test]
    fn test_record_filter() {
        let records = vec![
            record("a", dec!(50), dec!(1), ChannelKind::CardNetwork, 1),
            record("b", dec!(500), dec!(1), ChannelKind::CardNetwork, 10),
            record("c", dec!(500), dec!(1), ChannelKind::EWallet, 10),
        ];

        let filter = RecordFilter::new()
            .channel(ChannelKind::CardNetwork)
            .amount_between(dec!(100), dec!(1000));
        let ids: Vec<_> = filter.apply(&records).map(|(tx, _)| tx.id.as_str()).collect();
        assert_eq!(ids, ["b"]);

        let window = RecordFilter::new()
            .currency(Currency::USD)
            .between(
                Utc.with_ymd_and_hms(2024, 5, 5, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 5, 31, 0, 0, 0).unwrap(),
            );
        assert_eq!(window.apply(&records).count(), 2);
        assert_eq!(RecordFilter::new().apply(&records).count(), 3);
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let records = vec![
            record("a", Decimal::MAX, dec!(1), ChannelKind::EWallet, 1),
            record("b", Decimal::MAX, dec!(1), ChannelKind::EWallet, 1),
        ];

        let result = aggregate(&records, |tx, fee| GroupBy::Channel.key(tx, fee));
        assert!(matches!(result, Err(FeeError::AggregateOverflowError(_))));
        assert!(matches!(
            summarize(&records),
            Err(FeeError::AggregateOverflowError(_))
        ));

        let key = |tx: &Transaction, fee: &FeeBreakdown| GroupBy::Channel.key(tx, fee);
        let left = PartialAggregate::from_records(&records[..1], key).unwrap();
        let right = PartialAggregate::from_records(&records[1..], key).unwrap();
        assert!(matches!(
            left.merge(right),
            Err(FeeError::AggregateOverflowError(_))
        ));
    }

    #[test]
    fn test_failed_push_leaves_accumulator_unchanged() {
        let (tx, fee) = record("a", Decimal::MAX, dec!(1), ChannelKind::EWallet, 1);
        let mut acc = GroupAccumulator::default();
        acc.push(&tx, &fee).unwrap();
        let before = acc.clone();

        assert!(acc.push(&tx, &fee).is_err());
        assert_eq!(acc, before);
    }

    #[test]
    fn test_top_records() {
        let records = vec![
            record("a", dec!(100), dec!(5), ChannelKind::CardNetwork, 1),
            record("b", dec!(900), dec!(2), ChannelKind::BankTransfer, 1),
            record("c", dec!(300), dec!(5), ChannelKind::EWallet, 1),
            record("d", dec!(50), dec!(1), ChannelKind::EWallet, 1),
        ];
        let ids = |top: Vec<&FeeRecord>| top.iter().map(|(tx, _)| tx.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(top_records(&records, 2, RecordOrder::Amount, false)), ["b", "c"]);
        assert_eq!(ids(top_records(&records, 2, RecordOrder::Amount, true)), ["d", "a"]);
        // Equal fees keep input order.
        assert_eq!(ids(top_records(&records, 3, RecordOrder::Fee, false)), ["a", "c", "b"]);
        assert_eq!(ids(top_records(&records, 1, RecordOrder::EffectiveRate, false)), ["a"]);
        assert_eq!(top_records(&records, 10, RecordOrder::Fee, false).len(), 4);
        assert!(top_records(&records, 0, RecordOrder::Fee, false).is_empty());
    }

    #[test]
    fn test_ranked_by_volume() {
        let records = vec![
            record("a", dec!(100), dec!(1), ChannelKind::CardNetwork, 1),
            record("b", dec!(700), dec!(1), ChannelKind::BankTransfer, 1),
            record("c", dec!(300), dec!(1), ChannelKind::EWallet, 1),
            record("d", dec!(300), dec!(1), ChannelKind::EWallet, 1),
        ];
        let result = aggregate(&records, |tx, fee| GroupBy::Channel.key(tx, fee)).unwrap();

        let ranked: Vec<_> = result
            .ranked_by_volume()
            .into_iter()
            .map(|r| (r.rank, r.key.to_string(), r.summary.total_amount))
            .collect();
        assert_eq!(
            ranked,
            [
                (1, "bank_transfer".to_string(), dec!(700)),
                (2, "ewallet".to_string(), dec!(600)),
                (3, "card_network".to_string(), dec!(100)),
            ]
        );
    }
}
