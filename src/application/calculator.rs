use crate::domain::channel::Channel;
use crate::domain::currency::Currency;
use crate::domain::fee::FeeBreakdown;
use crate::domain::schedule::RateTier;
use crate::domain::transaction::{Amount, Transaction};
use crate::error::{FeeError, Result};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on `effective_rate`.
pub const EFFECTIVE_RATE_DP: u32 = 4;

/// Resolves the tier of `channel` containing `amount`.
pub fn lookup_tier(channel: &Channel, amount: Decimal) -> Result<&RateTier> {
    channel.lookup_tier(amount)
}

/// Prices one transaction on one channel.
///
/// Pure: the same inputs always give the same breakdown. The effective rate
/// is the only rounded value.
pub fn compute(transaction: &Transaction, channel: &Channel) -> Result<FeeBreakdown> {
    let amount = transaction.checked_amount()?;
    price(channel, amount, transaction.currency)
}

/// Prices an already validated amount in `currency` on `channel`.
pub fn price(channel: &Channel, amount: Amount, currency: Currency) -> Result<FeeBreakdown> {
    if !channel.supports(currency) {
        return Err(FeeError::UnsupportedCurrencyError {
            currency,
            channel: channel.kind(),
        });
    }

    let value = amount.value();
    let overflow = || FeeError::AmountOutOfRangeError(value);
    let policy = channel.policy();
    let tier = *lookup_tier(channel, value)?;

    let percentage_fee = value
        .checked_mul(tier.percentage_rate)
        .ok_or_else(overflow)?;
    let conversion_fee = if currency != policy.settlement_currency {
        value
            .checked_mul(policy.conversion_spread)
            .ok_or_else(overflow)?
    } else {
        Decimal::ZERO
    };
    let raw_total = policy
        .fixed_fee
        .checked_add(percentage_fee)
        .and_then(|sum| sum.checked_add(conversion_fee))
        .ok_or_else(overflow)?;
    let adjustment = channel
        .variant()
        .adjustment(value, raw_total)
        .ok_or_else(overflow)?;

    let (total_fee, bound_applied) = policy.clamp(raw_total + adjustment);
    let effective_rate = total_fee
        .checked_div(value)
        .ok_or_else(overflow)?
        .round_dp_with_strategy(EFFECTIVE_RATE_DP, RoundingStrategy::MidpointNearestEven);

    Ok(FeeBreakdown {
        tier,
        base_fee: policy.fixed_fee,
        percentage_fee,
        conversion_fee,
        adjustment,
        total_fee,
        bound_applied,
        effective_rate,
    })
}
