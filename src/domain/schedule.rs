use crate::error::{FeeError, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// A contiguous amount range `[lower_bound, upper_bound)` charged at `percentage_rate`.
///
/// `upper_bound` is `None` for the open-ended final tier. The rate is a
/// fraction: `0.015` means 1.5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateTier {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub percentage_rate: Decimal,
}

impl RateTier {
    pub fn new(lower_bound: Decimal, upper_bound: Option<Decimal>, percentage_rate: Decimal) -> Self {
        Self {
            lower_bound,
            upper_bound,
            percentage_rate,
        }
    }

    /// Inclusive lower bound, exclusive upper bound.
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.lower_bound && self.upper_bound.is_none_or(|upper| amount < upper)
    }
}

/// Validated tier table covering `[0, ∞)` without gaps or overlaps.
///
/// Construction is the only place the coverage invariant is checked, so
/// [`RateSchedule::lookup`] can rely on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSchedule {
    tiers: Vec<RateTier>,
}

impl RateSchedule {
    pub fn new(tiers: Vec<RateTier>) -> Result<Self> {
        let Some(first) = tiers.first() else {
            return Err(FeeError::ConfigError(
                "rate schedule has no tiers".to_string(),
            ));
        };
        if first.lower_bound != Decimal::ZERO {
            return Err(FeeError::ConfigError(format!(
                "first tier must start at 0, starts at {}",
                first.lower_bound
            )));
        }

        for (index, tier) in tiers.iter().enumerate() {
            if tier.percentage_rate < Decimal::ZERO {
                return Err(FeeError::ConfigError(format!(
                    "tier {index} has negative rate {}",
                    tier.percentage_rate
                )));
            }

            let next = tiers.get(index + 1);
            match (tier.upper_bound, next) {
                (None, None) => {}
                (None, Some(_)) => {
                    return Err(FeeError::ConfigError(format!(
                        "tier {index} is unbounded but is not the last tier"
                    )));
                }
                (Some(upper), None) => {
                    return Err(FeeError::ConfigError(format!(
                        "last tier must be unbounded, ends at {upper}"
                    )));
                }
                (Some(upper), Some(next)) => {
                    if upper <= tier.lower_bound {
                        return Err(FeeError::ConfigError(format!(
                            "tier {index} is empty: [{}, {upper})",
                            tier.lower_bound
                        )));
                    }
                    if next.lower_bound > upper {
                        return Err(FeeError::ConfigError(format!(
                            "gap between {upper} and {}",
                            next.lower_bound
                        )));
                    }
                    if next.lower_bound < upper {
                        return Err(FeeError::ConfigError(format!(
                            "tiers overlap between {} and {upper}",
                            next.lower_bound
                        )));
                    }
                }
            }
        }

        Ok(Self { tiers })
    }

    /// Single tier charging `rate` on every amount.
    pub fn flat(rate: Decimal) -> Result<Self> {
        Self::new(vec![RateTier::new(Decimal::ZERO, None, rate)])
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    /// Finds the tier containing `amount`; a boundary value belongs to the higher tier.
    pub fn lookup(&self, amount: Decimal) -> Result<&RateTier> {
        let index = self.tiers.partition_point(|tier| tier.lower_bound <= amount);
        index
            .checked_sub(1)
            .and_then(|i| self.tiers.get(i))
            .filter(|tier| tier.contains(amount))
            .ok_or_else(|| FeeError::ConfigError(format!("no tier covers amount {amount}")))
    }
}
