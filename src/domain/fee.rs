use super::schedule::RateTier;
use rust_decimal::Decimal;
use serde::Serialize;

/// Which configured bound replaced the computed fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeBound {
    Floor,
    Cap,
}

/// Per-transaction fee result. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    /// The tier the amount resolved to.
    pub tier: RateTier,
    /// Fixed component of the channel policy.
    pub base_fee: Decimal,
    pub percentage_fee: Decimal,
    /// Zero when the transaction is already in the settlement currency.
    pub conversion_fee: Decimal,
    /// Channel-specific discount or cashback, zero or negative.
    pub adjustment: Decimal,
    pub total_fee: Decimal,
    pub bound_applied: Option<FeeBound>,
    /// `total_fee / amount`, 4 decimal places, half-to-even.
    pub effective_rate: Decimal,
}

impl FeeBreakdown {
    /// Fee before the floor/cap was applied.
    pub fn unclamped_fee(&self) -> Decimal {
        self.base_fee + self.percentage_fee + self.conversion_fee + self.adjustment
    }
}
