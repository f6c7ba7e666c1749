use super::channel::ChannelKind;
use super::currency::Currency;
use crate::error::{FeeError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A strictly positive monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// One payment to be priced, as emitted by the producer.
///
/// CSV columns: `id, amount, currency, channel, timestamp` with an RFC 3339
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(rename = "channel")]
    pub channel_kind: ChannelKind,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        amount: Decimal,
        currency: Currency,
        channel_kind: ChannelKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            currency,
            channel_kind,
            timestamp,
        }
    }

    /// Checks the record is priceable and returns its amount.
    pub fn checked_amount(&self) -> Result<Amount> {
        if self.id.trim().is_empty() {
            return Err(FeeError::invalid("<missing id>", "transaction id is empty"));
        }
        Amount::new(self.amount).ok_or_else(|| {
            FeeError::invalid(
                self.id.clone(),
                format!("amount must be positive, got {}", self.amount),
            )
        })
    }
}
