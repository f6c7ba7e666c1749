use super::currency::Currency;
use super::fee::FeeBound;
use super::schedule::{RateSchedule, RateTier};
use crate::error::{FeeError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Tag selecting which channel prices a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    CardNetwork,
    BankTransfer,
    #[serde(rename = "ewallet", alias = "e_wallet")]
    EWallet,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 3] = [
        ChannelKind::CardNetwork,
        ChannelKind::BankTransfer,
        ChannelKind::EWallet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::CardNetwork => "card_network",
            ChannelKind::BankTransfer => "bank_transfer",
            ChannelKind::EWallet => "ewallet",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card_network" => Ok(ChannelKind::CardNetwork),
            "bank_transfer" => Ok(ChannelKind::BankTransfer),
            "ewallet" | "e_wallet" => Ok(ChannelKind::EWallet),
            other => Err(format!("unknown channel kind `{other}`")),
        }
    }
}

/// Fee policy fields shared by every channel kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeePolicy {
    pub fixed_fee: Decimal,
    pub schedule: RateSchedule,
    pub floor: Option<Decimal>,
    pub cap: Option<Decimal>,
    pub conversion_spread: Decimal,
    pub settlement_currency: Currency,
    pub supported_currencies: BTreeSet<Currency>,
}

impl FeePolicy {
    /// A policy with no fixed fee, no bounds and no spread, accepting only
    /// its settlement currency.
    pub fn new(schedule: RateSchedule, settlement_currency: Currency) -> Self {
        Self {
            fixed_fee: Decimal::ZERO,
            schedule,
            floor: None,
            cap: None,
            conversion_spread: Decimal::ZERO,
            settlement_currency,
            supported_currencies: BTreeSet::from([settlement_currency]),
        }
    }

    pub fn with_fixed_fee(mut self, fixed_fee: Decimal) -> Self {
        self.fixed_fee = fixed_fee;
        self
    }

    pub fn with_floor(mut self, floor: Decimal) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn with_cap(mut self, cap: Decimal) -> Self {
        self.cap = Some(cap);
        self
    }

    pub fn with_conversion_spread(mut self, spread: Decimal) -> Self {
        self.conversion_spread = spread;
        self
    }

    pub fn with_supported_currencies(mut self, currencies: impl IntoIterator<Item = Currency>) -> Self {
        self.supported_currencies = currencies.into_iter().collect();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.fixed_fee < Decimal::ZERO {
            return Err(FeeError::ConfigError(format!(
                "fixed fee must be >= 0, got {}",
                self.fixed_fee
            )));
        }
        for (label, bound) in [("floor", self.floor), ("cap", self.cap)] {
            if let Some(value) = bound
                && value < Decimal::ZERO
            {
                return Err(FeeError::ConfigError(format!(
                    "{label} must be >= 0, got {value}"
                )));
            }
        }
        if let (Some(floor), Some(cap)) = (self.floor, self.cap)
            && cap < floor
        {
            return Err(FeeError::ConfigError(format!(
                "cap {cap} is below floor {floor}"
            )));
        }
        if self.conversion_spread < Decimal::ZERO {
            return Err(FeeError::ConfigError(format!(
                "conversion spread must be >= 0, got {}",
                self.conversion_spread
            )));
        }
        if self.supported_currencies.is_empty() {
            return Err(FeeError::ConfigError(
                "channel supports no currencies".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamps `fee` into `[floor, cap]`; an unset bound imposes nothing on its side.
    pub fn clamp(&self, fee: Decimal) -> (Decimal, Option<FeeBound>) {
        if let Some(floor) = self.floor
            && fee < floor
        {
            return (floor, Some(FeeBound::Floor));
        }
        if let Some(cap) = self.cap
            && fee > cap
        {
            return (cap, Some(FeeBound::Cap));
        }
        (fee, None)
    }
}

/// Bank discount applied to the pre-clamp fee of large transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDiscount {
    /// Discount applies to amounts strictly above this.
    pub threshold: Decimal,
    pub rate: Decimal,
}

/// How soon a payment reaches the beneficiary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSpeed {
    Instant,
    /// Settled within one to two hours.
    Hours,
    BusinessDays(u8),
}

impl fmt::Display for TransferSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferSpeed::Instant => f.write_str("instant"),
            TransferSpeed::Hours => f.write_str("within 1-2 hours"),
            TransferSpeed::BusinessDays(1) => f.write_str("1 business day"),
            TransferSpeed::BusinessDays(days) => write!(f, "{days} business days"),
        }
    }
}

/// Kind-specific policy carried by a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelVariant {
    CardNetwork {
        networks: Vec<String>,
    },
    BankTransfer {
        processing_days: u8,
        volume_discount: Option<VolumeDiscount>,
    },
    EWallet {
        instant_transfer: bool,
        cashback_rate: Decimal,
    },
}

impl ChannelVariant {
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelVariant::CardNetwork { .. } => ChannelKind::CardNetwork,
            ChannelVariant::BankTransfer { .. } => ChannelKind::BankTransfer,
            ChannelVariant::EWallet { .. } => ChannelKind::EWallet,
        }
    }

    /// Arrival estimate; card payments carry none.
    pub fn transfer_speed(&self) -> Option<TransferSpeed> {
        match self {
            ChannelVariant::CardNetwork { .. } => None,
            ChannelVariant::BankTransfer {
                processing_days, ..
            } => Some(TransferSpeed::BusinessDays(*processing_days)),
            ChannelVariant::EWallet {
                instant_transfer: true,
                ..
            } => Some(TransferSpeed::Instant),
            ChannelVariant::EWallet { .. } => Some(TransferSpeed::Hours),
        }
    }

    /// Card networks accepted by a card channel; empty for other kinds.
    pub fn networks(&self) -> &[String] {
        match self {
            ChannelVariant::CardNetwork { networks } => networks,
            _ => &[],
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            ChannelVariant::CardNetwork { networks } => {
                if networks.iter().any(|n| n.trim().is_empty()) {
                    return Err(FeeError::ConfigError(
                        "card network names must not be blank".to_string(),
                    ));
                }
                Ok(())
            }
            ChannelVariant::BankTransfer {
                volume_discount: Some(discount),
                ..
            } => {
                if discount.threshold < Decimal::ZERO {
                    return Err(FeeError::ConfigError(format!(
                        "volume discount threshold must be >= 0, got {}",
                        discount.threshold
                    )));
                }
                ensure_fraction("volume discount rate", discount.rate)
            }
            ChannelVariant::BankTransfer { .. } => Ok(()),
            ChannelVariant::EWallet { cashback_rate, .. } => {
                ensure_fraction("cashback rate", *cashback_rate)
            }
        }
    }

    /// Amount added to the pre-clamp fee; never positive and never larger
    /// in magnitude than `raw_total`.
    pub fn adjustment(&self, amount: Decimal, raw_total: Decimal) -> Option<Decimal> {
        let reduction = match self {
            ChannelVariant::CardNetwork { .. } => Decimal::ZERO,
            ChannelVariant::BankTransfer {
                volume_discount: Some(discount),
                ..
            } if amount > discount.threshold => raw_total.checked_mul(discount.rate)?,
            ChannelVariant::BankTransfer { .. } => Decimal::ZERO,
            ChannelVariant::EWallet { cashback_rate, .. } => {
                amount.checked_mul(*cashback_rate)?.min(raw_total)
            }
        };
        Some(if reduction.is_zero() {
            Decimal::ZERO
        } else {
            -reduction
        })
    }
}

fn ensure_fraction(label: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(FeeError::ConfigError(format!(
            "{label} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// One configured payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    name: String,
    policy: FeePolicy,
    variant: ChannelVariant,
}

impl Channel {
    /// Validates the policy and variant; a channel that exists is always usable.
    pub fn new(name: impl Into<String>, policy: FeePolicy, variant: ChannelVariant) -> Result<Self> {
        let name = name.into();
        policy
            .validate()
            .and_then(|()| variant.validate())
            .map_err(|e| match e {
                FeeError::ConfigError(msg) => {
                    FeeError::ConfigError(format!("channel `{name}`: {msg}"))
                }
                other => other,
            })?;
        Ok(Self {
            name,
            policy,
            variant,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ChannelKind {
        self.variant.kind()
    }

    pub fn policy(&self) -> &FeePolicy {
        &self.policy
    }

    pub fn variant(&self) -> &ChannelVariant {
        &self.variant
    }

    /// Whether a card channel routes `network`, ignoring case.
    pub fn accepts_network(&self, network: &str) -> bool {
        self.variant
            .networks()
            .iter()
            .any(|n| n.eq_ignore_ascii_case(network.trim()))
    }

    pub fn supports(&self, currency: Currency) -> bool {
        self.policy.supported_currencies.contains(&currency)
    }

    pub fn lookup_tier(&self, amount: Decimal) -> Result<&RateTier> {
        self.policy.schedule.lookup(amount)
    }
}

/// The per-run channel configuration, keyed by kind. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRegistry {
    channels: BTreeMap<ChannelKind, Channel>,
}

impl ChannelRegistry {
    pub fn new(channels: impl IntoIterator<Item = Channel>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for channel in channels {
            let kind = channel.kind();
            if map.insert(kind, channel).is_some() {
                return Err(FeeError::ConfigError(format!(
                    "channel kind {kind} is configured twice"
                )));
            }
        }
        if map.is_empty() {
            return Err(FeeError::ConfigError("no channels configured".to_string()));
        }
        Ok(Self { channels: map })
    }

    pub fn get(&self, kind: ChannelKind) -> Option<&Channel> {
        self.channels.get(&kind)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
