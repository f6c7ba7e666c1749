use crate::domain::channel::{
    Channel, ChannelKind, ChannelRegistry, ChannelVariant, FeePolicy, VolumeDiscount,
};
use crate::domain::currency::Currency;
use crate::domain::ports::ScheduleSource;
use crate::domain::schedule::{RateSchedule, RateTier};
use crate::error::{FeeError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Schedule shipped with the binary, used when no file is given.
pub const BUILTIN_SCHEDULE: &str = include_str!("../../config/channels.toml");

/// Networks a card channel routes when the file names none.
const DEFAULT_CARD_NETWORKS: [&str; 3] = ["visa", "mastercard", "unionpay"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScheduleFile {
    channels: BTreeMap<ChannelKind, ChannelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChannelEntry {
    name: String,
    #[serde(default)]
    fixed_fee: Decimal,
    floor: Option<Decimal>,
    cap: Option<Decimal>,
    #[serde(default)]
    conversion_spread: Decimal,
    settlement_currency: Currency,
    supported_currencies: Vec<Currency>,
    tiers: Vec<TierEntry>,
    // card_network
    networks: Option<Vec<String>>,
    // bank_transfer
    processing_days: Option<u8>,
    volume_discount: Option<DiscountEntry>,
    // ewallet
    instant_transfer: Option<bool>,
    cashback_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TierEntry {
    lower_bound: Decimal,
    upper_bound: Option<Decimal>,
    rate: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DiscountEntry {
    threshold: Decimal,
    rate: Decimal,
}

impl ChannelEntry {
    fn into_channel(self, kind: ChannelKind) -> Result<Channel> {
        let variant = self.variant(kind)?;
        let tiers = self
            .tiers
            .into_iter()
            .map(|t| RateTier::new(t.lower_bound, t.upper_bound, t.rate))
            .collect();
        let schedule = RateSchedule::new(tiers).map_err(|e| match e {
            FeeError::ConfigError(msg) => {
                FeeError::ConfigError(format!("channel `{}`: {msg}", self.name))
            }
            other => other,
        })?;

        let mut policy = FeePolicy::new(schedule, self.settlement_currency)
            .with_fixed_fee(self.fixed_fee)
            .with_conversion_spread(self.conversion_spread)
            .with_supported_currencies(self.supported_currencies);
        policy.floor = self.floor;
        policy.cap = self.cap;

        Channel::new(self.name, policy, variant)
    }

    fn variant(&self, kind: ChannelKind) -> Result<ChannelVariant> {
        let foreign = match kind {
            ChannelKind::CardNetwork => vec![
                ("processing_days", self.processing_days.is_some()),
                ("volume_discount", self.volume_discount.is_some()),
                ("instant_transfer", self.instant_transfer.is_some()),
                ("cashback_rate", self.cashback_rate.is_some()),
            ],
            ChannelKind::BankTransfer => vec![
                ("networks", self.networks.is_some()),
                ("instant_transfer", self.instant_transfer.is_some()),
                ("cashback_rate", self.cashback_rate.is_some()),
            ],
            ChannelKind::EWallet => vec![
                ("networks", self.networks.is_some()),
                ("processing_days", self.processing_days.is_some()),
                ("volume_discount", self.volume_discount.is_some()),
            ],
        };
        if let Some((field, _)) = foreign.iter().find(|(_, set)| *set) {
            return Err(FeeError::ConfigError(format!(
                "channel `{}`: `{field}` does not apply to {kind} channels",
                self.name
            )));
        }

        Ok(match kind {
            ChannelKind::CardNetwork => ChannelVariant::CardNetwork {
                networks: self.networks.clone().unwrap_or_else(|| {
                    DEFAULT_CARD_NETWORKS.iter().map(|n| n.to_string()).collect()
                }),
            },
            ChannelKind::BankTransfer => ChannelVariant::BankTransfer {
                processing_days: self.processing_days.unwrap_or(3),
                volume_discount: self.volume_discount.as_ref().map(|d| VolumeDiscount {
                    threshold: d.threshold,
                    rate: d.rate,
                }),
            },
            ChannelKind::EWallet => ChannelVariant::EWallet {
                instant_transfer: self.instant_transfer.unwrap_or(true),
                cashback_rate: self.cashback_rate.unwrap_or_default(),
            },
        })
    }
}

/// Parses and validates a TOML channel schedule.
pub fn parse_schedule(source: &str) -> Result<ChannelRegistry> {
    let file: ScheduleFile = toml::from_str(source)?;
    let channels = file
        .channels
        .into_iter()
        .map(|(kind, entry)| entry.into_channel(kind))
        .collect::<Result<Vec<_>>>()?;
    ChannelRegistry::new(channels)
}

/// Reads the schedule from a TOML file.
pub struct TomlScheduleFile {
    path: PathBuf,
}

impl TomlScheduleFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ScheduleSource for TomlScheduleFile {
    fn load(&self) -> Result<ChannelRegistry> {
        let source = std::fs::read_to_string(&self.path)?;
        let registry = parse_schedule(&source)?;
        info!(path = %self.path.display(), channels = registry.len(), "loaded channel schedule");
        Ok(registry)
    }
}

/// The schedule compiled into the binary.
#[derive(Default)]
pub struct BuiltinSchedule;

impl ScheduleSource for BuiltinSchedule {
    fn load(&self) -> Result<ChannelRegistry> {
        let registry = parse_schedule(BUILTIN_SCHEDULE)?;
        info!(channels = registry.len(), "loaded built-in channel schedule");
        Ok(registry)
    }
}
