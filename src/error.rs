use crate::domain::channel::ChannelKind;
use crate::domain::currency::Currency;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum FeeError {
    /// Malformed rate schedule or channel configuration. Fatal for the run.
    #[error("Invalid channel configuration: {0}")]
    #[diagnostic(
        code(crossfee::config),
        help("fix the channel schedule before processing any transaction")
    )]
    ConfigError(String),
    #[error("Invalid transaction {id}: {reason}")]
    #[diagnostic(code(crossfee::transaction))]
    InvalidTransactionError { id: String, reason: String },
    #[error("Currency {currency} is not supported by channel {channel}")]
    #[diagnostic(code(crossfee::currency))]
    UnsupportedCurrencyError {
        currency: Currency,
        channel: ChannelKind,
    },
    #[error("Amount {0} is out of range for fee arithmetic")]
    #[diagnostic(code(crossfee::overflow))]
    AmountOutOfRangeError(rust_decimal::Decimal),
    #[error("Summary {0} exceeds the decimal range")]
    #[diagnostic(
        code(crossfee::overflow),
        help("split the input into smaller batches")
    )]
    AggregateOverflowError(String),
    #[error("Group {0} has no members")]
    #[diagnostic(code(crossfee::empty_group))]
    EmptyGroupError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Schedule parse error: {0}")]
    #[diagnostic(code(crossfee::config))]
    ParseError(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Worker task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

impl FeeError {
    pub fn invalid(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTransactionError {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error only concerns one record and the batch may continue.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransactionError { .. }
                | Self::UnsupportedCurrencyError { .. }
                | Self::AmountOutOfRangeError(_)
                | Self::CsvError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FeeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_level_classification() {
        assert!(FeeError::invalid("tx-1", "amount must be positive").is_record_level());
        assert!(
            FeeError::UnsupportedCurrencyError {
                currency: Currency::PHP,
                channel: ChannelKind::BankTransfer,
            }
            .is_record_level()
        );
        assert!(!FeeError::ConfigError("gap".to_string()).is_record_level());
        assert!(!FeeError::EmptyGroupError("USD".to_string()).is_record_level());
        assert!(!FeeError::AggregateOverflowError("total fee".to_string()).is_record_level());
    }

    #[test]
    fn test_error_messages() {
        let err = FeeError::UnsupportedCurrencyError {
            currency: Currency::PHP,
            channel: ChannelKind::BankTransfer,
        };
        assert_eq!(
            err.to_string(),
            "Currency PHP is not supported by channel bank_transfer"
        );
        assert_eq!(
            FeeError::invalid("tx-9", "duplicate id").to_string(),
            "Invalid transaction tx-9: duplicate id"
        );
    }
}
