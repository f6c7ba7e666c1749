use crate::domain::transaction::Transaction;
use crate::error::{FeeError, Result};
use std::io::Read;

/// Reads transactions from a CSV source.
///
/// Expects the header `id,amount,currency,channel,timestamp`. Whitespace around
/// fields is trimmed and short or long rows surface as per-row errors.
pub struct TransactionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransactionReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes rows. A bad row yields an error and the stream continues.
    pub fn transactions(self) -> impl Iterator<Item = Result<Transaction>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(FeeError::from))
    }
}
