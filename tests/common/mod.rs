use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::Error;
use std::path::Path;

const CHANNELS: [&str; 3] = ["card_network", "bank_transfer", "ewallet"];
const CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "JPY", "HKD"];

/// Writes `rows` random but valid transactions priceable by the built-in schedule.
pub fn generate_csv(path: &Path, rows: usize, seed: u64) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    let mut rng = StdRng::seed_from_u64(seed);

    wtr.write_record(["id", "amount", "currency", "channel", "timestamp"])?;

    for i in 1..=rows {
        let cents: u64 = rng.gen_range(1..10_000_000);
        let amount = format!("{}.{:02}", cents / 100, cents % 100);
        let channel = CHANNELS[rng.gen_range(0..CHANNELS.len())];
        let currency = CURRENCIES[rng.gen_range(0..CURRENCIES.len())];
        let day: u32 = rng.gen_range(1..=28);
        let month: u32 = rng.gen_range(1..=12);
        let timestamp = format!("2024-{month:02}-{day:02}T12:00:00Z");
        wtr.write_record([
            format!("tx-{i}").as_str(),
            amount.as_str(),
            currency,
            channel,
            timestamp.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
