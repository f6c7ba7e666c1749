//! Domain model: currencies, transactions, channels and their rate schedules.
//!
//! Everything here is plain data validated at construction time. Fee
//! arithmetic lives in the application layer.

pub mod channel;
pub mod currency;
pub mod fee;
pub mod ports;
pub mod schedule;
pub mod transaction;
