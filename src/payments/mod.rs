//! Payment records and billing periods

mod data;
pub mod loader;

pub use data::{parse_date, PaymentMethod, PaymentRecord, Period, MONTH_NAMES};
pub use loader::{load_payments, load_payments_from_reader, load_payments_in};
