mod client;
mod errors;
mod token;
mod transaction;
mod wallet;

pub use client::Client;
pub use errors::PaymentError;
pub use token::{PaymentToken, TokenStatus};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
pub use wallet::Wallet;
