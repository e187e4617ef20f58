mod errors;
mod monetary;

pub use errors::MonetaryError;
pub use monetary::Monetary;

pub type ClientId = uuid::Uuid;
pub type WalletId = uuid::Uuid;
pub type TokenId = uuid::Uuid;
pub type TransactionId = uuid::Uuid;
pub type SessionId = String;
