mod directory;
mod memory;
#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};

use crate::models::{Client, PaymentToken, TokenStatus, Transaction, TransactionKind, Wallet};
use crate::types::{ClientId, TokenId};

pub use directory::ClientDirectory;
pub use memory::{MemoryClientStore, MemoryTokenStore, MemoryTransactionLog, MemoryWalletStore};

/// Read side of the client registry. Clients are immutable to the core, so
/// a `load` result may be cached indefinitely.
pub trait ClientStore: Send + Sync + 'static {
    fn load(&self, client_id: ClientId) -> Option<Client>;
    fn save(&self, client: Client);
}

pub trait WalletStore: Send + Sync + 'static {
    fn load(&self, client_id: ClientId) -> Option<Wallet>;
    fn save(&self, wallet: Wallet);
    /// Commits the wallet only if its stored version still matches the one
    /// carried by `wallet`, bumping the version on success. Returns false
    /// on a lost race; the caller re-reads and retries.
    fn update(&self, wallet: Wallet) -> bool;
}

pub trait TokenStore: Send + Sync + 'static {
    fn load(&self, token_id: TokenId) -> Option<PaymentToken>;
    /// Atomic check-then-create: fails without persisting anything when the
    /// token's session already holds a live token.
    fn insert_unique(&self, token: PaymentToken) -> bool;
    /// Looks up the ACTIVE token matching both value and session. Used,
    /// expired, consuming and unknown tokens are all a miss.
    fn find_active(&self, token: &str, session_id: &str) -> Option<PaymentToken>;
    /// Guarded state transition: applies `to` only while the token is still
    /// in `from`. This is the serialization point for exactly-once
    /// redemption.
    fn transition(&self, token_id: TokenId, from: TokenStatus, to: TokenStatus) -> bool;
    /// Maintenance sweep: bulk-transitions ACTIVE tokens past their expiry
    /// to EXPIRED, returning how many were moved.
    fn sweep_expired(&self, now: DateTime<Utc>) -> usize;
}

pub trait TransactionLog: Send + Sync + 'static {
    /// Appends one completed movement. Entries are immutable once written.
    fn append(&self, transaction: Transaction);
    /// Newest-first page of a client's movements, optionally filtered by
    /// kind. Returns the rows plus the filtered total count.
    fn page(&self, client_id: ClientId, offset: usize, limit: usize, kind: Option<TransactionKind>) -> (Vec<Transaction>, usize);
}
