use crate::types::{ClientId, Monetary, WalletId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single balance record owned by a client.
///
/// Wallets are mutated only through the ledger; the core never creates one
/// beyond its initial zero-balance registration and never destroys one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub client_id: ClientId,
    /// Invariant: never negative. Enforced at the point of every debit.
    pub balance: Monetary,
    /// Optimistic-concurrency counter, bumped by the store on every
    /// committed update. A stale version loses the compare-and-swap.
    pub version: u64
}

impl Wallet {
    /// Creates the zero-balance wallet registered alongside a client.
    pub fn new(client_id: ClientId) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            balance: Monetary::ZERO,
            version: 0
        }
    }
}
