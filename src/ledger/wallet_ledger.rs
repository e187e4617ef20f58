use std::sync::Arc;

use serde::Serialize;
use tokio::task::yield_now;
use tracing::debug;

use crate::models::{PaymentError, Transaction, TransactionKind};
use crate::storage::{TransactionLog, WalletStore};
use crate::types::{ClientId, Monetary, SessionId, TransactionId};

const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Outcome of one committed balance movement.
#[derive(Debug, Clone, Serialize)]
pub struct MovementReceipt {
    pub previous_balance: Monetary,
    pub new_balance: Monetary,
    pub transaction_id: TransactionId
}

/// The transactional primitive shared by recharge (credit) and payment
/// confirmation (debit): mutate one wallet's balance and append the ledger
/// entry as a single visible unit.
///
/// Concurrency control is an optimistic version check: the balance used for
/// the sufficiency check is the same snapshot the compare-and-swap
/// validates, so a concurrent movement can delay a caller into a retry but
/// never into a lost update or a negative balance.
pub struct WalletLedger {
    wallets: Arc<dyn WalletStore>,
    log: Arc<dyn TransactionLog>,
    max_attempts: u32
}

impl WalletLedger {
    pub fn new(wallets: Arc<dyn WalletStore>, log: Arc<dyn TransactionLog>) -> Self {
        Self {
            wallets,
            log,
            max_attempts: DEFAULT_MAX_ATTEMPTS
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Applies one signed movement to a wallet: positive credits, negative
    /// debits. A debit below zero fails with `InsufficientFunds` before
    /// anything is written. Retries exhausted by contention surface as
    /// `ConcurrencyConflict` and the caller re-runs the whole operation.
    pub async fn apply_movement(
        &self,
        client_id: ClientId,
        amount: Monetary,
        kind: TransactionKind,
        description: String,
        session_id: Option<SessionId>
    ) -> Result<MovementReceipt, PaymentError> {
        for attempt in 1..=self.max_attempts {
            let wallet = self.wallets.load(client_id)
                .ok_or_else(|| PaymentError::wallet_not_found(client_id))?;

            let previous_balance = wallet.balance;
            let new_balance = previous_balance.checked_add(amount)
                .ok_or_else(|| PaymentError::overflow(client_id, amount))?;

            if new_balance.is_negative() {
                return Err(PaymentError::insufficient_funds(client_id, previous_balance, amount.abs()));
            }

            let mut updated = wallet;
            updated.balance = new_balance;

            if self.wallets.update(updated) {
                // The append cannot fail, so every committed balance has its
                // ledger entry; on any failure path above, neither exists.
                let transaction = Transaction::completed(client_id, kind, amount.abs(), description, session_id);
                let transaction_id = transaction.id;
                self.log.append(transaction);

                debug!("Movement [{transaction_id}]:[{kind:?}] of {amount} for client [{client_id}] committed: {previous_balance} -> {new_balance}");

                return Ok(MovementReceipt { previous_balance, new_balance, transaction_id });
            }

            debug!("Movement attempt [{attempt}] for client [{client_id}] lost the version race, retrying");
            yield_now().await;
        }

        Err(PaymentError::concurrency_conflict(client_id, self.max_attempts))
    }
}
