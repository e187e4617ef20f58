use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::models::{Client, PaymentError, PaymentToken};
use crate::storage::{ClientDirectory, TokenStore, WalletStore};
use crate::types::{ClientId, Monetary, SessionId, TokenId};

/// A freshly issued token together with everything the caller needs to hand
/// {token, amount, client} to its out-of-band delivery collaborator.
/// Delivery failures are the collaborator's problem and never roll back the
/// issued token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token_id: TokenId,
    pub token: String,
    pub amount: Monetary,
    pub expires_at: DateTime<Utc>,
    pub session_id: SessionId,
    pub client: Client
}

/// Issues single-use payment tokens bound to {client, amount, session}.
pub struct TokenIssuer {
    directory: Arc<ClientDirectory>,
    wallets: Arc<dyn WalletStore>,
    tokens: Arc<dyn TokenStore>,
    ttl: Duration
}

impl TokenIssuer {
    pub fn new(directory: Arc<ClientDirectory>, wallets: Arc<dyn WalletStore>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            directory,
            wallets,
            tokens,
            ttl: Duration::minutes(5)
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Checks the client exists and the wallet covers `amount`, then
    /// persists a new ACTIVE token for the session.
    ///
    /// Funds are only checked here, never reserved: the balance can change
    /// before confirmation, and the debit re-validates sufficiency on its
    /// own snapshot. Several live tokens may therefore jointly exceed the
    /// balance; confirmation order decides which of them can still be paid.
    pub async fn issue(&self, client_id: ClientId, amount: Monetary, session_id: SessionId) -> Result<IssuedToken, PaymentError> {
        if !amount.is_positive() {
            return Err(PaymentError::non_positive_amount(amount));
        }

        let client = self.directory.lookup(client_id).await?;

        let wallet = self.wallets.load(client_id)
            .ok_or_else(|| PaymentError::wallet_not_found(client_id))?;

        if wallet.balance < amount {
            return Err(PaymentError::insufficient_funds(client_id, wallet.balance, amount));
        }

        let expires_at = Utc::now() + self.ttl;
        let token = PaymentToken::issue(client_id, generate_token_value(), amount, session_id.clone(), expires_at);
        let token_id = token.id;
        let token_value = token.token.clone();

        // The store makes the session-uniqueness check and the insert one
        // atomic step, so two racing issues for a session cannot both win.
        if !self.tokens.insert_unique(token) {
            return Err(PaymentError::duplicate_active_token(session_id));
        }

        debug!("Token [{token_id}] of {amount} issued for client [{client_id}] on session [{session_id}], expires at [{expires_at}]");

        Ok(IssuedToken {
            token_id,
            token: token_value,
            amount,
            expires_at,
            session_id,
            client
        })
    }
}

/// Six numeric digits. Value uniqueness across the store is not required;
/// {token, session_id} is the redemption key, which also stops guessing a
/// token issued for another session.
fn generate_token_value() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}
