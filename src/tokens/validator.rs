use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::models::{Client, PaymentError, TokenStatus};
use crate::storage::{ClientDirectory, TokenStore};
use crate::types::{ClientId, Monetary, TokenId};

/// The authoritative redemption data of a validated token. The amount comes
/// from the stored token, never from the caller.
#[derive(Debug, Clone)]
pub struct TokenValidation {
    pub token_id: TokenId,
    pub client_id: ClientId,
    pub amount: Monetary,
    pub client: Client
}

/// Checks presented {token, session} pairs, persisting lazy expiry as a
/// side effect of the lookup.
pub struct TokenValidator {
    directory: Arc<ClientDirectory>,
    tokens: Arc<dyn TokenStore>
}

impl TokenValidator {
    pub fn new(directory: Arc<ClientDirectory>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { directory, tokens }
    }

    /// Wrong value, wrong session, already used and already expired all
    /// report the same `TokenNotFound`; a caller probing the error channel
    /// learns nothing about which tokens exist.
    pub async fn validate(&self, token: &str, session_id: &str) -> Result<TokenValidation, PaymentError> {
        let record = self.tokens.find_active(token, session_id)
            .ok_or(PaymentError::TokenNotFound)?;

        if record.is_expired(Utc::now()) {
            // Lazy expiry: the terminal state is persisted as part of
            // reporting it. Repeating this on a retried lookup is harmless.
            self.tokens.transition(record.id, TokenStatus::Active, TokenStatus::Expired);
            warn!("Token [{}] for session [{session_id}] presented after expiry [{}]", record.id, record.expires_at);
            return Err(PaymentError::token_expired(record.id, record.expires_at));
        }

        let client = self.directory.lookup(record.client_id).await?;

        Ok(TokenValidation {
            token_id: record.id,
            client_id: record.client_id,
            amount: record.amount,
            client
        })
    }
}
