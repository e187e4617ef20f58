use crate::types::{ClientId, Monetary, SessionId, TokenId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a payment token.
///
/// `Consuming` is the internal claim state a confirm holds between debiting
/// the wallet and marking the token `Used`; it guarantees exactly-once debit
/// when the two steps race or fail in between. `Used` and `Expired` are
/// terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStatus {
    Active,
    Consuming,
    Used,
    Expired
}

/// A single-use payment authorization bound to {client, amount, session}.
///
/// The token value is six numeric digits and is only meaningful together
/// with its session id; {token, session_id} is the redemption key, so value
/// collisions across sessions are harmless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentToken {
    pub id: TokenId,
    pub client_id: ClientId,
    pub token: String,
    /// Fixed at issuance and authoritative at redemption; the caller never
    /// supplies an amount to confirm.
    pub amount: Monetary,
    pub status: TokenStatus,
    pub expires_at: DateTime<Utc>,
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>
}

impl PaymentToken {
    pub fn issue(client_id: ClientId, token: String, amount: Monetary, session_id: SessionId, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            token,
            amount,
            status: TokenStatus::Active,
            expires_at,
            session_id,
            created_at: Utc::now()
        }
    }

    /// Whether the token still occupies its session slot. A `Consuming`
    /// token counts as live so a compensated confirm can never leave two
    /// redeemable tokens on one session.
    pub fn is_live(&self) -> bool {
        matches!(self.status, TokenStatus::Active | TokenStatus::Consuming)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
