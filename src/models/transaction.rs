use crate::types::{ClientId, Monetary, SessionId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Recharge,
    Payment
}

/// The core only ever appends `Completed` rows; `Pending` and `Failed` are
/// reserved for partial-failure reporting by outer layers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed
}

/// One immutable ledger entry for a completed money movement.
///
/// Created exactly once per successful balance mutation, never updated or
/// deleted afterwards. `session_id` links a `Payment` entry back to the
/// token flow that caused it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub client_id: ClientId,
    pub kind: TransactionKind,
    /// The unsigned size of the movement, always positive.
    pub amount: Monetary,
    pub status: TransactionStatus,
    pub description: String,
    pub session_id: Option<SessionId>,
    pub created_at: DateTime<Utc>
}

impl Transaction {
    pub fn completed(client_id: ClientId, kind: TransactionKind, amount: Monetary, description: String, session_id: Option<SessionId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            kind,
            amount,
            status: TransactionStatus::Completed,
            description,
            session_id,
            created_at: Utc::now()
        }
    }
}
