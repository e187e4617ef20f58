use crate::types::{ClientId, Monetary, SessionId, TokenId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Domain failures of the payment core.
///
/// All of these are expected, recoverable-by-caller conditions returned as
/// typed results; none indicate a crash. Storage is assumed reliable, so
/// there is no transport/infrastructure variant here.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Client [{client_id}] was not found")]
    ClientNotFound {
        client_id: ClientId
    },
    #[error("Wallet for client [{client_id}] was not found")]
    WalletNotFound {
        client_id: ClientId
    },
    #[error("Insufficient funds for client [{client_id}]: balance {balance}, requested {requested}")]
    InsufficientFunds {
        client_id: ClientId,
        balance: Monetary,
        requested: Monetary
    },
    #[error("An active token already exists for session [{session_id}]")]
    DuplicateActiveToken {
        session_id: SessionId
    },
    #[error("No active token matches the presented credentials")]
    TokenNotFound,
    #[error("Token [{token_id}] expired at [{expires_at}]")]
    TokenExpired {
        token_id: TokenId,
        expires_at: DateTime<Utc>
    },
    #[error("Token [{token_id}] was already consumed")]
    TokenAlreadyUsed {
        token_id: TokenId
    },
    #[error("Amount [{amount}] must be positive")]
    NonPositiveAmount {
        amount: Monetary
    },
    #[error("Wallet update for client [{client_id}] conflicted after [{attempts}] attempts")]
    ConcurrencyConflict {
        client_id: ClientId,
        attempts: u32
    },
    #[error("Balance overflow applying [{amount}] for client [{client_id}]")]
    Overflow {
        client_id: ClientId,
        amount: Monetary
    }
}

impl PaymentError {
    pub fn client_not_found(client_id: ClientId) -> Self {
        Self::ClientNotFound { client_id }
    }

    pub fn wallet_not_found(client_id: ClientId) -> Self {
        Self::WalletNotFound { client_id }
    }

    pub fn insufficient_funds(client_id: ClientId, balance: Monetary, requested: Monetary) -> Self {
        Self::InsufficientFunds { client_id, balance, requested }
    }

    pub fn duplicate_active_token(session_id: SessionId) -> Self {
        Self::DuplicateActiveToken { session_id }
    }

    pub fn token_expired(token_id: TokenId, expires_at: DateTime<Utc>) -> Self {
        Self::TokenExpired { token_id, expires_at }
    }

    pub fn token_already_used(token_id: TokenId) -> Self {
        Self::TokenAlreadyUsed { token_id }
    }

    pub fn non_positive_amount(amount: Monetary) -> Self {
        Self::NonPositiveAmount { amount }
    }

    pub fn concurrency_conflict(client_id: ClientId, attempts: u32) -> Self {
        Self::ConcurrencyConflict { client_id, attempts }
    }

    pub fn overflow(client_id: ClientId, amount: Monetary) -> Self {
        Self::Overflow { client_id, amount }
    }

    /// Collapses `TokenAlreadyUsed` into `TokenNotFound` for outward
    /// reporting. A replayed confirm must stay distinguishable internally,
    /// but callers get the same answer for used, expired-and-swept, and
    /// plain wrong tokens so the error channel cannot be used as an oracle.
    pub fn redact(self) -> Self {
        match self {
            Self::TokenAlreadyUsed { .. } => Self::TokenNotFound,
            other => other
        }
    }
}
