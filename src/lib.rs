//! Payment-token and wallet-ledger core for a digital wallet.
//!
//! Clients hold a balance, recharge it, and pay by requesting a one-time
//! six-digit token that is delivered out-of-band and redeemed to debit the
//! wallet. The crate owns the parts with real invariants: money is neither
//! created nor destroyed outside the ledger, a token debits at most once,
//! balances never go negative, and concurrent movements against one wallet
//! serialize. Everything around it (HTTP surface, delivery, profile CRUD)
//! belongs to callers.

pub mod engine;
pub mod ledger;
pub mod models;
pub mod storage;
pub mod tokens;
pub mod types;

pub use engine::{PaymentEngine, TransactionPage};
pub use ledger::{MovementReceipt, WalletLedger};
pub use models::{Client, PaymentError, PaymentToken, TokenStatus, Transaction, TransactionKind, TransactionStatus, Wallet};
pub use storage::{ClientDirectory, ClientStore, MemoryClientStore, MemoryTokenStore, MemoryTransactionLog, MemoryWalletStore, TokenStore, TransactionLog, WalletStore};
pub use tokens::{IssuedToken, TokenIssuer, TokenValidation, TokenValidator};
pub use types::{ClientId, Monetary, MonetaryError, SessionId, TokenId, TransactionId, WalletId};
