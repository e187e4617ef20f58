use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::ledger::{MovementReceipt, WalletLedger};
use crate::models::{Client, PaymentError, TokenStatus, Transaction, TransactionKind, Wallet};
use crate::storage::{ClientDirectory, ClientStore, TokenStore, TransactionLog, WalletStore};
use crate::tokens::{IssuedToken, TokenIssuer, TokenValidation, TokenValidator};
use crate::types::{ClientId, Monetary, SessionId};

const DEFAULT_CLIENT_CACHE_CAPACITY: u64 = 10_000;
const DEFAULT_MAX_RETRIES: u32 = 8;
const MAX_PAGE_LIMIT: usize = 100;

/// One newest-first page of a client's movement history.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize
}

/// The payment core's operation surface and the confirm-payment saga.
///
/// The engine is stateless between calls apart from the client read cache;
/// all durable state lives in the injected stores, so any number of engines
/// over the same stores behave as one.
pub struct PaymentEngine {
    clients: Arc<dyn ClientStore>,
    wallets: Arc<dyn WalletStore>,
    tokens: Arc<dyn TokenStore>,
    log: Arc<dyn TransactionLog>,
    directory: Arc<ClientDirectory>,
    token_ttl: Duration,
    max_retries: u32
}

impl PaymentEngine {
    pub fn new(
        clients: Arc<dyn ClientStore>,
        wallets: Arc<dyn WalletStore>,
        tokens: Arc<dyn TokenStore>,
        log: Arc<dyn TransactionLog>
    ) -> Self {
        let directory = Arc::new(ClientDirectory::new(clients.clone(), DEFAULT_CLIENT_CACHE_CAPACITY));

        Self {
            clients,
            wallets,
            tokens,
            log,
            directory,
            token_ttl: Duration::minutes(5),
            max_retries: DEFAULT_MAX_RETRIES
        }
    }

    /// How long an issued token stays redeemable.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Retry budget for the optimistic wallet update.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_client_cache_capacity(mut self, capacity: u64) -> Self {
        self.directory = Arc::new(ClientDirectory::new(self.clients.clone(), capacity));
        self
    }

    /// Registers a client together with its zero-balance wallet.
    pub async fn register(&self, document: &str, name: &str, email: &str, phone: &str) -> Client {
        let client = Client::new(document, name, email, phone);
        let wallet = Wallet::new(client.id);

        self.clients.save(client.clone());
        self.wallets.save(wallet);

        info!("Client [{}] registered with a zero-balance wallet", client.id);

        client
    }

    /// Issues a single-use token for the session. The caller delivers
    /// {token, amount, client} out-of-band; the engine never does.
    pub async fn issue_token(&self, client_id: ClientId, amount: Monetary, session_id: SessionId) -> Result<IssuedToken, PaymentError> {
        self.issuer().issue(client_id, amount, session_id).await
    }

    pub async fn validate_token(&self, token: &str, session_id: &str) -> Result<TokenValidation, PaymentError> {
        self.validator().validate(token, session_id).await
    }

    /// Redeems a token: validate, claim, debit, consume.
    ///
    /// The claim (ACTIVE -> CONSUMING) is taken before the debit so a retry
    /// or a racing duplicate observes a non-ACTIVE token and fails without
    /// touching the wallet; a failed debit hands the claim back. Calling
    /// confirm twice with the same pair therefore debits exactly once.
    pub async fn confirm_payment(&self, token: &str, session_id: &str) -> Result<MovementReceipt, PaymentError> {
        let validation = self.validator().validate(token, session_id).await?;

        if !self.tokens.transition(validation.token_id, TokenStatus::Active, TokenStatus::Consuming) {
            warn!("Token [{}] was claimed by a concurrent confirm on session [{session_id}]", validation.token_id);
            return Err(PaymentError::token_already_used(validation.token_id));
        }

        match self.debit_for(&validation, token, session_id).await {
            Ok(receipt) => {
                if !self.tokens.transition(validation.token_id, TokenStatus::Consuming, TokenStatus::Used) {
                    // Unreachable while the claim is held; a hit means the
                    // token store lost the CONSUMING row underneath us.
                    error!("Token [{}] left the consuming state mid-confirm", validation.token_id);
                }

                info!(
                    "Payment of {} confirmed for client [{}] on session [{session_id}]: {} -> {}",
                    validation.amount, validation.client_id, receipt.previous_balance, receipt.new_balance
                );

                Ok(receipt)
            }
            Err(payment_error) => {
                // The wallet was not touched; the token goes back to being
                // redeemable until it is retried or expires.
                if !self.tokens.transition(validation.token_id, TokenStatus::Consuming, TokenStatus::Active) {
                    error!("Token [{}] could not be released after a failed debit", validation.token_id);
                }

                warn!("Confirm for token [{}] aborted: {payment_error}", validation.token_id);

                Err(payment_error)
            }
        }
    }

    /// Credits a wallet directly; no token involved.
    pub async fn recharge(&self, client_id: ClientId, amount: Monetary, description: Option<String>) -> Result<MovementReceipt, PaymentError> {
        if !amount.is_positive() {
            return Err(PaymentError::non_positive_amount(amount));
        }

        self.directory.lookup(client_id).await?;

        let description = description.unwrap_or_else(|| format!("Wallet recharge of {amount}"));

        self.ledger()
            .apply_movement(client_id, amount, TransactionKind::Recharge, description, None)
            .await
    }

    pub async fn balance(&self, client_id: ClientId) -> Result<Monetary, PaymentError> {
        self.directory.lookup(client_id).await?;

        self.wallets.load(client_id)
            .map(|wallet| wallet.balance)
            .ok_or_else(|| PaymentError::wallet_not_found(client_id))
    }

    /// Newest-first movement history. Pages are 1-based; `limit` is clamped
    /// to a sane ceiling.
    pub async fn transactions(&self, client_id: ClientId, page: usize, limit: usize, kind: Option<TransactionKind>) -> Result<TransactionPage, PaymentError> {
        self.directory.lookup(client_id).await?;

        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let offset = (page - 1) * limit;

        let (transactions, total) = self.log.page(client_id, offset, limit, kind);

        Ok(TransactionPage {
            transactions,
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit)
        })
    }

    /// Maintenance sweep that bulk-expires overdue ACTIVE tokens, freeing
    /// their sessions. Not part of any transactional flow.
    pub async fn sweep_expired_tokens(&self) -> usize {
        let swept = self.tokens.sweep_expired(Utc::now());

        if swept > 0 {
            info!("Swept [{swept}] expired tokens");
        }

        swept
    }

    async fn debit_for(&self, validation: &TokenValidation, token: &str, session_id: &str) -> Result<MovementReceipt, PaymentError> {
        let debit = validation.amount.checked_neg()
            .ok_or_else(|| PaymentError::overflow(validation.client_id, validation.amount))?;

        self.ledger()
            .apply_movement(
                validation.client_id,
                debit,
                TransactionKind::Payment,
                format!("Payment confirmed with token {token}"),
                Some(session_id.to_string())
            )
            .await
    }

    fn ledger(&self) -> WalletLedger {
        WalletLedger::new(self.wallets.clone(), self.log.clone()).with_max_attempts(self.max_retries)
    }

    fn issuer(&self) -> TokenIssuer {
        TokenIssuer::new(self.directory.clone(), self.wallets.clone(), self.tokens.clone()).with_ttl(self.token_ttl)
    }

    fn validator(&self) -> TokenValidator {
        TokenValidator::new(self.directory.clone(), self.tokens.clone())
    }
}
