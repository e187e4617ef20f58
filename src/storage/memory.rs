use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::models::{Client, PaymentToken, TokenStatus, Transaction, TransactionKind, Wallet};
use crate::storage::{ClientStore, TokenStore, TransactionLog, WalletStore};
use crate::types::{ClientId, SessionId, TokenId};

#[derive(Default)]
pub struct MemoryClientStore {
    clients: DashMap<ClientId, Client>
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStore for MemoryClientStore {
    fn load(&self, client_id: ClientId) -> Option<Client> {
        self.clients.get(&client_id).map(|client| client.clone())
    }

    fn save(&self, client: Client) {
        self.clients.insert(client.id, client);
    }
}

/// Wallets keyed by owning client; the 1:1 relationship makes the client id
/// the natural unit of contention.
#[derive(Default)]
pub struct MemoryWalletStore {
    wallets: DashMap<ClientId, Wallet>
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryWalletStore {
    fn load(&self, client_id: ClientId) -> Option<Wallet> {
        self.wallets.get(&client_id).map(|wallet| wallet.clone())
    }

    fn save(&self, wallet: Wallet) {
        self.wallets.insert(wallet.client_id, wallet);
    }

    fn update(&self, wallet: Wallet) -> bool {
        // get_mut holds the shard lock for the whole compare-and-swap, so
        // two concurrent updates against one wallet cannot both win.
        match self.wallets.get_mut(&wallet.client_id) {
            Some(mut current) if current.version == wallet.version => {
                let mut committed = wallet;
                committed.version += 1;
                *current = committed;
                true
            }
            _ => false
        }
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: DashMap<TokenId, PaymentToken>,
    /// Latest token issued per session. Together with the liveness check in
    /// `insert_unique` this upholds "at most one live token per session".
    sessions: DashMap<SessionId, TokenId>
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, token_id: TokenId) -> Option<PaymentToken> {
        self.tokens.get(&token_id).map(|token| token.clone())
    }

    fn insert_unique(&self, token: PaymentToken) -> bool {
        // The session entry lock makes the check-then-create atomic.
        match self.sessions.entry(token.session_id.clone()) {
            Entry::Occupied(mut slot) => {
                let holder_is_live = self.tokens.get(slot.get())
                    .is_some_and(|holder| holder.is_live());

                if holder_is_live {
                    return false;
                }

                slot.insert(token.id);
                self.tokens.insert(token.id, token);
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(token.id);
                self.tokens.insert(token.id, token);
                true
            }
        }
    }

    fn find_active(&self, token: &str, session_id: &str) -> Option<PaymentToken> {
        // Only the session's latest token can be live (insert_unique refuses
        // to replace a live holder), so the index lookup is sufficient.
        let token_id = *self.sessions.get(session_id)?;
        let record = self.tokens.get(&token_id)?;

        (record.status == TokenStatus::Active && record.token == token)
            .then(|| record.clone())
    }

    fn transition(&self, token_id: TokenId, from: TokenStatus, to: TokenStatus) -> bool {
        match self.tokens.get_mut(&token_id) {
            Some(mut token) if token.status == from => {
                token.status = to;
                true
            }
            _ => false
        }
    }

    fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut swept = 0;

        for mut entry in self.tokens.iter_mut() {
            if entry.status == TokenStatus::Active && entry.is_expired(now) {
                entry.status = TokenStatus::Expired;
                swept += 1;
            }
        }

        swept
    }
}

/// Append-only per-client movement history. The per-client entry lock keeps
/// appends atomic and in arrival order, which is also chronological order
/// because the ledger serializes movements per wallet.
#[derive(Default)]
pub struct MemoryTransactionLog {
    entries: DashMap<ClientId, Vec<Transaction>>
}

impl MemoryTransactionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionLog for MemoryTransactionLog {
    fn append(&self, transaction: Transaction) {
        self.entries.entry(transaction.client_id).or_default().push(transaction);
    }

    fn page(&self, client_id: ClientId, offset: usize, limit: usize, kind: Option<TransactionKind>) -> (Vec<Transaction>, usize) {
        let Some(entries) = self.entries.get(&client_id) else {
            return (Vec::new(), 0);
        };

        let filtered: Vec<&Transaction> = entries.iter()
            .filter(|transaction| kind.is_none_or(|kind| transaction.kind == kind))
            .collect();

        let total = filtered.len();
        let rows = filtered.into_iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        (rows, total)
    }
}
