use super::{ClientDirectory, ClientStore, MemoryClientStore, MemoryTokenStore, MemoryTransactionLog, MemoryWalletStore, TokenStore, TransactionLog, WalletStore};

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::{Client, PaymentError, PaymentToken, TokenStatus, Transaction, TransactionKind, Wallet};
use crate::types::{ClientId, Monetary};

fn create_token(session_id: &str, minutes_to_live: i64) -> Result<PaymentToken> {
    Ok(PaymentToken::issue(
        Uuid::new_v4(),
        "123456".to_string(),
        Monetary::from_str("10.00")?,
        session_id.to_string(),
        Utc::now() + Duration::minutes(minutes_to_live)
    ))
}

#[test]
fn test_wallet_update_commits_only_on_matching_version() -> Result<()> {
    let store = MemoryWalletStore::new();
    let client_id = Uuid::new_v4();
    store.save(Wallet::new(client_id));

    let mut fresh = store.load(client_id).ok_or_else(|| anyhow!("Wallet missing"))?;
    fresh.balance = Monetary::from_str("100.00")?;
    assert!(store.update(fresh.clone()));

    // The snapshot still carries the pre-commit version and must lose.
    let mut stale = fresh;
    stale.balance = Monetary::from_str("999.00")?;
    assert!(!store.update(stale));

    let committed = store.load(client_id).ok_or_else(|| anyhow!("Wallet missing"))?;
    assert_eq!(committed.balance.to_string(), "100.00");
    assert_eq!(committed.version, 1);

    Ok(())
}

#[test]
fn test_wallet_update_fails_for_unknown_wallet() {
    let store = MemoryWalletStore::new();

    assert!(!store.update(Wallet::new(Uuid::new_v4())));
}

#[test]
fn test_token_store_rejects_second_live_token_per_session() -> Result<()> {
    let store = MemoryTokenStore::new();

    assert!(store.insert_unique(create_token("session-1", 5)?));
    assert!(!store.insert_unique(create_token("session-1", 5)?));
    assert!(store.insert_unique(create_token("session-2", 5)?));
    assert_eq!(store.len(), 2);

    Ok(())
}

#[test]
fn test_token_store_frees_the_session_once_the_holder_is_terminal() -> Result<()> {
    let store = MemoryTokenStore::new();

    let first = create_token("session-1", 5)?;
    let first_id = first.id;
    assert!(store.insert_unique(first));

    // Consuming still holds the slot; only terminal states release it.
    assert!(store.transition(first_id, TokenStatus::Active, TokenStatus::Consuming));
    assert!(!store.insert_unique(create_token("session-1", 5)?));

    assert!(store.transition(first_id, TokenStatus::Consuming, TokenStatus::Used));
    assert!(store.insert_unique(create_token("session-1", 5)?));

    Ok(())
}

#[test]
fn test_token_transition_is_guarded_by_expected_state() -> Result<()> {
    let store = MemoryTokenStore::new();
    let token = create_token("session-1", 5)?;
    let token_id = token.id;
    store.insert_unique(token);

    assert!(store.transition(token_id, TokenStatus::Active, TokenStatus::Used));
    assert!(!store.transition(token_id, TokenStatus::Active, TokenStatus::Used));
    assert!(!store.transition(token_id, TokenStatus::Used, TokenStatus::Active));
    assert!(!store.transition(Uuid::new_v4(), TokenStatus::Active, TokenStatus::Used));

    let stored = store.load(token_id).ok_or_else(|| anyhow!("Token missing"))?;
    assert_eq!(stored.status, TokenStatus::Used);

    Ok(())
}

#[test]
fn test_find_active_misses_consumed_and_mismatched_tokens() -> Result<()> {
    let store = MemoryTokenStore::new();
    let token = create_token("session-1", 5)?;
    let token_id = token.id;
    store.insert_unique(token);

    assert!(store.find_active("123456", "session-1").is_some());
    assert!(store.find_active("123456", "session-2").is_none());
    assert!(store.find_active("000000", "session-1").is_none());

    store.transition(token_id, TokenStatus::Active, TokenStatus::Used);
    assert!(store.find_active("123456", "session-1").is_none());

    Ok(())
}

#[test]
fn test_sweep_expires_only_past_due_active_tokens() -> Result<()> {
    let store = MemoryTokenStore::new();

    let stale = create_token("session-1", -1)?;
    let stale_id = stale.id;
    store.insert_unique(stale);

    let fresh = create_token("session-2", 5)?;
    let fresh_id = fresh.id;
    store.insert_unique(fresh);

    let used = create_token("session-3", -1)?;
    let used_id = used.id;
    store.insert_unique(used);
    store.transition(used_id, TokenStatus::Active, TokenStatus::Used);

    assert_eq!(store.sweep_expired(Utc::now()), 1);
    assert_eq!(store.load(stale_id).map(|t| t.status), Some(TokenStatus::Expired));
    assert_eq!(store.load(fresh_id).map(|t| t.status), Some(TokenStatus::Active));
    assert_eq!(store.load(used_id).map(|t| t.status), Some(TokenStatus::Used));

    // A second sweep finds nothing left to move.
    assert_eq!(store.sweep_expired(Utc::now()), 0);

    Ok(())
}

#[test]
fn test_transaction_log_pages_newest_first_with_kind_filter() -> Result<()> {
    let log = MemoryTransactionLog::new();
    let client_id = Uuid::new_v4();

    for index in 1..=5 {
        let kind = if index % 2 == 0 { TransactionKind::Payment } else { TransactionKind::Recharge };
        log.append(Transaction::completed(
            client_id,
            kind,
            Monetary::from_str(&format!("{index}.00"))?,
            format!("movement {index}"),
            None
        ));
    }

    let (rows, total) = log.page(client_id, 0, 2, None);
    assert_eq!(total, 5);
    assert_eq!(rows[0].description, "movement 5");
    assert_eq!(rows[1].description, "movement 4");

    let (rows, total) = log.page(client_id, 2, 2, None);
    assert_eq!(total, 5);
    assert_eq!(rows[0].description, "movement 3");

    let (payments, payment_total) = log.page(client_id, 0, 10, Some(TransactionKind::Payment));
    assert_eq!(payment_total, 2);
    assert!(payments.iter().all(|t| t.kind == TransactionKind::Payment));

    let (rows, total) = log.page(Uuid::new_v4(), 0, 10, None);
    assert!(rows.is_empty());
    assert_eq!(total, 0);

    Ok(())
}

struct CountingClientStore {
    inner: MemoryClientStore,
    loads: AtomicUsize
}

impl ClientStore for CountingClientStore {
    fn load(&self, client_id: ClientId) -> Option<Client> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(client_id)
    }

    fn save(&self, client: Client) {
        self.inner.save(client);
    }
}

#[tokio::test]
async fn test_directory_caches_client_lookups() -> Result<()> {
    let store = Arc::new(CountingClientStore {
        inner: MemoryClientStore::new(),
        loads: AtomicUsize::new(0)
    });

    let client = Client::new("1032456789", "Maria Lopez", "maria@example.com", "+57 300 555 0101");
    let client_id = client.id;
    store.save(client);

    let directory = ClientDirectory::new(store.clone(), 100);

    directory.lookup(client_id).await?;
    directory.lookup(client_id).await?;

    assert_eq!(store.loads.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_directory_reports_missing_clients() {
    let directory = ClientDirectory::new(Arc::new(MemoryClientStore::new()), 100);

    let result = directory.lookup(Uuid::new_v4()).await;

    assert!(matches!(result, Err(PaymentError::ClientNotFound { .. })));
}
