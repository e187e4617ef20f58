use std::sync::Arc;

use moka::future::Cache;

use crate::models::{Client, PaymentError};
use crate::storage::ClientStore;
use crate::types::ClientId;

/// Read-through cache over the client store.
///
/// The core looks a client up on almost every operation, and clients are
/// immutable to the core, so cached records can never go stale. Misses in
/// the underlying store surface as `ClientNotFound`.
pub struct ClientDirectory {
    store: Arc<dyn ClientStore>,
    cache: Cache<ClientId, Client>
}

impl ClientDirectory {
    pub fn new(store: Arc<dyn ClientStore>, capacity: u64) -> Self {
        Self {
            store,
            cache: Cache::new(capacity)
        }
    }

    pub async fn lookup(&self, client_id: ClientId) -> Result<Client, PaymentError> {
        if let Some(client) = self.cache.get(&client_id).await {
            return Ok(client);
        }

        let client = self.store.load(client_id)
            .ok_or_else(|| PaymentError::client_not_found(client_id))?;

        self.cache.insert(client_id, client.clone()).await;

        Ok(client)
    }
}
