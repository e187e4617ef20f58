use crate::types::ClientId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered wallet holder.
///
/// Clients are created once at registration and referenced, never mutated,
/// by the payment core. Every other record points at them through
/// `client_id` fields; there is no object-graph traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// Identity document number, unique per client.
    pub document: String,
    pub name: String,
    pub email: String,
    pub phone: String
}

impl Client {
    pub fn new(document: impl Into<String>, name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            document: document.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into()
        }
    }
}
