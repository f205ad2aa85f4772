// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::SyncError;
use schoolhub_domain::{Staff, StaffRole};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::RwLock;
use tracing::debug;

/// A verified identity on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// The display name the identity was registered under.
    pub name: String,
    /// The node the identity belongs to.
    pub node_id: String,
    /// The role granted on that node.
    pub role: StaffRole,
    /// Account balance held for the identity.
    pub balance: f64,
}

impl Identity {
    /// Creates a new identity with a zero balance.
    #[must_use]
    pub fn new(name: &str, node_id: &str, role: StaffRole) -> Self {
        Self {
            name: name.to_string(),
            node_id: node_id.to_string(),
            role,
            balance: 0.0,
        }
    }

    fn matches(&self, name: &str, node_id: &str) -> bool {
        self.node_id == node_id && self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

/// Looks up who someone is on a node.
pub trait IdentityDirectory: Send + Sync + 'static {
    /// Verifies a name against a node.
    ///
    /// Returns `None` when no identity with that name exists on the node.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be reached.
    fn verify(
        &self,
        name: &str,
        node_id: &str,
    ) -> impl Future<Output = Result<Option<Identity>, SyncError>> + Send;
}

/// An [`IdentityDirectory`] held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    identities: RwLock<Vec<Identity>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding one identity per staff member of a node.
    #[must_use]
    pub fn from_staff(node_id: &str, staff: &[Staff]) -> Self {
        let identities: Vec<Identity> = staff
            .iter()
            .map(|member| Identity::new(&member.name, node_id, member.role))
            .collect();
        Self {
            identities: RwLock::new(identities),
        }
    }

    /// Adds an identity, replacing any existing one with the same name on
    /// the same node.
    pub async fn register(&self, identity: Identity) {
        let mut identities = self.identities.write().await;
        identities.retain(|existing| !existing.matches(&identity.name, &identity.node_id));
        debug!(name = %identity.name, node_id = %identity.node_id, "Registered identity");
        identities.push(identity);
    }

    /// Removes the identity registered under a name on a node.
    ///
    /// Returns whether an identity was removed.
    pub async fn unregister(&self, name: &str, node_id: &str) -> bool {
        let mut identities = self.identities.write().await;
        let before: usize = identities.len();
        identities.retain(|existing| !existing.matches(name, node_id));
        let removed: bool = identities.len() < before;
        if removed {
            debug!(name, node_id, "Unregistered identity");
        }
        removed
    }

    /// Makes a node's identities match its staff list.
    ///
    /// Staff still present keep their balance. Identities of other nodes are
    /// left alone.
    pub async fn sync_staff(&self, node_id: &str, staff: &[Staff]) {
        let mut identities = self.identities.write().await;
        let previous: Vec<Identity> = identities
            .iter()
            .filter(|identity| identity.node_id == node_id)
            .cloned()
            .collect();
        identities.retain(|identity| identity.node_id != node_id);

        for member in staff {
            let mut identity: Identity = Identity::new(&member.name, node_id, member.role);
            if let Some(existing) = previous
                .iter()
                .find(|existing| existing.matches(&member.name, node_id))
            {
                identity.balance = existing.balance;
            }
            identities.push(identity);
        }
        debug!(node_id, staff = staff.len(), "Synced identities with staff list");
    }
}

impl IdentityDirectory for InMemoryDirectory {
    async fn verify(&self, name: &str, node_id: &str) -> Result<Option<Identity>, SyncError> {
        let identities = self.identities.read().await;
        Ok(identities
            .iter()
            .find(|identity| identity.matches(name, node_id))
            .cloned())
    }
}
