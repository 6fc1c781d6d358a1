//! crates/portal_core/src/identity.rs
//!
//! Holds the single active identity for the portal. Login overwrites it
//! wholesale, logout clears it, and both are mirrored to durable storage.

use tracing::info;

use crate::domain::{Identity, Role};
use crate::persistence::{keys, Persistence};
use crate::ports::PortResult;

pub struct IdentityStore {
    current: Option<Identity>,
    persistence: Persistence,
}

impl IdentityStore {
    /// Restores the identity left by the previous run, if any. A missing or
    /// unreadable record means the portal starts signed out.
    pub async fn load(persistence: Persistence) -> Self {
        let current = persistence.load_record::<Identity>(keys::USER).await;
        if let Some(identity) = &current {
            info!("Restored session for {} ({})", identity.email, identity.role);
        }
        Self {
            current,
            persistence,
        }
    }

    pub async fn login(&mut self, identity: Identity) -> PortResult<()> {
        self.persistence.save_record(keys::USER, &identity).await?;
        info!("Signed in {} as {}", identity.email, identity.role);
        self.current = Some(identity);
        Ok(())
    }

    pub async fn logout(&mut self) -> PortResult<()> {
        self.persistence.clear(keys::USER).await?;
        if let Some(identity) = self.current.take() {
            info!("Signed out {}", identity.email);
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_role(&self) -> Option<Role> {
        self.current.as_ref().map(|identity| identity.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKeyValueStore;
    use std::sync::Arc;

    fn jane() -> Identity {
        Identity {
            id: "2".to_string(),
            email: "student@example.com".to_string(),
            name: "Jane Doe".to_string(),
            role: Role::Student,
        }
    }

    #[tokio::test]
    async fn starts_signed_out_without_a_stored_identity() {
        let persistence = Persistence::new(Arc::new(InMemoryKeyValueStore::new()));
        let store = IdentityStore::load(persistence).await;
        assert!(!store.is_authenticated());
        assert_eq!(store.current_role(), None);
    }

    #[tokio::test]
    async fn login_survives_reload_and_logout_clears_it() {
        let persistence = Persistence::new(Arc::new(InMemoryKeyValueStore::new()));

        let mut store = IdentityStore::load(persistence.clone()).await;
        store.login(jane()).await.unwrap();
        assert_eq!(store.current_role(), Some(Role::Student));

        let mut reloaded = IdentityStore::load(persistence.clone()).await;
        assert_eq!(reloaded.current(), Some(&jane()));

        reloaded.logout().await.unwrap();
        assert!(!reloaded.is_authenticated());
        let after_logout = IdentityStore::load(persistence).await;
        assert!(!after_logout.is_authenticated());
    }

    #[tokio::test]
    async fn unreadable_identity_means_signed_out() {
        let kv = InMemoryKeyValueStore::new().with_entry(keys::USER, "\"half a record");
        let store = IdentityStore::load(Persistence::new(Arc::new(kv))).await;
        assert!(!store.is_authenticated());
    }
}
