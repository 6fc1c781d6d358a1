//! crates/portal_core/src/portal.rs
//!
//! Bundles the stores one portal instance needs, with an explicit
//! init/shutdown lifecycle. The owner passes it to whatever renders views.

use std::sync::Arc;
use tracing::info;

use crate::directory::IdentityDirectory;
use crate::identity::IdentityStore;
use crate::persistence::Persistence;
use crate::ports::{KeyValueStore, Notifier, PasswordHasher, PortResult};
use crate::store::DomainStore;

pub struct Portal {
    pub store: DomainStore,
    pub session: IdentityStore,
    pub directory: IdentityDirectory,
}

impl Portal {
    /// Loads every collection from `kv`. Only password hashing for the
    /// seeded accounts can fail here.
    pub async fn init(
        kv: Arc<dyn KeyValueStore>,
        hasher: Arc<dyn PasswordHasher>,
        notifier: Arc<dyn Notifier>,
    ) -> PortResult<Self> {
        let persistence = Persistence::new(kv);
        let directory = IdentityDirectory::load(persistence.clone(), hasher).await?;
        let session = IdentityStore::load(persistence.clone()).await;
        let store = DomainStore::load(persistence, notifier).await;
        info!("Portal initialized");
        Ok(Self {
            store,
            session,
            directory,
        })
    }

    /// Flushes the collections one last time and drops the portal.
    pub async fn shutdown(self) -> PortResult<()> {
        self.store.flush().await?;
        info!("Portal shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::tests::PlainHasher;
    use crate::domain::{NewAssignment, Notice, Role};
    use crate::memory::InMemoryKeyValueStore;
    use chrono::{Duration, Utc};

    struct Silent;

    impl Notifier for Silent {
        fn notify(&self, _notice: Notice) {}
    }

    #[tokio::test]
    async fn state_survives_shutdown_and_init() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());

        let mut portal = Portal::init(kv.clone(), Arc::new(PlainHasher), Arc::new(Silent))
            .await
            .unwrap();
        let identity = portal
            .directory
            .authenticate("teacher@example.com", "teacher123")
            .unwrap();
        portal.session.login(identity).await.unwrap();
        portal
            .store
            .create_assignment(NewAssignment {
                title: "HW1".to_string(),
                description: "...".to_string(),
                deadline: Utc::now() + Duration::days(7),
                allowed_file_types: "PDF".to_string(),
                max_points: None,
            })
            .await
            .unwrap();
        portal.shutdown().await.unwrap();

        let portal = Portal::init(kv, Arc::new(PlainHasher), Arc::new(Silent))
            .await
            .unwrap();
        assert_eq!(portal.session.current_role(), Some(Role::Teacher));
        assert_eq!(portal.store.assignments().len(), 1);
        assert_eq!(portal.store.assignments()[0].title, "HW1");
    }
}
