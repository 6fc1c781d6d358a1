//! crates/portal_core/src/directory.rs
//!
//! The identity directory: the accounts people can sign in with. Two accounts
//! are always present; registrations are appended and persisted alongside them.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{Account, Identity, NewAccount, Role};
use crate::ids::IdGenerator;
use crate::persistence::{keys, Persistence};
use crate::ports::{PasswordHasher, PortError, PortResult};

/// (id, email, password, name, role) of the accounts every portal starts with.
const SEED_ACCOUNTS: [(&str, &str, &str, &str, Role); 2] = [
    ("1", "teacher@example.com", "teacher123", "John Smith", Role::Teacher),
    ("2", "student@example.com", "student123", "Jane Doe", Role::Student),
];

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const DUPLICATE_EMAIL: &str = "User with this email already exists";

pub struct IdentityDirectory {
    accounts: Vec<Account>,
    persistence: Persistence,
    hasher: Arc<dyn PasswordHasher>,
    ids: IdGenerator,
}

impl IdentityDirectory {
    /// Builds the directory from the seeded accounts plus whatever
    /// registrations a previous run persisted.
    pub async fn load(
        persistence: Persistence,
        hasher: Arc<dyn PasswordHasher>,
    ) -> PortResult<Self> {
        let mut accounts = Vec::with_capacity(SEED_ACCOUNTS.len());
        for (id, email, password, name, role) in SEED_ACCOUNTS {
            accounts.push(Account {
                id: id.to_string(),
                email: email.to_string(),
                name: name.to_string(),
                role,
                password_hash: hasher.hash(password)?,
            });
        }

        let stored: Vec<Account> = persistence.load(keys::USERS).await;
        for account in stored {
            if accounts.iter().any(|known| same_email(&known.email, &account.email)) {
                continue;
            }
            accounts.push(account);
        }

        let mut ids = IdGenerator::default();
        for account in &accounts {
            ids.observe(&account.id);
        }

        info!("Identity directory loaded with {} account(s)", accounts.len());
        Ok(Self {
            accounts,
            persistence,
            hasher,
            ids,
        })
    }

    /// Checks credentials and returns the matching identity.
    pub fn authenticate(&self, email: &str, password: &str) -> PortResult<Identity> {
        let account = self
            .find_by_email(email)
            .ok_or_else(|| PortError::AuthenticationFailure(INVALID_CREDENTIALS.to_string()))?;

        if !self.hasher.verify(password, &account.password_hash)? {
            warn!("Rejected sign-in for {}", account.email);
            return Err(PortError::AuthenticationFailure(INVALID_CREDENTIALS.to_string()));
        }
        Ok(account.identity())
    }

    /// Adds a new account. Emails are unique, compared case-insensitively.
    pub async fn register(&mut self, new: NewAccount) -> PortResult<Identity> {
        let email = new.email.trim().to_string();
        if email.is_empty() || new.password.is_empty() || new.name.trim().is_empty() {
            return Err(PortError::Validation(
                "Name, email and password are required".to_string(),
            ));
        }
        if self.find_by_email(&email).is_some() {
            return Err(PortError::AuthenticationFailure(DUPLICATE_EMAIL.to_string()));
        }

        let account = Account {
            id: self.ids.next(Utc::now()),
            email,
            name: new.name.trim().to_string(),
            role: new.role,
            password_hash: self.hasher.hash(&new.password)?,
        };
        let identity = account.identity();

        let mut accounts = self.accounts.clone();
        accounts.push(account);
        self.persistence.save(keys::USERS, accounts.as_slice()).await?;
        self.accounts = accounts;

        info!("Registered {} as {}", identity.email, identity.role);
        Ok(identity)
    }

    fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| same_email(&account.email, email))
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::memory::InMemoryKeyValueStore;

    /// Reversible stand-in for a real hash, so tests stay fast.
    pub(crate) struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> PortResult<String> {
            Ok(format!("plain:{}", password))
        }

        fn verify(&self, password: &str, hash: &str) -> PortResult<bool> {
            Ok(hash.strip_prefix("plain:") == Some(password))
        }
    }

    async fn directory(persistence: Persistence) -> IdentityDirectory {
        IdentityDirectory::load(persistence, Arc::new(PlainHasher))
            .await
            .unwrap()
    }

    fn fresh_persistence() -> Persistence {
        Persistence::new(Arc::new(InMemoryKeyValueStore::new()))
    }

    #[tokio::test]
    async fn seeded_student_can_sign_in() {
        let directory = directory(fresh_persistence()).await;
        let identity = directory
            .authenticate("student@example.com", "student123")
            .unwrap();
        assert_eq!(identity.role, Role::Student);
        assert_eq!(identity.name, "Jane Doe");
    }

    #[tokio::test]
    async fn wrong_password_is_an_authentication_failure() {
        let directory = directory(fresh_persistence()).await;
        let err = directory
            .authenticate("student@example.com", "nope")
            .unwrap_err();
        assert!(matches!(err, PortError::AuthenticationFailure(_)));

        let err = directory.authenticate("ghost@example.com", "x").unwrap_err();
        assert!(matches!(err, PortError::AuthenticationFailure(_)));
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let mut directory = directory(fresh_persistence()).await;
        let err = directory
            .register(NewAccount {
                name: "Impostor".to_string(),
                email: "Teacher@Example.com".to_string(),
                password: "secret".to_string(),
                role: Role::Teacher,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::AuthenticationFailure(msg) if msg == DUPLICATE_EMAIL));
    }

    #[tokio::test]
    async fn registrations_survive_reload() {
        let persistence = fresh_persistence();
        let mut first = directory(persistence.clone()).await;
        let identity = first
            .register(NewAccount {
                name: "Sam Lee".to_string(),
                email: "sam@example.com".to_string(),
                password: "hunter22".to_string(),
                role: Role::Student,
            })
            .await
            .unwrap();

        let second = directory(persistence).await;
        assert_eq!(second.accounts.len(), 3);
        let again = second.authenticate("sam@example.com", "hunter22").unwrap();
        assert_eq!(again, identity);
    }
}
