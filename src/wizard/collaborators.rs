//! Contracts the wizard needs from the outside world.
//!
//! The engine never talks to these directly; hooks reach them through the
//! wizard's environment, and the dispatcher consults the operator directory.
//! The in-memory implementations back tests and the demo.

use crate::wizard::session::OperatorId;
use parking_lot::Mutex;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Request to provision a downstream account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub category: String,
}

/// Descriptive fields of a provisioned account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub category: String,
    pub status: String,
    pub used_traffic: u64,
    pub config_url: String,
}

/// Errors reported by provisioning collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("user with name {0} already exists")]
    AlreadyExists(String),

    #[error("unknown proxy configuration '{0}'")]
    UnknownCategory(String),

    #[error("provisioning service unavailable: {0}")]
    Unavailable(String),
}

/// Answers whether an identity may operate the wizard.
pub trait OperatorDirectory: Send + Sync {
    fn is_authorized(&self, operator: OperatorId) -> bool;
}

/// Creates and lists downstream accounts.
pub trait Provisioner: Send + Sync {
    fn create_account(&self, request: &NewAccount) -> Result<Account, ProvisionError>;

    fn list_accounts(&self) -> Result<Vec<Account>, ProvisionError>;
}

/// Lists the categories an account can be created in.
pub trait CategoryCatalog: Send + Sync {
    fn list_categories(&self) -> Result<Vec<String>, ProvisionError>;
}

/// Fixed set of authorized operators.
#[derive(Clone, Debug, Default)]
pub struct Whitelist {
    operators: HashSet<OperatorId>,
}

impl Whitelist {
    pub fn new(operators: impl IntoIterator<Item = OperatorId>) -> Self {
        Self {
            operators: operators.into_iter().collect(),
        }
    }
}

impl OperatorDirectory for Whitelist {
    fn is_authorized(&self, operator: OperatorId) -> bool {
        self.operators.contains(&operator)
    }
}

/// Fixed list of categories.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    categories: Vec<String>,
}

impl StaticCatalog {
    pub fn new<S: Into<String>>(categories: impl IntoIterator<Item = S>) -> Self {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }
}

impl CategoryCatalog for StaticCatalog {
    fn list_categories(&self) -> Result<Vec<String>, ProvisionError> {
        Ok(self.categories.clone())
    }
}

/// Provisioner keeping accounts in process memory.
///
/// Refuses duplicate usernames and categories missing from its catalog.
#[derive(Debug, Default)]
pub struct InMemoryProvisioner {
    catalog: StaticCatalog,
    accounts: Mutex<Vec<Account>>,
}

impl InMemoryProvisioner {
    pub fn new(catalog: StaticCatalog) -> Self {
        Self {
            catalog,
            accounts: Mutex::new(Vec::new()),
        }
    }
}

impl Provisioner for InMemoryProvisioner {
    fn create_account(&self, request: &NewAccount) -> Result<Account, ProvisionError> {
        if !self.catalog.categories.contains(&request.category) {
            return Err(ProvisionError::UnknownCategory(request.category.clone()));
        }

        let mut accounts = self.accounts.lock();
        if accounts.iter().any(|a| a.username == request.username) {
            return Err(ProvisionError::AlreadyExists(request.username.clone()));
        }

        let account = Account {
            username: request.username.clone(),
            category: request.category.clone(),
            status: "active".to_string(),
            used_traffic: 0,
            config_url: format!(
                "{}://{}@proxy.invalid#{}",
                request.category,
                Uuid::new_v4(),
                request.username
            ),
        };
        accounts.push(account.clone());
        Ok(account)
    }

    fn list_accounts(&self) -> Result<Vec<Account>, ProvisionError> {
        Ok(self.accounts.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, category: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn whitelist_checks_membership() {
        let whitelist = Whitelist::new([1, 2]);

        assert!(whitelist.is_authorized(1));
        assert!(!whitelist.is_authorized(3));
    }

    #[test]
    fn provisioner_creates_and_lists() {
        let provisioner = InMemoryProvisioner::new(StaticCatalog::new(["vless"]));

        let account = provisioner.create_account(&request("bob_1", "vless")).unwrap();

        assert_eq!(account.username, "bob_1");
        assert!(account.config_url.starts_with("vless://"));
        assert_eq!(provisioner.list_accounts().unwrap(), vec![account]);
    }

    #[test]
    fn provisioner_refuses_duplicates() {
        let provisioner = InMemoryProvisioner::new(StaticCatalog::new(["vless"]));
        provisioner.create_account(&request("bob_1", "vless")).unwrap();

        let err = provisioner
            .create_account(&request("bob_1", "vless"))
            .unwrap_err();
        assert_eq!(err.to_string(), "user with name bob_1 already exists");
    }

    #[test]
    fn provisioner_refuses_unknown_category() {
        let provisioner = InMemoryProvisioner::new(StaticCatalog::new(["vless"]));

        let err = provisioner
            .create_account(&request("bob_1", "trojan"))
            .unwrap_err();
        assert_eq!(err, ProvisionError::UnknownCategory("trojan".to_string()));
    }
}
