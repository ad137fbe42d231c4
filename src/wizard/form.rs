//! Data accumulated while creating an account.

use crate::wizard::collaborators::NewAccount;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Problems found when submitting an incomplete form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormViolation {
    #[error("username is missing")]
    MissingUsername,

    #[error("proxy configuration is missing")]
    MissingCategory,
}

/// Fields collected across the steps of the wizard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountForm {
    pub username: Option<String>,
    pub category: Option<String>,
}

impl AccountForm {
    /// Check every field, reporting ALL violations at once.
    pub fn validate(&self) -> Result<NewAccount, NonEmptyVec<FormViolation>> {
        let checks = vec![
            present(self.username.as_deref(), FormViolation::MissingUsername),
            present(self.category.as_deref(), FormViolation::MissingCategory),
        ];

        if let Validation::Failure(violations) = Validation::all_vec(checks) {
            return Err(violations);
        }

        Ok(NewAccount {
            username: self.username.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_default(),
        })
    }
}

fn present(
    field: Option<&str>,
    violation: FormViolation,
) -> Validation<(), NonEmptyVec<FormViolation>> {
    match field {
        Some(value) if !value.is_empty() => Validation::success(()),
        _ => Validation::fail(violation),
    }
}

/// Join violations into one user-facing sentence.
pub fn describe(violations: &NonEmptyVec<FormViolation>) -> String {
    let parts: Vec<String> = violations.iter().map(ToString::to_string).collect();
    format!("Form is incomplete: {}", parts.join("; "))
}
