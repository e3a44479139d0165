//! Registry and chain errors.

use std::fmt;

use thiserror::Error;

/// Registration failures. Both are programmer errors and leave the
/// registry untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("provider id must not be blank")]
    BlankId,

    #[error("provider id {id:?} is already registered (as {existing_name:?})")]
    AlreadyRegistered { id: String, existing_name: String },
}

/// Chain construction failures, raised eagerly so a misconfigured chain
/// never reaches call time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainBuildError {
    #[error("fallback chain requires at least one provider")]
    Empty,

    #[error("selector excluded all {total} providers")]
    NoEligibleProviders { total: usize },
}

/// Every provider in a chain failed.
///
/// `errors` holds one entry per attempted provider, in attempt order.
#[derive(Debug, Clone)]
pub struct AllProvidersFailed<E> {
    pub attempted: Vec<String>,
    pub errors: Vec<(String, E)>,
}

impl<E> AllProvidersFailed<E> {
    /// The error from the final provider tried.
    pub fn last_error(&self) -> Option<&E> {
        self.errors.last().map(|(_, e)| e)
    }

    /// The error a specific provider returned.
    pub fn error_for(&self, name: &str) -> Option<&E> {
        self.errors.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    /// Consume and return the final provider's error.
    pub fn into_last_error(self) -> Option<E> {
        self.errors.into_iter().last().map(|(_, e)| e)
    }
}

impl<E: fmt::Display> fmt::Display for AllProvidersFailed<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all {} providers failed", self.attempted.len())?;
        if let Some((name, err)) = self.errors.last() {
            write!(f, "; last ({name}): {err}")?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for AllProvidersFailed<E> {}
