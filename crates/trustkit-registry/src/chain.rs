//! # Fallback Chain
//!
//! Runs an operation against providers in order until one succeeds.
//!
//! ## Semantics
//!
//! - Construction fails fast: an empty provider list, or a selector that
//!   rejects every provider, is a [`ChainBuildError`].
//! - [`FallbackChain::execute`] stops at the first `Ok`. A provider's `Err`
//!   moves on to the next provider; when all fail the caller receives
//!   [`AllProvidersFailed`] with every error in attempt order.
//! - There is no built-in timeout or retry. Wrap `execute` in
//!   `tokio::time::timeout` to bound it. Dropping the returned future
//!   cancels the in-flight provider call and the chain does not continue.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::{AllProvidersFailed, ChainBuildError};
use crate::registry::RegisteredProvider;

/// A provider instance with the name used in logs and failure reports.
pub struct NamedProvider<T: ?Sized> {
    pub name: String,
    pub instance: Arc<T>,
}

impl<T: ?Sized> NamedProvider<T> {
    pub fn new(name: impl Into<String>, instance: Arc<T>) -> Self {
        Self {
            name: name.into(),
            instance,
        }
    }
}

impl<T: ?Sized> Clone for NamedProvider<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            instance: Arc::clone(&self.instance),
        }
    }
}

impl<T: ?Sized> From<RegisteredProvider<T>> for NamedProvider<T> {
    fn from(registered: RegisteredProvider<T>) -> Self {
        Self {
            name: registered.metadata.id,
            instance: registered.instance,
        }
    }
}

/// Ordered set of interchangeable providers.
pub struct FallbackChain<T: ?Sized> {
    providers: Vec<NamedProvider<T>>,
}

impl<T: ?Sized> fmt::Debug for FallbackChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain")
            .field("providers", &self.names())
            .finish()
    }
}

impl<T: ?Sized> FallbackChain<T> {
    /// Build a chain over `providers`, tried in the given order.
    pub fn new(providers: Vec<NamedProvider<T>>) -> Result<Self, ChainBuildError> {
        if providers.is_empty() {
            return Err(ChainBuildError::Empty);
        }
        Ok(Self { providers })
    }

    /// Build a chain keeping only providers for which `selector` is true.
    pub fn with_selector<F>(providers: Vec<NamedProvider<T>>, selector: F) -> Result<Self, ChainBuildError>
    where
        F: Fn(&NamedProvider<T>) -> bool,
    {
        if providers.is_empty() {
            return Err(ChainBuildError::Empty);
        }
        let total = providers.len();
        let eligible: Vec<_> = providers.into_iter().filter(|p| selector(p)).collect();
        if eligible.is_empty() {
            return Err(ChainBuildError::NoEligibleProviders { total });
        }
        Ok(Self { providers: eligible })
    }

    /// Build a chain from registry lookup results, named by provider id.
    pub fn from_registered(providers: Vec<RegisteredProvider<T>>) -> Result<Self, ChainBuildError> {
        Self::new(providers.into_iter().map(NamedProvider::from).collect())
    }

    /// Try each provider in order, returning the first success.
    pub async fn execute<R, E, F, Fut>(&self, mut operation: F) -> Result<R, AllProvidersFailed<E>>
    where
        F: FnMut(Arc<T>) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: fmt::Display,
    {
        let mut attempted = Vec::with_capacity(self.providers.len());
        let mut errors = Vec::new();
        for provider in &self.providers {
            attempted.push(provider.name.clone());
            match operation(Arc::clone(&provider.instance)).await {
                Ok(result) => {
                    tracing::debug!(provider = %provider.name, attempts = attempted.len(), "provider succeeded");
                    return Ok(result);
                }
                Err(err) => {
                    tracing::warn!(provider = %provider.name, error = %err, "provider failed; trying next");
                    errors.push((provider.name.clone(), err));
                }
            }
        }
        tracing::warn!(attempted = ?attempted, "all providers failed");
        Err(AllProvidersFailed { attempted, errors })
    }

    /// Like [`execute`](Self::execute), then apply `transform` to the first
    /// successful result. `transform` runs at most once and is never a
    /// reason to try another provider.
    pub async fn execute_and_transform<R, U, E, F, Fut, G>(
        &self,
        operation: F,
        transform: G,
    ) -> Result<U, AllProvidersFailed<E>>
    where
        F: FnMut(Arc<T>) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: fmt::Display,
        G: FnOnce(R) -> U,
    {
        self.execute(operation).await.map(transform)
    }

    pub fn size(&self) -> usize {
        self.providers.len()
    }

    /// Always false for a constructed chain; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name.as_str()).collect()
    }
}
