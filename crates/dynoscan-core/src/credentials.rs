//! Credential provider registry.
//!
//! A config names its provider with a plain string; the registry maps
//! that string to a [`CredentialsProvider`] implementation at
//! configuration-validation time. An unknown name is a configuration
//! error, caught before any request is issued.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{PlanError, PlanResult};

/// A resolved set of store credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

/// Resolves credentials for the store client.
///
/// Implementations may back this with the process environment, a config
/// file, or an external secret store.
pub trait CredentialsProvider: Send + Sync {
    /// Resolve a credentials set.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Configuration`] if the backing source cannot
    /// produce credentials.
    fn credentials(&self) -> PlanResult<Credentials>;
}

/// Provider returning a fixed credentials set.
///
/// Suitable for tests and development environments.
#[derive(Debug, Clone)]
pub struct StaticCredentialsProvider {
    credentials: Credentials,
}

impl StaticCredentialsProvider {
    /// Create a provider that always returns the given credentials.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials {
                access_key_id: access_key_id.into(),
                secret_access_key: secret_access_key.into(),
                session_token: None,
            },
        }
    }
}

impl CredentialsProvider for StaticCredentialsProvider {
    fn credentials(&self) -> PlanResult<Credentials> {
        Ok(self.credentials.clone())
    }
}

/// Provider reading `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, and
/// optionally `AWS_SESSION_TOKEN` from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialsProvider;

impl CredentialsProvider for EnvCredentialsProvider {
    fn credentials(&self) -> PlanResult<Credentials> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| PlanError::configuration("AWS_ACCESS_KEY_ID is not set"))?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| PlanError::configuration("AWS_SECRET_ACCESS_KEY is not set"))?;
        Ok(Credentials {
            access_key_id,
            secret_access_key,
            session_token: std::env::var("AWS_SESSION_TOKEN").ok(),
        })
    }
}

/// Named registry of credential providers.
pub struct CredentialsRegistry {
    providers: HashMap<String, Arc<dyn CredentialsProvider>>,
}

impl CredentialsRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// A registry with [`EnvCredentialsProvider`] registered under its
    /// default names `environment` and `env`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let env: Arc<dyn CredentialsProvider> = Arc::new(EnvCredentialsProvider);
        registry.providers.insert("environment".to_owned(), env.clone());
        registry.providers.insert("env".to_owned(), env);
        registry
    }

    /// Register a provider under a name, replacing any previous binding.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn CredentialsProvider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Resolve a provider by the name a config carries.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Configuration`] for an unknown name.
    pub fn resolve(&self, name: &str) -> PlanResult<Arc<dyn CredentialsProvider>> {
        self.providers.get(name).cloned().ok_or_else(|| {
            PlanError::configuration(format!("unknown credentials provider: {name}"))
        })
    }
}

impl Default for CredentialsRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for CredentialsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CredentialsRegistry")
            .field("providers", &names)
            .finish()
    }
}
