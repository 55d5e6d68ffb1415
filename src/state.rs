use std::sync::Arc;

use crate::auth::CredentialVerifier;
use crate::config::AppConfig;
use crate::database::Repository;

/// Shared per-request state. Built once at startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Arc<dyn Repository>,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repo: Arc<dyn Repository>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repo,
            verifier,
        }
    }
}
