use std::sync::Arc;

use async_trait::async_trait;
use db::{DBService, DbErr};
use services::services::config::{Config, ConfigError};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Composition seam between the HTTP layer and the runtime services.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    async fn new() -> Result<Self, DeploymentError>
    where
        Self: Sized;

    fn config(&self) -> &Arc<RwLock<Config>>;

    fn db(&self) -> &DBService;
}
