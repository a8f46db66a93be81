use std::sync::Arc;

use anyhow::Context;

use crate::auth::CredentialGateway;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::schema::SchemaRegistry;

/// Shared application state handed to every route and pipeline layer
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseManager,
    pub schemas: Arc<SchemaRegistry>,
    pub gateway: Arc<CredentialGateway>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseManager) -> anyhow::Result<Self> {
        let schemas = SchemaRegistry::builtin().context("failed to build schema registry")?;
        let gateway = CredentialGateway::new(
            config.security.secret_key.as_bytes(),
            config.security.token_ttl_secs,
        );

        Ok(Self {
            config: Arc::new(config),
            db,
            schemas: Arc::new(schemas),
            gateway: Arc::new(gateway),
        })
    }
}
