// Application state module
// Everything a request handler needs, built once at startup

use std::path::PathBuf;
use std::sync::Arc;

use super::secret::resolve_config_path;
use super::types::Config;
use crate::routing::RouteTable;
use crate::secret::{KeyManagement, ParameterStore};

/// Application state shared by all connections
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
    /// Resolved location of the secret INI file
    pub secret_config_path: PathBuf,
    pub parameter_store: Arc<dyn ParameterStore>,
    pub key_management: Arc<dyn KeyManagement>,
}

impl AppState {
    pub fn new(
        config: &Config,
        parameter_store: Arc<dyn ParameterStore>,
        key_management: Arc<dyn KeyManagement>,
    ) -> Self {
        Self {
            config: config.clone(),
            routes: RouteTable::service_routes(),
            secret_config_path: resolve_config_path(&config.secret.config_path),
            parameter_store,
            key_management,
        }
    }
}
