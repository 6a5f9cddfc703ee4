//! Connection management: settings, certificate resolution and client creation

use std::path::PathBuf;

use anyhow::Context;
use devsvc_core::{
    ClientIdentity, Config, CredentialResolver, DirectoryStore, ResourceClient,
    ResourceClientBuilder,
};
use tracing::{debug, info, trace};

use crate::cli::Cli;
use crate::error::Result as CliResult;

/// Connection manager for creating certificate-authenticated clients
///
/// Settings are layered: command-line flags and their environment variables
/// win over the config file, which wins over the built-in defaults.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Load the config file and apply command-line overrides
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let (config, config_path) = match &cli.config_file {
            Some(config_file) => {
                let path = PathBuf::from(config_file);
                debug!("Loading config from explicit path: {:?}", path);
                let config = Config::load_from_path(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                (config, Some(path))
            }
            None => {
                debug!("Loading config from default location");
                (Config::load().context("Failed to load configuration")?, None)
            }
        };

        let mut manager = Self::with_config_path(config, config_path);
        manager.apply_overrides(cli.management_url.clone(), cli.cert_store.clone());
        debug!(
            "Created ConnectionManager with config_path: {:?}",
            manager.config_path
        );
        Ok(manager)
    }

    fn apply_overrides(&mut self, management_url: Option<String>, cert_store: Option<PathBuf>) {
        if let Some(url) = management_url {
            debug!("Management URL overridden: {}", url);
            self.config.management_url = Some(url);
        }
        if let Some(store) = cert_store {
            debug!("Certificate store overridden: {}", store.display());
            self.config.cert_store = Some(store);
        }
    }

    /// Find the client certificate for `thumbprint` in the personal store
    pub fn resolve_identity(&self, thumbprint: &str) -> CliResult<ClientIdentity> {
        let store_path = self.config.cert_store_path()?;
        trace!("Opening certificate store {}", store_path.display());
        let store = DirectoryStore::open(store_path)?;
        let identity = CredentialResolver::new(store).resolve(thumbprint)?;
        info!(
            "Using certificate {} from {}",
            identity.thumbprint(),
            identity.source().display()
        );
        Ok(identity)
    }

    /// Create a management client authenticated with `identity`
    pub fn create_client(&self, identity: ClientIdentity) -> CliResult<ResourceClient> {
        let base_url = self.config.management_url()?;
        let client = ResourceClientBuilder::from_url(base_url, identity).build()?;
        debug!("Created management client for {}", client.base_url());
        Ok(client)
    }
}
