//! # devsvc-core
//!
//! Core of the devsvc command-line client: everything needed to talk to the
//! cloud service management endpoint about "dev service" resources.
//!
//! - [`credential`] finds the client certificate for a thumbprint in the
//!   current user's personal store
//! - [`operation`] holds addresses, payloads and the five operations
//! - [`client`] shapes, sends and parses one request per invocation
//! - [`xml`] parses response bodies and extracts named resources
//! - [`config`] loads the optional settings file
//!
//! ```no_run
//! use devsvc_core::{
//!     CredentialResolver, DirectoryStore, ResourceAddress, ResourceClient, ServiceAddress,
//! };
//!
//! # async fn run() -> devsvc_core::Result<()> {
//! let store = DirectoryStore::open("/home/me/.config/devsvc/certs/my")?;
//! let identity = CredentialResolver::new(store).resolve("32E3E6CB096032EE1CEC312D259CE1DA2454C495")?;
//! let client = ResourceClient::builder("https://management.core.windows.net/", identity)?.build()?;
//!
//! let address = ResourceAddress::new(ServiceAddress::new("sub1", "svc1"), "ns", "t", "r1");
//! let response = client.get_resource(&address).await?;
//! println!("{}", response.status_line());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod operation;
pub mod xml;

pub use client::{
    API_VERSION, API_VERSION_HEADER, ApiResponse, RequestPlan, ResourceClient,
    ResourceClientBuilder,
};
pub use config::{Config, ConfigError};
pub use credential::{
    CertificateStore, ClientIdentity, CredentialResolver, DirectoryStore, StoredCertificate,
    Thumbprint,
};
pub use error::{DevSvcError, Result};
pub use operation::{Operation, Request, ResourceAddress, ResourcePayload, ServiceAddress};
