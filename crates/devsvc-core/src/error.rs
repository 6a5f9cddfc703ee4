//! Unified error handling for devsvc-core
//!
//! Every failure of an invocation is terminal: nothing here is retried or
//! recovered internally.
//!
//! # Example
//!
//! ```rust
//! use devsvc_core::DevSvcError;
//!
//! let err = DevSvcError::ResourceNotFound {
//!     name: "r1".to_string(),
//! };
//! assert!(err.is_not_found());
//! assert!(!err.is_credential_error());
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Core error type for credential resolution, requests and response parsing
#[derive(Error, Debug)]
pub enum DevSvcError {
    /// No store entry carries the requested thumbprint
    #[error("No certificate with thumbprint {thumbprint} found in {store}")]
    CredentialNotFound { thumbprint: String, store: String },

    /// More than one store entry carries the requested thumbprint
    #[error("Thumbprint {thumbprint} matches {count} certificates in {store}; refusing to pick one")]
    AmbiguousCredential {
        thumbprint: String,
        count: usize,
        store: String,
    },

    /// The matching certificate has no private key next to it
    #[error("Certificate {thumbprint} in {path} has no private key")]
    MissingPrivateKey { thumbprint: String, path: PathBuf },

    /// The certificate/key material could not be loaded for TLS
    #[error("Certificate {thumbprint} could not be loaded: {message}")]
    InvalidCertificate { thumbprint: String, message: String },

    #[error("Invalid thumbprint '{0}': expected hex digits")]
    InvalidThumbprint(String),

    /// The certificate store itself could not be read
    #[error("Failed to read certificate store {path}: {source}")]
    CertificateStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The update payload file is missing or unreadable
    #[error("Unable to read payload file {path}: {source}")]
    PayloadUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network, TLS or body read failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a body that is not a well-formed XML document
    #[error("Malformed XML response: {0}")]
    MalformedResponse(String),

    #[error("Failed to render XML: {0}")]
    Render(String),

    #[error("SSO token is not valid UTF-8 once decoded: {0}")]
    InvalidSsoToken(#[from] std::string::FromUtf8Error),

    #[error("Resource '{name}' not found in cloud service document")]
    ResourceNotFound { name: String },

    #[error("Unknown operation '{0}' (valid: GetCloudService, GetResource, Update, Delete, GetSsoToken)")]
    UnknownOperation(String),

    #[error("Invalid management URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<xmltree::ParseError> for DevSvcError {
    fn from(err: xmltree::ParseError) -> Self {
        DevSvcError::MalformedResponse(err.to_string())
    }
}

impl From<::xml::reader::Error> for DevSvcError {
    fn from(err: ::xml::reader::Error) -> Self {
        DevSvcError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, DevSvcError>;

impl DevSvcError {
    /// Returns true if the named resource was absent from the describe document
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DevSvcError::ResourceNotFound { .. })
    }

    /// Returns true if the failure happened while resolving the client certificate
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            DevSvcError::CredentialNotFound { .. }
                | DevSvcError::AmbiguousCredential { .. }
                | DevSvcError::MissingPrivateKey { .. }
                | DevSvcError::InvalidCertificate { .. }
                | DevSvcError::InvalidThumbprint(_)
                | DevSvcError::CertificateStore { .. }
        )
    }

    /// Returns true if the failure happened on the wire
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, DevSvcError::Transport(_))
    }
}
