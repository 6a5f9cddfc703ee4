//! Error types for devsvc
//!
//! Core failures are mapped onto a small set of user-facing errors, each with
//! suggestions for getting unstuck.

use colored::Colorize;
use devsvc_core::DevSvcError;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Certificate error: No certificate with thumbprint 32E3E6CB... found in /home/me/.config/devsvc/certs/my
///
///   tip: Point at another store with --cert-store <dir> or DEVSVC_CERT_STORE
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    fn render(&self) -> String {
        let mut out = format!("{}{}{}\n", "error".red().bold(), ": ".bold(), self.message);

        for (description, commands) in &self.tips {
            out.push('\n');
            out.push_str(&format!(
                "  {}{}{}\n",
                "tip".yellow().bold(),
                ": ".bold(),
                description
            ));
            for cmd in commands {
                out.push_str(&format!("      {}\n", cmd));
            }
        }
        out
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}", self.render());
    }
}

/// Main error type for the devsvc application
#[derive(Error, Debug)]
pub enum DevSvcCliError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Certificate error: {message}")]
    Credential { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Resource '{name}' not found")]
    ResourceNotFound { name: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for devsvc operations
pub type Result<T> = std::result::Result<T, DevSvcCliError>;

impl DevSvcCliError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            DevSvcCliError::Credential { message } if message.contains("private key") => vec![
                "Store the private key in the same PEM file as the certificate".to_string(),
                "Both PKCS#8 ('PRIVATE KEY') and traditional RSA/EC keys are accepted".to_string(),
            ],
            DevSvcCliError::Credential { message } if message.contains("refusing") => vec![
                "Remove duplicate copies of the certificate from the store directory".to_string(),
                "Run with -vv to see which store files were considered".to_string(),
            ],
            DevSvcCliError::Credential { .. } => vec![
                "Check the thumbprint: openssl x509 -in <cert.pem> -noout -fingerprint -sha1".to_string(),
                "Point at another store with --cert-store <dir> or DEVSVC_CERT_STORE".to_string(),
                "Run with -vv to see which store files were considered".to_string(),
            ],
            DevSvcCliError::InvalidInput { .. } => vec![
                "Check the command syntax: devsvc --help".to_string(),
                "Resource operations need NAMESPACE, RESOURCE_TYPE and RESOURCE_NAME".to_string(),
            ],
            DevSvcCliError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
                "Ensure file path is correct (use absolute path if needed)".to_string(),
            ],
            DevSvcCliError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the management URL: --management-url or DEVSVC_MANAGEMENT_URL".to_string(),
                "Ensure the certificate is registered as a management certificate for the subscription".to_string(),
            ],
            DevSvcCliError::ResourceNotFound { .. } => vec![
                "List the resources of the cloud service: devsvc <THUMBPRINT> GetCloudService <SUBSCRIPTION_ID> <CLOUD_SERVICE>".to_string(),
                "Resource names are matched exactly, including case".to_string(),
            ],
            DevSvcCliError::Configuration(_) => vec![
                "Check the config file syntax (TOML)".to_string(),
                "Use an alternate file: --config-file <path>".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<DevSvcError> for DevSvcCliError {
    fn from(err: DevSvcError) -> Self {
        match err {
            e if e.is_credential_error() => DevSvcCliError::Credential {
                message: e.to_string(),
            },
            DevSvcError::PayloadUnreadable { path, source } => DevSvcCliError::FileError {
                path: path.display().to_string(),
                message: source.to_string(),
            },
            DevSvcError::Transport(e) => DevSvcCliError::ConnectionError {
                message: e.to_string(),
            },
            DevSvcError::ResourceNotFound { name } => DevSvcCliError::ResourceNotFound { name },
            e @ DevSvcError::UnknownOperation(_) => DevSvcCliError::InvalidInput {
                message: e.to_string(),
            },
            DevSvcError::Config(e) => DevSvcCliError::Configuration(e.to_string()),
            DevSvcError::InvalidUrl(e) => {
                DevSvcCliError::Configuration(format!("Invalid management URL: {}", e))
            }
            DevSvcError::Render(message) => DevSvcCliError::OutputError { message },
            other => DevSvcCliError::ApiError {
                message: other.to_string(),
            },
        }
    }
}

impl From<devsvc_core::ConfigError> for DevSvcCliError {
    fn from(err: devsvc_core::ConfigError) -> Self {
        DevSvcCliError::Configuration(err.to_string())
    }
}

impl From<anyhow::Error> for DevSvcCliError {
    fn from(err: anyhow::Error) -> Self {
        DevSvcCliError::Configuration(format!("{:#}", err))
    }
}

impl From<std::io::Error> for DevSvcCliError {
    fn from(err: std::io::Error) -> Self {
        DevSvcCliError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}
