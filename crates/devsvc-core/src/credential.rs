//! Client certificate resolution
//!
//! A certificate is identified by its thumbprint: the hex-encoded SHA-1
//! digest of its DER encoding. The resolver looks the thumbprint up in the
//! current user's personal store and hands back an identity usable for
//! mutual TLS. Exactly one store entry must match.
//!
//! The store shipped here is [`DirectoryStore`]: a directory of PEM files,
//! one certificate per file. The first `CERTIFICATE` block of a file is the
//! entry's certificate; any further certificates form its chain, and a
//! private key block must sit in the same file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sha1::{Digest, Sha1};
use tracing::{debug, trace, warn};

use crate::error::{DevSvcError, Result};

const CERTIFICATE_TAG: &str = "CERTIFICATE";
const PRIVATE_KEY_TAGS: &[&str] = &["PRIVATE KEY", "RSA PRIVATE KEY", "EC PRIVATE KEY"];
const STORE_EXTENSIONS: &[&str] = &["pem", "crt", "cer"];

/// Normalized certificate thumbprint (upper-case hex, no separators)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Thumbprint(String);

impl Thumbprint {
    /// Normalize user input
    ///
    /// Whitespace and `:` separators are dropped and the digits upper-cased,
    /// so `32:e3:e6...` and `32E3E6...` name the same certificate.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DevSvcError::InvalidThumbprint(raw.to_string()));
        }

        Ok(Self(normalized))
    }

    /// Thumbprint of a DER-encoded certificate
    pub fn of_der(der: &[u8]) -> Self {
        Self(format!("{:X}", Sha1::digest(der)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Thumbprint {
    type Err = DevSvcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Thumbprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One certificate held by a store
#[derive(Debug, Clone)]
pub struct StoredCertificate {
    /// Where the entry came from
    pub source: PathBuf,
    pub thumbprint: Thumbprint,
    /// Raw PEM of the entry (certificate chain and key, if present)
    pub pem: Vec<u8>,
    pub has_private_key: bool,
}

impl StoredCertificate {
    /// Parse a PEM entry; returns `None` when it holds no certificate
    pub fn from_pem(source: impl Into<PathBuf>, pem_bytes: &[u8]) -> Option<Self> {
        let source = source.into();
        let blocks = match pem::parse_many(pem_bytes) {
            Ok(blocks) => blocks,
            Err(e) => {
                debug!("{} is not a PEM file: {}", source.display(), e);
                return None;
            }
        };

        let leaf = blocks.iter().find(|b| b.tag() == CERTIFICATE_TAG)?;
        let has_private_key = blocks
            .iter()
            .any(|b| PRIVATE_KEY_TAGS.contains(&b.tag()));

        Some(Self {
            thumbprint: Thumbprint::of_der(leaf.contents()),
            source,
            pem: pem_bytes.to_vec(),
            has_private_key,
        })
    }
}

/// A place certificates can be looked up in
pub trait CertificateStore {
    /// Human-readable location, used in error messages
    fn location(&self) -> String;

    /// All entries whose thumbprint equals `thumbprint`
    fn find_by_thumbprint(&self, thumbprint: &Thumbprint) -> Result<Vec<StoredCertificate>>;
}

/// Certificate store backed by a directory of PEM files
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open the store read-only
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let metadata = fs::metadata(&root).map_err(|e| DevSvcError::CertificateStore {
            path: root.clone(),
            source: e,
        })?;
        if !metadata.is_dir() {
            return Err(DevSvcError::CertificateStore {
                path: root,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a directory",
                ),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every certificate entry, sorted by file name
    pub fn entries(&self) -> Result<Vec<StoredCertificate>> {
        let read_dir = fs::read_dir(&self.root).map_err(|e| DevSvcError::CertificateStore {
            path: self.root.clone(),
            source: e,
        })?;

        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_store_extension(path))
            .collect();
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping unreadable store entry {}: {}", path.display(), e);
                    continue;
                }
            };
            if let Some(entry) = StoredCertificate::from_pem(&path, &bytes) {
                trace!("Store entry {} -> {}", path.display(), entry.thumbprint);
                entries.push(entry);
            } else {
                warn!("Skipping store entry {}: holds no certificate", path.display());
            }
        }
        Ok(entries)
    }
}

fn has_store_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| STORE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl CertificateStore for DirectoryStore {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn find_by_thumbprint(&self, thumbprint: &Thumbprint) -> Result<Vec<StoredCertificate>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| &entry.thumbprint == thumbprint)
            .collect())
    }
}

/// A resolved client certificate ready to be presented during the TLS handshake
pub struct ClientIdentity {
    thumbprint: Thumbprint,
    source: PathBuf,
    identity: reqwest::Identity,
}

impl ClientIdentity {
    pub fn thumbprint(&self) -> &Thumbprint {
        &self.thumbprint
    }

    /// Store entry the identity was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn into_identity(self) -> reqwest::Identity {
        self.identity
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("thumbprint", &self.thumbprint)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Looks thumbprints up in a certificate store
pub struct CredentialResolver<S> {
    store: S,
}

impl<S: CertificateStore> CredentialResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve `thumbprint` to exactly one usable identity
    pub fn resolve(&self, thumbprint: &str) -> Result<ClientIdentity> {
        let thumbprint = Thumbprint::parse(thumbprint)?;
        debug!(
            "Resolving certificate {} in {}",
            thumbprint,
            self.store.location()
        );

        let mut matches = self.store.find_by_thumbprint(&thumbprint)?;
        let entry = match matches.len() {
            0 => {
                return Err(DevSvcError::CredentialNotFound {
                    thumbprint: thumbprint.to_string(),
                    store: self.store.location(),
                });
            }
            1 => matches.remove(0),
            count => {
                return Err(DevSvcError::AmbiguousCredential {
                    thumbprint: thumbprint.to_string(),
                    count,
                    store: self.store.location(),
                });
            }
        };

        if !entry.has_private_key {
            return Err(DevSvcError::MissingPrivateKey {
                thumbprint: thumbprint.to_string(),
                path: entry.source,
            });
        }

        let identity = reqwest::Identity::from_pem(&entry.pem).map_err(|e| {
            DevSvcError::InvalidCertificate {
                thumbprint: thumbprint.to_string(),
                message: e.to_string(),
            }
        })?;

        debug!("Using certificate {} from {}", thumbprint, entry.source.display());
        Ok(ClientIdentity {
            thumbprint,
            source: entry.source,
            identity,
        })
    }
}
