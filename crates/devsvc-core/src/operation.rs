//! Addresses, payloads and the operations that can be run against them

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::error::{DevSvcError, Result};

/// The five operations the management endpoint supports for dev services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetCloudService,
    GetResource,
    Update,
    Delete,
    GetSsoToken,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::GetCloudService,
        Operation::GetResource,
        Operation::Update,
        Operation::Delete,
        Operation::GetSsoToken,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::GetCloudService => "GetCloudService",
            Operation::GetResource => "GetResource",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
            Operation::GetSsoToken => "GetSsoToken",
        }
    }

    /// Whether namespace, type and resource name are needed
    pub fn requires_resource(&self) -> bool {
        !matches!(self, Operation::GetCloudService)
    }

    /// Whether a payload file is needed
    pub fn requires_payload(&self) -> bool {
        matches!(self, Operation::Update)
    }
}

impl FromStr for Operation {
    type Err = DevSvcError;

    /// Case-insensitive match on the operation name
    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DevSvcError::UnknownOperation(s.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies a cloud service within a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAddress {
    pub subscription_id: String,
    pub cloud_service_name: String,
}

impl ServiceAddress {
    pub fn new(subscription_id: impl Into<String>, cloud_service_name: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            cloud_service_name: cloud_service_name.into(),
        }
    }

    /// Path segments below the management URL
    pub fn segments(&self) -> Vec<&str> {
        vec![
            self.subscription_id.as_str(),
            "cloudservices",
            self.cloud_service_name.as_str(),
        ]
    }
}

/// Identifies a dev service resource attached to a cloud service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAddress {
    pub service: ServiceAddress,
    pub provider_namespace: String,
    pub resource_type: String,
    pub name: String,
}

impl ResourceAddress {
    pub fn new(
        service: ServiceAddress,
        provider_namespace: impl Into<String>,
        resource_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            service,
            provider_namespace: provider_namespace.into(),
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Path segments below the management URL
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = self.service.segments();
        segments.extend([
            "resources",
            self.provider_namespace.as_str(),
            self.resource_type.as_str(),
            self.name.as_str(),
        ]);
        segments
    }
}

/// Raw body of an update request, read in full before anything is sent
#[derive(Debug, Clone)]
pub struct ResourcePayload {
    source: PathBuf,
    bytes: Vec<u8>,
}

impl ResourcePayload {
    /// Read the whole file; a missing or unreadable file is `PayloadUnreadable`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| DevSvcError::PayloadUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("Read {} byte payload from {}", bytes.len(), path.display());
        Ok(Self {
            source: path.to_path_buf(),
            bytes,
        })
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: PathBuf::new(),
            bytes: bytes.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A fully specified operation, ready to execute
#[derive(Debug, Clone)]
pub enum Request {
    DescribeService(ServiceAddress),
    GetResource(ResourceAddress),
    Update(ResourceAddress, ResourcePayload),
    Delete(ResourceAddress),
    IssueSsoToken(ResourceAddress),
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::DescribeService(_) => Operation::GetCloudService,
            Request::GetResource(_) => Operation::GetResource,
            Request::Update(..) => Operation::Update,
            Request::Delete(_) => Operation::Delete,
            Request::IssueSsoToken(_) => Operation::GetSsoToken,
        }
    }
}
