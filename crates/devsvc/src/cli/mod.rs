//! CLI structure and argument definitions
//!
//! Positional arguments follow the management API's addressing: who signs
//! the request, what to do, then the path from subscription down to a single
//! resource.

use std::path::PathBuf;

use clap::Parser;
use devsvc_core::{Operation, ResourceAddress, ServiceAddress};

use crate::error::{DevSvcCliError, Result};

/// Client for dev service resources attached to cloud services
#[derive(Parser, Debug)]
#[command(name = "devsvc")]
#[command(
    version,
    about = "Manage dev service resources through the cloud service management API"
)]
#[command(long_about = "
Manage dev service resources through the cloud service management API

Requests are authenticated with a client certificate from your personal
certificate store, selected by its SHA-1 thumbprint.

OPERATIONS:
    GetCloudService   Show the cloud service and every attached resource
    GetResource       Show a single resource
    Update            Replace a resource definition with the contents of PAYLOAD_PATH
    Delete            Delete a resource
    GetSsoToken       Issue a single sign-on URI for a resource

EXAMPLES:
    # Describe a cloud service
    devsvc 32E3E6CB096032EE1CEC312D259CE1DA2454C495 GetCloudService sub1 svc1

    # Show one resource
    devsvc 32E3E6CB096032EE1CEC312D259CE1DA2454C495 GetResource sub1 svc1 ns t r1

    # Update a resource from a file
    devsvc 32E3E6CB096032EE1CEC312D259CE1DA2454C495 Update sub1 svc1 ns t r1 r1.xml

    # Print the equivalent curl command instead of sending
    devsvc --curl 32E3E6CB096032EE1CEC312D259CE1DA2454C495 Delete sub1 svc1 ns t r1
")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to alternate configuration file
    #[arg(long, env = "DEVSVC_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Base URL of the management endpoint
    #[arg(long, env = "DEVSVC_MANAGEMENT_URL")]
    pub management_url: Option<String>,

    /// Directory holding the personal certificate store
    #[arg(long, env = "DEVSVC_CERT_STORE")]
    pub cert_store: Option<PathBuf>,

    /// Print the equivalent curl command instead of sending the request
    #[arg(long)]
    pub curl: bool,

    /// Also print the decoded single sign-on URI (GetSsoToken)
    #[arg(long)]
    pub decode: bool,

    /// SHA-1 thumbprint of the client certificate
    #[arg(value_parser = non_blank)]
    pub thumbprint: String,

    /// Operation to perform (case-insensitive)
    #[arg(value_parser = parse_operation)]
    pub operation: Operation,

    /// Subscription that owns the cloud service
    #[arg(value_parser = non_blank)]
    pub subscription_id: String,

    /// Name of the cloud service
    #[arg(value_parser = non_blank)]
    pub cloud_service: String,

    /// Resource provider namespace
    #[arg(value_parser = non_blank)]
    pub namespace: Option<String>,

    /// Resource type
    #[arg(value_parser = non_blank)]
    pub resource_type: Option<String>,

    /// Resource name
    #[arg(value_parser = non_blank)]
    pub resource_name: Option<String>,

    /// File with the new resource definition (Update)
    #[arg(value_parser = non_blank_path)]
    pub payload_path: Option<PathBuf>,
}

impl Cli {
    pub fn service_address(&self) -> ServiceAddress {
        ServiceAddress::new(&self.subscription_id, &self.cloud_service)
    }

    /// Positional arguments the operation needs but did not get
    pub fn missing_arguments(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.operation.requires_resource() {
            for (name, present) in [
                ("NAMESPACE", self.namespace.is_some()),
                ("RESOURCE_TYPE", self.resource_type.is_some()),
                ("RESOURCE_NAME", self.resource_name.is_some()),
            ] {
                if !present {
                    missing.push(name);
                }
            }
        }
        if self.operation.requires_payload() && self.payload_path.is_none() {
            missing.push("PAYLOAD_PATH");
        }
        missing
    }

    /// `InvalidInput` naming every missing argument, if there are any
    pub fn check_arguments(&self) -> Result<()> {
        let missing = self.missing_arguments();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DevSvcCliError::InvalidInput {
                message: format!("{} requires {}", self.operation, missing.join(", ")),
            })
        }
    }

    /// The resource address, or `InvalidInput` naming what is missing
    pub fn resource_address(&self) -> Result<ResourceAddress> {
        match (&self.namespace, &self.resource_type, &self.resource_name) {
            (Some(namespace), Some(resource_type), Some(name)) => Ok(ResourceAddress::new(
                self.service_address(),
                namespace,
                resource_type,
                name,
            )),
            _ => {
                self.check_arguments()?;
                Err(DevSvcCliError::InvalidInput {
                    message: format!(
                        "{} requires NAMESPACE, RESOURCE_TYPE, RESOURCE_NAME",
                        self.operation
                    ),
                })
            }
        }
    }
}

fn non_blank(value: &str) -> std::result::Result<String, String> {
    if value.trim().is_empty() {
        Err("value must not be blank".to_string())
    } else {
        Ok(value.to_string())
    }
}

fn non_blank_path(value: &str) -> std::result::Result<PathBuf, String> {
    non_blank(value).map(PathBuf::from)
}

fn parse_operation(value: &str) -> std::result::Result<Operation, String> {
    value.parse::<Operation>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const THUMBPRINT: &str = "32E3E6CB096032EE1CEC312D259CE1DA2454C495";

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_describe_invocation() {
        let cli = Cli::try_parse_from(["devsvc", THUMBPRINT, "getcloudservice", "sub1", "svc1"])
            .unwrap();
        assert_eq!(cli.operation, Operation::GetCloudService);
        assert_eq!(cli.service_address(), ServiceAddress::new("sub1", "svc1"));
        assert!(cli.namespace.is_none());
        assert!(cli.payload_path.is_none());
    }

    #[test]
    fn parses_update_invocation() {
        let cli = Cli::try_parse_from([
            "devsvc", "-vv", THUMBPRINT, "Update", "sub1", "svc1", "ns", "t", "r1", "r1.xml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.operation, Operation::Update);
        assert_eq!(cli.payload_path, Some(PathBuf::from("r1.xml")));
        let address = cli.resource_address().unwrap();
        assert_eq!(address.name, "r1");
    }

    #[test]
    fn unknown_operation_is_rejected_by_parser() {
        let err = Cli::try_parse_from(["devsvc", THUMBPRINT, "Frobnicate", "sub1", "svc1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("GetSsoToken"));
    }

    #[test]
    fn blank_positional_is_rejected() {
        let err = Cli::try_parse_from(["devsvc", THUMBPRINT, "Delete", "  ", "svc1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn update_lists_every_missing_argument() {
        let cli =
            Cli::try_parse_from(["devsvc", THUMBPRINT, "Update", "sub1", "svc1", "ns"]).unwrap();
        assert_eq!(
            cli.missing_arguments(),
            vec!["RESOURCE_TYPE", "RESOURCE_NAME", "PAYLOAD_PATH"]
        );
        let msg = cli.check_arguments().unwrap_err().to_string();
        assert!(msg.contains("Update requires RESOURCE_TYPE, RESOURCE_NAME, PAYLOAD_PATH"));
    }

    #[test]
    fn describe_needs_no_resource_arguments() {
        let cli = Cli::try_parse_from(["devsvc", THUMBPRINT, "GetCloudService", "sub1", "svc1"])
            .unwrap();
        assert!(cli.missing_arguments().is_empty());
        assert!(cli.check_arguments().is_ok());
    }

    #[test]
    fn missing_resource_arguments_are_named() {
        let cli =
            Cli::try_parse_from(["devsvc", THUMBPRINT, "Delete", "sub1", "svc1", "ns"]).unwrap();
        let err = cli.resource_address().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("RESOURCE_TYPE"));
        assert!(msg.contains("RESOURCE_NAME"));
        assert!(!msg.contains("NAMESPACE,"));
    }
}
