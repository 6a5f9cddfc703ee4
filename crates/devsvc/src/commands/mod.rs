//! Command implementations

pub mod curl;

use devsvc_core::{Operation, Request, ResourcePayload};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::connection::ConnectionManager;
use crate::error::{DevSvcCliError, Result};
use crate::output;

/// Run the invocation described by `cli`
///
/// Inputs are validated and the payload is read before the certificate
/// store is touched; nothing reaches the network until both succeed.
pub async fn execute(cli: &Cli) -> Result<()> {
    let request = build_request(cli)?;
    info!(
        "Command: {} {}/{}",
        cli.operation, cli.subscription_id, cli.cloud_service
    );

    let conn_mgr = ConnectionManager::from_cli(cli)?;
    let identity = conn_mgr.resolve_identity(&cli.thumbprint)?;

    if cli.curl {
        let cert = identity.source().to_path_buf();
        let client = conn_mgr.create_client(identity)?;
        let plan = client.plan(&request)?;
        println!(
            "{}",
            curl::format_curl(&plan, &cert, cli.payload_path.as_deref())
        );
        return Ok(());
    }

    let client = conn_mgr.create_client(identity)?;
    let operation = request.operation();

    let start = std::time::Instant::now();
    let response = client.execute(request).await?;
    debug!("{} completed in {:?}", operation, start.elapsed());

    output::print_response(operation, &response, cli.decode)
}

/// Turn the positional arguments into a typed request
pub fn build_request(cli: &Cli) -> Result<Request> {
    cli.check_arguments()?;
    let request = match cli.operation {
        Operation::GetCloudService => Request::DescribeService(cli.service_address()),
        Operation::GetResource => Request::GetResource(cli.resource_address()?),
        Operation::Update => {
            let address = cli.resource_address()?;
            let path = cli
                .payload_path
                .as_ref()
                .ok_or_else(|| DevSvcCliError::InvalidInput {
                    message: format!("{} requires PAYLOAD_PATH", cli.operation),
                })?;
            Request::Update(address, ResourcePayload::from_file(path)?)
        }
        Operation::Delete => Request::Delete(cli.resource_address()?),
        Operation::GetSsoToken => Request::IssueSsoToken(cli.resource_address()?),
    };
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    const THUMBPRINT: &str = "32E3E6CB096032EE1CEC312D259CE1DA2454C495";

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["devsvc", THUMBPRINT];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn describe_ignores_resource_arguments() {
        let cli = parse(&["GetCloudService", "sub1", "svc1", "ns", "t", "r1"]);
        let request = build_request(&cli).unwrap();
        assert!(matches!(request, Request::DescribeService(ref s) if s.cloud_service_name == "svc1"));
    }

    #[test]
    fn resource_operations_map_to_requests() {
        let cli = parse(&["getssotoken", "sub1", "svc1", "ns", "t", "r1"]);
        assert_eq!(
            build_request(&cli).unwrap().operation(),
            Operation::GetSsoToken
        );

        let cli = parse(&["DELETE", "sub1", "svc1", "ns", "t", "r1"]);
        assert_eq!(build_request(&cli).unwrap().operation(), Operation::Delete);
    }

    #[test]
    fn update_reads_payload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r1.xml");
        fs::write(&path, "<Resource/>").unwrap();

        let cli = parse(&[
            "Update",
            "sub1",
            "svc1",
            "ns",
            "t",
            "r1",
            path.to_str().unwrap(),
        ]);
        match build_request(&cli).unwrap() {
            Request::Update(address, payload) => {
                assert_eq!(address.name, "r1");
                assert_eq!(payload.into_bytes(), b"<Resource/>".to_vec());
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn update_without_payload_path_is_invalid_input() {
        let cli = parse(&["Update", "sub1", "svc1", "ns", "t", "r1"]);
        let err = build_request(&cli).unwrap_err();
        assert!(matches!(err, DevSvcCliError::InvalidInput { .. }));
        assert!(err.to_string().contains("PAYLOAD_PATH"));
    }

    #[test]
    fn update_with_missing_payload_file_is_file_error() {
        let cli = parse(&[
            "Update",
            "sub1",
            "svc1",
            "ns",
            "t",
            "r1",
            "/nonexistent/devsvc/r1.xml",
        ]);
        let err = build_request(&cli).unwrap_err();
        assert!(matches!(err, DevSvcCliError::FileError { .. }));
    }

    #[test]
    fn update_with_only_namespace_names_everything_missing() {
        let cli = parse(&["Update", "sub1", "svc1", "ns"]);
        let err = build_request(&cli).unwrap_err();
        assert!(matches!(err, DevSvcCliError::InvalidInput { .. }));
        let msg = err.to_string();
        assert!(msg.contains("RESOURCE_TYPE, RESOURCE_NAME, PAYLOAD_PATH"));
    }

    #[test]
    fn get_resource_without_name_is_invalid_input() {
        let cli = parse(&["GetResource", "sub1", "svc1", "ns", "t"]);
        let err = build_request(&cli).unwrap_err();
        assert!(err.to_string().contains("RESOURCE_NAME"));
    }
}
