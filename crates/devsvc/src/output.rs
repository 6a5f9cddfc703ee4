//! Rendering of management API responses

use std::io::{self, Write};

use devsvc_core::{ApiResponse, Operation, xml};
use tracing::info;

use crate::error::Result;

const SSO_ENCODING_NOTE: &str = "The URI is URL encoded. Please decode it before use.";

/// Print a response to stdout
pub fn print_response(operation: Operation, response: &ApiResponse, decode: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_response(&mut out, operation, response, decode)
}

/// Write the status line and the pretty-printed body
///
/// A successful `GetResource` writes only the extracted element and logs its
/// status. A failed one is written like any other response.
pub fn write_response<W: Write>(
    out: &mut W,
    operation: Operation,
    response: &ApiResponse,
    decode: bool,
) -> Result<()> {
    if operation == Operation::GetResource && response.is_success() {
        info!("Status Code: {}", response.status_line());
    } else {
        writeln!(out, "Status Code: {}", response.status_line())?;
    }

    let Some(body) = &response.body else {
        return Ok(());
    };
    writeln!(out, "{}", xml::to_pretty_string(body)?)?;

    if operation == Operation::GetSsoToken {
        writeln!(out, "{}", SSO_ENCODING_NOTE)?;
        if decode && let Some(encoded) = xml::sso_uri(body) {
            writeln!(out, "{}", xml::decode_sso_uri(&encoded)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: Option<&str>) -> ApiResponse {
        ApiResponse {
            status: status.try_into().unwrap(),
            body: body.and_then(|b| xml::parse_body(b).unwrap()),
        }
    }

    fn render(operation: Operation, response: &ApiResponse, decode: bool) -> String {
        let mut buf = Vec::new();
        write_response(&mut buf, operation, response, decode).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn status_only_when_body_is_empty() {
        let out = render(Operation::Delete, &response(200, None), false);
        assert_eq!(out, "Status Code: 200 OK\n");
    }

    #[test]
    fn status_then_pretty_document() {
        let out = render(
            Operation::GetCloudService,
            &response(
                200,
                Some(r#"<CloudService xmlns="http://schemas.microsoft.com/windowsazure"><Name>svc1</Name></CloudService>"#),
            ),
            false,
        );
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Status Code: 200 OK"));
        assert!(lines.next().unwrap().starts_with("<CloudService"));
        assert!(
            out.lines()
                .any(|l| l.starts_with("  <Name") && l.ends_with("svc1</Name>"))
        );
    }

    #[test]
    fn error_status_is_printed_with_error_document() {
        let out = render(
            Operation::Update,
            &response(
                400,
                Some(r#"<Error xmlns="http://schemas.microsoft.com/windowsazure"><Code>BadRequest</Code></Error>"#),
            ),
            false,
        );
        assert!(out.starts_with("Status Code: 400 Bad Request\n"));
        assert!(out.contains("<Code>BadRequest</Code>"));
    }

    #[test]
    fn get_resource_prints_element_only() {
        let out = render(
            Operation::GetResource,
            &response(
                200,
                Some(r#"<Resource xmlns="http://schemas.microsoft.com/windowsazure"><Name>r1</Name></Resource>"#),
            ),
            false,
        );
        assert!(!out.contains("Status Code"));
        assert!(out.starts_with("<Resource"));
    }

    #[test]
    fn get_resource_failure_prints_status_and_error_document() {
        let out = render(
            Operation::GetResource,
            &response(
                403,
                Some(r#"<Error xmlns="http://schemas.microsoft.com/windowsazure"><Code>ForbiddenError</Code></Error>"#),
            ),
            false,
        );
        assert!(out.starts_with("Status Code: 403 Forbidden\n<Error"));
        assert!(out.contains("<Code>ForbiddenError</Code>"));
    }

    #[test]
    fn sso_token_note_and_decoding() {
        let body = r#"<SsoToken xmlns="http://schemas.microsoft.com/windowsazure"><Token>https%3A%2F%2Fportal.example.test%2Fsso%3Fid%3D7</Token></SsoToken>"#;

        let out = render(Operation::GetSsoToken, &response(200, Some(body)), false);
        assert!(out.contains(SSO_ENCODING_NOTE));
        assert!(!out.contains("https://portal.example.test/sso?id=7"));

        let out = render(Operation::GetSsoToken, &response(200, Some(body)), true);
        assert!(out.ends_with("https://portal.example.test/sso?id=7\n"));
    }
}
