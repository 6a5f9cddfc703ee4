//! Curl command formatting for the `--curl` flag

use std::path::Path;

use devsvc_core::RequestPlan;

/// Format a curl command equivalent to `plan`.
///
/// The client certificate is passed by path so no key material is printed.
/// When the request has a body and the payload file is known, the file is
/// referenced instead of inlined.
pub fn format_curl(plan: &RequestPlan, cert: &Path, payload: Option<&Path>) -> String {
    let mut parts = vec![
        "curl".to_string(),
        "-s".to_string(),
        format!("-X {}", plan.method),
    ];

    parts.push(shell_quote(plan.url.as_str()));
    parts.push(format!("--cert {}", shell_quote(&cert.display().to_string())));

    for (name, value) in &plan.headers {
        parts.push(format!("-H {}", shell_quote(&format!("{name}: {value}"))));
    }

    match (&plan.body, payload) {
        (Some(_), Some(path)) => parts.push(format!(
            "--data-binary {}",
            shell_quote(&format!("@{}", path.display()))
        )),
        (Some(body), None) => parts.push(format!(
            "--data-binary {}",
            shell_quote(&String::from_utf8_lossy(body))
        )),
        (None, _) => {}
    }

    parts.join(" \\\n  ")
}

/// Single-quote `value` for a POSIX shell
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(method: &str, url: &str, body: Option<&[u8]>) -> RequestPlan {
        let mut headers = vec![("x-ms-version", "2014-12-01")];
        if body.is_some() {
            headers.push(("content-type", "application/xml"));
        }
        RequestPlan {
            method: method.parse().unwrap(),
            url: url.parse().unwrap(),
            headers,
            body: body.map(<[u8]>::to_vec),
        }
    }

    #[test]
    fn get_without_body() {
        let plan = plan(
            "GET",
            "https://management.core.windows.net/sub1/cloudservices/svc1",
            None,
        );
        let result = format_curl(&plan, Path::new("/certs/my/alpha.pem"), None);
        assert!(result.starts_with("curl"));
        assert!(result.contains("-X GET"));
        assert!(result.contains("'https://management.core.windows.net/sub1/cloudservices/svc1'"));
        assert!(result.contains("--cert '/certs/my/alpha.pem'"));
        assert!(result.contains("-H 'x-ms-version: 2014-12-01'"));
        assert!(!result.contains("--data-binary"));
        assert!(!result.contains("content-type"));
    }

    #[test]
    fn put_references_payload_file() {
        let plan = plan(
            "PUT",
            "https://management.core.windows.net/sub1/cloudservices/svc1/resources/ns/t/r1",
            Some(b"<Resource/>"),
        );
        let result = format_curl(
            &plan,
            Path::new("/certs/my/alpha.pem"),
            Some(Path::new("r1.xml")),
        );
        assert!(result.contains("-X PUT"));
        assert!(result.contains("-H 'content-type: application/xml'"));
        assert!(result.contains("--data-binary '@r1.xml'"));
        assert!(!result.contains("<Resource/>"));
    }

    #[test]
    fn inline_body_quotes_are_escaped() {
        let plan = plan(
            "PUT",
            "https://management.core.windows.net/sub1/cloudservices/svc1/resources/ns/t/r1",
            Some(b"<Name>it's</Name>"),
        );
        let result = format_curl(&plan, Path::new("alpha.pem"), None);
        assert!(result.contains(r"--data-binary '<Name>it'\''s</Name>'"));
    }

    #[test]
    fn quotes_in_url_and_paths_are_escaped() {
        let delete = plan(
            "DELETE",
            "https://management.core.windows.net/sub1/cloudservices/svc1/resources/ns/t/it's",
            None,
        );
        let result = format_curl(&delete, Path::new("/certs/o'neil.pem"), None);
        assert!(result.contains(r"'https://management.core.windows.net/sub1/cloudservices/svc1/resources/ns/t/it'\''s'"));
        assert!(result.contains(r"--cert '/certs/o'\''neil.pem'"));

        let put = plan("PUT", "https://management.core.windows.net/r", Some(b"<a/>"));
        let result = format_curl(
            &put,
            Path::new("alpha.pem"),
            Some(Path::new("it's.xml")),
        );
        assert!(result.contains(r"--data-binary '@it'\''s.xml'"));
    }
}
