//! Client for the cloud service management endpoint
//!
//! Every request goes to
//! `<management-url>/<subscription>/cloudservices/<service>[/resources/<ns>/<type>/<name>[/SsoToken]]`,
//! carries the pinned `x-ms-version` header, and is sent over a connection
//! authenticated with the resolved client certificate. One request per call,
//! awaited until the full body has arrived; nothing is retried.

use reqwest::{Client as HttpClient, Method, StatusCode};
use tracing::{debug, info, trace};
use url::Url;
use xmltree::Element;

use crate::credential::ClientIdentity;
use crate::error::{DevSvcError, Result};
use crate::operation::{Request, ResourceAddress, ResourcePayload, ServiceAddress};
use crate::xml;

/// Protocol version header required by the management API
pub const API_VERSION_HEADER: &str = "x-ms-version";

/// Pinned protocol version
pub const API_VERSION: &str = "2014-12-01";

/// User agent string for devsvc HTTP requests
const DEVSVC_USER_AGENT: &str = concat!("devsvc/", env!("CARGO_PKG_VERSION"));

const CONTENT_TYPE_HEADER: &str = "content-type";
const XML_CONTENT_TYPE: &str = "application/xml";
const SSO_TOKEN_SEGMENT: &str = "SsoToken";

/// Status and parsed body of a management API response
///
/// The status is reported as received; a non-2xx status is not an error
/// here, the body may well be an error document worth showing.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// `None` when the server sent no content
    pub body: Option<Element>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// `"200 OK"` style rendering of the status
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => self.status.as_u16().to_string(),
        }
    }
}

/// Everything needed to put one request on the wire
#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Option<Vec<u8>>,
}

pub struct ResourceClientBuilder {
    base_url: Url,
    identity: ClientIdentity,
}

impl ResourceClientBuilder {
    pub fn new(base_url: impl AsRef<str>, identity: ClientIdentity) -> Result<Self> {
        Ok(Self::from_url(Url::parse(base_url.as_ref())?, identity))
    }

    pub fn from_url(base_url: Url, identity: ClientIdentity) -> Self {
        Self { base_url, identity }
    }

    pub fn build(self) -> Result<ResourceClient> {
        if self.base_url.cannot_be_a_base() {
            return Err(DevSvcError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        debug!(
            "Building management client for {} with certificate {}",
            self.base_url,
            self.identity.thumbprint()
        );
        let http = HttpClient::builder()
            .user_agent(DEVSVC_USER_AGENT)
            .identity(self.identity.into_identity())
            .build()?;

        Ok(ResourceClient {
            base_url: self.base_url,
            http,
        })
    }
}

/// Client for dev service resources of one management endpoint
pub struct ResourceClient {
    base_url: Url,
    http: HttpClient,
}

impl ResourceClient {
    pub fn builder(
        base_url: impl AsRef<str>,
        identity: ClientIdentity,
    ) -> Result<ResourceClientBuilder> {
        ResourceClientBuilder::new(base_url, identity)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run one operation
    pub async fn execute(&self, request: Request) -> Result<ApiResponse> {
        match request {
            Request::DescribeService(service) => self.describe_service(&service).await,
            Request::GetResource(address) => self.get_resource(&address).await,
            Request::Update(address, payload) => self.update(&address, payload).await,
            Request::Delete(address) => self.delete(&address).await,
            Request::IssueSsoToken(address) => self.issue_sso_token(&address).await,
        }
    }

    /// GET the cloud service document with all attached resources
    pub async fn describe_service(&self, service: &ServiceAddress) -> Result<ApiResponse> {
        let url = self.build_url(&service.segments())?;
        self.send(request_plan(Method::GET, url, None)).await
    }

    /// Fetch the cloud service document and extract the named resource
    ///
    /// When several resources share the name, the first one in document
    /// order wins. A non-2xx describe response is returned as received,
    /// error document included.
    pub async fn get_resource(&self, address: &ResourceAddress) -> Result<ApiResponse> {
        let response = self.describe_service(&address.service).await?;
        if !response.is_success() {
            return Ok(response);
        }
        let document = response
            .body
            .ok_or_else(|| DevSvcError::ResourceNotFound {
                name: address.name.clone(),
            })?;
        let resource = xml::extract_resource(&document, &address.name)?;
        Ok(ApiResponse {
            status: response.status,
            body: Some(resource),
        })
    }

    /// PUT the payload as the new resource definition
    pub async fn update(
        &self,
        address: &ResourceAddress,
        payload: ResourcePayload,
    ) -> Result<ApiResponse> {
        let url = self.build_url(&address.segments())?;
        self.send(request_plan(Method::PUT, url, Some(payload))).await
    }

    pub async fn delete(&self, address: &ResourceAddress) -> Result<ApiResponse> {
        let url = self.build_url(&address.segments())?;
        self.send(request_plan(Method::DELETE, url, None)).await
    }

    /// POST for a single sign-on token
    ///
    /// The URI inside the response is URL-encoded; see [`xml::sso_uri`] and
    /// [`xml::decode_sso_uri`].
    pub async fn issue_sso_token(&self, address: &ResourceAddress) -> Result<ApiResponse> {
        let url = self.build_url(&sso_segments(address))?;
        self.send(request_plan(Method::POST, url, None)).await
    }

    /// The request an operation would send, without sending it
    ///
    /// For `GetResource` this is the describe request it delegates to.
    pub fn plan(&self, request: &Request) -> Result<RequestPlan> {
        Ok(match request {
            Request::DescribeService(service) => {
                request_plan(Method::GET, self.build_url(&service.segments())?, None)
            }
            Request::GetResource(address) => {
                request_plan(Method::GET, self.build_url(&address.service.segments())?, None)
            }
            Request::Update(address, payload) => request_plan(
                Method::PUT,
                self.build_url(&address.segments())?,
                Some(payload.clone()),
            ),
            Request::Delete(address) => {
                request_plan(Method::DELETE, self.build_url(&address.segments())?, None)
            }
            Request::IssueSsoToken(address) => {
                request_plan(Method::POST, self.build_url(&sso_segments(address))?, None)
            }
        })
    }

    fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| DevSvcError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, plan: RequestPlan) -> Result<ApiResponse> {
        debug!("{} {}", plan.method, plan.url);

        let mut request = self.http.request(plan.method, plan.url);
        for (name, value) in plan.headers {
            request = request.header(name, value);
        }
        if let Some(body) = plan.body {
            trace!("Request body: {} bytes", body.len());
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        info!("Status Code: {}", status);

        let bytes = response.bytes().await?;
        trace!("Response body: {}", String::from_utf8_lossy(&bytes));

        Ok(ApiResponse {
            status,
            body: xml::parse_body(&bytes)?,
        })
    }
}

fn sso_segments(address: &ResourceAddress) -> Vec<&str> {
    let mut segments = address.segments();
    segments.push(SSO_TOKEN_SEGMENT);
    segments
}

fn request_plan(method: Method, url: Url, payload: Option<ResourcePayload>) -> RequestPlan {
    let mut headers = vec![(API_VERSION_HEADER, API_VERSION)];
    if payload.is_some() {
        headers.push((CONTENT_TYPE_HEADER, XML_CONTENT_TYPE));
    }
    RequestPlan {
        method,
        url,
        headers,
        body: payload.map(ResourcePayload::into_bytes),
    }
}
