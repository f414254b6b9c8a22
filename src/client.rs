use core::fmt;
use std::collections::HashMap;

use reqwest::{Method, RequestBuilder, StatusCode, header};
use url::Url;

use crate::collection::{DEFAULT_KEY_FIELD, KeyedCollection};
use crate::endpoints::{DEFAULT_HOST, Endpoint};
use crate::entities::{
    contact::{self, Contact},
    invoice::{self, Invoice},
    project::{self, Project},
    task::{self, Task},
    timeslip::{self, Timeslip},
    user::{self, User},
};
use crate::error::{Error, Result};
use crate::record::Element;
use crate::utils::date::DateRange;

/// The `User-Agent` header sent with every request.
pub const USER_AGENT: &str = concat!("freeagent-rs/", env!("CARGO_PKG_VERSION"));

/// The wire format requested from the API and enforced on responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    #[default]
    Xml,
    Json,
}

impl DataFormat {
    #[must_use]
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Xml => "application/xml",
            Self::Json => "application/json",
        }
    }
}

/// Account credentials: HTTP Basic (email and password) or a bearer token.
#[derive(Clone)]
pub enum Credentials {
    Basic { email: String, password: String },
    Bearer(String),
}

impl Credentials {
    pub fn basic(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { email, .. } => f
                .debug_struct("Basic")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// The client used for reading from the FreeAgent API. All configuration
/// is explicit: the account location, credentials, and data format are
/// fixed at construction. Requests are issued one at a time and never
/// retried; every failure surfaces to the caller immediately.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    format: DataFormat,
}

impl Client {
    /// Connect to the hosted account at `https://<domain>.freeagentcentral.com/`.
    pub fn new(domain: &str, credentials: Credentials) -> Result<Self> {
        let base_url = Url::parse(&format!("https://{domain}.{DEFAULT_HOST}/"))
            .map_err(|_| Error::InvalidEndpoint)?;
        Ok(Self::with_base_url(base_url, credentials))
    }

    /// Point the client at an explicit base URL instead of the hosted
    /// domain template.
    #[must_use]
    pub fn with_base_url(base_url: Url, credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            credentials,
            format: DataFormat::default(),
        }
    }

    /// Switch the requested wire format. XML is the default.
    #[must_use]
    pub fn data_format(mut self, format: DataFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn format(&self) -> DataFormat {
        self.format
    }

    fn build_request(&self, method: Method, url: Url) -> RequestBuilder {
        let media_type = self.format.media_type();
        let request = self
            .http
            .request(method, url)
            .header(header::ACCEPT, media_type)
            .header(header::CONTENT_TYPE, media_type)
            .header(header::USER_AGENT, USER_AGENT);
        match &self.credentials {
            Credentials::Basic { email, password } => request.basic_auth(email, Some(password)),
            Credentials::Bearer(token) => request.bearer_auth(token),
        }
    }

    /// Map response status onto the error kinds: 401/403 is an
    /// authentication failure, any other non-2xx a generic response error.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        let url = response.url().to_string();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication { status, url });
        }
        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(Error::Response { status, url, body });
        }
        Ok(response)
    }

    /// A successful response must carry the requested media type, else the
    /// configured domain is likely not an API host.
    fn check_media_type(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let expected = self.format.media_type();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if content_type.starts_with(expected) {
            Ok(response)
        } else {
            Err(Error::ResponseFormat {
                expected,
                content_type: content_type.to_string(),
                url: response.url().to_string(),
            })
        }
    }

    /// Perform a `GET` and parse the response into its root element.
    #[instrument(skip(self))]
    pub async fn get_root(&self, endpoint: Endpoint) -> Result<Element> {
        let url = endpoint.to_url(&self.base_url)?;
        trace!(%url, "making GET request");
        let response = self.build_request(Method::GET, url).send().await?;
        let response = Self::check_status(response).await?;
        let response = self.check_media_type(response)?;
        let text = response.text().await?;
        debug!(bytes = text.len(), "response body received");
        match self.format {
            DataFormat::Xml => Element::parse(&text),
            DataFormat::Json => {
                let value: serde_json::Value = serde_json::from_str(&text)?;
                Ok(Element::from_json("response", &value))
            }
        }
    }

    /// Fetch a resource collection and key it by the default `id` field.
    pub async fn get_keyed(&self, endpoint: Endpoint, tag: &str) -> Result<KeyedCollection> {
        self.get_keyed_by(endpoint, tag, DEFAULT_KEY_FIELD).await
    }

    /// Fetch a resource collection and key it by a configurable field.
    #[instrument(skip(self))]
    pub async fn get_keyed_by(
        &self,
        endpoint: Endpoint,
        tag: &str,
        key_field: &str,
    ) -> Result<KeyedCollection> {
        let root = self.get_root(endpoint).await?;
        KeyedCollection::from_element(&root, tag, key_field)
    }

    /// Perform a `GET` and return the raw body bytes. Used for invoice
    /// PDFs; only the status is checked, not the content type.
    #[instrument(skip(self))]
    pub async fn get_bytes(&self, endpoint: Endpoint) -> Result<Vec<u8>> {
        let url = endpoint.to_url(&self.base_url)?;
        trace!(%url, "making GET request for raw bytes");
        let response = self.build_request(Method::GET, url).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Access the projects API.
    #[must_use]
    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi { client: self }
    }

    /// Access the tasks API.
    #[must_use]
    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi { client: self }
    }

    /// Access the company users API.
    #[must_use]
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }

    /// Access the contacts API.
    #[must_use]
    pub fn contacts(&self) -> ContactsApi<'_> {
        ContactsApi { client: self }
    }

    /// Access the timeslips API.
    #[must_use]
    pub fn timeslips(&self) -> TimeslipsApi<'_> {
        TimeslipsApi { client: self }
    }

    /// Access the invoices API.
    #[must_use]
    pub fn invoices(&self) -> InvoicesApi<'_> {
        InvoicesApi { client: self }
    }
}

/// API handler for the projects endpoint.
#[derive(Debug)]
pub struct ProjectsApi<'a> {
    client: &'a Client,
}

impl ProjectsApi<'_> {
    /// Every project keyed by id, inactive ones included.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<HashMap<String, Project>> {
        project::list(self.client).await
    }
}

/// API handler for the tasks endpoint.
#[derive(Debug)]
pub struct TasksApi<'a> {
    client: &'a Client,
}

impl TasksApi<'_> {
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<HashMap<String, Task>> {
        task::list(self.client).await
    }
}

/// API handler for the company users endpoint.
#[derive(Debug)]
pub struct UsersApi<'a> {
    client: &'a Client,
}

impl UsersApi<'_> {
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<HashMap<String, User>> {
        user::list(self.client).await
    }
}

/// API handler for the contacts endpoint.
#[derive(Debug)]
pub struct ContactsApi<'a> {
    client: &'a Client,
}

impl ContactsApi<'_> {
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<HashMap<String, Contact>> {
        contact::list(self.client).await
    }
}

/// API handler for the timeslips endpoint.
#[derive(Debug)]
pub struct TimeslipsApi<'a> {
    client: &'a Client,
}

impl TimeslipsApi<'_> {
    /// Timeslips dated within the range, keyed by id.
    #[instrument(skip(self))]
    pub async fn list(&self, range: DateRange) -> Result<HashMap<String, Timeslip>> {
        timeslip::list(self.client, range).await
    }

    /// Timeslips from January 1st of the current year through today.
    #[instrument(skip(self))]
    pub async fn list_year_to_date(&self) -> Result<HashMap<String, Timeslip>> {
        self.list(DateRange::year_to_date()).await
    }
}

/// API handler for the invoices endpoint.
#[derive(Debug)]
pub struct InvoicesApi<'a> {
    client: &'a Client,
}

impl InvoicesApi<'_> {
    /// Invoices dated within the range, keyed by id, with their nested
    /// invoice items preserved.
    #[instrument(skip(self))]
    pub async fn list(&self, range: DateRange) -> Result<HashMap<String, Invoice>> {
        invoice::list(self.client, range).await
    }

    /// Invoices from January 1st of the current year through today.
    #[instrument(skip(self))]
    pub async fn list_year_to_date(&self) -> Result<HashMap<String, Invoice>> {
        self.list(DateRange::year_to_date()).await
    }

    /// Download the PDF rendition of an invoice.
    #[instrument(skip(self))]
    pub async fn pdf(&self, id: u64) -> Result<Vec<u8>> {
        invoice::pdf(self.client, id).await
    }
}
