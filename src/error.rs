use miette::Diagnostic;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when interacting with the FreeAgent API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("error making request: {0:?}")]
    #[diagnostic(
        code(freeagent_rs::request_error),
        help("Check your network connection and that the FreeAgent API is reachable")
    )]
    Request(#[source] reqwest::Error),

    /// The server rejected the credentials (401/403).
    #[error("authentication failed with status {status} (url: {url})")]
    #[diagnostic(
        code(freeagent_rs::authentication),
        help("Check your email and password, and ensure Settings -> API access is enabled for the account")
    )]
    Authentication { status: StatusCode, url: String },

    /// A successful response carried the wrong content type, which usually
    /// means the configured domain points somewhere that is not the API.
    #[error("expected a {expected} response but got {content_type:?} (url: {url})")]
    #[diagnostic(
        code(freeagent_rs::response_format),
        help("The response was not in the requested data format; check the configured domain and endpoint")
    )]
    ResponseFormat {
        expected: &'static str,
        content_type: String,
        url: String,
    },

    /// Any other non-2xx response. Never retried.
    #[error("unexpected response status {status} (url: {url})")]
    #[diagnostic(
        code(freeagent_rs::response),
        help("The API rejected the request; inspect the response body for details")
    )]
    Response {
        status: StatusCode,
        url: String,
        body: Option<String>,
    },

    #[error("error parsing XML response: {0}")]
    #[diagnostic(
        code(freeagent_rs::xml),
        help("The API returned XML this client could not parse")
    )]
    Xml(#[source] quick_xml::Error),

    #[error("error decoding JSON response: {0}")]
    #[diagnostic(
        code(freeagent_rs::json),
        help("The API returned JSON this client could not parse")
    )]
    Json(#[source] serde_json::Error),

    #[error("error writing CSV output: {0}")]
    #[diagnostic(code(freeagent_rs::csv))]
    Csv(#[source] csv::Error),

    #[error("response contained no root element")]
    #[diagnostic(
        code(freeagent_rs::empty_document),
        help("The response body was empty or held no XML element")
    )]
    EmptyDocument,

    #[error("endpoint could not be parsed as a URL")]
    #[diagnostic(
        code(freeagent_rs::invalid_endpoint),
        help("Check that the domain and endpoint path are correctly formatted")
    )]
    InvalidEndpoint,

    #[error("invalid date {value:?}")]
    #[diagnostic(
        code(freeagent_rs::invalid_date),
        help("Dates must be given as YYYY-MM-DD")
    )]
    InvalidDate { value: String },

    /// A record lacked a field its resource schema requires.
    #[error("{entity} record is missing required field {field:?}")]
    #[diagnostic(
        code(freeagent_rs::missing_field),
        help("The API omitted a field this client requires; the record may be malformed")
    )]
    MissingField { entity: String, field: String },

    /// A field failed its resource schema's typed parse.
    #[error("{entity} field {field:?} has invalid value {value:?}: {reason}")]
    #[diagnostic(
        code(freeagent_rs::invalid_field),
        help("The field's text did not parse as the type the resource schema declares")
    )]
    InvalidField {
        entity: String,
        field: String,
        value: String,
        reason: String,
    },

    /// A foreign-key lookup failed: the referenced id is absent from the
    /// secondary collection.
    #[error("no {collection} entry with id {value:?} (referenced by field {field:?})")]
    #[diagnostic(
        code(freeagent_rs::missing_reference),
        help("The referenced record was not returned by the API; it may lie outside the fetched view or have been deleted")
    )]
    MissingReference {
        collection: String,
        field: String,
        value: String,
    },
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

/// Type alias for results from this crate.
pub type Result<O> = std::result::Result<O, Error>;
