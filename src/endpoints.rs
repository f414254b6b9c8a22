use std::fmt;

use url::Url;

use crate::error::{Error, Result};
use crate::utils::date::DateRange;

/// The hosted FreeAgent domain suffix; accounts live at
/// `https://<domain>.freeagentcentral.com/`.
pub const DEFAULT_HOST: &str = "freeagentcentral.com";

/// A typed representation of the API endpoints this client reads.
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// All projects, inactive included, so timeslip references resolve.
    Projects,
    Tasks,
    Users,
    Contacts,
    Timeslips(DateRange),
    Invoices(DateRange),
    /// The PDF rendition of one invoice.
    InvoicePdf(u64),

    /// An arbitrary path under the account root.
    Custom(Vec<String>),
}

impl Endpoint {
    fn path(&self) -> String {
        match self {
            Self::Projects => "projects?view=all".to_string(),
            Self::Tasks => "tasks".to_string(),
            Self::Users => "company/users".to_string(),
            Self::Contacts => "contacts".to_string(),
            Self::Timeslips(range) => format!("timeslips?view={}", range.view_parameter()),
            Self::Invoices(range) => format!("invoices?view={}", range.view_parameter()),
            Self::InvoicePdf(id) => format!("invoices/{id}.pdf"),
            Self::Custom(components) => components.join("/"),
        }
    }

    /// Resolve the endpoint against an account's base URL.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        base.join(&self.path()).map_err(|_| Error::InvalidEndpoint)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())
    }
}
