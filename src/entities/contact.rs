use std::collections::HashMap;

use crate::client::Client;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::record::{FromRecord, Record};

pub(crate) const TAG: &str = "contact";

/// An invoicing contact. Individuals may have no organisation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: u64,
    pub organisation_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    /// The name reports print: the organisation when present, otherwise
    /// the contact person's name.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(organisation) = &self.organisation_name {
            return organisation.clone();
        }
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.id.to_string()
        } else {
            name
        }
    }
}

impl FromRecord for Contact {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.integer(TAG, "id")?,
            organisation_name: record.optional("organisation-name"),
            first_name: record.optional("first-name"),
            last_name: record.optional("last-name"),
            email: record.optional("email"),
        })
    }
}

/// Retrieve every contact, keyed by id.
#[instrument(skip(client))]
pub async fn list(client: &Client) -> Result<HashMap<String, Contact>> {
    let collection = client.get_keyed(Endpoint::Contacts, TAG).await?;
    collection.into_typed()
}
