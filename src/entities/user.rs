use std::collections::HashMap;

use crate::client::Client;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::record::{FromRecord, Record};

pub(crate) const TAG: &str = "user";

/// A company user. The email address is the value reports join on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl FromRecord for User {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.integer(TAG, "id")?,
            email: record.require(TAG, "email")?,
            first_name: record.optional("first-name"),
            last_name: record.optional("last-name"),
        })
    }
}

/// Retrieve every company user, keyed by id.
#[instrument(skip(client))]
pub async fn list(client: &Client) -> Result<HashMap<String, User>> {
    let collection = client.get_keyed(Endpoint::Users, TAG).await?;
    collection.into_typed()
}
