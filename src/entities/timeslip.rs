use std::collections::HashMap;

use rust_decimal::Decimal;
use time::Date;

use crate::client::Client;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::record::{FromRecord, Record};
use crate::utils::date::DateRange;

pub(crate) const TAG: &str = "timeslip";

/// One logged block of hours against a project, task, and user.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeslip {
    pub id: u64,
    /// The slip's date. The API returns a datetime; only the date part is
    /// meaningful.
    pub dated_on: Option<Date>,
    pub hours: Decimal,
    pub comment: Option<String>,
    pub user_id: u64,
    pub project_id: u64,
    pub task_id: u64,
    pub status: Option<String>,
    pub updated_at: Option<String>,
}

impl FromRecord for Timeslip {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.integer(TAG, "id")?,
            dated_on: record.date_opt(TAG, "dated-on")?,
            hours: record.decimal(TAG, "hours")?,
            comment: record.optional("comment"),
            user_id: record.integer(TAG, "user-id")?,
            project_id: record.integer(TAG, "project-id")?,
            task_id: record.integer(TAG, "task-id")?,
            status: record.optional("status"),
            updated_at: record.optional("updated-at"),
        })
    }
}

/// Retrieve the timeslips dated within `range`, keyed by id.
#[instrument(skip(client))]
pub async fn list(client: &Client, range: DateRange) -> Result<HashMap<String, Timeslip>> {
    let collection = client.get_keyed(Endpoint::Timeslips(range), TAG).await?;
    collection.into_typed()
}
