use std::collections::HashMap;

use rust_decimal::Decimal;
use time::Date;

use crate::client::Client;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::record::{FromRecord, Record};

pub(crate) const TAG: &str = "project";

/// A project. Listed with `view=all` so inactive projects are present and
/// timeslip references always resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: u64,
    pub contact_id: Option<u64>,
    pub name: String,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub starts_on: Option<Date>,
    pub ends_on: Option<Date>,
    pub hours_per_day: Option<Decimal>,
    pub normal_billing_rate: Option<Decimal>,
    pub billing_period: Option<String>,
    pub budget: Option<u64>,
    pub budget_units: Option<String>,
}

impl FromRecord for Project {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.integer(TAG, "id")?,
            contact_id: record.integer_opt(TAG, "contact-id")?,
            name: record.require(TAG, "name")?,
            currency: record.optional("currency"),
            status: record.optional("status"),
            starts_on: record.date_opt(TAG, "starts-on")?,
            ends_on: record.date_opt(TAG, "ends-on")?,
            hours_per_day: record.decimal_opt(TAG, "hours-per-day")?,
            normal_billing_rate: record.decimal_opt(TAG, "normal-billing-rate")?,
            billing_period: record.optional("billing-period"),
            budget: record.integer_opt(TAG, "budget")?,
            budget_units: record.optional("budget-units"),
        })
    }
}

/// Retrieve every project, keyed by id.
#[instrument(skip(client))]
pub async fn list(client: &Client) -> Result<HashMap<String, Project>> {
    let collection = client.get_keyed(Endpoint::Projects, TAG).await?;
    collection.into_typed()
}
