use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::client::Client;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::record::{FromRecord, Record};

pub(crate) const TAG: &str = "task";

/// A billable (or not) task within a project.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub project_id: Option<u64>,
    pub billing_rate: Option<Decimal>,
    pub billing_period: Option<String>,
    pub is_billable: Option<bool>,
    pub status: Option<String>,
}

impl FromRecord for Task {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.integer(TAG, "id")?,
            name: record.require(TAG, "name")?,
            project_id: record.integer_opt(TAG, "project-id")?,
            billing_rate: record.decimal_opt(TAG, "billing-rate")?,
            billing_period: record.optional("billing-period"),
            is_billable: record.boolean_opt(TAG, "is-billable")?,
            status: record.optional("status"),
        })
    }
}

/// Retrieve every task, keyed by id.
#[instrument(skip(client))]
pub async fn list(client: &Client) -> Result<HashMap<String, Task>> {
    let collection = client.get_keyed(Endpoint::Tasks, TAG).await?;
    collection.into_typed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Element;

    #[test]
    fn parses_the_documented_task_shape() {
        let xml = r#"<task>
          <billing-period>hour</billing-period>
          <billing-rate type="decimal">125.0</billing-rate>
          <id type="integer">20909</id>
          <is-billable type="boolean">true</is-billable>
          <name>Firewall over limit</name>
          <project-id type="integer">25922</project-id>
          <status>Active</status>
        </task>"#;
        let record = Element::parse(xml).unwrap().to_record();
        let task = Task::from_record(&record).unwrap();

        assert_eq!(task.id, 20909);
        assert_eq!(task.project_id, Some(25922));
        assert_eq!(task.is_billable, Some(true));
        assert_eq!(task.name, "Firewall over limit");
    }
}
