//! Keyed resource collections: id -> record maps with O(1) lookups.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::record::{Element, FromRecord, Record};

/// The key field used when none is configured.
pub const DEFAULT_KEY_FIELD: &str = "id";

/// A resource collection re-keyed by an identifier field.
///
/// Identifiers are unique within one fetch; if the API ever repeats one,
/// the last record wins and the duplicate is logged at debug level.
#[derive(Debug, Clone, Default)]
pub struct KeyedCollection {
    records: HashMap<String, Record>,
}

impl KeyedCollection {
    /// Collect the direct children of `root` matching `tag`, flatten each,
    /// and key the result by `key_field`.
    pub fn from_element(root: &Element, tag: &str, key_field: &str) -> Result<Self> {
        let mut records = HashMap::new();
        for element in root.children_named(tag) {
            let record = element.to_record();
            let key = record.require(tag, key_field)?;
            if records.insert(key.clone(), record).is_some() {
                debug!(tag, %key, "duplicate key in collection, keeping the last record");
            }
        }
        Ok(Self { records })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.records
            .iter()
            .map(|(id, record)| (id.as_str(), record))
    }

    pub fn values(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Follow a foreign-key field of `record` into this collection.
    /// `collection` names this collection for the error report.
    pub fn resolve(&self, record: &Record, field: &str, collection: &str) -> Result<&Record> {
        let value = record.require(collection, field)?;
        self.records.get(&value).ok_or_else(|| Error::MissingReference {
            collection: collection.to_string(),
            field: field.to_string(),
            value,
        })
    }

    /// Convert every record through its resource schema, keeping the keys.
    pub fn into_typed<T: FromRecord>(self) -> Result<HashMap<String, T>> {
        self.records
            .into_iter()
            .map(|(id, record)| Ok((id, T::from_record(&record)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projects(xml: &str) -> Result<KeyedCollection> {
        let root = Element::parse(xml)?;
        KeyedCollection::from_element(&root, "project", DEFAULT_KEY_FIELD)
    }

    #[test]
    fn distinct_ids_yield_one_entry_each() {
        let collection = projects(
            "<projects>
               <project><id>1</id><name>Acme Site</name></project>
               <project><id>2</id><name>Retainer</name></project>
             </projects>",
        )
        .unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get("1").unwrap().get("name"), Some("Acme Site"));
        assert_eq!(collection.get("2").unwrap().get("name"), Some("Retainer"));
    }

    #[test]
    fn duplicate_ids_keep_the_last_record() {
        let collection = projects(
            "<projects>
               <project><id>1</id><name>First</name></project>
               <project><id>1</id><name>Second</name></project>
             </projects>",
        )
        .unwrap();

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("1").unwrap().get("name"), Some("Second"));
    }

    #[test]
    fn a_record_without_the_key_field_fails() {
        match projects("<projects><project><name>No id</name></project></projects>") {
            Err(Error::MissingField { entity, field }) => {
                assert_eq!(entity, "project");
                assert_eq!(field, "id");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn alternate_key_fields_are_supported() {
        let root = Element::parse(
            "<users>
               <user><id>7</id><email>a@b.com</email></user>
             </users>",
        )
        .unwrap();
        let collection = KeyedCollection::from_element(&root, "user", "email").unwrap();

        assert!(collection.contains("a@b.com"));
    }

    #[test]
    fn resolve_follows_foreign_keys_and_reports_misses() {
        let projects = projects(
            "<projects><project><id>1</id><name>Acme Site</name></project></projects>",
        )
        .unwrap();
        let root = Element::parse(
            "<timeslips>
               <timeslip><id>9</id><project-id>1</project-id></timeslip>
               <timeslip><id>10</id><project-id>99</project-id></timeslip>
             </timeslips>",
        )
        .unwrap();
        let timeslips =
            KeyedCollection::from_element(&root, "timeslip", DEFAULT_KEY_FIELD).unwrap();

        let hit = projects
            .resolve(timeslips.get("9").unwrap(), "project-id", "projects")
            .unwrap();
        assert_eq!(hit.get("name"), Some("Acme Site"));

        match projects.resolve(timeslips.get("10").unwrap(), "project-id", "projects") {
            Err(Error::MissingReference { collection, field, value }) => {
                assert_eq!(collection, "projects");
                assert_eq!(field, "project-id");
                assert_eq!(value, "99");
            }
            other => panic!("expected MissingReference, got {other:?}"),
        }
    }
}
