//! Structure-preserving XML parse and the flat record projection.
//!
//! [`Element`] keeps the full shape of a response: name, attributes, text,
//! and ordered children. [`Record`] is the flat tag -> text view every
//! mostly-flat resource is read through. The projection intentionally
//! collapses nested repeated siblings (last occurrence wins); resources
//! that carry real nesting, such as invoice items, read the element tree
//! directly instead.

use std::collections::HashMap;
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rust_decimal::Decimal;
use time::Date;

use crate::error::{Error, Result};
use crate::utils::date::parse_iso_date;

/// One parsed XML element.
///
/// Attribute type hints (`type="integer"` and friends) are kept here even
/// though [`Record`] ignores them; typed access goes through the
/// per-resource schemas instead of attribute sniffing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a full XML document into its root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        let text = text.unescape().map_err(quick_xml::Error::from)?;
                        current.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(element),
                            None => return Ok(element),
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Err(Error::EmptyDocument)
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut element = Self::new(name);
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    /// Build an element tree from a JSON value, so the JSON data format
    /// flows through the same collection and schema code as XML.
    /// FreeAgent wraps collections in the pluralised element name, so array
    /// items take the container key with its trailing `s` stripped.
    #[must_use]
    pub fn from_json(name: &str, value: &serde_json::Value) -> Self {
        use serde_json::Value;

        let mut element = Self::new(name);
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if let Value::Array(items) = child {
                        let item_name = key.strip_suffix('s').unwrap_or(key.as_str());
                        for item in items {
                            element.children.push(Self::from_json(item_name, item));
                        }
                    } else {
                        element.children.push(Self::from_json(key, child));
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    element.children.push(Self::from_json(name, item));
                }
            }
            Value::Null => {}
            Value::String(text) => element.text.clone_from(text),
            other => element.text = other.to_string(),
        }
        element
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Flatten into a [`Record`]: one entry per child tag mapped to its
    /// text. A child that itself has children contributes only the leaf
    /// tag/text pairs met in traversal, without grouping, so repeated
    /// nested tags collapse to their last occurrence. An element without
    /// children projects to `{tag: text}` for itself.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::default();
        if self.children.is_empty() {
            record.insert(self.name.clone(), self.text.clone());
        } else {
            for child in &self.children {
                child.collect_leaves(&mut record);
            }
        }
        record
    }

    fn collect_leaves(&self, record: &mut Record) {
        if self.children.is_empty() {
            record.insert(self.name.clone(), self.text.clone());
        } else {
            for child in &self.children {
                child.collect_leaves(record);
            }
        }
    }
}

/// A flat mapping from field name to text value. All values are strings;
/// the API's attribute type hints are ignored here and typed access goes
/// through the schema helpers, which parse eagerly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The flat view of an element's direct leaf children only. Used by
    /// resources that handle their nested children separately, so nested
    /// leaf values cannot shadow top-level fields.
    #[must_use]
    pub fn from_leaf_children(element: &Element) -> Self {
        element
            .children
            .iter()
            .filter(|child| child.is_leaf())
            .map(|child| (child.name.clone(), child.text.clone()))
            .collect()
    }

    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.fields.insert(field.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }

    /// An optional field. The API encodes absent values as empty elements,
    /// so empty text reads as `None`.
    #[must_use]
    pub fn optional(&self, field: &str) -> Option<String> {
        self.fields.get(field).filter(|v| !v.is_empty()).cloned()
    }

    pub fn require(&self, entity: &str, field: &str) -> Result<String> {
        self.optional(field).ok_or_else(|| Error::MissingField {
            entity: entity.to_string(),
            field: field.to_string(),
        })
    }

    pub fn integer(&self, entity: &str, field: &str) -> Result<u64> {
        let value = self.require(entity, field)?;
        parse_field(entity, field, &value, "expected an integer")
    }

    pub fn integer_opt(&self, entity: &str, field: &str) -> Result<Option<u64>> {
        self.optional(field)
            .map(|value| parse_field(entity, field, &value, "expected an integer"))
            .transpose()
    }

    pub fn decimal(&self, entity: &str, field: &str) -> Result<Decimal> {
        let value = self.require(entity, field)?;
        parse_field(entity, field, &value, "expected a decimal")
    }

    pub fn decimal_opt(&self, entity: &str, field: &str) -> Result<Option<Decimal>> {
        self.optional(field)
            .map(|value| parse_field(entity, field, &value, "expected a decimal"))
            .transpose()
    }

    /// An optional date field. Datetime values are accepted; only the
    /// leading `YYYY-MM-DD` is read.
    pub fn date_opt(&self, entity: &str, field: &str) -> Result<Option<Date>> {
        let Some(value) = self.optional(field) else {
            return Ok(None);
        };
        let day = value.get(..10).unwrap_or(&value);
        match parse_iso_date(day) {
            Ok(date) => Ok(Some(date)),
            Err(_) => Err(Error::InvalidField {
                entity: entity.to_string(),
                field: field.to_string(),
                value,
                reason: "expected an ISO8601 date".to_string(),
            }),
        }
    }

    pub fn boolean_opt(&self, entity: &str, field: &str) -> Result<Option<bool>> {
        match self.optional(field).as_deref() {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(other) => Err(Error::InvalidField {
                entity: entity.to_string(),
                field: field.to_string(),
                value: other.to_string(),
                reason: "expected true or false".to_string(),
            }),
        }
    }
}

fn parse_field<T: FromStr>(
    entity: &str,
    field: &str,
    value: &str,
    reason: &str,
) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidField {
        entity: entity.to_string(),
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    })
}

impl FromIterator<(String, String)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Conversion from a flat [`Record`] into a typed resource struct, parsing
/// the resource's schema eagerly.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self>;
}
