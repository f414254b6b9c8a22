use std::collections::HashMap;

use rust_decimal::Decimal;
use time::Date;

use crate::client::Client;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::record::{Element, Record};
use crate::utils::date::DateRange;

pub(crate) const TAG: &str = "invoice";
const ITEMS_TAG: &str = "invoice-items";
const ITEM_TAG: &str = "invoice-item";

/// Status value of an invoice that has been settled.
pub const STATUS_PAID: &str = "Paid";
/// Item type for re-invoiced expenses, excluded from income totals.
pub const ITEM_TYPE_EXPENSES: &str = "Expenses";

/// One line item on an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceItem {
    pub item_type: Option<String>,
    pub price: Decimal,
    pub quantity: Option<Decimal>,
    pub description: Option<String>,
}

impl InvoiceItem {
    fn from_element(element: &Element) -> Result<Self> {
        let record = element.to_record();
        Ok(Self {
            item_type: record.optional("item-type"),
            price: record.decimal(ITEM_TAG, "price")?,
            quantity: record.decimal_opt(ITEM_TAG, "quantity")?,
            description: record.optional("description"),
        })
    }
}

/// An invoice with its nested line items.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: u64,
    /// The account's own invoice number.
    pub reference: Option<String>,
    pub dated_on: Option<Date>,
    pub contact_id: Option<u64>,
    pub project_id: Option<u64>,
    pub status: Option<String>,
    pub net_value: Decimal,
    pub total_value: Option<Decimal>,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status.as_deref() == Some(STATUS_PAID)
    }

    /// Parse from the element tree. Invoices are the one resource whose
    /// nesting matters, so the scalars are read from the direct leaf
    /// children and the items from the preserved `invoice-items` group
    /// rather than through the collapsing flat projection.
    pub fn from_element(element: &Element) -> Result<Self> {
        let record = Record::from_leaf_children(element);
        let items = element
            .children_named(ITEMS_TAG)
            .flat_map(|items| items.children_named(ITEM_TAG))
            .map(InvoiceItem::from_element)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: record.integer(TAG, "id")?,
            reference: record.optional("reference"),
            dated_on: record.date_opt(TAG, "dated-on")?,
            contact_id: record.integer_opt(TAG, "contact-id")?,
            project_id: record.integer_opt(TAG, "project-id")?,
            status: record.optional("status"),
            net_value: record.decimal(TAG, "net-value")?,
            total_value: record.decimal_opt(TAG, "total-value")?,
            items,
        })
    }
}

/// Retrieve the invoices dated within `range`, keyed by id.
#[instrument(skip(client))]
pub async fn list(client: &Client, range: DateRange) -> Result<HashMap<String, Invoice>> {
    let root = client.get_root(Endpoint::Invoices(range)).await?;
    let mut invoices = HashMap::new();
    for element in root.children_named(TAG) {
        let invoice = Invoice::from_element(element)?;
        if invoices.insert(invoice.id.to_string(), invoice).is_some() {
            debug!(tag = TAG, "duplicate invoice id, keeping the last record");
        }
    }
    Ok(invoices)
}

/// Download the PDF rendition of an invoice.
#[instrument(skip(client))]
pub async fn pdf(client: &Client, id: u64) -> Result<Vec<u8>> {
    client.get_bytes(Endpoint::InvoicePdf(id)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::date;

    const INVOICE_XML: &str = r#"<invoice>
      <id type="integer">1924153</id>
      <reference>2011-017</reference>
      <dated-on type="datetime">2011-08-15T00:00:00Z</dated-on>
      <contact-id type="integer">43868</contact-id>
      <project-id type="integer">25922</project-id>
      <status>Paid</status>
      <net-value type="decimal">100.0</net-value>
      <total-value type="decimal">100.0</total-value>
      <invoice-items type="array">
        <invoice-item>
          <item-type>Hours</item-type>
          <price type="decimal">80.0</price>
          <quantity type="decimal">4.0</quantity>
          <description>Consulting</description>
        </invoice-item>
        <invoice-item>
          <item-type>Expenses</item-type>
          <price type="decimal">20.0</price>
          <quantity type="decimal">1.0</quantity>
          <description>Hosting fees</description>
        </invoice-item>
      </invoice-items>
    </invoice>"#;

    #[test]
    fn nested_items_survive_the_parse() {
        let element = Element::parse(INVOICE_XML).unwrap();
        let invoice = Invoice::from_element(&element).unwrap();

        assert_eq!(invoice.id, 1_924_153);
        assert_eq!(invoice.reference.as_deref(), Some("2011-017"));
        assert_eq!(invoice.dated_on, Some(date!(2011 - 08 - 15)));
        assert_eq!(invoice.net_value, dec!(100.0));
        assert!(invoice.is_paid());

        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.items[0].item_type.as_deref(), Some("Hours"));
        assert_eq!(invoice.items[1].price, dec!(20.0));
        assert_eq!(
            invoice.items[1].description.as_deref(),
            Some("Hosting fees")
        );
    }

    #[test]
    fn an_invoice_without_items_parses_cleanly() {
        let xml = r#"<invoice>
          <id>7</id>
          <status>Draft</status>
          <net-value>50.0</net-value>
        </invoice>"#;
        let invoice = Invoice::from_element(&Element::parse(xml).unwrap()).unwrap();

        assert!(invoice.items.is_empty());
        assert!(!invoice.is_paid());
        assert_eq!(invoice.net_value, dec!(50.0));
    }
}
