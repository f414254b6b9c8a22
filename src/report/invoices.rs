use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::entities::invoice::ITEM_TYPE_EXPENSES;
use crate::entities::{Contact, Invoice, Project};
use crate::error::Result;
use crate::utils::date::format_iso_date;

/// The fixed CSV header.
pub const CSV_FIELDS: [&str; 10] = [
    "invoice",
    "date",
    "contact",
    "project",
    "status",
    "net_value",
    "item_price",
    "item_type",
    "quantity",
    "description",
];

/// One CSV row per invoice item. Invoices without items contribute no
/// rows but still count toward the project totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub invoice: String,
    pub date: String,
    pub contact: String,
    pub project: String,
    pub status: String,
    pub net_value: Decimal,
    pub item_price: Decimal,
    pub item_type: String,
    pub quantity: String,
    pub description: String,
}

/// Money totals for one project, over Paid invoices only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectTotals {
    /// Gross: the summed net invoice values, expense items included.
    pub net_value: Decimal,
    /// Income: net values minus re-invoiced "Expenses" item prices.
    pub income: Decimal,
}

#[derive(Debug, Default)]
pub struct Report {
    pub rows: Vec<Row>,
    pub totals: BTreeMap<String, ProjectTotals>,
    /// Invoices dropped because a referenced project or contact was
    /// absent from the fetched collections.
    pub skipped: usize,
}

/// Join invoices against projects and contacts, one row per line item,
/// accumulating per-project totals over Paid invoices.
#[must_use]
pub fn build(
    invoices: &HashMap<String, Invoice>,
    projects: &HashMap<String, Project>,
    contacts: &HashMap<String, Contact>,
) -> Report {
    let mut report = Report::default();
    for invoice in invoices.values() {
        let Some(project) = invoice
            .project_id
            .and_then(|id| projects.get(&id.to_string()))
        else {
            warn!(
                invoice = invoice.id,
                project_id = invoice.project_id,
                "skipping invoice with unknown project"
            );
            report.skipped += 1;
            continue;
        };
        let Some(contact) = invoice
            .contact_id
            .and_then(|id| contacts.get(&id.to_string()))
        else {
            warn!(
                invoice = invoice.id,
                contact_id = invoice.contact_id,
                "skipping invoice with unknown contact"
            );
            report.skipped += 1;
            continue;
        };

        if invoice.is_paid() {
            let totals = report.totals.entry(project.name.clone()).or_default();
            totals.net_value += invoice.net_value;
            totals.income += invoice.net_value;
        }

        let date = invoice.dated_on.map(format_iso_date).unwrap_or_default();
        for item in &invoice.items {
            if invoice.is_paid() && item.item_type.as_deref() == Some(ITEM_TYPE_EXPENSES) {
                if let Some(totals) = report.totals.get_mut(&project.name) {
                    totals.income -= item.price;
                }
            }
            report.rows.push(Row {
                invoice: invoice.reference.clone().unwrap_or_default(),
                date: date.clone(),
                contact: contact.display_name(),
                project: project.name.clone(),
                status: invoice.status.clone().unwrap_or_default(),
                net_value: invoice.net_value,
                item_price: item.price,
                item_type: item.item_type.clone().unwrap_or_default(),
                quantity: item
                    .quantity
                    .map(|quantity| quantity.to_string())
                    .unwrap_or_default(),
                description: item.description.clone().unwrap_or_default(),
            });
        }
    }
    report
        .rows
        .sort_by(|a, b| (&a.date, &a.invoice).cmp(&(&b.date, &b.invoice)));
    report
}

/// Write the rows as CSV with the fixed header.
pub fn write_csv<W: Write>(rows: &[Row], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(CSV_FIELDS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::InvoiceItem;
    use rust_decimal_macros::dec;
    use time::macros::date;

    fn project(id: u64, name: &str) -> Project {
        Project {
            id,
            contact_id: None,
            name: name.to_string(),
            currency: None,
            status: None,
            starts_on: None,
            ends_on: None,
            hours_per_day: None,
            normal_billing_rate: None,
            billing_period: None,
            budget: None,
            budget_units: None,
        }
    }

    fn contact(id: u64, organisation: &str) -> Contact {
        Contact {
            id,
            organisation_name: Some(organisation.to_string()),
            first_name: None,
            last_name: None,
            email: None,
        }
    }

    fn paid_invoice(id: u64, net_value: Decimal, items: Vec<InvoiceItem>) -> Invoice {
        Invoice {
            id,
            reference: Some(format!("2011-{id:03}")),
            dated_on: Some(date!(2011 - 08 - 15)),
            contact_id: Some(40),
            project_id: Some(1),
            status: Some("Paid".to_string()),
            net_value,
            total_value: None,
            items,
        }
    }

    fn expenses_item(price: Decimal) -> InvoiceItem {
        InvoiceItem {
            item_type: Some("Expenses".to_string()),
            price,
            quantity: Some(dec!(1.0)),
            description: Some("Hosting fees".to_string()),
        }
    }

    #[test]
    fn expenses_reduce_income_but_not_gross() {
        let projects = HashMap::from([("1".to_string(), project(1, "Acme Site"))]);
        let contacts = HashMap::from([("40".to_string(), contact(40, "Acme Corp"))]);
        let invoices = HashMap::from([(
            "7".to_string(),
            paid_invoice(7, dec!(100.0), vec![expenses_item(dec!(20.0))]),
        )]);

        let report = build(&invoices, &projects, &contacts);

        let totals = report.totals["Acme Site"];
        assert_eq!(totals.income, dec!(80.0));
        assert_eq!(totals.net_value, dec!(100.0));
    }

    #[test]
    fn unpaid_invoices_are_listed_but_not_totalled() {
        let projects = HashMap::from([("1".to_string(), project(1, "Acme Site"))]);
        let contacts = HashMap::from([("40".to_string(), contact(40, "Acme Corp"))]);
        let mut invoice = paid_invoice(8, dec!(50.0), vec![expenses_item(dec!(5.0))]);
        invoice.status = Some("Draft".to_string());
        let invoices = HashMap::from([("8".to_string(), invoice)]);

        let report = build(&invoices, &projects, &contacts);

        assert_eq!(report.rows.len(), 1);
        assert!(report.totals.is_empty());
    }

    #[test]
    fn each_item_gets_its_own_row() {
        let projects = HashMap::from([("1".to_string(), project(1, "Acme Site"))]);
        let contacts = HashMap::from([("40".to_string(), contact(40, "Acme Corp"))]);
        let items = vec![
            InvoiceItem {
                item_type: Some("Hours".to_string()),
                price: dec!(80.0),
                quantity: Some(dec!(4.0)),
                description: Some("Consulting".to_string()),
            },
            expenses_item(dec!(20.0)),
        ];
        let invoices =
            HashMap::from([("7".to_string(), paid_invoice(7, dec!(100.0), items))]);

        let report = build(&invoices, &projects, &contacts);

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].contact, "Acme Corp");
        assert_eq!(report.rows[0].net_value, dec!(100.0));
        assert_eq!(report.totals["Acme Site"].income, dec!(80.0));
    }

    #[test]
    fn dangling_project_references_skip_the_invoice() {
        let projects = HashMap::new();
        let contacts = HashMap::from([("40".to_string(), contact(40, "Acme Corp"))]);
        let invoices = HashMap::from([(
            "7".to_string(),
            paid_invoice(7, dec!(100.0), vec![expenses_item(dec!(20.0))]),
        )]);

        let report = build(&invoices, &projects, &contacts);

        assert_eq!(report.rows.len(), 0);
        assert_eq!(report.skipped, 1);
        assert!(report.totals.is_empty());
    }
}
