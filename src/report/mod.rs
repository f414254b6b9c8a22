//! Foreign-key joins and the tabular reports built from them.
//!
//! Rows whose references cannot be resolved are skipped with a warning and
//! counted on the report, rather than failing the whole run.

pub mod invoices;
pub mod timeslips;
