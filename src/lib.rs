//! # freeagent-rs
//!
//! A Rust client library for the FreeAgent Central API, plus the report
//! tools built on it. The API speaks XML (JSON is available as an
//! alternate mode); responses are parsed into a structure-preserving
//! element tree with a flat record projection, then typed through
//! per-resource schemas and re-keyed by id for O(1) joins.
//!
//! ```ignore
//! let client = freeagent_rs::Client::new(
//!     "mycompany",
//!     freeagent_rs::Credentials::basic("me@mycompany.com", "secret"),
//! )?;
//!
//! let projects = client.projects().list().await?;
//! let timeslips = client.timeslips().list_year_to_date().await?;
//! for timeslip in timeslips.values() {
//!     let project = &projects[&timeslip.project_id.to_string()];
//!     println!("{} {} {}", timeslip.id, project.name, timeslip.hours);
//! }
//! ```
//!
//! Fetches are sequential and never retried; every failure surfaces to
//! the caller immediately, classified as an authentication failure, a
//! response-format mismatch (usually a wrong domain), or a generic
//! response error.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod collection;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod record;
pub mod report;
pub mod utils;

pub use client::{Client, Credentials, DataFormat};
pub use collection::KeyedCollection;
pub use endpoints::Endpoint;
pub use entities::{Contact, Invoice, InvoiceItem, Project, Task, Timeslip, User};
pub use error::{Error, Result};
pub use record::{Element, FromRecord, Record};
pub use utils::date::DateRange;
