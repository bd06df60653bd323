//! CSW 2.0.2 catalogue harvesting.
//!
//! [`harvest_all`] pages through GetRecords summaries; [`fetch_and_flatten`]
//! retrieves full ISO records and flattens them one by one.

mod client;
mod harvest;
mod query;

pub use client::{CatalogueClient, CswClient};
pub use harvest::{
    fetch_and_flatten, fetch_full_record, fetch_summary_page, harvest_all, parse_summary_page,
    RecordOutcome, SummaryPage, SummaryRecord,
};
pub use query::{FilterLanguage, RecordType, RecordsQuery};
