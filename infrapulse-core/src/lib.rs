#![deny(missing_docs)]
//! InfraPulse core library.
//!
//! This crate contains the domain types, the weighted infrastructure health
//! scorer, and the inventory primitives shared by the InfraPulse server and CLI.

pub mod domain;
pub mod error;
pub mod inspector;
pub mod report;
pub mod scoring;
pub mod slug;
pub mod store;

pub use domain::{
    Client, DEFAULT_FORM_WEIGHT, DeviceCategory, DeviceForm, DeviceRecord, NewClient,
    SanityLevel, SanityRecord,
};
pub use error::{InfraPulseError, Result};
pub use inspector::InventoryInspector;
pub use report::{
    InfraReport, ReportRow, escape_html, render_json, render_report_html,
    render_report_markdown, render_report_text,
};
pub use scoring::{
    MAX_WEIGHT, MIN_WEIGHT, NO_DATA, clamp_weight, format_percent, infra_percent,
    rating_to_unit_score,
};
pub use slug::{disambiguate_slug, slugify};
pub use store::{InventoryStore, MemoryInventoryStore};
