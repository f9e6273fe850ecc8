//! Client resolution, device editing, and scoring on top of an inventory store.

use crate::domain::{Client, DeviceCategory, DeviceForm, DeviceRecord, NewClient, SanityRecord};
use crate::error::{InfraPulseError, Result};
use crate::report::{InfraReport, ReportRow};
use crate::scoring::infra_percent;
use crate::slug::{disambiguate_slug, slugify};
use crate::store::InventoryStore;

/// Slug used when a client name has no usable characters.
const FALLBACK_SLUG: &str = "client";

/// Reads and writes client inventory through an [`InventoryStore`].
pub struct InventoryInspector<S: InventoryStore> {
    store: S,
}

impl<S: InventoryStore> InventoryInspector<S> {
    /// Create an inspector over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// List all clients, newest first.
    pub fn list_clients(&self) -> Result<Vec<Client>> {
        self.store.list_clients()
    }

    /// Resolve a client from its slug.
    pub fn resolve_client(&self, slug: &str) -> Result<Client> {
        self.store
            .find_client_by_slug(slug)?
            .ok_or_else(|| InfraPulseError::NotFound(format!("client not found for slug: {slug}")))
    }

    /// Create a client, suffixing the slug with timestamp digits when it is taken.
    pub fn create_client(&self, name: &str, millis: u128) -> Result<Client> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InfraPulseError::InvalidInput("name is required".to_string()));
        }
        let mut base = slugify(name);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }
        let slug = if self.store.find_client_by_slug(&base)?.is_some() {
            disambiguate_slug(&base, millis)
        } else {
            base
        };
        self.store.insert_client(NewClient {
            name: name.to_string(),
            slug,
        })
    }

    /// Load the edit form for a device category, using defaults when nothing is stored.
    pub fn device_form(&self, client_id: &str, category: DeviceCategory) -> Result<DeviceForm> {
        Ok(self
            .store
            .load_device(client_id, category)?
            .map(|record| DeviceForm::from_record(&record))
            .unwrap_or_default())
    }

    /// Persist a device form, replacing any existing row for the category.
    pub fn save_device(
        &self,
        client_id: &str,
        category: DeviceCategory,
        form: &DeviceForm,
    ) -> Result<DeviceRecord> {
        self.store.upsert_device(client_id, category, form)
    }

    /// Sanity projections for every recorded category of a client.
    pub fn sanity_records(&self, client_id: &str) -> Result<Vec<SanityRecord>> {
        let mut records = Vec::new();
        for category in DeviceCategory::ALL {
            if let Some(device) = self.store.load_device(client_id, category)? {
                records.push(device.sanity_record());
            }
        }
        Ok(records)
    }

    /// Weighted infrastructure percentage for a client, `None` when nothing is recorded.
    pub fn client_percent(&self, client_id: &str) -> Result<Option<u8>> {
        let records = self.sanity_records(client_id)?;
        Ok(infra_percent(&records))
    }

    /// Build the printable infrastructure report for a client.
    pub fn build_report(&self, client: &Client, generated_at: String) -> Result<InfraReport> {
        let firewall = self.store.load_device(&client.id, DeviceCategory::Firewall)?;
        let switches = self.store.load_device(&client.id, DeviceCategory::Switches)?;
        let records: Vec<SanityRecord> = [firewall.as_ref(), switches.as_ref()]
            .into_iter()
            .flatten()
            .map(DeviceRecord::sanity_record)
            .collect();

        let rows = vec![
            ReportRow::from_device(DeviceCategory::Switches, switches.as_ref()),
            ReportRow::from_device(DeviceCategory::Firewall, firewall.as_ref()),
        ];

        Ok(InfraReport {
            client_name: client.name.clone(),
            client_slug: client.slug.clone(),
            generated_at,
            infra_percent: infra_percent(&records),
            rows,
        })
    }
}
