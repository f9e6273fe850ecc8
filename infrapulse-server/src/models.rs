//! Database models for InfraPulse server.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use infrapulse_core::{Client, DeviceCategory, DeviceForm, DeviceRecord};

use crate::schema::{firewalls, organizations, switches};

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = organizations)]
/// Client organization database record.
pub struct Organization {
    /// Organization identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
}

impl From<Organization> for Client {
    fn from(value: Organization) -> Self {
        Self {
            id: value.id,
            name: value.name,
            slug: value.slug,
            created_at: value.created_at.and_utc().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = organizations)]
/// Insertable organization record.
pub struct NewOrganization {
    /// Organization identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
}

/// A `firewalls` or `switches` row. Both tables share the same column layout.
#[derive(Debug, Clone, Queryable)]
pub struct DeviceRow {
    /// Row identifier.
    pub id: String,
    /// Owning organization identifier.
    pub client_id: String,
    /// Management IP address.
    pub ip_address: Option<String>,
    /// Firmware version string.
    pub firmware_version: Option<String>,
    /// Vendor.
    pub make: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Stored sanity level.
    pub sanity_icon: Option<String>,
    /// Sanity status line.
    pub status: Option<String>,
    /// Sanity risk description.
    pub risk: Option<String>,
    /// Sanity solution.
    pub solution: Option<String>,
    /// Importance weight.
    pub weight: Option<f64>,
    /// Last write timestamp.
    pub updated_at: NaiveDateTime,
}

impl DeviceRow {
    /// Convert into the core record for a category. Unknown sanity values read as unset.
    pub fn into_record(self, category: DeviceCategory) -> DeviceRecord {
        DeviceRecord {
            client_id: self.client_id,
            category,
            ip_address: self.ip_address,
            firmware_version: self.firmware_version,
            make: self.make,
            model: self.model,
            notes: self.notes,
            sanity_icon: self
                .sanity_icon
                .as_deref()
                .and_then(|value| value.parse().ok()),
            status: self.status,
            risk: self.risk,
            solution: self.solution,
            weight: self.weight,
            updated_at: self.updated_at.and_utc().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = firewalls, treat_none_as_null = true)]
/// Full-row write for the `firewalls` table.
pub struct FirewallWrite {
    /// Row identifier (ignored on conflict updates).
    pub id: String,
    /// Owning organization identifier.
    pub client_id: String,
    /// Management IP address.
    pub ip_address: Option<String>,
    /// Firmware version string.
    pub firmware_version: Option<String>,
    /// Vendor.
    pub make: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sanity level.
    pub sanity_icon: Option<String>,
    /// Sanity status line.
    pub status: Option<String>,
    /// Sanity risk description.
    pub risk: Option<String>,
    /// Sanity solution.
    pub solution: Option<String>,
    /// Importance weight.
    pub weight: Option<f64>,
    /// Write timestamp.
    pub updated_at: NaiveDateTime,
}

impl FirewallWrite {
    /// Build a write from a submitted form.
    pub fn from_form(id: String, client_id: &str, form: &DeviceForm, now: NaiveDateTime) -> Self {
        Self {
            id,
            client_id: client_id.to_string(),
            ip_address: Some(form.ip_address.clone()),
            firmware_version: Some(form.firmware_version.clone()),
            make: Some(form.make.clone()),
            model: Some(form.model.clone()),
            notes: Some(form.notes.clone()),
            sanity_icon: Some(form.sanity_icon.as_str().to_string()),
            status: Some(form.status.clone()),
            risk: Some(form.risk.clone()),
            solution: Some(form.solution.clone()),
            weight: Some(form.weight),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = switches, treat_none_as_null = true)]
/// Full-row write for the `switches` table.
pub struct SwitchesWrite {
    /// Row identifier (ignored on conflict updates).
    pub id: String,
    /// Owning organization identifier.
    pub client_id: String,
    /// Management IP address.
    pub ip_address: Option<String>,
    /// Firmware version string.
    pub firmware_version: Option<String>,
    /// Vendor.
    pub make: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sanity level.
    pub sanity_icon: Option<String>,
    /// Sanity status line.
    pub status: Option<String>,
    /// Sanity risk description.
    pub risk: Option<String>,
    /// Sanity solution.
    pub solution: Option<String>,
    /// Importance weight.
    pub weight: Option<f64>,
    /// Write timestamp.
    pub updated_at: NaiveDateTime,
}

impl From<FirewallWrite> for SwitchesWrite {
    fn from(value: FirewallWrite) -> Self {
        Self {
            id: value.id,
            client_id: value.client_id,
            ip_address: value.ip_address,
            firmware_version: value.firmware_version,
            make: value.make,
            model: value.model,
            notes: value.notes,
            sanity_icon: value.sanity_icon,
            status: value.status,
            risk: value.risk,
            solution: value.solution,
            weight: value.weight,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use infrapulse_core::SanityLevel;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(12, 30, 0))
            .expect("timestamp")
    }

    fn row(sanity_icon: Option<&str>) -> DeviceRow {
        DeviceRow {
            id: "row-1".to_string(),
            client_id: "org-1".to_string(),
            ip_address: Some("10.0.0.1".to_string()),
            firmware_version: None,
            make: Some("Cisco".to_string()),
            model: None,
            notes: None,
            sanity_icon: sanity_icon.map(str::to_string),
            status: None,
            risk: None,
            solution: None,
            weight: Some(3.0),
            updated_at: timestamp(),
        }
    }

    #[test]
    fn organization_converts_to_client() {
        let client: Client = Organization {
            id: "org-1".to_string(),
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            created_at: timestamp(),
        }
        .into();
        assert_eq!(client.slug, "acme");
        assert_eq!(client.created_at, "2024-05-01T12:30:00+00:00");
    }

    #[test]
    fn device_row_parses_sanity_level() {
        let record = row(Some("critical")).into_record(DeviceCategory::Switches);
        assert_eq!(record.sanity_icon, Some(SanityLevel::Critical));
        assert_eq!(record.category, DeviceCategory::Switches);
        assert_eq!(record.weight, Some(3.0));
        assert_eq!(record.make.as_deref(), Some("Cisco"));
    }

    #[test]
    fn device_row_ignores_unknown_sanity_level() {
        let record = row(Some("purple")).into_record(DeviceCategory::Firewall);
        assert_eq!(record.sanity_icon, None);
    }

    #[test]
    fn writes_carry_every_form_field() {
        let form = DeviceForm {
            make: "Juniper".to_string(),
            sanity_icon: SanityLevel::Good,
            weight: 7.5,
            ..DeviceForm::default()
        };
        let write = FirewallWrite::from_form("row-1".to_string(), "org-1", &form, timestamp());
        assert_eq!(write.sanity_icon.as_deref(), Some("good"));
        assert_eq!(write.weight, Some(7.5));
        assert_eq!(write.notes.as_deref(), Some(""));

        let switches: SwitchesWrite = write.into();
        assert_eq!(switches.make.as_deref(), Some("Juniper"));
        assert_eq!(switches.client_id, "org-1");
    }
}
