//! Domain entities for InfraPulse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::InfraPulseError;

/// Weight used by a blank device form.
pub const DEFAULT_FORM_WEIGHT: f64 = 5.0;

/// Operator-assigned health label for a device category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SanityLevel {
    /// Device category is healthy.
    Good,
    /// Device category needs attention.
    Warning,
    /// Device category is at risk.
    Critical,
}

impl SanityLevel {
    /// All levels in display order.
    pub const ALL: [SanityLevel; 3] = [Self::Good, Self::Warning, Self::Critical];

    /// Stable storage value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }

    /// Icon shown next to the label in forms and reports.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Good => "✅",
            Self::Warning => "⚠️",
            Self::Critical => "💣",
        }
    }
}

impl fmt::Display for SanityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SanityLevel {
    type Err = InfraPulseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            other => Err(InfraPulseError::InvalidInput(format!(
                "unknown sanity level: {other}"
            ))),
        }
    }
}

/// Device categories tracked per client. Each client has at most one row per category.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    /// Perimeter firewall.
    Firewall,
    /// Network switches.
    Switches,
}

impl DeviceCategory {
    /// All categories in scoring order.
    pub const ALL: [DeviceCategory; 2] = [Self::Firewall, Self::Switches];

    /// Path segment and storage value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Firewall => "firewall",
            Self::Switches => "switches",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Firewall => "Firewall",
            Self::Switches => "Switches",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceCategory {
    type Err = InfraPulseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "firewall" | "firewalls" => Ok(Self::Firewall),
            "switches" | "switch" => Ok(Self::Switches),
            other => Err(InfraPulseError::NotFound(format!(
                "unknown device category: {other}"
            ))),
        }
    }
}

/// A managed client (organization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Client identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

/// Data needed to insert a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    /// Display name.
    pub name: String,
    /// Slug, already disambiguated.
    pub slug: String,
}

/// The scoring projection of a device row.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SanityRecord {
    /// Health rating, if one was recorded.
    pub rating: Option<SanityLevel>,
    /// Importance weight, if one was recorded.
    pub weight: Option<f64>,
}

impl SanityRecord {
    /// Build a record from optional parts.
    pub fn new(rating: Option<SanityLevel>, weight: Option<f64>) -> Self {
        Self { rating, weight }
    }
}

/// Stored device row for one client and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Owning client identifier.
    pub client_id: String,
    /// Device category of the row.
    pub category: DeviceCategory,
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
    /// Sanity check rating.
    pub sanity_icon: Option<SanityLevel>,
    /// Sanity check status line.
    pub status: Option<String>,
    /// Sanity check risk description.
    pub risk: Option<String>,
    /// Sanity check proposed solution.
    pub solution: Option<String>,
    /// Importance weight.
    pub weight: Option<f64>,
    /// ISO-8601 timestamp of the last write.
    pub updated_at: String,
}

impl DeviceRecord {
    /// Build a record for a category from a saved form.
    pub fn from_form(
        client_id: &str,
        category: DeviceCategory,
        form: &DeviceForm,
        updated_at: String,
    ) -> Self {
        Self {
            client_id: client_id.to_string(),
            category,
            ip_address: Some(form.ip_address.clone()),
            firmware_version: Some(form.firmware_version.clone()),
            make: Some(form.make.clone()),
            model: Some(form.model.clone()),
            notes: Some(form.notes.clone()),
            sanity_icon: Some(form.sanity_icon),
            status: Some(form.status.clone()),
            risk: Some(form.risk.clone()),
            solution: Some(form.solution.clone()),
            weight: Some(form.weight),
            updated_at,
        }
    }

    /// Project the row onto the fields the scorer uses.
    pub fn sanity_record(&self) -> SanityRecord {
        SanityRecord::new(self.sanity_icon, self.weight)
    }
}

/// Editable device form state. Missing stored values fall back to form defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceForm {
    /// Management IP address.
    #[serde(deserialize_with = "null_as_empty")]
    pub ip_address: String,
    /// Firmware version string.
    #[serde(deserialize_with = "null_as_empty")]
    pub firmware_version: String,
    /// Vendor.
    #[serde(deserialize_with = "null_as_empty")]
    pub make: String,
    /// Model name.
    #[serde(deserialize_with = "null_as_empty")]
    pub model: String,
    /// Free-form notes.
    #[serde(deserialize_with = "null_as_empty")]
    pub notes: String,
    /// Sanity check rating.
    #[serde(deserialize_with = "null_as_warning")]
    pub sanity_icon: SanityLevel,
    /// Sanity check status line.
    #[serde(deserialize_with = "null_as_empty")]
    pub status: String,
    /// Sanity check risk description.
    #[serde(deserialize_with = "null_as_empty")]
    pub risk: String,
    /// Sanity check proposed solution.
    #[serde(deserialize_with = "null_as_empty")]
    pub solution: String,
    /// Importance weight, nominally 1-10.
    #[serde(deserialize_with = "null_as_default_weight")]
    pub weight: f64,
}

// Explicit `null` in a submitted form reads the same as an absent field.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_warning<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SanityLevel, D::Error> {
    Ok(Option::<SanityLevel>::deserialize(deserializer)?.unwrap_or(SanityLevel::Warning))
}

fn null_as_default_weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(DEFAULT_FORM_WEIGHT))
}

impl Default for DeviceForm {
    fn default() -> Self {
        Self {
            ip_address: String::new(),
            firmware_version: String::new(),
            make: String::new(),
            model: String::new(),
            notes: String::new(),
            sanity_icon: SanityLevel::Warning,
            status: String::new(),
            risk: String::new(),
            solution: String::new(),
            weight: DEFAULT_FORM_WEIGHT,
        }
    }
}

impl DeviceForm {
    /// Populate a form from a stored row.
    pub fn from_record(record: &DeviceRecord) -> Self {
        Self {
            ip_address: record.ip_address.clone().unwrap_or_default(),
            firmware_version: record.firmware_version.clone().unwrap_or_default(),
            make: record.make.clone().unwrap_or_default(),
            model: record.model.clone().unwrap_or_default(),
            notes: record.notes.clone().unwrap_or_default(),
            sanity_icon: record.sanity_icon.unwrap_or(SanityLevel::Warning),
            status: record.status.clone().unwrap_or_default(),
            risk: record.risk.clone().unwrap_or_default(),
            solution: record.solution.clone().unwrap_or_default(),
            weight: record.weight.unwrap_or(DEFAULT_FORM_WEIGHT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanity_level_parses_case_insensitively() {
        assert_eq!("GOOD".parse::<SanityLevel>().unwrap(), SanityLevel::Good);
        assert_eq!(" warning ".parse::<SanityLevel>().unwrap(), SanityLevel::Warning);
        assert_eq!("critical".parse::<SanityLevel>().unwrap(), SanityLevel::Critical);
        assert!("fine".parse::<SanityLevel>().is_err());
    }

    #[test]
    fn sanity_level_serializes_lowercase() {
        let json = serde_json::to_string(&SanityLevel::Critical).expect("json");
        assert_eq!(json, "\"critical\"");
        let parsed: SanityLevel = serde_json::from_str("\"good\"").expect("parse");
        assert_eq!(parsed, SanityLevel::Good);
    }

    #[test]
    fn sanity_level_icons_and_labels() {
        assert_eq!(SanityLevel::Good.icon(), "✅");
        assert_eq!(SanityLevel::Warning.icon(), "⚠️");
        assert_eq!(SanityLevel::Critical.icon(), "💣");
        assert_eq!(SanityLevel::Critical.label(), "Critical");
    }

    #[test]
    fn device_category_accepts_path_segments() {
        assert_eq!(
            "firewall".parse::<DeviceCategory>().unwrap(),
            DeviceCategory::Firewall
        );
        assert_eq!(
            "Switches".parse::<DeviceCategory>().unwrap(),
            DeviceCategory::Switches
        );
        assert!("routers".parse::<DeviceCategory>().is_err());
    }

    #[test]
    fn default_form_uses_warning_and_weight_five() {
        let form = DeviceForm::default();
        assert_eq!(form.sanity_icon, SanityLevel::Warning);
        assert_eq!(form.weight, 5.0);
        assert!(form.ip_address.is_empty());
    }

    #[test]
    fn form_deserializes_partial_payload() {
        let form: DeviceForm =
            serde_json::from_str(r#"{"make":"Fortinet","sanityIcon":"good"}"#).expect("parse");
        assert_eq!(form.make, "Fortinet");
        assert_eq!(form.sanity_icon, SanityLevel::Good);
        assert_eq!(form.weight, 5.0);
        assert_eq!(form.model, "");
    }

    #[test]
    fn form_treats_null_fields_as_defaults() {
        let form: DeviceForm = serde_json::from_str(
            r#"{"make":null,"sanityIcon":null,"weight":null,"risk":"open ports"}"#,
        )
        .expect("parse");
        assert_eq!(form.make, "");
        assert_eq!(form.sanity_icon, SanityLevel::Warning);
        assert_eq!(form.weight, DEFAULT_FORM_WEIGHT);
        assert_eq!(form.risk, "open ports");
        assert!(serde_json::from_str::<DeviceForm>(r#"{"weight":"heavy"}"#).is_err());
    }

    #[test]
    fn form_from_record_fills_missing_fields() {
        let record = DeviceRecord {
            client_id: "c-1".to_string(),
            category: DeviceCategory::Firewall,
            ip_address: Some("10.0.0.1".to_string()),
            firmware_version: None,
            make: None,
            model: None,
            notes: None,
            sanity_icon: None,
            status: Some("patched".to_string()),
            risk: None,
            solution: None,
            weight: None,
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let form = DeviceForm::from_record(&record);
        assert_eq!(form.ip_address, "10.0.0.1");
        assert_eq!(form.firmware_version, "");
        assert_eq!(form.sanity_icon, SanityLevel::Warning);
        assert_eq!(form.status, "patched");
        assert_eq!(form.weight, 5.0);
    }

    #[test]
    fn record_from_form_keeps_sanity_fields() {
        let form = DeviceForm {
            sanity_icon: SanityLevel::Critical,
            weight: 8.0,
            ..DeviceForm::default()
        };
        let record = DeviceRecord::from_form("c-1", DeviceCategory::Switches, &form, "now".into());
        assert_eq!(
            record.sanity_record(),
            SanityRecord::new(Some(SanityLevel::Critical), Some(8.0))
        );
        assert_eq!(record.category, DeviceCategory::Switches);
    }
}
