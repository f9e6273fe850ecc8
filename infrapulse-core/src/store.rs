//! Inventory storage abstraction and an in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::domain::{Client, DeviceCategory, DeviceForm, DeviceRecord, NewClient};
use crate::error::{InfraPulseError, Result};

/// Abstraction over client and device persistence for testability.
#[cfg_attr(test, mockall::automock)]
pub trait InventoryStore {
    /// List every client, newest first.
    fn list_clients(&self) -> Result<Vec<Client>>;
    /// Look up a client by its slug.
    fn find_client_by_slug(&self, slug: &str) -> Result<Option<Client>>;
    /// Insert a client. Fails with [`InfraPulseError::Conflict`] when the slug is taken.
    fn insert_client(&self, client: NewClient) -> Result<Client>;
    /// Load the device row for a client and category, if one exists.
    fn load_device(
        &self,
        client_id: &str,
        category: DeviceCategory,
    ) -> Result<Option<DeviceRecord>>;
    /// Insert or replace the device row for a client and category.
    fn upsert_device(
        &self,
        client_id: &str,
        category: DeviceCategory,
        form: &DeviceForm,
    ) -> Result<DeviceRecord>;
}

impl<S: InventoryStore + ?Sized> InventoryStore for Arc<S> {
    fn list_clients(&self) -> Result<Vec<Client>> {
        (**self).list_clients()
    }

    fn find_client_by_slug(&self, slug: &str) -> Result<Option<Client>> {
        (**self).find_client_by_slug(slug)
    }

    fn insert_client(&self, client: NewClient) -> Result<Client> {
        (**self).insert_client(client)
    }

    fn load_device(
        &self,
        client_id: &str,
        category: DeviceCategory,
    ) -> Result<Option<DeviceRecord>> {
        (**self).load_device(client_id, category)
    }

    fn upsert_device(
        &self,
        client_id: &str,
        category: DeviceCategory,
        form: &DeviceForm,
    ) -> Result<DeviceRecord> {
        (**self).upsert_device(client_id, category, form)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    clients: Vec<Client>,
    devices: BTreeMap<(String, DeviceCategory), DeviceRecord>,
    next_id: u64,
}

/// Process-local store backed by `RwLock`-guarded collections.
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryInventoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| InfraPulseError::Storage("inventory lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| InfraPulseError::Storage("inventory lock poisoned".to_string()))
    }
}

impl InventoryStore for MemoryInventoryStore {
    fn list_clients(&self) -> Result<Vec<Client>> {
        let state = self.read()?;
        Ok(state.clients.iter().rev().cloned().collect())
    }

    fn find_client_by_slug(&self, slug: &str) -> Result<Option<Client>> {
        let state = self.read()?;
        Ok(state
            .clients
            .iter()
            .find(|client| client.slug == slug)
            .cloned())
    }

    fn insert_client(&self, client: NewClient) -> Result<Client> {
        let mut state = self.write()?;
        if state.clients.iter().any(|existing| existing.slug == client.slug) {
            return Err(InfraPulseError::Conflict(format!(
                "slug already in use: {}",
                client.slug
            )));
        }
        state.next_id += 1;
        let created = Client {
            id: format!("client-{}", state.next_id),
            name: client.name,
            slug: client.slug,
            created_at: Utc::now().to_rfc3339(),
        };
        state.clients.push(created.clone());
        Ok(created)
    }

    fn load_device(
        &self,
        client_id: &str,
        category: DeviceCategory,
    ) -> Result<Option<DeviceRecord>> {
        let state = self.read()?;
        Ok(state
            .devices
            .get(&(client_id.to_string(), category))
            .cloned())
    }

    fn upsert_device(
        &self,
        client_id: &str,
        category: DeviceCategory,
        form: &DeviceForm,
    ) -> Result<DeviceRecord> {
        let mut state = self.write()?;
        if !state.clients.iter().any(|client| client.id == client_id) {
            return Err(InfraPulseError::NotFound(format!(
                "client not found: {client_id}"
            )));
        }
        let record = DeviceRecord::from_form(client_id, category, form, Utc::now().to_rfc3339());
        state
            .devices
            .insert((client_id.to_string(), category), record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::{InventoryStore, MemoryInventoryStore};
    use crate::domain::{DeviceCategory, DeviceForm, NewClient, SanityLevel};
    use crate::error::InfraPulseError;
    use std::sync::Arc;

    fn new_client(name: &str, slug: &str) -> NewClient {
        NewClient {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn lists_clients_newest_first() {
        let store = MemoryInventoryStore::new();
        store.insert_client(new_client("Acme", "acme")).expect("acme");
        store
            .insert_client(new_client("Globex", "globex"))
            .expect("globex");

        let clients = store.list_clients().expect("list");
        let slugs: Vec<&str> = clients.iter().map(|client| client.slug.as_str()).collect();
        assert_eq!(slugs, vec!["globex", "acme"]);
        assert_ne!(clients[0].id, clients[1].id);
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let store = MemoryInventoryStore::new();
        store.insert_client(new_client("Acme", "acme")).expect("acme");
        let err = store
            .insert_client(new_client("Acme again", "acme"))
            .unwrap_err();
        assert!(matches!(err, InfraPulseError::Conflict(_)));
    }

    #[test]
    fn finds_clients_by_slug() {
        let store = MemoryInventoryStore::new();
        let created = store.insert_client(new_client("Acme", "acme")).expect("acme");
        assert_eq!(
            store.find_client_by_slug("acme").expect("find"),
            Some(created)
        );
        assert_eq!(store.find_client_by_slug("nope").expect("find"), None);
    }

    #[test]
    fn upsert_replaces_existing_row() {
        let store = MemoryInventoryStore::new();
        let client = store.insert_client(new_client("Acme", "acme")).expect("acme");
        assert!(
            store
                .load_device(&client.id, DeviceCategory::Firewall)
                .expect("load")
                .is_none()
        );

        let mut form = DeviceForm {
            make: "Fortinet".to_string(),
            ..DeviceForm::default()
        };
        store
            .upsert_device(&client.id, DeviceCategory::Firewall, &form)
            .expect("insert");
        form.sanity_icon = SanityLevel::Good;
        form.weight = 9.0;
        store
            .upsert_device(&client.id, DeviceCategory::Firewall, &form)
            .expect("update");

        let stored = store
            .load_device(&client.id, DeviceCategory::Firewall)
            .expect("load")
            .expect("row");
        assert_eq!(stored.make.as_deref(), Some("Fortinet"));
        assert_eq!(stored.sanity_icon, Some(SanityLevel::Good));
        assert_eq!(stored.weight, Some(9.0));
        assert!(
            store
                .load_device(&client.id, DeviceCategory::Switches)
                .expect("load")
                .is_none()
        );
    }

    #[test]
    fn upsert_requires_known_client() {
        let store = MemoryInventoryStore::new();
        let err = store
            .upsert_device("ghost", DeviceCategory::Switches, &DeviceForm::default())
            .unwrap_err();
        assert!(matches!(err, InfraPulseError::NotFound(_)));
    }

    #[test]
    fn shared_store_delegates_through_arc() {
        let store: Arc<dyn InventoryStore + Send + Sync> = Arc::new(MemoryInventoryStore::new());
        store.insert_client(new_client("Acme", "acme")).expect("acme");
        assert_eq!(store.list_clients().expect("list").len(), 1);
    }
}
