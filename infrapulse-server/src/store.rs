//! PostgreSQL-backed inventory store.

use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError, OptionalExtension};
use infrapulse_core::{
    Client, DeviceCategory, DeviceForm, DeviceRecord, InfraPulseError, InventoryStore, NewClient,
    Result,
};
use uuid::Uuid;

use crate::db::DbPool;
use crate::models::{DeviceRow, FirewallWrite, NewOrganization, Organization, SwitchesWrite};
use crate::schema::{firewalls, organizations, switches};

/// Inventory store over a pooled PostgreSQL connection.
#[derive(Clone)]
pub struct PgInventoryStore {
    pool: DbPool,
}

impl PgInventoryStore {
    /// Wrap a connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool
            .get()
            .map_err(|err| InfraPulseError::Storage(format!("db connection failed: {err}")))
    }
}

fn storage_error(context: &str, err: DieselError) -> InfraPulseError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            InfraPulseError::Conflict(format!("{context}: {}", info.message()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            InfraPulseError::NotFound(format!("{context}: {}", info.message()))
        }
        other => InfraPulseError::Storage(format!("{context}: {other}")),
    }
}

impl InventoryStore for PgInventoryStore {
    fn list_clients(&self) -> Result<Vec<Client>> {
        let mut conn = self.conn()?;
        let rows = organizations::table
            .order(organizations::created_at.desc())
            .load::<Organization>(&mut conn)
            .map_err(|err| storage_error("list clients failed", err))?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    fn find_client_by_slug(&self, slug: &str) -> Result<Option<Client>> {
        let mut conn = self.conn()?;
        let row = organizations::table
            .filter(organizations::slug.eq(slug))
            .first::<Organization>(&mut conn)
            .optional()
            .map_err(|err| storage_error("client lookup failed", err))?;
        Ok(row.map(Client::from))
    }

    fn insert_client(&self, client: NewClient) -> Result<Client> {
        let mut conn = self.conn()?;
        let record = NewOrganization {
            id: Uuid::new_v4().to_string(),
            name: client.name,
            slug: client.slug,
            created_at: Utc::now().naive_utc(),
        };
        let row = diesel::insert_into(organizations::table)
            .values(&record)
            .get_result::<Organization>(&mut conn)
            .map_err(|err| storage_error("insert client failed", err))?;
        log::info!("created client {} ({})", row.slug, row.id);
        Ok(row.into())
    }

    fn load_device(
        &self,
        client_id: &str,
        category: DeviceCategory,
    ) -> Result<Option<DeviceRecord>> {
        let mut conn = self.conn()?;
        let row = match category {
            DeviceCategory::Firewall => firewalls::table
                .filter(firewalls::client_id.eq(client_id))
                .first::<DeviceRow>(&mut conn)
                .optional(),
            DeviceCategory::Switches => switches::table
                .filter(switches::client_id.eq(client_id))
                .first::<DeviceRow>(&mut conn)
                .optional(),
        }
        .map_err(|err| storage_error("load device failed", err))?;
        Ok(row.map(|row| row.into_record(category)))
    }

    fn upsert_device(
        &self,
        client_id: &str,
        category: DeviceCategory,
        form: &DeviceForm,
    ) -> Result<DeviceRecord> {
        let mut conn = self.conn()?;
        let write = FirewallWrite::from_form(
            Uuid::new_v4().to_string(),
            client_id,
            form,
            Utc::now().naive_utc(),
        );
        let row = match category {
            DeviceCategory::Firewall => diesel::insert_into(firewalls::table)
                .values(&write)
                .on_conflict(firewalls::client_id)
                .do_update()
                .set(&write)
                .get_result::<DeviceRow>(&mut conn),
            DeviceCategory::Switches => {
                let write = SwitchesWrite::from(write);
                diesel::insert_into(switches::table)
                    .values(&write)
                    .on_conflict(switches::client_id)
                    .do_update()
                    .set(&write)
                    .get_result::<DeviceRow>(&mut conn)
            }
        }
        .map_err(|err| storage_error("save device failed", err))?;
        log::info!("saved {category} for client {client_id}");
        Ok(row.into_record(category))
    }
}

#[cfg(test)]
mod tests {
    use super::PgInventoryStore;
    use crate::db::TestDatabase;
    use infrapulse_core::{
        DeviceCategory, DeviceForm, InfraPulseError, InventoryInspector, InventoryStore,
        NewClient, SanityLevel,
    };

    #[test]
    #[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
    fn clients_round_trip_through_postgres() {
        let test_db = TestDatabase::new();
        let store = PgInventoryStore::new(test_db.pool());

        let created = store
            .insert_client(NewClient {
                name: "Acme".to_string(),
                slug: "acme".to_string(),
            })
            .expect("insert");
        let found = store.find_client_by_slug("acme").expect("find");
        assert_eq!(found, Some(created));

        let err = store
            .insert_client(NewClient {
                name: "Acme 2".to_string(),
                slug: "acme".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, InfraPulseError::Conflict(_)));
    }

    #[test]
    #[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
    fn upsert_keeps_one_row_per_client() {
        let test_db = TestDatabase::new();
        let inspector = InventoryInspector::new(PgInventoryStore::new(test_db.pool()));
        let acme = inspector.create_client("Acme", 0).expect("client");

        let mut form = DeviceForm {
            sanity_icon: SanityLevel::Good,
            weight: 9.0,
            ..DeviceForm::default()
        };
        inspector
            .save_device(&acme.id, DeviceCategory::Firewall, &form)
            .expect("insert");
        form.sanity_icon = SanityLevel::Critical;
        inspector
            .save_device(&acme.id, DeviceCategory::Firewall, &form)
            .expect("update");
        inspector
            .save_device(
                &acme.id,
                DeviceCategory::Switches,
                &DeviceForm {
                    sanity_icon: SanityLevel::Good,
                    weight: 1.0,
                    ..DeviceForm::default()
                },
            )
            .expect("switches");

        let firewall = inspector
            .device_form(&acme.id, DeviceCategory::Firewall)
            .expect("form");
        assert_eq!(firewall.sanity_icon, SanityLevel::Critical);
        // critical * 9 + good * 1 over 10
        assert_eq!(inspector.client_percent(&acme.id).expect("percent"), Some(10));
    }

    #[test]
    #[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
    fn upsert_for_unknown_client_is_not_found() {
        let test_db = TestDatabase::new();
        let store = PgInventoryStore::new(test_db.pool());
        let err = store
            .upsert_device("missing", DeviceCategory::Switches, &DeviceForm::default())
            .unwrap_err();
        assert!(matches!(err, InfraPulseError::NotFound(_)));
    }
}
