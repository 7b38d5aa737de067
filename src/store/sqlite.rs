//! SQLite-backed location store.
//!
//! Owns the connection, keeps the schema and the status/type registries in
//! place, and provides the get-or-create primitive the import job builds
//! on. Databases are opened in place and never recreated; all DDL and
//! seeding is idempotent.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::error::{Error, Result};
use crate::model::{Location, LocationType};
use crate::schema::ALL_TABLES;

/// Statuses seeded into every database. `Active` is the import default.
pub const SEED_STATUSES: &[&str] = &["Active", "Planned", "Decommissioning", "Retired"];

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open a database file, creating it along with the schema and the
    /// registry seeds if needed. Existing data is left untouched.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let newly_created = !db_path.exists();

        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        let store = Self { conn };
        store.init_schema()?;
        store.seed_registries()?;

        if newly_created {
            info!("initialized new database at {}", db_path.display());
        } else {
            debug!("opened database at {}", db_path.display());
        }
        Ok(store)
    }

    /// In-memory database, for tests and tooling.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self { conn };
        store.init_schema()?;
        store.seed_registries()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        for schema in ALL_TABLES {
            self.conn.execute(&generate_create_table(schema), [])?;
            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, [])?;
            }
        }
        Ok(())
    }

    /// Seed the status and location type registries. Parent rules are
    /// wired here: City under State, Data Center and Branch under City.
    fn seed_registries(&self) -> Result<()> {
        for name in SEED_STATUSES {
            self.conn
                .execute("INSERT OR IGNORE INTO statuses (name) VALUES (?1)", [name])?;
        }
        // ALL is ordered root to leaf, so parents resolve before children
        for lt in LocationType::ALL {
            let parent_type_id = match lt.parent_type() {
                Some(parent) => Some(self.location_type_id(parent.name())?),
                None => None,
            };
            self.conn.execute(
                "INSERT OR IGNORE INTO location_types (name, parent_type_id) VALUES (?1, ?2)",
                params![lt.name(), parent_type_id],
            )?;
        }
        Ok(())
    }

    /// Look up a status id by name.
    pub fn status_id(&self, name: &str) -> Result<i64> {
        self.conn
            .query_row("SELECT id FROM statuses WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or_else(|| Error::LookupNotFound {
                kind: "status",
                name: name.to_string(),
            })
    }

    /// Look up a location type id by registry name.
    pub fn location_type_id(&self, name: &str) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT id FROM location_types WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::LookupNotFound {
                kind: "location type",
                name: name.to_string(),
            })
    }

    /// Fetch the location matching `(name, location_type)` or insert it if
    /// absent. Returns the row and whether it was created.
    ///
    /// The candidate is validated before the insert (non-empty name, parent
    /// of the type its own type requires), and a found row is re-validated
    /// against the request: a parent or status mismatch is an error, not a
    /// silent reuse.
    pub fn get_or_create_location(
        &self,
        name: &str,
        location_type: LocationType,
        parent_id: Option<i64>,
        status_id: i64,
    ) -> Result<(Location, bool)> {
        if name.is_empty() {
            return Err(Error::Validation {
                detail: format!("{location_type} name must not be empty"),
            });
        }
        match (location_type.parent_type(), parent_id) {
            (Some(required), Some(parent_id)) => {
                let parent = self.location(parent_id)?;
                if parent.location_type != required {
                    return Err(Error::Validation {
                        detail: format!(
                            "a {location_type} must be parented to a {required}, not the {} {:?}",
                            parent.location_type, parent.name
                        ),
                    });
                }
            }
            (Some(required), None) => {
                return Err(Error::Validation {
                    detail: format!("a {location_type} requires a {required} parent"),
                });
            }
            (None, Some(_)) => {
                return Err(Error::Validation {
                    detail: format!("a {location_type} cannot have a parent"),
                });
            }
            (None, None) => {}
        }

        let type_id = self.location_type_id(location_type.name())?;
        let inserted = self.conn.execute(
            "INSERT INTO locations (name, location_type_id, parent_id, status_id)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (name, location_type_id) DO NOTHING",
            params![name, type_id, parent_id, status_id],
        )?;

        let found = self
            .find_location(name, location_type)?
            .ok_or_else(|| Error::Validation {
                detail: format!("{location_type} {name:?} vanished during get-or-create"),
            })?;

        if inserted == 0 {
            if found.parent_id != parent_id {
                return Err(Error::Validation {
                    detail: format!(
                        "{location_type} {name:?} already exists under a different parent"
                    ),
                });
            }
            if found.status_id != status_id {
                return Err(Error::Validation {
                    detail: format!(
                        "{location_type} {name:?} already exists with a different status"
                    ),
                });
            }
        }

        Ok((found, inserted > 0))
    }

    /// Find a location by its unique `(name, location_type)` key.
    pub fn find_location(
        &self,
        name: &str,
        location_type: LocationType,
    ) -> Result<Option<Location>> {
        let type_id = self.location_type_id(location_type.name())?;
        let row = self
            .conn
            .query_row(
                "SELECT id, name, parent_id, status_id FROM locations
                 WHERE name = ?1 AND location_type_id = ?2",
                params![name, type_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;
        Ok(row.map(|(id, name, parent_id, status_id)| Location {
            id,
            name,
            location_type,
            parent_id,
            status_id,
        }))
    }

    /// Load a location by id.
    pub fn location(&self, id: i64) -> Result<Location> {
        let (id, name, type_name, parent_id, status_id) = self.conn.query_row(
            "SELECT l.id, l.name, t.name, l.parent_id, l.status_id
             FROM locations l
             JOIN location_types t ON t.id = l.location_type_id
             WHERE l.id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )?;
        let location_type = type_from_name(id, &type_name)?;
        Ok(Location {
            id,
            name,
            location_type,
            parent_id,
            status_id,
        })
    }

    /// Locations under the given parent (`None` for the State roots),
    /// ordered by name.
    pub fn children_of(&self, parent_id: Option<i64>) -> Result<Vec<Location>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.id, l.name, t.name, l.parent_id, l.status_id
             FROM locations l
             JOIN location_types t ON t.id = l.location_type_id
             WHERE l.parent_id IS ?1
             ORDER BY l.name",
        )?;
        let rows = stmt.query_map(params![parent_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut locations = Vec::new();
        for row in rows {
            let (id, name, type_name, parent_id, status_id) = row?;
            let location_type = type_from_name(id, &type_name)?;
            locations.push(Location {
                id,
                name,
                location_type,
                parent_id,
                status_id,
            });
        }
        Ok(locations)
    }

    /// Total number of location rows, across all types.
    pub fn location_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // Transaction control for atomic import runs. Everything else runs in
    // autocommit, one statement at a time.

    pub(crate) fn begin(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    pub(crate) fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub(crate) fn rollback(&self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

fn type_from_name(id: i64, type_name: &str) -> Result<LocationType> {
    LocationType::from_name(type_name).ok_or_else(|| Error::Validation {
        detail: format!("location {id} has unrecognized type {type_name:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn test_registries_seeded() {
        let store = store();
        assert!(store.status_id("Active").is_ok());
        assert!(store.status_id("Retired").is_ok());
        for lt in LocationType::ALL {
            assert!(store.location_type_id(lt.name()).is_ok());
        }
        assert!(matches!(
            store.status_id("Imaginary"),
            Err(Error::LookupNotFound { kind: "status", .. })
        ));
    }

    #[test]
    fn test_get_or_create_sets_created_flag() {
        let store = store();
        let status = store.status_id("Active").unwrap();

        let (first, created) = store
            .get_or_create_location("CA", LocationType::State, None, status)
            .unwrap();
        assert!(created);

        let (second, created) = store
            .get_or_create_location("CA", LocationType::State, None, status)
            .unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(store.location_count().unwrap(), 1);
    }

    #[test]
    fn test_parent_rule_is_enforced() {
        let store = store();
        let status = store.status_id("Active").unwrap();
        let (state, _) = store
            .get_or_create_location("CA", LocationType::State, None, status)
            .unwrap();

        // a City under a City violates the registry nesting rule
        let (city, _) = store
            .get_or_create_location("LA", LocationType::City, Some(state.id), status)
            .unwrap();
        let err = store
            .get_or_create_location("Fresno", LocationType::City, Some(city.id), status)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        // a City without any parent is rejected too
        let err = store
            .get_or_create_location("Fresno", LocationType::City, None, status)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_found_row_is_revalidated() {
        let store = store();
        let active = store.status_id("Active").unwrap();
        let planned = store.status_id("Planned").unwrap();
        let (ca, _) = store
            .get_or_create_location("CA", LocationType::State, None, active)
            .unwrap();
        let (nv, _) = store
            .get_or_create_location("NV", LocationType::State, None, active)
            .unwrap();
        store
            .get_or_create_location("LA", LocationType::City, Some(ca.id), active)
            .unwrap();

        // same key, different parent
        let err = store
            .get_or_create_location("LA", LocationType::City, Some(nv.id), active)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        // same key, different status
        let err = store
            .get_or_create_location("LA", LocationType::City, Some(ca.id), planned)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let store = store();
        let status = store.status_id("Active").unwrap();
        let err = store
            .get_or_create_location("", LocationType::State, None, status)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
