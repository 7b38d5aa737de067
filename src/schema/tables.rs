//! Table definitions for the site inventory schema.
//!
//! Three tables: two lookup registries (statuses, location_types) and the
//! location tree itself. Locations are unique by (name, location_type) and
//! parent-linked into State -> City -> Data Center/Branch chains.

use super::types::*;

pub static STATUSES: TableSchema = TableSchema {
    name: "statuses",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::unique(&["name"])],
};

pub static LOCATION_TYPES: TableSchema = TableSchema {
    name: "location_types",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
        Column::new("parent_type_id", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("parent_type_id", "location_types")],
    indexes: &[Index::unique(&["name"])],
};

pub static LOCATIONS: TableSchema = TableSchema {
    name: "locations",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
        Column::required("location_type_id", ColumnType::Integer),
        Column::new("parent_id", ColumnType::Integer),
        Column::required("status_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("location_type_id", "location_types"),
        ForeignKey::new("parent_id", "locations"),
        ForeignKey::new("status_id", "statuses"),
    ],
    indexes: &[
        Index::unique(&["name", "location_type_id"]),
        Index::on(&["parent_id"]),
    ],
};

/// All tables in creation order (referenced tables before referencing ones).
pub static ALL_TABLES: &[&TableSchema] = &[&STATUSES, &LOCATION_TYPES, &LOCATIONS];
