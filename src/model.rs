use std::fmt;

/// The built-in location types, ordered root to leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationType {
    State,
    City,
    DataCenter,
    Branch,
}

impl LocationType {
    pub const ALL: [LocationType; 4] = [
        LocationType::State,
        LocationType::City,
        LocationType::DataCenter,
        LocationType::Branch,
    ];

    /// Registry name, as stored in the location_types table.
    pub fn name(self) -> &'static str {
        match self {
            LocationType::State => "State",
            LocationType::City => "City",
            LocationType::DataCenter => "Data Center",
            LocationType::Branch => "Branch",
        }
    }

    /// The type a parent location must have. States are roots.
    pub fn parent_type(self) -> Option<LocationType> {
        match self {
            LocationType::State => None,
            LocationType::City => Some(LocationType::State),
            LocationType::DataCenter | LocationType::Branch => Some(LocationType::City),
        }
    }

    /// Reverse of [`LocationType::name`].
    pub fn from_name(name: &str) -> Option<LocationType> {
        Self::ALL.into_iter().find(|lt| lt.name() == name)
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored location row.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub location_type: LocationType,
    pub parent_id: Option<i64>,
    pub status_id: i64,
}

/// Classify a site row by the token after the last `-` in its name:
/// `LA-DC` is a Data Center, `LA-BR` is a Branch. The match is exact, so
/// lowercase or padded suffixes do not count. A name without a `-` is
/// classified by the whole name.
pub fn classify_site(name: &str) -> Option<LocationType> {
    match name.rsplit('-').next() {
        Some("DC") => Some(LocationType::DataCenter),
        Some("BR") => Some(LocationType::Branch),
        _ => None,
    }
}
