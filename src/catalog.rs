//! Static reference catalogs
//!
//! Fixed enumerations of the case types and injury types the API recognizes.
//! These are compiled in, never loaded from the data files, and returned
//! verbatim to clients.

use serde::Serialize;

/// A catalog record: stable identifier plus display name
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
}

pub const CASE_TYPES: &[CatalogEntry] = &[
    CatalogEntry {
        id: "personal-injury",
        name: "Personal Injury",
    },
    CatalogEntry {
        id: "property-damage",
        name: "Property Damage",
    },
    CatalogEntry {
        id: "wrongful-death",
        name: "Wrongful Death",
    },
    CatalogEntry {
        id: "medical-malpractice",
        name: "Medical Malpractice",
    },
];

pub const INJURY_TYPES: &[CatalogEntry] = &[
    CatalogEntry {
        id: "slip-and-fall",
        name: "Slip and Fall",
    },
    CatalogEntry {
        id: "car-accident",
        name: "Car Accident",
    },
    CatalogEntry {
        id: "medical-malpractice",
        name: "Medical Malpractice",
    },
    CatalogEntry {
        id: "workplace-injury",
        name: "Workplace Injury",
    },
];
