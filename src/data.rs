//! Reference data store
//!
//! Loads the two JSON documents (statute-of-limitations data and settlement
//! data) exactly once at startup and exposes read-only, case-sensitive
//! exact-match lookups over them. A missing or malformed document is a fatal
//! startup error; the process must not start serving without valid data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub const STATUTE_FILE: &str = "statute-of-limitations.json";
pub const SETTLEMENT_FILE: &str = "settlements.json";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Dataset revision info, used only by the health-check endpoint
#[derive(Debug, Deserialize)]
pub struct Metadata {
    pub version: String,
}

/// Limitations period for one case type in one jurisdiction.
///
/// `years` is held opaquely: most jurisdictions store a plain number, but a
/// few use a structured value when the period varies by sub-condition. The
/// server passes it through without interpreting it.
#[derive(Debug, Deserialize, Serialize)]
pub struct StatuteEntry {
    pub years: Value,
    #[serde(default, deserialize_with = "empty_notes_as_none")]
    pub notes: Option<String>,
}

/// Empty-string notes are treated as absent, so they serialize as `null`
/// everywhere rather than as `""`.
fn empty_notes_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let notes = Option::<String>::deserialize(deserializer)?;
    Ok(notes.filter(|s| !s.is_empty()))
}

#[derive(Debug, Deserialize)]
pub struct Jurisdiction {
    pub name: String,
    #[serde(rename = "caseTypes")]
    pub case_types: BTreeMap<String, StatuteEntry>,
}

#[derive(Debug, Deserialize)]
struct StatuteDocument {
    #[serde(default)]
    metadata: Option<Metadata>,
    jurisdictions: BTreeMap<String, Jurisdiction>,
}

/// Settlement statistics for one injury type. Fields are
/// implementation-defined and passed through verbatim.
pub type SettlementEntry = serde_json::Map<String, Value>;

/// Immutable process-wide reference data, constructed once in `main` and
/// handed to handlers behind an `Arc`. Nothing mutates it after load.
#[derive(Debug)]
pub struct ReferenceData {
    jurisdictions: BTreeMap<String, Jurisdiction>,
    metadata: Option<Metadata>,
    settlements: BTreeMap<String, SettlementEntry>,
}

impl ReferenceData {
    /// Load both documents from `dir`. Any I/O or parse failure is fatal.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        let document: StatuteDocument = read_json(&dir.join(STATUTE_FILE))?;
        let settlements: BTreeMap<String, SettlementEntry> =
            read_json(&dir.join(SETTLEMENT_FILE))?;
        Ok(Self {
            jurisdictions: document.jurisdictions,
            metadata: document.metadata,
            settlements,
        })
    }

    /// Parse from in-memory JSON, for tests.
    #[cfg(test)]
    pub fn from_strs(statute_json: &str, settlement_json: &str) -> Result<Self, DataError> {
        let document: StatuteDocument = parse(STATUTE_FILE, statute_json)?;
        let settlements: BTreeMap<String, SettlementEntry> =
            parse(SETTLEMENT_FILE, settlement_json)?;
        Ok(Self {
            jurisdictions: document.jurisdictions,
            metadata: document.metadata,
            settlements,
        })
    }

    pub fn jurisdiction(&self, code: &str) -> Option<&Jurisdiction> {
        self.jurisdictions.get(code)
    }

    pub fn statute(&self, code: &str, case_type: &str) -> Option<&StatuteEntry> {
        self.jurisdictions.get(code)?.case_types.get(case_type)
    }

    pub fn settlement(&self, injury_type: &str) -> Option<&SettlementEntry> {
        self.settlements.get(injury_type)
    }

    pub fn jurisdictions(&self) -> &BTreeMap<String, Jurisdiction> {
        &self.jurisdictions
    }

    pub fn jurisdiction_codes(&self) -> Vec<&str> {
        self.jurisdictions.keys().map(String::as_str).collect()
    }

    pub fn settlements(&self) -> &BTreeMap<String, SettlementEntry> {
        &self.settlements
    }

    pub fn settlement_types(&self) -> Vec<&str> {
        self.settlements.keys().map(String::as_str).collect()
    }

    pub fn data_version(&self) -> &str {
        self.metadata
            .as_ref()
            .map_or("unknown", |meta| meta.version.as_str())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| DataError::Read {
        path: display.clone(),
        source,
    })?;
    parse(&display, &contents)
}

fn parse<T: serde::de::DeserializeOwned>(path: &str, json: &str) -> Result<T, DataError> {
    serde_json::from_str(json).map_err(|source| DataError::Parse {
        path: path.to_string(),
        source,
    })
}
