//! Append-only lead capture store.
//!
//! Registrations are appended to a JSON array on disk. No dedup, no email
//! format validation -- presence of name and email is checked by the
//! caller. A missing or unreadable file starts a fresh list.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One captured registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub school: String,
    #[serde(default = "default_plan_type")]
    pub plan_type: String,
    pub timestamp: String,
}

fn default_plan_type() -> String {
    "pdf".to_string()
}

impl Lead {
    /// Build a lead, filling defaults for the optional fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        school: Option<String>,
        plan_type: Option<String>,
        timestamp: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            school: school.unwrap_or_default(),
            plan_type: plan_type.unwrap_or_else(default_plan_type),
            timestamp: timestamp.unwrap_or_else(|| Utc::now().to_rfc3339()),
        }
    }
}

/// File-backed lead store.
#[derive(Debug, Clone)]
pub struct LeadStore {
    path: PathBuf,
}

impl LeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one lead and persist the full list.
    pub fn append(&self, lead: Lead) -> Result<()> {
        let mut leads = self.load_existing();
        leads.push(lead);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create lead directory {}", parent.display()))?;
        }
        let contents =
            serde_json::to_string_pretty(&leads).context("failed to serialize leads")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("failed to write lead store at {}", self.path.display()))?;
        tracing::info!(count = leads.len(), path = %self.path.display(), "lead recorded");
        Ok(())
    }

    /// Current contents; missing or corrupt files read as empty.
    pub fn load_existing(&self) -> Vec<Lead> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> LeadStore {
        LeadStore::new(dir.path().join("leads.json"))
    }

    #[test]
    fn append_creates_file_and_accumulates() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        store
            .append(Lead::new("Eleri", "eleri@ysgol.cymru", None, None, None))
            .unwrap();
        store
            .append(Lead::new(
                "Gareth",
                "gareth@ysgol.cymru",
                Some("Ysgol y Bont".to_string()),
                Some("rubric".to_string()),
                None,
            ))
            .unwrap();

        let leads = store.load_existing();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].name, "Eleri");
        assert_eq!(leads[0].plan_type, "pdf");
        assert_eq!(leads[1].school, "Ysgol y Bont");
        assert_eq!(leads[1].plan_type, "rubric");
    }

    #[test]
    fn duplicate_leads_are_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        let lead = Lead::new("Twice", "twice@example.com", None, None, Some("t".to_string()));
        store.append(lead.clone()).unwrap();
        store.append(lead).unwrap();
        assert_eq!(store.load_existing().len(), 2);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        std::fs::write(store.path(), "not json at all").unwrap();
        assert!(store.load_existing().is_empty());

        // Appending over the corrupt file starts a fresh list.
        store
            .append(Lead::new("New", "new@example.com", None, None, None))
            .unwrap();
        assert_eq!(store.load_existing().len(), 1);
    }

    #[test]
    fn default_timestamp_is_rfc3339() {
        let lead = Lead::new("T", "t@example.com", None, None, None);
        assert!(chrono::DateTime::parse_from_rfc3339(&lead.timestamp).is_ok());
    }

    #[test]
    fn lead_serializes_with_camel_case_keys() {
        let lead = Lead::new("N", "e@x", None, None, Some("2026-01-01T00:00:00Z".to_string()));
        let json = serde_json::to_value(&lead).unwrap();
        assert!(json.get("planType").is_some());
        assert!(json.get("plan_type").is_none());
    }
}
