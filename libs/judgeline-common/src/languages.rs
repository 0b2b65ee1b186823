// Language -> backend version index table
// Built-in defaults, optionally extended from a languages.json file

use crate::error::{JudgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Version index sent for languages that have no entry in the table.
pub const FALLBACK_VERSION_INDEX: &str = "0";

const DEFAULT_VERSIONS: &[(&str, &str)] = &[
    ("java", "4"),    // JDK 17
    ("python3", "3"), // Python 3
    ("c", "5"),       // GCC
    ("cpp", "5"),     // G++
    ("cpp17", "5"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageEntry {
    pub name: String,
    pub version_index: String,
}

/// On-disk shape of languages.json.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LanguagesFile {
    pub languages: Vec<LanguageEntry>,
}

/// Maps language identifiers to the runtime version the execution backend expects.
///
/// Lookups are case-insensitive. Unknown languages resolve to
/// [`FALLBACK_VERSION_INDEX`] instead of failing.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    versions: BTreeMap<String, String>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        let versions = DEFAULT_VERSIONS
            .iter()
            .map(|(name, index)| (name.to_string(), index.to_string()))
            .collect();
        Self { versions }
    }
}

impl LanguageTable {
    /// Load a languages.json file and merge it over the built-in defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            JudgeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let file: LanguagesFile = serde_json::from_str(&content).map_err(|e| {
            JudgeError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        let mut table = Self::default();
        for entry in file.languages {
            if entry.name.trim().is_empty() {
                warn!(path = %path.display(), "Skipping language entry with empty name");
                continue;
            }
            table.insert(&entry.name, &entry.version_index);
        }
        Ok(table)
    }

    pub fn insert(&mut self, language: &str, version_index: &str) {
        self.versions
            .insert(language.trim().to_lowercase(), version_index.to_string());
    }

    /// Version index for a language, falling back to `"0"` when unknown.
    pub fn version_index(&self, language: &str) -> &str {
        self.versions
            .get(&language.trim().to_lowercase())
            .map(String::as_str)
            .unwrap_or(FALLBACK_VERSION_INDEX)
    }

    pub fn is_known(&self, language: &str) -> bool {
        self.versions.contains_key(&language.trim().to_lowercase())
    }

    pub fn entries(&self) -> Vec<LanguageEntry> {
        self.versions
            .iter()
            .map(|(name, version_index)| LanguageEntry {
                name: name.clone(),
                version_index: version_index.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_table_matches_backend_versions() {
        let table = LanguageTable::default();
        assert_eq!(table.version_index("java"), "4");
        assert_eq!(table.version_index("python3"), "3");
        assert_eq!(table.version_index("cpp17"), "5");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = LanguageTable::default();
        assert_eq!(table.version_index("Java"), "4");
        assert_eq!(table.version_index(" PYTHON3 "), "3");
    }

    #[test]
    fn unknown_language_uses_fallback() {
        let table = LanguageTable::default();
        assert!(!table.is_known("brainfuck"));
        assert_eq!(table.version_index("brainfuck"), FALLBACK_VERSION_INDEX);
    }

    #[test]
    fn file_entries_extend_and_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"languages": [{{"name": "Go", "versionIndex": "4"}}, {{"name": "java", "versionIndex": "5"}}]}}"#
        )
        .unwrap();

        let table = LanguageTable::load(file.path()).unwrap();
        assert_eq!(table.version_index("go"), "4");
        assert_eq!(table.version_index("java"), "5");
        assert_eq!(table.version_index("python3"), "3");
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = LanguageTable::load(Path::new("/nonexistent/languages.json")).unwrap_err();
        assert!(matches!(err, JudgeError::Config(_)));
    }
}
