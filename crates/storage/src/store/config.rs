#![forbid(unsafe_code)]

use super::StoreError;
use serde::Deserialize;
use std::path::Path;
use tp_core::ngrams::{CaseLocale, NGramGenerator};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// File name of the database inside the storage directory.
    pub database_file: String,
    pub busy_timeout_ms: u64,
    /// Account type whose lists are never synced; deletes there are purged immediately.
    pub local_account_type: String,
    pub ngrams: NgramConfig,
    pub search: SearchConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NgramConfig {
    pub gram_length: usize,
    pub min_token_length: usize,
    pub include_digits: bool,
    pub lowercase: bool,
    pub case_locale: CaseLocale,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Results scoring at or below this relevance are dropped.
    pub min_relevance: f64,
    /// Queries shorter than this many characters match grams by prefix.
    pub prefix_query_below: usize,
    pub default_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_file: "tasks.db".to_string(),
            busy_timeout_ms: 5_000,
            local_account_type: "local".to_string(),
            ngrams: NgramConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            gram_length: 3,
            min_token_length: 1,
            include_digits: true,
            lowercase: true,
            case_locale: CaseLocale::Root,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_relevance: 0.3,
            prefix_query_below: 3,
            default_limit: 100,
        }
    }
}

impl NgramConfig {
    pub fn generator(&self) -> NGramGenerator {
        NGramGenerator::new(self.gram_length)
            .with_min_token_length(self.min_token_length)
            .include_digits(self.include_digits)
            .lowercase(self.lowercase)
            .case_locale(self.case_locale)
    }
}

impl StoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| StoreError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.database_file.trim().is_empty() {
            return Err(StoreError::Config("database_file must not be empty".into()));
        }
        if self.ngrams.gram_length == 0 {
            return Err(StoreError::Config("ngrams.gram_length must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.search.min_relevance) {
            return Err(StoreError::Config(
                "search.min_relevance must be in [0, 1)".into(),
            ));
        }
        if self.search.default_limit == 0 {
            return Err(StoreError::Config(
                "search.default_limit must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = StoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.ngrams.gram_length, 3);
        assert_eq!(config.search.min_relevance, 0.3);
    }

    #[test]
    fn nested_sections_override_individual_fields() {
        let config = StoreConfig::from_json_str(
            r#"{"local_account_type": "device", "ngrams": {"case_locale": "turkic", "gram_length": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.local_account_type, "device");
        assert_eq!(config.ngrams.gram_length, 4);
        assert_eq!(config.ngrams.case_locale, CaseLocale::Turkic);
        assert_eq!(config.ngrams.min_token_length, 1);
        assert_eq!(config.search.default_limit, 100);
    }

    #[test]
    fn rejects_invalid_values() {
        for raw in [
            r#"{"ngrams": {"gram_length": 0}}"#,
            r#"{"search": {"min_relevance": 1.0}}"#,
            r#"{"search": {"min_relevance": -0.1}}"#,
            r#"{"database_file": " "}"#,
            r#"{"unknown": true}"#,
        ] {
            let err = StoreConfig::from_json_str(raw).unwrap_err();
            assert_eq!(err.code(), "CONFIG", "{raw}");
        }
    }
}
