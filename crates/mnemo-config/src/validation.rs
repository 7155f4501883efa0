// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde attributes cannot express: non-empty paths,
//! sane thresholds, non-negative weights, known log levels.

use crate::diagnostic::ConfigError;
use crate::model::MnemoConfig;

/// Smallest `max_path_length` that still fits a four-level task file name.
const MIN_PATH_LENGTH: usize = 200;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &MnemoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.root_dir.trim().is_empty() {
        fail("storage.root_dir must not be empty".to_string());
    }

    if config.storage.max_path_length < MIN_PATH_LENGTH {
        fail(format!(
            "storage.max_path_length must be at least {MIN_PATH_LENGTH}, got {}",
            config.storage.max_path_length
        ));
    }

    let threshold = config.linking.relevance_threshold;
    if !threshold.is_finite() || threshold < 0.0 {
        fail(format!(
            "linking.relevance_threshold must be a non-negative number, got {threshold}"
        ));
    }

    if config.linking.max_connections == 0 {
        fail("linking.max_connections must be at least 1".to_string());
    }

    for (name, weight) in config.linking.weights.named() {
        if !weight.is_finite() || weight < 0.0 {
            fail(format!(
                "linking.weights.{name} must be a non-negative number, got {weight}"
            ));
        }
    }

    let fuzzy = config.query.fuzzy_threshold;
    if !(fuzzy > 0.0 && fuzzy <= 1.0) {
        fail(format!(
            "query.fuzzy_threshold must be in (0, 1], got {fuzzy}"
        ));
    }

    for (term, synonyms) in &config.query.synonyms {
        if term.trim().is_empty() || synonyms.iter().any(|s| s.trim().is_empty()) {
            fail(format!("query.synonyms entry `{term}` contains an empty term"));
        }
    }

    if config.durability.keep_backups == 0 {
        fail("durability.keep_backups must be at least 1".to_string());
    }

    if let Some(dir) = &config.durability.backup_dir
        && dir.trim().is_empty()
    {
        fail("durability.backup_dir must not be empty when set".to_string());
    }

    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "logging.level `{}` is not one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&MnemoConfig::default()).is_ok());
    }

    #[test]
    fn empty_root_dir_fails_validation() {
        let mut config = MnemoConfig::default();
        config.storage.root_dir = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "root_dir"));
    }

    #[test]
    fn negative_weight_fails_validation() {
        let mut config = MnemoConfig::default();
        config.linking.weights.tags = -0.1;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "linking.weights.tags"));
    }

    #[test]
    fn fuzzy_threshold_out_of_range() {
        let mut config = MnemoConfig::default();
        config.query.fuzzy_threshold = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "fuzzy_threshold"));
    }

    #[test]
    fn collects_every_violation() {
        let mut config = MnemoConfig::default();
        config.storage.max_path_length = 10;
        config.linking.relevance_threshold = f64::NAN;
        config.durability.keep_backups = 0;
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn empty_synonym_is_rejected() {
        let mut config = MnemoConfig::default();
        config
            .query
            .synonyms
            .insert("deploy".to_string(), vec!["ship".to_string(), "".to_string()]);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "deploy"));
    }
}
