// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Configuration file handling.

use config::Config as ConfigBuilder;
use log::{info, warn};

/// Default configuration file.
pub const DEF_CONFIG_FILE: &str = "configuration.yaml";

/// Environment variable prefix for configuration overrides, e.g. `HEP_BETA=true`.
pub const ENV_PREFIX: &str = "HEP";

/// Configuration values consulted while matching and normalizing properties.
pub trait Config {
    /// Experimental properties are only exposed if beta features are enabled.
    fn beta(&self) -> bool;

    /// Entity specific overrides.
    fn entity_config(&self, entity_id: &str) -> Option<&EntityConfig>;

    /// Device class of an entity, taking an override from the entity configuration into account.
    fn device_class<'a>(&'a self, entity_id: &str, reported: Option<&'a str>) -> Option<&'a str> {
        self.entity_config(entity_id)
            .and_then(|cfg| cfg.device_class.as_deref())
            .or(reported)
    }
}

#[derive(Debug, Default, Clone, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    #[serde(default)]
    pub beta: bool,
    #[serde(default)]
    pub entity_config: Vec<EntityConfig>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EntityConfig {
    pub entity_id: String,
    /// Replaces the `device_class` attribute reported by Home Assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
}

impl Config for Settings {
    fn beta(&self) -> bool {
        self.beta
    }

    fn entity_config(&self, entity_id: &str) -> Option<&EntityConfig> {
        self.entity_config.iter().find(|c| c.entity_id == entity_id)
    }
}

/// Load the configuration settings.
///
/// The application provides default values which can be overriden in the following order:
/// 1. Configuration settings in the yaml or json configuration file specified in `filename`
/// 2. Environment variables with prefix `HEP_` (works only for top level keys like `beta`)
pub fn get_configuration(filename: Option<&str>) -> Result<Settings, config::ConfigError> {
    // default configuration
    let mut config =
        ConfigBuilder::builder().add_source(ConfigBuilder::try_from(&Settings::default())?);
    if let Some(filename) = filename {
        info!("Loading configuration file: {filename}");
        config = config.add_source(config::File::with_name(filename));
    }

    let config = config
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("_"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;

    Ok(check_cfg_values(settings))
}

fn check_cfg_values(mut settings: Settings) -> Settings {
    settings.entity_config.retain(|cfg| {
        let valid = cfg.entity_id.contains('.');
        if !valid {
            warn!(
                "Ignoring entity configuration with invalid entity_id: {}",
                cfg.entity_id
            );
        }
        valid
    });
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_cfg_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).expect("failed to create test config");
        file.write_all(content.as_bytes())
            .expect("failed to write test config");
        path
    }

    #[test]
    fn default_settings_have_beta_disabled() {
        let settings = Settings::default();
        assert!(!settings.beta());
        assert!(settings.entity_config("input_text.test").is_none());
    }

    #[test]
    fn configuration_file_overrides_defaults() {
        let path = write_cfg_file(
            "hep-test-config.yaml",
            r#"
beta: true
entity_config:
  - entity_id: input_text.doorbell
    device_class: button
  - entity_id: invalid
    device_class: button
"#,
        );

        let settings = get_configuration(path.to_str()).expect("valid configuration");

        assert!(settings.beta());
        assert_eq!(
            Some("button"),
            settings
                .entity_config("input_text.doorbell")
                .and_then(|c| c.device_class.as_deref())
        );
        assert!(
            settings.entity_config("invalid").is_none(),
            "Entity configuration without domain must be dropped"
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn device_class_override_takes_precedence() {
        let mut settings = Settings::default();
        settings.entity_config.push(EntityConfig {
            entity_id: "input_text.doorbell".into(),
            device_class: Some("button".into()),
        });

        assert_eq!(
            Some("button"),
            settings.device_class("input_text.doorbell", Some("door"))
        );
        assert_eq!(
            Some("door"),
            settings.device_class("binary_sensor.front", Some("door"))
        );
        assert_eq!(None, settings.device_class("binary_sensor.front", None));
    }
}
