// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Device properties reported to the smart home API.
//!
//! A property is a read-only trait of a device state. Event properties have a small fixed set of
//! values, float properties (handled elsewhere) a continuous value range.

use crate::configuration::Config;
use crate::errors::{ErrorCode, SmartHomeError};
use crate::state::State;
use log::{debug, trace};
use serde::Serialize;
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumString};

mod event;

pub use event::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, Serialize)]
pub enum PropertyType {
    #[strum(serialize = "devices.properties.event")]
    #[serde(rename = "devices.properties.event")]
    Event,
    #[strum(serialize = "devices.properties.float")]
    #[serde(rename = "devices.properties.float")]
    Float,
}

/// Shared contract of all device properties.
pub trait Property {
    fn property_type(&self) -> PropertyType;

    fn instance(&self) -> &str;

    /// Test if the property is supported by the current state and configuration.
    fn supported(&self) -> bool;

    /// The current value can be queried. Otherwise the property is only reported on changes.
    fn retrievable(&self) -> bool {
        true
    }

    fn reportable(&self) -> bool {
        true
    }

    fn parameters(&self) -> Value;

    /// Current value of the property, `None` if the current state can't be mapped.
    ///
    /// Fails if the property kind can't provide a value at all.
    fn get_value(&self) -> Result<Option<String>, SmartHomeError> {
        Err(SmartHomeError::new(
            ErrorCode::NotSupportedInCurrentMode,
            format!(
                "Failed to get current value for {} instance {}",
                self.property_type(),
                self.instance()
            ),
        ))
    }

    /// Property description for the device list.
    fn description(&self) -> Value {
        json!({
            "type": self.property_type(),
            "retrievable": self.retrievable(),
            "reportable": self.reportable(),
            "parameters": self.parameters(),
        })
    }

    /// Property state for a device query, `None` if there's no current value.
    fn get_state(&self) -> Result<Option<Value>, SmartHomeError> {
        Ok(self.get_value()?.map(|value| {
            json!({
                "type": self.property_type(),
                "state": {
                    "instance": self.instance(),
                    "value": value,
                }
            })
        }))
    }
}

/// Get all supported properties of the given type for an entity state.
///
/// # Arguments
///
/// * `state`: current entity state.
/// * `config`: configuration with beta flag and entity overrides.
/// * `property_type`: requested property type.
/// * `instance`: only return the given instance, or all instances if `None`.
///
/// returns: matched properties, empty if nothing matches.
pub fn get_properties<'a>(
    state: &State,
    config: &'a dyn Config,
    property_type: PropertyType,
    instance: Option<&str>,
) -> Vec<EventProperty<'a>> {
    if property_type != PropertyType::Event {
        trace!("[{}] No {property_type} properties", state.entity_id);
        return Vec::new();
    }
    if !config.beta() {
        trace!("[{}] Event properties require beta mode", state.entity_id);
        return Vec::new();
    }

    EVENT_CATALOG
        .iter()
        .filter(|def| instance.is_none_or(|i| i == def.instance.name()))
        .map(|def| EventProperty::new(config, state.clone(), def.instance))
        .filter(|prop| {
            let supported = prop.supported();
            if supported {
                debug!(
                    "[{}] Matched event property: {}",
                    state.entity_id,
                    prop.instance()
                );
            }
            supported
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Settings;
    use rstest::rstest;
    use serde_json::{Map, json};

    struct MockEventProperty;

    impl Property for MockEventProperty {
        fn property_type(&self) -> PropertyType {
            PropertyType::Event
        }

        fn instance(&self) -> &str {
            "test"
        }

        fn supported(&self) -> bool {
            true
        }

        fn parameters(&self) -> Value {
            json!({})
        }
    }

    fn beta_config() -> Settings {
        Settings {
            beta: true,
            ..Default::default()
        }
    }

    fn new_state(entity_id: &str, state: &str, attributes: Value) -> State {
        let attributes: Map<String, Value> =
            serde_json::from_value(attributes).expect("invalid test data");
        State::new(entity_id, state, attributes)
    }

    #[test]
    fn base_property_value_is_not_supported() {
        let result = MockEventProperty.get_value();

        let err = result.expect_err("Base property must not return a value");
        assert_eq!(ErrorCode::NotSupportedInCurrentMode, err.code);
        assert!(
            err.message.contains("Failed to get"),
            "Unexpected message: {}",
            err.message
        );
    }

    #[test]
    fn base_property_state_propagates_error() {
        assert!(MockEventProperty.get_state().is_err());
    }

    #[rstest]
    #[case(PropertyType::Event, "devices.properties.event")]
    #[case(PropertyType::Float, "devices.properties.float")]
    fn property_type_wire_names(#[case] property_type: PropertyType, #[case] expected: &str) {
        assert_eq!(expected, property_type.to_string());
        assert_eq!(json!(expected), serde_json::to_value(property_type).unwrap());
    }

    #[rstest]
    #[case("door")]
    #[case("motion")]
    #[case("vibration")]
    fn no_properties_without_beta(#[case] device_class: &str) {
        let state = new_state(
            "binary_sensor.test",
            "on",
            json!({"device_class": device_class, "last_action": "single"}),
        );
        let config = Settings::default();

        assert!(get_properties(&state, &config, PropertyType::Event, None).is_empty());
    }

    #[test]
    fn float_properties_are_not_in_event_catalog() {
        let state = new_state(
            "binary_sensor.test",
            "on",
            json!({"device_class": "water_level"}),
        );
        let config = beta_config();

        assert!(
            get_properties(&state, &config, PropertyType::Float, Some("water_level")).is_empty()
        );
        assert_eq!(
            1,
            get_properties(&state, &config, PropertyType::Event, Some("water_level")).len()
        );
    }

    #[test]
    fn unknown_instance_returns_no_properties() {
        let state = new_state("binary_sensor.test", "on", json!({"device_class": "door"}));
        let config = beta_config();

        assert!(get_properties(&state, &config, PropertyType::Event, Some("foobar")).is_empty());
    }

    #[test]
    fn all_instances_are_matched_without_instance_filter() {
        let state = new_state(
            "sensor.test",
            "on",
            json!({"device_class": "vibration", "action": "vibrate"}),
        );
        let config = beta_config();

        let instances: Vec<_> = get_properties(&state, &config, PropertyType::Event, None)
            .iter()
            .map(|p| p.instance().to_string())
            .collect();

        assert_eq!(vec!["button", "vibration"], instances);
    }

    #[test]
    fn description_contains_type_and_parameters() {
        let state = new_state("binary_sensor.test", "on", json!({"device_class": "door"}));
        let config = beta_config();
        let props = get_properties(&state, &config, PropertyType::Event, Some("open"));
        assert_eq!(1, props.len());

        assert_eq!(
            json!({
                "type": "devices.properties.event",
                "retrievable": true,
                "reportable": true,
                "parameters": {
                    "instance": "open",
                    "events": [{"value": "opened"}, {"value": "closed"}]
                }
            }),
            props[0].description()
        );
    }

    #[test]
    fn state_is_none_without_value() {
        let state = new_state(
            "binary_sensor.test",
            "on",
            json!({"last_action": "invalid"}),
        );
        let config = beta_config();
        let props = get_properties(&state, &config, PropertyType::Event, Some("button"));
        assert_eq!(1, props.len());

        assert_eq!(Ok(None), props[0].get_state());
    }

    #[test]
    fn state_contains_instance_and_value() {
        let state = new_state("binary_sensor.test", "off", json!({"device_class": "moisture"}));
        let config = beta_config();
        let props = get_properties(&state, &config, PropertyType::Event, Some("water_leak"));
        assert_eq!(1, props.len());

        assert_eq!(
            Ok(Some(json!({
                "type": "devices.properties.event",
                "state": {"instance": "water_leak", "value": "dry"}
            }))),
            props[0].get_state()
        );
    }
}
