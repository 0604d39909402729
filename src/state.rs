// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Home-Assistant entity state snapshot.
//!
//! See <https://developers.home-assistant.io/docs/api/websocket/#fetching-states> for the JSON
//! format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATE_ON: &str = "on";
pub const STATE_OFF: &str = "off";

pub const ATTR_DEVICE_CLASS: &str = "device_class";

/// Current state of a single entity, one per evaluation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct State {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl State {
    pub fn new(
        entity_id: impl Into<String>,
        state: impl Into<String>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes,
        }
    }

    /// Entity domain, e.g. `binary_sensor` for `binary_sensor.front_door`.
    pub fn domain(&self) -> &str {
        match self.entity_id.split_once('.') {
            None => &self.entity_id,
            Some((domain, _)) => domain,
        }
    }

    pub fn object_id(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map(|(_, object_id)| object_id)
            .unwrap_or_default()
    }

    /// Attribute presence check. An attribute with a `null` value is still present.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_str())
    }

    pub fn device_class(&self) -> Option<&str> {
        self.attribute_str(ATTR_DEVICE_CLASS)
    }
}
