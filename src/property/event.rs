// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Event properties: discrete device states like an open door or a pressed button.
//!
//! Matching is based on the entity domain, the device class and the presence of action
//! attributes. The attribute value is only inspected when the current value is read.

use crate::configuration::Config;
use crate::errors::SmartHomeError;
use crate::property::{Property, PropertyType};
use crate::state::{STATE_OFF, STATE_ON, State};
use lazy_static::lazy_static;
use log::debug;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

pub const DOMAIN_BINARY_SENSOR: &str = "binary_sensor";
pub const DOMAIN_SENSOR: &str = "sensor";
pub const DOMAIN_INPUT_TEXT: &str = "input_text";

// https://www.home-assistant.io/integrations/binary_sensor/#device-class
pub const DEVICE_CLASS_BATTERY: &str = "battery";
pub const DEVICE_CLASS_DOOR: &str = "door";
pub const DEVICE_CLASS_GARAGE_DOOR: &str = "garage_door";
pub const DEVICE_CLASS_GAS: &str = "gas";
pub const DEVICE_CLASS_MOISTURE: &str = "moisture";
pub const DEVICE_CLASS_MOTION: &str = "motion";
pub const DEVICE_CLASS_OCCUPANCY: &str = "occupancy";
pub const DEVICE_CLASS_OPENING: &str = "opening";
pub const DEVICE_CLASS_PRESENCE: &str = "presence";
pub const DEVICE_CLASS_SMOKE: &str = "smoke";
pub const DEVICE_CLASS_VIBRATION: &str = "vibration";
pub const DEVICE_CLASS_WINDOW: &str = "window";
// not a Home Assistant device class, set with a customization or entity configuration
pub const DEVICE_CLASS_WATER_LEVEL: &str = "water_level";
pub const DEVICE_CLASS_BUTTON: &str = "button";

/// Action attributes of Zigbee buttons and sensors (zigbee2mqtt, deCONZ, Xiaomi gateway).
pub const ATTR_LAST_ACTION: &str = "last_action";
pub const ATTR_ACTION: &str = "action";

const STATE_HIGH: &str = "high";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventInstance {
    Open,
    Motion,
    Gas,
    Smoke,
    BatteryLevel,
    WaterLevel,
    WaterLeak,
    Button,
    Vibration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventValue {
    Opened,
    Closed,
    Detected,
    NotDetected,
    High,
    Low,
    Normal,
    Leak,
    Dry,
    Click,
    DoubleClick,
    LongPress,
    Vibration,
    Tilt,
    Fall,
}

/// Catalog entry of an event instance. Applicability and value rules are dispatched on the
/// instance in [`EventProperty`].
#[derive(Debug)]
pub struct EventDefinition {
    pub instance: EventInstance,
    /// Allowed values, the order is part of the device description.
    pub events: &'static [EventValue],
    pub retrievable: bool,
}

pub static EVENT_CATALOG: &[EventDefinition] = &[
    EventDefinition {
        instance: EventInstance::Open,
        events: &[EventValue::Opened, EventValue::Closed],
        retrievable: true,
    },
    EventDefinition {
        instance: EventInstance::Motion,
        events: &[EventValue::Detected, EventValue::NotDetected],
        retrievable: true,
    },
    EventDefinition {
        instance: EventInstance::Gas,
        events: &[EventValue::Detected, EventValue::NotDetected, EventValue::High],
        retrievable: true,
    },
    EventDefinition {
        instance: EventInstance::Smoke,
        events: &[EventValue::Detected, EventValue::NotDetected, EventValue::High],
        retrievable: true,
    },
    EventDefinition {
        instance: EventInstance::BatteryLevel,
        events: &[EventValue::Low, EventValue::Normal],
        retrievable: true,
    },
    EventDefinition {
        instance: EventInstance::WaterLevel,
        events: &[EventValue::Low, EventValue::Normal],
        retrievable: true,
    },
    EventDefinition {
        instance: EventInstance::WaterLeak,
        events: &[EventValue::Leak, EventValue::Dry],
        retrievable: true,
    },
    EventDefinition {
        instance: EventInstance::Button,
        events: &[
            EventValue::Click,
            EventValue::DoubleClick,
            EventValue::LongPress,
        ],
        retrievable: false,
    },
    EventDefinition {
        instance: EventInstance::Vibration,
        events: &[EventValue::Vibration, EventValue::Tilt, EventValue::Fall],
        retrievable: false,
    },
];

lazy_static! {
    static ref CATALOG_INDEX: HashMap<EventInstance, &'static EventDefinition> = EVENT_CATALOG
        .iter()
        .map(|def| (def.instance, def))
        .collect();
}

impl EventInstance {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn definition(self) -> &'static EventDefinition {
        CATALOG_INDEX
            .get(&self)
            .copied()
            .expect("BUG missing event catalog entry")
    }

    pub fn events(self) -> &'static [EventValue] {
        self.definition().events
    }
}

/// An event property bound to an entity state.
///
/// The state is owned by the property and may be replaced to re-evaluate the current value.
pub struct EventProperty<'a> {
    config: &'a dyn Config,
    pub state: State,
    pub instance: EventInstance,
}

impl<'a> EventProperty<'a> {
    /// Create a new property. The state is not validated, use [`Property::supported`] to check
    /// if the instance applies.
    pub fn new(config: &'a dyn Config, state: State, instance: EventInstance) -> Self {
        Self {
            config,
            state,
            instance,
        }
    }

    fn device_class(&self) -> Option<&str> {
        self.config
            .device_class(&self.state.entity_id, self.state.device_class())
    }

    fn has_action_attribute(&self) -> bool {
        self.state.has_attribute(ATTR_LAST_ACTION) || self.state.has_attribute(ATTR_ACTION)
    }

    fn action(&self) -> Option<&str> {
        self.state
            .attribute_str(ATTR_LAST_ACTION)
            .or_else(|| self.state.attribute_str(ATTR_ACTION))
    }

    /// Applicability rule of the instance, independent of the beta flag.
    fn applies(&self) -> bool {
        let domain = self.state.domain();
        let device_class = self.device_class();

        match self.instance {
            EventInstance::Open => {
                domain == DOMAIN_BINARY_SENSOR
                    && matches!(
                        device_class,
                        Some(
                            DEVICE_CLASS_DOOR
                                | DEVICE_CLASS_GARAGE_DOOR
                                | DEVICE_CLASS_WINDOW
                                | DEVICE_CLASS_OPENING
                        )
                    )
            }
            EventInstance::Motion => matches!(
                device_class,
                Some(DEVICE_CLASS_MOTION | DEVICE_CLASS_OCCUPANCY | DEVICE_CLASS_PRESENCE)
            ),
            EventInstance::Gas => device_class == Some(DEVICE_CLASS_GAS),
            EventInstance::Smoke => device_class == Some(DEVICE_CLASS_SMOKE),
            EventInstance::BatteryLevel => device_class == Some(DEVICE_CLASS_BATTERY),
            EventInstance::WaterLevel => device_class == Some(DEVICE_CLASS_WATER_LEVEL),
            EventInstance::WaterLeak => device_class == Some(DEVICE_CLASS_MOISTURE),
            EventInstance::Button => {
                (matches!(domain, DOMAIN_BINARY_SENSOR | DOMAIN_SENSOR)
                    && self.has_action_attribute())
                    || (domain == DOMAIN_INPUT_TEXT && device_class == Some(DEVICE_CLASS_BUTTON))
            }
            EventInstance::Vibration => {
                self.has_action_attribute() || device_class == Some(DEVICE_CLASS_VIBRATION)
            }
        }
    }

    /// Value rule of the instance.
    fn value(&self) -> Option<EventValue> {
        let state = self.state.state.as_str();

        match self.instance {
            EventInstance::Open => on_off(state, EventValue::Opened, EventValue::Closed),
            EventInstance::Motion => on_off(state, EventValue::Detected, EventValue::NotDetected),
            EventInstance::Gas | EventInstance::Smoke => match state {
                STATE_HIGH => Some(EventValue::High),
                _ => on_off(state, EventValue::Detected, EventValue::NotDetected),
            },
            EventInstance::BatteryLevel | EventInstance::WaterLevel => {
                on_off(state, EventValue::Low, EventValue::Normal)
            }
            EventInstance::WaterLeak => on_off(state, EventValue::Leak, EventValue::Dry),
            EventInstance::Button => {
                if self.state.domain() != DOMAIN_INPUT_TEXT && self.has_action_attribute() {
                    return self.map_action(|action| match action {
                        "single" => Some(EventValue::Click),
                        "double" => Some(EventValue::DoubleClick),
                        "hold" => Some(EventValue::LongPress),
                        _ => None,
                    });
                }
                self.state_as_event()
            }
            EventInstance::Vibration => {
                if !self.has_action_attribute() {
                    // only an event at the moment of vibration, no steady state
                    return None;
                }
                self.map_action(|action| match action {
                    "vibrate" => Some(EventValue::Vibration),
                    "flip90" => Some(EventValue::Tilt),
                    "free_fall" => Some(EventValue::Fall),
                    _ => None,
                })
            }
        }
    }

    fn map_action(&self, f: impl Fn(&str) -> Option<EventValue>) -> Option<EventValue> {
        let action = self.action()?;
        let value = f(action);
        if value.is_none() {
            debug!(
                "[{}] Unsupported {} action: {action}",
                self.state.entity_id, self.instance
            );
        }
        value
    }

    /// Use the state itself as event value if it is one of the instance values.
    fn state_as_event(&self) -> Option<EventValue> {
        EventValue::from_str(&self.state.state)
            .ok()
            .filter(|v| self.instance.events().contains(v))
    }
}

fn on_off(state: &str, on: EventValue, off: EventValue) -> Option<EventValue> {
    match state {
        STATE_ON => Some(on),
        STATE_OFF => Some(off),
        _ => None,
    }
}

impl Property for EventProperty<'_> {
    fn property_type(&self) -> PropertyType {
        PropertyType::Event
    }

    fn instance(&self) -> &str {
        self.instance.name()
    }

    fn supported(&self) -> bool {
        self.config.beta() && self.applies()
    }

    fn retrievable(&self) -> bool {
        self.instance.definition().retrievable
    }

    fn parameters(&self) -> Value {
        let events: Vec<_> = self
            .instance
            .events()
            .iter()
            .map(|value| json!({ "value": value }))
            .collect();

        json!({
            "instance": self.instance,
            "events": events,
        })
    }

    fn get_value(&self) -> Result<Option<String>, SmartHomeError> {
        Ok(self.value().map(|v| v.to_string()))
    }
}
