//! Home Assistant setup-pack generation.
//!
//! Turns a purchased device list into a ready-to-copy set of named YAML
//! documents (configuration, automations, scenes, scripts) plus a README.
//! Output is real YAML via `serde_yaml`, one file per document; no archive
//! step, callers decide how to deliver the files.

use serde_json::{Value, json};
use thiserror::Error;

use crate::models::Product;

/// Setup-pack generation errors.
#[derive(Debug, Error)]
pub enum SetupPackError {
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// What a device is, for automation and dashboard purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Light,
    Switch,
    MotionSensor,
    DoorSensor,
    Thermostat,
    Speaker,
    Hub,
    Other,
}

impl DeviceKind {
    /// Home Assistant entity domain for this kind.
    const fn domain(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Switch => "switch",
            Self::MotionSensor | Self::DoorSensor => "binary_sensor",
            Self::Thermostat => "climate",
            Self::Speaker => "media_player",
            Self::Hub | Self::Other => "sensor",
        }
    }
}

/// A device going into the pack.
#[derive(Debug, Clone)]
pub struct Device {
    pub name: String,
    pub kind: DeviceKind,
    pub protocol: String,
    pub room: String,
}

impl Device {
    fn entity_id(&self) -> String {
        format!("{}.{}", self.kind.domain(), slug(&self.name))
    }
}

/// How aggressively to favour local control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivacyLevel {
    Minimal,
    #[default]
    Moderate,
    High,
}

/// Buyer preferences affecting generated automations.
#[derive(Debug, Clone)]
pub struct Preferences {
    pub privacy_level: PrivacyLevel,
    pub has_pets: bool,
    pub timezone: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            privacy_level: PrivacyLevel::default(),
            has_pets: false,
            timezone: "America/Toronto".to_owned(),
        }
    }
}

/// One generated file.
#[derive(Debug, Clone)]
pub struct PackFile {
    pub name: &'static str,
    pub contents: String,
}

/// A generated setup pack.
#[derive(Debug, Clone)]
pub struct SetupPack {
    pub files: Vec<PackFile>,
}

/// Classify a catalog product into a device kind from its title.
#[must_use]
pub fn classify(product: &Product) -> DeviceKind {
    let title = product.title.to_lowercase();
    if title.contains("bulb") || title.contains("light strip") || title.contains("lamp") {
        DeviceKind::Light
    } else if title.contains("dimmer") || title.contains("switch") || title.contains("plug") {
        DeviceKind::Switch
    } else if title.contains("motion") {
        DeviceKind::MotionSensor
    } else if title.contains("door") || title.contains("window") || title.contains("contact") {
        DeviceKind::DoorSensor
    } else if title.contains("thermostat") {
        DeviceKind::Thermostat
    } else if title.contains("speaker") || title.contains("nest mini") || title.contains("echo") {
        DeviceKind::Speaker
    } else if title.contains("bridge") || title.contains("hub") {
        DeviceKind::Hub
    } else {
        DeviceKind::Other
    }
}

/// Build the device list for an order's products, one device per unit,
/// assigned to the product's first room tag.
#[must_use]
pub fn devices_from_products(products: &[(Product, i32)]) -> Vec<Device> {
    let mut devices = Vec::new();
    for (product, qty) in products {
        let kind = classify(product);
        let room = product
            .room_tags
            .first()
            .cloned()
            .unwrap_or_else(|| "home".to_owned());
        for unit in 1..=*qty {
            let name = if *qty > 1 {
                format!("{} {unit}", product.title)
            } else {
                product.title.clone()
            };
            devices.push(Device {
                name,
                kind,
                protocol: product.protocol.clone(),
                room: room.clone(),
            });
        }
    }
    devices
}

impl SetupPack {
    /// Generate the pack for a set of devices.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn generate(
        order_ref: &str,
        devices: &[Device],
        preferences: &Preferences,
    ) -> Result<Self, SetupPackError> {
        let rooms = room_list(devices);
        let files = vec![
            PackFile {
                name: "configuration.yaml",
                contents: serde_yaml::to_string(&configuration(devices, preferences))?,
            },
            PackFile {
                name: "automations.yaml",
                contents: serde_yaml::to_string(&automations(devices, &rooms, preferences))?,
            },
            PackFile {
                name: "scenes.yaml",
                contents: serde_yaml::to_string(&scenes(devices, &rooms))?,
            },
            PackFile {
                name: "scripts.yaml",
                contents: serde_yaml::to_string(&scripts(devices))?,
            },
            PackFile {
                name: "README.md",
                contents: readme(order_ref, devices),
            },
        ];
        Ok(Self { files })
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn room_list(devices: &[Device]) -> Vec<String> {
    let mut rooms: Vec<String> = Vec::new();
    for device in devices {
        if !rooms.contains(&device.room) {
            rooms.push(device.room.clone());
        }
    }
    rooms
}

fn in_room<'a>(devices: &'a [Device], room: &str, kind: DeviceKind) -> Vec<&'a Device> {
    devices
        .iter()
        .filter(|d| d.room == room && d.kind == kind)
        .collect()
}

fn configuration(devices: &[Device], preferences: &Preferences) -> Value {
    let mut config = json!({
        "default_config": {},
        "homeassistant": {
            "name": "Smart Home",
            "unit_system": "metric",
            "time_zone": preferences.timezone,
            "country": "CA",
            "language": "en",
        },
        "history": {},
        "logbook": {},
        "automation": "!include automations.yaml",
        "scene": "!include scenes.yaml",
        "script": "!include scripts.yaml",
    });

    // Integration stanzas for the protocols actually present.
    let protocols: Vec<&str> = {
        let mut seen = Vec::new();
        for device in devices {
            if !seen.contains(&device.protocol.as_str()) {
                seen.push(device.protocol.as_str());
            }
        }
        seen
    };
    if protocols.contains(&"zigbee") {
        config["zha"] = json!({ "database_path": "zigbee.db" });
    }
    if protocols.contains(&"zwave") {
        config["zwave_js"] = json!({ "url": "ws://localhost:3000" });
    }
    config
}

fn automations(devices: &[Device], rooms: &[String], preferences: &Preferences) -> Value {
    let mut automations = Vec::new();

    for room in rooms {
        let lights = in_room(devices, room, DeviceKind::Light);
        let motion = in_room(devices, room, DeviceKind::MotionSensor);
        let doors = in_room(devices, room, DeviceKind::DoorSensor);

        if !lights.is_empty() && !motion.is_empty() {
            let light_ids: Vec<String> = lights.iter().map(|d| d.entity_id()).collect();
            automations.push(json!({
                "alias": format!("{room} Motion Lighting"),
                "description": format!("Turn on lights when motion detected in {room}"),
                "trigger": motion.iter().map(|sensor| json!({
                    "platform": "state",
                    "entity_id": sensor.entity_id(),
                    "to": "on",
                })).collect::<Vec<_>>(),
                "condition": [{
                    "condition": "time",
                    "after": "06:00:00",
                    "before": "23:00:00",
                }],
                "action": [{
                    "service": "light.turn_on",
                    "target": { "entity_id": light_ids },
                }],
            }));
            let light_ids: Vec<String> = lights.iter().map(|d| d.entity_id()).collect();
            automations.push(json!({
                "alias": format!("{room} Motion Lighting Off"),
                "description": format!("Turn off lights when no motion in {room}"),
                "trigger": motion.iter().map(|sensor| json!({
                    "platform": "state",
                    "entity_id": sensor.entity_id(),
                    "to": "off",
                    "for": "00:05:00",
                })).collect::<Vec<_>>(),
                "action": [{
                    "service": "light.turn_off",
                    "target": { "entity_id": light_ids },
                }],
            }));
        }

        if !doors.is_empty() {
            automations.push(json!({
                "alias": format!("{room} Door Notification"),
                "description": format!("Notify when door is opened in {room}"),
                "trigger": doors.iter().map(|sensor| json!({
                    "platform": "state",
                    "entity_id": sensor.entity_id(),
                    "to": "on",
                })).collect::<Vec<_>>(),
                "action": [{
                    "service": "notify.persistent_notification",
                    "data": {
                        "title": format!("{room} Door Opened"),
                        "message": format!("Door sensor in {room} was triggered"),
                    },
                }],
            }));
        }
    }

    if preferences.has_pets {
        automations.push(json!({
            "alias": "Pet-Friendly Motion Sensitivity",
            "description": "Lower motion sensitivity during pet active hours",
            "trigger": [
                { "platform": "time", "at": "22:00:00" },
                { "platform": "time", "at": "06:00:00" },
            ],
            "action": [{
                "service": "input_number.set_value",
                "target": { "entity_id": "input_number.motion_sensitivity" },
                "data": {
                    "value": "{{ '0.3' if trigger.now.hour == 22 else '0.7' }}",
                },
            }],
        }));
    }

    if preferences.privacy_level == PrivacyLevel::High {
        automations.push(json!({
            "alias": "Privacy Mode - Disable Cloud Services",
            "description": "Disable cloud-dependent services during privacy hours",
            "trigger": [
                { "platform": "time", "at": "23:00:00" },
            ],
            "action": [{
                "service": "input_boolean.turn_off",
                "target": { "entity_id": "input_boolean.cloud_services" },
            }],
        }));
    }

    json!(automations)
}

fn scenes(devices: &[Device], rooms: &[String]) -> Value {
    let mut scenes = Vec::new();
    for room in rooms {
        let lights = in_room(devices, room, DeviceKind::Light);
        if lights.is_empty() {
            continue;
        }
        let mut entities = serde_json::Map::new();
        for light in &lights {
            entities.insert(
                light.entity_id(),
                json!({ "state": "on", "brightness_pct": 40 }),
            );
        }
        scenes.push(json!({
            "name": format!("{room} Evening"),
            "entities": Value::Object(entities),
        }));
    }
    json!(scenes)
}

fn scripts(devices: &[Device]) -> Value {
    let light_ids: Vec<String> = devices
        .iter()
        .filter(|d| d.kind == DeviceKind::Light || d.kind == DeviceKind::Switch)
        .map(Device::entity_id)
        .collect();
    json!({
        "good_night": {
            "alias": "Good Night",
            "sequence": [{
                "service": "homeassistant.turn_off",
                "target": { "entity_id": light_ids },
            }],
        },
    })
}

fn readme(order_ref: &str, devices: &[Device]) -> String {
    let mut out = String::from("# Smart Home Setup Pack\n\n");
    out.push_str(
        "Configuration files for your Home Assistant installation: \
         `configuration.yaml`, `automations.yaml`, `scenes.yaml`, `scripts.yaml`.\n\n",
    );
    out.push_str("## Devices in Your Setup\n");
    for device in devices {
        out.push_str(&format!("- {} ({})\n", device.name, device.room));
    }
    out.push_str("\n## Setup Instructions\n\n");
    out.push_str("1. Install Home Assistant: <https://www.home-assistant.io/installation/>\n");
    out.push_str("2. Stop Home Assistant and copy these files into your config directory.\n");
    out.push_str("3. Restart Home Assistant and pair each device:\n");
    for device in devices {
        let hint = match device.protocol.as_str() {
            "zigbee" => "put in pairing mode and add via the Zigbee integration",
            "zwave" => "put in pairing mode and add via the Z-Wave integration",
            "wifi" => "connect to your WiFi network and add via the device's app",
            _ => "follow the manufacturer's pairing instructions",
        };
        out.push_str(&format!("   - {}: {hint}\n", device.name));
    }
    out.push_str(&format!("\nOrder: {order_ref}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{materialize, new_product};
    use homegrid_core::CategoryId;

    fn device(name: &str, kind: DeviceKind, room: &str) -> Device {
        Device {
            name: name.to_owned(),
            kind,
            protocol: "zigbee".to_owned(),
            room: room.to_owned(),
        }
    }

    #[test]
    fn classify_by_title() {
        let mut product = materialize(1, new_product("X-1", CategoryId::new(1)));
        product.title = "Philips Hue A19 Smart Bulb".to_owned();
        assert_eq!(classify(&product), DeviceKind::Light);
        product.title = "Aqara Motion Sensor".to_owned();
        assert_eq!(classify(&product), DeviceKind::MotionSensor);
        product.title = "Philips Hue Smart Bridge".to_owned();
        assert_eq!(classify(&product), DeviceKind::Hub);
        product.title = "Mystery Gadget".to_owned();
        assert_eq!(classify(&product), DeviceKind::Other);
    }

    #[test]
    fn qty_expands_to_numbered_devices() {
        let mut product = materialize(1, new_product("BULB-1", CategoryId::new(1)));
        product.title = "Smart Bulb".to_owned();
        let devices = devices_from_products(&[(product, 3)]);
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].name, "Smart Bulb 1");
        assert_eq!(devices[2].name, "Smart Bulb 3");
    }

    #[test]
    fn pack_contains_expected_files() {
        let devices = vec![
            device("Bedroom Bulb", DeviceKind::Light, "bedroom"),
            device("Bedroom Motion", DeviceKind::MotionSensor, "bedroom"),
        ];
        let pack =
            SetupPack::generate("order-42", &devices, &Preferences::default()).expect("pack");
        let names: Vec<_> = pack.files.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            [
                "configuration.yaml",
                "automations.yaml",
                "scenes.yaml",
                "scripts.yaml",
                "README.md"
            ]
        );
    }

    #[test]
    fn motion_automation_pairs_sensor_and_light() {
        let devices = vec![
            device("Bedroom Bulb", DeviceKind::Light, "bedroom"),
            device("Bedroom Motion", DeviceKind::MotionSensor, "bedroom"),
        ];
        let yaml = serde_yaml::to_string(&automations(
            &devices,
            &["bedroom".to_owned()],
            &Preferences::default(),
        ))
        .expect("yaml");
        assert!(yaml.contains("bedroom Motion Lighting"));
        assert!(yaml.contains("binary_sensor.bedroom_motion"));
        assert!(yaml.contains("light.bedroom_bulb"));
    }

    #[test]
    fn rooms_without_motion_get_no_lighting_automation() {
        let devices = vec![device("Kitchen Bulb", DeviceKind::Light, "kitchen")];
        let value = automations(&devices, &["kitchen".to_owned()], &Preferences::default());
        assert_eq!(value.as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn privacy_and_pets_add_automations() {
        let prefs = Preferences {
            privacy_level: PrivacyLevel::High,
            has_pets: true,
            timezone: "America/Toronto".to_owned(),
        };
        let value = automations(&[], &[], &prefs);
        let aliases: Vec<String> = value
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|a| a["alias"].as_str().map(ToOwned::to_owned))
            .collect();
        assert!(aliases.iter().any(|a| a.contains("Pet-Friendly")));
        assert!(aliases.iter().any(|a| a.contains("Privacy Mode")));
    }
}
