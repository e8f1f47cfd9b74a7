//! Embedded reference catalog for maintenance jobs.
//!
//! Stands in for the upstream vendor feeds: a category tree, a core product
//! set, a discovery set of products not yet carried, and researched market
//! base prices keyed by sku.

use homegrid_core::CategoryId;

use crate::models::{Compatibility, NewProduct};

/// A category in the reference tree. Parents are listed before children.
pub struct RefCategory {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub description: &'static str,
}

/// A product in the reference feed.
pub struct RefProduct {
    pub sku: &'static str,
    pub title: &'static str,
    pub brand: &'static str,
    pub category: &'static str,
    pub short_desc: &'static str,
    pub long_desc: &'static str,
    pub price_cad: i64,
    pub price_usd: i64,
    pub stock: i32,
    pub image: &'static str,
    pub protocol: &'static str,
    pub power: &'static str,
    pub room_tags: &'static [&'static str],
    pub beginner_friendly: bool,
    pub works: [bool; 7], // google, alexa, ha, matter, zigbee, zwave, thread
    pub requires_bridge: &'static [&'static str],
}

impl RefProduct {
    /// Materialize as an insertable product under the given category.
    #[must_use]
    pub fn to_new_product(&self, category_id: CategoryId) -> NewProduct {
        let [google, alexa, ha, matter, zigbee, zwave, thread] = self.works;
        NewProduct {
            sku: self.sku.to_owned(),
            title: self.title.to_owned(),
            brand: self.brand.to_owned(),
            short_desc: self.short_desc.to_owned(),
            long_desc: self.long_desc.to_owned(),
            price_cad: self.price_cad,
            price_usd: self.price_usd,
            stock: self.stock,
            images: vec![self.image.to_owned()],
            protocol: self.protocol.to_owned(),
            power: Some(self.power.to_owned()),
            room_tags: self.room_tags.iter().map(|&t| t.to_owned()).collect(),
            beginner_friendly: self.beginner_friendly,
            compat: Compatibility {
                google,
                alexa,
                ha,
                matter,
                zigbee,
                zwave,
                thread,
            },
            requires_bridge: self.requires_bridge.iter().map(|&b| b.to_owned()).collect(),
            published: true,
            category_id,
        }
    }
}

pub const CATEGORIES: &[RefCategory] = &[
    RefCategory {
        name: "Smart Lighting",
        parent: None,
        description: "Smart bulbs, switches, and lighting controls",
    },
    RefCategory {
        name: "Smart Bulbs",
        parent: Some("Smart Lighting"),
        description: "WiFi and Zigbee smart light bulbs",
    },
    RefCategory {
        name: "Smart Switches",
        parent: Some("Smart Lighting"),
        description: "Smart wall switches and dimmers",
    },
    RefCategory {
        name: "Security & Monitoring",
        parent: None,
        description: "Security cameras, sensors, and monitoring devices",
    },
    RefCategory {
        name: "Motion Sensors",
        parent: Some("Security & Monitoring"),
        description: "Motion detection sensors",
    },
    RefCategory {
        name: "Door/Window Sensors",
        parent: Some("Security & Monitoring"),
        description: "Contact sensors for doors and windows",
    },
    RefCategory {
        name: "Climate Control",
        parent: None,
        description: "Smart thermostats and climate management",
    },
    RefCategory {
        name: "Smart Thermostats",
        parent: Some("Climate Control"),
        description: "WiFi-enabled thermostats",
    },
    RefCategory {
        name: "Entertainment",
        parent: None,
        description: "Smart speakers, displays, and media devices",
    },
    RefCategory {
        name: "Smart Speakers",
        parent: Some("Entertainment"),
        description: "Voice-controlled smart speakers",
    },
    RefCategory {
        name: "Hubs & Bridges",
        parent: None,
        description: "Central hubs and protocol bridges",
    },
];

/// The core carried product set.
pub const PRODUCTS: &[RefProduct] = &[
    RefProduct {
        sku: "PHILIPS-HUE-A19-COLOR-001",
        title: "Philips Hue White and Color Ambiance A19 Smart Bulb",
        brand: "Philips",
        category: "Smart Bulbs",
        short_desc: "16 million colors, dimmable, works with Alexa and Google",
        long_desc: "The Philips Hue White and Color Ambiance A19 Smart Bulb offers 16 million \
                    colors and dimmable white light. Requires Hue Bridge for full functionality.",
        price_cad: 4999,
        price_usd: 3999,
        stock: 50,
        image: "/products/philips-hue-a19-color.jpg",
        protocol: "zigbee",
        power: "9W",
        room_tags: &["living-room", "bedroom", "kitchen"],
        beginner_friendly: true,
        works: [true, true, true, true, true, false, false],
        requires_bridge: &["philips-hue-bridge"],
    },
    RefProduct {
        sku: "PHILIPS-HUE-BRIDGE-001",
        title: "Philips Hue Smart Bridge",
        brand: "Philips",
        category: "Hubs & Bridges",
        short_desc: "Required hub for Philips Hue smart lighting system",
        long_desc: "The Philips Hue Smart Bridge is the central hub that connects all your Hue \
                    lights and accessories to your home network and the internet.",
        price_cad: 6999,
        price_usd: 5999,
        stock: 25,
        image: "/products/philips-hue-bridge.jpg",
        protocol: "zigbee",
        power: "5W",
        room_tags: &["office"],
        beginner_friendly: true,
        works: [true, true, true, true, true, false, false],
        requires_bridge: &[],
    },
    RefProduct {
        sku: "LIFX-A19-COLOR-001",
        title: "LIFX A19 Color Smart Bulb",
        brand: "LIFX",
        category: "Smart Bulbs",
        short_desc: "WiFi smart bulb, no hub required, 16 million colors",
        long_desc: "The LIFX A19 Color Smart Bulb connects directly to your WiFi network without \
                    requiring a hub. Compatible with major smart home platforms.",
        price_cad: 3999,
        price_usd: 3299,
        stock: 30,
        image: "/products/lifx-a19-color.jpg",
        protocol: "wifi",
        power: "11W",
        room_tags: &["living-room", "bedroom", "kitchen"],
        beginner_friendly: true,
        works: [true, true, true, true, false, false, false],
        requires_bridge: &[],
    },
    RefProduct {
        sku: "LUTRON-CASETA-DIMMER-001",
        title: "Lutron Caseta Smart Dimmer Switch",
        brand: "Lutron",
        category: "Smart Switches",
        short_desc: "Smart dimmer switch, works with existing wiring",
        long_desc: "The Lutron Caseta Smart Dimmer Switch replaces your existing switch and \
                    provides smart control over your lights. Works with most dimmable LED bulbs.",
        price_cad: 6999,
        price_usd: 5999,
        stock: 25,
        image: "/products/lutron-caseta-dimmer.jpg",
        protocol: "lutron",
        power: "N/A",
        room_tags: &["living-room", "bedroom", "kitchen"],
        beginner_friendly: false,
        works: [true, true, true, false, false, false, false],
        requires_bridge: &["lutron-caseta-hub"],
    },
    RefProduct {
        sku: "AQARA-MOTION-SENSOR-001",
        title: "Aqara Motion Sensor",
        brand: "Aqara",
        category: "Motion Sensors",
        short_desc: "Zigbee motion sensor, 2-year battery life",
        long_desc: "The Aqara Motion Sensor provides reliable motion detection with a 2-year \
                    battery life. Perfect for automating lights and security systems.",
        price_cad: 2499,
        price_usd: 1999,
        stock: 40,
        image: "/products/aqara-motion-sensor.jpg",
        protocol: "zigbee",
        power: "Battery",
        room_tags: &["living-room", "bedroom", "kitchen", "bathroom", "garage"],
        beginner_friendly: true,
        works: [true, true, true, true, true, false, false],
        requires_bridge: &["zigbee-hub"],
    },
    RefProduct {
        sku: "GOOGLE-NEST-MINI-001",
        title: "Google Nest Mini (2nd Gen)",
        brand: "Google",
        category: "Smart Speakers",
        short_desc: "Smart speaker with Google Assistant, voice control",
        long_desc: "The Google Nest Mini is a compact smart speaker that brings Google Assistant \
                    to your home. Control your smart home devices with voice commands.",
        price_cad: 6999,
        price_usd: 4999,
        stock: 20,
        image: "/products/google-nest-mini.jpg",
        protocol: "wifi",
        power: "15W",
        room_tags: &["living-room", "bedroom", "kitchen"],
        beginner_friendly: true,
        works: [true, false, true, true, false, false, false],
        requires_bridge: &[],
    },
];

/// Products not yet carried, added by the discovery step when missing.
pub const DISCOVERY: &[RefProduct] = &[
    RefProduct {
        sku: "AQARA-DOOR-SENSOR-001",
        title: "Aqara Door and Window Sensor",
        brand: "Aqara",
        category: "Door/Window Sensors",
        short_desc: "Compact zigbee contact sensor for doors and windows",
        long_desc: "The Aqara Door and Window Sensor reports open/close state over Zigbee and \
                    runs for up to two years on a coin cell.",
        price_cad: 1999,
        price_usd: 1599,
        stock: 35,
        image: "/products/aqara-door-sensor.jpg",
        protocol: "zigbee",
        power: "Battery",
        room_tags: &["entryway", "bedroom", "garage"],
        beginner_friendly: true,
        works: [true, true, true, true, true, false, false],
        requires_bridge: &["zigbee-hub"],
    },
    RefProduct {
        sku: "ECOBEE-SMART-THERMOSTAT-001",
        title: "ecobee Smart Thermostat Premium",
        brand: "ecobee",
        category: "Smart Thermostats",
        short_desc: "Smart thermostat with built-in air quality monitor",
        long_desc: "The ecobee Smart Thermostat Premium learns your schedule, supports remote \
                    room sensors, and works with every major voice assistant.",
        price_cad: 24999,
        price_usd: 19999,
        stock: 15,
        image: "/products/ecobee-smart-thermostat.jpg",
        protocol: "wifi",
        power: "24V",
        room_tags: &["hallway", "living-room"],
        beginner_friendly: false,
        works: [true, true, true, true, false, false, false],
        requires_bridge: &[],
    },
];

/// Researched market base prices in cents, keyed by sku.
#[must_use]
pub fn base_prices(sku: &str) -> Option<(i64, i64)> {
    let (cad, usd) = match sku {
        "PHILIPS-HUE-A19-COLOR-001" => (4999, 3999),
        "PHILIPS-HUE-BRIDGE-001" => (6999, 5999),
        "PHILIPS-HUE-MOTION-SENSOR-001" => (3999, 3299),
        "LIFX-A19-COLOR-001" => (3999, 3299),
        "LIFX-MINI-COLOR-001" => (2999, 2499),
        "LUTRON-CASETA-DIMMER-001" => (6999, 5999),
        "LUTRON-CASETA-HUB-001" => (8999, 7999),
        "AQARA-MOTION-SENSOR-001" => (2499, 1999),
        "AQARA-DOOR-SENSOR-001" => (1999, 1599),
        "AQARA-TEMP-HUMIDITY-001" => (2299, 1899),
        "GOOGLE-NEST-MINI-001" => (6999, 4999),
        "GOOGLE-NEST-HUB-001" => (12999, 9999),
        "GOOGLE-NEST-THERMOSTAT-001" => (29999, 24999),
        "AMAZON-ECHO-DOT-001" => (5999, 4999),
        "AMAZON-ECHO-SHOW-001" => (14999, 12999),
        "SAMSUNG-SMARTTHINGS-HUB-001" => (9999, 8999),
        "WYZE-CAM-V3-001" => (3999, 3299),
        "RING-DOORBELL-001" => (9999, 7999),
        "ECOBEE-SMART-THERMOSTAT-001" => (24999, 19999),
        _ => return None,
    };
    Some((cad, usd))
}
