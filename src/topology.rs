//! Topology Model
//!
//! Devices and links as stored in the backing file. Known fields are typed,
//! everything else rides along in a flattened map so unknown attributes
//! survive a load/save cycle untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Device (or link endpoint) identifier.
///
/// Identifiers are compared by their textual value, so the number `7` and the
/// string `"7"` refer to the same device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceId {
    Text(String),
    Number(Number),
    Other(Value),
}

impl DeviceId {
    /// Whether this identifier names the given path/query id.
    ///
    /// An explicit `null` id names nothing.
    pub fn matches(&self, id: &str) -> bool {
        match self {
            Self::Text(text) => text == id,
            Self::Other(Value::Null) => false,
            _ => self.to_string() == id,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{}", number),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<u64> for DeviceId {
    fn from(id: u64) -> Self {
        Self::Number(id.into())
    }
}

/// Keep an explicit `null` as `Some(Value::Null)` instead of collapsing it to `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Same as [`present`] for identifiers: `null` becomes `Some(DeviceId::Other(Null))`.
fn present_id<'de, D>(deserializer: D) -> Result<Option<DeviceId>, D::Error>
where
    D: Deserializer<'de>,
{
    DeviceId::deserialize(deserializer).map(Some)
}

/// Metadata fields an operator may edit through the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Hostname,
    ManagementIp,
    Location,
    Notes,
}

impl MetaField {
    pub const ALL: [MetaField; 4] = [
        Self::Hostname,
        Self::ManagementIp,
        Self::Location,
        Self::Notes,
    ];

    /// JSON key of the field
    pub fn key(self) -> &'static str {
        match self {
            Self::Hostname => "hostname",
            Self::ManagementIp => "management_ip",
            Self::Location => "location",
            Self::Notes => "notes",
        }
    }
}

/// A single mock log line embedded in a device record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub level: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    pub fn new(level: &str, time: &str, message: &str) -> Self {
        let mut extra = Map::new();
        extra.insert("message".to_string(), Value::from(message));
        Self {
            level: Some(Value::from(level)),
            time: Some(Value::from(time)),
            extra,
        }
    }

    /// Level as a string, if it is one
    pub fn level_str(&self) -> Option<&str> {
        self.level.as_ref().and_then(Value::as_str)
    }

    /// Raw timestamp text, if it is a string
    pub fn time_str(&self) -> Option<&str> {
        self.time.as_ref().and_then(Value::as_str)
    }
}

/// Network device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, deserialize_with = "present_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DeviceId>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub hostname: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub management_ip: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
    /// Stored as found; only writes through the API insist on a list
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub vlans: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub logs: Option<Value>,
    /// Attributes with no dedicated field (type, vendor, model, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = Some(Value::from(hostname));
        self
    }

    pub fn matches_id(&self, id: &str) -> bool {
        self.id.as_ref().is_some_and(|own| own.matches(id))
    }

    pub fn meta(&self, field: MetaField) -> Option<&Value> {
        match field {
            MetaField::Hostname => self.hostname.as_ref(),
            MetaField::ManagementIp => self.management_ip.as_ref(),
            MetaField::Location => self.location.as_ref(),
            MetaField::Notes => self.notes.as_ref(),
        }
    }

    fn meta_slot(&mut self, field: MetaField) -> &mut Option<Value> {
        match field {
            MetaField::Hostname => &mut self.hostname,
            MetaField::ManagementIp => &mut self.management_ip,
            MetaField::Location => &mut self.location,
            MetaField::Notes => &mut self.notes,
        }
    }

    /// Copy allow-listed keys present in `patch` onto the device.
    ///
    /// Returns the number of fields written. Keys outside the allow-list are ignored.
    pub fn apply_meta(&mut self, patch: &Map<String, Value>) -> usize {
        let mut written = 0;
        for field in MetaField::ALL {
            if let Some(value) = patch.get(field.key()) {
                *self.meta_slot(field) = Some(value.clone());
                written += 1;
            }
        }
        written
    }

    /// Log entries stored on the device. Anything that is not a list of
    /// objects is skipped.
    pub fn log_entries(&self) -> Vec<LogEntry> {
        match self.logs {
            Some(Value::Array(ref items)) => items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| LogEntry::deserialize(item).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Opaque connection between two devices; endpoints are never checked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, deserialize_with = "present_id", skip_serializing_if = "Option::is_none")]
    pub source: Option<DeviceId>,
    #[serde(default, deserialize_with = "present_id", skip_serializing_if = "Option::is_none")]
    pub target: Option<DeviceId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn new(source: impl Into<DeviceId>, target: impl Into<DeviceId>) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
            extra: Map::new(),
        }
    }
}

/// The whole network: every device and every link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub links: Vec<Link>,
    /// Top-level keys besides devices/links, written back as found
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Topology {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.links.is_empty()
    }

    /// Linear scan by string-compared id
    pub fn find_device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.matches_id(id))
    }

    pub fn find_device_mut(&mut self, id: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.matches_id(id))
    }
}
