//! Item records as stored in user data, plus the sanitize and validate passes.

use std::cmp::Ordering;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::logutil::escape_log;

pub const DEFAULT_NAME: &str = "Unknown Item";
pub const DEFAULT_ICON: &str = "❓";
pub const DEFAULT_TYPE: &str = "generic";

pub const TYPE_FOOD: &str = "food";
pub const TYPE_WEAPON: &str = "weapon";
pub const TYPE_ARMOR: &str = "armor";

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

/// One physical item owned by a user.
///
/// `key` names the item type and may repeat across records; `uuid` identifies
/// this particular record. Unknown fields are kept in `extra` so snapshots
/// written by other command modules survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub flavor_text: String,
    #[serde(rename = "type", default = "default_type")]
    pub item_type: String,
    #[serde(default)]
    pub sell_price: f64,
    #[serde(default)]
    pub cannot_toss: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemRecord {
    /// A generic record with the given key and name; uuid is assigned on sanitize.
    pub fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            uuid: String::new(),
            name: name.to_string(),
            icon: default_icon(),
            flavor_text: String::new(),
            item_type: default_type(),
            sell_price: 0.0,
            cannot_toss: false,
            heal: None,
            atk: None,
            def: None,
            extra: Map::new(),
        }
    }

    pub fn with_type(mut self, item_type: &str) -> Self {
        self.item_type = item_type.to_string();
        self
    }

    pub fn with_sell_price(mut self, price: f64) -> Self {
        self.sell_price = price;
        self
    }

    pub fn with_uuid(mut self, uuid: &str) -> Self {
        self.uuid = uuid.to_string();
        self
    }

    pub fn is_food(&self) -> bool {
        self.item_type == TYPE_FOOD
    }

    pub fn is_gear(&self) -> bool {
        self.item_type == TYPE_WEAPON || self.item_type == TYPE_ARMOR
    }

    /// Copy of this record with a freshly generated uuid.
    pub fn fresh_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.uuid = Uuid::new_v4().to_string();
        copy
    }

    /// Value of a field by its serialized (camelCase) name, including extras.
    pub fn field_value(&self, field: &str) -> Option<Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => map.remove(field),
            _ => None,
        }
    }

    /// True when the serialized `field` equals `value`. Numbers compare by value,
    /// so `2` matches a stored `2.0`.
    pub fn field_matches(&self, field: &str, value: &Value) -> bool {
        match (self.field_value(field), value) {
            (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
            (Some(found), _) => &found == value,
            (None, _) => false,
        }
    }

    /// Normalize a typed record. Returns `None` when the record has no key.
    pub fn sanitize(mut self) -> Option<Self> {
        if self.key.is_empty() {
            debug!("collectibles: dropping record without key (name={})", escape_log(&self.name));
            return None;
        }
        if self.uuid.is_empty() {
            self.uuid = Uuid::new_v4().to_string();
        }
        if self.name.is_empty() {
            self.name = default_name();
        }
        if self.icon.is_empty() {
            self.icon = default_icon();
        }
        if self.item_type.is_empty() {
            self.item_type = default_type();
        }
        if !self.sell_price.is_finite() {
            self.sell_price = 0.0;
        }
        if self.is_food() {
            self.heal = Some(finite_or_zero(self.heal));
        }
        if self.is_gear() {
            self.atk = Some(finite_or_zero(self.atk));
            self.def = Some(finite_or_zero(self.def));
        }
        Some(self)
    }

    /// Normalize one element of a raw snapshot.
    ///
    /// Non-objects and objects without a non-empty string `key` are dropped.
    /// Numeric fields accept numbers or numeric strings.
    pub fn sanitize_value(value: &Value) -> Option<Self> {
        let Value::Object(source) = value else {
            debug!("collectibles: dropping non-object record");
            return None;
        };
        match source.get("key") {
            Some(Value::String(key)) if !key.is_empty() => {}
            _ => {
                debug!("collectibles: dropping record without key");
                return None;
            }
        }

        let mut map = source.clone();
        for field in ["uuid", "name", "icon", "flavorText", "type"] {
            if !matches!(map.get(field), Some(Value::String(s)) if !s.is_empty()) {
                map.remove(field);
            }
        }
        let sell_price = coerce_number(map.get("sellPrice")).unwrap_or(0.0);
        map.insert("sellPrice".into(), number_value(sell_price));
        let cannot_toss = is_truthy(map.get("cannotToss"));
        map.insert("cannotToss".into(), Value::Bool(cannot_toss));
        for field in ["heal", "atk", "def"] {
            match coerce_number(map.get(field)) {
                Some(n) => {
                    map.insert(field.into(), number_value(n));
                }
                None => {
                    map.remove(field);
                }
            }
        }

        match serde_json::from_value::<ItemRecord>(Value::Object(map)) {
            Ok(record) => record.sanitize(),
            Err(e) => {
                debug!("collectibles: dropping unreadable record: {}", e);
                None
            }
        }
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Loose truthiness for flags written by older modules (`1`, `"yes"`, `true`).
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |v| v != 0.0 && !v.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Sort key for display names: case-insensitive first, then lowercase before
/// uppercase, so `banana` < `Banana` < `Cherry`.
pub fn name_sort_key(name: &str) -> (String, String) {
    let swapped = name
        .chars()
        .flat_map(|c| {
            if c.is_uppercase() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                c.to_uppercase().collect::<Vec<_>>()
            }
        })
        .collect();
    (name.to_lowercase(), swapped)
}

/// Order two display names the way [`name_sort_key`] does.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    name_sort_key(a).cmp(&name_sort_key(b))
}

fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}

/// Outcome of [`validate_records`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check records for missing keys/names and broken type-specific stats. Never mutates.
pub fn validate_records(records: &[ItemRecord]) -> ValidationReport {
    let mut errors = Vec::new();
    for (idx, item) in records.iter().enumerate() {
        let label = if item.uuid.is_empty() {
            format!("item #{}", idx)
        } else {
            format!("item #{} ({})", idx, item.uuid)
        };
        if item.key.is_empty() {
            errors.push(format!("{}: missing key", label));
        }
        if item.name.is_empty() {
            errors.push(format!("{}: missing name", label));
        }
        if item.is_food() && !is_valid_stat(item.heal) {
            errors.push(format!("{}: invalid heal value", label));
        }
        if item.is_gear() {
            if !is_valid_stat(item.atk) {
                errors.push(format!("{}: invalid atk value", label));
            }
            if !is_valid_stat(item.def) {
                errors.push(format!("{}: invalid def value", label));
            }
        }
    }
    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn is_valid_stat(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v.is_finite())
}
