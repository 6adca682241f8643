use crate::error::{Error, Result};
use crate::props::{MissingElement, ReadOptions};
use crate::swap::{DEFAULT_SWAP_STATUSES, SwapPolicy};
use serde_json::{Map, Value, json};

/// Runtime options, stored as a JSON object and merged over [`SiteConfig::defaults`].
///
/// ```json
/// {
///   "read": { "missingElement": "emptyObject" },
///   "swap": { "statuses": [409, 422] },
///   "qr": { "widget": { "width": 256, "margin": 4 } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig(Value);

impl Default for SiteConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl SiteConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn defaults() -> Self {
        Self(json!({
            "read": {
                "missingElement": "emptyObject"
            },
            "swap": {
                "statuses": DEFAULT_SWAP_STATUSES
            },
            "qr": {
                "widget": {
                    "width": 256,
                    "margin": 4,
                    "dark": "#000000",
                    "light": "#FFFFFF",
                    "ecLevel": "M"
                },
                "signup": {
                    "width": 288,
                    "margin": 2,
                    "dark": "#000000",
                    "light": "#FFFFFF",
                    "ecLevel": "M"
                }
            }
        }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses `text` as a JSON object and merges it over the defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(text).map_err(|err| Error::InvalidConfig {
            message: err.to_string(),
        })?;
        if !overrides.is_object() {
            return Err(Error::InvalidConfig {
                message: "expected a JSON object".to_string(),
            });
        }
        let mut config = Self::defaults();
        config.deep_merge(&overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.get(dotted_path)?.as_u64()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // Configs are objects; coerce anything else so this never panics on user input.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    pub fn read_options(&self) -> Result<ReadOptions> {
        let missing = match self.get_str("read.missingElement") {
            None | Some("emptyObject") => MissingElement::EmptyObject,
            Some("fail") => MissingElement::Fail,
            Some(other) => {
                return Err(Error::InvalidConfig {
                    message: format!(
                        "read.missingElement must be \"emptyObject\" or \"fail\", got \"{other}\""
                    ),
                });
            }
        };
        Ok(ReadOptions { missing })
    }

    pub fn swap_policy(&self) -> Result<SwapPolicy> {
        let Some(raw) = self.get("swap.statuses") else {
            return Ok(SwapPolicy::default());
        };
        let Some(items) = raw.as_array() else {
            return Err(Error::InvalidConfig {
                message: "swap.statuses must be an array of HTTP status codes".to_string(),
            });
        };
        let mut statuses = Vec::with_capacity(items.len());
        for item in items {
            let status = item
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .filter(|n| (100..=599).contains(n))
                .ok_or_else(|| Error::InvalidConfig {
                    message: format!("swap.statuses: {item} is not an HTTP status code"),
                })?;
            statuses.push(status);
        }
        Ok(SwapPolicy::new(statuses))
    }

    /// Settings object for a QR preset (`qr.<preset>`), if configured.
    pub fn qr_preset(&self, preset: &str) -> Option<&Map<String, Value>> {
        self.get("qr")?.as_object()?.get(preset)?.as_object()
    }

    fn validate(&self) -> Result<()> {
        self.read_options()?;
        self.swap_policy()?;
        Ok(())
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
