//! Read-only view over the application's resolved configuration.
//!
//! The tree is loaded from a JSON dump of `config()->all()` and queried with
//! dotted keys (`queue.connections.redis.driver`), the same way the
//! framework's own repository is.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Integer value of an integer, an integral float, or a numeric string.
    /// Booleans, arrays and non-numeric strings yield `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(n) => Some(*n),
            ConfigValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Truthiness of ini/env style flags: `true`, `1`, `"on"`, `"yes"`, `"true"`.
    /// Anything unrecognised yields `None`.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::Integer(n) => Some(*n != 0),
            ConfigValue::String(s) => match s.trim().to_lowercase().as_str() {
                "1" | "on" | "yes" | "true" => Some(true),
                "0" | "off" | "no" | "false" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ConfigValue::Null => true,
            ConfigValue::String(s) => s.is_empty(),
            ConfigValue::Sequence(items) => items.is_empty(),
            ConfigValue::Mapping(map) => map.is_empty(),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Integer(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Sequence(_) => "array",
            ConfigValue::Mapping(_) => "map",
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => ConfigValue::String(s),
            Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(map) => ConfigValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&ConfigValue> for Value {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Null => Value::Null,
            ConfigValue::Bool(b) => Value::from(*b),
            ConfigValue::Integer(i) => Value::from(*i),
            ConfigValue::Float(f) => Value::from(*f),
            ConfigValue::String(s) => Value::from(s.as_str()),
            ConfigValue::Sequence(items) => Value::Array(items.iter().map(Value::from).collect()),
            ConfigValue::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Resolve `segments` below `node`. Sequences accept numeric segments.
fn lookup<'a>(node: &'a ConfigValue, segments: &[&str]) -> Option<&'a ConfigValue> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(node);
    };
    let child = match node {
        ConfigValue::Mapping(map) => map.get(*head)?,
        ConfigValue::Sequence(items) => items.get(head.parse::<usize>().ok()?)?,
        _ => return None,
    };
    lookup(child, rest)
}

#[derive(Debug, Clone)]
pub struct ConfigRepository {
    root: ConfigValue,
}

impl Default for ConfigRepository {
    fn default() -> Self {
        Self {
            root: ConfigValue::Mapping(BTreeMap::new()),
        }
    }
}

impl ConfigRepository {
    pub fn new(root: ConfigValue) -> Self {
        Self { root }
    }

    pub fn from_json(json: Value) -> Self {
        Self::new(ConfigValue::from(json))
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(source).context("Config dump is not valid JSON")?;
        Ok(Self::from_json(json))
    }

    /// Load a JSON config dump. Returns an empty repository if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config dump not found, using empty configuration");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config dump: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse config dump: {}", path.display()))
    }

    /// Look up a dotted key. An empty key returns the root.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        if key.is_empty() {
            return Some(&self.root);
        }
        let segments: Vec<&str> = key.split('.').collect();
        lookup(&self.root, &segments)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a ConfigValue) -> &'a ConfigValue {
        self.get(key).unwrap_or(default)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
