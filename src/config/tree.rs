//! Layered YAML configuration tree
//!
//! Documents are merged left to right: mappings merge key by key, any other
//! value in a later document replaces the earlier one. Command-line style
//! overrides (`trainer.max_epochs=5`) are applied on top.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::error::{ConfigError, Result};

/// A composed configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Value,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    /// Empty configuration
    pub fn new() -> Self {
        Self {
            root: Value::Mapping(Mapping::new()),
        }
    }

    /// Wrap a YAML value; an empty document counts as an empty mapping
    pub fn from_value(value: Value, origin: &str) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Mapping(_) => Ok(Self { root: value }),
            _ => Err(ConfigError::NotAMapping(origin.to_string())),
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
        Self::from_value(value, origin)
    }

    /// Load a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml, &path.display().to_string())
    }

    /// Load several files and merge them left to right
    pub fn compose<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut tree = Self::new();
        for path in paths {
            let layer = Self::load(path.as_ref())?;
            tracing::debug!(layer = %path.as_ref().display(), "merging config layer");
            tree.merge(layer);
        }
        Ok(tree)
    }

    /// Merge `other` on top of `self`
    pub fn merge(&mut self, other: ConfigTree) {
        merge_values(&mut self.root, other.root);
    }

    /// Root value (always a mapping)
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Look up a dotted path such as `datamodule.batch_size`
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.root, path)
    }

    /// Whether a dotted path is present
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set a dotted path, creating intermediate mappings
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let segments = split_path(path).ok_or_else(|| ConfigError::InvalidOverride {
            expr: path.to_string(),
            reason: "empty key".to_string(),
        })?;

        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::InvalidOverride {
                expr: path.to_string(),
                reason: "empty key".to_string(),
            })?;

        let mut node = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            if node.is_null() {
                *node = Value::Mapping(Mapping::new());
            }
            let Value::Mapping(map) = node else {
                return Err(ConfigError::InvalidOverride {
                    expr: path.to_string(),
                    reason: format!("'{}' is not a mapping", parents[..depth].join(".")),
                });
            };
            node = map
                .entry(Value::String((*segment).to_string()))
                .or_insert(Value::Null);
        }

        if node.is_null() {
            *node = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(map) = node else {
            return Err(ConfigError::InvalidOverride {
                expr: path.to_string(),
                reason: format!("'{}' is not a mapping", parents.join(".")),
            });
        };
        map.insert(Value::String((*last).to_string()), value);
        Ok(())
    }

    /// Remove a dotted path, returning the removed value
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let segments = split_path(path)?;
        let (last, parents) = segments.split_last()?;
        let mut node = &mut self.root;
        for segment in parents {
            node = node.as_mapping_mut()?.get_mut(*segment)?;
        }
        node.as_mapping_mut()?.remove(*last)
    }

    /// Apply a single `key.path=value` override
    ///
    /// The value is read as a YAML scalar or flow collection, so `3` becomes
    /// an integer and `[a, b]` a list. A leading `+` (add) is accepted and
    /// `~key.path` deletes the key.
    pub fn apply_override(&mut self, expr: &str) -> Result<()> {
        let expr = expr.trim();
        let invalid = |reason: &str| ConfigError::InvalidOverride {
            expr: expr.to_string(),
            reason: reason.to_string(),
        };

        if let Some(path) = expr.strip_prefix('~') {
            let path = path.split_once('=').map_or(path, |(key, _)| key);
            return self
                .remove(path.trim())
                .map(|_| ())
                .ok_or_else(|| invalid("key does not exist"));
        }

        let body = expr.trim_start_matches('+');
        let (key, raw) = body
            .split_once('=')
            .ok_or_else(|| invalid("expected key=value"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(invalid("empty key"));
        }

        let value = parse_scalar(raw.trim());
        tracing::debug!(key, value = ?value, "applying override");
        self.set(key, value)
    }

    /// Apply overrides in order
    pub fn apply_overrides<I, S>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for expr in overrides {
            self.apply_override(expr.as_ref())?;
        }
        Ok(())
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.root).map_err(|e| ConfigError::Parse {
            origin: "<config>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Read a command-line or environment value as YAML, falling back to a string
pub(crate) fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Mapping(_)) | Err(_) => Value::String(raw.to_string()),
        Ok(value) => value,
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    if let Value::Mapping(overlay_map) = overlay {
        if let Value::Mapping(base_map) = base {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
            return;
        }
        *base = Value::Mapping(overlay_map);
    } else {
        *base = overlay;
    }
}

fn split_path(path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

/// Walk a dotted path; numeric segments index into sequences
pub(crate) fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in split_path(path)? {
        node = match node {
            Value::Mapping(map) => map.get(segment)?,
            Value::Sequence(seq) => seq.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}
