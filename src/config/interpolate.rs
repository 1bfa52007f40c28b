//! `${path.to.key}` interpolation over a composed [`ConfigTree`]
//!
//! A string that is exactly one reference takes the referenced value with
//! its type intact (`batch_size: ${datamodule.batch_size}` stays an
//! integer). References embedded in longer strings are rendered as text.
//! `${env:NAME}` and `${env:NAME,default}` read the process environment,
//! parsing the value as a YAML scalar. `\${` escapes a literal `${`.

use std::collections::HashMap;

use serde_yaml::{Mapping, Value};

use super::error::{ConfigError, Result};
use super::tree::{lookup, parse_scalar, ConfigTree};

const ENV_PREFIX: &str = "env:";

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Literal(String),
    Reference(&'a str),
}

fn parse_template(value: &str) -> Option<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = value;

    while let Some(pos) = rest.find("${") {
        if rest[..pos].ends_with('\\') {
            literal.push_str(&rest[..pos - 1]);
            literal.push_str("${");
            rest = &rest[pos + 2..];
            continue;
        }
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        let end = after.find('}')?;
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Reference(after[..end].trim()));
        rest = &after[end + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Some(segments)
}

fn join_key(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::from("?"),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

struct Resolver<'a> {
    root: &'a Value,
    cache: HashMap<String, Value>,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(root: &'a Value) -> Self {
        Self {
            root,
            cache: HashMap::new(),
            stack: Vec::new(),
        }
    }

    fn resolve_value(&mut self, key: &str, value: &Value) -> Result<Value> {
        match value {
            Value::String(s) => self.resolve_string(key, s),
            Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (k, v) in map {
                    let child = join_key(key, &key_to_string(k));
                    out.insert(k.clone(), self.resolve_value(&child, v)?);
                }
                Ok(Value::Mapping(out))
            }
            Value::Sequence(seq) => seq
                .iter()
                .enumerate()
                .map(|(i, v)| self.resolve_value(&join_key(key, &i.to_string()), v))
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence),
            Value::Tagged(tagged) => {
                let mut tagged = tagged.clone();
                tagged.value = self.resolve_value(key, &tagged.value)?;
                Ok(Value::Tagged(tagged))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(&mut self, key: &str, value: &str) -> Result<Value> {
        if !value.contains("${") {
            return Ok(Value::String(value.to_string()));
        }

        let segments = parse_template(value).ok_or_else(|| ConfigError::UnterminatedReference {
            key: key.to_string(),
            value: value.to_string(),
        })?;

        if let [Segment::Reference(reference)] = segments.as_slice() {
            return self.reference(key, reference);
        }

        let mut out = String::new();
        for segment in &segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Reference(reference) => {
                    let resolved = self.reference(key, reference)?;
                    let text = scalar_to_string(&resolved).ok_or_else(|| {
                        ConfigError::NonScalarInterpolation {
                            key: key.to_string(),
                            reference: (*reference).to_string(),
                        }
                    })?;
                    out.push_str(&text);
                }
            }
        }
        Ok(Value::String(out))
    }

    fn reference(&mut self, key: &str, reference: &str) -> Result<Value> {
        if let Some(var) = reference.strip_prefix(ENV_PREFIX) {
            return env_value(key, var);
        }

        if let Some(cached) = self.cache.get(reference) {
            return Ok(cached.clone());
        }

        if self.stack.iter().any(|r| r == reference) {
            let mut chain = self.stack.clone();
            chain.push(reference.to_string());
            return Err(ConfigError::CyclicReference { chain });
        }

        let raw = lookup(self.root, reference).ok_or_else(|| ConfigError::MissingReference {
            key: key.to_string(),
            reference: reference.to_string(),
        })?;

        self.stack.push(reference.to_string());
        let resolved = self.resolve_value(reference, raw);
        self.stack.pop();

        let resolved = resolved?;
        self.cache.insert(reference.to_string(), resolved.clone());
        Ok(resolved)
    }
}

fn env_value(key: &str, expr: &str) -> Result<Value> {
    let (name, default) = match expr.split_once(',') {
        Some((name, default)) => (name.trim(), Some(default.trim())),
        None => (expr.trim(), None),
    };
    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(parse_scalar(&value)),
        (Err(_), Some(default)) => Ok(parse_scalar(default)),
        (Err(_), None) => Err(ConfigError::MissingEnvVar {
            key: key.to_string(),
            var: name.to_string(),
        }),
    }
}

impl ConfigTree {
    /// Return a copy with every interpolation substituted
    pub fn resolve(&self) -> Result<ConfigTree> {
        let root = self.as_value();
        let mut resolver = Resolver::new(root);
        let resolved = resolver.resolve_value("", root)?;
        ConfigTree::from_value(resolved, "<resolved>")
    }

    /// Resolve the value at one dotted path, `None` when absent
    ///
    /// Only interpolations reachable from `path` are evaluated, so broken
    /// references elsewhere in the tree are not reported.
    pub fn resolve_path(&self, path: &str) -> Result<Option<Value>> {
        let root = self.as_value();
        let Some(raw) = lookup(root, path) else {
            return Ok(None);
        };
        let mut resolver = Resolver::new(root);
        resolver.stack.push(path.to_string());
        resolver.resolve_value(path, raw).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(yaml: &str) -> Result<ConfigTree> {
        ConfigTree::from_yaml_str(yaml, "test").unwrap().resolve()
    }

    #[test]
    fn test_parse_template_segments() {
        assert_eq!(
            parse_template("fold_${current_fold}.ckpt").unwrap(),
            vec![
                Segment::Literal("fold_".into()),
                Segment::Reference("current_fold"),
                Segment::Literal(".ckpt".into()),
            ]
        );
        assert_eq!(parse_template("${ a.b }").unwrap(), vec![Segment::Reference("a.b")]);
        assert!(parse_template("${a.b").is_none());
    }

    #[test]
    fn test_whole_value_reference_keeps_type() {
        let cfg = resolve(
            "datamodule:\n  batch_size: 16\nmodel:\n  batch_size: ${datamodule.batch_size}\n",
        )
        .unwrap();
        assert_eq!(cfg.get("model.batch_size").and_then(Value::as_u64), Some(16));
    }

    #[test]
    fn test_reference_to_mapping() {
        let cfg = resolve("trainer:\n  gpus: 1\nhparams:\n  trainer: ${trainer}\n").unwrap();
        assert_eq!(cfg.get("hparams.trainer.gpus").and_then(Value::as_u64), Some(1));
    }

    #[test]
    fn test_embedded_references_render_text() {
        let cfg = resolve(
            "name: roberta\ncurrent_fold: 2\nckpt: models/${name}/fold_${current_fold}.ckpt\n",
        )
        .unwrap();
        assert_eq!(
            cfg.get("ckpt").and_then(Value::as_str),
            Some("models/roberta/fold_2.ckpt")
        );
    }

    #[test]
    fn test_chained_references() {
        let cfg = resolve("a: ${b}\nb: ${c}\nc: 7\n").unwrap();
        assert_eq!(cfg.get("a").and_then(Value::as_u64), Some(7));
        assert_eq!(cfg.get("b").and_then(Value::as_u64), Some(7));
    }

    #[test]
    fn test_reference_into_sequence() {
        let cfg = resolve("cols: [score, label]\nprimary: ${cols.0}\n").unwrap();
        assert_eq!(cfg.get("primary").and_then(Value::as_str), Some("score"));
    }

    #[test]
    fn test_references_inside_sequences_resolved() {
        let cfg = resolve("seed: 1\nseeds:\n  - ${seed}\n  - 2\n").unwrap();
        assert_eq!(cfg.get("seeds.0").and_then(Value::as_u64), Some(1));
    }

    #[test]
    fn test_missing_reference() {
        let err = resolve("model:\n  lr: ${optim.lr}\n").unwrap_err();
        match err {
            ConfigError::MissingReference { key, reference } => {
                assert_eq!(key, "model.lr");
                assert_eq!(reference, "optim.lr");
            }
            other => panic!("Expected MissingReference, got {other:?}"),
        }
    }

    #[test]
    fn test_self_cycle() {
        let err = resolve("a: ${a}\n").unwrap_err();
        assert!(matches!(err, ConfigError::CyclicReference { .. }));
    }

    #[test]
    fn test_mutual_cycle_reports_chain() {
        let err = resolve("a: ${b}\nb: ${a}\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("a -> b") || msg.contains("b -> a"), "{msg}");
    }

    #[test]
    fn test_parent_reference_cycle() {
        let err = resolve("model:\n  copy: ${model}\n").unwrap_err();
        assert!(matches!(err, ConfigError::CyclicReference { .. }));
    }

    #[test]
    fn test_unterminated() {
        let err = resolve("a: x${b\nb: 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnterminatedReference { .. }));
    }

    #[test]
    fn test_non_scalar_embedding_rejected() {
        let err = resolve("t:\n  g: 1\ns: prefix-${t}\n").unwrap_err();
        assert!(matches!(err, ConfigError::NonScalarInterpolation { .. }));
    }

    #[test]
    fn test_escaped_reference_left_literal() {
        let cfg = resolve("a: 1\nb: cost \\${a}\n").unwrap();
        assert_eq!(cfg.get("b").and_then(Value::as_str), Some("cost ${a}"));
    }

    #[test]
    fn test_env_default_used_when_unset() {
        let cfg = resolve("dir: ${env:TOXICITY_CV_SURELY_UNSET_VAR,/tmp/data}\n").unwrap();
        assert_eq!(cfg.get("dir").and_then(Value::as_str), Some("/tmp/data"));
    }

    #[test]
    fn test_env_default_keeps_scalar_type() {
        let cfg = resolve("k: ${env:TOXICITY_CV_SURELY_UNSET_VAR,5}\n").unwrap();
        assert_eq!(cfg.get("k").and_then(Value::as_u64), Some(5));
    }

    #[test]
    fn test_env_missing_without_default() {
        let err = resolve("dir: ${env:TOXICITY_CV_SURELY_UNSET_VAR}\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar { .. }));
    }

    #[test]
    fn test_resolve_path_ignores_other_sections() {
        let tree =
            ConfigTree::from_yaml_str("a: ${b}\nb: 3\nbroken: ${nowhere}\n", "test").unwrap();
        assert_eq!(tree.resolve_path("a").unwrap(), Some(Value::from(3)));
        assert_eq!(tree.resolve_path("absent").unwrap(), None);
        assert!(matches!(
            tree.resolve_path("broken"),
            Err(ConfigError::MissingReference { .. })
        ));
    }

    #[test]
    fn test_resolve_path_detects_cycle_through_itself() {
        let tree = ConfigTree::from_yaml_str("a:\n  x: ${a}\n", "test").unwrap();
        assert!(matches!(
            tree.resolve_path("a"),
            Err(ConfigError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_plain_values_untouched() {
        let yaml = "a: 1\nb: text\nc: [1, 2]\nd: null\n";
        let cfg = resolve(yaml).unwrap();
        assert_eq!(cfg, ConfigTree::from_yaml_str(yaml, "test").unwrap());
    }
}
