//! Layer-wise learning rate decay
//!
//! Builds optimizer parameter groups for a transformer encoder where each
//! layer below the top trains with a geometrically smaller learning rate:
//!
//! lr_layer = lr * factor^(depth + 1)
//!
//! Where depth is 0 for the top encoder layer and grows towards the
//! embeddings. Parameters whose names match [`NO_DECAY`] get weight decay 0.

use serde::Serialize;

use crate::config::ModelConfig;

/// Name fragments of parameters excluded from weight decay
pub const NO_DECAY: &[&str] = &["bias", "LayerNorm.weight"];

/// Settings for layer-wise decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerwiseDecay {
    /// Base learning rate
    pub lr: f64,
    /// Weight decay for decaying parameters
    pub weight_decay: f64,
    /// Multiplier applied once per layer, top down
    pub factor: f64,
    /// When false a single group at `lr` covers all parameters
    pub enabled: bool,
}

impl LayerwiseDecay {
    pub fn new(lr: f64, weight_decay: f64, factor: f64) -> Self {
        Self {
            lr,
            weight_decay,
            factor,
            enabled: true,
        }
    }

    /// Same settings with decay switched off
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Settings taken from the model section of an experiment config
    pub fn from_model(model: &ModelConfig) -> Self {
        Self {
            lr: model.lr,
            weight_decay: model.weight_decay,
            factor: model.lr_decay_factor,
            enabled: model.layerwise_lr_decay,
        }
    }
}

/// A named set of parameters sharing optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamGroup {
    pub params: Vec<String>,
    pub lr: f64,
    pub weight_decay: f64,
}

/// Layer prefixes of an encoder with `num_layers` transformer blocks
///
/// Ordered from the embeddings up to the top layer, as
/// [`layerwise_param_groups`] expects.
pub fn encoder_layer_prefixes(num_layers: usize) -> Vec<String> {
    std::iter::once("model.embeddings".to_string())
        .chain((0..num_layers).map(|i| format!("model.encoder.layer.{i}")))
        .collect()
}

fn in_layer(param: &str, prefix: &str) -> bool {
    param
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

fn excluded_from_decay(param: &str) -> bool {
    NO_DECAY.iter().any(|nd| param.contains(nd))
}

/// Split `params` into per-layer optimizer groups
///
/// `layers` are parameter-name prefixes ordered from the embeddings to the
/// top encoder layer. Each layer yields a decay group followed by a
/// no-decay group, starting with the top layer. Parameters outside every
/// layer (such as a regression head) are left out of the decayed groups.
pub fn layerwise_param_groups<L, P>(
    layers: &[L],
    params: &[P],
    decay: &LayerwiseDecay,
) -> Vec<ParamGroup>
where
    L: AsRef<str>,
    P: AsRef<str>,
{
    if !decay.enabled {
        return vec![ParamGroup {
            params: params.iter().map(|p| p.as_ref().to_string()).collect(),
            lr: decay.lr,
            weight_decay: decay.weight_decay,
        }];
    }

    let mut groups = Vec::with_capacity(layers.len() * 2);
    let mut lr = decay.lr;
    for layer in layers.iter().rev() {
        lr *= decay.factor;
        let (no_decay, with_decay): (Vec<String>, Vec<String>) = params
            .iter()
            .filter(|p| in_layer(p.as_ref(), layer.as_ref()))
            .map(|p| p.as_ref().to_string())
            .partition(|p| excluded_from_decay(p));

        groups.push(ParamGroup {
            params: with_decay,
            lr,
            weight_decay: decay.weight_decay,
        });
        groups.push(ParamGroup {
            params: no_decay,
            lr,
            weight_decay: 0.0,
        });
    }

    tracing::debug!(
        layers = layers.len(),
        groups = groups.len(),
        bottom_lr = lr,
        "built layer-wise parameter groups"
    );
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Vec<&'static str> {
        vec![
            "model.embeddings.word_embeddings.weight",
            "model.embeddings.LayerNorm.weight",
            "model.encoder.layer.0.attention.self.query.weight",
            "model.encoder.layer.0.attention.self.query.bias",
            "model.encoder.layer.1.output.dense.weight",
            "model.encoder.layer.1.output.LayerNorm.weight",
            "model.encoder.layer.10.output.dense.weight",
            "fc.weight",
            "fc.bias",
        ]
    }

    #[test]
    fn test_encoder_layer_prefixes() {
        assert_eq!(
            encoder_layer_prefixes(2),
            vec!["model.embeddings", "model.encoder.layer.0", "model.encoder.layer.1"]
        );
    }

    #[test]
    fn test_groups_top_layer_first_with_decayed_lr() {
        let layers = encoder_layer_prefixes(2);
        let decay = LayerwiseDecay::new(1.0, 0.01, 0.5);
        let groups = layerwise_param_groups(&layers, &params(), &decay);

        assert_eq!(groups.len(), 6);
        let lrs: Vec<f64> = groups.iter().map(|g| g.lr).collect();
        assert_eq!(lrs, vec![0.5, 0.5, 0.25, 0.25, 0.125, 0.125]);

        assert_eq!(groups[0].params, vec!["model.encoder.layer.1.output.dense.weight"]);
        assert_eq!(groups[1].params, vec!["model.encoder.layer.1.output.LayerNorm.weight"]);
        assert!((groups[0].weight_decay - 0.01).abs() < 1e-12);
        assert_eq!(groups[1].weight_decay, 0.0);
    }

    #[test]
    fn test_layer_prefix_respects_dot_boundary() {
        let layers = encoder_layer_prefixes(2);
        let decay = LayerwiseDecay::new(1.0, 0.0, 0.5);
        let groups = layerwise_param_groups(&layers, &params(), &decay);
        let all: Vec<&String> = groups.iter().flat_map(|g| &g.params).collect();
        assert!(!all.iter().any(|p| p.contains("layer.10")));
    }

    #[test]
    fn test_bias_excluded_from_decay() {
        let layers = encoder_layer_prefixes(1);
        let decay = LayerwiseDecay::new(1.0, 0.01, 0.7);
        let groups = layerwise_param_groups(&layers, &params(), &decay);
        assert_eq!(
            groups[1].params,
            vec!["model.encoder.layer.0.attention.self.query.bias"]
        );
    }

    #[test]
    fn test_head_not_in_layer_groups() {
        let layers = encoder_layer_prefixes(2);
        let decay = LayerwiseDecay::new(1.0, 0.01, 0.7);
        let groups = layerwise_param_groups(&layers, &params(), &decay);
        assert!(groups.iter().all(|g| g.params.iter().all(|p| !p.starts_with("fc."))));
    }

    #[test]
    fn test_disabled_single_group() {
        let decay = LayerwiseDecay::new(3e-5, 0.01, 0.7).disabled();
        let groups = layerwise_param_groups(&encoder_layer_prefixes(2), &params(), &decay);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].params.len(), params().len());
        assert_eq!(groups[0].lr, 3e-5);
    }

    #[test]
    fn test_from_model_config() {
        let model = ModelConfig::default();
        let decay = LayerwiseDecay::from_model(&model);
        assert_eq!(decay.lr, model.lr);
        assert_eq!(decay.factor, model.lr_decay_factor);
        assert_eq!(decay.enabled, model.layerwise_lr_decay);
    }
}
