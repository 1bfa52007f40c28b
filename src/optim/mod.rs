//! Optimizer parameter grouping

mod layerwise;

pub use layerwise::{
    encoder_layer_prefixes, layerwise_param_groups, LayerwiseDecay, ParamGroup, NO_DECAY,
};
