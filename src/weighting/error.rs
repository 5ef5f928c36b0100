use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
/// Invalid weighting parameters.
pub enum WeightParamsError {
    #[error("max_effect must be finite and >= 0, got {0}")]
    InvalidMaxEffect(f64),

    #[error("tau must be finite and > 0, got {0}")]
    InvalidTau(f64),

    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}
