use thiserror::Error;

/// Top-level error type for detector geometry construction.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Solid(#[from] SolidError),

    #[error(transparent)]
    Array(#[from] ArrayError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the geometry parameter store.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("parameter {0} is not defined")]
    Undefined(String),

    #[error("parameter {name} = {value} is not finite")]
    NonFinite { name: String, value: f64 },
}

/// Errors raised while constructing solids.
#[derive(Debug, Error)]
pub enum SolidError {
    #[error("{solid}: {parameter} = {value} is not a valid extent")]
    InvalidExtent {
        solid: &'static str,
        parameter: &'static str,
        value: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

/// Errors raised by array layouts.
#[derive(Debug, Error)]
pub enum ArrayError {
    #[error("array index {index} is out of range (count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("invalid array layout: {0}")]
    InvalidLayout(String),
}

/// Errors raised by the placement tree.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("malformed placement tree: {0}")]
    Malformed(String),
}

/// Fatal configuration errors.
///
/// These abort construction: continuing would build a physically wrong detector.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{subsystem}: invalid {parameter} \"{value}\", expected one of {}", allowed.join(", "))]
    InvalidChoice {
        subsystem: &'static str,
        parameter: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("{subsystem}: unknown material \"{name}\"")]
    UnknownMaterial {
        subsystem: &'static str,
        name: String,
    },
}

/// Convenience type alias for results using [`GeoError`].
pub type Result<T> = std::result::Result<T, GeoError>;
