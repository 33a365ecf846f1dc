//! Error types for every stage of the service.
//!
//! Startup errors (`DataError`, `EncodeError` during fit, `ClusterError`, `ConfigError`) are
//! fatal and funnel into [`StartupError`]. Query-time errors are returned to the caller and
//! mapped onto HTTP statuses by the server module.

use crate::encoder::Feature;
use thiserror::Error;

/// Errors raised while locating or parsing the training dataset.
#[derive(Debug, Error)]
pub enum DataError {
    /// None of the candidate paths exists.
    #[error("dataset not found, tried: {}", .tried.join(", "))]
    NotFound {
        /// Candidate paths, in the order they were tried.
        tried: Vec<String>,
    },

    #[error("cannot read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but could not be parsed as the expected CSV schema.
    #[error("malformed dataset {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The file parsed but holds no data rows.
    #[error("dataset {path} contains no rows")]
    Empty { path: String },
}

/// Errors raised by the feature encoder.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A required feature is absent from a query mapping.
    #[error("Missing feature: {0}")]
    MissingFeature(Feature),

    /// A present value cannot be converted to a number.
    #[error("Invalid value for {feature}: {value} is not a number")]
    TypeConversion { feature: Feature, value: String },

    /// A categorical value outside the closed domain.
    #[error("unknown {feature} category {value:?} on training row {row}")]
    UnknownCategory {
        feature: &'static str,
        value: String,
        row: usize,
    },

    /// `fit` was called with no records.
    #[error("cannot fit encoder on an empty training set")]
    EmptyTrainingSet,

    /// A training value is NaN or infinite.
    #[error("non-finite {feature} value on training row {row}")]
    NonFinite { feature: Feature, row: usize },
}

/// Errors raised by the clustering algorithms and the model bank.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Input matrix has no rows.
    #[error("empty input")]
    EmptyInput,

    /// Fewer rows than an algorithm needs.
    #[error("insufficient samples: need at least {required}, found {found}")]
    InsufficientSamples { required: usize, found: usize },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        name: &'static str,
        message: &'static str,
    },
}

/// Errors raised by the assignment resolver.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("training matrix is empty")]
    EmptyTrainingSet,

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("label vector has {labels} entries but the training matrix has {rows} rows")]
    LabelLengthMismatch { labels: usize, rows: usize },

    /// The query holds NaN or an infinity, so every distance would be meaningless.
    #[error("query component {index} is not finite")]
    NonFiniteQuery { index: usize },
}

/// Errors raised by the projection service.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("projection needs at least {required} samples, found {found}")]
    TooFewSamples { required: usize, found: usize },

    #[error("projection needs at least {required} features, found {found}")]
    TooFewFeatures { required: usize, found: usize },

    #[error("Mismatch: {labels} labels vs {points} points")]
    LengthMismatch { points: usize, labels: usize },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Anything that aborts the process before it starts serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}
