//! Error types for Flare.

use thiserror::Error;

/// Top-level error type for Flare operations.
#[derive(Debug, Error)]
pub enum FlareError {
    /// Simulation configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Editor export lookup/parse errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Alpha-map or gradient assets that could not be decoded
    #[error("Asset error: {0}")]
    Asset(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating a simulation configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Pool capacity must be at least one slot.
    #[error("Particle count must be greater than zero")]
    ZeroCapacity,

    /// A numeric field is outside its accepted domain.
    #[error("Invalid value for `{field}`: {value}")]
    InvalidValue {
        /// Field name in the export schema
        field: &'static str,
        /// Offending value
        value: f32,
    },

    /// A gradient stop carries a color string that could not be parsed.
    #[error("Invalid color `{0}`")]
    InvalidColor(String),

    /// A gradient row has no stops.
    #[error("Gradient row {0} has no color stops")]
    EmptyGradientRow(usize),
}

/// Errors raised while selecting a configuration out of an editor export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Requested project ID is absent from the document
    #[error("Project \"{project}\" not found in export")]
    ProjectNotFound {
        /// Requested project ID
        project: String,
    },

    /// Requested emitter ID is absent from the selected project
    #[error("Emitter \"{emitter}\" not found in project \"{project}\"")]
    EmitterNotFound {
        /// Project that was searched
        project: String,
        /// Requested emitter ID
        emitter: String,
    },

    /// The export document is not valid JSON for the schema
    #[error("Failed to parse export: {0}")]
    Parse(String),
}

/// Result type alias for Flare operations.
pub type FlareResult<T> = Result<T, FlareError>;
