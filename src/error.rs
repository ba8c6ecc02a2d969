use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Cell ({i}, {j}) is outside the {width}x{height} grid")]
    OutOfRange {
        i: usize,
        j: usize,
        width: usize,
        height: usize,
    },
    #[error("Non-finite {field} values after step {step}")]
    NumericInstability { field: &'static str, step: u64 },
}

/// Error type for scene file loading.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error(transparent)]
    Invalid(#[from] SimError),
}
