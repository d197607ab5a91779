//! Error types for terrain generation

use thiserror::Error;

/// Main error type for the generator
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid grid dimensions {width}x{depth}: both must be greater than zero")]
    InvalidDimensions { width: u32, depth: u32 },

    #[error("noise scale must be finite and non-zero")]
    ZeroScale,

    #[error("biome list is empty")]
    EmptyBiomeList,

    #[error("terrain has not been built")]
    NotBuilt,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dimensions() {
        let err = Error::InvalidDimensions { width: 0, depth: 4 };
        assert_eq!(
            err.to_string(),
            "invalid grid dimensions 0x4: both must be greater than zero"
        );
    }

    #[test]
    fn test_invalid_helper() {
        let err = Error::invalid("octaves must be at least 1");
        assert!(matches!(err, Error::InvalidParameter(ref m) if m.contains("octaves")));
    }
}
