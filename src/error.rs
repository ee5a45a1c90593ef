//! Error type shared by the simulation, clock and settings

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Negative or non-finite scroll speed
    #[error("invalid wave speed: {0}")]
    InvalidWaveSpeed(f32),

    /// A fill command with NaN or infinite fraction
    #[error("invalid fill fraction: {0}")]
    InvalidFraction(f32),

    #[error("render target failed: {0}")]
    Render(String),

    #[error("failed to parse settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("simulation thread panicked")]
    ThreadPanicked,
}
