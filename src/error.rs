use thiserror::Error;

/// Errors surfaced at the crate boundary.
///
/// "No rectangle found" is not an error; detection reports it as an empty
/// result instead.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The host's vision backend has not finished initializing.
    #[error("backend is not initialized")]
    NotReady,

    /// Rectification corners collapse to a zero-size output.
    #[error("corner geometry collapses to an empty output rectangle")]
    DegenerateGeometry,
}
