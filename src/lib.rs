pub mod backend;
pub mod detection;
pub mod error;
pub mod models;
pub mod rectify;

pub use backend::{Backend, BackendState, Detector};
pub use detection::{DetectionPipeline, DetectionStages};
pub use detection::scoring::ScoreWeights;
pub use error::DetectError;
pub use models::{Corners, ImageSize, Point, ScoredCorners};
pub use rectify::rectify;
