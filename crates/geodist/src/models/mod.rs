//! Distance engine value types, errors, and traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::DistanceProvider;
pub use types::{Dataset, DatasetState, DistanceError, GeoPoint, ProjectedPoint, Result};
