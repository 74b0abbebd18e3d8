//! Common types shared across the geofeed viewer pipeline.

pub mod dataset;
pub mod error;
pub mod feature;
pub mod normalize;

pub use dataset::{Catalog, DatasetDescriptor, DatasetId, SourceType};
pub use error::{FeedError, FeedResult};
pub use feature::{Feature, FeatureCollection, Geometry};
pub use normalize::normalize;
