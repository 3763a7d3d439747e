pub mod cli;
pub mod config;
pub mod descriptor;
pub mod distance;
pub mod error;
pub mod filters;
pub mod histogram;
pub mod img;
pub mod retrieval;
pub mod store;
pub mod utils;

pub use config::Opts;
pub use descriptor::{DescriptorConfig, DescriptorType};
pub use distance::DistanceMetric;
pub use error::{Error, ErrorKind, Result};
pub use img::Image;
pub use retrieval::{BuildStats, Candidate, Retriever};
pub use store::{FeatureStore, LmdbFeatureStore, MemoryFeatureStore};
