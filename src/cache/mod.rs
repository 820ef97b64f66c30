pub mod dataset;

pub use dataset::{CacheSnapshot, DatasetCache};
