pub mod batch;
pub mod movies;
pub mod providers;
pub mod recommendations;
pub mod retry;

pub use batch::BatchConfig;
pub use movies::MovieService;
pub use recommendations::RecommendationService;
pub use retry::RetryPolicy;
