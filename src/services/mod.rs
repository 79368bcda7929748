// src/services/mod.rs
//
// Shared services module containing business logic services
// that can be used across different domain modules

pub mod classifier;
pub mod instagram;
pub mod notifications;
pub mod rate_limit;
pub mod sweeper;
pub mod youtube;

// Re-export commonly used types for convenience
pub use classifier::GenreClassifier;
pub use instagram::InstagramIngester;
pub use notifications::Notifier;
pub use rate_limit::{LoginRateLimit, LoginRateLimiter};
pub use sweeper::StaleVideoSweeper;
pub use youtube::YouTubeIngester;
