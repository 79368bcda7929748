//! # Videos Module
//!
//! Personal video library: canonical video records ingested from third-party
//! platforms, listing scoped to the owning user, and watch-status updates.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;

#[cfg(test)]
mod tests;

pub use models::{Genre, Platform, Video, WatchStatus};
pub use routes::videos_routes;
pub use store::VideoStore;
