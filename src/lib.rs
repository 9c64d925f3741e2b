//! Fetch a GitHub user's profile, repositories, starred-repository count and
//! pull-request activity in parallel and fold them into one `ProfileSnapshot`.

pub mod age;
pub mod aggregator;
pub mod config;
pub mod error;
pub mod github;
pub mod models;
pub mod render;
pub mod stats;
pub mod view;

pub use aggregator::StatsAggregator;
pub use config::Config;
pub use error::{ErrorKind, FetchError};
pub use github::{Credential, Endpoint, GithubClient, Transport};
pub use stats::{AggregateStats, ProfileSnapshot};
